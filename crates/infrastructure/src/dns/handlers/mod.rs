pub mod refusing;

pub use refusing::RefusingHandler;
