use anchor_dns_application::ports::ResponseWriter;
use anchor_dns_domain::Protocol;
use async_trait::async_trait;
use std::net::SocketAddr;

/// Pass-through writer that remembers the response code of what was written.
pub struct RecordingWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    rcode: Option<u16>,
}

impl<'a> RecordingWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            rcode: None,
        }
    }

    /// Header RCODE of the last response, if one was written.
    pub fn rcode(&self) -> Option<u16> {
        self.rcode
    }
}

#[async_trait]
impl<'a> ResponseWriter for RecordingWriter<'a> {
    async fn write(&mut self, message: &[u8]) -> std::io::Result<()> {
        self.inner.write(message).await?;
        // RCODE is the low nibble of the fourth header byte.
        self.rcode = message.get(3).map(|flags| u16::from(flags & 0x0f));
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        self.inner.protocol()
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.peer_addr()
    }
}
