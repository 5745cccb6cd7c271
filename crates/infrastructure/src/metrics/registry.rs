use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

const DEFAULT_NAMESPACE: &str = "anchor_dns";

/// Query latency buckets in seconds, from cache hits to slow upstreams.
const DURATION_BUCKETS: [f64; 11] = [
    0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5, 2.0,
];

/// Counters recorded around every instrumented query.
///
/// Collectors are cheap to clone and safe to update from concurrent requests.
#[derive(Clone)]
pub struct DnsMetrics {
    registry: Registry,
    requests: IntCounterVec,
    responses: IntCounterVec,
    request_errors: IntCounterVec,
    request_duration: HistogramVec,
}

impl DnsMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("requests_total", "DNS queries received").namespace(namespace),
            &["proto", "type"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let responses = IntCounterVec::new(
            Opts::new("responses_total", "DNS responses by response code").namespace(namespace),
            &["rcode"],
        )?;
        registry.register(Box::new(responses.clone()))?;

        let request_errors = IntCounterVec::new(
            Opts::new("request_errors_total", "DNS queries whose handler chain failed")
                .namespace(namespace),
            &["proto"],
        )?;
        registry.register(Box::new(request_errors.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("request_duration_seconds", "DNS query processing duration")
                .namespace(namespace)
                .buckets(DURATION_BUCKETS.to_vec()),
            &["proto"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests,
            responses,
            request_errors,
            request_duration,
        })
    }

    pub fn record_request(&self, proto: &str, query_type: &str) {
        self.requests.with_label_values(&[proto, query_type]).inc();
    }

    pub fn record_response(&self, rcode: &str) {
        self.responses.with_label_values(&[rcode]).inc();
    }

    pub fn record_error(&self, proto: &str) {
        self.request_errors.with_label_values(&[proto]).inc();
    }

    pub fn observe_duration(&self, proto: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[proto])
            .observe(seconds);
    }

    pub fn requests(&self, proto: &str, query_type: &str) -> u64 {
        self.requests.with_label_values(&[proto, query_type]).get()
    }

    pub fn responses(&self, rcode: &str) -> u64 {
        self.responses.with_label_values(&[rcode]).get()
    }

    pub fn errors(&self, proto: &str) -> u64 {
        self.request_errors.with_label_values(&[proto]).get()
    }

    pub fn duration_samples(&self, proto: &str) -> u64 {
        self.request_duration
            .with_label_values(&[proto])
            .get_sample_count()
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

/// Label for a DNS response code.
pub fn rcode_label(rcode: u16) -> &'static str {
    match rcode {
        0 => "NOERROR",
        1 => "FORMERR",
        2 => "SERVFAIL",
        3 => "NXDOMAIN",
        4 => "NOTIMP",
        5 => "REFUSED",
        6 => "YXDOMAIN",
        7 => "YXRRSET",
        8 => "NXRRSET",
        9 => "NOTAUTH",
        10 => "NOTZONE",
        16 => "BADVERS",
        _ => "OTHER",
    }
}
