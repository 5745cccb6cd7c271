use anchor_dns_application::ports::{DnsHandler, ResponseWriter};
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use tracing::debug;

/// Terminal stage used when no resolver is wired in.
///
/// Parseable queries are answered with REFUSED, anything else with FORMERR.
/// Either way the peer gets a reply, which is what the datagram readiness
/// probe waits for.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefusingHandler;

impl RefusingHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn build_response(query: &[u8]) -> Option<Vec<u8>> {
        let response = match Message::from_vec(query) {
            Ok(request) => {
                let mut response =
                    Message::new(request.id(), MessageType::Response, request.op_code());
                response.set_recursion_desired(request.recursion_desired());
                response.set_response_code(ResponseCode::Refused);
                for query in request.queries() {
                    response.add_query(query.clone());
                }
                response
            }
            Err(e) => {
                debug!(error = %e, len = query.len(), "Malformed DNS query");
                let id = match query {
                    [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
                    _ => 0,
                };
                let mut response = Message::new(id, MessageType::Response, OpCode::Query);
                response.set_response_code(ResponseCode::FormErr);
                response
            }
        };

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        match response.emit(&mut encoder) {
            Ok(()) => Some(buf),
            Err(e) => {
                debug!(error = %e, "Failed to serialize DNS response");
                None
            }
        }
    }
}

#[async_trait]
impl DnsHandler for RefusingHandler {
    async fn handle(&self, writer: &mut dyn ResponseWriter, message: &[u8]) {
        let Some(response) = Self::build_response(message) else {
            return;
        };
        if let Err(e) = writer.write(&response).await {
            debug!(peer = %writer.peer_addr(), error = %e, "Failed to write DNS response");
        }
    }
}
