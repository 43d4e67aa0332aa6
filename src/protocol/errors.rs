//! Maelstrom protocol error vocabulary
//!
//! Numeric error codes defined by the protocol family, plus the `error`
//! reply body a node sends back instead of crashing on a bad request.

use serde_json::Value;

use super::ResponseBody;

/// Protocol error codes
pub mod codes {
    pub const TIMEOUT: u64 = 0;
    pub const NOT_SUPPORTED: u64 = 10;
    pub const TEMPORARILY_UNAVAILABLE: u64 = 11;
    pub const MALFORMED_REQUEST: u64 = 12;
    pub const CRASH: u64 = 13;
    pub const ABORT: u64 = 14;
    pub const KEY_DOES_NOT_EXIST: u64 = 20;
    pub const KEY_ALREADY_EXISTS: u64 = 21;
    pub const PRECONDITION_FAILED: u64 = 22;
    pub const TXN_CONFLICT: u64 = 30;
}

/// A protocol-level error reported back to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub number: u64,
    pub reason: String,
}

impl RpcError {
    pub fn new(number: u64, reason: String) -> Self {
        Self { number, reason }
    }

    pub fn not_supported(msg_type: &str) -> Self {
        Self::new(
            codes::NOT_SUPPORTED,
            format!("Unsupported message type: {}", msg_type),
        )
    }

    pub fn temporarily_unavailable(reason: String) -> Self {
        Self::new(codes::TEMPORARILY_UNAVAILABLE, reason)
    }

    pub fn malformed_request(reason: String) -> Self {
        Self::new(codes::MALFORMED_REQUEST, reason)
    }

    pub fn crash(reason: String) -> Self {
        Self::new(codes::CRASH, reason)
    }

    /// Render onto a reply builder as an `error` body.
    pub fn into_response(self, resp: ResponseBody) -> ResponseBody {
        resp.with_type("error")
            .with("number", Value::from(self.number))
            .with("reason", Value::from(self.reason))
    }
}
