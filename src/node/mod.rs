//! Node module - node state, message dispatch, and the request/reply loop
//!
//! Provides:
//! - Node state (identity and outbound message sequencing)
//! - A dispatcher routing requests to per-type handlers
//! - The runner driving the line-at-a-time request/reply loop

mod dispatch;
mod runner;
mod state;

pub use dispatch::*;
pub use runner::*;
pub use state::*;

use thiserror::Error;

use crate::protocol::{CodecError, FieldError, RpcError};

/// Node errors
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid request body: {0}")]
    Field(#[from] FieldError),

    #[error("Unsupported message type: {0}")]
    Unsupported(String),

    #[error("Handler already registered for message type: {0}")]
    DuplicateHandler(String),

    #[error("Node has not been initialized")]
    NotInitialized,
}

pub type NodeResult<T> = Result<T, NodeError>;

impl NodeError {
    /// Map to the protocol-level error reported back to the requester.
    pub fn to_rpc(&self) -> RpcError {
        match self {
            NodeError::Unsupported(msg_type) => RpcError::not_supported(msg_type),
            NodeError::NotInitialized => RpcError::temporarily_unavailable(self.to_string()),
            NodeError::Field(err) => RpcError::malformed_request(err.to_string()),
            NodeError::Codec(err) => RpcError::malformed_request(err.to_string()),
            other => RpcError::crash(other.to_string()),
        }
    }
}

/// Options governing the request/reply loop
#[derive(Debug, Clone)]
pub struct NodeOptions {
    /// Reject non-init requests until the node has been initialized
    pub strict_init: bool,
    /// Terminate on the first protocol error instead of replying with an
    /// `error` body (reference harness behavior)
    pub fail_fast: bool,
    /// Maximum accepted wire line length in bytes
    pub max_line_bytes: usize,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            strict_init: false,
            fail_fast: false,
            max_line_bytes: crate::protocol::MAX_LINE_BYTES,
        }
    }
}
