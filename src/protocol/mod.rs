//! Protocol module - the Maelstrom line-delimited JSON envelope protocol
//!
//! Wire format: one JSON object per line, shape
//! `{"src": string, "dest": string, "body": {"type": string, "msg_id": integer, ...}}`.
//! Replies additionally carry `in_reply_to` correlating them to the request.

mod codec;
mod envelope;
mod errors;

pub use codec::*;
pub use envelope::*;
pub use errors::*;

/// Protocol-reserved body fields; all other fields are kind-specific payload.
pub const FIELD_TYPE: &str = "type";
pub const FIELD_MSG_ID: &str = "msg_id";
pub const FIELD_IN_REPLY_TO: &str = "in_reply_to";

/// Default cap on a single wire line (1 MB)
pub const MAX_LINE_BYTES: usize = 1024 * 1024;
