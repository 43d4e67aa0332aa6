//! Line codec for protocol envelopes
//!
//! Converts between the wire representation (one JSON object per line) and
//! in-memory [`Envelope`] values.

use serde_json::Value;
use thiserror::Error;

use super::{Body, Envelope};

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message is not a JSON object")]
    NotAnObject,

    #[error("Missing envelope field: {0}")]
    MissingField(&'static str),

    #[error("Envelope field is not a string: {0}")]
    NotAString(&'static str),

    #[error("Envelope body is not a JSON object")]
    BodyNotAnObject,

    #[error("Line too long: {0} bytes (max: {1})")]
    LineTooLong(usize, usize),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Decode one wire line into an envelope.
///
/// The decode is staged so each protocol violation surfaces as a distinct
/// error: malformed JSON, a non-object message, a missing or non-string
/// address field, or a missing or non-object body.
pub fn decode(line: &str) -> CodecResult<Envelope> {
    let value: Value = serde_json::from_str(line)?;

    let mut message = match value {
        Value::Object(map) => map,
        _ => return Err(CodecError::NotAnObject),
    };

    let src = take_string(&mut message, "src")?;
    let dest = take_string(&mut message, "dest")?;

    let body = match message.remove("body") {
        Some(Value::Object(map)) => Body::from_map(map),
        Some(_) => return Err(CodecError::BodyNotAnObject),
        None => return Err(CodecError::MissingField("body")),
    };

    Ok(Envelope::new(src, dest, body))
}

/// Encode an envelope as a single wire line (no trailing newline).
///
/// Key ordering is not guaranteed; consumers must not depend on it.
pub fn encode(envelope: &Envelope) -> CodecResult<String> {
    Ok(serde_json::to_string(envelope)?)
}

fn take_string(
    message: &mut serde_json::Map<String, Value>,
    field: &'static str,
) -> CodecResult<String> {
    match message.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CodecError::NotAString(field)),
        None => Err(CodecError::MissingField(field)),
    }
}
