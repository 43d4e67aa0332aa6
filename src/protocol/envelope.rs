//! Protocol envelope and body model
//!
//! Defines the message envelope and the typed views used to read requests
//! and build replies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{FIELD_IN_REPLY_TO, FIELD_MSG_ID, FIELD_TYPE};

/// Body field access errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Missing required field: {0}")]
    Missing(String),

    #[error("Field is not an exact integer: {0}")]
    NotAnInteger(String),

    #[error("Field is not a string: {0}")]
    NotAString(String),
}

pub type FieldResult<T> = Result<T, FieldError>;

/// An open bag of body fields keyed by name.
///
/// Unknown message kinds carry unknown payload shapes, so the body stays an
/// open map; known kinds read it through [`RequestBody`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The outer message structure: sender, recipient, and an open body.
///
/// An envelope is immutable once constructed; a fresh one is built for
/// every reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub src: String,
    pub dest: String,
    pub body: Body,
}

impl Envelope {
    pub fn new(src: String, dest: String, body: Body) -> Self {
        Self { src, dest, body }
    }

    /// Typed request view over this envelope's body.
    pub fn request(&self) -> RequestBody<'_> {
        RequestBody::new(&self.body)
    }
}

/// Typed read-only view over a request body.
///
/// Exposes the protocol-reserved fields plus passthrough access to
/// kind-specific payload fields.
#[derive(Debug, Clone, Copy)]
pub struct RequestBody<'a> {
    body: &'a Body,
}

impl<'a> RequestBody<'a> {
    pub fn new(body: &'a Body) -> Self {
        Self { body }
    }

    /// The message kind, discriminating dispatch.
    pub fn msg_type(&self) -> FieldResult<&'a str> {
        self.require_str(FIELD_TYPE)
    }

    /// The sender-assigned sequence number.
    ///
    /// Fails if the wire value is not an exact integer; a floating-point
    /// representation is rejected rather than truncated.
    pub fn msg_id(&self) -> FieldResult<u64> {
        let value = self.require(FIELD_MSG_ID)?;
        value
            .as_u64()
            .ok_or_else(|| FieldError::NotAnInteger(FIELD_MSG_ID.to_string()))
    }

    /// Passthrough access to a kind-specific field.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.body.get(key)
    }

    pub fn require(&self, key: &str) -> FieldResult<&'a Value> {
        self.body
            .get(key)
            .ok_or_else(|| FieldError::Missing(key.to_string()))
    }

    pub fn require_str(&self, key: &str) -> FieldResult<&'a str> {
        let value = self.require(key)?;
        value
            .as_str()
            .ok_or_else(|| FieldError::NotAString(key.to_string()))
    }
}

/// Builder for reply bodies.
///
/// Built fresh per reply, seeded with the outbound msg id. Each `with_*`
/// call sets or overwrites one field. Setting the reply `type` before
/// serialization is the dispatcher's responsibility.
#[derive(Debug, Clone)]
pub struct ResponseBody {
    body: Body,
}

impl ResponseBody {
    pub fn new(msg_id: u64) -> Self {
        let mut body = Body::new();
        body.insert(FIELD_MSG_ID, Value::from(msg_id));
        Self { body }
    }

    pub fn with_type(mut self, msg_type: &str) -> Self {
        self.body.insert(FIELD_TYPE, Value::from(msg_type));
        self
    }

    pub fn with_in_reply_to(mut self, in_reply_to: u64) -> Self {
        self.body.insert(FIELD_IN_REPLY_TO, Value::from(in_reply_to));
        self
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key, value);
        self
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_from(value: Value) -> Body {
        match value {
            Value::Object(map) => Body::from_map(map),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_request_accessors() {
        let body = body_from(json!({"type": "echo", "msg_id": 7, "echo": [1, 2]}));
        let req = RequestBody::new(&body);

        assert_eq!(req.msg_type().unwrap(), "echo");
        assert_eq!(req.msg_id().unwrap(), 7);
        assert_eq!(req.get("echo"), Some(&json!([1, 2])));
        assert_eq!(req.get("missing"), None);
    }

    #[test]
    fn test_missing_type() {
        let body = body_from(json!({"msg_id": 1}));
        let req = RequestBody::new(&body);

        assert_eq!(
            req.msg_type(),
            Err(FieldError::Missing("type".to_string()))
        );
    }

    #[test]
    fn test_float_msg_id_rejected() {
        let body = body_from(json!({"type": "echo", "msg_id": 2.5}));
        let req = RequestBody::new(&body);

        assert_eq!(
            req.msg_id(),
            Err(FieldError::NotAnInteger("msg_id".to_string()))
        );
    }

    #[test]
    fn test_response_builder() {
        let body = ResponseBody::new(3)
            .with_in_reply_to(9)
            .with_type("echo_ok")
            .with("echo", json!("hello"))
            .into_body();

        assert_eq!(body.get("msg_id"), Some(&json!(3)));
        assert_eq!(body.get("in_reply_to"), Some(&json!(9)));
        assert_eq!(body.get("type"), Some(&json!("echo_ok")));
        assert_eq!(body.get("echo"), Some(&json!("hello")));
    }

    #[test]
    fn test_response_builder_overwrites() {
        let body = ResponseBody::new(1)
            .with_type("init_ok")
            .with_type("echo_ok")
            .into_body();

        assert_eq!(body.get("type"), Some(&json!("echo_ok")));
    }
}
