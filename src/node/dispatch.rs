//! Message dispatch - routing requests to per-type handlers
//!
//! The dispatcher is the extension point of this protocol family: new
//! message kinds are hosted by registering a handler, with no change to
//! the loop or the envelope model.

use std::collections::HashMap;

use super::{NodeError, NodeResult, NodeState};
use crate::protocol::{RequestBody, ResponseBody};

/// A handler for one message type.
pub trait Handler: Send {
    /// Produce the reply body for a request.
    ///
    /// `resp` arrives seeded with the outbound `msg_id` and the request's
    /// `in_reply_to`; the handler must set the reply type.
    fn handle(
        &mut self,
        state: &mut NodeState,
        req: &RequestBody<'_>,
        resp: ResponseBody,
    ) -> NodeResult<ResponseBody>;
}

/// Routes requests to the handler registered for their message type.
pub struct Dispatcher {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a dispatcher with the built-in `init` and `echo` handlers.
    pub fn with_builtin_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher
            .handlers
            .insert("init".to_string(), Box::new(InitHandler));
        dispatcher
            .handlers
            .insert("echo".to_string(), Box::new(EchoHandler));
        dispatcher
    }

    /// Register a handler for a message type.
    pub fn register(&mut self, msg_type: &str, handler: Box<dyn Handler>) -> NodeResult<()> {
        if self.handlers.contains_key(msg_type) {
            return Err(NodeError::DuplicateHandler(msg_type.to_string()));
        }
        self.handlers.insert(msg_type.to_string(), handler);
        Ok(())
    }

    /// The message types this dispatcher can handle, sorted.
    pub fn message_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Route a request to its handler.
    pub fn dispatch(
        &mut self,
        state: &mut NodeState,
        msg_type: &str,
        req: &RequestBody<'_>,
        resp: ResponseBody,
    ) -> NodeResult<ResponseBody> {
        match self.handlers.get_mut(msg_type) {
            Some(handler) => handler.handle(state, req, resp),
            None => Err(NodeError::Unsupported(msg_type.to_string())),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in `init` handler: learns the node's identity.
pub struct InitHandler;

impl Handler for InitHandler {
    fn handle(
        &mut self,
        state: &mut NodeState,
        req: &RequestBody<'_>,
        resp: ResponseBody,
    ) -> NodeResult<ResponseBody> {
        let node_id = req.require_str("node_id")?;
        state.initialize(node_id.to_string());
        tracing::info!("Node initialized as {}", node_id);
        Ok(resp.with_type("init_ok"))
    }
}

/// Built-in `echo` handler: returns the `echo` payload verbatim.
pub struct EchoHandler;

impl Handler for EchoHandler {
    fn handle(
        &mut self,
        _state: &mut NodeState,
        req: &RequestBody<'_>,
        resp: ResponseBody,
    ) -> NodeResult<ResponseBody> {
        let echo = req.require("echo")?.clone();
        Ok(resp.with_type("echo_ok").with("echo", echo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Body;
    use serde_json::{json, Value};

    fn body_from(value: Value) -> Body {
        match value {
            Value::Object(map) => Body::from_map(map),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_init_sets_identity() {
        let mut dispatcher = Dispatcher::with_builtin_handlers();
        let mut state = NodeState::new();
        let body = body_from(json!({"type": "init", "msg_id": 1, "node_id": "n3"}));

        let resp = dispatcher
            .dispatch(&mut state, "init", &RequestBody::new(&body), ResponseBody::new(1))
            .unwrap()
            .into_body();

        assert_eq!(state.node_id(), Some("n3"));
        assert_eq!(resp.get("type"), Some(&json!("init_ok")));
        assert!(!resp.contains("node_id"));
    }

    #[test]
    fn test_echo_copies_nested_payload() {
        let mut dispatcher = Dispatcher::with_builtin_handlers();
        let mut state = NodeState::new();
        let payload = json!({"outer": [1, {"inner": null}, "s"]});
        let body = body_from(json!({"type": "echo", "msg_id": 2, "echo": payload}));

        let resp = dispatcher
            .dispatch(&mut state, "echo", &RequestBody::new(&body), ResponseBody::new(1))
            .unwrap()
            .into_body();

        assert_eq!(resp.get("type"), Some(&json!("echo_ok")));
        assert_eq!(resp.get("echo"), Some(&payload));
    }

    #[test]
    fn test_echo_missing_payload() {
        let mut dispatcher = Dispatcher::with_builtin_handlers();
        let mut state = NodeState::new();
        let body = body_from(json!({"type": "echo", "msg_id": 2}));

        let result =
            dispatcher.dispatch(&mut state, "echo", &RequestBody::new(&body), ResponseBody::new(1));

        assert!(matches!(result, Err(NodeError::Field(_))));
    }

    #[test]
    fn test_unknown_type() {
        let mut dispatcher = Dispatcher::with_builtin_handlers();
        let mut state = NodeState::new();
        let body = body_from(json!({"type": "cas", "msg_id": 3}));

        let result =
            dispatcher.dispatch(&mut state, "cas", &RequestBody::new(&body), ResponseBody::new(1));

        assert!(matches!(result, Err(NodeError::Unsupported(t)) if t == "cas"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut dispatcher = Dispatcher::with_builtin_handlers();

        let result = dispatcher.register("echo", Box::new(EchoHandler));

        assert!(matches!(result, Err(NodeError::DuplicateHandler(t)) if t == "echo"));
    }
}
