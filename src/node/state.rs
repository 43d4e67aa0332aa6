//! Node state - identity and outbound message sequencing

/// Process-wide node state.
///
/// The identity is learned from the first `init` message and lives for the
/// rest of the process; the counter is the sole source of outbound msg ids.
#[derive(Debug, Clone)]
pub struct NodeState {
    node_id: Option<String>,
    next_msg_id: u64,
}

impl NodeState {
    pub fn new() -> Self {
        Self {
            node_id: None,
            next_msg_id: 1,
        }
    }

    /// Set the node's identity.
    ///
    /// The protocol guarantees exactly one `init` per process; a repeated
    /// call overwrites the identity.
    pub fn initialize(&mut self, node_id: String) {
        if let Some(existing) = &self.node_id {
            if *existing != node_id {
                tracing::warn!("Node re-initialized: {} -> {}", existing, node_id);
            }
        }
        self.node_id = Some(node_id);
    }

    pub fn is_initialized(&self) -> bool {
        self.node_id.is_some()
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Return the current outbound msg id and advance the counter.
    ///
    /// Called exactly once per constructed reply; ids are strictly
    /// increasing and never reused.
    pub fn next_msg_id(&mut self) -> u64 {
        let msg_id = self.next_msg_id;
        self.next_msg_id += 1;
        msg_id
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}
