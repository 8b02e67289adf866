use std::collections::HashMap;

use super::model::{LinkId, NodeId};

/// Separates the URI from the per-URI index in node ids. IRIs never contain
/// a space, so ids of different URIs cannot collide.
pub const NODE_ID_SEPARATOR: char = ' ';

/// Node id of the `index`-th instance of `uri`.
#[must_use]
pub fn node_id(uri: &str, index: u64) -> NodeId {
    NodeId::new(format!("{uri}{NODE_ID_SEPARATOR}{index}"))
}

/// Hands out node ids of the form `<uri> <n>`, counting from 1 per URI.
#[derive(Clone, Debug, Default)]
pub struct NodeIdFactory {
    counters: HashMap<String, u64>,
}

impl NodeIdFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id for `uri`.
    pub fn next_id(&mut self, uri: &str) -> NodeId {
        let counter = self.counters.entry(uri.to_string()).or_insert(0);
        *counter += 1;
        node_id(uri, *counter)
    }

    /// Registers an id produced elsewhere so later ids for the same URI do not
    /// collide with it.
    ///
    /// Ids that do not follow the `<uri> <n>` pattern are ignored.
    pub fn observe(&mut self, uri: &str, id: &NodeId) {
        let Some(suffix) = id
            .as_str()
            .strip_prefix(uri)
            .and_then(|rest| rest.strip_prefix(NODE_ID_SEPARATOR))
        else {
            return;
        };
        let Ok(index) = suffix.parse::<u64>() else {
            return;
        };
        let counter = self.counters.entry(uri.to_string()).or_insert(0);
        *counter = (*counter).max(index);
    }

    /// Last index handed out (or observed) for `uri`.
    #[must_use]
    pub fn last_index(&self, uri: &str) -> u64 {
        self.counters.get(uri).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Deterministic link id: the same relation between the same endpoints always
/// yields the same id.
#[must_use]
pub fn link_id(relation: &str, source: &NodeId, target: &NodeId) -> LinkId {
    LinkId::new(format!("{source}---{relation}---{target}"))
}
