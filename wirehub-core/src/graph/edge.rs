//! Graph Edges
//!
//! An edge is an undirected wire between exactly two hubs. The edge itself only
//! knows its two endpoints; membership in the graph is recorded on both hubs.

use std::sync::atomic::{AtomicU64, Ordering};

use super::node::NodeId;

/// Unique identifier for an edge.
///
/// Edge IDs are never reused, so a handle to a removed edge can never alias a
/// newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u64);

impl EdgeId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Lifecycle of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    /// Registered on both endpoints and traversed by activation.
    Active,

    /// Disconnected, or rejected as a duplicate. Never traversed.
    Removed,
}

/// An undirected wire between two hubs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    id: EdgeId,
    a: Option<NodeId>,
    b: Option<NodeId>,
}

impl Edge {
    pub(crate) fn new(a: NodeId, b: NodeId) -> Self {
        Self {
            id: EdgeId::new(),
            a: Some(a),
            b: Some(b),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Both endpoints, or `None` once the edge has been invalidated.
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        self.a.zip(self.b)
    }

    /// The hub on the other end of this edge from `node`.
    ///
    /// Returns `None` if `node` is not an endpoint or the edge was invalidated.
    pub fn other_endpoint(&self, node: NodeId) -> Option<NodeId> {
        if self.a == Some(node) {
            self.b
        } else if self.b == Some(node) {
            self.a
        } else {
            None
        }
    }

    /// Whether both edges join the same unordered pair of hubs.
    pub fn same_connection(&self, other: &Edge) -> bool {
        match (self.endpoints(), other.endpoints()) {
            (Some((a1, b1)), Some((a2, b2))) => (a1 == a2 && b1 == b2) || (a1 == b2 && b1 == a2),
            _ => false,
        }
    }

    pub fn state(&self) -> EdgeState {
        if self.endpoints().is_some() {
            EdgeState::Active
        } else {
            EdgeState::Removed
        }
    }

    /// Clear both endpoints so the edge can never be traversed again.
    pub(crate) fn invalidate(&mut self) {
        self.a = None;
        self.b = None;
    }
}
