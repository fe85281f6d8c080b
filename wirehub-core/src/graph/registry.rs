//! Connection Registry
//!
//! The registry is the flat store that owns every hub and every active edge.
//! All structural changes go through it, so the graph invariants are
//! maintained in one place:
//!
//! 1. No edge joins a hub to itself.
//! 2. At most one active edge exists per unordered pair of hubs.
//! 3. An active edge is listed on both of its endpoints, or on neither.
//!
//! Hubs and edges refer to each other only through IDs. A cycle in the wiring
//! is therefore just a set of ID pairs, and removing an edge is dropping its
//! entry and scrubbing both endpoint lists.

use indexmap::IndexMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use super::edge::{Edge, EdgeId, EdgeState};
use super::node::{Hub, HubBuilder, NodeId};
use crate::error::WireError;
use crate::geometry::Transform;
use crate::signal::ActionSink;

/// Outcome of a successful connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// A new edge was registered on both hubs.
    Created(EdgeId),

    /// The hubs were already wired. The speculatively built edge `rejected`
    /// was invalidated and `edge` is the wire that already existed.
    Existing { edge: EdgeId, rejected: EdgeId },
}

impl Connection {
    /// The active edge joining the requested pair.
    pub fn edge(&self) -> EdgeId {
        match *self {
            Connection::Created(edge) => edge,
            Connection::Existing { edge, .. } => edge,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Connection::Created(_))
    }
}

/// A broken graph invariant, as reported by [`Registry::check_invariants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("edge {0:?} joins a hub to itself")]
    SelfEdge(EdgeId),

    #[error("edge {0:?} was invalidated but is still stored")]
    Invalidated(EdgeId),

    #[error("edges {0:?} and {1:?} join the same pair of hubs")]
    DuplicatePair(EdgeId, EdgeId),

    #[error("edge {edge:?} is missing from the incident list of {node:?}")]
    Asymmetric { edge: EdgeId, node: NodeId },

    #[error("edge {edge:?} references unregistered hub {node:?}")]
    Dangling { edge: EdgeId, node: NodeId },

    #[error("hub {node:?} lists edge {edge:?} more than once")]
    RepeatedIncident { edge: EdgeId, node: NodeId },

    #[error("hub {node:?} lists edge {edge:?} which is not active")]
    StaleIncident { edge: EdgeId, node: NodeId },
}

/// Store of hubs and edges.
#[derive(Debug, Default)]
pub struct Registry {
    /// All hubs, in registration order.
    hubs: IndexMap<NodeId, Hub>,

    /// All active edges, in creation order.
    edges: IndexMap<EdgeId, Edge>,

    /// Number of tick boundaries seen so far.
    tick: u64,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hub and return its ID.
    pub fn add_hub(&mut self, builder: HubBuilder) -> NodeId {
        let hub = Hub::from_builder(builder);
        let id = hub.id();
        self.hubs.insert(id, hub);
        id
    }

    /// Remove a hub from the graph.
    ///
    /// Every incident edge is disconnected first, so no neighbour is left
    /// holding a one-sided registration. Returns the removed edges.
    pub fn remove_hub(&mut self, node: NodeId) -> Result<Vec<EdgeId>, WireError> {
        let incident: SmallVec<[EdgeId; 4]> = self
            .hubs
            .get(&node)
            .ok_or(WireError::UnknownNode(node))?
            .edges()
            .iter()
            .copied()
            .collect();

        let removed = incident
            .into_iter()
            .filter(|&edge| self.disconnect(edge))
            .collect();

        self.hubs.shift_remove(&node);
        debug!(node = ?node, "hub removed");
        Ok(removed)
    }

    pub fn hub(&self, node: NodeId) -> Option<&Hub> {
        self.hubs.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.hubs.contains_key(&node)
    }

    pub fn hubs(&self) -> impl Iterator<Item = &Hub> {
        self.hubs.values()
    }

    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge)
    }

    /// All active edges, in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Lifecycle of an edge. Unknown handles are reported as removed.
    pub fn edge_state(&self, edge: EdgeId) -> EdgeState {
        self.edges
            .get(&edge)
            .map_or(EdgeState::Removed, Edge::state)
    }

    /// The hub on the other end of `edge` from `node`, if the edge is active.
    pub fn other_endpoint(&self, edge: EdgeId, node: NodeId) -> Option<NodeId> {
        self.edges.get(&edge)?.other_endpoint(node)
    }

    /// Wire two hubs together.
    ///
    /// Connecting a pair that is already wired is idempotent: the existing
    /// edge is returned and the freshly built duplicate is invalidated.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<Connection, WireError> {
        if a == b {
            return Err(WireError::SelfConnection(a));
        }
        for node in [a, b] {
            if !self.hubs.contains_key(&node) {
                return Err(WireError::UnknownNode(node));
            }
        }

        let mut edge = Edge::new(a, b);

        if let Some(existing) = self.find_edge(a, b) {
            edge.invalidate();
            debug!(edge = ?existing, rejected = ?edge.id(), "duplicate wire rejected");
            return Ok(Connection::Existing {
                edge: existing,
                rejected: edge.id(),
            });
        }

        let id = edge.id();
        for node in [a, b] {
            if let Some(hub) = self.hubs.get_mut(&node) {
                hub.attach_edge(id);
            }
        }
        self.edges.insert(id, edge);

        debug!(edge = ?id, a = ?a, b = ?b, "hubs connected");
        Ok(Connection::Created(id))
    }

    /// Remove an edge from both of its endpoints.
    ///
    /// Returns `false` if the edge is not active.
    pub fn disconnect(&mut self, edge: EdgeId) -> bool {
        let Some(mut removed) = self.edges.shift_remove(&edge) else {
            return false;
        };

        if let Some((a, b)) = removed.endpoints() {
            for node in [a, b] {
                if let Some(hub) = self.hubs.get_mut(&node) {
                    hub.detach_edge(edge);
                }
            }
        }
        removed.invalidate();

        debug!(edge = ?edge, "wire disconnected");
        true
    }

    /// Remove the edge joining `a` and `b`, in either orientation.
    ///
    /// Returns the removed edge, or `None` if the pair was not wired.
    pub fn disconnect_pair(&mut self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        let edge = self.find_edge(a, b)?;
        self.disconnect(edge).then_some(edge)
    }

    /// Find the active edge joining `a` and `b`.
    ///
    /// Scans the shorter of the two incident lists.
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a == b {
            return None;
        }
        let hub_a = self.hubs.get(&a)?;
        let hub_b = self.hubs.get(&b)?;
        let (from, to) = if hub_a.edges().len() <= hub_b.edges().len() {
            (hub_a, b)
        } else {
            (hub_b, a)
        };

        from.edges()
            .iter()
            .copied()
            .find(|&edge| self.other_endpoint(edge, from.id()) == Some(to))
    }

    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.find_edge(a, b).is_some()
    }

    /// Hubs reachable over one edge from `node`, in edge registration order.
    ///
    /// Edges whose far end is missing are skipped.
    pub fn neighbors(&self, node: NodeId) -> SmallVec<[NodeId; 4]> {
        let Some(hub) = self.hubs.get(&node) else {
            return SmallVec::new();
        };

        hub.edges()
            .iter()
            .filter_map(|&edge| {
                let other = self.other_endpoint(edge, node);
                if other.is_none() {
                    debug!(node = ?node, edge = ?edge, "skipping broken wire");
                }
                other
            })
            .filter(|other| {
                let present = self.hubs.contains_key(other);
                if !present {
                    debug!(node = ?node, other = ?other, "skipping wire to missing hub");
                }
                present
            })
            .collect()
    }

    /// Claim the signal for `node` this tick.
    ///
    /// Returns the hub's actions if it had not been signaled yet, marking it
    /// signaled. Returns `None` for an already-signaled or unknown hub.
    pub fn claim_signal(&mut self, node: NodeId) -> Option<SmallVec<[ActionSink; 4]>> {
        let hub = self.hubs.get_mut(&node)?;
        if !hub.try_signal() {
            return None;
        }
        Some(hub.actions().iter().cloned().collect())
    }

    pub fn is_signaled(&self, node: NodeId) -> bool {
        self.hubs.get(&node).is_some_and(Hub::is_signaled)
    }

    /// Clear every hub's signaled flag and advance the tick counter.
    pub fn begin_tick(&mut self) -> u64 {
        for hub in self.hubs.values_mut() {
            hub.reset_signal();
        }
        self.tick += 1;
        self.tick
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn push_action(&mut self, node: NodeId, action: ActionSink) -> Result<(), WireError> {
        self.hubs
            .get_mut(&node)
            .ok_or(WireError::UnknownNode(node))?
            .push_action(action);
        Ok(())
    }

    pub fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), WireError> {
        self.hubs
            .get_mut(&node)
            .ok_or(WireError::UnknownNode(node))?
            .set_transform(transform);
        Ok(())
    }

    /// Verify the structural invariants of the graph.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (i, edge) in self.edges.values().enumerate() {
            let (a, b) = edge
                .endpoints()
                .ok_or(InvariantViolation::Invalidated(edge.id()))?;
            if a == b {
                return Err(InvariantViolation::SelfEdge(edge.id()));
            }
            for node in [a, b] {
                let hub = self
                    .hubs
                    .get(&node)
                    .ok_or(InvariantViolation::Dangling { edge: edge.id(), node })?;
                if !hub.edges().contains(&edge.id()) {
                    return Err(InvariantViolation::Asymmetric { edge: edge.id(), node });
                }
            }
            if let Some(dup) = self.edges.values().skip(i + 1).find(|e| e.same_connection(edge)) {
                return Err(InvariantViolation::DuplicatePair(edge.id(), dup.id()));
            }
        }

        for hub in self.hubs.values() {
            for (i, &edge) in hub.edges().iter().enumerate() {
                if hub.edges()[..i].contains(&edge) {
                    return Err(InvariantViolation::RepeatedIncident { edge, node: hub.id() });
                }
                if self.other_endpoint(edge, hub.id()).is_none() {
                    return Err(InvariantViolation::StaleIncident { edge, node: hub.id() });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_hubs<const N: usize>() -> (Registry, [NodeId; N]) {
        let mut registry = Registry::new();
        let ids = std::array::from_fn(|_| registry.add_hub(HubBuilder::new()));
        (registry, ids)
    }

    #[test]
    fn connect_registers_on_both_hubs() {
        let (mut registry, [a, b]) = registry_with_hubs();

        let edge = registry.connect(a, b).unwrap().edge();

        assert_eq!(registry.hub(a).unwrap().edges(), &[edge]);
        assert_eq!(registry.hub(b).unwrap().edges(), &[edge]);
        assert_eq!(registry.edge_state(edge), EdgeState::Active);
        assert!(registry.is_connected(a, b));
        assert!(registry.is_connected(b, a));
        assert_eq!(registry.check_invariants(), Ok(()));
    }

    #[test]
    fn connect_rejects_self_edges() {
        let (mut registry, [a]) = registry_with_hubs();

        let err = registry.connect(a, a).unwrap_err();

        assert_eq!(err, WireError::SelfConnection(a));
        assert!(registry.hub(a).unwrap().edges().is_empty());
        assert_eq!(registry.edge_count(), 0);
    }

    #[test]
    fn connect_rejects_unknown_hubs() {
        let (mut registry, [a]) = registry_with_hubs();
        let ghost = NodeId::from(u64::MAX);

        assert_eq!(registry.connect(a, ghost), Err(WireError::UnknownNode(ghost)));
        assert!(registry.hub(a).unwrap().edges().is_empty());
    }

    #[test]
    fn duplicate_connect_returns_existing_edge() {
        let (mut registry, [a, b]) = registry_with_hubs();

        let first = registry.connect(a, b).unwrap();
        let second = registry.connect(b, a).unwrap();

        assert!(first.is_created());
        let Connection::Existing { edge, rejected } = second else {
            panic!("expected duplicate to be rejected, got {second:?}");
        };
        assert_eq!(edge, first.edge());
        assert_ne!(rejected, edge);
        assert_eq!(registry.edge_state(rejected), EdgeState::Removed);
        assert_eq!(registry.other_endpoint(rejected, a), None);
        assert_eq!(registry.other_endpoint(rejected, b), None);
        assert_eq!(registry.edge_count(), 1);
        assert_eq!(registry.hub(a).unwrap().edges().len(), 1);
        assert_eq!(registry.check_invariants(), Ok(()));
    }

    #[test]
    fn disconnect_removes_from_both_hubs() {
        let (mut registry, [a, b, c]) = registry_with_hubs();
        let ab = registry.connect(a, b).unwrap().edge();
        let bc = registry.connect(b, c).unwrap().edge();

        assert!(registry.disconnect(ab));

        assert!(registry.hub(a).unwrap().edges().is_empty());
        assert_eq!(registry.hub(b).unwrap().edges(), &[bc]);
        assert_eq!(registry.edge_state(ab), EdgeState::Removed);
        assert!(!registry.is_connected(a, b));
        assert_eq!(registry.check_invariants(), Ok(()));

        // Nothing left to remove
        assert!(!registry.disconnect(ab));
    }

    #[test]
    fn disconnect_pair_matches_either_orientation() {
        let (mut registry, [a, b]) = registry_with_hubs();
        let edge = registry.connect(a, b).unwrap().edge();

        assert_eq!(registry.disconnect_pair(b, a), Some(edge));
        assert_eq!(registry.disconnect_pair(a, b), None);
        assert_eq!(registry.edge_count(), 0);
    }

    #[test]
    fn reconnect_after_disconnect_creates_fresh_edge() {
        let (mut registry, [a, b]) = registry_with_hubs();
        let old = registry.connect(a, b).unwrap().edge();
        registry.disconnect(old);

        let new = registry.connect(a, b).unwrap();

        assert!(new.is_created());
        assert_ne!(new.edge(), old);
        assert_eq!(registry.edge_state(old), EdgeState::Removed);
    }

    #[test]
    fn neighbors_follow_registration_order() {
        let (mut registry, [hub, x, y, z]) = registry_with_hubs();
        registry.connect(hub, y).unwrap();
        registry.connect(z, hub).unwrap();
        registry.connect(hub, x).unwrap();

        assert_eq!(registry.neighbors(hub).as_slice(), &[y, z, x]);
    }

    #[test]
    fn neighbors_skip_hubs_destroyed_behind_our_back() {
        let (mut registry, [a, b, c]) = registry_with_hubs();
        registry.connect(a, b).unwrap();
        registry.connect(a, c).unwrap();

        // Simulate a host destroying `b` without disconnecting it
        registry.hubs.shift_remove(&b);

        assert_eq!(registry.neighbors(a).as_slice(), &[c]);
        assert!(matches!(
            registry.check_invariants(),
            Err(InvariantViolation::Dangling { node, .. }) if node == b
        ));
    }

    #[test]
    fn remove_hub_disconnects_everything() {
        let (mut registry, [a, b, c]) = registry_with_hubs();
        let ab = registry.connect(a, b).unwrap().edge();
        let ac = registry.connect(a, c).unwrap().edge();
        let bc = registry.connect(b, c).unwrap().edge();

        let removed = registry.remove_hub(a).unwrap();

        assert_eq!(removed, vec![ab, ac]);
        assert!(!registry.contains(a));
        assert_eq!(registry.hub(b).unwrap().edges(), &[bc]);
        assert_eq!(registry.hub(c).unwrap().edges(), &[bc]);
        assert_eq!(registry.check_invariants(), Ok(()));
        assert_eq!(registry.remove_hub(a), Err(WireError::UnknownNode(a)));
    }

    #[test]
    fn claim_signal_once_per_tick() {
        let (mut registry, [a]) = registry_with_hubs();

        assert!(registry.claim_signal(a).is_some());
        assert!(registry.claim_signal(a).is_none());
        assert!(registry.is_signaled(a));

        assert_eq!(registry.begin_tick(), 1);
        assert!(!registry.is_signaled(a));
        assert!(registry.claim_signal(a).is_some());
    }

    #[test]
    fn invariant_check_catches_asymmetry() {
        let (mut registry, [a, b]) = registry_with_hubs();
        let edge = registry.connect(a, b).unwrap().edge();

        registry.hubs.get_mut(&b).unwrap().detach_edge(edge);

        assert_eq!(
            registry.check_invariants(),
            Err(InvariantViolation::Asymmetric { edge, node: b })
        );
    }

    #[test]
    fn invariant_check_catches_repeated_incident() {
        let (mut registry, [a, b]) = registry_with_hubs();
        let edge = registry.connect(a, b).unwrap().edge();

        registry.hubs.get_mut(&a).unwrap().attach_edge(edge);

        assert_eq!(
            registry.check_invariants(),
            Err(InvariantViolation::RepeatedIncident { edge, node: a })
        );
    }
}
