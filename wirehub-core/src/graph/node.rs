//! Graph Nodes
//!
//! This module defines the hubs that live in the wiring graph. A hub is an
//! addressable point that can be activated and can receive signals.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use super::edge::EdgeId;
use crate::geometry::{self, Transform};
use crate::signal::ActionSink;

/// Unique identifier for a hub in the wiring graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A hub in the wiring graph.
///
/// The hub owns the list of edges it participates in and the ordered list of
/// actions it runs when it receives a signal. It does not own its neighbours;
/// those are only reachable through the edges' endpoint handles.
pub struct Hub {
    /// Unique identifier for this hub.
    id: NodeId,

    /// Edges incident to this hub, in connection order.
    edges: SmallVec<[EdgeId; 4]>,

    /// Whether the hub already ran its actions during the current tick.
    signaled: bool,

    /// Actions run, in order, when the hub receives a signal.
    actions: Vec<ActionSink>,

    /// Local-space anchor points for rendered wires.
    connector_offsets: SmallVec<[Vec3; 2]>,

    /// World placement of the hub.
    transform: Transform,
}

impl Hub {
    pub(crate) fn from_builder(builder: HubBuilder) -> Self {
        Self {
            id: NodeId::new(),
            edges: SmallVec::new(),
            signaled: false,
            actions: builder.actions,
            connector_offsets: builder.connector_offsets,
            transform: builder.transform,
        }
    }

    /// Get the hub's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Edges incident to this hub, in connection order.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Whether the hub already received a signal this tick.
    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    /// The actions run when this hub receives a signal.
    pub fn actions(&self) -> &[ActionSink] {
        &self.actions
    }

    pub fn connector_offsets(&self) -> &[Vec3] {
        &self.connector_offsets
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// World position of the connector closest to `origin`.
    ///
    /// Falls back to the hub's own position when it has no connectors.
    pub fn closest_connector(&self, origin: Vec3) -> Vec3 {
        geometry::closest_connector(&self.transform, &self.connector_offsets, origin)
    }

    pub(crate) fn attach_edge(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    /// Remove an edge from this hub. Returns whether it was present.
    pub(crate) fn detach_edge(&mut self, edge: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| *e != edge);
        self.edges.len() != before
    }

    pub(crate) fn reset_signal(&mut self) {
        self.signaled = false;
    }

    /// Mark the hub signaled, returning `false` if it already was.
    pub(crate) fn try_signal(&mut self) -> bool {
        !std::mem::replace(&mut self.signaled, true)
    }

    pub(crate) fn push_action(&mut self, action: ActionSink) {
        self.actions.push(action);
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("id", &self.id)
            .field("edges", &self.edges)
            .field("signaled", &self.signaled)
            .field("action_count", &self.actions.len())
            .field("connector_offsets", &self.connector_offsets)
            .field("transform", &self.transform)
            .finish()
    }
}

/// Describes a hub before it is registered with a graph.
///
/// # Example
///
/// ```rust,ignore
/// let door = network.add_hub(
///     HubBuilder::new()
///         .at(Vec3::new(4.0, 0.0, 2.0))
///         .connector(Vec3::new(0.0, 1.0, 0.0))
///         .action(action(|| println!("door opened"))),
/// );
/// ```
#[derive(Default)]
pub struct HubBuilder {
    transform: Transform,
    connector_offsets: SmallVec<[Vec3; 2]>,
    actions: Vec<ActionSink>,
}

impl HubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the hub at a world position.
    pub fn at(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Add a local-space connector offset.
    pub fn connector(mut self, offset: Vec3) -> Self {
        self.connector_offsets.push(offset);
        self
    }

    /// Append an action run when the hub receives a signal.
    pub fn action(mut self, action: ActionSink) -> Self {
        self.actions.push(action);
        self
    }
}
