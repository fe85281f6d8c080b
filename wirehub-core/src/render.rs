//! Render Collaborator
//!
//! Drawing wires is the host's job. The network tells the host when a wire
//! appears or disappears, so it can create or release whatever per-wire
//! resource it draws with, and hands it a resolved path once per wire each
//! time [`WireNetwork::render_wires`](crate::signal::WireNetwork::render_wires)
//! runs.

use glam::Vec3;

use crate::graph::{EdgeId, NodeId};

/// A wire resolved to world space, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct WireSegment {
    pub edge: EdgeId,

    /// Anchor on the first endpoint.
    pub from: Vec3,

    /// Anchor on the second endpoint.
    pub to: Vec3,

    /// Points along the sagging wire curve, `from` first and `to` last.
    pub path: Vec<Vec3>,
}

/// Receives wire lifecycle and drawing events.
///
/// Every method defaults to doing nothing. Callbacks run with the graph
/// unlocked and may query the network.
pub trait RenderSink: Send + Sync {
    /// A wire was connected between `a` and `b`.
    fn edge_active(&self, _edge: EdgeId, _a: NodeId, _b: NodeId) {}

    /// A wire was disconnected; release anything held for it.
    fn edge_removed(&self, _edge: EdgeId) {}

    fn draw_wire(&self, _segment: &WireSegment) {}
}
