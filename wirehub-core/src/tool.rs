//! Wiring Tool
//!
//! The two-step interaction a player uses to lay a wire: pick a first hub,
//! then pick a second one. Picking the same hub twice cancels the selection.
//! Finding the hub under the crosshair is left to the host.

use tracing::debug;

use crate::error::WireError;
use crate::graph::{Connection, NodeId};
use crate::signal::WireNetwork;

/// Result of a single selection.
#[derive(Debug, PartialEq)]
pub enum Selection {
    /// The first hub was picked; waiting for the second.
    First(NodeId),

    /// The same hub was picked twice and the selection was dropped.
    Cleared,

    /// Both hubs were picked and wired together.
    Connected(Connection),

    /// The selection could not be used. Any pending first pick is kept.
    Failed(WireError),
}

/// Two-step wire placement state.
#[derive(Debug, Default, Clone)]
pub struct WiringTool {
    pending: Option<NodeId>,
}

impl WiringTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first hub picked, if a selection is in progress.
    pub fn pending(&self) -> Option<NodeId> {
        self.pending
    }

    /// Pick a hub.
    pub fn select(&mut self, network: &WireNetwork, node: NodeId) -> Selection {
        if !network.contains(node) {
            return Selection::Failed(WireError::UnknownNode(node));
        }

        let Some(first) = self.pending else {
            debug!(node = ?node, "first hub selected");
            self.pending = Some(node);
            return Selection::First(node);
        };

        if first == node {
            self.clear();
            return Selection::Cleared;
        }

        match network.connect(first, node) {
            Ok(connection) => {
                self.clear();
                Selection::Connected(connection)
            }
            Err(err) => Selection::Failed(err),
        }
    }

    /// Drop any in-progress selection.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
