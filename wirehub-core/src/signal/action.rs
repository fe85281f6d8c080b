//! Action sinks.
//!
//! An action is whatever a hub does when it receives a signal: apply a force,
//! spawn an object, toggle a component. The graph only needs to be able to
//! run it, so every behaviour is reduced to the [`Activatable`] capability.

use std::fmt;
use std::sync::Arc;

use super::network::WeakNetwork;
use crate::graph::NodeId;

/// Something that can be triggered with no arguments.
pub trait Activatable: Send + Sync {
    fn activate(&self);
}

impl<F> Activatable for F
where
    F: Fn() + Send + Sync,
{
    fn activate(&self) {
        self()
    }
}

/// A shared handle to an action bound to a hub.
pub type ActionSink = Arc<dyn Activatable>;

/// Wrap a closure as an action sink.
pub fn action<F>(f: F) -> ActionSink
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Activates a fixed hub on a network.
///
/// Holds the network weakly, so binding an activator as one of the network's
/// own actions does not keep the network alive. Activating after the network
/// has been dropped does nothing.
#[derive(Clone)]
pub struct Activator {
    network: WeakNetwork,
    node: NodeId,
}

impl Activator {
    pub(crate) fn new(network: WeakNetwork, node: NodeId) -> Self {
        Self { network, node }
    }

    /// The hub this activator triggers.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Activatable for Activator {
    fn activate(&self) {
        if let Some(network) = self.network.upgrade() {
            network.activate(self.node);
        }
    }
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator").field("node", &self.node).finish()
    }
}
