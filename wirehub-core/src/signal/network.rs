//! Wire Network
//!
//! The network is the handle hosts hold on to. It owns the registry, the
//! render collaborator, and exposes every graph
//! operation through `&self` so that actions can call back into it.
//!
//! # How Activation Works
//!
//! 1. `activate(node)` snapshots the hubs on the other ends of the node's
//!    wires, in connection order, then releases the lock.
//!
//! 2. Each of those hubs receives the signal. Receiving claims the hub's
//!    signal for this tick under the write lock and copies out its actions.
//!
//! 3. The lock is released and the actions run in order. An action may
//!    activate any hub, including ones already on the call stack; those that
//!    already fired this tick ignore the signal, so recursion ends.
//!
//! # Thread Safety
//!
//! The graph is meant to be driven from the single thread running the host's
//! update loop. The lock exists so the handle can be shared with actions and
//! moved to that thread. Propagation depth is tracked per thread, so a cascade
//! on one thread never blocks wiring changes made from another.

use std::fmt;
use std::sync::{Arc, Weak};

use glam::Vec3;
use parking_lot::RwLock;
use tracing::{trace, warn};

use super::action::{ActionSink, Activator};
use super::propagation::{NetworkId, PropagationGuard};
use crate::config::NetworkConfig;
use crate::error::WireError;
use crate::geometry::{Transform, WireCurve};
use crate::graph::{Connection, Edge, EdgeId, EdgeState, HubBuilder, NodeId, Registry};
use crate::render::{RenderSink, WireSegment};

struct Shared {
    registry: RwLock<Registry>,
    config: NetworkConfig,
    render: Option<Arc<dyn RenderSink>>,
    id: NetworkId,
}

/// Shared handle to a wiring graph.
///
/// Cloning the handle is cheap; all clones see the same graph.
///
/// # Example
///
/// ```rust,ignore
/// let network = WireNetwork::new();
/// let button = network.add_hub(HubBuilder::new());
/// let lamp = network.add_hub(HubBuilder::new().action(action(|| println!("on"))));
///
/// network.connect(button, lamp)?;
///
/// network.begin_tick()?;
/// network.activate(button); // prints "on"
/// ```
#[derive(Clone)]
pub struct WireNetwork {
    shared: Arc<Shared>,
}

/// A non-owning handle to a [`WireNetwork`].
#[derive(Clone)]
pub struct WeakNetwork {
    shared: Weak<Shared>,
}

impl WeakNetwork {
    pub fn upgrade(&self) -> Option<WireNetwork> {
        self.shared.upgrade().map(|shared| WireNetwork { shared })
    }
}

impl WireNetwork {
    /// Create an empty network with the default configuration.
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a network that reports wire lifecycle and drawing to `render`.
    pub fn with_render_sink(config: NetworkConfig, render: Arc<dyn RenderSink>) -> Self {
        Self::build(config, Some(render))
    }

    fn build(config: NetworkConfig, render: Option<Arc<dyn RenderSink>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: RwLock::new(Registry::new()),
                config,
                render,
                id: NetworkId::new(),
            }),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.shared.config
    }

    pub fn downgrade(&self) -> WeakNetwork {
        WeakNetwork {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// An action that activates `node` on this network.
    pub fn activator(&self, node: NodeId) -> Activator {
        Activator::new(self.downgrade(), node)
    }

    /// Run a read-only query against the registry.
    ///
    /// The closure must not call back into the network.
    pub fn read<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.shared.registry.read())
    }

    /// Whether an activation is currently on this thread's call stack.
    pub fn is_propagating(&self) -> bool {
        PropagationGuard::depth(self.shared.id) > 0
    }

    // ------------------------------------------------------------------------
    // Hubs
    // ------------------------------------------------------------------------

    /// Register a new hub.
    ///
    /// Allowed during propagation, so actions can spawn wired objects.
    pub fn add_hub(&self, builder: HubBuilder) -> NodeId {
        self.shared.registry.write().add_hub(builder)
    }

    /// Disconnect every wire on `node` and remove it from the graph.
    pub fn remove_hub(&self, node: NodeId) -> Result<(), WireError> {
        self.check_mutation()?;
        let removed = self.shared.registry.write().remove_hub(node)?;
        for edge in removed {
            self.notify_removed(edge);
        }
        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.shared.registry.read().contains(node)
    }

    pub fn hub_count(&self) -> usize {
        self.shared.registry.read().hub_count()
    }

    pub fn set_transform(&self, node: NodeId, transform: Transform) -> Result<(), WireError> {
        self.shared.registry.write().set_transform(node, transform)
    }

    /// Append an action to a hub's receive list.
    pub fn push_action(&self, node: NodeId, action: ActionSink) -> Result<(), WireError> {
        self.shared.registry.write().push_action(node, action)
    }

    // ------------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------------

    /// Wire two hubs together. See [`Registry::connect`].
    pub fn connect(&self, a: NodeId, b: NodeId) -> Result<Connection, WireError> {
        self.check_mutation()?;
        let connection = self.shared.registry.write().connect(a, b)?;

        if let (Connection::Created(edge), Some(render)) = (connection, &self.shared.render) {
            render.edge_active(edge, a, b);
        }
        Ok(connection)
    }

    /// Remove a wire from both of its hubs.
    ///
    /// Returns `false` if the wire is not active, or if the request was refused
    /// because a signal is propagating.
    pub fn disconnect(&self, edge: EdgeId) -> bool {
        if self.check_mutation().is_err() {
            return false;
        }
        let removed = self.shared.registry.write().disconnect(edge);
        if removed {
            self.notify_removed(edge);
        }
        removed
    }

    /// Remove the wire joining `a` and `b`, if any.
    pub fn disconnect_pair(&self, a: NodeId, b: NodeId) -> bool {
        if self.check_mutation().is_err() {
            return false;
        }
        let removed = self.shared.registry.write().disconnect_pair(a, b);
        match removed {
            Some(edge) => {
                self.notify_removed(edge);
                true
            }
            None => false,
        }
    }

    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.shared.registry.read().is_connected(a, b)
    }

    pub fn edge_state(&self, edge: EdgeId) -> EdgeState {
        self.shared.registry.read().edge_state(edge)
    }

    pub fn other_endpoint(&self, edge: EdgeId, node: NodeId) -> Option<NodeId> {
        self.shared.registry.read().other_endpoint(edge, node)
    }

    /// Wires on `node`, in connection order. Empty for unknown hubs.
    pub fn incident_edges(&self, node: NodeId) -> Vec<EdgeId> {
        self.shared
            .registry
            .read()
            .hub(node)
            .map(|hub| hub.edges().to_vec())
            .unwrap_or_default()
    }

    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.shared.registry.read().neighbors(node).into_vec()
    }

    /// A copy of an active edge, or `None` once it has been removed.
    pub fn edge(&self, edge: EdgeId) -> Option<Edge> {
        self.shared.registry.read().edge(edge).cloned()
    }

    pub fn edge_count(&self) -> usize {
        self.shared.registry.read().edge_count()
    }

    // ------------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------------

    /// Send a signal across every wire on `node`.
    ///
    /// Unknown hubs and broken wires are skipped.
    pub fn activate(&self, node: NodeId) {
        let _guard = PropagationGuard::enter(self.shared.id);
        let targets = self.shared.registry.read().neighbors(node);

        trace!(node = ?node, targets = targets.len(), "hub activated");

        for target in targets {
            self.receive_signal(target);
        }
    }

    /// Deliver a signal to `node`, running its actions if it has not fired
    /// yet this tick.
    pub fn receive_signal(&self, node: NodeId) {
        let _guard = PropagationGuard::enter(self.shared.id);

        // Claim under the lock, run with it released
        let Some(actions) = self.shared.registry.write().claim_signal(node) else {
            trace!(node = ?node, "signal ignored");
            return;
        };

        trace!(node = ?node, actions = actions.len(), "hub received signal");

        for action in actions {
            action.activate();
        }
    }

    pub fn is_signaled(&self, node: NodeId) -> bool {
        self.shared.registry.read().is_signaled(node)
    }

    /// Start a new tick: every hub may receive a signal again.
    ///
    /// Returns the new tick number. Refused while a signal is propagating,
    /// since re-arming hubs mid-cascade would let a cycle run forever.
    pub fn begin_tick(&self) -> Result<u64, WireError> {
        if self.is_propagating() {
            warn!("tick boundary requested during propagation");
            return Err(WireError::MutationDuringPropagation);
        }
        Ok(self.shared.registry.write().begin_tick())
    }

    pub fn tick(&self) -> u64 {
        self.shared.registry.read().tick()
    }

    // ------------------------------------------------------------------------
    // Geometry and rendering
    // ------------------------------------------------------------------------

    /// World position of the connector on `node` closest to `origin`.
    pub fn closest_connector(&self, node: NodeId, origin: Vec3) -> Option<Vec3> {
        self.shared
            .registry
            .read()
            .hub(node)
            .map(|hub| hub.closest_connector(origin))
    }

    /// Resolve the drawing path of every active wire and hand it to the
    /// render sink. Each wire is visited exactly once.
    pub fn render_wires(&self) -> Vec<WireSegment> {
        let config = &self.shared.config;

        let segments: Vec<WireSegment> = {
            let registry = self.shared.registry.read();
            registry
                .edges()
                .filter_map(|edge| {
                    let (a, b) = edge.endpoints()?;
                    let hub_a = registry.hub(a)?;
                    let hub_b = registry.hub(b)?;

                    let from = hub_a.closest_connector(hub_b.transform().translation);
                    let to = hub_b.closest_connector(from);
                    let path = WireCurve::with_slack(from, to, config.wire_slack)
                        .sample(config.curve_segments);

                    Some(WireSegment {
                        edge: edge.id(),
                        from,
                        to,
                        path,
                    })
                })
                .collect()
        };

        if let Some(render) = &self.shared.render {
            for segment in &segments {
                render.draw_wire(segment);
            }
        }
        segments
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn check_mutation(&self) -> Result<(), WireError> {
        if !self.is_propagating() {
            return Ok(());
        }
        if self.shared.config.guard_mutation_during_propagation {
            warn!("graph mutation refused during propagation");
            Err(WireError::MutationDuringPropagation)
        } else {
            warn!("graph mutated during propagation");
            Ok(())
        }
    }

    fn notify_removed(&self, edge: EdgeId) {
        if let Some(render) = &self.shared.render {
            render.edge_removed(edge);
        }
    }
}

impl Default for WireNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WireNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.registry.read();
        f.debug_struct("WireNetwork")
            .field("hubs", &registry.hub_count())
            .field("edges", &registry.edge_count())
            .field("tick", &registry.tick())
            .field("propagating", &self.is_propagating())
            .finish()
    }
}
