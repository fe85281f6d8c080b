//! Signal Propagation
//!
//! This module implements the activation protocol: how activating one hub
//! makes the hubs wired to it react.
//!
//! # Concepts
//!
//! ## Activation
//!
//! Activating a hub sends a signal across each of its wires, in the order the
//! wires were connected. Propagation is exactly one hop: the hubs on the other
//! ends receive the signal, and nothing further happens unless one of their
//! actions activates another hub.
//!
//! ## Receiving
//!
//! A hub that receives a signal runs its actions in order, at most once per
//! tick. The signaled flag is checked and set before any action runs, so a
//! cascade that loops back around a cycle stops at the first hub that already
//! fired.
//!
//! ## Ticks
//!
//! The host calls [`WireNetwork::begin_tick`] once per update step, before any
//! trigger for that step, to re-arm every hub.
//!
//! # Implementation Notes
//!
//! The graph sits behind a lock that is never held while an action runs.
//! Actions are free to call back into the network, which is how multi-hop
//! cascades are built.

mod action;
mod network;
mod propagation;

pub use action::{action, ActionSink, Activatable, Activator};
pub use network::{WeakNetwork, WireNetwork};
pub use propagation::{NetworkId, PropagationGuard};
