//! Wiring Graph
//!
//! This module implements the undirected graph of hubs and wires.
//!
//! # Overview
//!
//! - Nodes ([`Hub`]) are addressable points that can be activated and can
//!   receive signals. Each hub lists the edges it participates in.
//! - Edges ([`Edge`]) join exactly two distinct hubs. An edge is registered on
//!   both of its endpoints, never on just one.
//!
//! # Design Decisions
//!
//! 1. Hubs and edges live in a single [`Registry`] and reference each other by
//!    ID. Cycles in the wiring are plain data and need no back-pointers.
//!
//! 2. Edge IDs are never reused. A removed or rejected edge handle resolves to
//!    nothing, which is how invalidation is observed.
//!
//! 3. Incident lists keep connection order, so activation order is
//!    deterministic.

mod edge;
mod node;
mod registry;

pub use edge::{Edge, EdgeId, EdgeState};
pub use node::{Hub, HubBuilder, NodeId};
pub use registry::{Connection, InvariantViolation, Registry};
