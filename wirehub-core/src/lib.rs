//! Wirehub Core
//!
//! This crate provides the core runtime for wiring world objects together.
//! It implements:
//!
//! - An undirected, duplicate-free graph of hubs and wires
//! - Cycle-safe signal propagation, at most once per hub per tick
//! - Connector geometry and wire curves for rendering
//! - The two-step wiring tool interaction
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Hubs, wires and the registry that keeps them consistent
//! - `signal`: The activation protocol and the shared network handle
//! - `geometry`: Connector placement and wire curves
//! - `render`: The interface to whatever draws the wires
//! - `tool`: Two-step wire placement
//!
//! # Example
//!
//! ```rust,ignore
//! use wirehub_core::graph::HubBuilder;
//! use wirehub_core::signal::{action, WireNetwork};
//!
//! let network = WireNetwork::new();
//!
//! // A button wired to a door
//! let button = network.add_hub(HubBuilder::new());
//! let door = network.add_hub(HubBuilder::new().action(action(|| println!("door opens"))));
//! network.connect(button, door)?;
//!
//! // Once per frame
//! network.begin_tick()?;
//!
//! // The player presses the button
//! network.activate(button);
//! // prints "door opens"
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod render;
pub mod signal;
pub mod tool;

pub use config::NetworkConfig;
pub use error::WireError;
pub use graph::{Connection, EdgeId, EdgeState, HubBuilder, NodeId};
pub use signal::{action, ActionSink, Activatable, Activator, WireNetwork};
