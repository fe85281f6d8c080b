//! Network Configuration
//!
//! Tunables for a [`WireNetwork`](crate::signal::WireNetwork). Hosts usually
//! ship these alongside their scene data as JSON.

use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// Configuration for a wire network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// How far the middle of a rendered wire sags below its endpoints.
    pub wire_slack: f32,

    /// Number of straight segments used to approximate a wire curve.
    pub curve_segments: usize,

    /// Reject connect/disconnect while an activation is in flight.
    ///
    /// Hosts that already serialize their wiring tool against triggers can
    /// turn this off, in which case mutation during propagation is only logged.
    pub guard_mutation_during_propagation: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wire_slack: 0.25,
            curve_segments: 8,
            guard_mutation_during_propagation: true,
        }
    }
}

impl NetworkConfig {
    /// Parse a configuration from a JSON string.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }
}
