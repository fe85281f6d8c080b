//! Error types for wiring operations.
//!
//! Every failure in this crate degrades to a value the caller can inspect.
//! Propagation itself never fails; only graph mutation and configuration
//! loading report errors.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors returned by graph mutation and configuration loading.
#[derive(Debug, Error)]
pub enum WireError {
    /// A hub cannot be wired to itself.
    #[error("cannot connect hub {0:?} to itself")]
    SelfConnection(NodeId),

    /// The hub is not registered with this network.
    #[error("hub {0:?} is not registered")]
    UnknownNode(NodeId),

    /// The graph was mutated while an activation was still on the call stack.
    #[error("graph mutation requested while a signal is propagating")]
    MutationDuringPropagation,

    /// A configuration document could not be parsed.
    #[error("invalid network configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl PartialEq for WireError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SelfConnection(a), Self::SelfConnection(b)) => a == b,
            (Self::UnknownNode(a), Self::UnknownNode(b)) => a == b,
            (Self::MutationDuringPropagation, Self::MutationDuringPropagation) => true,
            (Self::Config(a), Self::Config(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
