//! Propagation Guard
//!
//! Tracks how deep the current activation call chain is on a network. Graph
//! mutation checks the depth to refuse wiring changes while a signal is still
//! travelling.
//!
//! # Implementation
//!
//! Each thread keeps its own depth per network, so a cascade running on one
//! thread never affects the depth seen by another. The guard is RAII: the
//! depth is restored when it drops, even if an action panics and unwinds
//! through the propagation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    static DEPTHS: RefCell<HashMap<NetworkId, usize>> = RefCell::new(HashMap::new());
}

/// Identifies one network for depth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(u64);

impl NetworkId {
    /// Generate a new unique network ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one level of in-flight propagation on the current thread.
pub struct PropagationGuard {
    network: NetworkId,
    level: usize,
}

impl PropagationGuard {
    /// Enter one level of propagation for `network` on this thread.
    pub fn enter(network: NetworkId) -> Self {
        let level = DEPTHS.with(|depths| {
            let mut depths = depths.borrow_mut();
            let depth = depths.entry(network).or_insert(0);
            *depth += 1;
            *depth
        });

        Self { network, level }
    }

    /// The depth this guard was entered at, starting from 1.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Current propagation depth of `network` on this thread.
    pub fn depth(network: NetworkId) -> usize {
        DEPTHS
            .try_with(|depths| depths.borrow().get(&network).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Drop for PropagationGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let _ = DEPTHS.try_with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(depth) = depths.get_mut(&self.network) {
                *depth = depth.saturating_sub(1);
                if *depth == 0 {
                    depths.remove(&self.network);
                }
            }
        });
    }
}
