//! Set of live nodes with a cached, lazily rebuilt snapshot.

use crate::collections::map::{self, HashMap};
use crate::sync::lock;
use crate::NodeId;
use std::sync::{Arc, Mutex};

/// Anything the tracker can key by node identity.
pub trait TrackedNode: Clone {
    fn node_id(&self) -> NodeId;
}

impl<T: TrackedNode> TrackedNode for Arc<T> {
    fn node_id(&self) -> NodeId {
        (**self).node_id()
    }
}

struct TrackerState<N> {
    nodes: HashMap<NodeId, N>,
    snapshot: Arc<[N]>,
    dirty: bool,
}

/// Thread-safe registry of nodes currently attached to a host.
///
/// Readers get an `Arc<[N]>` snapshot that is rebuilt only after a mutation;
/// repeated reads between mutations return the same allocation.
pub struct ControlsTracker<N> {
    state: Mutex<TrackerState<N>>,
}

impl<N: TrackedNode> ControlsTracker<N> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState {
                nodes: map::new_map(),
                snapshot: Arc::from(Vec::new()),
                dirty: false,
            }),
        }
    }

    /// Adds `node`, replacing a node already tracked under the same id.
    pub fn add(&self, node: N) {
        let mut state = lock(&self.state);
        state.nodes.insert(node.node_id(), node);
        state.dirty = true;
    }

    /// Removes the node with `node`'s id. Returns whether it was tracked.
    pub fn remove(&self, node: &N) -> bool {
        self.remove_id(node.node_id())
    }

    pub fn remove_id(&self, id: NodeId) -> bool {
        let mut state = lock(&self.state);
        let removed = state.nodes.remove(&id).is_some();
        if removed {
            state.dirty = true;
        }
        removed
    }

    /// Current nodes, in no particular order.
    pub fn get_list(&self) -> Arc<[N]> {
        let mut state = lock(&self.state);
        if state.dirty {
            let rebuilt: Vec<N> = state.nodes.values().cloned().collect();
            state.snapshot = Arc::from(rebuilt);
            state.dirty = false;
        }
        state.snapshot.clone()
    }

    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.nodes.clear();
        state.dirty = true;
    }

    /// Forces the next [`get_list`](Self::get_list) to rebuild.
    pub fn invalidate(&self) {
        lock(&self.state).dirty = true;
    }

    pub fn contains(&self, id: NodeId) -> bool {
        lock(&self.state).nodes.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        lock(&self.state).nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn has_items(&self) -> bool {
        !self.is_empty()
    }
}

impl<N: TrackedNode> Default for ControlsTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> std::fmt::Debug for ControlsTracker<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ControlsTracker")
            .field("count", &state.nodes.len())
            .field("dirty", &state.dirty)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/controls_tracker_tests.rs"]
mod tests;
