//! A FIFO queue of deferred actions that keeps at most one pending action per key.
//!
//! Enqueuing under a key that is already pending drops the old action and
//! appends the new one at the tail, so a key invalidated several times before
//! the queue is drained runs once, at the position of its latest enqueue.
//!
//! Nodes live in a slot arena linked in both directions. Removing a pending
//! key from the middle of the queue is O(1): the lookup table gives the slot,
//! the links give its neighbours, and the freed slot goes onto a free list for
//! the next enqueue.
use crate::collections::map::{self, HashMap};
use crate::describe_panic;
use crate::sync::lock;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 1024;

/// Deferred unit of work stored in a [`KeyedActionQueue`].
pub type Action = Box<dyn FnOnce() + Send + 'static>;

struct ActionNode<K> {
    key: K,
    action: Action,
    prev: Option<usize>,
    next: Option<usize>,
}

struct QueueState<K> {
    /// Slot arena; `None` marks a free slot
    slots: Vec<Option<ActionNode<K>>>,
    /// Indices of free slots in `slots`
    free: Vec<usize>,
    /// Maps key → slot index of its pending node
    lookup: HashMap<K, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K: Eq + Hash + Clone> QueueState<K> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            lookup: map::map_with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    fn len(&self) -> usize {
        self.lookup.len()
    }

    fn push_back(&mut self, key: K, action: Action) {
        let node = ActionNode {
            key: key.clone(),
            action,
            prev: self.tail,
            next: None,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => {
                if let Some(tail_node) = self.slots[tail].as_mut() {
                    tail_node.next = Some(index);
                }
            }
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.lookup.insert(key, index);
    }

    /// Unlinks the node at `index` and frees its slot.
    ///
    /// The lookup entry is left to the caller.
    fn unlink(&mut self, index: usize) -> Option<ActionNode<K>> {
        let node = self.slots[index].take()?;

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.slots[prev].as_mut() {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.slots[next].as_mut() {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.free.push(index);
        Some(node)
    }

    fn pop_front(&mut self) -> Option<ActionNode<K>> {
        let head = self.head?;
        let node = self.unlink(head)?;
        self.lookup.remove(&node.key);
        Some(node)
    }

    fn remove_key(&mut self, key: &K) -> Option<ActionNode<K>> {
        let index = self.lookup.remove(key)?;
        self.unlink(index)
    }

    /// Takes every pending action in FIFO order and resets the state,
    /// keeping allocated capacity.
    fn drain_in_order(&mut self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(index) = cursor {
            match self.slots[index].take() {
                Some(node) => {
                    cursor = node.next;
                    actions.push(node.action);
                }
                None => break,
            }
        }
        self.clear();
        actions
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.lookup.clear();
        self.head = None;
        self.tail = None;
    }
}

/// Deduplicating FIFO of deferred actions, safe to share between threads.
///
/// All structural operations run under one lock. [`execute_all`] runs the
/// actions after releasing it, so an action may enqueue follow-up work.
///
/// [`execute_all`]: KeyedActionQueue::execute_all
pub struct KeyedActionQueue<K> {
    state: Mutex<QueueState<K>>,
}

impl<K: Eq + Hash + Clone> KeyedActionQueue<K> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::with_capacity(capacity)),
        }
    }

    /// Enqueues `action` under `key`, replacing any action already pending
    /// for that key. The new action always goes to the tail.
    pub fn enqueue(&self, key: K, action: impl FnOnce() + Send + 'static) {
        let action: Action = Box::new(action);
        let replaced = {
            let mut state = lock(&self.state);
            let replaced = state.remove_key(&key);
            state.push_back(key, action);
            replaced
        };
        // Drop the superseded closure outside the lock.
        drop(replaced);
    }

    /// Pops the oldest pending action.
    pub fn dequeue(&self) -> Option<Action> {
        lock(&self.state).pop_front().map(|node| node.action)
    }

    /// Removes the action pending for `key` without running it.
    pub fn try_remove(&self, key: &K) -> bool {
        let removed = lock(&self.state).remove_key(key);
        removed.is_some()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        lock(&self.state).lookup.contains_key(key)
    }

    pub fn count(&self) -> usize {
        lock(&self.state).len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Drops every pending action.
    pub fn clear(&self) {
        let drained = lock(&self.state).drain_in_order();
        drop(drained);
    }

    /// Detaches all pending actions and runs them in FIFO order.
    ///
    /// A panicking action is logged and skipped; the rest still run. Returns
    /// the number of actions that were run.
    pub fn execute_all(&self) -> usize {
        let actions = lock(&self.state).drain_in_order();
        let total = actions.len();

        for action in actions {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(action)) {
                log::error!("queued action panicked: {}", describe_panic(&*payload));
            }
        }

        total
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedActionQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for KeyedActionQueue<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = lock(&self.state).lookup.len();
        f.debug_struct("KeyedActionQueue")
            .field("pending", &pending)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/keyed_action_queue_tests.rs"]
mod tests;
