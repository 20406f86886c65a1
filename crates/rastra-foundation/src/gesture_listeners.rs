use crate::input::PointerEvent;
use crate::z_order::{compare_dispatch_order, DispatchCandidate, GestureListener};
use rastra_core::collections::map::{self, HashMap};
use rastra_core::NodeId;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_time::Instant;

/// Listeners offered an event during one dispatch, topmost first.
pub type DispatchPath = SmallVec<[NodeId; 8]>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The listener that claimed the event, if any.
    pub consumed_by: Option<NodeId>,
    pub visited: DispatchPath,
}

struct Registration<L> {
    listener: L,
    registered_at: Instant,
}

/// Registry of gesture listeners kept in dispatch order.
///
/// The sorted order is cached and only recomputed after a registration
/// change or an explicit [`invalidate_order`](Self::invalidate_order), so
/// dispatching every pointer move does not re-sort.
pub struct GestureListeners<L> {
    registrations: HashMap<NodeId, Registration<L>>,
    ordered: RefCell<Rc<[L]>>,
    dirty: Cell<bool>,
}

impl<L: GestureListener + Clone> GestureListeners<L> {
    pub fn new() -> Self {
        Self {
            registrations: map::new_map(),
            ordered: RefCell::new(Rc::from(Vec::new())),
            dirty: Cell::new(false),
        }
    }

    /// Registers `listener`, stamping it with the current time. Registering
    /// an id again replaces the listener and restamps it.
    pub fn register(&mut self, listener: L) {
        let node_id = listener.node_id();
        self.registrations.insert(
            node_id,
            Registration {
                listener,
                registered_at: Instant::now(),
            },
        );
        self.dirty.set(true);
    }

    pub fn unregister(&mut self, node_id: NodeId) -> Option<L> {
        let removed = self.registrations.remove(&node_id)?;
        self.dirty.set(true);
        Some(removed.listener)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.registrations.contains_key(&node_id)
    }

    pub fn registration_time(&self, node_id: NodeId) -> Option<Instant> {
        self.registrations
            .get(&node_id)
            .map(|registration| registration.registered_at)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn clear(&mut self) {
        self.registrations.clear();
        self.dirty.set(true);
    }

    /// Call after a listener's z-index changed.
    pub fn invalidate_order(&self) {
        self.dirty.set(true);
    }

    /// Listeners in dispatch order, topmost first.
    pub fn listeners(&self) -> Rc<[L]> {
        if self.dirty.replace(false) {
            let mut ranked: Vec<(DispatchCandidate, &L)> = self
                .registrations
                .values()
                .map(|registration| {
                    (
                        DispatchCandidate::of(&registration.listener, Some(registration.registered_at)),
                        &registration.listener,
                    )
                })
                .collect();
            ranked.sort_by(|a, b| compare_dispatch_order(&a.0, &b.0));

            let ordered: Vec<L> = ranked.into_iter().map(|(_, listener)| listener.clone()).collect();
            *self.ordered.borrow_mut() = Rc::from(ordered);
        }
        self.ordered.borrow().clone()
    }

    /// Offers `event` to every hit listener in dispatch order until one
    /// claims it. An event that arrives already consumed is not offered.
    pub fn dispatch(&self, event: &PointerEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        // Walk a snapshot; listeners may query the registry.
        let ordered = self.listeners();

        for listener in ordered.iter() {
            if event.is_consumed() {
                break;
            }
            if !listener.hit_test(event.position) {
                continue;
            }

            let node_id = listener.node_id();
            outcome.visited.push(node_id);
            if listener.on_pointer_event(event) {
                event.consume();
                outcome.consumed_by = Some(node_id);
                break;
            }
        }

        log::trace!(
            "pointer {:?} visited {} listeners, consumed by {:?}",
            event.kind,
            outcome.visited.len(),
            outcome.consumed_by
        );
        outcome
    }
}

impl<L: GestureListener + Clone> Default for GestureListeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/gesture_listeners_tests.rs"]
mod tests;
