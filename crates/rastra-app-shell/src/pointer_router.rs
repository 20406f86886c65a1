//! Pointer routing with capture.
//!
//! A listener that claims a `Down` captures that pointer: the following
//! `Move`, `Up` and `Cancel` events go straight to it without hit-testing,
//! until the gesture ends. Only identities are remembered, so a listener
//! that unregisters mid-gesture simply loses the capture.

use rastra_core::collections::map::{self, HashMap};
use rastra_core::NodeId;
use rastra_foundation::{
    DispatchOutcome, GestureListener, GestureListeners, PointerEvent, PointerEventKind, PointerId,
};

pub struct PointerRouter<L> {
    listeners: GestureListeners<L>,
    captures: HashMap<PointerId, NodeId>,
}

impl<L: GestureListener + Clone> PointerRouter<L> {
    pub fn new() -> Self {
        Self {
            listeners: GestureListeners::new(),
            captures: map::new_map(),
        }
    }

    pub fn listeners(&self) -> &GestureListeners<L> {
        &self.listeners
    }

    pub fn register(&mut self, listener: L) {
        self.listeners.register(listener);
    }

    pub fn unregister(&mut self, node_id: NodeId) -> Option<L> {
        self.captures.retain(|_, captured| *captured != node_id);
        self.listeners.unregister(node_id)
    }

    pub fn invalidate_order(&self) {
        self.listeners.invalidate_order();
    }

    pub fn captured(&self, pointer: PointerId) -> Option<NodeId> {
        self.captures.get(&pointer).copied()
    }

    pub fn route(&mut self, event: &PointerEvent) -> DispatchOutcome {
        let outcome = match event.kind {
            PointerEventKind::Down => {
                let outcome = self.listeners.dispatch(event);
                match outcome.consumed_by {
                    Some(node_id) => {
                        self.captures.insert(event.id, node_id);
                    }
                    None => {
                        self.captures.remove(&event.id);
                    }
                }
                outcome
            }
            PointerEventKind::Move | PointerEventKind::Up | PointerEventKind::Cancel => {
                match self.captured_listener(event.id) {
                    Some(listener) => deliver_to(&listener, event),
                    None => self.listeners.dispatch(event),
                }
            }
        };

        if matches!(event.kind, PointerEventKind::Up | PointerEventKind::Cancel) {
            self.captures.remove(&event.id);
        }
        outcome
    }

    fn captured_listener(&self, pointer: PointerId) -> Option<L> {
        let node_id = self.captured(pointer)?;
        self.listeners
            .listeners()
            .iter()
            .find(|listener| listener.node_id() == node_id)
            .cloned()
    }
}

impl<L: GestureListener + Clone> Default for PointerRouter<L> {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver_to<L: GestureListener>(listener: &L, event: &PointerEvent) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();
    if event.is_consumed() {
        return outcome;
    }

    let node_id = listener.node_id();
    outcome.visited.push(node_id);
    if listener.on_pointer_event(event) {
        event.consume();
        outcome.consumed_by = Some(node_id);
    }
    outcome
}
