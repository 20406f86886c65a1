//! Paint-order ranking of gesture listeners.

use crate::input::PointerEvent;
use rastra_core::NodeId;
use rastra_ui_graphics::Point;
use std::cmp::Ordering;
use web_time::Instant;

/// A node that wants pointer input.
pub trait GestureListener {
    fn node_id(&self) -> NodeId;

    /// Paint order; higher values are drawn on top.
    fn z_index(&self) -> i32;

    /// Whether `position` falls inside this listener.
    fn hit_test(&self, _position: Point) -> bool {
        true
    }

    /// Returns `true` to claim the event and stop dispatch.
    fn on_pointer_event(&self, event: &PointerEvent) -> bool;
}

impl<T: GestureListener + ?Sized> GestureListener for std::rc::Rc<T> {
    fn node_id(&self) -> NodeId {
        (**self).node_id()
    }

    fn z_index(&self) -> i32 {
        (**self).z_index()
    }

    fn hit_test(&self, position: Point) -> bool {
        (**self).hit_test(position)
    }

    fn on_pointer_event(&self, event: &PointerEvent) -> bool {
        (**self).on_pointer_event(event)
    }
}

/// The attributes dispatch order is decided on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchCandidate {
    pub node_id: NodeId,
    pub z_index: i32,
    pub registration_time: Option<Instant>,
}

impl DispatchCandidate {
    pub fn of<L: GestureListener + ?Sized>(listener: &L, registration_time: Option<Instant>) -> Self {
        Self {
            node_id: listener.node_id(),
            z_index: listener.z_index(),
            registration_time,
        }
    }
}

/// Orders candidates topmost first.
///
/// Higher `z_index` wins; equal z falls back to the earlier registration
/// (an unset time counts as earliest), then to the larger node id. Distinct
/// ids never compare equal.
pub fn compare_dispatch_order(a: &DispatchCandidate, b: &DispatchCandidate) -> Ordering {
    b.z_index
        .cmp(&a.z_index)
        .then_with(|| a.registration_time.cmp(&b.registration_time))
        .then_with(|| b.node_id.cmp(&a.node_id))
}

#[cfg(test)]
#[path = "tests/z_order_tests.rs"]
mod tests;
