//! Pointer input and paint-order gesture dispatch for Rastra

pub mod gesture_listeners;
pub mod input;
pub mod z_order;

pub use gesture_listeners::{DispatchOutcome, DispatchPath, GestureListeners};
pub use input::{
    PointerButton, PointerButtons, PointerEvent, PointerEventKind, PointerId, PointerPhase,
};
pub use z_order::{compare_dispatch_order, DispatchCandidate, GestureListener};

pub mod prelude {
    pub use crate::gesture_listeners::GestureListeners;
    pub use crate::input::{PointerEvent, PointerEventKind};
    pub use crate::z_order::GestureListener;
}
