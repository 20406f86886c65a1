#![doc = r"Core bookkeeping for Rastra's retained rendering: per-frame work coalescing and live node tracking."]

pub mod collections;
pub mod controls_tracker;
pub mod key_generator;
pub mod keyed_action_queue;
pub mod sync;

pub use controls_tracker::{ControlsTracker, TrackedNode};
pub use key_generator::KeyGenerator;
pub use keyed_action_queue::{Action, KeyedActionQueue};

/// Stable identity of a node in the drawn tree.
pub type NodeId = usize;

/// Best-effort text of a caught panic payload, for logging.
pub fn describe_panic(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
