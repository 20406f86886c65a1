//! Lock helpers shared by the concurrent structures in this workspace.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the guard if a previous holder panicked.
///
/// None of the structures guarded this way run foreign code while locked,
/// so their state is consistent even after a poisoning panic elsewhere.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
