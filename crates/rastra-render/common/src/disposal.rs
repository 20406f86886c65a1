use crate::DisposeManager;
use rastra_core::describe_panic;
use rastra_core::sync::lock;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

/// Frames a retired surface is kept alive to cover triple-buffered
/// presentation.
pub const DEFAULT_FRAMES_TO_HOLD: u64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisposalConfig {
    /// Presented frames a resource outlives after being handed over.
    pub frames_to_hold: u64,
}

impl Default for DisposalConfig {
    fn default() -> Self {
        Self {
            frames_to_hold: DEFAULT_FRAMES_TO_HOLD,
        }
    }
}

impl DisposalConfig {
    pub fn with_frames_to_hold(mut self, frames: u64) -> Self {
        self.frames_to_hold = frames;
        self
    }
}

struct Retired<T> {
    frame: u64,
    resource: T,
}

struct DisposerState<T> {
    frame: u64,
    pending: VecDeque<Retired<T>>,
}

/// [`DisposeManager`] that drops resources a fixed number of frames after
/// they were handed over.
///
/// The host calls [`advance_frame`](Self::advance_frame) once per presented
/// frame; [`flush`](Self::flush) releases everything immediately at teardown.
pub struct FrameDisposer<T> {
    config: DisposalConfig,
    state: Mutex<DisposerState<T>>,
}

impl<T: Send> FrameDisposer<T> {
    pub fn new(config: DisposalConfig) -> Self {
        Self {
            config,
            state: Mutex::new(DisposerState {
                frame: 0,
                pending: VecDeque::new(),
            }),
        }
    }

    pub fn config(&self) -> DisposalConfig {
        self.config
    }

    pub fn current_frame(&self) -> u64 {
        lock(&self.state).frame
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Moves to the next frame and releases every resource that has now
    /// been held for `frames_to_hold` frames. Returns how many were released.
    pub fn advance_frame(&self) -> usize {
        let expired: Vec<T> = {
            let mut state = lock(&self.state);
            state.frame += 1;
            let frame = state.frame;
            let hold = self.config.frames_to_hold;

            let mut expired = Vec::new();
            while let Some(front) = state.pending.front() {
                if front.frame.saturating_add(hold) > frame {
                    break;
                }
                if let Some(retired) = state.pending.pop_front() {
                    expired.push(retired.resource);
                }
            }
            expired
        };

        let released = expired.len();
        if released > 0 {
            log::trace!("releasing {released} retired resources");
        }
        release_all(expired);
        released
    }

    /// Releases every pending resource regardless of age.
    pub fn flush(&self) -> usize {
        let pending: Vec<T> = lock(&self.state)
            .pending
            .drain(..)
            .map(|retired| retired.resource)
            .collect();
        let released = pending.len();
        release_all(pending);
        released
    }
}

impl<T: Send> Default for FrameDisposer<T> {
    fn default() -> Self {
        Self::new(DisposalConfig::default())
    }
}

impl<T: Send> DisposeManager<T> for FrameDisposer<T> {
    fn dispose_object(&self, resource: T) {
        if self.config.frames_to_hold == 0 {
            release_all(std::iter::once(resource));
            return;
        }
        let mut state = lock(&self.state);
        let frame = state.frame;
        state.pending.push_back(Retired { frame, resource });
    }
}

impl<T> Drop for FrameDisposer<T> {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let pending = std::mem::take(&mut state.pending);
        release_all(pending.into_iter().map(|retired| retired.resource));
    }
}

/// Drops each resource, logging and swallowing a panicking destructor.
fn release_all<T>(resources: impl IntoIterator<Item = T>) {
    for resource in resources {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || drop(resource))) {
            log::warn!(
                "disposing a retired resource panicked: {}",
                describe_panic(&*payload)
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/disposal_tests.rs"]
mod tests;
