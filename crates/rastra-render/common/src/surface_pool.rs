use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Bounded, lock-free bag of reusable surfaces of one pixel size.
///
/// `current_size` is reserved before a push and released after a pop, so it
/// never exceeds `max_size` and never underflows, whatever the interleaving
/// of concurrent adds and takes.
pub struct SurfacePool<S> {
    surfaces: ArrayQueue<S>,
    max_size: usize,
    current_size: AtomicUsize,
    retired: AtomicBool,
}

impl<S> SurfacePool<S> {
    /// A pool holding at most `max_size` surfaces. Zero disables pooling.
    pub fn new(max_size: usize) -> Self {
        Self {
            surfaces: ArrayQueue::new(max_size.max(1)),
            max_size,
            current_size: AtomicUsize::new(0),
            retired: AtomicBool::new(false),
        }
    }

    /// Stores `surface`, or hands it back when the pool is full or retired.
    pub fn try_add(&self, surface: S) -> Result<(), S> {
        if self.is_retired() {
            return Err(surface);
        }

        let max_size = self.max_size;
        let reserved = self
            .current_size
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |size| {
                (size < max_size).then_some(size + 1)
            });
        if reserved.is_err() {
            return Err(surface);
        }

        self.surfaces.push(surface).map_err(|surface| {
            self.current_size.fetch_sub(1, Ordering::SeqCst);
            surface
        })
    }

    pub fn try_take(&self) -> Option<S> {
        let surface = self.surfaces.pop()?;
        self.current_size.fetch_sub(1, Ordering::SeqCst);
        Some(surface)
    }

    pub fn current_size(&self) -> usize {
        self.current_size.load(Ordering::SeqCst)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    /// Marks the pool as torn down. Later [`try_add`](Self::try_add) calls
    /// fail; surfaces already inside must still be drained.
    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
    }

    /// Takes every surface currently held, handing each to `sink`.
    pub(crate) fn drain(&self, mut sink: impl FnMut(S)) -> usize {
        let mut drained = 0;
        while let Some(surface) = self.try_take() {
            sink(surface);
            drained += 1;
        }
        drained
    }
}

impl<S> std::fmt::Debug for SurfacePool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfacePool")
            .field("current_size", &self.current_size())
            .field("max_size", &self.max_size)
            .field("retired", &self.is_retired())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/surface_pool_tests.rs"]
mod tests;
