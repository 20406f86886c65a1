use rastra_core::sync::lock;
use rastra_render_common::DisposeManager;
use rastra_render_pixels::PixelSurface;
use std::sync::Mutex;

/// Disposer that keeps everything it is handed, for inspection.
pub struct RecordingDisposer<T> {
    disposed: Mutex<Vec<T>>,
}

impl<T: Send> RecordingDisposer<T> {
    pub fn new() -> Self {
        Self {
            disposed: Mutex::new(Vec::new()),
        }
    }

    pub fn disposed_count(&self) -> usize {
        lock(&self.disposed).len()
    }

    pub fn take_disposed(&self) -> Vec<T> {
        std::mem::take(&mut *lock(&self.disposed))
    }
}

impl RecordingDisposer<PixelSurface> {
    /// Allocation ids of the disposed surfaces, in disposal order.
    pub fn disposed_ids(&self) -> Vec<u64> {
        lock(&self.disposed).iter().map(PixelSurface::id).collect()
    }
}

impl<T: Send> Default for RecordingDisposer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> DisposeManager<T> for RecordingDisposer<T> {
    fn dispose_object(&self, resource: T) {
        lock(&self.disposed).push(resource);
    }
}
