//! Testing utilities and fakes for Rastra

pub mod disposer;
pub mod listeners;
pub mod nodes;

pub use disposer::RecordingDisposer;
pub use listeners::{ListenerLog, TestListener};
pub use nodes::TestNode;
pub use rastra_render_pixels::{PixelSurface, PixelsBackend};

use rastra_render_common::{DisposeManager, SurfaceCacheConfig, SurfaceCacheManager};
use std::sync::Arc;

/// Cache over a fresh [`PixelsBackend`] whose disposals are recorded.
pub fn recording_cache(
    config: SurfaceCacheConfig,
) -> (
    SurfaceCacheManager<PixelsBackend>,
    Arc<RecordingDisposer<PixelSurface>>,
) {
    let recorder = Arc::new(RecordingDisposer::new());
    let disposer: Arc<dyn DisposeManager<PixelSurface>> = recorder.clone();
    let cache = SurfaceCacheManager::with_config(PixelsBackend::new(), disposer, config);
    (cache, recorder)
}

pub mod prelude {
    pub use crate::{recording_cache, ListenerLog, RecordingDisposer, TestListener, TestNode};
    pub use crate::{PixelSurface, PixelsBackend};
}
