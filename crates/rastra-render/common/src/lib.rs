//! Rendering contracts shared by Rastra backends, plus the adaptive surface
//! cache and the frame-delayed disposer built on top of them.

mod disposal;
mod error;
mod surface_cache;
mod surface_key;
mod surface_pool;

pub use disposal::{DisposalConfig, FrameDisposer};
pub use error::SurfaceError;
pub use surface_cache::{SurfaceCacheConfig, SurfaceCacheManager};
pub use surface_key::{SurfaceKey, UsageStats};
pub use surface_pool::SurfacePool;

/// Off-screen raster target handed out by a [`SurfaceBackend`].
///
/// The cache only relies on a surface knowing its own pixel size and being
/// able to wipe its contents before reuse.
pub trait RasterSurface: Send + 'static {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self);
}

/// Allocates surfaces of an exact pixel size.
pub trait SurfaceBackend: Send + Sync {
    type Surface: RasterSurface;

    fn create_surface(&self, width: u32, height: u32) -> Result<Self::Surface, SurfaceError>;
}

/// Accepts resources that may still be referenced by an in-flight frame and
/// releases them later. Callable from any thread.
pub trait DisposeManager<T>: Send + Sync {
    fn dispose_object(&self, resource: T);
}

impl<T, D: DisposeManager<T> + ?Sized> DisposeManager<T> for std::sync::Arc<D> {
    fn dispose_object(&self, resource: T) {
        (**self).dispose_object(resource);
    }
}
