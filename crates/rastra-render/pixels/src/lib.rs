//! CPU-backed surfaces for headless rendering and tests.

use rastra_render_common::{RasterSurface, SurfaceBackend, SurfaceError};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const BYTES_PER_PIXEL: usize = 4;

/// Packed RGBA pixel, red in the highest byte.
pub type Rgba = u32;

pub const TRANSPARENT: Rgba = 0;

/// Row-major RGBA buffer.
#[derive(Debug)]
pub struct PixelSurface {
    id: u64,
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelSurface {
    /// Allocation id, unique per backend.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Fills the intersection of the rectangle with the surface.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let max_x = x.saturating_add(width).min(self.width);
        let max_y = y.saturating_add(height).min(self.height);
        let stride = self.width as usize;
        for row in y.min(max_y)..max_y {
            let start = row as usize * stride;
            self.pixels[start + x.min(max_x) as usize..start + max_x as usize].fill(color);
        }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len() * BYTES_PER_PIXEL
    }

    /// True when no pixel has been painted since the last clear.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&pixel| pixel == TRANSPARENT)
    }
}

impl RasterSurface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(TRANSPARENT);
    }
}

/// Allocates [`PixelSurface`]s, optionally refusing any single surface
/// larger than a byte budget.
#[derive(Debug, Default)]
pub struct PixelsBackend {
    max_surface_bytes: Option<usize>,
    next_id: AtomicU64,
    allocated_bytes: AtomicUsize,
}

impl PixelsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_surface_bytes(mut self, bytes: usize) -> Self {
        self.max_surface_bytes = Some(bytes);
        self
    }

    /// Number of surfaces allocated so far.
    pub fn allocated(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    /// Total bytes handed out, ignoring what has since been dropped.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes.load(Ordering::Relaxed)
    }
}

impl SurfaceBackend for PixelsBackend {
    type Surface = PixelSurface;

    fn create_surface(&self, width: u32, height: u32) -> Result<PixelSurface, SurfaceError> {
        let pixel_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| SurfaceError::allocation(width, height, "pixel count overflows"))?;
        let bytes = pixel_count
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| SurfaceError::allocation(width, height, "byte size overflows"))?;
        if let Some(limit) = self.max_surface_bytes {
            if bytes > limit {
                return Err(SurfaceError::allocation(
                    width,
                    height,
                    format!("{bytes} bytes exceeds the {limit} byte surface limit"),
                ));
            }
        }

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(pixel_count)
            .map_err(|error| SurfaceError::allocation(width, height, error.to_string()))?;
        pixels.resize(pixel_count, TRANSPARENT);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.allocated_bytes.fetch_add(bytes, Ordering::Relaxed);
        log::trace!("allocated {width}x{height} pixel surface #{id}");

        Ok(PixelSurface {
            id,
            width,
            height,
            pixels,
        })
    }
}
