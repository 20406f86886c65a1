use rastra_ui_graphics::ScaledSize;
use web_time::Instant;

/// Pixel-exact size class used to key pooled surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceKey {
    pub width: u32,
    pub height: u32,
}

impl SurfaceKey {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Key for a measured size, or `None` while either axis is unconstrained
    /// or infinite.
    pub fn from_scaled(size: &ScaledSize) -> Option<Self> {
        size.pixel_extent()
            .map(|(width, height)| Self::new(width, height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// How often and how recently a size class was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageStats {
    pub request_count: u64,
    pub last_requested: Instant,
}

impl UsageStats {
    pub(crate) fn first(now: Instant) -> Self {
        Self {
            request_count: 1,
            last_requested: now,
        }
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.request_count = self.request_count.saturating_add(1);
        self.last_requested = now;
    }
}
