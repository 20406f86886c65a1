use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The backend could not provide a surface of the requested size.
    #[error("failed to allocate {width}x{height} surface: {reason}")]
    Allocation {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("cannot allocate an empty {width}x{height} surface")]
    EmptySize { width: u32, height: u32 },
}

impl SurfaceError {
    pub fn allocation(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::Allocation {
            width,
            height,
            reason: reason.into(),
        }
    }
}
