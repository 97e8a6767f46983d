// ============================================================================
// RENDER SURFACE — boundary to the host's pixel display
// ============================================================================

use crate::canvas::RasterBuffer;

/// Largest edge the headless surface accepts by default.
pub const DEFAULT_MAX_SURFACE_DIM: u32 = 16384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface cannot hold an image of this size.
    TooLarge { width: u32, height: u32, max_dim: u32 },
    /// The surface went away (window closed, context lost, ...).
    Lost(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::TooLarge { width, height, max_dim } => {
                write!(f, "surface cannot hold {}×{} (max edge {})", width, height, max_dim)
            }
            SurfaceError::Lost(e) => write!(f, "surface lost: {}", e),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Whatever the host draws the edited image onto.
///
/// An edit calls `acquire` before doing any work and `present` with the new
/// buffer before it is committed to history. Either failing aborts the edit.
pub trait RenderSurface {
    fn acquire(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;
    fn present(&mut self, buffer: &RasterBuffer) -> Result<(), SurfaceError>;
}

/// Surface with no display attached. Used by the CLI and tests.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub max_dim: u32,
    /// Number of buffers presented so far.
    pub presented: usize,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SURFACE_DIM)
    }
}

impl HeadlessSurface {
    pub fn new(max_dim: u32) -> Self {
        Self { max_dim, presented: 0 }
    }

    /// Check if an image of the given dimensions fits.
    pub fn supports_size(&self, width: u32, height: u32) -> bool {
        width <= self.max_dim && height <= self.max_dim
    }
}

impl RenderSurface for HeadlessSurface {
    fn acquire(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.supports_size(width, height) {
            Ok(())
        } else {
            Err(SurfaceError::TooLarge { width, height, max_dim: self.max_dim })
        }
    }

    fn present(&mut self, _buffer: &RasterBuffer) -> Result<(), SurfaceError> {
        self.presented += 1;
        Ok(())
    }
}
