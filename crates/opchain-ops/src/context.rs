//! Ambient values an operator needs but does not own.

use opchain_core::{MediaInfo, Resolution};
use opchain_math::glam::DVec2;

/// Context passed to [`Operator::to_matrix`](crate::Operator::to_matrix)
/// and [`Operator::to_flags`](crate::Operator::to_flags).
///
/// `source` is the original source resolution and never changes during a
/// composition; ratio-based parameters resolve against it. `canvas` is
/// the exact size of the frame at the current step of a geometric chain,
/// kept in `f64` so successive reformats never compound rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpContext {
    /// Original source resolution
    pub source: Resolution,
    /// Current frame size
    pub canvas: DVec2,
}

impl OpContext {
    /// Creates a context whose canvas equals the source.
    pub fn new(source: Resolution) -> Self {
        Self {
            source,
            canvas: DVec2::new(f64::from(source.width), f64::from(source.height)),
        }
    }

    /// Creates a context from probed media info.
    pub fn from_media(info: &MediaInfo) -> Self {
        Self::new(info.resolution())
    }

    /// Source resolution as floating point.
    pub fn source_size(&self) -> DVec2 {
        DVec2::new(f64::from(self.source.width), f64::from(self.source.height))
    }

    /// Canvas rounded to whole pixels.
    pub fn canvas_resolution(&self) -> Resolution {
        Resolution::new(
            self.canvas.x.round().max(0.0) as u32,
            self.canvas.y.round().max(0.0) as u32,
        )
    }
}

impl Default for OpContext {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}
