//! Resolution and probed media metadata.
//!
//! [`MediaInfo`] is what a media-info probe hands to the core. The probe
//! itself lives outside this workspace; the struct is deserializable so a
//! probe result stored as JSON can be fed straight in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FrameRange;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Creates a resolution.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Full HD, used when nothing else is known.
    pub const HD: Self = Self::new(1920, 1080);

    /// Width / height, or 1.0 for a degenerate resolution.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Metadata for one source, as reported by a media-info probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame range of the sequence, if it is one
    #[serde(default)]
    pub frame_range: Option<FrameRange>,
    /// Colorspace the source is encoded in
    #[serde(default)]
    pub colorspace: Option<String>,
    /// Pixel aspect ratio
    #[serde(default = "default_pixel_aspect", alias = "par")]
    pub pixel_aspect: f64,
    /// Frames per second
    #[serde(default)]
    pub fps: Option<f64>,
    /// Start timecode
    #[serde(default)]
    pub timecode: Option<String>,
}

fn default_pixel_aspect() -> f64 {
    1.0
}

impl MediaInfo {
    /// Creates media info with only a resolution known.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_range: None,
            colorspace: None,
            pixel_aspect: 1.0,
            fps: None,
            timecode: None,
        }
    }

    /// Resolution of the source.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Returns true when pixels are not square.
    pub fn is_anamorphic(&self) -> bool {
        (self.pixel_aspect - 1.0).abs() > f64::EPSILON
    }
}
