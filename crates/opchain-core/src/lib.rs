//! # opchain-core
//!
//! Core types shared by every crate that builds external tool invocations
//! from operator chains.
//!
//! - [`Error`], [`Result`] - Build-time error taxonomy
//! - [`Resolution`], [`MediaInfo`] - Source metadata consumed from a probe
//! - [`FrameRange`], [`SeqPattern`] - Frame ranges and padded sequence paths
//! - [`format`] - Number formatting for flag values
//!
//! ## Crate Structure
//!
//! ```text
//! opchain-core (this crate)
//!    ^
//!    |
//!    +-- opchain-math (affine matrices)
//!    +-- opchain-ops (operators, normalizer)
//!    +-- opchain-process (compositor, processors)
//!    +-- opchain-render (renderer, subprocess execution)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod media;
pub mod sequence;

pub use error::{Error, Result};
pub use media::{MediaInfo, Resolution};
pub use sequence::{FrameRange, SeqPattern};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::media::{MediaInfo, Resolution};
    pub use crate::sequence::{FrameRange, SeqPattern};
}
