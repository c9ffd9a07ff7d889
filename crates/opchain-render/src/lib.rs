//! # opchain-render
//!
//! Assembles processor output into complete external tool invocations and
//! runs them.
//!
//! - [`Renderer`] - still-image tool (`oiiotool`) command lines
//! - [`VideoEncoder`] - video tool (`ffmpeg`) command lines for sequences
//! - [`RenderConfig`], [`VideoConfig`] - YAML-loadable settings
//! - [`RenderError`] - "could not build" vs "ran and failed"
//!
//! # Usage
//!
//! ```rust
//! use opchain_core::Resolution;
//! use opchain_process::{ColorProcessor, RepositionProcessor};
//! use opchain_render::{IoSpec, Renderer};
//! use serde_json::json;
//!
//! let color = ColorProcessor::from_chain(json!([
//!     {"kind": "colorspace", "value": "ACEScg"},
//!     {"kind": "cdl", "slope": [1.1, 1.0, 0.9]},
//!     {"kind": "colorspace", "value": "sRGB"},
//! ])).unwrap();
//! let geo = RepositionProcessor::from_chain(
//!     Resolution::HD,
//!     json!([{"kind": "resize", "w": 960, "h": 540}]),
//! ).unwrap();
//!
//! let renderer = Renderer::default();
//! let args = renderer
//!     .render(&[&color, &geo], &IoSpec::new("in.####.exr", "out.####.exr"))
//!     .unwrap();
//! assert_eq!(args.last().unwrap(), "out.%04d.exr");
//! ```
//!
//! Execution blocks until the child exits. A non-zero exit is surfaced as
//! [`RenderError::RenderFailed`] with the captured output; nothing is
//! retried.
//!
//! # Dependencies
//!
//! - [`serde`], [`serde_yaml`] - configuration
//! - [`thiserror`] - error types
//! - [`tracing`] - spawned command lines at `info` level

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod exec;
pub mod io;
pub mod renderer;
pub mod video;

pub use config::{RenderConfig, VideoConfig};
pub use error::{RenderError, Result};
pub use exec::{ExecutionResult, command_line};
pub use io::IoSpec;
pub use renderer::Renderer;
pub use video::{Codec, VideoEncoder, VideoSpec};
