//! # opchain-process
//!
//! Processors turn an operator chain into command line flags.
//!
//! - [`ColorProcessor`] - hoists colorspace anchors to the ends of the chain
//! - [`RepositionProcessor`] - folds a geometric chain into one warp
//! - [`OverlayProcessor`] - burn-ins
//! - [`compose`] - the geometric compositor
//!
//! # Usage
//!
//! ```rust
//! use opchain_core::Resolution;
//! use opchain_process::{Processor, RepositionProcessor};
//! use serde_json::json;
//!
//! let mut p = RepositionProcessor::new(Resolution::HD);
//! p.add(json!({"kind": "crop", "x": 0, "y": 0, "w": 960, "h": 540})).unwrap();
//! p.add(json!({"kind": "resize", "w": 1920, "h": 1080})).unwrap();
//!
//! let flags = p.compute().unwrap();
//! assert_eq!(flags.len(), 2);
//! ```
//!
//! # Dependencies
//!
//! - `opchain-ops` - operators and normalization
//! - `opchain-math` - composite matrices
//! - [`tracing`] - computed flag lists and matrices at `debug` level

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod compositor;
pub mod overlay;
pub mod processor;
pub mod reposition;

pub use color::{ColorPlan, ColorProcessor};
pub use compositor::{Composite, compose};
pub use overlay::OverlayProcessor;
pub use processor::{Processor, check_family};
pub use reposition::RepositionProcessor;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::color::ColorProcessor;
    pub use crate::overlay::OverlayProcessor;
    pub use crate::processor::Processor;
    pub use crate::reposition::RepositionProcessor;
}
