//! # opchain-ops
//!
//! Operator value types and chain normalization.
//!
//! An [`Operator`] describes one image operation: a colorspace
//! declaration, a CDL, a LUT, a repositioning step or a burn-in. Each
//! renders its own command line fragment with [`Operator::to_flags`];
//! geometric operators also yield a 3x3 matrix with
//! [`Operator::to_matrix`] so a processor can fold a whole chain into one
//! warp.
//!
//! # Families
//!
//! | Family | Kinds |
//! |--------|-------|
//! | [`Family::Color`] | `colorspace`, `colorconvert`, `cdl`, `lut`, `look` |
//! | [`Family::Geometric`] | `transform`, `crop`, `resize`, `mirror`, `matrix` |
//! | [`Family::Overlay`] | `text` |
//!
//! # Usage
//!
//! ```rust
//! use opchain_ops::{normalize, OpContext};
//! use opchain_core::Resolution;
//! use serde_json::json;
//!
//! let chain = normalize(json!([
//!     {"kind": "Transform", "scale": 0.5},
//!     {"kind": "mirror", "flop": true},
//! ])).unwrap();
//!
//! let ctx = OpContext::new(Resolution::HD);
//! let m = chain[0].to_matrix(&ctx).unwrap();
//! assert_eq!(m.m[0][0], 0.5);
//! ```
//!
//! # Dependencies
//!
//! - [`serde`], [`serde_json`] - parameter mappings
//! - [`tracing`] - construction events
//! - `opchain-math` - matrices

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod context;
pub mod normalize;
pub mod operator;
pub mod overlay;
pub mod params;
pub mod reposition;

pub use color::{Anchor, Cdl, ColorConvert, ColorSpace, Look, Lut};
pub use context::OpContext;
pub use normalize::{ChainInput, OpSpec, normalize};
pub use operator::{Family, KIND_KEY, Operator, OperatorKind};
pub use overlay::{Position, Text};
pub use params::{Direction, Interpolation, Params};
pub use reposition::{
    Crop, DEFAULT_WARP_FILTER, Fit, MatrixOp, Mirror, Resize, SkewOrder, Transform, warp_flags,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::OpContext;
    pub use crate::normalize::{OpSpec, normalize};
    pub use crate::operator::{Family, Operator, OperatorKind};
    pub use crate::params::Params;
}
