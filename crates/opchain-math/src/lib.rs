//! # opchain-math
//!
//! Matrix arithmetic for geometric operator chains.
//!
//! - [`Mat3`] - 3x3 matrices for 2D affine (and projective) transforms
//!
//! # Design
//!
//! All matrix operations assume **row-major** storage and **column
//! vectors**, so a composite built as `M_n * ... * M_2 * M_1` applies
//! `M_1` first:
//!
//! ```text
//! result = matrix * point
//! ```
//!
//! # Usage
//!
//! ```rust
//! use opchain_math::Mat3;
//!
//! let crop = Mat3::translation(-100.0, -50.0);
//! let resize = Mat3::scaling(2.0, 2.0);
//! let composite = resize * crop;
//! assert_eq!(composite.m[0][2], -200.0);
//! ```
//!
//! # Dependencies
//!
//! - [`glam`] - point types and interop with `DMat3`
//! - `opchain-core` - error types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod mat3;

pub use mat3::*;

/// Re-export glam types for direct use
pub mod glam {
    pub use ::glam::{DMat3, DVec2};
}
