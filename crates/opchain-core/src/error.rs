//! Error types for building operator chains.
//!
//! Every failure that can happen *before* an external tool is spawned is an
//! [`Error`]. Execution failures live in the render crate, which wraps this
//! type so callers can tell "could not build the command" apart from
//! "the command ran and failed".
//!
//! # Usage
//!
//! ```rust
//! use opchain_core::{Error, Result};
//!
//! fn scale(value: f64) -> Result<f64> {
//!     if !value.is_finite() {
//!         return Err(Error::invalid_parameter("transform", "scale", "must be finite"));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(scale(f64::NAN).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing operators, normalizing chains,
/// composing matrices or computing flag lists.
///
/// # Categories
///
/// - **Construction**: [`InvalidParameterKind`](Error::InvalidParameterKind),
///   [`UnsupportedOperatorKind`](Error::UnsupportedOperatorKind)
/// - **Chain**: [`FamilyMismatch`](Error::FamilyMismatch),
///   [`ChainOrderingConflict`](Error::ChainOrderingConflict)
/// - **Geometry**: [`NotGeometric`](Error::NotGeometric),
///   [`IncompatibleDimensionality`](Error::IncompatibleDimensionality)
/// - **I/O spec**: [`InvalidFrameRange`](Error::InvalidFrameRange),
///   [`InvalidPattern`](Error::InvalidPattern),
///   [`UnsupportedCodec`](Error::UnsupportedCodec)
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or has the wrong semantic type.
    #[error("invalid parameter '{field}' for '{kind}': {reason}")]
    InvalidParameterKind {
        /// Operator kind being constructed
        kind: String,
        /// Offending field (`*` when the record as a whole is malformed)
        field: String,
        /// Description of the problem
        reason: String,
    },

    /// The `kind` tag does not name a known operator.
    #[error("unsupported operator kind: '{kind}'")]
    UnsupportedOperatorKind {
        /// Tag as it appeared in the input
        kind: String,
    },

    /// `to_matrix` was called on a color or overlay operator.
    #[error("operator '{kind}' is not geometric")]
    NotGeometric {
        /// Operator kind
        kind: String,
    },

    /// An operator was added to a processor of another family.
    #[error("operator '{kind}' does not belong to the {expected} family")]
    FamilyMismatch {
        /// Operator kind
        kind: String,
        /// Family the processor accepts
        expected: String,
    },

    /// Two anchor declarations of the same role name different colorspaces.
    #[error("conflicting {role} colorspace declarations: '{first}' and '{second}'")]
    ChainOrderingConflict {
        /// `input` or `output`
        role: String,
        /// First declared value
        first: String,
        /// Conflicting value
        second: String,
    },

    /// A matrix is not 3x3.
    #[error("incompatible matrix dimensionality: {rows}x{cols} (expected 3x3)")]
    IncompatibleDimensionality {
        /// Row count
        rows: usize,
        /// Column count (widest row)
        cols: usize,
    },

    /// Frame range text could not be parsed.
    #[error("invalid frame range: '{0}'")]
    InvalidFrameRange(String),

    /// Sequence path pattern could not be parsed.
    #[error("invalid sequence pattern: '{0}'")]
    InvalidPattern(String),

    /// Codec name is not one of the supported presets.
    #[error("unsupported codec '{name}' (supported: {supported})")]
    UnsupportedCodec {
        /// Requested codec
        name: String,
        /// Comma separated list of supported presets
        supported: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidParameterKind`] error.
    #[inline]
    pub fn invalid_parameter(
        kind: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameterKind {
            kind: kind.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedOperatorKind`] error.
    #[inline]
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedOperatorKind { kind: kind.into() }
    }

    /// Creates an [`Error::NotGeometric`] error.
    #[inline]
    pub fn not_geometric(kind: impl Into<String>) -> Self {
        Self::NotGeometric { kind: kind.into() }
    }

    /// Creates an [`Error::ChainOrderingConflict`] error.
    #[inline]
    pub fn ordering_conflict(
        role: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::ChainOrderingConflict {
            role: role.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates an [`Error::IncompatibleDimensionality`] error.
    #[inline]
    pub fn dimensionality(rows: usize, cols: usize) -> Self {
        Self::IncompatibleDimensionality { rows, cols }
    }

    /// Returns `true` if the error comes from malformed operator input.
    #[inline]
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameterKind { .. } | Self::UnsupportedOperatorKind { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter() {
        let err = Error::invalid_parameter("transform", "scale", "expected a number");
        let msg = err.to_string();
        assert!(msg.contains("scale"));
        assert!(msg.contains("transform"));
        assert!(err.is_construction_error());
    }

    #[test]
    fn test_ordering_conflict() {
        let err = Error::ordering_conflict("output", "sRGB", "Rec709");
        let msg = err.to_string();
        assert!(msg.contains("sRGB"));
        assert!(msg.contains("Rec709"));
        assert!(!err.is_construction_error());
    }

    #[test]
    fn test_dimensionality() {
        let err = Error::dimensionality(4, 4);
        assert!(err.to_string().contains("4x4"));
    }
}
