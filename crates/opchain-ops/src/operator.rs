//! The [`Operator`] sum type.
//!
//! An operator is a self-contained value describing one image operation.
//! It never reads state from its siblings; only a processor knows their
//! relative order.
//!
//! # Construction
//!
//! ```rust
//! use opchain_ops::{Operator, OperatorKind, Params};
//! use serde_json::json;
//!
//! let params: Params = serde_json::from_value(json!({
//!     "kind": "Transform",
//!     "translate": [10.0, 0.0],
//!     "scale": 0.5,
//! })).unwrap();
//!
//! let op = Operator::from_params(params).unwrap();
//! assert_eq!(op.kind(), OperatorKind::Transform);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use opchain_core::{Error, Result};
use opchain_math::Mat3;
use opchain_math::glam::DVec2;

use crate::color::{Anchor, Cdl, ColorConvert, ColorSpace, Look, Lut};
use crate::context::OpContext;
use crate::overlay::Text;
use crate::params::{Params, parse, to_params};
use crate::reposition::{Crop, DEFAULT_WARP_FILTER, MatrixOp, Mirror, Resize, Transform, warp_flags};

/// Key holding the operator tag in a parameter mapping.
pub const KIND_KEY: &str = "kind";

/// Operator family. A processor owns operators of exactly one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Colorspace declarations, conversions, CDLs, LUTs and looks
    Color,
    /// Operators reduced to one composite matrix
    Geometric,
    /// Burn-ins drawn over the final frame
    Overlay,
}

impl Family {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Geometric => "geometric",
            Self::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// [`ColorSpace`]
    ColorSpace,
    /// [`ColorConvert`]
    ColorConvert,
    /// [`Cdl`]
    Cdl,
    /// [`Lut`]
    Lut,
    /// [`Look`]
    Look,
    /// [`Transform`]
    Transform,
    /// [`Crop`]
    Crop,
    /// [`Resize`]
    Resize,
    /// [`Mirror`]
    Mirror,
    /// [`MatrixOp`]
    Matrix,
    /// [`Text`]
    Text,
}

impl OperatorKind {
    /// All kinds.
    pub const ALL: [Self; 11] = [
        Self::ColorSpace,
        Self::ColorConvert,
        Self::Cdl,
        Self::Lut,
        Self::Look,
        Self::Transform,
        Self::Crop,
        Self::Resize,
        Self::Mirror,
        Self::Matrix,
        Self::Text,
    ];

    /// Canonical tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ColorSpace => "colorspace",
            Self::ColorConvert => "colorconvert",
            Self::Cdl => "cdl",
            Self::Lut => "lut",
            Self::Look => "look",
            Self::Transform => "transform",
            Self::Crop => "crop",
            Self::Resize => "resize",
            Self::Mirror => "mirror",
            Self::Matrix => "matrix",
            Self::Text => "text",
        }
    }

    /// Family this kind belongs to.
    pub fn family(self) -> Family {
        match self {
            Self::ColorSpace | Self::ColorConvert | Self::Cdl | Self::Lut | Self::Look => {
                Family::Color
            }
            Self::Transform | Self::Crop | Self::Resize | Self::Mirror | Self::Matrix => {
                Family::Geometric
            }
            Self::Text => Family::Overlay,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorKind {
    type Err = Error;

    /// Case-insensitive; accepts compositing-package class names as aliases.
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        Ok(match tag.as_str() {
            "colorspace" => Self::ColorSpace,
            "colorconvert" | "ociocolorspace" => Self::ColorConvert,
            "cdl" | "ociocdltransform" => Self::Cdl,
            "lut" | "ociofiletransform" | "filetransform" => Self::Lut,
            "look" | "ociolook" | "ociolooktransform" => Self::Look,
            "transform" | "reposition" => Self::Transform,
            "crop" => Self::Crop,
            "resize" | "reformat" => Self::Resize,
            "mirror" | "mirror2" => Self::Mirror,
            "matrix" => Self::Matrix,
            "text" | "burnin" => Self::Text,
            _ => return Err(Error::unsupported_kind(s)),
        })
    }
}

/// One image operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Params", into = "Params")]
pub enum Operator {
    /// Colorspace anchor declaration
    ColorSpace(ColorSpace),
    /// Colorspace conversion
    ColorConvert(ColorConvert),
    /// ASC CDL
    Cdl(Cdl),
    /// LUT file
    Lut(Lut),
    /// OCIO look
    Look(Look),
    /// Pan/rotate/zoom/skew
    Transform(Transform),
    /// Crop
    Crop(Crop),
    /// Reformat
    Resize(Resize),
    /// Flip/flop
    Mirror(Mirror),
    /// Raw affine matrix
    Matrix(MatrixOp),
    /// Text burn-in
    Text(Text),
}

impl Operator {
    /// Builds an operator from a parameter mapping with a `kind` tag.
    ///
    /// Fails with [`Error::UnsupportedOperatorKind`] for an unknown tag and
    /// [`Error::InvalidParameterKind`] for a missing tag or malformed fields.
    pub fn from_params(mut params: Params) -> Result<Self> {
        let tag = match params.remove(KIND_KEY) {
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(Error::invalid_parameter(
                    "?",
                    KIND_KEY,
                    format!("expected a string, got {other}"),
                ));
            }
            None => return Err(Error::invalid_parameter("?", KIND_KEY, "missing operator tag")),
        };
        let kind: OperatorKind = tag.parse()?;
        Self::from_kind_params(kind, params)
    }

    /// Builds an operator of a known kind from its fields.
    pub fn from_kind_params(kind: OperatorKind, params: Params) -> Result<Self> {
        let k = kind.as_str();
        let op = match kind {
            OperatorKind::ColorSpace => Self::ColorSpace(parse(k, params)?),
            OperatorKind::ColorConvert => Self::ColorConvert(parse(k, params)?),
            OperatorKind::Cdl => Self::Cdl(parse(k, params)?),
            OperatorKind::Lut => Self::Lut(parse(k, params)?),
            OperatorKind::Look => Self::Look(parse(k, params)?),
            OperatorKind::Transform => Self::Transform(parse(k, params)?),
            OperatorKind::Crop => Self::Crop(parse(k, params)?),
            OperatorKind::Resize => Self::Resize(parse(k, params)?),
            OperatorKind::Mirror => Self::Mirror(parse(k, params)?),
            OperatorKind::Matrix => Self::Matrix(parse(k, params)?),
            OperatorKind::Text => Self::Text(parse(k, params)?),
        };
        op.validate()?;
        trace!(kind = k, "operator constructed");
        Ok(op)
    }

    /// Parameter mapping (with `kind`) that rebuilds an identical operator.
    pub fn to_params(&self) -> Params {
        let mut params = match self {
            Self::ColorSpace(op) => to_params(op),
            Self::ColorConvert(op) => to_params(op),
            Self::Cdl(op) => to_params(op),
            Self::Lut(op) => to_params(op),
            Self::Look(op) => to_params(op),
            Self::Transform(op) => to_params(op),
            Self::Crop(op) => to_params(op),
            Self::Resize(op) => to_params(op),
            Self::Mirror(op) => to_params(op),
            Self::Matrix(op) => to_params(op),
            Self::Text(op) => to_params(op),
        };
        params.insert(KIND_KEY.into(), Value::String(self.kind().as_str().into()));
        params
    }

    /// Checks field values beyond their types.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::ColorSpace(op) => op.validate(),
            Self::ColorConvert(op) => op.validate(),
            Self::Cdl(op) => op.validate(),
            Self::Lut(op) => op.validate(),
            Self::Look(op) => op.validate(),
            Self::Transform(op) => op.validate(),
            Self::Crop(op) => op.validate(),
            Self::Resize(op) => op.validate(),
            Self::Mirror(_) => Ok(()),
            Self::Matrix(op) => op.validate(),
            Self::Text(op) => op.validate(),
        }
    }

    /// Operator tag.
    pub fn kind(&self) -> OperatorKind {
        match self {
            Self::ColorSpace(_) => OperatorKind::ColorSpace,
            Self::ColorConvert(_) => OperatorKind::ColorConvert,
            Self::Cdl(_) => OperatorKind::Cdl,
            Self::Lut(_) => OperatorKind::Lut,
            Self::Look(_) => OperatorKind::Look,
            Self::Transform(_) => OperatorKind::Transform,
            Self::Crop(_) => OperatorKind::Crop,
            Self::Resize(_) => OperatorKind::Resize,
            Self::Mirror(_) => OperatorKind::Mirror,
            Self::Matrix(_) => OperatorKind::Matrix,
            Self::Text(_) => OperatorKind::Text,
        }
    }

    /// Operator family.
    #[inline]
    pub fn family(&self) -> Family {
        self.kind().family()
    }

    /// Returns true for geometric operators.
    #[inline]
    pub fn is_geometric(&self) -> bool {
        self.family() == Family::Geometric
    }

    /// Matrix mapping the incoming canvas onto the outgoing one.
    ///
    /// Fails with [`Error::NotGeometric`] for color and overlay operators
    /// and [`Error::IncompatibleDimensionality`] for a raw matrix that is
    /// not 3x3.
    pub fn to_matrix(&self, ctx: &OpContext) -> Result<Mat3> {
        match self {
            Self::Transform(op) => op.matrix(),
            Self::Crop(op) => Ok(op.matrix(ctx)),
            Self::Resize(op) => Ok(op.matrix(ctx)),
            Self::Mirror(op) => Ok(op.matrix(ctx)),
            Self::Matrix(op) => op.to_mat3(),
            _ => Err(Error::not_geometric(self.kind().as_str())),
        }
    }

    /// Canvas size after this operator. Non-geometric operators keep the
    /// canvas.
    pub fn canvas_after(&self, ctx: &OpContext) -> DVec2 {
        match self {
            Self::Crop(op) => op.canvas_after(ctx),
            Self::Resize(op) => op.canvas_after(ctx),
            _ => ctx.canvas,
        }
    }

    /// This operator's own contribution to a command line.
    ///
    /// Processors usually do not call this for geometric operators; they
    /// fold the whole chain into one warp instead.
    pub fn to_flags(&self, ctx: &OpContext) -> Result<Vec<String>> {
        Ok(match self {
            Self::ColorSpace(op) => op.flags_for(op.role.unwrap_or(Anchor::Input)),
            Self::ColorConvert(op) => op.flags(),
            Self::Cdl(op) => op.flags()?,
            Self::Lut(op) => op.flags()?,
            Self::Look(op) => op.flags(),
            Self::Transform(op) => warp_flags(&op.matrix()?, DEFAULT_WARP_FILTER),
            Self::Crop(op) => op.flags(ctx),
            Self::Resize(op) => op.flags(),
            Self::Mirror(op) => op.flags(),
            Self::Matrix(op) => warp_flags(&op.to_mat3()?, DEFAULT_WARP_FILTER),
            Self::Text(op) => op.flags(),
        })
    }
}

impl TryFrom<Params> for Operator {
    type Error = Error;

    fn try_from(params: Params) -> Result<Self> {
        Self::from_params(params)
    }
}

impl From<Operator> for Params {
    fn from(op: Operator) -> Self {
        op.to_params()
    }
}

macro_rules! impl_from_op {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Operator {
                fn from(op: $ty) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from_op!(
    ColorSpace(ColorSpace),
    ColorConvert(ColorConvert),
    Cdl(Cdl),
    Lut(Lut),
    Look(Look),
    Transform(Transform),
    Crop(Crop),
    Resize(Resize),
    Mirror(Mirror),
    Matrix(MatrixOp),
    Text(Text),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Position;
    use serde_json::json;

    fn params(v: Value) -> Params {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn build(v: Value) -> Result<Operator> {
        Operator::from_params(params(v))
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!("OCIOFileTransform".parse::<OperatorKind>().unwrap(), OperatorKind::Lut);
        assert_eq!("Mirror2".parse::<OperatorKind>().unwrap(), OperatorKind::Mirror);
        assert_eq!("OCIOColorSpace".parse::<OperatorKind>().unwrap(), OperatorKind::ColorConvert);
        assert_eq!("reformat".parse::<OperatorKind>().unwrap(), OperatorKind::Resize);
        for kind in OperatorKind::ALL {
            assert_eq!(kind.as_str().parse::<OperatorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err = build(json!({"kind": "blur", "size": 3})).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperatorKind { ref kind } if kind == "blur"));
    }

    #[test]
    fn test_missing_kind() {
        let err = build(json!({"scale": 2})).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterKind { ref field, .. } if field == "kind"));
    }

    #[test]
    fn test_non_numeric_scale() {
        let err = build(json!({"kind": "transform", "scale": "big"})).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterKind { ref kind, .. } if kind == "transform"));
    }

    #[test]
    fn test_missing_required_field() {
        let err = build(json!({"kind": "lut"})).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterKind { ref field, .. } if field == "file"));
    }

    #[test]
    fn test_not_geometric() {
        let op = build(json!({"kind": "cdl", "slope": [1, 1, 1]})).unwrap();
        let err = op.to_matrix(&OpContext::default()).unwrap_err();
        assert!(matches!(err, Error::NotGeometric { ref kind } if kind == "cdl"));
    }

    #[test]
    fn test_transform_flags() {
        let op = build(json!({"kind": "transform", "scale": 0.5})).unwrap();
        let flags = op.to_flags(&OpContext::default()).unwrap();
        assert_eq!(
            flags,
            ["--warp:filter=cubic:recompute_roi=1", "0.5,0.0,0.0,0.0,0.5,0.0,0.0,0.0,1.0"]
        );
    }

    #[test]
    fn test_collection_id_rejected_on_render() {
        let op = build(json!({"kind": "lut", "file": "grades.ccc", "cccid": "sh010"})).unwrap();
        assert_eq!(op.to_params()["cccid"], "sh010");
        let err = op.to_flags(&OpContext::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterKind { ref kind, ref field, .. }
            if kind == "lut" && field == "cccid"));
    }

    #[test]
    fn test_matrix_kind_dimensionality() {
        let op = build(json!({"kind": "matrix", "matrix": [1, 0, 0, 1]})).unwrap();
        let err = op.to_matrix(&OpContext::default()).unwrap_err();
        assert!(matches!(err, Error::IncompatibleDimensionality { rows: 2, cols: 2 }));

        let op = build(json!({"kind": "matrix", "matrix": [1, 0, 5, 0, 1, 0, 0, 0, 1]})).unwrap();
        assert_eq!(op.to_matrix(&OpContext::default()).unwrap(), Mat3::translation(5.0, 0.0));
    }

    #[test]
    fn test_params_roundtrip() {
        let ops: Vec<Operator> = vec![
            Transform::new().with_translate(12.5, -3.0).with_rotate(7.25).into(),
            Crop::relative(0.1, 0.2, 0.5, 0.5).into(),
            Resize::new(0, 1080).into(),
            Mirror::new(true, false).into(),
            MatrixOp::new(Mat3::rotation_degrees(33.0)).into(),
            ColorSpace::output("Output - sRGB").into(),
            Cdl::new().with_slope([1.1, 0.9, 1.0]).into(),
            Lut::new("a.cube").inverse().into(),
            Look::new("grade").into(),
            ColorConvert::new("a", "b").into(),
            Text::new("slate", Position::BottomCenter).into(),
        ];
        for op in ops {
            let rebuilt = Operator::from_params(op.to_params()).unwrap();
            assert_eq!(rebuilt, op);
        }
    }

    #[test]
    fn test_serde_as_mapping() {
        let op: Operator = serde_json::from_value(json!({"kind": "Crop", "box": [0, 0, 960, 540]}))
            .unwrap();
        assert_eq!(op, Operator::Crop(Crop::new(0.0, 0.0, 960.0, 540.0)));
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["kind"], "crop");
    }
}
