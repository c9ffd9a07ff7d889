//! Geometric operators.
//!
//! Every geometric operator yields a 3x3 affine matrix mapping points of
//! the incoming canvas to points of the outgoing canvas, plus the size of
//! the outgoing canvas. Matrices use column vectors: `p' = M * p`.
//!
//! # Matrices
//!
//! | Operator | Matrix | Canvas after |
//! |----------|--------|--------------|
//! | [`Transform`] | `T(t) * T(c) * S * R * K * T(-c)` (inverted if `invert`) | unchanged |
//! | [`Crop`] | `T(-x, -y)` | `w x h` |
//! | [`Resize`] | scale (+ centring offset for non-stretch fits) | target |
//! | [`Mirror`] | `T(w, 0) * S(-1, 1)` and/or `T(0, h) * S(1, -1)` | unchanged |
//! | [`MatrixOp`] | as authored | unchanged |

use serde::{Deserialize, Deserializer, Serialize};

use opchain_core::format::{float_repr, number_list};
use opchain_core::{Error, Result};
use opchain_math::Mat3;
use opchain_math::glam::DVec2;

use crate::context::OpContext;
use crate::params::pair;

/// Default filter for `--warp`.
pub const DEFAULT_WARP_FILTER: &str = "cubic";

/// Renders a composite matrix as the still-image tool's warp flag group.
///
/// The tool reads the matrix in row-vector form, so the values are the
/// transpose of `m`, row by row.
///
/// ```rust
/// use opchain_math::Mat3;
/// use opchain_ops::warp_flags;
///
/// let flags = warp_flags(&Mat3::scaling(0.5, 0.5), "cubic");
/// assert_eq!(flags[0], "--warp:filter=cubic:recompute_roi=1");
/// assert_eq!(flags[1], "0.5,0.0,0.0,0.0,0.5,0.0,0.0,0.0,1.0");
/// ```
pub fn warp_flags(m: &Mat3, filter: &str) -> Vec<String> {
    let values = m
        .transpose()
        .to_flat()
        .iter()
        .map(|v| float_repr(*v))
        .collect::<Vec<_>>()
        .join(",");
    vec![format!("--warp:filter={filter}:recompute_roi=1"), values]
}

fn finite(kind: &str, field: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::invalid_parameter(kind, field, "must be finite"))
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Order in which the two skew components are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkewOrder {
    /// `Kx * Ky` (Y skew applied first)
    #[default]
    #[serde(alias = "xy")]
    XY,
    /// `Ky * Kx` (X skew applied first)
    #[serde(alias = "yx")]
    YX,
}

/// Pan, rotate, zoom and skew around a center point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transform {
    /// Translation in pixels
    #[serde(default)]
    pub translate: [f64; 2],
    /// Counter-clockwise rotation in degrees
    #[serde(default)]
    pub rotate: f64,
    /// Scale factors; a scalar applies to both axes
    #[serde(default = "unit_scale", deserialize_with = "pair")]
    pub scale: [f64; 2],
    /// Pivot for rotate, scale and skew
    #[serde(default)]
    pub center: [f64; 2],
    /// Applies the inverse transform
    #[serde(default)]
    pub invert: bool,
    /// Horizontal skew in degrees
    #[serde(default, alias = "skewX")]
    pub skew_x: f64,
    /// Vertical skew in degrees
    #[serde(default, alias = "skewY")]
    pub skew_y: f64,
    /// Skew application order
    #[serde(default)]
    pub skew_order: SkewOrder,
}

fn unit_scale() -> [f64; 2] {
    [1.0, 1.0]
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate: [0.0; 2],
            rotate: 0.0,
            scale: unit_scale(),
            center: [0.0; 2],
            invert: false,
            skew_x: 0.0,
            skew_y: 0.0,
            skew_order: SkewOrder::XY,
        }
    }
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the translation.
    pub fn with_translate(mut self, x: f64, y: f64) -> Self {
        self.translate = [x, y];
        self
    }

    /// Sets the rotation in degrees.
    pub fn with_rotate(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }

    /// Sets a uniform scale.
    pub fn with_scale(mut self, s: f64) -> Self {
        self.scale = [s, s];
        self
    }

    /// Sets the pivot.
    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center = [x, y];
        self
    }

    /// Marks the transform as inverted.
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        finite("transform", "translate", &self.translate)?;
        finite("transform", "rotate", &[self.rotate])?;
        finite("transform", "scale", &self.scale)?;
        finite("transform", "center", &self.center)?;
        finite("transform", "skew_x", &[self.skew_x])?;
        finite("transform", "skew_y", &[self.skew_y])?;
        self.matrix().map(|_| ())
    }

    /// The transform matrix. Fails when `invert` is set and the forward
    /// matrix is singular.
    pub fn matrix(&self) -> Result<Mat3> {
        let [tx, ty] = self.translate;
        let [cx, cy] = self.center;
        let skew = match self.skew_order {
            SkewOrder::XY => Mat3::skew_x_degrees(self.skew_x) * Mat3::skew_y_degrees(self.skew_y),
            SkewOrder::YX => Mat3::skew_y_degrees(self.skew_y) * Mat3::skew_x_degrees(self.skew_x),
        };
        let forward = Mat3::translation(tx, ty)
            * Mat3::translation(cx, cy)
            * Mat3::scaling(self.scale[0], self.scale[1])
            * Mat3::rotation_degrees(self.rotate)
            * skew
            * Mat3::translation(-cx, -cy);

        if !self.invert {
            return Ok(forward);
        }
        forward
            .inverse()
            .ok_or_else(|| Error::invalid_parameter("transform", "invert", "matrix is singular"))
    }
}

// ============================================================================
// Crop
// ============================================================================

/// Crop region. The canvas after a crop is the region size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CropRecord")]
pub struct Crop {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Region width
    pub w: f64,
    /// Region height
    pub h: f64,
    /// Values are ratios of the original source resolution
    pub relative: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CropRecord {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default, alias = "width")]
    w: Option<f64>,
    #[serde(default, alias = "height")]
    h: Option<f64>,
    #[serde(default, rename = "box")]
    region: Option<[f64; 4]>,
    #[serde(default)]
    relative: bool,
}

impl TryFrom<CropRecord> for Crop {
    type Error = String;

    fn try_from(r: CropRecord) -> std::result::Result<Self, String> {
        let [x, y, w, h] = match (r.region, r.w, r.h) {
            (Some(b), None, None) if r.x.is_none() && r.y.is_none() => b,
            (Some(_), ..) => return Err("`box` cannot be combined with x/y/w/h".into()),
            (None, Some(w), Some(h)) => [r.x.unwrap_or(0.0), r.y.unwrap_or(0.0), w, h],
            (None, None, _) => return Err("missing field `w` (or `box`)".into()),
            (None, _, None) => return Err("missing field `h` (or `box`)".into()),
        };
        Ok(Self {
            x,
            y,
            w,
            h,
            relative: r.relative,
        })
    }
}

impl Crop {
    /// Pixel crop region.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            relative: false,
        }
    }

    /// Crop region given as ratios of the source resolution.
    pub fn relative(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            relative: true,
            ..Self::new(x, y, w, h)
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        finite("crop", "box", &[self.x, self.y, self.w, self.h])?;
        if self.w <= 0.0 {
            return Err(Error::invalid_parameter("crop", "w", "must be positive"));
        }
        if self.h <= 0.0 {
            return Err(Error::invalid_parameter("crop", "h", "must be positive"));
        }
        Ok(())
    }

    /// Region in pixels as `[x, y, w, h]`.
    pub fn region(&self, ctx: &OpContext) -> [f64; 4] {
        if !self.relative {
            return [self.x, self.y, self.w, self.h];
        }
        let src = ctx.source_size();
        [self.x * src.x, self.y * src.y, self.w * src.x, self.h * src.y]
    }

    /// `T(-x, -y)`.
    pub fn matrix(&self, ctx: &OpContext) -> Mat3 {
        let [x, y, ..] = self.region(ctx);
        Mat3::translation(-x, -y)
    }

    /// Region size.
    pub fn canvas_after(&self, ctx: &OpContext) -> DVec2 {
        let [_, _, w, h] = self.region(ctx);
        DVec2::new(w, h)
    }

    /// `--crop xmin,ymin,xmax,ymax`.
    pub fn flags(&self, ctx: &OpContext) -> Vec<String> {
        let [x, y, w, h] = self.region(ctx);
        let corners = [x.round(), y.round(), (x + w).round(), (y + h).round()];
        vec!["--crop".into(), number_list(&corners)]
    }
}

// ============================================================================
// Resize
// ============================================================================

/// How a resize maps the canvas onto the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale each axis independently to the target
    #[default]
    #[serde(alias = "exact")]
    Stretch,
    /// Uniform scale fitting the whole canvas, centred
    #[serde(alias = "fit")]
    Letterbox,
    /// Uniform scale matching the target width, centred vertically
    Width,
    /// Uniform scale matching the target height, centred horizontally
    Height,
}

impl Fit {
    /// Lowercase name, as used by `--fit:fillmode=`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stretch => "stretch",
            Self::Letterbox => "letterbox",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

/// Reformat to a target resolution. A zero dimension keeps the aspect
/// ratio of the current canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resize {
    /// Target width
    #[serde(default, alias = "width")]
    pub w: u32,
    /// Target height
    #[serde(default, alias = "height")]
    pub h: u32,
    /// Fit mode
    #[serde(default)]
    pub fit: Fit,
}

impl Resize {
    /// Stretching resize.
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            fit: Fit::Stretch,
        }
    }

    /// Sets the fit mode.
    pub fn with_fit(mut self, fit: Fit) -> Self {
        self.fit = fit;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.w == 0 && self.h == 0 {
            return Err(Error::invalid_parameter(
                "resize",
                "w",
                "at least one of w and h must be non-zero",
            ));
        }
        Ok(())
    }

    /// Target size with zero dimensions resolved from the canvas aspect.
    pub fn target(&self, ctx: &OpContext) -> DVec2 {
        let canvas = ctx.canvas;
        let (w, h) = (f64::from(self.w), f64::from(self.h));
        match (self.w, self.h) {
            (0, _) if canvas.y > 0.0 => DVec2::new((h * canvas.x / canvas.y).round(), h),
            (_, 0) if canvas.x > 0.0 => DVec2::new(w, (w * canvas.y / canvas.x).round()),
            _ => DVec2::new(w, h),
        }
    }

    /// Scale from the exact current canvas to the target, centred for
    /// uniform fits.
    pub fn matrix(&self, ctx: &OpContext) -> Mat3 {
        let canvas = ctx.canvas;
        let target = self.target(ctx);
        if canvas.x <= 0.0 || canvas.y <= 0.0 {
            return Mat3::IDENTITY;
        }
        let sx = target.x / canvas.x;
        let sy = target.y / canvas.y;
        let s = match self.fit {
            Fit::Stretch => return Mat3::scaling(sx, sy),
            Fit::Letterbox => sx.min(sy),
            Fit::Width => sx,
            Fit::Height => sy,
        };
        let offset = (target - canvas * s) / 2.0;
        Mat3::translation(offset.x, offset.y) * Mat3::scaling(s, s)
    }

    /// Target size.
    pub fn canvas_after(&self, ctx: &OpContext) -> DVec2 {
        self.target(ctx)
    }

    /// `--resize WxH` or `--fit:fillmode=MODE WxH`.
    pub fn flags(&self) -> Vec<String> {
        let size = format!("{}x{}", self.w, self.h);
        match self.fit {
            Fit::Stretch => vec!["--resize".into(), size],
            fit => vec![format!("--fit:fillmode={}", fit.as_str()), size],
        }
    }
}

// ============================================================================
// Mirror
// ============================================================================

/// Mirror around the current canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mirror {
    /// Mirror vertically (top to bottom)
    #[serde(default)]
    pub flip: bool,
    /// Mirror horizontally (left to right)
    #[serde(default)]
    pub flop: bool,
}

impl Mirror {
    /// Creates a mirror.
    pub fn new(flip: bool, flop: bool) -> Self {
        Self { flip, flop }
    }

    /// Flop then flip.
    pub fn matrix(&self, ctx: &OpContext) -> Mat3 {
        let DVec2 { x: w, y: h } = ctx.canvas;
        let mut m = Mat3::IDENTITY;
        if self.flop {
            m = Mat3::translation(w, 0.0) * Mat3::scaling(-1.0, 1.0) * m;
        }
        if self.flip {
            m = Mat3::translation(0.0, h) * Mat3::scaling(1.0, -1.0) * m;
        }
        m
    }

    /// `--flop` and/or `--flip`.
    pub fn flags(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.flop {
            args.push("--flop".to_string());
        }
        if self.flip {
            args.push("--flip".to_string());
        }
        args
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// A raw affine matrix.
///
/// Values are kept as authored; the 3x3 shape is checked when the matrix
/// is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixOp {
    /// Matrix rows
    #[serde(alias = "values", deserialize_with = "rows")]
    pub matrix: Vec<Vec<f64>>,
}

// Rows, or a flat list: square lengths become n x n, anything else one row.
fn rows<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<Vec<f64>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Rows(Vec<Vec<f64>>),
        Flat(Vec<f64>),
    }

    Ok(match Shape::deserialize(d)? {
        Shape::Rows(rows) => rows,
        Shape::Flat(values) => {
            let n = (values.len() as f64).sqrt().round() as usize;
            if n > 0 && n * n == values.len() {
                values.chunks(n).map(<[f64]>::to_vec).collect()
            } else {
                vec![values]
            }
        }
    })
}

impl MatrixOp {
    /// Wraps a matrix.
    pub fn new(m: Mat3) -> Self {
        Self {
            matrix: m.m.iter().map(|r| r.to_vec()).collect(),
        }
    }

    /// Raw rows of any shape.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self { matrix: rows }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let values: Vec<f64> = self.matrix.iter().flatten().copied().collect();
        if values.is_empty() {
            return Err(Error::invalid_parameter("matrix", "matrix", "must not be empty"));
        }
        finite("matrix", "matrix", &values)
    }

    /// The matrix; fails with `IncompatibleDimensionality` unless 3x3.
    pub fn to_mat3(&self) -> Result<Mat3> {
        Mat3::try_from_rows(&self.matrix)
    }
}
