//! Color operators.
//!
//! Color operators never own color science. They reference OCIO config
//! entities (colorspaces, looks) and LUT files by string and render the
//! matching still-image tool flags:
//!
//! | Operator | Flags |
//! |----------|-------|
//! | [`ColorSpace`] (input) | `--iscolorspace NAME` |
//! | [`ColorSpace`] (output) | `--tocolorspace NAME` |
//! | [`ColorConvert`] | `--colorconvert FROM TO` |
//! | [`Cdl`] inline | `--mulc S --addc O --clamp:min=0 --powc P [--saturate SAT]` |
//! | [`Cdl`] file / [`Lut`] | `--ociofiletransform[:inverse=1] PATH` |
//! | [`Look`] | `--ociolook[:inverse=1] NAME` |

use serde::{Deserialize, Serialize};
use tracing::warn;

use opchain_core::format::number_list;
use opchain_core::{Error, Result};

use crate::params::{Direction, Interpolation};

/// Position of a colorspace declaration in the computed flag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Declares the colorspace of the incoming image
    Input,
    /// Declares the colorspace to convert to at the end
    Output,
}

impl Anchor {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// An anchor declaration: names the input or output colorspace.
///
/// Without an explicit `role` the color processor infers one from the
/// declaration's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorSpace {
    /// Colorspace name as known to the active OCIO config
    #[serde(alias = "colorspace", alias = "name")]
    pub value: String,
    /// Explicit anchor role
    #[serde(default)]
    pub role: Option<Anchor>,
}

impl ColorSpace {
    /// Declaration without an explicit role.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            role: None,
        }
    }

    /// Input declaration.
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            role: Some(Anchor::Input),
        }
    }

    /// Output declaration.
    pub fn output(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            role: Some(Anchor::Output),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        non_empty("colorspace", "value", &self.value)
    }

    /// Flags for this declaration in the given role.
    pub fn flags_for(&self, role: Anchor) -> Vec<String> {
        let flag = match role {
            Anchor::Input => "--iscolorspace",
            Anchor::Output => "--tocolorspace",
        };
        vec![flag.to_string(), self.value.clone()]
    }
}

/// Explicit conversion between two named colorspaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorConvert {
    /// Source colorspace
    #[serde(alias = "in_colorspace", alias = "src")]
    pub from: String,
    /// Destination colorspace
    #[serde(alias = "out_colorspace", alias = "dst")]
    pub to: String,
}

impl ColorConvert {
    /// Creates a conversion.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        non_empty("colorconvert", "from", &self.from)?;
        non_empty("colorconvert", "to", &self.to)
    }

    /// `--colorconvert FROM TO`.
    pub fn flags(&self) -> Vec<String> {
        vec!["--colorconvert".into(), self.from.clone(), self.to.clone()]
    }
}

/// ASC CDL correction, either inline (slope/offset/power/saturation) or
/// read from a `.cc`/`.ccc`/`.cdl` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cdl {
    /// Slope (multiply) per channel [R, G, B]
    #[serde(default = "ones")]
    pub slope: [f64; 3],
    /// Offset (add) per channel [R, G, B]
    #[serde(default)]
    pub offset: [f64; 3],
    /// Power per channel [R, G, B]
    #[serde(default = "ones")]
    pub power: [f64; 3],
    /// Saturation (1.0 = no change)
    #[serde(default = "one", alias = "sat")]
    pub saturation: f64,
    /// Correction file; when set the inline values are not used
    #[serde(default)]
    pub file: Option<String>,
    /// Correction id inside a collection file
    #[serde(default)]
    pub cccid: Option<String>,
    /// Transform direction
    #[serde(default)]
    pub direction: Direction,
    /// Interpolation for file-based corrections
    #[serde(default)]
    pub interpolation: Interpolation,
}

fn ones() -> [f64; 3] {
    [1.0; 3]
}

fn one() -> f64 {
    1.0
}

impl Default for Cdl {
    fn default() -> Self {
        Self {
            slope: ones(),
            offset: [0.0; 3],
            power: ones(),
            saturation: 1.0,
            file: None,
            cccid: None,
            direction: Direction::Forward,
            interpolation: Interpolation::Linear,
        }
    }
}

impl Cdl {
    /// Identity correction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the slope values.
    pub fn with_slope(mut self, slope: [f64; 3]) -> Self {
        self.slope = slope;
        self
    }

    /// Sets the offset values.
    pub fn with_offset(mut self, offset: [f64; 3]) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the power values.
    pub fn with_power(mut self, power: [f64; 3]) -> Self {
        self.power = power;
        self
    }

    /// Sets the saturation.
    pub fn with_saturation(mut self, sat: f64) -> Self {
        self.saturation = sat;
        self
    }

    /// Uses a correction file instead of inline values.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    fn file(&self) -> Option<&str> {
        self.file.as_deref().filter(|f| !f.is_empty())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let values = self
            .slope
            .iter()
            .chain(&self.offset)
            .chain(&self.power)
            .chain(std::iter::once(&self.saturation));
        for v in values {
            if !v.is_finite() {
                return Err(Error::invalid_parameter("cdl", "*", "values must be finite"));
            }
        }
        if self.power.iter().any(|p| *p < 0.0) {
            return Err(Error::invalid_parameter("cdl", "power", "must not be negative"));
        }
        if self.saturation < 0.0 {
            return Err(Error::invalid_parameter("cdl", "saturation", "must not be negative"));
        }
        if self.file().is_none() && self.direction.is_inverse() {
            return Err(Error::invalid_parameter(
                "cdl",
                "direction",
                "inverse is only supported for file-based corrections",
            ));
        }
        Ok(())
    }

    /// Flags applying this correction.
    ///
    /// Fails with `InvalidParameterKind` when a `cccid` is set: the still
    /// image tool cannot select one correction out of a collection.
    pub fn flags(&self) -> Result<Vec<String>> {
        if let Some(file) = self.file() {
            return file_transform(
                "cdl",
                file,
                self.cccid.as_deref(),
                self.direction,
                self.interpolation,
            );
        }

        let mut args = vec![
            "--mulc".to_string(),
            number_list(&self.slope),
            "--addc".to_string(),
            number_list(&self.offset),
            // ASC CDL clamps negatives before the power stage
            "--clamp:min=0".to_string(),
            "--powc".to_string(),
            number_list(&self.power),
        ];
        if self.saturation != 1.0 {
            args.push("--saturate".to_string());
            args.push(opchain_core::format::number(self.saturation));
        }
        Ok(args)
    }
}

/// A LUT file applied through OCIO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Lut {
    /// LUT path
    #[serde(alias = "src")]
    pub file: String,
    /// Correction id for collection files
    #[serde(default)]
    pub cccid: Option<String>,
    /// Transform direction
    #[serde(default)]
    pub direction: Direction,
    /// Interpolation
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Lut {
    /// Forward LUT with default interpolation.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            cccid: None,
            direction: Direction::Forward,
            interpolation: Interpolation::Linear,
        }
    }

    /// Applies the LUT inverted.
    pub fn inverse(mut self) -> Self {
        self.direction = Direction::Inverse;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        non_empty("lut", "file", &self.file)
    }

    /// `--ociofiletransform PATH`; fails when a `cccid` is set.
    pub fn flags(&self) -> Result<Vec<String>> {
        file_transform(
            "lut",
            &self.file,
            self.cccid.as_deref(),
            self.direction,
            self.interpolation,
        )
    }
}

/// An OCIO look referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Look {
    /// Look name
    #[serde(alias = "look")]
    pub name: String,
    /// Transform direction
    #[serde(default)]
    pub direction: Direction,
}

impl Look {
    /// Forward look.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Forward,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        non_empty("look", "name", &self.name)
    }

    /// `--ociolook NAME`.
    pub fn flags(&self) -> Vec<String> {
        let flag = if self.direction.is_inverse() {
            "--ociolook:inverse=1"
        } else {
            "--ociolook"
        };
        vec![flag.to_string(), self.name.clone()]
    }
}

// --ociofiletransform takes neither a correction id nor an interpolation.
fn file_transform(
    kind: &str,
    file: &str,
    cccid: Option<&str>,
    direction: Direction,
    interpolation: Interpolation,
) -> Result<Vec<String>> {
    if let Some(id) = cccid.filter(|id| !id.trim().is_empty()) {
        return Err(Error::invalid_parameter(
            kind,
            "cccid",
            format!("cannot select '{id}' from '{file}'; export that correction to its own file"),
        ));
    }
    if !matches!(interpolation, Interpolation::Linear | Interpolation::Default) {
        warn!(kind, file, ?interpolation, "interpolation ignored, the tool default applies");
    }
    let flag = if direction.is_inverse() {
        "--ociofiletransform:inverse=1"
    } else {
        "--ociofiletransform"
    };
    Ok(vec![flag.to_string(), file.replace('\\', "/")])
}

fn non_empty(kind: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_parameter(kind, field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorspace_flags() {
        let cs = ColorSpace::new("ACES - ACEScg");
        assert_eq!(cs.flags_for(Anchor::Input), ["--iscolorspace", "ACES - ACEScg"]);
        assert_eq!(cs.flags_for(Anchor::Output), ["--tocolorspace", "ACES - ACEScg"]);
        assert!(ColorSpace::new(" ").validate().is_err());
    }

    #[test]
    fn test_cdl_inline_flags() {
        let cdl = Cdl::new()
            .with_slope([1.1, 1.0, 0.9])
            .with_offset([0.01, 0.0, -0.01])
            .with_saturation(1.2);
        assert_eq!(
            cdl.flags().unwrap(),
            [
                "--mulc", "1.1,1,0.9", "--addc", "0.01,0,-0.01", "--clamp:min=0", "--powc",
                "1,1,1", "--saturate", "1.2",
            ]
        );
    }

    #[test]
    fn test_cdl_identity_saturation_omitted() {
        let flags = Cdl::new().flags().unwrap();
        assert!(!flags.iter().any(|f| f == "--saturate"));
    }

    #[test]
    fn test_cdl_file_flags() {
        let mut cdl = Cdl::new().with_file("grades\\sh010.cc");
        assert_eq!(cdl.flags().unwrap(), ["--ociofiletransform", "grades/sh010.cc"]);
        cdl.direction = Direction::Inverse;
        assert_eq!(cdl.flags().unwrap()[0], "--ociofiletransform:inverse=1");
    }

    #[test]
    fn test_cdl_inline_inverse_rejected() {
        let mut cdl = Cdl::new();
        cdl.direction = Direction::Inverse;
        assert!(cdl.validate().is_err());
    }

    #[test]
    fn test_lut_and_look_flags() {
        assert_eq!(Lut::new("show.cube").flags().unwrap(), ["--ociofiletransform", "show.cube"]);
        assert_eq!(
            Lut::new("show.cube").inverse().flags().unwrap(),
            ["--ociofiletransform:inverse=1", "show.cube"]
        );
        assert_eq!(Look::new("shot_grade").flags(), ["--ociolook", "shot_grade"]);
    }

    #[test]
    fn test_cccid_cannot_be_rendered() {
        let mut lut = Lut::new("grades.ccc");
        lut.cccid = Some("sh010".into());
        let err = lut.flags().unwrap_err();
        assert!(matches!(err, Error::InvalidParameterKind { ref field, .. } if field == "cccid"));
        assert!(err.to_string().contains("sh010"));

        let mut cdl = Cdl::new().with_file("grades.ccc");
        cdl.cccid = Some("sh020".into());
        assert!(cdl.flags().is_err());

        // an empty id selects nothing
        lut.cccid = Some(String::new());
        assert_eq!(lut.flags().unwrap(), ["--ociofiletransform", "grades.ccc"]);
    }

    #[test]
    fn test_colorconvert_flags() {
        let cc = ColorConvert::new("ACES - ACEScg", "Output - sRGB");
        assert_eq!(cc.flags(), ["--colorconvert", "ACES - ACEScg", "Output - sRGB"]);
    }
}
