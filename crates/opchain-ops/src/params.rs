//! Parameter mappings and the field parsers shared by operator kinds.
//!
//! A parameter mapping is a JSON object keyed like the operator's fields,
//! plus a `kind` tag. Typed parsing goes through serde; any serde failure
//! is reported as [`Error::InvalidParameterKind`] naming the field when
//! serde does.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use opchain_core::{Error, Result};

/// A raw parameter mapping.
pub type Params = Map<String, Value>;

/// Parses `params` into `T`, mapping serde failures to
/// [`Error::InvalidParameterKind`].
pub(crate) fn parse<T: DeserializeOwned>(kind: &str, params: Params) -> Result<T> {
    serde_json::from_value(Value::Object(params)).map_err(|e| {
        let reason = e.to_string();
        Error::invalid_parameter(kind, field_in(&reason).unwrap_or("*"), reason.clone())
    })
}

/// Serializes a parameter struct back to a mapping.
pub(crate) fn to_params<T: Serialize>(value: &T) -> Params {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        // parameter structs always serialize to objects
        _ => Params::new(),
    }
}

// serde names the field between backticks: "missing field `file`"
fn field_in(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

/// Deserializes either a scalar (`1.5`) or a pair (`[1.5, 2.0]`).
pub(crate) fn pair<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<[f64; 2], D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PairOrScalar {
        Scalar(f64),
        Pair([f64; 2]),
    }

    Ok(match PairOrScalar::deserialize(d)? {
        PairOrScalar::Scalar(v) => [v, v],
        PairOrScalar::Pair(p) => p,
    })
}

/// Transform direction for file/CDL/look transforms.
///
/// Accepts `"forward"`/`"inverse"` or `0`/`1` on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply as authored
    #[default]
    Forward,
    /// Apply the inverse
    Inverse,
}

impl Direction {
    /// Returns true for [`Direction::Inverse`].
    pub fn is_inverse(self) -> bool {
        self == Self::Inverse
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Index(i64),
        }

        match Raw::deserialize(d)? {
            Raw::Text(s) if s.eq_ignore_ascii_case("inverse") => Ok(Self::Inverse),
            Raw::Text(s) if s.eq_ignore_ascii_case("forward") => Ok(Self::Forward),
            Raw::Index(0) => Ok(Self::Forward),
            Raw::Index(1) => Ok(Self::Inverse),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "unknown direction '{s}', expected forward or inverse"
            ))),
            Raw::Index(i) => Err(serde::de::Error::custom(format!(
                "unknown direction {i}, expected 0 or 1"
            ))),
        }
    }
}

/// LUT interpolation. Unrecognized names map to [`Interpolation::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Linear
    #[default]
    Linear,
    /// Best available
    Best,
    /// Nearest neighbour
    Nearest,
    /// Tetrahedral (3D LUTs)
    Tetrahedral,
    /// Cubic
    Cubic,
    /// Tool default
    #[serde(other)]
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        #[serde(deserialize_with = "pair")]
        scale: [f64; 2],
        #[serde(default)]
        direction: Direction,
        #[serde(default)]
        interpolation: Interpolation,
    }

    fn map(v: Value) -> Params {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_pair_scalar_and_array() {
        let p: Sample = parse("sample", map(json!({"scale": 1.075}))).unwrap();
        assert_eq!(p.scale, [1.075, 1.075]);
        let p: Sample = parse("sample", map(json!({"scale": [0.5, 2.0]}))).unwrap();
        assert_eq!(p.scale, [0.5, 2.0]);
    }

    #[test]
    fn test_direction_forms() {
        let p: Sample = parse("sample", map(json!({"scale": 1, "direction": 1}))).unwrap();
        assert_eq!(p.direction, Direction::Inverse);
        let p: Sample = parse("sample", map(json!({"scale": 1, "direction": "forward"}))).unwrap();
        assert_eq!(p.direction, Direction::Forward);
        assert!(parse::<Sample>("sample", map(json!({"scale": 1, "direction": 5}))).is_err());
    }

    #[test]
    fn test_interpolation_fallback() {
        let p: Sample = parse("sample", map(json!({"scale": 1, "interpolation": "wobbly"}))).unwrap();
        assert_eq!(p.interpolation, Interpolation::Default);
    }

    #[test]
    fn test_error_names_field() {
        let err = parse::<Sample>("sample", map(json!({}))).unwrap_err();
        match err {
            Error::InvalidParameterKind { kind, field, .. } => {
                assert_eq!(kind, "sample");
                assert_eq!(field, "scale");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = parse::<Sample>("sample", map(json!({"scale": 1, "bogus": 2}))).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterKind { ref field, .. } if field == "bogus"));
    }
}
