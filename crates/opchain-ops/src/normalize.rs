//! Chain normalization.
//!
//! A chain may arrive as parameter mappings, as built operators, as a
//! mix of both, or one element at a time. [`normalize`] is the single
//! boundary that turns any of these shapes into an ordered `Vec<Operator>`.
//!
//! ```rust
//! use opchain_ops::{normalize, Operator, Resize};
//! use serde_json::json;
//!
//! let chain = normalize(json!([
//!     {"kind": "crop", "x": 0, "y": 0, "w": 960, "h": 540},
//!     {"kind": "resize", "w": 1920, "h": 1080},
//! ])).unwrap();
//! assert_eq!(chain[1], Operator::Resize(Resize::new(1920, 1080)));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use opchain_core::{Error, Result};

use crate::operator::Operator;
use crate::params::Params;

/// One chain element: a raw record or a built operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpSpec {
    /// Built operator
    Operator(Operator),
    /// Raw parameter mapping with a `kind` tag
    Record(Value),
}

impl OpSpec {
    /// Resolves this element to an operator.
    pub fn into_operator(self) -> Result<Operator> {
        match self {
            Self::Operator(op) => Ok(op),
            Self::Record(Value::Object(params)) => Operator::from_params(params),
            Self::Record(other) => Err(Error::invalid_parameter(
                "?",
                "*",
                format!("operator record must be a mapping, got {other}"),
            )),
        }
    }
}

impl From<Operator> for OpSpec {
    fn from(op: Operator) -> Self {
        Self::Operator(op)
    }
}

impl From<Params> for OpSpec {
    fn from(params: Params) -> Self {
        Self::Record(Value::Object(params))
    }
}

impl From<Value> for OpSpec {
    fn from(value: Value) -> Self {
        Self::Record(value)
    }
}

/// Any accepted chain shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainInput {
    /// A single element
    One(OpSpec),
    /// An ordered sequence of elements
    Many(Vec<OpSpec>),
}

impl From<OpSpec> for ChainInput {
    fn from(spec: OpSpec) -> Self {
        Self::One(spec)
    }
}

impl From<Operator> for ChainInput {
    fn from(op: Operator) -> Self {
        Self::One(op.into())
    }
}

impl From<Params> for ChainInput {
    fn from(params: Params) -> Self {
        Self::One(params.into())
    }
}

/// A JSON array is a sequence; anything else is one element.
impl From<Value> for ChainInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Many(items.into_iter().map(OpSpec::Record).collect()),
            other => Self::One(OpSpec::Record(other)),
        }
    }
}

impl From<Vec<OpSpec>> for ChainInput {
    fn from(specs: Vec<OpSpec>) -> Self {
        Self::Many(specs)
    }
}

impl From<Vec<Operator>> for ChainInput {
    fn from(ops: Vec<Operator>) -> Self {
        Self::Many(ops.into_iter().map(OpSpec::Operator).collect())
    }
}

impl From<Vec<Params>> for ChainInput {
    fn from(records: Vec<Params>) -> Self {
        Self::Many(records.into_iter().map(OpSpec::from).collect())
    }
}

impl From<Vec<Value>> for ChainInput {
    fn from(records: Vec<Value>) -> Self {
        Self::Many(records.into_iter().map(OpSpec::Record).collect())
    }
}

/// Normalizes any chain shape into operators, preserving order.
///
/// The first malformed element aborts normalization with its error.
pub fn normalize(input: impl Into<ChainInput>) -> Result<Vec<Operator>> {
    match input.into() {
        ChainInput::One(spec) => Ok(vec![spec.into_operator()?]),
        ChainInput::Many(specs) => specs.into_iter().map(OpSpec::into_operator).collect(),
    }
}
