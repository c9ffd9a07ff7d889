//! Color chain processor.
//!
//! Colorspace declarations are anchors: whatever their authoring position,
//! the input declaration is emitted first and the output declaration last.
//! Everything between (conversions, CDLs, LUTs, looks) keeps its relative
//! authoring order.
//!
//! ```text
//! [--iscolorspace IN] <body in authoring order> [--tocolorspace OUT]
//! ```
//!
//! # Roles
//!
//! A declaration with an explicit `role` goes to that role. Declarations
//! without one are resolved among themselves:
//!
//! - when the default input (the probed source colorspace) matches one of
//!   them, that value is the input and every other value is an output;
//! - otherwise, in authoring order, the first is the input unless another
//!   declaration is explicitly the input, and every later one is the
//!   output. Repeating the input value collapses into the input.
//!
//! Two distinct values for one role raise `ChainOrderingConflict`.

use tracing::{debug, warn};

use opchain_core::{Error, Result};
use opchain_ops::{Anchor, ChainInput, ColorSpace, Family, OpContext, Operator};

use crate::processor::Processor;

/// Processor for the color family.
#[derive(Debug, Clone, Default)]
pub struct ColorProcessor {
    chain: Vec<Operator>,
    default_input: Option<String>,
}

/// Resolved anchors and body of a color chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPlan<'a> {
    /// Input colorspace
    pub input: Option<String>,
    /// Operators between the anchors, in authoring order
    pub body: Vec<&'a Operator>,
    /// Output colorspace
    pub output: Option<String>,
}

impl ColorProcessor {
    /// Creates an empty processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor from any chain shape.
    pub fn from_chain(input: impl Into<ChainInput>) -> Result<Self> {
        let mut p = Self::new();
        p.set_chain(input)?;
        Ok(p)
    }

    /// Input colorspace used when the chain declares none, typically the
    /// colorspace reported by a media probe.
    pub fn with_default_input(mut self, colorspace: impl Into<String>) -> Self {
        self.default_input = Some(colorspace.into());
        self
    }

    /// Resolves anchors and body without rendering flags.
    pub fn plan(&self) -> Result<ColorPlan<'_>> {
        let explicit_input = self.declarations().any(|cs| cs.role == Some(Anchor::Input));
        // a known source colorspace names the input among unroled declarations
        let known_input = self.default_input.as_deref().filter(|known| {
            !explicit_input
                && self
                    .declarations()
                    .any(|cs| cs.role.is_none() && cs.value == *known)
        });

        let mut input: Option<&str> = None;
        let mut output: Option<&str> = None;
        let mut body = Vec::new();
        let mut seen_unroled = false;

        for op in &self.chain {
            let Operator::ColorSpace(cs) = op else {
                body.push(op);
                continue;
            };
            let role = match cs.role {
                Some(role) => role,
                None if known_input.is_some() => {
                    if known_input == Some(cs.value.as_str()) {
                        Anchor::Input
                    } else {
                        Anchor::Output
                    }
                }
                None if !seen_unroled && !explicit_input => Anchor::Input,
                None if input == Some(cs.value.as_str()) => Anchor::Input,
                None => Anchor::Output,
            };
            if cs.role.is_none() {
                seen_unroled = true;
            }
            let slot = match role {
                Anchor::Input => &mut input,
                Anchor::Output => &mut output,
            };
            match *slot {
                None => *slot = Some(cs.value.as_str()),
                Some(first) if first == cs.value => {
                    warn!(role = role.as_str(), value = %cs.value, "duplicate colorspace declaration collapsed");
                }
                Some(first) => {
                    return Err(Error::ordering_conflict(role.as_str(), first, cs.value.as_str()));
                }
            }
        }

        Ok(ColorPlan {
            input: input.map(str::to_string).or_else(|| self.default_input.clone()),
            body,
            output: output.map(str::to_string),
        })
    }

    fn declarations(&self) -> impl Iterator<Item = &ColorSpace> {
        self.chain.iter().filter_map(|op| match op {
            Operator::ColorSpace(cs) => Some(cs),
            _ => None,
        })
    }
}

impl Processor for ColorProcessor {
    fn family(&self) -> Family {
        Family::Color
    }

    fn chain(&self) -> &[Operator] {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut Vec<Operator> {
        &mut self.chain
    }

    fn compute(&self) -> Result<Vec<String>> {
        if self.chain.is_empty() {
            return Ok(Vec::new());
        }
        let plan = self.plan()?;
        let ctx = OpContext::default();

        let mut args = Vec::new();
        if let Some(input) = &plan.input {
            args.extend(ColorSpace::new(input.as_str()).flags_for(Anchor::Input));
        }
        for op in &plan.body {
            args.extend(op.to_flags(&ctx)?);
        }
        if let Some(output) = &plan.output {
            args.extend(ColorSpace::new(output.as_str()).flags_for(Anchor::Output));
        }

        debug!(flags = ?args, "color chain computed");
        Ok(args)
    }
}
