//! Geometric chain processor.
//!
//! The whole chain is reduced to one composite matrix and rendered as a
//! single warp flag group, however many operators it holds:
//!
//! ```text
//! --warp:filter=F:recompute_roi=1 m00,m10,m20,m01,m11,m21,m02,m12,m22 --cut WxH+0+0
//! ```
//!
//! `recompute_roi` grows the data window to the warped source bounds, so
//! the group always ends with a `--cut` to the final canvas, even when it
//! has the source size.

use tracing::debug;

use opchain_core::{Resolution, Result};
use opchain_ops::{ChainInput, DEFAULT_WARP_FILTER, Family, Fit, OpContext, Operator, Resize, warp_flags};

use crate::compositor::{Composite, compose};
use crate::processor::Processor;

/// Processor for the geometric family.
#[derive(Debug, Clone)]
pub struct RepositionProcessor {
    chain: Vec<Operator>,
    source: Resolution,
    filter: String,
    target: Option<Resize>,
}

impl Default for RepositionProcessor {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}

impl RepositionProcessor {
    /// Creates an empty processor for a source of the given resolution.
    pub fn new(source: Resolution) -> Self {
        Self {
            chain: Vec::new(),
            source,
            filter: DEFAULT_WARP_FILTER.to_string(),
            target: None,
        }
    }

    /// Creates a processor from any chain shape.
    pub fn from_chain(source: Resolution, input: impl Into<ChainInput>) -> Result<Self> {
        let mut p = Self::new(source);
        p.set_chain(input)?;
        Ok(p)
    }

    /// Sets the warp filter (`cubic`, `lanczos3`, `box`, ...).
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Reformats to `width x height` after the chain.
    pub fn with_target(mut self, width: u32, height: u32, fit: Fit) -> Self {
        self.target = Some(Resize::new(width, height).with_fit(fit));
        self
    }

    /// Source resolution.
    pub fn source(&self) -> Resolution {
        self.source
    }

    /// Composes the chain, including the target reformat.
    pub fn composite(&self) -> Result<Composite> {
        let ctx = OpContext::new(self.source);
        match &self.target {
            None => compose(&self.chain, &ctx),
            Some(target) => {
                let mut ops = self.chain.clone();
                ops.push(Operator::Resize(target.clone()));
                compose(&ops, &ctx)
            }
        }
    }
}

impl Processor for RepositionProcessor {
    fn family(&self) -> Family {
        Family::Geometric
    }

    fn chain(&self) -> &[Operator] {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut Vec<Operator> {
        &mut self.chain
    }

    fn compute(&self) -> Result<Vec<String>> {
        if self.chain.is_empty() && self.target.is_none() {
            return Ok(Vec::new());
        }
        let composite = self.composite()?;
        let mut args = warp_flags(&composite.matrix, &self.filter);

        args.push("--cut".to_string());
        args.push(format!("{}+0+0", composite.resolution()));

        debug!(flags = ?args, source = %self.source, "reposition chain computed");
        Ok(args)
    }
}
