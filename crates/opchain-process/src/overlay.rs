//! Overlay chain processor.

use tracing::debug;

use opchain_core::Result;
use opchain_ops::{ChainInput, Family, OpContext, Operator};

use crate::processor::Processor;

/// Processor for burn-ins. Each operator contributes its own flags in
/// authoring order; overlays are drawn last so they land on the final
/// frame.
#[derive(Debug, Clone, Default)]
pub struct OverlayProcessor {
    chain: Vec<Operator>,
}

impl OverlayProcessor {
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
}

impl Processor for OverlayProcessor {
    fn family(&self) -> Family {
        Family::Overlay
    }

    fn chain(&self) -> &[Operator] {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut Vec<Operator> {
        &mut self.chain
    }

    fn compute(&self) -> Result<Vec<String>> {
        let ctx = OpContext::default();
        let mut args = Vec::new();
        for op in &self.chain {
            args.extend(op.to_flags(&ctx)?);
        }
        if !args.is_empty() {
            debug!(flags = ?args, "overlay chain computed");
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_texts_in_order() {
        let p = OverlayProcessor::from_chain(json!([
            {"kind": "text", "text": "sh010", "position": "top_left"},
            {"kind": "burnin", "text": "{FRAME}", "position": "bottom_right", "size": 32},
        ]))
        .unwrap();
        let flags = p.compute().unwrap();
        assert_eq!(flags.len(), 4);
        assert_eq!(flags[1], "sh010");
        assert!(flags[2].starts_with("--text:size=32:"));
        assert_eq!(flags[3], "{FRAME}");
    }

    #[test]
    fn test_rejects_geometric() {
        let mut p = OverlayProcessor::new();
        assert!(p.add(json!({"kind": "crop", "w": 10, "h": 10})).is_err());
    }
}
