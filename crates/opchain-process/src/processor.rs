//! The [`Processor`] contract.

use opchain_core::{Error, Result};
use opchain_ops::{ChainInput, Family, OpSpec, Operator, normalize};

/// Owns one ordered chain of operators of a single family and computes
/// its command line flags.
///
/// Processors may be fed the whole chain at once with
/// [`set_chain`](Processor::set_chain) or one element at a time with
/// [`add`](Processor::add). Both accept raw parameter mappings or built
/// operators. Computing never mutates the chain, so repeated calls return
/// identical flags.
pub trait Processor: Send + Sync {
    /// Family of operators this processor accepts.
    fn family(&self) -> Family;

    /// Current chain in authoring order.
    fn chain(&self) -> &[Operator];

    /// Mutable access to the chain. Callers must keep it single-family;
    /// prefer [`set_chain`](Processor::set_chain) and
    /// [`add`](Processor::add).
    fn chain_mut(&mut self) -> &mut Vec<Operator>;

    /// Computes the flags for the current chain. An empty chain yields an
    /// empty list.
    fn compute(&self) -> Result<Vec<String>>;

    /// Replaces the chain. On error the previous chain is kept.
    fn set_chain(&mut self, input: impl Into<ChainInput>) -> Result<()>
    where
        Self: Sized,
    {
        let ops = normalize(input)?;
        for op in &ops {
            check_family(self.family(), op)?;
        }
        *self.chain_mut() = ops;
        Ok(())
    }

    /// Appends one element.
    fn add(&mut self, spec: impl Into<OpSpec>) -> Result<()>
    where
        Self: Sized,
    {
        let op = spec.into().into_operator()?;
        check_family(self.family(), &op)?;
        self.chain_mut().push(op);
        Ok(())
    }

    /// Removes every operator.
    fn clear(&mut self) {
        self.chain_mut().clear();
    }

    /// Number of operators in the chain.
    fn len(&self) -> usize {
        self.chain().len()
    }

    /// Returns true when the chain is empty.
    fn is_empty(&self) -> bool {
        self.chain().is_empty()
    }
}

/// Fails with [`Error::FamilyMismatch`] unless `op` belongs to `family`.
pub fn check_family(family: Family, op: &Operator) -> Result<()> {
    if op.family() == family {
        Ok(())
    } else {
        Err(Error::FamilyMismatch {
            kind: op.kind().to_string(),
            expected: family.to_string(),
        })
    }
}
