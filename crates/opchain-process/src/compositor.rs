//! Geometric compositor.
//!
//! Folds an ordered chain of geometric operators into one matrix:
//!
//! ```text
//! M_total = M_n * ... * M_2 * M_1
//! ```
//!
//! With column vectors this applies the first authored operator first.
//! Each operator sees the exact canvas left by its predecessors, while the
//! original source resolution stays available to every step, so a late
//! resize scales from the true intermediate size instead of a rounded one.

use tracing::{debug, trace};

use opchain_core::{Resolution, Result};
use opchain_math::Mat3;
use opchain_math::glam::DVec2;
use opchain_ops::{OpContext, Operator};

/// Result of a composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    /// Composite transform
    pub matrix: Mat3,
    /// Exact canvas after the last operator
    pub canvas: DVec2,
}

impl Composite {
    /// Final canvas rounded to whole pixels.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(
            self.canvas.x.round().max(0.0) as u32,
            self.canvas.y.round().max(0.0) as u32,
        )
    }
}

/// Composes a geometric chain against `ctx`.
///
/// An empty chain yields the identity. Fails with `NotGeometric` when a
/// non-geometric operator is present and `IncompatibleDimensionality` for
/// a raw matrix that is not 3x3.
pub fn compose(chain: &[Operator], ctx: &OpContext) -> Result<Composite> {
    let mut step = *ctx;
    let mut total = Mat3::IDENTITY;

    for (i, op) in chain.iter().enumerate() {
        let m = op.to_matrix(&step)?;
        total = m * total;
        step.canvas = op.canvas_after(&step);
        trace!(
            index = i,
            kind = %op.kind(),
            canvas_w = step.canvas.x,
            canvas_h = step.canvas.y,
            "composed operator"
        );
    }

    debug!(matrix = ?total.m, ops = chain.len(), "composite matrix");
    Ok(Composite {
        matrix: total,
        canvas: step.canvas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use opchain_core::Error;
    use opchain_ops::{Cdl, Crop, MatrixOp, Mirror, Resize, Transform};

    fn hd() -> OpContext {
        OpContext::new(Resolution::HD)
    }

    #[test]
    fn test_empty_is_identity() {
        let c = compose(&[], &hd()).unwrap();
        assert_eq!(c.matrix, Mat3::IDENTITY);
        assert_eq!(c.resolution(), Resolution::HD);
    }

    #[test]
    fn test_single_operator_exact() {
        let op = Operator::from(Transform::new().with_rotate(17.0).with_translate(3.0, 4.0));
        let c = compose(std::slice::from_ref(&op), &hd()).unwrap();
        assert_eq!(c.matrix, op.to_matrix(&hd()).unwrap());
    }

    #[test]
    fn test_crop_then_resize() {
        let chain = [
            Operator::from(Crop::new(0.0, 0.0, 960.0, 540.0)),
            Operator::from(Resize::new(1920, 1080)),
        ];
        let c = compose(&chain, &hd()).unwrap();
        assert_eq!(c.matrix, Mat3::scaling(2.0, 2.0));
        assert_eq!(c.resolution(), Resolution::HD);
    }

    #[test]
    fn test_first_authored_applies_first() {
        let chain = [
            Operator::from(Transform::new().with_translate(10.0, 0.0)),
            Operator::from(Transform::new().with_scale(2.0)),
        ];
        let c = compose(&chain, &hd()).unwrap();
        let p = c.matrix.transform_point(DVec2::new(0.0, 0.0));
        assert_relative_eq!(p.x, 20.0);
    }

    #[test]
    fn test_resize_uses_exact_canvas() {
        // 1000 wide keeps aspect at 562.5 rows, rounded to 563
        let chain = [
            Operator::from(Resize::new(1000, 0)),
            Operator::from(Resize::new(1920, 1080)),
        ];
        let c = compose(&chain, &hd()).unwrap();
        let p = c.matrix.transform_point(DVec2::new(1920.0, 1080.0));
        assert_relative_eq!(p.x, 1920.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 1080.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mirror_uses_current_canvas() {
        let chain = [
            Operator::from(Crop::new(100.0, 0.0, 800.0, 600.0)),
            Operator::from(Mirror::new(false, true)),
        ];
        let c = compose(&chain, &hd()).unwrap();
        let p = c.matrix.transform_point(DVec2::new(100.0, 0.0));
        assert_relative_eq!(p.x, 800.0);
    }

    #[test]
    fn test_rejects_color_operator() {
        let chain = [Operator::from(Cdl::new())];
        assert!(matches!(compose(&chain, &hd()), Err(Error::NotGeometric { .. })));
    }

    #[test]
    fn test_rejects_bad_matrix() {
        let chain = [Operator::from(MatrixOp::from_rows(vec![vec![1.0; 4]; 4]))];
        assert!(matches!(
            compose(&chain, &hd()),
            Err(Error::IncompatibleDimensionality { rows: 4, cols: 4 })
        ));
    }
}
