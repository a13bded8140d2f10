use crate::arith::BoolExpr;
use crate::types::TensorShape;

use super::ShapeOp;

/// Swaps two axes fixed at insertion time (spec.md §4.3). Rank is
/// unchanged; only `axis_a` and `axis_b` trade places.
#[derive(Debug, Clone, Copy)]
pub struct Transpose {
    pub axis_a: usize,
    pub axis_b: usize,
}

impl ShapeOp for Transpose {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let mut dims = inputs[0].dims.clone();
        dims.swap(self.axis_a, self.axis_b);
        vec![TensorShape::new(dims, inputs[0].dtype)]
    }

    fn requires(&self, _inputs: &[TensorShape]) -> Vec<BoolExpr> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "Transpose"
    }
}
