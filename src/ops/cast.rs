use crate::arith::BoolExpr;
use crate::types::{DType, TensorShape};

use super::ShapeOp;

/// Reinterprets the input as a different dtype, chosen at insertion time
/// (spec.md §4.3). Shape is unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Cast {
    pub target: DType,
}

impl ShapeOp for Cast {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        vec![TensorShape::new(inputs[0].dims.clone(), self.target)]
    }

    fn requires(&self, _inputs: &[TensorShape]) -> Vec<BoolExpr> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "Cast"
    }
}
