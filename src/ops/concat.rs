use crate::arith::{nnsmith_add, nnsmith_eq, BoolExpr};
use crate::types::TensorShape;

use super::ShapeOp;

/// Concatenates 2-5 same-rank inputs along a fixed axis (spec.md §4.3).
/// All non-concat axes must agree across inputs.
#[derive(Debug, Clone, Copy)]
pub struct Concat {
    pub arity: usize,
    pub axis: usize,
}

impl ShapeOp for Concat {
    fn arity(&self) -> usize {
        self.arity
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let mut dims = inputs[0].dims.clone();
        let sum = inputs[1..]
            .iter()
            .fold(dims[self.axis].clone(), |acc, t| nnsmith_add(&acc, &t.dims[self.axis]));
        dims[self.axis] = sum;
        vec![TensorShape::new(dims, inputs[0].dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let mut cs = Vec::new();
        for other in &inputs[1..] {
            for (axis, (a, b)) in inputs[0].dims.iter().zip(other.dims.iter()).enumerate() {
                if axis != self.axis {
                    cs.push(nnsmith_eq(a, b));
                }
            }
        }
        cs
    }

    fn name(&self) -> &'static str {
        "Concat"
    }
}
