use crate::arith::{nnsmith_eq, or, BoolExpr, Expr};
use crate::types::TensorShape;

use super::ShapeOp;

/// Expands the input's trailing `k` dims against a target shape: each
/// targeted axis is either the input's existing dim (kept as-is) or a
/// fresh target dim that the input's dim must be `1` to broadcast into;
/// axes beyond the input's rank are prepended outright. Mirrors
/// `ExpandLast1`-`4` in `nnsmith/abstract/op.py` (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct Expand {
    /// Target dims for the last `target.len()` axes of the output.
    pub target: Vec<Expr>,
}

impl Expand {
    fn k(&self) -> usize {
        self.target.len()
    }
}

impl ShapeOp for Expand {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let k = self.k();
        let in_dims = &inputs[0].dims;
        let prepend_count = k.saturating_sub(in_dims.len());
        let overlapping = k - prepend_count;
        let mut dims: Vec<Expr> = if prepend_count > 0 {
            self.target[..prepend_count].to_vec()
        } else {
            in_dims[..in_dims.len() - overlapping].to_vec()
        };
        for i in 0..overlapping {
            dims.push(self.target[prepend_count + i].clone());
        }
        vec![TensorShape::new(dims, inputs[0].dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let k = self.k();
        let in_dims = &inputs[0].dims;
        let prepend_count = k.saturating_sub(in_dims.len());
        let overlapping = k - prepend_count;
        let one = crate::arith::lit(1);
        (0..overlapping)
            .map(|i| {
                let in_dim = &in_dims[in_dims.len() - overlapping + i];
                let tgt = &self.target[prepend_count + i];
                or(vec![nnsmith_eq(in_dim, &one), nnsmith_eq(in_dim, tgt)])
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "Expand"
    }
}
