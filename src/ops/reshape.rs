use crate::arith::{self, nnsmith_div, nnsmith_eq, nnsmith_mod, nnsmith_mul, BoolExpr, DivMode, Expr};
use crate::types::TensorShape;

use super::ShapeOp;

/// Per-axis cap used when *sampling* candidate reshape targets (not
/// enforced as a hard constraint here — that sampling lives in the search
/// driver). Successive axes are capped at half the previous axis's cap,
/// bottoming out at 2, mirroring the original generator's habit of biasing
/// towards plausible, not astronomically large, reshapes.
pub fn geometric_dim_cap(axis: usize) -> i64 {
    (4096_i64 >> axis.min(11)).max(2)
}

/// Reshape to a target rank with at most one `-1` wildcard axis, inferred
/// from the input's total element count (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct Reshape {
    /// `None` marks the wildcard axis; at most one entry may be `None`.
    pub target: Vec<Option<i64>>,
}

impl Reshape {
    fn wildcard_axis(&self) -> Option<usize> {
        self.target.iter().position(|d| d.is_none())
    }
}

impl ShapeOp for Reshape {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let nelement = inputs[0].nelement();
        let known_product: Expr = self
            .target
            .iter()
            .filter_map(|d| *d)
            .fold(arith::lit(1), |acc, d| nnsmith_mul(&acc, &arith::lit(d)));

        let dims = self
            .target
            .iter()
            .map(|d| match d {
                Some(v) => arith::lit(*v),
                None => nnsmith_div(&nelement, &known_product, DivMode::Floor),
            })
            .collect();
        vec![TensorShape::new(dims, inputs[0].dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let nelement = inputs[0].nelement();
        match self.wildcard_axis() {
            Some(_) => {
                let known_product: Expr = self
                    .target
                    .iter()
                    .filter_map(|d| *d)
                    .fold(arith::lit(1), |acc, d| nnsmith_mul(&acc, &arith::lit(d)));
                vec![nnsmith_eq(&nnsmith_mod(&nelement, &known_product), &arith::lit(0))]
            }
            None => {
                let target_product: Expr = self
                    .target
                    .iter()
                    .filter_map(|d| *d)
                    .fold(arith::lit(1), |acc, d| nnsmith_mul(&acc, &arith::lit(d)));
                vec![nnsmith_eq(&nelement, &target_product)]
            }
        }
    }

    fn name(&self) -> &'static str {
        "Reshape"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DType;

    #[test]
    fn caps_shrink_per_axis() {
        assert!(geometric_dim_cap(0) > geometric_dim_cap(1));
        assert!(geometric_dim_cap(20) >= 2);
    }

    #[test]
    fn wildcard_is_inferred_from_nelement() {
        let op = Reshape { target: vec![Some(2), None] };
        let input = TensorShape::new(vec![arith::lit(4), arith::lit(3)], DType::F32);
        let out = op.shape_fn(std::slice::from_ref(&input));
        assert!(matches!(out[0].dims[1], Expr::Div(..)));
    }
}
