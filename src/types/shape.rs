use crate::arith::{self, and, nnsmith_eq, nnsmith_ge, nnsmith_mul, or, BoolExpr, Expr};
use crate::types::DType;

/// An ordered list of symbolic dimensions plus the dtype flowing through
/// them (spec.md §3/§4.2). `TensorShape` never executes anything; it only
/// builds constraint trees and derives simple properties.
#[derive(Debug, Clone)]
pub struct TensorShape {
    pub dims: Vec<Expr>,
    pub dtype: DType,
}

impl TensorShape {
    pub fn new(dims: Vec<Expr>, dtype: DType) -> Self {
        Self { dims, dtype }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Symbolic element count: the product of all dims, or `1` for a
    /// rank-0 (scalar) shape.
    pub fn nelement(&self) -> Expr {
        self.dims.iter().fold(arith::lit(1), |acc, d| nnsmith_mul(&acc, d))
    }

    /// `dim >= 1` for every axis.
    pub fn all_positive(&self) -> BoolExpr {
        and(self.dims.iter().map(|d| nnsmith_ge(d, &arith::lit(1))).collect())
    }

    /// Pairwise dim-for-dim equality against another shape of the same
    /// rank. Callers are responsible for checking rank equality first.
    pub fn equal_to(&self, other: &TensorShape) -> BoolExpr {
        debug_assert_eq!(self.rank(), other.rank());
        and(self
            .dims
            .iter()
            .zip(other.dims.iter())
            .map(|(a, b)| nnsmith_eq(a, b))
            .collect())
    }
}

/// Right-aligns two dim lists (numpy/onnx broadcasting) and returns, per
/// aligned axis, the pair of operand dims (or `None` for the side whose
/// rank ran out — that axis is unconstrained, the present side's dim wins).
fn align_dims<'a>(a: &'a [Expr], b: &'a [Expr]) -> Vec<(Option<&'a Expr>, Option<&'a Expr>)> {
    let n = a.len().max(b.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let ai = i.checked_sub(n - a.len()).map(|j| &a[j]);
        let bi = i.checked_sub(n - b.len()).map(|j| &b[j]);
        out.push((ai, bi));
    }
    out
}

/// Bidirectional broadcast feasibility: at every aligned axis, one operand's
/// dim is `1` or the two dims are equal (spec.md §4.2's
/// `broadcast_constraints`).
pub fn broadcast_constraints(a: &[Expr], b: &[Expr]) -> BoolExpr {
    let one = arith::lit(1);
    let clauses = align_dims(a, b)
        .into_iter()
        .filter_map(|(ai, bi)| match (ai, bi) {
            (Some(x), Some(y)) => Some(or(vec![
                nnsmith_eq(x, &one),
                nnsmith_eq(y, &one),
                nnsmith_eq(x, y),
            ])),
            _ => None,
        })
        .collect();
    and(clauses)
}

/// Unidirectional "can `src` broadcast to `dst`" feasibility: `dst`'s rank
/// must be `>= src`'s, and at every aligned axis `src` is `1` or equal to
/// `dst` (spec.md §4.2's `broadcast_to_constraints`).
pub fn broadcast_to_constraints(src: &[Expr], dst: &[Expr]) -> BoolExpr {
    if src.len() > dst.len() {
        return BoolExpr::BoolLit(false);
    }
    let one = arith::lit(1);
    let clauses = align_dims(src, dst)
        .into_iter()
        .map(|(si, di)| match (si, di) {
            (Some(s), Some(d)) => or(vec![nnsmith_eq(s, &one), nnsmith_eq(s, d)]),
            (None, Some(_)) => BoolExpr::BoolLit(true),
            _ => unreachable!("dst is at least as long as src"),
        })
        .collect();
    and(clauses)
}

/// The broadcast result shape itself: `max` per aligned axis where one side
/// is statically `1`... but since dims are symbolic, the result shape is
/// represented with `If` expressions selecting whichever operand is not
/// forced to `1`, falling back to `a`'s dim (the constraint set guarantees
/// they agree whenever neither is `1`).
pub fn broadcast_shapes(a: &[Expr], b: &[Expr]) -> Vec<Expr> {
    let one = arith::lit(1);
    align_dims(a, b)
        .into_iter()
        .map(|(ai, bi)| match (ai, bi) {
            (Some(x), Some(y)) => {
                let x_is_one = nnsmith_eq(x, &one);
                Expr::If(std::rc::Rc::new(x_is_one), std::rc::Rc::new(y.clone()), std::rc::Rc::new(x.clone()))
            }
            (Some(x), None) => x.clone(),
            (None, Some(y)) => y.clone(),
            (None, None) => unreachable!(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::var;

    #[test]
    fn broadcast_result_matches_longer_rank() {
        let a = vec![var(0), var(1)];
        let b = vec![var(2)];
        let out = broadcast_shapes(&a, &b);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn rank0_nelement_is_one() {
        let s = TensorShape::new(vec![], DType::F32);
        assert!(matches!(s.nelement(), Expr::IntLit(1)));
    }
}
