use crate::arith::{nnsmith_eq, BoolExpr};
use crate::types::shape::{broadcast_constraints, broadcast_shapes};
use crate::types::TensorShape;

use super::ShapeOp;

/// `out[i] = cond[i] ? t[i] : f[i]`, cond is bool, t/f broadcast together
/// and determine the output dtype (spec.md §4.3's ternary `Where`).
#[derive(Debug, Clone, Copy)]
pub struct Where;

impl ShapeOp for Where {
    fn arity(&self) -> usize {
        3
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let tf = broadcast_shapes(&inputs[1].dims, &inputs[2].dims);
        let out = broadcast_shapes(&inputs[0].dims, &tf);
        vec![TensorShape::new(out, inputs[1].dtype)]
    }

    /// `cond`'s dtype must be bool; `t`/`f` must share a dtype. Both are
    /// concrete-Rust-level checks made by the caller before this operator
    /// is even considered a candidate (spec.md's arithmetic layer reasons
    /// only about integer dims, never about dtype equality), so `requires`
    /// only contributes the shape-broadcast constraints.
    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        vec![
            broadcast_constraints(&inputs[1].dims, &inputs[2].dims),
            broadcast_constraints(&inputs[0].dims, &inputs[1].dims),
        ]
    }

    fn name(&self) -> &'static str {
        "Where"
    }
}

/// `out = alpha * (A @ B) + beta * C`, `A: [m, k]`, `B: [k, n]`, `C`
/// broadcasts against `[m, n]`. Grounded in `nnsmith/abstract/op.py`'s
/// `Gemm` (SPEC_FULL.md §4.3).
#[derive(Debug, Clone, Copy)]
pub struct Gemm {
    pub alpha: f64,
    pub beta: f64,
}

impl ShapeOp for Gemm {
    fn arity(&self) -> usize {
        3
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let m = inputs[0].dims[0].clone();
        let n = inputs[1].dims[1].clone();
        vec![TensorShape::new(vec![m, n], inputs[0].dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let mut cs = vec![nnsmith_eq(&inputs[0].dims[1], &inputs[1].dims[0])];
        let mn = vec![inputs[0].dims[0].clone(), inputs[1].dims[1].clone()];
        cs.push(broadcast_to_cons_mn(&inputs[2].dims, &mn));
        cs
    }

    fn name(&self) -> &'static str {
        "Gemm"
    }
}

fn broadcast_to_cons_mn(c: &[crate::arith::Expr], mn: &[crate::arith::Expr]) -> BoolExpr {
    crate::types::shape::broadcast_to_constraints(c, mn)
}
