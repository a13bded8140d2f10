use crate::arith::BoolExpr;
use crate::types::{DType, TensorShape};

use super::ShapeOp;

/// Elementwise unary math/activation family (spec.md §4.3). Shape is
/// identity; dtype is unchanged except where noted. The exact member list
/// mirrors `nnsmith/abstract/op.py`'s elementwise-unary classes
/// (SPEC_FULL.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryKind {
    Relu,
    Gelu,
    LeakyRelu,
    PRelu,
    Sigmoid,
    Softmax,
    Sin,
    Cos,
    Asin,
    Acos,
    Tan,
    Atan,
    Abs,
    Ceil,
    Clip,
    Round,
    Sqrt,
    Log2,
    Neg,
}

impl UnaryKind {
    pub const ALL: [UnaryKind; 19] = [
        UnaryKind::Relu,
        UnaryKind::Gelu,
        UnaryKind::LeakyRelu,
        UnaryKind::PRelu,
        UnaryKind::Sigmoid,
        UnaryKind::Softmax,
        UnaryKind::Sin,
        UnaryKind::Cos,
        UnaryKind::Asin,
        UnaryKind::Acos,
        UnaryKind::Tan,
        UnaryKind::Atan,
        UnaryKind::Abs,
        UnaryKind::Ceil,
        UnaryKind::Clip,
        UnaryKind::Round,
        UnaryKind::Sqrt,
        UnaryKind::Log2,
        UnaryKind::Neg,
    ];

    /// Every variant in this family requires a float input dtype (the
    /// original's `auto_infer_in_dtypes` only ever resolves these against
    /// `DType::FLOATS`), except `Abs`/`Neg`/`Round`/`Ceil`, which also admit
    /// the integer dtypes.
    pub fn admits(&self, dt: DType) -> bool {
        match self {
            UnaryKind::Abs | UnaryKind::Neg | UnaryKind::Round | UnaryKind::Ceil => !dt.is_bool(),
            _ => dt.is_float(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnaryOp {
    pub kind: UnaryKind,
}

impl ShapeOp for UnaryOp {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        vec![inputs[0].clone()]
    }

    fn requires(&self, _inputs: &[TensorShape]) -> Vec<BoolExpr> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "ElementwiseUnary"
    }
}
