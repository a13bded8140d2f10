use crate::arith::BoolExpr;
use crate::types::{DType, TensorShape};

use super::ShapeOp;

/// Zero-input leaf producing a fixed shape/dtype, to be filled with a
/// literal value by the concretizer (spec.md §3/§4.6).
#[derive(Debug, Clone)]
pub struct Constant {
    pub shape: TensorShape,
}

impl ShapeOp for Constant {
    fn arity(&self) -> usize {
        0
    }

    fn shape_fn(&self, _inputs: &[TensorShape]) -> Vec<TensorShape> {
        vec![self.shape.clone()]
    }

    fn requires(&self, _inputs: &[TensorShape]) -> Vec<BoolExpr> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "Constant"
    }
}

/// Zero-input leaf whose value is supplied by the external input oracle at
/// materialization time (spec.md §6's `InputOracle`).
#[derive(Debug, Clone)]
pub struct Input {
    pub shape: TensorShape,
}

impl ShapeOp for Input {
    fn arity(&self) -> usize {
        0
    }

    fn shape_fn(&self, _inputs: &[TensorShape]) -> Vec<TensorShape> {
        vec![self.shape.clone()]
    }

    fn requires(&self, _inputs: &[TensorShape]) -> Vec<BoolExpr> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "Input"
    }
}

/// Zero-input, one-output pseudo-op standing in for a not-yet-decided leaf.
/// Finalization (spec.md §4.4) replaces every surviving `Placeholder` with
/// either a concrete `Input` or `Constant`; it never appears in a finalized
/// graph.
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub shape: TensorShape,
}

impl ShapeOp for Placeholder {
    fn arity(&self) -> usize {
        0
    }

    fn shape_fn(&self, _inputs: &[TensorShape]) -> Vec<TensorShape> {
        vec![self.shape.clone()]
    }

    fn requires(&self, _inputs: &[TensorShape]) -> Vec<BoolExpr> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "Placeholder"
    }
}

pub fn default_dtype() -> DType {
    DType::F32
}
