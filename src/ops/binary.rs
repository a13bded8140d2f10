use crate::arith::BoolExpr;
use crate::types::shape::{broadcast_constraints, broadcast_shapes};
use crate::types::{DType, TensorShape};

use super::ShapeOp;

/// The three dtype-rule variants of broadcasting binary ops (spec.md
/// §4.3): numeric in/out, comparison (numeric in, bool out), logical
/// (bool in/out). Matches `BcastBinaryOp`/`1`/`2`/`3` in
/// `nnsmith/abstract/op.py`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Add,
    Sub,
    Mul,
    Div,
    Max,
    Min,
    Pow,
    Equal,
    Greater,
    Less,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeRule {
    Numeric,
    Comparison,
    Logical,
}

impl BinaryKind {
    pub const ALL: [BinaryKind; 13] = [
        BinaryKind::Add,
        BinaryKind::Sub,
        BinaryKind::Mul,
        BinaryKind::Div,
        BinaryKind::Max,
        BinaryKind::Min,
        BinaryKind::Pow,
        BinaryKind::Equal,
        BinaryKind::Greater,
        BinaryKind::Less,
        BinaryKind::And,
        BinaryKind::Or,
        BinaryKind::Xor,
    ];

    pub fn dtype_rule(&self) -> DtypeRule {
        match self {
            BinaryKind::Add
            | BinaryKind::Sub
            | BinaryKind::Mul
            | BinaryKind::Div
            | BinaryKind::Max
            | BinaryKind::Min
            | BinaryKind::Pow => DtypeRule::Numeric,
            BinaryKind::Equal | BinaryKind::Greater | BinaryKind::Less => DtypeRule::Comparison,
            BinaryKind::And | BinaryKind::Or | BinaryKind::Xor => DtypeRule::Logical,
        }
    }

    pub fn admits_input(&self, dt: DType) -> bool {
        match self.dtype_rule() {
            DtypeRule::Numeric => !dt.is_bool(),
            DtypeRule::Comparison => true,
            DtypeRule::Logical => dt.is_bool(),
        }
    }

    fn output_dtype(&self, input_dtype: DType) -> DType {
        match self.dtype_rule() {
            DtypeRule::Numeric | DtypeRule::Logical => input_dtype,
            DtypeRule::Comparison => DType::Bool,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BinaryOp {
    pub kind: BinaryKind,
}

impl ShapeOp for BinaryOp {
    fn arity(&self) -> usize {
        2
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let out_dims = broadcast_shapes(&inputs[0].dims, &inputs[1].dims);
        let out_dtype = self.kind.output_dtype(inputs[0].dtype);
        vec![TensorShape::new(out_dims, out_dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        vec![broadcast_constraints(&inputs[0].dims, &inputs[1].dims)]
    }

    fn name(&self) -> &'static str {
        "BcastBinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::var;

    #[test]
    fn comparison_forces_bool_output() {
        let op = BinaryOp { kind: BinaryKind::Greater };
        let a = TensorShape::new(vec![var(0)], DType::F32);
        let b = TensorShape::new(vec![var(0)], DType::F32);
        let out = op.shape_fn(&[a, b]);
        assert_eq!(out[0].dtype, DType::Bool);
    }
}
