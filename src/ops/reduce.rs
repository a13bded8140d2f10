use crate::arith::BoolExpr;
use crate::types::{DType, TensorShape};

use super::ShapeOp;

/// Reduce/Squeeze family, all reducing over one axis fixed at insertion
/// time (spec.md §4.3). `ArgMin`/`ArgMax` always produce `I64` regardless
/// of the input dtype; everything else preserves it. `Squeeze` requires
/// the reduced axis to have dim `1`, enforced by the caller via the
/// generic "reduced axis drops" shape transfer plus an explicit `dim == 1`
/// constraint layered on top for that variant only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceKind {
    Sum,
    Min,
    Max,
    Mean,
    ArgMin,
    ArgMax,
    Squeeze,
}

impl ReduceKind {
    pub const ALL: [ReduceKind; 7] = [
        ReduceKind::Sum,
        ReduceKind::Min,
        ReduceKind::Max,
        ReduceKind::Mean,
        ReduceKind::ArgMin,
        ReduceKind::ArgMax,
        ReduceKind::Squeeze,
    ];

    fn overrides_dtype(&self) -> Option<DType> {
        match self {
            ReduceKind::ArgMin | ReduceKind::ArgMax => Some(DType::I64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReduceOp {
    pub kind: ReduceKind,
    pub reduce_dim: usize,
}

impl ShapeOp for ReduceOp {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let mut dims = inputs[0].dims.clone();
        dims.remove(self.reduce_dim);
        let dtype = self.kind.overrides_dtype().unwrap_or(inputs[0].dtype);
        vec![TensorShape::new(dims, dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        if self.kind == ReduceKind::Squeeze {
            vec![crate::arith::nnsmith_eq(&inputs[0].dims[self.reduce_dim], &crate::arith::lit(1))]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "Reduce"
    }
}
