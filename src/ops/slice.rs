use crate::arith::{
    self, nnsmith_add, nnsmith_div, nnsmith_ge, nnsmith_le, nnsmith_sub, BoolExpr, DivMode, Expr,
};
use crate::types::TensorShape;

use super::ShapeOp;

/// Which part of the sliced axis a candidate was sampled from; purely a
/// bias hint for the search driver's candidate generation, not part of the
/// shape transfer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Left,
    Mid,
    Right,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Left, Region::Mid, Region::Right];
}

/// Slices one axis as `[start, end)` stepping by `step_raw`, `start`/`end`
/// possibly given as negative (Python-style) offsets resolved to their
/// positive equivalent against the (symbolic) axis dim before building
/// shape constraints — mirrors `get_pos_eqv` in `nnsmith/abstract/op.py`'s
/// `Slice` (SPEC_FULL.md §4.3). The output axis size is
/// `ceil((end_pos - start_pos) / step)`.
#[derive(Debug, Clone, Copy)]
pub struct Slice {
    pub axis: usize,
    pub region: Region,
    pub start_raw: i64,
    pub end_raw: i64,
    pub step_raw: i64,
}

impl Slice {
    fn pos_eqv(raw: i64, dim: &Expr) -> Expr {
        if raw < 0 {
            nnsmith_add(dim, &arith::lit(raw))
        } else {
            arith::lit(raw)
        }
    }
}

impl ShapeOp for Slice {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let dim = &inputs[0].dims[self.axis];
        let start = Self::pos_eqv(self.start_raw, dim);
        let end = Self::pos_eqv(self.end_raw, dim);
        let span = nnsmith_sub(&end, &start);
        // ceil(span / step) = (span + step - 1) / step, span/step both > 0
        // under `requires`.
        let biased = nnsmith_add(&span, &arith::lit(self.step_raw - 1));
        let mut dims = inputs[0].dims.clone();
        dims[self.axis] = nnsmith_div(&biased, &arith::lit(self.step_raw), DivMode::Floor);
        vec![TensorShape::new(dims, inputs[0].dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let dim = &inputs[0].dims[self.axis];
        let start = Self::pos_eqv(self.start_raw, dim);
        let end = Self::pos_eqv(self.end_raw, dim);
        vec![
            nnsmith_ge(&start, &arith::lit(0)),
            nnsmith_le(&end, dim),
            nnsmith_le(&start, &end),
            nnsmith_ge(&arith::lit(self.step_raw), &arith::lit(1)),
            nnsmith_le(&arith::lit(self.step_raw), dim),
        ]
    }

    fn name(&self) -> &'static str {
        "Slice"
    }
}
