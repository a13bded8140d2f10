use crate::arith::{self, nnsmith_add, nnsmith_div, nnsmith_ge, nnsmith_sub, BoolExpr, DivMode};
use crate::types::TensorShape;

use super::ShapeOp;

/// 2D convolution over an `NCHW` input. Kernel/stride/padding/dilation and
/// the output channel count are concrete attributes chosen at insertion
/// time (not symbolic); only the input's spatial dims are symbolic. Exact
/// formula grounded in `nnsmith/abstract/op.py`'s `NCHWConv2d`
/// (SPEC_FULL.md §4.3).
#[derive(Debug, Clone, Copy)]
pub struct NchwConv2d {
    pub out_channels: i64,
    pub kernel_h: i64,
    pub kernel_w: i64,
    pub stride_h: i64,
    pub stride_w: i64,
    pub padding_h: i64,
    pub padding_w: i64,
    pub dilation_h: i64,
    pub dilation_w: i64,
}

impl NchwConv2d {
    fn eff_kernel_h(&self) -> i64 {
        self.dilation_h * (self.kernel_h - 1) + 1
    }

    fn eff_kernel_w(&self) -> i64 {
        self.dilation_w * (self.kernel_w - 1) + 1
    }

    fn out_dim(&self, in_dim: &crate::arith::Expr, padding: i64, eff_kernel: i64, stride: i64) -> crate::arith::Expr {
        let padded = nnsmith_add(in_dim, &arith::lit(2 * padding));
        let numerator = nnsmith_sub(&padded, &arith::lit(eff_kernel));
        let divided = nnsmith_div(&numerator, &arith::lit(stride), DivMode::Floor);
        nnsmith_add(&divided, &arith::lit(1))
    }
}

impl ShapeOp for NchwConv2d {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let d = &inputs[0].dims;
        let n = d[0].clone();
        let out_h = self.out_dim(&d[2], self.padding_h, self.eff_kernel_h(), self.stride_h);
        let out_w = self.out_dim(&d[3], self.padding_w, self.eff_kernel_w(), self.stride_w);
        vec![TensorShape::new(vec![n, arith::lit(self.out_channels), out_h, out_w], inputs[0].dtype)]
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let d = &inputs[0].dims;
        debug_assert_eq!(d.len(), 4);
        let padded_h = nnsmith_add(&d[2], &arith::lit(2 * self.padding_h));
        let padded_w = nnsmith_add(&d[3], &arith::lit(2 * self.padding_w));
        vec![
            nnsmith_ge(&padded_h, &arith::lit(self.eff_kernel_h())),
            nnsmith_ge(&padded_w, &arith::lit(self.eff_kernel_w())),
        ]
    }

    fn name(&self) -> &'static str {
        "NCHWConv2d"
    }
}
