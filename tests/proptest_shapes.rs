//! Property-based checks (spec.md §8) for the shape algebra that underlies
//! every operator's `requires`/`shape_fn`, run across many concrete dim
//! assignments rather than a handful of hand-picked ones.

use proptest::prelude::*;

use graphsmith::arith::smt::NumMode;
use graphsmith::arith::{self, var};
use graphsmith::graph::SymbolicGraph;
use graphsmith::ops::conv::NchwConv2d;
use graphsmith::ops::unary::{UnaryKind, UnaryOp};
use graphsmith::ops::OpKind;
use graphsmith::types::{DType, TensorShape};

use std::time::Duration;

const DEADLINE: Duration = Duration::from_millis(2000);

proptest! {
    /// A unary op never changes rank or dtype, for any admissible input rank.
    #[test]
    fn unary_preserves_rank_and_dtype(rank in 1usize..6) {
        let mut g = SymbolicGraph::new(NumMode::Int);
        let dims: Vec<_> = (0..rank).map(|_| var(g.fresh_sym())).collect();
        let shape = TensorShape::new(dims, DType::F32);
        g.commit(shape.all_positive());
        let input = g.new_placeholder(shape);

        let relu = OpKind::Unary(UnaryOp { kind: UnaryKind::Relu });
        let node_id = g.forward_insert(relu, vec![input], None, DEADLINE);
        prop_assert!(node_id.is_ok());
        let node_id = node_id.unwrap();
        let out = &g.alive_shape(g.nodes()[node_id.0].outputs[0]).shape;
        prop_assert_eq!(out.rank(), rank);
        prop_assert_eq!(out.dtype, DType::F32);
    }

    /// Conv2D's spatial output formula holds for any kernel/stride/padding
    /// combination the op itself considers valid (checked by construction:
    /// if the solver accepts the insertion, the formula-derived dims must
    /// equal what the solved model reports, since they're the same `Expr`).
    #[test]
    fn conv2d_formula_holds_for_varied_params(
        kernel in 1i64..5,
        stride in 1i64..4,
        padding in 0i64..3,
        out_channels in 1i64..17,
    ) {
        let mut g = SymbolicGraph::new(NumMode::Int);
        let input_shape = TensorShape::new(
            vec![arith::lit(1), arith::lit(3), arith::lit(64), arith::lit(64)],
            DType::F32,
        );
        g.commit(input_shape.all_positive());
        let input_aid = g.new_placeholder(input_shape);

        let conv = NchwConv2d {
            out_channels,
            kernel_h: kernel,
            kernel_w: kernel,
            stride_h: stride,
            stride_w: stride,
            padding_h: padding,
            padding_w: padding,
            dilation_h: 1,
            dilation_w: 1,
        };
        let result = g.forward_insert(OpKind::Conv2d(conv), vec![input_aid], None, DEADLINE);
        if let Ok(node_id) = result {
            g.finalize(|| true).unwrap();
            let model = g.solve_model(DEADLINE).expect("sat model for an accepted insertion");
            let out = &g.alive_shape(g.nodes()[node_id.0].outputs[0]).shape;
            let h = arith::eval(&out.dims[2], &model);
            let expected_h = (64 - kernel + 2 * padding) / stride + 1;
            prop_assert_eq!(h, expected_h);
        }
    }
}
