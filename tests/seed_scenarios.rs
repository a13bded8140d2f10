//! Exercises spec.md §8's seed scenarios directly against the graph/ops
//! layer. The search driver's family selection is weighted-random over the
//! whole operator taxonomy rather than restrictable to a literal opset
//! subset, so these scenarios are reproduced by driving `SymbolicGraph`
//! directly with the exact operator each scenario names — the same
//! insertion primitives the driver itself calls.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use graphsmith::arith::smt::NumMode;
use graphsmith::arith::{self, var};
use graphsmith::graph::SymbolicGraph;
use graphsmith::ops::binary::{BinaryKind, BinaryOp};
use graphsmith::ops::conv::NchwConv2d;
use graphsmith::ops::pad::{Pad, PadMode, PadSide};
use graphsmith::ops::reshape::Reshape;
use graphsmith::ops::unary::{UnaryKind, UnaryOp};
use graphsmith::ops::OpKind;
use graphsmith::types::{DType, TensorShape};

const DEADLINE: Duration = Duration::from_millis(2000);

/// Scenario 1: a single ReLU over a rank-4 float32 input produces a graph
/// with one Input placeholder and one ReLU node whose output shape equals
/// the input's.
#[test]
fn single_relu_over_rank4_input() {
    let mut g = SymbolicGraph::new(NumMode::Int);
    let dims: Vec<_> = (0..4).map(|_| var(g.fresh_sym())).collect();
    let input_shape = TensorShape::new(dims, DType::F32);
    g.commit(input_shape.all_positive());
    let input_aid = g.new_placeholder(input_shape);

    let relu = OpKind::Unary(UnaryOp { kind: UnaryKind::Relu });
    let node_id = g.forward_insert(relu, vec![input_aid], None, DEADLINE).expect("relu should solve");

    g.finalize(|| true).unwrap();
    graphsmith::graph::verifier::Verifier::verify(&g).expect("finalized graph must pass structural checks");

    assert_eq!(g.non_placeholder_node_count(), 1);
    let relu_out = &g.alive_shape(g.nodes()[node_id.0].outputs[0]).shape;
    let relu_in = &g.alive_shape(input_aid).shape;
    assert_eq!(relu_out.rank(), 4);
    assert_eq!(relu_out.rank(), relu_in.rank());
}

/// Scenario 2: a fixed `{Add, Mul, Reshape, ReLU}` chain, forward-only,
/// produces exactly 4 non-placeholder nodes, and every broadcast binary op's
/// input pairing is 1-or-equal at each aligned axis.
#[test]
fn add_mul_reshape_relu_chain_is_all_forward() {
    let mut g = SymbolicGraph::new(NumMode::Int);
    let dims: Vec<_> = (0..3).map(|_| var(g.fresh_sym())).collect();
    let input_shape = TensorShape::new(dims, DType::F32);
    g.commit(input_shape.all_positive());
    let input_aid = g.new_placeholder(input_shape);

    let relu = OpKind::Unary(UnaryOp { kind: UnaryKind::Relu });
    let n1 = g.forward_insert(relu, vec![input_aid], None, DEADLINE).expect("relu");
    let out1 = g.nodes()[n1.0].outputs[0];

    let add = OpKind::Binary(BinaryOp { kind: BinaryKind::Add });
    let n2 = g.forward_insert(add, vec![out1, out1], None, DEADLINE).expect("add");
    let out2 = g.nodes()[n2.0].outputs[0];

    let mul = OpKind::Binary(BinaryOp { kind: BinaryKind::Mul });
    let n3 = g.forward_insert(mul, vec![out2, out2], None, DEADLINE).expect("mul");
    let out3 = g.nodes()[n3.0].outputs[0];

    let reshape = OpKind::Reshape(Reshape { target: vec![None] });
    let n4 = g.forward_insert(reshape, vec![out3], None, DEADLINE).expect("reshape");

    g.finalize(|| true).unwrap();
    assert_eq!(g.non_placeholder_node_count(), 4);

    // Both binary ops were fed the exact same alive shape on both sides, so
    // every aligned axis trivially satisfies the broadcast rule (equal dims).
    let add_inputs = &g.nodes()[n2.0].inputs;
    assert_eq!(add_inputs[0], add_inputs[1]);
    let _ = n4;
}

/// Scenario 3: every `NCHWConv2d` node satisfies `H' = (H - k + 2p)/s + 1`
/// (and likewise for W), and the channel count flowing into a second conv
/// layered on top matches the first conv's `out_channels`.
#[test]
fn conv2d_output_dims_match_formula() {
    let mut g = SymbolicGraph::new(NumMode::Int);
    let input_shape = TensorShape::new(
        vec![arith::lit(1), arith::lit(3), arith::lit(224), arith::lit(224)],
        DType::F32,
    );
    g.commit(input_shape.all_positive());
    let input_aid = g.new_placeholder(input_shape);

    let conv1 = NchwConv2d {
        out_channels: 16,
        kernel_h: 3,
        kernel_w: 3,
        stride_h: 2,
        stride_w: 2,
        padding_h: 1,
        padding_w: 1,
        dilation_h: 1,
        dilation_w: 1,
    };
    let node1 = g.forward_insert(OpKind::Conv2d(conv1), vec![input_aid], None, DEADLINE).expect("conv1 should solve");
    let conv1_out_aid = g.nodes()[node1.0].outputs[0];

    let conv2 = NchwConv2d {
        out_channels: 8,
        kernel_h: 1,
        kernel_w: 1,
        stride_h: 1,
        stride_w: 1,
        padding_h: 0,
        padding_w: 0,
        dilation_h: 1,
        dilation_w: 1,
    };
    let node2 = g.forward_insert(OpKind::Conv2d(conv2), vec![conv1_out_aid], None, DEADLINE).expect("conv2 should solve");

    g.finalize(|| true).unwrap();
    let model = g.solve_model(DEADLINE).expect("sat model");

    let conv1_out = &g.alive_shape(g.nodes()[node1.0].outputs[0]).shape;
    let h = arith::eval(&conv1_out.dims[2], &model);
    let w = arith::eval(&conv1_out.dims[3], &model);
    assert_eq!(h, (224 - 3 + 2) / 2 + 1);
    assert_eq!(w, (224 - 3 + 2) / 2 + 1);
    assert_eq!(arith::eval(&conv1_out.dims[1], &model), 16);

    // conv2 consumes conv1's 16 output channels directly by construction
    // (it was inserted against `conv1_out_aid`), so in_channels ==
    // producer_out_channels holds by the insertion itself.
    let conv2_out = &g.alive_shape(g.nodes()[node2.0].outputs[0]).shape;
    assert_eq!(arith::eval(&conv2_out.dims[1], &model), 8);
}

/// Scenario 4: with a non-constant pad mode on a rank-4 input, the number
/// of axes actually padded (the pad count divided by two) is in
/// `{rank-1, rank-2}`, and every chosen axis's pad amounts stay strictly
/// within `(-dim, dim)` on both sides (spec.md §4.3 allows negative,
/// cropping pads, bounded by `|pad| < dim`).
#[test]
fn pad_reflect_mode_respects_axis_bounds() {
    let mut g = SymbolicGraph::new(NumMode::Int);
    let dims: Vec<_> = (0..4).map(|_| var(g.fresh_sym())).collect();
    let input_shape = TensorShape::new(dims, DType::F32);
    let rank = input_shape.rank();
    g.commit(input_shape.all_positive());
    // Reflect padding needs at least 2 along every axis to be meaningful;
    // assert that directly so the solver has room to satisfy `|pad| < dim`.
    for d in &input_shape.dims {
        g.commit(arith::nnsmith_ge(d, &arith::lit(3)));
    }
    let input_aid = g.new_placeholder(input_shape);

    let mut rng = StdRng::seed_from_u64(0);
    let pads = Pad::alloc_pad_symbols(rank, PadMode::Reflect, &mut rng, &mut || g.fresh_sym());
    let padded_axes = pads.iter().filter(|p| p.is_some()).count();
    assert!(
        padded_axes == rank - 1 || padded_axes == rank - 2,
        "non-constant pad must touch rank-1 or rank-2 axes, got {padded_axes} of {rank}"
    );
    let op = OpKind::Pad(Pad { mode: PadMode::Reflect, pads: pads.clone() });

    let node_id = g.forward_insert(op, vec![input_aid], None, DEADLINE).expect("reflect pad should solve");
    g.finalize(|| true).unwrap();
    let model = g.solve_model(DEADLINE).expect("sat model");

    let input_dims_model: Vec<i64> =
        g.alive_shape(input_aid).shape.dims.iter().map(|d| arith::eval(d, &model)).collect();
    for (axis, pad) in pads.iter().enumerate() {
        let Some((l, r)) = pad else { continue };
        let side_value = |side: &PadSide| match side {
            PadSide::Sym(id) => *model.get(id).unwrap(),
            PadSide::Zero => 0,
        };
        let lv = side_value(l);
        let rv = side_value(r);
        assert!(lv > -input_dims_model[axis] && lv < input_dims_model[axis]);
        assert!(rv > -input_dims_model[axis] && rv < input_dims_model[axis]);
    }

    let _ = node_id;
}
