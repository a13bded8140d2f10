//! Concretizer (spec.md §4.6): walks the finalized symbolic graph in
//! topological order, substitutes every symbolic dim and construction
//! parameter with its value under the solver's final model, and hands back
//! a plain-integer graph ready for an external materializer. Nothing here
//! builds tensors or runs operator semantics — that crosses the boundary
//! described in `external.rs`.

use std::collections::HashMap;

use crate::arith::{eval, SymId};
use crate::error::SanityError;
use crate::graph::{NodeId, SymbolicGraph};
use crate::ops::{OpKind, ShapeOp};
use crate::types::DType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteShape {
    pub dims: Vec<i64>,
    pub dtype: DType,
}

/// Mirrors `OpKind`, but every field that could carry a symbol has been
/// substituted for its model value; attributes that were already concrete
/// at construction time (axis, region, mode, kernel/stride/padding, ...)
/// are copied verbatim (spec.md §4.3's `concretize` method, applied
/// uniformly here instead of per-variant since none of the non-`Pad`
/// variants hold a symbolic attribute beyond what the output `ConcreteShape`
/// already captures).
#[derive(Debug, Clone)]
pub enum ConcreteOp {
    Unary(crate::ops::unary::UnaryKind),
    Binary(crate::ops::binary::BinaryKind),
    Where,
    Gemm { alpha: f64, beta: f64 },
    Conv2d(crate::ops::conv::NchwConv2d),
    Reshape { target: Vec<Option<i64>> },
    Transpose { axis_a: usize, axis_b: usize },
    Reduce { kind: crate::ops::reduce::ReduceKind, reduce_dim: usize },
    Concat { axis: usize },
    Slice { axis: usize, start: i64, end: i64, step: i64 },
    Pad { mode: crate::ops::pad::PadMode, pads: Vec<(i64, i64)> },
    Expand,
    Cast { target: DType },
    /// `sample` carries nothing concrete here — filling a constant's bytes
    /// is the input oracle's job (spec.md §6's `InputOracle`/materializer
    /// boundary), not the generator's.
    Constant,
    Input,
}

#[derive(Debug, Clone)]
pub struct ConcreteNode {
    pub op: ConcreteOp,
    /// `(producer, out_port)` pairs, one per declared input, in argument
    /// order.
    pub inputs: Vec<(NodeId, usize)>,
    pub outputs: Vec<ConcreteShape>,
}

/// The concretizer's output: a plain-integer DAG in topological order. Dead
/// (`superseded`) nodes from backward insertion never appear here.
#[derive(Debug, Clone)]
pub struct ConcreteGraph {
    pub order: Vec<NodeId>,
    pub nodes: HashMap<NodeId, ConcreteNode>,
}

impl ConcreteGraph {
    pub fn node(&self, id: NodeId) -> &ConcreteNode {
        &self.nodes[&id]
    }

    /// Nodes with no incoming edges from another node — the model's
    /// Inputs/Constants (spec.md §4.6).
    pub fn leaves(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter().filter(move |id| self.nodes[id].inputs.is_empty())
    }
}

pub fn concretize(graph: &SymbolicGraph, model: &HashMap<SymId, i64>) -> Result<ConcreteGraph, SanityError> {
    let order = topo_order(graph)?;
    let mut nodes = HashMap::with_capacity(order.len());

    for &id in &order {
        let node = &graph.nodes()[id.0];
        let inputs = node
            .inputs
            .iter()
            .map(|&aid| {
                let alive = graph.alive_shape(aid);
                (alive.producer, alive.out_port)
            })
            .collect();
        let outputs = node
            .outputs
            .iter()
            .map(|&aid| {
                let shape = &graph.alive_shape(aid).shape;
                ConcreteShape {
                    dims: shape.dims.iter().map(|d| eval(d, model)).collect(),
                    dtype: shape.dtype,
                }
            })
            .collect();
        let op = concretize_op(&node.op, model);
        nodes.insert(id, ConcreteNode { op, inputs, outputs });
    }

    Ok(ConcreteGraph { order, nodes })
}

fn concretize_op(op: &OpKind, model: &HashMap<SymId, i64>) -> ConcreteOp {
    match op {
        OpKind::Unary(o) => ConcreteOp::Unary(o.kind),
        OpKind::Binary(o) => ConcreteOp::Binary(o.kind),
        OpKind::Where(_) => ConcreteOp::Where,
        OpKind::Gemm(o) => ConcreteOp::Gemm { alpha: o.alpha, beta: o.beta },
        OpKind::Conv2d(o) => ConcreteOp::Conv2d(*o),
        OpKind::Reshape(o) => ConcreteOp::Reshape { target: o.target.clone() },
        OpKind::Transpose(o) => ConcreteOp::Transpose { axis_a: o.axis_a, axis_b: o.axis_b },
        OpKind::Reduce(o) => ConcreteOp::Reduce { kind: o.kind, reduce_dim: o.reduce_dim },
        OpKind::Concat(o) => ConcreteOp::Concat { axis: o.axis },
        OpKind::Slice(o) => {
            // start_raw/end_raw/step_raw are concrete Rust-level i64s
            // already (picked by the search driver, not solved), but they
            // may still be negative Python-style offsets; resolve them
            // against nothing further here since shape_fn already folded
            // that resolution into the output dims. The attributes carried
            // forward are the raw ones, matching what the original
            // generator's `concretize` does for `Slice` (copy the
            // constructor args, not the derived positive offsets).
            ConcreteOp::Slice { axis: o.axis, start: o.start_raw, end: o.end_raw, step: o.step_raw }
        }
        OpKind::Pad(o) => {
            let eval_side = |side: &crate::ops::pad::PadSide| match side {
                crate::ops::pad::PadSide::Sym(id) => *model.get(id).unwrap_or_else(|| panic!("pad symbol s{id} missing from model")),
                crate::ops::pad::PadSide::Zero => 0,
            };
            let pads = o
                .pads
                .iter()
                .map(|pad| match pad {
                    Some((l, r)) => (eval_side(l), eval_side(r)),
                    None => (0, 0),
                })
                .collect();
            ConcreteOp::Pad { mode: o.mode, pads }
        }
        OpKind::Expand(_) => ConcreteOp::Expand,
        OpKind::Cast(o) => ConcreteOp::Cast { target: o.target },
        OpKind::Constant(_) => ConcreteOp::Constant,
        OpKind::Input(_) => ConcreteOp::Input,
        OpKind::Placeholder(_) => unreachable!("finalize() converts every Placeholder before concretize() runs"),
    }
}

/// Postorder DFS over the producer-dependency edges, skipping superseded
/// (dead) nodes entirely — they're never reachable through a live alive
/// shape's `producer` field, but the outer scan must also not start a walk
/// from one directly.
fn topo_order(graph: &SymbolicGraph) -> Result<Vec<NodeId>, SanityError> {
    let n = graph.nodes().len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for start in 0..n {
        if !visited[start] && !graph.nodes()[start].superseded {
            visit(graph, start, &mut visited, &mut order)?;
        }
    }
    Ok(order)
}

fn visit(graph: &SymbolicGraph, i: usize, visited: &mut [bool], order: &mut Vec<NodeId>) -> Result<(), SanityError> {
    if visited[i] {
        return Ok(());
    }
    visited[i] = true;
    for &input_id in &graph.nodes()[i].inputs {
        let producer = graph.alive_shape(input_id).producer;
        if producer.0 == i {
            return Err(SanityError::Cycle(NodeId(i)));
        }
        visit(graph, producer.0, visited, order)?;
    }
    order.push(NodeId(i));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::smt::NumMode;
    use crate::ops::{leaf, unary, OpKind};
    use crate::types::TensorShape;
    use std::time::Duration;

    #[test]
    fn single_relu_graph_concretizes_to_matching_shapes() {
        let mut g = SymbolicGraph::new(NumMode::Int);
        let s0 = g.fresh_sym();
        let input_shape = TensorShape::new(vec![crate::arith::var(s0)], DType::F32);
        g.commit(input_shape.all_positive());
        let input_aid = g.new_placeholder(input_shape);

        let relu = OpKind::Unary(unary::UnaryOp { kind: unary::UnaryKind::Relu });
        g.forward_insert(relu, vec![input_aid], None, Duration::from_millis(500)).unwrap();

        g.finalize(|| true).unwrap();

        let model = g.solve_model(Duration::from_millis(500)).expect("sat model");
        let cg = concretize(&g, &model).unwrap();

        assert_eq!(cg.order.len(), 2);
        let relu_node = cg.node(*cg.order.last().unwrap());
        assert_eq!(relu_node.outputs.len(), 1);
        assert!(relu_node.outputs[0].dims[0] >= 1);
        assert!(matches!(relu_node.op, ConcreteOp::Unary(unary::UnaryKind::Relu)));
    }

    #[test]
    fn dead_placeholder_from_backward_insert_is_excluded() {
        use crate::ops::binary::{BinaryKind, BinaryOp};

        let mut g = SymbolicGraph::new(NumMode::Int);
        let s0 = g.fresh_sym();
        let out_shape = TensorShape::new(vec![crate::arith::var(s0)], DType::F32);
        g.commit(out_shape.all_positive());
        let out_aid = g.new_placeholder(out_shape);

        let op = OpKind::Binary(BinaryOp { kind: BinaryKind::Add });
        let lhs_sym = g.fresh_sym();
        let rhs_sym = g.fresh_sym();
        let lhs = TensorShape::new(vec![crate::arith::var(lhs_sym)], DType::F32);
        let rhs = TensorShape::new(vec![crate::arith::var(rhs_sym)], DType::F32);
        g.commit(lhs.all_positive());
        g.commit(rhs.all_positive());

        g.backward_insert(op, vec![lhs, rhs], &[out_aid], None, Duration::from_millis(500)).unwrap();
        g.finalize(|| true).unwrap();

        let model = g.solve_model(Duration::from_millis(500)).expect("sat model");
        let cg = concretize(&g, &model).unwrap();

        // original placeholder (node 0) must not appear: it was superseded.
        assert!(!cg.order.contains(&NodeId(0)));
        assert_eq!(cg.order.len(), 3);
        let _ = leaf::default_dtype();
    }
}
