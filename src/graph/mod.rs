//! Symbolic graph (spec.md §4.4): a multi-edge DAG whose alive shapes live
//! in an id-indexed arena rather than being referenced by pointer, so
//! backward-insertion can retarget an edge by overwriting one arena slot in
//! O(1) instead of walking every consumer.

pub mod verifier;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use z3::SatResult;

use crate::arith::smt::SmtContext;
use crate::arith::{BoolExpr, SymId};
use crate::error::{ConstraintError, SanityError};
use crate::ops::{leaf, OpKind, ShapeOp};
use crate::types::TensorShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliveShapeId(pub usize);

/// An output port of some node, reachable for consumption by later
/// insertions until the graph is finalized.
#[derive(Debug, Clone)]
pub struct AliveShape {
    pub shape: TensorShape,
    pub producer: NodeId,
    pub out_port: usize,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub op: OpKind,
    /// Alive-shape ids this node consumes, in argument order.
    pub inputs: Vec<AliveShapeId>,
    /// Alive-shape ids this node produces, in port order.
    pub outputs: Vec<AliveShapeId>,
    /// Set when `backward_insert` retargets every one of this node's
    /// output alive shapes to a newly-inserted op — the node (always a
    /// `Placeholder`) stays in the arena so earlier `NodeId`s referencing
    /// it by position remain valid, but it no longer contributes edges or
    /// a concretized node (spec.md §4.4's "reuse the placeholder's
    /// alive-shape ids so existing consumers keep valid references").
    pub superseded: bool,
}

pub struct SymbolicGraph {
    nodes: Vec<Node>,
    alive: Vec<AliveShape>,
    smt: SmtContext,
    next_sym: SymId,
}

impl SymbolicGraph {
    pub fn new(mode: crate::arith::smt::NumMode) -> Self {
        Self { nodes: Vec::new(), alive: Vec::new(), smt: SmtContext::new(mode), next_sym: 0 }
    }

    pub fn fresh_sym(&mut self) -> SymId {
        let id = self.next_sym;
        self.next_sym += 1;
        id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn alive_shapes(&self) -> &[AliveShape] {
        &self.alive
    }

    /// Live, non-placeholder node count — the quantity `max_nodes` actually
    /// bounds (spec.md §4.5's growth loop termination condition).
    pub fn non_placeholder_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.superseded && !n.op.is_placeholder()).count()
    }

    pub fn alive_shape(&self, id: AliveShapeId) -> &AliveShape {
        &self.alive[id.0]
    }

    pub fn committed_constraints(&self) -> &[BoolExpr] {
        self.smt.committed()
    }

    /// Commits a constraint directly, bypassing any `check_sat` (the search
    /// driver uses this for the root placeholders' positivity/`min_input_dims`
    /// bounds and for the running float-budget assertion — neither is tied
    /// to a specific insertion attempt).
    pub fn commit(&mut self, c: BoolExpr) {
        self.smt.commit(c);
    }

    /// Every symbol referenced by an alive shape's dims or by a committed
    /// constraint, deduplicated. The concretizer's query set for the final
    /// model (spec.md §4.6) — it must be a superset of every symbol that
    /// could influence a concrete shape or operator attribute.
    pub fn all_symbols(&self) -> Vec<SymId> {
        let mut out = Vec::new();
        for shape in &self.alive {
            for d in &shape.shape.dims {
                crate::arith::symbols_in(d, &mut out);
            }
        }
        for c in self.smt.committed() {
            crate::arith::symbols_in_bool(c, &mut out);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Re-solves the committed constraint set and returns the integer
    /// value of every symbol `all_symbols` reports (spec.md §4.5's final
    /// `post_process` check / §4.6's concretization source).
    pub fn solve_model(&self, deadline: Duration) -> Option<std::collections::HashMap<SymId, i64>> {
        let symbols = self.all_symbols();
        self.smt.solve_model(&symbols, deadline)
    }

    fn push_node(&mut self, op: OpKind, inputs: Vec<AliveShapeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { op, inputs, outputs: Vec::new(), superseded: false });
        id
    }

    fn push_alive(&mut self, shape: TensorShape, producer: NodeId, out_port: usize) -> AliveShapeId {
        let id = AliveShapeId(self.alive.len());
        self.alive.push(AliveShape { shape, producer, out_port });
        id
    }

    fn try_candidate(&self, candidate: &[BoolExpr], deadline: Duration) -> SatResult {
        self.smt.check_sat_with_deadline(candidate, deadline)
    }

    /// Appends `op` consuming `chosen` existing alive shapes (spec.md
    /// §4.4's forward-insertion move). `budget` is folded into the same
    /// atomic check as `op.requires` and the output positivity
    /// constraints, not asserted separately, so a budget-violating
    /// insertion reports `Unsat` rather than silently committing and being
    /// caught later.
    pub fn forward_insert(
        &mut self,
        op: OpKind,
        chosen: Vec<AliveShapeId>,
        budget: Option<&dyn Fn(&[TensorShape]) -> BoolExpr>,
        deadline: Duration,
    ) -> Result<NodeId, ConstraintError> {
        if chosen.len() != op.arity() {
            return Err(ConstraintError::NoCandidateShape);
        }
        let input_shapes: Vec<TensorShape> = chosen.iter().map(|id| self.alive[id.0].shape.clone()).collect();
        let out_shapes = op.shape_fn(&input_shapes);
        let mut candidate = op.requires(&input_shapes);
        for o in &out_shapes {
            candidate.push(o.all_positive());
        }
        if let Some(f) = budget {
            candidate.push(f(&out_shapes));
        }

        match self.try_candidate(&candidate, deadline) {
            SatResult::Sat => {
                for c in candidate {
                    self.smt.commit(c);
                }
                let node_id = self.push_node(op, chosen);
                let out_ports: Vec<AliveShapeId> = out_shapes
                    .into_iter()
                    .enumerate()
                    .map(|(port, shape)| self.push_alive(shape, node_id, port))
                    .collect();
                self.nodes[node_id.0].outputs = out_ports;
                Ok(node_id)
            }
            SatResult::Unsat => Err(ConstraintError::Unsat),
            SatResult::Unknown => Err(ConstraintError::Unknown),
        }
    }

    /// Replaces the placeholders at `targets` with `op`'s outputs, and
    /// introduces a fresh `Placeholder` for each of `op`'s own inputs
    /// (spec.md §4.4's backward-insertion move). `candidate_inputs` are
    /// freshly-symbolized shapes the caller proposes for `op`'s inputs —
    /// constructing them (picking a rank and allocating symbols) is the
    /// search driver's job, not the graph's.
    pub fn backward_insert(
        &mut self,
        op: OpKind,
        candidate_inputs: Vec<TensorShape>,
        targets: &[AliveShapeId],
        budget: Option<&dyn Fn(&[TensorShape]) -> BoolExpr>,
        deadline: Duration,
    ) -> Result<NodeId, ConstraintError> {
        if candidate_inputs.len() != op.arity() {
            return Err(ConstraintError::NoCandidateShape);
        }
        let out_shapes = op.shape_fn(&candidate_inputs);
        if out_shapes.len() != targets.len() {
            return Err(ConstraintError::NoCandidateShape);
        }

        let mut candidate = op.requires(&candidate_inputs);
        for shape in &candidate_inputs {
            candidate.push(shape.all_positive());
        }
        for (out_shape, &target_id) in out_shapes.iter().zip(targets) {
            let target_shape = &self.alive[target_id.0].shape;
            if out_shape.rank() != target_shape.rank() {
                return Err(ConstraintError::NoCandidateShape);
            }
            candidate.push(out_shape.equal_to(target_shape));
        }
        if let Some(f) = budget {
            candidate.push(f(&candidate_inputs));
        }

        match self.try_candidate(&candidate, deadline) {
            SatResult::Sat => {
                for c in candidate {
                    self.smt.commit(c);
                }
                let input_alive: Vec<AliveShapeId> = candidate_inputs
                    .into_iter()
                    .map(|shape| {
                        let ph_node = self.push_node(OpKind::Placeholder(leaf::Placeholder { shape: shape.clone() }), Vec::new());
                        let aid = self.push_alive(shape, ph_node, 0);
                        self.nodes[ph_node.0].outputs = vec![aid];
                        aid
                    })
                    .collect();

                let node_id = self.push_node(op, input_alive);
                self.nodes[node_id.0].outputs = targets.to_vec();
                for (port, &target_id) in targets.iter().enumerate() {
                    let old_producer = self.alive[target_id.0].producer;
                    self.nodes[old_producer.0].superseded = true;
                    self.alive[target_id.0].producer = node_id;
                    self.alive[target_id.0].out_port = port;
                }
                Ok(node_id)
            }
            SatResult::Unsat => Err(ConstraintError::Unsat),
            SatResult::Unknown => Err(ConstraintError::Unknown),
        }
    }

    /// Allocates a brand-new placeholder, the seed of a backward-insertion
    /// chain or the eventual root input of a forward chain.
    pub fn new_placeholder(&mut self, shape: TensorShape) -> AliveShapeId {
        let node_id = self.push_node(OpKind::Placeholder(leaf::Placeholder { shape: shape.clone() }), Vec::new());
        let aid = self.push_alive(shape, node_id, 0);
        self.nodes[node_id.0].outputs = vec![aid];
        aid
    }

    /// Replaces every surviving `Placeholder` with an `Input` or
    /// `Constant`, per `input_prob` (spec.md §4.4's finalization step).
    /// Returns an error if any placeholder's alive shape is still
    /// referenced as another node's *input* but was never retargeted —
    /// that would indicate a bookkeeping bug, not a user-facing condition.
    pub fn finalize(&mut self, mut pick_is_input: impl FnMut() -> bool) -> Result<(), SanityError> {
        for node in self.nodes.iter_mut() {
            if let OpKind::Placeholder(ph) = &node.op {
                let shape = ph.shape.clone();
                node.op = if pick_is_input() {
                    OpKind::Input(leaf::Input { shape })
                } else {
                    OpKind::Constant(leaf::Constant { shape })
                };
            }
        }
        let remaining = self.nodes.iter().filter(|n| n.op.is_placeholder()).count();
        if remaining > 0 {
            return Err(SanityError::PlaceholdersRemaining(remaining));
        }
        Ok(())
    }
}
