//! Search driver (spec.md §4.5): the `abstract_gen` growth loop that repeatedly
//! picks an operator family, builds a concrete candidate for it, and asks the
//! symbolic graph to forward- or backward-insert it, retrying on rejection.
//!
//! Grounded in `SimpleGenerator`/`PureSymbolGen`/`CoverageTableGen` from
//! `nnsmith/graph_gen.py`: the retry-with-fresh-pick loop, the float-budget
//! bookkeeping, and the `GenerationTable`-driven family weighting all mirror
//! that file's structure, adapted to the placeholder-based forward/backward
//! insertion model SPEC_FULL.md §4.4-4.5 describes (this crate's Open
//! Question #2 resolution: only that newer model is implemented).

pub mod table;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::arith::{self, BoolExpr, Expr};
use crate::config::{FloatBudgetMode, GenConfig, OpWeighting};
use crate::error::{ConstraintError, GenError, GenResult, SanityError};
use crate::graph::{AliveShapeId, SymbolicGraph};
use crate::ops::{binary, cast, concat, conv, expand, infer, leaf, pad, reduce, reshape, slice, ternary, transpose, unary, OpKind};
use crate::types::{DType, TensorShape};

use table::GenerationTable;

/// One slot of the closed operator taxonomy (spec.md §4.3), coarser than
/// `OpKind`: several `OpKind` variants fan out into many concrete sub-kinds
/// (19 `UnaryKind`s, 13 `BinaryKind`s, ...) that all share one family here.
/// `merge_op_weighting: v0` weights each sub-kind uniformly; `v1` and
/// `latest` weight whole families uniformly/adaptively instead (spec.md
/// §9's Open Question on `merge_op_weighting`, resolved in DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Unary,
    Binary,
    Where,
    Gemm,
    Conv2d,
    Reshape,
    Transpose,
    Reduce,
    Concat,
    Slice,
    Pad,
    Expand,
    Cast,
    /// Not a real insertable family: stands in for "no predecessor op" when
    /// looking up the `GenerationTable` row for the very first insertion
    /// against the root placeholder.
    Leaf,
}

impl Family {
    pub const ALL: [Family; 13] = [
        Family::Unary,
        Family::Binary,
        Family::Where,
        Family::Gemm,
        Family::Conv2d,
        Family::Reshape,
        Family::Transpose,
        Family::Reduce,
        Family::Concat,
        Family::Slice,
        Family::Pad,
        Family::Expand,
        Family::Cast,
    ];

    fn index(&self) -> usize {
        match self {
            Family::Unary => 0,
            Family::Binary => 1,
            Family::Where => 2,
            Family::Gemm => 3,
            Family::Conv2d => 4,
            Family::Reshape => 5,
            Family::Transpose => 6,
            Family::Reduce => 7,
            Family::Concat => 8,
            Family::Slice => 9,
            Family::Pad => 10,
            Family::Expand => 11,
            Family::Cast => 12,
            Family::Leaf => 13,
        }
    }

    /// Matches the `name()` of every `OpKind` variant this family produces,
    /// so `GenConfig::skip_ops` (a list of op names) can filter by family.
    fn name(&self) -> &'static str {
        match self {
            Family::Unary => "ElementwiseUnary",
            Family::Binary => "BcastBinary",
            Family::Where => "Where",
            Family::Gemm => "Gemm",
            Family::Conv2d => "NCHWConv2d",
            Family::Reshape => "Reshape",
            Family::Transpose => "Transpose",
            Family::Reduce => "Reduce",
            Family::Concat => "Concat",
            Family::Slice => "Slice",
            Family::Pad => "Pad",
            Family::Expand => "Expand",
            Family::Cast => "Cast",
            Family::Leaf => "",
        }
    }

    /// How many distinct concrete sub-kinds this family fans out into,
    /// used only by `OpWeighting::V0`'s per-variant weighting.
    fn variant_count(&self) -> usize {
        match self {
            Family::Unary => unary::UnaryKind::ALL.len(),
            Family::Binary => binary::BinaryKind::ALL.len(),
            Family::Reduce => reduce::ReduceKind::ALL.len(),
            Family::Pad => pad::PadMode::ALL.len(),
            Family::Concat => 4, // arities 2..=5
            Family::Cast => DType::ALL.len(),
            _ => 1,
        }
    }

    fn of_op(op: &OpKind) -> Family {
        match op {
            OpKind::Unary(_) => Family::Unary,
            OpKind::Binary(_) => Family::Binary,
            OpKind::Where(_) => Family::Where,
            OpKind::Gemm(_) => Family::Gemm,
            OpKind::Conv2d(_) => Family::Conv2d,
            OpKind::Reshape(_) => Family::Reshape,
            OpKind::Transpose(_) => Family::Transpose,
            OpKind::Reduce(_) => Family::Reduce,
            OpKind::Concat(_) => Family::Concat,
            OpKind::Slice(_) => Family::Slice,
            OpKind::Pad(_) => Family::Pad,
            OpKind::Expand(_) => Family::Expand,
            OpKind::Cast(_) => Family::Cast,
            OpKind::Constant(_) | OpKind::Input(_) | OpKind::Placeholder(_) => Family::Leaf,
        }
    }

    /// Families with no stable "same rank in as out" relationship, so
    /// backward-insertion — which must guess an input rank before knowing
    /// the operator — is not attempted for them (DESIGN.md's Open Question
    /// on backward-insertable families).
    fn backward_eligible(&self) -> bool {
        !matches!(self, Family::Reshape | Family::Expand | Family::Gemm)
    }
}

/// Per-input-slot requirement a family's construction settles on before the
/// driver goes looking for alive shapes (or fresh symbols, in backward
/// mode) to fill it. `rank < 0` means "any rank accepted".
struct InputSpec {
    rank: i64,
    dtype: DType,
}

const RETRY_LIMIT: usize = 3;

enum AttemptOutcome {
    Sat,
    Unsat,
    Unknown,
    NoCandidate,
}

/// Drives `SymbolicGraph` through spec.md §4.5's growth loop. Construct one
/// per generation run; `run` consumes it into a finalized, concretizable
/// graph.
pub struct Driver {
    config: GenConfig,
    graph: SymbolicGraph,
    rng: StdRng,
    table: GenerationTable,
    float_used: f64,
}

impl Driver {
    pub fn new(config: GenConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let graph = SymbolicGraph::new(config.num_mode());
        Self { config, graph, rng, table: GenerationTable::new(), float_used: 0.0 }
    }

    pub fn into_graph(self) -> SymbolicGraph {
        self.graph
    }

    pub fn graph(&self) -> &SymbolicGraph {
        &self.graph
    }

    fn choice<'a, T: Copy>(&mut self, xs: &'a [T]) -> T {
        xs[self.rng.gen_range(0..xs.len())]
    }

    fn is_skipped(&self, family: Family) -> bool {
        self.config.skip_ops.iter().any(|s| s == family.name())
    }

    /// Seeds the single root placeholder every graph grows from (spec.md
    /// §8's `init_rank`), and commits its positivity and `min_input_dims`
    /// floor directly — no insertion attempt produces the very first alive
    /// shape.
    fn seed_root(&mut self) {
        let rank = self.config.init_rank.max(self.config.min_input_dims);
        let dims: Vec<Expr> = (0..rank).map(|_| arith::var(self.graph.fresh_sym())).collect();
        let shape = TensorShape::new(dims, leaf::default_dtype());
        self.graph.commit(shape.all_positive());
        self.graph.new_placeholder(shape);
    }

    /// Runs the growth loop to completion, finalizes every surviving
    /// placeholder, and re-solves once more to confirm the finalized graph
    /// is still satisfiable (spec.md §4.5's `post_process`/§4.4's
    /// finalization step).
    pub fn run(&mut self) -> GenResult<()> {
        self.seed_root();

        let deadline = self.config.attempt_timeout();
        let start = Instant::now();
        let budget = Duration::from_millis(self.config.max_gen_ms);

        while start.elapsed() < budget && self.graph.non_placeholder_node_count() < self.config.max_nodes {
            let family = self.pick_family();
            let mut accepted = false;
            for _ in 0..RETRY_LIMIT {
                match self.attempt(family, deadline) {
                    AttemptOutcome::Sat => {
                        accepted = true;
                        break;
                    }
                    AttemptOutcome::Unknown => break,
                    AttemptOutcome::Unsat | AttemptOutcome::NoCandidate => continue,
                }
            }
            debug!(family = family.name(), accepted, nodes = self.graph.non_placeholder_node_count(), "insertion attempt");
        }

        let actual = self.graph.non_placeholder_node_count();
        if actual + 3 < self.config.max_nodes {
            warn!(actual, target = self.config.max_nodes, "growth loop exited well short of max_nodes");
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed ^ 0xA5A5_A5A5);
        self.graph.finalize(|| rng.gen_bool(0.5)).map_err(GenError::from)?;

        match self.graph.solve_model(deadline) {
            Some(_) => Ok(()),
            None => Err(GenError::Sanity(SanityError::PlaceholdersRemaining(0))),
        }
    }

    // ---- family selection -------------------------------------------------

    fn pick_family(&mut self) -> Family {
        let candidates: Vec<Family> = Family::ALL.into_iter().filter(|f| !self.is_skipped(*f)).collect();
        if candidates.is_empty() {
            return Family::Unary;
        }
        let src = self.last_family();
        let weights: Vec<f64> = match self.config.merge_op_weighting {
            OpWeighting::V0 => candidates.iter().map(|f| f.variant_count() as f64).collect(),
            OpWeighting::V1 => vec![1.0; candidates.len()],
            OpWeighting::Latest => self.table.weights_for(src, &candidates),
        };
        weighted_pick(&mut self.rng, &candidates, &weights)
    }

    /// The family of the most recently inserted node, or `Family::Leaf` if
    /// nothing has been inserted yet — the `GenerationTable` row to look up
    /// for the next pick (spec.md §9's adaptive weighting).
    fn last_family(&self) -> Family {
        self.graph
            .nodes()
            .iter()
            .rev()
            .find(|n| !n.superseded && !n.op.is_placeholder())
            .map(|n| Family::of_op(&n.op))
            .unwrap_or(Family::Leaf)
    }

    fn note_result(&mut self, src: Family, tar: Family, outcome: &AttemptOutcome) {
        match outcome {
            AttemptOutcome::Sat => self.table.on_success(src, tar),
            AttemptOutcome::Unsat => self.table.on_rejected(src, tar),
            AttemptOutcome::Unknown => self.table.on_unsolvable(src, tar),
            AttemptOutcome::NoCandidate => {}
        }
    }

    // ---- attempts -----------------------------------------------------

    fn attempt(&mut self, family: Family, deadline: Duration) -> AttemptOutcome {
        let forward = self.rng.gen_bool(self.config.forward_prob) || !family.backward_eligible();
        if forward {
            self.try_forward(family, deadline)
        } else {
            self.try_backward(family, deadline)
        }
    }

    fn budget_fn(&self) -> Option<Box<dyn Fn(&[TensorShape]) -> BoolExpr>> {
        let bytes = self.config.float_budget_bytes();
        let used = self.float_used;
        match self.config.float_budget_mode {
            FloatBudgetMode::RunningSum => Some(Box::new(move |outs: &[TensorShape]| {
                let added = outs
                    .iter()
                    .filter(|o| o.dtype.is_float())
                    .fold(arith::lit(0), |acc, o| arith::nnsmith_add(&acc, &arith::nnsmith_mul(&o.nelement(), &arith::lit(o.dtype.byte_width() as i64))));
                let total = arith::nnsmith_add(&arith::lit(used as i64), &added);
                arith::nnsmith_le(&total, &arith::lit(bytes as i64))
            })),
            FloatBudgetMode::PerOpUpperBound => Some(Box::new(move |outs: &[TensorShape]| {
                let clauses: Vec<BoolExpr> = outs
                    .iter()
                    .filter(|o| o.dtype.is_float())
                    .map(|o| {
                        let bytes_expr = arith::nnsmith_mul(&o.nelement(), &arith::lit(o.dtype.byte_width() as i64));
                        arith::nnsmith_le(&bytes_expr, &arith::lit(bytes as i64))
                    })
                    .collect();
                arith::and(clauses)
            })),
        }
    }

    fn record_float_usage(&mut self, shapes: &[TensorShape], model_guess: &std::collections::HashMap<crate::arith::SymId, i64>) {
        if !matches!(self.config.float_budget_mode, FloatBudgetMode::RunningSum) {
            return;
        }
        for shape in shapes {
            if !shape.dtype.is_float() {
                continue;
            }
            let n: i64 = shape.dims.iter().map(|d| arith::eval(d, model_guess)).product();
            self.float_used += (n.max(0) as f64) * shape.dtype.byte_width() as f64;
        }
    }

    fn try_forward(&mut self, family: Family, deadline: Duration) -> AttemptOutcome {
        if self.graph.alive_shapes().is_empty() {
            return AttemptOutcome::NoCandidate;
        }
        let (ref_rank, ref_dtype) = self.pick_reference();
        let Some((op, specs)) = self.requirement(family, ref_rank, ref_dtype) else {
            return AttemptOutcome::NoCandidate;
        };

        let mut chosen = Vec::with_capacity(specs.len());
        for spec in &specs {
            match self.pick_alive_shape(spec.rank, spec.dtype) {
                Some(aid) => chosen.push(aid),
                None => return AttemptOutcome::NoCandidate,
            }
        }
        let src = self.family_of_producer(chosen[0]);
        let budget_fn = self.budget_fn();
        let result = self.graph.forward_insert(op, chosen, budget_fn.as_deref(), deadline);
        let outcome = match result {
            Ok(node_id) => {
                if let Some(model) = self.graph.solve_model(deadline) {
                    let outs: Vec<TensorShape> =
                        self.graph.nodes()[node_id.0].outputs.iter().map(|&aid| self.graph.alive_shape(aid).shape.clone()).collect();
                    self.record_float_usage(&outs, &model);
                }
                AttemptOutcome::Sat
            }
            Err(ConstraintError::Unsat) => AttemptOutcome::Unsat,
            Err(ConstraintError::Unknown) => AttemptOutcome::Unknown,
            Err(_) => AttemptOutcome::NoCandidate,
        };
        self.note_result(src, family, &outcome);
        outcome
    }

    fn try_backward(&mut self, family: Family, deadline: Duration) -> AttemptOutcome {
        if !family.backward_eligible() {
            return AttemptOutcome::NoCandidate;
        }
        let targets = self.placeholder_alive_shapes();
        if targets.is_empty() {
            return AttemptOutcome::NoCandidate;
        }
        let target_aid = self.choice(&targets);
        let target_shape = self.graph.alive_shape(target_aid).shape.clone();
        let rank = target_shape.rank();
        let dtype = target_shape.dtype;

        let input_rank = if family == Family::Reduce { rank + 1 } else { rank };
        let Some((op, specs)) = self.requirement(family, input_rank, dtype) else {
            return AttemptOutcome::NoCandidate;
        };

        let candidate_inputs: Vec<TensorShape> = specs
            .iter()
            .map(|spec| {
                let r = if spec.rank < 0 { input_rank } else { spec.rank as usize };
                let dims = (0..r).map(|_| arith::var(self.graph.fresh_sym())).collect();
                TensorShape::new(dims, spec.dtype)
            })
            .collect();

        let budget_fn = self.budget_fn();
        let result = self.graph.backward_insert(op, candidate_inputs, &[target_aid], budget_fn.as_deref(), deadline);
        let outcome = match result {
            Ok(node_id) => {
                if let Some(model) = self.graph.solve_model(deadline) {
                    let new_inputs: Vec<TensorShape> =
                        self.graph.nodes()[node_id.0].inputs.iter().map(|&aid| self.graph.alive_shape(aid).shape.clone()).collect();
                    self.record_float_usage(&new_inputs, &model);
                }
                AttemptOutcome::Sat
            }
            Err(ConstraintError::Unsat) => AttemptOutcome::Unsat,
            Err(ConstraintError::Unknown) => AttemptOutcome::Unknown,
            Err(_) => AttemptOutcome::NoCandidate,
        };
        self.note_result(Family::Leaf, family, &outcome);
        outcome
    }

    // ---- candidate pools ------------------------------------------------

    fn pick_reference(&mut self) -> (usize, DType) {
        let alive = self.graph.alive_shapes();
        let idx = self.rng.gen_range(0..alive.len());
        (alive[idx].shape.rank(), alive[idx].shape.dtype)
    }

    fn pick_alive_shape(&mut self, rank: i64, dtype: DType) -> Option<AliveShapeId> {
        let candidates: Vec<AliveShapeId> = self
            .graph
            .alive_shapes()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.shape.dtype == dtype && (rank < 0 || a.shape.rank() == rank as usize))
            .map(|(i, _)| AliveShapeId(i))
            .collect();
        if candidates.is_empty() {
            None
        } else {
            Some(self.choice(&candidates))
        }
    }

    fn placeholder_alive_shapes(&self) -> Vec<AliveShapeId> {
        self.graph
            .alive_shapes()
            .iter()
            .enumerate()
            .filter(|(_, a)| matches!(self.graph.nodes()[a.producer.0].op, OpKind::Placeholder(_)) && !self.graph.nodes()[a.producer.0].superseded)
            .map(|(i, _)| AliveShapeId(i))
            .collect()
    }

    fn family_of_producer(&self, aid: AliveShapeId) -> Family {
        let producer = self.graph.alive_shape(aid).producer;
        Family::of_op(&self.graph.nodes()[producer.0].op)
    }

    // ---- per-family construction -----------------------------------------

    /// Builds a concrete `OpKind` for `family` plus the rank/dtype each of
    /// its input slots needs, given `rank`/`dtype` sampled from whichever
    /// alive shape (forward) or backward target anchors this attempt.
    /// `None` means this family has no viable construction against that
    /// anchor (e.g. `Transpose` needs rank >= 2) and the attempt should be
    /// discarded without touching the solver.
    fn requirement(&mut self, family: Family, rank: usize, dtype: DType) -> Option<(OpKind, Vec<InputSpec>)> {
        match family {
            Family::Unary => {
                let kind = self.choice(&unary::UnaryKind::ALL);
                let admitted = infer::unary_admitted_dtypes(kind);
                if admitted.is_empty() {
                    return None;
                }
                let dtype = self.choice(&admitted);
                Some((OpKind::Unary(unary::UnaryOp { kind }), vec![InputSpec { rank: -1, dtype }]))
            }
            Family::Binary => {
                let kind = self.choice(&binary::BinaryKind::ALL);
                let admitted = infer::binary_admitted_dtypes(kind);
                if admitted.is_empty() {
                    return None;
                }
                let dtype = self.choice(&admitted);
                Some((
                    OpKind::Binary(binary::BinaryOp { kind }),
                    vec![InputSpec { rank: -1, dtype }, InputSpec { rank: -1, dtype }],
                ))
            }
            Family::Where => {
                let dtype = self.choice(&DType::NONBOOL);
                Some((
                    OpKind::Where(ternary::Where),
                    vec![InputSpec { rank: -1, dtype: DType::Bool }, InputSpec { rank: -1, dtype }, InputSpec { rank: -1, dtype }],
                ))
            }
            Family::Gemm => {
                let dtype = self.choice(&DType::FLOATS);
                Some((
                    OpKind::Gemm(ternary::Gemm { alpha: 1.0, beta: 1.0 }),
                    vec![InputSpec { rank: 2, dtype }, InputSpec { rank: 2, dtype }, InputSpec { rank: -1, dtype }],
                ))
            }
            Family::Conv2d => {
                let dtype = DType::F32;
                let out_channels = self.rng.gen_range(1..=8);
                let kernel_h = self.rng.gen_range(1..=3);
                let kernel_w = self.rng.gen_range(1..=3);
                let stride_h = self.rng.gen_range(1..=2);
                let stride_w = self.rng.gen_range(1..=2);
                let padding_h = self.rng.gen_range(0..=1);
                let padding_w = self.rng.gen_range(0..=1);
                Some((
                    OpKind::Conv2d(conv::NchwConv2d {
                        out_channels,
                        kernel_h,
                        kernel_w,
                        stride_h,
                        stride_w,
                        padding_h,
                        padding_w,
                        dilation_h: 1,
                        dilation_w: 1,
                    }),
                    vec![InputSpec { rank: 4, dtype }],
                ))
            }
            Family::Reshape => {
                let dtype = self.choice(&DType::ALL);
                let out_rank = self.rng.gen_range(1..=4usize);
                let wildcard_axis = self.rng.gen_range(0..out_rank);
                let target = (0..out_rank)
                    .map(|i| if i == wildcard_axis { None } else { Some(self.rng.gen_range(1..=reshape::geometric_dim_cap(i))) })
                    .collect();
                Some((OpKind::Reshape(reshape::Reshape { target }), vec![InputSpec { rank: -1, dtype }]))
            }
            Family::Transpose => {
                if rank < 2 {
                    return None;
                }
                let axis_a = self.rng.gen_range(0..rank);
                let mut axis_b = self.rng.gen_range(0..rank);
                while axis_b == axis_a {
                    axis_b = self.rng.gen_range(0..rank);
                }
                Some((OpKind::Transpose(transpose::Transpose { axis_a, axis_b }), vec![InputSpec { rank: rank as i64, dtype }]))
            }
            Family::Reduce => {
                if rank == 0 {
                    return None;
                }
                let kind = self.choice(&reduce::ReduceKind::ALL);
                let reduce_dim = self.rng.gen_range(0..rank);
                let in_dtype = if matches!(kind, reduce::ReduceKind::ArgMin | reduce::ReduceKind::ArgMax) { DType::F32 } else { dtype };
                Some((OpKind::Reduce(reduce::ReduceOp { kind, reduce_dim }), vec![InputSpec { rank: rank as i64, dtype: in_dtype }]))
            }
            Family::Concat => {
                if rank == 0 {
                    return None;
                }
                let arity = self.rng.gen_range(2..=5usize);
                let axis = self.rng.gen_range(0..rank);
                Some((OpKind::Concat(concat::Concat { arity, axis }), (0..arity).map(|_| InputSpec { rank: rank as i64, dtype }).collect()))
            }
            Family::Slice => {
                if rank == 0 {
                    return None;
                }
                let axis = self.rng.gen_range(0..rank);
                let region = self.choice(&slice::Region::ALL);
                let (start_raw, end_raw) = match region {
                    slice::Region::Left => (0, self.rng.gen_range(1..=4)),
                    slice::Region::Mid => (self.rng.gen_range(0..2), self.rng.gen_range(2..=6)),
                    slice::Region::Right => (-(self.rng.gen_range(1..=4)), -1),
                };
                let step_raw = self.rng.gen_range(1..=2);
                Some((
                    OpKind::Slice(slice::Slice { axis, region, start_raw, end_raw, step_raw }),
                    vec![InputSpec { rank: rank as i64, dtype }],
                ))
            }
            Family::Pad => {
                if rank == 0 {
                    return None;
                }
                let mode = self.choice(&pad::PadMode::ALL);
                let admitted: Vec<DType> = DType::ALL.into_iter().filter(|d| mode.admits(*d)).collect();
                if admitted.is_empty() {
                    return None;
                }
                let dtype = self.choice(&admitted);
                let pads = pad::Pad::alloc_pad_symbols(rank, mode, &mut self.rng, &mut || self.graph.fresh_sym());
                Some((OpKind::Pad(pad::Pad { mode, pads }), vec![InputSpec { rank: rank as i64, dtype }]))
            }
            Family::Expand => {
                let k = self.rng.gen_range(1..=4usize);
                let target: Vec<Expr> = (0..k).map(|_| arith::lit(self.rng.gen_range(1..=8))).collect();
                Some((OpKind::Expand(expand::Expand { target }), vec![InputSpec { rank: -1, dtype }]))
            }
            Family::Cast => {
                let target = self.choice(&DType::ALL);
                Some((OpKind::Cast(cast::Cast { target }), vec![InputSpec { rank: -1, dtype }]))
            }
            Family::Leaf => None,
        }
    }
}

/// Plain roulette-wheel selection; `weights` must be non-negative and
/// `items`/`weights` the same length (the original's `np.random.choice`
/// with explicit probabilities, without the numpy dependency).
fn weighted_pick<T: Copy>(rng: &mut StdRng, items: &[T], weights: &[f64]) -> T {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return items[rng.gen_range(0..items.len())];
    }
    let mut x = rng.gen_range(0.0..total);
    for (item, w) in items.iter().zip(weights) {
        if x < *w {
            return *item;
        }
        x -= w;
    }
    *items.last().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_pick_favors_heavier_weight() {
        let mut rng = StdRng::seed_from_u64(1);
        let items = [Family::Unary, Family::Binary];
        let mut unary_count = 0;
        for _ in 0..200 {
            if matches!(weighted_pick(&mut rng, &items, &[100.0, 1.0]), Family::Unary) {
                unary_count += 1;
            }
        }
        assert!(unary_count > 150);
    }

    #[test]
    fn driver_grows_a_small_graph_and_finalizes() {
        let mut config = GenConfig::default();
        config.seed = 23132;
        config.max_nodes = 4;
        config.max_gen_ms = 2000;
        config.init_rank = 2;
        let mut driver = Driver::new(config);
        driver.run().expect("growth loop should finalize a small graph");
        assert!(driver.graph().non_placeholder_node_count() >= 1);
    }

    #[test]
    fn skip_ops_excludes_every_pick() {
        let mut config = GenConfig::default();
        config.skip_ops = Family::ALL.iter().map(|f| f.name().to_string()).filter(|n| !n.is_empty()).collect();
        let driver = Driver::new(config);
        for family in Family::ALL {
            assert!(driver.is_skipped(family));
        }
    }
}
