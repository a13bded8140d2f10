//! Tuning surface (spec.md §6), carried as an explicit value rather than
//! global mutable state (SPEC_FULL.md §9): a caller builds or deserializes
//! one `GenConfig` per run and hands it to `Generator::new`.

use serde::{Deserialize, Serialize};

use crate::arith::smt::NumMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatBudgetMode {
    /// Track a running sum of every produced tensor's `nelement` and stop
    /// once the budget is exceeded.
    RunningSum,
    /// Treat the budget as a per-operator upper bound instead of a total.
    PerOpUpperBound,
}

/// Resolves spec.md §9's Open Question on `merge_op_weighting` (see
/// SPEC_FULL.md §4.5): `v0` weights variants uniformly, `v1` weights
/// operator *families* uniformly (so a family with five rank-specific
/// variants doesn't crowd out a family with one), `latest` is the adaptive
/// `GenerationTable`-driven scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpWeighting {
    V0,
    V1,
    Latest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    pub seed: u64,
    pub max_nodes: usize,
    pub max_gen_ms: u64,
    /// Rank of the single root placeholder the generator seeds before the
    /// growth loop starts (spec.md §8's `init_rank`). Every other shape in
    /// the graph is reached from this one by forward/backward insertion, so
    /// it is the only rank ever chosen outside an operator's own shape
    /// transfer.
    pub init_rank: usize,
    pub min_input_dims: usize,
    pub use_bitvec: bool,
    pub bv_size: u32,
    pub float_budget_mb: f64,
    pub float_budget_mode: FloatBudgetMode,
    pub forward_prob: f64,
    pub skip_ops: Vec<String>,
    pub merge_op_weighting: OpWeighting,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_nodes: 10,
            max_gen_ms: 2000,
            init_rank: 4,
            min_input_dims: 1,
            use_bitvec: false,
            bv_size: 8,
            float_budget_mb: 512.0,
            float_budget_mode: FloatBudgetMode::RunningSum,
            forward_prob: 0.7,
            skip_ops: Vec::new(),
            merge_op_weighting: OpWeighting::Latest,
        }
    }
}

impl GenConfig {
    pub fn num_mode(&self) -> NumMode {
        if self.use_bitvec {
            NumMode::BitVec { size: self.bv_size }
        } else {
            NumMode::Int
        }
    }

    /// Per-attempt solver timeout: a third of the overall generation budget
    /// (spec.md §4.5/§5).
    pub fn attempt_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.max_gen_ms / 3)
    }

    pub fn float_budget_bytes(&self) -> f64 {
        self.float_budget_mb * 1024.0 * 1024.0
    }
}
