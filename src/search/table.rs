//! Adaptive operator-pair weighting (spec.md §4.5, `merge_op_weighting:
//! latest`). Grounded in `GenerationTable` from
//! `nnsmith/graph_gen.py`: a confidence matrix indexed by (predecessor
//! family, candidate family), multiplicatively nudged after every insertion
//! attempt and clamped to a fixed range.
//!
//! The original table is driven by coverage feedback from a real compiler
//! backend, which is out of scope here (spec.md's Non-goals exclude
//! executing backends). This table instead reacts to the only feedback the
//! generator itself produces: whether an attempted insertion solved
//! (`Sat`), was rejected outright (`Unsat`), or timed out (`Unknown`) — the
//! same three update hooks (`on_new_cov`/`on_no_cov`/`on_unsolvable`) applied
//! to that weaker signal (see DESIGN.md's Open Question on this scheme).

use super::Family;

const MAX_CONF: f64 = 4.0;
const BASE_VAL: f64 = 1.0;
const MIN_CONF: f64 = 0.1;
const INIT_VAL: f64 = 2.0;

pub struct GenerationTable {
    // Row-major over `Family::ALL.len() x Family::ALL.len()`.
    conf: Vec<f64>,
    n: usize,
}

impl GenerationTable {
    pub fn new() -> Self {
        // +1 accommodates `Family::Leaf`, used only as a row (the "no
        // predecessor op" sentinel), never as a column.
        let n = Family::ALL.len() + 1;
        Self { conf: vec![INIT_VAL; n * n], n }
    }

    fn idx(&self, src: Family, tar: Family) -> usize {
        src.index() * self.n + tar.index()
    }

    pub fn lookup(&self, src: Family, tar: Family) -> f64 {
        self.conf[self.idx(src, tar)]
    }

    /// A successful (`Sat`) insertion: reward the pair, mirroring
    /// `on_new_cov`'s multiplicative increase.
    pub fn on_success(&mut self, src: Family, tar: Family) {
        let i = self.idx(src, tar);
        self.conf[i] = (self.conf[i] * 1.5).min(MAX_CONF);
    }

    /// An outright-rejected (`Unsat`) insertion: relax back towards the
    /// baseline, mirroring `on_no_cov`.
    pub fn on_rejected(&mut self, src: Family, tar: Family) {
        let i = self.idx(src, tar);
        self.conf[i] = ((self.conf[i] + BASE_VAL) / 2.0).max(MIN_CONF);
    }

    /// A solver timeout (`Unknown`): penalize harder than a plain
    /// rejection, mirroring `on_unsolvable`.
    pub fn on_unsolvable(&mut self, src: Family, tar: Family) {
        let i = self.idx(src, tar);
        self.conf[i] = (self.conf[i] * 0.5).max(MIN_CONF);
    }

    /// Weight assigned to each candidate family given the family that
    /// produced the anchor input (or `Family::Leaf` when there is no
    /// anchor, e.g. the first attempt against the root placeholder).
    pub fn weights_for(&self, src: Family, candidates: &[Family]) -> Vec<f64> {
        candidates.iter().map(|&tar| self.lookup(src, tar)).collect()
    }
}

impl Default for GenerationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_is_uniform() {
        let t = GenerationTable::new();
        assert_eq!(t.lookup(Family::Unary, Family::Binary), INIT_VAL);
    }

    #[test]
    fn success_raises_then_rejection_lowers() {
        let mut t = GenerationTable::new();
        t.on_success(Family::Unary, Family::Binary);
        let raised = t.lookup(Family::Unary, Family::Binary);
        assert!(raised > INIT_VAL);
        t.on_rejected(Family::Unary, Family::Binary);
        assert!(t.lookup(Family::Unary, Family::Binary) < raised);
    }

    #[test]
    fn confidence_stays_within_bounds() {
        let mut t = GenerationTable::new();
        for _ in 0..50 {
            t.on_success(Family::Reduce, Family::Pad);
        }
        assert!(t.lookup(Family::Reduce, Family::Pad) <= MAX_CONF);
        for _ in 0..50 {
            t.on_unsolvable(Family::Reduce, Family::Pad);
        }
        assert!(t.lookup(Family::Reduce, Family::Pad) >= MIN_CONF);
    }
}
