use rand::seq::SliceRandom;
use rand::Rng;

use crate::arith::{self, nnsmith_add, nnsmith_ge, nnsmith_lt, nnsmith_sub, var, BoolExpr, Expr, SymId};
use crate::types::{DType, TensorShape};

use super::ShapeOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    Constant,
    Reflect,
    Replicate,
    Circular,
}

impl PadMode {
    pub const ALL: [PadMode; 4] = [PadMode::Constant, PadMode::Reflect, PadMode::Replicate, PadMode::Circular];

    /// Dtypes each mode refuses. `Constant` pads with an arbitrary scalar so
    /// it accepts everything; the others pad by copying existing elements,
    /// which is meaningless for `Bool` (SPEC_FULL.md §4.3).
    pub fn dtype_blacklist(&self) -> &'static [DType] {
        match self {
            PadMode::Constant => &[],
            PadMode::Reflect | PadMode::Replicate | PadMode::Circular => &[DType::Bool],
        }
    }

    pub fn admits(&self, dt: DType) -> bool {
        !self.dtype_blacklist().contains(&dt)
    }
}

/// One pad side's amount: either a fresh symbol the solver picks, or fixed
/// to zero. `alloc_pad_symbols` randomly zeroes some pad sides (spec.md
/// §4.3's "randomly zero some pad pairs") instead of always allocating a
/// symbol.
#[derive(Debug, Clone, Copy)]
pub enum PadSide {
    Sym(SymId),
    Zero,
}

impl PadSide {
    fn expr(&self) -> Expr {
        match self {
            PadSide::Sym(id) => var(*id),
            PadSide::Zero => arith::lit(0),
        }
    }
}

/// Pads a randomly chosen `k <= rank` axes on both sides, with the pad
/// amounts allocated as fresh symbols *after* the input's rank is known —
/// `alloc_pad_symbols` is the `post_symbolize` hook from
/// `nnsmith/abstract/op.py`'s `Pad` (SPEC_FULL.md §4.3): the generator
/// cannot allocate padding symbols until it has committed to an input shape
/// of a concrete rank. Axes outside the chosen `k` are left unpadded
/// (`None`).
#[derive(Debug, Clone)]
pub struct Pad {
    pub mode: PadMode,
    /// One entry per input axis; `None` means that axis is not padded.
    pub pads: Vec<Option<(PadSide, PadSide)>>,
}

impl Pad {
    /// Chooses `k` per spec.md §4.3 (`k <= rank`, restricted to `{rank-1,
    /// rank-2}` for non-constant modes), picks which `k` axes are padded,
    /// and allocates each chosen axis's pad-side symbols, randomly zeroing
    /// some of them.
    pub fn alloc_pad_symbols(rank: usize, mode: PadMode, rng: &mut impl Rng, fresh: &mut impl FnMut() -> SymId) -> Vec<Option<(PadSide, PadSide)>> {
        let k = Self::pick_k(rank, mode, rng);
        let mut axes: Vec<usize> = (0..rank).collect();
        axes.shuffle(rng);
        let chosen: std::collections::HashSet<usize> = axes.into_iter().take(k).collect();

        (0..rank)
            .map(|axis| {
                if !chosen.contains(&axis) {
                    return None;
                }
                let l = if rng.gen_bool(0.2) { PadSide::Zero } else { PadSide::Sym(fresh()) };
                let r = if rng.gen_bool(0.2) { PadSide::Zero } else { PadSide::Sym(fresh()) };
                Some((l, r))
            })
            .collect()
    }

    fn pick_k(rank: usize, mode: PadMode, rng: &mut impl Rng) -> usize {
        if rank == 0 {
            return 0;
        }
        match mode {
            PadMode::Constant => rng.gen_range(1..=rank),
            PadMode::Reflect | PadMode::Replicate | PadMode::Circular => {
                let candidates: Vec<usize> = [rank.saturating_sub(1), rank.saturating_sub(2)].into_iter().filter(|&k| k >= 1).collect();
                match candidates.as_slice() {
                    [] => rank.min(1),
                    [single] => *single,
                    [a, b] if a == b => *a,
                    _ => *candidates.choose(rng).unwrap(),
                }
            }
        }
    }
}

impl ShapeOp for Pad {
    fn arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        let dims = inputs[0]
            .dims
            .iter()
            .zip(&self.pads)
            .map(|(d, pad)| match pad {
                Some((l, r)) => nnsmith_add(&nnsmith_add(d, &l.expr()), &r.expr()),
                None => d.clone(),
            })
            .collect();
        vec![TensorShape::new(dims, inputs[0].dtype)]
    }

    /// `pad[2i] + dim >= 0`, `pad[2i+1] + dim >= 0`, `|pad[·]| < dim`
    /// (spec.md §4.3) — pads may be negative (cropping), bounded below by
    /// `-dim` and above (strictly) by `dim`.
    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        let mut cs = Vec::new();
        for (dim, pad) in inputs[0].dims.iter().zip(&self.pads) {
            let Some((l, r)) = pad else { continue };
            for side in [l, r] {
                let p = side.expr();
                let neg_dim = nnsmith_sub(&arith::lit(0), dim);
                cs.push(nnsmith_ge(&nnsmith_add(dim, &p), &arith::lit(0)));
                cs.push(nnsmith_lt(&p, dim));
                cs.push(nnsmith_lt(&neg_dim, &p));
            }
        }
        cs
    }

    fn name(&self) -> &'static str {
        "Pad"
    }
}
