//! Bridge from the mode-agnostic `Expr`/`BoolExpr` trees to z3, plus the
//! deadline-guarded `check_sat` described in spec.md §5.
//!
//! Every satisfiability check goes through [`SmtContext::check_sat_with_deadline`],
//! never through a solver shared with the caller's thread: z3's `Context`/
//! `Solver` are not `Send`, so the worker thread builds its own from the
//! plain (`Send`) assertion data handed to it, re-declaring symbols and
//! re-asserting the committed set at spawn time (SPEC_FULL.md §5). If the
//! deadline fires first, the worker is abandoned — never joined — and the
//! verdict is `Unknown`; the caller's own committed set was never touched.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use z3::ast::{Ast, Bool, Int, BV};
use z3::{Config, Context, SatResult, Solver};

use super::{BoolExpr, Expr, SymId, MAX_BV_WIDTH};

/// Either unbounded-integer or fixed-width-bitvector encoding. Chosen once
/// per run from `GenConfig::use_bitvec`/`bv_size` and never mixed.
#[derive(Debug, Clone, Copy)]
pub enum NumMode {
    Int,
    BitVec { size: u32 },
}

/// Accumulates the constraint set committed so far (spec.md §4.4's
/// "constraint store"). Cheap to clone since it holds only the `Expr` trees,
/// not any z3 state.
#[derive(Debug, Clone)]
pub struct SmtContext {
    mode: NumMode,
    committed: Vec<BoolExpr>,
}

impl SmtContext {
    pub fn new(mode: NumMode) -> Self {
        Self { mode, committed: Vec::new() }
    }

    pub fn mode(&self) -> NumMode {
        self.mode
    }

    pub fn commit(&mut self, constraint: BoolExpr) {
        self.committed.push(constraint);
    }

    pub fn committed(&self) -> &[BoolExpr] {
        &self.committed
    }

    /// Check whether `committed` conjoined with `candidate` is satisfiable,
    /// bounded by `deadline`. Does not mutate `self`; the caller commits the
    /// candidate constraints only after seeing `SatResult::Sat`.
    pub fn check_sat_with_deadline(&self, candidate: &[BoolExpr], deadline: Duration) -> SatResult {
        let mode = self.mode();
        let mut all = self.committed.clone();
        all.extend_from_slice(candidate);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let cfg = Config::new();
            let ctx = Context::new(&cfg);
            let solver = Solver::new(&ctx);
            let translator = Translator::new(&ctx, mode);
            for c in &all {
                solver.assert(&translator.lower_bool(c));
            }
            let _ = tx.send(solver.check());
        });

        match rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(_) => SatResult::Unknown,
        }
    }

    /// Re-solves the committed assertion set and reads back the integer
    /// value of each requested symbol (spec.md §4.6: "reads the final
    /// solver model, substitutes integer values into every shape
    /// expression"). Bounded by `deadline` the same way as an ordinary
    /// attempt check — the final verification check is still a `check_sat`
    /// call, just against an empty candidate set (spec.md §4.5's
    /// "post_process... verifies one final sat check").
    pub fn solve_model(&self, symbols: &[SymId], deadline: Duration) -> Option<HashMap<SymId, i64>> {
        let mode = self.mode();
        let committed = self.committed.clone();
        let symbols = symbols.to_vec();

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let cfg = Config::new();
            let ctx = Context::new(&cfg);
            let solver = Solver::new(&ctx);
            let translator = Translator::new(&ctx, mode);
            for c in &committed {
                solver.assert(&translator.lower_bool(c));
            }
            let result = if solver.check() == SatResult::Sat {
                let model = solver.get_model();
                model.map(|model| {
                    symbols
                        .iter()
                        .filter_map(|&id| {
                            let value = match mode {
                                NumMode::Int => {
                                    let c = Int::new_const(&ctx, format!("s{id}"));
                                    model.eval(&c, true).and_then(|v| v.as_i64())
                                }
                                NumMode::BitVec { size } => {
                                    let c = BV::new_const(&ctx, format!("s{id}"), size);
                                    model.eval(&c, true).and_then(|v| v.as_i64())
                                }
                            };
                            value.map(|v| (id, v))
                        })
                        .collect::<HashMap<_, _>>()
                })
            } else {
                None
            };
            let _ = tx.send(result);
        });

        rx.recv_timeout(deadline).ok().flatten()
    }
}

/// Per-check translation context; lives only for the duration of one
/// `check_sat_with_deadline` call on its own worker thread.
struct Translator<'a> {
    ctx: &'a Context,
    mode: NumMode,
}

impl<'a> Translator<'a> {
    fn new(ctx: &'a Context, mode: NumMode) -> Self {
        Self { ctx, mode }
    }

    fn int_const(&self, id: SymId) -> IntOrBv<'a> {
        match self.mode {
            NumMode::Int => IntOrBv::Int(Int::new_const(self.ctx, format!("s{id}"))),
            NumMode::BitVec { size } => IntOrBv::Bv(BV::new_const(self.ctx, format!("s{id}"), size)),
        }
    }

    fn bool_const(&self, id: SymId) -> Bool<'a> {
        Bool::new_const(self.ctx, format!("b{id}"))
    }

    /// Translate an `Expr`. In bitvector mode, operands are width-aligned
    /// per spec.md §4.1: zero-extended to the wider operand's width, with
    /// an extra bit reserved for addition's carry and the width doubled for
    /// multiplication, capped at `MAX_BV_WIDTH`.
    fn lower_expr(&self, e: &Expr) -> IntOrBv<'a> {
        match e {
            Expr::Var(id) => self.int_const(*id),
            Expr::IntLit(v) => match self.mode {
                NumMode::Int => IntOrBv::Int(Int::from_i64(self.ctx, *v)),
                NumMode::BitVec { size } => IntOrBv::Bv(BV::from_i64(self.ctx, *v, size)),
            },
            Expr::Add(a, b) => {
                let (a, b) = self.align(a, b, Widen::Carry);
                Self::combine(a, b, |x, y| x + y, |x, y| x.bvadd(y))
            }
            Expr::Sub(a, b) => {
                let (a, b) = self.align(a, b, Widen::Same);
                Self::combine(a, b, |x, y| x - y, |x, y| x.bvsub(y))
            }
            Expr::Mul(a, b) => {
                let (a, b) = self.align(a, b, Widen::Product);
                Self::combine(a, b, |x, y| x * y, |x, y| x.bvmul(y))
            }
            Expr::Div(a, b, _mode) => {
                let (a, b) = self.align(a, b, Widen::Same);
                Self::combine(a, b, |x, y| x.div(y), |x, y| x.bvudiv(y))
            }
            Expr::Mod(a, b) => {
                let (a, b) = self.align(a, b, Widen::Same);
                Self::combine(a, b, |x, y| x.rem(y), |x, y| x.bvurem(y))
            }
            Expr::If(c, t, e) => {
                let cond = self.lower_bool(c);
                let (t, e) = self.align(t, e, Widen::Same);
                match (t, e) {
                    (IntOrBv::Int(t), IntOrBv::Int(e)) => IntOrBv::Int(cond.ite(&t, &e)),
                    (IntOrBv::Bv(t), IntOrBv::Bv(e)) => IntOrBv::Bv(cond.ite(&t, &e)),
                    _ => unreachable!("align() guarantees matching variants"),
                }
            }
        }
    }

    fn align(&self, a: &Expr, b: &Expr, widen: Widen) -> (IntOrBv<'a>, IntOrBv<'a>) {
        let la = self.lower_expr(a);
        let lb = self.lower_expr(b);
        match self.mode {
            NumMode::Int => (la, lb),
            NumMode::BitVec { .. } => {
                let (wa, wb) = (la.width(), lb.width());
                let target = match widen {
                    Widen::Same => wa.max(wb),
                    Widen::Carry => wa.max(wb).saturating_add(1),
                    Widen::Product => wa.saturating_add(wb),
                }
                .min(MAX_BV_WIDTH);
                (la.zext_to(self.ctx, target), lb.zext_to(self.ctx, target))
            }
        }
    }

    fn combine(
        a: IntOrBv<'a>,
        b: IntOrBv<'a>,
        int_op: impl Fn(&Int<'a>, &Int<'a>) -> Int<'a>,
        bv_op: impl Fn(&BV<'a>, &BV<'a>) -> BV<'a>,
    ) -> IntOrBv<'a> {
        match (a, b) {
            (IntOrBv::Int(a), IntOrBv::Int(b)) => IntOrBv::Int(int_op(&a, &b)),
            (IntOrBv::Bv(a), IntOrBv::Bv(b)) => IntOrBv::Bv(bv_op(&a, &b)),
            _ => unreachable!("align() guarantees matching variants"),
        }
    }

    fn lower_bool(&self, b: &BoolExpr) -> Bool<'a> {
        match b {
            BoolExpr::Var(id) => self.bool_const(*id),
            BoolExpr::BoolLit(v) => Bool::from_bool(self.ctx, *v),
            BoolExpr::Eq(a, b) => self.cmp(a, b, |x, y| x._eq(y), |x, y| x._eq(y)),
            BoolExpr::Ne(a, b) => self.cmp(a, b, |x, y| x._eq(y).not(), |x, y| x._eq(y).not()),
            // Symbolic dims are non-negative by construction, so bitvector
            // comparisons use the unsigned (`bvu*`) family (spec.md §4.1).
            BoolExpr::Lt(a, b) => self.cmp(a, b, |x, y| x.lt(y), |x, y| x.bvult(y)),
            BoolExpr::Le(a, b) => self.cmp(a, b, |x, y| x.le(y), |x, y| x.bvule(y)),
            BoolExpr::Gt(a, b) => self.cmp(a, b, |x, y| x.gt(y), |x, y| x.bvugt(y)),
            BoolExpr::Ge(a, b) => self.cmp(a, b, |x, y| x.ge(y), |x, y| x.bvuge(y)),
            BoolExpr::And(xs) => {
                let lowered: Vec<Bool> = xs.iter().map(|x| self.lower_bool(x)).collect();
                let refs: Vec<&Bool> = lowered.iter().collect();
                Bool::and(self.ctx, &refs)
            }
            BoolExpr::Or(xs) => {
                let lowered: Vec<Bool> = xs.iter().map(|x| self.lower_bool(x)).collect();
                let refs: Vec<&Bool> = lowered.iter().collect();
                Bool::or(self.ctx, &refs)
            }
            BoolExpr::Not(x) => self.lower_bool(x).not(),
        }
    }

    fn cmp(
        &self,
        a: &Expr,
        b: &Expr,
        int_op: impl Fn(&Int<'a>, &Int<'a>) -> Bool<'a>,
        bv_op: impl Fn(&BV<'a>, &BV<'a>) -> Bool<'a>,
    ) -> Bool<'a> {
        let (a, b) = self.align(a, b, Widen::Same);
        match (a, b) {
            (IntOrBv::Int(a), IntOrBv::Int(b)) => int_op(&a, &b),
            (IntOrBv::Bv(a), IntOrBv::Bv(b)) => bv_op(&a, &b),
            _ => unreachable!("align() guarantees matching variants"),
        }
    }
}

/// Bitvector width rule for a binary operand pair (spec.md §4.1): addition
/// reserves a carry bit, multiplication doubles into the sum of both
/// operand widths, everything else (subtraction, division, remainder,
/// comparisons, `If` branches) just aligns to the wider operand.
#[derive(Debug, Clone, Copy)]
enum Widen {
    Same,
    Carry,
    Product,
}

enum IntOrBv<'a> {
    Int(Int<'a>),
    Bv(BV<'a>),
}

impl<'a> IntOrBv<'a> {
    fn width(&self) -> u32 {
        match self {
            IntOrBv::Int(_) => 0,
            IntOrBv::Bv(bv) => bv.get_size(),
        }
    }

    fn zext_to(self, _ctx: &'a Context, target: u32) -> IntOrBv<'a> {
        match self {
            IntOrBv::Int(i) => IntOrBv::Int(i),
            IntOrBv::Bv(bv) => {
                let w = bv.get_size();
                if w >= target {
                    IntOrBv::Bv(bv)
                } else {
                    IntOrBv::Bv(bv.zero_ext(target - w))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::{nnsmith_eq, nnsmith_ge, var, lit};

    #[test]
    fn sat_on_trivial_constraint() {
        let mut ctx = SmtContext::new(NumMode::Int);
        ctx.commit(nnsmith_ge(&var(0), &lit(0)));
        let r = ctx.check_sat_with_deadline(&[nnsmith_eq(&var(0), &lit(5))], Duration::from_millis(500));
        assert!(matches!(r, SatResult::Sat));
    }

    #[test]
    fn unsat_on_contradiction() {
        let mut ctx = SmtContext::new(NumMode::Int);
        ctx.commit(nnsmith_eq(&var(0), &lit(1)));
        let r = ctx.check_sat_with_deadline(&[nnsmith_eq(&var(0), &lit(2))], Duration::from_millis(500));
        assert!(matches!(r, SatResult::Unsat));
    }

    /// A width-6 bitvector's top bit set (value 32..63) must still compare
    /// greater than a small literal under `Ge`/`Gt` — if comparisons were
    /// signed instead of unsigned, 32..63 would read as negative and this
    /// would be unsat.
    #[test]
    fn bitvec_comparisons_are_unsigned() {
        let mut ctx = SmtContext::new(NumMode::BitVec { size: 6 });
        ctx.commit(nnsmith_eq(&var(0), &lit(40)));
        let r = ctx.check_sat_with_deadline(&[nnsmith_ge(&var(0), &lit(10))], Duration::from_millis(500));
        assert!(matches!(r, SatResult::Sat));
    }

    /// Two width-6 operands (max value 63) summing to 80 overflows a width-6
    /// result; `align`'s carry bit must widen to 7 so the sum isn't taken
    /// mod 64.
    #[test]
    fn bitvec_addition_widens_for_carry() {
        let mut ctx = SmtContext::new(NumMode::BitVec { size: 6 });
        ctx.commit(nnsmith_eq(&var(0), &lit(40)));
        ctx.commit(nnsmith_eq(&var(1), &lit(40)));
        let sum = crate::arith::nnsmith_add(&var(0), &var(1));
        let r = ctx.check_sat_with_deadline(&[nnsmith_eq(&sum, &lit(80))], Duration::from_millis(500));
        assert!(matches!(r, SatResult::Sat));
    }

    /// Two width-6 operands (max value 63) multiplying to 3969 needs 12
    /// bits; `align`'s product rule must widen to `wa + wb`, not just `+1`.
    #[test]
    fn bitvec_multiplication_widens_to_sum_of_widths() {
        let mut ctx = SmtContext::new(NumMode::BitVec { size: 6 });
        ctx.commit(nnsmith_eq(&var(0), &lit(63)));
        ctx.commit(nnsmith_eq(&var(1), &lit(63)));
        let product = crate::arith::nnsmith_mul(&var(0), &var(1));
        let r = ctx.check_sat_with_deadline(&[nnsmith_eq(&product, &lit(3969))], Duration::from_millis(500));
        assert!(matches!(r, SatResult::Sat));
    }
}
