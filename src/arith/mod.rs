//! Symbolic arithmetic expression layer (spec.md §4.1).
//!
//! `Expr`/`BoolExpr` are mode-agnostic: they don't know whether the run uses
//! unbounded integers or fixed-width bitvectors. Bitvector width alignment
//! (zero-extend to a common width, +1 bit for addition carry, double width
//! for multiplication, unsigned semantics for comparison/div/mod) is the
//! SMT bridge's job — see `smt::Translator`.

pub mod smt;

use std::fmt;
use std::rc::Rc;

pub type SymId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Var(SymId),
    IntLit(i64),
    Add(Rc<Expr>, Rc<Expr>),
    Sub(Rc<Expr>, Rc<Expr>),
    Mul(Rc<Expr>, Rc<Expr>),
    /// Integer division. `floor` mirrors nnsmith's distinction between
    /// floor-rounding and implementation-defined rounding for `Div`'s
    /// concretized attribute (see SPEC_FULL.md §9 item 3); shape inference
    /// treats both the same way.
    Div(Rc<Expr>, Rc<Expr>, DivMode),
    Mod(Rc<Expr>, Rc<Expr>),
    If(Rc<BoolExpr>, Rc<Expr>, Rc<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivMode {
    Floor,
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoolExpr {
    Var(SymId),
    BoolLit(bool),
    Eq(Rc<Expr>, Rc<Expr>),
    Ne(Rc<Expr>, Rc<Expr>),
    Lt(Rc<Expr>, Rc<Expr>),
    Le(Rc<Expr>, Rc<Expr>),
    Gt(Rc<Expr>, Rc<Expr>),
    Ge(Rc<Expr>, Rc<Expr>),
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
    Not(Rc<BoolExpr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(id) => write!(f, "s{id}"),
            Expr::IntLit(v) => write!(f, "{v}"),
            Expr::Add(a, b) => write!(f, "({a} + {b})"),
            Expr::Sub(a, b) => write!(f, "({a} - {b})"),
            Expr::Mul(a, b) => write!(f, "({a} * {b})"),
            Expr::Div(a, b, _) => write!(f, "({a} / {b})"),
            Expr::Mod(a, b) => write!(f, "({a} % {b})"),
            Expr::If(c, t, e) => write!(f, "(if {c} then {t} else {e})"),
        }
    }
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExpr::Var(id) => write!(f, "b{id}"),
            BoolExpr::BoolLit(v) => write!(f, "{v}"),
            BoolExpr::Eq(a, b) => write!(f, "({a} == {b})"),
            BoolExpr::Ne(a, b) => write!(f, "({a} != {b})"),
            BoolExpr::Lt(a, b) => write!(f, "({a} < {b})"),
            BoolExpr::Le(a, b) => write!(f, "({a} <= {b})"),
            BoolExpr::Gt(a, b) => write!(f, "({a} > {b})"),
            BoolExpr::Ge(a, b) => write!(f, "({a} >= {b})"),
            BoolExpr::And(xs) => {
                write!(f, "(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " && ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, ")")
            }
            BoolExpr::Or(xs) => {
                write!(f, "(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, ")")
            }
            BoolExpr::Not(x) => write!(f, "!{x}"),
        }
    }
}

pub fn var(id: SymId) -> Expr {
    Expr::Var(id)
}

pub fn lit(v: i64) -> Expr {
    Expr::IntLit(v)
}

pub fn nnsmith_add(a: &Expr, b: &Expr) -> Expr {
    Expr::Add(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_sub(a: &Expr, b: &Expr) -> Expr {
    Expr::Sub(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_mul(a: &Expr, b: &Expr) -> Expr {
    Expr::Mul(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_div(a: &Expr, b: &Expr, mode: DivMode) -> Expr {
    Expr::Div(Rc::new(a.clone()), Rc::new(b.clone()), mode)
}

pub fn nnsmith_mod(a: &Expr, b: &Expr) -> Expr {
    Expr::Mod(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_eq(a: &Expr, b: &Expr) -> BoolExpr {
    BoolExpr::Eq(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_neq(a: &Expr, b: &Expr) -> BoolExpr {
    BoolExpr::Ne(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_lt(a: &Expr, b: &Expr) -> BoolExpr {
    BoolExpr::Lt(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_le(a: &Expr, b: &Expr) -> BoolExpr {
    BoolExpr::Le(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_gt(a: &Expr, b: &Expr) -> BoolExpr {
    BoolExpr::Gt(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn nnsmith_ge(a: &Expr, b: &Expr) -> BoolExpr {
    BoolExpr::Ge(Rc::new(a.clone()), Rc::new(b.clone()))
}

pub fn and(xs: Vec<BoolExpr>) -> BoolExpr {
    BoolExpr::And(xs)
}

pub fn or(xs: Vec<BoolExpr>) -> BoolExpr {
    BoolExpr::Or(xs)
}

pub fn not(x: &BoolExpr) -> BoolExpr {
    BoolExpr::Not(Rc::new(x.clone()))
}

/// Hard cap on symbolic bitvector width; see spec.md §4.1.
pub const MAX_BV_WIDTH: u32 = 64;

/// Evaluates an expression tree directly against a solved model, without
/// going back through z3 (the concretizer's job — spec.md §4.6). Panics if
/// a `Var` is missing from `model`, which would mean the concretizer failed
/// to collect every symbol a shape depends on.
pub fn eval(e: &Expr, model: &std::collections::HashMap<SymId, i64>) -> i64 {
    match e {
        Expr::Var(id) => *model.get(id).unwrap_or_else(|| panic!("symbol s{id} missing from model")),
        Expr::IntLit(v) => *v,
        Expr::Add(a, b) => eval(a, model) + eval(b, model),
        Expr::Sub(a, b) => eval(a, model) - eval(b, model),
        Expr::Mul(a, b) => eval(a, model) * eval(b, model),
        Expr::Div(a, b, _) => eval(a, model).div_euclid(eval(b, model)),
        Expr::Mod(a, b) => eval(a, model).rem_euclid(eval(b, model)),
        Expr::If(c, t, f) => {
            if eval_bool(c, model) {
                eval(t, model)
            } else {
                eval(f, model)
            }
        }
    }
}

pub fn eval_bool(b: &BoolExpr, model: &std::collections::HashMap<SymId, i64>) -> bool {
    match b {
        BoolExpr::Var(id) => *model.get(id).unwrap_or_else(|| panic!("symbol b{id} missing from model")) != 0,
        BoolExpr::BoolLit(v) => *v,
        BoolExpr::Eq(a, b) => eval(a, model) == eval(b, model),
        BoolExpr::Ne(a, b) => eval(a, model) != eval(b, model),
        BoolExpr::Lt(a, b) => eval(a, model) < eval(b, model),
        BoolExpr::Le(a, b) => eval(a, model) <= eval(b, model),
        BoolExpr::Gt(a, b) => eval(a, model) > eval(b, model),
        BoolExpr::Ge(a, b) => eval(a, model) >= eval(b, model),
        BoolExpr::And(xs) => xs.iter().all(|x| eval_bool(x, model)),
        BoolExpr::Or(xs) => xs.iter().any(|x| eval_bool(x, model)),
        BoolExpr::Not(x) => !eval_bool(x, model),
    }
}

/// Collects every `Var` id an expression tree references, so the
/// concretizer knows which symbols it must ask the solver for (SPEC_FULL.md
/// §4.6). Order is insertion order, not numeric — callers that need a
/// stable query list should sort/dedupe.
pub fn symbols_in(e: &Expr, out: &mut Vec<SymId>) {
    match e {
        Expr::Var(id) => out.push(*id),
        Expr::IntLit(_) => {}
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Mod(a, b) => {
            symbols_in(a, out);
            symbols_in(b, out);
        }
        Expr::Div(a, b, _) => {
            symbols_in(a, out);
            symbols_in(b, out);
        }
        Expr::If(c, t, f) => {
            symbols_in_bool(c, out);
            symbols_in(t, out);
            symbols_in(f, out);
        }
    }
}

pub fn symbols_in_bool(b: &BoolExpr, out: &mut Vec<SymId>) {
    match b {
        BoolExpr::Var(id) => out.push(*id),
        BoolExpr::BoolLit(_) => {}
        BoolExpr::Eq(a, b) | BoolExpr::Ne(a, b) | BoolExpr::Lt(a, b) | BoolExpr::Le(a, b) | BoolExpr::Gt(a, b) | BoolExpr::Ge(a, b) => {
            symbols_in(a, out);
            symbols_in(b, out);
        }
        BoolExpr::And(xs) | BoolExpr::Or(xs) => {
            for x in xs {
                symbols_in_bool(x, out);
            }
        }
        BoolExpr::Not(x) => symbols_in_bool(x, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_structure() {
        let e = nnsmith_add(&var(0), &lit(3));
        assert_eq!(format!("{e}"), "(s0 + 3)");
    }

    #[test]
    fn bool_display_nests_cleanly() {
        let b = and(vec![nnsmith_lt(&var(0), &lit(4)), nnsmith_ge(&var(1), &lit(0))]);
        assert_eq!(format!("{b}"), "((s0 < 4) && (s1 >= 0))");
    }

    #[test]
    fn eval_substitutes_every_symbol() {
        let model = std::collections::HashMap::from([(0, 3), (1, 4)]);
        let e = nnsmith_mul(&var(0), &var(1));
        assert_eq!(eval(&e, &model), 12);
    }

    #[test]
    fn symbols_in_collects_both_sides() {
        let e = nnsmith_add(&var(0), &nnsmith_mul(&var(1), &lit(2)));
        let mut out = Vec::new();
        symbols_in(&e, &mut out);
        assert_eq!(out, vec![0, 1]);
    }
}
