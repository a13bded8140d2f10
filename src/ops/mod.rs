//! Operator algebra (spec.md §4.3): a closed taxonomy dispatched through an
//! enum rather than `Box<dyn Operation>` + typetag. The operator set is
//! fixed and finite — every variant is known at compile time — so trait
//! objects buy extensibility this generator never uses, at the cost of a
//! vtable indirection on every shape-transfer call. Each concrete op struct
//! implements [`ShapeOp`]; `OpKind` matches over them (SPEC_FULL.md's
//! Design Notes).

pub mod binary;
pub mod cast;
pub mod concat;
pub mod conv;
pub mod expand;
pub mod infer;
pub mod leaf;
pub mod pad;
pub mod reduce;
pub mod reshape;
pub mod slice;
pub mod ternary;
pub mod transpose;
pub mod unary;

use crate::arith::BoolExpr;
use crate::types::TensorShape;

/// Per-operator shape transfer: given concrete input shapes (dims may
/// still be symbolic `Expr`s), produce the output shapes and the
/// constraints that must hold for this insertion to be valid.
pub trait ShapeOp {
    fn arity(&self) -> usize;

    fn out_arity(&self) -> usize {
        1
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape>;

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr>;

    fn name(&self) -> &'static str;
}

/// The closed operator taxonomy (spec.md §4.3).
#[derive(Debug, Clone)]
pub enum OpKind {
    Unary(unary::UnaryOp),
    Binary(binary::BinaryOp),
    Where(ternary::Where),
    Gemm(ternary::Gemm),
    Conv2d(conv::NchwConv2d),
    Reshape(reshape::Reshape),
    Transpose(transpose::Transpose),
    Reduce(reduce::ReduceOp),
    Concat(concat::Concat),
    Slice(slice::Slice),
    Pad(pad::Pad),
    Expand(expand::Expand),
    Cast(cast::Cast),
    Constant(leaf::Constant),
    Input(leaf::Input),
    Placeholder(leaf::Placeholder),
}

impl ShapeOp for OpKind {
    fn arity(&self) -> usize {
        match self {
            OpKind::Unary(op) => op.arity(),
            OpKind::Binary(op) => op.arity(),
            OpKind::Where(op) => op.arity(),
            OpKind::Gemm(op) => op.arity(),
            OpKind::Conv2d(op) => op.arity(),
            OpKind::Reshape(op) => op.arity(),
            OpKind::Transpose(op) => op.arity(),
            OpKind::Reduce(op) => op.arity(),
            OpKind::Concat(op) => op.arity(),
            OpKind::Slice(op) => op.arity(),
            OpKind::Pad(op) => op.arity(),
            OpKind::Expand(op) => op.arity(),
            OpKind::Cast(op) => op.arity(),
            OpKind::Constant(op) => op.arity(),
            OpKind::Input(op) => op.arity(),
            OpKind::Placeholder(op) => op.arity(),
        }
    }

    fn shape_fn(&self, inputs: &[TensorShape]) -> Vec<TensorShape> {
        match self {
            OpKind::Unary(op) => op.shape_fn(inputs),
            OpKind::Binary(op) => op.shape_fn(inputs),
            OpKind::Where(op) => op.shape_fn(inputs),
            OpKind::Gemm(op) => op.shape_fn(inputs),
            OpKind::Conv2d(op) => op.shape_fn(inputs),
            OpKind::Reshape(op) => op.shape_fn(inputs),
            OpKind::Transpose(op) => op.shape_fn(inputs),
            OpKind::Reduce(op) => op.shape_fn(inputs),
            OpKind::Concat(op) => op.shape_fn(inputs),
            OpKind::Slice(op) => op.shape_fn(inputs),
            OpKind::Pad(op) => op.shape_fn(inputs),
            OpKind::Expand(op) => op.shape_fn(inputs),
            OpKind::Cast(op) => op.shape_fn(inputs),
            OpKind::Constant(op) => op.shape_fn(inputs),
            OpKind::Input(op) => op.shape_fn(inputs),
            OpKind::Placeholder(op) => op.shape_fn(inputs),
        }
    }

    fn requires(&self, inputs: &[TensorShape]) -> Vec<BoolExpr> {
        match self {
            OpKind::Unary(op) => op.requires(inputs),
            OpKind::Binary(op) => op.requires(inputs),
            OpKind::Where(op) => op.requires(inputs),
            OpKind::Gemm(op) => op.requires(inputs),
            OpKind::Conv2d(op) => op.requires(inputs),
            OpKind::Reshape(op) => op.requires(inputs),
            OpKind::Transpose(op) => op.requires(inputs),
            OpKind::Reduce(op) => op.requires(inputs),
            OpKind::Concat(op) => op.requires(inputs),
            OpKind::Slice(op) => op.requires(inputs),
            OpKind::Pad(op) => op.requires(inputs),
            OpKind::Expand(op) => op.requires(inputs),
            OpKind::Cast(op) => op.requires(inputs),
            OpKind::Constant(op) => op.requires(inputs),
            OpKind::Input(op) => op.requires(inputs),
            OpKind::Placeholder(op) => op.requires(inputs),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OpKind::Unary(op) => op.name(),
            OpKind::Binary(op) => op.name(),
            OpKind::Where(op) => op.name(),
            OpKind::Gemm(op) => op.name(),
            OpKind::Conv2d(op) => op.name(),
            OpKind::Reshape(op) => op.name(),
            OpKind::Transpose(op) => op.name(),
            OpKind::Reduce(op) => op.name(),
            OpKind::Concat(op) => op.name(),
            OpKind::Slice(op) => op.name(),
            OpKind::Pad(op) => op.name(),
            OpKind::Expand(op) => op.name(),
            OpKind::Cast(op) => op.name(),
            OpKind::Constant(op) => op.name(),
            OpKind::Input(op) => op.name(),
            OpKind::Placeholder(op) => op.name(),
        }
    }
}

impl OpKind {
    /// `true` for the pseudo-op finalization must remove (spec.md §4.4).
    pub fn is_placeholder(&self) -> bool {
        matches!(self, OpKind::Placeholder(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, OpKind::Constant(_) | OpKind::Input(_) | OpKind::Placeholder(_))
    }
}
