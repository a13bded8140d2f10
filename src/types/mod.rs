//! Shape and dtype model (spec.md §4.2).

pub mod shape;

pub use shape::TensorShape;

use serde::{Deserialize, Serialize};

/// The fixed dtype universe the generator reasons about. Deliberately not
/// open to extension: every operator's dtype rule is written against this
/// exact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    I32,
    I64,
    F32,
    F64,
}

impl DType {
    pub const ALL: [DType; 5] = [DType::Bool, DType::I32, DType::I64, DType::F32, DType::F64];
    pub const NONBOOL: [DType; 4] = [DType::I32, DType::I64, DType::F32, DType::F64];
    pub const FLOATS: [DType; 2] = [DType::F32, DType::F64];
    pub const INTS: [DType; 2] = [DType::I32, DType::I64];

    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    pub fn is_int(self) -> bool {
        matches!(self, DType::I32 | DType::I64)
    }

    pub fn is_bool(self) -> bool {
        matches!(self, DType::Bool)
    }

    /// Byte width used only to size constant buffers in the concretizer; has
    /// no bearing on symbolic bitvector width (see `arith::BvWidth`).
    pub fn byte_width(self) -> usize {
        match self {
            DType::Bool => 1,
            DType::I32 | DType::F32 => 4,
            DType::I64 | DType::F64 => 8,
        }
    }
}
