//! Static dtype-admissibility rules (SPEC_FULL.md §4.3's `[AMBIENT]` entry).
//!
//! The original generator discovers which dtype combinations an
//! under-specified operator accepts by running the real backend on dummy
//! tensors (`auto_infer_in_dtypes` in `nnsmith/abstract/op.py`). Executing
//! concrete tensor math is out of scope here (spec.md's Non-goals), so the
//! same admissibility facts are encoded directly as a table, evaluated once
//! when a `Generator` is constructed.

use crate::ops::binary::{BinaryKind, DtypeRule};
use crate::ops::unary::UnaryKind;
use crate::types::DType;

/// Operators the original exempts from auto-inference because their dtype
/// behavior is already fully pinned down elsewhere (`_WHITE_LIST` in
/// `nnsmith/abstract/op.py`): `Input`, `Expand`, `NCHWConv2d`, `Reshape`.
pub const DTYPE_WHITELISTED_OPS: &[&str] = &["Input", "Expand", "NCHWConv2d", "Reshape"];

pub fn unary_admitted_dtypes(kind: UnaryKind) -> Vec<DType> {
    DType::ALL.into_iter().filter(|d| kind.admits(*d)).collect()
}

pub fn binary_admitted_dtypes(kind: BinaryKind) -> Vec<DType> {
    match kind.dtype_rule() {
        DtypeRule::Numeric => DType::NONBOOL.to_vec(),
        DtypeRule::Comparison => DType::ALL.to_vec(),
        DtypeRule::Logical => vec![DType::Bool],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_ops_admit_only_bool() {
        assert_eq!(binary_admitted_dtypes(BinaryKind::And), vec![DType::Bool]);
    }

    #[test]
    fn relu_excludes_bool_and_ints() {
        let admitted = unary_admitted_dtypes(UnaryKind::Relu);
        assert!(!admitted.contains(&DType::Bool));
        assert!(!admitted.contains(&DType::I32));
        assert!(admitted.contains(&DType::F32));
    }
}
