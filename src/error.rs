use thiserror::Error;

/// Fatal, internal invariant violation: the generator's own bookkeeping is
/// wrong. These should never fire on well-formed input; when one does, the
/// caller should treat it as a bug, not a signal to retry.
#[derive(Error, Debug)]
pub enum SanityError {
    #[error("node {node:?} has in-degree {found}, expected {expected} for op {op}")]
    InDegreeMismatch { node: crate::graph::NodeId, expected: usize, found: usize, op: String },
    #[error("output port {port} of node {0:?} has no consuming edge coverage recorded")]
    UncoveredPort(crate::graph::NodeId, usize),
    #[error("cycle detected through node {0:?}")]
    Cycle(crate::graph::NodeId),
    #[error("placeholder set did not converge: {0} placeholders remain after finalization")]
    PlaceholdersRemaining(usize),
    #[error("alive-shape arena returned a dangling id {0}")]
    DanglingAliveShape(usize),
    #[error("committed assertion set was mutated by a killed solver check")]
    CommittedSetMutated,
}

/// Local to a single insertion attempt. Always safe to discard and retry a
/// different operator/shape/axis choice.
#[derive(Error, Debug)]
pub enum ConstraintError {
    #[error("no alive shape satisfies the arity/rank requirement for this operator")]
    NoCandidateShape,
    #[error("solver returned unsat for the attempted constraint set")]
    Unsat,
    #[error("solver timed out before reaching a verdict")]
    Unknown,
    #[error("dtype combination {0:?} is not admitted by any operator variant")]
    NoDtypeMatch(Vec<crate::types::DType>),
    #[error("symbolic dimension would exceed the configured bitvector width")]
    WidthOverflow,
}

#[derive(Error, Debug)]
pub enum GenError {
    #[error("sanity check failed: {0}")]
    Sanity(#[from] SanityError),
    #[error("constraint attempt failed: {0}")]
    Constraint(#[from] ConstraintError),
    #[error("solver worker error: {0}")]
    Solver(String),
}

pub type GenResult<T> = Result<T, GenError>;
