//! Collaborator boundaries (spec.md §6, §1 "Out of scope"). These traits
//! describe the shape of the external systems the generator hands a
//! concretized graph to; they carry no implementation — materialization,
//! backend execution, and input sampling are all outside the core, the
//! same way `crate::backend::Backend` is a boundary `gran-prix` defines but
//! does not implement for every target in this crate.

use anyhow::Result;

use crate::concretize::ConcreteGraph;
use crate::graph::NodeId;
use crate::types::DType;

/// Accepts the concretized graph and the finalization's Input/Constant
/// assignment; returns an opaque executable/exported model. The generator's
/// only guarantee to this collaborator: an acyclic, topologically-ordered
/// graph where every edge's shape is a sequence of positive integers, every
/// dtype is in the declared enumeration, and every operator variant is one
/// of the closed set in spec.md §4.3 (spec.md §6).
pub trait Materializer {
    type Model;

    fn materialize(&self, graph: &ConcreteGraph) -> Result<Self::Model>;
}

/// A concrete tensor value assigned to one `Input` leaf. The generator
/// itself never samples values (spec.md §1's Non-goals) — constructing one
/// of these is entirely the input oracle's job.
#[derive(Debug, Clone)]
pub struct InputAssignment {
    pub node: NodeId,
    pub dtype: DType,
    pub dims: Vec<i64>,
    pub bytes: Vec<u8>,
}

/// Given a concretized graph and its Input shapes/dtypes, produces random
/// input tensors (and, in the original system, computes expected outputs
/// for differential testing). Outside the core (spec.md §6).
pub trait InputOracle {
    fn sample(&self, graph: &ConcreteGraph) -> Result<Vec<InputAssignment>>;
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub outputs: Vec<Vec<u8>>,
}

/// Takes a materialized model and an input assignment; returns outputs or a
/// failure. Outside the core (spec.md §6).
pub trait BackendRunner<M> {
    fn run(&self, model: &M, inputs: &[InputAssignment]) -> Result<RunOutcome>;
}
