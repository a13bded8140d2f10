use std::collections::HashSet;

use anyhow::{anyhow, Result};

use crate::graph::{NodeId, SymbolicGraph};
use crate::ops::ShapeOp;

/// Structural invariants from spec.md §8's "graph integrity" property:
/// in-degree matches declared arity, every alive shape is produced by
/// exactly the node/port recorded against it, and the node order never
/// forms a cycle.
pub struct Verifier;

impl Verifier {
    pub fn verify(graph: &SymbolicGraph) -> Result<()> {
        tracing::debug!(nodes = graph.nodes().len(), "verifying symbolic graph");

        for (i, node) in graph.nodes().iter().enumerate() {
            if node.superseded {
                continue;
            }
            let id = NodeId(i);
            if node.inputs.len() != node.op.arity() {
                return Err(anyhow!(
                    "node {:?} ({}) has in-degree {}, expected {}",
                    id,
                    node.op.name(),
                    node.inputs.len(),
                    node.op.arity()
                ));
            }
            if node.outputs.len() != node.op.out_arity() {
                return Err(anyhow!(
                    "node {:?} ({}) has {} output ports, expected {}",
                    id,
                    node.op.name(),
                    node.outputs.len(),
                    node.op.out_arity()
                ));
            }
            for (port, &aid) in node.outputs.iter().enumerate() {
                let alive = graph.alive_shape(aid);
                if alive.producer != id || alive.out_port != port {
                    return Err(anyhow!(
                        "alive shape {:?} claims producer {:?}:{} but node {:?} lists it at port {}",
                        aid,
                        alive.producer,
                        alive.out_port,
                        id,
                        port
                    ));
                }
            }
        }

        Self::check_acyclic(graph)?;
        tracing::debug!("graph verified: no cycles, in-degrees and ports consistent");
        Ok(())
    }

    fn check_acyclic(graph: &SymbolicGraph) -> Result<()> {
        let n = graph.nodes().len();
        let mut visiting = vec![false; n];
        let mut done = vec![false; n];

        for start in 0..n {
            if !done[start] {
                Self::visit(graph, start, &mut visiting, &mut done)?;
            }
        }
        Ok(())
    }

    fn visit(graph: &SymbolicGraph, i: usize, visiting: &mut [bool], done: &mut [bool]) -> Result<()> {
        if done[i] {
            return Ok(());
        }
        if visiting[i] {
            return Err(anyhow!("cycle detected through node {:?}", NodeId(i)));
        }
        visiting[i] = true;
        let mut seen_deps = HashSet::new();
        for &input_id in &graph.nodes()[i].inputs {
            let producer = graph.alive_shape(input_id).producer;
            if seen_deps.insert(producer.0) {
                Self::visit(graph, producer.0, visiting, done)?;
            }
        }
        visiting[i] = false;
        done[i] = true;
        Ok(())
    }
}
