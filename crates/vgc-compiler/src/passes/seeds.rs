//! Seed-relay removal.
//!
//! Seed relays exist to break intentional feedback cycles. Once range
//! analysis no longer needs the indirection, each relay is excised: if its
//! source does not depend on the relay itself, consumers are forwarded to
//! the source directly; a cyclic source is replaced by the relay's resolved
//! seed constant, severing the feedback edge. Either way no relay survives
//! to lowering, and severed upstream nodes become eligible for dead-node
//! elimination.

use std::collections::HashSet;

use vgc_ir::{CompilationNode, Handle, NodeKind, PinRef};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;
use crate::Pass;

#[derive(Debug)]
pub struct RemoveAllSeedNodesPass;

impl Pass for RemoveAllSeedNodesPass {
    fn name(&self) -> &str {
        "remove-all-seed-nodes"
    }

    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError> {
        let relays: Vec<Handle<CompilationNode>> = compiler
            .graph
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.kind, NodeKind::SeedRelay { .. }))
            .map(|(h, _)| h)
            .collect();

        for relay in relays {
            let default_seed = match &compiler.graph.nodes[relay].kind {
                NodeKind::SeedRelay { default_seed, .. } => *default_seed,
                _ => continue,
            };

            let source = compiler.graph.nodes[relay].inputs[0];
            let forwarded = match source {
                Some(src) if !depends_on(compiler, src.node, relay) => src,
                _ => {
                    // Feedback (or nothing) behind the relay: materialize the
                    // resolved seed and drop the cycle-carrying edge.
                    let label = compiler.graph.nodes[relay].label.clone();
                    let constant = compiler
                        .graph
                        .add(NodeKind::SeedConstant(default_seed), label);
                    PinRef {
                        node: constant,
                        pin: 0,
                    }
                }
            };

            compiler.graph.rewire_consumers(relay, forwarded);
            compiler.graph.disconnect_inputs(relay);
            log::debug!(
                "removed seed relay {}",
                compiler.graph.nodes[relay].label
            );
        }
        Ok(())
    }
}

/// True if `from` reaches `target` following input edges.
fn depends_on(
    compiler: &GraphCompiler<'_>,
    from: Handle<CompilationNode>,
    target: Handle<CompilationNode>,
) -> bool {
    let mut visited: HashSet<Handle<CompilationNode>> = HashSet::new();
    let mut stack = vec![from];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        for input in compiler.graph.nodes[current].inputs.iter().flatten() {
            stack.push(input.node);
        }
    }
    false
}
