//! Dead-node elimination.
//!
//! A node survives only if it is reachable from one of the permutation's
//! requested output terminals. Seed-category edges are compile-time data
//! resolved during lowering and do not keep nodes alive on their own.

use std::collections::HashSet;

use vgc_ir::{CompilationNode, DataCategory, Handle};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;

/// Computes the set of nodes reachable from the permutation's outputs.
///
/// The terminals themselves are included; a requested output with no
/// terminal in the graph is a structural error.
pub fn alive_set(
    compiler: &mut GraphCompiler<'_>,
) -> Result<HashSet<Handle<CompilationNode>>, CompileError> {
    let mut alive: HashSet<Handle<CompilationNode>> = HashSet::new();
    let mut stack: Vec<Handle<CompilationNode>> = Vec::new();

    let requested: Vec<u32> = compiler.permutation.computed_outputs().collect();
    for output_index in requested {
        let Some(terminal) = compiler.terminal(output_index) else {
            let message = format!("graph has no terminal for output {output_index}");
            compiler.reporter.error(message.clone());
            return Err(CompileError::Structural(message));
        };
        if alive.insert(terminal) {
            stack.push(terminal);
        }
    }

    while let Some(current) = stack.pop() {
        let node = &compiler.graph.nodes[current];
        let pins = node.kind.input_pins();
        for (pin, input) in node.inputs.iter().enumerate() {
            let Some(source) = input else { continue };
            // Seed pins carry compile-time data only.
            if pins.get(pin).map(|p| p.category) == Some(DataCategory::Seed) {
                continue;
            }
            if alive.insert(source.node) {
                stack.push(source.node);
            }
        }
    }

    Ok(alive)
}
