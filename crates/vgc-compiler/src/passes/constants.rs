//! Disconnect range-analysis constants.
//!
//! Where range analysis proves a float output is a single value, the node
//! becomes a plain constant and its inputs are severed, so dead-node
//! elimination can drop the now-unused upstream subgraph.

use vgc_ir::{CompilationNode, DataCategory, Handle, NodeKind};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;
use crate::Pass;

#[derive(Debug)]
pub struct DisconnectRangeAnalysisConstantsPass;

impl Pass for DisconnectRangeAnalysisConstantsPass {
    fn name(&self) -> &str {
        "disconnect-range-analysis-constants"
    }

    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError> {
        let handles: Vec<Handle<CompilationNode>> =
            compiler.graph.nodes.iter().map(|(h, _)| h).collect();

        for handle in handles {
            let node = &compiler.graph.nodes[handle];
            if node.kind.is_structural() || node.inputs.is_empty() {
                continue;
            }
            match node.kind {
                // Already constants, or terminals that must stay wired.
                NodeKind::Constant(_) | NodeKind::Output { .. } => continue,
                _ => {}
            }
            if node.kind.output_pins().first().map(|p| p.category) != Some(DataCategory::Float) {
                continue;
            }

            let Some(interval) = compiler.ranges.get(&handle) else {
                continue;
            };
            if !interval.is_constant() {
                continue;
            }

            let value = interval.min;
            let label = compiler.graph.nodes[handle].label.clone();
            log::debug!("range analysis folded {label} to constant {value}");
            let node = &mut compiler.graph.nodes[handle];
            node.kind = NodeKind::Constant(value);
            node.inputs = Vec::new();
        }
        Ok(())
    }
}
