//! Text dumps of compiled graphs, for the CLI and debugging.

use std::fmt::Write;

use crate::compiled::{CompiledGraph, CompiledGraphBundle};

/// Renders one compiled graph as readable text.
pub fn dump_compiled_graph(graph: &CompiledGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "target {} ({} steps, {} slots):",
        graph.name,
        graph.steps.len(),
        graph.variables_buffer_size
    );
    for step in &graph.steps {
        let args: Vec<String> = step.inputs.iter().map(|s| format!("v{s}")).collect();
        let _ = writeln!(
            out,
            "  v{} = {}({})  ; {}",
            step.output,
            step.kind.name(),
            args.join(", "),
            step.label
        );
    }
    for (index, slot) in &graph.outputs {
        let _ = writeln!(out, "  output {index} <- v{slot}");
    }
    if let Some(range) = &graph.value_range {
        let _ = writeln!(out, "  range [{}, {}]", range.min, range.max);
    }
    out
}

/// Renders every graph of a bundle, in permutation order.
pub fn dump_bundle(bundle: &CompiledGraphBundle) -> String {
    let mut out = String::new();
    for (_, graph) in bundle.iter() {
        out.push_str(&dump_compiled_graph(graph));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled::Step;
    use crate::kind::NodeKind;

    #[test]
    fn dump_lists_steps_and_outputs() {
        let graph = CompiledGraph {
            name: "Value".into(),
            steps: vec![
                Step {
                    kind: NodeKind::X,
                    inputs: vec![],
                    output: 0,
                    label: "X".into(),
                    noise_state: None,
                },
                Step {
                    kind: NodeKind::Unary(crate::kind::UnaryOp::Abs),
                    inputs: vec![0],
                    output: 1,
                    label: "Abs".into(),
                    noise_state: None,
                },
            ],
            variables_buffer_size: 2,
            outputs: vec![(0, 1)],
            value_range: None,
        };
        let text = dump_compiled_graph(&graph);
        assert!(text.contains("target Value (2 steps, 2 slots)"));
        assert!(text.contains("v1 = Abs(v0)"));
        assert!(text.contains("output 0 <- v1"));
    }
}
