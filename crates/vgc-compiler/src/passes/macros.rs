//! Macro inlining.
//!
//! Replaces every macro-reference node with a fresh instantiation of the
//! referenced body graph, substituting the body's input/output placeholders
//! with the caller's connections. Nested macro references are queued with
//! their expansion ancestry so transitive self-reference is detected as a
//! fatal error instead of looping.

use std::collections::HashMap;

use vgc_graph::{apply_override, NodeId};
use vgc_ir::{CompilationNode, Handle, NodeKind, PinRef};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;
use crate::Pass;

#[derive(Debug)]
pub struct InlineMacrosPass;

impl Pass for InlineMacrosPass {
    fn name(&self) -> &str {
        "inline-macros"
    }

    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError> {
        let mut worklist: Vec<(Handle<CompilationNode>, Vec<String>)> = compiler
            .graph
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Macro { .. }))
            .map(|(h, _)| (h, Vec::new()))
            .collect();

        while let Some((handle, ancestry)) = worklist.pop() {
            let (name, label) = match &compiler.graph.nodes[handle].kind {
                NodeKind::Macro { name } => (name.clone(), compiler.graph.nodes[handle].label.clone()),
                _ => continue,
            };

            if ancestry.contains(&name) {
                let chain = ancestry.join(" -> ");
                compiler.reporter.error_on_node(
                    label,
                    format!("macro {name:?} transitively references itself ({chain} -> {name})"),
                );
                return Err(CompileError::MacroRecursion(name));
            }

            let expanded = expand_macro(compiler, handle, &name, &label)?;

            let mut child_ancestry = ancestry;
            child_ancestry.push(name);
            for child in expanded {
                worklist.push((child, child_ancestry.clone()));
            }
        }

        // Noise nodes instantiated from macro bodies get the same
        // coordinate defaulting as authored ones.
        compiler.default_noise_coordinates();
        Ok(())
    }
}

/// Instantiates one macro body in place of `handle`, returning the handles
/// of any nested macro references created by the expansion.
fn expand_macro(
    compiler: &mut GraphCompiler<'_>,
    handle: Handle<CompilationNode>,
    name: &str,
    label: &str,
) -> Result<Vec<Handle<CompilationNode>>, CompileError> {
    // Macro references resolve against the root graph's library, so bodies
    // can reference sibling macros.
    let source = compiler.source;
    let Some(body) = source.macros.get(name) else {
        let message = format!("unknown macro {name:?}");
        compiler.reporter.error_on_node(label.to_string(), message.clone());
        return Err(CompileError::Structural(message));
    };

    // Instantiate every body node, overrides applied.
    let mut map: HashMap<NodeId, Handle<CompilationNode>> = HashMap::new();
    let mut nested = Vec::new();
    for body_node in &body.nodes {
        let mut kind = body_node.kind.clone();
        if let Some(exposure) = &body_node.exposure {
            if let Some(text) = compiler.context.parameters.get(&exposure.unique_name) {
                kind = apply_override(&kind, text).map_err(|message| {
                    compiler
                        .reporter
                        .error_on_node(body_node.name.clone(), message.clone());
                    CompileError::Structural(message)
                })?;
            }
        }

        let arity = match &kind {
            NodeKind::Macro { name: nested_name } => match source.macro_signature(nested_name) {
                Ok((inputs, _)) => inputs.len(),
                Err(e) => {
                    let message = e.to_string();
                    compiler
                        .reporter
                        .error_on_node(body_node.name.clone(), message.clone());
                    return Err(CompileError::Structural(message));
                }
            },
            other => other.input_pins().len(),
        };

        let instance_label = format!("{label}/{}", body_node.name);
        let new_handle = compiler.graph.add_with_arity(kind, instance_label, arity);
        map.insert(body_node.id, new_handle);
        if matches!(compiler.graph.nodes[new_handle].kind, NodeKind::Macro { .. }) {
            nested.push(new_handle);
        }
    }

    // Body-internal wiring.
    for connection in &body.connections {
        let (Some(&from), Some(&to)) = (map.get(&connection.from), map.get(&connection.to)) else {
            let message = format!("macro {name:?} has a dangling connection");
            compiler.reporter.error_on_node(label.to_string(), message.clone());
            return Err(CompileError::Structural(message));
        };
        if (connection.to_pin as usize) < compiler.graph.nodes[to].inputs.len() {
            compiler.graph.connect(
                PinRef {
                    node: from,
                    pin: connection.from_pin,
                },
                to,
                connection.to_pin as usize,
            );
        }
    }

    // Input placeholders forward the caller's connections.
    let caller_inputs = compiler.graph.nodes[handle].inputs.clone();
    for &instance in map.values() {
        let NodeKind::MacroInput { index, .. } = compiler.graph.nodes[instance].kind else {
            continue;
        };
        let caller_source = caller_inputs.get(index as usize).copied().flatten();
        for (consumer, pin) in compiler.graph.consumers(instance) {
            compiler.graph.nodes[consumer].inputs[pin] = caller_source;
        }
    }

    // Caller consumers read through the matching output placeholder.
    let edges: Vec<(Handle<CompilationNode>, usize, u32)> = {
        let mut edges = Vec::new();
        for (consumer, n) in compiler.graph.nodes.iter() {
            for (pin, input) in n.inputs.iter().enumerate() {
                if let Some(r) = input {
                    if r.node == handle {
                        edges.push((consumer, pin, r.pin));
                    }
                }
            }
        }
        edges
    };
    for (consumer, pin, output_index) in edges {
        let placeholder = map.values().copied().find(|&h| {
            matches!(
                compiler.graph.nodes[h].kind,
                NodeKind::MacroOutput { index, .. } if index == output_index
            )
        });
        match placeholder {
            Some(p) => {
                let inner = compiler.graph.nodes[p].inputs.first().copied().flatten();
                compiler.graph.nodes[consumer].inputs[pin] = inner;
            }
            None => {
                let message = format!("macro {name:?} has no output {output_index}");
                compiler.reporter.error_on_node(label.to_string(), message.clone());
                return Err(CompileError::Structural(message));
            }
        }
    }

    // The reference node is now fully bypassed.
    compiler.graph.disconnect_inputs(handle);
    Ok(nested)
}
