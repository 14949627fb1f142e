//! Per-permutation compiler state.
//!
//! A [`GraphCompiler`] is built fresh for every permutation: it copies the
//! authored graph into a [`CompilationGraph`], applies parameter overrides
//! from the compile context, and carries the diagnostics sink and range
//! results the passes share. Nothing here is reused across permutations.

use std::collections::HashMap;

use indexmap::IndexMap;

use vgc_graph::{apply_override, Graph, NodeId, Permutation};
use vgc_ir::{
    CompilationGraph, CompilationNode, DataCategory, ErrorReporter, Handle, Interval, NodeKind,
    PinRef, WorldBounds,
};

use crate::error::CompileError;

/// Inputs shared by every permutation of one compile request.
#[derive(Clone, Debug, Default)]
pub struct CompileContext {
    /// External parameter overrides, keyed by exposed unique name.
    pub parameters: IndexMap<String, String>,
    /// World-space sampling bounds for range analysis.
    pub bounds: WorldBounds,
}

/// Mutable state of one permutation's compilation.
pub struct GraphCompiler<'a> {
    pub source: &'a Graph,
    pub context: &'a CompileContext,
    pub permutation: Permutation,
    /// Stable display name of the permutation being compiled.
    pub target_name: String,
    pub graph: CompilationGraph,
    pub reporter: ErrorReporter,
    /// Range-analysis results, keyed by node handle. Filled by the range
    /// pass; consumed by the constants pass and lowering.
    pub ranges: HashMap<Handle<CompilationNode>, Interval>,
    /// Output terminals present in the compilation graph:
    /// `(output index, terminal handle)`.
    pub terminals: Vec<(u32, Handle<CompilationNode>)>,
}

impl<'a> GraphCompiler<'a> {
    /// Copies the authored graph into a fresh compilation graph for one
    /// permutation, applying context parameter overrides to exposed nodes.
    pub fn build(
        source: &'a Graph,
        context: &'a CompileContext,
        permutation: Permutation,
    ) -> Result<Self, CompileError> {
        let outputs = source.outputs();
        let target_name = permutation.name(&outputs);

        let mut compiler = Self {
            source,
            context,
            permutation,
            target_name,
            graph: CompilationGraph::new(),
            reporter: ErrorReporter::new(),
            ranges: HashMap::new(),
            terminals: Vec::new(),
        };

        let mut node_map: HashMap<NodeId, Handle<CompilationNode>> = HashMap::new();

        for node in &source.nodes {
            let kind = compiler.overridden_kind(node.kind.clone(), node)?;
            let arity = match &kind {
                NodeKind::Macro { name } => match source.macro_signature(name) {
                    Ok((inputs, _)) => inputs.len(),
                    Err(e) => {
                        compiler.reporter.error_on_node(node.name.clone(), e.to_string());
                        return Err(CompileError::Structural(e.to_string()));
                    }
                },
                other => other.input_pins().len(),
            };
            let handle = compiler.graph.add_with_arity(kind, node.name.clone(), arity);
            node_map.insert(node.id, handle);

            if let NodeKind::Output { index, .. } = &compiler.graph.nodes[handle].kind {
                compiler.terminals.push((*index, handle));
            }
        }

        for connection in &source.connections {
            let (Some(&from), Some(&to)) =
                (node_map.get(&connection.from), node_map.get(&connection.to))
            else {
                let message = format!(
                    "connection references unknown node ({} -> {})",
                    connection.from.0, connection.to.0
                );
                compiler.reporter.error(message.clone());
                return Err(CompileError::Structural(message));
            };
            if connection.to_pin as usize >= compiler.graph.nodes[to].inputs.len() {
                let message = format!(
                    "connection targets pin {} out of range on {}",
                    connection.to_pin, compiler.graph.nodes[to].label
                );
                compiler.reporter.error(message.clone());
                return Err(CompileError::Structural(message));
            }
            compiler.graph.connect(
                PinRef {
                    node: from,
                    pin: connection.from_pin,
                },
                to,
                connection.to_pin as usize,
            );
        }

        compiler.default_noise_coordinates();
        Ok(compiler)
    }

    /// Applies a context parameter override to an exposed node's kind.
    pub fn overridden_kind(
        &mut self,
        kind: NodeKind,
        node: &vgc_graph::Node,
    ) -> Result<NodeKind, CompileError> {
        let Some(exposure) = &node.exposure else {
            return Ok(kind);
        };
        let Some(text) = self.context.parameters.get(&exposure.unique_name) else {
            return Ok(kind);
        };
        match apply_override(&kind, text) {
            Ok(kind) => Ok(kind),
            Err(message) => {
                self.reporter.error_on_node(node.name.clone(), message.clone());
                Err(CompileError::Structural(message))
            }
        }
    }

    /// Unconnected coordinate pins of noise nodes default to the sample
    /// position, so an unwired noise node samples world space directly.
    /// Re-run after macro expansion for noise nodes created by inlining.
    pub(crate) fn default_noise_coordinates(&mut self) {
        let noise_nodes: Vec<Handle<CompilationNode>> = self
            .graph
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Noise(_)))
            .map(|(h, _)| h)
            .collect();

        for handle in noise_nodes {
            for (pin, axis_kind) in [(0, NodeKind::X), (1, NodeKind::Y), (2, NodeKind::Z)] {
                if self.graph.nodes[handle].inputs[pin].is_none() {
                    let axis = self.graph.add(axis_kind.clone(), axis_kind.name());
                    self.graph.connect(PinRef { node: axis, pin: 0 }, handle, pin);
                }
            }
        }
    }

    /// The terminal handle computing an output index, if present.
    pub fn terminal(&self, output_index: u32) -> Option<Handle<CompilationNode>> {
        self.terminals
            .iter()
            .find(|(index, _)| *index == output_index)
            .map(|(_, handle)| *handle)
    }

    /// Categories of a node's input pins, taken from its kind.
    pub fn input_categories(&self, handle: Handle<CompilationNode>) -> Vec<DataCategory> {
        self.graph.nodes[handle]
            .kind
            .input_pins()
            .iter()
            .map(|p| p.category)
            .collect()
    }
}
