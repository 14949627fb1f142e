//! The compilation-node graph transformed by passes.
//!
//! One [`CompilationGraph`] exists per permutation being compiled. It starts
//! as a one-to-one copy of the authored graph and is mutated in place by the
//! pass pipeline: macros expand into many nodes, local-variable indirections
//! collapse into edges, seed relays disappear. Edges are `(node, pin)`
//! indices into the arena, so rewiring is cheap and cycles are representable
//! while passes still need them.

use crate::arena::{Arena, Handle};
use crate::kind::NodeKind;

/// Reference to one output pin of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub node: Handle<CompilationNode>,
    pub pin: u32,
}

/// A node under compilation.
#[derive(Clone, Debug)]
pub struct CompilationNode {
    pub kind: NodeKind,
    /// One entry per input pin; `None` is an unconnected pin.
    pub inputs: Vec<Option<PinRef>>,
    /// Label of the authored node this came from, for diagnostics.
    pub label: String,
}

/// Arena of compilation nodes plus edge helpers.
#[derive(Clone, Debug, Default)]
pub struct CompilationGraph {
    pub nodes: Arena<CompilationNode>,
}

impl CompilationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, sizing its input list from the kind's pin signatures.
    pub fn add(&mut self, kind: NodeKind, label: impl Into<String>) -> Handle<CompilationNode> {
        let arity = kind.input_pins().len();
        self.add_with_arity(kind, label, arity)
    }

    /// Adds a node with an explicit input arity (macro references take
    /// theirs from the referenced graph, not from the kind).
    pub fn add_with_arity(
        &mut self,
        kind: NodeKind,
        label: impl Into<String>,
        arity: usize,
    ) -> Handle<CompilationNode> {
        self.nodes.append(CompilationNode {
            kind,
            inputs: vec![None; arity],
            label: label.into(),
        })
    }

    /// Connects `source` into input pin `pin` of `target`, replacing any
    /// previous connection on that pin.
    pub fn connect(&mut self, source: PinRef, target: Handle<CompilationNode>, pin: usize) {
        self.nodes[target].inputs[pin] = Some(source);
    }

    /// All `(consumer, input pin)` pairs reading any output of `node`.
    pub fn consumers(&self, node: Handle<CompilationNode>) -> Vec<(Handle<CompilationNode>, usize)> {
        let mut result = Vec::new();
        for (handle, n) in self.nodes.iter() {
            for (pin, input) in n.inputs.iter().enumerate() {
                if let Some(r) = input {
                    if r.node == node {
                        result.push((handle, pin));
                    }
                }
            }
        }
        result
    }

    /// Rewires every consumer of `old` (any output pin) to `new`.
    pub fn rewire_consumers(&mut self, old: Handle<CompilationNode>, new: PinRef) {
        for (_, n) in self.nodes.iter_mut() {
            for input in n.inputs.iter_mut() {
                if let Some(r) = input {
                    if r.node == old {
                        *input = Some(new);
                    }
                }
            }
        }
    }

    /// Severs every input of `node`, leaving its pins unconnected.
    pub fn disconnect_inputs(&mut self, node: Handle<CompilationNode>) {
        for input in self.nodes[node].inputs.iter_mut() {
            *input = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::BinaryOp;

    #[test]
    fn add_sizes_inputs_from_kind() {
        let mut graph = CompilationGraph::new();
        let n = graph.add(NodeKind::Clamp, "clamp");
        assert_eq!(graph.nodes[n].inputs.len(), 3);
    }

    #[test]
    fn connect_and_consumers() {
        let mut graph = CompilationGraph::new();
        let c = graph.add(NodeKind::Constant(1.0), "one");
        let add = graph.add(NodeKind::Binary(BinaryOp::Add), "add");
        graph.connect(PinRef { node: c, pin: 0 }, add, 0);
        graph.connect(PinRef { node: c, pin: 0 }, add, 1);

        let consumers = graph.consumers(c);
        assert_eq!(consumers.len(), 2);
        assert_eq!(consumers[0], (add, 0));
    }

    #[test]
    fn rewire_moves_all_edges() {
        let mut graph = CompilationGraph::new();
        let a = graph.add(NodeKind::Constant(1.0), "a");
        let b = graph.add(NodeKind::Constant(2.0), "b");
        let neg = graph.add(NodeKind::Unary(crate::kind::UnaryOp::Negate), "neg");
        graph.connect(PinRef { node: a, pin: 0 }, neg, 0);

        graph.rewire_consumers(a, PinRef { node: b, pin: 0 });
        assert_eq!(graph.nodes[neg].inputs[0], Some(PinRef { node: b, pin: 0 }));
        assert!(graph.consumers(a).is_empty());
    }

    #[test]
    fn disconnect_clears_pins() {
        let mut graph = CompilationGraph::new();
        let a = graph.add(NodeKind::Constant(1.0), "a");
        let neg = graph.add(NodeKind::Unary(crate::kind::UnaryOp::Negate), "neg");
        graph.connect(PinRef { node: a, pin: 0 }, neg, 0);
        graph.disconnect_inputs(neg);
        assert_eq!(graph.nodes[neg].inputs[0], None);
    }
}
