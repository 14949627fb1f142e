//! The compiled, executable form of one permutation.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::interval::Interval;
use crate::kind::NodeKind;

/// One scheduled computation writing a slot of the variable buffer.
#[derive(Clone, Debug)]
pub struct Step {
    pub kind: NodeKind,
    /// Variable-buffer slots of the step's inputs, in pin order. Seed pins
    /// are resolved at compile time and do not appear here.
    pub inputs: Vec<u32>,
    /// Slot this step writes.
    pub output: u32,
    /// Label of the authored node, for dumps and diagnostics.
    pub label: String,
    /// Index into the instance's baked noise-state table for noise steps.
    pub noise_state: Option<u32>,
}

/// The specialized program compiled for one permutation.
///
/// Steps are in execution order: every step's inputs are written by earlier
/// steps. The order and the buffer size are deterministic for an unchanged
/// graph.
#[derive(Clone, Debug)]
pub struct CompiledGraph {
    /// Permutation name, e.g. `ValueRangeAnalysis`.
    pub name: String,
    pub steps: Vec<Step>,
    /// Number of slots the runtime variable buffer needs.
    pub variables_buffer_size: u32,
    /// `(output index, slot)` for each output this permutation computes.
    pub outputs: Vec<(u32, u32)>,
    /// Statically derived bounds of the float output, present on
    /// range-analysis permutations.
    pub value_range: Option<Interval>,
}

impl CompiledGraph {
    /// Slot holding the given output, if this permutation computes it.
    pub fn output_slot(&self, output_index: u32) -> Option<u32> {
        self.outputs
            .iter()
            .find(|(index, _)| *index == output_index)
            .map(|(_, slot)| *slot)
    }

    /// Count of noise states an instance must bake for this graph.
    pub fn noise_state_count(&self) -> usize {
        self.steps.iter().filter(|s| s.noise_state.is_some()).count()
    }
}

/// The permutation-indexed result of a whole compile request.
///
/// Published as an immutable snapshot; readers share it via `Arc` while a
/// recompile builds its replacement.
#[derive(Clone, Debug, Default)]
pub struct CompiledGraphBundle {
    graphs: IndexMap<String, Arc<CompiledGraph>>,
}

impl CompiledGraphBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, graph: CompiledGraph) {
        self.graphs.insert(graph.name.clone(), Arc::new(graph));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CompiledGraph>> {
        self.graphs.get(name)
    }

    /// Graphs in permutation-resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CompiledGraph>)> {
        self.graphs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
