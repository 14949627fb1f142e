//! Lowering: scheduling surviving nodes into a compiled graph.
//!
//! Nodes are flattened into topological order — a node is scheduled only
//! after all of its inputs — with ties broken by declaration order so that
//! recompiling an unchanged graph yields an identical program. Each step is
//! assigned a slot of the runtime variable buffer, seed chains are folded
//! to constants, and noise nodes get their baked-state indices.

use std::collections::{BTreeSet, HashMap, HashSet};

use vgc_ir::{
    CompiledGraph, CompilationNode, DataCategory, Handle, NodeKind, PinRef, Step,
};

use crate::compiler::GraphCompiler;
use crate::dce;
use crate::error::CompileError;

/// Eliminates dead nodes and lowers the remainder into a [`CompiledGraph`].
pub fn lower(compiler: &mut GraphCompiler<'_>) -> Result<CompiledGraph, CompileError> {
    let alive = dce::alive_set(compiler)?;

    // Executable nodes: alive, not terminals, not compile-time seed data.
    let mut executable: Vec<Handle<CompilationNode>> = Vec::new();
    for (handle, node) in compiler.graph.nodes.iter() {
        if !alive.contains(&handle) {
            continue;
        }
        if matches!(node.kind, NodeKind::Output { .. }) {
            continue;
        }
        if node.kind.output_pins().first().map(|p| p.category) == Some(DataCategory::Seed) {
            continue;
        }
        if node.kind.is_structural() {
            let message = format!(
                "{} node {} survived compilation",
                node.kind.name(),
                node.label
            );
            compiler.reporter.error_on_node(node.label.clone(), message.clone());
            return Err(CompileError::Structural(message));
        }
        executable.push(handle);
    }
    let executable_set: HashSet<Handle<CompilationNode>> = executable.iter().copied().collect();

    // Dependency edges between executable nodes, via non-seed pins.
    let mut in_degree: HashMap<Handle<CompilationNode>, usize> = HashMap::new();
    let mut consumers: HashMap<Handle<CompilationNode>, Vec<Handle<CompilationNode>>> =
        HashMap::new();
    for &handle in &executable {
        let node = &compiler.graph.nodes[handle];
        let pins = node.kind.input_pins();
        let mut degree = 0;
        for (pin, input) in node.inputs.iter().enumerate() {
            if pins.get(pin).map(|p| p.category) == Some(DataCategory::Seed) {
                continue;
            }
            match input {
                Some(source) if executable_set.contains(&source.node) => {
                    degree += 1;
                    consumers.entry(source.node).or_default().push(handle);
                }
                Some(source) => {
                    let source_node = &compiler.graph.nodes[source.node];
                    let message = format!(
                        "input pin {pin} of {} reads non-executable node {}",
                        node.label, source_node.label
                    );
                    compiler.reporter.error_on_node(node.label.clone(), message.clone());
                    return Err(CompileError::Structural(message));
                }
                None => {
                    let message = format!(
                        "input pin {pin} of {} ({}) is not connected",
                        node.label,
                        node.kind.name()
                    );
                    compiler.reporter.error_on_node(node.label.clone(), message.clone());
                    return Err(CompileError::Structural(message));
                }
            }
        }
        in_degree.insert(handle, degree);
    }

    // Kahn's algorithm; the ready set orders by handle, i.e. declaration
    // order, which makes scheduling deterministic.
    let mut ready: BTreeSet<Handle<CompilationNode>> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&h, _)| h)
        .collect();
    let mut scheduled: Vec<Handle<CompilationNode>> = Vec::with_capacity(executable.len());

    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        scheduled.push(next);
        if let Some(users) = consumers.get(&next) {
            for &user in users {
                let degree = in_degree.get_mut(&user).expect("consumer is executable");
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(user);
                }
            }
        }
    }

    if scheduled.len() != executable.len() {
        let stuck = executable
            .iter()
            .find(|h| !scheduled.contains(h))
            .map(|&h| compiler.graph.nodes[h].label.clone())
            .unwrap_or_default();
        compiler
            .reporter
            .error_on_node(stuck.clone(), "dependency cycle outside seed relays");
        return Err(CompileError::Cycle(stuck));
    }

    // Emit steps, assigning slot i to the i-th scheduled node.
    let slots: HashMap<Handle<CompilationNode>, u32> = scheduled
        .iter()
        .enumerate()
        .map(|(i, &h)| (h, i as u32))
        .collect();

    let mut steps = Vec::with_capacity(scheduled.len());
    let mut noise_states = 0u32;
    for &handle in &scheduled {
        let node = &compiler.graph.nodes[handle];
        let pins = node.kind.input_pins();

        let mut inputs = Vec::new();
        let mut seed_input: Option<Option<PinRef>> = None;
        for (pin, input) in node.inputs.iter().enumerate() {
            if pins.get(pin).map(|p| p.category) == Some(DataCategory::Seed) {
                seed_input = Some(*input);
                continue;
            }
            let source = input.expect("checked while building dependency edges");
            inputs.push(slots[&source.node]);
        }

        let mut kind = node.kind.clone();
        let mut noise_state = None;
        if let NodeKind::Noise(params) = &mut kind {
            let seed = resolve_seed(compiler, seed_input.flatten())?;
            params.resolved_seed = Some(seed);
            noise_state = Some(noise_states);
            noise_states += 1;
        }

        steps.push(Step {
            kind,
            inputs,
            output: slots[&handle],
            label: node.label.clone(),
            noise_state,
        });
    }

    // Map each requested output to the slot of its terminal's source.
    let mut outputs = Vec::new();
    for output_index in compiler.permutation.computed_outputs() {
        let terminal = compiler
            .terminal(output_index)
            .expect("checked by dead-node elimination");
        let Some(source) = compiler.graph.nodes[terminal].inputs[0] else {
            let label = compiler.graph.nodes[terminal].label.clone();
            let message = format!("output {output_index} terminal is not connected");
            compiler.reporter.error_on_node(label, message.clone());
            return Err(CompileError::Structural(message));
        };
        outputs.push((output_index, slots[&source.node]));
    }

    // Range-analysis permutations carry the static bounds of their float
    // output alongside the program.
    let value_range = if compiler.permutation.wants_range_analysis() {
        compiler
            .permutation
            .computed_outputs()
            .next()
            .and_then(|index| compiler.terminal(index))
            .and_then(|terminal| compiler.graph.nodes[terminal].inputs[0])
            .and_then(|source| compiler.ranges.get(&source.node).copied())
    } else {
        None
    };

    Ok(CompiledGraph {
        name: compiler.target_name.clone(),
        variables_buffer_size: steps.len() as u32,
        steps,
        outputs,
        value_range,
    })
}

/// Folds a seed chain to its compile-time value.
///
/// After relay removal a seed chain contains only seed constants and
/// combiners; anything else is a structural error.
fn resolve_seed(
    compiler: &GraphCompiler<'_>,
    input: Option<PinRef>,
) -> Result<i32, CompileError> {
    let mut visiting = HashSet::new();
    resolve_seed_inner(compiler, input, &mut visiting)
}

fn resolve_seed_inner(
    compiler: &GraphCompiler<'_>,
    input: Option<PinRef>,
    visiting: &mut HashSet<Handle<CompilationNode>>,
) -> Result<i32, CompileError> {
    let Some(source) = input else {
        // Unconnected seed pins use the default seed.
        return Ok(0);
    };
    if !visiting.insert(source.node) {
        return Err(CompileError::Structural(
            "seed chain contains an unbroken cycle".into(),
        ));
    }
    let node = &compiler.graph.nodes[source.node];
    let result = match &node.kind {
        NodeKind::SeedConstant(v) => Ok(*v),
        NodeKind::CombineSeeds => {
            let a = resolve_seed_inner(compiler, node.inputs[0], visiting)?;
            let b = resolve_seed_inner(compiler, node.inputs[1], visiting)?;
            Ok(vgc_ir::combine_seeds(a, b))
        }
        other => Err(CompileError::Structural(format!(
            "seed input of {} is not a compile-time constant ({})",
            node.label,
            other.name()
        ))),
    };
    visiting.remove(&source.node);
    result
}
