//! Evaluable instances over a compiled bundle.
//!
//! A [`GraphInstance`] interprets the step list of each compiled target:
//! every step writes one slot of a scratch variable buffer, and outputs are
//! read back from their recorded slots. Noise states are baked once per
//! instance from the resolved seeds.

use std::collections::HashMap;
use std::sync::Arc;

use fastnoise_lite::{FastNoiseLite, NoiseType};

use vgc_ir::{
    evaluate, CompiledGraph, CompiledGraphBundle, DataCategory, EvalContext, Interval, NodeKind,
    NoiseAlgorithm, Value,
};

fn bake_noise_states(graph: &CompiledGraph) -> Vec<FastNoiseLite> {
    let mut states = Vec::with_capacity(graph.noise_state_count());
    for step in &graph.steps {
        let NodeKind::Noise(params) = &step.kind else {
            continue;
        };
        if step.noise_state.is_none() {
            continue;
        }
        let mut noise = FastNoiseLite::with_seed(params.resolved_seed.unwrap_or_default());
        noise.set_noise_type(Some(match params.algorithm {
            NoiseAlgorithm::Perlin => NoiseType::Perlin,
            NoiseAlgorithm::Simplex => NoiseType::OpenSimplex2,
            NoiseAlgorithm::Cellular => NoiseType::Cellular,
            NoiseAlgorithm::ValueCubic => NoiseType::ValueCubic,
        }));
        noise.set_frequency(Some(params.frequency));
        states.push(noise);
    }
    states
}

/// An evaluable view over one compiled bundle.
pub struct GraphInstance {
    bundle: Arc<CompiledGraphBundle>,
    /// Baked noise states per target, indexed by `Step::noise_state`.
    noise: HashMap<String, Vec<FastNoiseLite>>,
}

impl GraphInstance {
    pub fn new(bundle: Arc<CompiledGraphBundle>) -> Self {
        let mut noise = HashMap::new();
        for (name, graph) in bundle.iter() {
            noise.insert(name.to_string(), bake_noise_states(graph));
        }
        Self { bundle, noise }
    }

    pub fn bundle(&self) -> &Arc<CompiledGraphBundle> {
        &self.bundle
    }

    /// Runs one target's program at a sample position and returns the value
    /// of the given output index.
    pub fn sample_target(
        &self,
        target: &str,
        output_index: u32,
        x: f32,
        y: f32,
        z: f32,
    ) -> Option<Value> {
        let graph = self.bundle.get(target)?;
        let slot = graph.output_slot(output_index)?;
        let states = self.noise.get(target)?;

        let mut buffer = vec![Value::Float(0.0); graph.variables_buffer_size as usize];
        let mut inputs = Vec::new();
        for step in &graph.steps {
            inputs.clear();
            inputs.extend(step.inputs.iter().map(|&s| buffer[s as usize]));
            let ctx = EvalContext {
                x,
                y,
                z,
                noise: step.noise_state.map(|i| &states[i as usize]),
            };
            match evaluate(&step.kind, &ctx, &inputs) {
                Ok(value) => buffer[step.output as usize] = value,
                Err(error) => {
                    log::warn!("evaluation failed at {}: {error}", step.label);
                    return None;
                }
            }
        }
        buffer.get(slot as usize).copied()
    }

    /// Static bounds recorded for a range-analysis target.
    pub fn target_range(&self, target: &str) -> Option<Interval> {
        self.bundle.get(target)?.value_range
    }
}

/// What the runtime holds: either a compiled instance or the always-empty
/// sentinel handed out when compilation failed.
pub enum TransformableInstance {
    Compiled(GraphInstance),
    Empty,
}

impl TransformableInstance {
    /// The density value at a position, from the `Value` target. The empty
    /// instance is all air.
    pub fn sample_value(&self, x: f32, y: f32, z: f32) -> f32 {
        match self {
            Self::Compiled(instance) => instance
                .sample_target("Value", 0, x, y, z)
                .and_then(|v| v.as_float())
                .unwrap_or_default(),
            Self::Empty => 0.0,
        }
    }

    /// Samples a named output through its singleton target.
    pub fn sample_output(&self, output_name: &str, output_index: u32, x: f32, y: f32, z: f32) -> Option<Value> {
        match self {
            Self::Compiled(instance) => {
                instance.sample_target(output_name, output_index, x, y, z)
            }
            Self::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Output-name listing split by category, as the runtime consumes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorOutputs {
    pub float_outputs: Vec<String>,
    pub int_outputs: Vec<String>,
    pub color_outputs: Vec<String>,
}

impl GeneratorOutputs {
    pub fn from_graph(graph: &vgc_graph::Graph) -> Self {
        let mut outputs = Self {
            float_outputs: vec!["Value".to_string()],
            ..Self::default()
        };
        for custom in &graph.custom_outputs {
            match custom.category {
                DataCategory::Float => outputs.float_outputs.push(custom.name.clone()),
                DataCategory::Int => outputs.int_outputs.push(custom.name.clone()),
                DataCategory::Color => outputs.color_outputs.push(custom.name.clone()),
                _ => {}
            }
        }
        outputs
    }
}
