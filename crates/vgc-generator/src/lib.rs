//! Generator facade.
//!
//! Owns the authored graph (and its debug variant), recompiles on
//! structural edits, and publishes the permutation-indexed compiled bundle
//! as an atomic snapshot: a failed compile never replaces a previously good
//! bundle, and concurrent readers keep whatever snapshot they already hold.

mod instance;

pub use instance::{GeneratorOutputs, GraphInstance, TransformableInstance};

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use vgc_compiler::{CompileContext, CompilerManager};
use vgc_graph::{GeneratorParameter, Graph};
use vgc_ir::{CompiledGraphBundle, Diagnostic, ErrorReporter, WorldBounds};

/// How an edit was made, mirroring the editing surface's change types.
/// Interactive changes (mid-drag) do not trigger recompilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeType {
    Interactive,
    Structural,
}

/// Editing-surface notifications, injected by the owner rather than looked
/// up from global state.
pub trait EditorHooks: Send + Sync {
    fn on_recompiled(&self, graph_name: &str) {
        let _ = graph_name;
    }
}

/// Owns an authored graph and its compiled form.
pub struct GraphGenerator {
    graph: Graph,
    /// Secondary graph variant used by the editing surface for debugging;
    /// compiled only through the selected debug target.
    debug_graph: Option<Graph>,
    debug_target: Option<String>,
    bounds: WorldBounds,
    hooks: Option<Arc<dyn EditorHooks>>,
    bundle: RwLock<Option<Arc<CompiledGraphBundle>>>,
    diagnostics: RwLock<Vec<Diagnostic>>,
}

impl GraphGenerator {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            debug_graph: None,
            debug_target: None,
            bounds: WorldBounds::default(),
            hooks: None,
            bundle: RwLock::new(None),
            diagnostics: RwLock::new(Vec::new()),
        }
    }

    /// Injects the editing surface handle.
    pub fn with_editor_hooks(mut self, hooks: Arc<dyn EditorHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Overrides the world bounds range analysis assumes.
    pub fn with_bounds(mut self, bounds: WorldBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn debug_graph(&self) -> Option<&Graph> {
        self.debug_graph.as_ref()
    }

    pub fn set_debug_graph(&mut self, graph: Option<Graph>) {
        self.debug_graph = graph;
    }

    /// Selects the permutation the debug graph tracks. Validated against
    /// the permutation names on the next compile.
    pub fn set_debug_target(&mut self, target: Option<String>) {
        self.debug_target = target;
    }

    /// Applies an edit to the authored graph; structural changes trigger
    /// recompilation, interactive ones do not.
    pub fn apply_edit(&mut self, change: ChangeType, edit: impl FnOnce(&mut Graph)) -> bool {
        edit(&mut self.graph);
        match change {
            ChangeType::Interactive => true,
            ChangeType::Structural => self.create_graphs(),
        }
    }

    /// Compiles every permutation and, on success, atomically publishes the
    /// new bundle. Failure keeps the previous bundle and only updates the
    /// surfaced diagnostics.
    pub fn create_graphs(&self) -> bool {
        if let Some(target) = &self.debug_target {
            let names = self.graph.permutation_names();
            if !names.contains(target) {
                let mut reporter = ErrorReporter::new();
                reporter.error(format!(
                    "invalid debug target {target:?}; valid targets: {}",
                    names.join(", ")
                ));
                *self.diagnostics.write() = reporter.into_diagnostics();
                return false;
            }
        }

        let context = CompileContext {
            parameters: IndexMap::new(),
            bounds: self.bounds,
        };
        let outcome = CompilerManager::new(&self.graph, &context).compile_with_fallback();
        *self.diagnostics.write() = outcome.diagnostics;

        match (outcome.success, outcome.bundle) {
            (true, Some(bundle)) => {
                *self.bundle.write() = Some(Arc::new(bundle));
                if let Some(hooks) = &self.hooks {
                    hooks.on_recompiled(&self.graph.name);
                }
                true
            }
            _ => {
                log::warn!("graph {} failed to compile", self.graph.name);
                false
            }
        }
    }

    /// The currently published bundle snapshot, if any compile succeeded.
    pub fn bundle(&self) -> Option<Arc<CompiledGraphBundle>> {
        self.bundle.read().clone()
    }

    /// Diagnostics from the most recent compile or instantiation.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.read().clone()
    }

    /// The deduplicated parameter surface of the authored graph.
    pub fn parameters(&self) -> (Vec<GeneratorParameter>, Vec<Diagnostic>) {
        let mut reporter = ErrorReporter::new();
        let parameters = self.graph.parameters(&mut reporter);
        (parameters, reporter.into_diagnostics())
    }

    /// Editor-time mutation of exposed values, followed by recompilation.
    pub fn apply_parameters(&mut self, overrides: &IndexMap<String, String>) -> bool {
        let mut reporter = ErrorReporter::new();
        self.graph.apply_parameters(overrides, &mut reporter);
        if reporter.has_errors() {
            *self.diagnostics.write() = reporter.into_diagnostics();
            return false;
        }
        self.create_graphs()
    }

    /// The output-name listing the runtime consumes.
    pub fn generator_outputs(&self) -> GeneratorOutputs {
        GeneratorOutputs::from_graph(&self.graph)
    }

    /// Compiles a parameter-specialized instance.
    ///
    /// Overrides are validated against the declared parameter surface;
    /// unknown names and unparseable values are reported and skipped. On
    /// compile failure the always-empty sentinel instance is returned with
    /// a diagnostic, never an error.
    pub fn transformable_instance(
        &self,
        overrides: &IndexMap<String, String>,
    ) -> TransformableInstance {
        let mut reporter = ErrorReporter::new();
        let declared = self.graph.parameters(&mut reporter);

        let mut validated = IndexMap::new();
        for (name, text) in overrides {
            let Some(parameter) = declared.iter().find(|p| &p.id == name) else {
                reporter.error(format!("unknown parameter {name:?}"));
                continue;
            };
            if !override_matches_type(parameter, text) {
                reporter.error(format!(
                    "parameter {name:?} expects {}, got {text:?}",
                    parameter.ty
                ));
                continue;
            }
            validated.insert(name.clone(), text.clone());
        }

        let context = CompileContext {
            parameters: validated,
            bounds: self.bounds,
        };
        let outcome = CompilerManager::new(&self.graph, &context).compile_with_fallback();
        reporter
            .absorb(diagnostics_into_reporter(outcome.diagnostics));

        let instance = match (outcome.success, outcome.bundle) {
            (true, Some(bundle)) => {
                TransformableInstance::Compiled(GraphInstance::new(Arc::new(bundle)))
            }
            _ => {
                reporter.error(format!("failed to compile voxel graph {}", self.graph.name));
                TransformableInstance::Empty
            }
        };
        *self.diagnostics.write() = reporter.into_diagnostics();
        instance
    }
}

fn diagnostics_into_reporter(diagnostics: Vec<Diagnostic>) -> ErrorReporter {
    let mut reporter = ErrorReporter::new();
    for diagnostic in diagnostics {
        reporter.push(diagnostic);
    }
    reporter
}

fn override_matches_type(parameter: &GeneratorParameter, text: &str) -> bool {
    use vgc_graph::ParameterType;
    let text = text.trim();
    match parameter.ty {
        ParameterType::Float => text.parse::<f32>().is_ok(),
        ParameterType::Int | ParameterType::Seed => text.parse::<i32>().is_ok(),
        ParameterType::Bool => text.parse::<bool>().is_ok(),
        ParameterType::Color => {
            text.split(',').count() == 4
                && text.split(',').all(|p| p.trim().parse::<f32>().is_ok())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vgc_graph::{Exposure, VALUE_INDEX};
    use vgc_ir::{DataCategory, NodeKind};

    fn simple_graph() -> Graph {
        let mut graph = Graph::new("simple");
        let c = graph.add_node(NodeKind::Constant(4.0));
        graph.expose(c, Exposure::new("Height")).unwrap();
        let out = graph.add_node(NodeKind::Output {
            index: VALUE_INDEX,
            category: DataCategory::Float,
        });
        graph.connect(c, 0, out, 0).unwrap();
        graph
    }

    #[test]
    fn create_graphs_publishes_bundle() {
        let generator = GraphGenerator::new(simple_graph());
        assert!(generator.bundle().is_none());
        assert!(generator.create_graphs());
        let bundle = generator.bundle().unwrap();
        assert_eq!(bundle.len(), 2); // Value, ValueRangeAnalysis
    }

    #[test]
    fn failed_compile_keeps_previous_bundle() {
        let mut generator = GraphGenerator::new(simple_graph());
        assert!(generator.create_graphs());
        let good = generator.bundle().unwrap();

        // Break the graph: dangle the value output.
        let ok = generator.apply_edit(ChangeType::Structural, |graph| {
            graph.connections.clear();
        });
        assert!(!ok);
        let kept = generator.bundle().unwrap();
        assert!(Arc::ptr_eq(&good, &kept));
        assert!(!generator.diagnostics().is_empty());
    }

    #[test]
    fn interactive_edits_do_not_recompile() {
        let mut generator = GraphGenerator::new(simple_graph());
        let ok = generator.apply_edit(ChangeType::Interactive, |graph| {
            graph.name = "renamed".into();
        });
        assert!(ok);
        assert!(generator.bundle().is_none());
    }

    #[test]
    fn invalid_debug_target_refuses_compile() {
        let mut generator = GraphGenerator::new(simple_graph());
        generator.set_debug_target(Some("NoSuchTarget".into()));
        assert!(!generator.create_graphs());
        assert!(generator
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("invalid debug target")));

        generator.set_debug_target(Some("Value".into()));
        assert!(generator.create_graphs());
    }

    #[test]
    fn instance_applies_overrides() {
        let generator = GraphGenerator::new(simple_graph());
        let mut overrides = IndexMap::new();
        overrides.insert("Height".to_string(), "9.0".to_string());
        let instance = generator.transformable_instance(&overrides);
        assert!(!instance.is_empty());
        assert_eq!(instance.sample_value(0.0, 0.0, 0.0), 9.0);
    }

    #[test]
    fn unknown_override_is_reported_and_skipped() {
        let generator = GraphGenerator::new(simple_graph());
        let mut overrides = IndexMap::new();
        overrides.insert("Nope".to_string(), "1".to_string());
        let instance = generator.transformable_instance(&overrides);
        assert!(!instance.is_empty());
        assert_eq!(instance.sample_value(0.0, 0.0, 0.0), 4.0);
        assert!(generator
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("unknown parameter")));
    }

    #[test]
    fn type_mismatched_override_is_reported() {
        let generator = GraphGenerator::new(simple_graph());
        let mut overrides = IndexMap::new();
        overrides.insert("Height".to_string(), "tall".to_string());
        let instance = generator.transformable_instance(&overrides);
        assert!(!instance.is_empty());
        assert!(generator
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("expects Float")));
    }

    #[test]
    fn broken_graph_yields_empty_instance() {
        let mut graph = simple_graph();
        graph.connections.clear();
        let generator = GraphGenerator::new(graph);
        let instance = generator.transformable_instance(&IndexMap::new());
        assert!(instance.is_empty());
        assert_eq!(instance.sample_value(1.0, 2.0, 3.0), 0.0);
    }

    #[test]
    fn hooks_fire_on_successful_compile() {
        #[derive(Default)]
        struct Counter(AtomicUsize);
        impl EditorHooks for Counter {
            fn on_recompiled(&self, _graph_name: &str) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let hooks = Arc::new(Counter::default());
        let generator = GraphGenerator::new(simple_graph())
            .with_editor_hooks(hooks.clone());
        assert!(generator.create_graphs());
        assert_eq!(hooks.0.load(Ordering::SeqCst), 1);
    }
}
