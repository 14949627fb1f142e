//! The compiler manager.
//!
//! Runs the pass pipeline once per permutation and owns the top-level retry
//! policy: compile everything with optimizations, and if anything fails,
//! discard all partial results and redo the whole request without them. A
//! fallback success is still a success, but the optimizer regression is
//! surfaced as an internal-error diagnostic rather than swallowed.

use std::time::Instant;

use vgc_graph::Graph;
use vgc_ir::{CompiledGraph, CompiledGraphBundle, Diagnostic, ErrorReporter};

use crate::compiler::{CompileContext, GraphCompiler};
use crate::error::CompileError;
use crate::lower;
use crate::pass_list;

/// Result of one compile request.
#[derive(Debug)]
pub struct CompileOutcome {
    pub success: bool,
    /// Present only on success; never a partial bundle.
    pub bundle: Option<CompiledGraphBundle>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the pass list for one permutation's run.
///
/// Swappable so tests can inject synthetic passes.
pub type PassFactory = fn(optimize: bool, wants_range: bool) -> Vec<Box<dyn crate::Pass>>;

/// Orchestrates per-permutation compilation for one graph.
pub struct CompilerManager<'a> {
    graph: &'a Graph,
    context: &'a CompileContext,
    passes: PassFactory,
}

impl<'a> CompilerManager<'a> {
    pub fn new(graph: &'a Graph, context: &'a CompileContext) -> Self {
        Self {
            graph,
            context,
            passes: pass_list,
        }
    }

    /// Replaces the pass factory.
    pub fn with_passes(mut self, passes: PassFactory) -> Self {
        self.passes = passes;
        self
    }

    /// Compiles every permutation at the given optimization setting.
    ///
    /// A structural failure in one permutation fails the request but does
    /// not stop the remaining permutations from being compiled (and
    /// reporting their own diagnostics); macro recursion and unbroken
    /// cycles abort immediately.
    pub fn compile(&self, optimize: bool) -> CompileOutcome {
        let start = Instant::now();
        let mut reporter = ErrorReporter::new();
        let mut bundle = CompiledGraphBundle::new();
        let mut failed = false;

        for permutation in self.graph.permutations() {
            match self.compile_permutation(permutation.clone(), optimize, &mut reporter) {
                Ok(compiled) => {
                    log::debug!(
                        "target {}: {} steps, {} variables",
                        compiled.name,
                        compiled.steps.len(),
                        compiled.variables_buffer_size
                    );
                    bundle.insert(compiled);
                }
                Err(error) if error.is_request_fatal() => {
                    return CompileOutcome {
                        success: false,
                        bundle: None,
                        diagnostics: reporter.into_diagnostics(),
                    };
                }
                Err(_) => failed = true,
            }
        }

        log::debug!(
            "graph {} compiled in {:.2}ms (optimize: {optimize})",
            self.graph.name,
            start.elapsed().as_secs_f64() * 1000.0
        );

        if failed {
            CompileOutcome {
                success: false,
                bundle: None,
                diagnostics: reporter.into_diagnostics(),
            }
        } else {
            CompileOutcome {
                success: true,
                bundle: Some(bundle),
                diagnostics: reporter.into_diagnostics(),
            }
        }
    }

    /// Compiles with optimizations, falling back to a full non-optimized
    /// rerun on failure.
    pub fn compile_with_fallback(&self) -> CompileOutcome {
        let optimized = self.compile(true);
        if optimized.success {
            return optimized;
        }

        let mut fallback = self.compile(false);
        let mut diagnostics = optimized.diagnostics;
        if fallback.success {
            let mut reporter = ErrorReporter::new();
            reporter.internal_error(
                "graph failed to compile with optimizations but succeeded without; \
                 please report this",
            );
            diagnostics.extend(reporter.into_diagnostics());
        }
        diagnostics.append(&mut fallback.diagnostics);
        CompileOutcome {
            success: fallback.success,
            bundle: fallback.bundle,
            diagnostics,
        }
    }

    fn compile_permutation(
        &self,
        permutation: vgc_graph::Permutation,
        optimize: bool,
        reporter: &mut ErrorReporter,
    ) -> Result<CompiledGraph, CompileError> {
        let wants_range = permutation.wants_range_analysis();
        let mut compiler = match GraphCompiler::build(self.graph, self.context, permutation) {
            Ok(compiler) => compiler,
            Err(error) => {
                reporter.error(error.to_string());
                return Err(error);
            }
        };

        let result = (|| {
            for pass in (self.passes)(optimize, wants_range) {
                log::debug!("running pass {} on {}", pass.name(), compiler.target_name);
                pass.run(&mut compiler)?;
            }
            lower::lower(&mut compiler)
        })();

        // Hand the per-permutation diagnostics up regardless of outcome.
        reporter.absorb(std::mem::take(&mut compiler.reporter));
        if let Err(error) = &result {
            log::debug!("permutation failed: {error}");
        }
        result
    }
}
