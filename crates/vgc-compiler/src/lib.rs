//! Pass pipeline and compiler manager for voxel generator graphs.
//!
//! Provides a [`Pass`] trait, the ordered built-in pass list, dead-node
//! elimination, lowering into [`vgc_ir::CompiledGraph`], and the
//! [`CompilerManager`] that compiles every permutation with an optimizing
//! run and a non-optimizing fallback.

mod compiler;
mod dce;
mod error;
mod lower;
mod manager;
mod passes;

pub use compiler::{CompileContext, GraphCompiler};
pub use dce::alive_set;
pub use error::CompileError;
pub use lower::lower;
pub use manager::{CompileOutcome, CompilerManager, PassFactory};
pub use passes::{
    DisconnectRangeAnalysisConstantsPass, InlineMacrosPass, RangeAnalysisPass,
    RemoveAllSeedNodesPass, ReplaceLocalVariablesPass, ReplaceSmartMinMaxPass,
};

/// A single named transformation of a permutation's compilation graph.
pub trait Pass: std::fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Runs the pass, mutating the compilation graph and reporting
    /// diagnostics through the compiler.
    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError>;
}

/// The ordered pass list for one permutation.
///
/// Shape-changing passes (macros, local variables) run before analysis;
/// range analysis runs before the cleanup passes that consume it; seed
/// relays are removed last so earlier passes can still reason through the
/// cycle-breaking indirection. The min/max and constants passes only run
/// when optimizing; range analysis also runs non-optimized when the
/// permutation itself requests range data.
pub fn pass_list(optimize: bool, wants_range: bool) -> Vec<Box<dyn Pass>> {
    let mut passes: Vec<Box<dyn Pass>> = vec![
        Box::new(InlineMacrosPass),
        Box::new(ReplaceLocalVariablesPass),
    ];
    if optimize {
        passes.push(Box::new(ReplaceSmartMinMaxPass));
    }
    if optimize || wants_range {
        passes.push(Box::new(RangeAnalysisPass));
    }
    if optimize {
        passes.push(Box::new(DisconnectRangeAnalysisConstantsPass));
    }
    passes.push(Box::new(RemoveAllSeedNodesPass));
    passes
}
