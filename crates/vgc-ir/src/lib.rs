//! Compilation-time IR for voxel generator graphs.
//!
//! An arena-based node IR built around a closed node-kind enumeration.
//! Each kind declares its pin signatures and three pure functions —
//! evaluate, interval transfer, and C++ emission — dispatched by `match`.
//! The pass pipeline (in `vgc-compiler`) mutates a [`CompilationGraph`]
//! per permutation and lowers the survivors into a [`CompiledGraph`].

pub mod arena;
pub mod category;
mod compiled;
pub mod cpp;
mod diagnostics;
pub mod display;
pub mod eval;
mod interval;
mod kind;
mod node;
pub mod range;

pub use arena::{Arena, Handle};
pub use category::{DataCategory, Value};
pub use compiled::{CompiledGraph, CompiledGraphBundle, Step};
pub use diagnostics::{Diagnostic, ErrorReporter, Severity};
pub use display::{dump_bundle, dump_compiled_graph};
pub use eval::{combine_seeds, evaluate, EvalContext, EvalError};
pub use interval::{Interval, WorldBounds};
pub use kind::{
    BinaryOp, CompareOp, NodeKind, NoiseAlgorithm, NoiseParams, PinSignature, UnaryOp,
};
pub use node::{CompilationGraph, CompilationNode, PinRef};
