//! Range analysis.
//!
//! Computes a conservative `[min, max]` interval for every tracked node
//! output, derived from the compile context's world bounds and each kind's
//! interval-transfer function. Results land in the compiler's range table,
//! feeding the constants pass and the range-analysis output of the
//! compiled graph.

use std::collections::{HashMap, HashSet};

use vgc_ir::{range, CompilationNode, DataCategory, Handle, Interval};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;
use crate::Pass;

#[derive(Debug)]
pub struct RangeAnalysisPass;

impl Pass for RangeAnalysisPass {
    fn name(&self) -> &str {
        "range-analysis"
    }

    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError> {
        let mut memo: HashMap<Handle<CompilationNode>, Option<Interval>> = HashMap::new();
        let mut visiting: HashSet<Handle<CompilationNode>> = HashSet::new();

        let handles: Vec<Handle<CompilationNode>> =
            compiler.graph.nodes.iter().map(|(h, _)| h).collect();
        for handle in handles {
            resolve(compiler, handle, &mut memo, &mut visiting);
        }

        for (handle, interval) in memo {
            if let Some(interval) = interval {
                compiler.ranges.insert(handle, interval);
            }
        }
        Ok(())
    }
}

fn resolve(
    compiler: &GraphCompiler<'_>,
    handle: Handle<CompilationNode>,
    memo: &mut HashMap<Handle<CompilationNode>, Option<Interval>>,
    visiting: &mut HashSet<Handle<CompilationNode>>,
) -> Option<Interval> {
    if let Some(cached) = memo.get(&handle) {
        return *cached;
    }
    if !visiting.insert(handle) {
        // A cycle that has not been broken yet; stay conservative.
        return Some(Interval::everything());
    }

    let kind = compiler.graph.nodes[handle].kind.clone();
    let pins = kind.input_pins();
    let inputs: Vec<Option<Interval>> = pins
        .iter()
        .enumerate()
        .map(|(pin, signature)| {
            // Seed chains are compile-time data, not interval-tracked.
            if signature.category == DataCategory::Seed {
                return None;
            }
            compiler.graph.nodes[handle].inputs[pin]
                .and_then(|source| resolve(compiler, source.node, memo, visiting))
        })
        .collect();

    let result = range::transfer(&kind, &inputs, &compiler.context.bounds);
    visiting.remove(&handle);
    memo.insert(handle, result);
    result
}
