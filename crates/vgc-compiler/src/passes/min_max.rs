//! Smart min/max simplification.
//!
//! Rewrites `min(max(x, lo), hi)` chains with constant bounds into a single
//! clamp node, and folds nested same-op chains with two constant bounds
//! into one. Rewrites are only applied where they are exact: the
//! `max(min(x, hi), lo)` form is only a clamp when `lo <= hi`, and chains
//! with NaN constants are left alone.

use vgc_ir::{BinaryOp, CompilationNode, Handle, NodeKind, PinRef};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;
use crate::Pass;

#[derive(Debug)]
pub struct ReplaceSmartMinMaxPass;

impl Pass for ReplaceSmartMinMaxPass {
    fn name(&self) -> &str {
        "replace-smart-min-max"
    }

    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError> {
        // Each rewrite can expose another; iterate to a fixpoint.
        let limit = compiler.graph.nodes.len() + 1;
        for _ in 0..limit {
            if !run_once(compiler) {
                break;
            }
        }
        Ok(())
    }
}

fn constant_value(compiler: &GraphCompiler<'_>, input: Option<PinRef>) -> Option<(PinRef, f32)> {
    let r = input?;
    match compiler.graph.nodes[r.node].kind {
        NodeKind::Constant(v) => Some((r, v)),
        _ => None,
    }
}

/// Splits a binary node's inputs into (constant pin, other pin) if exactly
/// one side is a float constant.
fn split_constant(
    compiler: &GraphCompiler<'_>,
    handle: Handle<CompilationNode>,
) -> Option<(PinRef, f32, PinRef)> {
    let inputs = &compiler.graph.nodes[handle].inputs;
    let a = inputs[0]?;
    let b = inputs[1]?;
    match (
        constant_value(compiler, Some(a)),
        constant_value(compiler, Some(b)),
    ) {
        (Some((c, v)), None) => Some((c, v, b)),
        (None, Some((c, v))) => Some((c, v, a)),
        _ => None,
    }
}

fn binary_op(compiler: &GraphCompiler<'_>, handle: Handle<CompilationNode>) -> Option<BinaryOp> {
    match compiler.graph.nodes[handle].kind {
        NodeKind::Binary(op @ (BinaryOp::Min | BinaryOp::Max)) => Some(op),
        _ => None,
    }
}

fn run_once(compiler: &mut GraphCompiler<'_>) -> bool {
    let handles: Vec<Handle<CompilationNode>> =
        compiler.graph.nodes.iter().map(|(h, _)| h).collect();
    let mut changed = false;

    for handle in handles {
        let Some(outer_op) = binary_op(compiler, handle) else {
            continue;
        };
        let Some((outer_const_ref, outer_const, inner_ref)) = split_constant(compiler, handle)
        else {
            continue;
        };
        if outer_const.is_nan() {
            continue;
        }
        let Some(inner_op) = binary_op(compiler, inner_ref.node) else {
            continue;
        };
        let Some((inner_const_ref, inner_const, x_ref)) = split_constant(compiler, inner_ref.node)
        else {
            continue;
        };
        if inner_const.is_nan() {
            continue;
        }

        if inner_op == outer_op {
            // min(min(x, c1), c2) keeps the tighter bound; same for max.
            let keep = match outer_op {
                BinaryOp::Min => {
                    if inner_const <= outer_const {
                        inner_const_ref
                    } else {
                        outer_const_ref
                    }
                }
                _ => {
                    if inner_const >= outer_const {
                        inner_const_ref
                    } else {
                        outer_const_ref
                    }
                }
            };
            let node = &mut compiler.graph.nodes[handle];
            node.inputs[0] = Some(x_ref);
            node.inputs[1] = Some(keep);
            changed = true;
            log::debug!(
                "smart-min-max: folded nested {:?} chain at {}",
                outer_op,
                compiler.graph.nodes[handle].label
            );
            continue;
        }

        // Mixed chain: decide the clamp bounds.
        let (lo_ref, hi_ref) = match outer_op {
            // min(max(x, lo), hi) is clamp by definition.
            BinaryOp::Min => (inner_const_ref, outer_const_ref),
            // max(min(x, hi), lo) only matches clamp when lo <= hi.
            _ => {
                let (lo, hi) = (outer_const, inner_const);
                if lo > hi {
                    continue;
                }
                (outer_const_ref, inner_const_ref)
            }
        };

        let node = &mut compiler.graph.nodes[handle];
        node.kind = NodeKind::Clamp;
        node.inputs = vec![Some(x_ref), Some(lo_ref), Some(hi_ref)];
        changed = true;
        log::debug!(
            "smart-min-max: rewrote chain at {} into clamp",
            compiler.graph.nodes[handle].label
        );
    }
    changed
}
