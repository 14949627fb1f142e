//! Per-kind evaluation of executable node kinds.

use fastnoise_lite::FastNoiseLite;

use crate::category::{DataCategory, Value};
use crate::kind::{BinaryOp, CompareOp, NodeKind, UnaryOp};

/// Errors surfaced while evaluating a step.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The kind is structural and has no runtime meaning.
    #[error("node kind {0} is not executable")]
    NotExecutable(&'static str),

    /// An input value had the wrong category.
    #[error("input {index} of {kind}: expected {expected}, found {found}")]
    BadInput {
        kind: &'static str,
        index: usize,
        expected: DataCategory,
        found: DataCategory,
    },

    /// A noise step was executed without its baked noise state.
    #[error("noise step has no baked noise state")]
    MissingNoiseState,
}

/// The per-sample context a step executes against.
pub struct EvalContext<'a> {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Baked noise state for the step being evaluated, if it is a noise step.
    pub noise: Option<&'a FastNoiseLite>,
}

fn float_input(kind: &NodeKind, inputs: &[Value], index: usize) -> Result<f32, EvalError> {
    inputs[index].as_float().ok_or(EvalError::BadInput {
        kind: kind.name(),
        index,
        expected: DataCategory::Float,
        found: inputs[index].category(),
    })
}

/// Evaluates one executable kind against already-computed input values.
///
/// Seed-category kinds and structural kinds never appear as steps and
/// return [`EvalError::NotExecutable`].
pub fn evaluate(kind: &NodeKind, ctx: &EvalContext<'_>, inputs: &[Value]) -> Result<Value, EvalError> {
    Ok(match kind {
        NodeKind::X => Value::Float(ctx.x),
        NodeKind::Y => Value::Float(ctx.y),
        NodeKind::Z => Value::Float(ctx.z),

        NodeKind::Constant(v) => Value::Float(*v),
        NodeKind::IntConstant(v) => Value::Int(*v),
        NodeKind::BoolConstant(v) => Value::Bool(*v),
        NodeKind::ColorConstant(v) => Value::Color(*v),

        NodeKind::Binary(op) => {
            let a = float_input(kind, inputs, 0)?;
            let b = float_input(kind, inputs, 1)?;
            Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Min => a.min(b),
                BinaryOp::Max => a.max(b),
                BinaryOp::Pow => a.powf(b),
            })
        }
        NodeKind::Unary(op) => {
            let v = float_input(kind, inputs, 0)?;
            Value::Float(match op {
                UnaryOp::Negate => -v,
                UnaryOp::Abs => v.abs(),
                UnaryOp::Sqrt => v.max(0.0).sqrt(),
                UnaryOp::Floor => v.floor(),
                UnaryOp::Ceil => v.ceil(),
                UnaryOp::Sin => v.sin(),
                UnaryOp::Cos => v.cos(),
                UnaryOp::OneMinus => 1.0 - v,
            })
        }
        NodeKind::Clamp => {
            let v = float_input(kind, inputs, 0)?;
            let lo = float_input(kind, inputs, 1)?;
            let hi = float_input(kind, inputs, 2)?;
            Value::Float(v.max(lo).min(hi))
        }
        NodeKind::Lerp => {
            let a = float_input(kind, inputs, 0)?;
            let b = float_input(kind, inputs, 1)?;
            let t = float_input(kind, inputs, 2)?;
            Value::Float(a + (b - a) * t)
        }
        NodeKind::Select => {
            let cond = inputs[0].as_bool().ok_or(EvalError::BadInput {
                kind: kind.name(),
                index: 0,
                expected: DataCategory::Bool,
                found: inputs[0].category(),
            })?;
            let t = float_input(kind, inputs, 1)?;
            let f = float_input(kind, inputs, 2)?;
            Value::Float(if cond { t } else { f })
        }
        NodeKind::Compare(op) => {
            let a = float_input(kind, inputs, 0)?;
            let b = float_input(kind, inputs, 1)?;
            Value::Bool(match op {
                CompareOp::Less => a < b,
                CompareOp::LessEqual => a <= b,
                CompareOp::Greater => a > b,
                CompareOp::GreaterEqual => a >= b,
            })
        }

        NodeKind::Noise(params) => {
            let state = ctx.noise.ok_or(EvalError::MissingNoiseState)?;
            let x = float_input(kind, inputs, 0)?;
            let y = float_input(kind, inputs, 1)?;
            let z = float_input(kind, inputs, 2)?;
            Value::Float(state.get_noise_3d(x, y, z) * params.amplitude)
        }

        NodeKind::RoundToInt => {
            let v = float_input(kind, inputs, 0)?;
            Value::Int(v.round() as i32)
        }
        NodeKind::IntToFloat => {
            let v = inputs[0].as_int().ok_or(EvalError::BadInput {
                kind: kind.name(),
                index: 0,
                expected: DataCategory::Int,
                found: inputs[0].category(),
            })?;
            Value::Float(v as f32)
        }
        NodeKind::FlattenMaterial => {
            let v = float_input(kind, inputs, 0)?;
            Value::Material(v)
        }

        NodeKind::SeedConstant(_)
        | NodeKind::CombineSeeds
        | NodeKind::SeedRelay { .. }
        | NodeKind::Macro { .. }
        | NodeKind::MacroInput { .. }
        | NodeKind::MacroOutput { .. }
        | NodeKind::LocalVariableDeclaration { .. }
        | NodeKind::LocalVariableUsage { .. }
        | NodeKind::Output { .. } => return Err(EvalError::NotExecutable(kind.name())),
    })
}

/// Mixes two seeds into one, matching the C++ emission.
///
/// Used by lowering when folding seed chains, not per sample.
pub fn combine_seeds(a: i32, b: i32) -> i32 {
    let mut h = (a as u32).wrapping_mul(0x9e37_79b9);
    h ^= (b as u32).wrapping_add(0x85eb_ca6b).rotate_left(13);
    h = h.wrapping_mul(0xc2b2_ae35);
    (h ^ (h >> 16)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext<'static> {
        EvalContext {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            noise: None,
        }
    }

    #[test]
    fn coordinates() {
        assert_eq!(
            evaluate(&NodeKind::Y, &ctx(), &[]).unwrap(),
            Value::Float(2.0)
        );
    }

    #[test]
    fn binary_math() {
        let v = evaluate(
            &NodeKind::Binary(BinaryOp::Min),
            &ctx(),
            &[Value::Float(4.0), Value::Float(-1.0)],
        )
        .unwrap();
        assert_eq!(v, Value::Float(-1.0));
    }

    #[test]
    fn clamp_matches_min_max() {
        let v = evaluate(
            &NodeKind::Clamp,
            &ctx(),
            &[Value::Float(5.0), Value::Float(0.0), Value::Float(1.0)],
        )
        .unwrap();
        assert_eq!(v, Value::Float(1.0));
    }

    #[test]
    fn select_picks_branch() {
        let v = evaluate(
            &NodeKind::Select,
            &ctx(),
            &[Value::Bool(false), Value::Float(1.0), Value::Float(2.0)],
        )
        .unwrap();
        assert_eq!(v, Value::Float(2.0));
    }

    #[test]
    fn bad_category_reports_error() {
        let err = evaluate(
            &NodeKind::Unary(UnaryOp::Abs),
            &ctx(),
            &[Value::Bool(true)],
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::BadInput { index: 0, .. }));
    }

    #[test]
    fn structural_kinds_refuse_evaluation() {
        let err = evaluate(&NodeKind::SeedConstant(1), &ctx(), &[]).unwrap_err();
        assert!(matches!(err, EvalError::NotExecutable(_)));
    }

    #[test]
    fn combine_seeds_is_deterministic_and_asymmetric() {
        assert_eq!(combine_seeds(1, 2), combine_seeds(1, 2));
        assert_ne!(combine_seeds(1, 2), combine_seeds(2, 1));
    }
}
