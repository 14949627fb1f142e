//! Per-kind C++ expression emission.
//!
//! Emits the right-hand side of one generated statement; the surrounding
//! function scaffolding lives in the codegen crate.

use crate::kind::{BinaryOp, CompareOp, NodeKind, UnaryOp};

/// Formats an f32 as a C++ float literal.
pub fn float_literal(v: f32) -> String {
    if v == v.trunc() && v.is_finite() && v.abs() < 1e16 {
        format!("{:.1}f", v)
    } else {
        format!("{}f", v)
    }
}

/// The C++ type of a step's local variable.
pub fn cpp_type(kind: &NodeKind) -> &'static str {
    match kind.output_pins().first().map(|p| p.category) {
        Some(crate::DataCategory::Int) => "int32",
        Some(crate::DataCategory::Bool) => "bool",
        Some(crate::DataCategory::Color) => "FColor",
        Some(crate::DataCategory::Material) => "FVoxelMaterial",
        _ => "v_flt",
    }
}

/// Emits the C++ expression computing a kind from its input variable names.
///
/// `noise_var` names the baked noise-state member for noise kinds. Returns
/// `None` for structural and seed kinds, which have no emitted form.
pub fn cpp_expr(kind: &NodeKind, inputs: &[String], noise_var: Option<&str>) -> Option<String> {
    Some(match kind {
        NodeKind::X => "X".to_string(),
        NodeKind::Y => "Y".to_string(),
        NodeKind::Z => "Z".to_string(),

        NodeKind::Constant(v) => float_literal(*v),
        NodeKind::IntConstant(v) => v.to_string(),
        NodeKind::BoolConstant(v) => v.to_string(),
        NodeKind::ColorConstant(c) => format!(
            "FColor({}, {}, {}, {})",
            float_literal(c[0]),
            float_literal(c[1]),
            float_literal(c[2]),
            float_literal(c[3])
        ),

        NodeKind::Binary(op) => {
            let a = &inputs[0];
            let b = &inputs[1];
            match op {
                BinaryOp::Add => format!("{a} + {b}"),
                BinaryOp::Subtract => format!("{a} - {b}"),
                BinaryOp::Multiply => format!("{a} * {b}"),
                BinaryOp::Divide => format!("{a} / {b}"),
                BinaryOp::Min => format!("FMath::Min({a}, {b})"),
                BinaryOp::Max => format!("FMath::Max({a}, {b})"),
                BinaryOp::Pow => format!("FMath::Pow({a}, {b})"),
            }
        }
        NodeKind::Unary(op) => {
            let v = &inputs[0];
            match op {
                UnaryOp::Negate => format!("-{v}"),
                UnaryOp::Abs => format!("FMath::Abs({v})"),
                UnaryOp::Sqrt => format!("FMath::Sqrt(FMath::Max({v}, 0.0f))"),
                UnaryOp::Floor => format!("FMath::FloorToFloat({v})"),
                UnaryOp::Ceil => format!("FMath::CeilToFloat({v})"),
                UnaryOp::Sin => format!("FMath::Sin({v})"),
                UnaryOp::Cos => format!("FMath::Cos({v})"),
                UnaryOp::OneMinus => format!("1.0f - {v}"),
            }
        }
        NodeKind::Clamp => format!(
            "FMath::Clamp({}, {}, {})",
            inputs[0], inputs[1], inputs[2]
        ),
        NodeKind::Lerp => format!(
            "FMath::Lerp({}, {}, {})",
            inputs[0], inputs[1], inputs[2]
        ),
        NodeKind::Select => format!("{} ? {} : {}", inputs[0], inputs[1], inputs[2]),
        NodeKind::Compare(op) => {
            let a = &inputs[0];
            let b = &inputs[1];
            match op {
                CompareOp::Less => format!("{a} < {b}"),
                CompareOp::LessEqual => format!("{a} <= {b}"),
                CompareOp::Greater => format!("{a} > {b}"),
                CompareOp::GreaterEqual => format!("{a} >= {b}"),
            }
        }

        NodeKind::Noise(params) => {
            let state = noise_var.unwrap_or("Noise");
            format!(
                "{state}.GetNoise({}, {}, {}) * {}",
                inputs[0],
                inputs[1],
                inputs[2],
                float_literal(params.amplitude)
            )
        }

        NodeKind::RoundToInt => format!("FMath::RoundToInt({})", inputs[0]),
        NodeKind::IntToFloat => format!("static_cast<v_flt>({})", inputs[0]),
        NodeKind::FlattenMaterial => format!("FVoxelMaterial::CreateFromSingleIndex({})", inputs[0]),

        NodeKind::SeedConstant(_)
        | NodeKind::CombineSeeds
        | NodeKind::SeedRelay { .. }
        | NodeKind::Macro { .. }
        | NodeKind::MacroInput { .. }
        | NodeKind::MacroOutput { .. }
        | NodeKind::LocalVariableDeclaration { .. }
        | NodeKind::LocalVariableUsage { .. }
        | NodeKind::Output { .. } => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_literals() {
        assert_eq!(float_literal(1.0), "1.0f");
        assert_eq!(float_literal(-2.0), "-2.0f");
        assert_eq!(float_literal(1.5), "1.5f");
    }

    #[test]
    fn min_expression() {
        let e = cpp_expr(
            &NodeKind::Binary(BinaryOp::Min),
            &["v0".into(), "v1".into()],
            None,
        )
        .unwrap();
        assert_eq!(e, "FMath::Min(v0, v1)");
    }

    #[test]
    fn clamp_expression() {
        let e = cpp_expr(
            &NodeKind::Clamp,
            &["v0".into(), "v1".into(), "v2".into()],
            None,
        )
        .unwrap();
        assert_eq!(e, "FMath::Clamp(v0, v1, v2)");
    }

    #[test]
    fn noise_uses_state_name() {
        let kind = NodeKind::Noise(crate::kind::NoiseParams {
            algorithm: crate::kind::NoiseAlgorithm::Perlin,
            frequency: 0.01,
            amplitude: 2.0,
            resolved_seed: Some(7),
        });
        let e = cpp_expr(
            &kind,
            &["v0".into(), "v1".into(), "v2".into()],
            Some("Noise_0"),
        )
        .unwrap();
        assert!(e.starts_with("Noise_0.GetNoise("));
        assert!(e.ends_with("* 2.0f"));
    }

    #[test]
    fn structural_kinds_emit_nothing() {
        assert!(cpp_expr(&NodeKind::SeedConstant(1), &[], None).is_none());
    }
}
