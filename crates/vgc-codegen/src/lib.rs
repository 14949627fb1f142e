//! C++ source translation.
//!
//! Renders a compiled permutation bundle as a header/body pair declaring
//! one generator class: baked noise states become members initialized in
//! the constructor, and each target becomes a method evaluating its step
//! list as sequential typed locals. The emission is text-only — nothing
//! here is ever re-parsed.

use std::fmt::Write;

use vgc_ir::cpp::{cpp_expr, cpp_type, float_literal};
use vgc_ir::{CompiledGraph, CompiledGraphBundle, NodeKind};

/// Errors from source translation.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A step kind with no C++ form reached codegen.
    #[error("step {label} ({kind}) has no C++ form")]
    NotEmittable { label: String, kind: &'static str },

    /// A target computes no outputs.
    #[error("target {0} has no outputs")]
    NoOutputs(String),
}

/// A generated header/body pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CppSource {
    pub header: String,
    pub body: String,
}

/// Generates C++ for one compiled bundle.
pub struct CppCodeGenerator<'a> {
    bundle: &'a CompiledGraphBundle,
    class_name: String,
}

impl<'a> CppCodeGenerator<'a> {
    pub fn new(bundle: &'a CompiledGraphBundle, graph_name: &str) -> Self {
        Self {
            bundle,
            class_name: format!("FVoxelGenerated_{}", sanitize_identifier(graph_name)),
        }
    }

    /// Renders the header and body.
    pub fn generate(&self, header_name: &str) -> Result<CppSource, CodegenError> {
        Ok(CppSource {
            header: self.generate_header()?,
            body: self.generate_body(header_name)?,
        })
    }

    fn generate_header(&self) -> Result<String, CodegenError> {
        let mut code = String::new();
        code.push_str("// Generated by the voxel graph compiler. DO NOT EDIT.\n\n");
        code.push_str("#pragma once\n\n");
        code.push_str("#include \"CoreMinimal.h\"\n");
        code.push_str("#include \"FastNoise.h\"\n\n");

        let _ = writeln!(code, "class {}", self.class_name);
        code.push_str("{\npublic:\n");
        let _ = writeln!(code, "\texplicit {}(int32 Seed);\n", self.class_name);

        for (name, graph) in self.bundle.iter() {
            let _ = writeln!(
                code,
                "\tv_flt Generate{}(v_flt X, v_flt Y, v_flt Z) const;",
                sanitize_identifier(name)
            );
            if let Some(range) = &graph.value_range {
                let _ = writeln!(
                    code,
                    "\t// Static bounds: [{}, {}]",
                    float_literal(range.min),
                    float_literal(range.max)
                );
            }
        }

        code.push_str("\nprivate:\n");
        for (name, graph) in self.bundle.iter() {
            for index in 0..graph.noise_state_count() {
                let _ = writeln!(
                    code,
                    "\tFastNoise {};",
                    noise_member(name, index as u32)
                );
            }
        }
        code.push_str("};\n");
        Ok(code)
    }

    fn generate_body(&self, header_name: &str) -> Result<String, CodegenError> {
        let mut code = String::new();
        code.push_str("// Generated by the voxel graph compiler. DO NOT EDIT.\n\n");
        let _ = writeln!(code, "#include \"{header_name}\"\n");

        // Constructor: bake every noise state from its resolved seed.
        let _ = writeln!(code, "{0}::{0}(int32 Seed)", self.class_name);
        code.push_str("{\n");
        for (name, graph) in self.bundle.iter() {
            for step in &graph.steps {
                let (NodeKind::Noise(params), Some(state)) = (&step.kind, step.noise_state) else {
                    continue;
                };
                let member = noise_member(name, state);
                let _ = writeln!(
                    code,
                    "\t{member}.SetSeed(Seed ^ {});",
                    params.resolved_seed.unwrap_or_default()
                );
                let _ = writeln!(
                    code,
                    "\t{member}.SetFrequency({});",
                    float_literal(params.frequency)
                );
            }
        }
        code.push_str("}\n");

        for (name, graph) in self.bundle.iter() {
            code.push('\n');
            code.push_str(&self.generate_target(name, graph)?);
        }
        Ok(code)
    }

    fn generate_target(&self, name: &str, graph: &CompiledGraph) -> Result<String, CodegenError> {
        let mut code = String::new();
        let _ = writeln!(
            code,
            "v_flt {}::Generate{}(v_flt X, v_flt Y, v_flt Z) const",
            self.class_name,
            sanitize_identifier(name)
        );
        code.push_str("{\n");

        for step in &graph.steps {
            let inputs: Vec<String> = step.inputs.iter().map(|s| format!("v{s}")).collect();
            let noise_var = step.noise_state.map(|state| noise_member(name, state));
            let expr = cpp_expr(&step.kind, &inputs, noise_var.as_deref()).ok_or_else(|| {
                CodegenError::NotEmittable {
                    label: step.label.clone(),
                    kind: step.kind.name(),
                }
            })?;
            let _ = writeln!(
                code,
                "\tconst {} v{} = {};",
                cpp_type(&step.kind),
                step.output,
                expr
            );
        }

        let (_, slot) = graph
            .outputs
            .first()
            .ok_or_else(|| CodegenError::NoOutputs(name.to_string()))?;
        let _ = writeln!(code, "\treturn v{slot};");
        code.push_str("}\n");
        Ok(code)
    }
}

fn sanitize_identifier(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

fn noise_member(target: &str, state: u32) -> String {
    format!("Noise_{}_{state}", sanitize_identifier(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgc_ir::{BinaryOp, CompiledGraph, CompiledGraphBundle, Step};

    fn simple_bundle() -> CompiledGraphBundle {
        let mut bundle = CompiledGraphBundle::new();
        bundle.insert(CompiledGraph {
            name: "Value".into(),
            steps: vec![
                Step {
                    kind: NodeKind::X,
                    inputs: vec![],
                    output: 0,
                    label: "X".into(),
                    noise_state: None,
                },
                Step {
                    kind: NodeKind::Constant(2.0),
                    inputs: vec![],
                    output: 1,
                    label: "Two".into(),
                    noise_state: None,
                },
                Step {
                    kind: NodeKind::Binary(BinaryOp::Multiply),
                    inputs: vec![0, 1],
                    output: 2,
                    label: "Multiply".into(),
                    noise_state: None,
                },
            ],
            variables_buffer_size: 3,
            outputs: vec![(0, 2)],
            value_range: None,
        });
        bundle
    }

    #[test]
    fn header_declares_class_and_methods() {
        let bundle = simple_bundle();
        let source = CppCodeGenerator::new(&bundle, "Hills")
            .generate("VoxelGenerated_Hills.h")
            .unwrap();
        assert!(source.header.contains("class FVoxelGenerated_Hills"));
        assert!(source
            .header
            .contains("v_flt GenerateValue(v_flt X, v_flt Y, v_flt Z) const;"));
    }

    #[test]
    fn body_emits_steps_in_order() {
        let bundle = simple_bundle();
        let source = CppCodeGenerator::new(&bundle, "Hills")
            .generate("VoxelGenerated_Hills.h")
            .unwrap();
        assert!(source.body.contains("const v_flt v0 = X;"));
        assert!(source.body.contains("const v_flt v1 = 2.0f;"));
        assert!(source.body.contains("const v_flt v2 = v0 * v1;"));
        assert!(source.body.contains("return v2;"));

        let v0 = source.body.find("const v_flt v0").unwrap();
        let v2 = source.body.find("const v_flt v2").unwrap();
        assert!(v0 < v2);
    }

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(sanitize_identifier("My Graph"), "My_Graph");
        assert_eq!(sanitize_identifier("3d"), "_3d");
    }
}
