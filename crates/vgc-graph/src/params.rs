//! The generator parameter surface.
//!
//! Exposed nodes declare named, typed, user-overridable constants. The
//! surface is deduplicated by unique name; the same unique name appearing
//! with a different type or display name is an authoring error that is
//! reported but never auto-resolved.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use vgc_ir::{ErrorReporter, NodeKind};

use crate::node::Node;

/// The overridable type of an exposed node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Float,
    Int,
    Bool,
    Color,
    Seed,
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::Color => "Color",
            Self::Seed => "Seed",
        })
    }
}

/// One entry of the deduplicated parameter surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParameter {
    pub id: String,
    pub ty: ParameterType,
    pub name: String,
    pub category: String,
    pub tooltip: String,
    pub priority: i32,
    pub metadata: IndexMap<String, String>,
    pub default_value: String,
}

/// The parameter type of an exposable kind, or `None` if the kind cannot
/// be exposed.
pub fn parameter_type(kind: &NodeKind) -> Option<ParameterType> {
    match kind {
        NodeKind::Constant(_) => Some(ParameterType::Float),
        NodeKind::IntConstant(_) => Some(ParameterType::Int),
        NodeKind::BoolConstant(_) => Some(ParameterType::Bool),
        NodeKind::ColorConstant(_) => Some(ParameterType::Color),
        NodeKind::SeedConstant(_) | NodeKind::SeedRelay { .. } => Some(ParameterType::Seed),
        _ => None,
    }
}

/// Text rendering of an exposable kind's current value.
pub fn default_value_text(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Constant(v) => v.to_string(),
        NodeKind::IntConstant(v) => v.to_string(),
        NodeKind::BoolConstant(v) => v.to_string(),
        NodeKind::ColorConstant(c) => format!("{},{},{},{}", c[0], c[1], c[2], c[3]),
        NodeKind::SeedConstant(v) => v.to_string(),
        NodeKind::SeedRelay { default_seed, .. } => default_seed.to_string(),
        _ => String::new(),
    }
}

/// Parses an override text into a new kind carrying the overridden value.
///
/// The kind's shape is preserved; only the stored constant changes.
pub fn apply_override(kind: &NodeKind, text: &str) -> Result<NodeKind, String> {
    let parse_err = |ty: &str| format!("cannot parse {text:?} as {ty}");
    match kind {
        NodeKind::Constant(_) => text
            .trim()
            .parse::<f32>()
            .map(NodeKind::Constant)
            .map_err(|_| parse_err("Float")),
        NodeKind::IntConstant(_) => text
            .trim()
            .parse::<i32>()
            .map(NodeKind::IntConstant)
            .map_err(|_| parse_err("Int")),
        NodeKind::BoolConstant(_) => text
            .trim()
            .parse::<bool>()
            .map(NodeKind::BoolConstant)
            .map_err(|_| parse_err("Bool")),
        NodeKind::ColorConstant(_) => {
            let parts: Result<Vec<f32>, _> =
                text.split(',').map(|p| p.trim().parse::<f32>()).collect();
            match parts.as_deref() {
                Ok([r, g, b, a]) => Ok(NodeKind::ColorConstant([*r, *g, *b, *a])),
                _ => Err(parse_err("Color")),
            }
        }
        NodeKind::SeedConstant(_) => text
            .trim()
            .parse::<i32>()
            .map(NodeKind::SeedConstant)
            .map_err(|_| parse_err("Seed")),
        NodeKind::SeedRelay { name, .. } => text
            .trim()
            .parse::<i32>()
            .map(|seed| NodeKind::SeedRelay {
                name: name.clone(),
                default_seed: seed,
            })
            .map_err(|_| parse_err("Seed")),
        other => Err(format!("node kind {} is not exposable", other.name())),
    }
}

/// Collects the deduplicated parameter surface from a node list.
///
/// Collisions in unique name with a differing display name or type are
/// reported as errors; the first-declared entry wins.
pub fn collect_parameters(nodes: &[Node], reporter: &mut ErrorReporter) -> Vec<GeneratorParameter> {
    let mut by_id: IndexMap<String, GeneratorParameter> = IndexMap::new();

    for node in nodes {
        let Some(exposure) = &node.exposure else {
            continue;
        };
        let Some(ty) = parameter_type(&node.kind) else {
            reporter.error_on_node(
                node.name.clone(),
                format!("node kind {} cannot be exposed", node.kind.name()),
            );
            continue;
        };

        let parameter = GeneratorParameter {
            id: exposure.unique_name.clone(),
            ty,
            name: exposure.display_name.clone(),
            category: exposure.category.clone(),
            tooltip: exposure.tooltip.clone(),
            priority: exposure.priority,
            metadata: exposure.metadata.clone(),
            default_value: default_value_text(&node.kind),
        };

        match by_id.get(&parameter.id) {
            None => {
                by_id.insert(parameter.id.clone(), parameter);
            }
            Some(existing) => {
                if existing.name != parameter.name {
                    reporter.error(format!(
                        "parameters with same unique name but different display name: \
                         {} vs {} for {}",
                        parameter.name, existing.name, parameter.id
                    ));
                }
                if existing.ty != parameter.ty {
                    reporter.error(format!(
                        "parameters with same unique name but different type: \
                         {} vs {} for {}",
                        parameter.ty, existing.ty, parameter.id
                    ));
                }
            }
        }
    }

    by_id.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Exposure, NodeId};

    fn exposed(id: u32, unique: &str, display: &str, kind: NodeKind) -> Node {
        let mut exposure = Exposure::new(unique);
        exposure.display_name = display.into();
        Node {
            id: NodeId(id),
            name: format!("node_{id}"),
            kind,
            exposure: Some(exposure),
        }
    }

    #[test]
    fn dedup_keeps_first() {
        let nodes = vec![
            exposed(0, "Radius", "Radius", NodeKind::Constant(5.0)),
            exposed(1, "Radius", "Radius", NodeKind::Constant(9.0)),
        ];
        let mut reporter = ErrorReporter::new();
        let params = collect_parameters(&nodes, &mut reporter);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].default_value, "5");
        assert!(!reporter.has_errors());
    }

    #[test]
    fn type_collision_reports_error() {
        let nodes = vec![
            exposed(0, "Radius", "Radius", NodeKind::Constant(5.0)),
            exposed(1, "Radius", "Radius", NodeKind::IntConstant(5)),
        ];
        let mut reporter = ErrorReporter::new();
        let params = collect_parameters(&nodes, &mut reporter);
        assert_eq!(params.len(), 1);
        assert!(reporter.has_errors());
        assert!(reporter.diagnostics()[0].message.contains("different type"));
    }

    #[test]
    fn display_name_collision_reports_error() {
        let nodes = vec![
            exposed(0, "Radius", "Radius", NodeKind::Constant(5.0)),
            exposed(1, "Radius", "Inner Radius", NodeKind::Constant(2.0)),
        ];
        let mut reporter = ErrorReporter::new();
        collect_parameters(&nodes, &mut reporter);
        assert!(reporter.has_errors());
    }

    #[test]
    fn override_parses_per_type() {
        let kind = apply_override(&NodeKind::Constant(0.0), "2.5").unwrap();
        assert_eq!(kind, NodeKind::Constant(2.5));

        let kind = apply_override(&NodeKind::SeedConstant(0), "42").unwrap();
        assert_eq!(kind, NodeKind::SeedConstant(42));

        assert!(apply_override(&NodeKind::IntConstant(0), "not a number").is_err());
        assert!(apply_override(&NodeKind::Clamp, "1").is_err());
    }

    #[test]
    fn color_override() {
        let kind = apply_override(&NodeKind::ColorConstant([0.0; 4]), "1, 0.5, 0, 1").unwrap();
        assert_eq!(kind, NodeKind::ColorConstant([1.0, 0.5, 0.0, 1.0]));
    }
}
