//! Authored voxel graph model.
//!
//! The editing surface builds a [`Graph`] of typed nodes and connections;
//! the compiler reads it (never mutates it) to build per-permutation
//! compilation copies. Graphs serialize to JSON, which is also the CLI's
//! interchange format.

mod guid;
mod node;
mod outputs;
mod params;

pub use guid::Guid;
pub use node::{Connection, Exposure, Node, NodeId};
pub use outputs::{
    default_outputs, default_permutations, Output, Permutation, CUSTOM_OUTPUTS_START,
    RANGE_ANALYSIS_INDEX, RANGE_ANALYSIS_NAME, VALUE_INDEX,
};
pub use params::{
    apply_override, collect_parameters, default_value_text, parameter_type, GeneratorParameter,
    ParameterType,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use vgc_ir::{DataCategory, ErrorReporter, NodeKind};

/// Errors from structural graph edits.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node id {0}")]
    UnknownNode(u32),

    #[error("pin {pin} out of range on node {node}")]
    PinOutOfRange { node: String, pin: u32 },

    #[error("category mismatch: {from} pin is {from_category}, {to} pin is {to_category}")]
    CategoryMismatch {
        from: String,
        from_category: DataCategory,
        to: String,
        to_category: DataCategory,
    },

    #[error("unknown macro {0:?}")]
    UnknownMacro(String),
}

/// Errors from loading a serialized graph.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid graph: {0}")]
    Invalid(String),
}

/// An authored graph: nodes, connections, custom outputs, and the macro
/// library referenced by its macro nodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub custom_outputs: Vec<Output>,
    #[serde(default)]
    pub macros: IndexMap<String, Graph>,
    #[serde(default)]
    next_node_id: u32,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a node labeled with its kind name.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let name = kind.name().to_string();
        self.add_node_named(kind, name)
    }

    /// Adds a node with an explicit label.
    pub fn add_node_named(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(Node {
            id,
            name: name.into(),
            kind,
            exposure: None,
        });
        id
    }

    /// Marks a node as exposed under the given record.
    pub fn expose(&mut self, id: NodeId, exposure: Exposure) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(GraphError::UnknownNode(id.0))?;
        node.exposure = Some(exposure);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Input pin categories of a node, resolving macro references against
    /// the macro library.
    pub fn input_pin_categories(&self, node: &Node) -> Result<Vec<DataCategory>, GraphError> {
        if let NodeKind::Macro { name } = &node.kind {
            let (inputs, _) = self.macro_signature(name)?;
            return Ok(inputs);
        }
        Ok(node.kind.input_pins().iter().map(|p| p.category).collect())
    }

    /// Output pin categories of a node, resolving macro references.
    pub fn output_pin_categories(&self, node: &Node) -> Result<Vec<DataCategory>, GraphError> {
        if let NodeKind::Macro { name } = &node.kind {
            let (_, outputs) = self.macro_signature(name)?;
            return Ok(outputs);
        }
        Ok(node.kind.output_pins().iter().map(|p| p.category).collect())
    }

    /// Pin interface of a macro, derived from the placeholder nodes of its
    /// body graph, ordered by placeholder index.
    pub fn macro_signature(
        &self,
        name: &str,
    ) -> Result<(Vec<DataCategory>, Vec<DataCategory>), GraphError> {
        let body = self
            .macros
            .get(name)
            .ok_or_else(|| GraphError::UnknownMacro(name.to_string()))?;

        let mut inputs: Vec<(u32, DataCategory)> = Vec::new();
        let mut outputs: Vec<(u32, DataCategory)> = Vec::new();
        for node in &body.nodes {
            match &node.kind {
                NodeKind::MacroInput { index, category } => inputs.push((*index, *category)),
                NodeKind::MacroOutput { index, category } => outputs.push((*index, *category)),
                _ => {}
            }
        }
        inputs.sort_by_key(|(i, _)| *i);
        outputs.sort_by_key(|(i, _)| *i);
        Ok((
            inputs.into_iter().map(|(_, c)| c).collect(),
            outputs.into_iter().map(|(_, c)| c).collect(),
        ))
    }

    /// Connects an output pin to an input pin, replacing whatever fed that
    /// input before. Categories must match.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_pin: u32,
        to: NodeId,
        to_pin: u32,
    ) -> Result<(), GraphError> {
        let from_node = self.node(from).ok_or(GraphError::UnknownNode(from.0))?;
        let to_node = self.node(to).ok_or(GraphError::UnknownNode(to.0))?;

        let from_categories = self.output_pin_categories(from_node)?;
        let to_categories = self.input_pin_categories(to_node)?;

        let from_category =
            *from_categories
                .get(from_pin as usize)
                .ok_or_else(|| GraphError::PinOutOfRange {
                    node: from_node.name.clone(),
                    pin: from_pin,
                })?;
        let to_category =
            *to_categories
                .get(to_pin as usize)
                .ok_or_else(|| GraphError::PinOutOfRange {
                    node: to_node.name.clone(),
                    pin: to_pin,
                })?;

        if from_category != to_category {
            return Err(GraphError::CategoryMismatch {
                from: from_node.name.clone(),
                from_category,
                to: to_node.name.clone(),
                to_category,
            });
        }

        self.connections
            .retain(|c| !(c.to == to && c.to_pin == to_pin));
        self.connections.push(Connection {
            from,
            from_pin,
            to,
            to_pin,
        });
        Ok(())
    }

    /// The connection feeding an input pin, if any.
    pub fn input_source(&self, to: NodeId, to_pin: u32) -> Option<(NodeId, u32)> {
        self.connections
            .iter()
            .find(|c| c.to == to && c.to_pin == to_pin)
            .map(|c| (c.from, c.from_pin))
    }

    /// All outputs keyed by index: defaults at their stable indices, then
    /// custom outputs in declaration order.
    pub fn outputs(&self) -> IndexMap<u32, Output> {
        let mut result = IndexMap::new();
        for output in default_outputs() {
            result.insert(output.index, output);
        }
        for (offset, custom) in self.custom_outputs.iter().enumerate() {
            let index = CUSTOM_OUTPUTS_START + offset as u32;
            let mut output = custom.clone();
            output.index = index;
            result.insert(index, output);
        }
        result
    }

    /// The permutation list this graph compiles: the defaults, then per
    /// custom output a singleton target plus — Float outputs only — a
    /// range-analysis-paired target.
    pub fn permutations(&self) -> Vec<Permutation> {
        let mut result = default_permutations();
        for (offset, custom) in self.custom_outputs.iter().enumerate() {
            let index = CUSTOM_OUTPUTS_START + offset as u32;
            result.push(Permutation::single(index));
            if custom.category == DataCategory::Float {
                result.push(Permutation(vec![index, RANGE_ANALYSIS_INDEX]));
            }
        }
        result
    }

    /// Names of all permutations, in resolution order.
    pub fn permutation_names(&self) -> Vec<String> {
        let outputs = self.outputs();
        self.permutations()
            .iter()
            .map(|p| p.name(&outputs))
            .collect()
    }

    /// Repairs custom output names and guids so they collide with neither
    /// the defaults nor each other: empty names get a fallback, duplicate
    /// names a numeric suffix, invalid or duplicate guids a fresh value.
    pub fn sanitize_outputs(&mut self) {
        let mut used_names: Vec<String> =
            default_outputs().iter().map(|o| o.name.clone()).collect();
        let mut used_guids: Vec<Guid> = default_outputs().iter().map(|o| o.guid).collect();

        for output in &mut self.custom_outputs {
            if !output.guid.is_valid() || used_guids.contains(&output.guid) {
                output.guid = Guid::new_random();
            }
            used_guids.push(output.guid);

            let mut name = sanitize_name(&output.name);
            if name.is_empty() {
                name = "CustomOutput".to_string();
            }
            let mut candidate = name.clone();
            let mut suffix = 0u32;
            while used_names.contains(&candidate) {
                suffix += 1;
                candidate = format!("{name}{suffix}");
            }
            output.name = candidate.clone();
            used_names.push(candidate);
        }
    }

    /// The deduplicated parameter surface of all exposed nodes.
    pub fn parameters(&self, reporter: &mut ErrorReporter) -> Vec<GeneratorParameter> {
        collect_parameters(&self.nodes, reporter)
    }

    /// Applies textual overrides to exposed nodes in place (editor-time
    /// mutation). Unknown names are ignored; parse failures are reported.
    pub fn apply_parameters(
        &mut self,
        overrides: &IndexMap<String, String>,
        reporter: &mut ErrorReporter,
    ) {
        for node in &mut self.nodes {
            let Some(exposure) = &node.exposure else {
                continue;
            };
            let Some(text) = overrides.get(&exposure.unique_name) else {
                continue;
            };
            match apply_override(&node.kind, text) {
                Ok(kind) => node.kind = kind,
                Err(message) => reporter.error_on_node(node.name.clone(), message),
            }
        }
    }

    /// Structural validation: every connection must reference existing
    /// nodes and in-range pins of equal category, every macro reference
    /// must resolve, and output terminals must point at declared outputs.
    pub fn validate(&self, reporter: &mut ErrorReporter) {
        let output_count = CUSTOM_OUTPUTS_START + self.custom_outputs.len() as u32;

        let mut seen_ids = Vec::new();
        for node in &self.nodes {
            if seen_ids.contains(&node.id) {
                reporter.error_on_node(node.name.clone(), format!("duplicate node id {}", node.id.0));
            }
            seen_ids.push(node.id);

            match &node.kind {
                NodeKind::Macro { name } => {
                    if !self.macros.contains_key(name) {
                        reporter.error_on_node(node.name.clone(), format!("unknown macro {name:?}"));
                    }
                }
                NodeKind::Output { index, .. } => {
                    if *index >= output_count || *index == RANGE_ANALYSIS_INDEX {
                        reporter.error_on_node(
                            node.name.clone(),
                            format!("output terminal references undeclared output {index}"),
                        );
                    }
                }
                _ => {}
            }
        }

        let mut seen_inputs: Vec<(NodeId, u32)> = Vec::new();
        for connection in &self.connections {
            let (Some(from_node), Some(to_node)) =
                (self.node(connection.from), self.node(connection.to))
            else {
                reporter.error(format!(
                    "connection references unknown node ({} -> {})",
                    connection.from.0, connection.to.0
                ));
                continue;
            };

            let key = (connection.to, connection.to_pin);
            if seen_inputs.contains(&key) {
                reporter.error_on_node(
                    to_node.name.clone(),
                    format!("input pin {} has multiple connections", connection.to_pin),
                );
            }
            seen_inputs.push(key);

            let from_categories = match self.output_pin_categories(from_node) {
                Ok(c) => c,
                Err(e) => {
                    reporter.error_on_node(from_node.name.clone(), e.to_string());
                    continue;
                }
            };
            let to_categories = match self.input_pin_categories(to_node) {
                Ok(c) => c,
                Err(e) => {
                    reporter.error_on_node(to_node.name.clone(), e.to_string());
                    continue;
                }
            };

            match (
                from_categories.get(connection.from_pin as usize),
                to_categories.get(connection.to_pin as usize),
            ) {
                (Some(a), Some(b)) if a == b => {}
                (Some(a), Some(b)) => {
                    reporter.error_on_node(
                        to_node.name.clone(),
                        format!(
                            "category mismatch on pin {}: {} vs {}",
                            connection.to_pin, a, b
                        ),
                    );
                }
                _ => {
                    reporter.error_on_node(
                        to_node.name.clone(),
                        format!(
                            "connection pin out of range ({} -> {})",
                            connection.from_pin, connection.to_pin
                        ),
                    );
                }
            }
        }

        for body in self.macros.values() {
            body.validate(reporter);
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Parses a graph from JSON, repairs output collisions, and validates it.
pub fn parse(source: &str) -> Result<Graph, ParseError> {
    let mut graph: Graph = serde_json::from_str(source)?;
    graph.next_node_id = graph
        .nodes
        .iter()
        .map(|n| n.id.0 + 1)
        .max()
        .unwrap_or_default();
    graph.sanitize_outputs();

    let mut reporter = ErrorReporter::new();
    graph.validate(&mut reporter);
    if reporter.has_errors() {
        let summary: Vec<String> = reporter
            .diagnostics()
            .iter()
            .map(|d| d.to_string())
            .collect();
        return Err(ParseError::Invalid(summary.join("; ")));
    }
    Ok(graph)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgc_ir::BinaryOp;

    #[test]
    fn connect_checks_categories() {
        let mut graph = Graph::new("test");
        let x = graph.add_node(NodeKind::X);
        let seed = graph.add_node(NodeKind::SeedConstant(1));
        let add = graph.add_node(NodeKind::Binary(BinaryOp::Add));

        assert!(graph.connect(x, 0, add, 0).is_ok());
        assert!(matches!(
            graph.connect(seed, 0, add, 1),
            Err(GraphError::CategoryMismatch { .. })
        ));
    }

    #[test]
    fn reconnect_replaces_previous_edge() {
        let mut graph = Graph::new("test");
        let x = graph.add_node(NodeKind::X);
        let y = graph.add_node(NodeKind::Y);
        let neg = graph.add_node(NodeKind::Unary(vgc_ir::UnaryOp::Negate));

        graph.connect(x, 0, neg, 0).unwrap();
        graph.connect(y, 0, neg, 0).unwrap();
        assert_eq!(graph.input_source(neg, 0), Some((y, 0)));
        assert_eq!(graph.connections.len(), 1);
    }

    #[test]
    fn permutation_counts_match_custom_outputs() {
        let mut graph = Graph::new("test");
        assert_eq!(graph.permutations().len(), 2);

        graph
            .custom_outputs
            .push(Output::new("Density", DataCategory::Float));
        graph
            .custom_outputs
            .push(Output::new("Biome", DataCategory::Int));
        graph.sanitize_outputs();

        // 2 defaults + (singleton + range pair) + singleton.
        let permutations = graph.permutations();
        assert_eq!(permutations.len(), 5);
        assert_eq!(
            graph.permutation_names(),
            vec![
                "Value",
                "ValueRangeAnalysis",
                "Density",
                "DensityRangeAnalysis",
                "Biome"
            ]
        );
    }

    #[test]
    fn sanitize_suffixes_colliding_names() {
        let mut graph = Graph::new("test");
        graph
            .custom_outputs
            .push(Output::new("Value", DataCategory::Float));
        graph
            .custom_outputs
            .push(Output::new("Height", DataCategory::Float));
        graph
            .custom_outputs
            .push(Output::new("Height", DataCategory::Float));
        graph.sanitize_outputs();

        let names: Vec<_> = graph.custom_outputs.iter().map(|o| o.name.clone()).collect();
        assert_eq!(names, vec!["Value1", "Height", "Height1"]);
    }

    #[test]
    fn sanitize_regenerates_duplicate_guids() {
        let mut graph = Graph::new("test");
        let mut a = Output::new("A", DataCategory::Float);
        let mut b = Output::new("B", DataCategory::Float);
        a.guid = Guid::from_u128(7);
        b.guid = Guid::from_u128(7);
        graph.custom_outputs.push(a);
        graph.custom_outputs.push(b);
        graph.sanitize_outputs();
        assert_ne!(graph.custom_outputs[0].guid, graph.custom_outputs[1].guid);
    }

    #[test]
    fn json_round_trip() {
        let mut graph = Graph::new("round_trip");
        let x = graph.add_node(NodeKind::X);
        let out = graph.add_node(NodeKind::Output {
            index: VALUE_INDEX,
            category: DataCategory::Float,
        });
        graph.connect(x, 0, out, 0).unwrap();

        let text = graph.to_json();
        let back = parse(&text).unwrap();
        assert_eq!(back.nodes.len(), 2);
        assert_eq!(back.connections.len(), 1);
        assert_eq!(back.name, "round_trip");
    }

    #[test]
    fn parse_rejects_category_mismatch() {
        let mut graph = Graph::new("bad");
        let seed = graph.add_node(NodeKind::SeedConstant(1));
        let neg = graph.add_node(NodeKind::Unary(vgc_ir::UnaryOp::Negate));
        // Bypass connect() to build an illegal edge.
        graph.connections.push(Connection {
            from: seed,
            from_pin: 0,
            to: neg,
            to_pin: 0,
        });
        let text = graph.to_json();
        assert!(matches!(parse(&text), Err(ParseError::Invalid(_))));
    }

    #[test]
    fn macro_signature_orders_by_index() {
        let mut body = Graph::new("macro_body");
        body.add_node(NodeKind::MacroInput {
            index: 1,
            category: DataCategory::Seed,
        });
        body.add_node(NodeKind::MacroInput {
            index: 0,
            category: DataCategory::Float,
        });
        body.add_node(NodeKind::MacroOutput {
            index: 0,
            category: DataCategory::Float,
        });

        let mut graph = Graph::new("test");
        graph.macros.insert("m".into(), body);
        let (inputs, outputs) = graph.macro_signature("m").unwrap();
        assert_eq!(inputs, vec![DataCategory::Float, DataCategory::Seed]);
        assert_eq!(outputs, vec![DataCategory::Float]);
    }
}
