//! Authored nodes and connections.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use vgc_ir::NodeKind;

/// Identifier of an authored node, unique within its graph.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Exposure record making a node's constant overridable by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    /// Graph-wide unique name the override is keyed by.
    pub unique_name: String,
    /// Human-facing name shown by the editing surface.
    pub display_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl Exposure {
    pub fn new(unique_name: impl Into<String>) -> Self {
        let unique_name = unique_name.into();
        Self {
            display_name: unique_name.replace('_', " "),
            unique_name,
            category: String::new(),
            tooltip: String::new(),
            priority: 0,
            metadata: IndexMap::new(),
        }
    }
}

/// One authored node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Display label; defaults to the kind name.
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Exposure>,
}

/// A directed edge from an output pin to an input pin.
///
/// At most one connection may feed a given input pin; the graph enforces
/// this on connect and on load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub from_pin: u32,
    pub to: NodeId,
    pub to_pin: u32,
}
