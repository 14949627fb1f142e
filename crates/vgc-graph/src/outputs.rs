//! Graph outputs and permutation resolution.
//!
//! A permutation is the set of output indices one specialized compiled
//! graph must compute. Permutation order is part of the public contract:
//! downstream lookup and generated code are keyed by the names derived
//! here, so the order must be stable across recompiles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use vgc_ir::DataCategory;

use crate::guid::Guid;

/// Index of the built-in `Value` output.
pub const VALUE_INDEX: u32 = 0;
/// Reserved index of the range-analysis output.
pub const RANGE_ANALYSIS_INDEX: u32 = 1;
/// First index available to custom outputs.
pub const CUSTOM_OUTPUTS_START: u32 = 2;

/// Name of the range-analysis output, used in permutation names.
pub const RANGE_ANALYSIS_NAME: &str = "RangeAnalysis";

/// One named, guid-identified graph output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub guid: Guid,
    pub category: DataCategory,
    /// Filled in by [`crate::Graph::outputs`]; stored value is ignored on load.
    #[serde(default)]
    pub index: u32,
}

impl Output {
    pub fn new(name: impl Into<String>, category: DataCategory) -> Self {
        Self {
            name: name.into(),
            guid: Guid::new_random(),
            category,
            index: 0,
        }
    }
}

/// The always-present outputs, at stable indices `0..CUSTOM_OUTPUTS_START`.
pub fn default_outputs() -> Vec<Output> {
    vec![
        Output {
            name: "Value".into(),
            guid: Guid::from_u128(0x76f3_0a1e_9c4d_0001),
            category: DataCategory::Float,
            index: VALUE_INDEX,
        },
        Output {
            name: RANGE_ANALYSIS_NAME.into(),
            guid: Guid::from_u128(0x76f3_0a1e_9c4d_0002),
            category: DataCategory::Float,
            index: RANGE_ANALYSIS_INDEX,
        },
    ]
}

/// A set of output indices compiled together into one specialized graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation(pub Vec<u32>);

impl Permutation {
    pub fn single(index: u32) -> Self {
        Self(vec![index])
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains(&index)
    }

    /// True if this permutation carries the range-analysis output.
    pub fn wants_range_analysis(&self) -> bool {
        self.contains(RANGE_ANALYSIS_INDEX)
    }

    /// Stable display name: the member output names concatenated in order.
    pub fn name(&self, outputs: &IndexMap<u32, Output>) -> String {
        let mut name = String::new();
        for index in &self.0 {
            match outputs.get(index) {
                Some(output) => name.push_str(&output.name),
                None => name.push_str(&format!("Unknown{index}")),
            }
        }
        name
    }

    /// The non-reserved outputs this permutation computes.
    pub fn computed_outputs(&self) -> impl Iterator<Item = u32> + '_ {
        self.0
            .iter()
            .copied()
            .filter(|&i| i != RANGE_ANALYSIS_INDEX)
    }
}

/// The default permutations every graph compiles: value only, and value
/// with range analysis.
pub fn default_permutations() -> Vec<Permutation> {
    vec![
        Permutation(vec![VALUE_INDEX]),
        Permutation(vec![VALUE_INDEX, RANGE_ANALYSIS_INDEX]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_indices_are_stable() {
        let defaults = default_outputs();
        assert_eq!(defaults[VALUE_INDEX as usize].name, "Value");
        assert_eq!(defaults[RANGE_ANALYSIS_INDEX as usize].name, "RangeAnalysis");
        assert_eq!(defaults.len() as u32, CUSTOM_OUTPUTS_START);
    }

    #[test]
    fn permutation_names_concatenate() {
        let mut outputs = IndexMap::new();
        for o in default_outputs() {
            outputs.insert(o.index, o);
        }
        assert_eq!(Permutation(vec![0]).name(&outputs), "Value");
        assert_eq!(Permutation(vec![0, 1]).name(&outputs), "ValueRangeAnalysis");
    }

    #[test]
    fn computed_outputs_skip_range_index() {
        let p = Permutation(vec![0, 1]);
        let computed: Vec<_> = p.computed_outputs().collect();
        assert_eq!(computed, vec![0]);
    }
}
