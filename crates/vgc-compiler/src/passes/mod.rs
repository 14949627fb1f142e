//! The compilation passes, in the order the pipeline runs them.

mod constants;
mod local_variables;
mod macros;
mod min_max;
mod range_analysis;
mod seeds;

pub use constants::DisconnectRangeAnalysisConstantsPass;
pub use local_variables::ReplaceLocalVariablesPass;
pub use macros::InlineMacrosPass;
pub use min_max::ReplaceSmartMinMaxPass;
pub use range_analysis::RangeAnalysisPass;
pub use seeds::RemoveAllSeedNodesPass;
