//! Compile error taxonomy.

/// Errors produced while compiling one permutation.
///
/// `Structural` aborts the offending permutation only; `MacroRecursion`
/// and `Cycle` are fatal for the whole compile request.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Dangling reference, unresolved local variable, unconnected required
    /// pin, or similar authoring error.
    #[error("structural error: {0}")]
    Structural(String),

    /// A macro transitively references itself.
    #[error("macro recursion: {0}")]
    MacroRecursion(String),

    /// A dependency cycle survived seed-relay removal.
    #[error("cycle through {0}")]
    Cycle(String),
}

impl CompileError {
    /// True if the error poisons the whole compile request rather than a
    /// single permutation.
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, Self::MacroRecursion(_) | Self::Cycle(_))
    }
}
