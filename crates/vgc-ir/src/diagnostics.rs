//! Structured compile diagnostics.
//!
//! Diagnostics are data collected into a reporter and handed across the
//! compiler boundary; they are never raised as panics.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    /// The compiler itself misbehaved (e.g. the optimized run failed where
    /// the non-optimized run succeeded). Always surfaced to the user.
    InternalError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::InternalError => "InternalError",
        })
    }
}

/// One diagnostic message, optionally anchored to a source node label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub node: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "[{}] {} (node: {})", self.severity, self.message, node),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Collects diagnostics across a compile request.
#[derive(Clone, Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Info,
            message: message.into(),
            node: None,
        });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            node: None,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            node: None,
        });
    }

    pub fn error_on_node(&mut self, node: impl Into<String>, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            node: Some(node.into()),
        });
    }

    pub fn internal_error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::InternalError,
            message: message.into(),
            node: None,
        });
    }

    /// True if any Error or InternalError was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d.severity, Severity::Error | Severity::InternalError))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Moves all diagnostics out of `other` into `self`.
    pub fn absorb(&mut self, other: ErrorReporter) {
        self.diagnostics.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_ignores_warnings() {
        let mut reporter = ErrorReporter::new();
        reporter.warning("just a warning");
        reporter.info("note");
        assert!(!reporter.has_errors());
        reporter.error("broken");
        assert!(reporter.has_errors());
    }

    #[test]
    fn internal_error_counts_as_error() {
        let mut reporter = ErrorReporter::new();
        reporter.internal_error("optimizer regressed");
        assert!(reporter.has_errors());
    }

    #[test]
    fn display_with_node() {
        let d = Diagnostic {
            severity: Severity::Error,
            message: "unresolved local variable".into(),
            node: Some("Get_Height".into()),
        };
        assert_eq!(
            d.to_string(),
            "[Error] unresolved local variable (node: Get_Height)"
        );
    }

    #[test]
    fn absorb_concatenates() {
        let mut a = ErrorReporter::new();
        a.info("first");
        let mut b = ErrorReporter::new();
        b.error("second");
        a.absorb(b);
        assert_eq!(a.diagnostics().len(), 2);
        assert!(a.has_errors());
    }
}
