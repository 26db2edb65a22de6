//! Error handling for the MIPS C compiler
//!
//! This module defines the workspace-wide error type and the diagnostic
//! reporter used by the statement translator. The reporter's error count is
//! the sticky error flag: once an error has been reported, no assembly is
//! produced for the translation unit.

use crate::source_loc::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Semantic error at {span}: {message}")]
    SemanticError {
        span: SourceSpan,
        message: String,
    },

    #[error("Type error at {span}: {message}")]
    TypeError {
        span: SourceSpan,
        message: String,
    },

    #[error("Code generation error: {message}")]
    CodegenError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: SourceSpan,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: SourceSpan) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String, span: SourceSpan) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span, self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Error reporter for collecting and displaying diagnostics
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, span: SourceSpan) -> &mut Diagnostic {
        self.error_count += 1;
        self.push(Diagnostic::error(message, span))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, span: SourceSpan) -> &mut Diagnostic {
        self.warning_count += 1;
        self.push(Diagnostic::warning(message, span))
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Error diagnostics only, in report order
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

impl CompilerError {
    /// Create a semantic error
    pub fn semantic_error(message: String, span: SourceSpan) -> Self {
        CompilerError::SemanticError { span, message }
    }

    /// Create a codegen error
    pub fn codegen_error(message: String) -> Self {
        CompilerError::CodegenError { message }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_loc::SourceLocation;

    fn span() -> SourceSpan {
        SourceSpan::new(
            SourceLocation::new("test.c", 1, 1),
            SourceLocation::new("test.c", 1, 5),
        )
    }

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error("Test error".to_string(), span());
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "Test error");
        assert_eq!(diag.span, span());
        assert_eq!(diag.to_string(), "test.c:1:1-5: error: Test error");
    }

    #[test]
    fn test_error_flag_is_sticky() {
        let mut reporter = ErrorReporter::new();
        assert!(!reporter.has_errors());

        reporter.warning("unused label".to_string(), span());
        assert!(!reporter.has_errors());

        reporter.error("break outside loop".to_string(), span());
        reporter.warning("another warning".to_string(), span());
        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.errors().count(), 1);
    }

    #[test]
    fn test_reported_diagnostic_accepts_notes() {
        let mut reporter = ErrorReporter::new();
        reporter
            .error("duplicate case value '3'".to_string(), span())
            .notes
            .push("previous case was here".to_string());

        assert_eq!(reporter.diagnostics()[0].notes.len(), 1);
        let diag = Diagnostic::error("x".to_string(), span()).with_note("n".to_string());
        assert_eq!(diag.notes, vec!["n".to_string()]);
    }

    #[test]
    fn test_summary() {
        let mut reporter = ErrorReporter::new();
        assert_eq!(reporter.summary(), "No errors or warnings");

        reporter.error("Error 1".to_string(), span());
        assert_eq!(reporter.summary(), "1 error");

        reporter.error("Error 2".to_string(), span());
        assert_eq!(reporter.summary(), "2 errors");

        reporter.warning("Warning 1".to_string(), span());
        assert_eq!(reporter.summary(), "2 errors and 1 warning");
    }
}
