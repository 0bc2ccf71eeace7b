//! Compile-time error reporting and diagnostics.
//!
//! Every validator in this crate models its outcome as a value: a success
//! graph or a [`CompileError`] with a kind, message, and source span.
//! Failures propagate as `Result<_, Vec<CompileError>>` up to the pass
//! boundary rather than by unwinding, so "first error wins" ordering is
//! explicit and testable.
//!
//! # Design
//!
//! - `CompileError` — single diagnostic with primary and optional secondary spans
//! - `ErrorKind` — categorizes errors by the validation that raised them
//! - `Severity` — error or warning
//! - `DiagnosticFormatter` — formats diagnostics with source snippets
//! - `CompileFailure` — library-boundary wrapper for a failed pass

use relmap_ast::foundation::{SourceMap, Span};
use std::fmt;
use thiserror::Error;

/// Compilation diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this error
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary source location
    pub span: Span,
    /// Primary error message
    pub message: String,
    /// Additional labeled spans
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Category of compilation error.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    // Registry construction
    /// Two stores, mappings, or mapping-set entries share a name
    DuplicateDefinition = 0,
    /// An include or extends target names no known definition
    UnresolvedReference = 1,

    // Store inclusion graph construction
    /// A store includes itself directly
    SelfInclude = 2,
    /// A store includes the same target more than once
    DuplicateInclude = 3,

    // Cycle detection
    /// The store inclusion graph has a cycle
    CircularStoreInclude = 4,
    /// The mapping inclusion graph has a cycle
    CircularMappingInclude = 5,
    /// The substitution-resolved store graph has a cycle
    CircularStoreSubstitution = 6,

    // Extension legality
    /// An extends relationship crosses mapping kinds
    IllegalMappingInheritance = 7,

    /// Internal compiler error (bug in compiler)
    Internal = 8,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "duplicate definition",          // 0: DuplicateDefinition
    "unresolved reference",          // 1: UnresolvedReference
    "self include",                  // 2: SelfInclude
    "duplicate include",             // 3: DuplicateInclude
    "circular store include",        // 4: CircularStoreInclude
    "circular mapping include",      // 5: CircularMappingInclude
    "circular store substitution",   // 6: CircularStoreSubstitution
    "illegal mapping inheritance",   // 7: IllegalMappingInheritance
    "internal compiler error",       // 8: Internal
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Warning (definitions are valid but suspicious)
    Warning,
    /// Error (compilation cannot proceed)
    Error,
}

/// Secondary labeled span in a diagnostic.
///
/// Points to related declarations (e.g., "first declared here").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl CompileError {
    /// Create a new error diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Add a secondary labeled span.
    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    /// Add a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl ErrorKind {
    /// Human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES[self as usize]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity,
            self.kind.name(),
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation passes.
pub type PassResult<T> = Result<T, Vec<CompileError>>;

/// A failed compilation pass, for callers embedding the compiler behind a
/// `std::error::Error` boundary.
///
/// The committed program from the previous successful pass is untouched
/// when this is returned.
#[derive(Debug, Error)]
#[error("compilation failed with {} diagnostic(s)", .diagnostics.len())]
pub struct CompileFailure {
    /// The diagnostics of the failed pass, in the order found
    pub diagnostics: Vec<CompileError>,
}

impl CompileFailure {
    pub fn new(diagnostics: Vec<CompileError>) -> Self {
        Self { diagnostics }
    }
}

/// Formats diagnostics with source code context.
///
/// Produces error messages with the file path and line/column location, the
/// offending source line with `^^^` indicators, secondary labels, and notes.
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    /// Create a formatter over the compilation unit's sources.
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Format a diagnostic as a string with source context.
    pub fn format(&self, error: &CompileError) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}: {}: {}\n",
            error.severity,
            error.kind.name(),
            error.message
        ));

        let file_path = self.sources.file_path(&error.span);
        let (line, col) = self.sources.line_col(&error.span);
        output.push_str(&format!("  --> {}:{}:{}\n", file_path.display(), line, col));

        let file = self.sources.file(&error.span);
        if let Some(source_line) = file.line_text(line) {
            output.push_str("   |\n");
            output.push_str(&format!("{:3} | {}", line, source_line));
            if !source_line.ends_with('\n') {
                output.push('\n');
            }

            let start_col = col as usize;
            let span_len = (error.span.end - error.span.start) as usize;
            let end_col = (start_col + span_len).min(source_line.len() + 1);
            let underline = " ".repeat(start_col.saturating_sub(1))
                + &"^".repeat(end_col.saturating_sub(start_col).max(1));
            output.push_str(&format!("   | {}\n", underline));
        }

        for label in &error.labels {
            output.push_str(&format!("   = note: {}\n", label.message));
            let (label_line, label_col) = self.sources.line_col(&label.span);
            let label_path = self.sources.file_path(&label.span);
            output.push_str(&format!(
                "     at {}:{}:{}\n",
                label_path.display(),
                label_line,
                label_col
            ));
        }

        for note in &error.notes {
            output.push_str(&format!("   = help: {}\n", note));
        }

        output
    }

    /// Format multiple diagnostics separated by blank lines.
    pub fn format_all(&self, errors: &[CompileError]) -> String {
        errors
            .iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
