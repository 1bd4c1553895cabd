//! Syntax diagnostics and the listener interface the front end reports them to.
//!
//! The lexer and parser never stop at the first problem. Every problem is
//! handed to an [`ErrorListener`]; [`Expression::parse`](crate::Expression::parse)
//! uses a [`BufferingErrorListener`] and decides afterwards whether the
//! collected diagnostics make the parse fail.

use std::fmt;

use crate::lexer::Position;

/// A single problem found while tokenizing or parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}:{} {}",
            self.position.line, self.position.column, self.message
        )
    }
}

/// Receives diagnostics from the lexer and the parser.
pub trait ErrorListener {
    fn syntax_error(&mut self, position: Position, message: String);
}

/// Listener that keeps every diagnostic, in the order reported.
#[derive(Debug, Default)]
pub struct BufferingErrorListener {
    diagnostics: Vec<SyntaxDiagnostic>,
}

impl BufferingErrorListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heard_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[SyntaxDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<SyntaxDiagnostic> {
        self.diagnostics
    }

    /// All diagnostics, one per line.
    pub fn errors_as_string(&self) -> String {
        join_diagnostics(&self.diagnostics)
    }
}

impl ErrorListener for BufferingErrorListener {
    fn syntax_error(&mut self, position: Position, message: String) {
        self.diagnostics.push(SyntaxDiagnostic { position, message });
    }
}

pub(crate) fn join_diagnostics(diagnostics: &[SyntaxDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
