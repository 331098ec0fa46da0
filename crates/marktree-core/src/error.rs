//! Error and diagnostic types.
//!
//! Parsing itself is total: malformed markup degrades to text and never
//! produces an error. What remains are recoverable [`ParseError`]
//! diagnostics, node factory validation errors, and theme loading errors.

use serde::Serialize;
use thiserror::Error;

use crate::span::Span;

/// Error kinds for categorizing parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    /// A code fence was opened but never closed; the rest of the input
    /// became its code.
    UnclosedCodeFence,
}

/// A recoverable diagnostic with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}{}", at_bytes(.span))]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,
    /// Source location where the problem was found
    pub span: Option<Span>,
    /// Error categorization
    pub kind: ParseErrorKind,
}

fn at_bytes(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at bytes {}..{}", span.start, span.end),
        None => String::new(),
    }
}

impl ParseError {
    /// Create an error for a code fence without a closing line.
    pub fn unclosed_code_fence(span: Span) -> Self {
        Self {
            message: "unclosed code fence; remaining input treated as code".to_string(),
            span: Some(span),
            kind: ParseErrorKind::UnclosedCodeFence,
        }
    }
}

/// A collection of diagnostics encountered during parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create an empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if any errors were collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Rejected by a node constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("heading level {0} is outside 1..=6")]
    InvalidHeadingLevel(u8),
}

/// A theme document that could not be read at all.
///
/// Individual bad attributes never produce this; they fall back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("theme is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_span() {
        let err = ParseError::unclosed_code_fence(Span::new(3, 9));
        assert_eq!(
            err.to_string(),
            "unclosed code fence; remaining input treated as code at bytes 3..9"
        );
    }

    #[test]
    fn test_collection_iteration() {
        let mut errors = ParseErrors::new();
        assert!(errors.is_empty());
        errors.push(ParseError::unclosed_code_fence(Span::new(0, 4)));
        errors.push(ParseError::unclosed_code_fence(Span::new(9, 12)));
        assert_eq!(errors.len(), 2);
        let spans: Vec<_> = errors.iter().filter_map(|e| e.span).collect();
        assert_eq!(spans, vec![Span::new(0, 4), Span::new(9, 12)]);
        let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ParseErrorKind::UnclosedCodeFence; 2]);
    }

    #[test]
    fn test_node_error_message() {
        assert_eq!(
            NodeError::InvalidHeadingLevel(7).to_string(),
            "heading level 7 is outside 1..=6"
        );
    }
}
