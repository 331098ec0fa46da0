//! Source location tracking for tokens and AST nodes.
//!
//! Tokens carry a full [`Position`] (byte range plus line/column), while
//! AST nodes keep only the compact [`Span`] byte range.

use serde::Serialize;

/// A byte range in the source text.
///
/// Spans use byte offsets (not character offsets).
/// Both `start` and `end` are inclusive-exclusive: `[start, end)`.
///
/// # Example
///
/// ```rust
/// use marktree_core::span::Span;
///
/// let span = Span::new(0, 10);
/// assert_eq!(span.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span contains a byte offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Merge two spans into one covering both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Where a token sits in the source.
///
/// Offsets are bytes, `line` and `column` are 1-based and describe the
/// first character of the token. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub start_offset: u32,
    pub end_offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub const fn new(start_offset: u32, end_offset: u32, line: u32, column: u32) -> Self {
        Self {
            start_offset,
            end_offset,
            line,
            column,
        }
    }

    /// Project onto the byte range only.
    #[inline]
    pub const fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}
