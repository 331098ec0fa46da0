//! # marktree core
//!
//! A small, total parser for a Markdown subset: ATX headings, fenced code
//! blocks, `-`/`*`/`+` bullet lists, paragraphs, and inline code, bold, italic
//! and links.
//!
//! Input goes through two passes. The [`lexer`] turns text into a flat,
//! position-tagged token sequence; the [`parser`] folds that sequence into
//! a typed [`Document`]. Every input produces a document: malformed markup
//! degrades to plain text instead of failing.
//!
//! ## Quick Start
//!
//! ```rust
//! use marktree_core::{parse, Block};
//!
//! let doc = parse("# Hello World\n\nThis is a **paragraph**.");
//!
//! assert_eq!(doc.blocks().len(), 2);
//! assert!(matches!(doc.blocks()[0], Block::Heading(_)));
//! ```
//!
//! ## Diagnostics
//!
//! An unclosed code fence still parses (the rest of the input becomes its
//! code) but is reported:
//!
//! ```rust
//! use marktree_core::{parse_with_diagnostics, ParseErrorKind};
//!
//! let result = parse_with_diagnostics("```rust\nfn main() {}");
//!
//! assert_eq!(result.document.blocks().len(), 1);
//! assert_eq!(
//!     result.errors.iter().next().map(|e| e.kind),
//!     Some(ParseErrorKind::UnclosedCodeFence)
//! );
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use marktree_core::{parse, render_html, Theme};
//!
//! let html = render_html(&parse("*hi*"), &Theme::default());
//! assert!(html.contains("<em"));
//! ```

pub mod ast;
pub mod error;
pub mod inline;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod span;
pub mod style;

pub use ast::{Block, Document, Inline, NodeKind};
pub use error::{ConfigError, NodeError, ParseError, ParseErrorKind, ParseErrors};
pub use lexer::{tokenize, Token, TokenKind, Tokens};
pub use parser::{ParseResult, Parser};
pub use render::render_html;
pub use span::{Position, Span};
pub use style::{Style, Theme};

/// Tokenize and parse `input` in one call.
pub fn parse(input: &str) -> Document<'_> {
    Parser::new().parse(&tokenize(input))
}

/// Like [`parse`], also returning recovered diagnostics.
pub fn parse_with_diagnostics(input: &str) -> ParseResult<'_> {
    Parser::new().parse_with_diagnostics(&tokenize(input))
}
