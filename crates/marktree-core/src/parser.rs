//! Recursive-descent block parser.
//!
//! Consumes the lexer's token sequence strictly forward with one token of
//! lookahead and builds a [`Document`]. Parsing is total: every input
//! yields a document, and problems such as an unclosed code fence are
//! reported as recoverable diagnostics next to it.

use std::borrow::Cow;

use crate::ast::{Block, CodeBlock, Document, Heading, List, ListItem, Paragraph};
use crate::error::{ParseError, ParseErrors};
use crate::inline::parse_inlines;
use crate::lexer::{Token, TokenKind, Tokens};
use crate::span::Span;

/// Result type for parsing that includes recovered errors.
#[derive(Debug)]
pub struct ParseResult<'a> {
    /// The parsed document.
    pub document: Document<'a>,
    /// Diagnostics encountered during parsing.
    pub errors: ParseErrors,
}

impl<'a> ParseResult<'a> {
    /// Check if parsing completed without diagnostics.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Block parser. One instance parses one token sequence at a time.
#[derive(Debug, Default)]
pub struct Parser {
    /// Diagnostics collected during the current parse.
    errors: ParseErrors,
}

impl Parser {
    /// Create a new parser.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tokens into a document, discarding diagnostics.
    #[inline]
    pub fn parse<'a>(&mut self, tokens: &Tokens<'a>) -> Document<'a> {
        self.parse_with_diagnostics(tokens).document
    }

    /// Parse tokens into a document, returning diagnostics alongside it.
    pub fn parse_with_diagnostics<'a>(&mut self, tokens: &Tokens<'a>) -> ParseResult<'a> {
        self.errors = ParseErrors::new();

        let mut cursor = Cursor { tokens, pos: 0 };
        let blocks = self.parse_blocks(&mut cursor);

        tracing::debug!(
            blocks = blocks.len(),
            diagnostics = self.errors.len(),
            "parsed document"
        );

        ParseResult {
            document: Document::new(blocks, Span::new(0, tokens.source().len() as u32)),
            errors: std::mem::take(&mut self.errors),
        }
    }

    /// Record a diagnostic during parsing.
    #[inline]
    fn record_error(&mut self, error: ParseError) {
        tracing::warn!(%error, "recovered from malformed input");
        self.errors.push(error);
    }

    fn parse_blocks<'a>(&mut self, cursor: &mut Cursor<'_, 'a>) -> Vec<Block<'a>> {
        let mut blocks = Vec::with_capacity(16);

        while let Some(token) = cursor.peek() {
            let block = match token.kind {
                TokenKind::Eof => break,
                TokenKind::Heading { .. } => self.parse_heading(cursor),
                TokenKind::CodeBlock { .. } => self.parse_code_block(cursor),
                TokenKind::ListItem { .. } => self.parse_list(cursor),
                TokenKind::Newline => {
                    cursor.advance();
                    None
                }
                _ => self.parse_paragraph(cursor),
            };

            if let Some(block) = block {
                blocks.push(block);
            }
        }

        blocks
    }

    fn parse_heading<'a>(&mut self, cursor: &mut Cursor<'_, 'a>) -> Option<Block<'a>> {
        let token = cursor.advance()?;
        let TokenKind::Heading { level, text } = token.kind else {
            return None;
        };

        let span = token.position.span();
        let content = parse_inlines(text, cursor.tokens.offset_of(text));
        match Heading::new(level, content, span) {
            Ok(heading) => Some(heading.into()),
            Err(error) => {
                // Lexer only emits levels 1-6; keep the line as text if not
                tracing::warn!(%error, "heading rejected; keeping line as paragraph");
                let content = parse_inlines(token.raw, token.position.start_offset);
                Some(Paragraph::new(content, span).into())
            }
        }
    }

    fn parse_code_block<'a>(&mut self, cursor: &mut Cursor<'_, 'a>) -> Option<Block<'a>> {
        let token = cursor.advance()?;
        let TokenKind::CodeBlock {
            language,
            code,
            terminated,
        } = token.kind
        else {
            return None;
        };

        let span = token.position.span();
        if !terminated {
            self.record_error(ParseError::unclosed_code_fence(span));
        }

        Some(CodeBlock::new(language.map(Cow::Borrowed), Cow::Borrowed(code), span).into())
    }

    /// Group a contiguous run of list item tokens into one list.
    fn parse_list<'a>(&mut self, cursor: &mut Cursor<'_, 'a>) -> Option<Block<'a>> {
        let mut items: Vec<ListItem<'a>> = Vec::with_capacity(8);
        let mut span: Option<Span> = None;

        while let Some(token) = cursor.peek() {
            let TokenKind::ListItem { text, .. } = token.kind else {
                break;
            };
            cursor.advance();

            let item_span = token.position.span();
            let content = parse_inlines(text, cursor.tokens.offset_of(text));
            items.push(ListItem::new(content, item_span));
            span = Some(span.map_or(item_span, |s| s.merge(item_span)));
        }

        let span = span?;
        Some(List::new(false, items, span).into())
    }

    /// Collect the run of inline tokens up to the next block boundary and
    /// parse their combined text as one paragraph.
    fn parse_paragraph<'a>(&mut self, cursor: &mut Cursor<'_, 'a>) -> Option<Block<'a>> {
        let mut first: Option<&Token<'a>> = None;
        let mut last: Option<&Token<'a>> = None;

        while let Some(token) = cursor.peek() {
            if is_block_boundary(&token.kind) {
                break;
            }
            cursor.advance();
            if let Some(prev) = last {
                debug_assert_eq!(prev.position.end_offset, token.position.start_offset);
            }
            first.get_or_insert(token);
            last = Some(token);
        }

        let (first, last) = (first?, last?);
        let start = first.position.start_offset;
        let end = last.position.end_offset;

        // The run is contiguous, so its concatenated raw text is exactly
        // this slice of the source.
        let text = cursor.tokens.source()[start as usize..end as usize]
            .trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return None;
        }

        let span = Span::new(start, start + text.len() as u32);
        let content = parse_inlines(text, start);
        Some(Paragraph::new(content, span).into())
    }
}

/// Tokens that end a paragraph run.
#[inline]
fn is_block_boundary(kind: &TokenKind<'_>) -> bool {
    matches!(
        kind,
        TokenKind::Heading { .. }
            | TokenKind::CodeBlock { .. }
            | TokenKind::ListItem { .. }
            | TokenKind::Newline
            | TokenKind::Eof
    )
}

/// Forward-only position in a token sequence.
struct Cursor<'t, 'a> {
    tokens: &'t Tokens<'a>,
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    #[inline]
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    #[inline]
    fn advance(&mut self) -> Option<&'t Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }
}
