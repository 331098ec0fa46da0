//! Inline markup recognition and the recursive inline parser.
//!
//! The same delimiter rules serve two callers: the lexer applies them to a
//! single line to classify inline tokens, and the parser applies them to
//! the text of a heading, paragraph or list item to build inline nodes.
//!
//! Rules, tried at the current position in this order (dispatch on the
//! current byte picks the one that can apply):
//!
//! 1. inline code: `` `code` ``, no backtick inside
//! 2. bold: `**text**`, content ends at the first `**`
//! 3. italic: `*text*`, no asterisk inside
//! 4. link: `[text](url)` or `[text](url "title")`
//!
//! Anything that matches no rule becomes text: the longest run without a
//! special character, or a single special character.
//!
//! Nesting depth is bounded by the rules themselves: bold ends at the first
//! `**`, italic holds no asterisk and link text holds no `]`, so no
//! container can hold another of its own kind and nesting is at most three
//! deep.

use std::borrow::Cow;
use std::ops::Range;

use memchr::{memchr, memchr3, memmem};

use crate::ast::{Bold, Inline, InlineCode, Italic, Link, Text};
use crate::span::Span;

/// Parse inline elements from text content.
///
/// `base_offset` is the byte offset of `text` in the source and is
/// added to every node span.
#[inline]
pub fn parse_inlines(text: &str, base_offset: u32) -> Vec<Inline<'_>> {
    if text.is_empty() {
        return Vec::new();
    }
    InlineParser::new(text, base_offset).parse()
}

/// Remembers the last forward search for one needle.
///
/// A forward search from `from` yields the first occurrence at or after
/// `from`, so a later search starting between `from` and that occurrence
/// has the same answer, and a failed search stays failed for any later
/// start. This keeps repeated failed matches from rescanning the line.
#[derive(Debug, Clone, Copy, Default)]
struct Memo {
    searched_from: Option<usize>,
    found: Option<usize>,
}

impl Memo {
    #[inline]
    fn find(&mut self, from: usize, search: impl FnOnce(usize) -> Option<usize>) -> Option<usize> {
        if let Some(searched_from) = self.searched_from {
            if from >= searched_from {
                match self.found {
                    None => return None,
                    Some(at) if at >= from => return Some(at),
                    Some(_) => {}
                }
            }
        }
        let found = search(from);
        self.searched_from = Some(from);
        self.found = found;
        found
    }
}

/// Byte ranges of a matched link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkMatch {
    pub text: Range<usize>,
    pub url: Range<usize>,
    pub title: Option<Range<usize>>,
    /// One past the closing parenthesis.
    pub end: usize,
}

/// Delimiter matchers over one scan region (a line or an inline string).
///
/// All positions are byte indices into the region.
pub(crate) struct Delimiters<'a> {
    bytes: &'a [u8],
    backtick: Memo,
    star: Memo,
    double_star: Memo,
    close_bracket: Memo,
    close_paren: Memo,
}

impl<'a> Delimiters<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            backtick: Memo::default(),
            star: Memo::default(),
            double_star: Memo::default(),
            close_bracket: Memo::default(),
            close_paren: Memo::default(),
        }
    }

    #[inline]
    fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
        bytes
            .get(from..)
            .and_then(|rest| memchr(needle, rest))
            .map(|i| from + i)
    }

    /// Inline code at `pos`; returns the content range.
    pub(crate) fn code_span(&mut self, pos: usize) -> Option<Range<usize>> {
        if self.bytes.get(pos) != Some(&b'`') {
            return None;
        }
        let bytes = self.bytes;
        let close = self
            .backtick
            .find(pos + 1, |from| Self::find_byte(bytes, b'`', from))?;
        (close > pos + 1).then(|| pos + 1..close)
    }

    /// Bold at `pos`; returns the content range (closer follows it).
    pub(crate) fn bold(&mut self, pos: usize) -> Option<Range<usize>> {
        if !self.bytes[pos..].starts_with(b"**") {
            return None;
        }
        let bytes = self.bytes;
        let close = self.double_star.find(pos + 2, |from| {
            memmem::find(&bytes[from..], b"**").map(|i| from + i)
        })?;
        (close > pos + 2).then(|| pos + 2..close)
    }

    /// Italic at `pos`; returns the content range (closer follows it).
    pub(crate) fn italic(&mut self, pos: usize) -> Option<Range<usize>> {
        if self.bytes.get(pos) != Some(&b'*') || self.bytes.get(pos + 1) == Some(&b'*') {
            return None;
        }
        let bytes = self.bytes;
        let close = self
            .star
            .find(pos + 1, |from| Self::find_byte(bytes, b'*', from))?;
        Some(pos + 1..close)
    }

    /// Link at `pos`.
    pub(crate) fn link(&mut self, pos: usize) -> Option<LinkMatch> {
        if self.bytes.get(pos) != Some(&b'[') {
            return None;
        }
        let bytes = self.bytes;
        let text_close = self
            .close_bracket
            .find(pos + 1, |from| Self::find_byte(bytes, b']', from))?;
        if text_close == pos + 1 || bytes.get(text_close + 1) != Some(&b'(') {
            return None;
        }
        let dest_start = text_close + 2;
        let dest_close = self
            .close_paren
            .find(dest_start, |from| Self::find_byte(bytes, b')', from))?;
        if dest_close == dest_start {
            return None;
        }

        let (url, title) = split_title(bytes, dest_start..dest_close);
        Some(LinkMatch {
            text: pos + 1..text_close,
            url,
            title,
            end: dest_close + 1,
        })
    }

    /// End of the text run starting at `pos`.
    ///
    /// Stops before the next backtick, asterisk or left bracket. A run that
    /// would be empty (the byte at `pos` is itself special) covers exactly
    /// that one byte, so every call makes progress.
    pub(crate) fn text_run_end(&self, pos: usize) -> usize {
        match memchr3(b'`', b'*', b'[', &self.bytes[pos..]) {
            Some(0) => pos + 1,
            Some(i) => pos + i,
            None => self.bytes.len(),
        }
    }
}

/// Split `url "title"` inside link parentheses.
fn split_title(bytes: &[u8], dest: Range<usize>) -> (Range<usize>, Option<Range<usize>>) {
    let inner = &bytes[dest.clone()];
    if inner.len() < 4 || inner[inner.len() - 1] != b'"' {
        return (dest, None);
    }
    let Some(quote) = memmem::find(inner, b" \"") else {
        return (dest, None);
    };
    let title_start = quote + 2;
    let title_end = inner.len() - 1;
    if quote == 0 || title_start > title_end {
        return (dest, None);
    }
    let url_end = inner[..quote]
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    if url_end == 0 {
        return (dest, None);
    }
    (
        dest.start..dest.start + url_end,
        Some(dest.start + title_start..dest.start + title_end),
    )
}

struct InlineParser<'a> {
    text: &'a str,
    delims: Delimiters<'a>,
    pos: usize,
    base_offset: u32,
}

impl<'a> InlineParser<'a> {
    #[inline]
    fn new(text: &'a str, base_offset: u32) -> Self {
        Self {
            text,
            delims: Delimiters::new(text.as_bytes()),
            pos: 0,
            base_offset,
        }
    }

    fn parse(mut self) -> Vec<Inline<'a>> {
        let mut inlines = Vec::with_capacity(8);

        while self.pos < self.text.len() {
            let parsed = match self.text.as_bytes()[self.pos] {
                b'`' => self.try_parse_code_span(),
                b'*' => self.try_parse_bold().or_else(|| self.try_parse_italic()),
                b'[' => self.try_parse_link(),
                _ => None,
            };
            let node = match parsed {
                Some(node) => node,
                None => self.parse_text_run(),
            };
            inlines.push(node);
        }

        inlines
    }

    #[inline(always)]
    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(
            self.base_offset + start as u32,
            self.base_offset + end as u32,
        )
    }

    fn parse_text_run(&mut self) -> Inline<'a> {
        let start = self.pos;
        let end = self.delims.text_run_end(start);
        self.pos = end;
        Text::new(Cow::Borrowed(&self.text[start..end]), self.span(start, end)).into()
    }

    fn try_parse_code_span(&mut self) -> Option<Inline<'a>> {
        let start = self.pos;
        let content = self.delims.code_span(start)?;
        let end = content.end + 1;
        self.pos = end;
        Some(InlineCode::new(Cow::Borrowed(&self.text[content]), self.span(start, end)).into())
    }

    fn try_parse_bold(&mut self) -> Option<Inline<'a>> {
        let start = self.pos;
        let content = self.delims.bold(start)?;
        let end = content.end + 2;
        let children = self.parse_nested(content);
        self.pos = end;
        Some(Bold::new(children, self.span(start, end)).into())
    }

    fn try_parse_italic(&mut self) -> Option<Inline<'a>> {
        let start = self.pos;
        let content = self.delims.italic(start)?;
        let end = content.end + 1;
        let children = self.parse_nested(content);
        self.pos = end;
        Some(Italic::new(children, self.span(start, end)).into())
    }

    fn try_parse_link(&mut self) -> Option<Inline<'a>> {
        let start = self.pos;
        let found = self.delims.link(start)?;
        let children = self.parse_nested(found.text);
        let url = Cow::Borrowed(&self.text[found.url]);
        let title = found.title.map(|t| Cow::Borrowed(&self.text[t]));
        self.pos = found.end;
        Some(Link::new(url, title, children, self.span(start, found.end)).into())
    }

    /// Recursively parse the content of a container.
    fn parse_nested(&self, range: Range<usize>) -> Vec<Inline<'a>> {
        let base_offset = self.base_offset + range.start as u32;
        InlineParser::new(&self.text[range], base_offset).parse()
    }
}
