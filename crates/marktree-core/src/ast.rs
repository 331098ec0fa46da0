//! Abstract Syntax Tree types for marktree documents.
//!
//! The AST is designed to be:
//!
//! - **Closed**: block and inline content are separate enums, so a
//!   paragraph can never hold a list and a list can only hold list items
//! - **Immutable**: fields are private; nodes are built through their
//!   constructors and only read afterwards
//! - **Zero-copy**: text is a `Cow<'a, str>` borrowed from the input, and
//!   `into_owned` detaches a tree from it
//! - **Span-tracked**: every node records its byte range in the source

use std::borrow::Cow;

use serde::Serialize;

use crate::error::NodeError;
use crate::span::Span;

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = Cow<'a, str>;

/// The kind of a node, used to select styles and for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    /// Carries the heading level (1-6).
    Heading(u8),
    Paragraph,
    CodeBlock,
    InlineCode,
    Text,
    Bold,
    Italic,
    Link,
    List,
    ListItem,
}

impl NodeKind {
    /// Stable lowercase name, matching the style configuration keys.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Heading(_) => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::InlineCode => "inlineCode",
            NodeKind::Text => "text",
            NodeKind::Bold => "bold",
            NodeKind::Italic => "italic",
            NodeKind::Link => "link",
            NodeKind::List => "list",
            NodeKind::ListItem => "listItem",
        }
    }
}

/// A parsed document: the root of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document<'a> {
    blocks: Vec<Block<'a>>,
    span: Span,
}

impl<'a> Document<'a> {
    pub fn new(blocks: Vec<Block<'a>>, span: Span) -> Self {
        Self { blocks, span }
    }

    /// Content blocks in document order.
    pub fn blocks(&self) -> &[Block<'a>] {
        &self.blocks
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::Document
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Copy every borrowed string so the tree no longer borrows the input.
    pub fn into_owned(self) -> Document<'static> {
        Document {
            blocks: self.blocks.into_iter().map(Block::into_owned).collect(),
            span: self.span,
        }
    }
}

/// Block-level AST nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block<'a> {
    /// Section heading (levels 1-6).
    Heading(Heading<'a>),
    /// Text paragraph with inline formatting.
    Paragraph(Paragraph<'a>),
    /// Fenced code block with optional language.
    CodeBlock(CodeBlock<'a>),
    /// Run of list items.
    List(List<'a>),
}

impl<'a> Block<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Block::Heading(h) => NodeKind::Heading(h.level),
            Block::Paragraph(_) => NodeKind::Paragraph,
            Block::CodeBlock(_) => NodeKind::CodeBlock,
            Block::List(_) => NodeKind::List,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Block::Heading(h) => h.span,
            Block::Paragraph(p) => p.span,
            Block::CodeBlock(c) => c.span,
            Block::List(l) => l.span,
        }
    }

    pub fn into_owned(self) -> Block<'static> {
        match self {
            Block::Heading(h) => Block::Heading(h.into_owned()),
            Block::Paragraph(p) => Block::Paragraph(p.into_owned()),
            Block::CodeBlock(c) => Block::CodeBlock(c.into_owned()),
            Block::List(l) => Block::List(l.into_owned()),
        }
    }
}

/// Inline-level AST nodes (within paragraphs, headings, list items and
/// other inline containers).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline<'a> {
    /// Plain text content.
    Text(Text<'a>),
    /// Inline code (`code`), never parsed for markup.
    InlineCode(InlineCode<'a>),
    /// Strong text (**bold**).
    Bold(Bold<'a>),
    /// Emphasized text (*italic*).
    Italic(Italic<'a>),
    /// Hyperlink with label and URL.
    Link(Link<'a>),
}

impl<'a> Inline<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Inline::Text(_) => NodeKind::Text,
            Inline::InlineCode(_) => NodeKind::InlineCode,
            Inline::Bold(_) => NodeKind::Bold,
            Inline::Italic(_) => NodeKind::Italic,
            Inline::Link(_) => NodeKind::Link,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Inline::Text(t) => t.span,
            Inline::InlineCode(c) => c.span,
            Inline::Bold(b) => b.span,
            Inline::Italic(i) => i.span,
            Inline::Link(l) => l.span,
        }
    }

    pub fn into_owned(self) -> Inline<'static> {
        match self {
            Inline::Text(t) => Inline::Text(t.into_owned()),
            Inline::InlineCode(c) => Inline::InlineCode(c.into_owned()),
            Inline::Bold(b) => Inline::Bold(b.into_owned()),
            Inline::Italic(i) => Inline::Italic(i.into_owned()),
            Inline::Link(l) => Inline::Link(l.into_owned()),
        }
    }
}

fn owned_inlines(children: Vec<Inline<'_>>) -> Vec<Inline<'static>> {
    children.into_iter().map(Inline::into_owned).collect()
}

fn owned_str(s: CowStr<'_>) -> CowStr<'static> {
    Cow::Owned(s.into_owned())
}

/// Section heading with level and inline content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading<'a> {
    level: u8,
    children: Vec<Inline<'a>>,
    span: Span,
}

impl<'a> Heading<'a> {
    /// Fails when `level` is outside 1..=6.
    pub fn new(level: u8, children: Vec<Inline<'a>>, span: Span) -> Result<Self, NodeError> {
        if !(1..=6).contains(&level) {
            return Err(NodeError::InvalidHeadingLevel(level));
        }
        Ok(Self {
            level,
            children,
            span,
        })
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn children(&self) -> &[Inline<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> Heading<'static> {
        Heading {
            level: self.level,
            children: owned_inlines(self.children),
            span: self.span,
        }
    }
}

/// Text paragraph containing inline elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph<'a> {
    children: Vec<Inline<'a>>,
    span: Span,
}

impl<'a> Paragraph<'a> {
    pub fn new(children: Vec<Inline<'a>>, span: Span) -> Self {
        Self { children, span }
    }

    pub fn children(&self) -> &[Inline<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> Paragraph<'static> {
        Paragraph {
            children: owned_inlines(self.children),
            span: self.span,
        }
    }
}

/// Fenced code block with syntax highlighting hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock<'a> {
    language: Option<CowStr<'a>>,
    code: CowStr<'a>,
    span: Span,
}

impl<'a> CodeBlock<'a> {
    /// An empty or all-whitespace language becomes `None`.
    pub fn new(language: Option<CowStr<'a>>, code: CowStr<'a>, span: Span) -> Self {
        let language = language.filter(|lang| !lang.trim().is_empty());
        Self {
            language,
            code,
            span,
        }
    }

    /// Language identifier (e.g., "rust", "python").
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Verbatim code content.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> CodeBlock<'static> {
        CodeBlock {
            language: self.language.map(owned_str),
            code: owned_str(self.code),
            span: self.span,
        }
    }
}

/// An unordered (or, in principle, ordered) list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List<'a> {
    ordered: bool,
    items: Vec<ListItem<'a>>,
    span: Span,
}

impl<'a> List<'a> {
    pub fn new(ordered: bool, items: Vec<ListItem<'a>>, span: Span) -> Self {
        Self {
            ordered,
            items,
            span,
        }
    }

    pub fn ordered(&self) -> bool {
        self.ordered
    }

    pub fn items(&self) -> &[ListItem<'a>] {
        &self.items
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> List<'static> {
        List {
            ordered: self.ordered,
            items: self.items.into_iter().map(ListItem::into_owned).collect(),
            span: self.span,
        }
    }
}

/// A single list item with inline content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem<'a> {
    children: Vec<Inline<'a>>,
    span: Span,
}

impl<'a> ListItem<'a> {
    pub fn new(children: Vec<Inline<'a>>, span: Span) -> Self {
        Self { children, span }
    }

    pub fn children(&self) -> &[Inline<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::ListItem
    }

    pub fn into_owned(self) -> ListItem<'static> {
        ListItem {
            children: owned_inlines(self.children),
            span: self.span,
        }
    }
}

/// Plain text content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text<'a> {
    value: CowStr<'a>,
    span: Span,
}

impl<'a> Text<'a> {
    pub fn new(value: CowStr<'a>, span: Span) -> Self {
        Self { value, span }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> Text<'static> {
        Text {
            value: owned_str(self.value),
            span: self.span,
        }
    }
}

/// Inline code span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineCode<'a> {
    code: CowStr<'a>,
    span: Span,
}

impl<'a> InlineCode<'a> {
    pub fn new(code: CowStr<'a>, span: Span) -> Self {
        Self { code, span }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> InlineCode<'static> {
        InlineCode {
            code: owned_str(self.code),
            span: self.span,
        }
    }
}

/// Strong (bold) text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bold<'a> {
    children: Vec<Inline<'a>>,
    span: Span,
}

impl<'a> Bold<'a> {
    pub fn new(children: Vec<Inline<'a>>, span: Span) -> Self {
        Self { children, span }
    }

    pub fn children(&self) -> &[Inline<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> Bold<'static> {
        Bold {
            children: owned_inlines(self.children),
            span: self.span,
        }
    }
}

/// Emphasized (italic) text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Italic<'a> {
    children: Vec<Inline<'a>>,
    span: Span,
}

impl<'a> Italic<'a> {
    pub fn new(children: Vec<Inline<'a>>, span: Span) -> Self {
        Self { children, span }
    }

    pub fn children(&self) -> &[Inline<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> Italic<'static> {
        Italic {
            children: owned_inlines(self.children),
            span: self.span,
        }
    }
}

/// Hyperlink with label and destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link<'a> {
    url: CowStr<'a>,
    title: Option<CowStr<'a>>,
    children: Vec<Inline<'a>>,
    span: Span,
}

impl<'a> Link<'a> {
    pub fn new(
        url: CowStr<'a>,
        title: Option<CowStr<'a>>,
        children: Vec<Inline<'a>>,
        span: Span,
    ) -> Self {
        Self {
            url,
            title,
            children,
            span,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Optional title (for tooltips).
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Link label content.
    pub fn children(&self) -> &[Inline<'a>] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_owned(self) -> Link<'static> {
        Link {
            url: owned_str(self.url),
            title: self.title.map(owned_str),
            children: owned_inlines(self.children),
            span: self.span,
        }
    }
}

macro_rules! impl_from_node {
    ($enum:ident :: $variant:ident($node:ident)) => {
        impl<'a> From<$node<'a>> for $enum<'a> {
            fn from(node: $node<'a>) -> Self {
                $enum::$variant(node)
            }
        }
    };
}

impl_from_node!(Block::Heading(Heading));
impl_from_node!(Block::Paragraph(Paragraph));
impl_from_node!(Block::CodeBlock(CodeBlock));
impl_from_node!(Block::List(List));
impl_from_node!(Inline::Text(Text));
impl_from_node!(Inline::InlineCode(InlineCode));
impl_from_node!(Inline::Bold(Bold));
impl_from_node!(Inline::Italic(Italic));
impl_from_node!(Inline::Link(Link));

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Inline<'_> {
        Text::new(Cow::Borrowed(value), Span::default()).into()
    }

    #[test]
    fn test_heading_rejects_out_of_range_levels() {
        assert_eq!(
            Heading::new(0, vec![], Span::default()),
            Err(NodeError::InvalidHeadingLevel(0))
        );
        assert_eq!(
            Heading::new(7, vec![], Span::default()),
            Err(NodeError::InvalidHeadingLevel(7))
        );
        for level in 1..=6 {
            let heading = Heading::new(level, vec![text("x")], Span::default()).unwrap();
            assert_eq!(heading.level(), level);
            assert_eq!(Block::from(heading).kind(), NodeKind::Heading(level));
        }
    }

    #[test]
    fn test_code_block_normalizes_empty_language() {
        let block = CodeBlock::new(Some(Cow::Borrowed("  ")), Cow::Borrowed("x"), Span::default());
        assert_eq!(block.language(), None);

        let block = CodeBlock::new(Some(Cow::Borrowed("rust")), Cow::Borrowed(""), Span::default());
        assert_eq!(block.language(), Some("rust"));
        assert_eq!(block.code(), "");
    }

    #[test]
    fn test_into_owned_detaches_from_input() {
        let doc = {
            let input = String::from("hello");
            let para = Paragraph::new(vec![text(&input)], Span::new(0, 5));
            Document::new(vec![para.into()], Span::new(0, 5)).into_owned()
        };

        let Block::Paragraph(para) = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        let Inline::Text(t) = &para.children()[0] else {
            panic!("expected text");
        };
        assert_eq!(t.value(), "hello");
    }

    #[test]
    fn test_serializes_with_type_tags() {
        let link = Link::new(
            Cow::Borrowed("http://x"),
            None,
            vec![text("a")],
            Span::new(0, 13),
        );
        let json = serde_json::to_value(Inline::from(link)).unwrap();
        assert_eq!(json["type"], "link");
        assert_eq!(json["url"], "http://x");
        assert_eq!(json["children"][0]["type"], "text");
        assert_eq!(json["children"][0]["value"], "a");
    }

    #[test]
    fn test_kind_names_match_style_keys() {
        assert_eq!(NodeKind::CodeBlock.name(), "codeBlock");
        assert_eq!(NodeKind::ListItem.name(), "listItem");
        assert_eq!(NodeKind::Heading(3).name(), "heading");
    }
}
