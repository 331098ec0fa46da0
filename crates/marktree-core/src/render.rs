//! HTML rendering of a parsed document.
//!
//! Styles come from the [`Theme`] handed to [`render_html`] and are written
//! as inline `style` attributes. There is no global configuration.

use crate::ast::{Block, CodeBlock, Document, Inline, Link, List, NodeKind};
use crate::style::Theme;

/// Render `doc` to an HTML fragment styled by `theme`.
pub fn render_html(doc: &Document<'_>, theme: &Theme) -> String {
    let mut renderer = HtmlRenderer::new(theme);
    renderer.document(doc);
    renderer.finish()
}

/// Streaming HTML writer over one output buffer.
#[derive(Debug)]
pub struct HtmlRenderer<'t> {
    theme: &'t Theme,
    out: String,
}

impl<'t> HtmlRenderer<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            out: String::with_capacity(1024),
        }
    }

    /// Take the rendered output.
    pub fn finish(self) -> String {
        self.out
    }

    pub fn document(&mut self, doc: &Document<'_>) {
        for block in doc.blocks() {
            self.block(block);
        }
    }

    pub fn block(&mut self, block: &Block<'_>) {
        match block {
            Block::Heading(h) => {
                let tag = heading_tag(h.level());
                self.open(tag, block.kind(), &[]);
                self.inlines(h.children());
                self.close(tag);
            }
            Block::Paragraph(p) => {
                self.open("p", NodeKind::Paragraph, &[]);
                self.inlines(p.children());
                self.close("p");
            }
            Block::CodeBlock(c) => self.code_block(c),
            Block::List(l) => self.list(l),
        }
        self.out.push('\n');
    }

    fn code_block(&mut self, code: &CodeBlock<'_>) {
        self.open("pre", NodeKind::CodeBlock, &[]);
        match code.language() {
            Some(lang) => {
                self.out.push_str("<code class=\"language-");
                escape_into(&mut self.out, lang);
                self.out.push_str("\">");
            }
            None => self.out.push_str("<code>"),
        }
        escape_into(&mut self.out, code.code());
        self.out.push_str("</code>");
        self.close("pre");
    }

    fn list(&mut self, list: &List<'_>) {
        let tag = if list.ordered() { "ol" } else { "ul" };
        self.open(tag, NodeKind::List, &[]);
        self.out.push('\n');
        for item in list.items() {
            self.open("li", NodeKind::ListItem, &[]);
            self.inlines(item.children());
            self.close("li");
            self.out.push('\n');
        }
        self.close(tag);
    }

    fn inlines(&mut self, inlines: &[Inline<'_>]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    pub fn inline(&mut self, inline: &Inline<'_>) {
        match inline {
            Inline::Text(t) => escape_into(&mut self.out, t.value()),
            Inline::InlineCode(c) => {
                self.open("code", NodeKind::InlineCode, &[]);
                escape_into(&mut self.out, c.code());
                self.close("code");
            }
            Inline::Bold(b) => {
                self.open("strong", NodeKind::Bold, &[]);
                self.inlines(b.children());
                self.close("strong");
            }
            Inline::Italic(i) => {
                self.open("em", NodeKind::Italic, &[]);
                self.inlines(i.children());
                self.close("em");
            }
            Inline::Link(l) => self.link(l),
        }
    }

    fn link(&mut self, link: &Link<'_>) {
        let mut attrs = vec![("href", link.url())];
        if let Some(title) = link.title() {
            attrs.push(("title", title));
        }
        self.open("a", NodeKind::Link, &attrs);
        self.inlines(link.children());
        self.close("a");
    }

    fn open(&mut self, tag: &str, kind: NodeKind, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.attr(name, value);
        }
        if let Some(css) = self.theme.style_for(kind).and_then(|s| s.to_css()) {
            self.attr("style", &css);
        }
        self.out.push('>');
    }

    fn attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        escape_into(&mut self.out, value);
        self.out.push('"');
    }

    #[inline]
    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

/// Append `text` with `& < > " '` escaped.
fn escape_into(out: &mut String, text: &str) {
    let mut last = 0;
    for (i, b) in text.bytes().enumerate() {
        let escaped = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(escaped);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}
