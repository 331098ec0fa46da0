//! Integration tests for the marktree lexer and parser

use marktree_core::ast::{Bold, Italic, Link, ListItem, Text};
use marktree_core::{parse, parse_with_diagnostics, tokenize, Block, Inline, NodeKind, Span};
use rstest::rstest;

fn only_paragraph<'d, 'a>(blocks: &'d [Block<'a>]) -> &'d [Inline<'a>] {
    assert_eq!(blocks.len(), 1, "expected one block, got {:?}", blocks);
    match &blocks[0] {
        Block::Paragraph(p) => p.children(),
        other => panic!("expected paragraph, got {:?}", other),
    }
}

fn text_value<'i>(inline: &'i Inline<'_>) -> &'i str {
    match inline {
        Inline::Text(t) => t.value(),
        other => panic!("expected text, got {:?}", other),
    }
}

// ============================================================================
// Core Properties
// ============================================================================

#[test]
fn test_plain_text_is_one_paragraph_with_one_text() {
    let doc = parse("hello world");
    let children = only_paragraph(doc.blocks());
    assert_eq!(children.len(), 1);
    assert_eq!(text_value(&children[0]), "hello world");
}

#[test]
fn test_empty_input_gives_empty_document() {
    let doc = parse("");
    assert!(doc.is_empty());
    assert_eq!(doc.span(), Span::new(0, 0));
}

#[test]
fn test_bold_takes_precedence_over_italic() {
    let doc = parse("**bold**");
    let children = only_paragraph(doc.blocks());
    assert_eq!(children.len(), 1);
    let Inline::Bold(bold) = &children[0] else {
        panic!("expected bold, got {:?}", children[0]);
    };
    assert_eq!(bold.children().len(), 1);
    assert_eq!(text_value(&bold.children()[0]), "bold");
}

#[test]
fn test_italic_nested_in_bold() {
    let doc = parse("**a *b* c**");
    let children = only_paragraph(doc.blocks());
    let Inline::Bold(bold) = &children[0] else {
        panic!("expected bold, got {:?}", children[0]);
    };
    let inner = bold.children();
    assert_eq!(inner.len(), 3);
    assert_eq!(text_value(&inner[0]), "a ");
    let Inline::Italic(italic) = &inner[1] else {
        panic!("expected italic, got {:?}", inner[1]);
    };
    assert_eq!(text_value(&italic.children()[0]), "b");
    assert_eq!(text_value(&inner[2]), " c");
}

#[test]
fn test_list_items_grouped_into_one_list() {
    let doc = parse("- a\n- b\n- c");
    assert_eq!(doc.blocks().len(), 1);
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list, got {:?}", doc.blocks()[0]);
    };
    assert!(!list.ordered());

    let values: Vec<_> = list
        .items()
        .iter()
        .map(|item| {
            assert_eq!(item.children().len(), 1);
            text_value(&item.children()[0])
        })
        .collect();
    assert_eq!(values, vec!["a", "b", "c"]);
}

#[test]
fn test_code_fence_extraction() {
    let doc = parse("```js\nconsole.log(1)\n```");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("expected code block, got {:?}", doc.blocks()[0]);
    };
    assert_eq!(code.language(), Some("js"));
    assert_eq!(code.code(), "console.log(1)");
}

#[test]
fn test_code_fence_content_is_literal() {
    let doc = parse("```\n**x** [a](b) `c`\n```");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("expected code block");
    };
    assert_eq!(code.language(), None);
    assert_eq!(code.code(), "**x** [a](b) `c`");
}

#[test]
fn test_seven_hashes_is_not_a_heading() {
    let doc = parse("####### not a heading");
    let children = only_paragraph(doc.blocks());
    assert_eq!(text_value(&children[0]), "####### not a heading");
}

#[test]
fn test_link_extraction() {
    let doc = parse("[a](http://x)");
    let children = only_paragraph(doc.blocks());
    let Inline::Link(link) = &children[0] else {
        panic!("expected link, got {:?}", children[0]);
    };
    assert_eq!(link.url(), "http://x");
    assert_eq!(link.title(), None);
    assert_eq!(link.children().len(), 1);
    assert_eq!(text_value(&link.children()[0]), "a");
}

// ============================================================================
// Block Structure
// ============================================================================

#[rstest]
#[case("# One", 1, "One")]
#[case("## Two", 2, "Two")]
#[case("###### Six", 6, "Six")]
#[case("###   padded   ", 3, "padded")]
#[case("#\tTab", 1, "Tab")]
fn test_heading_levels(#[case] input: &str, #[case] level: u8, #[case] text: &str) {
    let doc = parse(input);
    let Block::Heading(heading) = &doc.blocks()[0] else {
        panic!("expected heading for {:?}", input);
    };
    assert_eq!(heading.level(), level);
    assert_eq!(text_value(&heading.children()[0]), text);
}

#[rstest]
#[case("#no-space")]
#[case("# ")]
#[case("####### seven")]
#[case(" # indented")]
fn test_not_headings(#[case] input: &str) {
    let doc = parse(input);
    assert!(
        doc.blocks()
            .iter()
            .all(|b| !matches!(b.kind(), NodeKind::Heading(_))),
        "{:?} produced a heading",
        input
    );
}

#[test]
fn test_mixed_document_block_order() {
    let input = "# Title\n\nIntro with `code`.\n\n- one\n* two\n+ three\n\n```sh\nls -la\n```\n\nClosing line\ncontinued.";
    let kinds: Vec<_> = parse(input).blocks().iter().map(Block::kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Heading(1),
            NodeKind::Paragraph,
            NodeKind::List,
            NodeKind::CodeBlock,
            NodeKind::Paragraph,
        ]
    );
}

#[test]
fn test_all_list_markers_join_one_list() {
    let doc = parse("- one\n* two\n+ three");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list");
    };
    assert_eq!(list.items().len(), 3);
}

#[test]
fn test_paragraph_between_lists_splits_them() {
    let kinds: Vec<_> = parse("- a\ntext\n- b")
        .blocks()
        .iter()
        .map(Block::kind)
        .collect();
    assert_eq!(
        kinds,
        vec![NodeKind::List, NodeKind::Paragraph, NodeKind::List]
    );
}

#[test]
fn test_star_list_item_is_not_italic() {
    let doc = parse("* item *with* emphasis");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list, got {:?}", doc.blocks()[0]);
    };
    let children = list.items()[0].children();
    assert_eq!(text_value(&children[0]), "item ");
    assert!(matches!(children[1], Inline::Italic(_)));
}

#[test]
fn test_crlf_line_endings() {
    let doc = parse("# Title\r\n\r\nline one\r\nline two\r\n");
    assert_eq!(doc.blocks().len(), 2);
    let Block::Heading(heading) = &doc.blocks()[0] else {
        panic!("expected heading");
    };
    assert_eq!(text_value(&heading.children()[0]), "Title");

    let children = only_paragraph(&doc.blocks()[1..]);
    assert_eq!(text_value(&children[0]), "line one\r\nline two");
}

#[test]
fn test_code_fence_with_crlf() {
    let doc = parse("```py\r\nx = 1\r\n```\r\n");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("expected code block");
    };
    assert_eq!(code.language(), Some("py"));
    assert_eq!(code.code(), "x = 1");
}

#[test]
fn test_empty_code_block() {
    let doc = parse("```\n```");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("expected code block");
    };
    assert_eq!(code.code(), "");
}

// ============================================================================
// Unterminated Fences
// ============================================================================

#[test]
fn test_unterminated_fence_consumes_rest_of_input() {
    let input = "intro\n\n```rust\nfn main() {}\n\n# not a heading";
    let result = parse_with_diagnostics(input);
    let blocks = result.document.blocks();
    assert_eq!(blocks.len(), 2);

    let Block::CodeBlock(code) = &blocks[1] else {
        panic!("expected code block, got {:?}", blocks[1]);
    };
    assert_eq!(code.code(), "fn main() {}\n\n# not a heading");
    assert_eq!(result.errors.len(), 1);
    assert!(!result.is_ok());
}

#[test]
fn test_terminated_fence_has_no_diagnostics() {
    assert!(parse_with_diagnostics("```\ncode\n```\nafter").is_ok());
}

// ============================================================================
// Inline Markup
// ============================================================================

#[test]
fn test_unmatched_markup_degrades_to_text() {
    let doc = parse("a * b ` c [d");
    let children = only_paragraph(doc.blocks());
    assert!(children.iter().all(|c| matches!(c, Inline::Text(_))));
    let joined: String = children.iter().map(text_value).collect();
    assert_eq!(joined, "a * b ` c [d");
}

#[rstest]
#[case("a * b * c", " b ")]
#[case("*x *", "x ")]
fn test_italic_content_may_touch_whitespace(#[case] input: &str, #[case] inner: &str) {
    let doc = parse(input);
    let children = only_paragraph(doc.blocks());
    let italic = children
        .iter()
        .find_map(|c| match c {
            Inline::Italic(i) => Some(i),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no italic in {:?}", children));
    assert_eq!(text_value(&italic.children()[0]), inner);
}

#[test]
fn test_bold_content_may_touch_whitespace() {
    let doc = parse("** b ** end");
    let children = only_paragraph(doc.blocks());
    let Inline::Bold(bold) = &children[0] else {
        panic!("expected bold, got {:?}", children[0]);
    };
    assert_eq!(text_value(&bold.children()[0]), " b ");
    assert_eq!(text_value(&children[1]), " end");
}

#[test]
fn test_padded_fence_line_does_not_close() {
    let doc = parse("```\nx\n   ```\ny\n```\nafter");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("expected code block");
    };
    assert_eq!(code.code(), "x\n   ```\ny");
    assert_eq!(doc.blocks().len(), 2);
}

#[test]
fn test_inline_code_is_not_reparsed() {
    let doc = parse("`**not bold**`");
    let children = only_paragraph(doc.blocks());
    let Inline::InlineCode(code) = &children[0] else {
        panic!("expected inline code");
    };
    assert_eq!(code.code(), "**not bold**");
}

#[test]
fn test_link_with_title_and_nested_markup() {
    let doc = parse("see [**docs**](https://example.com \"The docs\")!");
    let children = only_paragraph(doc.blocks());
    assert_eq!(text_value(&children[0]), "see ");
    let Inline::Link(link) = &children[1] else {
        panic!("expected link, got {:?}", children[1]);
    };
    assert_eq!(link.url(), "https://example.com");
    assert_eq!(link.title(), Some("The docs"));
    assert!(matches!(link.children()[0], Inline::Bold(_)));
    assert_eq!(text_value(&children[2]), "!");
}

#[test]
fn test_paragraph_markup_may_span_lines() {
    let doc = parse("**open\nclose**");
    let children = only_paragraph(doc.blocks());
    let Inline::Bold(bold) = &children[0] else {
        panic!("expected bold, got {:?}", children[0]);
    };
    assert_eq!(text_value(&bold.children()[0]), "open\nclose");
}

#[test]
fn test_inline_spans_index_into_source() {
    let input = "para with `code` and [link](u)\n- item **b**";
    let doc = parse(input);

    fn check(input: &str, inlines: &[Inline<'_>]) {
        for inline in inlines {
            let span = inline.span();
            let slice = &input[span.start as usize..span.end as usize];
            match inline {
                Inline::Text(t) => assert_eq!(slice, t.value()),
                Inline::InlineCode(c) => assert_eq!(slice, format!("`{}`", c.code())),
                Inline::Bold(b) => {
                    assert!(slice.starts_with("**") && slice.ends_with("**"));
                    check(input, b.children());
                }
                Inline::Italic(i) => check(input, i.children()),
                Inline::Link(l) => {
                    assert!(slice.starts_with('[') && slice.ends_with(')'));
                    check(input, l.children());
                }
            }
        }
    }

    for block in doc.blocks() {
        match block {
            Block::Paragraph(p) => check(input, p.children()),
            Block::List(l) => l.items().iter().for_each(|i| check(input, i.children())),
            _ => {}
        }
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[rstest]
#[case("plain", &["TEXT", "EOF"])]
#[case("plain\n", &["TEXT", "LINE_BREAK", "EOF"])]
#[case("# h", &["HEADING", "EOF"])]
#[case("- x", &["LIST_ITEM", "EOF"])]
#[case("```\nx\n```", &["CODE_BLOCK", "EOF"])]
#[case("a `b`", &["TEXT", "INLINE_CODE", "EOF"])]
#[case("**b**", &["BOLD", "EOF"])]
#[case("*i*", &["ITALIC", "EOF"])]
#[case("[a](u)", &["LINK", "EOF"])]
#[case("\n", &["NEWLINE", "EOF"])]
#[case("*", &["TEXT", "EOF"])]
#[case("a\n\nb", &["TEXT", "LINE_BREAK", "NEWLINE", "TEXT", "EOF"])]
fn test_token_kinds(#[case] input: &str, #[case] expected: &[&str]) {
    let tokens = tokenize(input);
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind.name()).collect();
    assert_eq!(kinds, expected);
}

#[test]
fn test_token_positions_track_lines_and_columns() {
    let tokens = tokenize("ab\n# héading\nx *y*");
    let positions: Vec<_> = tokens
        .iter()
        .map(|t| (t.kind.name(), t.position.line, t.position.column))
        .collect();
    assert_eq!(
        positions,
        vec![
            ("TEXT", 1, 1),
            ("LINE_BREAK", 1, 3),
            ("HEADING", 2, 1),
            ("TEXT", 3, 1),
            ("ITALIC", 3, 3),
            ("EOF", 3, 6),
        ]
    );
}

// ============================================================================
// Node Factory
// ============================================================================

#[test]
fn test_heading_constructor_rejects_bad_levels() {
    use marktree_core::ast::Heading;
    use marktree_core::NodeError;

    assert_eq!(
        Heading::new(0, vec![], Span::default()).unwrap_err(),
        NodeError::InvalidHeadingLevel(0)
    );
    assert!(Heading::new(7, vec![], Span::default()).is_err());
    assert!(Heading::new(6, vec![], Span::default()).is_ok());
}

#[test]
fn test_hand_built_tree_matches_parsed_tree() {
    let text = |s: &'static str, start, end| -> Inline<'static> {
        Text::new(s.into(), Span::new(start, end)).into()
    };

    let italic: Inline = Italic::new(vec![text("b", 7, 8)], Span::new(6, 9)).into();
    let bold: Inline = Bold::new(
        vec![text("a ", 4, 6), italic, text(" c", 9, 11)],
        Span::new(2, 13),
    )
    .into();
    let link: Inline =
        Link::new("u".into(), None, vec![text("l", 15, 16)], Span::new(14, 20)).into();
    let expected = ListItem::new(vec![bold, text(" ", 13, 14), link], Span::new(0, 20));

    let doc = parse("- **a *b* c** [l](u)");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list");
    };
    assert_eq!(list.items(), &[expected]);
}

#[test]
fn test_into_owned_detaches_from_input() {
    let doc = {
        let input = String::from("# Owned *tree*\n\n- [x](y)");
        parse(&input).into_owned()
    };
    assert_eq!(doc.blocks().len(), 2);
    assert_eq!(doc.blocks()[0].kind(), NodeKind::Heading(1));
}

#[test]
fn test_document_serializes_with_type_tags() {
    let doc = parse("# Hi\n\n*x*");
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["blocks"][0]["type"], "heading");
    assert_eq!(json["blocks"][0]["level"], 1);
    assert_eq!(json["blocks"][1]["children"][0]["type"], "italic");
}
