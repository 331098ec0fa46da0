//! mtree - inspect and render marktree documents
//!
//! Usage:
//!   mtree [OPTIONS] <COMMAND> <FILE>
//!
//! Commands:
//!   parse     Show the document tree (or JSON with --json)
//!   tokens    Dump the token stream with positions
//!   html      Render to HTML, optionally with a JSON theme
//!   stats     Show document statistics
//!
//! `FILE` may be `-` to read standard input.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use marktree_core::ast::ListItem;
use marktree_core::{
    parse_with_diagnostics, render_html, tokenize, Block, Document, Inline, ParseResult, Theme,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "mtree", version)]
#[command(about = "Parse, inspect and render Markdown-subset documents")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the document tree
    Parse {
        /// Input file, or `-` for stdin
        file: PathBuf,
        /// Print the AST as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Dump the token stream
    Tokens {
        file: PathBuf,
        /// Print tokens as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Render to HTML
    Html {
        file: PathBuf,
        /// JSON theme merged over the default theme
        #[arg(short, long)]
        theme: Option<PathBuf>,
    },
    /// Show document statistics
    Stats { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli.command) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: &Command) -> Result<(), String> {
    match command {
        Command::Parse { file, json } => cmd_parse(&read_input(file)?, *json),
        Command::Tokens { file, json } => cmd_tokens(&read_input(file)?, *json),
        Command::Html { file, theme } => {
            let theme = match theme {
                Some(path) => load_theme(path)?,
                None => Theme::default(),
            };
            cmd_html(&read_input(file)?, &theme)
        }
        Command::Stats { file } => cmd_stats(&read_input(file)?),
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        return Ok(input);
    }
    fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {}", path.display(), e))
}

fn load_theme(path: &Path) -> Result<Theme, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("failed to read theme '{}': {}", path.display(), e))?;
    let theme = Theme::from_json_str(&json).map_err(|e| format!("{}: {}", path.display(), e))?;
    tracing::debug!(theme = %theme.name, "loaded theme");
    Ok(theme)
}

fn parse_reporting(input: &str) -> ParseResult<'_> {
    let result = parse_with_diagnostics(input);
    for error in result.errors.iter() {
        eprintln!("warning: {}", error);
    }
    result
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize: {}", e))
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(input: &str, json: bool) -> Result<(), String> {
    let result = parse_reporting(input);

    if json {
        println!("{}", to_json(&result.document)?);
    } else {
        print_document(&result.document);
    }
    Ok(())
}

// =============================================================================
// Tokens Command
// =============================================================================

fn cmd_tokens(input: &str, json: bool) -> Result<(), String> {
    let tokens = tokenize(input);

    if json {
        println!("{}", to_json(&*tokens)?);
        return Ok(());
    }

    for token in tokens.iter() {
        let pos = token.position;
        println!(
            "{:>4}:{:<3} {:>6}..{:<6} {:<12} {:?}",
            pos.line,
            pos.column,
            pos.start_offset,
            pos.end_offset,
            token.kind.name(),
            token.raw
        );
    }
    Ok(())
}

// =============================================================================
// Html Command
// =============================================================================

fn cmd_html(input: &str, theme: &Theme) -> Result<(), String> {
    let result = parse_reporting(input);
    print!("{}", render_html(&result.document, theme));
    Ok(())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(input: &str) -> Result<(), String> {
    let result = parse_reporting(input);
    let stats = DocumentStats::from_document(&result.document, input);

    println!("Document Statistics");
    println!("-------------------");
    println!("Content:");
    println!("  Total blocks:   {}", stats.total_blocks);
    println!("  Headings:       {}", stats.headings);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Code blocks:    {}", stats.code_blocks);
    println!("  Lists:          {}", stats.lists);
    println!("  List items:     {}", stats.list_items);
    println!("  Links:          {}", stats.links);
    println!();
    println!("Size:");
    println!("  Bytes:          {}", stats.bytes);
    println!("  Words (est.):   {}", stats.words);
    println!("  Lines:          {}", stats.lines);
    println!();
    println!("Diagnostics:    {}", result.errors.len());

    Ok(())
}

#[derive(Default)]
struct DocumentStats {
    total_blocks: usize,
    headings: usize,
    paragraphs: usize,
    code_blocks: usize,
    lists: usize,
    list_items: usize,
    links: usize,
    bytes: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            bytes: input.len(),
            words: input.split_whitespace().count(),
            lines: input.lines().count(),
            ..Self::default()
        };

        for block in doc.blocks() {
            stats.total_blocks += 1;
            match block {
                Block::Heading(h) => {
                    stats.headings += 1;
                    stats.count_links(h.children());
                }
                Block::Paragraph(p) => {
                    stats.paragraphs += 1;
                    stats.count_links(p.children());
                }
                Block::CodeBlock(_) => stats.code_blocks += 1,
                Block::List(l) => {
                    stats.lists += 1;
                    stats.list_items += l.items().len();
                    for item in l.items() {
                        stats.count_links(item.children());
                    }
                }
            }
        }
        stats
    }

    fn count_links(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            match inline {
                Inline::Link(l) => {
                    self.links += 1;
                    self.count_links(l.children());
                }
                Inline::Bold(b) => self.count_links(b.children()),
                Inline::Italic(i) => self.count_links(i.children()),
                Inline::Text(_) | Inline::InlineCode(_) => {}
            }
        }
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document(doc: &Document) {
    let span = doc.span();
    println!("Document ({}..{}, {} blocks)", span.start, span.end, doc.blocks().len());

    for (i, block) in doc.blocks().iter().enumerate() {
        println!();
        println!("[{}] {}", i + 1, describe_block(block));
        print_block(block, 1);
    }
}

fn describe_block(block: &Block) -> String {
    let span = block.span();
    let at = format!("@{}..{}", span.start, span.end);
    match block {
        Block::Heading(h) => format!("Heading (level {}) {}", h.level(), at),
        Block::Paragraph(_) => format!("Paragraph {}", at),
        Block::List(l) => format!("List ({} items) {}", l.items().len(), at),
        Block::CodeBlock(c) => format!(
            "CodeBlock (lang: {}) {}",
            c.language().unwrap_or("none"),
            at
        ),
    }
}

fn print_block(block: &Block, indent: usize) {
    let prefix = "  ".repeat(indent);

    match block {
        Block::Heading(h) => println!("{}Content: {}", prefix, format_inlines(h.children())),
        Block::Paragraph(p) => println!("{}Content: {}", prefix, format_inlines(p.children())),
        Block::List(l) => {
            for (i, item) in l.items().iter().enumerate() {
                print_item(i, item, &prefix);
            }
        }
        Block::CodeBlock(c) => {
            let code = c.code();
            let preview: String = code.chars().take(60).collect();
            let ellipsis = if code.chars().count() > 60 { "..." } else { "" };
            println!(
                "{}Content: {}{}",
                prefix,
                preview.replace('\n', "\\n"),
                ellipsis
            );
        }
    }
}

fn print_item(index: usize, item: &ListItem, prefix: &str) {
    println!(
        "{}Item {}: {}",
        prefix,
        index + 1,
        format_inlines(item.children())
    );
}

/// Compact markup-like rendering of inline content.
fn format_inlines(inlines: &[Inline]) -> String {
    let mut result = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) => result.push_str(&t.value().replace('\n', "\\n")),
            Inline::Italic(e) => {
                result.push('*');
                result.push_str(&format_inlines(e.children()));
                result.push('*');
            }
            Inline::Bold(s) => {
                result.push_str("**");
                result.push_str(&format_inlines(s.children()));
                result.push_str("**");
            }
            Inline::InlineCode(c) => {
                result.push('`');
                result.push_str(c.code());
                result.push('`');
            }
            Inline::Link(l) => {
                result.push('[');
                result.push_str(&format_inlines(l.children()));
                result.push_str("](");
                result.push_str(l.url());
                if let Some(title) = l.title() {
                    result.push_str(" \"");
                    result.push_str(title);
                    result.push('"');
                }
                result.push(')');
            }
        }
    }
    result
}
