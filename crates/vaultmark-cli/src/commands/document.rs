//! `render`, `parse`, `check` and `stats`: commands that work on a single
//! Markdown source and need no vault.

use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;
use vaultmark_core::ast::{Block, Document};
use vaultmark_core::{Parser, Span};

use super::{print_json, read_input};
use crate::error::CliError;

#[derive(Subcommand)]
pub(crate) enum DocumentCommand {
    /// Render Markdown to an HTML fragment.
    Render {
        /// Markdown file (stdin when omitted).
        file: Option<PathBuf>,
    },
    /// Parse and display the block structure.
    Parse {
        /// Markdown file (stdin when omitted).
        file: Option<PathBuf>,
    },
    /// Report suspicious input; exits with status 1 when anything is found.
    Check {
        /// Markdown file (stdin when omitted).
        file: Option<PathBuf>,
    },
    /// Show document statistics.
    Stats {
        /// Markdown file (stdin when omitted).
        file: Option<PathBuf>,
    },
}

impl DocumentCommand {
    pub(crate) fn execute(self, json: bool, verbose: bool) -> Result<(), CliError> {
        match self {
            Self::Render { file } => {
                let input = read_input(file.as_deref())?;
                println!("{}", vaultmark_core::render(&input));
                Ok(())
            }
            Self::Parse { file } => cmd_parse(&read_input(file.as_deref())?, json, verbose),
            Self::Check { file } => cmd_check(&read_input(file.as_deref())?, json),
            Self::Stats { file } => cmd_stats(&read_input(file.as_deref())?, json),
        }
    }
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(input: &str, json: bool, verbose: bool) -> Result<(), CliError> {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics(input);

    for diagnostic in result.diagnostics.iter() {
        eprintln!("warning: {diagnostic}");
    }

    if json {
        print_json(&convert_document(&result.document))
    } else {
        if verbose {
            print_document_verbose(&result.document);
        } else {
            print_document_summary(&result.document);
        }
        Ok(())
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(input: &str, json: bool) -> Result<(), CliError> {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics(input);
    let count = result.diagnostics.len();

    if json {
        let diagnostics: Vec<_> = result
            .diagnostics
            .iter()
            .map(|d| {
                serde_json::json!({
                    "code": d.kind.code(),
                    "message": d.message,
                    "span": JsonSpan::from(d.span),
                })
            })
            .collect();
        print_json(&serde_json::json!({"valid": count == 0, "diagnostics": diagnostics}))?;
    } else if count == 0 {
        println!("Valid: no diagnostics");
    } else {
        eprintln!("Found {count} diagnostic(s):");
        for diagnostic in result.diagnostics.iter() {
            eprintln!("  - [{}] {}", diagnostic.kind.code(), diagnostic);
        }
    }

    if count == 0 {
        Ok(())
    } else {
        Err(CliError::Diagnostics(count))
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(input: &str, json: bool) -> Result<(), CliError> {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics(input);
    let stats = result.document.stats();

    let chars = input.chars().count();
    let words = input.split_whitespace().count();
    let lines = input.lines().count();

    if json {
        return print_json(&serde_json::json!({
            "blocks": stats.total_blocks(),
            "headings": stats.headings,
            "paragraphs": stats.paragraphs,
            "lists": stats.lists,
            "list_items": stats.list_items,
            "quotes": stats.quotes,
            "code_blocks": stats.code_blocks,
            "tables": stats.tables,
            "rules": stats.rules,
            "bytes": input.len(),
            "chars": chars,
            "words": words,
            "lines": lines,
            "diagnostics": result.diagnostics.len(),
        }));
    }

    println!("Document Statistics");
    println!("-------------------");
    println!("Content:");
    println!("  Total blocks:   {}", stats.total_blocks());
    println!("  Headings:       {}", stats.headings);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Lists:          {} ({} items)", stats.lists, stats.list_items);
    println!("  Quotes:         {}", stats.quotes);
    println!("  Code blocks:    {}", stats.code_blocks);
    println!("  Tables:         {}", stats.tables);
    println!("  Rules:          {}", stats.rules);
    println!();
    println!("Size:");
    println!("  Bytes:          {}", input.len());
    println!("  Characters:     {chars}");
    println!("  Words (est.):   {words}");
    println!("  Lines:          {lines}");
    println!();
    println!("Diagnostics:    {}", result.diagnostics.len());

    Ok(())
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    span: JsonSpan,
    blocks: Vec<JsonBlock<'a>>,
}

#[derive(Serialize)]
struct JsonSpan {
    start: u32,
    end: u32,
}

impl From<Span> for JsonSpan {
    fn from(span: Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonBlock<'a> {
    Heading {
        level: u8,
        text: &'a str,
        span: JsonSpan,
    },
    Paragraph {
        lines: &'a [&'a str],
        span: JsonSpan,
    },
    List {
        kind: &'static str,
        items: Vec<&'a str>,
        span: JsonSpan,
    },
    Quote {
        paragraphs: &'a [&'a str],
        span: JsonSpan,
    },
    CodeBlock {
        info: &'a str,
        lines: &'a [&'a str],
        closed: bool,
        span: JsonSpan,
    },
    Table {
        header: &'a [&'a str],
        rows: &'a [Vec<&'a str>],
        span: JsonSpan,
    },
    ThematicBreak {
        span: JsonSpan,
    },
}

fn convert_document<'a>(doc: &'a Document<'a>) -> JsonDocument<'a> {
    JsonDocument {
        span: doc.span.into(),
        blocks: doc.blocks.iter().map(convert_block).collect(),
    }
}

fn convert_block<'a>(block: &'a Block<'a>) -> JsonBlock<'a> {
    match block {
        Block::Heading(h) => JsonBlock::Heading {
            level: h.level,
            text: h.text,
            span: h.span.into(),
        },
        Block::Paragraph(p) => JsonBlock::Paragraph {
            lines: &p.lines,
            span: p.span.into(),
        },
        Block::List(l) => JsonBlock::List {
            kind: match l.kind {
                vaultmark_core::ListKind::Ordered => "ordered",
                vaultmark_core::ListKind::Unordered => "unordered",
            },
            items: l.items.iter().map(|item| item.text).collect(),
            span: l.span.into(),
        },
        Block::Quote(q) => JsonBlock::Quote {
            paragraphs: &q.paragraphs,
            span: q.span.into(),
        },
        Block::CodeBlock(c) => JsonBlock::CodeBlock {
            info: c.info,
            lines: &c.lines,
            closed: c.closed,
            span: c.span.into(),
        },
        Block::Table(t) => JsonBlock::Table {
            header: &t.header,
            rows: &t.rows,
            span: t.span.into(),
        },
        Block::ThematicBreak(span) => JsonBlock::ThematicBreak {
            span: (*span).into(),
        },
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document_summary(doc: &Document<'_>) {
    println!("Blocks: {}", doc.blocks.len());
    for (i, block) in doc.blocks.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_block(block));
    }
}

fn print_document_verbose(doc: &Document<'_>) {
    println!("=== Document ===");
    println!("Span: {}..{}", doc.span.start, doc.span.end);

    for (i, block) in doc.blocks.iter().enumerate() {
        println!();
        let span = block.span();
        println!(
            "[{}] {} @ {}..{}",
            i + 1,
            describe_block(block),
            span.start,
            span.end
        );
        print_block_verbose(block);
    }
}

fn describe_block(block: &Block<'_>) -> String {
    match block {
        Block::Heading(h) => format!("Heading (level {})", h.level),
        Block::Paragraph(p) => format!("Paragraph ({} lines)", p.lines.len()),
        Block::List(l) => format!("List ({:?}, {} items)", l.kind, l.items.len()),
        Block::Quote(q) => format!("Quote ({} paragraphs)", q.paragraphs.len()),
        Block::CodeBlock(c) if c.closed => format!("CodeBlock (info: {:?})", c.info),
        Block::CodeBlock(c) => format!("CodeBlock (info: {:?}, unclosed)", c.info),
        Block::Table(t) => format!("Table ({} columns, {} rows)", t.columns(), t.rows.len()),
        Block::ThematicBreak(_) => "ThematicBreak".to_string(),
    }
}

fn print_block_verbose(block: &Block<'_>) {
    let prefix = "  ";

    match block {
        Block::Heading(h) => println!("{prefix}Text: {}", h.text),
        Block::Paragraph(p) => println!("{prefix}Text: {}", p.lines.join(" ")),
        Block::List(l) => {
            for (i, item) in l.items.iter().enumerate() {
                println!("{prefix}Item {}: {}", i + 1, item.text);
            }
        }
        Block::Quote(q) => {
            for paragraph in &q.paragraphs {
                println!("{prefix}> {paragraph}");
            }
        }
        Block::CodeBlock(c) => {
            let content = c.lines.join("\n");
            let preview: String = content.chars().take(60).collect();
            let ellipsis = if content.chars().count() > 60 { "..." } else { "" };
            println!(
                "{prefix}Content: {}{}",
                preview.replace('\n', "\\n"),
                ellipsis
            );
        }
        Block::Table(t) => {
            println!("{prefix}Header: {}", t.header.join(" | "));
            for (i, row) in t.rows.iter().enumerate() {
                println!("{prefix}Row {}: {}", i + 1, row.join(" | "));
            }
        }
        Block::ThematicBreak(_) => {}
    }
}
