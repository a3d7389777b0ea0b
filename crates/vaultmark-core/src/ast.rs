//! Block tree produced by the parser.
//!
//! The tree is deliberately flat: blocks never contain other blocks, and all
//! text is kept as borrowed slices of the source so the inline renderer can
//! run over it later. Every node carries the [`Span`] of the lines it was
//! built from.

use crate::span::Span;

/// A parsed Markdown document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document<'a> {
    /// Blocks in document order.
    pub blocks: Vec<Block<'a>>,
    /// Span covering the entire input.
    pub span: Span,
}

/// Block-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    /// `#` to `####` heading.
    Heading(Heading<'a>),
    /// Consecutive non-blank text lines.
    Paragraph(Paragraph<'a>),
    /// Flat ordered or unordered list.
    List(List<'a>),
    /// Run of `>` lines.
    Quote(Quote<'a>),
    /// Triple-backtick fenced code.
    CodeBlock(CodeBlock<'a>),
    /// Pipe table with a separator row.
    Table(Table<'a>),
    /// `---` or `***`.
    ThematicBreak(Span),
}

impl<'a> Block<'a> {
    pub fn span(&self) -> Span {
        match self {
            Block::Heading(h) => h.span,
            Block::Paragraph(p) => p.span,
            Block::List(l) => l.span,
            Block::Quote(q) => q.span,
            Block::CodeBlock(c) => c.span,
            Block::Table(t) => t.span,
            Block::ThematicBreak(span) => *span,
        }
    }
}

/// Section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading<'a> {
    /// Heading level (1-4).
    pub level: u8,
    /// Raw inline text, trimmed.
    pub text: &'a str,
    pub span: Span,
}

/// Text paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph<'a> {
    /// Trimmed source lines; rendered joined by a single space.
    pub lines: Vec<&'a str>,
    pub span: Span,
}

/// List ordering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `1.` style items, rendered as `<ol>`.
    Ordered,
    /// `-` or `*` items, rendered as `<ul>`.
    Unordered,
}

impl ListKind {
    /// HTML element name for this list kind.
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct List<'a> {
    pub kind: ListKind,
    pub items: Vec<ListItem<'a>>,
    pub span: Span,
}

/// A single list item. Item text is inline-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// Block quotation; each `>` line is its own paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote<'a> {
    pub paragraphs: Vec<&'a str>,
    pub span: Span,
}

/// Fenced code block.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock<'a> {
    /// Text after the opening fence (e.g. `rust`), trimmed.
    pub info: &'a str,
    /// Verbatim content lines.
    pub lines: Vec<&'a str>,
    /// False when the input ended before the closing fence.
    pub closed: bool,
    pub span: Span,
}

/// Pipe table.
///
/// `header` always has exactly [`Table::columns`] cells and every body row
/// has been padded or truncated to the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    pub header: Vec<&'a str>,
    pub rows: Vec<Vec<&'a str>>,
    pub span: Span,
}

impl<'a> Table<'a> {
    pub fn columns(&self) -> usize {
        self.header.len()
    }
}

/// Block counts for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub headings: usize,
    pub paragraphs: usize,
    pub lists: usize,
    pub list_items: usize,
    pub quotes: usize,
    pub code_blocks: usize,
    pub tables: usize,
    pub rules: usize,
}

impl DocumentStats {
    pub fn total_blocks(&self) -> usize {
        self.headings
            + self.paragraphs
            + self.lists
            + self.quotes
            + self.code_blocks
            + self.tables
            + self.rules
    }
}

impl<'a> Document<'a> {
    /// Count blocks by kind.
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        for block in &self.blocks {
            match block {
                Block::Heading(_) => stats.headings += 1,
                Block::Paragraph(_) => stats.paragraphs += 1,
                Block::List(l) => {
                    stats.lists += 1;
                    stats.list_items += l.items.len();
                }
                Block::Quote(_) => stats.quotes += 1,
                Block::CodeBlock(_) => stats.code_blocks += 1,
                Block::Table(_) => stats.tables += 1,
                Block::ThematicBreak(_) => stats.rules += 1,
            }
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
