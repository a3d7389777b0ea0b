//! Single-pass block parser.
//!
//! Lines are dispatched in a fixed priority order (fence, blank, rule,
//! quote, heading, table, ordered item, unordered item, paragraph text) and
//! fed into a [`BlockBuilder`], a small state machine that holds at most one
//! open block. Anything that does not match a block construct falls through
//! to paragraph text, so parsing cannot fail.

use crate::ast::{
    Block, CodeBlock, Document, Heading, List, ListItem, ListKind, Paragraph, Quote, Table,
};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::lexer::{Lexer, Line};
use crate::span::Span;

/// Deepest heading level recognised.
const MAX_HEADING_LEVEL: usize = 4;

/// Parsed document together with the diagnostics gathered on the way.
#[derive(Debug)]
pub struct ParseResult<'a> {
    pub document: Document<'a>,
    pub diagnostics: Diagnostics,
}

/// The block that is currently accepting lines.
#[derive(Debug, Default)]
enum OpenBlock<'a> {
    #[default]
    None,
    Paragraph {
        lines: Vec<&'a str>,
        span: Span,
    },
    List {
        kind: ListKind,
        items: Vec<ListItem<'a>>,
        span: Span,
    },
    Quote {
        paragraphs: Vec<&'a str>,
        span: Span,
    },
    Code {
        info: &'a str,
        lines: Vec<&'a str>,
        span: Span,
    },
}

/// Which kind of block is open, for callers that only need to inspect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenKind {
    Paragraph,
    List(ListKind),
    Quote,
    Code,
}

/// Accumulates finished blocks while holding at most one open block.
///
/// Every operation that starts a different kind of block first closes the
/// open one, so blocks of different kinds can never interleave.
#[derive(Debug, Default)]
pub struct BlockBuilder<'a> {
    open: OpenBlock<'a>,
    blocks: Vec<Block<'a>>,
}

impl<'a> BlockBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_kind(&self) -> Option<OpenKind> {
        match &self.open {
            OpenBlock::None => None,
            OpenBlock::Paragraph { .. } => Some(OpenKind::Paragraph),
            OpenBlock::List { kind, .. } => Some(OpenKind::List(*kind)),
            OpenBlock::Quote { .. } => Some(OpenKind::Quote),
            OpenBlock::Code { .. } => Some(OpenKind::Code),
        }
    }

    pub fn in_code(&self) -> bool {
        matches!(self.open, OpenBlock::Code { .. })
    }

    /// Close whatever block is open and move it to the finished list.
    ///
    /// Code blocks closed this way are marked as unterminated; use
    /// [`BlockBuilder::close_code`] for a matching fence.
    pub fn close(&mut self) {
        self.finish(false);
    }

    /// Close an open code block at its closing fence.
    pub fn close_code(&mut self, fence: Span) {
        if let OpenBlock::Code { span, .. } = &mut self.open {
            *span = span.merge(fence);
            self.finish(true);
        }
    }

    fn finish(&mut self, fence_closed: bool) {
        let block = match std::mem::take(&mut self.open) {
            OpenBlock::None => return,
            OpenBlock::Paragraph { lines, span } => Block::Paragraph(Paragraph { lines, span }),
            OpenBlock::List { kind, items, span } => Block::List(List { kind, items, span }),
            OpenBlock::Quote { paragraphs, span } => Block::Quote(Quote { paragraphs, span }),
            OpenBlock::Code { info, lines, span } => Block::CodeBlock(CodeBlock {
                info,
                lines,
                closed: fence_closed,
                span,
            }),
        };
        self.blocks.push(block);
    }

    /// Emit a self-contained block (heading, rule, table).
    pub fn emit(&mut self, block: Block<'a>) {
        self.close();
        self.blocks.push(block);
    }

    pub fn open_code(&mut self, info: &'a str, fence: Span) {
        self.close();
        self.open = OpenBlock::Code {
            info,
            lines: Vec::new(),
            span: fence,
        };
    }

    /// Append a verbatim line to the open code block.
    ///
    /// Ignored when no code block is open.
    pub fn push_code_line(&mut self, text: &'a str, line_span: Span) {
        if let OpenBlock::Code { lines, span, .. } = &mut self.open {
            lines.push(text);
            *span = span.merge(line_span);
        }
    }

    pub fn push_paragraph_line(&mut self, text: &'a str, line_span: Span) {
        if let OpenBlock::Paragraph { lines, span } = &mut self.open {
            lines.push(text);
            *span = span.merge(line_span);
            return;
        }
        self.close();
        self.open = OpenBlock::Paragraph {
            lines: vec![text],
            span: line_span,
        };
    }

    /// Append a list item, opening (or switching) the list as needed.
    pub fn push_list_item(&mut self, kind: ListKind, text: &'a str, line_span: Span) {
        let item = ListItem {
            text,
            span: line_span,
        };
        if let OpenBlock::List {
            kind: open_kind,
            items,
            span,
        } = &mut self.open
        {
            if *open_kind == kind {
                items.push(item);
                *span = span.merge(line_span);
                return;
            }
        }
        self.close();
        self.open = OpenBlock::List {
            kind,
            items: vec![item],
            span: line_span,
        };
    }

    pub fn push_quote_paragraph(&mut self, text: &'a str, line_span: Span) {
        if let OpenBlock::Quote { paragraphs, span } = &mut self.open {
            paragraphs.push(text);
            *span = span.merge(line_span);
            return;
        }
        self.close();
        self.open = OpenBlock::Quote {
            paragraphs: vec![text],
            span: line_span,
        };
    }

    /// Close any open block and return everything built so far.
    pub fn finish_all(mut self) -> Vec<Block<'a>> {
        self.close();
        self.blocks
    }
}

/// Markdown block parser.
///
/// The parser keeps no state between calls besides the diagnostics buffer,
/// which is reset at the start of every parse.
#[derive(Debug, Default)]
pub struct Parser {
    diagnostics: Diagnostics,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the input into a block tree.
    pub fn parse<'a>(&mut self, input: &'a str) -> Document<'a> {
        self.parse_with_diagnostics(input).document
    }

    /// Parse the input, also returning the diagnostics found on the way.
    pub fn parse_with_diagnostics<'a>(&mut self, input: &'a str) -> ParseResult<'a> {
        self.diagnostics = Diagnostics::new();
        let document = self.parse_internal(input);
        ParseResult {
            document,
            diagnostics: std::mem::take(&mut self.diagnostics),
        }
    }

    fn parse_internal<'a>(&mut self, input: &'a str) -> Document<'a> {
        let mut lexer = Lexer::new(input);
        let mut builder = BlockBuilder::new();
        let mut fence_span = Span::default();

        while let Some(line) = lexer.next_line() {
            if let Some(info) = line.text.strip_prefix("```") {
                if builder.in_code() {
                    builder.close_code(line.span);
                } else {
                    fence_span = line.span;
                    builder.open_code(info.trim(), line.span);
                }
                continue;
            }

            if builder.in_code() {
                builder.push_code_line(line.text, line.span);
                continue;
            }

            self.dispatch(line, &mut lexer, &mut builder);
        }

        if builder.in_code() {
            self.diagnostics.push(Diagnostic::unclosed_fence(fence_span));
        }

        Document {
            blocks: builder.finish_all(),
            span: Span::new(0, input.len() as u32),
        }
    }

    /// Handle one line outside of a code block.
    fn dispatch<'a>(
        &mut self,
        line: Line<'a>,
        lexer: &mut Lexer<'a>,
        builder: &mut BlockBuilder<'a>,
    ) {
        if line.is_blank() {
            builder.close();
            return;
        }

        if is_thematic_break(line.text) {
            builder.emit(Block::ThematicBreak(line.span));
            return;
        }

        if let Some(rest) = line.text.strip_prefix('>') {
            builder.push_quote_paragraph(strip_one_whitespace(rest), line.span);
            return;
        }

        match heading_level(line.text) {
            Some((level, text)) if level <= MAX_HEADING_LEVEL => {
                builder.emit(Block::Heading(Heading {
                    level: level as u8,
                    text,
                    span: line.span,
                }));
                return;
            }
            Some((level, _)) => {
                self.diagnostics
                    .push(Diagnostic::heading_too_deep(level, line.span));
            }
            None => {}
        }

        if line.contains_pipe() {
            let separator = lexer
                .peek_line()
                .filter(|next| is_table_separator(next.text))
                .copied();
            if let Some(separator) = separator {
                lexer.next_line();
                let table = self.parse_table(line, separator, lexer);
                builder.emit(Block::Table(table));
                return;
            }
        }

        if let Some(text) = ordered_item(line.text) {
            builder.push_list_item(ListKind::Ordered, text, line.span);
            return;
        }

        if let Some(text) = unordered_item(line.text) {
            builder.push_list_item(ListKind::Unordered, text, line.span);
            return;
        }

        builder.push_paragraph_line(line.trimmed(), line.span);
    }

    /// Consume the body of a table whose header and separator are known.
    fn parse_table<'a>(
        &mut self,
        header_line: Line<'a>,
        separator: Line<'a>,
        lexer: &mut Lexer<'a>,
    ) -> Table<'a> {
        let mut header = split_table_row(header_line.text);
        let columns = header.len().max(split_table_row(separator.text).len());
        header.resize(columns, "");

        let mut rows = Vec::new();
        let mut span = header_line.span.merge(separator.span);

        loop {
            let row_line = match lexer.peek_line() {
                Some(next)
                    if !next.is_blank()
                        && next.contains_pipe()
                        && !is_table_separator(next.text) =>
                {
                    *next
                }
                _ => break,
            };
            lexer.next_line();

            let mut cells = split_table_row(row_line.text);
            if cells.len() > columns {
                self.diagnostics.push(Diagnostic::table_row_truncated(
                    cells.len(),
                    columns,
                    row_line.span,
                ));
            }
            cells.resize(columns, "");
            rows.push(cells);
            span = span.merge(row_line.span);
        }

        Table { header, rows, span }
    }
}

fn is_thematic_break(text: &str) -> bool {
    matches!(text.trim(), "---" | "***")
}

/// Drop a single leading whitespace character, if any.
fn strip_one_whitespace(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => text,
    }
}

/// Count leading `#` characters that are followed by whitespace.
///
/// Returns the level and the trimmed heading text; the level is not clamped
/// so callers can tell over-deep headings apart from plain text.
fn heading_level(text: &str) -> Option<(usize, &str)> {
    let level = text.bytes().take_while(|&b| b == b'#').count();
    if level == 0 {
        return None;
    }
    let rest = &text[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim()))
}

/// Text after a list marker: the marker must be followed by whitespace.
fn item_text(after_marker: &str) -> Option<&str> {
    if after_marker.starts_with(char::is_whitespace) {
        Some(after_marker.trim_start())
    } else {
        None
    }
}

fn ordered_item(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    item_text(text[digits..].strip_prefix('.')?)
}

fn unordered_item(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let rest = text.strip_prefix('-').or_else(|| text.strip_prefix('*'))?;
    item_text(rest)
}

/// Separator rows hold only pipes, dashes, colons and dots, with at least
/// one pipe and one dash.
pub fn is_table_separator(text: &str) -> bool {
    let trimmed = text.trim();
    if !trimmed.contains('|') {
        return false;
    }
    let mut has_dash = false;
    for c in trimmed.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '-' => has_dash = true,
            '|' | ':' | '.' => {}
            _ => return false,
        }
    }
    has_dash
}

/// Split a table row into trimmed cells, ignoring one outer pipe per side.
pub fn split_table_row(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(str::trim).collect()
}
