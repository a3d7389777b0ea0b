use crate::span::Span;
use std::fmt;

/// Categories of suspicious-but-accepted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A code fence was still open at end of input and was closed implicitly.
    UnclosedFence,
    /// Five or more `#` before whitespace; the line was rendered as text.
    HeadingTooDeep,
    /// A table body row had more cells than the header; extras were dropped.
    TableRowTruncated,
}

impl DiagnosticKind {
    /// Stable identifier used in machine-readable output.
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnclosedFence => "unclosed-fence",
            DiagnosticKind::HeadingTooDeep => "heading-too-deep",
            DiagnosticKind::TableRowTruncated => "table-row-truncated",
        }
    }
}

/// A non-fatal observation made while parsing.
///
/// Diagnostics never change the rendered output; they exist so tooling can
/// point at input that probably does not render the way the author meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// Source location the message refers to
    pub span: Span,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn unclosed_fence(span: Span) -> Self {
        Self {
            message: "code fence is never closed".to_string(),
            span,
            kind: DiagnosticKind::UnclosedFence,
        }
    }

    pub fn heading_too_deep(level: usize, span: Span) -> Self {
        Self {
            message: format!("heading level {} is not supported, rendered as text", level),
            span,
            kind: DiagnosticKind::HeadingTooDeep,
        }
    }

    pub fn table_row_truncated(cells: usize, columns: usize, span: Span) -> Self {
        Self {
            message: format!(
                "table row has {} cells but the table has {} columns",
                cells, columns
            ),
            span,
            kind: DiagnosticKind::TableRowTruncated,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at bytes {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

/// Diagnostics collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Check whether any diagnostic of `kind` was recorded.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.items.iter().any(|d| d.kind == kind)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
