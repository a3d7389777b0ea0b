//! # Vaultmark Core
//!
//! Markdown renderer for personal note vaults.
//!
//! Turns Markdown with Obsidian-style `[[wikilinks]]` and `#tags` into an
//! HTML fragment. Parsing is a single forward pass over lines that never
//! fails: anything that does not form a construct is rendered as escaped
//! text.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = vaultmark_core::render("# Notes\n\nSee [[Daily Log|today]].");
//! assert_eq!(
//!     html,
//!     r##"<h1>Notes</h1><p>See <a href="#" data-wikilink="Daily%20Log">today</a>.</p>"##
//! );
//! ```
//!
//! ## Block tree and diagnostics
//!
//! The block tree can be inspected before rendering, together with
//! diagnostics for input that was accepted but probably not meant that way:
//!
//! ```rust
//! use vaultmark_core::{render_document, DiagnosticKind, Parser};
//!
//! let mut parser = Parser::new();
//! let result = parser.parse_with_diagnostics("```\nlet x = 1;");
//!
//! assert_eq!(result.document.blocks.len(), 1);
//! assert!(result.diagnostics.has(DiagnosticKind::UnclosedFence));
//! assert_eq!(
//!     render_document(&result.document),
//!     "<pre><code>let x = 1;\n</code></pre>"
//! );
//! ```

pub mod ast;
pub mod diagnostic;
pub mod html;
pub mod inline;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::{Block, Document, DocumentStats, ListKind};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use html::{render_document, EMPTY_DOCUMENT};
pub use parser::{ParseResult, Parser};
pub use span::Span;

/// Render Markdown to an HTML fragment.
///
/// Never fails. Input that yields no blocks renders as [`EMPTY_DOCUMENT`].
pub fn render(markdown: &str) -> String {
    let mut parser = Parser::new();
    render_document(&parser.parse(markdown))
}
