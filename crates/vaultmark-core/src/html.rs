//! HTML output: escaping helpers, the URL safety filter and the block writer.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::ast::{Block, CodeBlock, Document, List, Quote, Table};
use crate::inline::render_inline;

/// Output for documents that produce no HTML at all.
pub const EMPTY_DOCUMENT: &str = r#"<div class="muted">Empty document. Click to edit…</div>"#;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// URL schemes that can execute script when followed.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

/// Append `text` to `out` with `& < > " '` replaced by entities.
pub fn push_escaped(out: &mut String, text: &str) {
    let mut last = 0;
    for (i, b) in text.bytes().enumerate() {
        let entity = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(entity);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}

/// Escape `text` for use in element content or a double-quoted attribute.
///
/// ```rust
/// use vaultmark_core::html::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    push_escaped(&mut out, text);
    out
}

/// Percent-encode `text` the way `encodeURIComponent` does.
pub fn encode_uri_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// URL safety filter for link and image targets.
///
/// Returns the trimmed href, or `None` when it is empty or uses a scheme
/// that can run script. Tabs, newlines and other control characters are
/// ignored while checking the scheme, since browsers drop them too.
///
/// ```rust
/// use vaultmark_core::html::safe_href;
///
/// assert_eq!(safe_href(" https://example.com "), Some("https://example.com"));
/// assert_eq!(safe_href("JavaScript:alert(1)"), None);
/// ```
pub fn safe_href(href: &str) -> Option<&str> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }
    let scheme: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .flat_map(char::to_lowercase)
        .collect();
    if BLOCKED_SCHEMES.iter().any(|blocked| scheme.starts_with(blocked)) {
        return None;
    }
    Some(trimmed)
}

/// Render a parsed document to an HTML fragment.
pub fn render_document(doc: &Document<'_>) -> String {
    let mut out = String::with_capacity(doc.span.len() as usize * 3 / 2);
    for block in &doc.blocks {
        write_block(&mut out, block);
    }
    if out.is_empty() {
        return EMPTY_DOCUMENT.to_string();
    }
    out
}

fn write_block(out: &mut String, block: &Block<'_>) {
    match block {
        Block::Heading(h) => {
            out.push_str(&format!("<h{}>", h.level));
            out.push_str(&render_inline(h.text));
            out.push_str(&format!("</h{}>", h.level));
        }
        Block::Paragraph(p) => {
            out.push_str("<p>");
            out.push_str(&render_inline(&p.lines.join(" ")));
            out.push_str("</p>");
        }
        Block::List(list) => write_list(out, list),
        Block::Quote(quote) => write_quote(out, quote),
        Block::CodeBlock(code) => write_code(out, code),
        Block::Table(table) => write_table(out, table),
        Block::ThematicBreak(_) => out.push_str("<hr />"),
    }
}

fn write_list(out: &mut String, list: &List<'_>) {
    let tag = list.kind.tag();
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for item in &list.items {
        out.push_str("<li>");
        out.push_str(&render_inline(item.text));
        out.push_str("</li>");
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_quote(out: &mut String, quote: &Quote<'_>) {
    out.push_str("<blockquote>");
    for paragraph in &quote.paragraphs {
        out.push_str("<p>");
        out.push_str(&render_inline(paragraph));
        out.push_str("</p>");
    }
    out.push_str("</blockquote>");
}

fn write_code(out: &mut String, code: &CodeBlock<'_>) {
    out.push_str("<pre><code>");
    for line in &code.lines {
        if line.contains('\0') {
            push_escaped(out, &line.replace('\0', "\u{FFFD}"));
        } else {
            push_escaped(out, line);
        }
        out.push('\n');
    }
    out.push_str("</code></pre>");
}

fn write_table(out: &mut String, table: &Table<'_>) {
    out.push_str("<table><thead><tr>");
    for cell in &table.header {
        out.push_str("<th>");
        out.push_str(&render_inline(cell));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&render_inline(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}
