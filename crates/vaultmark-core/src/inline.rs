//! Inline renderer.
//!
//! Works on the text of one block in a fixed sequence of passes. Constructs
//! that produce finished HTML (code spans, wikilinks, tags, images, links)
//! are swapped for placeholder tokens so later passes, escaping included,
//! never touch them. The tokens are put back in one pass at the end; a
//! fragment that captured older tokens has them expanded in place.
//!
//! Every pass is a left-to-right scan driven by `memchr`; a failed match
//! moves on by one byte, so the output matches what a regex engine would
//! produce for the same patterns.

use std::borrow::Cow;
use std::ops::Range;

use memchr::{memchr, memmem};

use crate::html::{encode_uri_component, escape_html, safe_href};

/// Placeholder delimiter. Input text never contains it after sanitising.
const SENTINEL: char = '\u{0}';

/// Render inline Markdown to HTML.
///
/// ```rust
/// use vaultmark_core::inline::render_inline;
///
/// assert_eq!(render_inline("**a** & b"), "<strong>a</strong> &amp; b");
/// ```
pub fn render_inline(text: &str) -> String {
    InlineRenderer::new().render(text)
}

/// Holds the protected fragments for one inline run.
#[derive(Debug, Default)]
struct InlineRenderer {
    fragments: Vec<String>,
}

impl InlineRenderer {
    fn new() -> Self {
        Self::default()
    }

    fn render(&mut self, text: &str) -> String {
        let text = sanitize(text);

        let s = rewrite(&text, b'`', |s, at| self.code_span(s, at));
        let s = rewrite(&s, b'[', |s, at| self.wikilink(s, at));
        let destinations = link_destinations(&s);
        let s = rewrite(&s, b'#', |s, at| self.tag(s, at, &destinations));
        let s = escape_html(&s);
        let s = rewrite(&s, b'*', strong);
        let s = rewrite(&s, b'*', emphasis);
        let s = rewrite(&s, b'!', |s, at| self.image(s, at));
        let s = rewrite(&s, b'[', |s, at| self.link(s, at));

        self.restore(&s)
    }

    /// Store a finished fragment and return the token that stands for it.
    fn protect(&mut self, html: String) -> String {
        let token = format!("{SENTINEL}T{}{SENTINEL}", self.fragments.len());
        self.fragments.push(html);
        token
    }

    /// Replace every token in `s` with its fragment.
    fn restore(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        self.expand_into(&mut out, s, self.fragments.len());
        out
    }

    /// Copy `s` into `out`, expanding tokens with an id below `limit`.
    ///
    /// A fragment only ever contains tokens created before it, so passing
    /// its own id as the next limit bounds the recursion.
    fn expand_into(&self, out: &mut String, s: &str, limit: usize) {
        let bytes = s.as_bytes();
        let mut copied = 0;
        let mut pos = 0;
        while let Some(found) = memchr(SENTINEL as u8, &bytes[pos..]) {
            let at = pos + found;
            match parse_token(s, at).filter(|&(id, _)| id < limit) {
                Some((id, end)) => {
                    out.push_str(&s[copied..at]);
                    self.expand_into(out, &self.fragments[id], id);
                    copied = end;
                    pos = end;
                }
                None => pos = at + 1,
            }
        }
        out.push_str(&s[copied..]);
    }

    /// `` `code` ``
    fn code_span(&mut self, s: &str, at: usize) -> Option<(usize, String)> {
        let close = find_after(s, b'`', at + 1)?;
        let content = non_empty(&s[at + 1..close])?;
        let html = format!("<code>{}</code>", escape_html(content));
        Some((close + 1, self.protect(html)))
    }

    /// `[[target]]`, `[[target|label]]`, `[[target#heading|label]]`
    fn wikilink(&mut self, s: &str, at: usize) -> Option<(usize, String)> {
        if s.as_bytes().get(at + 1) != Some(&b'[') {
            return None;
        }
        let close = find_after(s, b']', at + 2)?;
        if s.as_bytes().get(close + 1) != Some(&b']') {
            return None;
        }
        let inner = non_empty(&s[at + 2..close])?;

        let (target, label) = match inner.split_once('|') {
            Some((target, label)) => (target.trim(), label.trim()),
            None => (inner.trim(), inner.trim()),
        };
        let label = if label.is_empty() { target } else { label };
        let file = target.split('#').next().unwrap_or_default().trim();

        // A code span inside the brackets leaves no usable target.
        let html = if file.is_empty() || file.contains(SENTINEL) {
            escape_html(label)
        } else {
            format!(
                r##"<a href="#" data-wikilink="{}">{}</a>"##,
                escape_html(&encode_uri_component(file)),
                escape_html(label)
            )
        };
        Some((close + 2, self.protect(html)))
    }

    /// `#tag`, `#nested/tag`
    ///
    /// Never inside a `](...)` link destination.
    fn tag(
        &mut self,
        s: &str,
        at: usize,
        destinations: &[Range<usize>],
    ) -> Option<(usize, String)> {
        let i = destinations.partition_point(|d| d.end <= at);
        if destinations.get(i).is_some_and(|d| d.start <= at) {
            return None;
        }
        if let Some(prev) = s[..at].chars().next_back() {
            if prev.is_alphanumeric() || prev == '_' || prev == '/' {
                return None;
            }
        }

        let rest = &s[at + 1..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_tag_char(c))
            .map_or(rest.len(), |(i, _)| i);
        let name = non_empty(&rest[..len])?;

        let name = escape_html(name);
        let html = format!(r#"<span class="tag" data-tag="{name}">#{name}</span>"#);
        Some((at + 1 + len, self.protect(html)))
    }

    /// `![alt](src)`
    fn image(&mut self, s: &str, at: usize) -> Option<(usize, String)> {
        if s.as_bytes().get(at + 1) != Some(&b'[') {
            return None;
        }
        let (alt, href, end) = bracket_target(s, at + 1, true)?;

        let alt_text = strip_tags(&self.restore(alt));
        let html = match accept_href(href) {
            Some(href) => self.protect(format!(r#"<img src="{href}" alt="{alt_text}" />"#)),
            None => alt_text,
        };
        Some((end, html))
    }

    /// `[label](href)`
    fn link(&mut self, s: &str, at: usize) -> Option<(usize, String)> {
        let (label, href, end) = bracket_target(s, at, false)?;
        let html = match accept_href(href) {
            Some(href) => {
                let rel = if href.starts_with('#') {
                    ""
                } else {
                    r#" rel="noreferrer noopener" target="_blank""#
                };
                self.protect(format!(r#"<a href="{href}"{rel}>{label}</a>"#))
            }
            None => label.to_string(),
        };
        Some((end, html))
    }
}

/// Scan `s` for `trigger` and let `matcher` replace the construct starting
/// there. The matcher returns the end of the match and its replacement.
fn rewrite<F>(s: &str, trigger: u8, mut matcher: F) -> String
where
    F: FnMut(&str, usize) -> Option<(usize, String)>,
{
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(found) = memchr(trigger, &bytes[pos..]) {
        let at = pos + found;
        match matcher(s, at) {
            Some((end, replacement)) => {
                out.push_str(&s[copied..at]);
                out.push_str(&replacement);
                copied = end;
                pos = end;
            }
            None => pos = at + 1,
        }
    }

    out.push_str(&s[copied..]);
    out
}

fn strong(s: &str, at: usize) -> Option<(usize, String)> {
    if s.as_bytes().get(at + 1) != Some(&b'*') {
        return None;
    }
    let close = find_after(s, b'*', at + 2)?;
    if s.as_bytes().get(close + 1) != Some(&b'*') {
        return None;
    }
    let content = non_empty(&s[at + 2..close])?;
    Some((close + 2, format!("<strong>{content}</strong>")))
}

fn emphasis(s: &str, at: usize) -> Option<(usize, String)> {
    let close = find_after(s, b'*', at + 1)?;
    let content = non_empty(&s[at + 1..close])?;
    Some((close + 1, format!("<em>{content}</em>")))
}

/// Match `[text](target)` with the `[` at `open`.
///
/// Returns the bracket text, the raw target and the end offset. The target
/// must not be empty; the text may be empty only when `empty_text` is set.
fn bracket_target(s: &str, open: usize, empty_text: bool) -> Option<(&str, &str, usize)> {
    let close = find_after(s, b']', open + 1)?;
    if s.as_bytes().get(close + 1) != Some(&b'(') {
        return None;
    }
    let paren = find_after(s, b')', close + 2)?;
    let text = &s[open + 1..close];
    if text.is_empty() && !empty_text {
        return None;
    }
    let target = non_empty(&s[close + 2..paren])?;
    Some((text, target, paren + 1))
}

/// URL filter plus the rule that a target may not swallow a placeholder.
fn accept_href(href: &str) -> Option<&str> {
    if href.contains(SENTINEL) {
        return None;
    }
    safe_href(href)
}

/// Byte ranges between `](` and the next `)`, in order.
fn link_destinations(s: &str) -> Vec<Range<usize>> {
    let bytes = s.as_bytes();
    let mut ranges = Vec::new();
    let mut pos = 0;
    while let Some(found) = memmem::find(&bytes[pos..], b"](") {
        let start = pos + found + 2;
        let Some(end) = find_after(s, b')', start) else {
            break;
        };
        ranges.push(start..end);
        pos = end + 1;
    }
    ranges
}

/// Parse `\0T{id}\0` at `at`, returning the id and the end offset.
fn parse_token(s: &str, at: usize) -> Option<(usize, usize)> {
    let rest = s.get(at + 1..)?.strip_prefix('T')?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || rest.as_bytes().get(digits) != Some(&(SENTINEL as u8)) {
        return None;
    }
    let id = rest[..digits].parse().ok()?;
    Some((id, at + 2 + digits + 1))
}

fn find_after(s: &str, needle: u8, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if from > bytes.len() {
        return None;
    }
    memchr(needle, &bytes[from..]).map(|i| from + i)
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
}

fn sanitize(text: &str) -> Cow<'_, str> {
    if text.contains(SENTINEL) {
        Cow::Owned(text.replace(SENTINEL, "\u{FFFD}"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Drop everything between `<` and `>`. Input is already escaped, so the
/// only angle brackets left are from generated markup.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
