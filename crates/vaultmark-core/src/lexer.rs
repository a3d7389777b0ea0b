//! Line splitter feeding the block parser.
//!
//! Splits the document on `\n`, `\r\n` and lone `\r`, borrowing every line
//! from the input. Newline scanning goes through `memchr`, which is
//! SIMD-accelerated on supported platforms.
//!
//! A trailing line terminator does not produce an extra empty line:
//! `"a\n"` and `"a"` both yield the single line `a`.

use crate::span::Span;
use memchr::memchr2;

/// A single line of input, without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text.
    pub text: &'a str,
    /// Byte span in the original input.
    pub span: Span,
}

impl<'a> Line<'a> {
    /// Check if this line contains only whitespace.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    #[inline]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    #[inline]
    pub fn contains_pipe(&self) -> bool {
        memchr::memchr(b'|', self.text.as_bytes()).is_some()
    }
}

/// Forward-only line reader with one line of lookahead.
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    peeked: Option<Line<'a>>,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            peeked: None,
        }
    }

    /// Byte offset of the next unread line.
    #[inline]
    pub fn offset(&self) -> u32 {
        match &self.peeked {
            Some(line) => line.span.start,
            None => self.offset as u32,
        }
    }

    /// Check if all input has been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.peeked.is_none() && self.offset >= self.input.len()
    }

    /// Look at the next line without consuming it.
    #[inline]
    pub fn peek_line(&mut self) -> Option<&Line<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line();
        }
        self.peeked.as_ref()
    }

    /// Consume and return the next line.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if let Some(line) = self.peeked.take() {
            return Some(line);
        }
        self.read_line()
    }

    fn read_line(&mut self) -> Option<Line<'a>> {
        let bytes = self.input.as_bytes();
        if self.offset >= bytes.len() {
            return None;
        }

        let start = self.offset;
        let (end, next) = match memchr2(b'\n', b'\r', &bytes[start..]) {
            Some(pos) => {
                let end = start + pos;
                let width = if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                (end, end + width)
            }
            None => (bytes.len(), bytes.len()),
        };
        self.offset = next;

        // Line breaks are ASCII, so both ends sit on char boundaries.
        Some(Line {
            text: &self.input[start..end],
            span: Span::new(start as u32, end as u32),
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
