//! Integration tests for the vaultmark renderer

use pretty_assertions::assert_eq;
use vaultmark_core::ast::ListKind;
use vaultmark_core::{render, Block, DiagnosticKind, Parser, Span, EMPTY_DOCUMENT};

// ============================================================================
// Documented Properties
// ============================================================================

#[test]
fn test_render_is_repeatable() {
    let input = "`a` [[b]] #c ![d](e.png) [f](g)\n\n`h` [[i]]";
    let first = render(input);
    let second = render(input);
    assert_eq!(first, second);
    assert!(!first.contains('\u{0}'));
}

#[test]
fn test_script_is_escaped() {
    let html = render("<script>alert('x')</script>");
    assert_eq!(
        html,
        "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
    );
    assert!(!html.contains("<script>"));
}

#[test]
fn test_prose_entities() {
    assert_eq!(
        render(r#"Tom & "Jerry" 'x' <y>"#),
        "<p>Tom &amp; &quot;Jerry&quot; &#39;x&#39; &lt;y&gt;</p>"
    );
}

#[test]
fn test_fenced_code_is_not_interpreted() {
    assert_eq!(
        render("```\n# not a heading\n- nor a list\n| a | b |\n|---|---|\n```"),
        "<pre><code># not a heading\n- nor a list\n| a | b |\n|---|---|\n</code></pre>"
    );
}

#[test]
fn test_table_column_count_comes_from_header() {
    assert_eq!(
        render("A | B\n--|--\n1 | 2 | 3"),
        "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
         <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
    );
}

#[test]
fn test_wikilink_alias() {
    assert_eq!(
        render("[[Note Name|Click here]]"),
        r##"<p><a href="#" data-wikilink="Note%20Name">Click here</a></p>"##
    );
}

#[test]
fn test_unsafe_link_rejected() {
    let html = render("[x](javascript:alert(1))");
    assert_eq!(html, "<p>x)</p>");
    assert!(!html.contains("<a"));
}

#[test]
fn test_five_hashes_is_not_a_heading() {
    assert_eq!(render("##### Too deep"), "<p>##### Too deep</p>");
}

#[test]
fn test_empty_input_placeholder() {
    assert_eq!(render(""), EMPTY_DOCUMENT);
    assert_eq!(render("   \n  "), EMPTY_DOCUMENT);
    assert_eq!(
        EMPTY_DOCUMENT,
        r#"<div class="muted">Empty document. Click to edit…</div>"#
    );
}

// ============================================================================
// Block Tests
// ============================================================================

#[test]
fn test_headings_one_to_four() {
    assert_eq!(
        render("# A\n## B\n### C\n#### D"),
        "<h1>A</h1><h2>B</h2><h3>C</h3><h4>D</h4>"
    );
}

#[test]
fn test_heading_inline_markup() {
    assert_eq!(
        render("## Hello **world**  "),
        "<h2>Hello <strong>world</strong></h2>"
    );
}

#[test]
fn test_hash_without_space_is_a_tag_not_a_heading() {
    assert_eq!(
        render("#inbox"),
        r#"<p><span class="tag" data-tag="inbox">#inbox</span></p>"#
    );
}

#[test]
fn test_paragraph_lines_join_with_space() {
    assert_eq!(
        render("line one\n  line two  \n\nnext"),
        "<p>line one line two</p><p>next</p>"
    );
}

#[test]
fn test_lists_switch_kind() {
    assert_eq!(
        render("- a\n* b\n1. c\n2. d\n- e"),
        "<ul><li>a</li><li>b</li></ul><ol><li>c</li><li>d</li></ol><ul><li>e</li></ul>"
    );
}

#[test]
fn test_paragraph_closes_list() {
    assert_eq!(
        render("- a\ntext"),
        "<ul><li>a</li></ul><p>text</p>"
    );
}

#[test]
fn test_blockquote_lines_are_paragraphs() {
    assert_eq!(
        render("> a\n>b\n>  c\nd"),
        "<blockquote><p>a</p><p>b</p><p> c</p></blockquote><p>d</p>"
    );
}

#[test]
fn test_horizontal_rules() {
    assert_eq!(
        render("a\n---\n  ***  \nb"),
        "<p>a</p><hr /><hr /><p>b</p>"
    );
}

#[test]
fn test_unterminated_fence_is_closed() {
    assert_eq!(
        render("```rust\nfn main() {}\n"),
        "<pre><code>fn main() {}\n</code></pre>"
    );
}

#[test]
fn test_unterminated_fence_keeps_only_written_lines() {
    // The final newline ends the last line; it does not add an empty one.
    assert_eq!(render("```\ncode\n"), "<pre><code>code\n</code></pre>");
    assert_eq!(render("```\ncode\n\n"), "<pre><code>code\n\n</code></pre>");
    assert_eq!(render("```\ncode"), "<pre><code>code\n</code></pre>");

    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics("```\ncode\n");
    assert!(result.diagnostics.has(DiagnosticKind::UnclosedFence));
}

#[test]
fn test_fence_closes_open_list() {
    assert_eq!(
        render("- a\n```\n<x>\n```\nafter"),
        "<ul><li>a</li></ul><pre><code>&lt;x&gt;\n</code></pre><p>after</p>"
    );
}

#[test]
fn test_table_rows_are_padded() {
    assert_eq!(
        render("| a | b | c |\n|---|---|\n| 1 |"),
        "<table><thead><tr><th>a</th><th>b</th><th>c</th></tr></thead>\
         <tbody><tr><td>1</td><td></td><td></td></tr></tbody></table>"
    );
}

#[test]
fn test_table_ends_at_line_without_pipe() {
    assert_eq!(
        render("a|b\n-|-\n1|2\nafter"),
        "<table><thead><tr><th>a</th><th>b</th></tr></thead>\
         <tbody><tr><td>1</td><td>2</td></tr></tbody></table><p>after</p>"
    );
}

#[test]
fn test_pipe_without_separator_is_text() {
    assert_eq!(render("a | b\nc | d"), "<p>a | b c | d</p>");
}

#[test]
fn test_crlf_input() {
    assert_eq!(render("# A\r\n\r\ntext\r\n"), "<h1>A</h1><p>text</p>");
}

// ============================================================================
// Inline Tests
// ============================================================================

#[test]
fn test_code_span_is_literal() {
    assert_eq!(
        render("`**x** <b> [[y]] #z`"),
        "<p><code>**x** &lt;b&gt; [[y]] #z</code></p>"
    );
}

#[test]
fn test_bold_and_italic() {
    assert_eq!(
        render("**bold** and *italic*"),
        "<p><strong>bold</strong> and <em>italic</em></p>"
    );
}

#[test]
fn test_tags() {
    assert_eq!(
        render("Tagged #project/alpha and #todo."),
        r#"<p>Tagged <span class="tag" data-tag="project/alpha">#project/alpha</span> and <span class="tag" data-tag="todo">#todo</span>.</p>"#
    );
}

#[test]
fn test_tag_not_inside_words_or_urls() {
    assert_eq!(render("issue#42 a/#b"), "<p>issue#42 a/#b</p>");
}

#[test]
fn test_fragment_link_is_not_a_tag() {
    assert_eq!(render("[Top](#top)"), r##"<p><a href="#top">Top</a></p>"##);
}

#[test]
fn test_hash_inside_link_destination_is_not_a_tag() {
    assert_eq!(
        render("[x](http://a.com/b?c=#d) #real"),
        r#"<p><a href="http://a.com/b?c=#d" rel="noreferrer noopener" target="_blank">x</a> <span class="tag" data-tag="real">#real</span></p>"#
    );
    assert_eq!(
        render("(#open"),
        r#"<p>(<span class="tag" data-tag="open">#open</span></p>"#
    );
}

#[test]
fn test_external_link() {
    assert_eq!(
        render("[Site](https://example.com/?a=1&b=2)"),
        r#"<p><a href="https://example.com/?a=1&amp;b=2" rel="noreferrer noopener" target="_blank">Site</a></p>"#
    );
}

#[test]
fn test_link_scheme_checks() {
    assert_eq!(render("[a](JavaScript:x)"), "<p>a</p>");
    assert_eq!(render("[a](vbscript:x)"), "<p>a</p>");
    assert_eq!(render("[a](java\tscript:x)"), "<p>a</p>");
    assert_eq!(render("[a]( )"), "<p>a</p>");
}

#[test]
fn test_image() {
    assert_eq!(
        render("![A *cat*](cat.png)"),
        r#"<p><img src="cat.png" alt="A cat" /></p>"#
    );
}

#[test]
fn test_unsafe_image_falls_back_to_alt() {
    assert_eq!(render("![pic](data:image/png;base64,xx)"), "<p>pic</p>");
}

#[test]
fn test_wikilink_plain_and_heading() {
    assert_eq!(
        render("[[Note#Section]]"),
        r##"<p><a href="#" data-wikilink="Note">Note#Section</a></p>"##
    );
}

#[test]
fn test_wikilink_encoding() {
    assert_eq!(
        render("[[a&b/c]]"),
        r##"<p><a href="#" data-wikilink="a%26b%2Fc">a&amp;b/c</a></p>"##
    );
}

#[test]
fn test_wikilink_without_target() {
    assert_eq!(render("[[#Section|Label]]"), "<p>Label</p>");
    assert_eq!(render("[[ | <b> ]]"), "<p>&lt;b&gt;</p>");
}

#[test]
fn test_wikilink_around_code_span_is_text() {
    assert_eq!(render("[[`x`]]"), "<p><code>x</code></p>");
    assert_eq!(render("[[`x`|see]]"), "<p>see</p>");
    assert!(!render("[[a `b` c]]").contains("data-wikilink"));
}

#[test]
fn test_wikilink_label_keeps_pipes() {
    assert_eq!(
        render("[[T|a|b]]"),
        r##"<p><a href="#" data-wikilink="T">a|b</a></p>"##
    );
}

#[test]
fn test_link_wrapping_code() {
    assert_eq!(
        render("[`cfg`](#config)"),
        r##"<p><a href="#config"><code>cfg</code></a></p>"##
    );
}

// ============================================================================
// Parser Tests
// ============================================================================

#[test]
fn test_block_tree_and_spans() {
    let input = "# Title\n\n- a\n- b";
    let mut parser = Parser::new();
    let doc = parser.parse(input);

    assert_eq!(doc.blocks.len(), 2);
    match &doc.blocks[0] {
        Block::Heading(h) => {
            assert_eq!(h.level, 1);
            assert_eq!(h.text, "Title");
            assert_eq!(h.span, Span::new(0, 7));
        }
        other => panic!("Expected heading, got {:?}", other),
    }
    match &doc.blocks[1] {
        Block::List(list) => {
            assert_eq!(list.kind, ListKind::Unordered);
            assert_eq!(list.items.len(), 2);
            assert_eq!(list.span.slice(input), "- a\n- b");
        }
        other => panic!("Expected list, got {:?}", other),
    }
}

#[test]
fn test_code_block_info_string() {
    let mut parser = Parser::new();
    let doc = parser.parse("```rust \nlet x = 1;\n```");
    match &doc.blocks[0] {
        Block::CodeBlock(code) => {
            assert_eq!(code.info, "rust");
            assert_eq!(code.lines, vec!["let x = 1;"]);
            assert!(code.closed);
        }
        other => panic!("Expected code block, got {:?}", other),
    }
}

#[test]
fn test_stats() {
    let mut parser = Parser::new();
    let doc = parser.parse("# A\n\ntext\n\n- a\n- b\n\n> q\n\n```\nx\n```\n\na|b\n-|-\n\n---");
    let stats = doc.stats();
    assert_eq!(stats.headings, 1);
    assert_eq!(stats.paragraphs, 1);
    assert_eq!(stats.lists, 1);
    assert_eq!(stats.list_items, 2);
    assert_eq!(stats.quotes, 1);
    assert_eq!(stats.code_blocks, 1);
    assert_eq!(stats.tables, 1);
    assert_eq!(stats.rules, 1);
    assert_eq!(stats.total_blocks(), 7);
}

#[test]
fn test_parser_is_reusable() {
    let mut parser = Parser::new();
    let first = parser.parse_with_diagnostics("```");
    assert_eq!(first.diagnostics.len(), 1);
    let second = parser.parse_with_diagnostics("plain");
    assert!(second.diagnostics.is_empty());
}

// ============================================================================
// Diagnostic Tests
// ============================================================================

#[test]
fn test_diagnostic_unclosed_fence() {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics("text\n```js\ncode");
    assert!(result.diagnostics.has(DiagnosticKind::UnclosedFence));
    let diagnostic = result.diagnostics.iter().next().map(|d| d.span);
    assert_eq!(diagnostic, Some(Span::new(5, 10)));
}

#[test]
fn test_diagnostic_heading_too_deep() {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics("###### six");
    assert!(result.diagnostics.has(DiagnosticKind::HeadingTooDeep));
    assert!(matches!(result.document.blocks[0], Block::Paragraph(_)));
}

#[test]
fn test_diagnostic_table_row_truncated() {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics("A | B\n--|--\n1 | 2 | 3");
    let messages: Vec<String> = result.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        messages,
        vec!["table row has 3 cells but the table has 2 columns at bytes 12..21"]
    );
}

#[test]
fn test_clean_document_has_no_diagnostics() {
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics("# Title\n\n- item\n\n```\ncode\n```");
    assert!(result.diagnostics.is_empty());
}
