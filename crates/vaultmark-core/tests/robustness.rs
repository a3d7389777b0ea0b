//! Robustness sweep: damaged and truncated notes must still render.
//!
//! Every variant is checked for three things: rendering does not panic, the
//! block-level tags in the output are balanced, and no placeholder token
//! leaks into the HTML.

use std::time::{Duration, Instant};

use vaultmark_core::{render, Parser};

type MutationList = &'static [&'static str];

struct Lcg {
    state: u64,
}

const SEED: u64 = 0x5eed;
const MAX_MUTATION_STEPS: usize = 3;
const VARIANT_COUNT: usize = 32;

const MUTATIONS: MutationList = &[
    "drop_code_fence_end",
    "drop_table_bar",
    "drop_blank_line",
    "truncate_tail",
    "strip_list_dash",
    "break_wikilink",
    "unbalance_emphasis",
    "nul_noise",
    "crlf",
];

const NOTE: &str = r#"# Project log

Started the **vaultmark** rewrite today. Links: [[Roadmap]], [[Ideas|ideas]]
and the [tracker](https://example.com/issues?state=open&sort=new). #log/2024

## Tasks

- Split the `lexer` out
- Add *tags* support #feature
- Fix [[Bugs#Rendering|rendering bugs]]

1. Parse
2. Render
3. Ship

```rust
fn main() {
    println!("<hello & goodbye>");
}
```

| Step | Owner | Done |
|------|:-----:|------|
| Parse | me | yes |
| Render | you | no |

> Keep it simple.
> Then make it simpler.

---

![screenshot](images/shot.png) and ![bad](javascript:alert(1))
"#;

const BLOCK_TAGS: &[&str] = &[
    "p",
    "ul",
    "ol",
    "li",
    "blockquote",
    "table",
    "thead",
    "tbody",
    "tr",
    "th",
    "td",
    "pre",
    "code",
    "h1",
    "h2",
    "h3",
    "h4",
];

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn choose(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn apply_mutations(mut input: String, rng: &mut Lcg) -> String {
    for _ in 0..MAX_MUTATION_STEPS {
        match MUTATIONS[rng.choose(MUTATIONS.len())] {
            "drop_code_fence_end" => {
                if let Some(pos) = input.rfind("```\n") {
                    input.replace_range(pos..pos + 4, "");
                }
            }
            "drop_table_bar" => {
                if let Some(pos) = input.find("|------|") {
                    input.replace_range(pos..pos + 8, "------");
                }
            }
            "drop_blank_line" => {
                if let Some(pos) = input.find("\n\n") {
                    input.replace_range(pos..pos + 2, "\n");
                }
            }
            "truncate_tail" => {
                let len = input.len();
                if len > 8 {
                    let cut = rng.choose(len / 4).max(1);
                    let at = floor_char_boundary(&input, len - cut);
                    input.truncate(at);
                }
            }
            "strip_list_dash" => {
                if let Some(pos) = input.find("- ") {
                    input.replace_range(pos..pos + 2, "");
                }
            }
            "break_wikilink" => {
                if let Some(pos) = input.find("]]") {
                    input.replace_range(pos..pos + 2, "]");
                }
            }
            "unbalance_emphasis" => {
                if let Some(pos) = input.find("**") {
                    input.replace_range(pos..pos + 2, "*");
                }
            }
            "nul_noise" => {
                let at = floor_char_boundary(&input, rng.choose(input.len()));
                input.insert_str(at, "\u{0}T0\u{0}");
            }
            "crlf" => {
                input = input.replace('\n', "\r\n");
            }
            _ => {}
        }
    }
    input
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

fn assert_well_formed(input: &str) {
    let html = render(input);
    assert!(!html.is_empty());
    assert!(
        !html.contains('\u{0}'),
        "placeholder leaked for input {:?}",
        input
    );
    for tag in BLOCK_TAGS {
        let open = count(&html, &format!("<{}>", tag));
        let close = count(&html, &format!("</{}>", tag));
        assert_eq!(open, close, "unbalanced <{}> for input {:?}", tag, input);
    }
    assert!(
        !html.contains("=\"javascript:"),
        "unsafe href for {:?}",
        input
    );
}

#[test]
fn test_reference_note_renders_cleanly() {
    assert_well_formed(NOTE);
    let mut parser = Parser::new();
    let result = parser.parse_with_diagnostics(NOTE);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.document.stats().code_blocks, 1);
    assert_eq!(result.document.stats().tables, 1);
}

#[test]
fn test_every_prefix_renders() {
    let mut end = 0;
    while end <= NOTE.len() {
        if NOTE.is_char_boundary(end) {
            assert_well_formed(&NOTE[..end]);
        }
        end += 1;
    }
}

#[test]
fn test_mutated_notes_render() {
    let mut rng = Lcg::new(SEED);
    for _ in 0..VARIANT_COUNT {
        let variant = apply_mutations(NOTE.to_string(), &mut rng);
        assert_well_formed(&variant);
        assert_eq!(render(&variant), render(&variant));
    }
}

#[test]
fn test_pathological_inputs() {
    let inputs = [
        "```",
        "```\n```\n```",
        "|",
        "|\n|-",
        "[[",
        "]]",
        "[[]]",
        "[]()",
        "![]()",
        "![](",
        "****",
        "* * *",
        "#",
        "# ",
        "#####",
        ">",
        "> ",
        "1.",
        "1. ",
        "- ",
        "`",
        "``",
        "\u{0}",
        "\r",
        "\r\n\r\n",
        "é#tag ü*x*",
    ];
    for input in inputs {
        assert_well_formed(input);
    }
}

/// An index note: one wikilink per line, all soft-wrapped into one paragraph.
fn index_note(links: usize) -> String {
    (0..links).map(|i| format!("[[Note {i}]] #t{i}\n")).collect()
}

/// Fastest of three renders.
fn render_time(input: &str) -> Duration {
    (0..3)
        .map(|_| {
            let start = Instant::now();
            let html = render(input);
            let elapsed = start.elapsed();
            assert!(!html.contains('\u{0}'));
            elapsed
        })
        .min()
        .unwrap_or_default()
}

#[test]
fn test_many_fragments_render_in_linear_time() {
    let small = index_note(2_000);
    let large = index_note(16_000);

    let html = render(&large);
    assert!(html.starts_with(r##"<p><a href="#" data-wikilink="Note%200">Note 0</a> "##));
    assert!(html.contains(r#"data-tag="t15999""#));
    assert_eq!(html.matches("data-wikilink").count(), 16_000);

    // Eight times the input; a quadratic restore would take ~64 times longer.
    let small_time = render_time(&small);
    let large_time = render_time(&large);
    assert!(
        large_time < small_time * 24 + Duration::from_millis(50),
        "{large_time:?} for 16000 links vs {small_time:?} for 2000"
    );
}
