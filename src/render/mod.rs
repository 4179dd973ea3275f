//! Message formatting and the chat panel render tree.
//!
//! [`format_message`] turns a turn's raw text into safe HTML. The input is
//! escaped before any markup is produced, so neither model output nor user
//! input can inject elements. After escaping, the pipeline applies in order:
//!
//! 1. fenced code blocks (```` ```lang ... ``` ````) → `div.code-block > pre > code`
//! 2. inline code (`` `x` ``) → `<code>`
//! 3. newlines → `<br>` (not inside fenced blocks)
//! 4. bold (`**x**`) → `<strong>` (not inside code)

pub mod panel;
pub mod terminal;

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

pub use panel::{ChatPanel, Node};

// ---------------------------------------------------------------------------
// Compiled regexes
// ---------------------------------------------------------------------------

/// Fenced block with optional language tag. The tag must sit on the opening
/// fence line.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(\w+)?\n(.*?)```").expect("fence regex must compile")
});

/// Single-backtick span.
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex must compile"));

/// Stand-in for a converted inline code span while bold is applied. A
/// private-use character, so escaped text never contains it.
const CODE_MARK: char = '\u{E000}';

static CODE_SLOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}(\\d+)\u{E000}").expect("code slot regex must compile")
});

/// Double-asterisk span, shortest match.
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex must compile"));

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Escape text for use as HTML element content or attribute value.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a message's text as HTML.
pub fn format_message(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let escaped = escape_html(&normalized);

    let mut out = String::with_capacity(escaped.len() + 64);
    let mut last = 0;
    for caps in FENCE_RE.captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&format_prose(&escaped[last..whole.start()]));

        let lang = caps.get(1).map_or("text", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str()).trim();
        let _ = write!(
            out,
            r#"<div class="code-block"><pre><code class="language-{lang}">{code}</code></pre></div>"#
        );
        last = whole.end();
    }
    out.push_str(&format_prose(&escaped[last..]));
    out
}

/// Inline code, newlines and bold for text outside fenced blocks.
///
/// Inline code is converted first and parked behind placeholders, so bold
/// may wrap a code span (`**`len()`**`) but never reaches inside one
/// (`` `x**2` ``).
fn format_prose(text: &str) -> String {
    let mut spans: Vec<String> = Vec::new();
    let masked = INLINE_CODE_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        spans.push(format!("<code>{}</code>", caps[1].replace('\n', "<br>")));
        format!("{CODE_MARK}{}{CODE_MARK}", spans.len() - 1)
    });

    let with_breaks = masked.replace('\n', "<br>");
    let bolded = BOLD_RE.replace_all(&with_breaks, "<strong>$1</strong>");

    CODE_SLOT_RE
        .replace_all(&bolded, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| spans.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_escaped_with_line_breaks() {
        let text = "Loops repeat work.\nUse a for loop when the count is known & fixed.";
        assert_eq!(
            format_message(text),
            "Loops repeat work.<br>Use a for loop when the count is known &amp; fixed."
        );
    }

    #[test]
    fn markup_in_input_is_neutralized() {
        let html = format_message("<script>alert('x')</script> <b onclick=\"y\">hi</b>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b "));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("&quot;y&quot;"));
    }

    #[test]
    fn fenced_block_with_language() {
        let html = format_message("Try this:\n```python\nfor i in range(3):\n    print(i < 2)\n```\nThen run it.");
        assert_eq!(
            html,
            "Try this:<br><div class=\"code-block\"><pre><code class=\"language-python\">for i in range(3):\n    print(i &lt; 2)</code></pre></div><br>Then run it."
        );
    }

    #[test]
    fn fenced_block_without_language_defaults_to_text() {
        let html = format_message("```\nx = 1\n```");
        assert_eq!(
            html,
            "<div class=\"code-block\"><pre><code class=\"language-text\">x = 1</code></pre></div>"
        );
    }

    #[test]
    fn code_block_contents_are_not_emphasized() {
        let html = format_message("```java\nint x = a ** b; // `tick`\n```");
        assert!(html.contains("a ** b; // `tick`"));
        assert!(!html.contains("<strong>"));
        assert!(!html.contains("<code>tick</code>"));
    }

    #[test]
    fn inline_code_and_bold() {
        let html = format_message("Call **`len()`** or use `x**2` for **squares**");
        assert_eq!(
            html,
            "Call <strong><code>len()</code></strong> or use <code>x**2</code> for <strong>squares</strong>"
        );
    }

    #[test]
    fn bold_wraps_inline_code_inside_a_sentence() {
        assert_eq!(
            format_message("**Try the `for` loop first**"),
            "<strong>Try the <code>for</code> loop first</strong>"
        );
        assert_eq!(
            format_message("Use **`len()`** here"),
            "Use <strong><code>len()</code></strong> here"
        );
    }

    #[test]
    fn inline_code_keeps_its_line_breaks_inside_bold() {
        assert_eq!(
            format_message("**see `a\nb` now**"),
            "<strong>see <code>a<br>b</code> now</strong>"
        );
    }

    #[test]
    fn bold_spans_line_breaks() {
        assert_eq!(
            format_message("**Step 1\nthink**"),
            "<strong>Step 1<br>think</strong>"
        );
    }

    #[test]
    fn unterminated_fence_is_left_as_text() {
        let html = format_message("```python\nprint(1)");
        assert_eq!(html, "```python<br>print(1)");
    }

    #[test]
    fn crlf_is_normalized() {
        assert_eq!(format_message("a\r\nb"), "a<br>b");
    }

    #[test]
    fn escape_html_handles_all_specials() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
