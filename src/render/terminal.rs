//! Colored plain-text rendering for the terminal chat.
//!
//! Mirrors the HTML pipeline without markup: fenced blocks are indented
//! and highlighted, inline code is tinted, and bold spans are bolded.

use std::sync::LazyLock;

use colored::Colorize;
use regex::Regex;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(\w+)?\n(.*?)```").expect("fence regex must compile")
});

static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+)`|\*\*(.+?)\*\*").expect("inline regex must compile")
});

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code regex must compile"));

/// Format a message for a terminal.
pub fn format_for_terminal(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(normalized.len());
    let mut last = 0;

    for caps in FENCE_RE.captures_iter(&normalized) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&format_inline(&normalized[last..whole.start()]));

        let lang = caps.get(1).map_or("text", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str()).trim_end();
        out.push_str(&format!("── {lang} ──").dimmed().to_string());
        out.push('\n');
        for line in code.lines() {
            out.push_str("  ");
            out.push_str(&line.cyan().to_string());
            out.push('\n');
        }
        last = whole.end();
    }
    out.push_str(&format_inline(&normalized[last..]));
    out
}

fn format_inline(text: &str) -> String {
    INLINE_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if let Some(code) = caps.get(1) {
                code.as_str().yellow().to_string()
            } else if let Some(bold) = caps.get(2) {
                tint_code(bold.as_str()).bold().to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Inline code only, for the inside of a bold span.
fn tint_code(text: &str) -> String {
    CODE_RE
        .replace_all(text, |caps: &regex::Captures<'_>| caps[1].yellow().to_string())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markers_without_color() {
        colored::control::set_override(false);

        assert_eq!(
            format_for_terminal("Use **recursion** with `base case`"),
            "Use recursion with base case"
        );
        assert_eq!(
            format_for_terminal("Look:\n```java\nint x = 1;\n```\ndone"),
            "Look:\n── java ──\n  int x = 1;\n\ndone"
        );
        assert_eq!(format_for_terminal("<b>kept</b>"), "<b>kept</b>");
        assert_eq!(
            format_for_terminal("**Try the `for` loop** or `x**2`"),
            "Try the for loop or x**2"
        );
    }
}
