/// Rendering tests: message formatting and the chat panel.
use codementor::conversation::{Role, Turn};
use codementor::render::terminal::format_for_terminal;
use codementor::render::{ChatPanel, Node, escape_html, format_message};

// ---------------------------------------------------------------------------
// format_message
// ---------------------------------------------------------------------------

#[test]
fn plain_text_renders_as_escaped_text_with_breaks() {
    let samples = [
        "What does a variable store?",
        "Think about it:\nwhat changes each time?\n\nTry again.",
        "if x < 10 && y > 3 then \"done\"",
        "It's fine to use 'single' quotes",
        "trailing newline\n",
        "",
    ];
    for text in samples {
        assert_eq!(
            format_message(text),
            escape_html(text).replace('\n', "<br>"),
            "sample {text:?}"
        );
    }
}

#[test]
fn code_is_not_bolded_and_bold_is_not_code() {
    let html = format_message("Use `**kwargs` for **keyword** arguments");
    assert_eq!(
        html,
        "Use <code>**kwargs</code> for <strong>keyword</strong> arguments"
    );
}

#[test]
fn fenced_block_keeps_newlines_and_escapes_content() {
    let html = format_message("```java\nif (a < b) {\n  return;\n}\n```");
    assert_eq!(
        html,
        "<div class=\"code-block\"><pre><code class=\"language-java\">if (a &lt; b) {\n  return;\n}</code></pre></div>"
    );
    assert!(!html.contains("<br>"));
}

#[test]
fn untagged_fence_defaults_to_text() {
    let html = format_message("```\nprint(1)\n```");
    assert!(html.contains("class=\"language-text\""));
}

#[test]
fn unclosed_fence_stays_literal() {
    let html = format_message("```python\nprint(1)");
    assert!(!html.contains("code-block"));
    assert!(html.contains("```python<br>print(1)"));
}

#[test]
fn crlf_is_normalized() {
    assert_eq!(format_message("a\r\nb"), "a<br>b");
}

// ---------------------------------------------------------------------------
// ChatPanel
// ---------------------------------------------------------------------------

#[test]
fn typing_placeholder_is_single_and_removable() {
    let mut panel = ChatPanel::new();
    panel.render(&Turn::user("hi"));
    panel.show_typing();
    panel.show_typing();
    assert_eq!(
        panel.nodes().iter().filter(|n| **n == Node::Typing).count(),
        1
    );

    panel.hide_typing();
    assert!(!panel.has_typing());
    panel.render(&Turn::assistant("hello"));
    assert_eq!(panel.message_count(Role::User), 1);
    assert_eq!(panel.message_count(Role::Assistant), 1);
}

#[test]
fn panel_html_wraps_messages_by_role() {
    let mut panel = ChatPanel::new();
    panel.render_welcome();
    panel.render(&Turn::user("<i>x</i>"));

    let html = panel.to_html();
    assert!(html.contains("welcome-message"));
    assert!(html.contains("user-message"));
    assert!(html.contains("&lt;i&gt;x&lt;/i&gt;"));
    assert!(!html.contains("<i>x</i>"));
}

#[test]
fn welcome_is_not_a_message() {
    let mut panel = ChatPanel::new();
    panel.render_welcome();
    assert_eq!(panel.message_count(Role::Assistant), 0);
    panel.clear();
    assert!(panel.nodes().is_empty());
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

#[test]
fn terminal_output_has_no_html() {
    colored::control::set_override(false);
    let out = format_for_terminal("a < b is **true**\n`x`");
    assert_eq!(out, "a < b is true\nx");
}
