//! The chat panel: an ordered list of rendered message nodes.
//!
//! Every turn the session appends is rendered here exactly once. A single
//! transient typing placeholder may sit at the end of the panel while a
//! request is outstanding; it is never part of the conversation.

use serde::Serialize;

use super::format_message;
use crate::conversation::{Role, Turn};

const ASSISTANT_AVATAR: &str = "🤖";
const USER_AVATAR: &str = "👨‍💻";

/// Greeting shown when there is no history. Rendered, never stored.
pub const WELCOME_MESSAGE: &str = "**Welcome to CodeMentor! 👋**

I'm your AI teaching assistant for AP Computer Science. I'm here to help you understand concepts, debug code, and develop problem-solving skills.

**Remember:** I won't give you direct answers or complete solutions. Instead, I'll guide you through the learning process with hints, explanations, and step-by-step reasoning.

What would you like to work on today?";

/// One element of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Message { role: Role, html: String },
    Welcome { html: String },
    Typing,
}

impl Node {
    /// Markup for the node, wrapped the way the page styles messages.
    pub fn to_html(&self) -> String {
        match self {
            Node::Message { role, html } => message_markup(*role, "", html),
            Node::Welcome { html } => message_markup(Role::Assistant, " welcome-message", html),
            Node::Typing => format!(
                r#"<div class="message assistant-message typing-message"><div class="message-avatar">{ASSISTANT_AVATAR}</div><div class="message-content"><div class="typing-indicator"><div class="typing-dot"></div><div class="typing-dot"></div><div class="typing-dot"></div></div></div></div>"#
            ),
        }
    }
}

fn message_markup(role: Role, extra_class: &str, html: &str) -> String {
    let avatar = match role {
        Role::Assistant => ASSISTANT_AVATAR,
        Role::User => USER_AVATAR,
    };
    format!(
        r#"<div class="message {role}-message{extra_class}"><div class="message-avatar">{avatar}</div><div class="message-content"><div class="message-text">{html}</div></div></div>"#
    )
}

/// Render tree for one session.
#[derive(Debug, Clone, Default)]
pub struct ChatPanel {
    nodes: Vec<Node>,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format a turn and append it as a message node.
    ///
    /// If a typing placeholder is showing it stays the last node.
    pub fn render(&mut self, turn: &Turn) {
        let node = Node::Message {
            role: turn.role(),
            html: format_message(turn.content()),
        };
        self.insert_before_typing(node);
    }

    pub fn render_welcome(&mut self) {
        let node = Node::Welcome {
            html: format_message(WELCOME_MESSAGE),
        };
        self.insert_before_typing(node);
    }

    /// Show the placeholder. No-op if one is already showing.
    pub fn show_typing(&mut self) {
        if !self.has_typing() {
            self.nodes.push(Node::Typing);
        }
    }

    pub fn hide_typing(&mut self) {
        self.nodes.retain(|n| !matches!(n, Node::Typing));
    }

    pub fn has_typing(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::Typing))
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of message nodes authored by `role` (welcome excluded).
    pub fn message_count(&self, role: Role) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Message { role: r, .. } if *r == role))
            .count()
    }

    /// The whole panel as one HTML fragment.
    pub fn to_html(&self) -> String {
        self.nodes.iter().map(Node::to_html).collect()
    }

    fn insert_before_typing(&mut self, node: Node) {
        match self.nodes.iter().position(|n| matches!(n, Node::Typing)) {
            Some(idx) => self.nodes.insert(idx, node),
            None => self.nodes.push(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_appends_in_order() {
        let mut panel = ChatPanel::new();
        panel.render(&Turn::user("hi"));
        panel.render(&Turn::assistant("**hello**"));

        assert_eq!(
            panel.nodes(),
            &[
                Node::Message {
                    role: Role::User,
                    html: "hi".to_string()
                },
                Node::Message {
                    role: Role::Assistant,
                    html: "<strong>hello</strong>".to_string()
                },
            ]
        );
    }

    #[test]
    fn at_most_one_typing_placeholder() {
        let mut panel = ChatPanel::new();
        panel.show_typing();
        panel.show_typing();
        assert_eq!(panel.nodes().len(), 1);

        panel.hide_typing();
        assert!(!panel.has_typing());
        assert!(panel.nodes().is_empty());
    }

    #[test]
    fn typing_placeholder_stays_last() {
        let mut panel = ChatPanel::new();
        panel.show_typing();
        panel.render(&Turn::user("second question"));
        assert_eq!(panel.nodes().last(), Some(&Node::Typing));
        assert_eq!(panel.message_count(Role::User), 1);
    }

    #[test]
    fn welcome_is_not_counted_as_a_message() {
        let mut panel = ChatPanel::new();
        panel.render_welcome();
        assert_eq!(panel.message_count(Role::Assistant), 0);
        assert!(panel.to_html().contains("welcome-message"));
        assert!(panel.to_html().contains("<strong>Welcome to CodeMentor! 👋</strong>"));
    }

    #[test]
    fn node_markup_tags_role() {
        let node = Node::Message {
            role: Role::User,
            html: "x".to_string(),
        };
        let html = node.to_html();
        assert!(html.starts_with(r#"<div class="message user-message">"#));
        assert!(html.contains(r#"<div class="message-text">x</div>"#));
        assert!(Node::Typing.to_html().contains("typing-indicator"));
    }

    #[test]
    fn nodes_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Node::Typing).unwrap();
        assert_eq!(json, r#"{"kind":"typing"}"#);
    }
}
