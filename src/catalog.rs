//! Subjects, lesson topics, and hint chips.
//!
//! The catalog is static: each [`Subject`] owns a fixed list of topics that
//! the surfaces render as clickable chips. Picking a topic turns it into a
//! canned question via [`topic_question`].

use serde::{Deserialize, Serialize};

/// Course a student is working in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    Python,
    Java,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::Python, Subject::Java];

    /// Parse a subject name, case-insensitively.
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Self::Python),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    /// Course label shown in announcements and the system preamble.
    pub fn label(self) -> &'static str {
        match self {
            Self::Python => "Python (AP CSP)",
            Self::Java => "Java (AP CSA)",
        }
    }

    /// Bare language name.
    pub fn language(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::Java => "Java",
        }
    }

    /// Lesson topics for this subject, in display order.
    pub fn topics(self) -> &'static [&'static str] {
        match self {
            Self::Python => PYTHON_TOPICS,
            Self::Java => JAVA_TOPICS,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Java => write!(f, "java"),
        }
    }
}

const PYTHON_TOPICS: &[&str] = &[
    "Variables & Data Types",
    "Lists & Dictionaries",
    "Loops (for/while)",
    "Functions",
    "Conditionals",
    "String Methods",
    "File I/O",
    "Error Handling",
    "Algorithms",
    "Data Analysis",
];

const JAVA_TOPICS: &[&str] = &[
    "Variables & Primitives",
    "Arrays & ArrayLists",
    "Loops & Iteration",
    "Methods",
    "Conditionals",
    "Classes & Objects",
    "Inheritance",
    "Polymorphism",
    "Recursion",
    "Sorting & Searching",
];

/// Quick-start prompts offered under the input box.
pub const HINT_CHIPS: &[&str] = &[
    "Can you give me a hint for my assignment?",
    "Why is my code throwing an error?",
    "Explain this concept step by step",
    "How do I start breaking down this problem?",
];

/// Canned question sent when a topic chip is picked.
pub fn topic_question(topic: &str) -> String {
    format!("Can you explain {topic}?")
}

/// Assistant announcement appended after a subject switch.
pub fn switch_announcement(subject: Subject) -> String {
    format!(
        "Switched to {}. How can I help you with {} today?",
        subject.label(),
        subject
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_case_variants() {
        assert_eq!(Subject::parse("Python"), Some(Subject::Python));
        assert_eq!(Subject::parse(" JAVA "), Some(Subject::Java));
        assert_eq!(Subject::parse("py"), Some(Subject::Python));
        assert_eq!(Subject::parse("rust"), None);
    }

    #[test]
    fn each_subject_has_ten_topics() {
        for subject in Subject::ALL {
            assert_eq!(subject.topics().len(), 10, "{subject}");
        }
        assert_eq!(Subject::Java.topics()[1], "Arrays & ArrayLists");
    }

    #[test]
    fn announcement_names_label_and_subject() {
        assert_eq!(
            switch_announcement(Subject::Java),
            "Switched to Java (AP CSA). How can I help you with java today?"
        );
    }

    #[test]
    fn topic_question_wording() {
        assert_eq!(topic_question("Recursion"), "Can you explain Recursion?");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Subject::Java).unwrap(), "\"java\"");
        let s: Subject = serde_json::from_str("\"python\"").unwrap();
        assert_eq!(s, Subject::Python);
    }
}
