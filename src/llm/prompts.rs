//! Request assembly for the tutoring model.
//!
//! Every request carries the subject's teaching preamble exactly once, as
//! the request's system instruction. History turns follow in order, mapped to
//! the API's `user`/`model` roles, and the new question is always the last
//! entry.

use super::gemini::{Content, ContentRole, GenerateRequest, GenerationConfig};
use crate::catalog::Subject;
use crate::conversation::{Role, Turn};

/// Teaching rules for `subject`.
pub fn system_preamble(subject: Subject) -> String {
    format!(
        "You are CodeMentor, an AI teaching assistant for AP Computer Science students learning {label}.

CRITICAL TEACHING RULES:
- NEVER provide complete solutions or finished code
- NEVER do students' homework for them
- If asked for \"the full code\" or \"complete solution\", politely redirect to learning
- Guide learning through hints, explanations, and step-by-step reasoning
- Ask follow-up questions to promote critical thinking
- Provide code templates with blanks for students to fill in
- Teach debugging strategies rather than fixing code directly
- REMEMBER the conversation context and build upon previous messages

Your responses should be:
- Conversational and encouraging
- Focused on understanding concepts
- Tailored to {language} specifically
- Educational, not just informational
- Context-aware of the ongoing conversation",
        label = subject.label(),
        language = subject.language(),
    )
}

/// Map a conversation role onto the API's vocabulary.
pub fn api_role(role: Role) -> ContentRole {
    match role {
        Role::User => ContentRole::User,
        Role::Assistant => ContentRole::Model,
    }
}

/// Build the request for a new question.
///
/// `history` is the already-windowed context and must not contain the new
/// question itself.
pub fn build_request(
    subject: Subject,
    history: &[Turn],
    question: &str,
    generation: &GenerationConfig,
) -> GenerateRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content::new(api_role(turn.role()), turn.content()))
        .collect();
    contents.push(Content::new(ContentRole::User, question));

    GenerateRequest {
        system_instruction: Content::instruction(system_preamble(subject)),
        contents,
        generation_config: generation.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ModelConfig;

    fn generation() -> GenerationConfig {
        GenerationConfig::from_config(&ModelConfig::default())
    }

    #[test]
    fn preamble_is_parameterized_by_subject() {
        let python = system_preamble(Subject::Python);
        assert!(python.contains("learning Python (AP CSP)."));
        assert!(python.contains("Tailored to Python specifically"));
        assert!(python.contains("NEVER provide complete solutions"));

        let java = system_preamble(Subject::Java);
        assert!(java.contains("learning Java (AP CSA)."));
        assert!(!java.contains("Python"));
    }

    #[test]
    fn history_is_mapped_then_question_appended() {
        let history = vec![Turn::user("What is a loop?"), Turn::assistant("What do you think?")];
        let request = build_request(Subject::Python, &history, "A repeat?", &generation());

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role, Some(ContentRole::User));
        assert_eq!(request.contents[1].role, Some(ContentRole::Model));
        assert_eq!(request.contents[1].text(), "What do you think?");
        assert_eq!(request.contents[2].role, Some(ContentRole::User));
        assert_eq!(request.contents[2].text(), "A repeat?");
    }

    #[test]
    fn preamble_appears_exactly_once() {
        let history = vec![Turn::user("a"), Turn::assistant("b")];
        let request = build_request(Subject::Java, &history, "c", &generation());

        let preamble = system_preamble(Subject::Java);
        assert_eq!(request.system_instruction.text(), preamble);
        assert!(request.system_instruction.role.is_none());
        assert!(request.contents.iter().all(|c| !c.text().contains("CRITICAL TEACHING RULES")));
    }

    #[test]
    fn empty_history_sends_only_the_question() {
        let request = build_request(Subject::Python, &[], "hello", &generation());
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.generation_config.max_output_tokens, 1024);
    }
}
