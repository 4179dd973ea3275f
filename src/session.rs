//! One tutoring session: subject, conversation, render tree and composer.
//!
//! The session owns everything a surface needs and exposes the student's
//! actions as methods. Surfaces hold a `Session` and call into it from their
//! event handlers; there is no global widget instance.
//!
//! # Send path
//!
//! 1. the question is appended, rendered and persisted
//! 2. the typing placeholder is shown
//! 3. the request is built from the windowed history *before* the question
//! 4. one transport call
//! 5. the placeholder is hidden, then the reply (or an error message) is
//!    appended, rendered and persisted
//!
//! Failures never escape: a transport error becomes an assistant turn, a
//! storage error becomes an event log warning.

use std::time::Instant;

use crate::catalog::{self, Subject};
use crate::config::MentorConfig;
use crate::config::schema::expand_home;
use crate::conversation::storage::{API_KEY_SLOT, FileStorage, HISTORY_KEY, Storage, StorageError};
use crate::conversation::{Conversation, Turn};
use crate::events::{EventEntry, EventKind, EventLog, Level};
use crate::llm::gemini::GenerationConfig;
use crate::llm::{GeminiClient, Transport, TransportError, prompts};
use crate::render::ChatPanel;

/// Announcement appended after the stored API key is dropped.
pub const API_KEY_RESET_MESSAGE: &str = "API key reset. I'll ask for a new one on your next message to enable intelligent responses.";

/// Text of the assistant turn recorded for a failed request.
pub fn failure_message(error: &TransportError) -> String {
    format!(
        "I'm having trouble connecting to the AI service right now. Please check your internet connection and try again. Error: {error}"
    )
}

/// Session-level settings resolved from config.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub subject: Subject,
    /// History turns sent per request (`None` = all).
    pub window: Option<usize>,
    pub persist_history: bool,
    /// Key from config or environment. Takes precedence over the stored slot.
    pub configured_key: Option<String>,
    pub generation: GenerationConfig,
}

impl SessionSettings {
    pub fn from_config(config: &MentorConfig) -> Self {
        let key = config.model.api_key.trim();
        Self {
            subject: config.general.subject,
            window: config.context.window(),
            persist_history: config.general.persist_history,
            configured_key: (!key.is_empty()).then(|| key.to_string()),
            generation: GenerationConfig::from_config(&config.model),
        }
    }
}

/// Result of a send.
#[derive(Debug)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// The model replied; the reply turn was appended.
    Replied(Turn),
    /// The call failed; `message` is the error turn that was appended.
    Failed { error: TransportError, message: Turn },
}

impl SendOutcome {
    /// The assistant turn appended by this send, if any.
    pub fn reply(&self) -> Option<&Turn> {
        match self {
            Self::Ignored => None,
            Self::Replied(turn) => Some(turn),
            Self::Failed { message, .. } => Some(message),
        }
    }
}

pub struct Session {
    settings: SessionSettings,
    subject: Subject,
    conversation: Conversation,
    panel: ChatPanel,
    composer: String,
    transport: Box<dyn Transport>,
    storage: Box<dyn Storage>,
    log: EventLog,
}

impl Session {
    /// Restore history (when persisting) and draw it, or the welcome message.
    pub fn new(
        settings: SessionSettings,
        transport: Box<dyn Transport>,
        storage: Box<dyn Storage>,
        log: EventLog,
    ) -> Self {
        let conversation = if settings.persist_history {
            Conversation::restore(storage.as_ref(), &log)
        } else {
            Conversation::new()
        };

        let mut panel = ChatPanel::new();
        if conversation.is_empty() {
            panel.render_welcome();
        } else {
            for turn in conversation.turns() {
                panel.render(turn);
            }
        }

        log.record(
            &EventEntry::new(
                Level::Debug,
                EventKind::SessionStart,
                format!("restored {} turns", conversation.len()),
            )
            .with_subject(settings.subject),
        );

        Self {
            subject: settings.subject,
            settings,
            conversation,
            panel,
            composer: String::new(),
            transport,
            storage,
            log,
        }
    }

    /// Production wiring: Gemini over HTTP, file slots under `data_dir`.
    pub fn open(config: &MentorConfig) -> Self {
        Self::new(
            SessionSettings::from_config(config),
            Box::new(GeminiClient::from_config(&config.model)),
            Box::new(FileStorage::new(expand_home(&config.general.data_dir))),
            EventLog::from_config(&config.logging),
        )
    }

    // -- Accessors --

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn topics(&self) -> &'static [&'static str] {
        self.subject.topics()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    pub fn composer(&self) -> &str {
        &self.composer
    }

    pub fn set_composer(&mut self, text: impl Into<String>) {
        self.composer = text.into();
    }

    // -- Actions --

    /// Send the composer's text and clear it.
    pub fn submit(&mut self) -> SendOutcome {
        let text = std::mem::take(&mut self.composer);
        self.send(&text)
    }

    /// Send one question to the model.
    pub fn send(&mut self, text: &str) -> SendOutcome {
        let question = text.trim();
        if question.is_empty() {
            return SendOutcome::Ignored;
        }

        let request = prompts::build_request(
            self.subject,
            self.conversation.recent_window(self.settings.window),
            question,
            &self.settings.generation,
        );

        self.append_turn(Turn::user(question));
        self.panel.show_typing();

        let started = Instant::now();
        let result = match self.api_key() {
            Some(key) => self.transport.complete(&key, &request),
            None => Err(TransportError::MissingApiKey),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        self.panel.hide_typing();

        match result {
            Ok(reply) => {
                self.log.record(
                    &EventEntry::new(Level::Info, EventKind::Request, "")
                        .with_subject(self.subject)
                        .with_latency(latency_ms),
                );
                let turn = Turn::assistant(reply);
                self.append_turn(turn.clone());
                SendOutcome::Replied(turn)
            }
            Err(error) => {
                self.log.record(
                    &EventEntry::new(Level::Error, EventKind::RequestFailed, error.detail())
                        .with_subject(self.subject)
                        .with_status(error.status())
                        .with_latency(latency_ms),
                );
                let message = Turn::assistant(failure_message(&error));
                self.append_turn(message.clone());
                SendOutcome::Failed { error, message }
            }
        }
    }

    /// Change subject and announce it.
    pub fn switch_subject(&mut self, subject: Subject) {
        self.log.record(
            &EventEntry::new(
                Level::Info,
                EventKind::SubjectSwitch,
                format!("{} -> {subject}", self.subject),
            )
            .with_subject(subject),
        );
        self.subject = subject;
        self.append_turn(Turn::assistant(catalog::switch_announcement(subject)));
    }

    /// Put the canned question for `topic` in the composer and send it.
    pub fn ask_about_topic(&mut self, topic: &str) -> SendOutcome {
        self.composer = catalog::topic_question(topic);
        self.submit()
    }

    /// Put a hint chip's text in the composer and send it.
    pub fn use_hint(&mut self, hint: &str) -> SendOutcome {
        self.composer = hint.to_string();
        self.submit()
    }

    /// Whether any API key is available (drives the status indicator).
    pub fn api_key_status(&self) -> bool {
        self.api_key().is_some()
    }

    /// Store a key entered by the student.
    pub fn save_api_key(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.set(API_KEY_SLOT, key.trim())?;
        self.log.info(EventKind::ApiKeySaved, "stored API key updated");
        Ok(())
    }

    /// Forget the stored key and tell the student.
    pub fn reset_api_key(&mut self) {
        if let Err(e) = self.storage.remove(API_KEY_SLOT) {
            self.log
                .warn(EventKind::Storage, format!("failed to remove API key: {e}"));
        }
        self.log.info(EventKind::ApiKeyReset, "stored API key removed");
        self.append_turn(Turn::assistant(API_KEY_RESET_MESSAGE));
    }

    /// Drop the whole conversation, stored copy included.
    pub fn clear_history(&mut self) {
        let dropped = self.conversation.len();
        self.conversation.clear();
        self.panel.clear();
        self.panel.render_welcome();

        if self.settings.persist_history
            && let Err(e) = self.storage.remove(HISTORY_KEY)
        {
            self.log.warn(
                EventKind::Storage,
                format!("failed to clear conversation history: {e}"),
            );
        }
        self.log.info(
            EventKind::HistoryCleared,
            format!("dropped {dropped} turns"),
        );
    }

    // -- Internal --

    fn api_key(&self) -> Option<String> {
        if let Some(key) = &self.settings.configured_key {
            return Some(key.clone());
        }
        match self.storage.get(API_KEY_SLOT) {
            Ok(stored) => stored
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            Err(e) => {
                self.log
                    .warn(EventKind::Storage, format!("failed to read API key: {e}"));
                None
            }
        }
    }

    /// Append, render, persist. The only way turns enter the conversation.
    fn append_turn(&mut self, turn: Turn) {
        self.panel.render(&turn);
        self.conversation.append(turn);

        if self.settings.persist_history
            && let Err(e) = self.conversation.persist(self.storage.as_mut())
        {
            self.log.warn(
                EventKind::Storage,
                format!("failed to save conversation history: {e}"),
            );
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("subject", &self.subject)
            .field("turns", &self.conversation.len())
            .field("composer", &self.composer)
            .finish_non_exhaustive()
    }
}
