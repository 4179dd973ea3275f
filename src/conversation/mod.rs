//! The conversation store: an ordered, append-only list of turns.
//!
//! Turns are persisted as a flat JSON list in the
//! [`HISTORY_KEY`](storage::HISTORY_KEY) slot:
//!
//! ```json
//! [{"role":"user","content":"What is a list?"},{"role":"assistant","content":"..."}]
//! ```
//!
//! Restoring never fails: a missing slot, an unreadable slot or malformed
//! JSON all yield an empty conversation (the latter two are logged).

pub mod storage;

use serde::{Deserialize, Serialize};

use crate::events::{EventKind, EventLog};
use storage::{HISTORY_KEY, Storage, StorageError};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Chronological list of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The last `n` turns in original order, or every turn for `None`.
    pub fn recent_window(&self, n: Option<usize>) -> &[Turn] {
        match n {
            Some(n) => &self.turns[self.turns.len().saturating_sub(n)..],
            None => &self.turns,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Serialize every turn into the history slot.
    pub fn persist(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.turns).map_err(|source| {
            StorageError::Serialize {
                key: HISTORY_KEY.to_string(),
                source,
            }
        })?;
        storage.set(HISTORY_KEY, &json)
    }

    /// Load the history slot, reporting read and parse failures.
    pub fn try_restore(storage: &dyn Storage) -> Result<Self, StorageError> {
        let Some(json) = storage.get(HISTORY_KEY)? else {
            return Ok(Self::new());
        };
        let turns: Vec<Turn> =
            serde_json::from_str(&json).map_err(|source| StorageError::Malformed {
                key: HISTORY_KEY.to_string(),
                source,
            })?;
        Ok(Self { turns })
    }

    /// Load the history slot, falling back to an empty conversation.
    pub fn restore(storage: &dyn Storage, log: &EventLog) -> Self {
        match Self::try_restore(storage) {
            Ok(conversation) => conversation,
            Err(e) => {
                log.warn(
                    EventKind::Storage,
                    format!("failed to load conversation history: {e}"),
                );
                Self::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::storage::MemoryStorage;
    use super::*;

    fn numbered(n: usize) -> Conversation {
        let mut conversation = Conversation::new();
        for i in 0..n {
            let turn = if i % 2 == 0 {
                Turn::user(format!("q{i}"))
            } else {
                Turn::assistant(format!("a{i}"))
            };
            conversation.append(turn);
        }
        conversation
    }

    #[test]
    fn recent_window_returns_last_six_of_ten() {
        let conversation = numbered(10);
        let window = conversation.recent_window(Some(6));
        assert_eq!(window.len(), 6);
        let contents: Vec<&str> = window.iter().map(Turn::content).collect();
        assert_eq!(contents, vec!["q4", "a5", "q6", "a7", "q8", "a9"]);
    }

    #[test]
    fn recent_window_shorter_than_n_returns_all() {
        let conversation = numbered(3);
        assert_eq!(conversation.recent_window(Some(6)).len(), 3);
        assert_eq!(conversation.recent_window(Some(0)).len(), 0);
        assert_eq!(conversation.recent_window(None).len(), 3);
    }

    #[test]
    fn persist_then_restore_preserves_turns_exactly() {
        let mut conversation = numbered(4);
        conversation.append(Turn::assistant("```python\nprint('é')\n```\n  **trailing**  "));

        let mut storage = MemoryStorage::new();
        conversation.persist(&mut storage).unwrap();

        let restored = Conversation::restore(&storage, &EventLog::disabled());
        assert_eq!(restored, conversation);
    }

    #[test]
    fn restore_reads_legacy_layout() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                HISTORY_KEY,
                r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#,
            )
            .unwrap();
        let restored = Conversation::restore(&storage, &EventLog::disabled());
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.turns()[1].role(), Role::Assistant);
    }

    #[test]
    fn restore_with_malformed_data_yields_empty() {
        for bad in ["{not json", r#"{"role":"user"}"#, r#"[{"role":"system","content":"x"}]"#] {
            let mut storage = MemoryStorage::new();
            storage.set(HISTORY_KEY, bad).unwrap();

            assert!(matches!(
                Conversation::try_restore(&storage),
                Err(StorageError::Malformed { .. })
            ));
            let restored = Conversation::restore(&storage, &EventLog::disabled());
            assert!(restored.is_empty(), "{bad}");
        }
    }

    #[test]
    fn restore_with_missing_slot_is_empty() {
        let storage = MemoryStorage::new();
        assert!(Conversation::try_restore(&storage).unwrap().is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Turn::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
