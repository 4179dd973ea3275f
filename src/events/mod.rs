//! Structured event log — one JSON line per session event.
//!
//! Records model requests (latency, HTTP status), failures, storage problems
//! and user-visible session changes to `~/.codementor/events.jsonl`. The
//! reporter in [`reporter`] aggregates the file for `codementor log`.
//!
//! Writes are best-effort: a log that cannot be opened never interrupts the
//! conversation.

pub mod reporter;

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::Subject;
use crate::config::schema::{LoggingConfig, expand_home};

// ---------------------------------------------------------------------------
// Levels and kinds
// ---------------------------------------------------------------------------

/// Severity of an event. Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A reply came back from the model.
    Request,
    /// The model call failed; the student saw an error message.
    RequestFailed,
    /// A storage slot could not be read or written.
    Storage,
    SubjectSwitch,
    HistoryCleared,
    ApiKeyReset,
    ApiKeySaved,
    SessionStart,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Request => "request",
            Self::RequestFailed => "request_failed",
            Self::Storage => "storage",
            Self::SubjectSwitch => "subject_switch",
            Self::HistoryCleared => "history_cleared",
            Self::ApiKeyReset => "api_key_reset",
            Self::ApiKeySaved => "api_key_saved",
            Self::SessionStart => "session_start",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single line in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub timestamp: String,
    pub level: Level,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject: Option<Subject>,
    /// HTTP status of the model call, when one was received.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub detail: String,
}

impl EventEntry {
    pub fn new(level: Level, kind: EventKind, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            level,
            kind,
            subject: None,
            status: None,
            latency_ms: None,
            detail: detail.into(),
        }
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only JSONL event sink.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
    max_level: Level,
}

impl EventLog {
    /// Build from the `[logging]` config section.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            path: Some(expand_home(&config.path)),
            max_level: Level::parse(&config.level).unwrap_or(Level::Info),
        }
    }

    /// A log that drops everything.
    pub fn disabled() -> Self {
        Self {
            path: None,
            max_level: Level::Error,
        }
    }

    /// A log writing to an explicit file.
    pub fn at_path(path: impl Into<PathBuf>, max_level: Level) -> Self {
        Self {
            path: Some(path.into()),
            max_level,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether entries at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        self.path.is_some() && level <= self.max_level
    }

    /// Record an entry, subject to the level filter.
    pub fn record(&self, entry: &EventEntry) {
        if !self.enabled(entry.level) {
            return;
        }
        let _ = self.append(entry);
    }

    pub fn error(&self, kind: EventKind, detail: impl Into<String>) {
        self.record(&EventEntry::new(Level::Error, kind, detail));
    }

    pub fn warn(&self, kind: EventKind, detail: impl Into<String>) {
        self.record(&EventEntry::new(Level::Warn, kind, detail));
    }

    pub fn info(&self, kind: EventKind, detail: impl Into<String>) {
        self.record(&EventEntry::new(Level::Info, kind, detail));
    }

    fn append(&self, entry: &EventEntry) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read all entries from an event log file.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<EventEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<EventEntry>(&line).ok())
        .collect()
}

/// Read entries filtered to the last `days` days (`None` = all).
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<EventEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "codementor-events-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("events.jsonl")
    }

    #[test]
    fn level_ordering_filters_verbose_entries() {
        let path = scratch_path("filter");
        let log = EventLog::at_path(&path, Level::Warn);

        log.info(EventKind::SubjectSwitch, "python -> java");
        log.warn(EventKind::Storage, "quota exceeded");
        log.error(EventKind::RequestFailed, "API request failed: 500");

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EventKind::Storage);
        assert_eq!(entries[1].level, Level::Error);
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = EventLog::disabled();
        assert!(!log.enabled(Level::Error));
        assert!(log.path().is_none());
        log.error(EventKind::RequestFailed, "ignored");
    }

    #[test]
    fn entry_builder_sets_optional_fields() {
        let entry = EventEntry::new(Level::Info, EventKind::Request, "ok")
            .with_subject(Subject::Java)
            .with_status(Some(200))
            .with_latency(42);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"kind\":\"request\""));
        assert!(json.contains("\"subject\":\"java\""));
        assert!(json.contains("\"status\":200"));
        assert!(json.contains("\"latency_ms\":42"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = scratch_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let good = serde_json::to_string(&EventEntry::new(
            Level::Info,
            EventKind::SessionStart,
            "",
        ))
        .unwrap();
        fs::write(&path, format!("not json\n{good}\n{{\"level\":7}}\n")).unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EventKind::SessionStart);
    }

    #[test]
    fn missing_file_reads_empty() {
        let path = scratch_path("missing");
        assert!(read_entries_since_days(&path, Some(7)).is_empty());
    }

    #[test]
    fn parse_level_variants() {
        assert_eq!(Level::parse("WARNING"), Some(Level::Warn));
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse("trace"), None);
    }
}
