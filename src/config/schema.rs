/// Configuration schema and defaults for CodeMentor.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[general]`, `[model]`, `[context]`, `[server]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

use crate::catalog::Subject;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level CodeMentor configuration.
///
/// Maps directly to the `~/.codementor/config.toml` and `.codementor.toml`
/// file schemas. All sections and fields are optional — missing values fall
/// back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MentorConfig {
    pub general: GeneralConfig,
    pub model: ModelConfig,
    pub context: ContextConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

/// General session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Subject selected when a session starts: `python` or `java`.
    pub subject: Subject,
    /// Persist the conversation between sessions. When `false` history lives
    /// in memory only and is lost on exit.
    pub persist_history: bool,
    /// Directory holding the durable storage slots. `~` is expanded.
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            subject: Subject::default(),
            persist_history: true,
            data_dir: "~/.codementor".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [model]
// ---------------------------------------------------------------------------

/// Remote generation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the generation API (without the `/models/...` suffix).
    pub endpoint: String,
    /// Model name, e.g. `gemini-2.0-flash-exp`.
    pub model: String,
    /// API key. Empty means "use the stored key slot, if any".
    pub api_key: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Sampling temperature.
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    /// Upper bound on generated tokens per reply.
    pub max_output_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            api_key: String::new(),
            timeout_ms: 60_000,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// [context]
// ---------------------------------------------------------------------------

/// Conversation context sent with each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Number of most recent turns sent as history. `0` sends everything.
    pub window_turns: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { window_turns: 6 }
    }
}

impl ContextConfig {
    /// The window as an optional bound (`None` = unbounded).
    pub fn window(&self) -> Option<usize> {
        if self.window_turns == 0 {
            None
        } else {
            Some(self.window_turns)
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Local web server settings for `codementor serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. Loopback only by default.
    pub addr: String,
    /// Open the page in the system browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the event log is written at all.
    pub enabled: bool,
    /// Path to the event log file. `~` is expanded to the home directory.
    pub path: String,
    /// Log level: `"error"`, `"warn"`, `"info"`, `"debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.codementor/events.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    std::path::PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl MentorConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `codementor config init` to create a starting config file
    /// with all settings documented.
    pub fn default_toml() -> String {
        r#"# CodeMentor Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CODEMENTOR_*)
#   2. Project config (.codementor.toml in current directory)
#   3. User global config (~/.codementor/config.toml)
#   4. Built-in defaults

[general]
subject = "python"            # python | java
persist_history = true        # false keeps history in memory only
data_dir = "~/.codementor"

[model]
endpoint = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.0-flash-exp"
api_key = ""                  # or CODEMENTOR_API_KEY / `codementor chat` -> /key
timeout_ms = 60000
temperature = 0.7
top_k = 40
top_p = 0.95
max_output_tokens = 1024

[context]
window_turns = 6              # 0 sends the whole conversation

[server]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true
path = "~/.codementor/events.jsonl"
level = "info"                # error | warn | info | debug
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
