/// Configuration system for CodeMentor.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::MentorConfig::default()`]
/// 2. **User global config** — `~/.codementor/config.toml`
/// 3. **Project local config** — `.codementor.toml` in the current directory
/// 4. **Environment variables** — `CODEMENTOR_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use codementor::config;
///
/// let cfg = config::load();
/// let window = cfg.context.window();
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::MentorConfig;

use crate::catalog::Subject;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved CodeMentor configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> MentorConfig {
    let layers: Vec<String> = [global_config_path(), project_config_path()]
        .into_iter()
        .filter_map(read_layer)
        .collect();

    let mut config = merge_layers(&layers);
    apply_env_overrides(&mut config);
    config
}

/// Read a TOML layer from the given path (if it exists).
fn read_layer(path: Option<PathBuf>) -> Option<String> {
    let path = path?;
    fs::read_to_string(&path).ok()
}

/// Resolve file layers, lowest precedence first, into one config.
///
/// Layers are merged key by key, so a project file that sets only
/// `general.subject` keeps the global `model.api_key`. A layer that does not
/// parse as a config is skipped whole: a broken config file must never keep
/// the tutor from starting.
fn merge_layers(layers: &[String]) -> MentorConfig {
    let mut merged = toml::Value::Table(toml::Table::new());
    for layer in layers {
        let Ok(value) = toml::from_str::<toml::Value>(layer) else {
            continue;
        };
        if value.clone().try_into::<MentorConfig>().is_err() {
            continue;
        }
        merge_toml(&mut merged, value);
    }
    merged.try_into().unwrap_or_default()
}

/// Overlay `overlay` onto `base`: tables merge recursively, anything else
/// replaces.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.codementor/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".codementor").join("config.toml"))
}

/// Path to the project local config: `.codementor.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".codementor.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CODEMENTOR_SUBJECT` — starting subject (`python`, `java`)
/// - `CODEMENTOR_PERSIST_HISTORY` — persist history (`1`/`true`/`yes`/`on`)
/// - `CODEMENTOR_API_KEY` — API key (falls back to `GEMINI_API_KEY`)
/// - `CODEMENTOR_MODEL` — model name
/// - `CODEMENTOR_ENDPOINT` — API base URL
/// - `CODEMENTOR_TIMEOUT_MS` — request timeout
/// - `CODEMENTOR_WINDOW_TURNS` — context window (`0` = unbounded)
/// - `CODEMENTOR_LOG_LEVEL` — event log level
fn apply_env_overrides(config: &mut MentorConfig) {
    if let Ok(val) = std::env::var("CODEMENTOR_SUBJECT")
        && let Some(subject) = Subject::parse(&val)
    {
        config.general.subject = subject;
    }
    if let Ok(val) = std::env::var("CODEMENTOR_PERSIST_HISTORY") {
        config.general.persist_history = is_truthy(&val);
    }

    // Model
    let api_key = std::env::var("CODEMENTOR_API_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|v| !v.is_empty()));
    if let Some(key) = api_key {
        config.model.api_key = key;
    }
    if let Ok(val) = std::env::var("CODEMENTOR_MODEL")
        && !val.is_empty()
    {
        config.model.model = val;
    }
    if let Ok(val) = std::env::var("CODEMENTOR_ENDPOINT")
        && !val.is_empty()
    {
        config.model.endpoint = val;
    }
    if let Ok(val) = std::env::var("CODEMENTOR_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.model.timeout_ms = ms;
    }

    if let Ok(val) = std::env::var("CODEMENTOR_WINDOW_TURNS")
        && let Ok(n) = val.parse::<usize>()
    {
        config.context.window_turns = n;
    }
    if let Ok(val) = std::env::var("CODEMENTOR_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val.to_ascii_lowercase();
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.codementor/config.toml`.
///
/// Creates the `~/.codementor/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.codementor/ directory")?;
    }

    fs::write(&path, MentorConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `model.temperature`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&MentorConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject writes that would leave an unloadable file behind.
    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<MentorConfig>(&output)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key segment in '{key}'");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // The existing value decides how the raw string is parsed.
    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
///
/// The API key is masked so the output is safe to paste into a bug report.
pub fn show_effective_config() -> Result<String> {
    let mut config = load();
    if !config.model.api_key.is_empty() {
        config.model.api_key = "********".to_string();
    }
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn project_layer_keeps_global_keys_it_does_not_set() {
        let global = r#"
[general]
subject = "python"

[model]
api_key = "secret"
temperature = 0.2
"#;
        let project = r#"
[general]
subject = "java"

[model]
model = "gemini-1.5-pro"
"#;
        let config = merge_layers(&[global.to_string(), project.to_string()]);
        assert_eq!(config.general.subject, Subject::Java);
        assert_eq!(config.model.api_key, "secret");
        assert_eq!(config.model.model, "gemini-1.5-pro");
        assert!((config.model.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.model.endpoint, MentorConfig::default().model.endpoint);
    }

    #[test]
    fn broken_layer_is_skipped() {
        let global = "[model]\napi_key = \"secret\"\n";
        for broken in ["[model\napi_key = ", "[context]\nwindow_turns = \"six\"\n"] {
            let config = merge_layers(&[global.to_string(), broken.to_string()]);
            assert_eq!(config.model.api_key, "secret", "layer {broken:?}");
            assert_eq!(config.context.window_turns, MentorConfig::default().context.window_turns);
        }
    }

    #[test]
    fn no_layers_gives_defaults() {
        let config = merge_layers(&[]);
        assert_eq!(config.model.model, MentorConfig::default().model.model);
        assert!(config.model.api_key.is_empty());
    }

    #[test]
    fn set_toml_value_updates_string() {
        let toml_str = r#"
[general]
subject = "python"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "general.subject", "java").unwrap();

        let general = root["general"].as_table().unwrap();
        assert_eq!(general["subject"].as_str(), Some("java"));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let toml_str = r#"
[general]
persist_history = true
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "general.persist_history", "off").unwrap();

        let general = root["general"].as_table().unwrap();
        assert_eq!(general["persist_history"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let toml_str = r#"
[context]
window_turns = 6
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "context.window_turns", "10").unwrap();

        let context = root["context"].as_table().unwrap();
        assert_eq!(context["window_turns"].as_integer(), Some(10));
    }

    #[test]
    fn set_toml_value_updates_float() {
        let toml_str = r#"
[model]
temperature = 0.7
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "model.temperature", "0.3").unwrap();

        let model = root["model"].as_table().unwrap();
        assert!((model["temperature"].as_float().unwrap() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value = toml::from_str("[context]\nwindow_turns = 6\n").unwrap();
        assert!(set_toml_value(&mut root, "context.window_turns", "six").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[general]\nsubject = \"python\"\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "general.nope", "value").is_err());
        assert!(set_toml_value(&mut root, "general..subject", "java").is_err());
    }

    #[test]
    fn defaults_serialize_to_settable_tree() {
        let text = toml::to_string_pretty(&MentorConfig::default()).unwrap();
        let mut root: toml::Value = toml::from_str(&text).unwrap();
        set_toml_value(&mut root, "server.addr", "127.0.0.1:1234").unwrap();
        let back: MentorConfig = root.try_into().unwrap();
        assert_eq!(back.server.addr, "127.0.0.1:1234");
    }
}
