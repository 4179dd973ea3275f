//! CLI command implementations for codementor.
//!
//! Provides subcommand handlers for:
//! - `codementor chat` — interactive terminal tutor (see [`chat`])
//! - `codementor ask "question"` — one-shot question
//! - `codementor history show|clear` — stored conversation
//! - `codementor log --days N` — event log summary
//! - `codementor health` — config, key and storage status
//! - `codementor config show|init|set|reset` — configuration management

pub mod chat;

use anyhow::{Result, bail};
use colored::Colorize;

use crate::config::{self, MentorConfig};
use crate::config::schema::expand_home;
use crate::conversation::storage::{API_KEY_SLOT, FileStorage, HISTORY_KEY, Storage};
use crate::conversation::{Conversation, Role, Turn};
use crate::events::reporter::{self, Summary};
use crate::events::{self, EventLog};
use crate::render::terminal::format_for_terminal;
use crate::session::{SendOutcome, Session};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// codementor ask
// ---------------------------------------------------------------------------

/// Send one question and print the reply.
///
/// The exchange is recorded like any other, so it shows up in `chat` and
/// the web page afterwards.
pub fn run_ask(config: &MentorConfig, question: &str) -> Result<()> {
    let mut session = Session::open(config);
    match session.send(question) {
        SendOutcome::Ignored => bail!("nothing to ask: the question is empty"),
        SendOutcome::Replied(turn) => {
            println!("{}", format_for_terminal(turn.content()));
            Ok(())
        }
        SendOutcome::Failed { error, message } => {
            eprintln!("{}", message.content().red());
            Err(error.into())
        }
    }
}

// ---------------------------------------------------------------------------
// codementor history show | clear
// ---------------------------------------------------------------------------

/// Print the stored conversation.
pub fn run_history_show(config: &MentorConfig, format: OutputFormat) -> Result<()> {
    let storage = FileStorage::new(expand_home(&config.general.data_dir));
    let log = EventLog::from_config(&config.logging);
    let conversation = Conversation::restore(&storage, &log);

    if conversation.is_empty() {
        println!("{}", "No conversation history yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(conversation.turns())?);
        }
        OutputFormat::Csv => print_history_csv(conversation.turns()),
        OutputFormat::Table => print_history_table(conversation.turns()),
    }
    Ok(())
}

fn print_history_table(turns: &[Turn]) {
    println!("{}", "Conversation History".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    for turn in turns {
        match turn.role() {
            Role::User => println!("{} {}", "You:".bold().green(), turn.content()),
            Role::Assistant => {
                println!("{}", "CodeMentor:".bold().cyan());
                println!("{}", format_for_terminal(turn.content()));
            }
        }
        println!();
    }
    println!("{}", format!("{} turns", turns.len()).dimmed());
}

fn print_history_csv(turns: &[Turn]) {
    println!("role,content");
    for turn in turns {
        println!("{},{}", turn.role(), csv_field(turn.content()));
    }
}

/// Delete the stored conversation.
pub fn run_history_clear(config: &MentorConfig) -> Result<()> {
    let mut session = Session::open(config);
    let turns = session.conversation().len();
    session.clear_history();
    println!(
        "{} Cleared {} turns of conversation history",
        "✓".green().bold(),
        turns
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// codementor log
// ---------------------------------------------------------------------------

/// Summarize the event log.
pub fn run_log(config: &MentorConfig, format: OutputFormat, days: Option<u32>) -> Result<()> {
    let log = EventLog::from_config(&config.logging);
    let Some(path) = log.path() else {
        println!(
            "{}",
            "Event logging is disabled (logging.enabled = false).".yellow()
        );
        return Ok(());
    };

    let summary = reporter::summarize(path, days);
    if summary.total_events == 0 {
        println!(
            "{}",
            "No events yet. Ask a few questions to see activity.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_summary_json(&summary)?,
        OutputFormat::Csv => print_summary_csv(&summary),
        OutputFormat::Table => print_summary_table(&summary, days),
    }
    Ok(())
}

fn print_summary_table(summary: &Summary, days: Option<u32>) {
    let window = match days {
        Some(d) => format!("last {d} days"),
        None => "all time".to_string(),
    };
    println!("{} ({window})", "CodeMentor Activity".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Events:        ".bold(), summary.total_events);
    println!("  {} {}", "Replies:       ".bold(), summary.requests);
    println!(
        "  {} {} ({:.1}%)",
        "Failures:      ".bold(),
        summary.failures,
        summary.failure_pct()
    );
    println!("  {} {}", "Storage errors:".bold(), summary.storage_errors);
    if let Some(avg) = summary.avg_latency_ms {
        println!("  {} {} ms", "Avg latency:   ".bold(), avg);
    }
    println!();

    if !summary.subjects.is_empty() {
        println!("{}", "By Subject".bold().cyan());
        println!("  {:<10} {:>8} {:>8}", "Subject", "Replies", "Failed");
        println!("  {}", "-".repeat(28));
        for stat in &summary.subjects {
            println!(
                "  {:<10} {:>8} {:>8}",
                stat.subject.to_string(),
                stat.requests,
                stat.failures
            );
        }
        println!();
    }

    if !summary.recent_failures.is_empty() {
        println!("{}", "Recent Failures".bold().cyan());
        for (i, entry) in summary.recent_failures.iter().enumerate() {
            let status = entry
                .status
                .map_or_else(|| "-".to_string(), |s| s.to_string());
            let line = format!(
                "  {:<25} {:>4} {}",
                truncate(&entry.timestamp, 25),
                status,
                truncate(&entry.detail, 60)
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
    }
}

fn print_summary_json(summary: &Summary) -> Result<()> {
    let value = serde_json::json!({
        "total_events": summary.total_events,
        "requests": summary.requests,
        "failures": summary.failures,
        "failure_pct": summary.failure_pct(),
        "storage_errors": summary.storage_errors,
        "avg_latency_ms": summary.avg_latency_ms,
        "subjects": summary.subjects.iter().map(|s| serde_json::json!({
            "subject": s.subject,
            "requests": s.requests,
            "failures": s.failures,
        })).collect::<Vec<_>>(),
        "recent_failures": summary.recent_failures,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_summary_csv(summary: &Summary) {
    println!("subject,requests,failures");
    for s in &summary.subjects {
        println!("{},{},{}", s.subject, s.requests, s.failures);
    }
}

// ---------------------------------------------------------------------------
// codementor health
// ---------------------------------------------------------------------------

/// Check configuration, key and storage.
pub fn run_health(config: &MentorConfig) -> Result<()> {
    println!("{}", "CodeMentor Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.codementor/config.toml found"
        } else {
            "not found (run `codementor config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".codementor.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item("Subject", true, config.general.subject.label());
    print_health_item("Model", true, &config.model.model);

    let storage = FileStorage::new(expand_home(&config.general.data_dir));
    let stored_key = storage
        .get(API_KEY_SLOT)
        .ok()
        .flatten()
        .is_some_and(|k| !k.trim().is_empty());
    let env_key = !config.model.api_key.trim().is_empty();
    print_health_item(
        "API key",
        env_key || stored_key,
        if env_key {
            "from config / environment"
        } else if stored_key {
            "stored in data directory"
        } else {
            "missing (set CODEMENTOR_API_KEY or use /key in chat)"
        },
    );

    let history_detail = if !config.general.persist_history {
        "persistence disabled".to_string()
    } else {
        match storage.get(HISTORY_KEY) {
            Ok(Some(_)) => {
                let log = EventLog::disabled();
                format!("{} turns stored", Conversation::restore(&storage, &log).len())
            }
            Ok(None) => "no history yet".to_string(),
            Err(e) => format!("unreadable: {e}"),
        }
    };
    print_health_item(
        "History",
        !history_detail.starts_with("unreadable"),
        &history_detail,
    );
    print_health_item(
        "Data directory",
        storage.dir().exists(),
        &storage.dir().display().to_string(),
    );

    let log = EventLog::from_config(&config.logging);
    match log.path() {
        Some(path) if path.exists() => {
            let entries = events::read_all_entries(path).len();
            print_health_item("Event log", true, &format!("{entries} entries"));
        }
        Some(_) => print_health_item("Event log", true, "no log file yet"),
        None => print_health_item("Event log", false, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// codementor config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective CodeMentor Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.codementor/config.toml", global_exists);
    print_source(".codementor.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "CODEMENTOR_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.codementor/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to change subject, model or storage.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    let shown = if key == "model.api_key" { "********" } else { value };
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), shown);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
