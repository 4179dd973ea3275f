use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use codementor::catalog::Subject;
use codementor::session::Session;
use codementor::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "codementor")]
#[command(about = "AI teaching assistant for AP Computer Science")]
#[command(version)]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the chat page on a local address
    Serve {
        /// Address to bind (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Chat in the terminal
    Chat {
        /// Subject to start with: python or java
        #[arg(long)]
        subject: Option<String>,
    },
    /// Ask a single question and print the reply
    Ask {
        /// Subject for this question: python or java
        #[arg(long)]
        subject: Option<String>,
        /// The question
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
    },
    /// Show or clear the stored conversation
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Summarize the event log
    Log {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of events
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check configuration, API key and storage
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    /// Print the stored conversation
    Show {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete the stored conversation
    Clear,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.codementor/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `codementor config set general.subject java`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();

    match app.command {
        Commands::Serve { addr, no_open } => {
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let mut session = Session::open(&cfg);
            web::serve(&addr, &mut session, cfg.server.open_browser && !no_open)
        }
        Commands::Chat { subject } => {
            apply_subject(&mut cfg, subject.as_deref())?;
            cli::chat::run_chat(&cfg)
        }
        Commands::Ask { subject, question } => {
            apply_subject(&mut cfg, subject.as_deref())?;
            cli::run_ask(&cfg, &question.join(" "))
        }
        Commands::History { action } => match action {
            HistoryAction::Show { format } => {
                let fmt = cli::OutputFormat::from_str_opt(Some(&format));
                cli::run_history_show(&cfg, fmt)
            }
            HistoryAction::Clear => cli::run_history_clear(&cfg),
        },
        Commands::Log { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_log(&cfg, fmt, days)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

/// Apply a `--subject` flag on top of the loaded config.
fn apply_subject(cfg: &mut config::MentorConfig, subject: Option<&str>) -> Result<()> {
    if let Some(raw) = subject {
        let Some(parsed) = Subject::parse(raw) else {
            bail!("unknown subject '{raw}' (expected python or java)");
        };
        cfg.general.subject = parsed;
    }
    Ok(())
}
