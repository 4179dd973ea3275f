//! Terminal chat: a rustyline REPL over one [`Session`].
//!
//! Plain lines are sent as questions. Lines starting with `/` are commands:
//!
//! | command          | action                                  |
//! |------------------|-----------------------------------------|
//! | `/subject [s]`   | show or switch subject (python, java)   |
//! | `/topics`        | list topics for the current subject     |
//! | `/topic N`       | ask about topic N                       |
//! | `/hints`         | list hint chips                         |
//! | `/hint N`        | send hint N                             |
//! | `/clear`         | clear conversation history              |
//! | `/key [KEY]`     | show key status or store a key          |
//! | `/reset-key`     | forget the stored key                   |
//! | `/help`          | list commands                           |
//! | `/quit`          | exit                                    |

use std::borrow::Cow;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::catalog::{self, Subject};
use crate::config::MentorConfig;
use crate::conversation::{Role, Turn};
use crate::render::terminal::format_for_terminal;
use crate::session::{SendOutcome, Session};

const COMMANDS: &[&str] = &[
    "/subject", "/topics", "/topic", "/hints", "/hint", "/clear", "/key", "/reset-key", "/help",
    "/quit",
];

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

/// One REPL input line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Message(&'a str),
    ShowSubject,
    Subject(Subject),
    Topics,
    /// Zero-based topic index.
    Topic(usize),
    Hints,
    /// Zero-based hint index.
    Hint(usize),
    Clear,
    KeyStatus,
    SaveKey(&'a str),
    ResetKey,
    Help,
    Quit,
}

/// Classify a non-empty, trimmed input line.
pub fn parse_line(line: &str) -> Result<ReplCommand<'_>, String> {
    if !line.starts_with('/') {
        return Ok(ReplCommand::Message(line));
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match (name, arg) {
        ("/subject", "") => Ok(ReplCommand::ShowSubject),
        ("/subject", s) => Subject::parse(s)
            .map(ReplCommand::Subject)
            .ok_or_else(|| format!("unknown subject '{s}' (expected python or java)")),
        ("/topics", _) => Ok(ReplCommand::Topics),
        ("/topic", n) => parse_index(n).map(ReplCommand::Topic),
        ("/hints", _) => Ok(ReplCommand::Hints),
        ("/hint", n) => parse_index(n).map(ReplCommand::Hint),
        ("/clear", _) => Ok(ReplCommand::Clear),
        ("/key", "") => Ok(ReplCommand::KeyStatus),
        ("/key", key) => Ok(ReplCommand::SaveKey(key)),
        ("/reset-key", _) => Ok(ReplCommand::ResetKey),
        ("/help", _) => Ok(ReplCommand::Help),
        ("/quit" | "/exit", _) => Ok(ReplCommand::Quit),
        _ => Err(format!("unknown command '{name}' (try /help)")),
    }
}

/// Parse a 1-based list position.
fn parse_index(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a number from the list, got '{raw}'")),
    }
}

// ---------------------------------------------------------------------------
// Line editor helper
// ---------------------------------------------------------------------------

/// Completes and hints slash commands.
struct SlashHelper;

impl Helper for SlashHelper {}

impl Completer for SlashHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for SlashHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for SlashHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for SlashHelper {}

// ---------------------------------------------------------------------------
// REPL
// ---------------------------------------------------------------------------

/// Run the interactive chat until `/quit` or end of input.
pub fn run_chat(config: &MentorConfig) -> Result<()> {
    let mut session = Session::open(config);

    let mut rl: Editor<SlashHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(SlashHelper));

    println!("{}", "CodeMentor".bold().cyan());
    println!(
        "{}",
        format!(
            "Subject: {}. Type a question, or /help for commands.",
            session.subject().label()
        )
        .dimmed()
    );
    println!();

    if session.conversation().is_empty() {
        print_turn(&Turn::assistant(crate::render::panel::WELCOME_MESSAGE));
    } else {
        for turn in session.conversation().turns() {
            print_turn(turn);
        }
    }
    if !session.api_key_status() {
        println!(
            "{}",
            "No API key configured. Use /key YOUR_KEY or set CODEMENTOR_API_KEY.".yellow()
        );
    }

    loop {
        let prompt = format!("{}> ", session.subject());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_line(trimmed) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => handle(&mut session, command),
                    Err(msg) => println!("{}", msg.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Ctrl-C. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    println!("{}", "Goodbye! Keep practicing.".green());
    Ok(())
}

fn handle(session: &mut Session, command: ReplCommand<'_>) {
    match command {
        ReplCommand::Message(text) => {
            session.set_composer(text);
            send_with_indicator(session, Session::submit);
        }
        ReplCommand::ShowSubject => {
            println!("Current subject: {}", session.subject().label().bold());
        }
        ReplCommand::Subject(subject) => {
            session.switch_subject(subject);
            print_last_turn(session);
        }
        ReplCommand::Topics => print_numbered(
            &format!("{} topics", session.subject().label()),
            session.topics(),
        ),
        ReplCommand::Topic(i) => match session.topics().get(i) {
            Some(&topic) => {
                println!("{}", catalog::topic_question(topic).green());
                send_with_indicator(session, |s| s.ask_about_topic(topic));
            }
            None => println!("{}", "No such topic. See /topics.".red()),
        },
        ReplCommand::Hints => print_numbered("Quick prompts", catalog::HINT_CHIPS),
        ReplCommand::Hint(i) => match catalog::HINT_CHIPS.get(i) {
            Some(&hint) => {
                println!("{}", hint.green());
                send_with_indicator(session, |s| s.use_hint(hint));
            }
            None => println!("{}", "No such hint. See /hints.".red()),
        },
        ReplCommand::Clear => {
            session.clear_history();
            println!("{}", "Conversation cleared.".dimmed());
        }
        ReplCommand::KeyStatus => {
            if session.api_key_status() {
                println!("{} API key configured", "✓".green().bold());
            } else {
                println!("{} No API key configured", "✗".red().bold());
            }
        }
        ReplCommand::SaveKey(key) => match session.save_api_key(key) {
            Ok(()) => println!("{} API key saved", "✓".green().bold()),
            Err(e) => println!("{}", format!("Failed to save API key: {e}").red()),
        },
        ReplCommand::ResetKey => {
            session.reset_api_key();
            print_last_turn(session);
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }
}

/// Show a thinking line while the blocking call runs, then the reply.
fn send_with_indicator(session: &mut Session, send: impl FnOnce(&mut Session) -> SendOutcome) {
    println!("{}", "🤖 thinking…".dimmed());
    match send(session) {
        SendOutcome::Ignored => {}
        SendOutcome::Replied(turn) => print_turn(&turn),
        SendOutcome::Failed { message, .. } => {
            println!("{} {}", "🤖".bold(), message.content().red());
            println!();
        }
    }
}

fn print_last_turn(session: &Session) {
    if let Some(turn) = session.conversation().turns().last() {
        print_turn(turn);
    }
}

fn print_turn(turn: &Turn) {
    match turn.role() {
        Role::User => println!("{} {}", "👨‍💻".bold(), turn.content().green()),
        Role::Assistant => println!("{} {}", "🤖".bold(), format_for_terminal(turn.content())),
    }
    println!();
}

fn print_numbered(title: &str, items: &[&str]) {
    println!("{}", title.bold().cyan());
    for (i, item) in items.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, item);
    }
}

fn print_help() {
    println!("{}", "Commands".bold().cyan());
    let rows = [
        ("/subject [python|java]", "show or switch subject"),
        ("/topics", "list topics"),
        ("/topic N", "ask about topic N"),
        ("/hints", "list quick prompts"),
        ("/hint N", "send quick prompt N"),
        ("/clear", "clear conversation history"),
        ("/key [KEY]", "show key status or save a key"),
        ("/reset-key", "forget the stored key"),
        ("/quit", "exit"),
    ];
    for (cmd, what) in rows {
        println!("  {:<24} {}", cmd, what.dimmed());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_messages() {
        assert_eq!(
            parse_line("What is a while loop?"),
            Ok(ReplCommand::Message("What is a while loop?"))
        );
    }

    #[test]
    fn subject_commands() {
        assert_eq!(parse_line("/subject"), Ok(ReplCommand::ShowSubject));
        assert_eq!(
            parse_line("/subject java"),
            Ok(ReplCommand::Subject(Subject::Java))
        );
        assert!(parse_line("/subject rust").is_err());
    }

    #[test]
    fn indexes_are_one_based() {
        assert_eq!(parse_line("/topic 1"), Ok(ReplCommand::Topic(0)));
        assert_eq!(parse_line("/hint 4"), Ok(ReplCommand::Hint(3)));
        assert!(parse_line("/topic 0").is_err());
        assert!(parse_line("/topic").is_err());
        assert!(parse_line("/hint two").is_err());
    }

    #[test]
    fn key_commands() {
        assert_eq!(parse_line("/key"), Ok(ReplCommand::KeyStatus));
        assert_eq!(parse_line("/key  abc123 "), Ok(ReplCommand::SaveKey("abc123")));
        assert_eq!(parse_line("/reset-key"), Ok(ReplCommand::ResetKey));
    }

    #[test]
    fn unknown_commands_are_errors() {
        let err = parse_line("/frobnicate").unwrap_err();
        assert!(err.contains("/frobnicate"));
        assert_eq!(parse_line("/exit"), Ok(ReplCommand::Quit));
    }
}
