use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use upchat_application::SendOutcome;
use upchat_core::session::MessageId;

use crate::app::App;
use crate::commands::history::write_or_print;
use crate::display;

const COMMANDS: &[(&str, &str)] = &[
    ("/new", "start a new conversation"),
    ("/history", "list saved conversations"),
    ("/load", "<n> open conversation n from /history"),
    ("/delete", "<n> delete conversation n from /history"),
    ("/clear", "delete all saved conversations"),
    ("/edit", "<message-id> take back a question and edit it"),
    ("/show", "<message-id> print one message as plain text"),
    ("/name", "<text> set your display name"),
    ("/avatar", "<path> set your avatar image"),
    ("/export", "[path] export this conversation as text"),
    ("/help", "show this help"),
    ("/quit", "exit"),
];

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    New,
    History,
    Load(usize),
    Delete(usize),
    Clear,
    Edit(MessageId),
    Show(MessageId),
    Name(String),
    Avatar(PathBuf),
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl ReplCommand {
    /// Parses a non-empty input line. Lines not starting with `/` are sent.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if !line.starts_with('/') {
            return Ok(Self::Send(line.to_string()));
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "/new" => Ok(Self::New),
            "/history" => Ok(Self::History),
            "/load" => parse_index(arg, command).map(Self::Load),
            "/delete" => parse_index(arg, command).map(Self::Delete),
            "/clear" => Ok(Self::Clear),
            "/edit" => parse_message_id(arg, command).map(Self::Edit),
            "/show" => parse_message_id(arg, command).map(Self::Show),
            "/name" if !arg.is_empty() => Ok(Self::Name(arg.to_string())),
            "/name" => Err("Usage: /name <text>".to_string()),
            "/avatar" if !arg.is_empty() => Ok(Self::Avatar(PathBuf::from(arg))),
            "/avatar" => Err("Usage: /avatar <path>".to_string()),
            "/export" if arg.is_empty() => Ok(Self::Export(None)),
            "/export" => Ok(Self::Export(Some(PathBuf::from(arg)))),
            "/help" => Ok(Self::Help),
            "/quit" | "/exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {} (try /help)", other)),
        }
    }
}

fn parse_index(arg: &str, command: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Usage: {} <n>, where n is a number from /history", command)),
    }
}

fn parse_message_id(arg: &str, command: &str) -> Result<MessageId, String> {
    arg.parse::<MessageId>()
        .map_err(|_| format!("Usage: {} <message-id>", command))
}

/// Rustyline helper completing and hinting slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Runs the interactive chat until `/quit`, Ctrl-D or a terminal error.
///
/// Messages are sent on background tasks so the prompt stays usable while
/// a reply is pending; starting another action cancels that reply.
pub async fn run(app: &App) -> Result<()> {
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", format!("=== {} ===", app.bot_name()).bright_magenta().bold());
    display::info("Type a message and press Enter. /help lists commands.");
    println!();
    print_conversation(app).await;

    loop {
        let prompt = format!("{}> ", app.profile.profile().display_name);
        let draft = app.controller.take_input_draft().await;
        let readline = if draft.is_empty() {
            rl.readline(&prompt)
        } else {
            rl.readline_with_initial(&prompt, (draft.as_str(), ""))
        };

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                display::error(&format!("Error: {:?}", err));
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                display::error(&message);
                continue;
            }
        };

        if command == ReplCommand::Quit {
            println!("{}", "Goodbye!".bright_green());
            break;
        }
        if command == ReplCommand::Clear && !confirm(&mut rl, "Delete all chat history? [y/N] ") {
            display::info("Cancelled.");
            continue;
        }
        if let Err(e) = execute(app, command).await {
            display::error(&format!("{:#}", e));
        }
    }

    app.close().await
}

fn confirm(rl: &mut Editor<CliHelper, DefaultHistory>, question: &str) -> bool {
    matches!(
        rl.readline(question).map(|answer| answer.trim().to_lowercase()),
        Ok(answer) if answer == "y" || answer == "yes"
    )
}

async fn execute(app: &App, command: ReplCommand) -> Result<()> {
    match command {
        ReplCommand::Send(text) => spawn_send(app, &text).await,
        ReplCommand::New => {
            app.controller.start_new().await;
            print_conversation(app).await;
        }
        ReplCommand::History => {
            let sessions = app.controller.history().await;
            let active = app.controller.session_id().await;
            display::print_history(&sessions, Some(active));
        }
        ReplCommand::Load(n) => {
            let id = session_at(app, n).await?;
            app.controller.load_history(id).await?;
            print_conversation(app).await;
        }
        ReplCommand::Delete(n) => {
            let id = session_at(app, n).await?;
            let was_active = id == app.controller.session_id().await;
            app.controller.delete_history(id).await;
            display::info(&format!("Deleted conversation {}.", n));
            if was_active {
                print_conversation(app).await;
            }
        }
        ReplCommand::Clear => {
            app.controller.clear_history().await;
            display::info("Chat history cleared.");
            print_conversation(app).await;
        }
        ReplCommand::Edit(id) => {
            app.controller.edit_message(id, None).await?;
            display::info("Question taken back. Edit it and press Enter to ask again.");
        }
        ReplCommand::Show(id) => {
            let snapshot = app.controller.snapshot().await;
            match snapshot.messages.iter().find(|m| m.id == id) {
                Some(message) => println!("{}", message.text),
                None => anyhow::bail!("No message with id {}", id),
            }
        }
        ReplCommand::Name(name) => {
            let profile = app.profile.set_display_name(&name)?;
            display::info(&format!("You are now {}.", profile.display_name));
        }
        ReplCommand::Avatar(path) => {
            app.profile.set_avatar_from_file(&path)?;
            display::info("Avatar updated.");
        }
        ReplCommand::Export(path) => {
            let text = app.controller.export_transcript().await;
            write_or_print(&text, path)?;
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }
    Ok(())
}

/// Appends the question, then waits for the answer on a background task
/// and prints it when it arrives.
///
/// The question is in the transcript before this returns, so the next
/// command sees it and a later send supersedes this one.
async fn spawn_send(app: &App, text: &str) {
    let Some(pending) = app.controller.begin_send(text).await else {
        return;
    };
    let controller = app.controller.clone();
    let profile = app.profile.clone();
    let bot_name = app.bot_name().to_string();

    tokio::spawn(async move {
        match controller.finish_send(pending).await {
            SendOutcome::Replied { message, .. } | SendOutcome::Failed { message } => {
                println!();
                display::print_message(&message, &profile.profile().display_name, &bot_name);
            }
            SendOutcome::Cancelled | SendOutcome::Ignored => {}
        }
    });
}

async fn session_at(app: &App, n: usize) -> Result<i64> {
    let sessions = app.controller.history().await;
    sessions
        .get(n - 1)
        .map(|s| s.id)
        .ok_or_else(|| anyhow::anyhow!("No conversation {} (see /history)", n))
}

async fn print_conversation(app: &App) {
    let snapshot = app.controller.snapshot().await;
    display::print_transcript(
        &snapshot.messages,
        &app.profile.profile().display_name,
        app.bot_name(),
    );
}

fn print_help() {
    for (name, description) in COMMANDS {
        println!("  {:<10} {}", name.bright_cyan(), description.bright_black());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            ReplCommand::parse("  ค่าเทอมเท่าไหร่ "),
            Ok(ReplCommand::Send("ค่าเทอมเท่าไหร่".to_string()))
        );
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(ReplCommand::parse("/load 2"), Ok(ReplCommand::Load(2)));
        assert_eq!(ReplCommand::parse("/delete 1"), Ok(ReplCommand::Delete(1)));
        assert_eq!(ReplCommand::parse("/edit 4"), Ok(ReplCommand::Edit(4)));
        assert_eq!(ReplCommand::parse("/show 3"), Ok(ReplCommand::Show(3)));
        assert_eq!(
            ReplCommand::parse("/name  มานี ใจดี"),
            Ok(ReplCommand::Name("มานี ใจดี".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("/export out.txt"),
            Ok(ReplCommand::Export(Some(PathBuf::from("out.txt"))))
        );
        assert_eq!(ReplCommand::parse("/export"), Ok(ReplCommand::Export(None)));
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(ReplCommand::parse("/load").is_err());
        assert!(ReplCommand::parse("/load 0").is_err());
        assert!(ReplCommand::parse("/edit abc").is_err());
        assert!(ReplCommand::parse("/name").is_err());
        assert!(ReplCommand::parse("/avatar").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = ReplCommand::parse("/frobnicate").unwrap_err();
        assert!(err.contains("/frobnicate"));
    }

    #[test]
    fn test_quit_aliases() {
        assert_eq!(ReplCommand::parse("/quit"), Ok(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/exit"), Ok(ReplCommand::Quit));
    }
}
