use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod app;
mod commands;
mod display;
mod logging;
mod repl;

use app::App;

#[derive(Parser)]
#[command(name = "upchat")]
#[command(about = "UP Chat - talk to the UP support bot from the terminal", long_about = None)]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for chat history, profile and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Inspect or manage saved conversations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show or change your display name and avatar
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Send one message in the current conversation and print the reply
    Send {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved conversations, newest first
    List,
    /// Print one conversation
    Show { id: i64 },
    /// Delete one conversation
    Delete { id: i64 },
    /// Delete every saved conversation
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Export one conversation as plain text
    Export {
        id: i64,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the current profile
    Show,
    /// Set the display name
    SetName { name: String },
    /// Set the avatar from an image file
    SetAvatar { path: PathBuf },
    /// Remove the avatar
    ClearAvatar,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, paths) = app::load_config(cli.config, cli.data_dir)?;
    let _log_guard = logging::init(&paths.logs_dir()?)?;
    let app = App::open(config, &paths)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => repl::run(&app).await?,
        Commands::History { action } => {
            match action {
                HistoryAction::List => commands::history::list(&app).await?,
                HistoryAction::Show { id } => commands::history::show(&app, id).await?,
                HistoryAction::Delete { id } => commands::history::delete(&app, id).await?,
                HistoryAction::Clear { yes } => commands::history::clear(&app, yes).await?,
                HistoryAction::Export { id, output } => {
                    commands::history::export(&app, id, output).await?
                }
            }
            app.close().await?;
        }
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&app)?,
            ProfileAction::SetName { name } => commands::profile::set_name(&app, &name)?,
            ProfileAction::SetAvatar { path } => commands::profile::set_avatar(&app, &path)?,
            ProfileAction::ClearAvatar => commands::profile::clear_avatar(&app)?,
        },
        Commands::Send { text } => {
            commands::send::run(&app, &text.join(" ")).await?;
            app.close().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["upchat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["upchat", "history", "list", "--data-dir", "/tmp/upchat"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/upchat")));
        assert!(matches!(
            cli.command,
            Some(Commands::History {
                action: HistoryAction::List
            })
        ));
    }

    #[test]
    fn test_send_joins_words() {
        let cli = Cli::try_parse_from(["upchat", "send", "ค่าเทอม", "เท่าไหร่"]).unwrap();
        match cli.command {
            Some(Commands::Send { text }) => assert_eq!(text.join(" "), "ค่าเทอม เท่าไหร่"),
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_history_clear_flag() {
        let cli = Cli::try_parse_from(["upchat", "history", "clear", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::History {
                action: HistoryAction::Clear { yes: true }
            })
        ));
    }
}
