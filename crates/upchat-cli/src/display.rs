//! Terminal rendering of messages, history and profile.

use colored::Colorize;
use upchat_application::profile_service::parse_data_uri;
use upchat_core::session::{Message, Sender, Session};
use upchat_core::user::UserProfile;

pub fn print_message(message: &Message, user_label: &str, bot_label: &str) {
    let id = format!("[{}]", message.id).bright_black();
    match message.sender {
        Sender::User => {
            println!("{} {}", id, format!("{}:", user_label).green().bold());
            for line in message.text.lines() {
                println!("    {}", line.green());
            }
        }
        Sender::Bot => {
            println!("{} {}", id, format!("{}:", bot_label).bright_magenta().bold());
            for line in message.text.lines() {
                println!("    {}", line.bright_blue());
            }
        }
    }
}

pub fn print_transcript(messages: &[Message], user_label: &str, bot_label: &str) {
    for message in messages {
        print_message(message, user_label, bot_label);
    }
}

/// Prints stored sessions numbered from 1, newest first.
pub fn print_history(sessions: &[Session], active: Option<i64>) {
    if sessions.is_empty() {
        println!("{}", "No chat history yet.".bright_black());
        return;
    }
    for (index, session) in sessions.iter().enumerate() {
        let marker = if Some(session.id) == active { "*" } else { " " };
        println!(
            "{}{:>3}. {}  {}",
            marker.bright_yellow(),
            index + 1,
            session.title,
            format!("(id {}, {} messages)", session.id, session.messages.len()).bright_black()
        );
    }
}

pub fn print_profile(profile: &UserProfile) {
    println!("{} {}", "Display name:".bold(), profile.display_name);
    match profile.avatar_image.as_deref().and_then(parse_data_uri) {
        Some((mime, bytes)) => {
            println!("{} {} ({} bytes)", "Avatar:".bold(), mime, bytes.len())
        }
        None => println!("{} {}", "Avatar:".bold(), "none".bright_black()),
    }
}

pub fn info(text: &str) {
    println!("{}", text.bright_black());
}

pub fn error(text: &str) {
    eprintln!("{}", text.red());
}
