use anyhow::{Result, bail};
use upchat_application::SendOutcome;

use crate::app::App;
use crate::display;

/// Sends one message in the active conversation and prints the answer.
pub async fn run(app: &App, text: &str) -> Result<()> {
    match app.controller.send(text).await {
        SendOutcome::Replied { message, .. } | SendOutcome::Failed { message } => {
            display::print_message(&message, &app.profile.profile().display_name, app.bot_name());
            Ok(())
        }
        SendOutcome::Cancelled => bail!("The request was cancelled"),
        SendOutcome::Ignored => bail!("Nothing to send"),
    }
}
