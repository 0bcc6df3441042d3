use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use upchat_core::session::SessionId;

use crate::app::App;
use crate::display;

pub async fn list(app: &App) -> Result<()> {
    let sessions = app.controller.history().await;
    let active = app.controller.session_id().await;
    display::print_history(&sessions, Some(active));
    Ok(())
}

pub async fn show(app: &App, id: SessionId) -> Result<()> {
    let session = app
        .controller
        .find_session(id)
        .await
        .with_context(|| format!("No session with id {}", id))?;

    println!("{}", session.title);
    println!();
    display::print_transcript(
        &session.messages,
        &app.profile.profile().display_name,
        app.bot_name(),
    );
    Ok(())
}

pub async fn delete(app: &App, id: SessionId) -> Result<()> {
    if !app.controller.delete_history(id).await {
        bail!("No session with id {}", id);
    }
    println!("Deleted session {}", id);
    Ok(())
}

pub async fn clear(app: &App, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete all chat history without --yes");
    }
    let count = app.controller.history().await.len();
    app.controller.clear_history().await;
    println!("Deleted {} sessions", count);
    Ok(())
}

pub async fn export(app: &App, id: SessionId, output: Option<PathBuf>) -> Result<()> {
    let text = app.controller.export_session(id).await?;
    write_or_print(&text, output)
}

/// Writes `text` to `output`, or to stdout when no path is given.
pub fn write_or_print(text: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
