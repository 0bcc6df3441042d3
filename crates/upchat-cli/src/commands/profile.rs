use anyhow::Result;
use std::path::Path;

use crate::app::App;
use crate::display;

pub fn show(app: &App) -> Result<()> {
    display::print_profile(&app.profile.profile());
    Ok(())
}

pub fn set_name(app: &App, name: &str) -> Result<()> {
    let profile = app.profile.set_display_name(name)?;
    println!("Display name set to {}", profile.display_name);
    Ok(())
}

pub fn set_avatar(app: &App, path: &Path) -> Result<()> {
    app.profile.set_avatar_from_file(path)?;
    println!("Avatar set from {}", path.display());
    Ok(())
}

pub fn clear_avatar(app: &App) -> Result<()> {
    app.profile.clear_avatar();
    println!("Avatar removed");
    Ok(())
}
