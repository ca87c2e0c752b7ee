use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json`.
///
/// # Arguments
/// - `fintrack_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/fintrack`
/// - `user` - The user the tracker records transactions for. When left out, every other command
///   needs `--user`.
/// - `name` - The name to greet the user with.
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory is already initialized.
pub async fn init(fintrack_home: &Path, user: Option<&str>, name: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(fintrack_home, user, name)
        .await
        .map_err(anyhow::Error::from)
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    let message = match config.user_id() {
        Some(user) => format!(
            "Successfully created the fintrack directory and config for user '{user}' at {}",
            config.root().display()
        ),
        None => format!(
            "Successfully created the fintrack directory and config at {}. No user is set, pass \
            --user to other commands.",
            config.root().display()
        ),
    };
    Ok(message.into())
}
