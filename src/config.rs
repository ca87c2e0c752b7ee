//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json` and contains the identity of
//! the user the tracker acts for, where the ledger file lives, and UI timing settings.

use crate::error::{ErrorType, IntoResult, Res};
use crate::session::Session;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_JSON: &str = "ledger.json";
const NAVIGATION_DELAY_MS: u64 = 2000;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and an initial `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/fintrack`
    /// - `user_id` - The user the tracker acts for. May be left out and supplied per command.
    /// - `display_name` - The name to greet the user with.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if `dir` already holds a config file.
    pub async fn create(
        dir: impl Into<PathBuf>,
        user_id: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), user_id, display_name)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        user_id: Option<&str>,
        display_name: Option<&str>,
    ) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fintrack home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile {
            user_id: user_id.map(str::to_string),
            display_name: display_name.map(str::to_string),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `fintrack_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(fintrack_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(fintrack_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        if !maybe_relative.is_dir() {
            bail!(
                "The fintrack home directory is missing '{}', run 'fintrack init' first",
                maybe_relative.display()
            );
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Overrides the configured user for the lifetime of this object. The file is not changed.
    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        if user_id.is_some() {
            self.config_file.user_id = user_id;
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn user_id(&self) -> Option<&str> {
        self.config_file.user_id.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.config_file.display_name.as_deref()
    }

    /// Returns the stored `ledger_path` if it is absolute, otherwise resolves it against the home
    /// directory.
    pub fn ledger_path(&self) -> PathBuf {
        let p = self.config_file.ledger_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// How long to wait after a successful create or update before showing the affected listing.
    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.config_file.navigation_delay_ms)
    }

    /// The session for the configured user, anonymous if there is none.
    pub fn session(&self) -> Session {
        let session = match self.user_id().filter(|u| !u.trim().is_empty()) {
            Some(user_id) => Session::new(user_id),
            None => Session::anonymous(),
        };
        match self.display_name() {
            Some(name) => session.with_display_name(name),
            None => session,
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "user_id": "asha",
///   "display_name": "Asha",
///   "ledger_path": "ledger.json",
///   "navigation_delay_ms": 2000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,

    /// Path to the ledger file (optional, relative to config.json or absolute)
    /// Defaults to $FINTRACK_HOME/ledger.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ledger_path: Option<PathBuf>,

    #[serde(default = "default_navigation_delay_ms")]
    navigation_delay_ms: u64,
}

fn default_navigation_delay_ms() -> u64 {
    NAVIGATION_DELAY_MS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            user_id: None,
            display_name: None,
            ledger_path: None,
            navigation_delay_ms: NAVIGATION_DELAY_MS,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }

    fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LEDGER_JSON))
    }
}
