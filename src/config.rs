//! Run configuration loaded from `~/.config/centre-extract/config.toml`
//!
//! Every field has a default, so the file is optional. Command line options
//! override what the file sets.

use crate::error::{ExtractError, Result};
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IMAP server hostname
    pub host: String,
    /// IMAP server port (implicit TLS)
    pub port: u16,
    /// Folder to scan
    pub folder: String,
    /// IMAP SEARCH criterion, e.g. `ALL` or `UNSEEN`
    pub search: String,
    /// Open the folder with EXAMINE so no flags change
    pub read_only: bool,
    /// Network timeout in seconds
    pub timeout_secs: u64,
    /// Report file
    pub output: PathBuf,
    /// Report format; guessed from the output extension when unset
    pub format: Option<OutputFormat>,
    /// What to do when a single message cannot be decoded
    pub on_error: ErrorPolicy,
    /// Mailbox address; prompted for when unset
    pub username: Option<String>,
    /// File whose first line is the password
    pub password_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "imap.gmail.com".to_string(),
            port: 993,
            folder: "INBOX".to_string(),
            search: "ALL".to_string(),
            read_only: false,
            timeout_secs: 30,
            output: PathBuf::from("email_data.xlsx"),
            format: None,
            on_error: ErrorPolicy::Skip,
            username: None,
            password_file: None,
        }
    }
}

impl Config {
    /// Default config file location
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("centre-extract/config.toml"))
    }

    /// Load `path`, or the default location when `None`. A missing default
    /// file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ExtractError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ExtractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ExtractError::Config("host must not be empty".into()));
        }
        if self.folder.trim().is_empty() {
            return Err(ExtractError::Config("folder must not be empty".into()));
        }
        if self.search.trim().is_empty() {
            return Err(ExtractError::Config("search must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ExtractError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit format, or the one implied by the output extension
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::from_path(&self.output))
    }
}

/// Handling of messages that fail to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log a warning and continue without a row
    #[default]
    Skip,
    /// Stop the run with the error
    Abort,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("'{other}' isn't a valid policy, use 'skip' or 'abort'")),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}
