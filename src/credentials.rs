//! Credential providers for the mailbox login

use crate::error::{ExtractError, Result};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the mailbox address
pub const USER_ENV: &str = "CENTRE_EXTRACT_USER";

/// Environment variable holding the mailbox password
pub const PASSWORD_ENV: &str = "CENTRE_EXTRACT_PASSWORD";

/// Mailbox login
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of login credentials
pub trait CredentialProvider {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Credentials, or `None` when this source has nothing to offer
    fn credentials(&self) -> Result<Option<Credentials>>;
}

/// Reads `CENTRE_EXTRACT_USER` and `CENTRE_EXTRACT_PASSWORD`
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        match (std::env::var(USER_ENV), std::env::var(PASSWORD_ENV)) {
            (Ok(user), Ok(password)) if !user.is_empty() => {
                Ok(Some(Credentials::new(user, password)))
            }
            _ => Ok(None),
        }
    }
}

/// Password from the first line of a secret file
#[derive(Debug, Clone)]
pub struct FileCredentials {
    pub username: Option<String>,
    pub path: PathBuf,
}

impl CredentialProvider for FileCredentials {
    fn name(&self) -> &'static str {
        "secret file"
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        let Some(username) = self.username.clone() else {
            return Ok(None);
        };

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ExtractError::Credentials(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let password = content.lines().next().unwrap_or_default().trim();
        if password.is_empty() {
            return Err(ExtractError::Credentials(format!(
                "{} is empty",
                self.path.display()
            )));
        }

        Ok(Some(Credentials::new(username, password)))
    }
}

/// Interactive prompt; the password is not echoed
#[derive(Debug, Default, Clone)]
pub struct PromptCredentials {
    /// Skip the address prompt when already known
    pub username: Option<String>,
}

impl CredentialProvider for PromptCredentials {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        let prompt_err = |e: io::Error| ExtractError::Credentials(e.to_string());

        let username = if let Some(username) = &self.username {
            username.clone()
        } else {
            print!("Enter your email address: ");
            io::stdout().flush().map_err(prompt_err)?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map_err(prompt_err)?;
            line.trim().to_string()
        };
        if username.is_empty() {
            return Ok(None);
        }

        let password =
            rpassword::prompt_password("Enter your email password: ").map_err(prompt_err)?;

        Ok(Some(Credentials::new(username, password)))
    }
}

/// Tries each provider in order; the first to yield credentials wins
#[derive(Default)]
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Resolve credentials or fail with [`ExtractError::Credentials`]
    pub fn resolve(&self) -> Result<Credentials> {
        for provider in &self.providers {
            if let Some(credentials) = provider.credentials()? {
                debug!("Using credentials from {}", provider.name());
                return Ok(credentials);
            }
        }
        Err(ExtractError::Credentials(
            "no provider supplied a username and password".into(),
        ))
    }
}
