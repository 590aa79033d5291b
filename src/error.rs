//! Error types for mailbox extraction runs

use thiserror::Error;

/// Errors that can occur while extracting records from a mailbox
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The server rejected the credentials or the login policy
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network or IMAP protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failed to decode a message header or body
    #[error("Failed to decode message: {0}")]
    Decode(String),

    /// A multi-part message carried no text/plain part
    #[error("Message has no text/plain part")]
    NoTextContent,

    /// Cannot create or write the report file
    #[error("Output error: {0}")]
    Output(String),

    /// No usable credentials were provided
    #[error("Missing credentials: {0}")]
    Credentials(String),

    /// Invalid configuration file or option
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    /// Process exit code reported by the binary for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Credentials(_) => 3,
            Self::Auth(_) => 4,
            Self::Transport(_) => 5,
            Self::Output(_) => 6,
            Self::Decode(_) | Self::NoTextContent => 7,
        }
    }

    /// Whether the error concerns a single message rather than the whole run
    #[must_use]
    pub const fn is_per_message(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::NoTextContent)
    }
}

impl From<imap::error::Error> for ExtractError {
    fn from(err: imap::error::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExtractError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
