//! Core types for fetched messages and report rows

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written when a field pattern finds no match
pub const NOT_FOUND: &str = "N/A";

/// Fixed header row of every report
pub const REPORT_HEADER: [&str; 3] = ["Subject", "Date", "Test Centre"];

/// A parsed message reduced to what the report needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Decoded subject header (empty when absent)
    pub subject: String,

    /// Message body
    pub body: MessageBody,
}

/// Body layout of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Non-multipart message with a single payload
    Single(MessagePart),

    /// Leaf parts of a multipart tree, depth-first in document order
    Multi(Vec<MessagePart>),
}

/// One leaf part, classified once while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    /// A `text/plain` part, charset-decoded
    PlainText(String),

    /// Any other part with its transfer-decoded payload
    Other { content_type: String, bytes: Vec<u8> },
}

impl MessagePart {
    #[must_use]
    pub const fn is_plain_text(&self) -> bool {
        matches!(self, Self::PlainText(_))
    }

    /// Content type of the part, lowercased
    #[must_use]
    pub fn content_type(&self) -> &str {
        match self {
            Self::PlainText(_) => "text/plain",
            Self::Other { content_type, .. } => content_type,
        }
    }
}

impl Message {
    pub fn new(subject: impl Into<String>, body: MessageBody) -> Self {
        Self {
            subject: subject.into(),
            body,
        }
    }
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(rename = "Subject")]
    pub subject: String,

    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Test Centre")]
    pub centre: String,
}

impl ExtractedRecord {
    pub fn new(
        subject: impl Into<String>,
        date: impl Into<String>,
        centre: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            date: date.into(),
            centre: centre.into(),
        }
    }

    /// Row cells in header order
    #[must_use]
    pub fn as_row(&self) -> [&str; 3] {
        [&self.subject, &self.date, &self.centre]
    }

    /// True when neither field pattern matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date == NOT_FOUND && self.centre == NOT_FOUND
    }
}

impl fmt::Display for ExtractedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.subject, self.date, self.centre)
    }
}
