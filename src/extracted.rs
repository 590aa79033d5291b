//! Field extraction from message bodies

use crate::error::Result;
use crate::parser::extract_body;
use crate::types::{ExtractedRecord, Message, NOT_FOUND};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fields found in a single message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Booking timestamp, `YYYY-MM-DD HH:MM:SS`
    pub date: String,

    /// Test centre name
    pub centre: String,
}

// Regex patterns
static DATE_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"Date:\s*([0-9]{4}-[0-9]{2}-[0-9]{2}\s+[0-9]{2}:[0-9]{2}:[0-9]{2})").unwrap()
});

// Label and value stay on one line
static CENTRE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"Test Centre:[ \t]*(.*)").unwrap());

/// Extract the booking date and test centre from a body
///
/// Each pattern is searched independently and only its first occurrence
/// counts. Missing fields are set to [`NOT_FOUND`].
#[must_use]
pub fn extract_fields(body: &str) -> ExtractedFields {
    let date = DATE_REGEX
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map_or_else(|| NOT_FOUND.to_string(), |m| m.as_str().to_string());

    let centre = CENTRE_REGEX
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|centre| !centre.is_empty())
        .map_or_else(|| NOT_FOUND.to_string(), str::to_string);

    ExtractedFields { date, centre }
}

impl ExtractedFields {
    /// True when both patterns matched
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.date != NOT_FOUND && self.centre != NOT_FOUND
    }
}

impl ExtractedRecord {
    /// Build the report row for a parsed message
    pub fn from_message(message: &Message) -> Result<Self> {
        let body = extract_body(message)?;
        let fields = extract_fields(&body);
        if !fields.is_complete() {
            debug!(
                "Incomplete booking in {}: date {}, centre {}",
                message.subject, fields.date, fields.centre
            );
        }

        Ok(Self {
            subject: message.subject.clone(),
            date: fields.date,
            centre: fields.centre,
        })
    }
}
