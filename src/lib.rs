// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Test Centre Extractor
//!
//! Scans an IMAP folder and writes the booking date and test centre found in
//! each message body to a spreadsheet or CSV report.
//!
//! # Features
//!
//! - Tagged message parts, decided once while parsing
//! - First `text/plain` part wins in multi-part messages
//! - Independent first-match extraction of `Date:` and `Test Centre:` lines
//! - xlsx and CSV report sinks
//! - Skip-or-abort policy for undecodable messages
//!
//! # Example
//!
//! ```rust
//! use centre_extract::{extract_fields, NOT_FOUND};
//!
//! let fields = extract_fields("Date: 2024-03-15 09:30:00\nTest Centre: London Bridge\n");
//! assert_eq!(fields.date, "2024-03-15 09:30:00");
//! assert_eq!(fields.centre, "London Bridge");
//!
//! let empty = extract_fields("nothing here");
//! assert_eq!(empty.date, NOT_FOUND);
//! ```

pub mod config;
pub mod credentials;
pub mod driver;
mod error;
mod extracted;
pub mod mailbox;
mod parser;
pub mod report;
mod types;

pub use config::{Config, ErrorPolicy};
pub use driver::{Driver, RunSummary, process_message};
pub use error::{ExtractError, Result};
pub use extracted::*;
pub use parser::{extract_body, parse_message};
pub use types::*;
