//! Single pass over a mailbox folder
//!
//! Connect, log in, select the folder, list matching messages, then fetch,
//! extract and write each message in listing order. The session is released
//! by [`SessionGuard`] whichever way the run ends.

use crate::config::{Config, ErrorPolicy};
use crate::credentials::Credentials;
use crate::error::Result;
use crate::mailbox::{Connector, Mailbox, SessionGuard};
use crate::parser::parse_message;
use crate::report::ReportSink;
use crate::types::ExtractedRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Messages returned by the search
    pub listed: usize,
    /// Rows written to the report
    pub written: usize,
    /// Messages skipped under [`ErrorPolicy::Skip`]
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct Driver {
    folder: String,
    search: String,
    read_only: bool,
    policy: ErrorPolicy,
}

impl Driver {
    #[must_use]
    pub fn new(folder: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            search: search.into(),
            read_only: false,
            policy: ErrorPolicy::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.folder, &config.search)
            .read_only(config.read_only)
            .on_error(config.on_error)
    }

    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub const fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the whole pipeline, writing one row per message into `sink`
    ///
    /// Connection and login failures abort the run. Decode failures of a
    /// single message abort only under [`ErrorPolicy::Abort`]. Fetch and
    /// write failures always abort.
    pub fn run<C: Connector>(
        &self,
        connector: &C,
        credentials: &Credentials,
        sink: &mut dyn ReportSink,
    ) -> Result<RunSummary> {
        let mut session = SessionGuard::new(connector.connect(credentials)?);
        info!("Login successful");

        let exists = session.select(&self.folder, self.read_only)?;
        info!("Selected {} ({exists} messages)", self.folder);

        let ids = session.list(&self.search)?;
        info!("Found {} messages matching {}", ids.len(), self.search);

        let mut summary = RunSummary {
            listed: ids.len(),
            ..RunSummary::default()
        };

        for id in ids {
            let raw = session.fetch_raw(id)?;
            match process_message(&raw) {
                Ok(record) => {
                    if record.is_empty() {
                        debug!("Message {id} has neither a date nor a test centre");
                    }
                    debug!("Message {id}: {record}");
                    sink.append(&record)?;
                    summary.written += 1;
                }
                Err(e) if e.is_per_message() && self.policy == ErrorPolicy::Skip => {
                    warn!("Skipping message {id}: {e}");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Processed {} messages ({} written, {} skipped, {} rows in report)",
            summary.listed,
            summary.written,
            summary.skipped,
            sink.rows()
        );

        Ok(summary)
    }
}

/// Parse raw message bytes and extract its report row
pub fn process_message(raw: &[u8]) -> Result<ExtractedRecord> {
    let message = parse_message(raw)?;
    ExtractedRecord::from_message(&message)
}
