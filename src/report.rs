//! Report sinks: one header row, then one row per processed message

use crate::error::{ExtractError, Result};
use crate::types::{ExtractedRecord, REPORT_HEADER};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Longest worksheet name a workbook accepts
const MAX_SHEET_NAME: usize = 31;

/// Destination of report rows
pub trait ReportSink {
    /// Append one data row
    fn append(&mut self, record: &ExtractedRecord) -> Result<()>;

    /// Flush everything to disk and return the written path
    fn finish(&mut self) -> Result<PathBuf>;

    /// Data rows appended so far
    fn rows(&self) -> usize;
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to xlsx
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Xlsx,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(format!("'{other}' isn't a valid format, use 'xlsx' or 'csv'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xlsx => write!(f, "xlsx"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Open the sink for `format`, creating the file before any mail is read
pub fn open_sink(
    format: OutputFormat,
    path: impl Into<PathBuf>,
    sheet_name: &str,
) -> Result<Box<dyn ReportSink>> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvSink::create(path)?),
        OutputFormat::Xlsx => Box::new(XlsxSink::create(path, sheet_name)?),
    })
}

/// Replace every non alphanumeric character with `_`
#[must_use]
pub fn clean(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn output_err(path: &Path) -> impl Fn(std::io::Error) -> ExtractError + '_ {
    move |e| ExtractError::Output(format!("{}: {e}", path.display()))
}

/// UTF-8 CSV file, created with its header then reopened for appending
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvSink {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let mut header = csv::Writer::from_path(&path)?;
        header.write_record(REPORT_HEADER)?;
        header.flush().map_err(output_err(&path))?;
        drop(header);

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(output_err(&path))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        debug!("Created CSV report at {}", path.display());

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }
}

impl ReportSink for CsvSink {
    fn append(&mut self, record: &ExtractedRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush().map_err(output_err(&self.path))?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<PathBuf> {
        self.writer.flush().map_err(output_err(&self.path))?;
        Ok(self.path.clone())
    }

    fn rows(&self) -> usize {
        self.rows
    }
}

/// Single-sheet workbook, saved on [`ReportSink::finish`]
///
/// An existing file is left untouched until the workbook is saved. A file
/// created only to check the path is removed if the sink is dropped unsaved.
pub struct XlsxSink {
    path: PathBuf,
    workbook: Workbook,
    rows: usize,
    placeholder: bool,
    saved: bool,
}

impl XlsxSink {
    pub fn create(path: impl Into<PathBuf>, sheet_name: &str) -> Result<Self> {
        let path = path.into();

        // Fail on unwritable paths now rather than after the whole run
        let placeholder = !path.exists();
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(output_err(&path))?;

        let mut name: String = clean(sheet_name).chars().take(MAX_SHEET_NAME).collect();
        if name.is_empty() {
            name = "Sheet1".to_string();
        }

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        for (col, title) in (0u16..).zip(REPORT_HEADER) {
            sheet.write_string_with_format(0, col, title, &bold)?;
        }

        debug!("Created workbook for {} (sheet {name})", path.display());

        Ok(Self {
            path,
            workbook,
            rows: 0,
            placeholder,
            saved: false,
        })
    }
}

impl ReportSink for XlsxSink {
    fn append(&mut self, record: &ExtractedRecord) -> Result<()> {
        let row = u32::try_from(self.rows + 1)
            .map_err(|_| ExtractError::Output("too many rows for a worksheet".into()))?;
        let sheet = self.workbook.worksheet_from_index(0)?;
        for (col, cell) in (0u16..).zip(record.as_row()) {
            sheet.write_string(row, col, cell)?;
        }
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<PathBuf> {
        self.workbook.save(&self.path)?;
        self.saved = true;
        Ok(self.path.clone())
    }

    fn rows(&self) -> usize {
        self.rows
    }
}

impl Drop for XlsxSink {
    fn drop(&mut self) {
        if self.placeholder
            && !self.saved
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            debug!("Ignoring error while removing {}: {e}", self.path.display());
        }
    }
}
