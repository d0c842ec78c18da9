//! # Error Log
//!
//! Persistent, best-effort records of failures caught at the tick and input
//! boundaries. Two on-disk formats exist and are not interchangeable:
//! a JSON array of `{timestamp, type, message}` objects, and plain text
//! blocks appended one after another.
//!
//! A sink never fails. Problems writing the log itself are reported through
//! `log::warn!` and otherwise ignored.

use crate::UndercroftError;
use chrono::Local;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default file name for the JSON log.
pub const DEFAULT_JSON_LOG: &str = "error_log.json";
/// Default file name for the text log.
pub const DEFAULT_TEXT_LOG: &str = "error_log.txt";

/// One logged failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Local time, RFC 3339
    pub timestamp: String,
    /// Error classification, e.g. `UpdateTickError`
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorRecord {
    /// Creates a record stamped with the current local time.
    pub fn now(kind: &str, message: &str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            kind: kind.to_string(),
            message: message.to_string(),
        }
    }
}

/// Destination for error records.
pub trait ErrorSink {
    /// Appends a record. Must not panic or report failure.
    fn record(&mut self, kind: &str, message: &str);

    /// Appends a record for an error, classified by its kind.
    fn record_error(&mut self, error: &UndercroftError) {
        self.record(error.kind(), &error.to_string());
    }
}

/// Keeps the whole log as one pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonErrorLog {
    path: PathBuf,
}

impl JsonErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the existing records; an unreadable or corrupt file counts as empty.
    pub fn load(&self) -> Vec<ErrorRecord> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn append(&self, record: ErrorRecord) -> std::io::Result<()> {
        let mut records = self.load();
        records.push(record);
        let text = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, text)
    }
}

impl ErrorSink for JsonErrorLog {
    fn record(&mut self, kind: &str, message: &str) {
        if let Err(e) = self.append(ErrorRecord::now(kind, message)) {
            warn!("Could not write error log {}: {}", self.path.display(), e);
        }
    }
}

/// Appends timestamped text blocks.
#[derive(Debug, Clone)]
pub struct TextErrorLog {
    path: PathBuf,
}

impl TextErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &ErrorRecord) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{}] {}", record.timestamp, record.kind)?;
        writeln!(file, "{}", record.message)?;
        writeln!(file)
    }
}

impl ErrorSink for TextErrorLog {
    fn record(&mut self, kind: &str, message: &str) {
        if let Err(e) = self.append(&ErrorRecord::now(kind, message)) {
            warn!("Could not write error log {}: {}", self.path.display(), e);
        }
    }
}

/// Holds records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryErrorLog {
    pub records: Vec<ErrorRecord>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorSink for MemoryErrorLog {
    fn record(&mut self, kind: &str, message: &str) {
        self.records.push(ErrorRecord::now(kind, message));
    }
}

/// On-disk format of the persistent error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLogFormat {
    Json,
    Text,
}

impl ErrorLogFormat {
    pub fn default_path(self) -> &'static str {
        match self {
            ErrorLogFormat::Json => DEFAULT_JSON_LOG,
            ErrorLogFormat::Text => DEFAULT_TEXT_LOG,
        }
    }

    /// Opens a sink of this format at `path`, or at the format's default file.
    pub fn open(self, path: Option<PathBuf>) -> Box<dyn ErrorSink> {
        let path = path.unwrap_or_else(|| PathBuf::from(self.default_path()));
        match self {
            ErrorLogFormat::Json => Box::new(JsonErrorLog::new(path)),
            ErrorLogFormat::Text => Box::new(TextErrorLog::new(path)),
        }
    }
}
