use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{self, schema::LoggingConfig};

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the request log (`~/.repair-ai/request-log.jsonl`).
///
/// One line per client operation, whatever its outcome. `repair-ai stats`
/// aggregates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    /// `"status"`, `"health"`, `"ask"` or `"detect"`.
    pub operation: String,
    /// `"live"`, `"fallback"` or `"demo"`.
    pub source: String,
    /// Whether the backend answered with a usable response.
    #[serde(default = "default_true")]
    pub success: bool,
    pub latency_ms: u64,
    /// Failure reason for fallback entries.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RequestLogEntry {
    pub fn new(operation: &str, source: &str, success: bool, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            source: source.to_string(),
            success,
            latency_ms,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Best-effort request logger plus `[repair-ai]` stderr diagnostics.
///
/// Nothing here ever returns an error to the caller: a log that cannot be
/// written is dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    path: Option<PathBuf>,
    verbose: bool,
}

impl RequestLogger {
    pub fn from_config(config: &LoggingConfig) -> Self {
        let path = if config.enabled {
            config::expand_home(&config.path)
        } else {
            None
        };
        Self {
            path,
            verbose: config.verbose,
        }
    }

    /// A logger that writes nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Log to an explicit file.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            verbose: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log(&self, entry: &RequestLogEntry) {
        if let Some(path) = &self.path {
            let _ = append_log_entry(path, entry);
        }
    }

    /// Print a diagnostic line when verbose logging is on.
    pub fn diag(&self, message: &str) {
        if self.verbose {
            eprintln!("[repair-ai] {message}");
        }
    }
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from a request log. Malformed lines are skipped; a
/// missing file reads as empty.
pub fn read_all_entries(path: &Path) -> Vec<RequestLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last `days` days, or all of them for `None`.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<RequestLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_log_entry(path: &Path, entry: &RequestLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("request-log.jsonl");
        let logger = RequestLogger::to_file(&path);

        logger.log(&RequestLogEntry::new("ask", "live", true, 120));
        logger.log(&RequestLogEntry::new("detect", "fallback", false, 3).with_detail("refused"));

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].operation, "ask");
        assert_eq!(entries[1].detail.as_deref(), Some("refused"));
        assert!(!entries[1].success);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let good = serde_json::to_string(&RequestLogEntry::new("status", "demo", true, 0)).unwrap();
        fs::write(&path, format!("not json\n{good}\n{{\"half\":\n")).unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "demo");
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_all_entries(&dir.path().join("absent.jsonl")).is_empty());
    }

    #[test]
    fn day_filter_drops_old_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let logger = RequestLogger::to_file(&path);

        let mut old = RequestLogEntry::new("ask", "live", true, 10);
        old.timestamp = (Utc::now() - chrono::Duration::days(30)).to_rfc3339();
        logger.log(&old);
        logger.log(&RequestLogEntry::new("ask", "live", true, 10));

        assert_eq!(read_entries_since_days(&path, Some(7)).len(), 1);
        assert_eq!(read_entries_since_days(&path, None).len(), 2);
    }

    #[test]
    fn disabled_config_has_no_path() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(RequestLogger::from_config(&config).path().is_none());
        assert!(RequestLogger::disabled().path().is_none());
    }

    #[test]
    fn success_defaults_to_true_when_absent() {
        let line = r#"{"timestamp":"2026-01-01T00:00:00Z","operation":"ask","source":"live","latency_ms":5}"#;
        let entry: RequestLogEntry = serde_json::from_str(line).unwrap();
        assert!(entry.success);
        assert!(entry.detail.is_none());
    }
}
