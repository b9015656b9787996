//! Audit log writer — append-only JSONL files.
//!
//! Writes to `~/.homeguard/logs/{session_id}.jsonl` (or the configured
//! directory), one JSON object per line, flushed after every write.

use crate::access::types::AuditEvent;
use crate::audit::types::LogEntry;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only audit logger for one console session.
pub struct AuditLogger {
    session_id: String,
    log_path: PathBuf,
    /// Kept open for the session lifetime
    file: File,
    entry_count: usize,
}

impl AuditLogger {
    /// Create a logger for a session inside `log_dir`.
    /// Creates the directory and file if they don't exist.
    pub fn new(log_dir: impl AsRef<Path>, session_id: &str) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
        Self::open(log_dir.join(format!("{}.jsonl", session_id)), session_id)
    }

    /// Create a logger writing to a specific path (for testing).
    pub fn with_path(path: impl AsRef<Path>, session_id: &str) -> Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(log_path, session_id)
    }

    fn open(log_path: PathBuf, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            session_id: session_id.to_string(),
            log_path,
            file,
            entry_count: 0,
        })
    }

    /// Append one event, stamped with this logger's session id.
    pub fn log(&mut self, event: AuditEvent) -> Result<()> {
        let entry = LogEntry::new(self.session_id.clone(), event);
        let json = serde_json::to_string(&entry).context("Failed to serialize log entry")?;
        writeln!(self.file, "{}", json).context("Failed to write log entry")?;
        self.file.flush().context("Failed to flush log file")?;
        self.entry_count += 1;
        Ok(())
    }

    /// Append a batch of events, typically `AccessController::drain_events`.
    pub fn log_all(&mut self, events: impl IntoIterator<Item = AuditEvent>) -> Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of entries written this session.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}
