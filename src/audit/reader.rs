//! Audit log reader — filter and display session logs.
//!
//! Reads JSONL log files and provides filtering, summarization,
//! and pretty-printing for the `homeguard log` command.

use crate::access::types::AuditKind;
use crate::audit::types::*;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and queries audit log files.
pub struct AuditReader {
    log_dir: PathBuf,
}

impl AuditReader {
    pub fn new(log_dir: impl AsRef<Path>) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    /// Read all entries from a session log file.
    pub fn read_session(&self, session_id: &str) -> Result<Vec<LogEntry>> {
        let path = self.log_dir.join(format!("{}.jsonl", session_id));
        self.read_file(&path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<LogEntry>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse log entry at line {}", i + 1))
            })
            .collect()
    }

    /// Read entries from the most recent session.
    pub fn read_latest_session(&self) -> Result<Vec<LogEntry>> {
        match self.find_latest_session()? {
            Some(path) => self.read_file(&path),
            None => Ok(Vec::new()),
        }
    }

    fn find_latest_session(&self) -> Result<Option<PathBuf>> {
        if !self.log_dir.exists() {
            return Ok(None);
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "jsonl"))
            .collect();

        // Most recently modified first
        entries.sort_by(|a, b| {
            let a_time = fs::metadata(a).and_then(|m| m.modified()).ok();
            let b_time = fs::metadata(b).and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        Ok(entries.into_iter().next())
    }

    /// List all recorded session IDs, sorted.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        if !self.log_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions: Vec<String> = fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "jsonl"))
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
            })
            .collect();

        sessions.sort();
        Ok(sessions)
    }

    /// Filter entries based on criteria.
    pub fn filter_entries(entries: &[LogEntry], filter: &LogFilter) -> Vec<LogEntry> {
        entries
            .iter()
            .filter(|e| {
                if let Some(ref session) = filter.session_id {
                    if e.session_id != *session {
                        return false;
                    }
                }
                if let Some(kind) = filter.kind {
                    if e.event.kind != kind {
                        return false;
                    }
                }
                match filter.result {
                    Some(ResultFilter::Success) if e.event.kind.is_failure() => false,
                    Some(ResultFilter::Failure) if !e.event.kind.is_failure() => false,
                    _ => true,
                }
            })
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Generate a summary for a set of log entries.
    pub fn summarize(entries: &[LogEntry]) -> SessionSummary {
        let mut summary = SessionSummary::default();

        if let Some(first) = entries.first() {
            summary.session_id = first.session_id.clone();
            summary.start_time = Some(first.event.timestamp);
        }
        if let Some(last) = entries.last() {
            summary.end_time = Some(last.event.timestamp);
        }

        summary.total_events = entries.len();
        for entry in entries {
            match entry.event.kind {
                AuditKind::LoginSucceeded | AuditKind::GuestGranted => summary.successes += 1,
                AuditKind::OverrideGranted => {
                    summary.successes += 1;
                    summary.overrides += 1;
                }
                AuditKind::LockedOut => {
                    summary.failures += 1;
                    summary.lockouts += 1;
                }
                kind if kind.is_failure() => summary.failures += 1,
                _ => {}
            }
        }

        summary
    }

    /// Pretty-print a log entry for terminal display.
    pub fn format_entry(entry: &LogEntry) -> String {
        let timestamp = entry.event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let kind = entry.event.kind.to_string();
        let kind_str = if entry.event.kind.is_failure() {
            kind.red().to_string()
        } else {
            kind.green().to_string()
        };

        let mut line = format!(
            "[{}] {} {}",
            timestamp.dimmed(),
            kind_str,
            entry.event.subject.bold()
        );

        if let Some(ref detail) = entry.event.detail {
            line.push_str(&format!(" ({})", detail.dimmed()));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::types::AuditEvent;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn entry(kind: AuditKind, minute: u32) -> LogEntry {
        LogEntry::new(
            "s1",
            AuditEvent {
                timestamp: NaiveDate::from_ymd_opt(2024, 6, 10)
                    .unwrap()
                    .and_hms_opt(10, minute, 0)
                    .unwrap(),
                kind,
                subject: "alice".to_string(),
                detail: None,
            },
        )
    }

    fn sample() -> Vec<LogEntry> {
        vec![
            entry(AuditKind::Initialized, 0),
            entry(AuditKind::LoginFailed, 1),
            entry(AuditKind::LoginFailed, 2),
            entry(AuditKind::LoginFailed, 3),
            entry(AuditKind::LockedOut, 3),
            entry(AuditKind::OverrideGranted, 4),
            entry(AuditKind::GuestGranted, 5),
        ]
    }

    #[test]
    fn test_summarize() {
        let summary = AuditReader::summarize(&sample());
        assert_eq!(summary.session_id, "s1");
        assert_eq!(summary.total_events, 7);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.failures, 4);
        assert_eq!(summary.lockouts, 1);
        assert_eq!(summary.overrides, 1);
        assert_eq!(
            (summary.end_time.unwrap() - summary.start_time.unwrap()).num_minutes(),
            5
        );
    }

    #[test]
    fn test_filter_by_kind_and_limit() {
        let filter = LogFilter {
            kind: Some(AuditKind::LoginFailed),
            limit: Some(2),
            ..Default::default()
        };
        let filtered = AuditReader::filter_entries(&sample(), &filter);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.event.kind == AuditKind::LoginFailed));
    }

    #[test]
    fn test_filter_by_result() {
        let failures = LogFilter {
            result: Some(ResultFilter::Failure),
            ..Default::default()
        };
        assert_eq!(AuditReader::filter_entries(&sample(), &failures).len(), 4);

        let successes = LogFilter {
            result: Some(ResultFilter::Success),
            ..Default::default()
        };
        assert_eq!(AuditReader::filter_entries(&sample(), &successes).len(), 3);
    }

    #[test]
    fn test_list_and_read_sessions() {
        let tmp = TempDir::new().unwrap();
        let mut logger = crate::audit::AuditLogger::new(tmp.path(), "b-session").unwrap();
        logger.log(entry(AuditKind::Initialized, 0).event).unwrap();
        crate::audit::AuditLogger::new(tmp.path(), "a-session").unwrap();

        let reader = AuditReader::new(tmp.path());
        assert_eq!(reader.list_sessions().unwrap(), vec!["a-session", "b-session"]);

        let entries = reader.read_session("b-session").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id, "b-session");
    }

    #[test]
    fn test_missing_dir_has_no_sessions() {
        let reader = AuditReader::new("/nonexistent/homeguard/logs");
        assert!(reader.list_sessions().unwrap().is_empty());
        assert!(reader.read_latest_session().unwrap().is_empty());
    }
}
