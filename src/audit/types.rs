//! Types for the homeguard audit log.
//!
//! The controller emits `AuditEvent`s; the console stamps each with its
//! session id and appends it to the session's log file.

use crate::access::types::{AuditEvent, AuditKind};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single line in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Console session that produced the event (UUID, generated at start)
    pub session_id: String,

    #[serde(flatten)]
    pub event: AuditEvent,
}

impl LogEntry {
    pub fn new(session_id: impl Into<String>, event: AuditEvent) -> Self {
        Self {
            session_id: session_id.into(),
            event,
        }
    }
}

/// Summary statistics for a session's audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub total_events: usize,
    pub successes: usize,
    pub failures: usize,
    pub lockouts: usize,
    pub overrides: usize,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

impl SessionSummary {
    /// Format as a human-readable one-liner for terminal output.
    pub fn one_line(&self) -> String {
        format!(
            "{} events | {} granted | {} refused | {} lockouts | {} overrides",
            self.total_events, self.successes, self.failures, self.lockouts, self.overrides
        )
    }
}

/// Filter criteria for querying audit logs.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub session_id: Option<String>,
    pub kind: Option<AuditKind>,
    pub result: Option<ResultFilter>,
    pub limit: Option<usize>,
}

/// Filter by whether an event was a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFilter {
    Success,
    Failure,
}
