//! `homeguard log` — browse and display audit logs.
//!
//! Shows what happened in a console session: logins, failures, lockouts,
//! resets, overrides and guest entries.

use crate::access::AuditKind;
use crate::audit::{AuditReader, LogFilter, ResultFilter};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

/// Options for `homeguard log`.
#[derive(Debug, Default)]
pub struct LogOptions<'a> {
    pub session_id: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub result: Option<&'a str>,
    pub limit: Option<usize>,
    pub summary_only: bool,
}

/// Run the `homeguard log` command against `log_dir`.
pub fn run_log(log_dir: &Path, options: &LogOptions<'_>) -> Result<()> {
    let reader = AuditReader::new(log_dir);

    let entries = if let Some(sid) = options.session_id {
        reader
            .read_session(sid)
            .with_context(|| format!("Failed to read session: {}", sid))?
    } else {
        let entries = reader.read_latest_session()?;
        if entries.is_empty() {
            println!();
            println!("  {} No audit logs found.", "ℹ".blue());
            println!("  Start a console session first:");
            println!("    {}", "homeguard console".dimmed());
            println!();
            return Ok(());
        }
        entries
    };

    let kind = match options.kind {
        Some(k) => Some(AuditKind::from_str_loose(k).with_context(|| {
            format!("Unknown event kind '{}'", k)
        })?),
        None => None,
    };
    let result = match options.result.map(|r| r.to_lowercase()) {
        None => None,
        Some(r) => match r.as_str() {
            "success" | "granted" | "ok" => Some(ResultFilter::Success),
            "failure" | "denied" | "refused" => Some(ResultFilter::Failure),
            other => bail!("Unknown result filter '{}'. Use success or failure", other),
        },
    };

    let filter = LogFilter {
        session_id: options.session_id.map(|s| s.to_string()),
        kind,
        result,
        limit: options.limit,
    };
    let filtered = AuditReader::filter_entries(&entries, &filter);
    let summary = AuditReader::summarize(&entries);

    if options.summary_only {
        println!();
        println!("  {} Session: {}", "📋".to_string().bold(), summary.session_id.cyan());
        println!();
        println!(
            "  {} total | {} granted | {} refused | {} lockouts | {} overrides",
            summary.total_events.to_string().bold(),
            summary.successes.to_string().green().bold(),
            summary.failures.to_string().red().bold(),
            summary.lockouts.to_string().red(),
            summary.overrides.to_string().yellow(),
        );
        if let (Some(start), Some(end)) = (summary.start_time, summary.end_time) {
            println!("  Duration: {}", format_duration((end - start).num_seconds()));
        }
        println!();
    } else {
        println!();
        println!("  Session: {}", summary.session_id.cyan());
        println!();

        for entry in &filtered {
            println!("  {}", AuditReader::format_entry(entry));
        }

        println!();
        println!(
            "  {} {}",
            "─".repeat(40).dimmed(),
            summary.one_line().dimmed()
        );
        println!();
    }

    Ok(())
}

/// List available sessions.
pub fn run_log_list(log_dir: &Path) -> Result<()> {
    let reader = AuditReader::new(log_dir);
    let sessions = reader.list_sessions()?;

    if sessions.is_empty() {
        println!();
        println!("  {} No sessions found.", "ℹ".blue());
        println!();
        return Ok(());
    }

    println!();
    println!("  {} Recorded sessions:", "📋".to_string().bold());
    println!();
    for session in &sessions {
        println!("  • {}", session);
    }
    println!();
    println!("  View a session: {}", "homeguard log --session <id>".dimmed());
    println!();

    Ok(())
}

fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
