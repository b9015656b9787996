//! Config linter — flags settings that weaken the console.
//!
//! Run by `homeguard check`. Nothing here is an error: the config parsed and
//! is usable, these are just things the owner should know.

use crate::config::types::Config;
use colored::Colorize;

/// A lint warning — something the owner should know about their config.
#[derive(Debug)]
pub struct LintWarning {
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Severity {
    /// Weakens security
    Warning,
    /// Worth knowing
    Info,
}

impl LintWarning {
    fn warn_with_fix(msg: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: msg.into(),
            suggestion: Some(fix.into()),
        }
    }

    fn info(msg: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: msg.into(),
            suggestion: None,
        }
    }

    /// Format for terminal output.
    pub fn display(&self) -> String {
        let icon = match self.severity {
            Severity::Warning => "⚠".yellow().to_string(),
            Severity::Info => "ℹ".blue().to_string(),
        };
        let mut out = format!("  {} {}", icon, self.message);
        if let Some(ref suggestion) = self.suggestion {
            out.push_str(&format!("\n    {}: {}", "Fix".green(), suggestion));
        }
        out
    }
}

/// Lint a config and return warnings.
pub fn lint_config(config: &Config) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    check_lockout(config, &mut warnings);
    check_guest(config, &mut warnings);
    check_defaults(config, &mut warnings);
    check_audit(config, &mut warnings);

    warnings
}

fn check_lockout(config: &Config, warnings: &mut Vec<LintWarning>) {
    if config.lockout.max_attempts > 5 {
        warnings.push(LintWarning::warn_with_fix(
            format!(
                "{} attempts before lockout gives a guesser a lot of tries",
                config.lockout.max_attempts
            ),
            "lockout:\n      max_attempts: 3",
        ));
    }
    if config.lockout.duration_minutes < 5 {
        warnings.push(LintWarning::warn_with_fix(
            format!(
                "A {} minute lockout barely slows down guessing a 4 digit password",
                config.lockout.duration_minutes
            ),
            "lockout:\n      duration_minutes: 60",
        ));
    }
}

fn check_guest(config: &Config, warnings: &mut Vec<LintWarning>) {
    if config.guest.max_days > 31 {
        warnings.push(LintWarning::warn_with_fix(
            format!(
                "Guests can be granted up to {} days at a time",
                config.guest.max_days
            ),
            "guest:\n      max_days: 31",
        ));
    }
    if config.guest.night_start_hour == config.guest.night_end_hour {
        warnings.push(LintWarning::info(
            "No night blackout — guests are accepted at any hour",
        ));
    }
}

fn check_defaults(config: &Config, warnings: &mut Vec<LintWarning>) {
    if config.username_policy == crate::access::types::UsernamePolicy::Lenient {
        warnings.push(LintWarning::info(format!(
            "Invalid usernames are silently replaced with '{}'",
            config.default_username
        )));
    }
    let digits: Vec<char> = config.default_password.chars().collect();
    if digits.windows(2).all(|w| w[0] == w[1]) {
        warnings.push(LintWarning::info(format!(
            "The default password '{}' is easy to guess — owners who skip the password prompt get it",
            config.default_password
        )));
    }
}

fn check_audit(config: &Config, warnings: &mut Vec<LintWarning>) {
    if !config.audit.enabled {
        warnings.push(LintWarning::warn_with_fix(
            "Audit logging is off — logins, lockouts and overrides leave no trail",
            "audit:\n      enabled: true",
        ));
    }
}
