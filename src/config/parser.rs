//! YAML config parser for homeguard.
//!
//! Every field is optional; anything left out takes the stock value.
//!
//! # Example config file:
//! ```yaml
//! profile: front-door
//! username_policy: lenient
//! lockout:
//!   max_attempts: 5
//!   duration_minutes: 30
//! guest:
//!   night_start_hour: 22
//!   night_end_hour: 6
//! audit:
//!   log_dir: /var/log/homeguard
//! ```

use crate::access::types::UsernamePolicy;
use crate::access::validate;
use crate::config::types::*;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Longest guest window a config may allow.
pub const MAX_GUEST_DAYS: u32 = 366;

/// Raw YAML representation before defaults are applied.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    username_policy: Option<String>,
    #[serde(default)]
    default_username: Option<String>,
    #[serde(default)]
    default_password: Option<StringOrNumber>,
    #[serde(default)]
    lockout: RawLockout,
    #[serde(default)]
    guest: RawGuest,
    #[serde(default)]
    audit: RawAudit,
}

#[derive(Debug, Default, Deserialize)]
struct RawLockout {
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    duration_minutes: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGuest {
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    max_days: Option<u32>,
    #[serde(default)]
    night_start_hour: Option<u32>,
    #[serde(default)]
    night_end_hour: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAudit {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    log_dir: Option<PathBuf>,
}

/// YAML reads an unquoted `1234` as a number; a password written that way
/// is accepted as long as it keeps four digits.
/// ```yaml
/// default_password: "0420"   # quoted — leading zero kept
/// default_password: 1234     # unquoted — also works
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(u64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Parse a YAML config file from a file path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a YAML config string, filling unset fields from `Config::default()`.
pub fn parse_config_str(yaml: &str) -> Result<Config> {
    let raw: RawConfig = if is_blank_document(yaml) {
        RawConfig::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?
    };
    let defaults = Config::default();

    let profile = raw.profile.unwrap_or(defaults.profile);
    if profile.trim().is_empty() {
        bail!("Config must have a non-empty 'profile' name");
    }

    let username_policy = match raw.username_policy.as_deref() {
        None => defaults.username_policy,
        Some(s) => parse_username_policy(s)?,
    };

    let default_username = raw.default_username.unwrap_or(defaults.default_username);
    if default_username.is_empty() {
        bail!("default_username must not be empty");
    }
    validate::check_username(&default_username)
        .with_context(|| format!("Invalid default_username '{}'", default_username))?;

    let default_password = raw
        .default_password
        .map(StringOrNumber::into_string)
        .unwrap_or(defaults.default_password);
    validate::check_password(&default_password).context("Invalid default_password")?;

    let lockout = LockoutConfig {
        max_attempts: raw
            .lockout
            .max_attempts
            .unwrap_or(defaults.lockout.max_attempts),
        duration_minutes: raw
            .lockout
            .duration_minutes
            .unwrap_or(defaults.lockout.duration_minutes),
    };
    if lockout.max_attempts == 0 {
        bail!("lockout.max_attempts must be at least 1");
    }
    if lockout.duration_minutes == 0 {
        bail!("lockout.duration_minutes must be at least 1");
    }

    let guest = GuestConfig {
        max_attempts: raw.guest.max_attempts.unwrap_or(defaults.guest.max_attempts),
        max_days: raw.guest.max_days.unwrap_or(defaults.guest.max_days),
        night_start_hour: raw
            .guest
            .night_start_hour
            .unwrap_or(defaults.guest.night_start_hour),
        night_end_hour: raw
            .guest
            .night_end_hour
            .unwrap_or(defaults.guest.night_end_hour),
    };
    if guest.max_attempts == 0 {
        bail!("guest.max_attempts must be at least 1");
    }
    if !(1..=MAX_GUEST_DAYS).contains(&guest.max_days) {
        bail!(
            "guest.max_days must be between 1 and {}, got {}",
            MAX_GUEST_DAYS,
            guest.max_days
        );
    }
    for (name, hour) in [
        ("guest.night_start_hour", guest.night_start_hour),
        ("guest.night_end_hour", guest.night_end_hour),
    ] {
        if hour > 23 {
            bail!("{} must be between 0 and 23, got {}", name, hour);
        }
    }

    let audit = AuditConfig {
        enabled: raw.audit.enabled.unwrap_or(defaults.audit.enabled),
        log_dir: raw.audit.log_dir,
    };

    Ok(Config {
        profile,
        description: raw.description,
        username_policy,
        default_username,
        default_password,
        lockout,
        guest,
        audit,
    })
}

/// Empty or comment-only files mean "all defaults".
fn is_blank_document(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

fn parse_username_policy(s: &str) -> Result<UsernamePolicy> {
    match s.to_lowercase().trim() {
        "strict" | "reject" => Ok(UsernamePolicy::Strict),
        "lenient" | "default" | "substitute" => Ok(UsernamePolicy::Lenient),
        other => bail!(
            "Unknown username_policy '{}'. Valid policies: strict, lenient",
            other
        ),
    }
}
