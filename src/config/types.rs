//! Typed homeguard configuration.
//!
//! A config names a console profile and carries the tunables for the access
//! controller and the audit trail. `Config::default()` is the stock console.

use crate::access::controller::{AccessPolicy, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use crate::access::types::UsernamePolicy;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Profile name (e.g., "standard-v1")
    pub profile: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub username_policy: UsernamePolicy,
    pub default_username: String,
    pub default_password: String,
    pub lockout: LockoutConfig,
    pub guest: GuestConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failures before the account locks
    pub max_attempts: u32,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestConfig {
    pub max_attempts: u32,
    /// Longest guest window that may be granted
    pub max_days: u32,
    pub night_start_hour: u32,
    pub night_end_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub enabled: bool,
    /// Overrides `~/.homeguard/logs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: "standard-v1".to_string(),
            description: None,
            username_policy: UsernamePolicy::Strict,
            default_username: DEFAULT_USERNAME.to_string(),
            default_password: DEFAULT_PASSWORD.to_string(),
            lockout: LockoutConfig {
                max_attempts: 3,
                duration_minutes: 60,
            },
            guest: GuestConfig {
                max_attempts: 10,
                max_days: 31,
                night_start_hour: 0,
                night_end_hour: 6,
            },
            audit: AuditConfig {
                enabled: true,
                log_dir: None,
            },
        }
    }
}

impl Config {
    /// The controller tunables this config describes.
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy {
            username_policy: self.username_policy,
            default_username: self.default_username.clone(),
            default_password: self.default_password.clone(),
            max_attempts: self.lockout.max_attempts,
            lock_duration: Duration::minutes(i64::from(self.lockout.duration_minutes)),
            guest_max_attempts: self.guest.max_attempts,
            guest_max_days: self.guest.max_days,
            night_start_hour: self.guest.night_start_hour,
            night_end_hour: self.guest.night_end_hour,
        }
    }

    /// Human-readable settings, one per line, for `homeguard check`.
    pub fn describe(&self) -> Vec<String> {
        let night = if self.guest.night_start_hour == self.guest.night_end_hour {
            "none".to_string()
        } else {
            format!(
                "{:02}:00-{:02}:00",
                self.guest.night_start_hour, self.guest.night_end_hour
            )
        };
        vec![
            format!(
                "username policy: {} (default '{}')",
                self.username_policy, self.default_username
            ),
            format!(
                "lockout: {} attempts, {} minutes",
                self.lockout.max_attempts, self.lockout.duration_minutes
            ),
            format!(
                "guest: up to {} days, {} attempts, night blackout {}",
                self.guest.max_days, self.guest.max_attempts, night
            ),
            format!(
                "audit: {}",
                if self.audit.enabled { "on" } else { "off" }
            ),
        ]
    }
}
