//! Built-in config templates that ship with homeguard.
//!
//! - `standard`: the stock console — 3 attempts, 1 hour lock, guests up to 31 days
//! - `strict`: fewer attempts, longer lock, shorter guest windows, wider night blackout

/// Stock console settings. Parsing this gives `Config::default()`.
pub const STANDARD_YAML: &str = r#"# homeguard config: standard
# The stock console behaviour.

profile: standard-v1

# Invalid usernames are rejected and re-prompted (use "lenient" to fall back
# to default_username instead). Empty input always takes the default.
username_policy: strict
default_username: homeowner

# Applied when the owner leaves the password prompt empty.
default_password: "0000"

lockout:
  # Consecutive wrong passwords before the console locks
  max_attempts: 3
  duration_minutes: 60

guest:
  max_attempts: 10
  max_days: 31
  # Guests are refused from 00:00 until 06:00
  night_start_hour: 0
  night_end_hour: 6

audit:
  enabled: true
"#;

/// Tighter settings for households that want less leeway.
pub const STRICT_YAML: &str = r#"# homeguard config: strict
# Fewer attempts, longer lockouts, shorter guest windows.

profile: strict-v1

description: >
  Locks after two wrong passwords for four hours and keeps guest access
  to a week, with guests refused overnight from 22:00 until 07:00.

username_policy: strict
default_username: homeowner
default_password: "0000"

lockout:
  max_attempts: 2
  duration_minutes: 240

guest:
  max_attempts: 5
  max_days: 7
  night_start_hour: 22
  night_end_hour: 7

audit:
  enabled: true
"#;

/// Get the YAML content for a named template.
pub fn get_default_config(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "standard" | "default" | "stock" => Some(STANDARD_YAML),
        "strict" | "tight" => Some(STRICT_YAML),
        _ => None,
    }
}

/// List all available template names.
pub fn available_templates() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "standard",
            "Stock console — 3 attempts, 1 hour lockout, guests up to 31 days",
        ),
        (
            "strict",
            "2 attempts, 4 hour lockout, guests up to 7 days, overnight blackout",
        ),
    ]
}
