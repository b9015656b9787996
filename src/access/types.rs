//! Core types for the homeguard access controller.
//!
//! Account and guest state, the outcomes each operation returns, the typed
//! errors, and the audit events the controller emits for the shell to persist.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The single primary account held by a controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    /// None until the first successful `set_username`
    pub username: Option<String>,
    /// Exactly four ASCII digits once set
    pub password: Option<String>,
    /// Consecutive failed primary verifications
    pub failed_attempts: u32,
    /// Verification is refused while this lies in the future
    pub locked_until: Option<NaiveDateTime>,
}

impl AccountState {
    /// Display name used in messages and audit subjects.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("owner")
    }

    /// The active lock, if any. A lock whose deadline has passed is stale and
    /// ignored; it is only cleared by the next successful verification.
    pub fn active_lock(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.locked_until.filter(|until| now < *until)
    }
}

/// Time-limited guest credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestState {
    /// End of the guest window. None means guest access was never configured.
    pub expiration: Option<NaiveDateTime>,
    /// Failed guest verifications, independent of the primary counter
    pub attempts: u32,
    /// Time of day supplied at setup, recorded but not applied to `expiration`
    pub requested_time_of_day: Option<String>,
}

impl GuestState {
    /// Whether the window is configured and not yet past.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        matches!(self.expiration, Some(expiration) if now <= expiration)
    }
}

/// How `set_username` treats a non-empty candidate that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernamePolicy {
    /// Reject with `InvalidUsername`; the caller re-prompts.
    #[default]
    Strict,
    /// Substitute the configured default username.
    Lenient,
}

impl fmt::Display for UsernamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsernamePolicy::Strict => write!(f, "strict"),
            UsernamePolicy::Lenient => write!(f, "lenient"),
        }
    }
}

/// Result of a primary `verify` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Correct password; counters reset and any lock cleared.
    Granted,
    /// Wrong password; this many attempts remain before lockout.
    Denied { remaining_attempts: u32 },
    /// Wrong password and the attempt ceiling was reached by this call.
    Locked { until: NaiveDateTime },
    /// A lock was already active; the password was not checked.
    StillLocked { until: NaiveDateTime },
}

impl Outcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Outcome::Granted)
    }

    /// The lock deadline, for either locking variant.
    pub fn locked_until(&self) -> Option<NaiveDateTime> {
        match self {
            Outcome::Locked { until } | Outcome::StillLocked { until } => Some(*until),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Granted => write!(f, "granted"),
            Outcome::Denied { remaining_attempts } => {
                write!(f, "denied ({} attempts left)", remaining_attempts)
            }
            Outcome::Locked { until } => write!(f, "locked until {}", until),
            Outcome::StillLocked { until } => write!(f, "still locked until {}", until),
        }
    }
}

/// Result of a `verify_guest_access` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuestOutcome {
    Granted,
    Denied { remaining_attempts: u32 },
    /// No window configured, or the window has passed.
    Expired,
    /// Inside the nightly blackout.
    NightRestricted,
    /// The guest attempt ceiling has been reached.
    TooManyAttempts,
}

impl GuestOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuestOutcome::Granted)
    }
}

impl fmt::Display for GuestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestOutcome::Granted => write!(f, "granted"),
            GuestOutcome::Denied { remaining_attempts } => {
                write!(f, "denied ({} attempts left)", remaining_attempts)
            }
            GuestOutcome::Expired => write!(f, "expired"),
            GuestOutcome::NightRestricted => write!(f, "night restricted"),
            GuestOutcome::TooManyAttempts => write!(f, "too many attempts"),
        }
    }
}

/// Result of an `owner_override` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideOutcome {
    Granted,
    Denied,
}

/// The caller's answers to the two "are you sure?" prompts of a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confirmation {
    pub first: bool,
    pub second: bool,
}

impl Confirmation {
    pub fn new(first: bool, second: bool) -> Self {
        Self { first, second }
    }

    /// Both prompts answered yes.
    pub fn confirmed() -> Self {
        Self::new(true, true)
    }

    pub fn is_confirmed(&self) -> bool {
        self.first && self.second
    }
}

/// Which credential a reset grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetKind {
    Username,
    Password,
}

impl fmt::Display for ResetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetKind::Username => write!(f, "username"),
            ResetKind::Password => write!(f, "password"),
        }
    }
}

/// Proof that a reset's confirmations (and, for usernames, the password
/// check) passed. Only the controller can mint one, and applying it
/// consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct ResetGrant {
    pub(crate) kind: ResetKind,
}

impl ResetGrant {
    pub fn kind(&self) -> ResetKind {
        self.kind
    }
}

/// Read-only snapshot of the account for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub username: Option<String>,
    pub password_set: bool,
    pub failed_attempts: u32,
    pub locked_until: Option<NaiveDateTime>,
    pub guest_expiration: Option<NaiveDateTime>,
}

/// Guest window details, returned by the override-guarded report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestStatus {
    pub configured: bool,
    pub expiration: Option<NaiveDateTime>,
    pub attempts_used: u32,
    pub attempts_remaining: u32,
    pub requested_time_of_day: Option<String>,
    /// Open window and outside the nightly blackout
    pub active_now: bool,
}

/// Why a candidate password was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordProblem {
    WrongLengthAndNotNumeric,
    WrongLength,
    NotNumeric,
}

impl fmt::Display for PasswordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordProblem::WrongLengthAndNotNumeric => {
                write!(f, "enter a 4 digit numeric password without any letters")
            }
            PasswordProblem::WrongLength => write!(f, "the password must be exactly 4 digits"),
            PasswordProblem::NotNumeric => write!(f, "the password may only contain numbers"),
        }
    }
}

/// Malformed input. Always recoverable: the caller re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid username: use at most {max} letters, numbers and symbols")]
    InvalidUsername { max: usize },

    #[error("invalid password: {0}")]
    InvalidPassword(PasswordProblem),

    #[error("invalid time format: expected 24-hour HH:MM, got '{0}'")]
    InvalidTimeFormat(String),

    #[error("invalid duration: {days} days is outside 1-{max}")]
    InvalidDuration { days: u32, max: u32 },
}

/// Every way a controller operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("account is locked until {until}")]
    Locked { until: NaiveDateTime },

    #[error("no password has been set yet")]
    CredentialsNotSet,

    #[error("{0} reset cancelled")]
    ResetNotConfirmed(ResetKind),

    #[error("incorrect password")]
    PasswordMismatch,

    #[error("owner override denied")]
    OverrideDenied,

    #[error("grant was issued for a {granted} reset, not a {requested} reset")]
    GrantMismatch {
        granted: ResetKind,
        requested: ResetKind,
    },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// A reset value the controller refused. The unspent grant is handed back
/// so the caller can ask again.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct RejectedReset {
    pub grant: ResetGrant,
    pub error: AccessError,
}

impl RejectedReset {
    /// Whether another value may be tried with the returned grant.
    pub fn can_retry(&self) -> bool {
        self.error.is_recoverable()
    }

    pub fn into_grant(self) -> ResetGrant {
        self.grant
    }
}

impl AccessError {
    /// Whether re-prompting the user can resolve this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AccessError::Unexpected(_) | AccessError::GrantMismatch { .. })
    }
}

/// What happened, for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Initialized,
    UsernameSet,
    PasswordSet,
    LoginSucceeded,
    LoginFailed,
    LockedOut,
    LockRefused,
    UsernameReset,
    PasswordReset,
    OverrideGranted,
    OverrideDenied,
    GuestConfigured,
    GuestGranted,
    GuestDenied,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditKind::Initialized => "initialized",
            AuditKind::UsernameSet => "username_set",
            AuditKind::PasswordSet => "password_set",
            AuditKind::LoginSucceeded => "login_succeeded",
            AuditKind::LoginFailed => "login_failed",
            AuditKind::LockedOut => "locked_out",
            AuditKind::LockRefused => "lock_refused",
            AuditKind::UsernameReset => "username_reset",
            AuditKind::PasswordReset => "password_reset",
            AuditKind::OverrideGranted => "override_granted",
            AuditKind::OverrideDenied => "override_denied",
            AuditKind::GuestConfigured => "guest_configured",
            AuditKind::GuestGranted => "guest_granted",
            AuditKind::GuestDenied => "guest_denied",
        };
        write!(f, "{}", s)
    }
}

impl AuditKind {
    /// Parse a kind from a CLI filter string. Accepts a few short aliases.
    pub fn from_str_loose(s: &str) -> Option<AuditKind> {
        match s.to_lowercase().trim() {
            "initialized" | "init" => Some(AuditKind::Initialized),
            "username_set" => Some(AuditKind::UsernameSet),
            "password_set" => Some(AuditKind::PasswordSet),
            "login_succeeded" | "login" | "success" => Some(AuditKind::LoginSucceeded),
            "login_failed" | "failed" | "failure" => Some(AuditKind::LoginFailed),
            "locked_out" | "lockout" | "locked" => Some(AuditKind::LockedOut),
            "lock_refused" => Some(AuditKind::LockRefused),
            "username_reset" => Some(AuditKind::UsernameReset),
            "password_reset" => Some(AuditKind::PasswordReset),
            "override_granted" | "override" => Some(AuditKind::OverrideGranted),
            "override_denied" => Some(AuditKind::OverrideDenied),
            "guest_configured" | "guest_setup" => Some(AuditKind::GuestConfigured),
            "guest_granted" | "guest" => Some(AuditKind::GuestGranted),
            "guest_denied" => Some(AuditKind::GuestDenied),
            _ => None,
        }
    }

    /// Kinds that represent a refused or failed access.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AuditKind::LoginFailed
                | AuditKind::LockedOut
                | AuditKind::LockRefused
                | AuditKind::OverrideDenied
                | AuditKind::GuestDenied
        )
    }
}

/// A structured audit event emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: NaiveDateTime,
    pub kind: AuditKind,
    /// Who the event concerns (account username, or "guest")
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
