//! The access controller — credential lifecycle and lockout state machine.
//!
//! One controller owns one account and one guest grant. Every operation reads
//! the clock once, validates everything it needs, and only then commits, so
//! a rejected call never leaves partially updated state behind.
//!
//! Primary verification:
//!
//! ```text
//!   Unlocked --success--> Unlocked            (failed_attempts = 0, lock cleared)
//!   Unlocked --failure--> Unlocked            (while failed_attempts < max)
//!   Unlocked --failure--> Locked(now + lock)  (failed_attempts reaches max)
//!   Locked(until), now <  until  --> refused, password not checked
//!   Locked(until), now >= until  --> treated as Unlocked
//! ```
//!
//! Expiry is evaluated lazily on each call; there is no background timer.

use crate::access::clock::{Clock, SystemClock};
use crate::access::types::*;
use crate::access::validate;
use chrono::{Duration, NaiveDateTime, Timelike};

pub const DEFAULT_USERNAME: &str = "homeowner";
pub const DEFAULT_PASSWORD: &str = "0000";
pub const GUEST_PASSWORD: &str = "2468";

/// Tunables for the state machine. `Default` gives the stock console
/// behaviour: 3 attempts, 1 hour lock, 10 guest attempts, blackout 00:00-06:00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub username_policy: UsernamePolicy,
    pub default_username: String,
    pub default_password: String,
    pub max_attempts: u32,
    pub lock_duration: Duration,
    pub guest_max_attempts: u32,
    pub guest_max_days: u32,
    /// Blackout is `[night_start_hour, night_end_hour)`, wrapping past midnight
    /// when start > end. Equal hours disable it.
    pub night_start_hour: u32,
    pub night_end_hour: u32,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            username_policy: UsernamePolicy::Strict,
            default_username: DEFAULT_USERNAME.to_string(),
            default_password: DEFAULT_PASSWORD.to_string(),
            max_attempts: 3,
            lock_duration: Duration::hours(1),
            guest_max_attempts: 10,
            guest_max_days: 31,
            night_start_hour: 0,
            night_end_hour: 6,
        }
    }
}

impl AccessPolicy {
    /// Whether `hour` falls inside the nightly guest blackout.
    pub fn is_night(&self, hour: u32) -> bool {
        let (start, end) = (self.night_start_hour, self.night_end_hour);
        if start <= end {
            (start..end).contains(&hour)
        } else {
            hour >= start || hour < end
        }
    }
}

/// In-memory access controller for a single account.
pub struct AccessController<C: Clock = SystemClock> {
    policy: AccessPolicy,
    clock: C,
    account: AccountState,
    guest: GuestState,
    /// Audit events not yet handed to the shell
    events: Vec<AuditEvent>,
}

impl AccessController<SystemClock> {
    /// Create a controller on the local wall clock.
    pub fn new(policy: AccessPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> AccessController<C> {
    /// Create a controller reading time from `clock`.
    /// No credentials are set; the first audit event records initialization.
    pub fn with_clock(policy: AccessPolicy, clock: C) -> Self {
        let mut controller = Self {
            policy,
            clock,
            account: AccountState::default(),
            guest: GuestState::default(),
            events: Vec::new(),
        };
        let now = controller.clock.now();
        controller.record(now, AuditKind::Initialized, None);
        tracing::info!("Access controller initialized");
        controller
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn guest(&self) -> &GuestState {
        &self.guest
    }

    /// Hand buffered audit events to the caller, oldest first.
    pub fn drain_events(&mut self) -> Vec<AuditEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Credential setup ──

    /// Set the account username.
    ///
    /// Empty input applies the default username. A non-empty invalid
    /// candidate is rejected under `Strict` and replaced by the default under
    /// `Lenient`.
    pub fn set_username(&mut self, candidate: &str) -> Result<(), ValidationError> {
        let username = self.resolve_username(candidate)?;
        let now = self.clock.now();
        self.account.username = Some(username);
        self.record(now, AuditKind::UsernameSet, None);
        Ok(())
    }

    /// Set the account password. Empty input applies the default password.
    pub fn set_password(&mut self, candidate: &str) -> Result<(), ValidationError> {
        let password = self.resolve_password(candidate)?;
        let now = self.clock.now();
        self.account.password = Some(password);
        self.record(now, AuditKind::PasswordSet, None);
        Ok(())
    }

    fn resolve_username(&self, candidate: &str) -> Result<String, ValidationError> {
        if candidate.is_empty() {
            return Ok(self.policy.default_username.clone());
        }
        match validate::check_username(candidate) {
            Ok(()) => Ok(candidate.to_string()),
            Err(e) => match self.policy.username_policy {
                UsernamePolicy::Strict => Err(e),
                UsernamePolicy::Lenient => {
                    tracing::warn!(
                        "Invalid username replaced with default '{}'",
                        self.policy.default_username
                    );
                    Ok(self.policy.default_username.clone())
                }
            },
        }
    }

    fn resolve_password(&self, candidate: &str) -> Result<String, ValidationError> {
        if candidate.is_empty() {
            return Ok(self.policy.default_password.clone());
        }
        validate::check_password(candidate)?;
        Ok(candidate.to_string())
    }

    // ── Resets ──

    /// Authorize a username reset.
    ///
    /// Checks happen in prompt order: first confirmation, current password,
    /// second confirmation. A wrong password does not count as a failed login,
    /// but the reset is refused outright while a lockout is active.
    pub fn reset_username(
        &mut self,
        confirmation: Confirmation,
        current_password: &str,
    ) -> Result<ResetGrant, AccessError> {
        if !confirmation.first {
            return Err(AccessError::ResetNotConfirmed(ResetKind::Username));
        }
        let now = self.clock.now();
        let stored = self
            .account
            .password
            .as_deref()
            .ok_or(AccessError::CredentialsNotSet)?;
        if let Some(until) = self.account.active_lock(now) {
            return Err(AccessError::Locked { until });
        }
        if current_password != stored {
            tracing::warn!("Username reset rejected: incorrect password");
            return Err(AccessError::PasswordMismatch);
        }
        if !confirmation.second {
            return Err(AccessError::ResetNotConfirmed(ResetKind::Username));
        }
        Ok(ResetGrant {
            kind: ResetKind::Username,
        })
    }

    /// Apply a new username under a grant from `reset_username`.
    ///
    /// A successful apply spends the grant. An invalid value leaves the old
    /// username in place and hands the grant back for another try.
    pub fn apply_username_reset(
        &mut self,
        grant: ResetGrant,
        candidate: &str,
    ) -> Result<(), RejectedReset> {
        let username = match Self::check_grant(&grant, ResetKind::Username)
            .and_then(|()| self.resolve_username(candidate).map_err(AccessError::from))
        {
            Ok(username) => username,
            Err(error) => return Err(RejectedReset { grant, error }),
        };
        let now = self.clock.now();
        self.account.username = Some(username);
        let detail = format!("Username reset initiated by {}", self.account.display_name());
        self.record(now, AuditKind::UsernameReset, Some(detail));
        Ok(())
    }

    /// Authorize a password reset. Unlike the username reset this needs no
    /// password of record, only both confirmations.
    pub fn reset_password(&mut self, confirmation: Confirmation) -> Result<ResetGrant, AccessError> {
        if !confirmation.is_confirmed() {
            return Err(AccessError::ResetNotConfirmed(ResetKind::Password));
        }
        Ok(ResetGrant {
            kind: ResetKind::Password,
        })
    }

    /// Apply a new password under a grant from `reset_password`.
    /// Same spending rules as `apply_username_reset`.
    pub fn apply_password_reset(
        &mut self,
        grant: ResetGrant,
        candidate: &str,
    ) -> Result<(), RejectedReset> {
        let password = match Self::check_grant(&grant, ResetKind::Password)
            .and_then(|()| self.resolve_password(candidate).map_err(AccessError::from))
        {
            Ok(password) => password,
            Err(error) => return Err(RejectedReset { grant, error }),
        };
        let now = self.clock.now();
        self.account.password = Some(password);
        let detail = format!("Password reset initiated by {}", self.account.display_name());
        self.record(now, AuditKind::PasswordReset, Some(detail));
        Ok(())
    }

    fn check_grant(grant: &ResetGrant, requested: ResetKind) -> Result<(), AccessError> {
        if grant.kind == requested {
            Ok(())
        } else {
            Err(AccessError::GrantMismatch {
                granted: grant.kind,
                requested,
            })
        }
    }

    // ── Primary verification ──

    /// Verify the primary password.
    ///
    /// An active lock refuses the attempt before the password is looked at
    /// and without consuming an attempt. The failure that reaches the attempt
    /// ceiling returns `Locked` with the new deadline.
    pub fn verify(&mut self, supplied: &str) -> Result<Outcome, AccessError> {
        let now = self.clock.now();
        let granted = {
            let stored = self
                .account
                .password
                .as_deref()
                .ok_or(AccessError::CredentialsNotSet)?;
            supplied == stored
        };

        if let Some(until) = self.account.active_lock(now) {
            self.record(
                now,
                AuditKind::LockRefused,
                Some(format!("Account is locked until {}", until)),
            );
            return Ok(Outcome::StillLocked { until });
        }

        if granted {
            self.account.failed_attempts = 0;
            self.account.locked_until = None;
            self.record(now, AuditKind::LoginSucceeded, None);
            tracing::info!("Successful login by {}", self.account.display_name());
            return Ok(Outcome::Granted);
        }

        let failed = self.account.failed_attempts.saturating_add(1);
        if failed < self.policy.max_attempts {
            self.account.failed_attempts = failed;
            self.record(
                now,
                AuditKind::LoginFailed,
                Some(format!("Failed login attempt {}", failed)),
            );
            tracing::warn!(
                "Failed login attempt {} by {}",
                failed,
                self.account.display_name()
            );
            return Ok(Outcome::Denied {
                remaining_attempts: self.policy.max_attempts - failed,
            });
        }

        let until = now
            .checked_add_signed(self.policy.lock_duration)
            .ok_or_else(|| AccessError::Unexpected("lock deadline out of range".to_string()))?;
        self.account.failed_attempts = failed;
        self.account.locked_until = Some(until);
        self.record(
            now,
            AuditKind::LoginFailed,
            Some(format!("Failed login attempt {}", failed)),
        );
        self.record(
            now,
            AuditKind::LockedOut,
            Some(format!("System locked until {}", until)),
        );
        tracing::warn!(
            "Multiple failed attempts by {}, locked until {}",
            self.account.display_name(),
            until
        );
        Ok(Outcome::Locked { until })
    }

    // ── Guest access ──

    /// Open (or extend) the guest window for `duration_days` from now.
    ///
    /// A supplied time of day must be a valid `HH:MM`; it is recorded but
    /// does not move the expiration. The guest attempt counter starts over
    /// only when the previous window is no longer open.
    pub fn set_guest_access(
        &mut self,
        duration_days: u32,
        time_of_day: Option<&str>,
    ) -> Result<(), AccessError> {
        validate::check_duration(duration_days, self.policy.guest_max_days)?;
        let requested = match time_of_day {
            Some(raw) => {
                let (hour, minute) = validate::parse_time_of_day(raw)?;
                // TODO: apply the requested time of day to the expiration once
                // product decides whether it means "expires at HH:MM" or "starts at HH:MM".
                Some(format!("{:02}:{:02}", hour, minute))
            }
            None => None,
        };

        let now = self.clock.now();
        let expiration = now
            .checked_add_signed(Duration::days(i64::from(duration_days)))
            .ok_or_else(|| AccessError::Unexpected("guest expiration out of range".to_string()))?;

        if !self.guest.is_open(now) {
            self.guest.attempts = 0;
        }
        self.guest.expiration = Some(expiration);
        self.guest.requested_time_of_day = requested;
        self.record(
            now,
            AuditKind::GuestConfigured,
            Some(format!(
                "Guest access for {} days, expires {}",
                duration_days, expiration
            )),
        );
        tracing::info!("Guest access configured until {}", expiration);
        Ok(())
    }

    /// Verify the guest password.
    ///
    /// Refusals are checked in order: window expired (or never configured),
    /// nightly blackout, attempt ceiling. Only a mismatch against the guest
    /// secret consumes an attempt.
    pub fn verify_guest_access(&mut self, supplied: &str) -> GuestOutcome {
        let now = self.clock.now();

        let outcome = if !self.guest.is_open(now) {
            GuestOutcome::Expired
        } else if self.policy.is_night(now.hour()) {
            GuestOutcome::NightRestricted
        } else if self.guest.attempts >= self.policy.guest_max_attempts {
            GuestOutcome::TooManyAttempts
        } else if supplied == GUEST_PASSWORD {
            GuestOutcome::Granted
        } else {
            self.guest.attempts += 1;
            GuestOutcome::Denied {
                remaining_attempts: self.policy.guest_max_attempts - self.guest.attempts,
            }
        };

        let kind = if outcome.is_granted() {
            AuditKind::GuestGranted
        } else {
            AuditKind::GuestDenied
        };
        let detail = (!outcome.is_granted()).then(|| outcome.to_string());
        self.record_as(now, kind, "guest", detail);
        outcome
    }

    // ── Owner override ──

    /// Check the primary password without consulting or touching the lockout.
    pub fn owner_override(&mut self, supplied: &str) -> Result<OverrideOutcome, AccessError> {
        let now = self.clock.now();
        let stored = self
            .account
            .password
            .as_deref()
            .ok_or(AccessError::CredentialsNotSet)?;

        if supplied == stored {
            self.record(now, AuditKind::OverrideGranted, None);
            tracing::info!("Owner override granted");
            Ok(OverrideOutcome::Granted)
        } else {
            self.record(now, AuditKind::OverrideDenied, None);
            tracing::warn!("Owner override denied");
            Ok(OverrideOutcome::Denied)
        }
    }

    /// Report on the guest window, guarded by the owner override.
    pub fn guest_status_report(&mut self, owner_password: &str) -> Result<GuestStatus, AccessError> {
        if self.owner_override(owner_password)? == OverrideOutcome::Denied {
            return Err(AccessError::OverrideDenied);
        }
        let now = self.clock.now();
        let open = self.guest.is_open(now);
        Ok(GuestStatus {
            configured: self.guest.expiration.is_some(),
            expiration: self.guest.expiration,
            attempts_used: self.guest.attempts,
            attempts_remaining: self
                .policy
                .guest_max_attempts
                .saturating_sub(self.guest.attempts),
            requested_time_of_day: self.guest.requested_time_of_day.clone(),
            active_now: open && !self.policy.is_night(now.hour()),
        })
    }

    // ── Status ──

    /// Snapshot of the account with the lock evaluated against now.
    pub fn status(&self) -> AccountStatus {
        let now = self.clock.now();
        AccountStatus {
            username: self.account.username.clone(),
            password_set: self.account.password.is_some(),
            failed_attempts: self.account.failed_attempts,
            locked_until: self.account.active_lock(now),
            guest_expiration: self.guest.expiration,
        }
    }

    fn record(&mut self, timestamp: NaiveDateTime, kind: AuditKind, detail: Option<String>) {
        let subject = self.account.display_name().to_string();
        self.record_as(timestamp, kind, &subject, detail);
    }

    fn record_as(
        &mut self,
        timestamp: NaiveDateTime,
        kind: AuditKind,
        subject: &str,
        detail: Option<String>,
    ) {
        self.events.push(AuditEvent {
            timestamp,
            kind,
            subject: subject.to_string(),
            detail,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::clock::FixedClock;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn controller_at(hour: u32) -> (AccessController<FixedClock>, FixedClock) {
        let clock = FixedClock::new(at(hour, 0));
        let mut controller = AccessController::with_clock(AccessPolicy::default(), clock.clone());
        controller.set_username("alice").unwrap();
        controller.set_password("4242").unwrap();
        (controller, clock)
    }

    #[test]
    fn test_night_window() {
        let policy = AccessPolicy::default();
        assert!(policy.is_night(0));
        assert!(policy.is_night(5));
        assert!(!policy.is_night(6));
        assert!(!policy.is_night(23));

        let wrapping = AccessPolicy {
            night_start_hour: 22,
            night_end_hour: 6,
            ..AccessPolicy::default()
        };
        assert!(wrapping.is_night(23));
        assert!(wrapping.is_night(2));
        assert!(!wrapping.is_night(12));

        let disabled = AccessPolicy {
            night_start_hour: 4,
            night_end_hour: 4,
            ..AccessPolicy::default()
        };
        assert!((0..24).all(|h| !disabled.is_night(h)));
    }

    #[test]
    fn test_initialization_event() {
        let clock = FixedClock::new(at(12, 0));
        let mut controller = AccessController::with_clock(AccessPolicy::default(), clock);
        let events = controller.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AuditKind::Initialized);
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn test_verify_before_setup() {
        let clock = FixedClock::new(at(12, 0));
        let mut controller = AccessController::with_clock(AccessPolicy::default(), clock);
        assert_eq!(controller.verify("1234"), Err(AccessError::CredentialsNotSet));
        assert_eq!(controller.account().failed_attempts, 0);
    }

    #[test]
    fn test_stale_lock_relocks_on_next_failure() {
        let (mut controller, clock) = controller_at(12);
        for _ in 0..3 {
            controller.verify("0000").unwrap();
        }
        clock.advance(Duration::hours(1));

        // Counter was never reset, so a single failure locks again
        let outcome = controller.verify("0000").unwrap();
        assert_eq!(
            outcome,
            Outcome::Locked {
                until: at(14, 0)
            }
        );
    }

    #[test]
    fn test_guest_reconfigure_keeps_attempts_while_open() {
        let (mut controller, clock) = controller_at(12);
        controller.set_guest_access(1, None).unwrap();
        controller.verify_guest_access("0000");
        controller.set_guest_access(3, None).unwrap();
        assert_eq!(controller.guest().attempts, 1);

        clock.advance(Duration::days(4));
        controller.set_guest_access(2, None).unwrap();
        assert_eq!(controller.guest().attempts, 0);
    }

    #[test]
    fn test_grant_kind_mismatch() {
        let (mut controller, _clock) = controller_at(12);
        let grant = controller.reset_password(Confirmation::confirmed()).unwrap();
        let rejected = controller
            .apply_username_reset(grant, "mallory")
            .unwrap_err();
        assert_eq!(
            rejected.error,
            AccessError::GrantMismatch {
                granted: ResetKind::Password,
                requested: ResetKind::Username,
            }
        );
        assert!(!rejected.can_retry());
        assert_eq!(controller.account().username.as_deref(), Some("alice"));

        // The unspent grant still works for what it was issued for
        controller
            .apply_password_reset(rejected.into_grant(), "8080")
            .unwrap();
        assert_eq!(controller.account().password.as_deref(), Some("8080"));
    }

    #[test]
    fn test_lock_deadline_overflow_is_unexpected() {
        let clock = FixedClock::new(NaiveDateTime::MAX - Duration::minutes(1));
        let mut controller = AccessController::with_clock(AccessPolicy::default(), clock);
        controller.set_password("4242").unwrap();
        controller.verify("0000").unwrap();
        controller.verify("0000").unwrap();

        let before = controller.account().clone();
        let result = controller.verify("0000");
        assert!(matches!(result, Err(AccessError::Unexpected(_))));
        assert_eq!(controller.account(), &before);
    }
}
