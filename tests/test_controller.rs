//! Integration tests for the access controller state machine.
//! All time-dependent behaviour runs on a `FixedClock`.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use homeguard::access::{
    AccessController, AccessError, AccessPolicy, AuditKind, Confirmation, FixedClock,
    GuestOutcome, Outcome, OverrideOutcome, PasswordProblem, ResetKind, UsernamePolicy,
    ValidationError,
};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Helper: a controller at 2024-06-10 12:00 with password "4242".
fn setup() -> (AccessController<FixedClock>, FixedClock) {
    setup_with(AccessPolicy::default())
}

fn setup_with(policy: AccessPolicy) -> (AccessController<FixedClock>, FixedClock) {
    let clock = FixedClock::new(at(10, 12, 0));
    let mut controller = AccessController::with_clock(policy, clock.clone());
    controller.set_username("alice").unwrap();
    controller.set_password("4242").unwrap();
    controller.drain_events();
    (controller, clock)
}

// ── Credential setup ──

#[test]
fn test_every_valid_password_verifies() {
    let (mut controller, _clock) = setup();
    for pin in ["0000", "0042", "1234", "9999", "4242"] {
        controller.set_password(pin).unwrap();
        assert_eq!(controller.verify(pin).unwrap(), Outcome::Granted, "{}", pin);
    }
}

#[test]
fn test_invalid_passwords_leave_old_password() {
    let (mut controller, _clock) = setup();
    for bad in ["123", "12345", "12a4", "abcd", " 123", "12 4", "four"] {
        let err = controller.set_password(bad).unwrap_err();
        assert!(
            matches!(err, ValidationError::InvalidPassword(_)),
            "{} gave {:?}",
            bad,
            err
        );
        assert_eq!(controller.account().password.as_deref(), Some("4242"));
    }
}

#[test]
fn test_empty_password_applies_default() {
    let (mut controller, _clock) = setup();
    controller.set_password("").unwrap();
    assert_eq!(controller.account().password.as_deref(), Some("0000"));
}

#[test]
fn test_password_problem_reported() {
    let (mut controller, _clock) = setup();
    assert_eq!(
        controller.set_password("12345"),
        Err(ValidationError::InvalidPassword(PasswordProblem::WrongLength))
    );
}

#[test]
fn test_strict_username_policy_rejects() {
    let (mut controller, _clock) = setup();
    assert!(matches!(
        controller.set_username("no spaces allowed"),
        Err(ValidationError::InvalidUsername { max: 20 })
    ));
    assert!(controller.set_username("a_very_long_username_indeed").is_err());
    assert_eq!(controller.account().username.as_deref(), Some("alice"));
}

#[test]
fn test_lenient_username_policy_substitutes_default() {
    let (mut controller, _clock) = setup_with(AccessPolicy {
        username_policy: UsernamePolicy::Lenient,
        ..AccessPolicy::default()
    });
    controller.set_username("no spaces allowed").unwrap();
    assert_eq!(controller.account().username.as_deref(), Some("homeowner"));

    controller.set_username("bob!").unwrap();
    assert_eq!(controller.account().username.as_deref(), Some("bob!"));
}

#[test]
fn test_empty_username_applies_default_under_both_policies() {
    for policy in [UsernamePolicy::Strict, UsernamePolicy::Lenient] {
        let (mut controller, _clock) = setup_with(AccessPolicy {
            username_policy: policy,
            ..AccessPolicy::default()
        });
        controller.set_username("").unwrap();
        assert_eq!(controller.account().username.as_deref(), Some("homeowner"));
    }
}

// ── Lockout state machine ──

#[test]
fn test_three_failures_lock_for_an_hour() {
    let (mut controller, _clock) = setup();
    assert_eq!(
        controller.verify("1111").unwrap(),
        Outcome::Denied {
            remaining_attempts: 2
        }
    );
    assert_eq!(
        controller.verify("2222").unwrap(),
        Outcome::Denied {
            remaining_attempts: 1
        }
    );
    assert_eq!(
        controller.verify("3333").unwrap(),
        Outcome::Locked {
            until: at(10, 13, 0)
        }
    );
    assert_eq!(controller.account().failed_attempts, 3);

    // A fourth attempt is refused without counting
    assert_eq!(
        controller.verify("4444").unwrap(),
        Outcome::StillLocked {
            until: at(10, 13, 0)
        }
    );
    assert_eq!(controller.account().failed_attempts, 3);
}

#[test]
fn test_lock_ignores_correct_password_until_expiry() {
    let (mut controller, clock) = setup();
    for _ in 0..3 {
        controller.verify("0000").unwrap();
    }

    // Lock does not check the password
    clock.advance(Duration::minutes(59));
    let outcome = controller.verify("4242").unwrap();
    assert!(matches!(outcome, Outcome::StillLocked { .. }));

    // At the deadline the lock is stale
    clock.advance(Duration::minutes(1));
    assert_eq!(controller.verify("4242").unwrap(), Outcome::Granted);
    assert_eq!(controller.account().failed_attempts, 0);
    assert_eq!(controller.account().locked_until, None);
}

#[test]
fn test_success_resets_failure_count() {
    let (mut controller, _clock) = setup();
    controller.verify("1111").unwrap();
    controller.verify("2222").unwrap();
    assert_eq!(controller.verify("4242").unwrap(), Outcome::Granted);
    assert_eq!(
        controller.verify("1111").unwrap(),
        Outcome::Denied {
            remaining_attempts: 2
        }
    );
}

#[test]
fn test_custom_lockout_policy() {
    let (mut controller, _clock) = setup_with(AccessPolicy {
        max_attempts: 1,
        lock_duration: Duration::minutes(5),
        ..AccessPolicy::default()
    });
    assert_eq!(
        controller.verify("0000").unwrap(),
        Outcome::Locked {
            until: at(10, 12, 5)
        }
    );
}

#[test]
fn test_status_evaluates_lock_lazily() {
    let (mut controller, clock) = setup();
    for _ in 0..3 {
        controller.verify("0000").unwrap();
    }
    assert_eq!(controller.status().locked_until, Some(at(10, 13, 0)));

    clock.advance(Duration::hours(2));
    let status = controller.status();
    assert_eq!(status.locked_until, None);
    assert_eq!(status.failed_attempts, 3);
}

// ── Owner override ──

#[test]
fn test_override_bypasses_lock() {
    let (mut controller, _clock) = setup();
    for _ in 0..3 {
        controller.verify("0000").unwrap();
    }
    let before = controller.account().clone();

    assert_eq!(
        controller.owner_override("4242").unwrap(),
        OverrideOutcome::Granted
    );
    assert_eq!(
        controller.owner_override("0000").unwrap(),
        OverrideOutcome::Denied
    );
    // Neither outcome touches the lockout
    assert_eq!(controller.account(), &before);
}

#[test]
fn test_override_before_setup() {
    let clock = FixedClock::new(at(10, 12, 0));
    let mut controller = AccessController::with_clock(AccessPolicy::default(), clock);
    assert_eq!(
        controller.owner_override("0000"),
        Err(AccessError::CredentialsNotSet)
    );
}

// ── Resets ──

#[test]
fn test_username_reset_requires_everything() {
    let (mut controller, _clock) = setup();

    assert_eq!(
        controller.reset_username(Confirmation::new(false, true), "4242"),
        Err(AccessError::ResetNotConfirmed(ResetKind::Username))
    );
    assert_eq!(
        controller.reset_username(Confirmation::confirmed(), "1111"),
        Err(AccessError::PasswordMismatch)
    );
    assert_eq!(
        controller.reset_username(Confirmation::new(true, false), "4242"),
        Err(AccessError::ResetNotConfirmed(ResetKind::Username))
    );
    // Failed reset checks never count as login failures
    assert_eq!(controller.account().failed_attempts, 0);

    let grant = controller
        .reset_username(Confirmation::confirmed(), "4242")
        .unwrap();
    let rejected = controller
        .apply_username_reset(grant, "bad name")
        .unwrap_err();
    assert!(rejected.can_retry());
    assert_eq!(controller.account().username.as_deref(), Some("alice"));

    controller
        .apply_username_reset(rejected.into_grant(), "bob")
        .unwrap();
    assert_eq!(controller.account().username.as_deref(), Some("bob"));
}

#[test]
fn test_username_reset_grant_is_spent_once_applied() {
    let (mut controller, clock) = setup();
    let grant = controller
        .reset_username(Confirmation::confirmed(), "4242")
        .unwrap();
    controller.apply_username_reset(grant, "bob").unwrap();

    // Password changes and the account locks; a further username change
    // needs a fresh grant, which the lock refuses.
    controller.set_password("9999").unwrap();
    for _ in 0..3 {
        controller.verify("0000").unwrap();
    }
    clock.advance(Duration::minutes(5));
    assert_eq!(
        controller.reset_username(Confirmation::confirmed(), "9999"),
        Err(AccessError::Locked {
            until: at(10, 13, 0)
        })
    );
    assert_eq!(controller.account().username.as_deref(), Some("bob"));
}

#[test]
fn test_username_reset_refused_while_locked() {
    let (mut controller, _clock) = setup();
    for _ in 0..3 {
        controller.verify("0000").unwrap();
    }
    assert_eq!(
        controller.reset_username(Confirmation::confirmed(), "4242"),
        Err(AccessError::Locked {
            until: at(10, 13, 0)
        })
    );
}

#[test]
fn test_password_reset_needs_no_password() {
    let (mut controller, _clock) = setup();
    assert_eq!(
        controller.reset_password(Confirmation::new(true, false)),
        Err(AccessError::ResetNotConfirmed(ResetKind::Password))
    );

    let grant = controller.reset_password(Confirmation::confirmed()).unwrap();
    let rejected = controller.apply_password_reset(grant, "12").unwrap_err();
    assert!(matches!(rejected.error, AccessError::Validation(_)));
    assert_eq!(controller.account().password.as_deref(), Some("4242"));

    controller
        .apply_password_reset(rejected.into_grant(), "8080")
        .unwrap();
    assert_eq!(controller.verify("8080").unwrap(), Outcome::Granted);
}

// ── Guest access ──

#[test]
fn test_guest_duration_bounds() {
    let (mut controller, _clock) = setup();
    for days in [0, 32] {
        assert!(matches!(
            controller.set_guest_access(days, None),
            Err(AccessError::Validation(ValidationError::InvalidDuration { .. }))
        ));
    }
    assert_eq!(controller.guest().expiration, None);

    controller.set_guest_access(15, None).unwrap();
    assert_eq!(controller.guest().expiration, Some(at(25, 12, 0)));
}

#[test]
fn test_guest_time_of_day_validated_not_applied() {
    let (mut controller, _clock) = setup();
    assert_eq!(
        controller.set_guest_access(2, Some("25:00")),
        Err(AccessError::Validation(ValidationError::InvalidTimeFormat(
            "25:00".to_string()
        )))
    );
    assert_eq!(controller.guest().expiration, None);

    controller.set_guest_access(2, Some("18:30")).unwrap();
    assert_eq!(controller.guest().expiration, Some(at(12, 12, 0)));
    assert_eq!(
        controller.guest().requested_time_of_day.as_deref(),
        Some("18:30")
    );
}

#[test]
fn test_guest_never_configured_is_expired() {
    let (mut controller, _clock) = setup();
    assert_eq!(controller.verify_guest_access("2468"), GuestOutcome::Expired);
}

#[test]
fn test_guest_window_expires() {
    let (mut controller, clock) = setup();
    controller.set_guest_access(1, None).unwrap();
    assert_eq!(controller.verify_guest_access("2468"), GuestOutcome::Granted);

    // Still inside at the exact expiration instant
    clock.advance(Duration::days(1));
    assert_eq!(controller.verify_guest_access("2468"), GuestOutcome::Granted);

    clock.advance(Duration::minutes(1));
    assert_eq!(controller.verify_guest_access("2468"), GuestOutcome::Expired);
}

#[test]
fn test_guest_night_restriction() {
    let (mut controller, clock) = setup();
    controller.set_guest_access(5, None).unwrap();

    clock.set(at(11, 3, 0));
    assert_eq!(
        controller.verify_guest_access("2468"),
        GuestOutcome::NightRestricted
    );
    assert_eq!(
        controller.verify_guest_access("0000"),
        GuestOutcome::NightRestricted
    );
    assert_eq!(controller.guest().attempts, 0);

    clock.set(at(11, 6, 0));
    assert_eq!(controller.verify_guest_access("2468"), GuestOutcome::Granted);
}

#[test]
fn test_guest_attempt_ceiling() {
    let (mut controller, _clock) = setup();
    controller.set_guest_access(3, None).unwrap();

    for i in 1..=10 {
        assert_eq!(
            controller.verify_guest_access("0000"),
            GuestOutcome::Denied {
                remaining_attempts: 10 - i
            }
        );
    }
    // Even the right secret is refused now
    assert_eq!(
        controller.verify_guest_access("2468"),
        GuestOutcome::TooManyAttempts
    );
    assert_eq!(controller.guest().attempts, 10);
}

#[test]
fn test_guest_counter_independent_of_primary() {
    let (mut controller, _clock) = setup();
    controller.set_guest_access(3, None).unwrap();
    controller.verify_guest_access("0000");
    controller.verify("0000").unwrap();
    assert_eq!(controller.guest().attempts, 1);
    assert_eq!(controller.account().failed_attempts, 1);
}

#[test]
fn test_guest_status_report_guarded() {
    let (mut controller, _clock) = setup();
    assert_eq!(
        controller.guest_status_report("1111"),
        Err(AccessError::OverrideDenied)
    );

    controller.set_guest_access(2, Some("09:00")).unwrap();
    controller.verify_guest_access("0000");
    let report = controller.guest_status_report("4242").unwrap();
    assert!(report.configured);
    assert_eq!(report.expiration, Some(at(12, 12, 0)));
    assert_eq!(report.attempts_used, 1);
    assert_eq!(report.attempts_remaining, 9);
    assert_eq!(report.requested_time_of_day.as_deref(), Some("09:00"));
    assert!(report.active_now);
}

// ── Scenario ──

#[test]
fn test_lockout_scenario() {
    let (mut controller, _clock) = setup();

    assert!(matches!(controller.verify("1111").unwrap(), Outcome::Denied { .. }));
    assert!(matches!(controller.verify("2222").unwrap(), Outcome::Denied { .. }));
    let locked = controller.verify("3333").unwrap();
    assert!(matches!(locked, Outcome::Locked { .. }));

    let until = locked.locked_until().unwrap();
    assert_eq!(
        controller.verify("5555").unwrap(),
        Outcome::StillLocked { until }
    );
    assert_eq!(
        controller.verify("4242").unwrap(),
        Outcome::StillLocked { until }
    );
    assert_eq!(
        controller.owner_override("4242").unwrap(),
        OverrideOutcome::Granted
    );
}

// ── Audit events ──

#[test]
fn test_audit_events_emitted() {
    let (mut controller, _clock) = setup();
    controller.verify("1111").unwrap();
    controller.verify("1111").unwrap();
    controller.verify("1111").unwrap();
    controller.verify("4242").unwrap();
    controller.owner_override("4242").unwrap();

    let events = controller.drain_events();
    let kinds: Vec<AuditKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AuditKind::LoginFailed,
            AuditKind::LoginFailed,
            AuditKind::LoginFailed,
            AuditKind::LockedOut,
            AuditKind::LockRefused,
            AuditKind::OverrideGranted,
        ]
    );
    assert!(events.iter().all(|e| e.subject == "alice"));
    assert_eq!(events[1].detail.as_deref(), Some("Failed login attempt 2"));
}

#[test]
fn test_guest_events_use_guest_subject() {
    let (mut controller, _clock) = setup();
    controller.set_guest_access(1, None).unwrap();
    controller.verify_guest_access("2468");

    let events = controller.drain_events();
    assert_eq!(events.last().unwrap().kind, AuditKind::GuestGranted);
    assert_eq!(events.last().unwrap().subject, "guest");
}

#[test]
fn test_rejected_operations_emit_nothing() {
    let (mut controller, _clock) = setup();
    let _ = controller.set_password("abc");
    let _ = controller.set_guest_access(0, None);
    let _ = controller.reset_password(Confirmation::default());
    assert!(controller.drain_events().is_empty());
}
