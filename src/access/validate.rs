//! Input validation for usernames, passwords and guest setup values.
//!
//! These are pure checks with no state; the controller decides what to do
//! with a rejected value (re-prompt, substitute a default).

use crate::access::types::{PasswordProblem, ValidationError};

pub const MAX_USERNAME_LEN: usize = 20;
pub const PASSWORD_LEN: usize = 4;

/// Symbols allowed in a username besides ASCII letters and digits.
const USERNAME_SYMBOLS: &str = "!@#$%^&*()_+{}|:<>?~[]-";

/// Check a non-empty username candidate.
pub fn check_username(candidate: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || USERNAME_SYMBOLS.contains(c);
    if candidate.chars().count() <= MAX_USERNAME_LEN && candidate.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername {
            max: MAX_USERNAME_LEN,
        })
    }
}

/// Check a password candidate: exactly four ASCII digits.
pub fn check_password(candidate: &str) -> Result<(), ValidationError> {
    let right_length = candidate.chars().count() == PASSWORD_LEN;
    let numeric = !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit());

    let problem = match (right_length, numeric) {
        (true, true) => return Ok(()),
        (false, false) => PasswordProblem::WrongLengthAndNotNumeric,
        (false, true) => PasswordProblem::WrongLength,
        (true, false) => PasswordProblem::NotNumeric,
    };
    Err(ValidationError::InvalidPassword(problem))
}

/// Check a guest window length in days against `[1, max_days]`.
pub fn check_duration(days: u32, max_days: u32) -> Result<(), ValidationError> {
    if (1..=max_days).contains(&days) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDuration {
            days,
            max: max_days,
        })
    }
}

/// Parse a strict 24-hour `HH:MM` time, returning `(hour, minute)`.
///
/// Both fields must be two digits: `9:30` and `09:5` are rejected.
pub fn parse_time_of_day(input: &str) -> Result<(u32, u32), ValidationError> {
    let invalid = || ValidationError::InvalidTimeFormat(input.to_string());

    let (hours, minutes) = input.split_once(':').ok_or_else(invalid)?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }

    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames_accepted() {
        for name in ["alice", "Bob_99", "a!@#$%^&*()", "x[]-{}|:<>?~+", "12345678901234567890"] {
            assert!(check_username(name).is_ok(), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_usernames_rejected() {
        for name in ["with space", "dot.name", "123456789012345678901", "émile", "semi;colon"] {
            assert!(check_username(name).is_err(), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_password_rules() {
        assert!(check_password("0042").is_ok());
        assert_eq!(
            check_password("123"),
            Err(ValidationError::InvalidPassword(PasswordProblem::WrongLength))
        );
        assert_eq!(
            check_password("12a4"),
            Err(ValidationError::InvalidPassword(PasswordProblem::NotNumeric))
        );
        assert_eq!(
            check_password("abcde"),
            Err(ValidationError::InvalidPassword(
                PasswordProblem::WrongLengthAndNotNumeric
            ))
        );
    }

    #[test]
    fn test_password_rejects_unicode_digits() {
        // Arabic-Indic digits are numeric but not ASCII
        assert!(check_password("١٢٣٤").is_err());
    }

    #[test]
    fn test_duration_bounds() {
        assert!(check_duration(0, 31).is_err());
        assert!(check_duration(1, 31).is_ok());
        assert!(check_duration(31, 31).is_ok());
        assert!(check_duration(32, 31).is_err());
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(parse_time_of_day("00:00"), Ok((0, 0)));
        assert_eq!(parse_time_of_day("23:59"), Ok((23, 59)));
        for bad in ["24:00", "12:60", "9:30", "09:5", "0930", "ab:cd", "", "12:30:00"] {
            assert!(parse_time_of_day(bad).is_err(), "{} should be rejected", bad);
        }
    }
}
