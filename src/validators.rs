//! Input validators for account registration
//!
//! Each validator trims its input and returns the value to store. Queries
//! are always parameterized, so the checks only cover shape and length.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_USER_NAME_LENGTH: usize = 1;
const MAX_USER_NAME_LENGTH: usize = 50;
const MIN_PHONE_LENGTH: usize = 3;
const MAX_PHONE_LENGTH: usize = 20;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USER_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();

    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()-]+$").unwrap();
}

/// Validates an email address against a simplified RFC 5322 pattern
/// and the 254-character limit
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates an account user name
/// - 1 to 50 characters
/// - ASCII letters, digits, `.`, `_` and `-` only, so surrounding
///   whitespace is an `InvalidFormat` error
pub fn is_valid_user_name(user_name: &str) -> Result<String, ValidationError> {
    if user_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("userName"));
    }

    if user_name.len() < MIN_USER_NAME_LENGTH {
        return Err(ValidationError::TooShort("userName", MIN_USER_NAME_LENGTH));
    }

    if user_name.len() > MAX_USER_NAME_LENGTH {
        return Err(ValidationError::TooLong("userName", MAX_USER_NAME_LENGTH));
    }

    // Not trimmed: every other operation looks the name up verbatim
    if !USER_NAME_REGEX.is_match(user_name) {
        return Err(ValidationError::InvalidFormat("userName"));
    }

    Ok(user_name.to_string())
}

/// Validates a phone number
/// - 3 to 20 characters
/// - digits, spaces, parentheses and dashes, with an optional leading `+`
pub fn is_valid_phone_number(phone_number: &str) -> Result<String, ValidationError> {
    let trimmed = phone_number.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("phoneNumber"));
    }

    if trimmed.len() < MIN_PHONE_LENGTH {
        return Err(ValidationError::TooShort("phoneNumber", MIN_PHONE_LENGTH));
    }

    if trimmed.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong("phoneNumber", MAX_PHONE_LENGTH));
    }

    if !PHONE_REGEX.is_match(trimmed) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat("phoneNumber"));
    }

    Ok(trimmed.to_string())
}

/// Detects suspicious patterns in email addresses that might indicate phishing
fn has_suspicious_email_patterns(email: &str) -> bool {
    // Extremely long local part (before @)
    if let Some(at_pos) = email.find('@') {
        let local_part = &email[..at_pos];
        if local_part.len() > 64 {
            return true;
        }
    }

    if email.matches('@').count() != 1 {
        return true;
    }

    email.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("a@x.com").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_is_trimmed() {
        assert_eq!(is_valid_email("  a@x.com ").unwrap(), "a@x.com");
    }

    #[test]
    fn test_email_with_spaces_is_rejected() {
        assert!(is_valid_email("user' OR '1'='1@example.com").is_err());
        assert!(is_valid_email("user; DROP TABLE@example.com").is_err());
    }

    #[test]
    fn test_email_with_sql_keyword_substrings_is_accepted() {
        assert!(is_valid_email("broadcast@example.com").is_ok());
        assert!(is_valid_email("andor@union.io").is_ok());
    }

    #[test]
    fn test_valid_user_name() {
        assert!(is_valid_user_name("alice").is_ok());
        assert!(is_valid_user_name("jean.pierre_01").is_ok());
    }

    #[test]
    fn test_invalid_user_name() {
        assert_eq!(is_valid_user_name(""), Err(ValidationError::EmptyField("userName")));
        assert_eq!(
            is_valid_user_name("has space"),
            Err(ValidationError::InvalidFormat("userName"))
        );
        assert_eq!(
            is_valid_user_name(&"a".repeat(51)),
            Err(ValidationError::TooLong("userName", MAX_USER_NAME_LENGTH))
        );
        assert!(is_valid_user_name("bob'; DROP TABLE accounts").is_err());
    }

    #[test]
    fn test_user_name_with_surrounding_whitespace_is_rejected() {
        assert_eq!(
            is_valid_user_name(" alice "),
            Err(ValidationError::InvalidFormat("userName"))
        );
        assert_eq!(
            is_valid_user_name("alice\t"),
            Err(ValidationError::InvalidFormat("userName"))
        );
        assert_eq!(is_valid_user_name("   "), Err(ValidationError::EmptyField("userName")));
    }

    #[test]
    fn test_valid_phone_number() {
        assert!(is_valid_phone_number("555").is_ok());
        assert!(is_valid_phone_number("+82 (10) 1234-5678").is_ok());
    }

    #[test]
    fn test_invalid_phone_number() {
        assert!(is_valid_phone_number("12").is_err());
        assert!(is_valid_phone_number("call me").is_err());
        assert!(is_valid_phone_number("---").is_err());
        assert!(is_valid_phone_number(&"1".repeat(21)).is_err());
    }
}
