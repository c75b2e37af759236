//! Input validation shared by the service layer.
//!
//! Each check returns `ServiceError::InvalidInput` naming the offending
//! field, which the API layer reports as 422.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{ServiceError, ServiceResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PASSWORD_SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[@$!%*?&]").unwrap());

/// Trimmed, non-empty text of at most `max` characters and at least `min`.
pub fn text(field: &str, value: &str, min: usize, max: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(ServiceError::InvalidInput(format!("{field} is required")));
    }
    if len < min || len > max {
        return Err(ServiceError::InvalidInput(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Non-empty text with no explicit bounds beyond a sane upper limit.
pub fn required(field: &str, value: &str) -> ServiceResult<String> {
    text(field, value, 1, 2000)
}

/// Optional free text: blank collapses to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Email, lowercased.
pub fn email(value: &str) -> ServiceResult<String> {
    let normalized = value.trim().to_lowercase();
    if !EMAIL_PATTERN.is_match(&normalized) {
        return Err(ServiceError::InvalidInput("email must be a valid email address".into()));
    }
    Ok(normalized)
}

/// At least 8 characters with a lowercase letter, an uppercase letter,
/// a digit and one of `@$!%*?&`.
pub fn password(value: &str) -> ServiceResult<()> {
    let strong = value.chars().count() >= PASSWORD_MIN_LEN
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && PASSWORD_SPECIAL.is_match(value);
    if !strong {
        return Err(ServiceError::InvalidInput(format!(
            "password must have at least {PASSWORD_MIN_LEN} characters, including \
             upper and lower case letters, a digit and one of @$!%*?&"
        )));
    }
    Ok(())
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn date(field: &str, value: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ServiceError::InvalidInput(format!("{field} must be a valid date (YYYY-MM-DD)")))
}
