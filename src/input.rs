//! Structural checks and normalization of facade arguments
//!
//! Nothing here touches the network. Every failure is an
//! [`ApiError::Validation`].

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::error::{ApiError, Result};

/// Format Panther accepts for timestamp arguments.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}$")
        .expect("static regex should not panic")
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w\-\.]+@([\w-]+\.)+[\w-]{2,4}$").expect("static regex should not panic")
});

// Unquoted identifier rules
static SNOWFLAKE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][\w\$\.]*$").expect("static regex should not panic")
});

/// Whether `value` looks like an email address rather than an ID.
pub fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Require a valid email address.
pub fn validate_email(value: &str) -> Result<&str> {
    if is_email(value) {
        Ok(value)
    } else {
        Err(ApiError::validation(format!("Invalid email: {value}")).into())
    }
}

/// Require an unquoted Snowflake identifier, such as a datalake database name.
pub fn validate_identifier(value: &str) -> Result<&str> {
    if SNOWFLAKE_IDENTIFIER.is_match(value) {
        Ok(value)
    } else {
        Err(ApiError::validation(format!("Invalid database name: {value}")).into())
    }
}

/// ID formats. Some Panther entities are addressed as bare hex, others need dashes.
pub mod ids {
    use uuid::Uuid;

    use super::UUID_PATTERN;
    use crate::error::{ApiError, Result};

    fn parse(value: &str) -> Result<Uuid> {
        if !UUID_PATTERN.is_match(value) {
            return Err(ApiError::validation(format!("Invalid ID: {value}")).into());
        }
        Uuid::try_parse(&value.replace('-', ""))
            .map_err(|e| ApiError::validation(format!("Invalid ID {value}: {e}")).into())
    }

    /// 32 hex digits, no dashes.
    pub fn to_hex(value: &str) -> Result<String> {
        Ok(parse(value)?.simple().to_string())
    }

    /// Dashed 8-4-4-4-12 form.
    pub fn to_uuid(value: &str) -> Result<String> {
        Ok(parse(value)?.hyphenated().to_string())
    }
}

/// A point in time as a caller may express it.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeInput {
    /// Unix seconds, UTC
    Epoch(i64),
    /// Already formatted as `YYYY-MM-DDTHH:MM:SSZ`
    Iso(String),
    /// An aware date-time, converted to UTC
    At(DateTime<Utc>),
    /// A naive date-time, taken as UTC
    Naive(NaiveDateTime),
}

impl From<i64> for TimeInput {
    fn from(secs: i64) -> Self {
        TimeInput::Epoch(secs)
    }
}

impl From<&str> for TimeInput {
    fn from(s: &str) -> Self {
        TimeInput::Iso(s.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(s: String) -> Self {
        TimeInput::Iso(s)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeInput {
    fn from(at: DateTime<Tz>) -> Self {
        TimeInput::At(at.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(at: NaiveDateTime) -> Self {
        TimeInput::Naive(at)
    }
}

/// Render a timestamp argument the way Panther expects it.
pub fn validate_timestamp(input: impl Into<TimeInput>) -> Result<String> {
    match input.into() {
        TimeInput::Epoch(secs) if secs <= 0 => Err(ApiError::validation(
            "Invalid timestamp - UNIX timestamps must be greater than zero.",
        )
        .into()),
        TimeInput::Epoch(secs) => DateTime::from_timestamp(secs, 0)
            .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
            .ok_or_else(|| ApiError::validation(format!("Timestamp {secs} is out of range")).into()),
        TimeInput::Iso(s) => match NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT) {
            // strict: reject anything chrono would accept loosely
            Ok(at) if at.format(TIMESTAMP_FORMAT).to_string() == s => Ok(s),
            _ => Err(ApiError::validation(format!(
                "Invalid timestamp '{s}' - expected the format YYYY-MM-DDTHH:MM:SSZ"
            ))
            .into()),
        },
        TimeInput::At(at) => Ok(at.format(TIMESTAMP_FORMAT).to_string()),
        TimeInput::Naive(at) => Ok(at.and_utc().format(TIMESTAMP_FORMAT).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    #[test]
    fn test_id_forms() {
        let dashed = "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d";
        let hex = "0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d";
        assert_eq!(ids::to_hex(dashed).unwrap(), hex);
        assert_eq!(ids::to_hex(hex).unwrap(), hex);
        assert_eq!(ids::to_uuid(hex).unwrap(), dashed);
        assert_eq!(ids::to_uuid(dashed).unwrap(), dashed);
    }

    #[test]
    fn test_invalid_ids() {
        for bad in ["", "not-a-uuid", "0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5", "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5dz"] {
            assert!(ids::to_hex(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_email_detection() {
        assert!(is_email("panther.user@example.com"));
        assert!(is_email("first-last@mail.acme.io"));
        assert!(!is_email("PantherUser"));
        assert!(!is_email("0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d"));
        assert!(validate_email("nobody@").is_err());
    }

    #[test]
    fn test_identifiers() {
        assert!(validate_identifier("panther_logs.public").is_ok());
        assert!(validate_identifier("_hidden$1").is_ok());
        assert!(validate_identifier("1starts_with_digit").is_err());
        assert!(validate_identifier("has space").is_err());
    }

    #[test]
    fn test_timestamp_inputs() {
        assert_eq!(validate_timestamp(1702314671_i64).unwrap(), "2023-12-11T17:11:11Z");
        assert_eq!(validate_timestamp("2023-12-11T17:11:11Z").unwrap(), "2023-12-11T17:11:11Z");

        let naive = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(validate_timestamp(naive).unwrap(), "2024-02-29T23:59:00Z");

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let aware = offset.from_local_datetime(&naive).single().unwrap();
        assert_eq!(validate_timestamp(aware).unwrap(), "2024-02-29T21:59:00Z");
    }

    #[test]
    fn test_invalid_timestamps() {
        assert!(validate_timestamp(0_i64).is_err());
        assert!(validate_timestamp(-5_i64).is_err());
        for bad in ["2023-12-11", "2023-12-11T17:11:11", "2023-12-11T17:11:11.123Z", "yesterday"] {
            assert!(validate_timestamp(bad).is_err(), "{bad}");
        }
    }
}
