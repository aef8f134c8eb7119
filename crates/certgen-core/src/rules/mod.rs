//! Input validation rules shared by the prompts and the generator.

pub mod patterns;

use chrono::NaiveDate;

use crate::error::ValidationError;
use patterns::{DATE_DMY, FILE_NAME_UNSAFE};

/// Lowest accepted qualification group.
pub const MIN_GROUP: u8 = 2;
/// Highest accepted qualification group.
pub const MAX_GROUP: u8 = 5;

/// Accept a full name with at least two words; returns it trimmed.
pub fn validate_full_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.split_whitespace().count() < 2 {
        return Err(ValidationError::IncompleteName);
    }
    Ok(trimmed.to_string())
}

/// Accept any non-blank value; returns it trimmed.
pub fn validate_required(input: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Parse a qualification group typed by the user.
pub fn parse_group(input: &str) -> Result<u8, ValidationError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    validate_group(value)
}

/// Check that a group lies in `MIN_GROUP..=MAX_GROUP`.
pub fn validate_group(value: i64) -> Result<u8, ValidationError> {
    if value < i64::from(MIN_GROUP) || value > i64::from(MAX_GROUP) {
        return Err(ValidationError::GroupOutOfRange(value));
    }
    Ok(value as u8)
}

/// Parse a `dd.mm.yyyy` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidDate(trimmed.to_string());

    let caps = DATE_DMY.captures(trimmed).ok_or_else(invalid)?;
    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let year: i32 = caps[3].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// The next certification must come strictly after the current one.
pub fn validate_date_order(cert: NaiveDate, next: NaiveDate) -> Result<(), ValidationError> {
    if next <= cert {
        return Err(ValidationError::DateOrder {
            cert: cert.format("%d.%m.%Y").to_string(),
            next: next.format("%d.%m.%Y").to_string(),
        });
    }
    Ok(())
}

/// Replace characters that cannot appear in a file name.
pub fn sanitize_file_component(input: &str) -> String {
    FILE_NAME_UNSAFE.replace_all(input, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_name_needs_two_words() {
        assert_eq!(validate_full_name("Иванов"), Err(ValidationError::IncompleteName));
        assert_eq!(validate_full_name("   "), Err(ValidationError::IncompleteName));
        assert_eq!(
            validate_full_name("  Иванов Иван ").unwrap(),
            "Иванов Иван"
        );
    }

    #[test]
    fn test_required_field() {
        assert_eq!(
            validate_required(" \t", "workplace"),
            Err(ValidationError::EmptyField("workplace"))
        );
        assert_eq!(validate_required(" ООО ", "workplace").unwrap(), "ООО");
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(parse_group(" 3 ").unwrap(), 3);
        assert_eq!(parse_group("1"), Err(ValidationError::GroupOutOfRange(1)));
        assert_eq!(parse_group("6"), Err(ValidationError::GroupOutOfRange(6)));
        assert_eq!(
            parse_group("three"),
            Err(ValidationError::NotANumber("three".to_string()))
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("03.12.2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()
        );
        assert_eq!(
            parse_date("3.1.2025").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
        );
        assert!(parse_date("31.02.2024").is_err());
        assert!(parse_date("2024-12-03").is_err());
        assert!(parse_date("03.12.24").is_err());
    }

    #[test]
    fn test_date_order() {
        let a = NaiveDate::from_ymd_opt(2024, 12, 3).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 12, 3).unwrap();

        assert!(validate_date_order(a, b).is_ok());
        assert!(validate_date_order(a, a).is_err());
        assert_eq!(
            validate_date_order(b, a),
            Err(ValidationError::DateOrder {
                cert: "03.12.2025".to_string(),
                next: "03.12.2024".to_string(),
            })
        );
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("Иванов"), "Иванов");
        assert_eq!(sanitize_file_component("a/b\\c:d"), "a_b_c_d");
    }
}
