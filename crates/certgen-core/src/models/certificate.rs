//! Certificate data models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format::{format_date, format_group, title_case};
use crate::rules;

/// Raw certificate data as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInput {
    /// Full name, at least two words.
    pub full_name: String,

    /// Workplace (organisation).
    pub workplace: String,

    /// Job position.
    pub position: String,

    /// Electrical safety qualification group (2-5).
    pub qualification_group: u8,

    /// Date the certificate was obtained.
    pub cert_date: NaiveDate,

    /// Date of the next certification.
    pub next_cert_date: NaiveDate,
}

impl CertificateInput {
    /// Re-check every prompt-time rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        rules::validate_full_name(&self.full_name)?;
        rules::validate_required(&self.workplace, "workplace")?;
        rules::validate_required(&self.position, "position")?;
        rules::validate_group(i64::from(self.qualification_group))?;
        rules::validate_date_order(self.cert_date, self.next_cert_date)?;
        Ok(())
    }

    /// First whitespace-separated token of the name, as typed.
    pub fn first_name_token(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or_default()
    }

    /// Values shown in the document and stored in the record.
    pub fn formatted(&self) -> FormattedFields {
        FormattedFields {
            full_name: title_case(&self.full_name),
            workplace: self.workplace.trim().to_string(),
            position: self.position.trim().to_string(),
            group: format_group(self.qualification_group),
            group_number: self.qualification_group,
            cert_date: format_date(self.cert_date),
            next_date: format_date(self.next_cert_date),
        }
    }
}

/// Display strings derived from a [`CertificateInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedFields {
    pub full_name: String,
    pub workplace: String,
    pub position: String,
    /// e.g. `4 гр. 1000 В и выше`.
    pub group: String,
    pub group_number: u8,
    /// e.g. `«3» декабря 2024`.
    pub cert_date: String,
    pub next_date: String,
}

/// A row to be inserted into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCertificate {
    pub protocol_number: String,
    pub full_name: String,
    pub workplace: String,
    pub position: String,
    pub qualification_group: u8,
    pub cert_date: NaiveDate,
    pub next_cert_date: NaiveDate,
}

impl NewCertificate {
    /// Build the row for a generated document.
    pub fn from_input(
        protocol_number: impl Into<String>,
        input: &CertificateInput,
        fields: &FormattedFields,
    ) -> Self {
        Self {
            protocol_number: protocol_number.into(),
            full_name: fields.full_name.clone(),
            workplace: fields.workplace.clone(),
            position: fields.position.clone(),
            qualification_group: input.qualification_group,
            cert_date: input.cert_date,
            next_cert_date: input.next_cert_date,
        }
    }
}

/// A stored certificate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Auto-incremented row id.
    pub id: i64,
    pub protocol_number: String,
    pub full_name: String,
    pub workplace: String,
    pub position: String,
    pub qualification_group: u8,
    pub cert_date: NaiveDate,
    pub next_cert_date: NaiveDate,
    /// Set by the database on insert.
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> CertificateInput {
        CertificateInput {
            full_name: "  иванов иван иванович ".to_string(),
            workplace: " ООО Ромашка ".to_string(),
            position: "электромонтёр".to_string(),
            qualification_group: 4,
            cert_date: NaiveDate::from_ymd_opt(2024, 12, 3).unwrap(),
            next_cert_date: NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(),
        }
    }

    #[test]
    fn test_formatted_fields() {
        let fields = sample().formatted();

        assert_eq!(fields.full_name, "Иванов Иван Иванович");
        assert_eq!(fields.workplace, "ООО Ромашка");
        assert_eq!(fields.group, "4 гр. 1000 В и выше");
        assert_eq!(fields.cert_date, "«3» декабря 2024");
        assert_eq!(fields.next_date, "«3» декабря 2025");
    }

    #[test]
    fn test_first_name_token_is_raw() {
        assert_eq!(sample().first_name_token(), "иванов");
    }

    #[test]
    fn test_validate_rejects_reversed_dates() {
        let mut input = sample();
        input.next_cert_date = input.cert_date;

        assert!(matches!(
            input.validate(),
            Err(ValidationError::DateOrder { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_group() {
        let mut input = sample();
        input.qualification_group = 6;

        assert_eq!(input.validate(), Err(ValidationError::GroupOutOfRange(6)));
    }
}
