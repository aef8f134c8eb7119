//! Year-scoped sequential protocol numbers (`PR-2024-0001`).

use tracing::debug;

use crate::error::StoreError;
use crate::store::CertificateStore;

/// Default leading segment of protocol numbers.
pub const DEFAULT_PREFIX: &str = "PR";

/// Next protocol number for `year` given how many already exist that year.
pub fn next_protocol_number(year: i32, existing_count: u64) -> String {
    ProtocolNumbering::default().format(year, existing_count)
}

/// Protocol number formatter bound to a prefix.
///
/// Counting and inserting are separate statements, so two processes
/// generating at once can compute the same number; the store's UNIQUE
/// constraint rejects the second insert.
#[derive(Debug, Clone)]
pub struct ProtocolNumbering {
    prefix: String,
}

impl ProtocolNumbering {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix shared by every protocol number of `year`, e.g. `PR-2024-`.
    pub fn year_prefix(&self, year: i32) -> String {
        format!("{}-{}-", self.prefix, year)
    }

    /// Format the number following `existing_count` records.
    pub fn format(&self, year: i32, existing_count: u64) -> String {
        format!("{}{:04}", self.year_prefix(year), existing_count + 1)
    }

    /// Count this year's records in `store` and derive the next number.
    pub fn next<S: CertificateStore + ?Sized>(
        &self,
        store: &S,
        year: i32,
    ) -> Result<String, StoreError> {
        let prefix = self.year_prefix(year);
        let count = store.count_with_prefix(&prefix)?;
        let number = self.format(year, count);
        debug!("{} existing records with prefix {}, next is {}", count, prefix, number);
        Ok(number)
    }
}

impl Default for ProtocolNumbering {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::certificate::NewCertificate;
    use crate::store::SqliteStore;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(protocol: &str) -> NewCertificate {
        NewCertificate {
            protocol_number: protocol.to_string(),
            full_name: "Иванов Иван".to_string(),
            workplace: "ООО".to_string(),
            position: "инженер".to_string(),
            qualification_group: 3,
            cert_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            next_cert_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(next_protocol_number(2024, 0), "PR-2024-0001");
        assert_eq!(next_protocol_number(2024, 41), "PR-2024-0042");
        assert_eq!(next_protocol_number(2024, 9999), "PR-2024-10000");
    }

    #[test]
    fn test_custom_prefix() {
        let numbering = ProtocolNumbering::new("ПР");
        assert_eq!(numbering.year_prefix(2025), "ПР-2025-");
        assert_eq!(numbering.format(2025, 2), "ПР-2025-0003");
    }

    #[test]
    fn test_next_increments_within_year_and_resets() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let numbering = ProtocolNumbering::default();

        let mut previous = String::new();
        for _ in 0..3 {
            let number = numbering.next(&store, 2024).unwrap();
            assert!(number > previous, "{number} <= {previous}");
            store.insert(&record(&number)).unwrap();
            previous = number;
        }
        assert_eq!(previous, "PR-2024-0003");

        assert_eq!(numbering.next(&store, 2025).unwrap(), "PR-2025-0001");
    }
}
