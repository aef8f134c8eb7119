//! Certificate record storage.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::certificate::NewCertificate;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Minimal row interface the generator needs from a store.
pub trait CertificateStore {
    /// Insert one record and commit; returns the new row id.
    fn insert(&mut self, record: &NewCertificate) -> Result<i64>;

    /// Count records whose protocol number starts with `prefix`.
    fn count_with_prefix(&self, prefix: &str) -> Result<u64>;
}
