//! SQLite-backed certificate store using rusqlite.

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{CertificateStore, Result};
use crate::error::StoreError;
use crate::models::certificate::{CertificateRecord, NewCertificate};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS certificates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    protocol_number TEXT UNIQUE,
    fullname TEXT,
    workplace TEXT,
    position TEXT,
    qualification_group INTEGER,
    cert_date DATE,
    next_cert_date DATE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_COLUMNS: &str = "id, protocol_number, fullname, workplace, position, \
    qualification_group, cert_date, next_cert_date, created_at";

/// Certificate store on a single SQLite connection held for the process
/// lifetime.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let store = Self { conn };
        store.migrate()?;
        info!("Opened certificate store at {}", path.display());
        Ok(store)
    }

    /// In-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        debug!("Certificate table checked");
        Ok(())
    }

    /// Look up a record by its protocol number.
    pub fn find_by_protocol(&self, protocol_number: &str) -> Result<Option<CertificateRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM certificates WHERE protocol_number = ?1");
        let raw = self
            .conn
            .query_row(&sql, params![protocol_number], RawRecord::from_row)
            .optional()?;
        raw.map(RawRecord::decode).transpose()
    }

    /// Most recent records first.
    pub fn recent(&self, limit: usize) -> Result<Vec<CertificateRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM certificates ORDER BY id DESC LIMIT ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], RawRecord::from_row)?;

        let mut records = Vec::new();
        for raw in rows {
            records.push(raw?.decode()?);
        }
        Ok(records)
    }
}

impl CertificateStore for SqliteStore {
    fn insert(&mut self, record: &NewCertificate) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO certificates \
             (protocol_number, fullname, workplace, position, qualification_group, cert_date, next_cert_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.protocol_number,
                record.full_name,
                record.workplace,
                record.position,
                record.qualification_group,
                record.cert_date.format(DATE_FORMAT).to_string(),
                record.next_cert_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted certificate {} as row {}", record.protocol_number, id);
        Ok(id)
    }

    fn count_with_prefix(&self, prefix: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM certificates WHERE substr(protocol_number, 1, length(?1)) = ?1",
            params![prefix],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Row as stored, before date parsing.
struct RawRecord {
    id: i64,
    protocol_number: String,
    full_name: String,
    workplace: String,
    position: String,
    qualification_group: u8,
    cert_date: String,
    next_cert_date: String,
    created_at: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            protocol_number: row.get(1)?,
            full_name: row.get(2)?,
            workplace: row.get(3)?,
            position: row.get(4)?,
            qualification_group: row.get(5)?,
            cert_date: row.get(6)?,
            next_cert_date: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<CertificateRecord> {
        Ok(CertificateRecord {
            id: self.id,
            protocol_number: self.protocol_number,
            full_name: self.full_name,
            workplace: self.workplace,
            position: self.position,
            qualification_group: self.qualification_group,
            cert_date: parse_date("cert_date", &self.cert_date)?,
            next_cert_date: parse_date("next_cert_date", &self.next_cert_date)?,
            created_at: NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
                .map_err(|_| StoreError::Corrupt {
                    column: "created_at",
                    value: self.created_at.clone(),
                })?,
        })
    }
}

fn parse_date(column: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| StoreError::Corrupt {
        column,
        value: value.to_string(),
    })
}
