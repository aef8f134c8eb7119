//! Core library for filling a certificate template.
//!
//! This crate provides:
//! - A minimal .docx reader/writer exposing paragraphs, table cells, headers and footers
//! - Marker substitution that keeps the first run's formatting
//! - Template profiles holding the per-template marker tables
//! - Year-scoped protocol numbering and a SQLite record store
//! - The generation pipeline tying these together

pub mod docx;
pub mod error;
pub mod format;
pub mod generator;
pub mod models;
pub mod numbering;
pub mod rules;
pub mod store;
pub mod substitution;

pub use error::{CertgenError, Result};
pub use generator::{GeneratedCertificate, GenerationOutcome, Generator, Stage};
pub use models::certificate::{CertificateInput, CertificateRecord, NewCertificate};
pub use models::config::CertgenConfig;
pub use numbering::{ProtocolNumbering, next_protocol_number};
pub use store::{CertificateStore, SqliteStore};
pub use substitution::{ReplacementMap, TemplateProfile, TemplateReport, substitute};
