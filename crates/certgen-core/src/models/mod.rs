//! Data models.

pub mod certificate;
pub mod config;
