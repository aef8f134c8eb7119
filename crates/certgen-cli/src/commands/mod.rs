//! CLI commands.

pub mod config;
pub mod generate;
pub mod history;
pub mod inspect;

use std::path::{Path, PathBuf};

use anyhow::Context;

use certgen_core::CertgenConfig;

/// `<config dir>/certgen/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("certgen")
        .join("config.json")
}

/// The file `--config` names, else the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<CertgenConfig> {
    let path = config_path(explicit);
    if explicit.is_none() && !path.exists() {
        return Ok(CertgenConfig::default());
    }
    read_config(&path)
}

fn read_config(path: &Path) -> anyhow::Result<CertgenConfig> {
    CertgenConfig::from_file(path)
        .with_context(|| format!("failed to read config {}", path.display()))
}
