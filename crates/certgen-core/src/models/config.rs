//! Configuration structures for certificate generation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CertgenError, Result};

/// Main configuration for certgen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CertgenConfig {
    /// Template configuration.
    pub template: TemplateConfig,

    /// Record store configuration.
    pub storage: StorageConfig,

    /// Protocol numbering configuration.
    pub numbering: NumberingConfig,

    /// Output document configuration.
    pub output: OutputConfig,

    /// Log sink configuration.
    pub logging: LoggingConfig,
}

/// Template location and marker profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Path to the certificate template (.docx).
    pub path: PathBuf,

    /// Identity of the marker profile matching the template.
    pub profile: String,

    /// External profile file; replaces the built-in profile when set.
    pub profile_file: Option<PathBuf>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("templates.docx"),
            profile: crate::substitution::profile::DEFAULT_PROFILE.to_string(),
            profile_file: None,
        }
    }
}

/// SQLite store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file.
    pub database: PathBuf,

    /// How long to wait on a locked database, in seconds.
    pub busy_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("certificates.db"),
            busy_timeout_secs: 10,
        }
    }
}

/// Protocol number format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingConfig {
    /// Leading segment of every protocol number (`PR` in `PR-2024-0001`).
    pub prefix: String,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            prefix: crate::numbering::DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Output document naming and post-save behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name prefix of generated documents.
    pub file_prefix: String,

    /// Output directory (default: the template's directory).
    pub dir: Option<PathBuf>,

    /// Open the document and its folder after a successful run.
    pub open_after_save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: "Сертификат".to_string(),
            dir: None,
            open_after_save: true,
        }
    }
}

/// Log sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; diagnostics never go to the terminal.
    pub file: PathBuf,

    /// Base level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("generator.log"),
            level: "debug".to_string(),
        }
    }
}

impl CertgenConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CertgenError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| CertgenError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory generated documents are written to.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output.dir {
            Some(dir) => dir.clone(),
            None => self
                .template
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}
