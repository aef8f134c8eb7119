//! Certificate generation pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::docx::Document;
use crate::error::{CertgenError, Result};
use crate::models::certificate::{CertificateInput, NewCertificate};
use crate::models::config::CertgenConfig;
use crate::numbering::ProtocolNumbering;
use crate::rules::sanitize_file_component;
use crate::store::{CertificateStore, SqliteStore};
use crate::substitution::{self, TemplateProfile, TemplateReport};

/// Pipeline steps, in order. A failed run reports the step it stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CollectInput,
    Validate,
    ComputeDerived,
    LoadTemplate,
    Substitute,
    Save,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectInput => "collect input",
            Self::Validate => "validate",
            Self::ComputeDerived => "compute derived values",
            Self::LoadTemplate => "load template",
            Self::Substitute => "substitute",
            Self::Save => "save",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// A successfully generated certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCertificate {
    pub protocol_number: String,
    pub output_path: PathBuf,
    /// Regions whose text was rewritten.
    pub replaced_regions: usize,
}

/// Result of one generation run.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated(GeneratedCertificate),
    Failed { stage: Stage, error: CertgenError },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            Self::Generated(certificate) => Some(&certificate.output_path),
            Self::Failed { .. } => None,
        }
    }
}

struct StageError {
    stage: Stage,
    error: CertgenError,
}

fn at<E: Into<CertgenError>>(stage: Stage) -> impl FnOnce(E) -> StageError {
    move |error| StageError {
        stage,
        error: error.into(),
    }
}

/// Fills the certificate template and records each generated document.
pub struct Generator<S: CertificateStore = SqliteStore> {
    config: CertgenConfig,
    store: S,
    profile: TemplateProfile,
    numbering: ProtocolNumbering,
}

impl Generator<SqliteStore> {
    /// Open the configured database and prepare the generator.
    pub fn open(config: CertgenConfig) -> Result<Self> {
        let busy_timeout = Duration::from_secs(config.storage.busy_timeout_secs);
        let store = SqliteStore::open(&config.storage.database, busy_timeout).map_err(|e| {
            CertgenError::Initialization {
                component: "certificate store",
                reason: e.to_string(),
            }
        })?;
        Self::new(config, store)
    }
}

impl<S: CertificateStore> Generator<S> {
    /// Create a generator over an already opened store.
    ///
    /// Loads the template profile and logs a scan of the template. A missing
    /// or unreadable template is only logged here.
    pub fn new(config: CertgenConfig, store: S) -> Result<Self> {
        let profile = TemplateProfile::for_template(&config.template).map_err(|e| {
            CertgenError::Initialization {
                component: "template profile",
                reason: e.to_string(),
            }
        })?;
        debug!("Using template profile {}", profile.id);

        let generator = Self {
            numbering: ProtocolNumbering::new(config.numbering.prefix.clone()),
            config,
            store,
            profile,
        };
        generator.log_template_scan();
        Ok(generator)
    }

    pub fn config(&self) -> &CertgenConfig {
        &self.config
    }

    pub fn profile(&self) -> &TemplateProfile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scan the configured template for this profile's markers.
    pub fn inspect(&self) -> Result<TemplateReport> {
        inspect_file(&self.config.template.path, &self.profile)
    }

    fn log_template_scan(&self) {
        let path = &self.config.template.path;
        if !path.exists() {
            warn!("Template {} not found", path.display());
            return;
        }
        match self.inspect() {
            Ok(report) => {
                info!("Template {}: {} regions scanned", path.display(), report.regions);
                for hit in &report.hits {
                    info!("Found marker {:?} in {}: {}", hit.marker, hit.location, hit.excerpt);
                    debug!("Runs: {:?}", hit.runs);
                }
            }
            Err(e) => error!("Template scan failed: {}", e),
        }
    }

    /// Generate a certificate stamped with the current local time.
    pub fn generate(&mut self, input: &CertificateInput) -> GenerationOutcome {
        self.generate_at(input, Local::now().naive_local())
    }

    /// Generate a certificate stamped with `now`.
    pub fn generate_at(&mut self, input: &CertificateInput, now: NaiveDateTime) -> GenerationOutcome {
        match self.run(input, now) {
            Ok(certificate) => GenerationOutcome::Generated(certificate),
            Err(StageError { stage, error }) => {
                error!("Generation failed at {}: {}", stage, error);
                GenerationOutcome::Failed { stage, error }
            }
        }
    }

    /// Like [`generate_at`](Self::generate_at), returning the error directly.
    pub fn try_generate_at(
        &mut self,
        input: &CertificateInput,
        now: NaiveDateTime,
    ) -> Result<GeneratedCertificate> {
        self.run(input, now).map_err(|failure| failure.error)
    }

    /// Output file for `input` generated at `now`.
    pub fn output_path(&self, input: &CertificateInput, now: NaiveDateTime) -> PathBuf {
        let name = format!(
            "{}_{}{}.docx",
            self.config.output.file_prefix,
            sanitize_file_component(input.first_name_token()),
            now.format("%Y%m%d%H%M%S")
        );
        self.config.output_dir().join(name)
    }

    fn run(
        &mut self,
        input: &CertificateInput,
        now: NaiveDateTime,
    ) -> std::result::Result<GeneratedCertificate, StageError> {
        input.validate().map_err(at(Stage::Validate))?;

        let protocol_number = self
            .numbering
            .next(&self.store, now.year())
            .map_err(at(Stage::ComputeDerived))?;
        let output_path = self.output_path(input, now);
        let fields = input.formatted();
        info!("Generating {} for {}", protocol_number, fields.full_name);

        let template = &self.config.template.path;
        if !template.exists() {
            return Err(StageError {
                stage: Stage::LoadTemplate,
                error: CertgenError::TemplateNotFound(template.clone()),
            });
        }
        let mut document = Document::open(template).map_err(at(Stage::LoadTemplate))?;

        let replacements = self
            .profile
            .replacement_map(&protocol_number, &fields)
            .map_err(at(Stage::Substitute))?;
        debug!("Replacement map has {} markers", replacements.len());
        let report = substitution::apply_to_document(&mut document, &replacements)
            .map_err(|e| at(Stage::Substitute)(CertgenError::Substitution(e)))?;

        document.save(&output_path).map_err(|source| StageError {
            stage: Stage::Save,
            error: CertgenError::Save {
                path: output_path.clone(),
                source,
            },
        })?;
        info!("Saved {}", output_path.display());

        let record = NewCertificate::from_input(protocol_number.clone(), input, &fields);
        let id = self.store.insert(&record).map_err(at(Stage::Persist))?;
        info!("Stored {} as row {}", protocol_number, id);

        Ok(GeneratedCertificate {
            protocol_number,
            output_path,
            replaced_regions: report.replaced,
        })
    }
}

/// Scan a template file for `profile`'s markers.
pub fn inspect_file(path: &Path, profile: &TemplateProfile) -> Result<TemplateReport> {
    if !path.exists() {
        return Err(CertgenError::TemplateNotFound(path.to_path_buf()));
    }
    let mut document = Document::open(path)?;
    let markers = profile.all_markers();
    Ok(substitution::inspect_template(&mut document, &markers)?)
}
