//! Template profiles: per-template marker tables kept as data.
//!
//! A profile lists the extra strings a particular template layout needs
//! replaced (legacy marker spellings, sample phrases left in the layout)
//! and which certificate field each one takes its value from. The
//! canonical `{{ input_* }}` markers are shared by every profile.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::replacements::ReplacementMap;
use crate::error::ProfileError;
use crate::models::certificate::FormattedFields;
use crate::models::config::TemplateConfig;

/// Identity of the built-in certificate profile.
pub const DEFAULT_PROFILE: &str = "certificate-v1";

const BUILTIN_PROFILES: &[(&str, &str)] = &[(
    DEFAULT_PROFILE,
    include_str!("../../profiles/certificate_v1.json"),
)];

/// Markers understood regardless of profile, applied after the profile's own.
pub const CANONICAL_MARKERS: [(&str, FieldSource); 7] = [
    ("{{ input_proto }}", FieldSource::Protocol),
    ("{{ input_fullname }}", FieldSource::FullName),
    ("{{ input_place }}", FieldSource::Workplace),
    ("{{ input_job }}", FieldSource::Position),
    ("{{ input_group }}", FieldSource::Group),
    ("{{ input_date }}", FieldSource::CertDate),
    ("{{ input_nextdate }}", FieldSource::NextDate),
];

/// Which value a marker is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Protocol,
    FullName,
    Workplace,
    Position,
    /// `4 гр. 1000 В и выше`
    Group,
    CertDate,
    NextDate,
    /// Bare group number, `4`.
    GroupNumber,
    /// `4 гр.`
    GroupAbbrev,
    /// Marker is removed.
    Empty,
}

impl FieldSource {
    pub fn resolve(self, protocol: &str, fields: &FormattedFields) -> String {
        match self {
            Self::Protocol => protocol.to_string(),
            Self::FullName => fields.full_name.clone(),
            Self::Workplace => fields.workplace.clone(),
            Self::Position => fields.position.clone(),
            Self::Group => fields.group.clone(),
            Self::CertDate => fields.cert_date.clone(),
            Self::NextDate => fields.next_date.clone(),
            Self::GroupNumber => fields.group_number.to_string(),
            Self::GroupAbbrev => format!("{} гр.", fields.group_number),
            Self::Empty => String::new(),
        }
    }
}

/// One profile marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub marker: String,
    pub value: FieldSource,
}

/// Marker table for one template layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateProfile {
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Applied in order, before the canonical markers.
    pub markers: Vec<MarkerEntry>,
}

impl TemplateProfile {
    /// Look up a profile compiled into the binary.
    pub fn builtin(id: &str) -> Result<Self, ProfileError> {
        let (_, json) = BUILTIN_PROFILES
            .iter()
            .find(|(name, _)| *name == id)
            .ok_or_else(|| ProfileError::Unknown(id.to_string()))?;
        Self::from_json(json)
    }

    /// Parse and check a profile document.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.check()?;
        Ok(profile)
    }

    /// Load a profile from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        let profile = Self::from_json(&content)?;
        debug!("Loaded profile {} from {}", profile.id, path.display());
        Ok(profile)
    }

    /// The profile a template configuration asks for.
    ///
    /// An external profile file takes precedence over the built-in table.
    pub fn for_template(config: &TemplateConfig) -> Result<Self, ProfileError> {
        match &config.profile_file {
            Some(path) => Self::from_file(path),
            None => Self::builtin(&config.profile),
        }
    }

    fn check(&self) -> Result<(), ProfileError> {
        match self.markers.iter().position(|entry| entry.marker.is_empty()) {
            Some(index) => Err(ProfileError::EmptyMarker {
                profile: self.id.clone(),
                index,
            }),
            None => Ok(()),
        }
    }

    /// Replacement map for one generation: profile markers, then canonical ones.
    pub fn replacement_map(
        &self,
        protocol: &str,
        fields: &FormattedFields,
    ) -> Result<ReplacementMap, ProfileError> {
        let profile_entries = self
            .markers
            .iter()
            .map(|entry| (entry.marker.as_str(), entry.value));
        let entries = profile_entries.chain(CANONICAL_MARKERS);

        ReplacementMap::from_pairs(
            entries.map(|(marker, source)| (marker, source.resolve(protocol, fields))),
        )
    }

    /// Every marker this profile replaces, in application order.
    pub fn all_markers(&self) -> Vec<&str> {
        self.markers
            .iter()
            .map(|entry| entry.marker.as_str())
            .chain(CANONICAL_MARKERS.iter().map(|(marker, _)| *marker))
            .collect()
    }
}
