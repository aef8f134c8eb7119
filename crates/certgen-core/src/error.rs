//! Error types for the certgen-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the certgen library.
#[derive(Error, Debug)]
pub enum CertgenError {
    /// Store or template setup failed at startup.
    #[error("failed to initialize {component}: {reason}")]
    Initialization {
        component: &'static str,
        reason: String,
    },

    /// User input was rejected.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The template file does not exist.
    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template could not be read or parsed.
    #[error("document error: {0}")]
    Document(#[from] DocxError),

    /// Marker substitution failed.
    #[error("substitution failed: {0}")]
    Substitution(#[source] DocxError),

    /// Writing the output document failed.
    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: DocxError,
    },

    /// Record storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Template profile error.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while validating user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Full name must consist of at least two words.
    #[error("full name must contain at least two words")]
    IncompleteName,

    /// A required text field is blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The qualification group is not a number.
    #[error("qualification group is not a number: {0}")]
    NotANumber(String),

    /// The qualification group is outside 2..=5.
    #[error("qualification group must be between 2 and 5, got {0}")]
    GroupOutOfRange(i64),

    /// A date does not match dd.mm.yyyy or is not a calendar date.
    #[error("invalid date (expected dd.mm.yyyy): {0}")]
    InvalidDate(String),

    /// The next certification date is not after the certification date.
    #[error("next certification date {next} must be after {cert}")]
    DateOrder { cert: String, next: String },
}

/// Errors related to the docx container.
#[derive(Error, Debug)]
pub enum DocxError {
    /// The zip package is unreadable.
    #[error("invalid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A part is not well-formed XML.
    #[error("malformed XML in {part}: {reason}")]
    Xml { part: String, reason: String },

    /// A required part is missing from the package.
    #[error("missing part: {0}")]
    MissingPart(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the certificate store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be decoded.
    #[error("corrupt value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },
}

/// Errors related to template profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// No profile is registered under the requested identity.
    #[error("unknown template profile: {0}")]
    Unknown(String),

    /// The profile document is not valid JSON.
    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_json::Error),

    /// A marker entry has an empty marker string.
    #[error("profile {profile} has an empty marker at entry {index}")]
    EmptyMarker { profile: String, index: usize },

    /// An empty marker was added to a replacement map.
    #[error("replacement marker must not be empty")]
    EmptyKey,

    /// I/O error while reading an external profile.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the certgen library.
pub type Result<T> = std::result::Result<T, CertgenError>;
