/// Centralized error types for content-tree using thiserror
///
/// Every variant here aborts a build. The taxonomy separates authoring-process
/// mistakes (history, roster, duplicate identifiers) from system faults.
use std::fmt;
use thiserror::Error;

/// Main error type for a content build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Author error: {0}")]
    Author(#[from] AuthorError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Found {} document(s) with duplicate ids: {}", .0.len(), DuplicateList(.0))]
    DuplicateIdentifiers(Vec<DuplicateIdentifier>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors related to version-control history
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error(
        "Malformed history for '{path}': {reason}. Please commit all newly created documents ONE-BY-ONE first!"
    )]
    Malformed { path: String, reason: String },

    #[error(
        "No history for '{0}'. Please commit all newly created documents ONE-BY-ONE first!"
    )]
    NoHistory(String),

    #[error("Failed to read history for '{path}': {reason}")]
    ProviderFailed { path: String, reason: String },

    #[error("Git repository not found at: {0}")]
    RepoNotFound(String),
}

/// Errors related to the author roster
#[derive(Error, Debug)]
pub enum AuthorError {
    #[error("Unknown author '{raw}': add its email to a roster entry")]
    Unknown { raw: String },
}

/// Errors related to reading content files
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Failed to walk content directory: {0}")]
    WalkFailed(String),

    #[error("Failed to read file '{file}': {reason}")]
    FileReadFailed { file: String, reason: String },

    #[error("Failed to serialize build output: {0}")]
    SerializeFailed(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// One document whose identifier was already claimed by an earlier document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdentifier {
    pub identifier: String,
    pub path: String,
}

struct DuplicateList<'a>(&'a [DuplicateIdentifier]);

impl fmt::Display for DuplicateList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dup) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} ({})", dup.identifier, dup.path)?;
        }
        Ok(())
    }
}

// Conversion from anyhow::Error to BuildError
impl From<anyhow::Error> for BuildError {
    fn from(err: anyhow::Error) -> Self {
        BuildError::Other(format!("{:#}", err))
    }
}

impl BuildError {
    /// Check if this error is an authoring mistake that must be fixed in the
    /// content repository rather than a fault of the build machine
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BuildError::History(HistoryError::Malformed { .. })
                | BuildError::History(HistoryError::NoHistory(_))
                | BuildError::Author(_)
                | BuildError::DuplicateIdentifiers(_)
                | BuildError::Config(_)
        )
    }
}

/// Result alias used throughout the library
pub type Result<T, E = BuildError> = std::result::Result<T, E>;
