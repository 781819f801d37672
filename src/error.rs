//! Error types for desksave.
//!
//! Failures fall into three groups:
//! - [`ConfigError`]: the mapping or settings document could not be used.
//!   Fatal, raised before any file is touched.
//! - [`PathError`]: the source or destination directory is unusable.
//!   Fatal, raised before traversal starts.
//! - [`EntryError`]: a single entry could not be moved. Recorded in the
//!   report, the run continues.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the extension mapping or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error while reading configuration.
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping document is not valid JSON.
    #[error("malformed file type mapping: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The mapping document is valid JSON but not an object.
    #[error("file type mapping must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A category value is not a string.
    #[error("category for extension '{extension}' must be a string, found {found}")]
    InvalidCategory {
        extension: String,
        found: &'static str,
    },

    /// An extension that normalizes to nothing usable.
    #[error("invalid extension '{0}'")]
    InvalidExtension(String),

    /// A category that cannot be used as a folder name.
    #[error("invalid category name '{0}': must be a single non-empty folder name")]
    InvalidCategoryName(String),

    /// One extension mapped to two categories.
    #[error("extension '{extension}' is mapped to both '{first}' and '{second}'")]
    ConflictingExtension {
        extension: String,
        first: String,
        second: String,
    },

    /// Invalid TOML syntax or structure in the settings file.
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Invalid glob pattern in the ignore list.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    /// Invalid regex pattern in the ignore list.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
}

/// Errors about the source or destination directory.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("source directory does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("cannot read source directory {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("destination directory does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),

    #[error("destination is not a directory: {}", .0.display())]
    DestinationNotDirectory(PathBuf),

    #[error("cannot prepare destination {}: {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No platform default could be found for a directory that was not given.
    #[error("no {0} directory given and none could be determined for this platform")]
    NoDefault(&'static str),
}

/// A per-entry failure. Never aborts a run.
#[derive(Debug, Error)]
pub enum EntryError {
    /// Failed to create a category directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move an entry into its category directory.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate name in the category directory is taken.
    #[error("no free name for '{name}' in {}", dir.display())]
    NoFreeName { name: String, dir: PathBuf },
}

/// Reasons a sort run could not start.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Result type for desksave operations.
pub type Result<T> = std::result::Result<T, Error>;
