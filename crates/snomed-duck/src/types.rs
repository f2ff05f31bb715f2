//! Loader error types.

use snomed_rf2::{ReleaseType, ScanError};
use thiserror::Error;

/// Errors that can occur while loading a release package.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The supplied package location is empty or not a directory/archive.
    #[error("invalid package location")]
    InvalidPackage,

    /// The supplied package archive does not exist.
    #[error("zip file not found: {path}")]
    ZipNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Failed to read or extract the package archive.
    #[error("failed to extract package archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error outside the database.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database session error.
    #[error("database error: {0}")]
    Db(#[from] duckdb::Error),

    /// Release tree scan failed.
    #[error("release scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Post-load validation found association refset members referencing
    /// missing concepts. Fatal: the run terminates immediately.
    #[error("found {violations} invalid targetComponentIds in the {release_type} association refset")]
    IntegrityViolation {
        /// Release type whose association refset failed validation.
        release_type: ReleaseType,
        /// Number of violation rows returned by the validation query.
        violations: usize,
    },
}

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
