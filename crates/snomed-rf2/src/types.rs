//! Error types for release tree resolution.

use thiserror::Error;

/// Errors that can occur while scanning a release tree.
#[derive(Error, Debug)]
pub enum ScanError {
    /// I/O error reading the release tree.
    #[error("IO error reading release tree: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed below the release subtree.
    #[error("release tree walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for release tree resolution.
pub type ScanResult<T> = Result<T, ScanError>;
