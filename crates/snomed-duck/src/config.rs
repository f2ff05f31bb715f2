//! Loader configuration.

use std::path::{Path, PathBuf};

use snomed_rf2::ReleaseType;

/// Options passed to the engine's bulk text import.
///
/// Defaults match the RF2 distribution format: tab-delimited, header row
/// present, `YYYYMMDD` dates, empty string as null.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Field delimiter.
    pub delimiter: char,
    /// Whether the first row is a header row.
    pub header: bool,
    /// strptime-style date format for date columns.
    pub date_format: String,
    /// Token representing null values.
    pub null_token: String,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            header: true,
            date_format: "%Y%m%d".to_string(),
            null_token: String::new(),
        }
    }
}

impl CopyOptions {
    /// Renders the options as a `COPY` options list.
    pub fn to_sql(&self) -> String {
        let mut clauses = Vec::new();
        if self.header {
            clauses.push("HEADER".to_string());
        }
        clauses.push(format!("DELIMITER '{}'", self.delimiter));
        clauses.push(format!("DATEFORMAT '{}'", self.date_format));
        clauses.push(format!("NULL '{}'", self.null_token));
        clauses.join(", ")
    }
}

/// Configuration for a loader run.
///
/// Passed into the orchestrator at construction; there is no process-wide
/// loader state.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Local port DuckDB's UI extension serves on.
    pub ui_port: u16,
    /// Bulk import options.
    pub copy: CopyOptions,
    /// Directory containing the DDL and validation SQL scripts.
    pub sql_resources: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            ui_port: 4213,
            copy: CopyOptions::default(),
            sql_resources: default_sql_resources(),
        }
    }
}

impl LoaderConfig {
    /// Path of the schema DDL script for a release type.
    pub fn ddl_script(&self, release_type: ReleaseType) -> PathBuf {
        self.sql_resources.join(format!(
            "create_{}_tables.sql",
            release_type.label().to_lowercase()
        ))
    }

    /// Path of the post-load validation script for a release type.
    pub fn validation_script(&self, release_type: ReleaseType) -> PathBuf {
        self.sql_resources.join(format!(
            "validate_{}_targetcomponentid.sql",
            release_type.label().to_lowercase()
        ))
    }
}

/// The SQL scripts shipped with this crate.
pub(crate) fn default_sql_resources() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/sql")
}
