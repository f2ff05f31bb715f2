//! DuckDB session wrapper.

use std::path::Path;

use duckdb::Connection;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::CopyOptions;
use crate::types::{LoaderError, LoaderResult};

/// Error from the engine for DDL, query, or UI operations.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Creates an engine error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<duckdb::Error> for EngineError {
    fn from(error: duckdb::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Classified failure of one bulk text import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The target table does not exist in the schema, i.e. the file is not
    /// one of the recognised RF2 content formats.
    #[error("unrecognised file type: {0}")]
    FormatRejected(String),

    /// Any other import failure (malformed rows, type mismatches, I/O).
    #[error("{0}")]
    Other(String),
}

/// The embedded database operations the orchestrator depends on.
///
/// [`DuckDbClient`] is the production implementation; tests drive the
/// orchestrator against an in-memory fake.
pub trait SqlEngine {
    /// Applies a multi-statement DDL script.
    fn execute_ddl(&self, sql: &str) -> Result<(), EngineError>;

    /// Runs a query and returns the number of rows it produced.
    fn count_query_rows(&self, sql: &str) -> Result<usize, EngineError>;

    /// Bulk-imports a delimited text file into `table`.
    fn import_text_file(
        &self,
        table: &str,
        path: &Path,
        options: &CopyOptions,
    ) -> Result<(), ImportError>;

    /// Starts the interactive web UI.
    fn start_ui(&self) -> Result<(), EngineError>;
}

/// A DuckDB session.
///
/// The session is released when the value is dropped, on every exit path;
/// [`DuckDbClient::close`] additionally surfaces shutdown errors.
pub struct DuckDbClient {
    conn: Connection,
}

impl DuckDbClient {
    /// Opens a database session. `None` gives a transient in-memory
    /// database.
    ///
    /// The UI extension is installed and loaded eagerly so `start_ui`
    /// works later; a failure there is logged and does not fail the open.
    pub fn open(db_path: Option<&Path>) -> LoaderResult<Self> {
        let conn = match db_path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        let client = Self { conn };
        match client.conn.execute_batch("INSTALL ui; LOAD ui;") {
            Ok(()) => debug!("UI extension loaded"),
            Err(e) => error!("UI initialization failed: {e}"),
        }
        Ok(client)
    }

    /// Closes the session explicitly.
    pub fn close(self) -> LoaderResult<()> {
        self.conn.close().map_err(|(_, e)| LoaderError::Db(e))?;
        debug!("connection closed");
        Ok(())
    }
}

impl SqlEngine for DuckDbClient {
    fn execute_ddl(&self, sql: &str) -> Result<(), EngineError> {
        self.conn.execute_batch(sql).map_err(EngineError::from)
    }

    fn count_query_rows(&self, sql: &str) -> Result<usize, EngineError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut count = 0;
        while rows.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    fn import_text_file(
        &self,
        table: &str,
        path: &Path,
        options: &CopyOptions,
    ) -> Result<(), ImportError> {
        let sql = format!(
            "COPY {table} FROM '{}' ({});",
            path.display(),
            options.to_sql()
        );
        self.conn.execute_batch(&sql).map_err(classify_import_error)
    }

    fn start_ui(&self) -> Result<(), EngineError> {
        self.conn
            .execute_batch("CALL start_ui();")
            .map_err(EngineError::from)
    }
}

/// A catalog error means the canonical table name has no counterpart in
/// the schema; everything else is an ordinary import failure.
fn classify_import_error(error: duckdb::Error) -> ImportError {
    let detail = error.to_string();
    if detail.contains("Catalog Error") {
        ImportError::FormatRejected(detail)
    } else {
        ImportError::Other(detail)
    }
}
