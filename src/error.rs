//! Error types.
//!
//! - `SourceError`: a byte source could not be read (file, HTTP, in-memory).
//! - `LoadError`: a whole source failed to load; carries the failing `SourceId`.
//! - `AppError`: the binary boundary error (message + process exit code).
//!
//! Row-level problems never show up here: malformed rows are dropped and bad
//! numbers default to zero during normalization (see `io::ingest`).

use thiserror::Error;

use crate::domain::SourceId;

/// Failure reading raw bytes for one source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request for '{url}' failed: {message}")]
    Http { url: String, message: String },
    #[error("HTTP request for '{url}' returned status {status}")]
    Status { url: String, status: u16 },
    #[error("no data registered for source `{0}`")]
    NotFound(String),
    #[error("source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failure loading one source. Any of these fails the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {source_id}: {error}")]
    Source {
        source_id: SourceId,
        #[source]
        error: SourceError,
    },
    #[error("failed to parse {source_id} CSV: {message}")]
    Csv { source_id: SourceId, message: String },
    #[error("{source_id} is missing its date column (tried: {tried})")]
    MissingColumn { source_id: SourceId, tried: String },
}

impl LoadError {
    pub fn source_id(&self) -> SourceId {
        match self {
            LoadError::Source { source_id, .. }
            | LoadError::Csv { source_id, .. }
            | LoadError::MissingColumn { source_id, .. } => *source_id,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
