//! Byte sources for CSV extracts.
//!
//! The loader never touches paths or URLs directly; it asks a `SourceReader`
//! for the bytes of a `SourceId`. Readers must be `Send + Sync` because sources
//! are read concurrently.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::SourceId;
use crate::error::SourceError;

pub trait SourceReader: Send + Sync {
    fn read(&self, source: SourceId) -> Result<Vec<u8>, SourceError>;

    /// Where the bytes come from, for logs and error messages.
    fn describe(&self) -> String;
}

/// Environment variable holding the default data directory.
pub const DATA_DIR_ENV: &str = "COVID_DATA_DIR";

/// Data directory used when neither a flag nor the environment names one.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Reads `<root>/<SourceId::file_name()>`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, source: SourceId) -> PathBuf {
        self.root.join(source.file_name())
    }
}

impl SourceReader for DirSource {
    fn read(&self, source: SourceId) -> Result<Vec<u8>, SourceError> {
        let path = self.path_for(source);
        std::fs::read(&path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}

/// In-memory extracts keyed by source. Useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    texts: HashMap<SourceId, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: SourceId, text: impl Into<Vec<u8>>) -> Self {
        self.texts.insert(source, text.into());
        self
    }
}

impl SourceReader for MemorySource {
    fn read(&self, source: SourceId) -> Result<Vec<u8>, SourceError> {
        self.texts
            .get(&source)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(source.to_string()))
    }

    fn describe(&self) -> String {
        format!("memory:{} sources", self.texts.len())
    }
}
