//! Pool document stores.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anomaly_spi::{PoolDocument, PoolError, PoolStore};

/// Pool document persisted as pretty-printed JSON.
///
/// Loading a missing file creates it with an empty document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PoolStore for JsonFileStore {
    fn load(&self) -> Result<PoolDocument, PoolError> {
        if !self.path.exists() {
            let document = PoolDocument::new();
            self.save(&document)?;
            tracing::info!(path = %self.path.display(), "created empty pool document");
            return Ok(document);
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| PoolError::Store(format!("{}: {}", self.path.display(), e)))?;
        if text.trim().is_empty() {
            return Ok(PoolDocument::new());
        }
        serde_json::from_str(&text).map_err(|e| PoolError::InvalidSchema(e.to_string()))
    }

    fn save(&self, document: &PoolDocument) -> Result<(), PoolError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PoolError::Store(format!("{}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| PoolError::Store(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| PoolError::Store(format!("{}: {}", self.path.display(), e)))
    }
}

/// Store keeping the document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<PoolDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: PoolDocument) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    /// Copy of the last saved document.
    pub fn snapshot(&self) -> Result<PoolDocument, PoolError> {
        self.load()
    }
}

impl PoolStore for MemoryStore {
    fn load(&self) -> Result<PoolDocument, PoolError> {
        self.document
            .lock()
            .map(|d| d.clone())
            .map_err(|_| PoolError::Store("memory store lock poisoned".to_string()))
    }

    fn save(&self, document: &PoolDocument) -> Result<(), PoolError> {
        let mut guard = self
            .document
            .lock()
            .map_err(|_| PoolError::Store("memory store lock poisoned".to_string()))?;
        *guard = document.clone();
        Ok(())
    }
}
