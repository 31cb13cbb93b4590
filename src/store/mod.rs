//! Durable result stores
//!
//! Provides the `ResultStore` trait, a JSON file implementation that
//! overwrites the whole collection atomically on every save, and an
//! in-memory implementation for tests.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use qbench_common::QbenchError;

use crate::record::ResultCollection;


/// Errors from result store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt result document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode results for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for QbenchError {
    fn from(err: StoreError) -> Self {
        let location = match &err {
            StoreError::Io { path, .. }
            | StoreError::Corrupt { path, .. }
            | StoreError::Encode { path, .. } => path.display().to_string(),
        };
        QbenchError::Storage { location, message: err.to_string() }
    }
}

/// Persistence for a [`ResultCollection`].
///
/// A store holds at most one collection. `save` replaces it as a whole.
pub trait ResultStore {
    /// Load the persisted collection, or `None` if nothing was persisted yet.
    fn load(&self) -> Result<Option<ResultCollection>>;

    /// Replace the persisted collection.
    fn save(&mut self, collection: &ResultCollection) -> Result<()>;

    /// Human-readable location used in messages.
    fn location(&self) -> String;
}

impl<S: ResultStore + ?Sized> ResultStore for &mut S {
    fn load(&self) -> Result<Option<ResultCollection>> {
        (**self).load()
    }

    fn save(&mut self, collection: &ResultCollection) -> Result<()> {
        (**self).save(collection)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// JSON document store
///
/// The collection is written as a pretty-printed JSON array. Saves go to a
/// sibling `.tmp` file which is synced and then renamed over the target, so
/// the document on disk is always either the previous or the new collection.
///
/// # Example
///
/// ```no_run
/// use qbench::store::{JsonFileStore, ResultStore};
///
/// let store = JsonFileStore::new("out/data/results.json");
/// let existing = store.load().expect("store should be readable");
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

impl ResultStore for JsonFileStore {
    fn load(&self) -> Result<Option<ResultCollection>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        let collection: ResultCollection = serde_json::from_str(&json)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;
        Ok(Some(collection))
    }

    fn save(&mut self, collection: &ResultCollection) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let temp_path = self.temp_path();
        let file = File::create(&temp_path).map_err(|e| self.io_err(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, collection)
            .map_err(|source| StoreError::Encode { path: self.path.clone(), source })?;
        writer.flush().map_err(|e| self.io_err(e))?;
        writer
            .into_inner()
            .map_err(|e| self.io_err(e.into_error()))?
            .sync_all()
            .map_err(|e| self.io_err(e))?;

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| self.io_err(e))?;
        tracing::trace!(path = %self.path.display(), records = collection.len(), "checkpoint written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store for testing
///
/// Keeps the last saved collection and counts saves. No persistence.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collection: Option<ResultCollection>,
    saves: usize,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `collection`, as if saved by an earlier run.
    #[must_use]
    pub fn with_collection(collection: ResultCollection) -> Self {
        Self { collection: Some(collection), saves: 0 }
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn collection(&self) -> Option<&ResultCollection> {
        self.collection.as_ref()
    }
}

impl ResultStore for InMemoryStore {
    fn load(&self) -> Result<Option<ResultCollection>> {
        Ok(self.collection.clone())
    }

    fn save(&mut self, collection: &ResultCollection) -> Result<()> {
        self.collection = Some(collection.clone());
        self.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
