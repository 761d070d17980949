//! Key-value storage for persisted console state.
//!
//! This module provides the [`KeyValueStore`] trait and its backends. A store
//! maps string keys to text values; every call goes straight to the backend,
//! there is no cache in front of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore (trait)                      │
//! │   - get / set / remove on one key at a time                   │
//! │   - every call is fallible and returns StoreResult            │
//! └──────────────────────────────────────────────────────────────┘
//!            │                     │                     │
//!            ▼                     ▼                     ▼
//!      MemoryStore            FileStore            DisabledStore
//!   (ephemeral, tests)  (JSON file, feature-gated) (always fails)
//! ```
//!
//! # Design Invariants
//!
//! 1. **No panics**: backend failures surface as `StoreError`, never panics.
//! 2. **Atomic writes**: the file backend writes a temp file and renames it.
//! 3. **Single-key operations**: no call touches more than one key's value,
//!    so there are no multi-key invariants to keep.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StoreError::Io` | File I/O failure | Returned, file left untouched |
//! | `StoreError::Serialization` | JSON encode/decode | Returned |
//! | `StoreError::Corruption` | Poisoned lock | Returned |
//! | `StoreError::Unavailable` | Store disabled | Returned on every call |
//! | Missing file | First run | Treated as an empty store |
//!
//! # Feature Gates
//!
//! - `file-store`: enables [`FileStore`] with JSON serialization.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    #[cfg(feature = "file-store")]
    Serialization(String),
    /// Store internals are in an invalid state.
    Corruption(String),
    /// Backend is not available (disabled, sandboxed, read-only).
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "file-store")]
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StoreError::Corruption(msg) => write!(f, "store corruption: {msg}"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            #[cfg(feature = "file-store")]
            StoreError::Serialization(_) => None,
            StoreError::Corruption(_) => None,
            StoreError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A synchronous string key-value store.
///
/// Implementations must be thread-safe (`Send + Sync`) so a store can be
/// shared behind an `Arc` between the application and its tests.
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the value for `key`, `Ok(None)` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or overwrite the value for `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store for testing and ephemeral sessions.
///
/// Values are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: HashMap<String, String>) -> Self {
        Self {
            data: RwLock::new(entries),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .data
            .read()
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Disabled Store
// ─────────────────────────────────────────────────────────────────────────────

/// A store that refuses every operation.
///
/// Stands in for storage that is switched off or inaccessible: reads and
/// writes all fail with [`StoreError::Unavailable`].
#[derive(Debug, Clone)]
pub struct DisabledStore {
    reason: String,
}

impl DisabledStore {
    /// Create a disabled store that reports `reason` on every call.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl KeyValueStore for DisabledStore {
    fn name(&self) -> &str {
        "DisabledStore"
    }

    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    fn remove(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store (requires file-store feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-store")]
mod file_store {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk document.
    #[derive(Serialize, Deserialize)]
    struct StoreFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Key -> value, sorted for stable diffs.
        entries: BTreeMap<String, String>,
    }

    impl StoreFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: BTreeMap::new(),
            }
        }
    }

    /// File-backed store using a single JSON document.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "casefile_console_v1:SUBJECT_001": "edited note"
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// Each `set`/`remove` reads the document, applies the change, and writes
    /// it back through a temporary file:
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        /// Create a file store at the given path.
        ///
        /// The file does not need to exist; it is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Create a store at the default location for the application.
        ///
        /// Uses `$XDG_STATE_HOME/{app_name}/notes.json`, falling back to
        /// `~/.local/state/{app_name}/notes.json`, then the current directory.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let base = dirs_or_fallback();
            Self {
                path: base.join(app_name).join("notes.json"),
            }
        }

        /// Location of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_document(&self) -> StoreResult<StoreFile> {
            if !self.path.exists() {
                return Ok(StoreFile::new());
            }

            let file = File::open(&self.path)?;
            let doc: StoreFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                StoreError::Serialization(format!("failed to parse store file: {e}"))
            })?;

            if doc.format_version != StoreFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = doc.format_version,
                    expected = StoreFile::FORMAT_VERSION,
                    "store file format version mismatch, ignoring stored entries"
                );
                return Ok(StoreFile::new());
            }
            Ok(doc)
        }

        fn write_document(&self, doc: &StoreFile) -> StoreResult<()> {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, doc).map_err(|e| {
                    StoreError::Serialization(format!("failed to serialize store: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = doc.entries.len(),
                "wrote store file"
            );
            Ok(())
        }
    }

    /// Get state directory, falling back to current dir if unavailable.
    fn dirs_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME")
            && !state_home.is_empty()
        {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl KeyValueStore for FileStore {
        fn name(&self) -> &str {
            "FileStore"
        }

        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            Ok(self.read_document()?.entries.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            let mut doc = self.read_document()?;
            doc.entries.insert(key.to_string(), value.to_string());
            self.write_document(&doc)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            let mut doc = self.read_document()?;
            if doc.entries.remove(key).is_none() {
                return Ok(());
            }
            self.write_document(&doc)
        }

        /// Read-only: nothing is created or written. A missing parent
        /// directory counts as available when its nearest existing ancestor
        /// is a writable directory, since `set` creates it on demand.
        fn is_available(&self) -> bool {
            if self.path.is_dir() {
                return false;
            }
            let Some(parent) = self.path.parent() else {
                return false;
            };
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .ancestors()
                .find(|dir| dir.exists())
                .and_then(|dir| fs::metadata(dir).ok())
                .is_some_and(|meta| meta.is_dir() && !meta.permissions().readonly())
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "file-store")]
pub use file_store::FileStore;
