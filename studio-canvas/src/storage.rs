//! Persistence port for canvas state.
//!
//! The deck is stored as one JSON blob per key. Where the blob lives is up to
//! the [`Storage`] implementation handed in by the caller.

use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::Deck;

/// Key/value store for serialized state.
pub trait Storage {
    /// `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// File extension used by [`FileStorage`].
pub const STATE_FILE_EXT: &str = "json";

/// One `<key>.json` file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let bad = key.trim().is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
            || key.contains('\0');
        if bad {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.{STATE_FILE_EXT}")))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("read state file: {}", path.display()))?;
        Ok(Some(data))
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        // fs::write does not create directories
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create state dir: {}", self.root.display()))?;
        fs::write(&path, value).with_context(|| format!("write state file: {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("remove state file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StorageError {
    #[error("invalid storage key: {key:?}")]
    InvalidKey { key: String },
}

/// Save a deck, every slide history included, as pretty JSON.
pub fn save_deck<S: Storage + ?Sized>(
    storage: &mut S,
    key: &str,
    deck: &Deck,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(deck).context("serialize deck to json")?;
    storage
        .write(key, &json)
        .with_context(|| format!("store deck under key {key:?}"))?;
    tracing::info!(key, deck_id = %deck.deck_id, slides = deck.len(), "deck saved");
    Ok(())
}

/// Load a deck. `Ok(None)` when the key holds nothing.
///
/// Out-of-range indices in the blob are clamped during parsing; only blobs
/// that are not deck JSON at all are errors.
pub fn load_deck<S: Storage + ?Sized>(storage: &S, key: &str) -> anyhow::Result<Option<Deck>> {
    let Some(data) = storage
        .read(key)
        .with_context(|| format!("read deck under key {key:?}"))?
    else {
        tracing::debug!(key, "no stored deck");
        return Ok(None);
    };

    let deck: Deck = serde_json::from_str(&data).context("parse deck json")?;
    tracing::info!(key, deck_id = %deck.deck_id, slides = deck.len(), "deck loaded");
    Ok(Some(deck))
}
