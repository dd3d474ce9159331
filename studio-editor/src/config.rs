//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the keys it changes.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Storage key the deck is saved under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "studio.canvas";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Max history entries per slide. `None` keeps everything.
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Persist the deck after every settled edit.
    #[serde(default = "default_autosave")]
    pub autosave: bool,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_autosave() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            history_limit: None,
            autosave: default_autosave(),
        }
    }
}

/// Load editor config from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<EditorConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config file: {}", path.display()))?;
    let config: EditorConfig = serde_json::from_str(&data).context("parse config json")?;
    tracing::debug!(
        storage_key = %config.storage_key,
        history_limit = ?config.history_limit,
        autosave = config.autosave,
        "config loaded"
    );
    Ok(config)
}
