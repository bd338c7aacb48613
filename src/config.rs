//! Durable marker geometry storage.
//!
//! One JSON document holds both marker namespaces. Loading is fully
//! tolerant: parse failures, wrong top-level shapes and malformed records
//! all degrade to empty data with a warning, never an error. Saving goes
//! through a temp-file-then-rename sequence so a crash mid-write leaves
//! either the old or the new complete document on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    CONFIG_FILENAME, DEFAULT_CONFIG_DIR, LEGACY_POINTS_FILENAME, LEGACY_RECTS_FILENAME,
};
use crate::types::{PointRecord, RectRecord};

/// The persisted document. Both namespaces are always present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub rects: BTreeMap<String, RectRecord>,
    #[serde(default)]
    pub points: BTreeMap<String, PointRecord>,
}

/// Default config directory under the user's home, if one exists.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_DIR))
}

/// File-backed store for one [`ConfigDocument`].
#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    path: PathBuf,
}

impl ConfigStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
        let path = dir.join(CONFIG_FILENAME);
        Ok(Self { dir, path })
    }

    /// Canonical path of the unified document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, migrating legacy files on first use.
    ///
    /// Never fails: unreadable or malformed data loads as empty.
    pub fn load(&self) -> ConfigDocument {
        if self.path.exists() {
            return match fs::read_to_string(&self.path) {
                Ok(content) => parse_document(&content),
                Err(e) => {
                    tracing::warn!("failed to read {}: {e}", self.path.display());
                    ConfigDocument::default()
                }
            };
        }

        match self.migrate_legacy() {
            Some(document) => document,
            None => ConfigDocument::default(),
        }
    }

    /// Serialize and durably replace the document on disk.
    pub fn save(&self, document: &ConfigDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temp file in {}", self.dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// One-time migration from the two legacy single-namespace files.
    ///
    /// Returns `None` when neither legacy file contributes data, in which
    /// case nothing is written. On success the unified document is written
    /// immediately so the legacy files are never consulted again.
    fn migrate_legacy(&self) -> Option<ConfigDocument> {
        let rects: BTreeMap<String, RectRecord> =
            load_legacy_map(&self.dir.join(LEGACY_RECTS_FILENAME));
        let points: BTreeMap<String, PointRecord> =
            load_legacy_map(&self.dir.join(LEGACY_POINTS_FILENAME));
        if rects.is_empty() && points.is_empty() {
            return None;
        }

        let document = ConfigDocument { rects, points };
        tracing::debug!(
            rects = document.rects.len(),
            points = document.points.len(),
            "migrated legacy marker files"
        );
        if let Err(e) = self.save(&document) {
            tracing::warn!("failed to write migrated config: {e:#}");
        }
        Some(document)
    }
}

/// Parse a document string, degrading each namespace independently.
fn parse_document(content: &str) -> ConfigDocument {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("malformed config document, starting empty: {e}");
            return ConfigDocument::default();
        }
    };
    let Value::Object(mut map) = value else {
        tracing::warn!("config document is not an object, starting empty");
        return ConfigDocument::default();
    };
    ConfigDocument {
        rects: parse_namespace(map.remove("rects"), "rects"),
        points: parse_namespace(map.remove("points"), "points"),
    }
}

/// Parse one namespace value, skipping individual malformed records.
fn parse_namespace<R: DeserializeOwned>(
    value: Option<Value>,
    name: &str,
) -> BTreeMap<String, R> {
    let mut records = BTreeMap::new();
    match value {
        None => {}
        Some(Value::Object(map)) => {
            for (id, raw) in map {
                match serde_json::from_value(raw) {
                    Ok(record) => {
                        records.insert(id, record);
                    }
                    Err(e) => {
                        tracing::warn!("skipping malformed {name} record '{id}': {e}");
                    }
                }
            }
        }
        Some(_) => {
            tracing::warn!("'{name}' namespace is not an object, treating as empty");
        }
    }
    records
}

fn load_legacy_map<R: DeserializeOwned>(path: &Path) -> BTreeMap<String, R> {
    if !path.exists() {
        return BTreeMap::new();
    }
    match fs::read_to_string(path) {
        Ok(content) => {
            let value: Value = match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("malformed legacy file {}: {e}", path.display());
                    return BTreeMap::new();
                }
            };
            // Legacy files are flat id -> record objects.
            parse_namespace(Some(value), "legacy")
        }
        Err(e) => {
            tracing::warn!("failed to read legacy file {}: {e}", path.display());
            BTreeMap::new()
        }
    }
}
