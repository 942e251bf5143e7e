use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pali_types::DerivedEntry;

use crate::write_json_atomic;

/// Derived entries keyed by headword id, backed by a JSON file.
///
/// Mutations stay in memory until [`DerivedStore::save`] is called.
#[derive(Clone, Debug)]
pub struct DerivedStore {
    path: PathBuf,
    entries: BTreeMap<u32, DerivedEntry>,
}

impl DerivedStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
            let list: Vec<DerivedEntry> = serde_json::from_slice(&bytes)
                .with_context(|| format!("parse derived entries {}", path.display()))?;
            list.into_iter().map(|e| (e.id, e)).collect()
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: u32) -> Option<&DerivedEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Insert or replace the entry for `entry.id`.
    pub fn insert(&mut self, entry: DerivedEntry) -> Option<DerivedEntry> {
        self.entries.insert(entry.id, entry)
    }

    pub fn remove(&mut self, id: u32) -> Option<DerivedEntry> {
        self.entries.remove(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every inflected form across all entries.
    pub fn all_inflections(&self) -> HashSet<&str> {
        self.entries
            .values()
            .flat_map(|e| e.inflections.iter().map(String::as_str))
            .collect()
    }

    /// Write all entries, ordered by id, replacing the file atomically.
    pub fn save(&self) -> Result<()> {
        let list: Vec<&DerivedEntry> = self.entries.values().collect();
        write_json_atomic(&self.path, &list)
    }
}
