use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pali_types::Headword;

/// Load headwords from a JSON array, rejecting duplicate ids or labels.
///
/// Labels key the change-detection snapshot, so they must be unique.
pub fn load_headwords(path: impl AsRef<Path>) -> Result<Vec<Headword>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let headwords: Vec<Headword> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse headwords {}", path.display()))?;

    let mut ids = HashSet::new();
    let mut labels = HashSet::new();
    for hw in &headwords {
        if !ids.insert(hw.id) {
            anyhow::bail!("{}: duplicate headword id {}", path.display(), hw.id);
        }
        if !labels.insert(hw.label.as_str()) {
            anyhow::bail!("{}: duplicate headword label {:?}", path.display(), hw.label);
        }
    }

    Ok(headwords)
}
