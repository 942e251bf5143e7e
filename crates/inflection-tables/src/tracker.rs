use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pali_db::{TemplateStore, write_json_atomic};
use pali_types::{Grid, Headword};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const TEMPLATES_SNAPSHOT: &str = "templates_snapshot.json";
pub const HEADWORDS_SNAPSHOT: &str = "headwords_snapshot.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("corrupt snapshot {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("snapshot {} has unsupported version {found}", .path.display())]
    Version { path: PathBuf, found: u32 },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateState {
    pub data: Grid,
    pub like: String,
}

/// Every template's grid and `like` value as of the last completed run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    pub version: u32,
    pub templates: BTreeMap<String, TemplateState>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HeadwordState {
    pub stem: String,
    pub pattern: String,
}

/// Every headword's stem and pattern as of the last completed run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HeadwordSnapshot {
    pub version: u32,
    pub headwords: BTreeMap<String, HeadwordState>,
}

impl Default for TemplateSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            templates: BTreeMap::new(),
        }
    }
}

impl Default for HeadwordSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            headwords: BTreeMap::new(),
        }
    }
}

impl TemplateSnapshot {
    pub fn capture(store: &TemplateStore) -> Self {
        let templates = store
            .iter()
            .map(|t| {
                (
                    t.pattern.clone(),
                    TemplateState {
                        data: t.data.clone(),
                        like: t.like.clone(),
                    },
                )
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            templates,
        }
    }

    /// Load a snapshot; a missing file means no previous run.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Ok(read_snapshot(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        write_json_atomic(path, self)
    }
}

impl HeadwordSnapshot {
    pub fn capture(headwords: &[Headword]) -> Self {
        let headwords = headwords
            .iter()
            .map(|hw| {
                (
                    hw.label.clone(),
                    HeadwordState {
                        stem: hw.stem.clone(),
                        pattern: hw.pattern.clone(),
                    },
                )
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            headwords,
        }
    }

    /// Load a snapshot; a missing file means no previous run.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Ok(read_snapshot(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        write_json_atomic(path, self)
    }
}

/// The version field alone, checked before the body is parsed.
#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let parse_error = |source: serde_json::Error| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let header: SnapshotHeader = serde_json::from_slice(&bytes).map_err(parse_error)?;
    check_version(path, header.version)?;
    serde_json::from_slice(&bytes).map(Some).map_err(parse_error)
}

fn check_version(path: &Path, found: u32) -> Result<(), SnapshotError> {
    if found == SNAPSHOT_VERSION {
        Ok(())
    } else {
        Err(SnapshotError::Version {
            path: path.to_path_buf(),
            found,
        })
    }
}

/// Template differences between two snapshots.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TemplateChanges {
    /// Present in both snapshots with different grids.
    pub changed: BTreeSet<String>,
    pub added: BTreeSet<String>,
    /// Reported only; deletions never force regeneration.
    pub deleted: BTreeSet<String>,
    /// Patterns whose `like` value never appeared in the old snapshot.
    pub unfamiliar_like: BTreeSet<String>,
}

impl TemplateChanges {
    /// Patterns whose headwords must be regenerated.
    pub fn changed_patterns(&self) -> BTreeSet<String> {
        self.changed
            .iter()
            .chain(&self.added)
            .chain(&self.unfamiliar_like)
            .cloned()
            .collect()
    }
}

/// Compare template snapshots.
///
/// A pattern counts as changed when its grid differs, when it is new, or when
/// its `like` value is not among the `like` values of the old snapshot. The
/// last rule flags every pattern pointing at an unfamiliar reference, not only
/// those whose `like` actually changed.
pub fn diff_templates(old: &TemplateSnapshot, new: &TemplateSnapshot) -> TemplateChanges {
    let mut changes = TemplateChanges::default();

    for (pattern, state) in &new.templates {
        match old.templates.get(pattern) {
            Some(prev) if prev.data != state.data => {
                changes.changed.insert(pattern.clone());
            }
            Some(_) => {}
            None => {
                changes.added.insert(pattern.clone());
            }
        }
    }

    changes.deleted = old
        .templates
        .keys()
        .filter(|pattern| !new.templates.contains_key(*pattern))
        .cloned()
        .collect();

    let old_likes: HashSet<&str> = old.templates.values().map(|s| s.like.as_str()).collect();
    changes.unfamiliar_like = new
        .templates
        .iter()
        .filter(|(_, state)| !old_likes.contains(state.like.as_str()))
        .map(|(pattern, _)| pattern.clone())
        .collect();

    report("changed template", &changes.changed);
    report("added template", &changes.added);
    report("deleted template", &changes.deleted);
    report("unfamiliar like", &changes.unfamiliar_like);
    info!(
        changed = changes.changed.len(),
        added = changes.added.len(),
        deleted = changes.deleted.len(),
        unfamiliar_like = changes.unfamiliar_like.len(),
        "compared inflection templates"
    );

    changes
}

/// Headword labels whose stem or pattern differ from the old snapshot, or
/// that have no previous entry.
pub fn diff_headwords(old: &HeadwordSnapshot, new: &HeadwordSnapshot) -> BTreeSet<String> {
    let changed: BTreeSet<String> = new
        .headwords
        .iter()
        .filter(|(label, state)| old.headwords.get(*label) != Some(*state))
        .map(|(label, _)| label.clone())
        .collect();

    report("changed headword", &changed);
    info!(changed = changed.len(), "compared headword stems and patterns");
    changed
}

fn report(kind: &str, items: &BTreeSet<String>) {
    for item in items {
        warn!("{kind}: {item}");
    }
}

/// What changed since the last completed run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeDetectionResult {
    pub templates: TemplateChanges,
    pub changed_patterns: BTreeSet<String>,
    pub changed_headwords: BTreeSet<String>,
}

impl ChangeDetectionResult {
    pub fn new(templates: TemplateChanges, changed_headwords: BTreeSet<String>) -> Self {
        Self {
            changed_patterns: templates.changed_patterns(),
            templates,
            changed_headwords,
        }
    }

    /// Force a headword to be regenerated regardless of its snapshot.
    pub fn mark_headword(&mut self, label: impl Into<String>) {
        self.changed_headwords.insert(label.into());
    }

    pub fn needs_regeneration(&self, headword: &Headword) -> bool {
        self.changed_headwords.contains(&headword.label)
            || self.changed_patterns.contains(&headword.pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.changed_patterns.is_empty() && self.changed_headwords.is_empty()
    }
}

/// Reads and writes the two snapshot files kept between runs.
#[derive(Clone, Debug)]
pub struct Tracker {
    templates_path: PathBuf,
    headwords_path: PathBuf,
}

impl Tracker {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        let dir = state_dir.as_ref();
        Self {
            templates_path: dir.join(TEMPLATES_SNAPSHOT),
            headwords_path: dir.join(HEADWORDS_SNAPSHOT),
        }
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    pub fn headwords_path(&self) -> &Path {
        &self.headwords_path
    }

    /// Diff the current inputs against the last saved snapshots.
    pub fn detect(
        &self,
        templates: &TemplateStore,
        headwords: &[Headword],
    ) -> Result<ChangeDetectionResult, SnapshotError> {
        let old_templates = TemplateSnapshot::load(&self.templates_path)?;
        let old_headwords = HeadwordSnapshot::load(&self.headwords_path)?;

        let template_changes =
            diff_templates(&old_templates, &TemplateSnapshot::capture(templates));
        let changed_headwords =
            diff_headwords(&old_headwords, &HeadwordSnapshot::capture(headwords));
        Ok(ChangeDetectionResult::new(
            template_changes,
            changed_headwords,
        ))
    }

    /// Overwrite both snapshots with the current inputs.
    pub fn save_snapshot(
        &self,
        templates: &TemplateStore,
        headwords: &[Headword],
    ) -> anyhow::Result<()> {
        TemplateSnapshot::capture(templates).save(&self.templates_path)?;
        HeadwordSnapshot::capture(headwords).save(&self.headwords_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(ending: &str, like: &str) -> TemplateState {
        TemplateState {
            data: vec![vec![vec![ending.to_string()]]],
            like: like.into(),
        }
    }

    fn templates(entries: &[(&str, TemplateState)]) -> TemplateSnapshot {
        TemplateSnapshot {
            version: SNAPSHOT_VERSION,
            templates: entries
                .iter()
                .map(|(p, s)| (p.to_string(), s.clone()))
                .collect(),
        }
    }

    fn headwords(entries: &[(&str, &str, &str)]) -> HeadwordSnapshot {
        HeadwordSnapshot {
            version: SNAPSHOT_VERSION,
            headwords: entries
                .iter()
                .map(|(label, stem, pattern)| {
                    (
                        label.to_string(),
                        HeadwordState {
                            stem: stem.to_string(),
                            pattern: pattern.to_string(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_changed_and_added_templates() {
        let old = templates(&[("a masc", state("o", "a masc")), ("i fem", state("i", "ratti"))]);
        let new = templates(&[
            ("a masc", state("o", "a masc")),
            ("i fem", state("ī", "ratti")),
            ("u masc", state("u", "a masc")),
        ]);
        let changes = diff_templates(&old, &new);
        assert_eq!(changes.changed, set(&["i fem"]));
        assert_eq!(changes.added, set(&["u masc"]));
        assert!(changes.unfamiliar_like.is_empty());
        assert_eq!(changes.changed_patterns(), set(&["i fem", "u masc"]));
    }

    #[test]
    fn deleted_templates_are_reported_but_not_changed() {
        let old = templates(&[("a masc", state("o", "a masc")), ("ī fem", state("ī", "a masc"))]);
        let new = templates(&[("a masc", state("o", "a masc"))]);
        let changes = diff_templates(&old, &new);
        assert_eq!(changes.deleted, set(&["ī fem"]));
        assert!(changes.changed_patterns().is_empty());
    }

    #[test]
    fn unfamiliar_like_flags_pattern_without_data_change() {
        let old = templates(&[("a masc", state("o", "a masc")), ("a nt", state("aṃ", "citta"))]);
        let new = templates(&[("a masc", state("o", "a masc")), ("a nt", state("aṃ", "rūpa"))]);
        let changes = diff_templates(&old, &new);
        assert!(changes.changed.is_empty());
        assert_eq!(changes.unfamiliar_like, set(&["a nt"]));
        assert_eq!(changes.changed_patterns(), set(&["a nt"]));
    }

    #[test]
    fn first_run_flags_everything() {
        let new = templates(&[("a masc", state("o", "a masc"))]);
        let changes = diff_templates(&TemplateSnapshot::default(), &new);
        assert_eq!(changes.added, set(&["a masc"]));
        assert_eq!(changes.unfamiliar_like, set(&["a masc"]));

        let hw = headwords(&[("buddha 1", "buddh", "a masc")]);
        assert_eq!(
            diff_headwords(&HeadwordSnapshot::default(), &hw),
            set(&["buddha 1"])
        );
    }

    #[test]
    fn detects_stem_and_pattern_changes() {
        let old = headwords(&[
            ("buddha 1", "buddh", "a masc"),
            ("dhamma 1", "dhamm", "a masc"),
            ("citta 1", "citt", "a nt"),
        ]);
        let new = headwords(&[
            ("buddha 1", "buddh", "a masc"),
            ("dhamma 1", "dhamm", "a nt"),
            ("citta 1", "citt!", "a nt"),
            ("rūpa 1", "rūp", "a nt"),
        ]);
        assert_eq!(
            diff_headwords(&old, &new),
            set(&["citta 1", "dhamma 1", "rūpa 1"])
        );
    }

    #[test]
    fn needs_regeneration_checks_label_and_pattern() {
        let mut result = ChangeDetectionResult::new(
            TemplateChanges {
                changed: set(&["i fem"]),
                ..TemplateChanges::default()
            },
            set(&["buddha 1"]),
        );
        let hw = |label: &str, pattern: &str| Headword {
            id: 1,
            label: label.into(),
            pos: "masc".into(),
            stem: "x".into(),
            pattern: pattern.into(),
            clean_form: "x".into(),
        };
        assert!(result.needs_regeneration(&hw("buddha 1", "a masc")));
        assert!(result.needs_regeneration(&hw("ratti", "i fem")));
        assert!(!result.needs_regeneration(&hw("dhamma 1", "a masc")));

        result.mark_headword("dhamma 1");
        assert!(result.needs_regeneration(&hw("dhamma 1", "a masc")));
    }

    #[test]
    fn snapshots_round_trip_and_reject_unknown_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join(HEADWORDS_SNAPSHOT);

        assert_eq!(HeadwordSnapshot::load(&path).unwrap(), HeadwordSnapshot::default());

        let snapshot = headwords(&[("buddha 1", "buddh", "a masc")]);
        snapshot.save(&path).unwrap();
        assert_eq!(HeadwordSnapshot::load(&path).unwrap(), snapshot);

        fs::write(&path, r#"{"version": 7, "headwords": {}}"#).unwrap();
        assert!(matches!(
            HeadwordSnapshot::load(&path),
            Err(SnapshotError::Version { found: 7, .. })
        ));

        fs::write(&path, r#"{"version": 2, "entries": [{"label": "buddha 1"}]}"#).unwrap();
        assert!(matches!(
            HeadwordSnapshot::load(&path),
            Err(SnapshotError::Version { found: 2, .. })
        ));

        fs::write(&path, r#"{"version": 1, "headwords": []}"#).unwrap();
        assert!(matches!(
            HeadwordSnapshot::load(&path),
            Err(SnapshotError::Parse { .. })
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            HeadwordSnapshot::load(&path),
            Err(SnapshotError::Parse { .. })
        ));
    }
}
