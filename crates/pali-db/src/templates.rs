use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pali_types::{Grid, PatternTemplate};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no inflection template for pattern {0:?}")]
    MissingTemplate(String),
}

/// Paradigm templates keyed by pattern name.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, PatternTemplate>,
}

#[derive(Deserialize)]
struct TemplateRecord {
    pattern: String,
    like: String,
    data: GridSource,
}

/// The database column holds the grid as JSON text; exports sometimes
/// inline it as a nested array instead.
#[derive(Deserialize)]
#[serde(untagged)]
enum GridSource {
    Inline(Grid),
    Encoded(String),
}

impl TemplateStore {
    /// Load templates from a JSON array of `{pattern, like, data}` records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let records: Vec<TemplateRecord> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse templates {}", path.display()))?;

        let mut templates = Vec::with_capacity(records.len());
        for record in records {
            let data = match record.data {
                GridSource::Inline(grid) => grid,
                GridSource::Encoded(text) => serde_json::from_str(&text)
                    .with_context(|| format!("decode grid of pattern {:?}", record.pattern))?,
            };
            templates.push(PatternTemplate {
                pattern: record.pattern,
                like: record.like,
                data,
            });
        }
        Self::from_templates(templates)
    }

    /// Build a store from already-parsed templates, rejecting duplicate names.
    pub fn from_templates(templates: impl IntoIterator<Item = PatternTemplate>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for template in templates {
            if map.contains_key(&template.pattern) {
                anyhow::bail!("duplicate inflection template {:?}", template.pattern);
            }
            map.insert(template.pattern.clone(), template);
        }
        Ok(Self { templates: map })
    }

    pub fn get(&self, pattern: &str) -> Result<&PatternTemplate, StoreError> {
        self.templates
            .get(pattern)
            .ok_or_else(|| StoreError::MissingTemplate(pattern.to_string()))
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.templates.contains_key(pattern)
    }

    /// Templates in pattern-name order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternTemplate> + '_ {
        self.templates.values()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
