use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::{LoadMode, load_file, strip_cr};

/// Every word form that occurs in the reference corpus.
///
/// Built once per run and never mutated afterwards; lookups are plain hash-set
/// membership.
#[derive(Clone, Debug, Default)]
pub struct AttestedForms {
    forms: HashSet<String>,
}

impl AttestedForms {
    /// Load a word list, memory-mapping the file.
    ///
    /// Files ending in `.json` are read as a JSON array of strings; anything
    /// else is read as one word per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a word list choosing between mmap and owned buffers at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("missing attested word list: {}", path.display());
        }
        let buffer = load_file(path, mode)?;
        let bytes = buffer.as_slice();

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let forms = if is_json {
            serde_json::from_slice::<Vec<String>>(bytes)
                .with_context(|| format!("parse word list {}", path.display()))?
                .into_iter()
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect()
        } else {
            parse_lines(bytes).with_context(|| format!("parse word list {}", path.display()))?
        };

        Ok(Self { forms })
    }

    pub fn contains(&self, form: &str) -> bool {
        self.forms.contains(form)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AttestedForms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            forms: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn parse_lines(bytes: &[u8]) -> Result<HashSet<String>> {
    let mut forms = HashSet::new();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        let word = std::str::from_utf8(line)
            .with_context(|| format!("line {} is not valid utf8", lineno + 1))?
            .trim();
        if !word.is_empty() {
            forms.insert(word.to_string());
        }
    }
    Ok(forms)
}
