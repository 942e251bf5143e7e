//! Load the lexical data the inflection pipeline works from.
//!
//! This crate reads the exported dictionary tables (headwords and paradigm
//! templates), the attested-form word list built from the canonical texts,
//! and the derived-entry table the pipeline writes back. The word list is by
//! far the largest input; callers choose between memory-mapped files or owned
//! buffers for it at runtime via [`LoadMode`].
//!
//! # Features
//! - [`TemplateStore`]: paradigm templates keyed by pattern name, accepting
//!   grids stored either as JSON arrays or as JSON-encoded strings.
//! - [`AttestedForms`]: hash-set membership oracle over every corpus word.
//! - [`DerivedStore`]: derived entries keyed by headword id, persisted with
//!   a write-then-rename so a crash never leaves a truncated file.
//!
//! # Example
//! ```no_run
//! use pali_db::{AttestedForms, LoadMode, TemplateStore, load_headwords};
//!
//! # fn main() -> anyhow::Result<()> {
//! let templates = TemplateStore::load("data/templates.json")?;
//! let attested = AttestedForms::load_with_mode("data/all_tipitaka_words.txt", LoadMode::Mmap)?;
//! for hw in load_headwords("data/headwords.json")? {
//!     if let Ok(template) = templates.get(&hw.pattern) {
//!         println!("{} is {} (like {})", hw.label, template.pattern, template.like);
//!     }
//! }
//! println!("{} attested forms", attested.len());
//! # Ok(()) }
//! ```

mod attested;
mod derived;
mod headwords;
mod templates;

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::Serialize;

pub use attested::AttestedForms;
pub use derived::DerivedStore;
pub use headwords::load_headwords;
pub use templates::{StoreError, TemplateStore};

/// Strategy for loading large input files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy while parsing).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            // Empty files cannot be mapped on every platform.
            if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// Serialize `value` as pretty JSON next to `path`, then rename it into place.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp = sibling_tmp_path(path);
    let bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} to {}", tmp.display(), path.display()))
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}
