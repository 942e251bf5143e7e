//! Shared records for the Pāḷi lexicon inflection pipeline.
//!
//! The types here mirror what the lexical database hands us (headwords and
//! paradigm templates) and what the pipeline hands back (derived entries).
//! They carry no behaviour beyond small classification helpers so that the
//! loader, the generator and the regeneration job can all agree on them.
//!
//! Use [`Headword`] and [`PatternTemplate`] as inputs, [`DerivedEntry`] as the
//! stored result, and [`TableKind::for_pos`] to decide how a paradigm is
//! described.
//!
//! ```rust
//! use pali_types::{TableKind, strip_stem_markers};
//!
//! assert_eq!(TableKind::for_pos("masc"), TableKind::Declension);
//! assert_eq!(TableKind::for_pos("pr"), TableKind::Conjugation);
//! assert_eq!(strip_stem_markers("gacch!"), "gacch");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw paradigm grid: rows, then columns, then the endings held by one cell.
pub type Grid = Vec<Vec<Vec<String>>>;

/// Stem marker meaning "irregular: do not index stem + ending combinations".
pub const IRREGULAR_STEM_MARKER: char = '!';

/// Every marker that is removed from a stem before endings are attached.
pub const STEM_MARKERS: [char; 2] = [IRREGULAR_STEM_MARKER, '*'];

/// Stem used by indeclinables that legitimately have no pattern.
pub const INDECLINABLE_STEM: &str = "-";

/// `like` values that mark a template as irregular rather than modelled on
/// another pattern. The lexical database historically stored `irreg`.
pub const IRREGULAR_LIKE: [&str; 2] = ["irregular", "irreg"];

/// Parts of speech whose paradigms are conjugations.
pub const CONJUGATIONS: [&str; 8] = ["aor", "cond", "fut", "imp", "imperf", "opt", "perf", "pr"];

/// Parts of speech whose paradigms are declensions.
pub const DECLENSIONS: [&str; 15] = [
    "adj", "card", "cs", "fem", "letter", "masc", "nt", "ordin", "pp", "pron", "prp", "ptp",
    "root", "suffix", "ve",
];

/// One lexical entry as stored in the dictionary database.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Headword {
    pub id: u32,
    /// Unique headword text including any homonym number, e.g. `buddha 1`.
    pub label: String,
    pub pos: String,
    pub stem: String,
    /// Paradigm name; empty when no inflection table applies.
    #[serde(default)]
    pub pattern: String,
    pub clean_form: String,
}

impl Headword {
    /// Stem with every marker removed, ready for concatenation.
    pub fn working_stem(&self) -> String {
        strip_stem_markers(&self.stem)
    }

    pub fn is_irregular(&self) -> bool {
        self.stem.contains(IRREGULAR_STEM_MARKER)
    }

    pub fn has_pattern(&self) -> bool {
        !self.pattern.is_empty()
    }
}

/// A named paradigm: its grid of endings and the pattern it is modelled on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PatternTemplate {
    pub pattern: String,
    pub like: String,
    pub data: Grid,
}

impl PatternTemplate {
    pub fn is_irregular(&self) -> bool {
        IRREGULAR_LIKE.contains(&self.like.as_str())
    }
}

/// Computed inflection data for one headword.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DerivedEntry {
    pub id: u32,
    pub inflections: Vec<String>,
    #[serde(default)]
    pub html_table: String,
}

impl DerivedEntry {
    /// Comma-joined inflection list as consumed by search indexing.
    pub fn inflections_csv(&self) -> String {
        self.inflections.join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.inflections.iter().all(|form| form.is_empty())
    }
}

/// How a paradigm is described in the table heading.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TableKind {
    Conjugation,
    Declension,
    Unclassified,
}

impl TableKind {
    /// Classify a part of speech. Conjugations are checked first.
    pub fn for_pos(pos: &str) -> Self {
        if CONJUGATIONS.contains(&pos) {
            TableKind::Conjugation
        } else if DECLENSIONS.contains(&pos) {
            TableKind::Declension
        } else {
            TableKind::Unclassified
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableKind::Conjugation => "conjugation",
            TableKind::Declension => "declension",
            TableKind::Unclassified => "",
        })
    }
}

/// Remove `!` and `*` markers from a stem.
pub fn strip_stem_markers(stem: &str) -> String {
    stem.chars().filter(|c| !STEM_MARKERS.contains(c)).collect()
}
