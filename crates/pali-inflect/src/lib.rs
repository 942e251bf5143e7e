//! Inflection tables for Pāḷi headwords.
//!
//! Given a headword, the template of its paradigm and an attested-form
//! predicate, build the HTML inflection table and the list of inflected
//! forms used for search indexing. The crate is decoupled from any loader;
//! it only depends on the shared records and the callback you supply.
//!
//! # How it works
//! 1. Normalise the raw grid into a [`Paradigm`] (titles attached to cells).
//! 2. Emit the heading sentence.
//! 3. Walk every cell; attested `stem + ending` forms render in bold, the
//!    rest are grayed out.
//! 4. Collect each distinct surface form, canonical form first.
//!
//! # Example
//! ```no_run
//! use pali_db::{AttestedForms, TemplateStore, load_headwords};
//! use pali_inflect::derive_entry;
//!
//! # fn main() -> anyhow::Result<()> {
//! let templates = TemplateStore::load("data/templates.json")?;
//! let attested = AttestedForms::load("data/all_tipitaka_words.txt")?;
//! for hw in load_headwords("data/headwords.json")? {
//!     let template = templates.get(&hw.pattern).ok();
//!     let entry = derive_entry(&hw, template, |form| attested.contains(form))?;
//!     println!("{}: {}", hw.label, entry.inflections_csv());
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p pali-inflect --example render -- <templates> <words> <headwords> <label>`.

mod paradigm;
mod render;

use pali_types::{DerivedEntry, Headword, PatternTemplate};
use thiserror::Error;

pub use paradigm::{Cell, Paradigm, ParadigmRow, TemplateError};
pub use render::{render_heading, superscript_homonym};

use render::TableWriter;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no inflection template for pattern {0:?}")]
    MissingTemplate(String),
    #[error("malformed template {pattern:?}: {source}")]
    Malformed {
        pattern: String,
        #[source]
        source: TemplateError,
    },
}

/// Rendered table plus every distinct inflected form, in first-seen order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InflectionTable {
    pub html: String,
    pub inflections: Vec<String>,
}

/// Build the heading and table for a headword from its template.
///
/// The inflection list always starts with the headword's clean form. The
/// `is_attested` callback typically delegates to `AttestedForms::contains`.
pub fn generate_table<F>(
    headword: &Headword,
    template: &PatternTemplate,
    is_attested: F,
) -> Result<InflectionTable, TemplateError>
where
    F: Fn(&str) -> bool,
{
    let paradigm = Paradigm::from_grid(&template.data)?;
    let stem = headword.working_stem();

    let mut writer = TableWriter::new(&stem, &headword.clean_form, is_attested);
    writer.write_table(&paradigm);
    let (table, inflections) = writer.finish();

    let mut html = render_heading(headword, template);
    html.push_str(&table);
    Ok(InflectionTable { html, inflections })
}

/// Produce the derived entry stored for a headword.
///
/// Patternless headwords get only their clean form and no table. Irregular
/// stems (`!`) keep the table for display, but only the clean form is
/// indexed.
pub fn derive_entry<F>(
    headword: &Headword,
    template: Option<&PatternTemplate>,
    is_attested: F,
) -> Result<DerivedEntry, GenerateError>
where
    F: Fn(&str) -> bool,
{
    if !headword.has_pattern() {
        return Ok(DerivedEntry {
            id: headword.id,
            inflections: vec![headword.clean_form.clone()],
            html_table: String::new(),
        });
    }

    let template =
        template.ok_or_else(|| GenerateError::MissingTemplate(headword.pattern.clone()))?;
    let table = generate_table(headword, template, is_attested).map_err(|source| {
        GenerateError::Malformed {
            pattern: template.pattern.clone(),
            source,
        }
    })?;

    let inflections = if headword.is_irregular() {
        vec![headword.clean_form.clone()]
    } else {
        table.inflections
    };

    Ok(DerivedEntry {
        id: headword.id,
        inflections,
        html_table: table.html,
    })
}
