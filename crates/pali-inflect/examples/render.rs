use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use pali_db::{AttestedForms, LoadMode, TemplateStore, load_headwords};
use pali_inflect::derive_entry;

const USAGE: &str = "usage: cargo run -p pali-inflect --example render -- <templates.json> <words> <headwords.json> <label>";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let templates_path = args.next().map(PathBuf::from).context(USAGE)?;
    let words_path = args.next().map(PathBuf::from).context(USAGE)?;
    let headwords_path = args.next().map(PathBuf::from).context(USAGE)?;
    let label = args.next().context(USAGE)?;
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let templates = TemplateStore::load(&templates_path)
        .with_context(|| format!("loading templates from {}", templates_path.display()))?;
    let attested = AttestedForms::load_with_mode(&words_path, LoadMode::Owned)
        .with_context(|| format!("loading word list from {}", words_path.display()))?;
    let headwords = load_headwords(&headwords_path)?;

    let Some(hw) = headwords.iter().find(|hw| hw.label == label) else {
        bail!("no headword labelled {label:?}");
    };
    let entry = derive_entry(hw, templates.get(&hw.pattern).ok(), |form| {
        attested.contains(form)
    })?;

    println!("Headword: {} ({} {})", hw.label, hw.pos, hw.pattern);
    println!("Inflections: {}", entry.inflections_csv());
    println!("\n{}", entry.html_table);
    Ok(())
}
