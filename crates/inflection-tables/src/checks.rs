use std::fmt;

use pali_db::{DerivedStore, TemplateStore};
use pali_types::{Headword, INDECLINABLE_STEM};
use tracing::warn;

/// Data problems found before regeneration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IntegrityIssue {
    MissingStem { label: String },
    /// Stem is not `-` yet no pattern is set.
    MissingPattern { label: String },
    UnknownPattern { label: String, pattern: String },
    /// No derived entry, or one with an empty inflection list.
    MissingDerived { label: String },
}

impl IntegrityIssue {
    pub fn label(&self) -> &str {
        match self {
            IntegrityIssue::MissingStem { label }
            | IntegrityIssue::MissingPattern { label }
            | IntegrityIssue::UnknownPattern { label, .. }
            | IntegrityIssue::MissingDerived { label } => label,
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::MissingStem { label } => write!(f, "{label} has a missing stem"),
            IntegrityIssue::MissingPattern { label } => {
                write!(f, "{label} has a missing pattern")
            }
            IntegrityIssue::UnknownPattern { label, pattern } => {
                write!(f, "{label} has unknown pattern {pattern:?}")
            }
            IntegrityIssue::MissingDerived { label } => {
                write!(f, "{label} has no inflection list")
            }
        }
    }
}

/// Check every headword against the template store and the derived entries.
pub fn check_headwords(
    headwords: &[Headword],
    templates: &TemplateStore,
    derived: &DerivedStore,
) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    for hw in headwords {
        let label = || hw.label.clone();
        if hw.stem.is_empty() {
            issues.push(IntegrityIssue::MissingStem { label: label() });
        }
        if hw.stem != INDECLINABLE_STEM && !hw.has_pattern() {
            issues.push(IntegrityIssue::MissingPattern { label: label() });
        }
        if hw.has_pattern() && !templates.contains(&hw.pattern) {
            issues.push(IntegrityIssue::UnknownPattern {
                label: label(),
                pattern: hw.pattern.clone(),
            });
        }
        if derived.get(hw.id).is_none_or(|entry| entry.is_empty()) {
            issues.push(IntegrityIssue::MissingDerived { label: label() });
        }
    }

    for issue in &issues {
        warn!("{issue}");
    }
    issues
}
