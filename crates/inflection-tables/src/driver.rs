use std::collections::HashSet;

use pali_db::{AttestedForms, DerivedStore, StoreError, TemplateStore};
use pali_inflect::{GenerateError, derive_entry};
use pali_types::{DerivedEntry, Headword};
use tracing::{debug, info, warn};

use crate::checks::IntegrityIssue;
use crate::tracker::ChangeDetectionResult;

/// Which headwords a run rebuilds.
#[derive(Clone, Debug)]
pub enum RegenerationPlan {
    /// Clear every derived entry and rebuild all headwords.
    All,
    /// Rebuild only headwords touched by the detected changes.
    Incremental(ChangeDetectionResult),
}

/// Decision for a single headword.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Full,
    Incremental,
    Skip,
}

impl RegenerationPlan {
    pub fn action_for(&self, headword: &Headword) -> Action {
        match self {
            RegenerationPlan::All => Action::Full,
            RegenerationPlan::Incremental(changes) if changes.needs_regeneration(headword) => {
                Action::Incremental
            }
            RegenerationPlan::Incremental(_) => Action::Skip,
        }
    }
}

#[derive(Debug)]
pub struct Failure {
    pub id: u32,
    pub label: String,
    pub error: GenerateError,
}

/// Outcome of one regeneration pass.
#[derive(Debug, Default)]
pub struct RunReport {
    pub regenerated: usize,
    pub skipped: usize,
    /// Derived entries removed because their headword no longer exists.
    pub pruned: usize,
    pub failures: Vec<Failure>,
    pub issues: Vec<IntegrityIssue>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rebuilds derived entries from templates and the attested-form index.
pub struct Regenerator<'a> {
    templates: &'a TemplateStore,
    attested: &'a AttestedForms,
}

impl<'a> Regenerator<'a> {
    pub fn new(templates: &'a TemplateStore, attested: &'a AttestedForms) -> Self {
        Self {
            templates,
            attested,
        }
    }

    /// Build the derived entry for one headword.
    pub fn generate(&self, headword: &Headword) -> Result<DerivedEntry, GenerateError> {
        let is_attested = |form: &str| self.attested.contains(form);
        if !headword.has_pattern() {
            return derive_entry(headword, None, is_attested);
        }
        let template = self
            .templates
            .get(&headword.pattern)
            .map_err(missing_template)?;
        derive_entry(headword, Some(template), is_attested)
    }

    /// Apply `plan` to every headword.
    ///
    /// Failures are collected rather than aborting the pass. New entries are
    /// written into `derived` together once the loop finishes; persisting the
    /// store is left to the caller.
    pub fn run(
        &self,
        headwords: &[Headword],
        derived: &mut DerivedStore,
        plan: &RegenerationPlan,
    ) -> RunReport {
        let mut report = RunReport::default();
        let mut pending = Vec::new();

        match plan {
            RegenerationPlan::All => {
                info!("clearing {} derived entries", derived.len());
                derived.clear();
            }
            RegenerationPlan::Incremental(_) => {
                report.pruned = prune_orphans(headwords, derived);
            }
        }

        for hw in headwords {
            match plan.action_for(hw) {
                Action::Skip => {
                    report.skipped += 1;
                    continue;
                }
                Action::Incremental => {
                    derived.remove(hw.id);
                }
                Action::Full => {}
            }

            match self.generate(hw) {
                Ok(entry) => {
                    debug!(
                        "regenerated {} ({} inflections)",
                        hw.label,
                        entry.inflections.len()
                    );
                    pending.push(entry);
                }
                Err(error) => {
                    warn!("failed to regenerate {} (id {}): {error}", hw.label, hw.id);
                    report.failures.push(Failure {
                        id: hw.id,
                        label: hw.label.clone(),
                        error,
                    });
                }
            }
        }

        report.regenerated = pending.len();
        for entry in pending {
            derived.insert(entry);
        }

        info!(
            regenerated = report.regenerated,
            skipped = report.skipped,
            pruned = report.pruned,
            failed = report.failures.len(),
            "regeneration pass finished"
        );
        report
    }
}

fn missing_template(err: StoreError) -> GenerateError {
    match err {
        StoreError::MissingTemplate(pattern) => GenerateError::MissingTemplate(pattern),
    }
}

/// Drop derived entries whose headword id is no longer loaded.
fn prune_orphans(headwords: &[Headword], derived: &mut DerivedStore) -> usize {
    let current: HashSet<u32> = headwords.iter().map(|hw| hw.id).collect();
    let orphans: Vec<u32> = derived
        .iter()
        .map(|entry| entry.id)
        .filter(|id| !current.contains(id))
        .collect();
    for &id in &orphans {
        derived.remove(id);
        info!("removed derived entry {id}: headword no longer exists");
    }
    orphans.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::tracker::TemplateChanges;

    fn headword(label: &str, pattern: &str) -> Headword {
        Headword {
            id: 1,
            label: label.into(),
            pos: "masc".into(),
            stem: "buddh".into(),
            pattern: pattern.into(),
            clean_form: "buddha".into(),
        }
    }

    #[test]
    fn incremental_plan_skips_untouched_headwords() {
        let changes = ChangeDetectionResult::new(
            TemplateChanges {
                added: BTreeSet::from(["i-decl".to_string()]),
                ..TemplateChanges::default()
            },
            BTreeSet::from(["buddha 1".to_string()]),
        );
        let plan = RegenerationPlan::Incremental(changes);
        assert_eq!(plan.action_for(&headword("buddha 1", "a masc")), Action::Incremental);
        assert_eq!(plan.action_for(&headword("ratti", "i-decl")), Action::Incremental);
        assert_eq!(plan.action_for(&headword("dhamma 1", "a masc")), Action::Skip);
        assert_eq!(
            RegenerationPlan::All.action_for(&headword("dhamma 1", "a masc")),
            Action::Full
        );
    }

    #[test]
    fn failures_do_not_stop_the_pass() {
        let templates = TemplateStore::default();
        let attested = AttestedForms::default();
        let dir = tempfile::tempdir().unwrap();
        let mut derived = DerivedStore::open(dir.path().join("derived.json")).unwrap();

        let mut indeclinable = headword("ca", "");
        indeclinable.id = 2;
        indeclinable.clean_form = "ca".into();
        let headwords = vec![headword("buddha 1", "a masc"), indeclinable];

        let report = Regenerator::new(&templates, &attested).run(
            &headwords,
            &mut derived,
            &RegenerationPlan::All,
        );
        assert_eq!(report.regenerated, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].label, "buddha 1");
        assert!(matches!(
            report.failures[0].error,
            GenerateError::MissingTemplate(ref p) if p == "a masc"
        ));
        assert!(!report.is_clean());
        assert_eq!(derived.get(2).unwrap().inflections, vec!["ca"]);
    }

    #[test]
    fn incremental_run_prunes_entries_without_headwords() {
        let templates = TemplateStore::default();
        let attested = AttestedForms::default();
        let dir = tempfile::tempdir().unwrap();
        let mut derived = DerivedStore::open(dir.path().join("derived.json")).unwrap();
        for id in [2, 9] {
            derived.insert(DerivedEntry {
                id,
                inflections: vec![format!("form{id}")],
                html_table: String::new(),
            });
        }

        let mut kept = headword("ca", "");
        kept.id = 2;
        let plan = RegenerationPlan::Incremental(ChangeDetectionResult::default());
        let report = Regenerator::new(&templates, &attested).run(&[kept], &mut derived, &plan);

        assert_eq!(report.pruned, 1);
        assert_eq!(report.skipped, 1);
        assert!(derived.contains(2));
        assert!(!derived.contains(9));
    }
}
