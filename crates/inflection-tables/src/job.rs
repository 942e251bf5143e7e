use std::time::Instant;

use pali_db::{AttestedForms, DerivedStore, TemplateStore, load_headwords};
use thiserror::Error;
use tracing::info;

use crate::checks::{IntegrityIssue, check_headwords};
use crate::config::{Config, ConfigError};
use crate::driver::{RegenerationPlan, Regenerator, RunReport};
use crate::tracker::{SnapshotError, Tracker};

/// Faults that stop a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("attested word list unavailable: {error:#}")]
    IndexUnavailable { error: anyhow::Error },
    #[error("failed to load {what}: {error:#}")]
    Load {
        what: &'static str,
        error: anyhow::Error,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("failed to persist {what}: {error:#}")]
    Persistence {
        what: &'static str,
        error: anyhow::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Run one regeneration job end to end.
///
/// Snapshots are written only after the derived entries have been saved, so
/// an aborted run leaves the next run's change detection unchanged.
pub fn run_job(config: &Config) -> Result<RunReport, RunError> {
    let start = Instant::now();

    let templates = TemplateStore::load(config.templates_path()).map_err(|error| {
        RunError::Load {
            what: "inflection templates",
            error,
        }
    })?;
    let headwords = load_headwords(config.headwords_path()).map_err(|error| RunError::Load {
        what: "headwords",
        error,
    })?;
    info!(
        "loaded {} templates and {} headwords",
        templates.len(),
        headwords.len()
    );

    let attested = AttestedForms::load_with_mode(&config.attested_path, config.load_mode)
        .map_err(|error| RunError::IndexUnavailable { error })?;
    info!(
        "loaded {} attested forms from {} in {} ms",
        attested.len(),
        config.attested_path.display(),
        start.elapsed().as_millis()
    );

    let mut derived = DerivedStore::open(config.derived_path()).map_err(|error| {
        RunError::Load {
            what: "derived entries",
            error,
        }
    })?;

    let tracker = Tracker::new(&config.state_dir);
    let issues = check_headwords(&headwords, &templates, &derived);

    let plan = if config.regenerate_all {
        info!("regenerating all inflection tables");
        RegenerationPlan::All
    } else {
        let mut changes = tracker.detect(&templates, &headwords)?;
        for issue in &issues {
            if let IntegrityIssue::MissingDerived { label } = issue {
                changes.mark_headword(label.clone());
            }
        }
        RegenerationPlan::Incremental(changes)
    };

    let mut report = Regenerator::new(&templates, &attested).run(&headwords, &mut derived, &plan);
    report.issues = issues;

    derived.save().map_err(|error| RunError::Persistence {
        what: "derived entries",
        error,
    })?;
    tracker
        .save_snapshot(&templates, &headwords)
        .map_err(|error| RunError::Persistence {
            what: "change snapshots",
            error,
        })?;

    if let Some(settings) = &config.settings
        && settings.regenerate_inflections()?
    {
        let mut settings = settings.clone();
        settings.reset_regenerate_inflections()?;
        info!("reset regenerate switch in {}", settings.path().display());
    }

    info!("run finished in {} ms", start.elapsed().as_millis());
    Ok(report)
}
