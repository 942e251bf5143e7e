pub mod checks;
pub mod config;
pub mod driver;
pub mod job;
pub mod tracker;

pub use checks::{IntegrityIssue, check_headwords};
pub use config::{Args, Config, ConfigError, SettingsFile};
pub use driver::{Action, Failure, RegenerationPlan, Regenerator, RunReport};
pub use job::{RunError, run_job};
pub use tracker::{
    ChangeDetectionResult, HeadwordSnapshot, SnapshotError, TemplateChanges, TemplateSnapshot,
    Tracker, diff_headwords, diff_templates,
};
