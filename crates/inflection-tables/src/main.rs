use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use inflection_tables::{Args, Config, run_job};

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let config = Config::from_args(Args::parse())?;
    info!("using data at {}", config.data_dir.display());
    info!(
        "using attested forms at {} (mode: {:?})",
        config.attested_path.display(),
        config.load_mode
    );
    info!("using snapshots at {}", config.state_dir.display());

    let report = match run_job(&config) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    for failure in &report.failures {
        warn!("{} (id {}): {}", failure.label, failure.id, failure.error);
    }
    info!(
        "{} regenerated, {} unchanged, {} pruned, {} failed, {} data issues",
        report.regenerated,
        report.skipped,
        report.pruned,
        report.failures.len(),
        report.issues.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
