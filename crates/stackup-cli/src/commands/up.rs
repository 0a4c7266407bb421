use anyhow::Result;
use colored::Colorize;
use stackup_core::{Launcher, StackConfig};
use std::path::Path;
use std::process::ExitCode;

pub fn run(root: &Path) -> Result<ExitCode> {
    let config = StackConfig::load_with_env(root)?;
    tracing::debug!(environment = %config.environment.active, "config loaded");

    eprintln!("{}", "Starting backend and frontend...".bold());

    let outcome = Launcher::new(root, &config).run()?;
    tracing::debug!(
        backend_pid = ?outcome.backend_pid,
        log = %outcome.log_path.display(),
        exit_code = outcome.exit_code,
        "launch finished; backend left running"
    );
    Ok(ExitCode::from(outcome.exit_code))
}
