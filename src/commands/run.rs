//! `resrun run` — execute the generated commands in order.
//!
//! Each command runs behind a spinner with its output captured.  The first
//! failure prints the captured output, then the summary, and aborts the rest
//! of the run.
//!
//! With `dont_run = true` in the config (or `--dry-run`) the commands are
//! printed exactly like `resrun build` would.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    builder::Builder,
    cli::Cli,
    commands::build::write_commands,
    ui::{StageOutcome, print_summary, run_stage},
};

pub fn run(cli: &Cli, builder: &Builder) -> Result<()> {
    let cfg = builder.config().context("no configuration loaded")?;
    let commands = builder.build()?;

    if cli.dry_run || cfg.dont_run {
        info!("dry run, not executing {} commands", commands.len());
        return write_commands(&mut std::io::stdout().lock(), &commands);
    }

    if cfg.envfile {
        load_envfile(&envfile_path(&cli.config))?;
    }

    println!();

    let total = commands.len();
    let mut outcomes: Vec<StageOutcome> = Vec::with_capacity(total);
    for (i, cmd) in commands.iter().enumerate() {
        info!("running {}/{total}: {cmd}", i + 1);
        let outcome = run_stage(cmd);
        outcome.print(cfg.output_logs);
        let failed = outcome.failed();
        outcomes.push(outcome);

        if failed {
            print_summary(&outcomes, total - i - 1);
            anyhow::bail!("run aborted: command {} of {total} failed", i + 1);
        }
    }

    print_summary(&outcomes, 0);
    Ok(())
}

/// `.env` in the same directory as the config file.
pub fn envfile_path(config: &Path) -> PathBuf {
    config.parent().unwrap_or_else(|| Path::new(".")).join(".env")
}

/// Load `path` into the process environment if it exists.
///
/// Variables already set in the environment win.  Returns whether a file was
/// loaded.
pub fn load_envfile(path: &Path) -> Result<bool> {
    if !path.exists() {
        debug!("no env file at {}", path.display());
        return Ok(false);
    }

    dotenvy::from_path(path).with_context(|| format!("loading {}", path.display()))?;
    info!("loaded environment from {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn envfile_sits_next_to_config() {
        assert_eq!(
            envfile_path(Path::new("/etc/resrun/resrun.toml")),
            PathBuf::from("/etc/resrun/.env")
        );
        assert_eq!(envfile_path(Path::new("resrun.toml")), PathBuf::from(".env"));
    }

    #[test]
    fn missing_envfile_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_envfile(&dir.path().join(".env")).unwrap());
    }

    #[test]
    fn envfile_populates_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "RESRUN_TEST_ENVFILE_VAR=hello\n").unwrap();

        assert!(load_envfile(&path).unwrap());
        assert_eq!(std::env::var("RESRUN_TEST_ENVFILE_VAR").unwrap(), "hello");
    }

    #[test]
    fn malformed_envfile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "THIS LINE IS NOT AN ASSIGNMENT\n").unwrap();

        assert!(load_envfile(&path).is_err());
    }
}
