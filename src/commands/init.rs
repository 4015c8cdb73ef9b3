//! `resrun init` — scaffold a starter `resrun.toml`.
//!
//! The generated file backs up the current directory into a local repository
//! and prunes it with a conservative retention policy.  Everything else is
//! present as commented-out examples.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{} already exists, refusing to overwrite it",
            path.display()
        );
    }

    let cwd = std::env::current_dir().context("reading the current directory")?;
    std::fs::write(path, template(&cwd.to_string_lossy()))
        .with_context(|| format!("writing {}", path.display()))?;

    info!("wrote {}", path.display());
    println!("Created {}", path.display());
    Ok(())
}

/// Starter config backing up `source`.
pub fn template(source: &str) -> String {
    // `Value`'s Display renders a correctly escaped TOML string literal.
    let source = toml::Value::String(source.to_string());
    format!(
        r#"# resrun configuration.  Run `resrun` to see the generated commands and
# `resrun run` to execute them.  Put RESTIC_PASSWORD in a `.env` file next to
# this one.

verbose = true
# exclude_file = "/home/me/.config/restic/excludes"
# order        = ["backup", "forget", "copy", "manual"]

[[repos]]
id      = "local"
path    = "/srv/restic"
default = true

# [[repos]]
# id   = "offsite"
# path = "sftp:backup@nas:/srv/restic"
# type = "sftp"

[[tasks]]
path = {source}

[[tasks]]
task         = "forget"
keep_daily   = 7
keep_weekly  = 4
keep_monthly = 6

# [[tasks]]
# task    = "copy"
# copy_to = "offsite"

[[tasks]]
task    = "manual"
command = "check"
"#
    )
}
