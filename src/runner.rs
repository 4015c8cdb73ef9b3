//! Command string construction helpers.
//!
//! The pieces every restic invocation shares: the executable name, the quoted
//! `-r <repo>` argument and the global flags.  Nothing here executes a
//! process; see [`crate::ui`] for that.
//!
//! # Quoting
//!
//! Paths are normalised with the platform's path rules (repeated and trailing
//! separators dropped, `\` on Windows) and wrapped in double quotes.  Nothing
//! else is escaped: a path containing `"` produces a broken command.

use std::path::{Path, PathBuf};

use crate::config::{Config, Repository};

/// argv\[0] of every generated command.
pub const RESTIC: &str = "restic";

// ─── Quoting ──────────────────────────────────────────────────────────────────

/// Normalise `path` and wrap it in double quotes.
pub fn quote_path(path: &str) -> String {
    let normalised: PathBuf = Path::new(path).components().collect();
    format!("\"{}\"", normalised.display())
}

/// Quote a repository location.
///
/// Non-local repositories are backend URIs (`s3:https://…`) where collapsing
/// `//` would change the meaning, so they are quoted verbatim.
pub fn quote_repo(repo: &Repository) -> String {
    if repo.is_local() {
        quote_path(&repo.path)
    } else {
        format!("\"{}\"", repo.path)
    }
}

// ─── Global flags ─────────────────────────────────────────────────────────────

/// Flags inserted right after `-r <repo>` in every repository-bound command.
pub fn global_flags(cfg: &Config) -> Vec<String> {
    let mut flags = Vec::new();
    if cfg.verbose {
        flags.push("-v".into());
    }
    flags
}

// ─── restic base command ──────────────────────────────────────────────────────

/// Builds the tokens shared by every repository-bound invocation:
///
/// ```text
/// restic  -r "<repo.path>"  [global flags]
/// ```
///
/// Callers append the verb and its arguments, then join with spaces.
pub fn restic_base(repo: &Repository, flags: &[String]) -> Vec<String> {
    let mut cmd = vec![RESTIC.to_string(), "-r".into(), quote_repo(repo)];
    cmd.extend_from_slice(flags);
    cmd
}

// ─── Shell ────────────────────────────────────────────────────────────────────

/// Argument list that runs a generated command string through the platform
/// shell, which takes care of the double-quoted paths.
pub fn shell_command(command: &str) -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".into(), "/C".into(), command.into()]
    } else {
        vec!["sh".into(), "-c".into(), command.into()]
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
