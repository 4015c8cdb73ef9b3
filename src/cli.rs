//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "resrun",
    about   = "Generate and run restic commands from resrun.toml",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "resrun.toml")]
    pub config: PathBuf,

    /// Subcommand to run.  Omit to print the generated commands.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// Print the parsed configuration and exit without building anything.
    #[arg(long)]
    pub print_config: bool,

    /// Print the commands `run` would execute instead of executing them.
    ///
    /// Same effect as `dont_run = true` in the config file.
    #[arg(long)]
    pub dry_run: bool,

    /// Log filter (error, warn, info, debug, trace).  `RUST_LOG` takes
    /// precedence when set.
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,
}

/// Explicit subcommands.  Running `resrun` with no subcommand is the same as
/// `resrun build`.
#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Subcommand {
    /// Print every generated restic command, one per line, in execution order.
    Build,

    /// Execute the generated commands in order, stopping at the first failure.
    ///
    /// `.env` next to the config file is loaded first when `envfile = true`,
    /// which is the usual place for `RESTIC_PASSWORD`.
    Run,

    /// Scaffold a `resrun.toml` at the `--config` path.
    ///
    /// Exits with an error if the file already exists.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("resrun").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.config, PathBuf::from("resrun.toml"));
        assert!(cli.command.is_none());
        assert!(!cli.print_config);
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn subcommands_parse() {
        assert_eq!(parse(&["build"]).command, Some(Subcommand::Build));
        assert_eq!(parse(&["run"]).command, Some(Subcommand::Run));
        assert_eq!(parse(&["init"]).command, Some(Subcommand::Init));
    }

    #[test]
    fn global_flags_before_subcommand() {
        let cli = parse(&["-c", "/etc/resrun.toml", "--dry-run", "run"]);
        assert_eq!(cli.config, PathBuf::from("/etc/resrun.toml"));
        assert!(cli.dry_run);
        assert_eq!(cli.command, Some(Subcommand::Run));
    }
}
