//! `resrun` — turn a declarative backup config into restic invocations.
//!
//! # Overview
//!
//! A `resrun.toml` lists restic repositories and tasks (backup, copy, forget,
//! manual).  `resrun` resolves which repository each task talks to, and
//! produces one `restic …` command string per task in the configured order.
//! It can print those commands or execute them one after another.
//!
//! # Usage
//!
//! ```text
//! resrun                 # print the generated commands
//! resrun run             # execute them, stopping at the first failure
//! resrun init            # scaffold a resrun.toml in the current directory
//! resrun --print-config  # show the parsed config
//! ```
//!
//! # Module layout
//!
//! | Module              | Responsibility                                   |
//! |---------------------|--------------------------------------------------|
//! | [`cli`]             | Argument types parsed by clap                    |
//! | [`config`]          | Typed schema + TOML loader                       |
//! | [`builder`]         | Repository resolution and command assembly       |
//! | [`runner`]          | Quoting, global flags, shared `restic -r` prefix |
//! | [`error`]           | Load/build error type                            |
//! | [`ui`]              | Spinner, captured execution, result output       |
//! | [`commands`]        | `build`, `run` and `init` subcommands            |

mod builder;
mod cli;
mod commands;
mod config;
mod error;
mod runner;
mod ui;

use anyhow::{Context, Result};
use builder::Builder;
use clap::Parser;
use cli::{Cli, Subcommand};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    if cli.command == Some(Subcommand::Init) {
        return commands::init::run(&cli.config);
    }

    let document = config::load_document(&cli.config)?;

    if cli.print_config {
        let cfg = config::Config::from_document(document)
            .with_context(|| format!("validating {}", cli.config.display()))?;
        println!("{cfg:#?}");
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.load(document).map_err(|e| {
        let what = if e.is_structural() {
            "inconsistent"
        } else {
            "invalid"
        };
        anyhow::Error::new(e).context(format!("{what} config {}", cli.config.display()))
    })?;

    if cli.command == Some(Subcommand::Run) {
        commands::run::run(&cli, &builder)
    } else {
        commands::build::run(&builder)
    }
}
