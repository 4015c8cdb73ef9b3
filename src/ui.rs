//! Terminal UI — spinners, per-command result lines, and captured output.
//!
//! While a command runs the user sees only a spinner and the command itself.
//! Its stdout and stderr are captured and replayed afterwards: always when it
//! fails, and on success too when the config asks for `output_logs`.

use std::{
    process::{Command, Output, Stdio},
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::runner::shell_command;

// ─── Icons ───────────────────────────────────────────────────────────────────

static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of running one generated command.
#[derive(Debug)]
pub struct StageOutcome {
    /// What was run, as shown to the user.
    pub label: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Why the stage failed, if it did.
    pub error: Option<String>,
}

impl StageOutcome {
    /// Print the one-line summary (✓/✗ + label).
    ///
    /// Captured output is replayed on failure, or always when `replay_output`
    /// is set.
    pub fn print(&self, replay_output: bool) {
        if self.success {
            println!("  {}  {}", icon_ok(), style(&self.label).bold());
            if replay_output {
                replay("stdout", &self.stdout);
                replay("stderr", &self.stderr);
            }
        } else {
            println!("  {}  {}", icon_err(), style(&self.label).bold());

            if let Some(ref msg) = self.error {
                eprintln!();
                eprintln!("  {} {}", style("Error:").red().bold(), msg);
            }
            replay("stdout", &self.stdout);
            replay("stderr", &self.stderr);
        }
    }

    pub const fn failed(&self) -> bool {
        !self.success
    }
}

fn replay(stream: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("  {} {stream}:", style("►").dim());
    for line in text.lines() {
        eprintln!("    {line}");
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    pb.set_style(spinner_style);
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── Captured execution ───────────────────────────────────────────────────────

/// Run an argument list, capturing both stdout and stderr.
///
/// Returns `(success, stdout_text, stderr_text)`.
pub fn run_captured(args: &[String]) -> Result<(bool, String, String)> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let output: Output = Command::new(prog)
        .args(rest)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status.success(), stdout, stderr))
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run a generated command string through the shell behind a spinner.
pub fn run_stage(command: &str) -> StageOutcome {
    let spinner = make_spinner(command);

    let result = run_captured(&shell_command(command));
    spinner.finish_and_clear();

    let label = command.to_string();
    match result {
        Ok((true, stdout, stderr)) => StageOutcome {
            label,
            success: true,
            stdout,
            stderr,
            error: None,
        },
        Ok((false, stdout, stderr)) => StageOutcome {
            label,
            success: false,
            stdout,
            stderr,
            error: Some(format!("command exited non-zero: {command}")),
        },
        Err(e) => StageOutcome {
            label,
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(format!("{e:#}")),
        },
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Print the final summary after the run stops.
///
/// `skipped` is the number of commands never started because an earlier one
/// failed.
pub fn print_summary(outcomes: &[StageOutcome], skipped: usize) {
    let failed: Vec<&StageOutcome> = outcomes.iter().filter(|o| o.failed()).collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style(format!("All {} commands completed successfully.", outcomes.len()))
                .cyan()
                .bold()
        );
    } else {
        eprintln!("  {}  {}", icon_err(), style("Run failed.").red().bold());
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
        if skipped > 0 {
            eprintln!("    {skipped} remaining command(s) not run");
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────
