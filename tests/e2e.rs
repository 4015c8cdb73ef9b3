//! End-to-end tests for `resrun run` against a real `restic`.
//!
//! Every test here is `#[ignore]`d so a plain `cargo test` stays green on
//! machines without restic.  Run them with:
//!
//! ```sh
//! cargo test --test e2e -- --ignored
//! ```
//!
//! # What is tested
//!
//! - A backup task creates a snapshot in the default repository.
//! - A copy task moves snapshots into a second repository.
//! - The repository password is picked up from `.env` next to the config.
//! - A failing command aborts the remaining ones.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

const BIN: &str = env!("CARGO_BIN_EXE_resrun");
const PASSWORD: &str = "resrun-e2e";

// ─── Fixture ──────────────────────────────────────────────────────────────────

/// Isolated source tree, two initialised repositories and a working dir.
struct Fixture {
    _root: tempfile::TempDir,
    pub source_dir: PathBuf,
    pub repo1: PathBuf,
    pub repo2: PathBuf,
    pub work_dir: PathBuf,
}

impl Fixture {
    fn new(test_name: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        let source_dir = root.path().join("source");
        let repo1 = root.path().join("repo1");
        let repo2 = root.path().join("repo2");
        let work_dir = root.path().join("work");

        fs::create_dir_all(source_dir.join("subdir")).unwrap();
        fs::create_dir_all(&work_dir).unwrap();
        fs::write(
            source_dir.join("hello.txt"),
            format!("hello from {test_name}"),
        )
        .unwrap();
        fs::write(source_dir.join("subdir").join("nested.txt"), "nested").unwrap();

        fs::write(
            work_dir.join(".env"),
            format!("RESTIC_PASSWORD={PASSWORD}\nRESTIC_FROM_PASSWORD={PASSWORD}\n"),
        )
        .unwrap();

        let fx = Self {
            _root: root,
            source_dir,
            repo1,
            repo2,
            work_dir,
        };
        for repo in [&fx.repo1, &fx.repo2] {
            let (ok, _, stderr) = fx.restic(repo, &["init"]);
            assert!(ok, "restic init should succeed; stderr:\n{stderr}");
        }
        fx
    }

    /// Write `resrun.toml` with both repositories followed by `tasks`.
    fn write_config(&self, extra: &str) {
        let config = format!(
            r#"
{extra}

[[repos]]
id      = "repo1"
path    = "{repo1}"
default = true

[[repos]]
id   = "repo2"
path = "{repo2}"

[[tasks]]
path = "{source}"

[[tasks]]
task    = "copy"
copy_to = "repo2"
"#,
            repo1 = self.repo1.display(),
            repo2 = self.repo2.display(),
            source = self.source_dir.display(),
        );
        fs::write(self.work_dir.join("resrun.toml"), config).unwrap();
    }

    /// Run `resrun` with `args` inside the working directory.
    fn run(&self, args: &[&str]) -> (bool, String, String) {
        let out = Command::new(BIN)
            .args(args)
            .current_dir(&self.work_dir)
            .env_remove("RESTIC_PASSWORD")
            .env_remove("RESTIC_FROM_PASSWORD")
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn {BIN}: {e}"));

        (
            out.status.success(),
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
        )
    }

    /// Run `restic` directly against `repo`.
    fn restic(&self, repo: &Path, args: &[&str]) -> (bool, String, String) {
        let out = Command::new("restic")
            .arg("-r")
            .arg(repo)
            .args(args)
            .env("RESTIC_PASSWORD", PASSWORD)
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn restic: {e}"));

        (
            out.status.success(),
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
        )
    }

    fn snapshot_count(&self, repo: &Path) -> usize {
        let (ok, stdout, _) = self.restic(repo, &["snapshots", "--json"]);
        if !ok || stdout.trim().is_empty() || stdout.trim() == "null" {
            return 0;
        }
        // One `"short_id"` per snapshot in restic's JSON listing.
        stdout.matches("\"short_id\"").count()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[ignore]
#[test]
fn backup_and_copy_populate_both_repositories() {
    let fx = Fixture::new("backup_and_copy");
    fx.write_config("");

    let (ok, _, stderr) = fx.run(&["run"]);
    assert!(ok, "run should succeed; stderr:\n{stderr}");

    assert_eq!(fx.snapshot_count(&fx.repo1), 1);
    assert_eq!(fx.snapshot_count(&fx.repo2), 1);
}

#[ignore]
#[test]
fn without_envfile_restic_has_no_password() {
    let fx = Fixture::new("no_envfile");
    fx.write_config("envfile = false");

    let (ok, _, _) = fx.run(&["run"]);
    assert!(!ok, "restic should refuse to run without a password");
    assert_eq!(fx.snapshot_count(&fx.repo1), 0);
}

#[ignore]
#[test]
fn failing_command_aborts_the_rest() {
    let fx = Fixture::new("abort");
    fx.write_config("order = [\"manual\", \"backup\", \"copy\"]");
    let mut config = fs::read_to_string(fx.work_dir.join("resrun.toml")).unwrap();
    config.push_str("\n[[tasks]]\ntask    = \"manual\"\ncommand = \"no-such-subcommand\"\n");
    fs::write(fx.work_dir.join("resrun.toml"), config).unwrap();

    let (ok, _, stderr) = fx.run(&["run"]);
    assert!(!ok);
    assert!(stderr.contains("no-such-subcommand"), "stderr:\n{stderr}");
    assert_eq!(fx.snapshot_count(&fx.repo1), 0);
}

#[ignore]
#[test]
fn dont_run_touches_nothing() {
    let fx = Fixture::new("dont_run");
    fx.write_config("dont_run = true");

    let (ok, stdout, _) = fx.run(&["run"]);
    assert!(ok);
    assert_eq!(stdout.lines().count(), 2);
    assert_eq!(fx.snapshot_count(&fx.repo1), 0);
}
