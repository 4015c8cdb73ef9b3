//! Configuration types and loading logic.
//!
//! `Config` is a direct mapping of `resrun.toml`.  Unlike a plain settings
//! file, a config here *must* name at least one repository and one task, so
//! there is no "run with defaults" fallback: a missing file is an error.
//!
//! # File format
//!
//! ```toml
//! verbose      = true                     # inject `-v` into every command
//! exclude_file = "/home/alice/.excludes"  # used by backups without their own
//! order        = ["backup", "forget", "copy", "manual"]
//!
//! [[repos]]
//! id      = "local"
//! path    = "/mnt/backup/restic"
//! default = true
//!
//! [[repos]]
//! id   = "offsite"
//! path = "sftp:backup@nas:/srv/restic"
//! type = "sftp"
//!
//! [[tasks]]                               # `task` defaults to "backup"
//! path = ["/home/alice", "/etc"]
//!
//! [[tasks]]
//! task      = "forget"
//! keep_last = 3
//!
//! [[tasks]]
//! task    = "copy"
//! copy_to = "offsite"
//!
//! [[tasks]]
//! task    = "manual"
//! command = "check"
//! ```

use std::{fmt, path::Path, str::FromStr};

use anyhow::Context;
use serde::{Deserialize, Deserializer, de::Error as _};

use crate::error::{Result, UnknownTaskKind};

/// Repository id under which the repository marked `default = true` is also
/// registered.  Tasks without an explicit `repo` point here.
pub const DEFAULT_REPO: &str = "_default";

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Root configuration object, validated from a decoded TOML document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Pass `-v` to every generated restic invocation.
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// Load `.env` next to the config file before running commands.
    #[serde(default = "default_true")]
    pub envfile: bool,

    /// Replay the captured output of successful commands too, not only
    /// failing ones.
    #[serde(default = "default_true")]
    pub output_logs: bool,

    /// Print the generated commands instead of executing them.
    #[serde(default)]
    pub dont_run: bool,

    /// Exclude file for every backup task that does not set its own.
    #[serde(default)]
    pub exclude_file: Option<String>,

    /// Host name of this machine.  Not used for command generation yet.
    #[allow(dead_code)]
    #[serde(default)]
    pub hostname: Option<String>,

    /// Task kinds in execution order.  Entries that do not name a task kind
    /// are skipped when building.
    #[serde(default = "default_order")]
    pub order: Vec<String>,

    pub repos: Vec<Repository>,

    pub tasks: Vec<Task>,
}

impl Config {
    /// Validate a decoded document against the schema.
    ///
    /// Only the *shape* of the document is checked here; consistency rules
    /// that span several entries (empty lists, duplicate defaults) are
    /// enforced by [`crate::builder::Builder::load`].
    pub fn from_document(document: toml::Table) -> Result<Self> {
        Ok(toml::Value::Table(document).try_into::<Self>()?)
    }
}

// ─── [[repos]] ────────────────────────────────────────────────────────────────

/// A named restic repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub id: String,

    /// Filesystem path, or a restic backend URI (`sftp:…`, `s3:…`, `rclone:…`).
    pub path: String,

    /// Backend type.  Only `"local"` paths are normalised before quoting.
    #[serde(rename = "type", default = "default_repo_type")]
    pub kind: String,

    /// Use this repository for tasks that do not name one.
    #[serde(default)]
    pub default: bool,
}

impl Repository {
    pub fn is_local(&self) -> bool {
        self.kind == "local"
    }
}

// ─── [[tasks]] ────────────────────────────────────────────────────────────────

/// The `task` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Backup,
    Copy,
    Forget,
    Manual,
}

impl TaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Copy => "copy",
            Self::Forget => "forget",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backup" => Ok(Self::Backup),
            "copy" => Ok(Self::Copy),
            "forget" => Ok(Self::Forget),
            "manual" => Ok(Self::Manual),
            other => Err(UnknownTaskKind(other.to_string())),
        }
    }
}

/// One unit of work, tagged by its `task` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Backup(BackupTask),
    Copy(CopyTask),
    Forget(ForgetTask),
    Manual(ManualTask),
}

impl Task {
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Backup(_) => TaskKind::Backup,
            Self::Copy(_) => TaskKind::Copy,
            Self::Forget(_) => TaskKind::Forget,
            Self::Manual(_) => TaskKind::Manual,
        }
    }
}

// A task table without a `task` key is a backup, which serde's internally
// tagged enums cannot express, so the tag is read by hand.
impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = toml::Table::deserialize(deserializer)?;

        let kind = match table.get("task") {
            None => TaskKind::Backup,
            Some(toml::Value::String(name)) => name.parse().map_err(D::Error::custom)?,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`task` must be a string, found {}",
                    other.type_str()
                )));
            },
        };

        let value = toml::Value::Table(table);
        let task = match kind {
            TaskKind::Backup => value.try_into().map(Task::Backup),
            TaskKind::Copy => value.try_into().map(Task::Copy),
            TaskKind::Forget => value.try_into().map(Task::Forget),
            TaskKind::Manual => value.try_into().map(Task::Manual),
        };
        task.map_err(|e| D::Error::custom(format!("invalid {kind} task: {e}")))
    }
}

/// `path` of a backup task: a single path or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Paths {
    One(String),
    Many(Vec<String>),
}

impl Paths {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        match self {
            Self::One(path) => std::slice::from_ref(path).iter(),
            Self::Many(paths) => paths.iter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupTask {
    #[serde(default = "default_repo_ref")]
    pub repo: String,

    pub path: Paths,

    /// Overrides the top-level `exclude_file`.
    #[serde(default)]
    pub exclude_file: Option<String>,
}

/// `restic copy` from `repo` into `copy_to`.
///
/// A non-empty `snapshots` list selects exactly those snapshots and makes
/// `path` and `host` irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopyTask {
    #[serde(default = "default_repo_ref")]
    pub repo: String,

    pub copy_to: String,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub snapshots: Option<Vec<String>>,
}

/// Retention policy passed to `restic forget`.
///
/// restic selects the most recent snapshot within each window, so
/// `keep_daily = 2` keeps one snapshot from each of the last two calendar days
/// that had a backup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgetTask {
    #[serde(default = "default_repo_ref")]
    pub repo: String,

    #[serde(default)]
    pub keep_last: Option<u32>,
    #[serde(default)]
    pub keep_hourly: Option<u32>,
    #[serde(default)]
    pub keep_daily: Option<u32>,
    #[serde(default)]
    pub keep_weekly: Option<u32>,
    #[serde(default)]
    pub keep_monthly: Option<u32>,
    #[serde(default)]
    pub keep_yearly: Option<u32>,
}

impl ForgetTask {
    /// The retention counters that are set, as `(period, count)` pairs in
    /// restic's canonical order.  A count of zero keeps nothing extra and is
    /// treated as unset.
    pub fn keep_counters(&self) -> impl Iterator<Item = (&'static str, u32)> {
        [
            ("last", self.keep_last),
            ("hourly", self.keep_hourly),
            ("daily", self.keep_daily),
            ("weekly", self.keep_weekly),
            ("monthly", self.keep_monthly),
            ("yearly", self.keep_yearly),
        ]
        .into_iter()
        .filter_map(|(period, count)| count.filter(|&n| n > 0).map(|n| (period, n)))
    }
}

/// Arguments handed to restic as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManualTask {
    /// Accepted for symmetry with the other kinds; never resolved.
    #[allow(dead_code)]
    #[serde(default)]
    pub repo: Option<String>,

    pub command: String,
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

pub fn default_order() -> Vec<String> {
    ["backup", "forget", "copy", "manual"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_repo_type() -> String {
    "local".into()
}

fn default_repo_ref() -> String {
    DEFAULT_REPO.into()
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read `path` and decode it into a raw TOML table.
///
/// Schema validation happens later, in [`Config::from_document`]; this only
/// fails when the file cannot be read or is not valid TOML.
pub fn load_document(path: &Path) -> anyhow::Result<toml::Table> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
