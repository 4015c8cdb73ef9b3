//! Turns a validated [`Config`] into restic command strings.
//!
//! [`Builder::load`] indexes repositories and tasks; [`Builder::build`] walks
//! the configured `order` and assembles one or more commands per task:
//!
//! | Kind     | Command                                                                       |
//! |----------|-------------------------------------------------------------------------------|
//! | `backup` | `restic -r "<repo>" [-v] backup "<path>" [--exclude-file="<file>"]` per path  |
//! | `copy`   | `restic -r "<to>" [-v] copy --from-repo "<from>" [snapshots / --path / --host]` |
//! | `forget` | `restic -r "<repo>" [-v] forget [--keep-<period> N]…`                         |
//! | `manual` | `restic <command>`                                                            |

use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    config::{
        BackupTask, Config, CopyTask, DEFAULT_REPO, ForgetTask, ManualTask, Repository, Task,
        TaskKind,
    },
    error::{Error, Result},
    runner::{RESTIC, global_flags, quote_path, quote_repo, restic_base},
};

/// Loads configurations and builds command lists from them.
#[derive(Debug, Default)]
pub struct Builder {
    loaded: Option<Loaded>,
}

/// Everything derived from one successful load.  Replaced as a whole on the
/// next load, never patched.
#[derive(Debug)]
struct Loaded {
    config: Config,
    /// Keyed by repository id, plus [`DEFAULT_REPO`] for the default one.
    repos: HashMap<String, Repository>,
    /// Tasks grouped by kind, in document order within each kind.
    tasks: HashMap<TaskKind, Vec<Task>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `document` and index it, replacing any previous state.
    ///
    /// On error the builder is left unloaded.
    pub fn load(&mut self, document: toml::Table) -> Result<()> {
        self.loaded = None;
        let config = Config::from_document(document)?;
        self.load_config(config)
    }

    /// Index an already validated configuration, replacing any previous state.
    pub fn load_config(&mut self, config: Config) -> Result<()> {
        self.loaded = None;
        self.loaded = Some(Loaded::index(config)?);
        Ok(())
    }

    /// The configuration from the last successful load.
    pub fn config(&self) -> Option<&Config> {
        self.loaded.as_ref().map(|l| &l.config)
    }

    /// Generate every command, in execution order.
    ///
    /// Fails with [`Error::NotLoaded`] before a successful [`load`](Self::load).
    /// Any unresolvable reference aborts the whole build.
    pub fn build(&self) -> Result<Vec<String>> {
        self.loaded.as_ref().ok_or(Error::NotLoaded)?.build()
    }
}

/// Look up `repo_ref`, falling back to the default repository.
fn resolve<'a>(repos: &'a HashMap<String, Repository>, repo_ref: &str) -> Option<&'a Repository> {
    repos.get(repo_ref).or_else(|| repos.get(DEFAULT_REPO))
}

impl Loaded {
    fn index(config: Config) -> Result<Self> {
        if config.repos.is_empty() {
            return Err(Error::NoRepositories);
        }
        if config.tasks.is_empty() {
            return Err(Error::NoTasks);
        }

        let mut repos: HashMap<String, Repository> = HashMap::new();
        for repo in &config.repos {
            if repo.default {
                if let Some(first) = repos.get(DEFAULT_REPO) {
                    return Err(Error::MultipleDefaults {
                        first: first.id.clone(),
                        second: repo.id.clone(),
                    });
                }
                repos.insert(DEFAULT_REPO.to_string(), repo.clone());
            }
            repos.insert(repo.id.clone(), repo.clone());
        }

        let mut tasks: HashMap<TaskKind, Vec<Task>> = HashMap::new();
        for task in &config.tasks {
            tasks.entry(task.kind()).or_default().push(task.clone());
        }

        debug!(
            "indexed {} repositories and {} tasks",
            config.repos.len(),
            config.tasks.len()
        );

        Ok(Self {
            config,
            repos,
            tasks,
        })
    }

    fn build(&self) -> Result<Vec<String>> {
        let mut commands = Vec::new();

        for name in &self.config.order {
            let kind = match name.parse::<TaskKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("skipping `order` entry: {e}");
                    continue;
                },
            };
            let Some(tasks) = self.tasks.get(&kind) else {
                continue;
            };

            for (index, task) in tasks.iter().enumerate() {
                match task {
                    Task::Backup(t) => commands.extend(self.build_backup(index, t)?),
                    Task::Copy(t) => commands.push(self.build_copy(index, t)?),
                    Task::Forget(t) => commands.push(self.build_forget(index, t)?),
                    Task::Manual(t) => commands.push(Self::build_manual(t)),
                }
            }
        }

        for cmd in &commands {
            debug!("generated: {cmd}");
        }
        Ok(commands)
    }

    fn resolve(&self, kind: TaskKind, index: usize, repo_ref: &str) -> Result<&Repository> {
        resolve(&self.repos, repo_ref).ok_or_else(|| Error::UnknownRepository {
            kind,
            index,
            repo: repo_ref.to_string(),
        })
    }

    // ─── Per-kind assembly ────────────────────────────────────────────────────

    /// One command per path, identical apart from the path.
    fn build_backup(&self, index: usize, task: &BackupTask) -> Result<Vec<String>> {
        let repo = self.resolve(TaskKind::Backup, index, &task.repo)?;
        let flags = global_flags(&self.config);

        let exclude_file = task
            .exclude_file
            .as_deref()
            .or(self.config.exclude_file.as_deref());

        Ok(task
            .path
            .iter()
            .map(|path| {
                let mut cmd = restic_base(repo, &flags);
                cmd.push("backup".into());
                cmd.push(quote_path(path));
                if let Some(file) = exclude_file {
                    cmd.push(format!("--exclude-file={}", quote_path(file)));
                }
                cmd.join(" ")
            })
            .collect())
    }

    /// The destination is looked up by exact id only: copying somewhere must
    /// always be spelled out.
    fn build_copy(&self, index: usize, task: &CopyTask) -> Result<String> {
        let source = self.resolve(TaskKind::Copy, index, &task.repo)?;
        let target = self
            .repos
            .get(&task.copy_to)
            .ok_or_else(|| Error::UnknownRepository {
                kind: TaskKind::Copy,
                index,
                repo: task.copy_to.clone(),
            })?;

        if source.id == target.id {
            return Err(Error::CopyToSelf {
                index,
                repo: source.id.clone(),
            });
        }

        let mut cmd = restic_base(target, &global_flags(&self.config));
        cmd.extend(["copy".into(), "--from-repo".into(), quote_repo(source)]);

        match task.snapshots.as_deref() {
            Some(snapshots) if !snapshots.is_empty() => cmd.extend_from_slice(snapshots),
            _ => {
                if let Some(path) = &task.path {
                    cmd.extend(["--path".into(), quote_path(path)]);
                }
                if let Some(host) = &task.host {
                    cmd.extend(["--host".into(), format!("\"{host}\"")]);
                }
            },
        }

        Ok(cmd.join(" "))
    }

    fn build_forget(&self, index: usize, task: &ForgetTask) -> Result<String> {
        let repo = self.resolve(TaskKind::Forget, index, &task.repo)?;

        let mut cmd = restic_base(repo, &global_flags(&self.config));
        cmd.push("forget".into());
        for (period, count) in task.keep_counters() {
            cmd.push(format!("--keep-{period}"));
            cmd.push(count.to_string());
        }

        Ok(cmd.join(" "))
    }

    fn build_manual(task: &ManualTask) -> String {
        format!("{RESTIC} {}", task.command)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
