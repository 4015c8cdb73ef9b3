//! Error type for loading a configuration and building commands from it.
//!
//! The variants fall into four groups, so the CLI can tell a user *what kind*
//! of problem they have:
//!
//! | Group      | Variants                                                  | Raised by |
//! |------------|-----------------------------------------------------------|-----------|
//! | Schema     | [`Error::Schema`]                                         | `load`    |
//! | Structural | [`Error::NoRepositories`], [`Error::NoTasks`], [`Error::MultipleDefaults`] | `load` |
//! | Reference  | [`Error::UnknownRepository`], [`Error::CopyToSelf`]       | `build`   |
//! | Lifecycle  | [`Error::NotLoaded`]                                      | `build`   |

use thiserror::Error;

use crate::config::TaskKind;

/// Everything that can go wrong between a raw document and a command list.
#[derive(Debug, Error)]
pub enum Error {
    /// The document does not match the configuration schema.
    #[error("invalid configuration: {0}")]
    Schema(#[from] toml::de::Error),

    #[error("no repositories in config")]
    NoRepositories,

    #[error("no tasks in config")]
    NoTasks,

    /// Two repositories both claim `default = true`.
    #[error("more than one default repository: '{first}' and '{second}'")]
    MultipleDefaults { first: String, second: String },

    /// A task names a repository that does not exist and no default is set.
    ///
    /// `index` is the position of the task among the tasks of its kind.
    #[error("{kind} task #{index} refers to unknown repository '{repo}'")]
    UnknownRepository {
        kind: TaskKind,
        index: usize,
        repo: String,
    },

    #[error("copy task #{index} copies repository '{repo}' onto itself")]
    CopyToSelf { index: usize, repo: String },

    /// `build` was called before any configuration was loaded.
    #[error("tried to build commands before loading a config")]
    NotLoaded,
}

impl Error {
    /// Returns `true` for load-time consistency failures (as opposed to a
    /// document that does not parse against the schema at all).
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NoRepositories | Self::NoTasks | Self::MultipleDefaults { .. }
        )
    }
}

/// Raised when a `task` discriminator or an `order` entry names no known kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown task kind '{0}'")]
pub struct UnknownTaskKind(pub String);

pub type Result<T, E = Error> = std::result::Result<T, E>;
