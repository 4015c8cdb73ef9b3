//! Subcommand handlers.
//!
//! | File        | Invocation                    | Description                        |
//! |-------------|-------------------------------|------------------------------------|
//! | `build.rs`  | `resrun` / `resrun build`     | Print the generated commands       |
//! | `run.rs`    | `resrun run`                  | Execute the generated commands     |
//! | `init.rs`   | `resrun init`                 | Scaffold a `resrun.toml`           |

pub mod build;
pub mod init;
pub mod run;
