//! Detect the interactive shell that launched the current process.
//!
//! Detection walks the operating system's process ancestry upward from a
//! starting pid until a recognizable shell executable is found or a depth
//! limit is reached. Each call builds a fresh snapshot of the visible
//! process tree from the best source the host offers (`/proc`, `ps`, or a
//! Windows process snapshot) and runs a bounded classification walk over it.
//!
//! ```no_run
//! let shell = whichshell::detect_shell(None, whichshell::DEFAULT_MAX_DEPTH)?;
//! println!("{} at {}", shell.name, shell.path);
//! # Ok::<(), whichshell::Error>(())
//! ```

mod classifier;
mod error;
mod prelude;
mod process;
pub mod provider;
mod shell;

use cfg_if::cfg_if;

pub use classifier::{ShellMatch, classify};
pub use error::{Error, Result};
pub use process::{Pid, ProcessMapping, ProcessRecord};
pub use shell::ShellEnv;

use crate::prelude::*;

/// How many ancestors to inspect before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// The detected shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInfo {
    /// Lower-cased shell basename, e.g. `zsh`.
    pub name: String,
    /// Path or executable string the shell was matched from.
    pub path: String,
}

/// Detect the shell that `pid` (default: the current process) is running in.
///
/// Fails with [`Error::ShellNotFound`] when no known shell appears within
/// `max_depth` ancestors, and [`Error::UnsupportedPlatform`] when no
/// ancestry provider exists for the host OS.
pub fn detect_shell(pid: Option<Pid>, max_depth: usize) -> Result<ShellInfo> {
    cfg_if! {
        if #[cfg(unix)] {
            let start = pid.unwrap_or_else(|| std::process::id().to_string());
            let mapping = provider::produce_mapping()?;
            let env = ShellEnv::from_env();
            debug!("walking ancestry from pid {start} (max depth {max_depth})");
            match classify(&mapping, &start, max_depth, &env) {
                Some(found) => Ok(ShellInfo {
                    name: found.name,
                    path: found.cmd,
                }),
                None => Err(Error::ShellNotFound(max_depth)),
            }
        } else if #[cfg(windows)] {
            let mapping = provider::produce_mapping()?;
            // The current executable is never a shell; without an explicit
            // pid, start the walk at our parent.
            let current = std::process::id().to_string();
            let start = pid.unwrap_or_else(|| {
                mapping
                    .get(&current)
                    .map(|proc| proc.ppid.clone())
                    .unwrap_or(current)
            });
            let env = ShellEnv::from_env();
            debug!("walking ancestry from pid {start} (max depth {max_depth})");
            match classify(&mapping, &start, max_depth, &env) {
                Some(found) => {
                    // Upgrade the snapshot basename to the full image path
                    // when the process is still around to be queried.
                    let path = found
                        .pid
                        .parse::<u32>()
                        .ok()
                        .and_then(provider::snapshot::full_image_path)
                        .unwrap_or(found.cmd);
                    Ok(ShellInfo {
                        name: found.name,
                        path,
                    })
                }
                None => Err(Error::ShellNotFound(max_depth)),
            }
        } else {
            let _ = (pid, max_depth);
            Err(Error::UnsupportedPlatform)
        }
    }
}
