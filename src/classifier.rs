use crate::prelude::*;
use crate::process::{Pid, ProcessMapping};
use crate::shell::{ShellEnv, basename, is_shell_name, strip_exec_extension};

/// A shell located somewhere up the ancestry chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellMatch {
    /// Pid of the matched process.
    pub pid: Pid,
    /// Lower-cased shell basename, extension stripped (e.g. `bash`).
    pub name: String,
    /// The matched `args[0]` as-is, or the resolved `$SHELL` value for a
    /// login shell.
    pub cmd: String,
}

/// Walk up the parent links from `start_pid`, at most `max_depth` hops,
/// looking for a known shell.
///
/// The depth bound is the only cycle guard: even a corrupt mapping with a
/// parent loop terminates within `max_depth` steps. A `start_pid` absent
/// from the mapping is simply "not found", not an error.
pub fn classify(
    mapping: &ProcessMapping,
    start_pid: &str,
    max_depth: usize,
    env: &ShellEnv,
) -> Option<ShellMatch> {
    let mut pid = start_pid.to_string();
    for depth in 0..max_depth {
        let Some(proc) = mapping.get(&pid) else {
            debug!("pid {pid} not in mapping, stopping at depth {depth}");
            return None;
        };
        let Some(argv0) = proc.args.first() else {
            // Providers never insert empty argument vectors; bail if one did.
            return None;
        };
        // The login-shell marker wins over a plain name match: a marked
        // argv[0] like `-/usr/local/bin/bash` would otherwise match on its
        // basename and leak the marker into the returned path.
        if let Some(stripped) = argv0.strip_prefix('-') {
            // Prefer $SHELL: it carries the real path, while argv[0] only
            // holds whatever the OS put after the marker.
            let cmd = match &env.login_shell {
                Some(shell) => shell.clone(),
                None => stripped.to_string(),
            };
            let name = basename(&cmd).to_lowercase();
            return Some(ShellMatch {
                pid: proc.pid.clone(),
                name,
                cmd,
            });
        }
        let name = strip_exec_extension(basename(argv0), &env.pathext).to_lowercase();
        trace!("depth {depth}: pid {pid} runs {name:?}");
        if is_shell_name(&name) {
            return Some(ShellMatch {
                pid: proc.pid.clone(),
                name,
                cmd: argv0.clone(),
            });
        }
        pid = proc.ppid.clone();
    }
    None
}
