use std::collections::HashMap;

/// Process identifiers are kept as strings so every provider produces the
/// same mapping shape, whatever the width of the platform's native pid type.
pub type Pid = String;

/// One process as seen at snapshot time.
///
/// `ppid` may point at a pid that is not in the mapping (the parent exited,
/// or lives outside the visible scope); the ancestry walk treats that as a
/// dead end, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub ppid: Pid,
    /// Command-line tokens; `args[0]` is the executable path or name,
    /// possibly prefixed with `-` when the OS launched it as a login shell.
    /// Never empty for a record present in a mapping.
    pub args: Vec<String>,
}

/// Point-in-time snapshot of the visible process tree, keyed by pid.
/// Built fresh on every detection call and never mutated afterwards.
pub type ProcessMapping = HashMap<Pid, ProcessRecord>;
