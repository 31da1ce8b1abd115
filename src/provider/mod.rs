//! Strategies for producing an ancestry mapping, one per OS data source.

#[cfg(unix)]
pub mod proc_fs;
#[cfg(unix)]
pub mod ps;
#[cfg(windows)]
pub mod snapshot;

use std::fs;
use std::path::Path;

use cfg_if::cfg_if;

use crate::prelude::*;
use crate::process::ProcessMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `/proc`-style virtual filesystem.
    VirtualFs,
    /// Tabular `ps` output.
    TabularCommand,
    /// Windows Toolhelp32 process snapshot.
    NativeSnapshot,
}

/// Pure selection over the platform and the probe result: Windows always
/// takes the native snapshot; elsewhere prefer `/proc` when it is mounted
/// and populated, otherwise fall back to `ps`.
pub fn select_provider(proc_is_populated: bool) -> ProviderKind {
    if cfg!(windows) {
        ProviderKind::NativeSnapshot
    } else if proc_is_populated {
        ProviderKind::VirtualFs
    } else {
        ProviderKind::TabularCommand
    }
}

/// Does `root` exist as a directory with at least one entry? `/proc` can be
/// present but unmounted, in which case it lists empty.
pub fn probe_proc(root: &Path) -> bool {
    fs::read_dir(root).is_ok_and(|mut entries| entries.next().is_some())
}

/// Select a provider for this host and produce the ancestry mapping.
pub fn produce_mapping() -> Result<ProcessMapping> {
    let kind = select_provider(probe_proc(Path::new("/proc")));
    debug!("using ancestry provider {kind:?}");
    cfg_if! {
        if #[cfg(unix)] {
            match kind {
                ProviderKind::VirtualFs => proc_fs::process_mapping(),
                ProviderKind::TabularCommand => ps::process_mapping(),
                ProviderKind::NativeSnapshot => Err(Error::UnsupportedPlatform),
            }
        } else if #[cfg(windows)] {
            match kind {
                ProviderKind::NativeSnapshot => snapshot::process_mapping(),
                _ => Err(Error::UnsupportedPlatform),
            }
        } else {
            let _ = kind;
            Err(Error::UnsupportedPlatform)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[cfg(unix)]
    #[test]
    fn selects_proc_when_populated() {
        assert_eq!(select_provider(true), ProviderKind::VirtualFs);
        assert_eq!(select_provider(false), ProviderKind::TabularCommand);
    }

    #[cfg(windows)]
    #[test]
    fn always_selects_snapshot_on_windows() {
        assert_eq!(select_provider(true), ProviderKind::NativeSnapshot);
        assert_eq!(select_provider(false), ProviderKind::NativeSnapshot);
    }

    #[test]
    fn probe_requires_a_non_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(!probe_proc(tmp.path()));
        assert!(!probe_proc(&tmp.path().join("missing")));

        fs::create_dir(tmp.path().join("1")).unwrap();
        assert!(probe_proc(tmp.path()));
    }
}
