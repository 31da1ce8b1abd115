//! Ancestry mapping built from a `/proc`-style virtual filesystem.
//!
//! Two per-process status layouts exist in the wild: Linux `stat` and the
//! BSD-family `status` (FreeBSD, NetBSD, DragonFly). The file name present
//! under `/proc/<pid>` tells them apart, and each comes with its own field
//! offsets for the parent pid and controlling terminal.

use std::fs;
use std::io;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;
use crate::process::{ProcessMapping, ProcessRecord};

const LINUX_STAT_PPID: usize = 3;
const LINUX_STAT_TTY: usize = 6;

const BSD_STAT_PPID: usize = 2;
const BSD_STAT_TTY: usize = 5;

lazy_static! {
    // The Linux comm field is parenthesized and may contain spaces, so a
    // plain whitespace split would shift every later field.
    static ref STAT_FIELD_REGEX: Regex = Regex::new(r"\(.+\)|\S+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcStyle {
    LinuxStat,
    BsdStatus,
}

impl ProcStyle {
    fn file_name(self) -> &'static str {
        match self {
            ProcStyle::LinuxStat => "stat",
            ProcStyle::BsdStatus => "status",
        }
    }

    fn ppid_index(self) -> usize {
        match self {
            ProcStyle::LinuxStat => LINUX_STAT_PPID,
            ProcStyle::BsdStatus => BSD_STAT_PPID,
        }
    }

    fn tty_index(self) -> usize {
        match self {
            ProcStyle::LinuxStat => LINUX_STAT_TTY,
            ProcStyle::BsdStatus => BSD_STAT_TTY,
        }
    }
}

/// Figure out which status layout this `/proc` speaks by probing our own
/// entry for the known file names.
fn detect_style(root: &Path) -> Result<ProcStyle> {
    let self_pid = std::process::id().to_string();
    for style in [ProcStyle::LinuxStat, ProcStyle::BsdStatus] {
        if root.join(&self_pid).join(style.file_name()).exists() {
            return Ok(style);
        }
    }
    Err(Error::ProcFormat)
}

pub(crate) fn stat_fields(contents: &str) -> Vec<&str> {
    STAT_FIELD_REGEX
        .find_iter(contents)
        .map(|m| m.as_str())
        .collect()
}

/// Read `(tty, ppid)` for one process. Both are opaque tokens compared by
/// value; we never interpret them as numbers.
fn read_stat(root: &Path, pid: &str, style: ProcStyle) -> io::Result<(String, String)> {
    let contents = fs::read_to_string(root.join(pid).join(style.file_name()))?;
    let fields = stat_fields(&contents);
    match (fields.get(style.tty_index()), fields.get(style.ppid_index())) {
        (Some(tty), Some(ppid)) => Ok((tty.to_string(), ppid.to_string())),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("short {} entry for pid {pid}", style.file_name()),
        )),
    }
}

/// Read and tokenize the NUL-separated command line of one process.
fn read_cmdline(root: &Path, pid: &str) -> io::Result<Vec<String>> {
    let raw = fs::read(root.join(pid).join("cmdline"))?;
    let text = String::from_utf8_lossy(&raw);
    let mut args: Vec<String> = text.split('\0').map(str::to_owned).collect();
    // cmdline carries a trailing NUL, which the split turns into an empty
    // final token.
    if args.last().is_some_and(String::is_empty) {
        args.pop();
    }
    Ok(args)
}

/// Build the ancestry mapping from `/proc`.
///
/// Only processes sharing our controlling terminal are candidates; anything
/// else is outside the session the shell walk cares about. Entries that
/// vanish between the directory listing and the reads are skipped.
pub fn process_mapping() -> Result<ProcessMapping> {
    process_mapping_at(Path::new("/proc"))
}

pub(crate) fn process_mapping_at(root: &Path) -> Result<ProcessMapping> {
    let style = detect_style(root)?;
    let self_pid = std::process::id().to_string();
    let (self_tty, _) = read_stat(root, &self_pid, style)?;
    debug!("reading {} entries ({style:?}, tty {self_tty})", root.display());

    let mut processes = ProcessMapping::new();
    for entry in fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name();
        let pid = name.to_string_lossy();
        if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        // The process may exit at any point between these reads; a missing
        // or unreadable entry just drops out of the mapping.
        let Ok((tty, ppid)) = read_stat(root, &pid, style) else {
            continue;
        };
        if tty != self_tty {
            continue;
        }
        let Ok(args) = read_cmdline(root, &pid) else {
            continue;
        };
        if args.is_empty() {
            // Kernel threads and zombies expose no command line.
            continue;
        }
        processes.insert(
            pid.to_string(),
            ProcessRecord {
                pid: pid.to_string(),
                ppid,
                args,
            },
        );
    }
    Ok(processes)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn tokenizes_linux_stat_with_spaced_comm() {
        let line = "1234 (tmux: server) S 1000 1234 1234 34816 1234 4194304";
        let fields = stat_fields(line);
        assert_eq!(fields[0], "1234");
        assert_eq!(fields[1], "(tmux: server)");
        assert_eq!(fields[LINUX_STAT_PPID], "1000");
        assert_eq!(fields[LINUX_STAT_TTY], "34816");
    }

    #[test]
    fn tokenizes_bsd_status_line() {
        let line = "bash 724 722 724 724 ttyv0 Is,CTTY 1611753196,0";
        let fields = stat_fields(line);
        assert_eq!(fields[BSD_STAT_PPID], "722");
        assert_eq!(fields[BSD_STAT_TTY], "ttyv0");
    }

    fn write_entry(root: &Path, pid: &str, stat: &str, cmdline: &[u8]) {
        let dir = root.join(pid);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stat"), stat).unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    #[test]
    fn builds_mapping_filtered_by_tty() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let self_pid = std::process::id().to_string();

        // Our own entry fixes both the detected style and the session tty.
        write_entry(
            root,
            &self_pid,
            &format!("{self_pid} (whichshell) S 4000 1 1 34816 1"),
            b"whichshell\0",
        );
        write_entry(
            root,
            "4000",
            "4000 (bash) S 3999 1 1 34816 1",
            b"-bash\0",
        );
        // Different terminal: excluded.
        write_entry(
            root,
            "5000",
            "5000 (zsh) S 4999 1 1 1025 1",
            b"/bin/zsh\0",
        );
        // No command line at all: kernel-thread shape, excluded.
        write_entry(root, "2", "2 (kthreadd) S 0 0 0 34816 0", b"");
        // Vanished mid-enumeration: stat readable, cmdline gone.
        let dir = root.join("6000");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stat"), "6000 (gone) S 1 1 1 34816 1").unwrap();
        // Non-numeric entries are ignored.
        fs::create_dir_all(root.join("sys")).unwrap();

        let mapping = process_mapping_at(root).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&self_pid].ppid, "4000");
        assert_eq!(mapping[&self_pid].args, vec!["whichshell"]);
        assert_eq!(mapping["4000"].args, vec!["-bash"]);
        assert!(!mapping.contains_key("5000"));
        assert!(!mapping.contains_key("6000"));
    }

    #[test]
    fn reads_bsd_status_layout() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let self_pid = std::process::id().to_string();

        let dir = root.join(&self_pid);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("status"),
            format!("whichshell {self_pid} 724 {self_pid} {self_pid} ttyv0 Is,CTTY 1,0"),
        )
        .unwrap();
        fs::write(dir.join("cmdline"), b"whichshell\0").unwrap();

        let dir = root.join("724");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("status"), "bash 724 722 724 724 ttyv0 Is,CTTY 1,0").unwrap();
        fs::write(dir.join("cmdline"), b"-bash\0").unwrap();

        let mapping = process_mapping_at(root).unwrap();
        assert_eq!(mapping["724"].ppid, "722");
        assert_eq!(mapping["724"].args, vec!["-bash"]);
    }

    #[test]
    fn unrecognized_layout_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = process_mapping_at(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::ProcFormat));
    }

    #[test]
    fn multi_token_cmdline_keeps_argument_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let self_pid = std::process::id().to_string();
        write_entry(
            root,
            &self_pid,
            &format!("{self_pid} (vim) S 1 1 1 34816 1"),
            b"/usr/bin/vim\0-R\0notes.txt\0",
        );
        let mapping = process_mapping_at(root).unwrap();
        assert_eq!(
            mapping[&self_pid].args,
            vec!["/usr/bin/vim", "-R", "notes.txt"]
        );
    }
}
