//! Ancestry mapping built from `ps wwl` output.
//!
//! The output is fixed-width and space-padded, so the header row is scanned
//! once into named column spans and every data row is sliced by those spans.
//! Values may only contain embedded spaces in the final (command) column,
//! and even there single-space tokenization is best effort: `ps` offers no
//! way to recover the original argument spacing from its text output.

use std::collections::HashMap;
use std::io;
use std::process::Command;

use crate::prelude::*;
use crate::process::{ProcessMapping, ProcessRecord};

/// Half-open byte span of one column; the last column runs to end of line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnSpan {
    pub(crate) start: usize,
    pub(crate) end: Option<usize>,
}

impl ColumnSpan {
    fn slice<'a>(&self, line: &'a str) -> &'a str {
        let end = self.end.unwrap_or(line.len()).min(line.len());
        let start = self.start.min(end);
        line.get(start..end).unwrap_or("")
    }
}

/// Scan the header row into `(name, span)` pairs.
///
/// A column name accumulates over non-space characters and ends at the first
/// space after it; its span stretches from the name's starting offset to the
/// start of the next name, so padded values slice out whole.
pub(crate) fn parse_header(header: &str) -> Vec<(String, ColumnSpan)> {
    let mut columns = Vec::new();
    let mut start = 0;
    let mut name = String::new();
    for (i, c) in header.char_indices() {
        if c != ' ' {
            name.push(c);
            continue;
        }
        if !name.is_empty() {
            columns.push((
                std::mem::take(&mut name),
                ColumnSpan {
                    start,
                    end: Some(i),
                },
            ));
            start = i;
        }
    }
    if !name.is_empty() {
        columns.push((name, ColumnSpan { start, end: None }));
    }
    columns
}

/// Parse a full `ps` listing (header plus data rows) into a mapping.
///
/// Rows that do not yield all three of pid, ppid and command are skipped.
pub(crate) fn parse_output(output: &str) -> Result<ProcessMapping> {
    let mut lines = output.lines();
    let Some(header) = lines.next() else {
        return Ok(ProcessMapping::new());
    };
    let columns: HashMap<String, ColumnSpan> = parse_header(header)
        .into_iter()
        .map(|(name, span)| (name.to_lowercase(), span))
        .collect();

    let pid_col = columns.get("pid");
    let ppid_col = columns.get("ppid");
    // BSD ps says COMMAND, System V and AIX flavors say CMD.
    let cmd_col = columns.get("command").or_else(|| columns.get("cmd"));
    let (Some(pid_col), Some(ppid_col), Some(cmd_col)) = (pid_col, ppid_col, cmd_col) else {
        return Err(Error::PsHeader(header.to_string()));
    };

    let mut processes = ProcessMapping::new();
    for line in lines {
        let pid = pid_col.slice(line).trim();
        let ppid = ppid_col.slice(line).trim();
        let cmd = cmd_col.slice(line).trim();
        if pid.is_empty() || ppid.is_empty() || cmd.is_empty() {
            continue;
        }
        let args: Vec<String> = cmd.split(' ').map(|arg| arg.trim().to_owned()).collect();
        processes.insert(
            pid.to_string(),
            ProcessRecord {
                pid: pid.to_string(),
                ppid: ppid.to_string(),
                args,
            },
        );
    }
    Ok(processes)
}

/// Validate the exit status and decode stdout.
///
/// `ps` exits with 1 when the process list it was asked for is completely
/// empty; with nothing on stderr and at most a header line on stdout that
/// is a valid empty result, not a failure.
pub(crate) fn decode_output(code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Result<String> {
    let out = String::from_utf8_lossy(stdout).into_owned();
    let err = String::from_utf8_lossy(stderr);
    match code {
        Some(0) => Ok(out),
        Some(1) if err.trim().is_empty() && !out.contains('\n') => Ok(out),
        code => Err(Error::PsFailed {
            code,
            stderr: err.trim().to_string(),
        }),
    }
}

fn run_ps() -> Result<String> {
    let output = Command::new("ps").arg("wwl").output().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            Error::PsNotAvailable(err)
        } else {
            Error::Io(err)
        }
    })?;
    decode_output(output.status.code(), &output.stdout, &output.stderr)
}

/// Build the ancestry mapping by invoking the system `ps`.
pub fn process_mapping() -> Result<ProcessMapping> {
    let output = run_ps()?;
    let mapping = parse_output(&output)?;
    debug!("`ps wwl` yielded {} process(es)", mapping.len());
    Ok(mapping)
}
