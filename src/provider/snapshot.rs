//! Ancestry mapping built from a Toolhelp32 process snapshot.
//!
//! The snapshot only exposes `{pid, parent pid, executable basename}`, so
//! records carry a single-element argument vector. The full image path of a
//! matched process is resolved separately, and only for that one process.

use windows::Win32::Foundation::{
    CloseHandle, ERROR_INSUFFICIENT_BUFFER, ERROR_NO_MORE_FILES, HANDLE,
};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryFullProcessImageNameW,
};
use windows::core::PWSTR;

use crate::prelude::*;
use crate::process::{ProcessMapping, ProcessRecord};

/// Owned Win32 handle, closed on every exit path.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn utf16_until_nul(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// Build the ancestry mapping by enumerating a system-wide process snapshot.
pub fn process_mapping() -> Result<ProcessMapping> {
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map_err(Error::Snapshot)?;
    let snapshot = OwnedHandle(snapshot);

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut processes = ProcessMapping::new();
    let mut next = unsafe { Process32FirstW(snapshot.0, &mut entry) };
    loop {
        match next {
            Ok(()) => {}
            Err(err) if err.code() == ERROR_NO_MORE_FILES.to_hresult() => break,
            Err(err) => return Err(Error::Snapshot(err)),
        }
        let exe = utf16_until_nul(&entry.szExeFile);
        if !exe.is_empty() {
            let pid = entry.th32ProcessID.to_string();
            processes.insert(
                pid.clone(),
                ProcessRecord {
                    pid,
                    ppid: entry.th32ParentProcessID.to_string(),
                    args: vec![exe],
                },
            );
        }
        next = unsafe { Process32NextW(snapshot.0, &mut entry) };
    }
    debug!("snapshot yielded {} process(es)", processes.len());
    Ok(processes)
}

/// Resolve the full executable path of one process, growing the buffer on
/// `ERROR_INSUFFICIENT_BUFFER`. Returns `None` when the process cannot be
/// opened or queried (gone, or access denied).
pub fn full_image_path(pid: u32) -> Option<String> {
    let handle =
        unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }.ok()?;
    let handle = OwnedHandle(handle);

    let mut capacity = 260u32;
    loop {
        let mut buf = vec![0u16; capacity as usize];
        let mut size = capacity;
        let result = unsafe {
            QueryFullProcessImageNameW(
                handle.0,
                PROCESS_NAME_WIN32,
                PWSTR(buf.as_mut_ptr()),
                &mut size,
            )
        };
        match result {
            Ok(()) => return Some(String::from_utf16_lossy(&buf[..size as usize])),
            Err(err) if err.code() == ERROR_INSUFFICIENT_BUFFER.to_hresult() => {
                capacity *= 2;
            }
            Err(_) => return None,
        }
    }
}
