use thiserror::Error;

/// Everything that can go wrong while looking for the shell.
///
/// `ShellNotFound` is the "ran fine but found nothing" outcome; the other
/// variants mean detection could not run at all in this environment.
#[derive(Debug, Error)]
pub enum Error {
    #[error("shell detection is not implemented for this platform")]
    UnsupportedPlatform,

    #[error("no shell found within {0} ancestor(s)")]
    ShellNotFound(usize),

    #[error("unsupported /proc format: neither `stat` nor `status` is present")]
    ProcFormat,

    #[error("`ps` is not available on this system")]
    PsNotAvailable(#[source] std::io::Error),

    #[error("`ps` exited with code {code:?}: {stderr}")]
    PsFailed { code: Option<i32>, stderr: String },

    #[error("unrecognized `ps` header: {0:?}")]
    PsHeader(String),

    #[cfg(windows)]
    #[error("process snapshot failed")]
    Snapshot(#[source] windows::core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
