use std::collections::HashSet;
use std::env;

use lazy_static::lazy_static;

lazy_static! {
    /// Executable basenames we recognize as interactive shells.
    static ref SHELL_NAMES: HashSet<&'static str> = HashSet::from([
        "sh", "bash", "dash", "ash", "csh", "tcsh", "ksh", "zsh", "fish",
        "cmd", "powershell", "pwsh", "elvish", "xonsh",
    ]);
}

pub fn is_shell_name(name: &str) -> bool {
    SHELL_NAMES.contains(name)
}

/// Environment-derived inputs the classifier needs, read once per detection
/// call and passed down explicitly.
#[derive(Debug, Clone, Default)]
pub struct ShellEnv {
    /// `$SHELL`, used to resolve the login-shell `-` marker.
    pub login_shell: Option<String>,
    /// Recognized executable extensions from `$PATHEXT`. Consulted on every
    /// platform: POSIX emulation layers on Windows export it too.
    pub pathext: Vec<String>,
}

impl ShellEnv {
    pub fn from_env() -> Self {
        let login_shell = env::var("SHELL").ok().filter(|s| !s.is_empty());
        let pathext = match env::var("PATHEXT") {
            Ok(raw) => raw
                .split(';')
                .filter(|ext| !ext.is_empty())
                .map(str::to_owned)
                .collect(),
            Err(_) => default_pathext(),
        };
        Self {
            login_shell,
            pathext,
        }
    }
}

fn default_pathext() -> Vec<String> {
    if cfg!(windows) {
        [".COM", ".EXE", ".BAT", ".CMD"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        Vec::new()
    }
}

/// Last path component, accepting either separator so basenames survive
/// POSIX-on-Windows command lines.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Strip a recognized executable extension (case-insensitive) from `name`.
pub fn strip_exec_extension<'a>(name: &'a str, pathext: &[String]) -> &'a str {
    for ext in pathext {
        if name.len() <= ext.len() {
            continue;
        }
        let split = name.len() - ext.len();
        if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(ext) {
            return &name[..split];
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use temp_env::with_var;

    use super::*;

    #[test]
    fn recognizes_common_shells() {
        for name in ["sh", "bash", "zsh", "fish", "pwsh"] {
            assert!(is_shell_name(name), "{name} should be a known shell");
        }
        assert!(!is_shell_name("vim"));
        assert!(!is_shell_name("bash.exe"));
    }

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(basename("/usr/local/bin/bash"), "bash");
        assert_eq!(basename(r"C:\Windows\System32\cmd.exe"), "cmd.exe");
        assert_eq!(basename("zsh"), "zsh");
    }

    #[test]
    fn strips_extension_case_insensitively() {
        let pathext = vec![".COM".to_string(), ".EXE".to_string()];
        assert_eq!(strip_exec_extension("bash.exe", &pathext), "bash");
        assert_eq!(strip_exec_extension("CMD.EXE", &pathext), "CMD");
        assert_eq!(strip_exec_extension("bash", &pathext), "bash");
        // Extension-only names are left alone.
        assert_eq!(strip_exec_extension(".exe", &pathext), ".exe");
        assert_eq!(strip_exec_extension("bash.exe", &[]), "bash.exe");
    }

    #[test]
    fn reads_login_shell_from_env() {
        with_var("SHELL", Some("/usr/bin/zsh"), || {
            let env = ShellEnv::from_env();
            assert_eq!(env.login_shell.as_deref(), Some("/usr/bin/zsh"));
        });
        with_var("SHELL", None::<&str>, || {
            let env = ShellEnv::from_env();
            assert_eq!(env.login_shell, None);
        });
    }

    #[test]
    fn parses_pathext_list() {
        with_var("PATHEXT", Some(".COM;.EXE;.BAT"), || {
            let env = ShellEnv::from_env();
            assert_eq!(env.pathext, vec![".COM", ".EXE", ".BAT"]);
        });
    }
}
