pub mod mock;
pub mod provider;
pub mod shell;

pub use provider::CommandRunner;
pub use shell::ShellCommandRunner;

/// Failure of a single external command invocation.
///
/// The trimmed combined output is the only diagnostic available: git's
/// human-readable errors are never parsed further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The shell itself could not be started
    Spawn(String),
    /// The command ran and exited non-zero
    Failed(String),
}

impl ExecError {
    pub fn message(&self) -> &str {
        match self {
            Self::Spawn(message) | Self::Failed(message) => message,
        }
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(message) => write!(f, "failed to start shell: {message}"),
            Self::Failed(output) => write!(f, "{output}"),
        }
    }
}

impl std::error::Error for ExecError {}

/// Join stdout and stderr the way a terminal would show them and trim the result.
pub fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    let stdout = stdout.trim();
    let stderr = stderr.trim();
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, _) => stderr.to_string(),
        (false, true) => stdout.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}

/// Quote a value for interpolation into an `sh -c` command line.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '+'))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output_trims_both_streams() {
        assert_eq!(combined_output(b"  out \n", b"\n err\n"), "out\nerr");
        assert_eq!(combined_output(b"", b" fatal: nope \n"), "fatal: nope");
        assert_eq!(combined_output(b"ok\n", b""), "ok");
        assert_eq!(combined_output(b"", b""), "");
    }

    #[test]
    fn test_shell_quote_plain_values_untouched() {
        assert_eq!(shell_quote("rhiza-sync-20250101-120000"), "rhiza-sync-20250101-120000");
        assert_eq!(
            shell_quote("https://github.com/jebel-quant/rhiza.git"),
            "https://github.com/jebel-quant/rhiza.git"
        );
        assert_eq!(shell_quote("git@github.com:org/repo.git"), "git@github.com:org/repo.git");
    }

    #[test]
    fn test_shell_quote_escapes_specials() {
        assert_eq!(shell_quote("chore: rhiza manage sync"), "'chore: rhiza manage sync'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a;rm -rf /"), "'a;rm -rf /'");
    }

    #[test]
    fn test_exec_error_display_is_output() {
        let err = ExecError::Failed("fatal: not a git repository".to_string());
        assert_eq!(err.to_string(), "fatal: not a git repository");
        assert_eq!(err.message(), "fatal: not a git repository");
        let err = ExecError::Spawn("No such file or directory".to_string());
        assert!(err.to_string().starts_with("failed to start shell"));
    }
}
