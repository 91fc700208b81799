use super::ExecError;
use std::path::Path;

/// Runs external commands on behalf of probes, operations and workflows.
///
/// Every call blocks the calling worker thread until the process exits; there
/// is no timeout and no retry.
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the shell with `dir` as working directory,
    /// returning the trimmed combined output.
    fn run(&self, dir: &Path, command: &str) -> Result<String, ExecError>;

    /// Whether an executable called `name` is reachable on the search path.
    fn has_binary(&self, name: &str) -> bool;
}
