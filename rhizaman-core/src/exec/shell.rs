use super::{CommandRunner, ExecError, combined_output};
use std::{path::Path, process::Command};

pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, dir: &Path, command: &str) -> Result<String, ExecError> {
        log::debug!("exec in {}: {command}", dir.display());
        let output = Command::new("sh")
            .args(["-c", command])
            .current_dir(dir)
            .output()
            .map_err(|e| ExecError::Spawn(e.to_string()))?;

        let text = combined_output(&output.stdout, &output.stderr);
        if output.status.success() {
            Ok(text)
        } else {
            log::debug!("command failed ({}): {command}: {text}", output.status);
            Err(ExecError::Failed(text))
        }
    }

    fn has_binary(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}
