use super::{CommandRunner, ExecError};
use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::Mutex,
};

type Script = HashMap<(Option<PathBuf>, String), VecDeque<Result<String, ExecError>>>;

/// Scripted runner for tests.
///
/// Responses are keyed by command string, optionally scoped to a working
/// directory. Queued responses are consumed in order and the last one sticks.
/// Unscripted commands succeed with empty output.
#[derive(Default)]
pub struct MockCommandRunner {
    script: Mutex<Script>,
    pub calls: Mutex<Vec<(PathBuf, String)>>,
    pub binaries: Vec<String>,
}

impl MockCommandRunner {
    pub fn with_binaries(binaries: &[&str]) -> Self {
        Self {
            binaries: binaries.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn respond(&self, command: &str, result: Result<&str, &str>) {
        self.push(None, command, result);
    }

    pub fn respond_in(&self, dir: &Path, command: &str, result: Result<&str, &str>) {
        self.push(Some(dir.to_path_buf()), command, result);
    }

    fn push(&self, dir: Option<PathBuf>, command: &str, result: Result<&str, &str>) {
        let result = result
            .map(ToString::to_string)
            .map_err(|e| ExecError::Failed(e.to_string()));
        self.script
            .lock()
            .unwrap()
            .entry((dir, command.to_string()))
            .or_default()
            .push_back(result);
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, command)| command.clone())
            .collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }
}

fn next_response(queue: &mut VecDeque<Result<String, ExecError>>) -> Option<Result<String, ExecError>> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, dir: &Path, command: &str) -> Result<String, ExecError> {
        self.calls
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), command.to_string()));

        let mut script = self.script.lock().unwrap();
        if let Some(queue) = script.get_mut(&(Some(dir.to_path_buf()), command.to_string()))
            && let Some(result) = next_response(queue)
        {
            return result;
        }
        if let Some(queue) = script.get_mut(&(None, command.to_string()))
            && let Some(result) = next_response(queue)
        {
            return result;
        }
        Ok(String::new())
    }

    fn has_binary(&self, name: &str) -> bool {
        self.binaries.iter().any(|b| b == name)
    }
}
