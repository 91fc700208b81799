//! Bulk operations dispatched across the selected repositories.

use crate::{
    config::SyncConfig,
    exec::CommandRunner,
    git::{FETCH, PULL},
};
use std::path::Path;

/// Per-repository work launched by a bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Pull,
    Fetch,
    Sync,
}

impl Operation {
    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Pull => "Pulled",
            Operation::Fetch => "Fetched",
            Operation::Sync => "Synced",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Operation::Pull => "pulling",
            Operation::Fetch => "fetching",
            Operation::Sync => "syncing",
        }
    }
}

/// What a batch of tracked work does for each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Refresh,
    Run(Operation),
}

impl BatchKind {
    pub fn label(self) -> &'static str {
        match self {
            BatchKind::Refresh => "Refreshing",
            BatchKind::Run(Operation::Pull) => "Pulling",
            BatchKind::Run(Operation::Fetch) => "Fetching",
            BatchKind::Run(Operation::Sync) => "Syncing",
        }
    }
}

/// Find the template sync tool: the bare binary first, then through the wrapper.
pub fn resolve_sync_tool(runner: &dyn CommandRunner, sync: &SyncConfig) -> Result<String, String> {
    if runner.has_binary(&sync.tool) {
        return Ok(sync.tool.clone());
    }
    if runner.has_binary(&sync.tool_wrapper) {
        return Ok(format!("{} {}", sync.tool_wrapper, sync.tool));
    }
    Err(format!(
        "{tool} CLI not found. Install with: pip install {tool} or use {wrapper}",
        tool = sync.tool,
        wrapper = sync.tool_wrapper,
    ))
}

pub fn materialize_command(tool: &str) -> String {
    format!("{tool} materialize --force")
}

/// Run `op` in `repo_path`, returning the failure output on error.
pub fn run_operation(
    runner: &dyn CommandRunner,
    repo_path: &Path,
    op: Operation,
    sync: &SyncConfig,
) -> Result<(), String> {
    let command = match op {
        Operation::Pull => PULL.to_string(),
        Operation::Fetch => FETCH.to_string(),
        Operation::Sync => materialize_command(&resolve_sync_tool(runner, sync)?),
    };
    log::info!("{}: running {command}", repo_path.display());
    runner
        .run(repo_path, &command)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
