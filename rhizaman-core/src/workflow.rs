//! Sync → inspect → commit workflow for a single repository.
//!
//! The commit sequence is deliberately non-atomic: each [`CommitStep`] runs in
//! order, the first failure stops the sequence, and nothing that already ran is
//! undone. A failed push after a successful commit leaves the local commit (and
//! in PR mode the new branch) on disk.

use crate::{
    exec::CommandRunner,
    git::{
        ADD_ALL, COMMIT_MESSAGE, FULL_STATUS, SHORT_STATUS, SHOW_CURRENT_BRANCH,
        checkout_new_branch, commit, push,
    },
};
use chrono::{DateTime, Local};
use std::{path::Path, thread, time::Duration};

/// Per-repository position in the sync workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
    PostSyncCheck,
    AwaitingDecision,
    Committing,
}

/// What moved the workflow forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTrigger {
    SyncStarted,
    SyncSucceeded,
    SyncFailed,
    NoChanges,
    ChangesFound,
    CheckFailed,
    Confirmed,
    Skipped,
    CommitFinished,
}

impl SyncPhase {
    /// Next phase for `trigger`, or `None` when the trigger does not apply here.
    pub fn next(self, trigger: PhaseTrigger) -> Option<SyncPhase> {
        use PhaseTrigger as T;
        use SyncPhase as P;
        match (self, trigger) {
            (P::Idle, T::SyncStarted) => Some(P::Syncing),
            (P::Syncing, T::SyncSucceeded) => Some(P::PostSyncCheck),
            (P::Syncing, T::SyncFailed)
            | (P::PostSyncCheck, T::NoChanges | T::CheckFailed)
            | (P::AwaitingDecision, T::Skipped)
            | (P::Committing, T::CommitFinished) => Some(P::Idle),
            (P::PostSyncCheck, T::ChangesFound) => Some(P::AwaitingDecision),
            (P::AwaitingDecision, T::Confirmed) => Some(P::Committing),
            _ => None,
        }
    }

    pub fn is_busy(self) -> bool {
        self != SyncPhase::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    #[default]
    CurrentBranch,
    NewPrBranch,
}

/// One git invocation of the commit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStep {
    ResolveBranch,
    CreateBranch,
    Stage,
    Commit,
    Push,
}

impl CommitStep {
    /// Steps run for `mode`, in order.
    pub fn plan(mode: CommitMode) -> &'static [CommitStep] {
        match mode {
            CommitMode::CurrentBranch => &[
                CommitStep::ResolveBranch,
                CommitStep::Stage,
                CommitStep::Commit,
                CommitStep::Push,
            ],
            CommitMode::NewPrBranch => &[
                CommitStep::CreateBranch,
                CommitStep::Stage,
                CommitStep::Commit,
                CommitStep::Push,
            ],
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            CommitStep::ResolveBranch => "resolving current branch",
            CommitStep::CreateBranch => "creating branch",
            CommitStep::Stage => "git add",
            CommitStep::Commit => "git commit",
            CommitStep::Push => "git push",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub mode: CommitMode,
    pub branch: String,
}

/// A commit sequence stopped at `step`. Steps in `completed` are left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFailure {
    pub step: CommitStep,
    pub message: String,
    pub completed: Vec<CommitStep>,
}

impl std::fmt::Display for CommitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.step.describe(), self.message)
    }
}

impl std::error::Error for CommitFailure {}

/// Result of inspecting the working tree after a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostSyncCheck {
    NoChanges,
    /// Full `git status` text to show the operator
    Changes(String),
    CheckFailed(String),
}

/// Wait `settle` for the sync tool's writes to land, then look for changes.
pub fn post_sync_check(runner: &dyn CommandRunner, repo_path: &Path, settle: Duration) -> PostSyncCheck {
    if !settle.is_zero() {
        thread::sleep(settle);
    }

    let short = match runner.run(repo_path, SHORT_STATUS) {
        Ok(output) => output,
        Err(e) => return PostSyncCheck::CheckFailed(e.to_string()),
    };
    if short.trim().is_empty() {
        return PostSyncCheck::NoChanges;
    }

    // Fall back to the short listing if the long form fails
    let full = runner.run(repo_path, FULL_STATUS).unwrap_or(short);
    PostSyncCheck::Changes(full)
}

/// `<prefix>-YYYYMMDD-HHMMSS`
pub fn pr_branch_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{prefix}-{}", now.format("%Y%m%d-%H%M%S"))
}

/// Run the commit sequence for `mode`. `pr_branch` names the branch created in
/// PR mode and is ignored otherwise.
pub fn execute_commit(
    runner: &dyn CommandRunner,
    repo_path: &Path,
    mode: CommitMode,
    pr_branch: &str,
) -> Result<CommitOutcome, CommitFailure> {
    let mut branch = pr_branch.to_string();
    let mut completed = Vec::new();

    for &step in CommitStep::plan(mode) {
        let result = match step {
            CommitStep::ResolveBranch => runner
                .run(repo_path, SHOW_CURRENT_BRANCH)
                .map_err(|e| e.to_string())
                .and_then(|current| {
                    if current.is_empty() {
                        Err("HEAD is detached".to_string())
                    } else {
                        branch = current;
                        Ok(())
                    }
                }),
            CommitStep::CreateBranch => run_step(runner, repo_path, &checkout_new_branch(&branch)),
            CommitStep::Stage => run_step(runner, repo_path, ADD_ALL),
            CommitStep::Commit => run_step(runner, repo_path, &commit(COMMIT_MESSAGE)),
            CommitStep::Push => run_step(
                runner,
                repo_path,
                &push(&branch, mode == CommitMode::NewPrBranch),
            ),
        };

        if let Err(message) = result {
            log::warn!(
                "{}: commit sequence stopped at {step:?} after {completed:?}: {message}",
                repo_path.display()
            );
            return Err(CommitFailure {
                step,
                message,
                completed,
            });
        }
        completed.push(step);
    }

    Ok(CommitOutcome { mode, branch })
}

fn run_step(runner: &dyn CommandRunner, repo_path: &Path, command: &str) -> Result<(), String> {
    runner
        .run(repo_path, command)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
