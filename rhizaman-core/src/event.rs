use crate::{
    git::RepoStatus,
    ops::Operation,
    workflow::{CommitFailure, CommitOutcome, PostSyncCheck},
};

/// Identifies one bulk operation. Completions from an older batch are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(pub u64);

/// Events that arrive asynchronously from background tasks.
/// These get merged into the main event loop alongside keyboard input.
#[derive(Debug, Clone)]
pub struct AppEvent {
    /// Index of the repository the work ran against
    pub index: usize,
    /// Batch this completion counts toward, `None` for untracked follow-up work
    pub batch: Option<BatchId>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone)]
pub enum EventPayload {
    /// A status probe finished
    StatusProbed(Box<RepoStatus>),

    /// A pull, fetch or sync finished
    OperationFinished {
        op: Operation,
        result: Result<(), String>,
    },

    /// Working tree inspected after a successful sync
    PostSyncChecked(PostSyncCheck),

    /// The commit sequence finished or stopped at a failing step
    CommitFinished(Result<CommitOutcome, CommitFailure>),
}

impl AppEvent {
    pub fn tracked(index: usize, batch: BatchId, payload: EventPayload) -> Self {
        Self {
            index,
            batch: Some(batch),
            payload,
        }
    }

    pub fn untracked(index: usize, payload: EventPayload) -> Self {
        Self {
            index,
            batch: None,
            payload,
        }
    }
}
