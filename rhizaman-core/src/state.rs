//! The dashboard controller.
//!
//! [`AppState`] is the only place view state changes. Key presses arrive as
//! [`Action`]s and background completions as [`AppEvent`]s; both return the
//! [`Effect`]s the caller must start. Nothing here spawns work or touches git.

use crate::{
    action::Action,
    event::{AppEvent, BatchId, EventPayload},
    git::{COMMIT_MESSAGE, RepoStatus, Repository},
    ops::{BatchKind, Operation},
    workflow::{CommitFailure, CommitMode, CommitOutcome, PhaseTrigger, PostSyncCheck, SyncPhase},
};
use std::{
    collections::{BTreeSet, VecDeque},
    time::{Duration, Instant},
};

pub const NO_SELECTION_MESSAGE: &str = "No repositories selected. Use space to select.";
pub const BUSY_MESSAGE: &str = "Another operation is still running";
pub const REFRESHED_MESSAGE: &str = "Status refreshed";

/// Background work the caller must start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start one tracked task per target
    Launch {
        kind: BatchKind,
        batch: BatchId,
        targets: Vec<usize>,
    },
    /// Untracked status probe of one repository
    Probe(usize),
    /// Inspect the working tree after a successful sync
    PostSyncCheck(usize),
    Commit {
        index: usize,
        mode: CommitMode,
    },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    /// Success messages clear themselves; everything else stays until replaced
    pub expires_at: Option<Instant>,
}

/// Commit decision pending for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPrompt {
    pub repo_index: usize,
    pub repo_name: String,
    /// Full `git status` captured after the sync
    pub status_text: String,
    pub mode: CommitMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBatch {
    pub id: BatchId,
    pub kind: BatchKind,
    pub total: usize,
}

#[derive(Debug)]
pub struct AppState {
    pub repos: Vec<Repository>,
    pub statuses: Vec<RepoStatus>,
    pub phases: Vec<SyncPhase>,
    pub cursor: usize,
    pub selected: BTreeSet<usize>,
    /// Completions still expected from the active batch
    pub pending_ops: usize,
    pub active_batch: Option<ActiveBatch>,
    next_batch: u64,
    pub message: Option<StatusMessage>,
    /// The one live prompt; further prompts wait in `queued_prompts`
    pub commit_prompt: Option<CommitPrompt>,
    pub queued_prompts: VecDeque<CommitPrompt>,
    message_timeout: Duration,
}

impl AppState {
    pub fn new(repos: Vec<Repository>, message_timeout: Duration) -> Self {
        let statuses = repos.iter().map(RepoStatus::loading).collect();
        let phases = vec![SyncPhase::Idle; repos.len()];
        Self {
            repos,
            statuses,
            phases,
            cursor: 0,
            selected: BTreeSet::new(),
            pending_ops: 0,
            active_batch: None,
            next_batch: 0,
            message: None,
            commit_prompt: None,
            queued_prompts: VecDeque::new(),
            message_timeout,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_ops > 0
    }

    /// `(finished, total)` for the active batch
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.active_batch
            .map(|batch| (batch.total.saturating_sub(self.pending_ops), batch.total))
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        let always_allowed = matches!(action, Action::Quit | Action::MoveUp | Action::MoveDown);
        if !always_allowed && self.commit_prompt.is_some() != action.is_prompt_action() {
            log::debug!("ignoring {action:?} while prompt is {:?}", self.commit_prompt.is_some());
            return Vec::new();
        }

        match action {
            Action::Quit => vec![Effect::Exit],
            Action::MoveUp => {
                self.cursor = self.cursor.saturating_sub(1);
                Vec::new()
            }
            Action::MoveDown => {
                if self.cursor + 1 < self.repos.len() {
                    self.cursor += 1;
                }
                Vec::new()
            }
            Action::ToggleSelection => {
                if self.cursor < self.repos.len() && !self.selected.remove(&self.cursor) {
                    self.selected.insert(self.cursor);
                }
                Vec::new()
            }
            Action::SelectAll => {
                self.selected = (0..self.repos.len()).collect();
                Vec::new()
            }
            Action::SelectNone => {
                self.selected.clear();
                Vec::new()
            }
            Action::Refresh => self.start_batch(BatchKind::Refresh),
            Action::Pull => self.start_batch(BatchKind::Run(Operation::Pull)),
            Action::Fetch => self.start_batch(BatchKind::Run(Operation::Fetch)),
            Action::Sync => self.start_batch(BatchKind::Run(Operation::Sync)),
            Action::ChooseMode(mode) => {
                if let Some(prompt) = &mut self.commit_prompt {
                    prompt.mode = mode;
                }
                Vec::new()
            }
            Action::ConfirmCommit => self.confirm_commit(),
            Action::SkipCommit => self.skip_commit(),
        }
    }

    /// Reset the counter to the batch size and hand back the launch.
    ///
    /// Refresh targets every repository, the other kinds target the
    /// selection. A batch is refused while the previous one is outstanding.
    pub fn start_batch(&mut self, kind: BatchKind) -> Vec<Effect> {
        if self.pending_ops > 0 {
            self.set_message(BUSY_MESSAGE, MessageKind::Error);
            return Vec::new();
        }

        let targets: Vec<usize> = match kind {
            BatchKind::Refresh => (0..self.repos.len()).collect(),
            BatchKind::Run(op) => {
                if self.selected.is_empty() {
                    self.set_message(NO_SELECTION_MESSAGE, MessageKind::Error);
                    return Vec::new();
                }
                self.selected
                    .iter()
                    .copied()
                    .filter(|&i| op != Operation::Sync || !self.phases[i].is_busy())
                    .collect()
            }
        };
        if targets.is_empty() {
            self.set_message("Selected repositories are waiting on a commit decision", MessageKind::Info);
            return Vec::new();
        }

        if kind == BatchKind::Run(Operation::Sync) {
            for &index in &targets {
                self.transition(index, PhaseTrigger::SyncStarted);
            }
        }

        self.next_batch += 1;
        let id = BatchId(self.next_batch);
        self.pending_ops = targets.len();
        self.active_batch = Some(ActiveBatch {
            id,
            kind,
            total: targets.len(),
        });
        log::info!("{} {} repositories ({id:?})", kind.label(), targets.len());

        vec![Effect::Launch {
            kind,
            batch: id,
            targets,
        }]
    }

    pub fn apply_event(&mut self, event: AppEvent) -> Vec<Effect> {
        let AppEvent {
            index,
            batch,
            payload,
        } = event;
        if index >= self.repos.len() {
            log::warn!("dropping completion for unknown repository index {index}");
            return Vec::new();
        }

        let effects = match payload {
            EventPayload::StatusProbed(status) => {
                self.statuses[index] = *status;
                Vec::new()
            }
            EventPayload::OperationFinished { op, result } => {
                self.operation_finished(index, op, result)
            }
            EventPayload::PostSyncChecked(check) => self.post_sync_checked(index, check),
            EventPayload::CommitFinished(result) => self.commit_finished(index, result),
        };

        if let Some(batch) = batch {
            self.count_completion(batch);
        }
        effects
    }

    /// Clear an expired success message.
    pub fn expire_message(&mut self, now: Instant) {
        if let Some(StatusMessage {
            expires_at: Some(at),
            ..
        }) = &self.message
            && now >= *at
        {
            self.message = None;
        }
    }

    pub fn set_message(&mut self, text: impl Into<String>, kind: MessageKind) {
        let expires_at = (kind == MessageKind::Success).then(|| Instant::now() + self.message_timeout);
        let text = text.into();
        if kind == MessageKind::Error {
            log::warn!("{text}");
        }
        self.message = Some(StatusMessage {
            text,
            kind,
            expires_at,
        });
    }

    fn count_completion(&mut self, batch: BatchId) {
        let Some(active) = self.active_batch else {
            log::debug!("completion for {batch:?} with no active batch");
            return;
        };
        if active.id != batch {
            log::debug!("stale completion for {batch:?}, active is {:?}", active.id);
            return;
        }

        self.pending_ops = self.pending_ops.saturating_sub(1);
        if self.pending_ops == 0 {
            self.active_batch = None;
            if active.kind == BatchKind::Refresh {
                self.set_message(REFRESHED_MESSAGE, MessageKind::Success);
            }
        }
    }

    fn operation_finished(&mut self, index: usize, op: Operation, result: Result<(), String>) -> Vec<Effect> {
        let name = self.repos[index].name.clone();
        match (op, result) {
            (Operation::Sync, Ok(())) => {
                self.transition(index, PhaseTrigger::SyncSucceeded);
                self.set_message(format!("Synced {name}"), MessageKind::Success);
                vec![Effect::PostSyncCheck(index)]
            }
            (Operation::Sync, Err(e)) => {
                self.transition(index, PhaseTrigger::SyncFailed);
                self.set_message(format!("Error syncing {name}: {e}"), MessageKind::Error);
                vec![Effect::Probe(index)]
            }
            (op, Ok(())) => {
                self.set_message(format!("{} {name}", op.past_tense()), MessageKind::Success);
                vec![Effect::Probe(index)]
            }
            (op, Err(e)) => {
                self.set_message(format!("Error {} {name}: {e}", op.verb()), MessageKind::Error);
                vec![Effect::Probe(index)]
            }
        }
    }

    fn post_sync_checked(&mut self, index: usize, check: PostSyncCheck) -> Vec<Effect> {
        let name = self.repos[index].name.clone();
        match check {
            PostSyncCheck::NoChanges => {
                self.transition(index, PhaseTrigger::NoChanges);
                vec![Effect::Probe(index)]
            }
            PostSyncCheck::CheckFailed(e) => {
                self.transition(index, PhaseTrigger::CheckFailed);
                self.set_message(format!("Error checking {name} after sync: {e}"), MessageKind::Error);
                vec![Effect::Probe(index)]
            }
            PostSyncCheck::Changes(status_text) => {
                self.transition(index, PhaseTrigger::ChangesFound);
                let prompt = CommitPrompt {
                    repo_index: index,
                    repo_name: name,
                    status_text,
                    mode: CommitMode::default(),
                };
                if self.commit_prompt.is_none() {
                    self.commit_prompt = Some(prompt);
                } else {
                    self.queued_prompts.push_back(prompt);
                }
                Vec::new()
            }
        }
    }

    fn confirm_commit(&mut self) -> Vec<Effect> {
        let Some(prompt) = self.take_prompt() else {
            return Vec::new();
        };
        self.transition(prompt.repo_index, PhaseTrigger::Confirmed);
        self.set_message(format!("Committing {}...", prompt.repo_name), MessageKind::Info);
        vec![Effect::Commit {
            index: prompt.repo_index,
            mode: prompt.mode,
        }]
    }

    fn skip_commit(&mut self) -> Vec<Effect> {
        let Some(prompt) = self.take_prompt() else {
            return Vec::new();
        };
        self.transition(prompt.repo_index, PhaseTrigger::Skipped);
        self.set_message(format!("Skipped commit for {}", prompt.repo_name), MessageKind::Info);
        vec![Effect::Probe(prompt.repo_index)]
    }

    /// Remove the live prompt and promote the next queued one.
    fn take_prompt(&mut self) -> Option<CommitPrompt> {
        let prompt = self.commit_prompt.take();
        self.commit_prompt = self.queued_prompts.pop_front();
        prompt
    }

    fn commit_finished(&mut self, index: usize, result: Result<CommitOutcome, CommitFailure>) -> Vec<Effect> {
        self.transition(index, PhaseTrigger::CommitFinished);
        let name = self.repos[index].name.clone();
        match result {
            Ok(CommitOutcome {
                mode: CommitMode::CurrentBranch,
                ..
            }) => self.set_message(format!("Committed and pushed {name}"), MessageKind::Success),
            Ok(CommitOutcome {
                mode: CommitMode::NewPrBranch,
                branch,
            }) => self.set_message(
                format!(
                    "Created branch {branch} and pushed {name}. Create PR: gh pr create --title '{COMMIT_MESSAGE}' --body 'Sync with rhiza template'"
                ),
                MessageKind::Success,
            ),
            Err(failure) => {
                self.set_message(format!("Error committing {name}: {failure}"), MessageKind::Error);
            }
        }
        vec![Effect::Probe(index)]
    }

    fn transition(&mut self, index: usize, trigger: PhaseTrigger) {
        let current = self.phases[index];
        match current.next(trigger) {
            Some(next) => self.phases[index] = next,
            None => log::warn!("{}: ignoring {trigger:?} in phase {current:?}", self.repos[index].name),
        }
    }
}
