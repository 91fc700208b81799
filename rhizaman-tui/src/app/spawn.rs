use chrono::Local;
use rhizaman_core::{
    config::SyncConfig,
    event::{AppEvent, BatchId, EventPayload},
    exec::CommandRunner,
    git::{Repository, probe_status},
    ops::{BatchKind, Operation, run_operation},
    state::Effect,
    workflow::{CommitMode, execute_commit, post_sync_check, pr_branch_name},
};
use std::{path::PathBuf, sync::Arc, thread};

use super::EventSender;

/// Starts the background work the controller asks for.
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    sender: EventSender,
    sync: SyncConfig,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>, sender: EventSender, sync: SyncConfig) -> Self {
        Self {
            runner,
            sender,
            sync,
        }
    }

    /// Start every effect. Returns true when the controller asked to exit.
    pub fn execute(&self, effects: Vec<Effect>, repos: &[Repository]) -> bool {
        let mut exit = false;
        for effect in effects {
            match effect {
                Effect::Launch {
                    kind,
                    batch,
                    targets,
                } => {
                    for index in targets {
                        if let Some(repo) = repos.get(index) {
                            self.spawn_task(kind, index, Some(batch), repo);
                        }
                    }
                }
                Effect::Probe(index) => {
                    if let Some(repo) = repos.get(index) {
                        self.spawn_task(BatchKind::Refresh, index, None, repo);
                    }
                }
                Effect::PostSyncCheck(index) => {
                    if let Some(repo) = repos.get(index) {
                        self.spawn_post_sync_check(index, repo.path.clone());
                    }
                }
                Effect::Commit { index, mode } => {
                    if let Some(repo) = repos.get(index) {
                        self.spawn_commit(index, repo.path.clone(), mode);
                    }
                }
                Effect::Exit => exit = true,
            }
        }
        exit
    }

    fn spawn_task(&self, kind: BatchKind, index: usize, batch: Option<BatchId>, repo: &Repository) {
        match kind {
            BatchKind::Refresh => self.spawn_probe(index, batch, repo.clone()),
            BatchKind::Run(op) => self.spawn_operation(index, batch, op, repo.path.clone()),
        }
    }

    fn spawn_probe(&self, index: usize, batch: Option<BatchId>, repo: Repository) {
        log::debug!("spawning status probe for {} ({batch:?})", repo.name);
        let runner = Arc::clone(&self.runner);
        let sender = self.sender.clone();
        thread::spawn(move || {
            if sender.is_cancelled() {
                return;
            }
            let status = probe_status(runner.as_ref(), &repo);
            sender.send(AppEvent {
                index,
                batch,
                payload: EventPayload::StatusProbed(Box::new(status)),
            });
        });
    }

    fn spawn_operation(&self, index: usize, batch: Option<BatchId>, op: Operation, path: PathBuf) {
        log::debug!("spawning {op:?} for {} ({batch:?})", path.display());
        let runner = Arc::clone(&self.runner);
        let sender = self.sender.clone();
        let sync = self.sync.clone();
        thread::spawn(move || {
            if sender.is_cancelled() {
                return;
            }
            let result = run_operation(runner.as_ref(), &path, op, &sync);
            sender.send(AppEvent {
                index,
                batch,
                payload: EventPayload::OperationFinished { op, result },
            });
        });
    }

    fn spawn_post_sync_check(&self, index: usize, path: PathBuf) {
        log::debug!("spawning post-sync check for {}", path.display());
        let runner = Arc::clone(&self.runner);
        let sender = self.sender.clone();
        let settle = self.sync.settle_delay();
        thread::spawn(move || {
            if sender.is_cancelled() {
                return;
            }
            let check = post_sync_check(runner.as_ref(), &path, settle);
            sender.send(AppEvent::untracked(index, EventPayload::PostSyncChecked(check)));
        });
    }

    fn spawn_commit(&self, index: usize, path: PathBuf, mode: CommitMode) {
        let runner = Arc::clone(&self.runner);
        let sender = self.sender.clone();
        let pr_branch = pr_branch_name(&self.sync.branch_prefix, Local::now());
        log::info!("committing {} ({mode:?})", path.display());
        thread::spawn(move || {
            if sender.is_cancelled() {
                return;
            }
            let result = execute_commit(runner.as_ref(), &path, mode, &pr_branch);
            sender.send(AppEvent::untracked(index, EventPayload::CommitFinished(result)));
        });
    }
}
