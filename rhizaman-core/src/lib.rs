pub mod action;
pub mod config;
pub mod constants;
pub mod discover;
pub mod event;
pub mod exec;
pub mod git;
pub mod ops;
pub mod paths;
pub mod state;
pub mod workflow;

// Re-export commonly used types at crate root
pub use action::Action;
pub use config::Config;
pub use event::{AppEvent, BatchId, EventPayload};
pub use exec::{CommandRunner, ShellCommandRunner};
pub use git::{RepoStatus, Repository, TemplateInfo};
pub use ops::{BatchKind, Operation};
pub use state::{AppState, Effect};
pub use workflow::{CommitMode, SyncPhase};
