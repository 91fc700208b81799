use crate::workflow::CommitMode;

/// Every user interaction produces an Action. UI never directly calls git.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    Quit,

    // Selection
    ToggleSelection,
    SelectAll,
    SelectNone,

    // Bulk operations
    Refresh,
    Pull,
    Fetch,
    Sync,

    // Commit prompt
    ChooseMode(CommitMode),
    ConfirmCommit,
    SkipCommit,
}

impl Action {
    pub fn is_prompt_action(self) -> bool {
        matches!(
            self,
            Action::ChooseMode(_) | Action::ConfirmCommit | Action::SkipCommit
        )
    }
}
