use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rhizaman_core::{action::Action, state::AppState, workflow::CommitMode};

/// Resolve a key event into an Action based on whether a commit prompt is live
pub fn resolve_action(key: KeyEvent, state: &AppState) -> Option<Action> {
    // Global quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    if state.commit_prompt.is_some() {
        resolve_prompt_key(key.code)
    } else {
        resolve_dashboard_key(key.code)
    }
}

fn resolve_dashboard_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Char(' ') => Some(Action::ToggleSelection),
        KeyCode::Char('a') => Some(Action::SelectAll),
        KeyCode::Char('d') => Some(Action::SelectNone),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('p') => Some(Action::Pull),
        KeyCode::Char('f') => Some(Action::Fetch),
        KeyCode::Char('s') => Some(Action::Sync),
        _ => None,
    }
}

fn resolve_prompt_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('1') => Some(Action::ChooseMode(CommitMode::CurrentBranch)),
        KeyCode::Char('2') => Some(Action::ChooseMode(CommitMode::NewPrBranch)),
        KeyCode::Enter => Some(Action::ConfirmCommit),
        KeyCode::Char('n') | KeyCode::Esc => Some(Action::SkipCommit),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        _ => None,
    }
}
