use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use rhizaman_core::{
    git::{RepoStatus, repo::LOADING_BRANCH_LABEL},
    state::AppState,
};
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = " · ";

/// One-line summary of a status: `branch · dirty · ↑A ↓B · template: ↓N`
pub fn status_line(status: &RepoStatus) -> String {
    if let Some(error) = &status.error {
        return format!("error: {error}");
    }
    if status.branch == LOADING_BRANCH_LABEL {
        return LOADING_BRANCH_LABEL.to_string();
    }

    let mut parts = vec![
        status.branch.clone(),
        if status.dirty { "dirty" } else { "clean" }.to_string(),
        format!("↑{} ↓{}", status.ahead, status.behind),
    ];
    if let Some(template) = &status.template {
        parts.push(if template.error.is_some() {
            "template: error".to_string()
        } else if template.behind > 0 {
            format!("template: ↓{}", template.behind)
        } else {
            "template: up-to-date".to_string()
        });
    }
    parts.join(SEPARATOR)
}

fn row_style(status: &RepoStatus, theme: &Theme) -> Style {
    let template_failed = status
        .template
        .as_ref()
        .is_some_and(|t| t.error.is_some());
    if status.error.is_some() || template_failed {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.muted)
    }
}

pub fn draw(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let name_width = state
        .repos
        .iter()
        .map(|r| r.name.width())
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem> = state
        .statuses
        .iter()
        .enumerate()
        .map(|(idx, status)| {
            let check = if state.is_selected(idx) { "[✓] " } else { "[ ] " };
            let padding = " ".repeat(name_width.saturating_sub(status.name.width()) + 2);
            let check_style = if state.is_selected(idx) {
                Style::default().fg(theme.success)
            } else {
                Style::default().fg(theme.muted)
            };
            ListItem::new(Line::from(vec![
                Span::styled(check, check_style),
                Span::raw(format!("{}{padding}", status.name)),
                Span::styled(status_line(status), row_style(status, theme)),
            ]))
        })
        .collect();

    let title = format!(
        " rhizaman{SEPARATOR}{} repos, {} selected ",
        state.repos.len(),
        state.selected.len()
    );
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(theme.accent)),
        )
        .highlight_style(
            Style::default()
                .bg(theme.accent)
                .fg(theme.highlight_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    if !state.repos.is_empty() {
        list_state.select(Some(state.cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}
