use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use rhizaman_core::state::AppState;

const DASHBOARD_HINTS: &[(&str, &str)] = &[
    ("↑↓/jk", "move"),
    ("space", "select"),
    ("a/d", "all/none"),
    ("r", "refresh"),
    ("p", "pull"),
    ("f", "fetch"),
    ("s", "sync"),
    ("q", "quit"),
];

const PROMPT_HINTS: &[(&str, &str)] = &[
    ("1/2", "choose"),
    ("enter", "confirm"),
    ("n/esc", "skip"),
    ("ctrl-c", "quit"),
];

pub fn draw(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let hints = if state.commit_prompt.is_some() {
        PROMPT_HINTS
    } else {
        DASHBOARD_HINTS
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.hint)));
        spans.push(Span::styled(format!(" {label}"), Style::default().fg(theme.muted)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
