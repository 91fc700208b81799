use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::Paragraph,
};
use rhizaman_core::state::{AppState, MessageKind};

/// Batch progress while loading, otherwise the latest message.
pub fn draw(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme, spinner: &str) {
    let span = if let (Some(batch), Some((done, total))) = (state.active_batch, state.progress()) {
        Span::styled(
            format!(" {spinner} {} {done}/{total}", batch.kind.label()),
            Style::default().fg(theme.accent),
        )
    } else if let Some(message) = &state.message {
        let style = match message.kind {
            MessageKind::Info => Style::default(),
            MessageKind::Success => Style::default().fg(theme.success),
            MessageKind::Error => Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        };
        Span::styled(format!(" {}", message.text), style)
    } else {
        return;
    };
    f.render_widget(Paragraph::new(span), area);
}
