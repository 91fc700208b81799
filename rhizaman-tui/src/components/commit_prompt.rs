use super::centered_rect;
use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use rhizaman_core::{git::COMMIT_MESSAGE, state::CommitPrompt, workflow::CommitMode};

/// Lines of captured `git status` shown before truncating
pub const MAX_STATUS_LINES: usize = 20;
pub const TRUNCATED_MARKER: &str = "... (truncated)";

const OPTIONS: [(CommitMode, &str, &str); 2] = [
    (CommitMode::CurrentBranch, "1", "Commit and push to the current branch"),
    (CommitMode::NewPrBranch, "2", "Create a new branch and push it for a pull request"),
];

pub fn preview_lines(status_text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = status_text.lines().take(MAX_STATUS_LINES + 1).collect();
    if lines.len() > MAX_STATUS_LINES {
        lines.truncate(MAX_STATUS_LINES);
        lines.push(TRUNCATED_MARKER);
    }
    lines
}

pub fn draw(f: &mut Frame, area: Rect, prompt: &CommitPrompt, queued: usize, theme: &Theme) {
    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Sync produced changes in {}", prompt.repo_name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    lines.extend(
        preview_lines(&prompt.status_text)
            .into_iter()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.muted)))),
    );
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::raw("Commit message: "),
        Span::styled(COMMIT_MESSAGE, Style::default().fg(theme.success)),
    ]));
    lines.push(Line::default());

    for (mode, key, label) in OPTIONS {
        let line = if mode == prompt.mode {
            Line::from(Span::styled(
                format!("▸ [{key}] {label}"),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(format!("  [{key}] {label}"))
        };
        lines.push(line);
    }

    let mut title = " Commit synced changes? ".to_string();
    if queued > 0 {
        title = format!(" Commit synced changes? ({queued} more waiting) ");
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(theme.accent));
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::render;
    use rhizaman_core::config::ThemeConfig;
    use std::fmt::Write as _;

    fn prompt(status_text: String, mode: CommitMode) -> CommitPrompt {
        CommitPrompt {
            repo_index: 0,
            repo_name: "alpha".to_string(),
            status_text,
            mode,
        }
    }

    #[test]
    fn test_preview_short_status_untouched() {
        assert_eq!(preview_lines("a\nb"), vec!["a", "b"]);
        assert!(preview_lines("").is_empty());
    }

    #[test]
    fn test_preview_truncates_after_twenty_lines() {
        let text = (0..25).fold(String::new(), |mut acc, i| {
            let _ = writeln!(acc, "line {i}");
            acc
        });
        let lines = preview_lines(&text);
        assert_eq!(lines.len(), MAX_STATUS_LINES + 1);
        assert_eq!(lines[19], "line 19");
        assert_eq!(lines[20], TRUNCATED_MARKER);
    }

    #[test]
    fn test_preview_exactly_twenty_lines_not_marked() {
        let text = (0..20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let lines = preview_lines(&text);
        assert_eq!(lines.len(), 20);
        assert_ne!(lines[19], TRUNCATED_MARKER);
    }

    #[test]
    fn test_draw_highlights_chosen_mode() {
        let theme = Theme::from_config(&ThemeConfig::default());
        let p = prompt(" M .github/workflows/ci.yml".to_string(), CommitMode::NewPrBranch);
        let output = render(100, 30, |f| draw(f, f.area(), &p, 1, &theme));

        assert!(output.contains("Sync produced changes in alpha"));
        assert!(output.contains(".github/workflows/ci.yml"));
        assert!(output.contains("chore: rhiza manage sync"));
        assert!(output.contains("▸ [2]"));
        assert!(output.contains("  [1] Commit and push"));
        assert!(output.contains("1 more waiting"));
    }
}
