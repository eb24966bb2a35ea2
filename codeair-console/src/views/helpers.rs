//! Common view rendering helpers.

use crate::load_state::LoadState;
use crate::notifications::NotificationLevel;
use crate::state::App;
use crate::theme::SynthBruteTheme;
use crate::widgets::{Breadcrumb, Crumb};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Top bar: product name plus the signed-in user.
pub fn render_navbar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " CodeAir ",
        Style::default()
            .fg(app.theme.bg)
            .bg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        app.history.current().href(),
        Style::default().fg(app.theme.text_dim),
    ));
    if let Some(user) = app.session.user() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} (@{})", user.name, user.username),
            Style::default().fg(app.theme.secondary),
        ));
    }
    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(bar, area);
}

/// Split off a one-line breadcrumb row above the content.
pub fn with_breadcrumb(f: &mut Frame<'_>, app: &App, area: Rect, crumbs: Vec<Crumb>) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    Breadcrumb::new(crumbs)
        .with_style(
            Style::default().fg(app.theme.primary),
            Style::default().fg(app.theme.text),
        )
        .render(f, chunks[0]);
    chunks[1]
}

/// Inline error banner.
pub fn render_banner(f: &mut Frame<'_>, theme: &SynthBruteTheme, area: Rect, message: &str) {
    let banner = Paragraph::new(message.to_string())
        .style(Style::default().fg(theme.error))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error)),
        );
    f.render_widget(banner, area);
}

/// Placeholder text for a slot that has nothing to show yet, or `None` once
/// it has loaded.
pub fn pending_text<T>(state: &LoadState<T>, loading: &str) -> Option<(String, bool)> {
    match state {
        LoadState::Idle | LoadState::Loading => Some((loading.to_string(), false)),
        LoadState::Failed(message) => Some((message.clone(), true)),
        LoadState::Loaded(_) => None,
    }
}

pub fn render_pending(f: &mut Frame<'_>, theme: &SynthBruteTheme, area: Rect, text: &str, is_error: bool) {
    if is_error {
        render_banner(f, theme, area, text);
        return;
    }
    let paragraph = Paragraph::new(text.to_string()).style(Style::default().fg(theme.text_dim));
    f.render_widget(paragraph, area);
}

pub fn notification_color(level: NotificationLevel, theme: &SynthBruteTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Centered rect of the given percentage size.
pub fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Clamp a list selection after the list changed size.
pub fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        selected.min(len - 1)
    }
}

pub fn select_next(selected: &mut usize, len: usize) {
    if len > 0 {
        *selected = (*selected + 1) % len;
    }
}

pub fn select_previous(selected: &mut usize, len: usize) {
    if len > 0 {
        *selected = if *selected == 0 { len - 1 } else { *selected - 1 };
    }
}

/// Local-time rendering for display, `N/A` when absent.
pub fn format_local(ts: Option<&codeair_core::Timestamp>) -> String {
    match ts {
        Some(ts) => ts
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let mut selected = 0;
        select_previous(&mut selected, 3);
        assert_eq!(selected, 2);
        select_next(&mut selected, 3);
        assert_eq!(selected, 0);
        select_next(&mut selected, 0);
        assert_eq!(selected, 0);
    }

    #[test]
    fn test_clamp_selection() {
        assert_eq!(clamp_selection(5, 2), 1);
        assert_eq!(clamp_selection(5, 0), 0);
    }

    #[test]
    fn test_pending_text() {
        let loading: LoadState<()> = LoadState::Loading;
        assert_eq!(pending_text(&loading, "Loading..."), Some(("Loading...".to_string(), false)));
        let failed: LoadState<()> = LoadState::Failed("nope".to_string());
        assert_eq!(pending_text(&failed, "Loading..."), Some(("nope".to_string(), true)));
        assert_eq!(pending_text(&LoadState::Loaded(()), "x"), None);
        assert_eq!(format_local(None), "N/A");
    }
}
