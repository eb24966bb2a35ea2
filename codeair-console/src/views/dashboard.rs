//! Dashboard view: project search.

use crate::keys::KeyAction;
use crate::load_state::{LoadSlot, LoadState};
use crate::loader::{LoadOutcome, LoadPayload, LoadRequest};
use crate::state::App;
use crate::views::helpers;
use crate::views::Outbox;
use codeair_core::{Project, ProjectSearchResponse};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;

#[derive(Debug)]
pub struct DashboardView {
    /// Query currently reflected in the location.
    pub query: Option<String>,
    pub results: LoadSlot<ProjectSearchResponse>,
    auto_searched: bool,
    pub input: TextArea<'static>,
    pub editing: bool,
    pub selected: usize,
}

impl DashboardView {
    pub fn new(query: Option<String>) -> Self {
        let mut input = TextArea::default();
        if let Some(query) = &query {
            input.insert_str(query);
        }
        Self {
            query,
            results: LoadSlot::new(),
            auto_searched: false,
            input,
            editing: false,
            selected: 0,
        }
    }

    /// Search once for the query the dashboard was opened with.
    pub fn mount(&mut self, out: &mut Outbox) {
        if self.auto_searched {
            return;
        }
        self.auto_searched = true;
        if let Some(query) = self.query.clone() {
            if self.results.is_idle() {
                self.search(query, out);
            }
        }
    }

    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        if self.results.ticket() != Some(&outcome.ticket) {
            return false;
        }
        let ticket = outcome.ticket.clone();
        let result = outcome.into_result(|payload| match payload {
            LoadPayload::Projects(response) => Some(response),
            _ => None,
        });
        let applied = self.results.resolve(&ticket, result);
        if applied {
            self.selected = helpers::clamp_selection(self.selected, self.projects().len());
        }
        applied
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, key: KeyEvent, out: &mut Outbox) {
        if self.editing {
            match action {
                Some(KeyAction::Submit) => {
                    self.editing = false;
                    self.commit(out);
                }
                Some(KeyAction::Cancel) => self.editing = false,
                Some(_) => {}
                None => {
                    self.input.input(key);
                }
            }
            return;
        }

        let len = self.projects().len();
        match action {
            Some(KeyAction::Search) | Some(KeyAction::Edit) => self.editing = true,
            Some(KeyAction::MoveDown) => helpers::select_next(&mut self.selected, len),
            Some(KeyAction::MoveUp) => helpers::select_previous(&mut self.selected, len),
            Some(KeyAction::Activate) => {
                if let Some(project) = self.projects().get(self.selected) {
                    out.follow(project.href(), false);
                }
            }
            Some(KeyAction::ActivateExternal) => {
                if let Some(project) = self.projects().get(self.selected) {
                    out.follow(project.href(), true);
                }
            }
            _ => {}
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.editing = true;
        self.input.insert_str(text.replace(['\r', '\n'], " "));
    }

    /// Commit the input as the new query.
    pub fn commit(&mut self, out: &mut Outbox) {
        let text = self.input.lines().join(" ").trim().to_string();
        if text.is_empty() {
            self.query = None;
            self.results.reset();
            self.selected = 0;
            out.push_query("q", None);
            return;
        }
        self.query = Some(text.clone());
        out.push_query("q", Some(text.clone()));
        self.search(text, out);
    }

    fn search(&mut self, query: String, out: &mut Outbox) {
        self.selected = 0;
        let ticket = self.results.begin(query.clone());
        out.load(ticket, LoadRequest::SearchProjects { query });
    }

    pub fn projects(&self) -> &[Project] {
        self.results
            .state()
            .loaded()
            .map(|r| r.items.as_slice())
            .unwrap_or(&[])
    }
}

pub fn render(f: &mut Frame<'_>, app: &App, view: &DashboardView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let mut input = view.input.clone();
    let border = if view.editing {
        app.theme.border_focus
    } else {
        app.theme.border
    };
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("Search projects (/)"),
    );
    f.render_widget(input.widget(), chunks[0]);

    match view.results.state() {
        LoadState::Idle => {
            let hint = Paragraph::new("Type a project name and press Enter to search.")
                .style(Style::default().fg(app.theme.text_dim))
                .block(Block::default().borders(Borders::ALL).title("Projects"));
            f.render_widget(hint, chunks[1]);
        }
        LoadState::Loading => {
            helpers::render_pending(f, &app.theme, chunks[1], "Searching...", false);
        }
        LoadState::Failed(message) => {
            helpers::render_banner(f, &app.theme, chunks[1], message);
        }
        LoadState::Loaded(response) => {
            render_results(f, app, view, response, chunks[1]);
            let bot = &response.bot_user;
            let note = Paragraph::new(Line::from(vec![
                Span::raw("Add "),
                Span::styled(
                    format!("@{}", bot.username),
                    Style::default()
                        .fg(app.theme.secondary)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" as a Developer on your project so its agents can comment on merge requests."),
            ]))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
            f.render_widget(note, chunks[2]);
        }
    }
}

fn render_results(
    f: &mut Frame<'_>,
    app: &App,
    view: &DashboardView,
    response: &ProjectSearchResponse,
    area: Rect,
) {
    let title = format!("Projects ({})", response.total);
    if response.items.is_empty() {
        let empty = Paragraph::new("No projects found.")
            .style(Style::default().fg(app.theme.text_dim))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = response
        .items
        .iter()
        .map(|project| {
            let mut spans = vec![
                Span::styled(
                    project.name_with_namespace.clone(),
                    Style::default().fg(app.theme.text),
                ),
                Span::styled(
                    format!("  [{}]", project.visibility),
                    Style::default().fg(app.theme.text_muted),
                ),
            ];
            if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
                spans.push(Span::styled(
                    format!("  {}", description),
                    Style::default().fg(app.theme.text_dim),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(view.selected));
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewCommand;
    use crossterm::event::KeyCode;

    fn enter() -> KeyEvent {
        KeyEvent::from(KeyCode::Enter)
    }

    #[test]
    fn test_mount_without_query_is_quiet() {
        let mut view = DashboardView::new(None);
        let mut out = Outbox::new();
        view.mount(&mut out);
        assert!(out.is_empty());
        assert!(view.results.is_idle());
    }

    #[test]
    fn test_mount_with_query_searches_once() {
        let mut view = DashboardView::new(Some("foo".to_string()));
        let mut out = Outbox::new();
        view.mount(&mut out);
        view.mount(&mut out);
        assert_eq!(out.load_count(), 1);
        assert_eq!(view.results.ticket().map(|t| t.key.as_str()), Some("foo"));
    }

    #[test]
    fn test_commit_pushes_query_and_searches() {
        let mut view = DashboardView::new(None);
        let mut out = Outbox::new();
        view.paste("rocket");
        view.handle_key(Some(KeyAction::Submit), enter(), &mut out);
        let commands = out.take();
        assert_eq!(
            commands[0],
            ViewCommand::PushQuery {
                key: "q",
                value: Some("rocket".to_string())
            }
        );
        assert!(matches!(commands[1], ViewCommand::Load { .. }));
        assert!(!view.editing);
    }

    #[test]
    fn test_empty_commit_clears_results_without_call() {
        let mut view = DashboardView::new(Some("foo".to_string()));
        let mut out = Outbox::new();
        view.mount(&mut out);
        out.take();

        view.input = TextArea::default();
        view.commit(&mut out);
        assert_eq!(
            out.take(),
            vec![ViewCommand::PushQuery { key: "q", value: None }]
        );
        assert!(view.results.is_idle());
        assert_eq!(view.query, None);
    }
}
