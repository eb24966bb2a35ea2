//! Project view: project details and its agents.

use crate::keys::KeyAction;
use crate::load_state::{LoadSlot, LoadState};
use crate::loader::{LoadOutcome, LoadPayload, LoadRequest};
use crate::state::App;
use crate::theme;
use crate::views::helpers;
use crate::views::Outbox;
use crate::widgets::{Crumb, DetailField, DetailPanel, StatusTag};
use codeair_core::{merge_placeholders, Agent, Project, ProjectId};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// What the agent list shows, derived from the real and placeholder slots.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentSection {
    Loading,
    Ready(Vec<Agent>),
    Failed(String),
}

#[derive(Debug)]
pub struct ProjectView {
    pub project_id: ProjectId,
    pub project: LoadSlot<Project>,
    pub agents: LoadSlot<Vec<Agent>>,
    pub placeholders: LoadSlot<Vec<Agent>>,
    pub selected: usize,
}

impl ProjectView {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            project: LoadSlot::new(),
            agents: LoadSlot::new(),
            placeholders: LoadSlot::new(),
            selected: 0,
        }
    }

    pub fn mount(&mut self, out: &mut Outbox) {
        let key = self.project_id.to_string();
        let project_id = self.project_id;
        if self.project.is_idle() {
            let ticket = self.project.begin(key.clone());
            out.load(ticket, LoadRequest::Project { project_id });
        }
        if self.agents.is_idle() {
            let ticket = self.agents.begin(key.clone());
            out.load(ticket, LoadRequest::Agents { project_id });
        }
        if self.placeholders.is_idle() {
            let ticket = self.placeholders.begin(key);
            out.load(ticket, LoadRequest::Placeholders { project_id });
        }
    }

    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        let ticket = outcome.ticket.clone();
        if self.project.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::Project(project) => Some(project),
                _ => None,
            });
            return self.project.resolve(&ticket, result);
        }
        if self.agents.ticket() == Some(&ticket) {
            let result = outcome.into_result(agents_payload);
            let applied = self.agents.resolve(&ticket, result);
            self.clamp();
            return applied;
        }
        if self.placeholders.ticket() == Some(&ticket) {
            let result = outcome.into_result(agents_payload);
            let applied = self.placeholders.resolve(&ticket, result);
            if let Some(message) = self.placeholders.state().error() {
                tracing::warn!(
                    project_id = self.project_id,
                    error = %message,
                    "Agent templates unavailable, showing configured agents only"
                );
            }
            self.clamp();
            return applied;
        }
        false
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, out: &mut Outbox) {
        let AgentSection::Ready(agents) = self.agent_section() else {
            return;
        };
        match action {
            Some(KeyAction::MoveDown) => helpers::select_next(&mut self.selected, agents.len()),
            Some(KeyAction::MoveUp) => helpers::select_previous(&mut self.selected, agents.len()),
            Some(KeyAction::Activate) | Some(KeyAction::ActivateExternal) => {
                if let Some(agent) = agents.get(self.selected) {
                    out.follow(
                        agent.config_href(self.project_id),
                        action == Some(KeyAction::ActivateExternal),
                    );
                }
            }
            _ => {}
        }
    }

    pub fn agent_section(&self) -> AgentSection {
        match (self.agents.state(), self.placeholders.state()) {
            (LoadState::Failed(message), _) => AgentSection::Failed(message.clone()),
            (real, placeholders) if real.is_pending() || placeholders.is_pending() => {
                AgentSection::Loading
            }
            (LoadState::Loaded(real), LoadState::Loaded(placeholders)) => {
                AgentSection::Ready(merge_placeholders(real, placeholders))
            }
            (LoadState::Loaded(real), _) => AgentSection::Ready(real.clone()),
            _ => AgentSection::Loading,
        }
    }

    fn clamp(&mut self) {
        if let AgentSection::Ready(agents) = self.agent_section() {
            self.selected = helpers::clamp_selection(self.selected, agents.len());
        }
    }
}

fn agents_payload(payload: LoadPayload) -> Option<Vec<Agent>> {
    match payload {
        LoadPayload::Agents(agents) => Some(agents),
        _ => None,
    }
}

pub fn render(f: &mut Frame<'_>, app: &App, view: &ProjectView, area: Rect) {
    let label = view
        .project
        .state()
        .loaded()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Project".to_string());
    let area = helpers::with_breadcrumb(
        f,
        app,
        area,
        vec![Crumb::link("Dashboard", "/"), Crumb::current(label)],
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    match helpers::pending_text(view.project.state(), "Loading project...") {
        Some((text, is_error)) => helpers::render_pending(f, &app.theme, chunks[0], &text, is_error),
        None => {
            if let Some(project) = view.project.state().loaded() {
                render_project(f, app, project, chunks[0]);
            }
        }
    }

    match view.agent_section() {
        AgentSection::Loading => {
            helpers::render_pending(f, &app.theme, chunks[1], "Loading agents...", false)
        }
        AgentSection::Failed(message) => helpers::render_banner(f, &app.theme, chunks[1], &message),
        AgentSection::Ready(agents) => render_agents(f, app, view, &agents, chunks[1]),
    }
}

fn render_project(f: &mut Frame<'_>, app: &App, project: &Project, area: Rect) {
    let panel = DetailPanel {
        title: "Project",
        fields: vec![
            DetailField::styled(
                "Name",
                project.name_with_namespace.clone(),
                Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD),
            ),
            DetailField::new(
                "Description",
                project.description.clone().unwrap_or_else(|| "-".to_string()),
            ),
            DetailField::new("Visibility", project.visibility.clone()),
            DetailField::styled(
                "URL",
                project.web_url.clone(),
                Style::default().fg(app.theme.secondary),
            ),
            DetailField::new("Last activity", project.last_activity_at.clone()),
        ],
        label_style: Style::default().fg(app.theme.text_dim),
        border_style: Style::default().fg(app.theme.border),
    };
    panel.render(f, area);
}

fn render_agents(f: &mut Frame<'_>, app: &App, view: &ProjectView, agents: &[Agent], area: Rect) {
    if agents.is_empty() {
        let empty = Paragraph::new("No agents available for this project.")
            .style(Style::default().fg(app.theme.text_dim))
            .block(Block::default().borders(Borders::ALL).title("Agents"));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = agents
        .iter()
        .map(|agent| {
            let status = if agent.is_placeholder() {
                StatusTag::new("not configured", Style::default().fg(app.theme.text_muted))
            } else if agent.enabled {
                StatusTag::new("enabled", Style::default().fg(theme::enabled_color(true, &app.theme)))
            } else {
                StatusTag::new("disabled", Style::default().fg(theme::enabled_color(false, &app.theme)))
            };
            ListItem::new(Line::from(vec![
                Span::styled(agent.name.clone(), Style::default().fg(app.theme.text)),
                Span::styled(
                    format!("  {}  ", agent.agent_type.label()),
                    Style::default().fg(app.theme.tertiary),
                ),
                status.span(),
                Span::styled(
                    format!("  {}", agent.description),
                    Style::default().fg(app.theme.text_dim),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(format!("Agents ({})", agents.len())),
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
    use codeair_core::{AgentType, ApiEndpoint, ApiError};
    use codeair_test_utils::fixtures;

    fn ok(ticket: crate::load_state::Ticket, endpoint: ApiEndpoint, agents: Vec<Agent>) -> LoadOutcome {
        LoadOutcome {
            ticket,
            endpoint,
            result: Ok(LoadPayload::Agents(agents)),
        }
    }

    fn mounted() -> ProjectView {
        let mut view = ProjectView::new(7);
        let mut out = Outbox::new();
        view.mount(&mut out);
        assert_eq!(out.load_count(), 3);
        view
    }

    #[test]
    fn test_section_loading_until_both_lists_arrive() {
        let mut view = mounted();
        let ticket = view.agents.ticket().cloned().unwrap();
        view.apply(ok(ticket, ApiEndpoint::ListAgents, vec![]));
        assert_eq!(view.agent_section(), AgentSection::Loading);
    }

    #[test]
    fn test_section_merges_placeholders() {
        let mut view = mounted();
        let reviewer = fixtures::agent(AgentType::MrReviewer);
        let agents = view.agents.ticket().cloned().unwrap();
        let placeholders = view.placeholders.ticket().cloned().unwrap();
        view.apply(ok(agents, ApiEndpoint::ListAgents, vec![reviewer.clone()]));
        view.apply(ok(placeholders, ApiEndpoint::ListAgentPlaceholders, fixtures::placeholders()));

        let AgentSection::Ready(merged) = view.agent_section() else {
            panic!("expected ready section");
        };
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], reviewer);
        assert_eq!(merged[1].agent_type, AgentType::MrDescriber);
        assert!(merged[1].is_placeholder());
    }

    #[test]
    fn test_placeholder_failure_shows_real_agents() {
        let mut view = mounted();
        let real = fixtures::agent(AgentType::MrDescriber);
        let agents = view.agents.ticket().cloned().unwrap();
        let placeholders = view.placeholders.ticket().cloned().unwrap();
        view.apply(ok(agents, ApiEndpoint::ListAgents, vec![real.clone()]));
        view.apply(LoadOutcome {
            ticket: placeholders,
            endpoint: ApiEndpoint::ListAgentPlaceholders,
            result: Err(ApiError::fallback(ApiEndpoint::ListAgentPlaceholders)),
        });
        assert_eq!(view.agent_section(), AgentSection::Ready(vec![real]));
    }

    #[test]
    fn test_real_agent_failure_surfaces_banner() {
        let mut view = mounted();
        let agents = view.agents.ticket().cloned().unwrap();
        view.apply(LoadOutcome {
            ticket: agents,
            endpoint: ApiEndpoint::ListAgents,
            result: Err(ApiError::fallback(ApiEndpoint::ListAgents)),
        });
        assert_eq!(
            view.agent_section(),
            AgentSection::Failed("Failed to load agents".to_string())
        );
    }

    #[test]
    fn test_activate_placeholder_links_to_new_form() {
        let mut view = mounted();
        let agents = view.agents.ticket().cloned().unwrap();
        let placeholders = view.placeholders.ticket().cloned().unwrap();
        view.apply(ok(agents, ApiEndpoint::ListAgents, vec![]));
        view.apply(ok(placeholders, ApiEndpoint::ListAgentPlaceholders, fixtures::placeholders()));

        let mut out = Outbox::new();
        view.handle_key(Some(KeyAction::MoveDown), &mut out);
        view.handle_key(Some(KeyAction::Activate), &mut out);
        assert_eq!(
            out.take(),
            vec![ViewCommand::Follow {
                href: "/project/7/agents/new?type=mr-reviewer".to_string(),
                external: false
            }]
        );
    }
}
