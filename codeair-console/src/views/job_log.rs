//! Job log detail view.

use crate::ansi;
use crate::keys::KeyAction;
use crate::load_state::LoadSlot;
use crate::loader::{LoadOutcome, LoadPayload, LoadRequest};
use crate::state::App;
use crate::theme;
use crate::views::helpers;
use crate::views::Outbox;
use crate::widgets::{Crumb, DetailField, DetailPanel};
use codeair_core::{
    exit_code_label, format_duration, Agent, AgentId, JobId, JobLog, Project, ProjectId,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const NO_OUTPUT: &str = "No output";

#[derive(Debug)]
pub struct JobLogView {
    pub project_id: ProjectId,
    pub agent_id: AgentId,
    pub job_id: JobId,
    pub log: LoadSlot<JobLog>,
    pub project: LoadSlot<Project>,
    pub agent: LoadSlot<Agent>,
    pub scroll: u16,
}

impl JobLogView {
    pub fn new(project_id: ProjectId, agent_id: AgentId, job_id: JobId) -> Self {
        Self {
            project_id,
            agent_id,
            job_id,
            log: LoadSlot::new(),
            project: LoadSlot::new(),
            agent: LoadSlot::new(),
            scroll: 0,
        }
    }

    pub fn mount(&mut self, out: &mut Outbox) {
        let (project_id, agent_id, job_id) = (self.project_id, self.agent_id, self.job_id);
        if self.log.is_idle() {
            let ticket = self.log.begin(format!("{}/{}", agent_id, job_id));
            out.load(
                ticket,
                LoadRequest::JobLog {
                    project_id,
                    agent_id,
                    job_id,
                },
            );
        }
        if self.project.is_idle() {
            let ticket = self.project.begin(project_id.to_string());
            out.load(ticket, LoadRequest::Project { project_id });
        }
        if self.agent.is_idle() {
            let ticket = self.agent.begin(agent_id.to_string());
            out.load(ticket, LoadRequest::Agent { project_id, agent_id });
        }
    }

    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        let ticket = outcome.ticket.clone();
        if self.log.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::JobLog(log) => Some(*log),
                _ => None,
            });
            return self.log.resolve(&ticket, result);
        }
        if self.project.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::Project(project) => Some(project),
                _ => None,
            });
            let applied = self.project.resolve(&ticket, result);
            if let Some(message) = self.project.state().error() {
                tracing::warn!(project_id = self.project_id, error = %message, "Breadcrumb project unavailable");
            }
            return applied;
        }
        if self.agent.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::Agent(agent) => Some(agent),
                _ => None,
            });
            let applied = self.agent.resolve(&ticket, result);
            if let Some(message) = self.agent.state().error() {
                tracing::warn!(agent_id = %self.agent_id, error = %message, "Breadcrumb agent unavailable");
            }
            return applied;
        }
        false
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, out: &mut Outbox) {
        match action {
            Some(KeyAction::MoveDown) => self.scroll = self.scroll.saturating_add(1),
            Some(KeyAction::MoveUp) => self.scroll = self.scroll.saturating_sub(1),
            Some(KeyAction::Export) => self.export(out),
            Some(KeyAction::ActivateExternal) => {
                if let Some(log) = self.log.state().loaded() {
                    if !log.mr_url.is_empty() {
                        out.open_url(log.mr_url.clone());
                    }
                }
            }
            _ => {}
        }
    }

    fn export(&self, out: &mut Outbox) {
        let Some(log) = self.log.state().loaded() else {
            return;
        };
        let title = format!("Run #{} (MR !{})", log.job_id, log.mr_id());
        let html = ansi::html_document(
            &title,
            &[
                ("stdout", log.stdout.as_deref().unwrap_or("")),
                ("stderr", log.stderr.as_deref().unwrap_or("")),
            ],
        );
        out.export(export_file_name(self.project_id, log.job_id), html);
    }
}

pub fn export_file_name(project_id: ProjectId, job_id: JobId) -> String {
    format!("run-{}-{}.html", project_id, job_id)
}

pub fn render(f: &mut Frame<'_>, app: &App, view: &JobLogView, area: Rect) {
    let project_label = view
        .project
        .state()
        .loaded()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Project".to_string());
    let agent_label = view
        .agent
        .state()
        .loaded()
        .map(|a| a.name.clone())
        .unwrap_or_else(|| "Agent".to_string());
    let area = helpers::with_breadcrumb(
        f,
        app,
        area,
        vec![
            Crumb::link("Dashboard", "/"),
            Crumb::link(project_label, format!("/project/{}", view.project_id)),
            Crumb::link(
                agent_label,
                format!("/project/{}/agents/{}", view.project_id, view.agent_id),
            ),
            Crumb::current(format!("Run #{}", view.job_id)),
        ],
    );

    let log = match view.log.state().loaded() {
        Some(log) => log,
        None => {
            if let Some((text, is_error)) = helpers::pending_text(view.log.state(), "Loading run...") {
                helpers::render_pending(f, &app.theme, area, &text, is_error);
            }
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(area);

    let status = log.status();
    let panel = DetailPanel {
        title: "Run",
        fields: vec![
            DetailField::styled(
                "Merge request",
                format!("!{}", log.mr_id()),
                Style::default().fg(app.theme.secondary),
            ),
            DetailField::new("Started", helpers::format_local(log.started_at.as_ref())),
            DetailField::new("Ended", helpers::format_local(log.ended_at.as_ref())),
            DetailField::new("Duration", format_duration(log.elapsed_ms)),
            DetailField::styled(
                "Status",
                status.as_str(),
                Style::default().fg(theme::job_status_color(status, &app.theme)),
            ),
            DetailField::styled(
                "Exit code",
                exit_code_label(log.exit_code),
                Style::default().fg(theme::exit_code_color(log.exit_code, &app.theme)),
            ),
            DetailField::new("MR URL", log.mr_url.clone()),
        ],
        label_style: Style::default().fg(app.theme.text_dim),
        border_style: Style::default().fg(app.theme.border),
    };
    panel.render(f, chunks[0]);

    let mut lines: Vec<Line<'static>> = Vec::new();
    push_stream(&mut lines, app, "stdout", log.stdout.as_deref());
    lines.push(Line::from(""));
    push_stream(&mut lines, app, "stderr", log.stderr.as_deref());

    let output = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((view.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title("Output"),
        );
    f.render_widget(output, chunks[1]);
}

fn push_stream(lines: &mut Vec<Line<'static>>, app: &App, heading: &str, content: Option<&str>) {
    lines.push(Line::from(Span::styled(
        heading.to_string(),
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )));
    match content.filter(|c| !c.is_empty()) {
        Some(content) => lines.extend(ansi::to_lines(content)),
        None => lines.push(Line::from(Span::styled(
            NO_OUTPUT,
            Style::default().fg(app.theme.text_muted),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewCommand;
    use codeair_core::ApiEndpoint;
    use codeair_test_utils::fixtures;
    use uuid::Uuid;

    fn loaded_view() -> JobLogView {
        let mut view = JobLogView::new(3, Uuid::new_v4(), 12);
        let mut out = Outbox::new();
        view.mount(&mut out);
        assert_eq!(out.load_count(), 3);
        let ticket = view.log.ticket().cloned().unwrap();
        assert!(view.apply(LoadOutcome {
            ticket,
            endpoint: ApiEndpoint::GetJobLog,
            result: Ok(LoadPayload::JobLog(Box::new(fixtures::job_log(12)))),
        }));
        view
    }

    #[test]
    fn test_export_writes_named_document() {
        let mut view = loaded_view();
        let mut out = Outbox::new();
        view.handle_key(Some(KeyAction::Export), &mut out);
        let Some(ViewCommand::Export { file_name, html }) = out.commands().first() else {
            panic!("expected export");
        };
        assert_eq!(file_name, "run-3-12.html");
        assert!(html.contains("review posted"));
        assert!(!html.contains('\u{1b}'));
    }

    #[test]
    fn test_export_before_load_is_noop() {
        let mut view = JobLogView::new(3, Uuid::new_v4(), 12);
        let mut out = Outbox::new();
        view.handle_key(Some(KeyAction::Export), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_open_merge_request_externally() {
        let mut view = loaded_view();
        let mut out = Outbox::new();
        view.handle_key(Some(KeyAction::ActivateExternal), &mut out);
        assert_eq!(
            out.take(),
            vec![ViewCommand::OpenUrl(
                "https://gitlab.example.com/acme/app/-/merge_requests/12".to_string()
            )]
        );
    }

    #[test]
    fn test_scroll_saturates() {
        let mut view = loaded_view();
        let mut out = Outbox::new();
        view.handle_key(Some(KeyAction::MoveUp), &mut out);
        assert_eq!(view.scroll, 0);
        view.handle_key(Some(KeyAction::MoveDown), &mut out);
        assert_eq!(view.scroll, 1);
    }
}
