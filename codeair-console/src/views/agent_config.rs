//! Agent configuration view.
//!
//! Handles both creating an agent from a placeholder template (`/agents/new`)
//! and editing an existing one. Existing agents also list their most recent
//! job logs, each linking to the run detail.
//!
//! The form keeps one [`TextArea`] per text field. Only one field is edited at
//! a time; the rest render as read-only lines.

use crate::keys::KeyAction;
use crate::load_state::{LoadSlot, LoadState};
use crate::loader::{LoadOutcome, LoadPayload, LoadRequest};
use crate::notifications::NotificationLevel;
use crate::router::AgentRef;
use crate::state::App;
use crate::theme;
use crate::views::helpers;
use crate::views::Outbox;
use crate::widgets::{Crumb, StatusTag};
use codeair_core::{
    format_duration, exit_code_label, Agent, AgentConfig, AgentDraft, AgentEngine, AgentField,
    AgentLogsResponse, AgentProvider, AgentType, JobLog, Project, ProjectId, ValidationErrors,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::str::FromStr;
use tui_textarea::TextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Engine,
    Name,
    Description,
    Model,
    Token,
    Prompt,
    ExternalUrl,
    Enabled,
    Save,
    Logs,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Type => "Type",
            FormField::Engine => "Engine",
            FormField::Name => "Name",
            FormField::Description => "Description",
            FormField::Model => "Model",
            FormField::Token => "Token",
            FormField::Prompt => "Prompt",
            FormField::ExternalUrl => "External URL",
            FormField::Enabled => "Enabled",
            FormField::Save => "Save",
            FormField::Logs => "Recent runs",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Name
                | FormField::Description
                | FormField::Model
                | FormField::Token
                | FormField::Prompt
                | FormField::ExternalUrl
        )
    }

    fn validated(&self) -> Option<AgentField> {
        match self {
            FormField::Name => Some(AgentField::Name),
            FormField::Description => Some(AgentField::Description),
            FormField::Model => Some(AgentField::Model),
            FormField::Token => Some(AgentField::Token),
            FormField::ExternalUrl => Some(AgentField::ExternalUrl),
            _ => None,
        }
    }
}

fn text_area(value: &str) -> TextArea<'static> {
    TextArea::new(value.split('\n').map(str::to_string).collect())
}

fn text_of(area: &TextArea<'_>) -> String {
    area.lines().join("\n")
}

/// Editable copy of an agent definition.
#[derive(Debug, Clone)]
pub struct AgentForm {
    pub agent_type: AgentType,
    pub engine: AgentEngine,
    pub provider: AgentProvider,
    pub enabled: bool,
    pub name: TextArea<'static>,
    pub description: TextArea<'static>,
    pub model: TextArea<'static>,
    pub token: TextArea<'static>,
    pub prompt: TextArea<'static>,
    pub external_url: TextArea<'static>,
}

impl AgentForm {
    /// Blank form used until (or when) no template is available.
    pub fn defaults(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            engine: AgentEngine::default(),
            provider: AgentProvider::default(),
            enabled: true,
            name: text_area(""),
            description: text_area(""),
            model: text_area(""),
            token: masked(text_area("")),
            prompt: text_area(""),
            external_url: text_area(""),
        }
    }

    /// Pre-fill from a placeholder template. The token is never carried over
    /// and new agents start enabled.
    pub fn from_template(template: &Agent) -> Self {
        let mut form = Self::from_agent(template);
        form.token = masked(text_area(""));
        form.enabled = true;
        form
    }

    pub fn from_agent(agent: &Agent) -> Self {
        let config = &agent.config;
        Self {
            agent_type: agent.agent_type,
            engine: agent.engine,
            provider: config.provider,
            enabled: agent.enabled,
            name: text_area(&agent.name),
            description: text_area(&agent.description),
            model: text_area(&config.model),
            token: masked(text_area(&config.token)),
            prompt: text_area(config.prompt.as_deref().unwrap_or("")),
            external_url: text_area(config.external_url.as_deref().unwrap_or("")),
        }
    }

    pub fn draft(&self) -> AgentDraft {
        AgentDraft {
            agent_type: self.agent_type,
            engine: self.engine,
            name: text_of(&self.name),
            description: text_of(&self.description),
            enabled: self.enabled,
            config: AgentConfig {
                provider: self.provider,
                model: text_of(&self.model),
                token: text_of(&self.token),
                prompt: Some(text_of(&self.prompt)),
                external_url: Some(text_of(&self.external_url)),
            },
        }
    }

    fn text(&self, field: FormField) -> Option<&TextArea<'static>> {
        match field {
            FormField::Name => Some(&self.name),
            FormField::Description => Some(&self.description),
            FormField::Model => Some(&self.model),
            FormField::Token => Some(&self.token),
            FormField::Prompt => Some(&self.prompt),
            FormField::ExternalUrl => Some(&self.external_url),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut TextArea<'static>> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Model => Some(&mut self.model),
            FormField::Token => Some(&mut self.token),
            FormField::Prompt => Some(&mut self.prompt),
            FormField::ExternalUrl => Some(&mut self.external_url),
            _ => None,
        }
    }
}

fn masked(mut area: TextArea<'static>) -> TextArea<'static> {
    area.set_mask_char('•');
    area
}

#[derive(Debug)]
pub struct AgentConfigView {
    pub project_id: ProjectId,
    pub agent: AgentRef,
    /// Raw `type` query value; only honored when it names an available type.
    pub requested_type: Option<String>,
    job_log_limit: u32,
    pub project: LoadSlot<Project>,
    pub existing: LoadSlot<Agent>,
    pub placeholders: LoadSlot<Vec<Agent>>,
    pub logs: LoadSlot<AgentLogsResponse>,
    pub save: LoadSlot<Agent>,
    pub form: AgentForm,
    pub errors: ValidationErrors,
    pub submit_error: Option<String>,
    pub editing: bool,
    pub focus: FormField,
    pub selected_log: usize,
}

impl AgentConfigView {
    pub fn new(
        project_id: ProjectId,
        agent: AgentRef,
        requested_type: Option<String>,
        job_log_limit: u32,
    ) -> Self {
        let fallback_type = requested_type
            .as_deref()
            .and_then(|raw| AgentType::from_str(raw).ok())
            .unwrap_or(AgentType::MrDescriber);
        let focus = match agent {
            AgentRef::New => FormField::Type,
            AgentRef::Existing(_) => FormField::Name,
        };
        Self {
            project_id,
            agent,
            requested_type,
            job_log_limit,
            project: LoadSlot::new(),
            existing: LoadSlot::new(),
            placeholders: LoadSlot::new(),
            logs: LoadSlot::new(),
            save: LoadSlot::new(),
            form: AgentForm::defaults(fallback_type),
            errors: ValidationErrors::new(),
            submit_error: None,
            editing: false,
            focus,
            selected_log: 0,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self.agent, AgentRef::New)
    }

    pub fn mount(&mut self, out: &mut Outbox) {
        let project_id = self.project_id;
        if self.project.is_idle() {
            let ticket = self.project.begin(project_id.to_string());
            out.load(ticket, LoadRequest::Project { project_id });
        }
        match self.agent {
            AgentRef::New => {
                if self.placeholders.is_idle() {
                    let ticket = self.placeholders.begin(project_id.to_string());
                    out.load(ticket, LoadRequest::Placeholders { project_id });
                }
            }
            AgentRef::Existing(agent_id) => {
                if self.existing.is_idle() {
                    let ticket = self.existing.begin(agent_id.to_string());
                    out.load(ticket, LoadRequest::Agent { project_id, agent_id });
                }
                if self.logs.is_idle() {
                    let ticket = self.logs.begin(agent_id.to_string());
                    out.load(
                        ticket,
                        LoadRequest::JobLogs {
                            project_id,
                            agent_id,
                            limit: self.job_log_limit,
                        },
                    );
                }
            }
        }
    }

    pub fn apply(&mut self, outcome: LoadOutcome, out: &mut Outbox) -> bool {
        let ticket = outcome.ticket.clone();

        if self.project.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::Project(project) => Some(project),
                _ => None,
            });
            let applied = self.project.resolve(&ticket, result);
            if let Some(message) = self.project.state().error() {
                tracing::warn!(project_id = self.project_id, error = %message, "Project unavailable for agent form");
            }
            return applied;
        }

        if self.placeholders.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::Agents(agents) => Some(agents),
                _ => None,
            });
            let applied = self.placeholders.resolve(&ticket, result);
            if applied {
                self.prefill_from_template();
            }
            return applied;
        }

        if self.existing.ticket() == Some(&ticket) {
            let result = outcome.into_result(agent_payload);
            let applied = self.existing.resolve(&ticket, result);
            if let Some(agent) = self.existing.state().loaded() {
                self.form = AgentForm::from_agent(agent);
            }
            return applied;
        }

        if self.logs.ticket() == Some(&ticket) {
            let result = outcome.into_result(|payload| match payload {
                LoadPayload::JobLogs(logs) => Some(logs),
                _ => None,
            });
            let applied = self.logs.resolve(&ticket, result);
            self.selected_log = helpers::clamp_selection(self.selected_log, self.job_logs().len());
            return applied;
        }

        if self.save.ticket() == Some(&ticket) {
            let result = outcome.into_result(agent_payload);
            if !self.save.resolve(&ticket, result) {
                return false;
            }
            match self.save.state() {
                LoadState::Loaded(agent) => {
                    tracing::info!(project_id = self.project_id, agent_id = %agent.id, "Agent saved");
                    out.notify(NotificationLevel::Success, format!("Saved {}", agent.name));
                    out.redirect(format!("/project/{}", self.project_id));
                }
                LoadState::Failed(message) => self.submit_error = Some(message.clone()),
                _ => {}
            }
            return true;
        }

        false
    }

    /// Types offered by the type selector.
    pub fn available_types(&self) -> Vec<AgentType> {
        match self.placeholders.state().loaded() {
            Some(templates) if !templates.is_empty() => {
                let mut types: Vec<AgentType> = Vec::new();
                for template in templates {
                    if !types.contains(&template.agent_type) {
                        types.push(template.agent_type);
                    }
                }
                types
            }
            _ => AgentType::all().to_vec(),
        }
    }

    fn prefill_from_template(&mut self) {
        let Some(templates) = self.placeholders.state().loaded() else {
            return;
        };
        let requested = self
            .requested_type
            .as_deref()
            .and_then(|raw| AgentType::from_str(raw).ok());
        let template = requested
            .and_then(|t| templates.iter().find(|p| p.agent_type == t))
            .or_else(|| templates.first());
        if let Some(template) = template {
            self.form = AgentForm::from_template(template);
        }
    }

    fn template_for(&self, agent_type: AgentType) -> Option<&Agent> {
        self.placeholders
            .state()
            .loaded()
            .and_then(|templates| templates.iter().find(|p| p.agent_type == agent_type))
    }

    pub fn job_logs(&self) -> &[JobLog] {
        self.logs
            .state()
            .loaded()
            .map(|r| r.logs.as_slice())
            .unwrap_or(&[])
    }

    /// Fields reachable by focus movement, in display order.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = Vec::new();
        if self.is_new() {
            fields.extend([FormField::Type, FormField::Engine]);
        }
        fields.extend([
            FormField::Name,
            FormField::Description,
            FormField::Model,
            FormField::Token,
            FormField::Prompt,
        ]);
        if self.form.engine == AgentEngine::External {
            fields.push(FormField::ExternalUrl);
        }
        fields.extend([FormField::Enabled, FormField::Save]);
        if !self.job_logs().is_empty() {
            fields.push(FormField::Logs);
        }
        fields
    }

    fn move_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % fields.len()
        } else if index == 0 {
            fields.len() - 1
        } else {
            index - 1
        };
        self.focus = fields[next];
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, key: KeyEvent, out: &mut Outbox) {
        if self.form_blocked() {
            return;
        }
        if self.editing {
            self.handle_editing_key(action, key, out);
            return;
        }

        match action {
            Some(KeyAction::NextField) => self.move_focus(true),
            Some(KeyAction::PrevField) => self.move_focus(false),
            Some(KeyAction::MoveDown) => {
                if self.focus == FormField::Logs && self.selected_log + 1 < self.job_logs().len() {
                    self.selected_log += 1;
                } else if self.focus != FormField::Logs {
                    self.move_focus(true);
                }
            }
            Some(KeyAction::MoveUp) => {
                if self.focus == FormField::Logs && self.selected_log > 0 {
                    self.selected_log -= 1;
                } else {
                    self.move_focus(false);
                }
            }
            Some(KeyAction::Submit) => self.submit(out),
            Some(KeyAction::Edit) if self.focus.is_text() => self.editing = true,
            Some(KeyAction::Toggle) => self.toggle(),
            Some(KeyAction::Activate) => match self.focus {
                FormField::Save => self.submit(out),
                FormField::Logs => self.open_log(false, out),
                field if field.is_text() => self.editing = true,
                _ => self.toggle(),
            },
            Some(KeyAction::ActivateExternal) if self.focus == FormField::Logs => {
                self.open_log(true, out)
            }
            _ => {}
        }
    }

    fn handle_editing_key(&mut self, action: Option<KeyAction>, key: KeyEvent, out: &mut Outbox) {
        let with_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match action {
            Some(KeyAction::Submit) if with_ctrl => {
                self.editing = false;
                self.submit(out);
            }
            Some(KeyAction::Submit) if self.focus == FormField::Prompt && key.code == KeyCode::Enter => {
                if let Some(area) = self.form.text_mut(FormField::Prompt) {
                    area.insert_newline();
                }
            }
            Some(KeyAction::Submit) | Some(KeyAction::Cancel) => self.editing = false,
            Some(KeyAction::NextField) | Some(KeyAction::PrevField) => {
                self.move_focus(action == Some(KeyAction::NextField));
                self.editing = self.focus.is_text();
            }
            Some(_) => {}
            None => {
                let focus = self.focus;
                if let Some(area) = self.form.text_mut(focus) {
                    area.input(key);
                }
                if let Some(field) = focus.validated() {
                    self.clear_error(field);
                }
            }
        }
    }

    pub fn paste(&mut self, text: &str) {
        if self.form_blocked() {
            return;
        }
        let focus = self.focus;
        let single_line = focus != FormField::Prompt;
        if let Some(area) = self.form.text_mut(focus) {
            if single_line {
                area.insert_str(text.replace(['\r', '\n'], ""));
            } else {
                area.insert_str(text.replace('\r', ""));
            }
            self.editing = true;
        }
    }

    fn clear_error(&mut self, field: AgentField) {
        if self.errors.get(field).is_some() {
            let mut remaining = ValidationErrors::new();
            for (f, message) in self.errors.iter().filter(|(f, _)| *f != field) {
                remaining.insert(f, message);
            }
            self.errors = remaining;
        }
    }

    fn toggle(&mut self) {
        match self.focus {
            FormField::Enabled => self.form.enabled = !self.form.enabled,
            FormField::Type if self.is_new() => {
                let types = self.available_types();
                let index = types.iter().position(|t| *t == self.form.agent_type);
                let next = types[index.map(|i| (i + 1) % types.len()).unwrap_or(0)];
                self.form.agent_type = next;
                if let Some(template) = self.template_for(next).cloned() {
                    let mut form = AgentForm::from_template(&template);
                    form.token = self.form.token.clone();
                    self.form = form;
                }
            }
            FormField::Engine if self.is_new() => {
                let engines = AgentEngine::all();
                let index = engines.iter().position(|e| *e == self.form.engine).unwrap_or(0);
                self.form.engine = engines[(index + 1) % engines.len()];
                if self.form.engine != AgentEngine::External {
                    self.clear_error(AgentField::ExternalUrl);
                }
            }
            _ => {}
        }
    }

    fn open_log(&self, external: bool, out: &mut Outbox) {
        if let AgentRef::Existing(agent_id) = self.agent {
            if let Some(log) = self.job_logs().get(self.selected_log) {
                out.follow(log.href(self.project_id, &agent_id), external);
            }
        }
    }

    /// Input is ignored until the record the form is built from has arrived:
    /// the templates for a new agent, the agent itself otherwise.
    fn form_blocked(&self) -> bool {
        match self.agent {
            AgentRef::New => self.placeholders.is_loading(),
            AgentRef::Existing(_) => self.existing.state().loaded().is_none(),
        }
    }

    /// Validate and send. Ignored while a save is in flight.
    pub fn submit(&mut self, out: &mut Outbox) {
        if self.save.is_loading() || self.form_blocked() {
            return;
        }
        let draft = self.form.draft();
        if let Err(errors) = draft.validate() {
            tracing::debug!(errors = %errors, "Agent form rejected");
            self.errors = errors;
            return;
        }
        self.errors = ValidationErrors::new();
        self.submit_error = None;

        let project_id = self.project_id;
        let draft = draft.normalized();
        let (key, request) = match self.agent {
            AgentRef::New => (
                format!("new:{}", project_id),
                LoadRequest::CreateAgent { project_id, draft },
            ),
            AgentRef::Existing(agent_id) => (
                agent_id.to_string(),
                LoadRequest::UpdateAgent {
                    project_id,
                    agent_id,
                    draft,
                },
            ),
        };
        let ticket = self.save.begin(key);
        out.load(ticket, request);
    }
}

fn agent_payload(payload: LoadPayload) -> Option<Agent> {
    match payload {
        LoadPayload::Agent(agent) => Some(agent),
        _ => None,
    }
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn render(f: &mut Frame<'_>, app: &App, view: &AgentConfigView, area: Rect) {
    let project_label = view
        .project
        .state()
        .loaded()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Project".to_string());
    let agent_label = match view.existing.state().loaded() {
        Some(agent) => agent.name.clone(),
        None if view.is_new() => "New agent".to_string(),
        None => "Agent".to_string(),
    };
    let area = helpers::with_breadcrumb(
        f,
        app,
        area,
        vec![
            Crumb::link("Dashboard", "/"),
            Crumb::link(project_label, format!("/project/{}", view.project_id)),
            Crumb::current(agent_label),
        ],
    );

    if !view.is_new() {
        if let Some((text, is_error)) = helpers::pending_text(view.existing.state(), "Loading agent...") {
            helpers::render_pending(f, &app.theme, area, &text, is_error);
            return;
        }
    }

    let mut constraints = Vec::new();
    let notice = form_notice(view);
    if notice.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(8));
    if view.editing {
        let height = if view.focus == FormField::Prompt { 8 } else { 3 };
        constraints.push(Constraint::Length(height));
    }
    if !view.is_new() {
        constraints.push(Constraint::Length(view.job_log_limit.min(10) as u16 + 2));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut index = 0;
    if let Some((message, is_error)) = notice {
        if is_error {
            helpers::render_banner(f, &app.theme, chunks[index], &message);
        } else {
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(app.theme.warning))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(paragraph, chunks[index]);
        }
        index += 1;
    }

    render_form(f, app, view, chunks[index]);
    index += 1;

    if view.editing {
        if let Some(area) = view.form.text(view.focus) {
            let mut input = area.clone();
            input.set_block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border_focus))
                    .title(format!("{} (Enter done, Esc cancel)", view.focus.label())),
            );
            f.render_widget(input.widget(), chunks[index]);
        }
        index += 1;
    }

    if !view.is_new() {
        render_logs(f, app, view, chunks[index]);
    }
}

/// Banner shown above the form: submit failure first, then template trouble.
fn form_notice(view: &AgentConfigView) -> Option<(String, bool)> {
    if let Some(error) = &view.submit_error {
        return Some((error.clone(), true));
    }
    if view.is_new() {
        if view.placeholders.is_loading() {
            return Some(("Loading agent templates...".to_string(), false));
        }
        if let Some(error) = view.placeholders.state().error() {
            return Some((format!("{} (using defaults)", error), false));
        }
    }
    None
}

fn render_form(f: &mut Frame<'_>, app: &App, view: &AgentConfigView, area: Rect) {
    let form = &view.form;
    let label_style = Style::default().fg(app.theme.text_dim);
    let mut lines: Vec<Line> = Vec::new();

    for field in view_fields_for_render(view) {
        let focused = field == view.focus;
        let marker = if focused { "▸ " } else { "  " };
        let value: Span = match field {
            FormField::Type => Span::styled(
                form.agent_type.label(),
                Style::default().fg(app.theme.tertiary),
            ),
            FormField::Engine => Span::styled(
                form.engine.label(),
                Style::default().fg(app.theme.tertiary),
            ),
            FormField::Enabled => {
                let (label, style) = if form.enabled {
                    ("enabled", Style::default().fg(theme::enabled_color(true, &app.theme)))
                } else {
                    ("disabled", Style::default().fg(theme::enabled_color(false, &app.theme)))
                };
                StatusTag::new(label, style).span()
            }
            FormField::Save => {
                let label = if view.save.is_loading() {
                    "[ Saving... ]"
                } else if view.is_new() {
                    "[ Create agent ]"
                } else {
                    "[ Save changes ]"
                };
                Span::styled(
                    label,
                    Style::default()
                        .fg(app.theme.primary)
                        .add_modifier(Modifier::BOLD),
                )
            }
            FormField::Token => {
                let token = form.text(field).map(text_of).unwrap_or_default();
                Span::raw(if token.is_empty() {
                    String::new()
                } else {
                    "•".repeat(token.chars().count().min(24))
                })
            }
            FormField::Logs => continue,
            _ => {
                let text = form.text(field).map(text_of).unwrap_or_default();
                let first = text.lines().next().unwrap_or("").to_string();
                let more = if text.lines().count() > 1 { " …" } else { "" };
                Span::raw(format!("{}{}", first, more))
            }
        };

        let mut style = label_style;
        if focused {
            style = style.fg(app.theme.primary).add_modifier(Modifier::BOLD);
        }
        let mut spans = vec![Span::styled(format!("{}{:<14}", marker, field.label()), style), value];
        if matches!(field, FormField::Type | FormField::Engine) && !view.is_new() {
            spans.push(Span::styled("  (read-only)", Style::default().fg(app.theme.text_muted)));
        }
        lines.push(Line::from(spans));

        if let Some(message) = field.validated().and_then(|f| view.errors.get(f)) {
            lines.push(Line::from(Span::styled(
                format!("  {:<14}{}", "", message),
                Style::default().fg(app.theme.error),
            )));
        }
    }
    lines.push(Line::from(Span::styled(
        format!("  {:<14}{}", "Provider", form.provider.label()),
        label_style,
    )));

    let title = if view.is_new() {
        "New agent"
    } else {
        "Agent configuration"
    };
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border))
            .title(title),
    );
    f.render_widget(widget, area);
}

/// Editable fields plus the read-only type and engine rows for existing agents.
fn view_fields_for_render(view: &AgentConfigView) -> Vec<FormField> {
    let mut fields = view.fields();
    if !view.is_new() {
        fields.insert(0, FormField::Engine);
        fields.insert(0, FormField::Type);
    }
    fields
}

fn render_logs(f: &mut Frame<'_>, app: &App, view: &AgentConfigView, area: Rect) {
    if let Some((text, is_error)) = helpers::pending_text(view.logs.state(), "Loading runs...") {
        helpers::render_pending(f, &app.theme, area, &text, is_error);
        return;
    }
    let logs = view.job_logs();
    let border = if view.focus == FormField::Logs {
        app.theme.border_focus
    } else {
        app.theme.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!("Recent runs ({})", logs.len()));
    if logs.is_empty() {
        let empty = Paragraph::new("No runs yet.")
            .style(Style::default().fg(app.theme.text_dim))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = logs
        .iter()
        .map(|log| {
            let status = log.status();
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<8}", log.job_id), Style::default().fg(app.theme.text)),
                Span::styled(
                    format!("MR !{:<6}", log.mr_id()),
                    Style::default().fg(app.theme.secondary),
                ),
                StatusTag::new(status.as_str(), Style::default().fg(theme::job_status_color(status, &app.theme))).span(),
                Span::styled(
                    format!("  {:<12}", exit_code_label(log.exit_code)),
                    Style::default().fg(theme::exit_code_color(log.exit_code, &app.theme)),
                ),
                Span::styled(
                    format!("{:<10}", format_duration(log.elapsed_ms)),
                    Style::default().fg(app.theme.text_dim),
                ),
                Span::styled(
                    helpers::format_local(Some(&log.created_at)),
                    Style::default().fg(app.theme.text_muted),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .fg(app.theme.primary),
        )
        .highlight_symbol("▸ ");
    let mut state = ListState::default();
    if view.focus == FormField::Logs {
        state.select(Some(view.selected_log));
    }
    f.render_stateful_widget(list, area, &mut state);
}
