//! Views and render dispatch.
//!
//! Each view owns its load slots and reacts to mount, load outcomes and keys
//! by writing [`ViewCommand`]s into an [`Outbox`]. The app drains the outbox;
//! views never touch history, the session or the network directly.

pub mod agent_config;
pub mod callback;
pub mod dashboard;
pub mod helpers;
pub mod job_log;
pub mod login;
pub mod project;

pub use agent_config::AgentConfigView;
pub use callback::CallbackView;
pub use dashboard::DashboardView;
pub use job_log::JobLogView;
pub use login::LoginView;
pub use project::ProjectView;

use crate::keys::KeyAction;
use crate::load_state::Ticket;
use crate::loader::{LoadOutcome, LoadRequest};
use crate::location::Location;
use crate::notifications::NotificationLevel;
use crate::router::Route;
use crate::session::Session;
use crate::state::App;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    Load { ticket: Ticket, request: LoadRequest },
    /// Navigate to a console href, or open it in the browser when external.
    Follow { href: String, external: bool },
    /// Navigate, overwriting the current history entry.
    Redirect(String),
    /// Update one query parameter in place.
    PushQuery { key: &'static str, value: Option<String> },
    SignIn(Session),
    OpenUrl(String),
    Export { file_name: String, html: String },
    Notify(NotificationLevel, String),
}

#[derive(Debug, Default)]
pub struct Outbox {
    commands: Vec<ViewCommand>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, ticket: Ticket, request: LoadRequest) {
        self.commands.push(ViewCommand::Load { ticket, request });
    }

    pub fn follow(&mut self, href: impl Into<String>, external: bool) {
        self.commands.push(ViewCommand::Follow {
            href: href.into(),
            external,
        });
    }

    pub fn redirect(&mut self, href: impl Into<String>) {
        self.commands.push(ViewCommand::Redirect(href.into()));
    }

    pub fn push_query(&mut self, key: &'static str, value: Option<String>) {
        self.commands.push(ViewCommand::PushQuery { key, value });
    }

    pub fn sign_in(&mut self, session: Session) {
        self.commands.push(ViewCommand::SignIn(session));
    }

    pub fn open_url(&mut self, url: impl Into<String>) {
        self.commands.push(ViewCommand::OpenUrl(url.into()));
    }

    pub fn export(&mut self, file_name: impl Into<String>, html: String) {
        self.commands.push(ViewCommand::Export {
            file_name: file_name.into(),
            html,
        });
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.commands.push(ViewCommand::Notify(level, message.into()));
    }

    pub fn commands(&self) -> &[ViewCommand] {
        &self.commands
    }

    /// Number of loads queued, regardless of endpoint.
    pub fn load_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, ViewCommand::Load { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn take(&mut self) -> Vec<ViewCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// The one mounted view.
#[derive(Debug)]
pub enum ActiveView {
    Login(LoginView),
    Callback(CallbackView),
    Dashboard(DashboardView),
    Project(ProjectView),
    AgentConfig(Box<AgentConfigView>),
    JobLog(JobLogView),
}

impl ActiveView {
    pub fn build(route: &Route, location: &Location, job_log_limit: u32) -> Self {
        match route {
            Route::Login => ActiveView::Login(LoginView::new()),
            Route::AuthCallback => ActiveView::Callback(CallbackView::new(location)),
            Route::Dashboard { query } => ActiveView::Dashboard(DashboardView::new(query.clone())),
            Route::ProjectView { project_id } => ActiveView::Project(ProjectView::new(*project_id)),
            Route::AgentConfig {
                project_id,
                agent,
                agent_type,
            } => ActiveView::AgentConfig(Box::new(AgentConfigView::new(
                *project_id,
                *agent,
                agent_type.clone(),
                job_log_limit,
            ))),
            Route::JobLogDetail {
                project_id,
                agent_id,
                job_id,
            } => ActiveView::JobLog(JobLogView::new(*project_id, *agent_id, *job_id)),
        }
    }

    pub fn mount(&mut self, out: &mut Outbox) {
        match self {
            ActiveView::Login(view) => view.mount(out),
            ActiveView::Callback(view) => view.mount(out),
            ActiveView::Dashboard(view) => view.mount(out),
            ActiveView::Project(view) => view.mount(out),
            ActiveView::AgentConfig(view) => view.mount(out),
            ActiveView::JobLog(view) => view.mount(out),
        }
    }

    /// Route a load outcome to the slot holding its ticket. Returns `false`
    /// when no slot claims it.
    pub fn apply(&mut self, outcome: LoadOutcome, out: &mut Outbox) -> bool {
        match self {
            ActiveView::Login(view) => view.apply(outcome),
            ActiveView::Callback(view) => view.apply(outcome, out),
            ActiveView::Dashboard(view) => view.apply(outcome),
            ActiveView::Project(view) => view.apply(outcome),
            ActiveView::AgentConfig(view) => view.apply(outcome, out),
            ActiveView::JobLog(view) => view.apply(outcome),
        }
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, key: KeyEvent, out: &mut Outbox) {
        match self {
            ActiveView::Login(view) => view.handle_key(action, key, out),
            ActiveView::Callback(view) => view.handle_key(action, out),
            ActiveView::Dashboard(view) => view.handle_key(action, key, out),
            ActiveView::Project(view) => view.handle_key(action, out),
            ActiveView::AgentConfig(view) => view.handle_key(action, key, out),
            ActiveView::JobLog(view) => view.handle_key(action, out),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            ActiveView::Login(view) => view.paste(text),
            ActiveView::Dashboard(view) => view.paste(text),
            ActiveView::AgentConfig(view) => view.paste(text),
            ActiveView::Callback(_) | ActiveView::Project(_) | ActiveView::JobLog(_) => {}
        }
    }

    /// Whether a text input has focus.
    pub fn is_typing(&self) -> bool {
        match self {
            ActiveView::Login(view) => view.editing,
            ActiveView::Dashboard(view) => view.editing,
            ActiveView::AgentConfig(view) => view.editing,
            ActiveView::Callback(_) | ActiveView::Project(_) | ActiveView::JobLog(_) => false,
        }
    }

    fn help(&self) -> &'static str {
        match self {
            ActiveView::Login(_) => "Enter open login page • i paste code • Ctrl+R retry • q quit",
            ActiveView::Callback(_) => "Enter back to login • q quit",
            ActiveView::Dashboard(_) => {
                "/ search • j/k move • Enter open • o open in browser • L logout • q quit"
            }
            ActiveView::Project(_) => {
                "j/k move • Enter configure • o open in browser • Esc back • L logout • q quit"
            }
            ActiveView::AgentConfig(_) => {
                "Tab/j/k field • e edit • Space toggle • Ctrl+S save • Esc back • q quit"
            }
            ActiveView::JobLog(_) => "j/k scroll • x export HTML • o open MR • Esc back • q quit",
        }
    }
}

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    helpers::render_navbar(f, app, layout[0]);

    match &app.view {
        ActiveView::Login(view) => login::render(f, app, view, layout[1]),
        ActiveView::Callback(view) => callback::render(f, app, view, layout[1]),
        ActiveView::Dashboard(view) => dashboard::render(f, app, view, layout[1]),
        ActiveView::Project(view) => project::render(f, app, view, layout[1]),
        ActiveView::AgentConfig(view) => agent_config::render(f, app, view, layout[1]),
        ActiveView::JobLog(view) => job_log::render(f, app, view, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (text, style) = if let Some(note) = app.current_notification() {
        let color = helpers::notification_color(note.level, &app.theme);
        (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(color),
        )
    } else {
        (
            app.view.help().to_string(),
            Style::default().fg(app.theme.text_dim),
        )
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(style);
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_route() {
        let location = Location::parse("/project/3");
        let view = ActiveView::build(&Route::ProjectView { project_id: 3 }, &location, 10);
        assert!(matches!(view, ActiveView::Project(_)));

        let login = ActiveView::build(&Route::Login, &Location::root(), 10);
        assert!(matches!(login, ActiveView::Login(_)));
        assert!(!login.is_typing());
    }

    #[test]
    fn test_outbox_counts_loads() {
        let mut out = Outbox::new();
        out.redirect("/");
        assert_eq!(out.load_count(), 0);
        assert!(!out.is_empty());
        assert_eq!(out.take().len(), 1);
        assert!(out.is_empty());
    }
}
