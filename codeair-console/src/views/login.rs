//! Login view.
//!
//! Fetches the OAuth authorization URL and opens it in the browser. The user
//! then pastes the redirect URL (or just the code) back into the console,
//! which continues at the callback route.

use crate::keys::KeyAction;
use crate::load_state::LoadSlot;
use crate::loader::{LoadOutcome, LoadPayload, LoadRequest};
use crate::location::Location;
use crate::router::CALLBACK_PATH;
use crate::state::App;
use crate::views::helpers;
use crate::views::Outbox;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;

#[derive(Debug)]
pub struct LoginView {
    pub authorize: LoadSlot<String>,
    pub input: TextArea<'static>,
    pub editing: bool,
    pub input_error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            authorize: LoadSlot::new(),
            input: TextArea::default(),
            editing: false,
            input_error: None,
        }
    }

    pub fn mount(&mut self, out: &mut Outbox) {
        if self.authorize.is_idle() {
            let ticket = self.authorize.begin("authorize");
            out.load(ticket, LoadRequest::AuthorizationUrl);
        }
    }

    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        if self.authorize.ticket() != Some(&outcome.ticket) {
            return false;
        }
        let ticket = outcome.ticket.clone();
        let result = outcome.into_result(|payload| match payload {
            LoadPayload::Authorize(response) => Some(response.authorization_url),
            _ => None,
        });
        self.authorize.resolve(&ticket, result)
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, key: KeyEvent, out: &mut Outbox) {
        if self.editing {
            match action {
                Some(KeyAction::Submit) => self.submit(out),
                Some(KeyAction::Cancel) => self.editing = false,
                Some(_) => {}
                None => {
                    self.input.input(key);
                }
            }
            return;
        }

        match action {
            Some(KeyAction::Activate) | Some(KeyAction::ActivateExternal) => {
                if let Some(url) = self.authorize.state().loaded() {
                    out.open_url(url.clone());
                    self.editing = true;
                }
            }
            Some(KeyAction::Edit) => self.editing = true,
            _ => {}
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.editing = true;
        self.input.insert_str(text);
    }

    fn submit(&mut self, out: &mut Outbox) {
        let text = self.input.lines().join("");
        match extract_code(&text) {
            Some(code) => {
                self.input_error = None;
                self.editing = false;
                out.redirect(format!(
                    "{}?code={}",
                    CALLBACK_PATH,
                    urlencoding::encode(&code)
                ));
            }
            None => {
                self.input_error = Some("No authorization code found".to_string());
            }
        }
    }
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the authorization code out of a pasted redirect URL, query string
/// or bare code.
pub fn extract_code(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('?') {
        return Location::parse(trimmed)
            .query("code")
            .filter(|code| !code.is_empty())
            .map(str::to_string);
    }
    if let Some(code) = trimmed.strip_prefix("code=") {
        let code = code.split('&').next().unwrap_or("");
        return (!code.is_empty()).then(|| code.to_string());
    }
    if trimmed.contains(['/', ' ', '=', '&']) {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn render(f: &mut Frame<'_>, app: &App, view: &LoginView, area: Rect) {
    let area = helpers::centered(area, 70, 60);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            "CodeAir",
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from("AI agents for your merge requests."),
        Line::from(""),
    ];
    match helpers::pending_text(view.authorize.state(), "Requesting login URL...") {
        Some((text, true)) => lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(app.theme.error),
        ))),
        Some((text, false)) => lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(app.theme.text_dim),
        ))),
        None => {
            lines.push(Line::from("Press Enter to sign in with GitLab in your browser:"));
            if let Some(url) = view.authorize.state().loaded() {
                lines.push(Line::from(Span::styled(
                    url.clone(),
                    Style::default().fg(app.theme.secondary),
                )));
            }
        }
    }
    let intro = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Sign in"));
    f.render_widget(intro, chunks[0]);

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
            .title("Paste redirect URL or code"),
    );
    f.render_widget(input.widget(), chunks[1]);

    if let Some(error) = &view.input_error {
        let error = Paragraph::new(error.clone()).style(Style::default().fg(app.theme.error));
        f.render_widget(error, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_variants() {
        assert_eq!(
            extract_code("http://localhost:3000/auth/callback?code=abc123&state=x").as_deref(),
            Some("abc123")
        );
        assert_eq!(extract_code("?code=q%2Bz").as_deref(), Some("q+z"));
        assert_eq!(extract_code("code=zzz&state=1").as_deref(), Some("zzz"));
        assert_eq!(extract_code("  rawcode  ").as_deref(), Some("rawcode"));
        assert_eq!(extract_code("http://localhost/auth/callback?state=1"), None);
        assert_eq!(extract_code(""), None);
        assert_eq!(extract_code("not a code"), None);
    }

    #[test]
    fn test_mount_requests_url_once() {
        let mut view = LoginView::new();
        let mut out = Outbox::new();
        view.mount(&mut out);
        view.mount(&mut out);
        assert_eq!(out.load_count(), 1);
    }

    #[test]
    fn test_paste_then_submit_redirects_to_callback() {
        let mut view = LoginView::new();
        let mut out = Outbox::new();
        view.paste("http://localhost:3000/auth/callback?code=a%2Fb");
        assert!(view.editing);
        view.handle_key(
            Some(KeyAction::Submit),
            KeyEvent::from(crossterm::event::KeyCode::Enter),
            &mut out,
        );
        assert_eq!(
            out.commands(),
            &[crate::views::ViewCommand::Redirect("/auth/callback?code=a%2Fb".to_string())]
        );
    }
}
