//! OAuth callback view.

use crate::keys::KeyAction;
use crate::load_state::{LoadSlot, LoadState, Ticket};
use crate::loader::{LoadOutcome, LoadPayload, LoadRequest};
use crate::location::Location;
use crate::session::Session;
use crate::state::App;
use crate::views::helpers;
use crate::views::Outbox;
use codeair_core::AuthResponse;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub const MISSING_CODE_MESSAGE: &str = "No authorization code found";

#[derive(Debug)]
pub struct CallbackView {
    pub code: Option<String>,
    pub exchange: LoadSlot<AuthResponse>,
    /// Held from the moment the exchange is issued until it fails.
    in_flight: bool,
}

impl CallbackView {
    pub fn new(location: &Location) -> Self {
        Self {
            code: location
                .query("code")
                .filter(|code| !code.is_empty())
                .map(str::to_string),
            exchange: LoadSlot::new(),
            in_flight: false,
        }
    }

    pub fn mount(&mut self, out: &mut Outbox) {
        if self.in_flight || !self.exchange.is_idle() {
            return;
        }
        match &self.code {
            Some(code) => {
                self.in_flight = true;
                let ticket = self.exchange.begin(code.clone());
                out.load(ticket, LoadRequest::ExchangeCode { code: code.clone() });
            }
            None => self.exchange.fail(MISSING_CODE_MESSAGE),
        }
    }

    /// Attach to an exchange already in flight for this view's code. A
    /// remounted view then waits for that result instead of spending the
    /// code a second time.
    pub fn resume(&mut self, ticket: Ticket) {
        if self.code.as_deref() == Some(ticket.key.as_str()) {
            self.exchange.adopt(ticket);
            self.in_flight = true;
        }
    }

    pub fn apply(&mut self, outcome: LoadOutcome, out: &mut Outbox) -> bool {
        if self.exchange.ticket() != Some(&outcome.ticket) {
            return false;
        }
        let ticket = outcome.ticket.clone();
        let result = outcome.into_result(|payload| match payload {
            LoadPayload::Auth(auth) => Some(auth),
            _ => None,
        });
        if !self.exchange.resolve(&ticket, result) {
            return false;
        }
        match self.exchange.state() {
            LoadState::Loaded(auth) => {
                out.sign_in(Session {
                    token: auth.token.clone(),
                    user: auth.user.clone(),
                });
                out.redirect("/");
            }
            _ => self.in_flight = false,
        }
        true
    }

    pub fn handle_key(&mut self, action: Option<KeyAction>, out: &mut Outbox) {
        if let Some(KeyAction::Activate) = action {
            if self.exchange.state().error().is_some() {
                out.redirect("/");
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

pub fn render(f: &mut Frame<'_>, app: &App, view: &CallbackView, area: Rect) {
    let area = helpers::centered(area, 60, 40);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    match view.exchange.state() {
        LoadState::Failed(message) => {
            let body = Paragraph::new(format!("Authentication failed\n\n{}", message))
                .style(Style::default().fg(app.theme.error))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(app.theme.error))
                        .title("Sign in"),
                );
            f.render_widget(body, chunks[0]);
            let hint = Paragraph::new("Press Enter to return to login")
                .style(Style::default().fg(app.theme.text_dim));
            f.render_widget(hint, chunks[1]);
        }
        _ => {
            let body = Paragraph::new("Authenticating...")
                .style(Style::default().fg(app.theme.text_dim))
                .block(Block::default().borders(Borders::ALL).title("Sign in"));
            f.render_widget(body, chunks[0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewCommand;
    use codeair_core::{ApiEndpoint, ApiError};
    use codeair_test_utils::fixtures;

    #[test]
    fn test_missing_code_fails_without_call() {
        let mut view = CallbackView::new(&Location::parse("/auth/callback"));
        let mut out = Outbox::new();
        view.mount(&mut out);
        assert!(out.is_empty());
        assert_eq!(view.exchange.state().error(), Some(MISSING_CODE_MESSAGE));
    }

    #[test]
    fn test_double_mount_issues_one_exchange() {
        let mut view = CallbackView::new(&Location::parse("/auth/callback?code=abc"));
        let mut out = Outbox::new();
        view.mount(&mut out);
        view.mount(&mut out);
        assert_eq!(out.load_count(), 1);
        assert!(view.is_in_flight());
    }

    #[test]
    fn test_resumed_view_waits_for_existing_exchange() {
        let location = Location::parse("/auth/callback?code=abc");
        let mut first = CallbackView::new(&location);
        let mut out = Outbox::new();
        first.mount(&mut out);
        let ticket = first.exchange.ticket().cloned().unwrap();
        out.take();

        let mut second = CallbackView::new(&location);
        second.resume(ticket.clone());
        second.mount(&mut out);
        assert!(out.is_empty());
        assert!(second.is_in_flight());
        assert_eq!(second.exchange.ticket(), Some(&ticket));

        let mut other = CallbackView::new(&Location::parse("/auth/callback?code=xyz"));
        other.resume(ticket);
        other.mount(&mut out);
        assert_eq!(out.load_count(), 1);
    }

    #[test]
    fn test_success_signs_in_and_redirects_home() {
        let mut view = CallbackView::new(&Location::parse("/auth/callback?code=abc"));
        let mut out = Outbox::new();
        view.mount(&mut out);
        let ticket = view.exchange.ticket().cloned().unwrap();
        out.take();

        let outcome = LoadOutcome {
            ticket,
            endpoint: ApiEndpoint::ExchangeCode,
            result: Ok(LoadPayload::Auth(AuthResponse {
                token: fixtures::SESSION_TOKEN.to_string(),
                user: fixtures::user(),
            })),
        };
        assert!(view.apply(outcome, &mut out));
        let commands = out.take();
        assert!(matches!(commands[0], ViewCommand::SignIn(_)));
        assert_eq!(commands[1], ViewCommand::Redirect("/".to_string()));
    }

    #[test]
    fn test_failure_releases_guard_and_offers_login() {
        let mut view = CallbackView::new(&Location::parse("/auth/callback?code=abc"));
        let mut out = Outbox::new();
        view.mount(&mut out);
        let ticket = view.exchange.ticket().cloned().unwrap();
        out.take();

        let outcome = LoadOutcome {
            ticket,
            endpoint: ApiEndpoint::ExchangeCode,
            result: Err(ApiError::new(ApiEndpoint::ExchangeCode, Some(400), "Invalid code")),
        };
        assert!(view.apply(outcome, &mut out));
        assert!(!view.is_in_flight());
        assert_eq!(view.exchange.state().error(), Some("Invalid code"));
        assert!(out.is_empty());

        view.handle_key(Some(KeyAction::Activate), &mut out);
        assert_eq!(out.take(), vec![ViewCommand::Redirect("/".to_string())]);
    }
}
