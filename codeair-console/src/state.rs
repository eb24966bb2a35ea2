//! Application state: current location, route and mounted view.
//!
//! [`App`] is the single owner of navigation. Views ask for navigation by
//! writing commands into an [`Outbox`]; the app applies them here and turns
//! anything that needs the outside world (network, browser, disk) into an
//! [`Effect`] for the event loop to execute.

use crate::config::ConsoleConfig;
use crate::export;
use crate::history::History;
use crate::keys::{map_key, KeyAction};
use crate::load_state::Ticket;
use crate::loader::{LoadJob, LoadOutcome, LoadRequest};
use crate::location::Location;
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::router::{self, Route};
use crate::session::SessionStore;
use crate::theme::SynthBruteTheme;
use crate::views::{ActiveView, Outbox, ViewCommand};
use chrono::Utc;
use codeair_core::ApiEndpoint;
use crossterm::event::KeyEvent;
use std::collections::VecDeque;

/// Work the event loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Load(LoadJob),
    /// Hand a URL or file path to the system opener.
    OpenExternal(String),
    /// Write [`App::persisted_state`] to disk.
    Persist,
}

#[derive(Debug)]
pub struct App {
    pub config: ConsoleConfig,
    pub theme: SynthBruteTheme,
    pub session: SessionStore,
    pub history: History,
    pub route: Route,
    pub view: ActiveView,
    pub notifications: Vec<Notification>,
    /// Full view rebuilds so far. In-place query updates do not count.
    pub reloads: u64,
    pub should_quit: bool,
    /// OAuth exchange in flight. Outlives the callback view so a remount
    /// never spends the same code twice.
    pending_exchange: Option<Ticket>,
    effects: VecDeque<Effect>,
}

impl App {
    /// Restore the persisted session and open `open_href`, the last visited
    /// location, or `/`, in that order.
    pub fn new(
        config: ConsoleConfig,
        persisted: Option<PersistedState>,
        open_href: Option<String>,
    ) -> Self {
        let persisted = persisted.unwrap_or_default();
        let session = SessionStore::new(persisted.session);
        let location = match open_href {
            Some(href) => Location::parse(&href),
            None => persisted.last_location.unwrap_or_else(Location::root),
        };
        let route = router::resolve(&location, session.is_present());
        let view = ActiveView::build(&route, &location, config.job_log_limit);

        let mut app = Self {
            theme: SynthBruteTheme::synthbrute(),
            config,
            session,
            history: History::new(location),
            route,
            view,
            notifications: Vec::new(),
            reloads: 0,
            should_quit: false,
            pending_exchange: None,
            effects: VecDeque::new(),
        };
        app.mount_current();
        app
    }

    /// Resolve the current location and mount a fresh view for it.
    pub fn mount_current(&mut self) {
        let location = self.history.current().clone();
        self.route = router::resolve(&location, self.session.is_present());
        tracing::debug!(
            location = %location,
            route = self.route.name(),
            signed_in = self.session.is_present(),
            "Mounting view"
        );
        self.view = ActiveView::build(&self.route, &location, self.config.job_log_limit);
        self.reloads += 1;
        if let (ActiveView::Callback(view), Some(ticket)) = (&mut self.view, &self.pending_exchange) {
            view.resume(ticket.clone());
        }

        let mut out = Outbox::new();
        self.view.mount(&mut out);
        self.process(out);
    }

    /// Navigate to a console href. With `external` the href is opened in the
    /// browser instead and the console stays where it is.
    pub fn follow_link(&mut self, href: &str, external: bool) {
        if external {
            let url = self.config.web_url(href);
            tracing::debug!(url = %url, "Opening link externally");
            self.effects.push_back(Effect::OpenExternal(url));
            return;
        }
        tracing::debug!(href, "Following link");
        self.history.push(Location::parse(href));
        self.mount_current();
    }

    /// Navigate, overwriting the current history entry.
    pub fn redirect(&mut self, href: &str) {
        tracing::debug!(href, "Redirecting");
        self.history.replace(Location::parse(href));
        self.mount_current();
    }

    pub fn back(&mut self) {
        if self.history.back().is_some() {
            self.mount_current();
        }
    }

    /// User-initiated retry of everything on the current page.
    pub fn reload(&mut self) {
        self.mount_current();
    }

    /// Push a copy of the current location with one query value changed. The
    /// mounted view is kept.
    pub fn update_query(&mut self, key: &str, value: Option<&str>) {
        let location = self.history.current().with_query(key, value);
        tracing::debug!(location = %location, "Updating query");
        self.history.push(location);
        self.route = router::resolve(self.history.current(), self.session.is_present());
    }

    /// Drop the session locally and revoke the token in the background.
    pub fn logout(&mut self) {
        let Some(session) = self.session.clear() else {
            return;
        };
        tracing::info!(username = %session.user.username, "Signing out");
        self.effects.push_back(Effect::Load(LoadJob {
            ticket: Ticket::issue("logout"),
            token: Some(session.token),
            request: LoadRequest::Logout,
        }));
        self.effects.push_back(Effect::Persist);
        self.notify(NotificationLevel::Info, "Signed out");
        self.mount_current();
    }

    /// Hand a finished load to the mounted view.
    pub fn apply(&mut self, outcome: LoadOutcome) {
        if outcome.endpoint == ApiEndpoint::Logout {
            if let Err(err) = &outcome.result {
                tracing::warn!(status = ?err.status, error = %err, "Logout request failed");
            }
            return;
        }
        if outcome.endpoint == ApiEndpoint::ExchangeCode
            && self.pending_exchange.as_ref() == Some(&outcome.ticket)
        {
            self.pending_exchange = None;
        }
        let request_id = outcome.ticket.request_id;
        let mut out = Outbox::new();
        if !self.view.apply(outcome, &mut out) {
            tracing::debug!(request_id, "Load result has no slot in the current view");
        }
        self.process(out);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key, self.view.is_typing());
        match action {
            Some(KeyAction::Quit) => self.should_quit = true,
            Some(KeyAction::Back) => self.back(),
            Some(KeyAction::Reload) => self.reload(),
            Some(KeyAction::Logout) => self.logout(),
            _ => {
                let mut out = Outbox::new();
                self.view.handle_key(action, key, &mut out);
                self.process(out);
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.view.handle_paste(text);
    }

    /// Periodic housekeeping.
    pub fn tick(&mut self) {
        let now = Utc::now();
        self.notifications.retain(|note| !note.is_expired(now));
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.effects.drain(..).collect()
    }

    /// What survives a restart. A callback location is never restored since
    /// its code is single-use.
    pub fn persisted_state(&self) -> PersistedState {
        let last_location = match self.route {
            Route::AuthCallback => None,
            _ => Some(self.history.current().clone()),
        };
        PersistedState {
            session: self.session.get().cloned(),
            last_location,
        }
    }

    pub fn current_notification(&self) -> Option<&Notification> {
        let now = Utc::now();
        self.notifications.iter().rev().find(|note| !note.is_expired(now))
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    fn process(&mut self, mut out: Outbox) {
        for command in out.take() {
            match command {
                ViewCommand::Load { ticket, request } => {
                    if matches!(request, LoadRequest::ExchangeCode { .. }) {
                        self.pending_exchange = Some(ticket.clone());
                    }
                    self.effects.push_back(Effect::Load(LoadJob {
                        ticket,
                        token: self.session.token().map(str::to_string),
                        request,
                    }));
                }
                ViewCommand::Follow { href, external } => self.follow_link(&href, external),
                ViewCommand::Redirect(href) => self.redirect(&href),
                ViewCommand::PushQuery { key, value } => self.update_query(key, value.as_deref()),
                ViewCommand::SignIn(session) => {
                    tracing::info!(username = %session.user.username, "Signed in");
                    self.session.establish(session);
                    self.effects.push_back(Effect::Persist);
                }
                ViewCommand::OpenUrl(url) => self.effects.push_back(Effect::OpenExternal(url)),
                ViewCommand::Export { file_name, html } => {
                    match export::write_html(&self.config.export_dir, &file_name, &html) {
                        Ok(path) => {
                            let path = path.display().to_string();
                            self.notify(NotificationLevel::Success, format!("Exported {}", path));
                            self.effects.push_back(Effect::OpenExternal(path));
                        }
                        Err(err) => {
                            tracing::warn!(file_name = %file_name, error = %err, "Export failed");
                            self.notify(NotificationLevel::Error, format!("Export failed: {}", err));
                        }
                    }
                }
                ViewCommand::Notify(level, message) => self.notify(level, message),
            }
        }
    }
}
