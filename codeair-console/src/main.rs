//! CodeAir console entry point.

use codeair_console::api_client::RestClient;
use codeair_console::config::{open_href_from_args, ConsoleConfig};
use codeair_console::error::ConsoleError;
use codeair_console::events::ConsoleEvent;
use codeair_console::loader;
use codeair_console::logging;
use codeair_console::notifications::NotificationLevel;
use codeair_console::persistence;
use codeair_console::state::{App, Effect};
use codeair_console::views::render_view;
use codeair_core::ConsoleApi;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    let config = ConsoleConfig::load()?;
    logging::init(&config.log_path, &config.log_level)?;
    tracing::info!(api = %config.api_base_url, "CodeAir console starting");

    let persisted = match persistence::load(&config.session_path) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(path = %config.session_path.display(), error = %err, "Ignoring unreadable session file");
            None
        }
    };
    let api: Arc<dyn ConsoleApi> = Arc::new(RestClient::new(&config)?);
    let mut app = App::new(config, persisted, open_href_from_args());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<ConsoleEvent>(256);
    spawn_input_reader(event_tx.clone());

    let tick_rate = Duration::from_millis(app.config.tick_rate_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        run_effects(&mut app, &api, &event_tx);
        if app.should_quit {
            break;
        }
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.tick(),
            Some(event) = event_rx.recv() => handle_event(&mut app, event),
        }
    }

    save_state(&app);
    tracing::info!("CodeAir console exiting");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, ConsoleError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<ConsoleEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            let event = match event::read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    ConsoleEvent::Input(key)
                }
                Ok(CrosstermEvent::Paste(text)) => ConsoleEvent::Paste(text),
                Ok(CrosstermEvent::Resize(width, height)) => ConsoleEvent::Resize { width, height },
                _ => continue,
            };
            if sender.blocking_send(event).is_err() {
                break;
            }
        }
    });
}

fn handle_event(app: &mut App, event: ConsoleEvent) {
    match event {
        ConsoleEvent::Input(key) => app.handle_key(key),
        ConsoleEvent::Paste(text) => app.handle_paste(&text),
        ConsoleEvent::Loaded(outcome) => app.apply(*outcome),
        ConsoleEvent::Resize { width, height } => {
            tracing::trace!(width, height, "Terminal resized");
        }
    }
}

fn run_effects(app: &mut App, api: &Arc<dyn ConsoleApi>, sender: &mpsc::Sender<ConsoleEvent>) {
    for effect in app.take_effects() {
        match effect {
            Effect::Load(job) => {
                let api = Arc::clone(api);
                let sender = sender.clone();
                tokio::spawn(async move {
                    let outcome = loader::run(api.as_ref(), job).await;
                    let _ = sender.send(ConsoleEvent::Loaded(Box::new(outcome))).await;
                });
            }
            Effect::OpenExternal(target) => {
                if let Err(err) = open::that_detached(&target) {
                    tracing::warn!(url = %target, error = %err, "Failed to open in browser");
                    app.notify(NotificationLevel::Error, format!("Could not open {}", target));
                }
            }
            Effect::Persist => save_state(app),
        }
    }
}

fn save_state(app: &App) {
    if let Err(err) = persistence::save(&app.config.session_path, &app.persisted_state()) {
        tracing::warn!(path = %app.config.session_path.display(), error = %err, "Failed to persist session");
    }
}
