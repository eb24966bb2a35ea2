use codeair_console::config::ConsoleConfig;
use codeair_console::loader;
use codeair_console::location::Location;
use codeair_console::persistence::{self, PersistedState, PersistenceError};
use codeair_console::router::Route;
use codeair_console::session::Session;
use codeair_console::state::{App, Effect};
use codeair_test_utils::{fixtures, MockConsoleApi};
use std::path::Path;

fn config(dir: &Path) -> ConsoleConfig {
    let contents = format!(
        r#"
api_base_url = "http://localhost:8000/api/v1"
web_base_url = "http://localhost:3000"
request_timeout_ms = 1000
tick_rate_ms = 250
job_log_limit = 10
session_path = "{dir}/state/session.json"
log_path = "{dir}/console.log"
export_dir = "{dir}/exports"
log_level = "info"

[theme]
name = "synthbrute"
"#,
        dir = dir.display()
    );
    ConsoleConfig::from_toml(&contents).unwrap()
}

fn session() -> Session {
    Session {
        token: fixtures::SESSION_TOKEN.to_string(),
        user: fixtures::user(),
    }
}

#[test]
fn missing_file_means_fresh_start() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = persistence::load(&dir.path().join("absent.json")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        persistence::load(&path),
        Err(PersistenceError::Serde(_))
    ));
}

#[test]
fn state_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    let state = PersistedState {
        session: Some(session()),
        last_location: Some(Location::parse("/project/5?tab=agents")),
    };

    persistence::save(&path, &state).unwrap();
    assert_eq!(persistence::load(&path).unwrap(), Some(state));
}

#[test]
fn save_overwrites_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let signed_in = PersistedState {
        session: Some(session()),
        last_location: None,
    };
    persistence::save(&path, &signed_in).unwrap();
    persistence::save(&path, &PersistedState::default()).unwrap();

    assert_eq!(persistence::load(&path).unwrap(), Some(PersistedState::default()));
}

#[cfg(unix)]
#[test]
fn session_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    persistence::save(&path, &PersistedState::default()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn signed_in_session_restores_last_location() {
    let dir = tempfile::tempdir().unwrap();
    let settings = config(dir.path());
    let path = settings.session_path.clone();
    let api = MockConsoleApi::new();

    let mut app = App::new(settings, None, Some("/auth/callback?code=abc".to_string()));
    loop {
        let effects = app.take_effects();
        if effects.is_empty() {
            break;
        }
        for effect in effects {
            match effect {
                Effect::Load(job) => app.apply(loader::run(&api, job).await),
                Effect::Persist => persistence::save(&path, &app.persisted_state()).unwrap(),
                Effect::OpenExternal(_) => {}
            }
        }
    }
    app.follow_link("/project/9", false);
    persistence::save(&path, &app.persisted_state()).unwrap();

    let restored = persistence::load(&path).unwrap();
    assert_eq!(
        restored.as_ref().and_then(|s| s.session.clone()),
        Some(session())
    );
    let app = App::new(config(dir.path()), restored, None);
    assert_eq!(app.route, Route::ProjectView { project_id: 9 });
    assert!(app.session.is_present());
}

#[test]
fn callback_location_is_not_restored() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::new(
        config(dir.path()),
        None,
        Some("/auth/callback?code=once".to_string()),
    );
    let state = app.persisted_state();
    assert_eq!(state.last_location, None);
    assert_eq!(state.session, None);
}

#[test]
fn explicit_href_wins_over_last_location() {
    let dir = tempfile::tempdir().unwrap();
    let persisted = PersistedState {
        session: Some(session()),
        last_location: Some(Location::parse("/project/3")),
    };
    let app = App::new(
        config(dir.path()),
        Some(persisted),
        Some("/project/4".to_string()),
    );
    assert_eq!(app.route, Route::ProjectView { project_id: 4 });
}
