//! CodeAir console library exports.

pub mod ansi;
pub mod api_client;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod history;
pub mod keys;
pub mod load_state;
pub mod loader;
pub mod location;
pub mod logging;
pub mod notifications;
pub mod persistence;
pub mod router;
pub mod session;
pub mod state;
pub mod theme;
pub mod views;
pub mod widgets;
