//! Event types for the console event loop.

use crate::loader::LoadOutcome;
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    Input(KeyEvent),
    Paste(String),
    Resize { width: u16, height: u16 },
    Loaded(Box<LoadOutcome>),
}
