//! Keybinding definitions for the console.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Back,
    Reload,
    Logout,
    MoveUp,
    MoveDown,
    /// Follow the selected link in place.
    Activate,
    /// Open the selected link in the system browser.
    ActivateExternal,
    NextField,
    PrevField,
    Toggle,
    Edit,
    Search,
    Submit,
    Export,
    Cancel,
}

/// Map a key press. While a text input has focus only control keys are
/// mapped; everything else goes to the input.
pub fn map_key(event: KeyEvent, typing: bool) -> Option<KeyAction> {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(KeyAction::Quit),
            KeyCode::Char('r') => Some(KeyAction::Reload),
            KeyCode::Char('s') => Some(KeyAction::Submit),
            KeyCode::Enter => Some(KeyAction::ActivateExternal),
            _ => None,
        };
    }

    if typing {
        return match code {
            KeyCode::Esc => Some(KeyAction::Cancel),
            KeyCode::Enter => Some(KeyAction::Submit),
            KeyCode::Tab => Some(KeyAction::NextField),
            KeyCode::BackTab => Some(KeyAction::PrevField),
            _ => None,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) && code == KeyCode::Enter {
        return Some(KeyAction::ActivateExternal);
    }

    match code {
        KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Esc | KeyCode::Backspace => Some(KeyAction::Back),
        KeyCode::Char('L') => Some(KeyAction::Logout),
        KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::MoveDown),
        KeyCode::Enter => Some(KeyAction::Activate),
        KeyCode::Char('o') => Some(KeyAction::ActivateExternal),
        KeyCode::Tab => Some(KeyAction::NextField),
        KeyCode::BackTab => Some(KeyAction::PrevField),
        KeyCode::Char(' ') => Some(KeyAction::Toggle),
        KeyCode::Char('e') | KeyCode::Char('i') => Some(KeyAction::Edit),
        KeyCode::Char('/') => Some(KeyAction::Search),
        KeyCode::Char('x') => Some(KeyAction::Export),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_passes_characters_through() {
        assert_eq!(map_key(key(KeyCode::Char('q')), true), None);
        assert_eq!(map_key(key(KeyCode::Char('q')), false), Some(KeyAction::Quit));
        assert_eq!(map_key(key(KeyCode::Backspace), true), None);
    }

    #[test]
    fn test_escape_depends_on_focus() {
        assert_eq!(map_key(key(KeyCode::Esc), true), Some(KeyAction::Cancel));
        assert_eq!(map_key(key(KeyCode::Esc), false), Some(KeyAction::Back));
    }

    #[test]
    fn test_control_keys_always_mapped() {
        let reload = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(map_key(reload, true), Some(KeyAction::Reload));
        let external = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(map_key(external, false), Some(KeyAction::ActivateExternal));
    }
}
