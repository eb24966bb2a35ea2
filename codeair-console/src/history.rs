//! Navigation history for the console.

use crate::location::Location;

/// Linear history with a cursor. Pushing drops any entries after the cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    /// Overwrite the current entry.
    pub fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }

    /// Step back one entry. `None` at the start of history.
    pub fn back(&mut self) -> Option<&Location> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_back() {
        let mut history = History::new(Location::root());
        history.push(Location::parse("/project/1"));
        history.push(Location::parse("/project/2"));
        assert_eq!(history.len(), 3);
        assert_eq!(history.back().map(Location::href), Some("/project/1".to_string()));
        assert_eq!(history.back().map(Location::href), Some("/".to_string()));
        assert!(history.back().is_none());
        assert_eq!(history.current().href(), "/");
    }

    #[test]
    fn test_push_after_back_drops_forward_entries() {
        let mut history = History::new(Location::root());
        history.push(Location::parse("/project/1"));
        history.back();
        history.push(Location::parse("/project/9"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().href(), "/project/9");
    }

    #[test]
    fn test_replace_keeps_length() {
        let mut history = History::new(Location::parse("/auth/callback?code=x"));
        history.replace(Location::root());
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().href(), "/");
        assert!(!history.can_go_back());
    }
}
