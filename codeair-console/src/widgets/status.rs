//! Inline status tag.

use ratatui::{style::Style, text::Span};

pub struct StatusTag {
    pub label: String,
    pub style: Style,
}

impl StatusTag {
    pub fn new(label: impl Into<String>, style: Style) -> Self {
        Self {
            label: label.into(),
            style,
        }
    }

    pub fn span(&self) -> Span<'static> {
        Span::styled(format!("[{}]", self.label), self.style)
    }
}
