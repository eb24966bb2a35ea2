//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailField<'a> {
    pub label: &'a str,
    pub value: String,
    pub value_style: Option<Style>,
}

impl<'a> DetailField<'a> {
    pub fn new(label: &'a str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            value_style: None,
        }
    }

    pub fn styled(label: &'a str, value: impl Into<String>, style: Style) -> Self {
        Self {
            label,
            value: value.into(),
            value_style: Some(style),
        }
    }
}

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<DetailField<'a>>,
    pub label_style: Style,
    pub border_style: Style,
}

impl<'a> DetailPanel<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let width = self.fields.iter().map(|field| field.label.len()).max().unwrap_or(0);
        let lines: Vec<Line> = self
            .fields
            .iter()
            .map(|field| {
                let value = match field.value_style {
                    Some(style) => Span::styled(field.value.clone(), style),
                    None => Span::raw(field.value.clone()),
                };
                Line::from(vec![
                    Span::styled(format!("{:<width$}  ", field.label, width = width), self.label_style),
                    value,
                ])
            })
            .collect();

        let widget = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(self.border_style),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(widget, area);
    }
}
