//! Breadcrumb trail shown above page content.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    /// Console href; the last crumb usually has none.
    pub href: Option<String>,
}

impl Crumb {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    pub fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

pub struct Breadcrumb {
    crumbs: Vec<Crumb>,
    link_style: Style,
    current_style: Style,
}

impl Breadcrumb {
    pub fn new(crumbs: Vec<Crumb>) -> Self {
        Self {
            crumbs,
            link_style: Style::default(),
            current_style: Style::default(),
        }
    }

    pub fn with_style(mut self, link_style: Style, current_style: Style) -> Self {
        self.link_style = link_style;
        self.current_style = current_style;
        self
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans = Vec::with_capacity(self.crumbs.len() * 2);
        for (index, crumb) in self.crumbs.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw(" › "));
            }
            let style = if crumb.href.is_some() {
                self.link_style
            } else {
                self.current_style
            };
            spans.push(Span::styled(crumb.label.clone(), style));
        }
        Line::from(spans)
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        f.render_widget(Paragraph::new(self.line()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_joins_labels() {
        let crumbs = Breadcrumb::new(vec![
            Crumb::link("Dashboard", "/"),
            Crumb::link("Project", "/project/1"),
            Crumb::current("Run #4"),
        ]);
        let text: String = crumbs.line().spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(text, "Dashboard › Project › Run #4");
    }
}
