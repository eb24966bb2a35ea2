//! ANSI SGR rendering for job output.
//!
//! Output is tokenized once into styled runs per line, then rendered either as
//! ratatui lines or as escaped HTML. Only SGR sequences affect styling; every
//! other escape sequence is dropped.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::fmt::Write;

const ESC: char = '\u{1b}';
const BEL: char = '\u{7}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiColor {
    Indexed(u8),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnsiStyle {
    pub fg: Option<AnsiColor>,
    pub bg: Option<AnsiColor>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
}

impl AnsiStyle {
    fn is_plain(&self) -> bool {
        *self == AnsiStyle::default()
    }

    fn apply_sgr(&mut self, params: &str) {
        let codes: Vec<u16> = if params.is_empty() {
            vec![0]
        } else {
            params
                .split(';')
                .map(|p| if p.is_empty() { 0 } else { p.parse().unwrap_or(u16::MAX) })
                .collect()
        };

        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                0 => *self = AnsiStyle::default(),
                1 => self.bold = true,
                2 => self.dim = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                code @ 30..=37 => self.fg = Some(AnsiColor::Indexed((code - 30) as u8)),
                code @ 90..=97 => self.fg = Some(AnsiColor::Indexed((code - 90 + 8) as u8)),
                39 => self.fg = None,
                code @ 40..=47 => self.bg = Some(AnsiColor::Indexed((code - 40) as u8)),
                code @ 100..=107 => self.bg = Some(AnsiColor::Indexed((code - 100 + 8) as u8)),
                49 => self.bg = None,
                code @ (38 | 48) => {
                    let (color, consumed) = extended_color(&codes[i + 1..]);
                    if let Some(color) = color {
                        if code == 38 {
                            self.fg = Some(color);
                        } else {
                            self.bg = Some(color);
                        }
                    }
                    i += consumed;
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parse the arguments after 38/48. Returns the color and how many codes
/// were consumed.
fn extended_color(rest: &[u16]) -> (Option<AnsiColor>, usize) {
    match rest.first() {
        Some(5) => match rest.get(1) {
            Some(n) if *n <= 255 => (Some(AnsiColor::Indexed(*n as u8)), 2),
            Some(_) => (None, 2),
            None => (None, 1),
        },
        Some(2) => {
            if rest.len() < 4 {
                return (None, rest.len());
            }
            let channel = |v: u16| u8::try_from(v).ok();
            match (channel(rest[1]), channel(rest[2]), channel(rest[3])) {
                (Some(r), Some(g), Some(b)) => (Some(AnsiColor::Rgb(r, g, b)), 4),
                _ => (None, 4),
            }
        }
        _ => (None, 0),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiSpan {
    pub text: String,
    pub style: AnsiStyle,
}

/// Tokenize text into lines of styled runs.
pub fn parse(input: &str) -> Vec<Vec<AnsiSpan>> {
    let mut lines: Vec<Vec<AnsiSpan>> = vec![Vec::new()];
    let mut style = AnsiStyle::default();
    let mut buffer = String::new();
    let mut chars = input.chars().peekable();

    let flush = |lines: &mut Vec<Vec<AnsiSpan>>, buffer: &mut String, style: AnsiStyle| {
        if buffer.is_empty() {
            return;
        }
        let text = std::mem::take(buffer);
        if let Some(line) = lines.last_mut() {
            match line.last_mut() {
                Some(last) if last.style == style => last.text.push_str(&text),
                _ => line.push(AnsiSpan { text, style }),
            }
        }
    };

    while let Some(c) = chars.next() {
        match c {
            ESC => {
                flush(&mut lines, &mut buffer, style);
                match chars.next() {
                    Some('[') => {
                        let mut params = String::new();
                        let mut final_byte = None;
                        for next in chars.by_ref() {
                            if ('\u{40}'..='\u{7e}').contains(&next) {
                                final_byte = Some(next);
                                break;
                            }
                            params.push(next);
                        }
                        if final_byte == Some('m') {
                            style.apply_sgr(&params);
                        }
                    }
                    Some(']') => {
                        while let Some(next) = chars.next() {
                            if next == BEL {
                                break;
                            }
                            if next == ESC && chars.peek() == Some(&'\\') {
                                chars.next();
                                break;
                            }
                        }
                    }
                    _ => {}
                }
            }
            '\n' => {
                flush(&mut lines, &mut buffer, style);
                lines.push(Vec::new());
            }
            '\r' => {}
            c => buffer.push(c),
        }
    }
    flush(&mut lines, &mut buffer, style);

    if lines.len() > 1 && lines.last().map(Vec::is_empty).unwrap_or(false) {
        lines.pop();
    }
    lines
}

fn terminal_color(color: AnsiColor) -> Color {
    match color {
        AnsiColor::Indexed(0) => Color::Black,
        AnsiColor::Indexed(1) => Color::Red,
        AnsiColor::Indexed(2) => Color::Green,
        AnsiColor::Indexed(3) => Color::Yellow,
        AnsiColor::Indexed(4) => Color::Blue,
        AnsiColor::Indexed(5) => Color::Magenta,
        AnsiColor::Indexed(6) => Color::Cyan,
        AnsiColor::Indexed(7) => Color::Gray,
        AnsiColor::Indexed(8) => Color::DarkGray,
        AnsiColor::Indexed(9) => Color::LightRed,
        AnsiColor::Indexed(10) => Color::LightGreen,
        AnsiColor::Indexed(11) => Color::LightYellow,
        AnsiColor::Indexed(12) => Color::LightBlue,
        AnsiColor::Indexed(13) => Color::LightMagenta,
        AnsiColor::Indexed(14) => Color::LightCyan,
        AnsiColor::Indexed(15) => Color::White,
        AnsiColor::Indexed(n) => Color::Indexed(n),
        AnsiColor::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

fn terminal_style(style: &AnsiStyle) -> Style {
    let mut out = Style::default();
    if let Some(fg) = style.fg {
        out = out.fg(terminal_color(fg));
    }
    if let Some(bg) = style.bg {
        out = out.bg(terminal_color(bg));
    }
    let mut modifiers = Modifier::empty();
    if style.bold {
        modifiers |= Modifier::BOLD;
    }
    if style.dim {
        modifiers |= Modifier::DIM;
    }
    if style.italic {
        modifiers |= Modifier::ITALIC;
    }
    if style.underline {
        modifiers |= Modifier::UNDERLINED;
    }
    out.add_modifier(modifiers)
}

/// Render as ratatui lines.
pub fn to_lines(input: &str) -> Vec<Line<'static>> {
    parse(input)
        .into_iter()
        .map(|spans| {
            Line::from(
                spans
                    .into_iter()
                    .map(|span| Span::styled(span.text, terminal_style(&span.style)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

const BASE_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 49, 49),
    (13, 188, 121),
    (229, 229, 16),
    (36, 114, 200),
    (188, 63, 188),
    (17, 168, 205),
    (229, 229, 229),
    (102, 102, 102),
    (241, 76, 76),
    (35, 209, 139),
    (245, 245, 67),
    (59, 142, 234),
    (214, 112, 214),
    (41, 184, 219),
    (255, 255, 255),
];

fn rgb_of(color: AnsiColor) -> (u8, u8, u8) {
    match color {
        AnsiColor::Rgb(r, g, b) => (r, g, b),
        AnsiColor::Indexed(n) if n < 16 => BASE_PALETTE[n as usize],
        AnsiColor::Indexed(n) if n < 232 => {
            let cube = n - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (level(cube / 36), level((cube / 6) % 6), level(cube % 6))
        }
        AnsiColor::Indexed(n) => {
            let gray = 8 + (n - 232) * 10;
            (gray, gray, gray)
        }
    }
}

fn css_color(color: AnsiColor) -> String {
    let (r, g, b) = rgb_of(color);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

fn css_declarations(style: &AnsiStyle) -> String {
    let mut decls = Vec::new();
    if let Some(fg) = style.fg {
        decls.push(format!("color:{}", css_color(fg)));
    }
    if let Some(bg) = style.bg {
        decls.push(format!("background-color:{}", css_color(bg)));
    }
    if style.bold {
        decls.push("font-weight:bold".to_string());
    }
    if style.dim {
        decls.push("opacity:0.7".to_string());
    }
    if style.italic {
        decls.push("font-style:italic".to_string());
    }
    if style.underline {
        decls.push("text-decoration:underline".to_string());
    }
    decls.join(";")
}

/// Render as escaped HTML markup with `<br/>` line breaks.
pub fn to_html(input: &str) -> String {
    let mut out = String::new();
    for (index, line) in parse(input).iter().enumerate() {
        if index > 0 {
            out.push_str("<br/>");
        }
        for span in line {
            if span.style.is_plain() {
                escape_html(&span.text, &mut out);
            } else {
                let _ = write!(out, "<span style=\"{}\">", css_declarations(&span.style));
                escape_html(&span.text, &mut out);
                out.push_str("</span>");
            }
        }
    }
    out
}

/// Standalone HTML page with one titled section per output stream.
pub fn html_document(title: &str, sections: &[(&str, &str)]) -> String {
    let mut escaped_title = String::new();
    escape_html(title, &mut escaped_title);

    let mut body = String::new();
    for (heading, content) in sections {
        let mut escaped_heading = String::new();
        escape_html(heading, &mut escaped_heading);
        let _ = write!(
            body,
            "<h2>{}</h2>\n<pre class=\"output\">{}</pre>\n",
            escaped_heading,
            to_html(content)
        );
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<title>{title}</title>\n\
         <style>body{{background:#0a0a0a;color:#e5e5e5;font-family:monospace}}\
         pre.output{{background:#1a1a1a;padding:1em;white-space:pre-wrap}}</style>\n\
         </head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escaped_title,
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(input: &str) -> String {
        parse(input)
            .iter()
            .map(|line| line.iter().map(|span| span.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_plain_text_single_span() {
        let lines = parse("hello world");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0].text, "hello world");
        assert!(lines[0][0].style.is_plain());
    }

    #[test]
    fn test_basic_colors_and_reset() {
        let lines = parse("\u{1b}[31mred\u{1b}[0m plain");
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[0][0].style.fg, Some(AnsiColor::Indexed(1)));
        assert_eq!(lines[0][1].text, " plain");
        assert!(lines[0][1].style.is_plain());
    }

    #[test]
    fn test_bright_and_extended_colors() {
        let lines = parse("\u{1b}[92;1mA\u{1b}[38;5;208mB\u{1b}[48;2;1;2;3mC");
        let spans = &lines[0];
        assert_eq!(spans[0].style.fg, Some(AnsiColor::Indexed(10)));
        assert!(spans[0].style.bold);
        assert_eq!(spans[1].style.fg, Some(AnsiColor::Indexed(208)));
        assert_eq!(spans[2].style.bg, Some(AnsiColor::Rgb(1, 2, 3)));
    }

    #[test]
    fn test_non_sgr_sequences_dropped() {
        assert_eq!(strip("a\u{1b}[2Kb\u{1b}]0;title\u{7}c\r"), "abc");
    }

    #[test]
    fn test_newlines_split_lines_and_keep_style() {
        let lines = parse("\u{1b}[33mone\ntwo\u{1b}[0m\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1][0].text, "two");
        assert_eq!(lines[1][0].style.fg, Some(AnsiColor::Indexed(3)));
    }

    #[test]
    fn test_to_lines_styles() {
        let lines = to_lines("\u{1b}[1;34mbold blue");
        let span = &lines[0].spans[0];
        assert_eq!(span.style.fg, Some(Color::Blue));
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_to_html_escapes_and_styles() {
        let html = to_html("<b>&\n\u{1b}[31merr\u{1b}[0m");
        assert_eq!(
            html,
            "&lt;b&gt;&amp;<br/><span style=\"color:#cd3131\">err</span>"
        );
    }

    #[test]
    fn test_html_document_contains_sections() {
        let doc = html_document("Run #4", &[("stdout", "ok"), ("stderr", "")]);
        assert!(doc.contains("<title>Run #4</title>"));
        assert!(doc.contains("<h2>stdout</h2>"));
        assert!(doc.contains("<pre class=\"output\">ok</pre>"));
    }

    #[test]
    fn test_palette_cube_and_gray() {
        assert_eq!(rgb_of(AnsiColor::Indexed(16)), (0, 0, 0));
        assert_eq!(rgb_of(AnsiColor::Indexed(231)), (255, 255, 255));
        assert_eq!(rgb_of(AnsiColor::Indexed(232)), (8, 8, 8));
    }
}
