//! SynthBrute theme and color utilities.

use codeair_core::JobStatus;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct SynthBruteTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl SynthBruteTheme {
    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            text_muted: Color::Rgb(68, 68, 68),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

pub fn job_status_color(status: JobStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        JobStatus::Pending => theme.text_dim,
        JobStatus::Running => theme.primary,
        JobStatus::Finished => theme.success,
    }
}

pub fn exit_code_color(exit_code: Option<i32>, theme: &SynthBruteTheme) -> Color {
    match exit_code {
        None => theme.text_dim,
        Some(0) => theme.success,
        Some(_) => theme.error,
    }
}

pub fn enabled_color(enabled: bool, theme: &SynthBruteTheme) -> Color {
    if enabled {
        theme.success
    } else {
        theme.text_dim
    }
}
