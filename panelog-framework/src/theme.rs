use ratatui::{prelude::*, style::Color};
use std::str::FromStr;

pub const FALLBACK_PANEL_COLOR: Color = Color::Gray;

/// Resolves a panel style token ("cyan", "light_blue", "#ff8800", "208")
/// to a colour, falling back to gray for tokens ratatui does not know.
pub fn panel_color(token: &str) -> Color {
    let normalized = token.trim().to_lowercase().replace(['_', '-', ' '], "");
    match Color::from_str(&normalized) {
        Ok(color) => color,
        Err(_) => {
            log::warn!("Unknown panel style '{}', using gray", token);
            FALLBACK_PANEL_COLOR
        }
    }
}

pub const TEXT_FG_COLOR: Color = Color::Gray;

pub const MUTED_FG_COLOR: Color = Color::DarkGray;

pub const HEADER_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

pub const UNAVAILABLE_STYLE: Style = Style::new()
    .fg(Color::LightRed)
    .add_modifier(Modifier::BOLD);

pub const PROGRESS_FILLED_STYLE: Style = Style::new().fg(Color::LightGreen);

pub const PROGRESS_EMPTY_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const INFO_STYLE: Style = Style::new().fg(Color::White);

pub const WARN_STYLE: Style = Style::new().fg(Color::LightYellow);

pub const ERROR_STYLE: Style = Style::new().fg(Color::LightRed);

pub const DEBUG_STYLE: Style = Style::new().fg(Color::LightGreen);

pub const DISPLAY_EVENT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

/// colour for a line of the viewer's own debug log
pub fn debug_line_style(line: &str) -> Style {
    if line.contains(" ERROR ") {
        ERROR_STYLE
    } else if line.contains(" WARN ") {
        WARN_STYLE
    } else if line.contains(" DEBUG ") || line.contains(" TRACE ") {
        DEBUG_STYLE
    } else {
        INFO_STYLE
    }
}
