//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

pub const TITLE_COLOR: Color = Color::Cyan;
pub const MUTED: Color = Color::Gray;
pub const INDEX_COLOR: Color = Color::DarkGray;
pub const ROW_ALT_BG: Color = Color::Indexed(235);
pub const BAR_EMPTY: Color = Color::DarkGray;
pub const STATUS_BAR_BG: Color = Color::Indexed(236);
pub const STATUS_KEY_COLOR: Color = Color::Cyan;
pub const FLASH_SUCCESS: Color = Color::Green;
pub const FLASH_ERROR: Color = Color::Red;

pub const HEADER_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
pub const ROW_SELECTED: Style = Style::new().add_modifier(Modifier::REVERSED);
pub const HIGHLIGHT_STYLE: Style = Style::new()
    .fg(Color::Green)
    .add_modifier(Modifier::BOLD);

/// Color for a mark-scale value: strong students green, weak red.
/// Marks run 0..=10 on the BSUIR scale, but scale to the visible max so
/// the gradient stays useful for by-sum mode too.
pub fn mark_color(value: f64, max_value: f64) -> Color {
    let percentage = if max_value > 0.0 {
        (value / max_value) * 100.0
    } else {
        0.0
    };

    if percentage >= 70.0 {
        Color::Green
    } else if percentage >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
