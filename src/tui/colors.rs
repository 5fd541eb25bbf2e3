//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header and status bar background
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// In-progress rows
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Error messages
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Picker popups
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

/// Bar colors for the team chart, cycled in rank order.
pub const TEAM_PALETTE: [Color; 6] = [
    Color::Cyan,
    GOLD,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightBlue,
    Color::LightRed,
];

/// Color for the n-th team in the chart.
pub fn team_color(rank: usize) -> Color {
    TEAM_PALETTE[rank % TEAM_PALETTE.len()]
}
