//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Category;

/// Status bar and dialog background.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Completed tasks and the selected completion segment.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Delete confirmation.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

/// Accent used for a category label.
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Work => Color::Blue,
        Category::Home => DARK_GREEN,
        Category::Personal => DARK_PURPLE,
        Category::Shopping => GOLD,
        Category::Study => Color::Cyan,
        Category::Other => Color::Gray,
    }
}
