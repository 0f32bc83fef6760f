//! Styles for the repository browser

use ratatui::style::{Color, Modifier, Style};

const ACCENT: Color = Color::Cyan;

pub struct Theme;

impl Theme {
    pub const HEADER: Style = Style::new().fg(ACCENT);
    pub const STATUS_BAR: Style = Style::new().bg(Color::DarkGray);
    /// Highlighted row in the repository and branch lists
    pub const SELECTED: Style = Style::new().bg(ACCENT).fg(Color::Black);
    pub const LIST_BORDER: Style = Style::new();
    /// Secondary details: language, stars, timestamps, hints
    pub const MUTED: Style = Style::new().fg(Color::DarkGray);
    pub const ERROR: Style = Style::new().fg(Color::Red);
    /// Lock shown on private repositories and protected branches
    pub const LOCK: Style = Style::new().fg(Color::Yellow);
    pub const SEARCH_BORDER: Style = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
}
