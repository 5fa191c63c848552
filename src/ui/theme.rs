use ratatui::style::{Color, Modifier, Style};

// ─── Color Palette (terminal-adaptive, transparency-friendly) ──────────

/// Background: always Reset so the terminal background shows through
pub const BG: Color = Color::Reset;

/// Primary text color
pub const FG: Color = Color::White;

/// Dimmed text (labels, inactive elements)
pub const FG_DIM: Color = Color::DarkGray;

/// Accent color (keybinding hints)
pub const ACCENT: Color = Color::Cyan;

/// Border and separator color
pub const BORDER: Color = Color::DarkGray;

/// Sign running
pub const RUNNING: Color = Color::Green;

/// Sign suspended
pub const PAUSED: Color = Color::Yellow;

// ─── Style Constructors ──────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(FG).bg(BG)
}

pub fn style_dim() -> Style {
    Style::default().fg(FG_DIM).bg(BG)
}

pub fn style_key() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG)
        .add_modifier(Modifier::BOLD)
}

pub fn style_separator() -> Style {
    Style::default().fg(BORDER).bg(BG)
}
