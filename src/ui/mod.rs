pub mod led_view;
pub mod status_bar;
pub mod theme;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::app::App;

/// Rows reserved below the sign
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Top-level draw function: the sign above, the status bar below
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(f.area());

    f.render_widget(Block::default().style(theme::style_default()), chunks[0]);
    f.render_widget(app.sign.renderer(), chunks[0]);
    status_bar::render(f, app, chunks[1]);
}
