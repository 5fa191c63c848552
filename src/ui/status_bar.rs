use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::ui::theme;

/// Render the bottom status bar with keybindings and live sign counters
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    // Left: keybindings
    let key_spans: Vec<Span> = keybindings()
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(format!(" {} ", key), theme::style_key()),
                Span::styled(format!("{} ", desc), theme::style_dim()),
                Span::styled("│", theme::style_separator()),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(key_spans)), chunks[0]);

    // Right: status info
    let state = if app.sign.is_suspended() {
        Span::styled(" ⏸ Paused", Style::default().fg(theme::PAUSED))
    } else {
        Span::styled(" ● Live", Style::default().fg(theme::RUNNING))
    };

    let entry = match app.playlist.current() {
        Some(i) => format!(" {}/{} ", i + 1, app.playlist.len()),
        None => " -/- ".to_string(),
    };

    let counters = format!(
        " {} lit / {} LEDs ",
        app.sign.active_count(),
        app.sign.led_count()
    );

    let status_line = Line::from(vec![
        Span::styled(entry, theme::style_default()),
        Span::styled("│", theme::style_separator()),
        Span::styled(counters, theme::style_dim()),
        Span::styled("│", theme::style_separator()),
        state,
        Span::raw(" "),
    ]);
    let status = Paragraph::new(status_line).alignment(ratatui::layout::Alignment::Right);
    f.render_widget(status, chunks[1]);
}

fn keybindings() -> [(&'static str, &'static str); 5] {
    [
        ("q", "Quit"),
        ("Space", "Pause"),
        ("n/p", "Next/Prev"),
        ("1-9", "Jump"),
        ("s", "Scroll"),
    ]
}
