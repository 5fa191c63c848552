use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use ledsign::led::{Cell, Dimensions, Rgb};
use ledsign::render::Renderer;

/// Glyphs from fully lit down to a pinprick
const GLYPHS: [(f32, char); 4] = [(0.85, '●'), (0.6, '•'), (0.3, '∙'), (0.0, '·')];

/// Rasterizes LEDs onto terminal cells, one cell per `px_per_cell` pixels.
/// A frame is staged by the sign and drawn later as a widget.
#[derive(Debug)]
pub struct TerminalRenderer {
    cols: u16,
    rows: u16,
    px_per_cell: f32,
    led_size: f32,
    staged: Vec<Option<(char, Color)>>,
}

impl TerminalRenderer {
    pub fn new(cols: u16, rows: u16, px_per_cell: f32) -> Self {
        Self {
            cols,
            rows,
            px_per_cell: px_per_cell.max(f32::EPSILON),
            led_size: px_per_cell,
            staged: vec![None; cols as usize * rows as usize],
        }
    }

    /// Terminal area changed; drops the staged frame.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.staged = vec![None; cols as usize * rows as usize];
    }

    /// Surface size in pixels for the sign
    pub fn surface_size(&self) -> (f32, f32) {
        (
            self.cols as f32 * self.px_per_cell,
            self.rows as f32 * self.px_per_cell,
        )
    }

    pub fn staged(&self, col: u16, row: u16) -> Option<(char, Color)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.staged[row as usize * self.cols as usize + col as usize]
    }

    fn glyph_for(&self, size: f32) -> char {
        let ratio = if self.led_size > 0.0 { size / self.led_size } else { 0.0 };
        GLYPHS
            .iter()
            .find(|(min, _)| ratio >= *min)
            .map_or('·', |(_, c)| *c)
    }
}

/// Darken an RGB color by the LED's opacity; named colors pass through.
fn dim(color: Color, opacity: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => Rgb::new(r, g, b).dimmed(opacity).to_color(),
        other => other,
    }
}

impl Renderer for TerminalRenderer {
    fn setup(&mut self, dims: &Dimensions) {
        self.led_size = dims.led_size;
    }

    fn begin_frame(&mut self) {
        self.staged.fill(None);
    }

    fn draw(&mut self, cell: &Cell, x: f32, y: f32, color: Color) {
        let col = (x / self.px_per_cell).floor();
        let row = (y / self.px_per_cell).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return;
        }
        let idx = row as usize * self.cols as usize + col as usize;
        self.staged[idx] = Some((
            self.glyph_for(cell.current_size),
            dim(color, cell.current_opacity),
        ));
    }
}

impl Widget for &TerminalRenderer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..self.rows.min(area.height) {
            for col in 0..self.cols.min(area.width) {
                let Some((glyph, color)) = self.staged(col, row) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(glyph).set_fg(color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledsign::{LedSign, Pattern, SignOptions, TransitionOptions};

    #[test]
    fn glyph_tracks_size() {
        let r = TerminalRenderer::new(1, 1, 10.0);
        assert_eq!(r.glyph_for(10.0), '●');
        assert_eq!(r.glyph_for(7.0), '•');
        assert_eq!(r.glyph_for(3.5), '∙');
        assert_eq!(r.glyph_for(1.0), '·');
    }

    #[test]
    fn dims_rgb_only() {
        assert_eq!(dim(Color::Rgb(200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
        assert_eq!(dim(Color::Red, 0.1), Color::Red);
    }

    #[test]
    fn stages_and_draws_a_frame() {
        let renderer = TerminalRenderer::new(4, 2, 10.0);
        let (w, h) = renderer.surface_size();
        let options = SignOptions {
            fps: 0,
            ..SignOptions::default()
        };
        let mut sign = LedSign::with_seed(options, renderer, w, h, 5).unwrap();
        sign.set_pattern(Pattern::new(vec![vec![1]]), TransitionOptions::instant());
        sign.tick(0.0);

        let staged = (0..2)
            .flat_map(|row| (0..4).map(move |col| (col, row)))
            .filter(|(col, row)| sign.renderer().staged(*col, *row).is_some())
            .count();
        assert_eq!(staged, 8);

        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 2));
        sign.renderer().render(buf.area, &mut buf);
        assert_ne!(buf[(0, 0)].symbol(), " ");
    }
}
