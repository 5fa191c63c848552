use ratatui::style::Color;

use crate::led::{Cell, Dimensions};

/// Drawing backend. Cells are handed over read-only; positions are the
/// pixel center of the LED on the surface.
pub trait Renderer {
    /// Called from every layout pass, before any `draw` with the new
    /// geometry. Precompute reusable primitives here.
    fn setup(&mut self, _dims: &Dimensions) {}

    /// Called once per rendered frame, before its first `draw`.
    fn begin_frame(&mut self) {}

    fn draw(&mut self, cell: &Cell, x: f32, y: f32, color: Color);
}

/// One recorded `draw` call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub col: u32,
    pub row: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    pub art_value: u8,
    pub color: Color,
}

/// Renderer that keeps the last frame in memory. Used by tests and by
/// headless diagnostics.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frame: Vec<DrawCall>,
    pub setups: usize,
    pub last_dims: Option<Dimensions>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_at(&self, col: u32, row: u32) -> Option<&DrawCall> {
        self.frame.iter().find(|c| c.col == col && c.row == row)
    }
}

impl Renderer for RecordingRenderer {
    fn setup(&mut self, dims: &Dimensions) {
        self.setups += 1;
        self.last_dims = Some(*dims);
    }

    fn begin_frame(&mut self) {
        self.frame.clear();
    }

    fn draw(&mut self, cell: &Cell, x: f32, y: f32, color: Color) {
        self.frame.push(DrawCall {
            col: cell.col,
            row: cell.row,
            x,
            y,
            size: cell.current_size,
            opacity: cell.current_opacity,
            art_value: cell.current_art_value,
            color,
        });
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn setup(&mut self, dims: &Dimensions) {
        (**self).setup(dims);
    }

    fn begin_frame(&mut self) {
        (**self).begin_frame();
    }

    fn draw(&mut self, cell: &Cell, x: f32, y: f32, color: Color) {
        (**self).draw(cell, x, y, color);
    }
}
