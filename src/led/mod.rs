pub mod cell;
pub mod color;
pub mod grid;

pub use cell::{classify, Cell, CellPhase, Motion, StepContext, TransitionKind};
pub use color::{ColorCache, Rgb};
pub use grid::{Grid, Placement};

use crate::options::SignOptions;

/// Size of state 2 relative to the scaled LED size
const STATE_TWO_SCALE: f32 = 0.7;
/// Size of states 3 and above relative to the scaled LED size
const STATE_HIGH_SCALE: f32 = 0.4;

/// Derived geometry, recomputed on every setup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub scale: f32,
    pub led_size: f32,
    pub led_gap: f32,
    /// Center-to-center distance between neighbouring LEDs
    pub pitch: f32,
    /// Idle size
    pub min_size: f32,
    /// Fully lit size
    pub max_size: f32,
    /// Toroidal period in pixels
    pub grid_width: f32,
    pub grid_height: f32,
}

impl Dimensions {
    pub fn compute(options: &SignOptions, scale: f32, num_cols: u32, num_rows: u32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let led_size = options.led_size * scale;
        let led_gap = options.led_gap * scale;
        let pitch = led_size + led_gap;

        Self {
            scale,
            led_size,
            led_gap,
            pitch,
            min_size: led_size * options.idle_scale,
            max_size: led_size * options.active_scale,
            grid_width: num_cols as f32 * pitch,
            grid_height: num_rows as f32 * pitch,
        }
    }

    /// Target size for a pattern state: a fixed three-tier ladder between
    /// the idle and fully lit sizes.
    pub fn size_for_state(&self, value: u8) -> f32 {
        match value {
            0 => self.min_size,
            1 => self.max_size,
            2 => self.led_size * STATE_TWO_SCALE,
            _ => self.led_size * STATE_HIGH_SCALE,
        }
    }

    /// Zero or non-finite pitch; nothing can be laid out.
    pub fn is_degenerate(&self) -> bool {
        !(self.pitch.is_finite() && self.pitch > f32::EPSILON)
    }
}
