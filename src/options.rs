//! Resolved, immutable sign options.
//!
//! The loose TOML shape lives in `config`; by the time a `LedSign` is built
//! every choice here has been validated and every dual-mode setting has been
//! turned into a tagged variant.

use serde::Deserialize;

use crate::align::Alignment;
use crate::animation::{CascadeConfig, CascadeDirection, CascadePattern, Easing};
use crate::error::{SignError, SignResult};
use crate::led::color::{Rgb, DEFAULT_CACHE_SIZE};

/// Completion tolerance of the speed-based transition
pub const SPEED_TOLERANCE: f32 = 0.01;

/// How one transition class (ignition, extinction, morph) is timed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionTiming {
    /// Legacy per-frame lerp factor, drawn from `[min, max]` when
    /// `randomize`, otherwise `min`.
    Speed { min: f32, max: f32, randomize: bool },
    /// Wall-clock duration with an easing curve.
    Duration { duration_ms: f64, easing: Easing },
}

impl TransitionTiming {
    pub fn duration(duration_ms: f64, easing: Easing) -> Self {
        Self::Duration { duration_ms, easing }
    }

    pub fn speed(min: f32, max: f32, randomize: bool) -> Self {
        Self::Speed { min, max, randomize }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTimings {
    pub ignition: TransitionTiming,
    pub extinction: TransitionTiming,
    pub morph: TransitionTiming,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            ignition: TransitionTiming::duration(240.0, Easing::EaseOutQuad),
            extinction: TransitionTiming::duration(420.0, Easing::EaseInQuad),
            morph: TransitionTiming::duration(300.0, Easing::EaseInOutQuad),
        }
    }
}

/// Cell storage strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Every coordinate has a cell
    Fill,
    /// Cells exist only while lit or fading; `lifespan` frames of idle
    /// grace after settling off
    Sparse { lifespan: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollDirection {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl ScrollDirection {
    /// Unit vector of the sampling offset. Content moving left means the
    /// sampling window moves right.
    pub fn vector(self) -> (f32, f32) {
        match self {
            Self::None => (0.0, 0.0),
            Self::Left => (1.0, 0.0),
            Self::Right => (-1.0, 0.0),
            Self::Up => (0.0, 1.0),
            Self::Down => (0.0, -1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    pub direction: ScrollDirection,
    /// LEDs per second
    pub speed: f32,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            direction: ScrollDirection::None,
            speed: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignOptions {
    /// LED diameter in pixels
    pub led_size: f32,
    /// Gap between LEDs in pixels
    pub led_gap: f32,
    pub scale_to_fit: bool,
    /// Frame cap; 0 disables throttling
    pub fps: u16,
    pub alignment: Alignment,
    /// Idle LED size as a fraction of the scaled LED size
    pub idle_scale: f32,
    /// Fully lit (state 1) size as a fraction of the scaled LED size
    pub active_scale: f32,
    pub color_cache_size: usize,

    pub base_color: Rgb,
    /// Colors for states `1..=N`
    pub state_colors: Vec<Rgb>,

    /// Idle shimmer range for each LED's fixed base opacity
    pub min_opacity: f32,
    pub max_opacity: f32,
    pub active_opacity: f32,

    pub scroll: ScrollOptions,
    pub ignition: CascadeConfig,
    pub extinction: CascadeConfig,
    pub timing: TransitionTimings,
    pub grid_mode: GridMode,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            led_size: 8.0,
            led_gap: 2.0,
            scale_to_fit: false,
            fps: 30,
            alignment: Alignment::Center,
            idle_scale: 0.35,
            active_scale: 1.0,
            color_cache_size: DEFAULT_CACHE_SIZE,
            base_color: Rgb::new(0x2a, 0x12, 0x0c),
            state_colors: vec![
                Rgb::new(0xff, 0x5a, 0x1f),
                Rgb::new(0xff, 0xc8, 0x3d),
                Rgb::new(0x4d, 0xd0, 0xe1),
            ],
            min_opacity: 0.15,
            max_opacity: 0.35,
            active_opacity: 1.0,
            scroll: ScrollOptions::default(),
            ignition: CascadeConfig {
                pattern: CascadePattern::Cascade,
                direction: CascadeDirection::ToRight,
                delay: 1,
                step: 1,
            },
            extinction: CascadeConfig {
                pattern: CascadePattern::Cascade,
                direction: CascadeDirection::ToRight,
                delay: 1,
                step: 1,
            },
            timing: TransitionTimings::default(),
            grid_mode: GridMode::Fill,
        }
    }
}

impl SignOptions {
    /// Color for a state value. Values past the table reuse its last entry;
    /// 0 is the base color.
    pub fn state_color(&self, value: u8) -> Rgb {
        if value == 0 {
            return self.base_color;
        }
        self.state_colors
            .get(usize::from(value) - 1)
            .or_else(|| self.state_colors.last())
            .copied()
            .unwrap_or(self.base_color)
    }

    /// Clamp a pattern value into `0..=state_colors.len()`.
    pub fn color_index(&self, value: u8) -> u8 {
        let max = u8::try_from(self.state_colors.len()).unwrap_or(u8::MAX);
        value.min(max)
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.grid_mode, GridMode::Sparse { .. })
    }

    pub fn validate(&self) -> SignResult<()> {
        let finite = [
            self.led_size,
            self.led_gap,
            self.idle_scale,
            self.active_scale,
            self.min_opacity,
            self.max_opacity,
            self.active_opacity,
            self.scroll.speed,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(SignError::Config("numeric options must be finite".into()));
        }
        if self.led_size <= 0.0 {
            return Err(SignError::Config(format!(
                "led_size must be positive, got {}",
                self.led_size
            )));
        }
        if self.led_gap < 0.0 {
            return Err(SignError::Config(format!(
                "led_gap must not be negative, got {}",
                self.led_gap
            )));
        }
        if self.state_colors.is_empty() {
            return Err(SignError::Config("at least one state color is required".into()));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.min_opacity)
            || !unit.contains(&self.max_opacity)
            || !unit.contains(&self.active_opacity)
        {
            return Err(SignError::Config("opacities must lie in [0, 1]".into()));
        }
        if self.min_opacity > self.max_opacity {
            return Err(SignError::Config(format!(
                "opacity range is inverted: {} > {}",
                self.min_opacity, self.max_opacity
            )));
        }
        for (name, timing) in [
            ("ignition", self.timing.ignition),
            ("extinction", self.timing.extinction),
            ("morph", self.timing.morph),
        ] {
            match timing {
                TransitionTiming::Speed { min, max, .. } => {
                    if !(min > 0.0 && min <= 1.0 && max <= 1.0 && min <= max) {
                        return Err(SignError::Config(format!(
                            "{name} speed range must satisfy 0 < min <= max <= 1, got [{min}, {max}]"
                        )));
                    }
                }
                TransitionTiming::Duration { duration_ms, .. } => {
                    if !duration_ms.is_finite() || duration_ms < 0.0 {
                        return Err(SignError::Config(format!(
                            "{name} duration must be a non-negative number, got {duration_ms}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
