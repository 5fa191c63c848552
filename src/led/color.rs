//! Interpolated LED colors with a bounded memo cache.
//!
//! Each frame asks for one color per visible LED. Most of those land on a
//! handful of distinct RGB triples, so results are memoized by packed 24-bit
//! key. Eviction drops the oldest half in insertion order once the cache is
//! full; there is no LRU bookkeeping on the hit path.

use std::collections::{HashMap, VecDeque};

use ratatui::style::Color;

use super::{Cell, Dimensions};
use crate::options::SignOptions;

pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Plain 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 24-bit packed key `0xRRGGBB`
    pub fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }

    /// Scale every channel toward black.
    pub fn dimmed(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self::new(
            round_channel(self.r as f32 * f),
            round_channel(self.g as f32 * f),
            round_channel(self.b as f32 * f),
        )
    }

    /// Parse `#RRGGBB`
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }
}

/// `floor(x + 0.5)`, saturated into a channel
fn round_channel(x: f32) -> u8 {
    (x + 0.5).floor().clamp(0.0, 255.0) as u8
}

#[derive(Debug)]
pub struct ColorCache {
    entries: HashMap<u32, Color>,
    order: VecDeque<u32>,
    max_size: usize,
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl ColorCache {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(2);
        Self {
            entries: HashMap::with_capacity(max_size),
            order: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Blend `base` toward `target` by `factor` and return the memoized color.
    pub fn interpolate(&mut self, base: Rgb, target: Rgb, factor: f32) -> Color {
        if base == target {
            return base.to_color();
        }

        let t = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| round_channel(a as f32 + (b as f32 - a as f32) * t);
        let rgb = Rgb::new(mix(base.r, target.r), mix(base.g, target.g), mix(base.b, target.b));

        self.lookup(rgb)
    }

    fn lookup(&mut self, rgb: Rgb) -> Color {
        let key = rgb.packed();
        if let Some(color) = self.entries.get(&key) {
            return *color;
        }

        if self.entries.len() >= self.max_size {
            self.evict_oldest_half();
        }

        let color = rgb.to_color();
        self.entries.insert(key, color);
        self.order.push_back(key);
        color
    }

    fn evict_oldest_half(&mut self) {
        let evict = self.max_size / 2;
        for key in self.order.drain(..evict.min(self.order.len())) {
            self.entries.remove(&key);
        }
    }
}

/// Ratio of `value` along `[from, to]`, or `None` when the range is
/// degenerate.
pub fn range_progress(value: f32, from: f32, to: f32) -> Option<f32> {
    let span = to - from;
    if !span.is_finite() || span.abs() < f32::EPSILON {
        return None;
    }
    Some(((value - from) / span).clamp(0.0, 1.0))
}

/// Render color of a cell: base blended toward its state color by how lit
/// the cell is. Opacity progress drives the blend; size progress stands in
/// when the opacity range is degenerate.
pub fn cell_color(
    cell: &Cell,
    options: &SignOptions,
    dims: &Dimensions,
    cache: &mut ColorCache,
) -> Color {
    let base = options.base_color;
    if cell.art_value_for_color == 0 {
        return base.to_color();
    }
    let target = options.state_color(cell.art_value_for_color);

    let factor = range_progress(cell.current_opacity, cell.base_opacity, options.active_opacity)
        .or_else(|| range_progress(cell.current_size, dims.min_size, dims.max_size));

    match factor {
        Some(t) => cache.interpolate(base, target, t),
        None => base.to_color(),
    }
}
