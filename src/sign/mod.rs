//! The animation loop.
//!
//! `LedSign` owns everything one sign needs between frames: options, the
//! derived geometry, the cell grid, scroll offsets, a suspension-aware
//! clock, the color cache, listeners and the renderer. The host drives it
//! with `resize`, `tick`, `suspend` and `resume`.

pub mod transition;

pub use transition::{
    PatternTransition, Strategy, TransitionOptions, TransitionPhase, TransitionStep,
};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::align::{Aligner, Alignment};
use crate::error::{SignError, SignResult};
use crate::led::color::cell_color;
use crate::led::grid::wrap;
use crate::led::{Cell, ColorCache, Dimensions, Grid, Placement, StepContext};
use crate::options::{ScrollOptions, SignOptions};
use crate::pattern::Pattern;
use crate::render::Renderer;

// ── Events ────────────────────────────────────────────────────────────

/// Lifecycle notifications, delivered synchronously in registration order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignEvent {
    BeforeFrame,
    AfterFrame,
    Resize { width: f32, height: f32 },
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SignEvent)>;

// ── Sign ──────────────────────────────────────────────────────────────

pub struct LedSign<R: Renderer> {
    options: SignOptions,
    renderer: R,
    aligner: Box<dyn Aligner>,

    surface_width: f32,
    surface_height: f32,
    dims: Dimensions,
    grid: Grid,

    /// Most recently requested pattern
    pattern: Pattern,
    /// What the grid samples; differs from `pattern` while fading out
    sampled: Pattern,
    transition: Option<PatternTransition>,
    max_pattern_cols: usize,
    max_pattern_rows: usize,

    scroll: ScrollOptions,
    scroll_x: f32,
    scroll_y: f32,

    /// Animation time; only advances across processed frames
    clock_ms: f64,
    last_frame_ts: Option<f64>,
    frame_anchor: Option<f64>,
    suspended: bool,

    color_cache: ColorCache,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    rng: StdRng,
}

/// Surface sizes must be finite and non-negative.
fn check_surface(width: f32, height: f32) -> SignResult<()> {
    if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
        Ok(())
    } else {
        Err(SignError::Surface(format!(
            "invalid surface size {width}x{height}"
        )))
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl<R: Renderer> LedSign<R> {
    pub fn new(options: SignOptions, renderer: R, width: f32, height: f32) -> SignResult<Self> {
        Self::with_rng(options, renderer, width, height, StdRng::from_os_rng())
    }

    /// Deterministic shimmer and random cascades
    pub fn with_seed(
        options: SignOptions,
        renderer: R,
        width: f32,
        height: f32,
        seed: u64,
    ) -> SignResult<Self> {
        Self::with_rng(options, renderer, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        options: SignOptions,
        renderer: R,
        width: f32,
        height: f32,
        rng: StdRng,
    ) -> SignResult<Self> {
        check_surface(width, height)?;
        options.validate()?;

        let mut sign = Self {
            aligner: Box::new(options.alignment),
            grid: Grid::new(options.grid_mode),
            color_cache: ColorCache::new(options.color_cache_size),
            scroll: options.scroll,
            options,
            renderer,
            surface_width: width,
            surface_height: height,
            dims: Dimensions::default(),
            pattern: Pattern::default(),
            sampled: Pattern::default(),
            transition: None,
            max_pattern_cols: 0,
            max_pattern_rows: 0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            clock_ms: 0.0,
            last_frame_ts: None,
            frame_anchor: None,
            suspended: false,
            listeners: Vec::new(),
            next_listener: 0,
            rng,
        };
        sign.setup();
        Ok(sign)
    }

    // ── Layout ────────────────────────────────────────────────────────

    /// Recompute geometry, grow the grid if needed and let the renderer
    /// prepare for the new layout.
    pub fn setup(&mut self) {
        let base_pitch = self.options.led_size + self.options.led_gap;
        let scale = self.fit_scale(base_pitch);
        let pitch = base_pitch * scale;

        let (visible_cols, visible_rows) = if pitch > f32::EPSILON {
            (
                (self.surface_width / pitch).ceil() as u32,
                (self.surface_height / pitch).ceil() as u32,
            )
        } else {
            (0, 0)
        };
        let cols = to_u32(self.max_pattern_cols).max(visible_cols);
        let rows = to_u32(self.max_pattern_rows).max(visible_rows);

        // idle sizes depend on the scale, so a dense grid respawns on rescale
        let rescaled = self.dims.pitch != pitch;
        if rescaled && !self.grid.is_sparse() {
            self.grid.clear();
        }
        let previous = self.dims;

        let layout = Dimensions::compute(&self.options, scale, cols, rows);
        self.grid
            .ensure_size(cols, rows, &self.options, &layout, &mut self.rng);
        self.dims = Dimensions::compute(
            &self.options,
            scale,
            self.grid.num_cols(),
            self.grid.num_rows(),
        );
        if rescaled {
            self.grid.rescale(&previous, &self.dims);
        }

        self.scroll_x = wrap(self.scroll_x, self.dims.grid_width);
        self.scroll_y = wrap(self.scroll_y, self.dims.grid_height);

        debug!(
            "Layout {}x{} LEDs, pitch {:.2}, scale {:.3}",
            self.grid.num_cols(),
            self.grid.num_rows(),
            self.dims.pitch,
            self.dims.scale
        );
        self.renderer.setup(&self.dims);
    }

    fn fit_scale(&self, base_pitch: f32) -> f32 {
        if !self.options.scale_to_fit || self.pattern.is_empty() || base_pitch <= 0.0 {
            return 1.0;
        }
        let w = self.pattern.cols() as f32 * base_pitch;
        let h = self.pattern.rows() as f32 * base_pitch;
        let scale = (self.surface_width / w).min(self.surface_height / h);
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Surface size changed. An invalid size is rejected and leaves the
    /// sign untouched.
    pub fn resize(&mut self, width: f32, height: f32) -> SignResult<()> {
        check_surface(width, height)?;
        self.surface_width = width;
        self.surface_height = height;
        self.setup();
        self.emit(SignEvent::Resize { width, height });
        Ok(())
    }

    // ── Patterns ──────────────────────────────────────────────────────

    /// Show `pattern`, moving there with the given strategy. Replaces any
    /// transition still in flight.
    pub fn set_pattern(&mut self, pattern: Pattern, options: TransitionOptions) {
        let grew = self.track_pattern_size(&pattern);
        debug!(
            "Pattern {}x{} via {} ({} ms)",
            pattern.cols(),
            pattern.rows(),
            options.strategy,
            options.duration_ms
        );

        if options.is_instant() {
            self.transition = None;
            self.sampled = pattern.clone();
            self.pattern = pattern;
            self.setup();
            return;
        }

        let from = std::mem::replace(&mut self.pattern, pattern);
        match options.strategy {
            Strategy::Fade => {
                self.sampled = Pattern::zeros(self.sampled.cols(), self.sampled.rows());
            }
            _ => {
                self.sampled = self.pattern.clone();
                if grew {
                    self.setup();
                }
            }
        }
        self.transition = Some(PatternTransition::begin(
            &options,
            self.clock_ms,
            from,
            self.pattern.clone(),
        ));
    }

    /// Grow-only bookkeeping of the largest pattern seen. True on growth.
    fn track_pattern_size(&mut self, pattern: &Pattern) -> bool {
        let grew =
            pattern.cols() > self.max_pattern_cols || pattern.rows() > self.max_pattern_rows;
        self.max_pattern_cols = self.max_pattern_cols.max(pattern.cols());
        self.max_pattern_rows = self.max_pattern_rows.max(pattern.rows());
        grew
    }

    fn advance_transition(&mut self) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        match transition.update(self.clock_ms) {
            TransitionStep::Continue => {}
            TransitionStep::SwapIn => {
                self.sampled = self.pattern.clone();
                self.setup();
            }
            TransitionStep::Finished => {
                debug!("Pattern transition finished");
                self.transition = None;
            }
        }
    }

    // ── Frame loop ────────────────────────────────────────────────────

    /// Run one frame at host timestamp `ts_ms`. Returns false when the
    /// frame was skipped (suspended or throttled).
    pub fn tick(&mut self, ts_ms: f64) -> bool {
        if self.suspended || !ts_ms.is_finite() || !self.throttle(ts_ms) {
            return false;
        }

        let delta_ms = self
            .last_frame_ts
            .map_or(0.0, |last| (ts_ms - last).max(0.0));
        self.last_frame_ts = Some(ts_ms);
        self.clock_ms += delta_ms;

        self.emit(SignEvent::BeforeFrame);
        self.advance_transition();
        self.advance_scroll(delta_ms);
        self.update_grid();
        self.render();
        self.emit(SignEvent::AfterFrame);
        true
    }

    /// Frame cap. The anchor keeps the remainder of the elapsed time so
    /// pacing does not drift.
    fn throttle(&mut self, ts_ms: f64) -> bool {
        if self.options.fps == 0 {
            return true;
        }
        let interval = 1000.0 / f64::from(self.options.fps);

        let anchor = match self.frame_anchor {
            None => ts_ms,
            Some(anchor) => {
                let elapsed = ts_ms - anchor;
                if (0.0..interval).contains(&elapsed) {
                    return false;
                }
                if elapsed < 0.0 {
                    ts_ms
                } else {
                    ts_ms - elapsed % interval
                }
            }
        };
        self.frame_anchor = Some(anchor);
        true
    }

    fn advance_scroll(&mut self, delta_ms: f64) {
        let (vx, vy) = self.scroll.direction.vector();
        if delta_ms <= 0.0 || (vx == 0.0 && vy == 0.0) {
            return;
        }
        let distance = self.scroll.speed * self.dims.pitch * (delta_ms / 1000.0) as f32;
        self.scroll_x = wrap(self.scroll_x + vx * distance, self.dims.grid_width);
        self.scroll_y = wrap(self.scroll_y + vy * distance, self.dims.grid_height);
    }

    fn update_grid(&mut self) {
        if self.dims.is_degenerate() {
            return;
        }
        let pitch = self.dims.pitch;
        let (origin_x, origin_y) = self.aligner.offset(
            self.sampled.cols() as f32 * pitch,
            self.sampled.rows() as f32 * pitch,
            self.surface_width,
            self.surface_height,
        );
        let placement = Placement {
            origin_x,
            origin_y,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            pitch,
        };

        let mut ctx = StepContext {
            now_ms: self.clock_ms,
            options: &self.options,
            dims: &self.dims,
            grid_cols: self.grid.num_cols(),
            grid_rows: self.grid.num_rows(),
            rng: &mut self.rng,
        };
        self.grid.update(&self.sampled, &placement, &mut ctx);
    }

    /// Hand every on-surface cell to the renderer.
    pub fn render(&mut self) {
        let Self {
            options,
            renderer,
            dims,
            grid,
            color_cache,
            surface_width,
            surface_height,
            ..
        } = self;

        renderer.begin_frame();
        let half = dims.pitch * 0.5;
        for cell in grid.cells() {
            let x = cell.col as f32 * dims.pitch + half;
            let y = cell.row as f32 * dims.pitch + half;
            if x - half >= *surface_width || y - half >= *surface_height {
                continue;
            }
            let color = cell_color(cell, options, dims, color_cache);
            renderer.draw(cell, x, y, color);
        }
    }

    /// Stop processing frames. The clock stands still until `resume`.
    pub fn suspend(&mut self) {
        if !self.suspended {
            debug!("Sign suspended at {:.0} ms", self.clock_ms);
            self.suspended = true;
        }
    }

    /// The next tick resynchronizes with a zero delta.
    pub fn resume(&mut self) {
        if self.suspended {
            debug!("Sign resumed at {:.0} ms", self.clock_ms);
            self.suspended = false;
            self.last_frame_ts = None;
            self.frame_anchor = None;
        }
    }

    // ── Listeners ─────────────────────────────────────────────────────

    pub fn add_listener(&mut self, listener: impl FnMut(&SignEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// True when the listener was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: SignEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Notify listeners and hand back the renderer.
    pub fn destroy(mut self) -> R {
        debug!("Sign destroyed after {:.0} ms", self.clock_ms);
        self.emit(SignEvent::Destroy);
        self.listeners.clear();
        self.renderer
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn options(&self) -> &SignOptions {
        &self.options
    }

    /// Live cells
    pub fn led_count(&self) -> usize {
        self.grid.len()
    }

    /// Cells showing a non-zero state
    pub fn active_count(&self) -> usize {
        self.grid.active_count()
    }

    pub fn cell_at(&self, col: u32, row: u32) -> Option<&Cell> {
        self.grid.get(col, row)
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn sampled_pattern(&self) -> &Pattern {
        &self.sampled
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    /// Toroidal period `(cols, rows)`
    pub fn grid_size(&self) -> (u32, u32) {
        (self.grid.num_cols(), self.grid.num_rows())
    }

    pub fn surface_size(&self) -> (f32, f32) {
        (self.surface_width, self.surface_height)
    }

    pub fn scroll_offset(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn scroll(&self) -> ScrollOptions {
        self.scroll
    }

    pub fn set_scroll(&mut self, scroll: ScrollOptions) {
        self.scroll = scroll;
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn color_cache_len(&self) -> usize {
        self.color_cache.len()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn set_aligner(&mut self, aligner: impl Aligner + 'static) {
        self.aligner = Box::new(aligner);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.set_aligner(alignment);
    }

    pub fn transition_phase(&self) -> Option<TransitionPhase> {
        self.transition.as_ref().map(PatternTransition::phase)
    }

    /// Eased progress of the running pattern transition
    pub fn pattern_transition_progress(&self) -> Option<f32> {
        self.transition
            .as_ref()
            .map(|t| t.eased_progress(self.clock_ms))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::{CascadeConfig, Easing};
    use crate::options::{GridMode, ScrollDirection, TransitionTiming, TransitionTimings};
    use crate::render::RecordingRenderer;

    /// 8 px LEDs with a 2 px gap: pitch 10, no cascades, instant cells.
    fn options() -> SignOptions {
        let instant = TransitionTiming::speed(1.0, 1.0, false);
        SignOptions {
            led_size: 8.0,
            led_gap: 2.0,
            fps: 0,
            alignment: Alignment::TopLeft,
            ignition: CascadeConfig::default(),
            extinction: CascadeConfig::default(),
            timing: TransitionTimings {
                ignition: instant,
                extinction: instant,
                morph: instant,
            },
            ..SignOptions::default()
        }
    }

    fn sign(options: SignOptions, width: f32, height: f32) -> LedSign<RecordingRenderer> {
        LedSign::with_seed(options, RecordingRenderer::new(), width, height, 7).unwrap()
    }

    fn one() -> Pattern {
        Pattern::new(vec![vec![1]])
    }

    #[test]
    fn rejects_invalid_surface() {
        let err = LedSign::new(options(), RecordingRenderer::new(), f32::NAN, 10.0);
        assert!(matches!(err, Err(SignError::Surface(_))));
        let err = LedSign::new(options(), RecordingRenderer::new(), -1.0, 10.0);
        assert!(matches!(err, Err(SignError::Surface(_))));
    }

    #[test]
    fn rejects_invalid_options() {
        let bad = SignOptions {
            led_size: -2.0,
            ..options()
        };
        let err = LedSign::new(bad, RecordingRenderer::new(), 10.0, 10.0);
        assert!(matches!(err, Err(SignError::Config(_))));
    }

    #[test]
    fn grid_covers_surface() {
        let s = sign(options(), 95.0, 41.0);
        assert_eq!(s.grid_size(), (10, 5));
        assert_eq!(s.led_count(), 50);
        assert_eq!(s.renderer().setups, 1);
        assert_eq!(s.dimensions().pitch, 10.0);
    }

    #[test]
    fn single_led_ignites_over_duration() {
        let mut opts = options();
        opts.timing.ignition = TransitionTiming::duration(100.0, Easing::Linear);
        let mut s = sign(opts, 10.0, 10.0);
        s.set_pattern(one(), TransitionOptions::instant());

        assert!(s.tick(0.0));
        let base = s.cell_at(0, 0).unwrap().base_opacity;

        assert!(s.tick(50.0));
        let cell = s.cell_at(0, 0).unwrap();
        let expected = base + 0.5 * (1.0 - base);
        assert!((cell.current_opacity - expected).abs() < 1e-4);
        assert_eq!(cell.current_art_value, 0);

        assert!(s.tick(100.0));
        let cell = s.cell_at(0, 0).unwrap();
        assert_eq!(cell.current_opacity, 1.0);
        assert_eq!(cell.current_art_value, 1);
        assert_eq!(s.active_count(), 1);
    }

    #[test]
    fn sparse_cell_lingers_for_lifespan() {
        let opts = SignOptions {
            grid_mode: GridMode::Sparse { lifespan: 60 },
            ..options()
        };
        let mut s = sign(opts, 10.0, 10.0);
        assert_eq!(s.led_count(), 0);

        s.set_pattern(one(), TransitionOptions::instant());
        s.tick(0.0);
        assert_eq!(s.led_count(), 1);
        assert_eq!(s.active_count(), 1);

        s.set_pattern(Pattern::zeros(1, 1), TransitionOptions::instant());
        s.tick(1.0);
        // fade finished on this tick
        assert_eq!(s.active_count(), 0);

        for i in 0..60 {
            s.tick(2.0 + i as f64);
            assert_eq!(s.led_count(), 1, "evicted early after {} idle ticks", i + 1);
        }
        s.tick(100.0);
        assert_eq!(s.led_count(), 0);
    }

    #[test]
    fn fade_samples_zeros_then_new_pattern() {
        let p1 = Pattern::new(vec![vec![1, 1]]);
        let p2 = Pattern::new(vec![vec![2], vec![2], vec![2]]);
        let mut s = sign(options(), 40.0, 40.0);
        s.set_pattern(p1, TransitionOptions::instant());
        s.tick(0.0);

        s.set_pattern(p2.clone(), TransitionOptions::new(Strategy::Fade, 1000.0));
        assert_eq!(s.transition_phase(), Some(TransitionPhase::FadeOut));

        s.tick(400.0);
        assert_eq!(s.sampled_pattern(), &Pattern::zeros(2, 1));
        assert_eq!(s.active_count(), 0);
        assert_eq!(s.pattern_transition_progress(), Some(0.4));

        s.tick(600.0);
        assert_eq!(s.sampled_pattern(), &p2);
        assert_eq!(s.transition_phase(), Some(TransitionPhase::FadeIn));

        s.tick(1000.0);
        assert_eq!(s.transition_phase(), None);
        assert_eq!(s.pattern_transition_progress(), None);
        assert_eq!(s.active_count(), 3);
    }

    #[test]
    fn morph_swaps_immediately() {
        let mut s = sign(options(), 40.0, 40.0);
        s.set_pattern(one(), TransitionOptions::instant());
        s.tick(0.0);
        let setups = s.renderer().setups;

        s.set_pattern(
            Pattern::new(vec![vec![2]]),
            TransitionOptions::new(Strategy::Morph, 300.0),
        );
        // same size: no relayout
        assert_eq!(s.renderer().setups, setups);
        s.tick(16.0);
        assert_eq!(s.cell_at(0, 0).unwrap().current_art_value, 2);
        s.tick(400.0);
        assert_eq!(s.transition_phase(), None);
    }

    #[test]
    fn grid_never_shrinks() {
        let mut s = sign(options(), 30.0, 30.0);
        s.set_pattern(Pattern::zeros(12, 2), TransitionOptions::instant());
        assert_eq!(s.grid_size(), (12, 3));

        s.set_pattern(Pattern::zeros(1, 1), TransitionOptions::instant());
        s.resize(5.0, 5.0).unwrap();
        assert_eq!(s.grid_size(), (12, 3));

        s.resize(0.0, 80.0).unwrap();
        assert_eq!(s.grid_size(), (12, 8));
        assert!(s.resize(f32::INFINITY, 1.0).is_err());
        assert_eq!(s.surface_size(), (0.0, 80.0));
    }

    #[test]
    fn sparse_cells_follow_rescale() {
        let opts = SignOptions {
            grid_mode: GridMode::Sparse { lifespan: 5 },
            scale_to_fit: true,
            ..options()
        };
        let mut s = sign(opts, 10.0, 10.0);
        s.set_pattern(one(), TransitionOptions::instant());
        s.tick(0.0);
        let before = s.dimensions().max_size;
        assert_eq!(s.cell_at(0, 0).unwrap().current_size, before);

        s.resize(40.0, 40.0).unwrap();
        let after = s.dimensions().max_size;
        assert_eq!(after, 4.0 * before);
        assert_eq!(s.cell_at(0, 0).unwrap().current_size, after);

        s.tick(16.0);
        s.tick(32.0);
        let cell = s.cell_at(0, 0).unwrap();
        assert_eq!(cell.current_size, after);
        assert_eq!(cell.target_size, after);
        assert_eq!(cell.current_art_value, 1);
    }

    #[test]
    fn throttle_keeps_frame_cadence() {
        let opts = SignOptions { fps: 10, ..options() };
        let mut s = sign(opts, 10.0, 10.0);
        assert!(s.tick(0.0));
        assert!(!s.tick(50.0));
        assert!(s.tick(100.0));
        // 130 ms late: anchor lands on 200, not 230
        assert!(s.tick(230.0));
        assert!(!s.tick(290.0));
        assert!(s.tick(300.0));
        assert_eq!(s.clock_ms(), 300.0);
    }

    #[test]
    fn suspension_does_not_advance_clock() {
        let mut s = sign(options(), 10.0, 10.0);
        s.tick(0.0);
        s.tick(100.0);
        s.suspend();
        assert!(s.is_suspended());
        assert!(!s.tick(5_000.0));

        s.resume();
        assert!(s.tick(60_000.0));
        assert_eq!(s.clock_ms(), 100.0);
        s.tick(60_050.0);
        assert_eq!(s.clock_ms(), 150.0);
    }

    #[test]
    fn scroll_moves_content_left() {
        let mut opts = options();
        opts.scroll = ScrollOptions {
            direction: ScrollDirection::Left,
            speed: 10.0,
        };
        let mut s = sign(opts, 50.0, 10.0);
        s.set_pattern(one(), TransitionOptions::instant());
        s.tick(0.0);
        assert_eq!(s.cell_at(0, 0).unwrap().current_art_value, 1);

        // 10 LEDs/s for 100 ms = one LED
        s.tick(100.0);
        assert_eq!(s.scroll_offset(), (10.0, 0.0));
        assert_eq!(s.cell_at(4, 0).unwrap().current_art_value, 1);
        assert_eq!(s.cell_at(0, 0).unwrap().current_art_value, 0);
    }

    #[test]
    fn listeners_fire_in_order_until_removed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut s = sign(options(), 10.0, 10.0);

        let a = log.clone();
        let first = s.add_listener(move |e| a.borrow_mut().push(("a", *e)));
        let b = log.clone();
        s.add_listener(move |e| b.borrow_mut().push(("b", *e)));

        s.tick(0.0);
        assert_eq!(
            *log.borrow(),
            vec![
                ("a", SignEvent::BeforeFrame),
                ("b", SignEvent::BeforeFrame),
                ("a", SignEvent::AfterFrame),
                ("b", SignEvent::AfterFrame),
            ]
        );

        log.borrow_mut().clear();
        assert!(s.remove_listener(first));
        assert!(!s.remove_listener(first));
        s.resize(20.0, 10.0).unwrap();
        let renderer = s.destroy();
        assert_eq!(renderer.setups, 2);
        assert_eq!(
            *log.borrow(),
            vec![
                (
                    "b",
                    SignEvent::Resize {
                        width: 20.0,
                        height: 10.0
                    }
                ),
                ("b", SignEvent::Destroy),
            ]
        );
    }

    #[test]
    fn render_skips_offscreen_cells() {
        let mut s = sign(options(), 25.0, 10.0);
        s.set_pattern(Pattern::new(vec![vec![1; 6]]), TransitionOptions::instant());
        s.tick(0.0);
        assert_eq!(s.grid_size(), (6, 1));
        assert_eq!(s.renderer().frame.len(), 3);
        let call = s.renderer().call_at(1, 0).unwrap();
        assert_eq!((call.x, call.y), (15.0, 5.0));
        assert_eq!(call.color, s.options().state_color(1).to_color());
        assert!(s.color_cache_len() <= 1);
    }
}
