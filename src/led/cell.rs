//! One LED and its transition state machine.
//!
//! A cell is `Settled` until its target changes, optionally waits out a
//! cascade delay (`Delayed`), then animates size and opacity toward the new
//! target (`Transitioning`). A new target at any point restarts the machine
//! from the in-flight values.

use rand::rngs::StdRng;
use rand::Rng;

use super::Dimensions;
use crate::animation::{self, cascade, Easing};
use crate::options::{GridMode, SignOptions, TransitionTiming, SPEED_TOLERANCE};

/// Classification of a target change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// off -> on
    Ignition,
    /// on -> off
    Extinction,
    /// on -> different on
    Morph,
}

/// `None` when nothing changes.
pub fn classify(previous: u8, target: u8) -> Option<TransitionKind> {
    match (previous, target) {
        (p, t) if p == t => None,
        (0, _) => Some(TransitionKind::Ignition),
        (_, 0) => Some(TransitionKind::Extinction),
        _ => Some(TransitionKind::Morph),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPhase {
    Settled,
    Delayed {
        frames_left: u32,
        kind: TransitionKind,
    },
    Transitioning,
}

/// How the running transition advances
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Fraction of the remaining distance covered per step
    Speed(f32),
    Timed {
        start_ms: f64,
        duration_ms: f64,
        easing: Easing,
    },
}

/// Everything a cell needs from the outside world for one step.
pub struct StepContext<'a> {
    pub now_ms: f64,
    pub options: &'a SignOptions,
    pub dims: &'a Dimensions,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub rng: &'a mut StdRng,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub col: u32,
    pub row: u32,

    /// Fixed idle shimmer opacity
    pub base_opacity: f32,

    pub current_size: f32,
    pub target_size: f32,
    pub start_size: f32,

    pub current_opacity: f32,
    pub target_opacity: f32,
    pub start_opacity: f32,

    pub current_art_value: u8,
    pub target_art_value: u8,
    /// State whose color is shown while transitioning
    pub art_value_for_color: u8,

    pub phase: CellPhase,
    pub motion: Motion,

    /// Idle frames left before a sparse cell is evicted
    pub lifespan: u32,
}

impl Cell {
    /// Build an idle cell at `(col, row)`.
    pub fn spawn(
        col: u32,
        row: u32,
        options: &SignOptions,
        dims: &Dimensions,
        rng: &mut StdRng,
    ) -> Self {
        let base_opacity = if options.max_opacity > options.min_opacity {
            rng.random_range(options.min_opacity..=options.max_opacity)
        } else {
            options.min_opacity
        };
        let lifespan = match options.grid_mode {
            GridMode::Sparse { lifespan } => lifespan,
            GridMode::Fill => 0,
        };

        Self {
            col,
            row,
            base_opacity,
            current_size: dims.min_size,
            target_size: dims.min_size,
            start_size: dims.min_size,
            current_opacity: base_opacity,
            target_opacity: base_opacity,
            start_opacity: base_opacity,
            current_art_value: 0,
            target_art_value: 0,
            art_value_for_color: 0,
            phase: CellPhase::Settled,
            motion: Motion::Speed(1.0),
            lifespan,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.phase == CellPhase::Settled
    }

    pub fn is_delayed(&self) -> bool {
        matches!(self.phase, CellPhase::Delayed { .. })
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == CellPhase::Transitioning
    }

    /// Move sizes onto a new scale. Settled cells snap to the new ladder;
    /// in-flight cells keep their place relative to the LED size.
    pub fn rescale(&mut self, from: &Dimensions, to: &Dimensions) {
        self.target_size = to.size_for_state(self.target_art_value);
        if self.is_settled() || !(from.led_size > 0.0) {
            self.current_size = self.target_size;
            self.start_size = self.target_size;
            return;
        }
        let ratio = to.led_size / from.led_size;
        self.current_size *= ratio;
        self.start_size *= ratio;
    }

    /// Advance one simulation step toward `new_target`.
    pub fn advance(&mut self, new_target: u8, ctx: &mut StepContext) {
        let previous = self.target_art_value;
        if let Some(kind) = classify(previous, new_target) {
            self.retarget(previous, new_target, kind, ctx);
        }

        if let CellPhase::Delayed { frames_left, kind } = self.phase {
            let remaining = frames_left.saturating_sub(1);
            if remaining == 0 {
                self.phase = CellPhase::Transitioning;
                self.prepare_transition(kind, ctx);
            } else {
                self.phase = CellPhase::Delayed {
                    frames_left: remaining,
                    kind,
                };
            }
        }

        if self.phase == CellPhase::Transitioning {
            self.step(ctx.now_ms);
        }
    }

    fn retarget(&mut self, previous: u8, target: u8, kind: TransitionKind, ctx: &mut StepContext) {
        let options = ctx.options;
        self.target_art_value = target;

        // Extinction fades out in the old color instead of snapping to base.
        self.art_value_for_color = match kind {
            TransitionKind::Ignition | TransitionKind::Morph => options.color_index(target),
            TransitionKind::Extinction => options.color_index(previous),
        };

        self.prepare_transition(kind, ctx);

        let delay = match kind {
            TransitionKind::Ignition => self.cascade_delay(&options.ignition, ctx),
            TransitionKind::Extinction => self.cascade_delay(&options.extinction, ctx),
            TransitionKind::Morph => 0,
        };

        self.phase = if delay > 0 {
            CellPhase::Delayed {
                frames_left: delay,
                kind,
            }
        } else {
            CellPhase::Transitioning
        };
    }

    fn cascade_delay(&self, config: &cascade::CascadeConfig, ctx: &mut StepContext) -> u32 {
        cascade::compute_delay(
            self.col,
            self.row,
            ctx.grid_cols,
            ctx.grid_rows,
            config,
            &mut *ctx.rng,
        )
    }

    /// Start values come from wherever the cell is right now.
    fn prepare_transition(&mut self, kind: TransitionKind, ctx: &mut StepContext) {
        let options = ctx.options;
        let target = self.target_art_value;

        self.start_size = self.current_size;
        self.start_opacity = self.current_opacity;
        self.target_size = ctx.dims.size_for_state(target);
        self.target_opacity = if target > 0 {
            options.active_opacity
        } else {
            self.base_opacity
        };

        let timing = match kind {
            TransitionKind::Ignition => options.timing.ignition,
            TransitionKind::Extinction => options.timing.extinction,
            TransitionKind::Morph => options.timing.morph,
        };

        self.motion = match timing {
            TransitionTiming::Speed {
                min,
                max,
                randomize,
            } => {
                let speed = if randomize && max > min {
                    ctx.rng.random_range(min..=max)
                } else {
                    min
                };
                Motion::Speed(speed)
            }
            TransitionTiming::Duration {
                duration_ms,
                easing,
            } => Motion::Timed {
                start_ms: ctx.now_ms,
                duration_ms,
                easing,
            },
        };
    }

    fn step(&mut self, now_ms: f64) {
        let done = match self.motion {
            Motion::Timed {
                start_ms,
                duration_ms,
                easing,
            } => {
                let progress = animation::progress(now_ms, start_ms, duration_ms);
                let eased = easing.apply(progress);
                self.current_size = animation::lerp(self.start_size, self.target_size, eased);
                self.current_opacity =
                    animation::lerp(self.start_opacity, self.target_opacity, eased);
                progress >= 1.0
            }
            Motion::Speed(speed) => {
                self.current_size = animation::ease_out(self.current_size, self.target_size, speed);
                self.current_opacity =
                    animation::ease_out(self.current_opacity, self.target_opacity, speed);
                (self.target_size - self.current_size).abs() <= SPEED_TOLERANCE
                    && (self.target_opacity - self.current_opacity).abs() <= SPEED_TOLERANCE
            }
        };

        if done {
            self.settle();
        }
    }

    fn settle(&mut self) {
        self.current_size = self.target_size;
        self.current_opacity = self.target_opacity;
        self.current_art_value = self.target_art_value;
        self.phase = CellPhase::Settled;
        if self.current_art_value == 0 {
            self.art_value_for_color = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::CascadeConfig;
    use crate::options::TransitionTimings;
    use rand::SeedableRng;

    fn options(timing: TransitionTiming) -> SignOptions {
        SignOptions {
            ignition: CascadeConfig::default(),
            extinction: CascadeConfig::default(),
            timing: TransitionTimings {
                ignition: timing,
                extinction: timing,
                morph: timing,
            },
            ..SignOptions::default()
        }
    }

    struct Harness {
        options: SignOptions,
        dims: Dimensions,
        rng: StdRng,
        now_ms: f64,
    }

    impl Harness {
        fn new(options: SignOptions) -> Self {
            let dims = Dimensions::compute(&options, 1.0, 10, 10);
            Self {
                options,
                dims,
                rng: StdRng::seed_from_u64(11),
                now_ms: 0.0,
            }
        }

        fn spawn(&mut self, col: u32, row: u32) -> Cell {
            Cell::spawn(col, row, &self.options, &self.dims, &mut self.rng)
        }

        fn advance(&mut self, cell: &mut Cell, target: u8) {
            let mut ctx = StepContext {
                now_ms: self.now_ms,
                options: &self.options,
                dims: &self.dims,
                grid_cols: 10,
                grid_rows: 10,
                rng: &mut self.rng,
            };
            cell.advance(target, &mut ctx);
        }
    }

    #[test]
    fn classification_is_exhaustive() {
        for prev in 0..=4u8 {
            for target in 0..=4u8 {
                let expected = if prev == target {
                    None
                } else if prev == 0 {
                    Some(TransitionKind::Ignition)
                } else if target == 0 {
                    Some(TransitionKind::Extinction)
                } else {
                    Some(TransitionKind::Morph)
                };
                assert_eq!(classify(prev, target), expected, "{prev} -> {target}");
            }
        }
    }

    #[test]
    fn spawn_is_idle() {
        let mut h = Harness::new(SignOptions::default());
        let cell = h.spawn(3, 4);
        assert!(cell.is_settled());
        assert_eq!(cell.current_size, h.dims.min_size);
        assert!((0.15..=0.35).contains(&cell.base_opacity));
        assert_eq!(cell.current_opacity, cell.base_opacity);
    }

    #[test]
    fn speed_one_settles_in_one_step() {
        let mut h = Harness::new(options(TransitionTiming::speed(1.0, 1.0, false)));
        let mut cell = h.spawn(0, 0);
        h.advance(&mut cell, 1);
        assert!(cell.is_settled());
        assert_eq!(cell.current_size, h.dims.max_size);
        assert_eq!(cell.current_opacity, h.options.active_opacity);
        assert_eq!(cell.current_art_value, 1);
    }

    #[test]
    fn slow_speed_settles_exactly_eventually() {
        let mut h = Harness::new(options(TransitionTiming::speed(0.1, 0.3, true)));
        let mut cell = h.spawn(0, 0);
        let mut steps = 0;
        loop {
            h.advance(&mut cell, 2);
            steps += 1;
            if cell.is_settled() {
                break;
            }
            assert!(steps < 1000, "never settled");
            assert_eq!(cell.current_art_value, 0);
        }
        assert!(steps > 1);
        assert_eq!(cell.current_size, cell.target_size);
        assert_eq!(cell.current_opacity, cell.target_opacity);
        assert_eq!(cell.current_art_value, 2);
    }

    #[test]
    fn timed_transition_tracks_clock() {
        let mut h = Harness::new(options(TransitionTiming::duration(100.0, Easing::Linear)));
        let mut cell = h.spawn(0, 0);
        let base = cell.base_opacity;

        h.advance(&mut cell, 1);
        assert!(cell.is_transitioning());

        h.now_ms = 50.0;
        h.advance(&mut cell, 1);
        let expected = base + 0.5 * (h.options.active_opacity - base);
        assert!((cell.current_opacity - expected).abs() < 1e-4);
        assert_eq!(cell.current_art_value, 0);

        h.now_ms = 100.0;
        h.advance(&mut cell, 1);
        assert!(cell.is_settled());
        assert_eq!(cell.current_opacity, h.options.active_opacity);
        assert_eq!(cell.current_art_value, 1);
    }

    #[test]
    fn rescale_moves_sizes_to_new_ladder() {
        let mut h = Harness::new(options(TransitionTiming::duration(100.0, Easing::Linear)));
        let mut settled = h.spawn(0, 0);
        let mut moving = h.spawn(1, 0);
        h.advance(&mut settled, 1);
        h.now_ms = 100.0;
        h.advance(&mut settled, 1);
        assert!(settled.is_settled());

        h.now_ms = 200.0;
        h.advance(&mut moving, 1);
        h.now_ms = 250.0;
        h.advance(&mut moving, 1);
        let mid = moving.current_size;

        let bigger = Dimensions::compute(&h.options, 2.0, 10, 10);
        let from = h.dims;
        settled.rescale(&from, &bigger);
        moving.rescale(&from, &bigger);
        h.dims = bigger;

        assert_eq!(settled.current_size, bigger.max_size);
        assert_eq!(moving.current_size, mid * 2.0);
        assert_eq!(moving.target_size, bigger.max_size);

        h.now_ms = 300.0;
        h.advance(&mut moving, 1);
        assert!(moving.is_settled());
        assert_eq!(moving.current_size, bigger.max_size);
    }

    #[test]
    fn cascade_delay_holds_transition() {
        let mut opts = options(TransitionTiming::speed(1.0, 1.0, false));
        opts.ignition.delay = 2;
        let mut h = Harness::new(opts);
        // column 3 to-right -> 3 * 2 = 6 frames
        let mut cell = h.spawn(3, 0);

        for _ in 0..5 {
            h.advance(&mut cell, 1);
            assert!(cell.is_delayed());
            assert_eq!(cell.current_size, h.dims.min_size);
        }
        h.advance(&mut cell, 1);
        assert!(cell.is_settled());
        assert_eq!(cell.current_art_value, 1);
    }

    #[test]
    fn morph_ignores_cascade_delay() {
        let mut opts = options(TransitionTiming::speed(1.0, 1.0, false));
        opts.ignition.delay = 0;
        opts.extinction.delay = 5;
        let mut h = Harness::new(opts);
        let mut cell = h.spawn(4, 4);
        h.advance(&mut cell, 1);
        h.advance(&mut cell, 2);
        assert!(cell.is_settled());
        assert_eq!(cell.current_art_value, 2);
        assert_eq!(cell.current_size, h.dims.size_for_state(2));
    }

    #[test]
    fn extinction_keeps_old_color_until_settled() {
        let mut h = Harness::new(options(TransitionTiming::duration(100.0, Easing::Linear)));
        let mut cell = h.spawn(0, 0);
        h.advance(&mut cell, 2);
        h.now_ms = 100.0;
        h.advance(&mut cell, 2);
        assert_eq!(cell.current_art_value, 2);

        h.advance(&mut cell, 0);
        assert!(cell.is_transitioning());
        assert_eq!(cell.art_value_for_color, 2);

        h.now_ms = 200.0;
        h.advance(&mut cell, 0);
        assert!(cell.is_settled());
        assert_eq!(cell.art_value_for_color, 0);
        assert_eq!(cell.current_opacity, cell.base_opacity);
    }

    #[test]
    fn retarget_mid_flight_starts_from_current_values() {
        let mut h = Harness::new(options(TransitionTiming::duration(100.0, Easing::Linear)));
        let mut cell = h.spawn(0, 0);
        h.advance(&mut cell, 1);
        h.now_ms = 50.0;
        h.advance(&mut cell, 1);
        let mid_size = cell.current_size;

        h.advance(&mut cell, 0);
        assert_eq!(cell.start_size, mid_size);
        assert_eq!(cell.current_size, mid_size);
        assert_eq!(cell.current_art_value, 0);
        assert_eq!(cell.target_art_value, 0);
    }

    #[test]
    fn color_index_is_clamped_to_table() {
        let mut h = Harness::new(options(TransitionTiming::speed(1.0, 1.0, false)));
        let mut cell = h.spawn(0, 0);
        h.advance(&mut cell, 9);
        assert_eq!(cell.art_value_for_color, 3);
        assert_eq!(cell.current_art_value, 9);
    }
}
