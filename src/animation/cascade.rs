//! Staggered activation order for ignition and extinction.
//!
//! Every cell gets a raw directional index from its grid coordinate, the
//! sequencing pattern reshapes that index, and the result is scaled by the
//! per-step delay. Delays are counted in frames, not milliseconds.

use rand::Rng;
use serde::Deserialize;

/// How the directional index is reshaped into an activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadePattern {
    /// Strict directional order.
    #[default]
    Cascade,
    /// `step` stripes that fire together.
    Interlaced,
    /// Overlapping repeating waves.
    Wave,
    /// Fresh random order on every computation.
    Random,
}

/// Eight-way sweep direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadeDirection {
    #[default]
    ToRight,
    ToLeft,
    ToBottom,
    ToTop,
    ToBottomRight,
    ToBottomLeft,
    ToTopRight,
    ToTopLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub pattern: CascadePattern,
    pub direction: CascadeDirection,
    /// Frames of delay per index step
    pub delay: u32,
    /// Stripe width for `interlaced` and `wave`
    pub step: u32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            pattern: CascadePattern::Cascade,
            direction: CascadeDirection::ToRight,
            delay: 0,
            step: 1,
        }
    }
}

/// Raw index of a cell along the sweep direction.
pub fn directional_index(
    col: u32,
    row: u32,
    grid_cols: u32,
    grid_rows: u32,
    direction: CascadeDirection,
) -> u32 {
    let mirror_col = grid_cols.saturating_sub(1).saturating_sub(col);
    let mirror_row = grid_rows.saturating_sub(1).saturating_sub(row);

    match direction {
        CascadeDirection::ToRight => col,
        CascadeDirection::ToLeft => mirror_col,
        CascadeDirection::ToBottom => row,
        CascadeDirection::ToTop => mirror_row,
        CascadeDirection::ToBottomRight => col + row,
        CascadeDirection::ToBottomLeft => mirror_col + row,
        CascadeDirection::ToTopRight => col + mirror_row,
        CascadeDirection::ToTopLeft => mirror_col + mirror_row,
    }
}

/// Frames to wait before a cell starts its transition.
///
/// `random` re-rolls on every call; a cell whose target flaps gets a new
/// stagger each time.
pub fn compute_delay<R: Rng>(
    col: u32,
    row: u32,
    grid_cols: u32,
    grid_rows: u32,
    config: &CascadeConfig,
    rng: &mut R,
) -> u32 {
    if config.delay == 0 {
        return 0;
    }

    let step = config.step.max(1);
    let raw = directional_index(col, row, grid_cols, grid_rows, config.direction);

    let index = match config.pattern {
        CascadePattern::Cascade => raw,
        CascadePattern::Interlaced => raw % step,
        CascadePattern::Wave => (raw % step) + raw / step,
        CascadePattern::Random => {
            let span = grid_cols.saturating_add(grid_rows).max(1);
            rng.random_range(0..span)
        }
    };

    index.saturating_mul(config.delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(pattern: CascadePattern, direction: CascadeDirection, step: u32) -> CascadeConfig {
        CascadeConfig {
            pattern,
            direction,
            delay: 3,
            step,
        }
    }

    #[test]
    fn axis_directions_mirror() {
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToRight), 2);
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToLeft), 7);
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToBottom), 5);
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToTop), 2);
    }

    #[test]
    fn diagonals_sum_axes() {
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToBottomRight), 7);
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToBottomLeft), 12);
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToTopRight), 4);
        assert_eq!(directional_index(2, 5, 10, 8, CascadeDirection::ToTopLeft), 9);
    }

    #[test]
    fn cascade_to_right_is_non_decreasing_by_column() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = config(CascadePattern::Cascade, CascadeDirection::ToRight, 1);
        let delays: Vec<u32> = (0..20)
            .map(|col| compute_delay(col, 4, 20, 10, &cfg, &mut rng))
            .collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(delays[5], 15);
    }

    #[test]
    fn interlaced_classes_share_delay() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = config(CascadePattern::Interlaced, CascadeDirection::ToRight, 4);
        for col in 0..32 {
            let a = compute_delay(col, 0, 32, 4, &cfg, &mut rng);
            let b = compute_delay(col % 4, 0, 32, 4, &cfg, &mut rng);
            assert_eq!(a, b, "col {col}");
        }
    }

    #[test]
    fn wave_adds_stripe_and_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = config(CascadePattern::Wave, CascadeDirection::ToRight, 4);
        // index 9 -> 9 % 4 + 9 / 4 = 1 + 2
        assert_eq!(compute_delay(9, 0, 16, 1, &cfg, &mut rng), 3 * 3);
    }

    #[test]
    fn step_below_one_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = config(CascadePattern::Interlaced, CascadeDirection::ToRight, 0);
        assert_eq!(compute_delay(5, 0, 8, 1, &cfg, &mut rng), 0);
        let cfg = config(CascadePattern::Wave, CascadeDirection::ToRight, 0);
        assert_eq!(compute_delay(5, 0, 8, 1, &cfg, &mut rng), 5 * 3);
    }

    #[test]
    fn zero_delay_means_no_stagger() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = CascadeConfig {
            delay: 0,
            ..config(CascadePattern::Random, CascadeDirection::ToLeft, 2)
        };
        assert_eq!(compute_delay(3, 3, 8, 8, &cfg, &mut rng), 0);
    }

    proptest! {
        #[test]
        fn random_stays_within_span(col in 0u32..64, row in 0u32..64, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let cfg = config(CascadePattern::Random, CascadeDirection::ToRight, 1);
            let delay = compute_delay(col, row, 64, 64, &cfg, &mut rng);
            prop_assert!(delay < 128 * 3);
            prop_assert_eq!(delay % 3, 0);
        }
    }
}
