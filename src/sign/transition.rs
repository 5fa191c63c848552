//! Pattern-to-pattern transitions.
//!
//! Morph and crossfade swap the pattern at once and let every cell run its
//! own morph; the transition here only times the bookkeeping. Fade first
//! drives the old shape to all-off, then swaps the new pattern in at the
//! halfway mark.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::animation::{self, Easing};
use crate::pattern::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Instant,
    Morph,
    Crossfade,
    Fade,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Morph => "morph",
            Self::Crossfade => "crossfade",
            Self::Fade => "fade",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instant" => Ok(Self::Instant),
            "morph" => Ok(Self::Morph),
            "crossfade" | "cross-fade" => Ok(Self::Crossfade),
            "fade" => Ok(Self::Fade),
            other => Err(format!("unknown transition strategy: \"{other}\"")),
        }
    }
}

/// How `set_pattern` moves to the new pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionOptions {
    pub strategy: Strategy,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Instant,
            duration_ms: 0.0,
            easing: Easing::Linear,
        }
    }
}

impl TransitionOptions {
    pub fn instant() -> Self {
        Self::default()
    }

    pub fn new(strategy: Strategy, duration_ms: f64) -> Self {
        Self {
            strategy,
            duration_ms,
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// No transient state is needed.
    pub fn is_instant(&self) -> bool {
        self.strategy == Strategy::Instant || !(self.duration_ms > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Morphing,
    FadeOut,
    FadeIn,
}

/// What the sign must do after advancing a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    Continue,
    /// Fade crossed its midpoint; sample the new pattern from now on
    SwapIn,
    Finished,
}

#[derive(Debug, Clone)]
pub struct PatternTransition {
    strategy: Strategy,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
    from: Pattern,
    to: Pattern,
    phase: TransitionPhase,
}

impl PatternTransition {
    pub fn begin(options: &TransitionOptions, now_ms: f64, from: Pattern, to: Pattern) -> Self {
        let phase = match options.strategy {
            Strategy::Fade => TransitionPhase::FadeOut,
            _ => TransitionPhase::Morphing,
        };
        Self {
            strategy: options.strategy,
            start_ms: now_ms,
            duration_ms: options.duration_ms,
            easing: options.easing,
            from,
            to,
            phase,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn from(&self) -> &Pattern {
        &self.from
    }

    pub fn to(&self) -> &Pattern {
        &self.to
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        animation::progress(now_ms, self.start_ms, self.duration_ms)
    }

    pub fn eased_progress(&self, now_ms: f64) -> f32 {
        self.easing.apply(self.progress(now_ms))
    }

    /// Phase gates use the linear progress so the fade midpoint is a fixed
    /// point in time whatever the easing.
    pub fn update(&mut self, now_ms: f64) -> TransitionStep {
        let progress = self.progress(now_ms);
        match self.phase {
            TransitionPhase::FadeOut if progress >= 0.5 => {
                self.phase = TransitionPhase::FadeIn;
                TransitionStep::SwapIn
            }
            TransitionPhase::FadeOut => TransitionStep::Continue,
            TransitionPhase::FadeIn | TransitionPhase::Morphing if progress >= 1.0 => {
                TransitionStep::Finished
            }
            TransitionPhase::FadeIn | TransitionPhase::Morphing => TransitionStep::Continue,
        }
    }
}
