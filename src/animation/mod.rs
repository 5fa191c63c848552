pub mod cascade;
pub mod easing;

pub use cascade::{CascadeConfig, CascadeDirection, CascadePattern};
pub use easing::Easing;

/// Linear interpolation
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Exponential ease-out step (smooth approach, never lands exactly)
pub fn ease_out(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Progress of a timed animation, clamped to [0, 1]. A zero-length
/// animation is already complete.
pub fn progress(now_ms: f64, start_ms: f64, duration_ms: f64) -> f32 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0) as f32
}
