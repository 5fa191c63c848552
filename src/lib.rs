//! Animated LED matrix sign.
//!
//! A grid of independently animated LED cells samples a pattern of small
//! integers every frame. Cells ignite, extinguish and morph with cascaded
//! delays and eased timing while the pattern scrolls across a wrapping
//! coordinate space. Drawing, placement and sequencing are pluggable.

pub mod align;
pub mod animation;
pub mod config;
pub mod error;
pub mod glyphs;
pub mod led;
pub mod options;
pub mod pattern;
pub mod playlist;
pub mod render;
pub mod sign;

pub use error::{SignError, SignResult};
pub use options::SignOptions;
pub use pattern::Pattern;
pub use render::Renderer;
pub use sign::{LedSign, SignEvent, Strategy, TransitionOptions};
