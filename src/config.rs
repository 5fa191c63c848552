use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::{info, warn};

use crate::align::Alignment;
use crate::animation::{CascadeConfig, Easing};
use crate::error::{SignError, SignResult};
use crate::glyphs;
use crate::led::Rgb;
use crate::options::{
    GridMode, ScrollDirection, ScrollOptions, SignOptions, TransitionTiming, TransitionTimings,
};
use crate::pattern::Pattern;
use crate::playlist::{Playlist, PlaylistEntry};
use crate::sign::{Strategy, TransitionOptions};

// ─── Embedded Default ────────────────────────────────────────────────────
/// Baked into the binary at compile time and always used as the base layer.
const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

// ─── CLI Arguments (override layer) ─────────────────────────────────────
/// ledsign: an animated LED matrix sign for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ledsign", version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    pub print_default_config: bool,

    /// Show this message instead of the configured playlist
    #[arg(short, long, conflicts_with = "pattern")]
    pub text: Option<String>,

    /// Show a pattern file (digit grid or JSON) instead of the playlist
    #[arg(short, long)]
    pub pattern: Option<PathBuf>,

    /// Frame cap, 0 for unthrottled (overrides config file)
    #[arg(long)]
    pub fps: Option<u16>,

    /// Use the sparse grid (overrides config file)
    #[arg(long)]
    pub sparse: bool,

    /// Scroll direction: none, left, right, up, down
    #[arg(long)]
    pub scroll: Option<String>,

    /// Scroll speed in LEDs per second
    #[arg(long)]
    pub speed: Option<f32>,

    /// Log file path (logging disabled if not specified)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Log level filter (overrides config file)
    #[arg(long)]
    pub log_level: Option<String>,
}

// ─── TOML Structs ───────────────────────────────────────────────────────

/// Root configuration, parsed from TOML, then overridden by CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub opacity: OpacityConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub ignition: CascadeConfig,
    #[serde(default)]
    pub extinction: CascadeConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub playlist: Vec<PlaylistConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub led_size: f32,
    pub led_gap: f32,
    pub scale_to_fit: bool,
    pub fps: u16,
    pub alignment: Alignment,
    pub idle_scale: f32,
    pub active_scale: f32,
    pub color_cache_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub base: String,
    /// One color per active state, starting at state 1
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpacityConfig {
    pub min: f32,
    pub max: f32,
    pub active: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub direction: ScrollDirection,
    /// LEDs per second
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    #[default]
    Duration,
    Speed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingEntry {
    pub mode: TimingMode,
    pub duration_ms: f64,
    pub easing: Easing,
    /// Speed mode: per-frame lerp factor range
    pub min: f32,
    pub max: f32,
    pub randomize: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub ignition: TimingEntry,
    pub extinction: TimingEntry,
    pub morph: TimingEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridKind {
    #[default]
    Fill,
    Sparse,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub mode: GridKind,
    /// Sparse only: idle frames before an off cell is dropped
    pub lifespan: u32,
}

/// One `[[playlist]]` entry. Exactly one of `text`, `rows` or `file`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub text: Option<String>,
    pub rows: Option<Vec<Vec<u8>>>,
    pub file: Option<PathBuf>,
    pub hold_ms: f64,
    pub strategy: Strategy,
    pub duration_ms: f64,
    pub easing: Easing,
    /// Repaint every lit LED with this state
    pub color: Option<u8>,
}

// ─── Defaults ───────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        // The embedded TOML is checked by the tests
        toml::from_str(DEFAULT_CONFIG_TOML)
            .expect("BUG: embedded default_config.toml is invalid TOML")
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let opts = SignOptions::default();
        Self {
            led_size: opts.led_size,
            led_gap: opts.led_gap,
            scale_to_fit: opts.scale_to_fit,
            fps: opts.fps,
            alignment: opts.alignment,
            idle_scale: opts.idle_scale,
            active_scale: opts.active_scale,
            color_cache_size: opts.color_cache_size,
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            base: "#2a120c".into(),
            states: vec!["#ff5a1f".into(), "#ffc83d".into(), "#4dd0e1".into()],
        }
    }
}

impl Default for OpacityConfig {
    fn default() -> Self {
        Self {
            min: 0.15,
            max: 0.35,
            active: 1.0,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        let scroll = ScrollOptions::default();
        Self {
            direction: scroll.direction,
            speed: scroll.speed,
        }
    }
}

impl Default for TimingEntry {
    fn default() -> Self {
        Self {
            mode: TimingMode::Duration,
            duration_ms: 300.0,
            easing: Easing::EaseInOutQuad,
            min: 0.1,
            max: 0.3,
            randomize: false,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ignition: TimingEntry {
                duration_ms: 240.0,
                easing: Easing::EaseOutQuad,
                ..TimingEntry::default()
            },
            extinction: TimingEntry {
                duration_ms: 420.0,
                easing: Easing::EaseInQuad,
                ..TimingEntry::default()
            },
            morph: TimingEntry::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            mode: GridKind::Fill,
            lifespan: 60,
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            text: None,
            rows: None,
            file: None,
            hold_ms: 4000.0,
            strategy: Strategy::Fade,
            duration_ms: 800.0,
            easing: Easing::EaseInOutQuad,
            color: None,
        }
    }
}

// ─── Color Parsing ──────────────────────────────────────────────────────

/// Parse a color string. Supports `#RRGGBB` and the basic named colors.
pub fn parse_color(s: &str) -> Option<Rgb> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "black" => Some(Rgb::new(0, 0, 0)),
        "red" => Some(Rgb::new(205, 0, 0)),
        "green" => Some(Rgb::new(0, 205, 0)),
        "yellow" => Some(Rgb::new(205, 205, 0)),
        "blue" => Some(Rgb::new(0, 0, 238)),
        "magenta" => Some(Rgb::new(205, 0, 205)),
        "cyan" => Some(Rgb::new(0, 205, 205)),
        "white" => Some(Rgb::new(255, 255, 255)),
        "gray" | "grey" => Some(Rgb::new(229, 229, 229)),
        "darkgray" | "darkgrey" | "dark_gray" | "dark_grey" => Some(Rgb::new(127, 127, 127)),
        "lightred" | "light_red" => Some(Rgb::new(255, 0, 0)),
        "lightgreen" | "light_green" => Some(Rgb::new(0, 255, 0)),
        "lightyellow" | "light_yellow" => Some(Rgb::new(255, 255, 0)),
        "lightblue" | "light_blue" => Some(Rgb::new(92, 92, 255)),
        "lightmagenta" | "light_magenta" => Some(Rgb::new(255, 0, 255)),
        "lightcyan" | "light_cyan" => Some(Rgb::new(0, 255, 255)),
        hex => Rgb::from_hex(hex),
    }
}

fn color(field: &str, value: &str) -> SignResult<Rgb> {
    parse_color(value)
        .ok_or_else(|| SignError::Config(format!("{field}: invalid color \"{value}\"")))
}

// ─── Resolution ─────────────────────────────────────────────────────────

impl TimingEntry {
    pub fn resolve(&self) -> TransitionTiming {
        match self.mode {
            TimingMode::Duration => TransitionTiming::duration(self.duration_ms, self.easing),
            TimingMode::Speed => TransitionTiming::speed(self.min, self.max, self.randomize),
        }
    }
}

impl PlaylistConfig {
    /// Build the entry. Relative files resolve against `base_dir`.
    pub fn to_entry(&self, base_dir: &Path) -> SignResult<PlaylistEntry> {
        let sources = [self.text.is_some(), self.rows.is_some(), self.file.is_some()];
        if sources.iter().filter(|s| **s).count() != 1 {
            return Err(SignError::Playlist(
                "entry needs exactly one of text, rows or file".into(),
            ));
        }

        let state = self.color.unwrap_or(1);
        let pattern = if let Some(text) = &self.text {
            glyphs::text_pattern(text, state)
        } else if let Some(rows) = &self.rows {
            recolor(Pattern::new(rows.clone()), self.color)
        } else if let Some(file) = &self.file {
            recolor(Pattern::load(&base_dir.join(file))?, self.color)
        } else {
            Pattern::default()
        };

        let transition = TransitionOptions {
            strategy: self.strategy,
            duration_ms: self.duration_ms,
            easing: self.easing,
        };
        Ok(PlaylistEntry::new(pattern, self.hold_ms, transition))
    }
}

fn recolor(pattern: Pattern, color: Option<u8>) -> Pattern {
    match color {
        Some(state) => pattern.recolored(state),
        None => pattern,
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> SignResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Validate and freeze into the options the sign runs on.
    pub fn resolve(&self) -> SignResult<SignOptions> {
        let states = self
            .colors
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| color(&format!("colors.states[{i}]"), s))
            .collect::<SignResult<Vec<_>>>()?;

        let grid_mode = match self.grid.mode {
            GridKind::Fill => GridMode::Fill,
            GridKind::Sparse => GridMode::Sparse {
                lifespan: self.grid.lifespan,
            },
        };

        let options = SignOptions {
            led_size: self.display.led_size,
            led_gap: self.display.led_gap,
            scale_to_fit: self.display.scale_to_fit,
            fps: self.display.fps,
            alignment: self.display.alignment,
            idle_scale: self.display.idle_scale,
            active_scale: self.display.active_scale,
            color_cache_size: self.display.color_cache_size,
            base_color: color("colors.base", &self.colors.base)?,
            state_colors: states,
            min_opacity: self.opacity.min,
            max_opacity: self.opacity.max,
            active_opacity: self.opacity.active,
            scroll: ScrollOptions {
                direction: self.scroll.direction,
                speed: self.scroll.speed,
            },
            ignition: self.ignition,
            extinction: self.extinction,
            timing: TransitionTimings {
                ignition: self.timing.ignition.resolve(),
                extinction: self.timing.extinction.resolve(),
                morph: self.timing.morph.resolve(),
            },
            grid_mode,
        };
        options.validate()?;
        Ok(options)
    }

    /// Build the playlist. Entries that cannot be built are logged and
    /// skipped.
    pub fn playlist(&self, base_dir: &Path) -> Playlist {
        let mut playlist = Playlist::new();
        let colors = self.colors.states.len();
        for (i, entry) in self.playlist.iter().enumerate() {
            match entry.to_entry(base_dir) {
                Ok(entry) => {
                    let highest = usize::from(entry.pattern.max_value());
                    if highest > colors {
                        warn!(
                            "Playlist entry {} uses state {} but only {} colors are configured",
                            i, highest, colors
                        );
                    }
                    playlist.push(entry);
                }
                Err(e) => warn!("Skipping playlist entry {}: {}", i, e),
            }
        }
        playlist
    }
}

// ─── Path Resolution ────────────────────────────────────────────────────

impl Config {
    /// Standard config file path: ~/.config/ledsign/config.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ledsign")
            .join("config.toml")
    }
}

fn parse_scroll(s: &str) -> SignResult<ScrollDirection> {
    match s.trim().to_lowercase().as_str() {
        "none" | "off" => Ok(ScrollDirection::None),
        "left" => Ok(ScrollDirection::Left),
        "right" => Ok(ScrollDirection::Right),
        "up" => Ok(ScrollDirection::Up),
        "down" => Ok(ScrollDirection::Down),
        other => Err(SignError::Config(format!("unknown scroll direction \"{other}\""))),
    }
}

// ─── Bootloader ─────────────────────────────────────────────────────────

/// The single entry point for configuration. Called exactly once at startup.
///
/// 1. Resolve config file path (CLI override or default)
/// 2. If the config file doesn't exist, create directory tree + write defaults
/// 3. Parse TOML from disk into Config
/// 4. Apply CLI overrides on top
pub fn load(cli: &CliArgs) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    // Bootstrap: ensure the file exists on disk
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG_TOML).wrap_err_with(|| {
            format!(
                "Failed to write default config to {}",
                config_path.display()
            )
        })?;
        info!("Created default config at {}", config_path.display());
    }

    let toml_str = std::fs::read_to_string(&config_path)
        .wrap_err_with(|| format!("Failed to read config from {}", config_path.display()))?;

    let mut config = Config::from_toml_str(&toml_str).wrap_err_with(|| {
        format!(
            "Failed to parse config at {}.\n\
             Delete the file to regenerate defaults, or run:\n  \
             ledsign --print-default-config > {:?}",
            config_path.display(),
            config_path
        )
    })?;

    apply_overrides(&mut config, cli)?;
    Ok(config)
}

/// CLI flags win over the file.
pub fn apply_overrides(config: &mut Config, cli: &CliArgs) -> SignResult<()> {
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(fps) = cli.fps {
        config.display.fps = fps;
    }
    if cli.sparse {
        config.grid.mode = GridKind::Sparse;
    }
    if let Some(ref dir) = cli.scroll {
        config.scroll.direction = parse_scroll(dir)?;
    }
    if let Some(speed) = cli.speed {
        config.scroll.speed = speed;
    }

    // a single pattern from the command line replaces the playlist
    let single = if let Some(ref text) = cli.text {
        Some(PlaylistConfig {
            text: Some(text.clone()),
            ..PlaylistConfig::default()
        })
    } else {
        cli.pattern.as_ref().map(|file| PlaylistConfig {
            file: Some(file.clone()),
            ..PlaylistConfig::default()
        })
    };
    if let Some(entry) = single {
        config.playlist = vec![entry];
    }
    Ok(())
}

/// Returns the embedded default config TOML string.
pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{CascadeDirection, CascadePattern};

    #[test]
    fn embedded_default_resolves() {
        let config = Config::default();
        let options = config.resolve().unwrap();
        assert_eq!(options.state_colors.len(), 3);
        assert_eq!(options.fps, 30);
        assert!(!config.playlist.is_empty());
        let playlist = config.playlist(Path::new("."));
        assert_eq!(playlist.len(), config.playlist.len());
    }

    #[test]
    fn empty_file_uses_struct_defaults() {
        let config = Config::from_toml_str("").unwrap();
        let options = config.resolve().unwrap();
        assert_eq!(options.base_color, Rgb::new(0x2a, 0x12, 0x0c));
        assert_eq!(
            options.timing.ignition,
            TransitionTiming::duration(240.0, Easing::EaseOutQuad)
        );
        assert!(config.playlist.is_empty());
    }

    #[test]
    fn parses_sections() {
        let config = Config::from_toml_str(
            r##"
            [display]
            led_size = 12
            alignment = "bottom-left"

            [colors]
            base = "black"
            states = ["#ff0000", "lightcyan"]

            [ignition]
            pattern = "interlaced"
            direction = "to-top-left"
            delay = 2
            step = 3

            [timing.morph]
            mode = "speed"
            min = 0.2
            max = 0.4
            randomize = true

            [grid]
            mode = "sparse"
            lifespan = 12
            "##,
        )
        .unwrap();
        let options = config.resolve().unwrap();
        assert_eq!(options.led_size, 12.0);
        assert_eq!(options.alignment, Alignment::BottomLeft);
        assert_eq!(options.base_color, Rgb::new(0, 0, 0));
        assert_eq!(options.state_colors[1], Rgb::new(0, 255, 255));
        assert_eq!(options.ignition.pattern, CascadePattern::Interlaced);
        assert_eq!(options.ignition.direction, CascadeDirection::ToTopLeft);
        assert_eq!(options.ignition.step, 3);
        assert_eq!(options.timing.morph, TransitionTiming::speed(0.2, 0.4, true));
        assert_eq!(options.grid_mode, GridMode::Sparse { lifespan: 12 });
    }

    #[test]
    fn rejects_bad_values() {
        let config = Config::from_toml_str("[colors]\nbase = \"chartreuse-ish\"").unwrap();
        assert!(matches!(config.resolve(), Err(SignError::Config(_))));

        let config = Config::from_toml_str("[colors]\nstates = []").unwrap();
        assert!(config.resolve().is_err());

        let config = Config::from_toml_str("[opacity]\nmin = 0.9\nmax = 0.1").unwrap();
        assert!(config.resolve().is_err());

        assert!(Config::from_toml_str("[timing.morph]\neasing = \"wobbly\"").is_err());
    }

    #[test]
    fn playlist_entries_need_one_source() {
        let entry = PlaylistConfig {
            text: Some("HI".into()),
            rows: Some(vec![vec![1]]),
            ..PlaylistConfig::default()
        };
        assert!(matches!(
            entry.to_entry(Path::new(".")),
            Err(SignError::Playlist(_))
        ));

        let entry = PlaylistConfig {
            rows: Some(vec![vec![1, 0, 2]]),
            color: Some(3),
            ..PlaylistConfig::default()
        };
        let built = entry.to_entry(Path::new(".")).unwrap();
        assert_eq!(built.pattern, Pattern::new(vec![vec![3, 0, 3]]));
        assert_eq!(built.transition.strategy, Strategy::Fade);
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = Config::default();
        let cli = CliArgs {
            fps: Some(60),
            sparse: true,
            scroll: Some("left".into()),
            speed: Some(3.5),
            text: Some("OK".into()),
            log_level: Some("debug".into()),
            ..CliArgs::default()
        };
        apply_overrides(&mut config, &cli).unwrap();
        assert_eq!(config.display.fps, 60);
        assert_eq!(config.grid.mode, GridKind::Sparse);
        assert_eq!(config.scroll.direction, ScrollDirection::Left);
        assert_eq!(config.scroll.speed, 3.5);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.playlist.len(), 1);
        assert_eq!(config.playlist[0].text.as_deref(), Some("OK"));

        let cli = CliArgs {
            scroll: Some("sideways".into()),
            ..CliArgs::default()
        };
        assert!(apply_overrides(&mut config, &cli).is_err());
    }
}
