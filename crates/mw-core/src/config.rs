use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::mood::Mood;

/// Smallest FFT size the analyser accepts.
pub const MIN_FFT_SIZE: usize = 32;
/// Largest FFT size the analyser accepts.
pub const MAX_FFT_SIZE: usize = 32768;

/// Runtime configuration, hot-reloadable.
///
/// Serializable to TOML. Every field has a sane default. The classifier
/// thresholds are deliberately not part of it.
///
/// # Example
/// ```
/// use mw_core::config::EngineConfig;
/// let config = EngineConfig::default();
/// assert_eq!(config.decimation, 30);
/// assert_eq!(config.fft_size, 2048);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    // === Engine ===
    /// Ticks per second of the host loop.
    pub target_fps: u32,
    /// Classify every N-th tick. 1 = every tick.
    pub decimation: u32,
    /// Mood shown before the first classification.
    pub initial_mood: Mood,

    // === Analyser ===
    /// FFT window size (power of two). Bin count is half of it.
    pub fft_size: usize,
    /// Magnitude smoothing between analyser frames [0.0, 1.0].
    pub smoothing_time_constant: f32,

    // === Scene ===
    /// Canvas width in pixels.
    pub scene_width: f32,
    /// Canvas height in pixels.
    pub scene_height: f32,
    /// Seconds between random mood changes when idle.
    pub cycle_period_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            decimation: 30,
            initial_mood: Mood::Bass,
            fft_size: 2048,
            smoothing_time_constant: 0.85,
            scene_width: 960.0,
            scene_height: 540.0,
            cycle_period_secs: 15.0,
        }
    }
}

impl EngineConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.target_fps = self.target_fps.clamp(15, 240);
        self.decimation = self.decimation.clamp(1, 600);
        let fft = self
            .fft_size
            .clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)
            .next_power_of_two();
        if fft != self.fft_size {
            log::warn!("fft_size {} adjusted to {fft}", self.fft_size);
            self.fft_size = fft;
        }
        self.replace_non_finite();
        self.smoothing_time_constant = self.smoothing_time_constant.clamp(0.0, 1.0);
        self.scene_width = self.scene_width.clamp(120.0, 8192.0);
        self.scene_height = self.scene_height.clamp(120.0, 8192.0);
        self.cycle_period_secs = self.cycle_period_secs.clamp(1.0, 600.0);
    }

    /// TOML accepts `nan` and `inf`, which `clamp` lets through.
    fn replace_non_finite(&mut self) {
        let defaults = Self::default();
        for (name, value, default) in [
            (
                "smoothing_time_constant",
                &mut self.smoothing_time_constant,
                defaults.smoothing_time_constant,
            ),
            ("scene.width", &mut self.scene_width, defaults.scene_width),
            ("scene.height", &mut self.scene_height, defaults.scene_height),
            (
                "cycle_period_secs",
                &mut self.cycle_period_secs,
                defaults.cycle_period_secs,
            ),
        ] {
            if !value.is_finite() {
                log::warn!("{name} = {value} is not finite, using {default}");
                *value = default;
            }
        }
    }

    /// Duration of one tick at `target_fps`.
    #[must_use]
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

/// Check that `size` is a usable FFT size and return its bin count.
///
/// # Errors
/// Returns `CoreError::InvalidFftSize` if `size` is not a power of two in
/// `MIN_FFT_SIZE..=MAX_FFT_SIZE`.
///
/// # Example
/// ```
/// use mw_core::config::fft_bins;
/// assert_eq!(fft_bins(2048), Ok(1024));
/// assert!(fft_bins(1000).is_err());
/// ```
pub fn fft_bins(size: usize) -> Result<usize, CoreError> {
    if !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size) || !size.is_power_of_two() {
        return Err(CoreError::InvalidFftSize { size });
    }
    Ok(size / 2)
}

/// Intermediate TOML structure, every section optional.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    engine: Option<EngineSection>,
    analyser: Option<AnalyserSection>,
    scene: Option<SceneSection>,
}

#[derive(Deserialize)]
struct EngineSection {
    target_fps: Option<u32>,
    decimation: Option<u32>,
    initial_mood: Option<Mood>,
}

#[derive(Deserialize)]
struct AnalyserSection {
    fft_size: Option<usize>,
    smoothing_time_constant: Option<f32>,
}

#[derive(Deserialize)]
struct SceneSection {
    width: Option<f32>,
    height: Option<f32>,
    cycle_period_secs: Option<f32>,
}

/// Parse a TOML document and merge it over the defaults.
///
/// # Errors
/// Returns an error if the document is not valid TOML for this schema.
///
/// # Example
/// ```
/// use mw_core::config::parse_config;
/// let config = parse_config("[engine]\ndecimation = 10\n").unwrap();
/// assert_eq!(config.decimation, 10);
/// assert_eq!(config.target_fps, 60);
/// ```
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML parse error")?;

    let mut config = EngineConfig::default();

    if let Some(e) = file.engine {
        if let Some(v) = e.target_fps {
            config.target_fps = v;
        }
        if let Some(v) = e.decimation {
            config.decimation = v;
        }
        if let Some(v) = e.initial_mood {
            config.initial_mood = v;
        }
    }
    if let Some(a) = file.analyser {
        if let Some(v) = a.fft_size {
            config.fft_size = v;
        }
        if let Some(v) = a.smoothing_time_constant {
            config.smoothing_time_constant = v;
        }
    }
    if let Some(s) = file.scene {
        if let Some(v) = s.width {
            config.scene_width = v;
        }
        if let Some(v) = s.height {
            config.scene_height = v;
        }
        if let Some(v) = s.cycle_period_secs {
            config.cycle_period_secs = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Load a TOML file and merge it over the defaults.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use mw_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config in {}", path.display()))
}
