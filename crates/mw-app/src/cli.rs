use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use mw_core::config::EngineConfig;
use mw_core::mood::Mood;

/// moodwave — live mood classification driving generative visuals.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source of mood changes: microphone analysis or timed random cycling.
    #[arg(long, value_enum, default_value_t = Mode::Live)]
    pub mode: Mode,

    /// TOML configuration file. Default: config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Target ticks per second.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Classify every N-th tick.
    #[arg(long)]
    pub decimation: Option<u32>,

    /// Initial mood: bass, treble, joyful, melancholic (or calm, excited, happy, sad).
    #[arg(long)]
    pub mood: Option<Mood>,

    /// Seed for the scene and cycling randomness.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many seconds. Default: run until Ctrl-C.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Emit one JSON line per classification and mood change on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Classify the default input device.
    Live,
    /// Pick a random mood at a fixed period.
    Cycle,
}

impl Cli {
    /// Command-line values that take precedence over the config file.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            fps: self.fps,
            decimation: self.decimation,
            mood: self.mood,
        }
    }

    /// The run duration, if one was given.
    ///
    /// # Errors
    /// Returns an error if the duration is negative or not finite.
    pub fn run_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.duration
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| anyhow::anyhow!("Invalid --duration {secs}: {e}"))
            })
            .transpose()
    }
}

/// CLI overrides, re-applied after every config reload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub fps: Option<u32>,
    pub decimation: Option<u32>,
    pub mood: Option<Mood>,
}

impl Overrides {
    /// Apply the overrides to `config` and re-clamp it.
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(fps) = self.fps {
            config.target_fps = fps;
        }
        if let Some(decimation) = self.decimation {
            config.decimation = decimation;
        }
        if let Some(mood) = self.mood {
            config.initial_mood = mood;
        }
        config.clamp_all();
    }
}
