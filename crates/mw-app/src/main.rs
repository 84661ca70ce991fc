use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::Parser;
use mw_audio::capture::{AudioCapture, CaptureStatus};
use mw_audio::engine::MoodEngine;
use mw_audio::live::LiveSource;
use mw_core::config::EngineConfig;
use mw_scene::{MoodCycler, Scene};

pub mod cli;
pub mod hotreload;
pub mod pipeline;
pub mod report;

use cli::{Cli, Mode};
use pipeline::{Control, Runtime};
use report::Reporter;

fn main() -> Result<()> {
    // 1. CLI
    let cli = Cli::parse();

    // 2. Logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Config + CLI overrides
    let overrides = cli.overrides();
    let mut config = resolve_config(&cli)?;
    overrides.apply(&mut config);
    let duration = cli.run_duration()?;
    let config = Arc::new(ArcSwap::from_pointee(config));

    // 4. Hot reload (notify internal thread)
    let _watcher = if cli.config.exists() {
        Some(hotreload::spawn_config_watcher(&cli.config, &config, overrides)?)
    } else {
        None
    };

    // 5. Ctrl-C
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .context("Cannot install Ctrl-C handler")?;
    }

    // 6. Engine + scene
    let initial = config.load_full();
    let mut engine = MoodEngine::from_config(&initial)?;
    let mut scene = match cli.seed {
        Some(seed) => Scene::with_seed(
            initial.scene_width,
            initial.scene_height,
            initial.initial_mood,
            seed,
        ),
        None => Scene::new(initial.scene_width, initial.scene_height, initial.initial_mood),
    };
    log::info!(
        "Starting in {:?} mode, mood {} ({})",
        cli.mode,
        engine.mood(),
        engine.mood().label()
    );

    let mut rt = Runtime {
        config: Arc::clone(&config),
        reporter: Reporter::new(std::io::stdout().lock(), cli.json),
        control: Control::new(shutdown, duration),
    };

    // 7. Main loop
    let ticks = match cli.mode {
        Mode::Live => match AudioCapture::start_default() {
            Ok(capture) => run_live(capture, &initial, &mut engine, &mut scene, &mut rt)?,
            Err(e) => {
                log::warn!("Microphone unavailable ({e}), falling back to mood cycling");
                rt.reporter.status(CaptureStatus::Unavailable)?;
                run_cycle(&cli, &initial, &mut engine, &mut scene, &mut rt)?
            }
        },
        Mode::Cycle => run_cycle(&cli, &initial, &mut engine, &mut scene, &mut rt)?,
    };

    rt.reporter.finished(ticks, &scene.summary())
}

fn run_live(
    capture: AudioCapture,
    config: &EngineConfig,
    engine: &mut MoodEngine,
    scene: &mut Scene,
    rt: &mut Runtime<impl std::io::Write>,
) -> Result<u64> {
    let mut source = LiveSource::from_config(capture, config)?;
    rt.reporter.status(CaptureStatus::Analyzing)?;

    let result = pipeline::run_live(&mut source, engine, scene, rt);

    // Stop at a tick boundary: carried spectrum and averages go, the label stays.
    engine.stop();
    source.into_feed().stop();
    rt.reporter.status(CaptureStatus::Muted)?;
    result
}

fn run_cycle(
    cli: &Cli,
    config: &EngineConfig,
    engine: &mut MoodEngine,
    scene: &mut Scene,
    rt: &mut Runtime<impl std::io::Write>,
) -> Result<u64> {
    let period = Duration::from_secs_f32(config.cycle_period_secs);
    let mut cycler = match cli.seed {
        Some(seed) => MoodCycler::with_seed(period, seed.wrapping_add(1)),
        None => MoodCycler::new(period),
    };
    pipeline::run_cycle(&mut cycler, engine, scene, rt)
}

/// Load `--config` if it exists, otherwise fall back to the defaults.
fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    if cli.config.exists() {
        mw_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config not found: {}. Using defaults.",
            cli.config.display()
        );
        Ok(EngineConfig::default())
    }
}
