use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use arc_swap::ArcSwap;
use mw_audio::capture::SampleFeed;
use mw_audio::engine::MoodEngine;
use mw_audio::live::LiveSource;
use mw_core::config::EngineConfig;
use mw_core::traits::FrameSource;
use mw_scene::{MoodCycler, Scene};

use crate::report::Reporter;

/// When a run loop should stop.
pub struct Control {
    /// Set from the Ctrl-C handler.
    pub shutdown: Arc<AtomicBool>,
    pub deadline: Option<Instant>,
    pub max_ticks: Option<u64>,
    /// Sleep to hold `target_fps`. Off in tests.
    pub paced: bool,
}

impl Control {
    #[must_use]
    pub fn new(shutdown: Arc<AtomicBool>, duration: Option<Duration>) -> Self {
        Self {
            shutdown,
            deadline: duration.map(|d| Instant::now() + d),
            max_ticks: None,
            paced: true,
        }
    }

    fn should_stop(&self, ticks: u64) -> bool {
        self.shutdown.load(Ordering::Relaxed)
            || self.max_ticks.is_some_and(|max| ticks >= max)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Sleep out the rest of the tick that started at `last`.
    fn pace(&self, last: &mut Instant, period: Duration) {
        if self.paced {
            let remaining = period.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }
        *last = Instant::now();
    }
}

/// Everything a run loop shares with the host.
pub struct Runtime<W> {
    pub config: Arc<ArcSwap<EngineConfig>>,
    pub reporter: Reporter<W>,
    pub control: Control,
}

/// Drive the engine from live audio until the run is stopped.
///
/// Each tick: read the hot config, pull a frame, tick the engine (the scene
/// regenerates on mood changes), then tune and advance the scene. Ticks
/// without a frame (sample window still filling) only advance the scene.
///
/// Returns the number of ticks run.
///
/// # Errors
/// Returns an error if the report output fails.
pub fn run_live<F: SampleFeed, W: Write>(
    source: &mut LiveSource<F>,
    engine: &mut MoodEngine,
    scene: &mut Scene,
    rt: &mut Runtime<W>,
) -> Result<u64> {
    let mut ticks = 0u64;
    let mut last = Instant::now();

    while !rt.control.should_stop(ticks) {
        let config = rt.config.load();
        engine.set_decimation(config.decimation);
        source.apply_config(&config);
        follow_size(scene, &config);

        if let Some(frame) = source.next_frame() {
            let report = engine.tick(&frame, scene);
            rt.reporter.tick(&report)?;
            scene.tune(report.intensity);
        }
        scene.advance();

        ticks += 1;
        rt.control.pace(&mut last, config.tick_period());
    }

    Ok(ticks)
}

/// Cycle random moods on a timer until the run is stopped.
///
/// The cycler advances by one nominal tick period per tick, so a run is
/// reproducible under a fixed seed regardless of scheduling jitter. Without
/// audio there is no intensity, so the scene only moves and is never tuned.
///
/// Returns the number of ticks run.
///
/// # Errors
/// Returns an error if the report output fails.
pub fn run_cycle<W: Write>(
    cycler: &mut MoodCycler,
    engine: &mut MoodEngine,
    scene: &mut Scene,
    rt: &mut Runtime<W>,
) -> Result<u64> {
    let mut ticks = 0u64;
    let mut last = Instant::now();

    while !rt.control.should_stop(ticks) {
        let config = rt.config.load();
        cycler.set_period(Duration::from_secs_f32(config.cycle_period_secs));
        follow_size(scene, &config);
        let period = config.tick_period();

        if let Some(mood) = cycler.advance(period) {
            engine.set_mood(mood);
            scene.set_mood(mood);
            rt.reporter.cycled(ticks, mood)?;
        }
        scene.advance();

        ticks += 1;
        rt.control.pace(&mut last, period);
    }

    Ok(ticks)
}

/// Apply a reloaded canvas size. Entities are kept.
fn follow_size(scene: &mut Scene, config: &EngineConfig) {
    let size = (config.scene_width, config.scene_height);
    if scene.size() != size {
        log::info!("Scene resized to {}x{}", size.0, size.1);
        scene.resize(size.0, size.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mw_core::mood::Mood;
    use mw_scene::Shape;

    struct Tone {
        freq_hz: f32,
        phase: f32,
    }

    impl SampleFeed for Tone {
        fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
            out.clear();
            let step = std::f32::consts::TAU * self.freq_hz / 48000.0;
            for _ in 0..800 {
                out.push(0.5 * self.phase.sin());
                self.phase = (self.phase + step) % std::f32::consts::TAU;
            }
            out.len()
        }

        fn sample_rate(&self) -> u32 {
            48000
        }
    }

    fn runtime(config: EngineConfig, max_ticks: u64) -> Runtime<Vec<u8>> {
        let mut control = Control::new(Arc::new(AtomicBool::new(false)), None);
        control.max_ticks = Some(max_ticks);
        control.paced = false;
        Runtime {
            config: Arc::new(ArcSwap::from_pointee(config)),
            reporter: Reporter::new(Vec::new(), true),
            control,
        }
    }

    fn events(rt: Runtime<Vec<u8>>) -> Vec<serde_json::Value> {
        String::from_utf8(rt.reporter.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn live_run_classifies_a_low_tone_as_bass() {
        let config = EngineConfig {
            decimation: 10,
            initial_mood: Mood::Melancholic,
            ..EngineConfig::default()
        };
        let mut rt = runtime(config.clone(), 60);
        let mut source = LiveSource::from_config(
            Tone {
                freq_hz: 100.0,
                phase: 0.0,
            },
            &config,
        )
        .unwrap();
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, config.initial_mood, 1);

        let ticks = run_live(&mut source, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(ticks, 60);
        assert_eq!(engine.mood(), Mood::Bass);
        assert_eq!(scene.mood(), Mood::Bass);
        assert_eq!(scene.generation(), 1);

        let out = events(rt);
        assert!(out.iter().all(|e| e["event"] == "classified"));
        assert_eq!(out.iter().filter(|e| e["changed"] == true).count(), 1);
    }

    #[test]
    fn live_run_picks_up_reloaded_decimation() {
        let config = EngineConfig::default();
        let mut rt = runtime(config.clone(), 10);
        rt.config.store(Arc::new(EngineConfig {
            decimation: 2,
            ..config.clone()
        }));
        let mut source = LiveSource::from_config(
            Tone {
                freq_hz: 440.0,
                phase: 0.0,
            },
            &config,
        )
        .unwrap();
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 1);
        run_live(&mut source, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(engine.decimation(), 2);
    }

    #[test]
    fn cycle_run_picks_at_the_configured_period() {
        let config = EngineConfig {
            target_fps: 60,
            cycle_period_secs: 1.0,
            ..EngineConfig::default()
        };
        let mut rt = runtime(config.clone(), 330);
        let mut cycler = MoodCycler::with_seed(Duration::from_secs(15), 4);
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 4);

        run_cycle(&mut cycler, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(cycler.period(), Duration::from_secs(1));
        assert_eq!(engine.mood(), scene.mood());
        assert_eq!(scene.generation(), 5);

        let out = events(rt);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|e| e["event"] == "cycled"));
    }

    fn sizes(scene: &Scene) -> Vec<f32> {
        scene
            .shapes()
            .iter()
            .filter_map(Shape::particle)
            .map(|p| p.size)
            .collect()
    }

    #[test]
    fn cycle_run_never_tunes_the_scene() {
        let config = EngineConfig::default();
        // 14 s at 60 fps, short of the 15 s cycle.
        let mut rt = runtime(config.clone(), 840);
        let mut cycler = MoodCycler::with_seed(Duration::from_secs(15), 4);
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 4);
        let before = sizes(&scene);

        run_cycle(&mut cycler, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(scene.generation(), 0);
        assert_eq!(sizes(&scene), before);
    }

    #[test]
    fn live_ticks_without_a_frame_do_not_tune() {
        let config = EngineConfig::default();
        // 800 samples per tick: the 2048-sample window fills on tick 3.
        let mut rt = runtime(config.clone(), 2);
        let mut source = LiveSource::from_config(
            Tone {
                freq_hz: 440.0,
                phase: 0.0,
            },
            &config,
        )
        .unwrap();
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 2);
        let before = sizes(&scene);

        run_live(&mut source, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(engine.ticks(), 0);
        assert_eq!(sizes(&scene), before);
        assert!(events(rt).is_empty());
    }

    #[test]
    fn reloaded_canvas_size_resizes_the_scene() {
        let config = EngineConfig::default();
        let mut rt = runtime(config.clone(), 3);
        rt.config.store(Arc::new(EngineConfig {
            scene_width: 640.0,
            scene_height: 360.0,
            ..config.clone()
        }));
        let mut cycler = MoodCycler::with_seed(Duration::from_secs(15), 4);
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Joyful, 4);

        run_cycle(&mut cycler, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(scene.size(), (640.0, 360.0));
        assert_eq!(scene.generation(), 0);
    }

    #[test]
    fn shutdown_flag_stops_immediately() {
        let config = EngineConfig::default();
        let mut rt = runtime(config.clone(), 1000);
        rt.control.shutdown.store(true, Ordering::Relaxed);
        let mut cycler = MoodCycler::with_seed(Duration::from_secs(15), 4);
        let mut engine = MoodEngine::from_config(&config).unwrap();
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 4);
        let ticks = run_cycle(&mut cycler, &mut engine, &mut scene, &mut rt).unwrap();
        assert_eq!(ticks, 0);
    }
}
