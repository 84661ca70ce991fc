use mw_core::config::{EngineConfig, fft_bins};
use mw_core::error::CoreError;
use mw_core::frame::{AudioFrame, TickReport};
use mw_core::mood::Mood;
use mw_core::traits::MoodListener;

use crate::classify::classify;
use crate::features::FeatureExtractor;
use crate::smoothing::IntensitySmoother;

/// Default classification cadence, in ticks.
pub const DEFAULT_DECIMATION: u32 = 30;

/// Per-tick driver: extraction, smoothing, and decimated classification.
///
/// Single-threaded. All carried state (previous spectrum, flux average, tick
/// counter, current mood) lives here and is only touched from `tick`.
///
/// # Example
/// ```
/// use mw_audio::engine::MoodEngine;
/// use mw_core::frame::AudioFrame;
/// use mw_core::mood::Mood;
///
/// let mut engine = MoodEngine::new(1024, 30, Mood::Bass);
/// let freq = vec![f32::NEG_INFINITY; 1024];
/// let time = vec![0.0f32; 2048];
/// let frame = AudioFrame { freq_db: &freq, time: &time, sample_rate: 48000.0 };
/// let mut changes = Vec::new();
/// for _ in 0..30 {
///     engine.tick(&frame, &mut |m: Mood| changes.push(m));
/// }
/// assert_eq!(changes, vec![Mood::Melancholic]);
/// ```
pub struct MoodEngine {
    extractor: FeatureExtractor,
    smoother: IntensitySmoother,
    mood: Mood,
    ticks: u64,
    decimation: u32,
}

impl MoodEngine {
    /// Create an engine for spectra of `bin_count` bins, classifying every
    /// `decimation` ticks (at least 1).
    #[must_use]
    pub fn new(bin_count: usize, decimation: u32, initial_mood: Mood) -> Self {
        Self {
            extractor: FeatureExtractor::new(bin_count),
            smoother: IntensitySmoother::new(),
            mood: initial_mood,
            ticks: 0,
            decimation: decimation.max(1),
        }
    }

    /// Create an engine sized for `config.fft_size`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidFftSize` if the configured FFT size is unusable.
    pub fn from_config(config: &EngineConfig) -> Result<Self, CoreError> {
        let bins = fft_bins(config.fft_size)?;
        Ok(Self::new(bins, config.decimation, config.initial_mood))
    }

    /// Process one frame.
    ///
    /// Smoothing runs on every tick; classification only when the tick counter
    /// is a multiple of the decimation factor, and after smoothing, on the
    /// feature vector of this very frame. `listener` is called once per
    /// change of mood.
    pub fn tick<L>(&mut self, frame: &AudioFrame<'_>, listener: &mut L) -> TickReport
    where
        L: MoodListener + ?Sized,
    {
        let features = self.extractor.extract(frame);
        let intensity = self.smoother.update(&features);

        self.ticks += 1;
        let classified = self.ticks % u64::from(self.decimation) == 0;
        let mut changed = false;

        if classified {
            let next = classify(&features, self.mood);
            if next != self.mood {
                log::debug!(
                    "Mood {} -> {} (tick {}, energy {:.3}, centroid {:.0} Hz, flux {:.3})",
                    self.mood,
                    next,
                    self.ticks,
                    features.energy,
                    features.centroid,
                    features.flux
                );
                self.mood = next;
                changed = true;
                listener.on_mood_changed(next);
            }
        }

        TickReport {
            tick: self.ticks,
            features,
            intensity,
            mood: self.mood,
            classified,
            changed,
        }
    }

    /// Current mood.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Override the mood (manual or timer selection).
    ///
    /// Returns `true` if the mood changed. The listener is not called; the
    /// caller owns that side effect.
    pub fn set_mood(&mut self, mood: Mood) -> bool {
        let changed = self.mood != mood;
        self.mood = mood;
        changed
    }

    /// Latest smoothed intensity.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        self.smoother.intensity()
    }

    /// Ticks processed since creation or the last `stop`.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Classification cadence.
    #[must_use]
    pub fn decimation(&self) -> u32 {
        self.decimation
    }

    /// Change the classification cadence (at least 1). Takes effect on the
    /// next tick.
    pub fn set_decimation(&mut self, decimation: u32) {
        self.decimation = decimation.max(1);
    }

    /// Spectrum size expected by `tick`.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.extractor.bin_count()
    }

    /// Capture stopped: discard carried spectrum, averages, and the tick
    /// counter. The mood label is kept.
    pub fn stop(&mut self) {
        self.extractor.reset();
        self.smoother.reset();
        self.ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: usize = 64;
    const SR: f64 = 48000.0;

    struct Frames {
        silence: Vec<f32>,
        bass: Vec<f32>,
        quiet_time: Vec<f32>,
        loud_time: Vec<f32>,
    }

    fn frames() -> Frames {
        // Bin width 375 Hz: only bin 0 is below 300 Hz.
        let mut bass = vec![f32::NEG_INFINITY; BINS];
        bass[0] = 0.0;
        Frames {
            silence: vec![f32::NEG_INFINITY; BINS],
            bass,
            quiet_time: vec![0.0; 128],
            loud_time: (0..128).map(|i| if i < 64 { 0.2 } else { -0.2 }).collect(),
        }
    }

    fn frame<'a>(freq: &'a [f32], time: &'a [f32]) -> AudioFrame<'a> {
        AudioFrame {
            freq_db: freq,
            time,
            sample_rate: SR,
        }
    }

    #[test]
    fn classifies_only_on_decimated_ticks() {
        let f = frames();
        let mut engine = MoodEngine::new(BINS, 5, Mood::Bass);
        let mut calls = 0;
        for i in 1..=12u64 {
            let report = engine.tick(&frame(&f.silence, &f.quiet_time), &mut |_: Mood| calls += 1);
            assert_eq!(report.tick, i);
            assert_eq!(report.classified, i % 5 == 0);
            if i < 5 {
                assert_eq!(report.mood, Mood::Bass);
            } else {
                assert_eq!(report.mood, Mood::Melancholic);
            }
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn listener_called_once_per_change() {
        let f = frames();
        let mut engine = MoodEngine::new(BINS, 1, Mood::Treble);
        let mut seen = Vec::new();
        {
            let mut listener = |m: Mood| seen.push(m);
            for _ in 0..3 {
                engine.tick(&frame(&f.silence, &f.quiet_time), &mut listener);
            }
            for _ in 0..3 {
                engine.tick(&frame(&f.bass, &f.loud_time), &mut listener);
            }
        }
        assert_eq!(seen, vec![Mood::Melancholic, Mood::Bass]);
        assert_eq!(engine.mood(), Mood::Bass);
    }

    #[test]
    fn report_flags_the_changing_tick() {
        let f = frames();
        let mut engine = MoodEngine::new(BINS, 1, Mood::Bass);
        let first = engine.tick(&frame(&f.silence, &f.quiet_time), &mut |_: Mood| {});
        assert!(first.changed);
        let second = engine.tick(&frame(&f.silence, &f.quiet_time), &mut |_: Mood| {});
        assert!(second.classified && !second.changed);
    }

    #[test]
    fn intensity_updates_every_tick() {
        let f = frames();
        let mut engine = MoodEngine::new(BINS, 30, Mood::Bass);
        assert!((engine.intensity() - 0.5).abs() < 1e-12);
        let report = engine.tick(&frame(&f.bass, &f.loud_time), &mut |_: Mood| {});
        assert!(!report.classified);
        // energy 0.2, no flux on the seeding frame
        assert!((report.intensity - 0.4).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&report.intensity));
    }

    #[test]
    fn stop_discards_carried_state() {
        let f = frames();
        let mut engine = MoodEngine::new(BINS, 1, Mood::Bass);
        engine.tick(&frame(&f.silence, &f.quiet_time), &mut |_: Mood| {});
        let mood = engine.mood();
        engine.stop();
        assert_eq!(engine.ticks(), 0);
        assert_eq!(engine.mood(), mood);
        // Louder spectrum right after stop: first frame seeds, no flux.
        let report = engine.tick(&frame(&f.bass, &f.quiet_time), &mut |_: Mood| {});
        assert_eq!(report.features.flux, 0.0);
    }

    #[test]
    fn set_mood_reports_change_without_listener() {
        let mut engine = MoodEngine::new(BINS, 30, Mood::Bass);
        assert!(engine.set_mood(Mood::Joyful));
        assert!(!engine.set_mood(Mood::Joyful));
        assert_eq!(engine.mood(), Mood::Joyful);
    }

    #[test]
    fn decimation_is_at_least_one() {
        let mut engine = MoodEngine::new(BINS, 0, Mood::Bass);
        assert_eq!(engine.decimation(), 1);
        engine.set_decimation(0);
        assert_eq!(engine.decimation(), 1);
        engine.set_decimation(10);
        assert_eq!(engine.decimation(), 10);
    }

    #[test]
    fn from_config_sizes_the_extractor() {
        let config = EngineConfig {
            fft_size: 512,
            ..EngineConfig::default()
        };
        let engine = MoodEngine::from_config(&config).unwrap();
        assert_eq!(engine.bin_count(), 256);
        assert_eq!(engine.decimation(), 30);

        let bad = EngineConfig {
            fft_size: 500,
            ..EngineConfig::default()
        };
        assert!(MoodEngine::from_config(&bad).is_err());
    }
}
