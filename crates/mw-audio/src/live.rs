use mw_core::config::EngineConfig;
use mw_core::error::CoreError;
use mw_core::frame::AudioFrame;
use mw_core::traits::FrameSource;

use crate::analyser::{Analyser, SampleWindow};
use crate::capture::SampleFeed;

/// Frame source fed by a live sample stream.
///
/// Each call to `next_frame` drains the feed, slides the sample window and
/// re-runs the analyser, so the time and frequency buffers always describe
/// the same latest `fft_size` samples.
///
/// # Example
/// ```
/// use mw_audio::capture::SampleFeed;
/// use mw_audio::live::LiveSource;
/// use mw_core::traits::FrameSource;
///
/// struct Silence;
/// impl SampleFeed for Silence {
///     fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
///         out.clear();
///         out.resize(512, 0.0);
///         512
///     }
///     fn sample_rate(&self) -> u32 { 48000 }
/// }
///
/// let mut source = LiveSource::new(Silence, 1024, 0.85).unwrap();
/// assert!(source.next_frame().is_none());
/// let frame = source.next_frame().unwrap();
/// assert_eq!(frame.bin_count(), 512);
/// ```
pub struct LiveSource<F> {
    feed: F,
    window: SampleWindow,
    analyser: Analyser,
    scratch: Vec<f32>,
}

impl<F: SampleFeed> LiveSource<F> {
    /// Wrap `feed` with an analyser of `fft_size` samples.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidFftSize` if `fft_size` is unusable.
    pub fn new(feed: F, fft_size: usize, smoothing_time_constant: f32) -> Result<Self, CoreError> {
        let analyser = Analyser::new(fft_size, smoothing_time_constant)?;
        Ok(Self {
            feed,
            window: SampleWindow::new(fft_size),
            analyser,
            scratch: Vec::with_capacity(fft_size),
        })
    }

    /// Wrap `feed` with the analyser settings of `config`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidFftSize` if the configured FFT size is unusable.
    pub fn from_config(feed: F, config: &EngineConfig) -> Result<Self, CoreError> {
        Self::new(feed, config.fft_size, config.smoothing_time_constant)
    }

    /// Apply hot-reloadable analyser settings.
    pub fn apply_config(&mut self, config: &EngineConfig) {
        self.analyser.set_smoothing(config.smoothing_time_constant);
    }

    /// Drop buffered samples and analyser history.
    pub fn reset(&mut self) {
        self.window.clear();
        self.analyser.reset();
    }

    /// Unwrap the feed.
    pub fn into_feed(self) -> F {
        self.feed
    }
}

impl<F: SampleFeed> FrameSource for LiveSource<F> {
    fn next_frame(&mut self) -> Option<AudioFrame<'_>> {
        self.feed.read_samples(&mut self.scratch);
        self.window.push_slice(&self.scratch);
        if !self.window.is_full() {
            return None;
        }
        let freq_db = self.analyser.process(self.window.as_slice());
        Some(AudioFrame {
            freq_db,
            time: self.window.as_slice(),
            sample_rate: f64::from(self.feed.sample_rate()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MoodEngine;
    use mw_core::mood::Mood;

    /// Deterministic tone generator standing in for a microphone.
    struct Tone {
        freq_hz: f32,
        amplitude: f32,
        phase: f32,
        per_read: usize,
    }

    impl SampleFeed for Tone {
        fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
            out.clear();
            let step = std::f32::consts::TAU * self.freq_hz / 48000.0;
            for _ in 0..self.per_read {
                out.push(self.amplitude * self.phase.sin());
                self.phase = (self.phase + step) % std::f32::consts::TAU;
            }
            self.per_read
        }

        fn sample_rate(&self) -> u32 {
            48000
        }
    }

    fn tone(freq_hz: f32, amplitude: f32) -> Tone {
        Tone {
            freq_hz,
            amplitude,
            phase: 0.0,
            per_read: 800,
        }
    }

    #[test]
    fn waits_for_a_full_window() {
        let mut source = LiveSource::new(tone(440.0, 0.5), 2048, 0.85).unwrap();
        assert!(source.next_frame().is_none());
        assert!(source.next_frame().is_none());
        let frame = source.next_frame().unwrap();
        assert_eq!(frame.time.len(), 2048);
        assert_eq!(frame.freq_db.len(), 1024);
        assert!((frame.sample_rate - 48000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_requires_refill() {
        let mut source = LiveSource::new(tone(440.0, 0.5), 1024, 0.85).unwrap();
        assert!(source.next_frame().is_none());
        assert!(source.next_frame().is_some());
        source.reset();
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn low_tone_is_classified_as_bass() {
        let mut source = LiveSource::new(tone(100.0, 0.5), 2048, 0.0).unwrap();
        let mut engine = MoodEngine::new(1024, 10, Mood::Melancholic);
        let mut moods = Vec::new();
        for _ in 0..40 {
            if let Some(frame) = source.next_frame() {
                engine.tick(&frame, &mut |m: Mood| moods.push(m));
            }
        }
        assert_eq!(moods, vec![Mood::Bass]);
    }

    #[test]
    fn high_tone_is_classified_as_treble() {
        let mut source = LiveSource::new(tone(6000.0, 0.03), 2048, 0.85).unwrap();
        let mut engine = MoodEngine::new(1024, 10, Mood::Bass);
        for _ in 0..40 {
            if let Some(frame) = source.next_frame() {
                engine.tick(&frame, &mut |_: Mood| {});
            }
        }
        assert_eq!(engine.mood(), Mood::Treble);
    }
}
