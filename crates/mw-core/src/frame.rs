use serde::Serialize;

use crate::mood::Mood;

/// One tick of analyser output.
///
/// Borrowed from the capture pipeline for the duration of a single
/// extraction call; overwritten on the next tick.
///
/// # Example
/// ```
/// use mw_core::frame::AudioFrame;
/// let freq = vec![-100.0f32; 1024];
/// let time = vec![0.0f32; 2048];
/// let frame = AudioFrame { freq_db: &freq, time: &time, sample_rate: 44100.0 };
/// assert_eq!(frame.bin_count(), 1024);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AudioFrame<'a> {
    /// Frequency magnitudes in decibels, one per bin.
    pub freq_db: &'a [f32],
    /// Time-domain samples, linear amplitude centered on zero.
    pub time: &'a [f32],
    /// Capture sample rate in Hz.
    pub sample_rate: f64,
}

impl AudioFrame<'_> {
    /// Number of frequency bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.freq_db.len()
    }
}

/// Scalar features extracted from one `AudioFrame`.
///
/// # Example
/// ```
/// use mw_core::frame::FeatureVector;
/// let f = FeatureVector::default();
/// assert_eq!(f.energy, 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    /// RMS of the time-domain samples.
    pub energy: f64,
    /// Magnitude-weighted mean frequency, in Hz.
    pub centroid: f64,
    /// Sign changes per sample [0.0, 1.0].
    pub zcr: f64,
    /// Sum of positive magnitude deltas since the previous frame.
    pub flux: f64,
    /// Share of magnitude below 300 Hz [0.0, 1.0].
    pub low_ratio: f64,
    /// Share of magnitude at or above 300 Hz [0.0, 1.0].
    pub high_ratio: f64,
}

/// Output of one engine tick, handed to the rendering side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick counter after this tick (starts at 1).
    pub tick: u64,
    /// Features of the current frame.
    pub features: FeatureVector,
    /// Smoothed intensity [0.0, 1.0].
    pub intensity: f64,
    /// Mood after this tick.
    pub mood: Mood,
    /// `true` if the classifier ran on this tick.
    pub classified: bool,
    /// `true` if the mood changed on this tick.
    pub changed: bool,
}
