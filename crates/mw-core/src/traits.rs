use crate::frame::AudioFrame;
use crate::mood::Mood;

/// Consumer of mood transitions.
///
/// Called once per change of label, never on ticks where the mood is kept.
/// Implemented by the scene (regenerates its entity population) and by any
/// closure taking a `Mood`.
///
/// # Example
/// ```
/// use mw_core::mood::Mood;
/// use mw_core::traits::MoodListener;
///
/// let mut seen = Vec::new();
/// let mut listener = |m: Mood| seen.push(m);
/// listener.on_mood_changed(Mood::Joyful);
/// assert_eq!(seen, vec![Mood::Joyful]);
/// ```
pub trait MoodListener {
    /// The mood switched to `mood`.
    fn on_mood_changed(&mut self, mood: Mood);
}

impl<F: FnMut(Mood)> MoodListener for F {
    fn on_mood_changed(&mut self, mood: Mood) {
        self(mood);
    }
}

/// Delivers analyser frames to the engine, one per tick.
///
/// # Example
/// ```
/// use mw_core::frame::AudioFrame;
/// use mw_core::traits::FrameSource;
///
/// struct Silence { freq: Vec<f32>, time: Vec<f32> }
/// impl FrameSource for Silence {
///     fn next_frame(&mut self) -> Option<AudioFrame<'_>> {
///         Some(AudioFrame { freq_db: &self.freq, time: &self.time, sample_rate: 48000.0 })
///     }
/// }
/// ```
pub trait FrameSource {
    /// The frame for this tick.
    ///
    /// Returns `None` while not enough audio has been buffered. Never blocks.
    fn next_frame(&mut self) -> Option<AudioFrame<'_>>;
}
