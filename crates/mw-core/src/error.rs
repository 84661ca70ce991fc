use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Mood name that matches none of the four variants or their aliases.
    #[error("Unknown mood : {name} (expected bass, treble, joyful or melancholic)")]
    UnknownMood {
        /// The rejected name.
        name: String,
    },

    /// FFT size outside the analyser's supported range.
    #[error("Invalid FFT size : {size} (power of two in 32..=32768)")]
    InvalidFftSize {
        /// The rejected size.
        size: usize,
    },
}
