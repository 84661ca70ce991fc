/// Audio capture, feature extraction, and mood classification for moodwave.
///
/// Turns a live sample stream into analyser frames, extracts per-frame
/// features, smooths intensity and classifies the mood on decimated ticks.

pub mod analyser;
pub mod capture;
pub mod classify;
pub mod engine;
pub mod error;
pub mod features;
pub mod live;
pub mod smoothing;
