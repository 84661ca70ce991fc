/// Configuration, shared types, and collaborator contracts for moodwave.
///
/// This crate holds everything the audio engine, the scene consumer and the
/// application host agree on: the mood label, the per-tick frame and feature
/// types, the TOML configuration and the listener/source traits.

pub mod config;
pub mod error;
pub mod frame;
pub mod mood;
pub mod traits;

pub use config::EngineConfig;
pub use error::CoreError;
pub use frame::{AudioFrame, FeatureVector, TickReport};
pub use mood::Mood;
pub use traits::{FrameSource, MoodListener};
