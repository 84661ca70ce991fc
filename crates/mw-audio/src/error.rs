use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio input device found.
    #[error("No audio input device found")]
    NoInputDevice,

    /// The device could not report a usable input configuration.
    #[error("Input device configuration unavailable : {0}")]
    DeviceConfig(String),

    /// Sample format the capture callback cannot convert.
    #[error("Unsupported sample format : {0}")]
    UnsupportedFormat(String),

    /// Audio stream error.
    #[error("Audio stream error : {0}")]
    StreamError(String),
}
