use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::error::AudioError;

/// User-facing capture state, shown next to the mood label.
///
/// # Example
/// ```
/// use mw_audio::capture::CaptureStatus;
/// assert_eq!(CaptureStatus::Muted.message(), "静音");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Microphone open, analysis running.
    Analyzing,
    /// Capture stopped by the user.
    Muted,
    /// Permission denied or no usable device.
    Unavailable,
}

impl CaptureStatus {
    /// Message displayed to the user.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            CaptureStatus::Analyzing => "分析中…",
            CaptureStatus::Muted => "静音",
            CaptureStatus::Unavailable => "权限或设备不可用",
        }
    }
}

/// Audio capture via cpal.
///
/// Writes mono f32 samples into a lock-free ring buffer, drained once per
/// tick by `read_samples`.
///
/// # Example
/// ```no_run
/// use mw_audio::capture::AudioCapture;
/// let capture = AudioCapture::start_default().unwrap();
/// ```
pub struct AudioCapture {
    stream: cpal::Stream,
    consumer: Consumer<f32>,
    sample_rate: u32,
}

impl AudioCapture {
    /// Start capturing from the default input device.
    ///
    /// # Errors
    /// Returns an error if no input device is available, its format cannot be
    /// converted, or the stream cannot be started.
    pub fn start_default() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels()).max(1);
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        // Ring buffer: 2 seconds of audio @ sample_rate
        let buf_size = sample_rate as usize * 2;
        let (producer, consumer) = RingBuffer::new(buf_size);

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, producer)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, producer)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, producer)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &config, channels, producer)?,
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        log::info!(
            "Microphone capture started @ {sample_rate}Hz, {channels} channel(s), {format:?}"
        );

        Ok(Self {
            stream,
            consumer,
            sample_rate,
        })
    }

    /// Stop the stream. Buffered samples are dropped with the capture.
    pub fn stop(self) {
        if let Err(e) = self.stream.pause() {
            log::warn!("Failed to pause capture stream: {e}");
        }
        log::info!("Microphone capture stopped");
    }

    /// The sample rate of the capture stream.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Anything that hands over buffered mono samples once per tick.
pub trait SampleFeed {
    /// Move every available sample into `out` (cleared first).
    ///
    /// Returns how many samples were read.
    fn read_samples(&mut self, out: &mut Vec<f32>) -> usize;

    /// Sample rate of the delivered samples, in Hz.
    fn sample_rate(&self) -> u32;
}

impl SampleFeed for AudioCapture {
    fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
        let available = self.consumer.slots();
        out.clear();
        out.reserve(available);
        while let Ok(sample) = self.consumer.pop() {
            out.push(sample);
        }
        out.len()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Build an input stream that downmixes `T` frames to mono f32.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mut producer: Producer<f32>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for frame in data.chunks(channels) {
                    let mono = frame.iter().map(|&s| f32::from_sample(s)).sum::<f32>()
                        / frame.len() as f32;
                    // Ring full: the tick loop is behind, drop the sample.
                    let _ = producer.push(mono);
                }
            },
            |err| {
                log::error!("Audio stream error: {err}");
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))
}
