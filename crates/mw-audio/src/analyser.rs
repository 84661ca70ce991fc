use std::sync::Arc;

use mw_core::config::fft_bins;
use mw_core::error::CoreError;
use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

/// Blackman window alpha.
const BLACKMAN_ALPHA: f32 = 0.16;

/// Time samples in, decibel spectrum out.
///
/// Blackman-windowed real FFT, magnitudes normalized by the FFT size, smoothed
/// over time with `smoothing_time_constant`, then converted to decibels.
/// Produces `fft_size / 2` bins.
///
/// Pre-allocates the FFT plan and every buffer for a zero-allocation hot path.
///
/// # Example
/// ```
/// use mw_audio::analyser::Analyser;
/// let mut analyser = Analyser::new(256, 0.85).unwrap();
/// let spectrum = analyser.process(&[0.0f32; 256]);
/// assert_eq!(spectrum.len(), 128);
/// assert!(spectrum.iter().all(|db| *db == f32::NEG_INFINITY));
/// ```
pub struct Analyser {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    plan: Arc<dyn realfft::RealToComplex<f32>>,
    window: Vec<f32>,
    smoothing: f32,
    /// Smoothed linear magnitudes carried between frames.
    smoothed: Vec<f32>,
    freq_db: Vec<f32>,
}

impl Analyser {
    /// Create an analyser for windows of `fft_size` samples.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidFftSize` if `fft_size` is not a power of two
    /// in 32..=32768.
    pub fn new(fft_size: usize, smoothing_time_constant: f32) -> Result<Self, CoreError> {
        let bins = fft_bins(fft_size)?;

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(fft_size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        let a0 = 0.5 * (1.0 - BLACKMAN_ALPHA);
        let a1 = 0.5;
        let a2 = 0.5 * BLACKMAN_ALPHA;
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / fft_size as f32;
                a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
            })
            .collect();

        Ok(Self {
            fft_size,
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window,
            smoothing: smoothing_time_constant.clamp(0.0, 1.0),
            smoothed: vec![0.0; bins],
            freq_db: vec![f32::NEG_INFINITY; bins],
        })
    }

    /// Analyse the latest `fft_size` samples of `samples` and return the
    /// decibel spectrum. Shorter input is zero-padded at the front.
    pub fn process(&mut self, samples: &[f32]) -> &[f32] {
        let n = self.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < pad {
                0.0
            } else {
                tail[i - pad] * self.window[i]
            };
        }

        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            log::warn!("FFT failed, keeping previous spectrum");
            return &self.freq_db;
        }

        let scale = 1.0 / n as f32;
        let tau = self.smoothing;
        for ((c, smoothed), db) in self
            .spectrum_buf
            .iter()
            .zip(self.smoothed.iter_mut())
            .zip(self.freq_db.iter_mut())
        {
            let mag = c.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * mag;
            *db = if *smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                f32::NEG_INFINITY
            };
        }

        &self.freq_db
    }

    /// Latest decibel spectrum.
    #[must_use]
    pub fn freq_db(&self) -> &[f32] {
        &self.freq_db
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of output bins (`fft_size / 2`).
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.freq_db.len()
    }

    /// Change the temporal smoothing, clamped to [0.0, 1.0].
    pub fn set_smoothing(&mut self, smoothing_time_constant: f32) {
        self.smoothing = smoothing_time_constant.clamp(0.0, 1.0);
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.freq_db.fill(f32::NEG_INFINITY);
    }
}

/// Rolling window holding the latest `capacity` samples, oldest first.
///
/// # Example
/// ```
/// use mw_audio::analyser::SampleWindow;
/// let mut window = SampleWindow::new(4);
/// window.push_slice(&[1.0, 2.0, 3.0]);
/// assert!(!window.is_full());
/// window.push_slice(&[4.0, 5.0]);
/// assert_eq!(window.as_slice(), &[2.0, 3.0, 4.0, 5.0]);
/// ```
pub struct SampleWindow {
    buf: Vec<f32>,
    filled: usize,
}

impl SampleWindow {
    /// Create an empty window.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity],
            filled: 0,
        }
    }

    /// Append samples, dropping the oldest ones.
    pub fn push_slice(&mut self, samples: &[f32]) {
        let cap = self.buf.len();
        let k = samples.len();
        if k >= cap {
            self.buf.copy_from_slice(&samples[k - cap..]);
        } else {
            self.buf.copy_within(k.., 0);
            self.buf[cap - k..].copy_from_slice(samples);
        }
        self.filled = (self.filled + k).min(cap);
    }

    /// `true` once `capacity` samples have been pushed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// Window contents, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    /// Empty the window.
    pub fn clear(&mut self) {
        self.buf.fill(0.0);
        self.filled = 0;
    }
}
