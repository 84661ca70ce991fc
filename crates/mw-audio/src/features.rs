use mw_core::frame::{AudioFrame, FeatureVector};

/// Boundary between the low and high partitions, in Hz.
pub const LOW_BAND_HZ: f64 = 300.0;

/// Decibel value to linear amplitude. `-inf` maps to 0.
///
/// # Example
/// ```
/// use mw_audio::features::lin_mag;
/// assert!((lin_mag(0.0) - 1.0).abs() < 1e-12);
/// assert_eq!(lin_mag(f32::NEG_INFINITY), 0.0);
/// ```
#[inline(always)]
#[must_use]
pub fn lin_mag(db: f32) -> f64 {
    10f64.powf(f64::from(db) / 20.0)
}

/// Center frequency of bin `index` out of `bins`, for a spectrum spanning
/// 0..Nyquist.
///
/// # Example
/// ```
/// use mw_audio::features::bin_frequency;
/// let hz = bin_frequency(150, 1024, 44100.0);
/// assert!((hz - 3230.57).abs() < 0.01);
/// ```
#[inline(always)]
#[must_use]
pub fn bin_frequency(index: usize, bins: usize, sample_rate: f64) -> f64 {
    if bins == 0 {
        return 0.0;
    }
    (index as f64 / bins as f64) * (sample_rate / 2.0)
}

/// Per-frame feature extractor.
///
/// Owns the previous magnitude spectrum used for spectral flux. The buffer is
/// allocated once, sized to the bin count, and never resized.
///
/// # Example
/// ```
/// use mw_audio::features::FeatureExtractor;
/// use mw_core::frame::AudioFrame;
///
/// let mut extractor = FeatureExtractor::new(1024);
/// let freq = vec![-60.0f32; 1024];
/// let time = vec![0.0f32; 2048];
/// let frame = AudioFrame { freq_db: &freq, time: &time, sample_rate: 44100.0 };
/// let first = extractor.extract(&frame);
/// assert_eq!(first.flux, 0.0);
/// assert_eq!(first.energy, 0.0);
/// ```
pub struct FeatureExtractor {
    prev_mag: Vec<f64>,
    seeded: bool,
}

impl FeatureExtractor {
    /// Create an extractor for spectra of `bin_count` bins.
    #[must_use]
    pub fn new(bin_count: usize) -> Self {
        Self {
            prev_mag: vec![0.0; bin_count],
            seeded: false,
        }
    }

    /// Number of frequency bins this extractor expects.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.prev_mag.len()
    }

    /// `true` once a spectrum has been stored for the next flux diff.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Forget the carried spectrum. The next frame seeds it again.
    pub fn reset(&mut self) {
        self.prev_mag.fill(0.0);
        self.seeded = false;
    }

    /// Extract the feature vector of `frame` and carry its spectrum forward.
    ///
    /// The first frame after construction or `reset()` only seeds the
    /// carried spectrum and reports a flux of 0.
    pub fn extract(&mut self, frame: &AudioFrame<'_>) -> FeatureVector {
        debug_assert_eq!(
            frame.freq_db.len(),
            self.prev_mag.len(),
            "spectrum length does not match the configured bin count"
        );

        let (energy, zcr) = time_features(frame.time);

        let n = frame.freq_db.len();
        let mut mag_sum = 0.0f64;
        let mut centroid_num = 0.0f64;
        let mut low_sum = 0.0f64;
        let mut high_sum = 0.0f64;
        let mut flux = 0.0f64;

        for (i, (&db, prev)) in frame
            .freq_db
            .iter()
            .zip(self.prev_mag.iter_mut())
            .enumerate()
        {
            let mag = lin_mag(db);
            let hz = bin_frequency(i, n, frame.sample_rate);

            mag_sum += mag;
            centroid_num += hz * mag;
            if hz < LOW_BAND_HZ {
                low_sum += mag;
            } else {
                high_sum += mag;
            }

            if self.seeded {
                let delta = mag - *prev;
                if delta > 0.0 {
                    flux += delta;
                }
            }
            *prev = mag;
        }
        self.seeded = true;

        let (centroid, low_ratio, high_ratio) = if mag_sum > 0.0 {
            (
                centroid_num / mag_sum,
                low_sum / mag_sum,
                high_sum / mag_sum,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        FeatureVector {
            energy,
            centroid,
            zcr,
            flux,
            low_ratio,
            high_ratio,
        }
    }
}

/// RMS and zero-crossing rate of a time-domain buffer.
///
/// Zero counts as non-negative when detecting sign changes.
fn time_features(time: &[f32]) -> (f64, f64) {
    if time.is_empty() {
        return (0.0, 0.0);
    }
    let len = time.len() as f64;

    let sum_sq: f64 = time.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    let crossings = time
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();

    ((sum_sq / len).sqrt(), crossings as f64 / len)
}
