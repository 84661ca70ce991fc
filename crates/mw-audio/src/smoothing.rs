use mw_core::frame::FeatureVector;

/// Weight kept from the running flux average each tick.
pub const FLUX_DECAY: f64 = 0.92;
/// Weight of the current frame's flux in the running average.
pub const FLUX_GAIN: f64 = 0.08;
/// Weight of the energy term in the intensity.
pub const ENERGY_WEIGHT: f64 = 2.0;
/// Weight of the averaged flux term in the intensity.
pub const FLUX_WEIGHT: f64 = 0.4;
/// Intensity reported before any audio has been seen.
pub const RESTING_INTENSITY: f64 = 0.5;

/// Exponential moving average of spectral flux, folded with energy into a
/// single intensity in [0.0, 1.0].
///
/// Runs every tick, independently of the classification cadence.
///
/// # Example
/// ```
/// use mw_audio::smoothing::IntensitySmoother;
/// use mw_core::frame::FeatureVector;
///
/// let mut smoother = IntensitySmoother::new();
/// assert_eq!(smoother.intensity(), 0.5);
/// let f = FeatureVector { energy: 0.1, flux: 1.0, ..Default::default() };
/// let i = smoother.update(&f);
/// assert!((i - (0.2 + 0.08 * 0.4)).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct IntensitySmoother {
    flux_avg: f64,
    intensity: f64,
}

impl IntensitySmoother {
    /// Create a smoother at rest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flux_avg: 0.0,
            intensity: RESTING_INTENSITY,
        }
    }

    /// Fold one frame of features in and return the new intensity.
    pub fn update(&mut self, features: &FeatureVector) -> f64 {
        self.flux_avg = self.flux_avg * FLUX_DECAY + features.flux * FLUX_GAIN;
        self.intensity =
            (features.energy * ENERGY_WEIGHT + self.flux_avg * FLUX_WEIGHT).clamp(0.0, 1.0);
        self.intensity
    }

    /// Latest intensity.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Running flux average.
    #[must_use]
    pub fn flux_avg(&self) -> f64 {
        self.flux_avg
    }

    /// Return to the resting state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for IntensitySmoother {
    fn default() -> Self {
        Self::new()
    }
}
