use mw_core::frame::FeatureVector;
use mw_core::mood::Mood;

// Empirical thresholds. Kept exactly as tuned; candidates for tuning, not for
// runtime configuration.

/// Centroid (Hz) mapped to a normalized centroid of 1.0.
pub const CENTROID_NORM_HZ: f64 = 4000.0;

/// Rule 1: loud, bright and busy.
pub const JOYFUL_MIN_ENERGY: f64 = 0.08;
/// Rule 1.
pub const JOYFUL_MIN_CENTROID: f64 = 0.35;
/// Rule 1.
pub const JOYFUL_MIN_FLUX: f64 = 0.6;

/// Rule 2: low-heavy and not too quiet.
pub const BASS_MIN_LOW_RATIO: f64 = 0.55;
/// Rule 2.
pub const BASS_MIN_ENERGY: f64 = 0.06;

/// Rule 3: bright and high-heavy.
pub const TREBLE_MIN_CENTROID: f64 = 0.5;
/// Rule 3.
pub const TREBLE_MIN_HIGH_RATIO: f64 = 0.5;

/// Rule 4: quiet and static.
pub const MELANCHOLIC_MAX_ENERGY: f64 = 0.05;
/// Rule 4.
pub const MELANCHOLIC_MAX_FLUX: f64 = 0.3;

/// Normalized centroid `min(1, centroid / 4000)`.
///
/// # Example
/// ```
/// use mw_audio::classify::centroid_norm;
/// assert!((centroid_norm(2000.0) - 0.5).abs() < 1e-12);
/// assert_eq!(centroid_norm(9000.0), 1.0);
/// ```
#[inline]
#[must_use]
pub fn centroid_norm(centroid: f64) -> f64 {
    (centroid / CENTROID_NORM_HZ).min(1.0)
}

/// Mood transition function.
///
/// Rules are checked in fixed priority, first match wins; when none matches
/// the previous mood is kept. NaN features never match a rule.
///
/// # Example
/// ```
/// use mw_audio::classify::classify;
/// use mw_core::frame::FeatureVector;
/// use mw_core::mood::Mood;
///
/// let f = FeatureVector {
///     energy: 0.12, centroid: 2000.0, zcr: 0.1, flux: 0.7,
///     low_ratio: 0.2, high_ratio: 0.6,
/// };
/// assert_eq!(classify(&f, Mood::Bass), Mood::Joyful);
/// ```
#[must_use]
pub fn classify(features: &FeatureVector, previous: Mood) -> Mood {
    let c_norm = centroid_norm(features.centroid);
    let energy = features.energy;
    let flux = features.flux;

    if energy > JOYFUL_MIN_ENERGY && c_norm > JOYFUL_MIN_CENTROID && flux > JOYFUL_MIN_FLUX {
        Mood::Joyful
    } else if features.low_ratio > BASS_MIN_LOW_RATIO && energy > BASS_MIN_ENERGY {
        Mood::Bass
    } else if c_norm > TREBLE_MIN_CENTROID && features.high_ratio > TREBLE_MIN_HIGH_RATIO {
        Mood::Treble
    } else if energy < MELANCHOLIC_MAX_ENERGY && flux < MELANCHOLIC_MAX_FLUX {
        Mood::Melancholic
    } else {
        previous
    }
}
