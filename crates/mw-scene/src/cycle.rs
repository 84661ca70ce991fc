use std::time::Duration;

use fastrand::Rng;
use mw_core::mood::Mood;

/// Default time between idle mood picks.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(15);

/// Picks a random mood at a fixed period while no audio drives the scene.
///
/// Driven by tick deltas rather than a wall clock so it can be stepped in
/// tests and paused with the host loop.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use mw_scene::MoodCycler;
///
/// let mut cycler = MoodCycler::with_seed(Duration::from_secs(15), 1);
/// assert!(cycler.advance(Duration::from_secs(14)).is_none());
/// assert!(cycler.advance(Duration::from_secs(1)).is_some());
/// ```
pub struct MoodCycler {
    period: Duration,
    elapsed: Duration,
    rng: Rng,
}

impl MoodCycler {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self::from_rng(period, Rng::new())
    }

    #[must_use]
    pub fn with_seed(period: Duration, seed: u64) -> Self {
        Self::from_rng(period, Rng::with_seed(seed))
    }

    fn from_rng(period: Duration, rng: Rng) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            rng,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Change the period. Time already elapsed counts toward the new one.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period.max(Duration::from_millis(1));
    }

    /// Uniform pick over all four moods. May repeat the current one.
    pub fn pick_random(&mut self) -> Mood {
        Mood::ALL[self.rng.usize(..Mood::ALL.len())]
    }

    /// Step the cycler by `dt`; returns a mood when a period boundary is
    /// crossed. At most one pick per call.
    pub fn advance(&mut self, dt: Duration) -> Option<Mood> {
        self.elapsed += dt;
        if self.elapsed < self.period {
            return None;
        }
        self.elapsed -= self.period;
        // a stalled host loop must not queue up a burst of picks
        if self.elapsed >= self.period {
            self.elapsed = Duration::ZERO;
        }
        Some(self.pick_random())
    }

    /// Restart the current period.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

impl Default for MoodCycler {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}
