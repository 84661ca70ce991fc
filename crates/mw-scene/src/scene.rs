use fastrand::Rng;
use mw_core::mood::Mood;
use mw_core::traits::MoodListener;
use serde::Serialize;

use crate::palette::{palette, to_hex};
use crate::population::spawn;
use crate::shape::Shape;

/// Scene clock increment per tick, in scene seconds.
pub const TIME_STEP: f32 = 0.016;

/// The visual entity population for the current mood.
///
/// Regenerated on every mood change, eased toward the engine's intensity and
/// integrated once per tick. Drawing is the host's business.
///
/// # Example
/// ```
/// use mw_core::mood::Mood;
/// use mw_core::traits::MoodListener;
/// use mw_scene::Scene;
///
/// let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 3);
/// assert_eq!(scene.shapes().len(), 30);
/// scene.on_mood_changed(Mood::Melancholic);
/// assert_eq!(scene.shapes().len(), 25);
/// ```
pub struct Scene {
    mood: Mood,
    shapes: Vec<Shape>,
    width: f32,
    height: f32,
    time: f32,
    generation: u64,
    rng: Rng,
}

/// Compact description of a scene for logs and reports.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneSummary {
    pub mood: Mood,
    pub generation: u64,
    pub entities: usize,
    pub mean_speed: f32,
    pub mean_glow: f32,
    /// Mood palette as `#rrggbb`.
    pub palette: Vec<String>,
}

impl Scene {
    /// Create a scene populated for `mood`, seeded from the OS.
    #[must_use]
    pub fn new(width: f32, height: f32, mood: Mood) -> Self {
        Self::from_rng(width, height, mood, Rng::new())
    }

    /// Create a reproducible scene.
    #[must_use]
    pub fn with_seed(width: f32, height: f32, mood: Mood, seed: u64) -> Self {
        Self::from_rng(width, height, mood, Rng::with_seed(seed))
    }

    fn from_rng(width: f32, height: f32, mood: Mood, mut rng: Rng) -> Self {
        let shapes = spawn(mood, width, height, &mut rng);
        Self {
            mood,
            shapes,
            width,
            height,
            time: 0.0,
            generation: 0,
            rng,
        }
    }

    /// Switch to `mood` and regenerate the population, even if the mood is
    /// unchanged.
    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
        self.shapes = spawn(mood, self.width, self.height, &mut self.rng);
        self.generation += 1;
        log::debug!(
            "Scene regenerated for {mood} ({} entities, generation {})",
            self.shapes.len(),
            self.generation
        );
    }

    /// Change the canvas size. Existing entities are kept and bounce back in.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Ease every entity toward `intensity` [0.0, 1.0].
    pub fn tune(&mut self, intensity: f64) {
        let intensity = intensity.clamp(0.0, 1.0) as f32;
        let rng = &mut self.rng;
        let mut jitter = || rng.f32() - 0.5;
        for shape in &mut self.shapes {
            shape.tune(intensity, &mut jitter);
        }
    }

    /// Move entities one tick forward and advance the scene clock.
    pub fn advance(&mut self) {
        self.time += TIME_STEP;
        for shape in &mut self.shapes {
            shape.advance(self.width, self.height);
        }
    }

    #[must_use]
    pub fn mood(&self) -> Mood {
        self.mood
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Scene clock, in scene seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of regenerations since creation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Summary of the current population.
    #[must_use]
    pub fn summary(&self) -> SceneSummary {
        let (count, speed, glow) = self
            .shapes
            .iter()
            .filter_map(Shape::particle)
            .fold((0usize, 0.0f32, 0.0f32), |(n, s, g), p| {
                (n + 1, s + p.vx.hypot(p.vy), g + p.glow)
            });
        let div = count.max(1) as f32;
        SceneSummary {
            mood: self.mood,
            generation: self.generation,
            entities: self.shapes.len(),
            mean_speed: speed / div,
            mean_glow: glow / div,
            palette: palette(self.mood).iter().map(|&c| to_hex(c)).collect(),
        }
    }
}

impl MoodListener for Scene {
    fn on_mood_changed(&mut self, mood: Mood) {
        self.set_mood(mood);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::MAX_VELOCITY;

    #[test]
    fn mood_change_regenerates_population() {
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Bass, 1);
        assert_eq!(scene.generation(), 0);
        scene.on_mood_changed(Mood::Treble);
        assert_eq!(scene.mood(), Mood::Treble);
        assert_eq!(scene.generation(), 1);
        assert_eq!(scene.shapes().len(), 28);
        assert!(scene.shapes().iter().all(|s| matches!(
            s,
            Shape::Star { .. } | Shape::Triangle(_)
        )));
    }

    #[test]
    fn reselecting_same_mood_still_regenerates() {
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Joyful, 5);
        let before = scene.shapes().to_vec();
        scene.set_mood(Mood::Joyful);
        assert_ne!(scene.shapes(), before.as_slice());
        assert_eq!(scene.generation(), 1);
    }

    #[test]
    fn entities_stay_near_the_canvas() {
        let mut scene = Scene::with_seed(300.0, 200.0, Mood::Joyful, 11);
        for _ in 0..2000 {
            scene.tune(1.0);
            scene.advance();
        }
        for p in scene.shapes().iter().filter_map(Shape::particle) {
            assert!(p.vx.abs() <= MAX_VELOCITY && p.vy.abs() <= MAX_VELOCITY);
            assert!(p.x > -20.0 && p.x < 320.0, "{p:?}");
            assert!(p.y > -20.0 && p.y < 220.0, "{p:?}");
        }
        assert!((scene.time() - 2000.0 * TIME_STEP).abs() < 0.01);
    }

    #[test]
    fn intensity_raises_glow() {
        let mut calm = Scene::with_seed(960.0, 540.0, Mood::Bass, 2);
        let mut loud = Scene::with_seed(960.0, 540.0, Mood::Bass, 2);
        for _ in 0..100 {
            calm.tune(0.0);
            loud.tune(1.0);
        }
        assert!(loud.summary().mean_glow > calm.summary().mean_glow);
        assert!(calm.summary().mean_glow < 1.0);
    }

    #[test]
    fn resize_keeps_entities() {
        let mut scene = Scene::with_seed(960.0, 540.0, Mood::Treble, 6);
        let before = scene.shapes().to_vec();
        scene.resize(480.0, 270.0);
        assert_eq!(scene.size(), (480.0, 270.0));
        assert_eq!(scene.shapes(), before.as_slice());
        assert_eq!(scene.generation(), 0);
    }

    #[test]
    fn summary_counts_entities() {
        let scene = Scene::with_seed(960.0, 540.0, Mood::Melancholic, 4);
        let summary = scene.summary();
        assert_eq!(summary.entities, 25);
        assert_eq!(summary.mood, Mood::Melancholic);
        assert_eq!(summary.palette.len(), 4);
        assert_eq!(summary.palette[2], "#cfe9f9");
    }
}
