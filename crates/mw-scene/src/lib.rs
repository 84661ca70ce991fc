/// Visual entity populations driven by the mood engine.
///
/// Regenerates a population when the mood changes, modulates it with the
/// smoothed intensity every tick, and cycles moods on a timer when idle.
/// Drawing is left to the host.

pub mod cycle;
pub mod palette;
pub mod population;
pub mod scene;
pub mod shape;

pub use cycle::MoodCycler;
pub use scene::Scene;
pub use shape::Shape;
