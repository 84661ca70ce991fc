use std::f32::consts::TAU;

use fastrand::Rng;
use mw_core::mood::Mood;

use crate::palette::{Rgb, palette};
use crate::shape::{Particle, Ring, Shape, Wave};

/// Uniform draw in [lo, hi).
fn rnd(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

fn pick(rng: &mut Rng, colors: &[Rgb; 4]) -> Rgb {
    colors[rng.usize(..colors.len())]
}

/// Parameter ranges for one batch of drifting shapes.
struct Drift {
    margin: f32,
    vx: f32,
    vy: f32,
    size: (f32, f32),
    glow: (f32, f32),
}

impl Drift {
    fn spawn(&self, rng: &mut Rng, width: f32, height: f32, colors: &[Rgb; 4]) -> Particle {
        Particle {
            x: rnd(rng, self.margin, width - self.margin),
            y: rnd(rng, self.margin, height - self.margin),
            vx: rnd(rng, -self.vx, self.vx),
            vy: rnd(rng, -self.vy, self.vy),
            size: rnd(rng, self.size.0, self.size.1),
            phase: rnd(rng, 0.0, TAU),
            color: pick(rng, colors),
            glow: rnd(rng, self.glow.0, self.glow.1),
        }
    }
}

/// Generate the entity population for `mood` on a `width` x `height` canvas.
///
/// # Example
/// ```
/// use mw_core::mood::Mood;
/// use mw_scene::population::spawn;
///
/// let mut rng = fastrand::Rng::with_seed(7);
/// let shapes = spawn(Mood::Joyful, 960.0, 540.0, &mut rng);
/// assert_eq!(shapes.len(), 36);
/// ```
#[must_use]
pub fn spawn(mood: Mood, width: f32, height: f32, rng: &mut Rng) -> Vec<Shape> {
    let colors = palette(mood);
    let mut shapes = Vec::with_capacity(40);

    match mood {
        Mood::Bass => {
            let circles = Drift {
                margin: 40.0,
                vx: 0.4,
                vy: 0.3,
                size: (18.0, 42.0),
                glow: (6.0, 18.0),
            };
            for _ in 0..26 {
                shapes.push(Shape::Circle(circles.spawn(rng, width, height, colors)));
            }
            for _ in 0..4 {
                shapes.push(Shape::Ring(Ring {
                    x: width * rnd(rng, 0.15, 0.85),
                    y: height * rnd(rng, 0.2, 0.8),
                    size: rnd(rng, 80.0, 160.0),
                    phase: rnd(rng, 0.0, TAU),
                    color: pick(rng, colors),
                    width: rnd(rng, 1.0, 2.0),
                }));
            }
        }
        Mood::Treble => {
            let stars = Drift {
                margin: 40.0,
                vx: 0.6,
                vy: 0.6,
                size: (16.0, 34.0),
                glow: (8.0, 16.0),
            };
            for _ in 0..20 {
                let particle = stars.spawn(rng, width, height, colors);
                shapes.push(Shape::Star {
                    particle,
                    points: rng.u8(5..8),
                });
            }
            let triangles = Drift {
                margin: 20.0,
                vx: 0.8,
                vy: 0.8,
                size: (14.0, 26.0),
                glow: (6.0, 14.0),
            };
            for _ in 0..8 {
                shapes.push(Shape::Triangle(triangles.spawn(rng, width, height, colors)));
            }
        }
        Mood::Joyful => {
            let confetti = Drift {
                margin: 30.0,
                vx: 1.1,
                vy: 1.1,
                size: (10.0, 22.0),
                glow: (6.0, 18.0),
            };
            for _ in 0..36 {
                let is_circle = rng.f32() < 0.6;
                let particle = confetti.spawn(rng, width, height, colors);
                shapes.push(if is_circle {
                    Shape::Circle(particle)
                } else {
                    Shape::Triangle(particle)
                });
            }
        }
        Mood::Melancholic => {
            for _ in 0..3 {
                shapes.push(Shape::Wave(Wave {
                    y: height * rnd(rng, 0.25, 0.75),
                    amplitude: rnd(rng, 18.0, 30.0),
                    freq: rnd(rng, 0.008, 0.012),
                    speed: rnd(rng, 0.6, 0.9),
                    color: pick(rng, colors),
                    width: rnd(rng, 1.25, 2.25),
                    phase: rnd(rng, 0.0, TAU),
                }));
            }
            let motes = Drift {
                margin: 40.0,
                vx: 0.35,
                vy: 0.35,
                size: (8.0, 20.0),
                glow: (5.0, 12.0),
            };
            for _ in 0..22 {
                shapes.push(Shape::Circle(motes.spawn(rng, width, height, colors)));
            }
        }
    }

    shapes
}
