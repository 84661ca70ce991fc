use serde::Serialize;

use crate::palette::Rgb;

/// Velocity bound applied when intensity jitters moving shapes.
pub const MAX_VELOCITY: f32 = 1.2;
/// Distance from a canvas edge at which moving shapes bounce.
pub const BOUNCE_MARGIN: f32 = 10.0;
/// Size bounds for moving shapes; sustained high intensity grows them.
pub const SIZE_RANGE: (f32, f32) = (4.0, 80.0);

/// A drifting, glowing shape: circles, triangles and stars.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    /// Animation phase offset, radians.
    pub phase: f32,
    pub glow: f32,
    pub color: Rgb,
}

/// A static pulsing ring.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ring {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub phase: f32,
    /// Stroke width.
    pub width: f32,
    pub color: Rgb,
}

/// A horizontal sine wave spanning the canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Wave {
    /// Baseline.
    pub y: f32,
    pub amplitude: f32,
    /// Spatial frequency, radians per pixel.
    pub freq: f32,
    /// Temporal speed, radians per scene second.
    pub speed: f32,
    pub width: f32,
    pub phase: f32,
    pub color: Rgb,
}

/// One visual entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle(Particle),
    Triangle(Particle),
    Star {
        #[serde(flatten)]
        particle: Particle,
        points: u8,
    },
    Ring(Ring),
    Wave(Wave),
}

impl Shape {
    /// Short name of the variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "circle",
            Shape::Triangle(_) => "triangle",
            Shape::Star { .. } => "star",
            Shape::Ring(_) => "ring",
            Shape::Wave(_) => "wave",
        }
    }

    /// The moving part of the shape, if it moves.
    #[must_use]
    pub fn particle(&self) -> Option<&Particle> {
        match self {
            Shape::Circle(p) | Shape::Triangle(p) | Shape::Star { particle: p, .. } => Some(p),
            Shape::Ring(_) | Shape::Wave(_) => None,
        }
    }

    fn particle_mut(&mut self) -> Option<&mut Particle> {
        match self {
            Shape::Circle(p) | Shape::Triangle(p) | Shape::Star { particle: p, .. } => Some(p),
            Shape::Ring(_) | Shape::Wave(_) => None,
        }
    }

    /// Ease the shape's parameters toward `intensity`.
    ///
    /// `jitter` yields uniform values in [-0.5, 0.5), two per moving shape.
    pub fn tune(&mut self, intensity: f32, jitter: &mut impl FnMut() -> f32) {
        match self {
            Shape::Circle(p) | Shape::Triangle(p) | Shape::Star { particle: p, .. } => {
                let kick = 0.06 * (0.5 + intensity);
                p.vx = (p.vx * 0.9 + jitter() * kick).clamp(-MAX_VELOCITY, MAX_VELOCITY);
                p.vy = (p.vy * 0.9 + jitter() * kick).clamp(-MAX_VELOCITY, MAX_VELOCITY);
                p.glow = p.glow * 0.92 + 18.0 * intensity * 0.08;
                p.size = (p.size * 0.98 + p.size * 0.02 * (0.8 + intensity * 0.6))
                    .clamp(SIZE_RANGE.0, SIZE_RANGE.1);
            }
            Shape::Wave(w) => {
                w.amplitude = w.amplitude * 0.95 + 30.0 * intensity * 0.05;
                w.speed = w.speed * 0.95 + 1.2 * intensity * 0.05;
            }
            Shape::Ring(r) => {
                r.width = r.width * 0.95 + 2.2 * intensity * 0.05;
            }
        }
    }

    /// Integrate velocity and bounce off the edges of a `width` x `height`
    /// canvas. Rings and waves stay in place.
    pub fn advance(&mut self, width: f32, height: f32) {
        if let Some(p) = self.particle_mut() {
            p.x += p.vx;
            p.y += p.vy;
            if p.x < BOUNCE_MARGIN || p.x > width - BOUNCE_MARGIN {
                p.vx = -p.vx;
            }
            if p.y < BOUNCE_MARGIN || p.y > height - BOUNCE_MARGIN {
                p.vy = -p.vy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            size: 20.0,
            phase: 0.0,
            glow: 10.0,
            color: (255, 255, 255),
        }
    }

    #[test]
    fn bounces_off_edges() {
        let mut s = Shape::Circle(particle(10.5, 200.0, -1.0, 0.0));
        s.advance(400.0, 400.0);
        let p = s.particle().unwrap();
        assert!((p.x - 9.5).abs() < 1e-6);
        assert!((p.vx - 1.0).abs() < 1e-6);

        let mut s = Shape::Triangle(particle(200.0, 389.5, 0.0, 1.0));
        s.advance(400.0, 400.0);
        assert!((s.particle().unwrap().vy + 1.0).abs() < 1e-6);
    }

    #[test]
    fn tune_keeps_velocity_bounded() {
        let mut s = Shape::Star {
            particle: particle(100.0, 100.0, 1.2, -1.2),
            points: 5,
        };
        let mut always_max = || 0.5_f32;
        for _ in 0..100 {
            s.tune(1.0, &mut always_max);
        }
        let p = s.particle().unwrap();
        assert!(p.vx <= MAX_VELOCITY && p.vy <= MAX_VELOCITY);
        assert!(p.vy >= -MAX_VELOCITY);
    }

    #[test]
    fn tune_pulls_glow_toward_intensity() {
        let mut s = Shape::Circle(particle(100.0, 100.0, 0.0, 0.0));
        let mut still = || 0.0_f32;
        for _ in 0..200 {
            s.tune(1.0, &mut still);
        }
        // glow -> 18 * intensity
        let p = s.particle().unwrap();
        assert!((p.glow - 18.0).abs() < 0.01);
        assert!(p.size <= SIZE_RANGE.1);
    }

    #[test]
    fn rings_and_waves_do_not_move() {
        let ring = Ring {
            x: 50.0,
            y: 50.0,
            size: 100.0,
            phase: 0.0,
            width: 1.0,
            color: (0, 0, 0),
        };
        let mut s = Shape::Ring(ring.clone());
        s.advance(400.0, 400.0);
        assert_eq!(s, Shape::Ring(ring));
        assert!(s.particle().is_none());

        let mut still = || 0.0_f32;
        s.tune(0.0, &mut still);
        if let Shape::Ring(r) = &s {
            assert!((r.width - 0.95).abs() < 1e-6);
        }
    }
}
