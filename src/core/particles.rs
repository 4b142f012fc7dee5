use super::constants::*;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// One slot of the ambient particle pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub size: f32,
    /// Per-frame delta; `y` is always negative so particles rise.
    pub velocity: Vec2,
    pub opacity: f32,
    pub drift: f32,
    pub drift_speed: f32,
}

/// Anything that can clear itself and fill discs. The canvas implementation lives in
/// the web front-end; tests record calls.
pub trait DiscSurface {
    fn clear(&mut self, width: f32, height: f32);
    fn fill_disc(&mut self, center: Vec2, radius: f32, rgb: [u8; 3], alpha: f32);
}

/// Fixed-size pool of slowly rising particles.
///
/// Slots are recycled in place when a particle leaves through the top, so the
/// population never changes and `step` never allocates.
pub struct ParticleField<R: Rng> {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    rng: R,
}

impl<R: Rng> ParticleField<R> {
    pub fn new(width: f32, height: f32, count: usize, mut rng: R) -> Self {
        let particles = (0..count)
            .map(|_| {
                let y = rng.gen::<f32>() * height;
                spawn(&mut rng, width, y)
            })
            .collect();
        Self {
            particles,
            width,
            height,
            rng,
        }
    }

    /// Update surface bounds. Existing particles keep their coordinates and fall
    /// back into range as they recycle.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Advance every particle by one frame. Returns how many slots were recycled.
    pub fn step(&mut self) -> usize {
        let mut recycled = 0;
        let right = self.width + PARTICLE_MARGIN;
        for p in self.particles.iter_mut() {
            p.drift += p.drift_speed;
            p.position.x += p.velocity.x + p.drift.sin() * DRIFT_AMPLITUDE;
            p.position.y += p.velocity.y;

            if p.position.y < -PARTICLE_MARGIN {
                *p = spawn(&mut self.rng, self.width, self.height + PARTICLE_MARGIN);
                recycled += 1;
                continue;
            }

            if p.position.x < -PARTICLE_MARGIN {
                p.position.x = right;
            } else if p.position.x > right {
                p.position.x = -PARTICLE_MARGIN;
            }
        }
        recycled
    }

    pub fn render<S: DiscSurface>(&self, surface: &mut S) {
        surface.clear(self.width, self.height);
        for p in &self.particles {
            surface.fill_disc(p.position, p.size, PARTICLE_RGB, p.opacity);
        }
    }
}

fn spawn<R: Rng>(rng: &mut R, width: f32, y: f32) -> Particle {
    Particle {
        position: Vec2::new(rng.gen::<f32>() * width, y),
        size: PARTICLE_SIZE_MIN + rng.gen::<f32>() * PARTICLE_SIZE_SPAN,
        velocity: Vec2::new(
            (rng.gen::<f32>() - 0.5) * LATERAL_SPEED_SPAN,
            -(RISE_SPEED_MIN + rng.gen::<f32>() * RISE_SPEED_SPAN),
        ),
        opacity: OPACITY_MIN + rng.gen::<f32>() * OPACITY_SPAN,
        drift: rng.gen::<f32>() * TAU,
        drift_speed: DRIFT_SPEED_MIN + rng.gen::<f32>() * DRIFT_SPEED_SPAN,
    }
}
