//! Ephemeral motion-burst particles.
//!
//! Bursts spawn a handful of particles that drift on a fixed per-tick
//! velocity and die when their life counter runs out. There is no upper
//! bound on the active set beyond natural attrition; sustained bursts cost
//! at most bursts x count spawns (and as many retirements) per frame.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::frame::Color;
use super::trail::Point2;

/// One active particle. Owned exclusively by the [`ParticleSystem`].
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub pos: Point2,
    pub vel: Point2,
    pub life: i32,
    pub color: Color,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: StdRng,
    burst_count: usize,
    velocity_range: f32,
    life_range: (i32, i32),
}

impl ParticleSystem {
    pub fn new(burst_count: usize, velocity_range: f32, life_range: (i32, i32)) -> Self {
        Self::from_rng(
            burst_count,
            velocity_range,
            life_range,
            StdRng::from_os_rng(),
        )
    }

    /// Deterministic variant for tests: same seed, same spawn draws.
    pub fn with_seed(
        burst_count: usize,
        velocity_range: f32,
        life_range: (i32, i32),
        seed: u64,
    ) -> Self {
        Self::from_rng(
            burst_count,
            velocity_range,
            life_range,
            StdRng::seed_from_u64(seed),
        )
    }

    fn from_rng(
        burst_count: usize,
        velocity_range: f32,
        life_range: (i32, i32),
        rng: StdRng,
    ) -> Self {
        Self {
            particles: Vec::new(),
            rng,
            burst_count,
            velocity_range,
            life_range,
        }
    }

    /// Spawn one burst of particles at `pos`, all tagged `color`.
    pub fn spawn_burst(&mut self, pos: Point2, color: Color) {
        let v = self.velocity_range;
        let (life_min, life_max) = self.life_range;
        for _ in 0..self.burst_count {
            self.particles.push(Particle {
                pos,
                vel: Point2::new(
                    self.rng.random_range(-v..=v),
                    self.rng.random_range(-v..=v),
                ),
                life: self.rng.random_range(life_min..=life_max),
                color,
            });
        }
    }

    /// One Euler step (unit dt) for every particle, then retire the dead.
    ///
    /// Retirement uses swap-remove; particles have no interactions, so
    /// order does not matter.
    pub fn advance(&mut self) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.pos.x += p.vel.x;
            p.pos.y += p.vel.y;
            p.life -= 1;
            if p.life <= 0 {
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(seed: u64) -> ParticleSystem {
        ParticleSystem::with_seed(5, 5.0, (10, 30), seed)
    }

    #[test]
    fn test_burst_count_and_color() {
        let mut ps = system(1);
        ps.spawn_burst(Point2::new(10.0, 20.0), Color::MAGENTA);
        assert_eq!(ps.len(), 5);
        for p in ps.particles() {
            assert_eq!(p.pos, Point2::new(10.0, 20.0));
            assert_eq!(p.color, Color::MAGENTA);
            assert!(p.vel.x >= -5.0 && p.vel.x <= 5.0);
            assert!(p.vel.y >= -5.0 && p.vel.y <= 5.0);
            assert!(p.life >= 10 && p.life <= 30);
        }
    }

    #[test]
    fn test_seeded_spawns_are_deterministic() {
        let mut a = system(42);
        let mut b = system(42);
        a.spawn_burst(Point2::new(0.0, 0.0), Color::CYAN);
        b.spawn_burst(Point2::new(0.0, 0.0), Color::CYAN);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.vel, pb.vel);
            assert_eq!(pa.life, pb.life);
        }
    }

    #[test]
    fn test_position_integrates_velocity() {
        let mut ps = system(7);
        ps.spawn_burst(Point2::new(100.0, 100.0), Color::CYAN);
        let start: Vec<Particle> = ps.particles().to_vec();

        let ticks = 4;
        for _ in 0..ticks {
            ps.advance();
        }

        // No particle dies within 4 ticks (minimum life is 10), and each
        // position is exactly start + t * velocity up to float rounding.
        assert_eq!(ps.len(), start.len());
        for p in ps.particles() {
            let origin = start
                .iter()
                .find(|s| s.vel == p.vel)
                .expect("velocity identifies the particle");
            let expected_x = origin.pos.x + ticks as f32 * p.vel.x;
            let expected_y = origin.pos.y + ticks as f32 * p.vel.y;
            assert!((p.pos.x - expected_x).abs() < 1e-3);
            assert!((p.pos.y - expected_y).abs() < 1e-3);
            assert_eq!(p.life, origin.life - ticks);
        }
    }

    #[test]
    fn test_particles_expire_after_life_ticks() {
        let mut ps = system(3);
        ps.spawn_burst(Point2::new(0.0, 0.0), Color::MAGENTA);
        let max_life = ps.particles().iter().map(|p| p.life).max().unwrap();

        for tick in 1..=max_life {
            ps.advance();
            // Nothing with remaining life survives past its counter.
            assert!(ps.particles().iter().all(|p| p.life > 0));
            if tick < max_life {
                assert!(!ps.is_empty() || tick >= 10);
            }
        }
        assert!(ps.is_empty());
    }

    #[test]
    fn test_advance_on_empty_set_is_noop() {
        let mut ps = system(9);
        ps.advance();
        assert!(ps.is_empty());
    }
}
