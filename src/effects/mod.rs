//! Real-time visual-effects engine.
//!
//! Per frame, in fixed order: classify the gesture, push wrist samples
//! into the trails (spawning particle bursts on fast motion), advance the
//! particle set, then composite tint, trails and particles onto the frame.
//! Only motion history and particle state survive across frames; frame
//! pixels never do.

pub mod compositor;
pub mod frame;
pub mod gesture;
pub mod particles;
pub mod trail;

pub use frame::{Color, Frame};
pub use gesture::GestureState;
pub use particles::{Particle, ParticleSystem};
pub use trail::{MotionBurst, Point2, Trail, TrailStore};

use crate::pose::{Landmark, LANDMARK_COUNT, LEFT_WRIST, RIGHT_WRIST};

/// Engine constants, fixed at construction.
#[derive(Clone, Copy, Debug)]
pub struct EffectsConfig {
    /// Samples kept per hand trail.
    pub trail_capacity: usize,
    /// Minimum per-frame wrist travel (px) that spawns a burst.
    pub motion_threshold: f32,
    /// Particles per burst.
    pub burst_count: usize,
    /// Velocity components are drawn uniformly from [-range, range].
    pub velocity_range: f32,
    /// Particle life is drawn uniformly from this inclusive tick range.
    pub life_range: (i32, i32),
    /// Particle disc radius in pixels.
    pub particle_radius: i32,
    /// Blend factor of the full-frame color wash.
    pub tint_alpha: f32,
    pub left_color: Color,
    pub right_color: Color,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            trail_capacity: 30,
            motion_threshold: 5.0,
            burst_count: 5,
            velocity_range: 5.0,
            life_range: (10, 30),
            particle_radius: 3,
            tint_alpha: 0.4,
            left_color: Color::MAGENTA,
            right_color: Color::CYAN,
        }
    }
}

pub struct VisualEffects {
    trails: TrailStore,
    particles: ParticleSystem,
    particle_radius: i32,
    tint_alpha: f32,
}

impl VisualEffects {
    pub fn new(config: EffectsConfig) -> Self {
        let particles =
            ParticleSystem::new(config.burst_count, config.velocity_range, config.life_range);
        Self::assemble(config, particles)
    }

    /// Deterministic variant for tests.
    pub fn with_seed(config: EffectsConfig, seed: u64) -> Self {
        let particles = ParticleSystem::with_seed(
            config.burst_count,
            config.velocity_range,
            config.life_range,
            seed,
        );
        Self::assemble(config, particles)
    }

    fn assemble(config: EffectsConfig, particles: ParticleSystem) -> Self {
        Self {
            trails: TrailStore::new(
                config.trail_capacity,
                config.motion_threshold,
                config.left_color,
                config.right_color,
            ),
            particles,
            particle_radius: config.particle_radius,
            tint_alpha: config.tint_alpha,
        }
    }

    /// Process one frame: update all effect state exactly once, then draw
    /// onto `frame`. Returns the gesture state for the caller's logging.
    pub fn apply(&mut self, frame: &mut Frame, landmarks: &[Landmark]) -> GestureState {
        let state = gesture::classify(landmarks);

        let left = wrist_point(landmarks, LEFT_WRIST);
        let right = wrist_point(landmarks, RIGHT_WRIST);
        for burst in self.trails.update(left, right).into_iter().flatten() {
            self.particles.spawn_burst(burst.pos, burst.color);
        }
        self.particles.advance();

        // Tint first so trails and particles stay on top of the wash.
        compositor::apply_tint(frame, state, self.tint_alpha);
        compositor::draw_trail(frame, self.trails.left(), self.trails.left_color());
        compositor::draw_trail(frame, self.trails.right(), self.trails.right_color());
        compositor::draw_particles(frame, self.particles.particles(), self.particle_radius);

        state
    }

    pub fn trails(&self) -> &TrailStore {
        &self.trails
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }
}

/// Wrist sample for the trails; an incomplete skeleton reads as absent.
fn wrist_point(landmarks: &[Landmark], index: usize) -> Option<Point2> {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }
    let lm = landmarks[index];
    Some(Point2::new(lm.x, lm.y))
}
