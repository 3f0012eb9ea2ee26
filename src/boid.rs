/*
 * Boid Module
 *
 * This module defines the Boid struct and its motion model.
 * A boid is either flying freely or stunned after crashing into an obstacle:
 * 1. Free: steer toward the desired force, keep speed inside the configured
 *    band and wobble the heading slightly every tick
 * 2. Stunned: brake hard for the first half of the stun, then accelerate
 *    back toward the desired force while the speed cap ramps up to normal
 *
 * The simulation decides when a boid is stunned and what its desired force
 * is; the boid only integrates its own motion and wraps around the arena.
 */

use rand::Rng;
use tracing::trace;

use crate::error::FlockError;
use crate::params::SimulationParams;
use crate::vector::Vector2D;

// Stun length in tick units
pub const STUN_DURATION: f32 = 100.0;
// Per-tick velocity factor while braking
pub const STUN_DECAY: f32 = 0.9;
// Braking never slows a stunned boid below this speed
pub const STUN_MIN_SPEED: f32 = 0.1;
// The stun ends once the timer drops to this value
const STUN_RELEASE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    Free,
    Stunned { timer: f32 },
}

#[derive(Debug, Clone)]
pub struct Boid {
    position: Vector2D,
    velocity: Vector2D,
    desired_force: Vector2D,
    state: MotionState,
}

impl Boid {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Self {
            position,
            velocity,
            desired_force: Vector2D::ZERO,
            state: MotionState::Free,
        }
    }

    // Spawn at (x, y) with a random heading and a random speed inside the band
    pub fn spawn<R: Rng + ?Sized>(
        x: f32,
        y: f32,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<Self, FlockError> {
        let position = Vector2D::new(x, y)?;
        let speed = params.min_speed + rng.gen::<f32>() * (params.max_speed - params.min_speed);
        let velocity = Vector2D::random(rng, speed)?;
        Ok(Self::new(position, velocity))
    }

    pub fn position(&self) -> Vector2D {
        self.position
    }

    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    pub fn desired_force(&self) -> Vector2D {
        self.desired_force
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vector2D) {
        self.velocity = velocity;
    }

    pub fn set_desired_force(&mut self, force: Vector2D) {
        self.desired_force = force;
    }

    // Heading angle in radians; a motionless boid faces +x
    pub fn heading(&self) -> f32 {
        self.velocity.angle()
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.state, MotionState::Stunned { .. })
    }

    pub fn stun_timer(&self) -> Option<f32> {
        match self.state {
            MotionState::Stunned { timer } => Some(timer),
            MotionState::Free => None,
        }
    }

    // Elapsed fraction of the current stun, 0 while free
    pub fn stun_progress(&self) -> f32 {
        match self.state {
            MotionState::Stunned { timer } => (1.0 - timer / STUN_DURATION).clamp(0.0, 1.0),
            MotionState::Free => 0.0,
        }
    }

    /// How far the boid has recovered: 0 while braking, then rising linearly
    /// to 1 over the second half of the stun. Free boids are fully recovered.
    pub fn recovery_progress(&self) -> f32 {
        let half = STUN_DURATION / 2.0;
        match self.state {
            MotionState::Stunned { timer } if timer > half => 0.0,
            MotionState::Stunned { timer } => (1.0 - timer / half).clamp(0.0, 1.0),
            MotionState::Free => 1.0,
        }
    }

    // Current maximum speed
    pub fn speed_cap(&self, params: &SimulationParams) -> f32 {
        params.max_speed * self.recovery_progress()
    }

    /// Knock the boid out after it was found inside an obstacle.
    ///
    /// `contact` is the nearest boundary point; the boid is snapped onto it
    /// and its velocity mirrored across the direction toward it.
    pub fn stun(&mut self, contact: Vector2D) -> Result<(), FlockError> {
        let normal = (contact - self.position).normalized();
        if !normal.is_zero() {
            self.velocity.reflect(normal)?;
        }
        self.position = contact;
        self.state = MotionState::Stunned {
            timer: STUN_DURATION,
        };
        trace!(x = contact.x(), y = contact.y(), "boid stunned");
        Ok(())
    }

    // Advance one tick of `delta` time units
    pub fn integrate<R: Rng + ?Sized>(
        &mut self,
        delta: f32,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<(), FlockError> {
        match self.state {
            MotionState::Free => self.integrate_free(delta, params, rng),
            MotionState::Stunned { timer } => self.integrate_stunned(timer, delta, params),
        }
    }

    fn integrate_free<R: Rng + ?Sized>(
        &mut self,
        delta: f32,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<(), FlockError> {
        let jitter = params.heading_jitter_degrees;
        if jitter > 0.0 {
            let degrees = rng.gen_range(-jitter..=jitter);
            self.velocity.rotate(degrees.to_radians())?;
        }

        self.velocity
            .scaled_add(self.desired_force, delta)?
            .clamp_min(params.min_speed)?
            .clamp_max(params.max_speed)?;

        self.position.scaled_add(self.velocity, delta)?;
        self.wrap(params.arena_width, params.arena_height);
        Ok(())
    }

    fn integrate_stunned(
        &mut self,
        timer: f32,
        delta: f32,
        params: &SimulationParams,
    ) -> Result<(), FlockError> {
        let timer = timer - delta;
        if timer <= STUN_RELEASE {
            self.state = MotionState::Free;
            trace!("boid recovered");
            return Ok(());
        }
        self.state = MotionState::Stunned { timer };

        let half = STUN_DURATION / 2.0;
        if timer > half {
            self.velocity.scale_by(STUN_DECAY)?.clamp_min(STUN_MIN_SPEED)?;
        } else {
            self.velocity
                .scaled_add(self.desired_force, delta)?
                .clamp_max(params.max_speed * (1.0 - timer / half))?;
        }

        self.position.scaled_add(self.velocity, delta)?;
        self.wrap(params.arena_width, params.arena_height);
        Ok(())
    }

    // Teleport to the opposite edge when leaving [0, width] x [0, height]
    pub fn wrap(&mut self, width: f32, height: f32) {
        let (mut x, mut y) = (self.position.x(), self.position.y());

        if x < 0.0 {
            x = width;
        }
        if x > width {
            x = 0.0;
        }
        if y < 0.0 {
            y = height;
        }
        if y > height {
            y = 0.0;
        }

        if x != self.position.x() || y != self.position.y() {
            if let Ok(wrapped) = Vector2D::new(x, y) {
                self.position = wrapped;
            }
        }
    }
}
