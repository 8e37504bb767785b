//! Movement strategies sharing one estimate contract.
//!
//! Every strategy exposes speed, throttle, a unit direction, a velocity, and
//! pure position/velocity estimates that follow the exact integration rule
//! the live update uses. Behaviour differences live in the [`Motion`]
//! variants rather than in an inheritance chain.

use glam::Vec2;
use lane_defence_core::Seconds;

use crate::path::{Path, PathCursor};

/// Result of one physics integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionOutcome {
    /// Set exactly once, on the step in which a path cursor became terminal.
    pub reached_end: bool,
}

/// Straight-line movement with a freely assignable direction.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearMotion {
    speed: f32,
    throttle: f32,
    direction: Vec2,
}

impl LinearMotion {
    /// Creates a linear mover with the provided speed and unit direction.
    #[must_use]
    pub const fn new(speed: f32, direction: Vec2) -> Self {
        Self {
            speed,
            throttle: 0.0,
            direction,
        }
    }
}

/// Movement that advances a cursor along an immutable path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMotion {
    speed: f32,
    throttle: f32,
    path: Path,
    cursor: PathCursor,
    end_reported: bool,
}

impl PathMotion {
    /// Creates a path follower starting at the provided origin.
    #[must_use]
    pub fn new(path: Path, origin: Vec2, speed: f32) -> Self {
        Self {
            speed,
            throttle: 0.0,
            path,
            cursor: PathCursor::new(origin),
            end_reported: false,
        }
    }

    /// Remaining arc length between the cursor and the path end.
    #[must_use]
    pub fn distance_to_destination(&self) -> f32 {
        (self.path.total_length() - self.cursor.distance_moved()).max(0.0)
    }
}

/// Semi-implicit Euler motion for lobbed projectiles and slingshots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallisticMotion {
    velocity: Vec2,
    acceleration: Vec2,
}

impl BallisticMotion {
    /// Creates a ballistic mover with an initial velocity and a constant
    /// acceleration.
    #[must_use]
    pub const fn new(velocity: Vec2, acceleration: Vec2) -> Self {
        Self {
            velocity,
            acceleration,
        }
    }

    /// Adds the provided velocity to the current one.
    pub fn apply_impulse(&mut self, velocity: Vec2) {
        self.velocity += velocity;
    }
}

/// Movement strategy attached to an entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// Straight-line movement with assignable direction.
    Linear(LinearMotion),
    /// Path-following movement with a derived direction.
    AlongPath(PathMotion),
    /// Accelerated movement with speed and direction derived from velocity.
    Ballistic(BallisticMotion),
}

impl Motion {
    /// Normal movement speed in units per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        match self {
            Motion::Linear(motion) => motion.speed,
            Motion::AlongPath(motion) => motion.speed,
            Motion::Ballistic(motion) => motion.velocity.length(),
        }
    }

    /// Sets the movement speed.
    ///
    /// For ballistic motion this rescales the velocity to the new magnitude.
    pub fn set_speed(&mut self, speed: f32) {
        match self {
            Motion::Linear(motion) => motion.speed = speed,
            Motion::AlongPath(motion) => motion.speed = speed,
            Motion::Ballistic(motion) => {
                motion.velocity = motion.velocity.normalize_or_zero() * speed;
            }
        }
    }

    /// Speed reduction in units per second; always non-negative.
    #[must_use]
    pub fn throttle(&self) -> f32 {
        match self {
            Motion::Linear(motion) => motion.throttle,
            Motion::AlongPath(motion) => motion.throttle,
            Motion::Ballistic(_) => 0.0,
        }
    }

    /// Sets the speed reduction; negative values clamp to zero and ballistic
    /// motion ignores throttling entirely.
    pub fn set_throttle(&mut self, throttle: f32) {
        let throttle = throttle.max(0.0);
        match self {
            Motion::Linear(motion) => motion.throttle = throttle,
            Motion::AlongPath(motion) => motion.throttle = throttle,
            Motion::Ballistic(_) => {}
        }
    }

    /// Actual speed after throttling, floored at zero.
    #[must_use]
    pub fn current_speed(&self) -> f32 {
        (self.speed() - self.throttle()).max(0.0)
    }

    /// Unit direction of the movement.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        match self {
            Motion::Linear(motion) => motion.direction,
            Motion::AlongPath(motion) => motion.cursor.direction(),
            Motion::Ballistic(motion) => motion.velocity.normalize_or_zero(),
        }
    }

    /// Sets the movement direction.
    ///
    /// Path-following direction is derived from the cursor tangent, so the
    /// assignment is ignored there; ballistic motion redirects its velocity
    /// at the current magnitude.
    pub fn set_direction(&mut self, direction: Vec2) {
        match self {
            Motion::Linear(motion) => motion.direction = direction,
            Motion::AlongPath(_) => {}
            Motion::Ballistic(motion) => {
                let speed = motion.velocity.length();
                motion.velocity = direction * speed;
            }
        }
    }

    /// Movement velocity in units per second.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        match self {
            Motion::Linear(_) | Motion::AlongPath(_) => self.direction() * self.current_speed(),
            Motion::Ballistic(motion) => motion.velocity,
        }
    }

    /// Remaining arc length to the path destination; zero for free movers.
    #[must_use]
    pub fn distance_to_destination(&self) -> f32 {
        match self {
            Motion::AlongPath(motion) => motion.distance_to_destination(),
            Motion::Linear(_) | Motion::Ballistic(_) => 0.0,
        }
    }

    /// Estimated velocity after the provided horizon, without mutation.
    #[must_use]
    pub fn estimated_velocity(&self, after: Seconds) -> Vec2 {
        match self {
            Motion::Linear(_) | Motion::AlongPath(_) => self.velocity(),
            Motion::Ballistic(motion) => motion.velocity + motion.acceleration * after,
        }
    }

    /// Estimated position after the provided horizon, without mutation.
    ///
    /// Follows the same integration rule [`Motion::integrate`] applies to
    /// the live state, evaluated from the provided origin.
    #[must_use]
    pub fn estimated_position(&self, origin: Vec2, after: Seconds) -> Vec2 {
        match self {
            Motion::Linear(_) => origin + self.velocity() * after,
            Motion::AlongPath(motion) => {
                let ahead = motion
                    .cursor
                    .advanced(&motion.path, self.current_speed() * after);
                ahead.position()
            }
            Motion::Ballistic(_) => origin + self.estimated_velocity(after) * after,
        }
    }

    /// Advances the live state by one physics step, mutating the provided
    /// position.
    pub fn integrate(&mut self, position: &mut Vec2, dt: Seconds) -> MotionOutcome {
        match self {
            Motion::Linear(motion) => {
                let velocity = motion.direction * (motion.speed - motion.throttle).max(0.0);
                *position += velocity * dt;
                MotionOutcome::default()
            }
            Motion::AlongPath(motion) => {
                let distance = (motion.speed - motion.throttle).max(0.0) * dt;
                motion.cursor.advance(&motion.path, distance);
                *position = motion.cursor.position();

                let mut outcome = MotionOutcome::default();
                if motion.cursor.is_finished(&motion.path) && !motion.end_reported {
                    motion.end_reported = true;
                    outcome.reached_end = true;
                }
                outcome
            }
            Motion::Ballistic(motion) => {
                motion.velocity += motion.acceleration * dt;
                *position += motion.velocity * dt;
                MotionOutcome::default()
            }
        }
    }
}
