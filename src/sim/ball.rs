//! Ball physics: integration, pairwise collision response, wall reflection
//!
//! Positions are ball centers in arena pixels, +Y down. Velocities are in
//! pixels per second and every integration step multiplies by Δt in seconds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::SimError;
use crate::consts::*;

/// How push-out and impulse are split between two colliding balls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassScaling {
    /// Scale by `1 / (1/mA + 1/mB)`: momentum along the normal is conserved
    #[default]
    Harmonic,
    /// No rescaling; each ball takes its full inverse mass (loses energy)
    Unit,
}

impl MassScaling {
    #[inline]
    pub fn inverse_mass_scale(&self, inv_mass_a: f32, inv_mass_b: f32) -> f32 {
        match self {
            MassScaling::Harmonic => 1.0 / (inv_mass_a + inv_mass_b),
            MassScaling::Unit => 1.0,
        }
    }
}

/// Collision response tuning shared by every ball in a world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Extra separation added on push-out, and the wall contact threshold
    pub epsilon: f32,
    /// Impulse multiplier (1.0 = elastic)
    pub restitution: f32,
    pub mass_scaling: MassScaling,
    /// Scale reflected wall velocity by 1/mass
    pub lossy_boundary: bool,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            epsilon: PHYSICS_EPSILON,
            restitution: RESTITUTION,
            mass_scaling: MassScaling::Harmonic,
            lossy_boundary: false,
        }
    }
}

/// A circular rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    mass: f32,
    radius: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Render frames left to draw this ball highlighted (visual only)
    pub collision_flash: u32,
}

impl Ball {
    /// Create a ball.
    ///
    /// # Panics
    ///
    /// If `mass` or `radius` is not a finite positive number. Use
    /// [`Ball::try_new`] for input that has not been validated.
    pub fn new(mass: f32, radius: f32, position: Vec2, velocity: Vec2) -> Self {
        match Self::try_new(mass, radius, position, velocity) {
            Ok(ball) => ball,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(
        mass: f32,
        radius: f32,
        position: Vec2,
        velocity: Vec2,
    ) -> Result<Self, SimError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(mass) || !valid(radius) {
            return Err(SimError::InvalidBall { mass, radius });
        }
        Ok(Self {
            mass,
            radius,
            position,
            velocity,
            collision_flash: 0,
        })
    }

    /// Ball at rest at `position`
    pub fn at(mass: f32, radius: f32, position: Vec2) -> Self {
        Self::new(mass, radius, position, Vec2::ZERO)
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Box enclosing the disc, recomputed from the current position
    #[inline]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center_radius(self.position, self.radius)
    }

    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Semi-implicit Euler step: gravity into velocity, velocity into position
    pub fn update(&mut self, gravity: f32, dt: f32) {
        self.velocity.y += gravity * dt;
        self.position += self.velocity * dt;
    }

    /// Narrow-phase test with the same rejection rule as [`Ball::collide`].
    ///
    /// Coincident centers are not a collision: there is no normal to push along.
    pub fn overlaps(&self, other: &Ball) -> bool {
        let total_radius = self.radius + other.radius;
        let distance2 = (self.position - other.position).length_squared();
        distance2 != 0.0 && distance2 < total_radius * total_radius
    }

    /// Separate two overlapping balls and exchange an impulse along the
    /// contact normal. Returns false, leaving both untouched, when the balls
    /// do not overlap (or share a center).
    pub fn collide(&mut self, other: &mut Ball, params: &PhysicsParams) -> bool {
        let total_radius = self.radius + other.radius;
        let delta = self.position - other.position;
        let distance2 = delta.length_squared();
        if distance2 == 0.0 || distance2 >= total_radius * total_radius {
            return false;
        }

        let distance = distance2.sqrt();
        let normal = delta / distance;
        let penetration = total_radius - distance;
        let push = normal * (penetration + params.epsilon);

        let inv_mass_a = self.inverse_mass();
        let inv_mass_b = other.inverse_mass();
        let inv_mass_scale = params.mass_scaling.inverse_mass_scale(inv_mass_a, inv_mass_b);

        self.position += push * (inv_mass_a * inv_mass_scale);
        other.position -= push * (inv_mass_b * inv_mass_scale);

        let velocity_along_normal = (self.velocity - other.velocity).dot(normal);
        if velocity_along_normal > 0.0 {
            // Already separating
            return true;
        }

        let impulse_factor = -2.0 * velocity_along_normal * inv_mass_scale * params.restitution;
        let mut impulse = normal * impulse_factor;
        // A non-finite velocity on either ball must not spread to the other
        if impulse.length().is_nan() {
            impulse = Vec2::ZERO;
        }

        self.velocity += impulse * inv_mass_a;
        other.velocity -= impulse * inv_mass_b;

        true
    }

    /// Clamp the ball inside `bounds` and reflect the velocity component of
    /// each wall it touched. Axes are handled independently.
    pub fn apply_world_boundary(&mut self, bounds: &Aabb, params: &PhysicsParams) {
        let r = self.radius;
        let damping = if params.lossy_boundary {
            self.inverse_mass()
        } else {
            1.0
        };

        if self.position.x - r - bounds.x < params.epsilon {
            self.position.x = bounds.x + r;
            self.velocity.x = -self.velocity.x * damping;
        } else if self.position.x + r > bounds.right() {
            self.position.x = bounds.right() - r;
            self.velocity.x = -self.velocity.x * damping;
        }

        if self.position.y - r - bounds.y < params.epsilon {
            self.position.y = bounds.y + r;
            self.velocity.y = -self.velocity.y * damping;
        } else if self.position.y + r > bounds.bottom() {
            self.position.y = bounds.bottom() - r;
            self.velocity.y = -self.velocity.y * damping;
        }
    }

    /// Mark the ball as just collided for `frames` render frames
    pub fn flash(&mut self, frames: u32) {
        self.collision_flash = frames;
    }

    /// Per-render-frame countdown. Returns true while still highlighted.
    pub fn decay_flash(&mut self) -> bool {
        if self.collision_flash > 0 {
            self.collision_flash -= 1;
            true
        } else {
            false
        }
    }
}
