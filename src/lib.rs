//! Ballsim - colliding balls in a rectangular arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (balls, quadtree broad phase, world, tick drivers)
//! - `settings`: Tunable simulation parameters
//! - `error`: Error type for fallible construction and settings loading

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{DetectionMode, Settings};

/// 2D vector used for positions and velocities.
///
/// `normalize_or_zero` is the only normalisation used by the simulation, so a
/// zero-length vector never produces NaN.
pub use glam::Vec2 as Vector2;

/// Simulation configuration defaults
pub mod consts {
    /// Default arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 1024.0;
    pub const ARENA_HEIGHT: f32 = 1024.0;

    /// Default gravity (pixels/s², positive pulls toward +Y)
    pub const DEFAULT_GRAVITY: f32 = 900.0;

    /// Bias added to collision push-out and used as the wall contact threshold
    pub const PHYSICS_EPSILON: f32 = 1e-3;
    /// Impulse multiplier (1.0 = perfectly elastic)
    pub const RESTITUTION: f32 = 1.0;

    /// Quadtree tuning
    pub const QUADTREE_MAX_OBJECTS: usize = 10;
    pub const QUADTREE_MAX_LEVELS: u32 = 5;

    /// Render frames a ball stays highlighted after a collision
    pub const COLLISION_FLASH_FRAMES: u32 = 10;

    /// Fixed timestep used by the headless runner (seconds)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Ball defaults for spawned balls
    pub const BALL_MASS: f32 = 3.0;
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_SPAWN_SPEED: f32 = 100.0;

    /// Default RNG seed
    pub const DEFAULT_SEED: u64 = 0x5eed_ba11;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector2::new(3.0, 4.0);
        let b = Vector2::new(1.0, -2.0);

        assert_eq!(a + b, Vector2::new(4.0, 2.0));
        assert_eq!(a - b, Vector2::new(2.0, 6.0));
        assert_eq!(-a, Vector2::new(-3.0, -4.0));
        assert_eq!(a * b, Vector2::new(3.0, -8.0));
        assert_eq!(a * 2.0, Vector2::new(6.0, 8.0));
        assert_eq!(a / 2.0, Vector2::new(1.5, 2.0));
        assert_eq!(a.dot(b), -5.0);
        assert_eq!(a.length_squared(), 25.0);
        assert_eq!(a.length(), 5.0);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        let n = Vector2::ZERO.normalize_or_zero();
        assert_eq!(n, Vector2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }
}
