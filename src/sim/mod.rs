//! Deterministic simulation module
//!
//! All physics lives here. This module must stay pure and deterministic:
//! - Δt supplied by the caller, no internal clock
//! - Seeded RNG only
//! - Stable iteration order (insertion order of balls)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod ball;
pub mod quadtree;
pub mod tick;
pub mod world;

pub use aabb::Aabb;
pub use ball::{Ball, MassScaling, PhysicsParams};
pub use quadtree::{Quadrant, Quadtree, QuadtreeConfig, QuadtreeStats, Spatial};
pub use tick::{TickReport, colliding_pairs, tick, tick_brute_force, tick_quadtree};
pub use world::{BallEntry, BallHandle, CollisionQuadtree, World};
