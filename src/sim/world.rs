//! The arena: owned balls, gravity, bounds and the per-tick quadtree
//!
//! Balls live in an append-only `Vec`; a [`BallHandle`] is an index into it
//! and stays valid for the life of the world. Quadtree entries are handles
//! plus a box snapshot and are rebuilt every tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::ball::{Ball, PhysicsParams};
use super::quadtree::{Quadtree, QuadtreeConfig, Spatial};
use crate::SimError;
use crate::settings::{DetectionMode, Settings};

/// Stable index of a ball within its [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallHandle(u32);

impl BallHandle {
    /// # Panics
    ///
    /// If `index` does not fit in 32 bits.
    pub(crate) fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(index) => Self(index),
            Err(_) => panic!("ball index {index} exceeds the handle range"),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Quadtree payload: which ball, and where it was when inserted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallEntry {
    pub handle: BallHandle,
    pub bounds: Aabb,
}

impl Spatial for BallEntry {
    type Id = BallHandle;

    fn id(&self) -> BallHandle {
        self.handle
    }

    fn bounding_box(&self) -> Aabb {
        self.bounds
    }
}

pub type CollisionQuadtree = Quadtree<BallEntry>;

#[derive(Debug, Clone)]
pub struct World {
    pub(crate) bounds: Aabb,
    pub(crate) gravity: f32,
    pub(crate) params: PhysicsParams,
    pub(crate) detection: DetectionMode,
    pub(crate) time_scale: f32,
    pub(crate) flash_frames: u32,
    pub(crate) entities: Vec<Ball>,
    pub(crate) quadtree: CollisionQuadtree,
    rng: Pcg32,
}

impl World {
    /// Arena of the given size with default settings.
    ///
    /// # Panics
    ///
    /// If `width` or `height` is not a finite positive number.
    pub fn new(width: f32, height: f32) -> Self {
        Self::from_settings(&Settings {
            width,
            height,
            ..Settings::default()
        })
    }

    /// # Panics
    ///
    /// If `settings` fail [`Settings::validate`]. Use
    /// [`World::try_from_settings`] for settings that have not been checked.
    pub fn from_settings(settings: &Settings) -> Self {
        match Self::try_from_settings(settings) {
            Ok(world) => world,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_from_settings(settings: &Settings) -> Result<Self, SimError> {
        settings.validate()?;
        let bounds = Aabb::new(0.0, 0.0, settings.width, settings.height);
        Ok(Self {
            bounds,
            gravity: settings.gravity,
            params: settings.physics(),
            detection: settings.detection,
            time_scale: settings.time_scale,
            flash_frames: settings.collision_flash_frames,
            entities: Vec::new(),
            quadtree: Quadtree::new(0, bounds, settings.quadtree),
            rng: Pcg32::seed_from_u64(settings.seed),
        })
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn width(&self) -> f32 {
        self.bounds.w
    }

    pub fn height(&self) -> f32 {
        self.bounds.h
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    pub fn set_params(&mut self, params: PhysicsParams) {
        self.params = params;
    }

    pub fn detection(&self) -> DetectionMode {
        self.detection
    }

    pub fn set_detection(&mut self, detection: DetectionMode) {
        self.detection = detection;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    pub fn collision_flash_frames(&self) -> u32 {
        self.flash_frames
    }

    pub fn quadtree_config(&self) -> QuadtreeConfig {
        self.quadtree.config()
    }

    /// Swap the quadtree tuning. Call between ticks only.
    pub fn set_quadtree_config(&mut self, config: QuadtreeConfig) {
        self.quadtree = Quadtree::new(0, self.bounds, config);
    }

    /// Balls in insertion order
    pub fn entities(&self) -> &[Ball] {
        &self.entities
    }

    /// Tree built by the last quadtree tick, for the debug overlay
    pub fn quadtree(&self) -> &CollisionQuadtree {
        &self.quadtree
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, handle: BallHandle) -> Option<&Ball> {
        self.entities.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: BallHandle) -> Option<&mut Ball> {
        self.entities.get_mut(handle.index())
    }

    pub fn handles(&self) -> impl Iterator<Item = BallHandle> {
        (0..self.entities.len()).map(BallHandle::from_index)
    }

    /// Take ownership of a ball; it is appended after every existing one
    pub fn add(&mut self, ball: Ball) -> BallHandle {
        let handle = BallHandle::from_index(self.entities.len());
        self.entities.push(ball);
        handle
    }

    /// Replace the arena bounds, rebuild the quadtree for them and scatter.
    /// Call between ticks only.
    pub fn resize(&mut self, bounds: Aabb) {
        log::debug!("World resized to {}x{}", bounds.w, bounds.h);
        self.bounds = bounds;
        self.quadtree = Quadtree::new(0, bounds, self.quadtree.config());
        self.scatter();
    }

    /// Move every ball to a uniformly random point in the arena, using the
    /// world's own seeded RNG
    pub fn scatter(&mut self) {
        scatter_balls(&mut self.entities, &self.bounds, &mut self.rng);
    }

    /// [`World::scatter`] with a caller-supplied random source
    pub fn scatter_with<R: Rng>(&mut self, rng: &mut R) {
        scatter_balls(&mut self.entities, &self.bounds, rng);
    }

    /// Add `count` identical balls moving diagonally in alternating
    /// directions, then scatter the whole arena
    pub fn spawn_scattered(&mut self, count: usize, mass: f32, radius: f32, speed: f32) {
        let mut dir = 1.0;
        for _ in 0..count {
            self.add(Ball::new(
                mass,
                radius,
                Vec2::ZERO,
                Vec2::new(speed * dir, -speed * dir),
            ));
            dir = -dir;
        }
        log::debug!("Spawned {count} balls (m={mass}, r={radius})");
        self.scatter();
    }

    /// Per-render-frame countdown of every ball's collision highlight
    pub fn decay_flashes(&mut self) {
        for ball in &mut self.entities {
            ball.decay_flash();
        }
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.entities.iter().map(Ball::momentum).sum()
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.entities.iter().map(Ball::kinetic_energy).sum()
    }
}

fn scatter_balls<R: Rng>(balls: &mut [Ball], bounds: &Aabb, rng: &mut R) {
    for ball in balls.iter_mut() {
        ball.position = Vec2::new(
            bounds.x + rng.random::<f32>() * bounds.w,
            bounds.y + rng.random::<f32>() * bounds.h,
        );
    }
    log::debug!("Scattered {} balls", balls.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_order() {
        let mut world = World::new(200.0, 100.0);
        let a = world.add(Ball::at(1.0, 5.0, Vec2::new(10.0, 10.0)));
        let b = world.add(Ball::at(2.0, 6.0, Vec2::new(20.0, 20.0)));

        assert_eq!(world.len(), 2);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(world.entities()[1].mass(), 2.0);
        assert_eq!(world.get(a).unwrap().radius(), 5.0);
        assert_eq!(world.handles().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_defaults_from_settings() {
        let world = World::new(640.0, 480.0);
        assert_eq!(world.bounds(), Aabb::new(0.0, 0.0, 640.0, 480.0));
        assert_eq!(world.quadtree().bounds(), world.bounds());
        assert_eq!(world.gravity(), crate::consts::DEFAULT_GRAVITY);
        assert_eq!(world.detection(), DetectionMode::Quadtree);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad = Settings {
            width: -5.0,
            height: 0.0,
            ..Settings::default()
        };
        assert!(matches!(
            World::try_from_settings(&bad),
            Err(SimError::InvalidSettings(_))
        ));
        assert!(World::try_from_settings(&Settings::default()).is_ok());
    }

    #[test]
    #[should_panic(expected = "invalid settings")]
    fn test_new_panics_on_degenerate_arena() {
        let _world = World::new(-5.0, 0.0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "exceeds the handle range")]
    fn test_handle_overflow_panics() {
        BallHandle::from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn test_scatter_stays_in_bounds() {
        let mut world = World::new(300.0, 200.0);
        world.spawn_scattered(500, 1.0, 4.0, 10.0);
        for ball in world.entities() {
            assert!((0.0..300.0).contains(&ball.position.x));
            assert!((0.0..200.0).contains(&ball.position.y));
        }
    }

    #[test]
    fn test_scatter_is_deterministic_per_seed() {
        let settings = Settings {
            seed: 42,
            ..Settings::default()
        };
        let mut w1 = World::from_settings(&settings);
        let mut w2 = World::from_settings(&settings);
        w1.spawn_scattered(20, 1.0, 5.0, 10.0);
        w2.spawn_scattered(20, 1.0, 5.0, 10.0);
        assert_eq!(w1.entities(), w2.entities());

        let mut w3 = World::from_settings(&Settings {
            seed: 43,
            ..Settings::default()
        });
        w3.spawn_scattered(20, 1.0, 5.0, 10.0);
        assert_ne!(w1.entities(), w3.entities());
    }

    #[test]
    fn test_scatter_with_injected_rng() {
        let mut world = World::new(100.0, 100.0);
        world.add(Ball::at(1.0, 1.0, Vec2::ZERO));
        world.add(Ball::at(1.0, 1.0, Vec2::ZERO));

        world.scatter_with(&mut Pcg32::seed_from_u64(7));
        let first = world.entities().to_vec();
        world.scatter_with(&mut Pcg32::seed_from_u64(7));
        assert_eq!(world.entities(), first.as_slice());
    }

    #[test]
    fn test_spawn_alternates_velocity() {
        let mut world = World::new(100.0, 100.0);
        world.spawn_scattered(3, 1.0, 2.0, 10.0);
        let v: Vec<Vec2> = world.entities().iter().map(|b| b.velocity).collect();
        assert_eq!(
            v,
            vec![
                Vec2::new(10.0, -10.0),
                Vec2::new(-10.0, 10.0),
                Vec2::new(10.0, -10.0)
            ]
        );
    }

    #[test]
    fn test_resize_rebuilds_quadtree_and_scatters() {
        let mut world = World::new(1000.0, 1000.0);
        world.set_quadtree_config(QuadtreeConfig {
            max_objects: 3,
            max_levels: 2,
        });
        world.spawn_scattered(50, 1.0, 2.0, 0.0);

        world.resize(Aabb::new(0.0, 0.0, 50.0, 40.0));
        assert_eq!(world.width(), 50.0);
        assert_eq!(world.height(), 40.0);
        assert_eq!(world.quadtree().bounds(), Aabb::new(0.0, 0.0, 50.0, 40.0));
        assert!(world.quadtree().is_empty());
        assert_eq!(world.quadtree_config().max_objects, 3);
        assert!(world.entities().iter().all(|b| b.position.x < 50.0 && b.position.y < 40.0));
    }

    #[test]
    fn test_totals() {
        let mut world = World::new(100.0, 100.0);
        world.add(Ball::new(2.0, 1.0, Vec2::ZERO, Vec2::new(3.0, 0.0)));
        world.add(Ball::new(1.0, 1.0, Vec2::ZERO, Vec2::new(-6.0, 4.0)));
        assert_eq!(world.total_momentum(), Vec2::new(0.0, 4.0));
        assert_eq!(world.total_kinetic_energy(), 9.0 + 26.0);
    }

    #[test]
    fn test_decay_flashes() {
        let mut world = World::new(100.0, 100.0);
        let h = world.add(Ball::at(1.0, 1.0, Vec2::ZERO));
        world.get_mut(h).unwrap().flash(1);
        world.decay_flashes();
        assert_eq!(world.get(h).unwrap().collision_flash, 0);
    }
}
