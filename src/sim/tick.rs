//! Fixed-order simulation tick
//!
//! Every driver runs the same three phases, in this order:
//! 1. integrate every ball (gravity, then velocity)
//! 2. find and resolve overlapping pairs against the integrated positions
//! 3. clamp and reflect against the arena walls
//!
//! Walls go last so a velocity reflected this tick is not integrated again
//! until the next one.

use super::ball::Ball;
use super::quadtree::{Quadtree, Spatial};
use super::world::{BallEntry, BallHandle, World};
use crate::settings::DetectionMode;

/// What a single tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Narrow-phase calls that separated a pair
    pub resolved: usize,
    /// Narrow-phase calls made
    pub candidates_tested: usize,
}

impl std::ops::AddAssign for TickReport {
    fn add_assign(&mut self, rhs: Self) {
        self.resolved += rhs.resolved;
        self.candidates_tested += rhs.candidates_tested;
    }
}

/// Advance the world by `dt` seconds (scaled by the world's time scale)
/// using its configured detection mode
pub fn tick(world: &mut World, dt: f32) -> TickReport {
    let dt = dt * world.time_scale;
    match world.detection {
        DetectionMode::Quadtree => tick_quadtree(world, dt),
        DetectionMode::BruteForce => tick_brute_force(world, dt),
    }
}

/// Quadtree broad phase. `dt` is used as given.
///
/// Each ball queries the tree and is resolved against every other candidate,
/// so a pair can be visited from both sides; the second visit finds it
/// already separated.
pub fn tick_quadtree(world: &mut World, dt: f32) -> TickReport {
    let gravity = world.gravity;
    let params = world.params;
    let flash_frames = world.flash_frames;
    let mut report = TickReport::default();

    world.quadtree.clear();
    for (i, ball) in world.entities.iter_mut().enumerate() {
        ball.update(gravity, dt);
        world.quadtree.insert(BallEntry {
            handle: BallHandle::from_index(i),
            bounds: ball.bounding_box(),
        });
    }

    let mut candidates = Vec::new();
    for i in 0..world.entities.len() {
        candidates.clear();
        let handle = BallHandle::from_index(i);
        let query = world.entities[i].bounding_box();
        world.quadtree.retrieve(&mut candidates, &query);

        for entry in &candidates {
            if entry.id() == handle {
                continue;
            }
            report.candidates_tested += 1;

            let (a, b) = pair_mut(&mut world.entities, i, entry.id().index());
            if a.collide(b, &params) {
                a.flash(flash_frames);
                b.flash(flash_frames);
                report.resolved += 1;
            }
        }
    }

    for ball in world.entities.iter_mut() {
        ball.apply_world_boundary(&world.bounds, &params);
    }

    report
}

/// Every unordered pair once, in entity order. Reference for the quadtree
/// driver. `dt` is used as given.
pub fn tick_brute_force(world: &mut World, dt: f32) -> TickReport {
    let gravity = world.gravity;
    let params = world.params;
    let flash_frames = world.flash_frames;
    let mut report = TickReport::default();

    for ball in world.entities.iter_mut() {
        ball.update(gravity, dt);
    }

    let n = world.entities.len();
    for i in 0..n {
        for j in (i + 1)..n {
            report.candidates_tested += 1;
            let (a, b) = pair_mut(&mut world.entities, i, j);
            if a.collide(b, &params) {
                a.flash(flash_frames);
                b.flash(flash_frames);
                report.resolved += 1;
            }
        }
    }

    for ball in world.entities.iter_mut() {
        ball.apply_world_boundary(&world.bounds, &params);
    }

    report
}

/// Overlapping pairs at the current positions, without resolving them.
///
/// Pairs are `(lower, higher)` and sorted, so both modes can be compared
/// directly. The quadtree mode builds its own tree and leaves the world's
/// debug tree alone.
pub fn colliding_pairs(world: &World, mode: DetectionMode) -> Vec<(BallHandle, BallHandle)> {
    let balls = &world.entities;
    let mut pairs = Vec::new();

    match mode {
        DetectionMode::BruteForce => {
            for i in 0..balls.len() {
                for j in (i + 1)..balls.len() {
                    if balls[i].overlaps(&balls[j]) {
                        pairs.push((BallHandle::from_index(i), BallHandle::from_index(j)));
                    }
                }
            }
        }
        DetectionMode::Quadtree => {
            let mut tree = Quadtree::new(0, world.bounds, world.quadtree.config());
            for (i, ball) in balls.iter().enumerate() {
                tree.insert(BallEntry {
                    handle: BallHandle::from_index(i),
                    bounds: ball.bounding_box(),
                });
            }

            let mut candidates = Vec::new();
            for (i, ball) in balls.iter().enumerate() {
                candidates.clear();
                let handle = BallHandle::from_index(i);
                tree.retrieve(&mut candidates, &ball.bounding_box());
                for entry in &candidates {
                    // Each pair once, from its lower handle; never a ball with itself
                    let other = entry.id();
                    if other > handle && ball.overlaps(&balls[other.index()]) {
                        pairs.push((handle, other));
                    }
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Two distinct mutable balls from one slice
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = balls.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = balls.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
