//! Quadtree broad phase
//!
//! Items are stored by value (they are small `Copy` handles plus a box) and
//! the whole tree is cleared and rebuilt every tick, so it never holds
//! anything across ticks.
//!
//! Insertion is exact-containment only: an item descends into a child only if
//! that child's bounds fully contain its box. Anything straddling a split line
//! stays at the parent in `stuck`.
//!
//! ```text
//! +-------+-------+
//! |  TL 0 |  TR 1 |   +Y points down
//! +-------+-------+
//! |  BL 2 |  BR 3 |
//! +-------+-------+
//! ```

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::consts::{QUADTREE_MAX_LEVELS, QUADTREE_MAX_OBJECTS};

/// Something the quadtree can index: a box and an identity
pub trait Spatial: Copy {
    type Id: Copy + Eq;

    fn id(&self) -> Self::Id;

    fn bounding_box(&self) -> Aabb;
}

/// Split tuning. Changing these affects speed only, never which pairs are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// A leaf splits once it holds more than this many objects
    pub max_objects: usize,
    /// Nodes at this depth never split (root is level 0)
    pub max_levels: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_objects: QUADTREE_MAX_OBJECTS,
            max_levels: QUADTREE_MAX_LEVELS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Node counts for the debug overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuadtreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: u32,
    pub objects: usize,
    pub stuck: usize,
    /// Largest object count held by a single leaf
    pub fullest_leaf: usize,
}

#[derive(Debug, Clone)]
pub struct Quadtree<T: Spatial> {
    level: u32,
    bounds: Aabb,
    config: QuadtreeConfig,
    objects: Vec<T>,
    stuck: Vec<T>,
    children: Option<Box<[Quadtree<T>; 4]>>,
}

impl<T: Spatial> Quadtree<T> {
    pub fn new(level: u32, bounds: Aabb, config: QuadtreeConfig) -> Self {
        Self {
            level,
            bounds,
            config,
            objects: Vec::new(),
            stuck: Vec::new(),
            children: None,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn config(&self) -> QuadtreeConfig {
        self.config
    }

    /// Items held directly by this node that have not been pushed to a child
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Items held by this node because no single child can contain them
    pub fn stuck(&self) -> &[T] {
        &self.stuck
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<&[Quadtree<T>; 4]> {
        self.children.as_deref()
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&Quadtree<T>> {
        self.children.as_ref().map(|c| &c[quadrant.index()])
    }

    /// Number of items in this node and all descendants
    pub fn len(&self) -> usize {
        let own = self.objects.len() + self.stuck.len();
        own + self
            .children
            .iter()
            .flat_map(|c| c.iter())
            .map(|c| c.len())
            .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every item and child, keeping bounds and level
    pub fn clear(&mut self) {
        self.objects.clear();
        self.stuck.clear();
        self.children = None;
    }

    pub fn insert(&mut self, item: T) {
        let rect = item.bounding_box();

        if self.children.is_some() {
            self.insert_into_child(item, &rect);
            return;
        }

        self.objects.push(item);

        if self.objects.len() > self.config.max_objects && self.level < self.config.max_levels {
            self.split();
            for obj in std::mem::take(&mut self.objects) {
                let rect = obj.bounding_box();
                self.insert_into_child(obj, &rect);
            }
        }
    }

    /// Append every item that might overlap `query`.
    ///
    /// Descends into each child whose bounds touch the query, then adds this
    /// node's own items. The result can contain items that do not overlap,
    /// but never misses one that does.
    pub fn retrieve(&self, out: &mut Vec<T>, query: &Aabb) {
        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.bounds.intersects(query) {
                    child.retrieve(out, query);
                }
            }
        }

        out.extend_from_slice(&self.objects);
        out.extend_from_slice(&self.stuck);
    }

    /// Visit the immediate children (not recursive)
    pub fn for_each_node<F: FnMut(&Quadtree<T>)>(&self, mut visit: F) {
        if let Some(children) = &self.children {
            for child in children.iter() {
                visit(child);
            }
        }
    }

    pub fn stats(&self) -> QuadtreeStats {
        let mut stats = QuadtreeStats::default();
        self.collect_stats(&mut stats);
        stats
    }

    fn collect_stats(&self, stats: &mut QuadtreeStats) {
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(self.level);
        stats.objects += self.objects.len();
        stats.stuck += self.stuck.len();

        match &self.children {
            Some(children) => children.iter().for_each(|c| c.collect_stats(stats)),
            None => {
                stats.leaves += 1;
                stats.fullest_leaf = stats.fullest_leaf.max(self.objects.len());
            }
        }
    }

    /// Quadrant that strictly contains `rect` relative to this node's
    /// midpoints, or `None` when it straddles (or touches) a midpoint
    fn quadrant_of(&self, rect: &Aabb) -> Option<Quadrant> {
        let vertical_mid = self.bounds.x + self.bounds.w / 2.0;
        let horizontal_mid = self.bounds.y + self.bounds.h / 2.0;

        let top = rect.bottom() < horizontal_mid;
        let bottom = rect.y > horizontal_mid;
        let left = rect.right() < vertical_mid;
        let right = rect.x > vertical_mid;

        match (left, right, top, bottom) {
            (true, _, true, _) => Some(Quadrant::TopLeft),
            (true, _, _, true) => Some(Quadrant::BottomLeft),
            (_, true, true, _) => Some(Quadrant::TopRight),
            (_, true, _, true) => Some(Quadrant::BottomRight),
            _ => None,
        }
    }

    /// Index of the child that fully contains `rect`, if any
    fn fitting_child(&self, rect: &Aabb) -> Option<usize> {
        let quadrant = self.quadrant_of(rect)?;
        let children = self.children.as_ref()?;
        children[quadrant.index()]
            .bounds
            .is_inside(rect)
            .then_some(quadrant.index())
    }

    fn insert_into_child(&mut self, item: T, rect: &Aabb) {
        match (self.fitting_child(rect), self.children.as_mut()) {
            (Some(i), Some(children)) => children[i].insert(item),
            _ => self.stuck.push(item),
        }
    }

    fn split(&mut self) {
        let level = self.level + 1;
        let config = self.config;
        let [tl, tr, bl, br] = self.bounds.quarters();
        log::trace!("quadtree split at level {} ({:?})", self.level, self.bounds);

        self.children = Some(Box::new([
            Quadtree::new(level, tl, config),
            Quadtree::new(level, tr, config),
            Quadtree::new(level, bl, config),
            Quadtree::new(level, br, config),
        ]));
    }
}
