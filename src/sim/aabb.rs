//! Axis-aligned bounding boxes
//!
//! Stored as origin + size (`x, y, w, h`) with +Y pointing down, matching the
//! arena coordinate system.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square box enclosing a circle
    pub fn from_center_radius(center: Vec2, radius: f32) -> Self {
        Self {
            x: center.x - radius,
            y: center.y - radius,
            w: radius * 2.0,
            h: radius * 2.0,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// True iff `other` lies entirely within `self` (edges inclusive)
    pub fn is_inside(&self, other: &Aabb) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// True iff the boxes share at least one point (edges inclusive)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// The four equal sub-boxes, in [`super::Quadrant`] order:
    /// top-left, top-right, bottom-left, bottom-right
    pub fn quarters(&self) -> [Aabb; 4] {
        let w = self.w / 2.0;
        let h = self.h / 2.0;
        [
            Aabb::new(self.x, self.y, w, h),
            Aabb::new(self.x + w, self.y, w, h),
            Aabb::new(self.x, self.y + h, w, h),
            Aabb::new(self.x + w, self.y + h, w, h),
        ]
    }
}
