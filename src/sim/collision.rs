//! Axis-aligned bounding box geometry
//!
//! Every entity in the arena is a rectangle anchored at its top-left corner,
//! with y growing downward. Overlap is strict: boxes that merely touch along an
//! edge do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width/height of an entity (fixed after creation)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// A rectangle in arena space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from a top-left corner and size
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Size) -> Self {
        Self {
            min: pos,
            max: pos + size.as_vec2(),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Overlap test for two positioned rectangles
#[inline]
pub fn aabb_overlap(pos_a: Vec2, size_a: Size, pos_b: Vec2, size_b: Size) -> bool {
    Aabb::from_pos_size(pos_a, size_a).overlaps(&Aabb::from_pos_size(pos_b, size_b))
}

/// Clamp a horizontal position so a box of `width` stays inside `[0, arena_width]`
#[inline]
pub fn clamp_to_arena(x: f32, width: f32, arena_width: f32) -> f32 {
    x.clamp(0.0, (arena_width - width).max(0.0))
}
