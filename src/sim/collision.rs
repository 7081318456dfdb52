//! Collision queries between circles, points and rectangles
//!
//! Asteroids collide with a deliberately shrunk radius so hits line up with the
//! visible pixels of the sprite rather than its transparent padding. All tests
//! compare squared distances.

use glam::Vec2;

use crate::distance_sq;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink by a fraction of the size on each side, keeping the center
    pub fn inset(&self, frac_x: f32, frac_y: f32) -> Self {
        let size = self.size();
        let pad = Vec2::new(size.x * frac_x, size.y * frac_y);
        Self {
            min: self.min + pad,
            max: self.max - pad,
        }
    }

    /// Closest point on (or inside) the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// True if `point` lies within the scaled circle
#[inline]
pub fn circle_hits_point(center: Vec2, radius: f32, scale: f32, point: Vec2) -> bool {
    let hit_radius = radius * scale;
    distance_sq(center, point) <= hit_radius * hit_radius
}

/// True if the scaled circle overlaps the rectangle
#[inline]
pub fn circle_hits_rect(center: Vec2, radius: f32, scale: f32, rect: &Rect) -> bool {
    let hit_radius = radius * scale;
    distance_sq(center, rect.closest_point(center)) <= hit_radius * hit_radius
}
