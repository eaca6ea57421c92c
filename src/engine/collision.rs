//! Collision detection between axis-aligned boxes and circles
//!
//! Every test takes a signed `tolerance`: a positive value shrinks both
//! hitboxes by that many pixels per side (forgiving runners), a negative
//! value grows them (generous tap targets).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Hitbox shape, centered on the owning entity's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box with the given half extents
    Rect { half: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Half extents of the bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Rect { half } => half,
            Shape::Circle { radius } => Vec2::splat(radius),
        }
    }

    /// Apply a tolerance inset, never collapsing below zero size
    pub fn inset(&self, tolerance: f32) -> Self {
        match *self {
            Shape::Rect { half } => Shape::Rect {
                half: (half - Vec2::splat(tolerance)).max(Vec2::ZERO),
            },
            Shape::Circle { radius } => Shape::Circle {
                radius: (radius - tolerance).max(0.0),
            },
        }
    }
}

/// Axis-aligned bounding-box overlap (touching edges do not count)
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    let d = (a_pos - b_pos).abs();
    d.x < a_half.x + b_half.x && d.y < a_half.y + b_half.y
}

/// Center distance under combined radius
#[inline]
pub fn circle_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let r = a_radius + b_radius;
    a_pos.distance_squared(b_pos) < r * r
}

/// Circle against box: distance from the circle center to the closest box point
#[inline]
pub fn circle_rect_overlap(c_pos: Vec2, radius: f32, r_pos: Vec2, half: Vec2) -> bool {
    let closest = c_pos.clamp(r_pos - half, r_pos + half);
    c_pos.distance_squared(closest) < radius * radius
}

/// Overlap test between any two shapes with a tolerance inset applied to both
pub fn overlaps(a_pos: Vec2, a: Shape, b_pos: Vec2, b: Shape, tolerance: f32) -> bool {
    match (a.inset(tolerance), b.inset(tolerance)) {
        (Shape::Rect { half: ha }, Shape::Rect { half: hb }) => aabb_overlap(a_pos, ha, b_pos, hb),
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_overlap(a_pos, ra, b_pos, rb)
        }
        (Shape::Circle { radius }, Shape::Rect { half }) => {
            circle_rect_overlap(a_pos, radius, b_pos, half)
        }
        (Shape::Rect { half }, Shape::Circle { radius }) => {
            circle_rect_overlap(b_pos, radius, a_pos, half)
        }
    }
}

/// Point inside a shape (tap targets); negative tolerance widens the target
pub fn contains_point(pos: Vec2, shape: Shape, point: Vec2, tolerance: f32) -> bool {
    match shape.inset(tolerance) {
        Shape::Rect { half } => {
            let d = (point - pos).abs();
            d.x <= half.x && d.y <= half.y
        }
        Shape::Circle { radius } => pos.distance_squared(point) <= radius * radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap_and_adjacent() {
        let a = Shape::rect(40.0, 40.0);
        let b = Shape::rect(20.0, 20.0);
        // Overlapping by 5px
        assert!(overlaps(Vec2::new(0.0, 0.0), a, Vec2::new(25.0, 0.0), b, 0.0));
        // Exactly touching edges
        assert!(!overlaps(Vec2::new(0.0, 0.0), a, Vec2::new(30.0, 0.0), b, 0.0));
    }

    #[test]
    fn test_tolerance_forgives_grazing_contact() {
        let a = Shape::rect(40.0, 40.0);
        let b = Shape::rect(20.0, 20.0);
        // 2px interpenetration is ignored with a 4px inset on each side
        assert!(overlaps(Vec2::ZERO, a, Vec2::new(28.0, 0.0), b, 0.0));
        assert!(!overlaps(Vec2::ZERO, a, Vec2::new(28.0, 0.0), b, 4.0));
    }

    #[test]
    fn test_circle_overlap() {
        let a = Shape::circle(10.0);
        let b = Shape::circle(5.0);
        assert!(overlaps(Vec2::ZERO, a, Vec2::new(14.0, 0.0), b, 0.0));
        assert!(!overlaps(Vec2::ZERO, a, Vec2::new(16.0, 0.0), b, 0.0));
    }

    #[test]
    fn test_circle_rect_overlap_either_order() {
        let c = Shape::circle(10.0);
        let r = Shape::rect(40.0, 20.0);
        // Circle hovering 8px above the top edge of the box
        let c_pos = Vec2::new(0.0, -18.0);
        assert!(overlaps(c_pos, c, Vec2::ZERO, r, 0.0));
        assert!(overlaps(Vec2::ZERO, r, c_pos, c, 0.0));
        // Near a corner but outside the radius
        assert!(!overlaps(Vec2::new(28.0, -18.0), c, Vec2::ZERO, r, 0.0));
    }

    #[test]
    fn test_negative_tolerance_widens_tap_target() {
        let target = Shape::circle(20.0);
        let tap = Vec2::new(24.0, 0.0);
        assert!(!contains_point(Vec2::ZERO, target, tap, 0.0));
        assert!(contains_point(Vec2::ZERO, target, tap, -6.0));
    }

    #[test]
    fn test_inset_never_goes_negative() {
        assert_eq!(Shape::circle(3.0).inset(10.0), Shape::circle(0.0));
        assert_eq!(
            Shape::rect(4.0, 40.0).inset(5.0),
            Shape::Rect {
                half: Vec2::new(0.0, 15.0)
            }
        );
    }
}
