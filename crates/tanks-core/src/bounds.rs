//! Axis-aligned bounding boxes and the oriented-box proximity test used for
//! tank/upgrade pickup checks.

use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Invariant: `w >= 0.0 && h >= 0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        debug_assert!(w >= 0.0 && h >= 0.0);
        Self { x, y, w, h }
    }

    /// Builds bounds centered on `center` with the given full width/height.
    pub fn centered(center: Vector2, w: f32, h: f32) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h)
    }

    pub fn center(self) -> Vector2 {
        Vector2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn min(self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn max(self) -> Vector2 {
        Vector2::new(self.x + self.w, self.y + self.h)
    }

    /// Broad-phase test: standard AABB overlap.
    pub fn overlaps(self, other: Bounds) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Expands the box by `radius` on every side — used to widen a query
    /// bounds for spatial-index candidate gathering.
    pub fn expanded(self, radius: f32) -> Self {
        Self::new(
            self.x - radius,
            self.y - radius,
            self.w + radius * 2.0,
            self.h + radius * 2.0,
        )
    }

    pub fn contains_point(self, p: Vector2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Oriented-box proximity test used for tank/upgrade pickup (§4.4): a cheap
/// center-to-center distance check against a combined radius, since tanks
/// never need true separating-axis rotation for this narrow phase — the
/// "radius" is derived from the tank's half collision width/height.
pub fn obb_proximity(a_center: Vector2, a_half_extent: f32, b_center: Vector2, b_radius: f32, pad: f32) -> bool {
    a_center.distance(b_center) <= a_half_extent + b_radius + pad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_detects_touching_boxes() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(b));
    }

    #[test]
    fn overlap_rejects_separated_boxes() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(20.0, 20.0, 10.0, 10.0);
        assert!(!a.overlaps(b));
    }

    #[test]
    fn expanded_grows_symmetrically() {
        let a = Bounds::new(10.0, 10.0, 10.0, 10.0);
        let b = a.expanded(5.0);
        assert_eq!(b.x, 5.0);
        assert_eq!(b.w, 20.0);
    }

    #[test]
    fn obb_proximity_respects_padding() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(30.0, 0.0);
        assert!(!obb_proximity(a, 10.0, b, 10.0, 5.0));
        assert!(obb_proximity(a, 10.0, b, 10.0, 15.0));
    }
}
