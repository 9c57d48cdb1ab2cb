//! Axis-aligned boxes used for occupancy queries and ray tests.

use super::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its min and max corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a box from its centre and full extent.
    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Closed containment test (faces count as inside).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Open overlap test: boxes that only share a face do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Slab test against a ray.
    ///
    /// `direction` must be normalized. Returns the distance to the entry point,
    /// or 0 when the origin is already inside the box. Hits further than
    /// `max_distance` are ignored.
    ///
    /// Faces are open, matching [`Aabb::overlaps`]: a ray leaving the box from
    /// a point on its surface, or sliding along a face, does not hit it.
    #[must_use]
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // Parallel to this slab: must already lie within it
                if o <= lo || o >= hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        // Box lies behind the origin or is only touched on the way out
        if t_max <= 0.0 {
            return None;
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0))
    }

    #[test]
    fn test_contains_and_overlap() {
        let b = unit_box();
        assert!(b.contains(Vec3::new(1.5, 1.5, 1.5)));
        assert!(b.contains(Vec3::new(1.0, 2.0, 1.0)));
        assert!(!b.contains(Vec3::new(0.9, 1.5, 1.5)));

        let touching = Aabb::new(Vec3::new(2.0, 1.0, 1.0), Vec3::new(3.0, 2.0, 2.0));
        assert!(!b.overlaps(&touching), "Shared face is not an overlap");

        let inside = Aabb::from_center_size(Vec3::new(1.5, 1.5, 1.5), Vec3::new(0.2, 0.2, 0.2));
        assert!(b.overlaps(&inside));
    }

    #[test]
    fn test_ray_entry_distance() {
        let b = unit_box();
        let hit = b.ray_entry(Vec3::new(0.0, 1.5, 1.5), Vec3::new(1.0, 0.0, 0.0), 10.0);
        assert_eq!(hit, Some(1.0));

        // Too short to reach the box
        assert!(b
            .ray_entry(Vec3::new(0.0, 1.5, 1.5), Vec3::new(1.0, 0.0, 0.0), 0.5)
            .is_none());

        // Parallel ray outside the slab
        assert!(b
            .ray_entry(Vec3::new(0.0, 3.0, 1.5), Vec3::new(1.0, 0.0, 0.0), 10.0)
            .is_none());

        // Origin inside
        assert_eq!(
            b.ray_entry(Vec3::new(1.5, 1.5, 1.5), Vec3::new(0.0, 0.0, 1.0), 10.0),
            Some(0.0)
        );
    }

    #[test]
    fn test_ray_leaving_face_does_not_hit() {
        let b = unit_box();
        let on_face = Vec3::new(2.0, 1.5, 1.5);
        assert_eq!(b.ray_entry(on_face, Vec3::new(1.0, 0.0, 0.0), 1.0), None);
        assert_eq!(
            b.ray_entry(on_face, Vec3::new(-1.0, 0.0, 0.0), 1.0),
            Some(0.0),
            "Pointing back into the box is still a hit"
        );

        // Sliding along the top face
        let on_top = Vec3::new(0.0, 2.0, 1.5);
        assert_eq!(b.ray_entry(on_top, Vec3::new(1.0, 0.0, 0.0), 10.0), None);

        // Entry exactly at the end of the segment still counts
        assert_eq!(
            b.ray_entry(Vec3::new(0.0, 1.5, 1.5), Vec3::new(1.0, 0.0, 0.0), 1.0),
            Some(1.0)
        );
    }
}
