//! Velocity storage as three co-indexed scalar fields.

use super::field::{Dim, Field};
use crate::core_types::Vec3;

/// Scalar field holding density (or any other per-cell quantity).
pub type DensityField = Field<f32>;

/// Three co-indexed scalar components.
///
/// A vector value is assembled on read; the components are never stored packed,
/// which lets the solver diffuse and advect each axis independently.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pub x: Field<f32>,
    pub y: Field<f32>,
    pub z: Field<f32>,
}

impl VectorField {
    #[must_use]
    pub fn new(dim: Dim, cell_size: f32) -> Self {
        Self {
            x: Field::new(dim, cell_size),
            y: Field::new(dim, cell_size),
            z: Field::new(dim, cell_size),
        }
    }

    #[must_use]
    pub fn dim(&self) -> Dim {
        self.x.dim()
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.x.cell_size()
    }

    /// Component for `axis` (0 = x, 1 = y, 2 = z)
    #[must_use]
    pub fn component(&self, axis: usize) -> &Field<f32> {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    pub fn component_mut(&mut self, axis: usize) -> &mut Field<f32> {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Vec3 {
        let idx = self.x.offset(x, y, z);
        self.get_offset(idx)
    }

    #[inline]
    #[must_use]
    pub fn get_offset(&self, offset: usize) -> Vec3 {
        Vec3::new(
            self.x.get_offset(offset),
            self.y.get_offset(offset),
            self.z.get_offset(offset),
        )
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: Vec3) {
        let idx = self.x.offset(x, y, z);
        self.set_offset(idx, value);
    }

    #[inline]
    pub fn set_offset(&mut self, offset: usize, value: Vec3) {
        self.x.set_offset(offset, value.x);
        self.y.set_offset(offset, value.y);
        self.z.set_offset(offset, value.z);
    }

    pub fn fill(&mut self, value: Vec3) {
        self.x.fill(value.x);
        self.y.fill(value.y);
        self.z.fill(value.z);
    }

    /// Swap all three components of `a` and `b` in O(1)
    pub fn swap(a: &mut Self, b: &mut Self) {
        Field::swap(&mut a.x, &mut b.x);
        Field::swap(&mut a.y, &mut b.y);
        Field::swap(&mut a.z, &mut b.z);
    }

    /// Trilinear sample at an interior cell coordinate.
    ///
    /// `point` is expressed in interior cells: `(0, 0, 0)` is the first interior
    /// cell and `dim - 1` the last. Points outside `[0, dim-1]^3` return the zero
    /// vector rather than extrapolating.
    #[must_use]
    pub fn sample_near(&self, point: Vec3) -> Vec3 {
        let dim = self.dim();
        let inside = (0..3).all(|axis| {
            let p = point[axis];
            p.is_finite() && p >= 0.0 && p <= (dim.along(axis) - 1) as f32
        });
        if !inside {
            return Vec3::zeros();
        }

        // Interior cell t lives at padded index t + 1
        let (px, py, pz) = (point.x + 1.0, point.y + 1.0, point.z + 1.0);
        Vec3::new(
            self.x.interpolate(px, py, pz),
            self.y.interpolate(px, py, pz),
            self.z.interpolate(px, py, pz),
        )
    }

    /// Largest interior speed
    #[must_use]
    pub fn max_magnitude(&self) -> f32 {
        let dim = self.dim();
        let mut max: f32 = 0.0;
        for k in 1..=dim.depth {
            for j in 1..=dim.height {
                for i in 1..=dim.width {
                    max = max.max(self.get(i, j, k).norm());
                }
            }
        }
        max
    }
}
