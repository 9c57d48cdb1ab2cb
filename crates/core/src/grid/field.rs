//! Dense padded 3D storage shared by every simulation field.
//!
//! A field of interior size `width × height × depth` allocates
//! `(width+2) × (height+2) × (depth+2)` cells. Index `0` and `dim+1` on each
//! axis form the padding layer that boundary enforcement writes; physics
//! kernels only ever write the interior.
//!
//! Storage is a flattened array: `offset = x + (w+2) * (y + (h+2) * z)`.

use crate::core_types::Vec3;
use serde::{Deserialize, Serialize};

/// Interior cell counts of a simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dim {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dim {
    /// Create grid dimensions.
    ///
    /// # Panics
    ///
    /// Zero-sized dimensions are a programmer error and panic immediately.
    #[must_use]
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        assert!(
            width > 0 && height > 0 && depth > 0,
            "Grid dimensions must be non-zero, got {width}x{height}x{depth}"
        );
        Self {
            width,
            height,
            depth,
        }
    }

    /// Largest interior extent, used to scale diffusion and advection
    #[must_use]
    pub fn max_dim(&self) -> usize {
        self.width.max(self.height).max(self.depth)
    }

    /// Interior extent along `axis` (0 = x, 1 = y, 2 = z)
    #[must_use]
    pub fn along(&self, axis: usize) -> usize {
        match axis {
            0 => self.width,
            1 => self.height,
            _ => self.depth,
        }
    }

    /// Total number of cells including padding
    #[must_use]
    pub fn padded_len(&self) -> usize {
        (self.width + 2) * (self.height + 2) * (self.depth + 2)
    }

    /// Number of interior cells
    #[must_use]
    pub fn interior_len(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Interior extents as a vector (cells)
    #[must_use]
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(
            self.width as f32,
            self.height as f32,
            self.depth as f32,
        )
    }
}

/// Padded 3D grid of values with a physical cell size.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    data: Vec<T>,
    dim: Dim,
    cell_size: f32,
}

impl<T: Copy + Default> Field<T> {
    /// Create a field with every cell set to `T::default()`
    #[must_use]
    pub fn new(dim: Dim, cell_size: f32) -> Self {
        Self::with_value(dim, cell_size, T::default())
    }
}

impl<T: Copy> Field<T> {
    /// Create a field with every cell set to `value`
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not finite and positive.
    #[must_use]
    pub fn with_value(dim: Dim, cell_size: f32, value: T) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "Cell size must be finite and positive, got {cell_size}"
        );
        Self {
            data: vec![value; dim.padded_len()],
            dim,
            cell_size,
        }
    }

    #[must_use]
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Meters per cell
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Flat offset of padded cell `(x, y, z)`
    #[inline]
    #[must_use]
    pub fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(
            x <= self.dim.width + 1 && y <= self.dim.height + 1 && z <= self.dim.depth + 1,
            "Cell ({x}, {y}, {z}) outside padded grid {:?}",
            self.dim
        );
        x + (self.dim.width + 2) * (y + (self.dim.height + 2) * z)
    }

    /// Offset step between neighbours along `axis`
    #[inline]
    #[must_use]
    pub fn stride(&self, axis: usize) -> usize {
        match axis {
            0 => 1,
            1 => self.dim.width + 2,
            _ => (self.dim.width + 2) * (self.dim.height + 2),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.data[self.offset(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) {
        let idx = self.offset(x, y, z);
        self.data[idx] = value;
    }

    #[inline]
    #[must_use]
    pub fn get_offset(&self, offset: usize) -> T {
        self.data[offset]
    }

    #[inline]
    pub fn set_offset(&mut self, offset: usize, value: T) {
        self.data[offset] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Exchange the backing storage of two fields in O(1).
    ///
    /// Used for ping-pong buffering between the current and previous state.
    ///
    /// # Panics
    ///
    /// Panics if the two fields do not share dimensions and cell size.
    pub fn swap(a: &mut Self, b: &mut Self) {
        assert!(
            a.dim == b.dim && a.cell_size == b.cell_size,
            "Cannot swap fields of different shape: {:?} vs {:?}",
            a.dim,
            b.dim
        );
        std::mem::swap(&mut a.data, &mut b.data);
    }

    /// Position in meters (relative to the grid origin) of padded cell `(x, y, z)`.
    ///
    /// Interior cell `1` maps to `0.0`; the padding layer lies one cell outside.
    #[must_use]
    pub fn cell_to_meters(&self, x: usize, y: usize, z: usize) -> Vec3 {
        Vec3::new(
            (x as f32 - 1.0) * self.cell_size,
            (y as f32 - 1.0) * self.cell_size,
            (z as f32 - 1.0) * self.cell_size,
        )
    }

    /// Fractional padded cell coordinate of a position in meters (relative to the grid origin).
    #[must_use]
    pub fn meters_to_cell(&self, position: Vec3) -> Vec3 {
        position / self.cell_size + Vec3::new(1.0, 1.0, 1.0)
    }
}

impl Field<f32> {
    /// Trilinear interpolation at a fractional padded coordinate.
    ///
    /// Coordinates are clamped into `[0, dim+1]` so reads never leave the buffer.
    #[must_use]
    pub fn interpolate(&self, x: f32, y: f32, z: f32) -> f32 {
        let max_x = (self.dim.width + 1) as f32;
        let max_y = (self.dim.height + 1) as f32;
        let max_z = (self.dim.depth + 1) as f32;
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let z = z.clamp(0.0, max_z);

        let i0 = x.floor() as usize;
        let j0 = y.floor() as usize;
        let k0 = z.floor() as usize;
        let i1 = (i0 + 1).min(self.dim.width + 1);
        let j1 = (j0 + 1).min(self.dim.height + 1);
        let k1 = (k0 + 1).min(self.dim.depth + 1);

        let s1 = x - i0 as f32;
        let s0 = 1.0 - s1;
        let t1 = y - j0 as f32;
        let t0 = 1.0 - t1;
        let u1 = z - k0 as f32;
        let u0 = 1.0 - u1;

        s0 * (t0 * (u0 * self.get(i0, j0, k0) + u1 * self.get(i0, j0, k1))
            + t1 * (u0 * self.get(i0, j1, k0) + u1 * self.get(i0, j1, k1)))
            + s1 * (t0 * (u0 * self.get(i1, j0, k0) + u1 * self.get(i1, j0, k1))
                + t1 * (u0 * self.get(i1, j1, k0) + u1 * self.get(i1, j1, k1)))
    }

    /// Sum of all interior values
    #[must_use]
    pub fn interior_sum(&self) -> f32 {
        let mut total = 0.0;
        for k in 1..=self.dim.depth {
            for j in 1..=self.dim.height {
                for i in 1..=self.dim.width {
                    total += self.get(i, j, k);
                }
            }
        }
        total
    }
}
