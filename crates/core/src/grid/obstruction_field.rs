//! Static solid/free mask built from the scene.

use super::field::{Dim, Field};
use crate::core_types::{Aabb, Vec3};
use crate::oracle::Occupancy;

/// Boolean grid marking solid cells.
///
/// Built once per scene build through an [`Occupancy`] oracle and never touched
/// by stepping. Padding cells are queried too, so geometry just outside the
/// simulated volume still blocks flow at the faces.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstructionField {
    cells: Field<bool>,
    solid_count: usize,
}

impl ObstructionField {
    /// All-free mask
    #[must_use]
    pub fn empty(dim: Dim, cell_size: f32) -> Self {
        Self {
            cells: Field::new(dim, cell_size),
            solid_count: 0,
        }
    }

    /// Query `occupancy` for every padded cell.
    ///
    /// Padded cell `(i, j, k)` covers the world box starting at
    /// `origin + (index - 1) * cell_size` with edge length `cell_size`.
    #[must_use]
    pub fn build(dim: Dim, cell_size: f32, origin: Vec3, occupancy: &impl Occupancy) -> Self {
        let mut cells: Field<bool> = Field::new(dim, cell_size);
        let extent = Vec3::new(cell_size, cell_size, cell_size);
        let mut solid_count = 0;

        for k in 0..=dim.depth + 1 {
            for j in 0..=dim.height + 1 {
                for i in 0..=dim.width + 1 {
                    let min = origin + cells.cell_to_meters(i, j, k);
                    let solid = occupancy.is_solid(&Aabb::new(min, min + extent));
                    if solid {
                        cells.set(i, j, k, true);
                        solid_count += 1;
                    }
                }
            }
        }

        Self { cells, solid_count }
    }

    #[inline]
    #[must_use]
    pub fn is_obstructed(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells.get(x, y, z)
    }

    #[inline]
    #[must_use]
    pub fn is_obstructed_offset(&self, offset: usize) -> bool {
        self.cells.get_offset(offset)
    }

    /// Number of solid cells, padding included
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    #[must_use]
    pub fn any_solid(&self) -> bool {
        self.solid_count > 0
    }

    #[must_use]
    pub fn dim(&self) -> Dim {
        self.cells.dim()
    }

    #[must_use]
    pub fn as_field(&self) -> &Field<bool> {
        &self.cells
    }
}
