//! Boundary enforcement for padded fields.
//!
//! Every relaxation sweep reads the padding layer, so it has to be rewritten
//! from interior values after each pass:
//!
//! ```text
//! faces    f(0,j,k) = ±f(1,j,k)      (negated when the face normal matches the velocity axis)
//! edges    average of the 2 adjacent face cells
//! corners  average of the 3 adjacent boundary cells
//! ```
//!
//! Velocity components are additionally clamped next to solid cells so that no
//! flow crosses into or out of the obstruction grid.

use crate::grid::{Dim, Field, ObstructionField};
use serde::{Deserialize, Serialize};

/// What kind of quantity a field holds, which selects its boundary rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Scalars (density, pressure, divergence): plain copy at every face
    Density,
    /// X velocity component: reflected at the x faces
    VelX,
    /// Y velocity component: reflected at the y faces
    VelY,
    /// Z velocity component: reflected at the z faces
    VelZ,
}

impl EdgeKind {
    /// Velocity kind for `axis` (0 = x, 1 = y, 2 = z)
    #[must_use]
    pub fn velocity(axis: usize) -> Self {
        match axis {
            0 => EdgeKind::VelX,
            1 => EdgeKind::VelY,
            _ => EdgeKind::VelZ,
        }
    }

    /// Axis whose faces reflect this quantity, if any
    #[must_use]
    pub fn axis(&self) -> Option<usize> {
        match self {
            EdgeKind::Density => None,
            EdgeKind::VelX => Some(0),
            EdgeKind::VelY => Some(1),
            EdgeKind::VelZ => Some(2),
        }
    }

    #[inline]
    fn face_sign(&self, axis: usize) -> f32 {
        if self.axis() == Some(axis) {
            -1.0
        } else {
            1.0
        }
    }
}

/// Rewrite the padding layer of `field` and clamp flow at solid cells.
pub fn set_boundary(field: &mut Field<f32>, edge: EdgeKind, obstruction: &ObstructionField) {
    if let Some(axis) = edge.axis() {
        clamp_at_obstructions(field, axis, obstruction);
    }
    mirror_faces(field, edge);
    average_edges(field);
    average_corners(field);
}

/// Zero velocity inside solids and any component pointing into an adjacent solid.
fn clamp_at_obstructions(field: &mut Field<f32>, axis: usize, obstruction: &ObstructionField) {
    if !obstruction.any_solid() {
        return;
    }

    let Dim {
        width,
        height,
        depth,
    } = field.dim();
    let stride = field.stride(axis);

    for k in 1..=depth {
        for j in 1..=height {
            for i in 1..=width {
                let idx = field.offset(i, j, k);
                if obstruction.is_obstructed_offset(idx) {
                    field.set_offset(idx, 0.0);
                    continue;
                }

                let value = field.get_offset(idx);
                let into_ahead = value > 0.0 && obstruction.is_obstructed_offset(idx + stride);
                let into_behind = value < 0.0 && obstruction.is_obstructed_offset(idx - stride);
                if into_ahead || into_behind {
                    field.set_offset(idx, 0.0);
                }
            }
        }
    }
}

fn mirror_faces(field: &mut Field<f32>, edge: EdgeKind) {
    let Dim {
        width: w,
        height: h,
        depth: d,
    } = field.dim();

    let sx = edge.face_sign(0);
    for k in 1..=d {
        for j in 1..=h {
            field.set(0, j, k, sx * field.get(1, j, k));
            field.set(w + 1, j, k, sx * field.get(w, j, k));
        }
    }

    let sy = edge.face_sign(1);
    for k in 1..=d {
        for i in 1..=w {
            field.set(i, 0, k, sy * field.get(i, 1, k));
            field.set(i, h + 1, k, sy * field.get(i, h, k));
        }
    }

    let sz = edge.face_sign(2);
    for j in 1..=h {
        for i in 1..=w {
            field.set(i, j, 0, sz * field.get(i, j, 1));
            field.set(i, j, d + 1, sz * field.get(i, j, d));
        }
    }
}

fn average_edges(field: &mut Field<f32>) {
    let Dim {
        width: w,
        height: h,
        depth: d,
    } = field.dim();

    // (boundary index, adjacent interior index) on each axis
    let xs = [(0, 1), (w + 1, w)];
    let ys = [(0, 1), (h + 1, h)];
    let zs = [(0, 1), (d + 1, d)];

    // Edges running along x
    for i in 1..=w {
        for &(j, jn) in &ys {
            for &(k, kn) in &zs {
                let v = 0.5 * (field.get(i, jn, k) + field.get(i, j, kn));
                field.set(i, j, k, v);
            }
        }
    }

    // Edges running along y
    for j in 1..=h {
        for &(i, i_n) in &xs {
            for &(k, kn) in &zs {
                let v = 0.5 * (field.get(i_n, j, k) + field.get(i, j, kn));
                field.set(i, j, k, v);
            }
        }
    }

    // Edges running along z
    for k in 1..=d {
        for &(i, i_n) in &xs {
            for &(j, jn) in &ys {
                let v = 0.5 * (field.get(i_n, j, k) + field.get(i, jn, k));
                field.set(i, j, k, v);
            }
        }
    }
}

fn average_corners(field: &mut Field<f32>) {
    let Dim {
        width: w,
        height: h,
        depth: d,
    } = field.dim();

    for (i, i_n) in [(0, 1), (w + 1, w)] {
        for (j, jn) in [(0, 1), (h + 1, h)] {
            for (k, kn) in [(0, 1), (d + 1, d)] {
                let v = (field.get(i_n, j, k) + field.get(i, jn, k) + field.get(i, j, kn)) / 3.0;
                field.set(i, j, k, v);
            }
        }
    }
}
