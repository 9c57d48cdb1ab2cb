//! Per-cell difference between a baked source and the simulation it came from.

use super::statistics::BoxPlot;
use crate::bake::WindSource;
use crate::grid::VectorField;
use crate::solver::WindSimulation;
use tracing::debug;

/// `source.evaluate(cell) − V(cell)` over the whole padded grid.
///
/// Solid cells hold zero and are left out of every statistic; every free
/// cell, padding included, is counted. Padding cells below the origin lie
/// outside the source volume, so they compare the simulated flow against calm.
#[derive(Debug, Clone)]
pub struct DeltaField {
    delta: VectorField,
    /// Magnitudes of the free padded cells, in grid order
    magnitudes: Vec<f32>,
}

impl DeltaField {
    #[must_use]
    pub fn build(simulation: &WindSimulation, source: &WindSource) -> Self {
        let dim = simulation.dim();
        let obstruction = simulation.obstruction();
        let velocity = simulation.velocity();
        let mut delta = VectorField::new(dim, simulation.cell_size());
        let mut magnitudes = Vec::with_capacity(dim.padded_len());

        for k in 0..=dim.depth + 1 {
            for j in 0..=dim.height + 1 {
                for i in 0..=dim.width + 1 {
                    if obstruction.is_obstructed(i, j, k) {
                        continue;
                    }

                    let world = simulation.padded_cell_world_position(i, j, k);
                    let d = source.evaluate(world) - velocity.get(i, j, k);
                    delta.set(i, j, k, d);
                    magnitudes.push(d.norm());
                }
            }
        }

        debug!(
            "Delta field built over {} free cells ({} functions)",
            magnitudes.len(),
            source.len()
        );

        Self { delta, magnitudes }
    }

    #[must_use]
    pub fn delta(&self) -> &VectorField {
        &self.delta
    }

    /// Number of cells the statistics cover
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.magnitudes.len()
    }

    /// Distribution of delta magnitudes, `None` if every cell is solid
    #[must_use]
    pub fn box_plot(&self) -> Option<BoxPlot> {
        BoxPlot::from_values(self.magnitudes.clone())
    }

    /// Mean delta magnitude (0 when every cell is solid)
    #[must_use]
    pub fn error(&self) -> f32 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let total: f64 = self.magnitudes.iter().map(|&m| f64::from(m)).sum();
        (total / self.magnitudes.len() as f64) as f32
    }

    /// Largest delta magnitude
    #[must_use]
    pub fn max_error(&self) -> f32 {
        self.magnitudes.iter().copied().fold(0.0, f32::max)
    }
}
