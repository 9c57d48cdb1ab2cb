//! Real-time 3D wind simulation.
//!
//! Owns every field of one simulated volume and advances them with the
//! stable-fluids passes in [`super::stable_fluids`]. The host scheduler calls
//! [`WindSimulation::step`] once per fixed tick; the baker and the validation
//! stage only read from it.
//!
//! Lifecycle:
//!
//! ```text
//! new / with_dim  →  build_for_scene  →  step …  →  (bake, validate)  →  drop
//! ```

use super::boundary::{set_boundary, EdgeKind};
use super::config::{SolverParams, VisualizationFieldKind, WindConfig};
use super::profiler::{FrameTimer, ProfilerScope};
use super::stable_fluids::{advect, diffuse, divergence_rms, project};
use crate::core_types::{Aabb, Vec3};
use crate::grid::{DensityField, Dim, Field, ObstructionField, VectorField};
use crate::oracle::Occupancy;
use tracing::{debug, info, warn};

/// Flat render of one field kind over the interior cells.
///
/// Values are ordered x-fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub kind: VisualizationFieldKind,
    pub dim: Dim,
    pub values: Vec<f32>,
}

impl FieldSnapshot {
    /// Value at interior cell `(x, y, z)`, zero-based
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[x + self.dim.width * (y + self.dim.height * z)]
    }
}

/// Stable-fluids wind solver over a padded 3D grid
#[derive(Debug, Clone)]
pub struct WindSimulation {
    /// Current density (D)
    density: DensityField,
    /// Density source rates, reused as the previous buffer during stepping (D0)
    density_prev: DensityField,
    /// Current velocity (V)
    velocity: VectorField,
    /// Velocity source rates, reused as the previous buffer during stepping (V0)
    velocity_prev: VectorField,
    /// Solid cells (O)
    obstruction: ObstructionField,

    /// Projection scratch, kept apart so it never clobbers the source buffers
    pressure: Field<f32>,
    divergence: Field<f32>,

    params: SolverParams,

    /// World position of interior cell (0, 0, 0), set by the last scene build
    origin: Vec3,

    dim: Dim,
    cell_size: f32,

    steps_taken: u64,
    simulated_time: f32,
    frame_timer: FrameTimer,
}

impl WindSimulation {
    /// Create a simulation covering `width × height × depth` meters.
    ///
    /// Cell counts are `round(dimension / cell_size)` per axis.
    ///
    /// # Panics
    ///
    /// Panics if any axis rounds to zero cells or `cell_size` is not positive.
    #[must_use]
    pub fn new(width: f32, height: f32, depth: f32, cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "Cell size must be finite and positive, got {cell_size}"
        );
        let cells = |meters: f32| (meters / cell_size).round().max(0.0) as usize;
        Self::with_dim(Dim::new(cells(width), cells(height), cells(depth)), cell_size)
    }

    /// Create a simulation with explicit interior cell counts.
    #[must_use]
    pub fn with_dim(dim: Dim, cell_size: f32) -> Self {
        let sim = Self {
            density: Field::new(dim, cell_size),
            density_prev: Field::new(dim, cell_size),
            velocity: VectorField::new(dim, cell_size),
            velocity_prev: VectorField::new(dim, cell_size),
            obstruction: ObstructionField::empty(dim, cell_size),
            pressure: Field::new(dim, cell_size),
            divergence: Field::new(dim, cell_size),
            params: SolverParams::default(),
            origin: Vec3::zeros(),
            dim,
            cell_size,
            steps_taken: 0,
            simulated_time: 0.0,
            frame_timer: FrameTimer::new(),
        };

        info!(
            "Wind simulation created: {}x{}x{} cells, cell_size={:.2}m",
            dim.width, dim.height, dim.depth, cell_size
        );

        sim
    }

    /// Builder-style override of the physical coefficients
    #[must_use]
    pub fn with_params(mut self, params: SolverParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn params(&self) -> SolverParams {
        self.params
    }

    pub fn set_params(&mut self, params: SolverParams) {
        self.params = params;
    }

    #[must_use]
    pub fn dim(&self) -> Dim {
        self.dim
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the first interior cell
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// World-space box spanned by the interior cells
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            self.origin,
            self.origin + self.dim.as_vec3() * self.cell_size,
        )
    }

    #[must_use]
    pub fn density(&self) -> &DensityField {
        &self.density
    }

    pub fn density_mut(&mut self) -> &mut DensityField {
        &mut self.density
    }

    /// Density source-rate buffer (D0)
    #[must_use]
    pub fn density_sources(&self) -> &DensityField {
        &self.density_prev
    }

    pub fn density_sources_mut(&mut self) -> &mut DensityField {
        &mut self.density_prev
    }

    #[must_use]
    pub fn velocity(&self) -> &VectorField {
        &self.velocity
    }

    pub fn velocity_mut(&mut self) -> &mut VectorField {
        &mut self.velocity
    }

    /// Velocity source-rate buffer (V0)
    #[must_use]
    pub fn velocity_sources(&self) -> &VectorField {
        &self.velocity_prev
    }

    pub fn velocity_sources_mut(&mut self) -> &mut VectorField {
        &mut self.velocity_prev
    }

    #[must_use]
    pub fn obstruction(&self) -> &ObstructionField {
        &self.obstruction
    }

    #[must_use]
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Simulated seconds, after run-speed scaling
    #[must_use]
    pub fn simulated_time(&self) -> f32 {
        self.simulated_time
    }

    /// Wall-clock cost of the last tick in milliseconds
    #[must_use]
    pub fn last_step_ms(&self) -> f64 {
        self.frame_timer.last_frame_time_ms()
    }

    /// Timing statistics over every step taken
    pub fn step_timing(&self) -> FrameTimer {
        self.frame_timer
    }

    /// Add `rate` to the density source of padded cell `(x, y, z)`
    pub fn add_density_source(&mut self, x: usize, y: usize, z: usize, rate: f32) {
        let current = self.density_prev.get(x, y, z);
        self.density_prev.set(x, y, z, current + rate);
    }

    /// Add `force` to the velocity source of padded cell `(x, y, z)`
    pub fn add_velocity_source(&mut self, x: usize, y: usize, z: usize, force: Vec3) {
        let current = self.velocity_prev.get(x, y, z);
        self.velocity_prev.set(x, y, z, current + force);
    }

    /// Zero both source buffers
    pub fn clear_sources(&mut self) {
        self.density_prev.fill(0.0);
        self.velocity_prev.fill(Vec3::zeros());
    }

    /// Populate the obstruction grid from the scene and re-mirror boundaries.
    ///
    /// `origin` is the world position of the first interior cell. Safe to call
    /// again at any time to rebuild after the scene changes.
    pub fn build_for_scene(&mut self, occupancy: &impl Occupancy, origin: Vec3) {
        let _scope = ProfilerScope::new("build_for_scene");
        self.origin = origin;
        self.obstruction = ObstructionField::build(self.dim, self.cell_size, origin, occupancy);
        self.enforce_boundaries();

        info!(
            "Obstruction grid built: {} solid cells, origin=({:.2}, {:.2}, {:.2})",
            self.obstruction.solid_count(),
            origin.x,
            origin.y,
            origin.z
        );
    }

    /// Apply the boundary rule to every density and velocity buffer
    pub fn enforce_boundaries(&mut self) {
        let obstruction = &self.obstruction;
        set_boundary(&mut self.density, EdgeKind::Density, obstruction);
        for axis in 0..3 {
            let edge = EdgeKind::velocity(axis);
            set_boundary(self.velocity.component_mut(axis), edge, obstruction);
        }
    }

    /// Advance one tick.
    ///
    /// Paused simulations (`run_enabled == false`) ignore the call. Otherwise
    /// `delta` is scaled by `run_speed` and density then velocity are stepped.
    /// A negative or non-finite `delta` asserts in debug builds. Whatever the
    /// cause, a scaled delta that is negative or non-finite is clamped to zero
    /// with a warning, so a bad `run_speed` never reaches the solver.
    pub fn step(&mut self, delta: f32, config: &WindConfig) {
        debug_assert!(delta >= 0.0, "Step delta must be non-negative, got {delta}");
        if !config.run_enabled {
            return;
        }

        let scaled = delta * config.run_speed;
        let delta = if scaled.is_finite() && scaled >= 0.0 {
            scaled
        } else {
            warn!(
                "Ignoring invalid step delta {} (delta {} at run speed {}), using 0",
                scaled, delta, config.run_speed
            );
            0.0
        };

        let scope = ProfilerScope::new("wind_step");

        self.step_density(delta, config);
        self.step_velocity(delta, config);

        self.steps_taken += 1;
        self.simulated_time += delta;
        self.frame_timer.record(scope.elapsed_ms());

        debug!(
            "Wind step {}: t={:.3}s, dt={:.4}s, took {:.3}ms",
            self.steps_taken,
            self.simulated_time,
            delta,
            self.frame_timer.last_frame_time_ms()
        );
    }

    /// Advance `steps` ticks of `delta` each
    pub fn step_n(&mut self, delta: f32, steps: usize, config: &WindConfig) {
        for _ in 0..steps {
            self.step(delta, config);
        }
    }

    /// Density pass: source integration, then optional diffusion and advection
    pub fn step_density(&mut self, delta: f32, config: &WindConfig) {
        add_source(&mut self.density, &self.density_prev, delta);

        if config.density_diffusion_enabled {
            Field::swap(&mut self.density, &mut self.density_prev);
            diffuse(
                &mut self.density,
                &self.density_prev,
                EdgeKind::Density,
                self.params.diffusion,
                delta,
                &self.obstruction,
            );
        }

        if config.density_advection_enabled {
            Field::swap(&mut self.density, &mut self.density_prev);
            advect(
                &mut self.density,
                &self.density_prev,
                &self.velocity,
                EdgeKind::Density,
                delta,
                &self.obstruction,
            );
        }
    }

    /// Velocity pass: source integration, optional diffusion + projection,
    /// optional self-advection + projection
    pub fn step_velocity(&mut self, delta: f32, config: &WindConfig) {
        for axis in 0..3 {
            add_source(
                self.velocity.component_mut(axis),
                self.velocity_prev.component(axis),
                delta,
            );
        }

        if config.velocity_diffusion_enabled {
            VectorField::swap(&mut self.velocity, &mut self.velocity_prev);
            for axis in 0..3 {
                diffuse(
                    self.velocity.component_mut(axis),
                    self.velocity_prev.component(axis),
                    EdgeKind::velocity(axis),
                    self.params.viscosity,
                    delta,
                    &self.obstruction,
                );
            }
            project(
                &mut self.velocity,
                &mut self.pressure,
                &mut self.divergence,
                &self.obstruction,
            );
        }

        if config.velocity_advection_enabled {
            VectorField::swap(&mut self.velocity, &mut self.velocity_prev);
            for axis in 0..3 {
                advect(
                    self.velocity.component_mut(axis),
                    self.velocity_prev.component(axis),
                    &self.velocity_prev,
                    EdgeKind::velocity(axis),
                    delta,
                    &self.obstruction,
                );
            }
            project(
                &mut self.velocity,
                &mut self.pressure,
                &mut self.divergence,
                &self.obstruction,
            );
        }
    }

    /// Trilinear velocity sample at an interior cell coordinate (zero outside)
    #[must_use]
    pub fn sample_near(&self, point: Vec3) -> Vec3 {
        self.velocity.sample_near(point)
    }

    /// Convert a world position to interior cell coordinates
    #[must_use]
    pub fn world_to_cell(&self, world: Vec3) -> Vec3 {
        (world - self.origin) / self.cell_size
    }

    /// Convert interior cell coordinates to a world position
    #[must_use]
    pub fn cell_to_world(&self, cell: Vec3) -> Vec3 {
        self.origin + cell * self.cell_size
    }

    /// World position of padded cell `(x, y, z)`
    #[must_use]
    pub fn padded_cell_world_position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        self.origin + self.density.cell_to_meters(x, y, z)
    }

    /// Render the field selected by `config.visualization_field_kind`
    #[must_use]
    pub fn paint(&self, config: &WindConfig) -> FieldSnapshot {
        let kind = config.visualization_field_kind;
        let dim = self.dim;
        let mut values = Vec::with_capacity(dim.interior_len());

        for k in 1..=dim.depth {
            for j in 1..=dim.height {
                for i in 1..=dim.width {
                    let value = match kind {
                        VisualizationFieldKind::Density => self.density.get(i, j, k),
                        VisualizationFieldKind::Velocity => self.velocity.get(i, j, k).norm(),
                        VisualizationFieldKind::Obstruction => {
                            if self.obstruction.is_obstructed(i, j, k) {
                                1.0
                            } else {
                                0.0
                            }
                        }
                    };
                    values.push(value);
                }
            }
        }

        FieldSnapshot { kind, dim, values }
    }

    /// Sum of interior density
    #[must_use]
    pub fn total_density(&self) -> f32 {
        self.density.interior_sum()
    }

    /// Largest interior wind speed
    #[must_use]
    pub fn max_speed(&self) -> f32 {
        self.velocity.max_magnitude()
    }

    /// RMS divergence of the current velocity, in grid units
    #[must_use]
    pub fn divergence_rms(&self) -> f32 {
        divergence_rms(&self.velocity)
    }
}

/// `f[i] += delta * source[i]` over every cell, padding included
fn add_source(field: &mut Field<f32>, source: &Field<f32>, delta: f32) {
    for (value, rate) in field.as_mut_slice().iter_mut().zip(source.as_slice()) {
        *value += delta * rate;
    }
}
