//! Wind Simulation Core Library
//!
//! A real-time 3D wind solver based on Stam's stable fluids, plus an
//! approximation stage that bakes the simulated velocity field into compact,
//! serializable wind functions.
//!
//! ## Pipeline
//!
//! - [`WindSimulation`] owns padded density, velocity and obstruction grids and
//!   advances them one fixed tick at a time
//! - [`bake()`] traces streamlines through a stabilized simulation and fits a
//!   spline to each one, producing a [`WindSource`]
//! - [`DeltaField`] compares a baked source against the simulation and reports
//!   error statistics
//!
//! The solver never talks to a physics engine directly: scene geometry arrives
//! through the [`Occupancy`] and [`RayCast`] oracles.

// Core types and utilities
pub mod core_types;
pub mod oracle;

// Simulation
pub mod grid;
pub mod solver;

// Baking and validation
pub mod bake;
pub mod validation;

// Re-export core types
pub use core_types::{Aabb, Vec3};
pub use oracle::{BoxObstacles, Occupancy, RayCast, RayHit, Unobstructed};

// Re-export simulation types
pub use grid::{DensityField, Dim, Field, ObstructionField, VectorField};
pub use solver::{
    EdgeKind, FieldSnapshot, SolverParams, VisualizationFieldKind, WindConfig, WindSimulation,
};

// Re-export bake and validation types
pub use bake::{
    bake, bake_with_report, BakeConfig, BakeReport, BaseFn, ConstantFn, SerializationError,
    SplineFn, VolumeType, WindSource,
};
pub use validation::{BoxPlot, DeltaField};
