//! Stable-fluids wind solver
//!
//! [`WindSimulation`] owns the density, velocity and obstruction fields of one
//! simulated volume and advances them with the passes in [`stable_fluids`].
//! Boundary handling lives in [`boundary`]; stepping options in [`config`].
//!
//! # Example
//!
//! ```rust
//! use wind_sim_core::oracle::Unobstructed;
//! use wind_sim_core::solver::{WindConfig, WindSimulation};
//! use wind_sim_core::Vec3;
//!
//! let mut sim = WindSimulation::new(16.0, 8.0, 16.0, 1.0);
//! sim.build_for_scene(&Unobstructed, Vec3::zeros());
//! sim.add_velocity_source(2, 4, 8, Vec3::new(5.0, 0.0, 0.0));
//! sim.step(1.0 / 30.0, &WindConfig::default());
//! assert!(sim.max_speed() > 0.0);
//! ```

pub mod boundary;
pub mod config;
pub mod profiler;
mod simulation;
pub mod stable_fluids;

// Re-exports
pub use boundary::{set_boundary, EdgeKind};
pub use config::{SolverParams, VisualizationFieldKind, WindConfig};
pub use profiler::{FrameTimer, ProfilerScope};
pub use simulation::{FieldSnapshot, WindSimulation};
pub use stable_fluids::GAUSS_SEIDEL_STEPS;
