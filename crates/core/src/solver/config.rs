//! Runtime options for stepping and visualizing the wind simulation.

use serde::{Deserialize, Serialize};

/// Which field [`crate::WindSimulation::paint`] renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VisualizationFieldKind {
    /// Density value per cell
    Density,
    /// Speed (velocity magnitude) per cell
    #[default]
    Velocity,
    /// 1.0 for solid cells, 0.0 for free cells
    Obstruction,
}

/// Options recognized by [`crate::WindSimulation::step`].
///
/// Passed explicitly on every call; the solver keeps no global settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindConfig {
    /// Advance the simulation at all. A paused simulation ignores `step`.
    pub run_enabled: bool,

    /// Multiplier applied to every `delta` while running
    pub run_speed: f32,

    pub density_diffusion_enabled: bool,
    pub density_advection_enabled: bool,
    pub velocity_diffusion_enabled: bool,
    pub velocity_advection_enabled: bool,

    pub visualization_field_kind: VisualizationFieldKind,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            run_enabled: true,
            run_speed: 1.0,
            density_diffusion_enabled: true,
            density_advection_enabled: true,
            velocity_diffusion_enabled: true,
            velocity_advection_enabled: true,
            visualization_field_kind: VisualizationFieldKind::Velocity,
        }
    }
}

impl WindConfig {
    /// Sources only: every diffusion and advection pass disabled
    #[must_use]
    pub fn sources_only() -> Self {
        Self {
            density_diffusion_enabled: false,
            density_advection_enabled: false,
            velocity_diffusion_enabled: false,
            velocity_advection_enabled: false,
            ..Self::default()
        }
    }
}

/// Physical coefficients owned by a simulation instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Density diffusion rate
    pub diffusion: f32,
    /// Kinematic viscosity applied to velocity diffusion
    pub viscosity: f32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            diffusion: 0.0001,
            viscosity: 0.0001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = WindConfig::default();
        assert!(config.run_enabled);
        assert_eq!(config.run_speed, 1.0);
        assert!(config.density_diffusion_enabled && config.velocity_advection_enabled);
    }

    #[test]
    fn test_sources_only_keeps_run_settings() {
        let config = WindConfig::sources_only();
        assert!(config.run_enabled);
        assert!(!config.density_diffusion_enabled);
        assert!(!config.density_advection_enabled);
        assert!(!config.velocity_diffusion_enabled);
        assert!(!config.velocity_advection_enabled);
    }
}
