//! C ABI for the wind simulation.
//!
//! Handles are opaque boxed pointers: `WindSimInstance` owns a running
//! simulation, `WindSimSource` a baked wind source. Every fallible call
//! returns a [`WindSimErrorCode`]; the message behind the last failure on the
//! calling thread is available from [`wind_sim_get_last_error`].
//!
//! The header `WindSimFFI.h` is generated by `build.rs`.

mod error;
mod helpers;
mod instance;
mod scene;
mod source;
mod validation;

pub use error::{wind_sim_get_last_error, wind_sim_get_last_error_code, WindSimErrorCode};
pub use instance::{
    wind_sim_add_density_source, wind_sim_add_velocity_source, wind_sim_build_for_scene,
    wind_sim_clear_sources, wind_sim_config_default, wind_sim_destroy, wind_sim_get_dimensions,
    wind_sim_max_speed, wind_sim_new, wind_sim_new_with_dims, wind_sim_paint, wind_sim_step,
    wind_sim_step_n, WindSimConfig, WindSimFieldKind, WindSimInstance,
};
pub use scene::{WindSimAabb, WindSimOccupancyCallback, WindSimRayCastCallback, WindSimRayHit};
pub use source::{
    wind_sim_bake, wind_sim_bake_config_default, wind_sim_bytes_free, wind_sim_source_destroy,
    wind_sim_source_evaluate, wind_sim_source_from_bytes, wind_sim_source_function_count,
    wind_sim_source_report, wind_sim_source_to_bytes, WindSimBakeConfig, WindSimBakeReport,
    WindSimSource,
};
pub use validation::{wind_sim_validate, WindSimValidation};
