use std::os::raw::c_void;
use std::ptr;
use std::sync::RwLock;

use tracing::warn;
use wind_sim_core::{Dim, Vec3, VisualizationFieldKind, WindConfig, WindSimulation};

use crate::error::{DefaultWindSimError, WindSimErrorCode};
use crate::helpers::{finish, read_lock, ref_from_ptr, track_error, track_result, write_lock};
use crate::scene::{CallbackOccupancy, WindSimOccupancyCallback};

/// Field rendered by `wind_sim_paint`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSimFieldKind {
    Density = 0,
    Velocity = 1,
    Obstruction = 2,
}

impl From<WindSimFieldKind> for VisualizationFieldKind {
    fn from(kind: WindSimFieldKind) -> Self {
        match kind {
            WindSimFieldKind::Density => VisualizationFieldKind::Density,
            WindSimFieldKind::Velocity => VisualizationFieldKind::Velocity,
            WindSimFieldKind::Obstruction => VisualizationFieldKind::Obstruction,
        }
    }
}

/// C layout of the stepping options. Obtain defaults from
/// `wind_sim_config_default` and override what you need.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSimConfig {
    pub run_enabled: bool,
    pub run_speed: f32,
    pub density_diffusion_enabled: bool,
    pub density_advection_enabled: bool,
    pub velocity_diffusion_enabled: bool,
    pub velocity_advection_enabled: bool,
    pub visualization_field_kind: WindSimFieldKind,
}

impl From<&WindSimConfig> for WindConfig {
    fn from(config: &WindSimConfig) -> Self {
        Self {
            run_enabled: config.run_enabled,
            run_speed: config.run_speed,
            density_diffusion_enabled: config.density_diffusion_enabled,
            density_advection_enabled: config.density_advection_enabled,
            velocity_diffusion_enabled: config.velocity_diffusion_enabled,
            velocity_advection_enabled: config.velocity_advection_enabled,
            visualization_field_kind: config.visualization_field_kind.into(),
        }
    }
}

/// Default stepping options: running at speed 1.0 with every pass enabled.
#[no_mangle]
pub extern "C" fn wind_sim_config_default() -> WindSimConfig {
    WindSimConfig {
        run_enabled: true,
        run_speed: 1.0,
        density_diffusion_enabled: true,
        density_advection_enabled: true,
        velocity_diffusion_enabled: true,
        velocity_advection_enabled: true,
        visualization_field_kind: WindSimFieldKind::Velocity,
    }
}

/// Opaque wind simulation handle.
///
/// # Thread Safety
/// The simulation sits behind an `RwLock`: stepping, scene builds and source
/// painting take the write lock; baking, painting snapshots and validation
/// share the read lock. A bake therefore never observes a half-finished step.
pub struct WindSimInstance {
    pub(crate) sim: RwLock<WindSimulation>,
}

impl WindSimInstance {
    pub(crate) fn new(
        width: f32,
        height: f32,
        depth: f32,
        cell_size: f32,
    ) -> Result<Box<Self>, DefaultWindSimError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(DefaultWindSimError::invalid_dimension("cell_size", cell_size));
        }
        for (name, meters) in [("width", width), ("height", height), ("depth", depth)] {
            let cells = meters / cell_size;
            if !cells.is_finite() || cells.round() < 1.0 {
                return Err(DefaultWindSimError::invalid_dimension_msg(
                    name,
                    &format!("{meters}m at cell size {cell_size}m yields no cells"),
                ));
            }
        }

        Ok(Box::new(Self {
            sim: RwLock::new(WindSimulation::new(width, height, depth, cell_size)),
        }))
    }

    pub(crate) fn with_dim(
        width: usize,
        height: usize,
        depth: usize,
        cell_size: f32,
    ) -> Result<Box<Self>, DefaultWindSimError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(DefaultWindSimError::invalid_dimension("cell_size", cell_size));
        }
        if width == 0 || height == 0 || depth == 0 {
            return Err(DefaultWindSimError::invalid_dimension_msg(
                "dimensions",
                &format!("must be non-zero, got {width}x{height}x{depth}"),
            ));
        }

        Ok(Box::new(Self {
            sim: RwLock::new(WindSimulation::with_dim(
                Dim::new(width, height, depth),
                cell_size,
            )),
        }))
    }
}

/// # Safety
/// `out_instance` must be non-null and writable.
unsafe fn publish(
    result: Result<Box<WindSimInstance>, DefaultWindSimError>,
    out_instance: *mut *mut WindSimInstance,
) -> WindSimErrorCode {
    match track_result(result) {
        Ok(instance) => {
            unsafe { *out_instance = Box::into_raw(instance) };
            WindSimErrorCode::Ok
        }
        Err(code) => {
            // Set to null on error (per documentation contract)
            unsafe { *out_instance = ptr::null_mut() };
            code
        }
    }
}

/// Run `func` against the simulation under the read lock.
///
/// # Safety
/// `instance` must be null or point to a live `WindSimInstance`.
pub(crate) unsafe fn with_sim_read<F, T>(
    instance: *const WindSimInstance,
    func: F,
) -> Result<T, DefaultWindSimError>
where
    F: FnOnce(&WindSimulation) -> Result<T, DefaultWindSimError>,
{
    let instance = unsafe { ref_from_ptr(instance, "instance") }?;
    let sim = read_lock(&instance.sim, "simulation")?;
    func(&sim)
}

/// Run `func` against the simulation under the write lock.
///
/// # Safety
/// `instance` must be null or point to a live `WindSimInstance`.
pub(crate) unsafe fn with_sim_write<F, T>(
    instance: *const WindSimInstance,
    func: F,
) -> Result<T, DefaultWindSimError>
where
    F: FnOnce(&mut WindSimulation) -> Result<T, DefaultWindSimError>,
{
    let instance = unsafe { ref_from_ptr(instance, "instance") }?;
    let mut sim = write_lock(&instance.sim, "simulation")?;
    func(&mut sim)
}

/// Create a simulation covering `width × height × depth` meters.
///
/// Cell counts are `round(size / cell_size)` per axis.
///
/// Returns
/// - `Ok` with a valid instance in `out_instance`
/// - `NullPointer` if `out_instance` is null
/// - `InvalidDimensions` if the cell size is not positive or an axis has no cells
///
/// # Safety
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the instance and MUST call `wind_sim_destroy` exactly once.
///
/// Example (C)
/// ```c
/// WindSimInstance* sim = NULL;
/// if (wind_sim_new(64.0f, 16.0f, 64.0f, 1.0f, &sim) != Ok) {
///     fprintf(stderr, "%s\n", wind_sim_get_last_error());
///     return;
/// }
/// WindSimConfig config = wind_sim_config_default();
/// wind_sim_step(sim, 1.0f / 30.0f, &config);
/// wind_sim_destroy(sim);
/// ```
#[no_mangle]
pub unsafe extern "C" fn wind_sim_new(
    width: f32,
    height: f32,
    depth: f32,
    cell_size: f32,
    out_instance: *mut *mut WindSimInstance,
) -> WindSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_instance"));
    }
    unsafe { publish(WindSimInstance::new(width, height, depth, cell_size), out_instance) }
}

/// Create a simulation with explicit interior cell counts.
///
/// # Safety
/// Same contract as `wind_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_new_with_dims(
    width: usize,
    height: usize,
    depth: usize,
    cell_size: f32,
    out_instance: *mut *mut WindSimInstance,
) -> WindSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_instance"));
    }
    unsafe {
        publish(
            WindSimInstance::with_dim(width, height, depth, cell_size),
            out_instance,
        )
    }
}

/// Destroy an instance created by `wind_sim_new` or `wind_sim_new_with_dims`.
///
/// Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by this library and not freed already.
/// - The caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_destroy(ptr: *mut WindSimInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `publish` and not yet freed
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Interior cell counts of the simulation.
///
/// # Safety
/// `instance` must be live; the out pointers must be writable.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_get_dimensions(
    instance: *const WindSimInstance,
    out_width: *mut usize,
    out_height: *mut usize,
    out_depth: *mut usize,
) -> WindSimErrorCode {
    if out_width.is_null() || out_height.is_null() || out_depth.is_null() {
        return track_error(&DefaultWindSimError::null_pointer(
            "out_width/out_height/out_depth",
        ));
    }
    finish(unsafe {
        with_sim_read(instance, |sim| {
            let dim = sim.dim();
            *out_width = dim.width;
            *out_height = dim.height;
            *out_depth = dim.depth;
            Ok(())
        })
    })
}

/// Rebuild the obstruction grid from a host occupancy callback.
///
/// `origin_*` is the world position of the first interior cell. A null
/// `callback` builds an empty scene.
///
/// # Safety
/// - `instance` must be live.
/// - `callback`, when non-null, must be safe to call with `user_data` for the
///   duration of this call.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_build_for_scene(
    instance: *const WindSimInstance,
    callback: WindSimOccupancyCallback,
    user_data: *mut c_void,
    origin_x: f32,
    origin_y: f32,
    origin_z: f32,
) -> WindSimErrorCode {
    if callback.is_none() {
        warn!("No occupancy callback supplied, building an unobstructed scene");
    }
    let occupancy = CallbackOccupancy {
        callback,
        user_data,
    };
    finish(unsafe {
        with_sim_write(instance, |sim| {
            sim.build_for_scene(&occupancy, Vec3::new(origin_x, origin_y, origin_z));
            Ok(())
        })
    })
}

/// # Safety
/// `config` must be null or point to a live `WindSimConfig`.
unsafe fn config_from_ptr(config: *const WindSimConfig) -> WindConfig {
    match unsafe { config.as_ref() } {
        Some(config) => config.into(),
        None => WindConfig::default(),
    }
}

fn validate_delta(delta: f32, config: &WindConfig) -> Result<(), DefaultWindSimError> {
    if !(delta.is_finite() && delta >= 0.0) {
        return Err(DefaultWindSimError::invalid_parameter(format!(
            "Step delta must be finite and non-negative, got {delta}"
        )));
    }
    let run_speed = config.run_speed;
    if !(run_speed.is_finite() && run_speed >= 0.0) {
        return Err(DefaultWindSimError::invalid_parameter(format!(
            "Run speed must be finite and non-negative, got {run_speed}"
        )));
    }
    Ok(())
}

/// Advance one tick. A null `config` uses `wind_sim_config_default()`.
///
/// # Safety
/// `instance` must be live; `config` must be null or point to a valid config.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_step(
    instance: *const WindSimInstance,
    delta: f32,
    config: *const WindSimConfig,
) -> WindSimErrorCode {
    let config = unsafe { config_from_ptr(config) };
    finish(unsafe {
        with_sim_write(instance, |sim| {
            validate_delta(delta, &config)?;
            sim.step(delta, &config);
            Ok(())
        })
    })
}

/// Advance `steps` ticks of `delta` each.
///
/// # Safety
/// Same contract as `wind_sim_step`.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_step_n(
    instance: *const WindSimInstance,
    delta: f32,
    steps: usize,
    config: *const WindSimConfig,
) -> WindSimErrorCode {
    let config = unsafe { config_from_ptr(config) };
    finish(unsafe {
        with_sim_write(instance, |sim| {
            validate_delta(delta, &config)?;
            sim.step_n(delta, steps, &config);
            Ok(())
        })
    })
}

fn check_cell(sim: &WindSimulation, x: usize, y: usize, z: usize) -> Result<(), DefaultWindSimError> {
    let dim = sim.dim();
    if x > dim.width + 1 || y > dim.height + 1 || z > dim.depth + 1 {
        return Err(DefaultWindSimError::cell_out_of_range(x, y, z));
    }
    Ok(())
}

/// Add `rate` to the density source of padded cell `(x, y, z)`.
///
/// # Safety
/// `instance` must be live.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_add_density_source(
    instance: *const WindSimInstance,
    x: usize,
    y: usize,
    z: usize,
    rate: f32,
) -> WindSimErrorCode {
    finish(unsafe {
        with_sim_write(instance, |sim| {
            check_cell(sim, x, y, z)?;
            sim.add_density_source(x, y, z, rate);
            Ok(())
        })
    })
}

/// Add `(fx, fy, fz)` to the velocity source of padded cell `(x, y, z)`.
///
/// # Safety
/// `instance` must be live.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_add_velocity_source(
    instance: *const WindSimInstance,
    x: usize,
    y: usize,
    z: usize,
    fx: f32,
    fy: f32,
    fz: f32,
) -> WindSimErrorCode {
    finish(unsafe {
        with_sim_write(instance, |sim| {
            check_cell(sim, x, y, z)?;
            sim.add_velocity_source(x, y, z, Vec3::new(fx, fy, fz));
            Ok(())
        })
    })
}

/// Zero both source buffers.
///
/// # Safety
/// `instance` must be live.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_clear_sources(instance: *const WindSimInstance) -> WindSimErrorCode {
    finish(unsafe {
        with_sim_write(instance, |sim| {
            sim.clear_sources();
            Ok(())
        })
    })
}

/// Copy the field selected by `config.visualization_field_kind` into
/// `out_values`, x-fastest over the interior cells.
///
/// `capacity` must be at least `width * height * depth`.
///
/// # Safety
/// - `instance` must be live; `config` null or valid.
/// - `out_values` must point to `capacity` writable floats.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_paint(
    instance: *const WindSimInstance,
    config: *const WindSimConfig,
    out_values: *mut f32,
    capacity: usize,
) -> WindSimErrorCode {
    if out_values.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_values"));
    }
    let config = unsafe { config_from_ptr(config) };
    finish(unsafe {
        with_sim_read(instance, |sim| {
            let snapshot = sim.paint(&config);
            if capacity < snapshot.values.len() {
                return Err(DefaultWindSimError::invalid_parameter(format!(
                    "Paint buffer holds {capacity} values, {} required",
                    snapshot.values.len()
                )));
            }
            ptr::copy_nonoverlapping(snapshot.values.as_ptr(), out_values, snapshot.values.len());
            Ok(())
        })
    })
}

/// Largest interior wind speed, or 0 on error.
///
/// # Safety
/// `instance` must be live or null.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_max_speed(instance: *const WindSimInstance) -> f32 {
    let result = unsafe { with_sim_read(instance, |sim| Ok(sim.max_speed())) };
    track_result(result).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{wind_sim_get_last_error, wind_sim_get_last_error_code};

    fn create(width: f32, cell_size: f32) -> (WindSimErrorCode, *mut WindSimInstance) {
        let mut instance = ptr::null_mut();
        let code = unsafe { wind_sim_new(width, 8.0, 8.0, cell_size, &mut instance) };
        (code, instance)
    }

    #[test]
    fn test_create_step_destroy() {
        let (code, instance) = create(8.0, 1.0);
        assert_eq!(code, WindSimErrorCode::Ok);
        assert!(!instance.is_null());

        unsafe {
            assert_eq!(
                wind_sim_add_velocity_source(instance, 4, 4, 4, 2.0, 0.0, 0.0),
                WindSimErrorCode::Ok
            );
            assert_eq!(wind_sim_step_n(instance, 0.1, 3, ptr::null()), WindSimErrorCode::Ok);
            assert!(wind_sim_max_speed(instance) > 0.0);

            let mut values = vec![0.0_f32; 8 * 8 * 8];
            let config = wind_sim_config_default();
            assert_eq!(
                wind_sim_paint(instance, &config, values.as_mut_ptr(), values.len()),
                WindSimErrorCode::Ok
            );
            assert!(values.iter().any(|&v| v > 0.0));

            wind_sim_destroy(instance);
        }
    }

    #[test]
    fn test_invalid_dimensions_reported() {
        let (code, instance) = create(0.2, 1.0);
        assert_eq!(code, WindSimErrorCode::InvalidDimensions);
        assert!(instance.is_null());
        assert_eq!(wind_sim_get_last_error_code(), WindSimErrorCode::InvalidDimensions);
        assert!(!wind_sim_get_last_error().is_null());

        let (code, _) = create(8.0, -1.0);
        assert_eq!(code, WindSimErrorCode::InvalidDimensions);
    }

    #[test]
    fn test_argument_validation() {
        let (_, instance) = create(4.0, 1.0);
        unsafe {
            assert_eq!(
                wind_sim_add_density_source(instance, 6, 1, 1, 1.0),
                WindSimErrorCode::InvalidParameter
            );
            assert_eq!(
                wind_sim_step(instance, f32::NAN, ptr::null()),
                WindSimErrorCode::InvalidParameter
            );
            let mut small = [0.0_f32; 4];
            assert_eq!(
                wind_sim_paint(instance, ptr::null(), small.as_mut_ptr(), small.len()),
                WindSimErrorCode::InvalidParameter
            );
            assert_eq!(wind_sim_clear_sources(ptr::null()), WindSimErrorCode::NullPointer);

            for run_speed in [-0.5, f32::NAN] {
                let config = WindSimConfig {
                    run_speed,
                    ..wind_sim_config_default()
                };
                assert_eq!(
                    wind_sim_step(instance, 0.1, &config),
                    WindSimErrorCode::InvalidParameter
                );
                assert_eq!(
                    wind_sim_step_n(instance, 0.1, 2, &config),
                    WindSimErrorCode::InvalidParameter
                );
            }

            assert_eq!(wind_sim_step(instance, 0.1, ptr::null()), WindSimErrorCode::Ok);
            assert!(wind_sim_get_last_error().is_null());
            wind_sim_destroy(instance);
        }
    }
}
