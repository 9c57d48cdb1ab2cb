use std::os::raw::c_void;
use std::ptr;

use tracing::{debug, warn};
use wind_sim_core::{bake_with_report, BakeConfig, BakeReport, Vec3, WindSource};

use crate::error::{DefaultWindSimError, WindSimErrorCode};
use crate::helpers::{finish, ref_from_ptr, track_error, track_result};
use crate::instance::{with_sim_read, WindSimInstance};
use crate::scene::{CallbackRayCast, WindSimRayCastCallback};

/// C layout of the bake tuning. Obtain defaults from
/// `wind_sim_bake_config_default`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSimBakeConfig {
    /// Lattice spacing between seeds, in cells
    pub stride: usize,
    pub max_steps: usize,
    /// Per-axis movement (cells) below which a trace is considered stalled
    pub stagnation: f32,
    /// Pull-back from a collision surface, in cells
    pub collision_epsilon: f32,
    pub spline_degree: usize,
    pub samples_per_point: usize,
}

impl From<&BakeConfig> for WindSimBakeConfig {
    fn from(config: &BakeConfig) -> Self {
        Self {
            stride: config.stride,
            max_steps: config.max_steps,
            stagnation: config.stagnation,
            collision_epsilon: config.collision_epsilon,
            spline_degree: config.spline_degree,
            samples_per_point: config.samples_per_point,
        }
    }
}

impl From<&WindSimBakeConfig> for BakeConfig {
    fn from(config: &WindSimBakeConfig) -> Self {
        Self {
            stride: config.stride,
            max_steps: config.max_steps,
            stagnation: config.stagnation,
            collision_epsilon: config.collision_epsilon,
            spline_degree: config.spline_degree,
            samples_per_point: config.samples_per_point,
        }
    }
}

/// Counters from the bake that produced a source.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindSimBakeReport {
    pub seeds: usize,
    pub obstructed_seeds: usize,
    pub accepted: usize,
    pub discarded: usize,
    pub collisions: usize,
}

impl From<&BakeReport> for WindSimBakeReport {
    fn from(report: &BakeReport) -> Self {
        Self {
            seeds: report.seeds,
            obstructed_seeds: report.obstructed_seeds,
            accepted: report.accepted,
            discarded: report.discarded,
            collisions: report.collisions,
        }
    }
}

/// Opaque baked wind source handle.
///
/// Sources are immutable once created and may be evaluated from any thread.
pub struct WindSimSource {
    pub(crate) source: WindSource,
    pub(crate) report: BakeReport,
}

/// Default bake tuning.
#[no_mangle]
pub extern "C" fn wind_sim_bake_config_default() -> WindSimBakeConfig {
    WindSimBakeConfig::from(&BakeConfig::default())
}

/// # Safety
/// `out_source` must be non-null and writable.
unsafe fn publish(
    result: Result<WindSimSource, DefaultWindSimError>,
    out_source: *mut *mut WindSimSource,
) -> WindSimErrorCode {
    match track_result(result) {
        Ok(source) => {
            unsafe { *out_source = Box::into_raw(Box::new(source)) };
            WindSimErrorCode::Ok
        }
        Err(code) => {
            unsafe { *out_source = ptr::null_mut() };
            code
        }
    }
}

/// Bake the current velocity field into a new wind source.
///
/// `callback` answers segment collision queries in world meters; null traces
/// through an empty scene. A null `config` uses `wind_sim_bake_config_default()`.
///
/// # Safety
/// - `instance` must be live; `config` null or valid.
/// - `callback`, when non-null, must be safe to call with `user_data` for the
///   duration of this call.
/// - `out_source` must be writable. The caller owns the result and MUST call
///   `wind_sim_source_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_bake(
    instance: *const WindSimInstance,
    callback: WindSimRayCastCallback,
    user_data: *mut c_void,
    config: *const WindSimBakeConfig,
    out_source: *mut *mut WindSimSource,
) -> WindSimErrorCode {
    if out_source.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_source"));
    }
    if callback.is_none() {
        warn!("No ray cast callback supplied, baking without collisions");
    }
    let config = match unsafe { config.as_ref() } {
        Some(config) => BakeConfig::from(config),
        None => BakeConfig::default(),
    };
    let ray = CallbackRayCast {
        callback,
        user_data,
    };

    let result = unsafe {
        with_sim_read(instance, |sim| {
            let (source, report) = bake_with_report(sim, &ray, &config);
            Ok(WindSimSource { source, report })
        })
    };
    unsafe { publish(result, out_source) }
}

/// Decode a source previously written by `wind_sim_source_to_bytes`.
///
/// Decoded sources carry an empty bake report.
///
/// # Safety
/// - `bytes` must point to `len` readable bytes.
/// - `out_source` must be writable; free the result with `wind_sim_source_destroy`.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_source_from_bytes(
    bytes: *const u8,
    len: usize,
    out_source: *mut *mut WindSimSource,
) -> WindSimErrorCode {
    if out_source.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_source"));
    }
    if bytes.is_null() {
        return unsafe {
            publish(
                Err(DefaultWindSimError::null_pointer("bytes")),
                out_source,
            )
        };
    }

    // SAFETY: the caller guarantees `len` readable bytes
    let bytes = unsafe { std::slice::from_raw_parts(bytes, len) };
    let result = WindSource::from_bytes(bytes)
        .map(|source| WindSimSource {
            source,
            report: BakeReport::default(),
        })
        .map_err(DefaultWindSimError::from);
    unsafe { publish(result, out_source) }
}

/// Destroy a source. Null is a no-op.
///
/// # Safety
/// The pointer MUST have come from `wind_sim_bake` or
/// `wind_sim_source_from_bytes` and not been freed already.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_source_destroy(source: *mut WindSimSource) {
    if source.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `publish` and not yet freed
    unsafe {
        drop(Box::from_raw(source));
    }
}

/// Wind at a world position; zero outside the source volume.
///
/// # Safety
/// `source` must be live; the out pointers must be writable.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_source_evaluate(
    source: *const WindSimSource,
    x: f32,
    y: f32,
    z: f32,
    out_x: *mut f32,
    out_y: *mut f32,
    out_z: *mut f32,
) -> WindSimErrorCode {
    if out_x.is_null() || out_y.is_null() || out_z.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_x/out_y/out_z"));
    }
    finish(unsafe { ref_from_ptr(source, "source") }.map(|source| {
        let wind = source.source.evaluate(Vec3::new(x, y, z));
        unsafe {
            *out_x = wind.x;
            *out_y = wind.y;
            *out_z = wind.z;
        }
    }))
}

/// Number of baked functions in the source, or 0 if `source` is null.
///
/// # Safety
/// `source` must be live or null.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_source_function_count(source: *const WindSimSource) -> usize {
    unsafe { source.as_ref() }.map_or(0, |source| source.source.len())
}

/// Counters from the bake that produced `source`.
///
/// # Safety
/// `source` must be live; `out_report` must be writable.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_source_report(
    source: *const WindSimSource,
    out_report: *mut WindSimBakeReport,
) -> WindSimErrorCode {
    if out_report.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_report"));
    }
    finish(unsafe { ref_from_ptr(source, "source") }.map(|source| {
        unsafe { *out_report = WindSimBakeReport::from(&source.report) };
    }))
}

/// Encode a source for storage.
///
/// On success `out_bytes`/`out_len` describe a buffer owned by the caller,
/// released with `wind_sim_bytes_free`.
///
/// # Safety
/// `source` must be live; the out pointers must be writable.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_source_to_bytes(
    source: *const WindSimSource,
    out_bytes: *mut *mut u8,
    out_len: *mut usize,
) -> WindSimErrorCode {
    if out_bytes.is_null() || out_len.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_bytes/out_len"));
    }

    let result = unsafe { ref_from_ptr(source, "source") }
        .and_then(|source| source.source.to_bytes().map_err(DefaultWindSimError::from));
    match track_result(result) {
        Ok(bytes) => {
            let bytes = bytes.into_boxed_slice();
            debug!("Encoded wind source into {} bytes", bytes.len());
            unsafe {
                *out_len = bytes.len();
                *out_bytes = Box::into_raw(bytes).cast::<u8>();
            }
            WindSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_bytes = ptr::null_mut();
                *out_len = 0;
            }
            code
        }
    }
}

/// Release a buffer returned by `wind_sim_source_to_bytes`. Null is a no-op.
///
/// # Safety
/// `bytes` and `len` must be exactly what `wind_sim_source_to_bytes` wrote.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_bytes_free(bytes: *mut u8, len: usize) {
    if bytes.is_null() {
        return;
    }

    // SAFETY: rebuilt from the boxed slice leaked in `wind_sim_source_to_bytes`
    unsafe {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(bytes, len)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::wind_sim_get_last_error_code;
    use crate::instance::{
        wind_sim_add_velocity_source, wind_sim_clear_sources, wind_sim_destroy, wind_sim_max_speed,
        wind_sim_new_with_dims, wind_sim_step,
    };

    fn channel() -> *mut WindSimInstance {
        let mut instance = ptr::null_mut();
        unsafe {
            assert_eq!(
                wind_sim_new_with_dims(12, 6, 6, 1.0, &mut instance),
                WindSimErrorCode::Ok
            );
            // Source buffers are solver scratch after a step, so repaint every tick
            for _ in 0..20 {
                assert_eq!(wind_sim_clear_sources(instance), WindSimErrorCode::Ok);
                for j in 1..=6 {
                    for k in 1..=6 {
                        wind_sim_add_velocity_source(instance, 1, j, k, 20.0, 0.0, 0.0);
                    }
                }
                assert_eq!(
                    wind_sim_step(instance, 1.0 / 30.0, ptr::null()),
                    WindSimErrorCode::Ok
                );
            }
            assert!(wind_sim_max_speed(instance) > BakeConfig::default().stagnation);
        }
        instance
    }

    #[test]
    fn test_bake_evaluate_and_round_trip() {
        let instance = channel();
        let mut config = wind_sim_bake_config_default();
        config.stride = 2;
        config.stagnation = 0.01;

        unsafe {
            let mut source = ptr::null_mut();
            assert_eq!(
                wind_sim_bake(instance, None, ptr::null_mut(), &config, &mut source),
                WindSimErrorCode::Ok
            );
            let count = wind_sim_source_function_count(source);
            assert!(count > 0, "Forced channel flow should bake to splines");

            let mut report = WindSimBakeReport::default();
            assert_eq!(wind_sim_source_report(source, &mut report), WindSimErrorCode::Ok);
            assert_eq!(report.accepted, count);
            assert_eq!(report.accepted + report.discarded, report.seeds);

            let (mut bytes, mut len) = (ptr::null_mut(), 0);
            assert_eq!(
                wind_sim_source_to_bytes(source, &mut bytes, &mut len),
                WindSimErrorCode::Ok
            );
            assert!(len > 0);

            let mut decoded = ptr::null_mut();
            assert_eq!(
                wind_sim_source_from_bytes(bytes, len, &mut decoded),
                WindSimErrorCode::Ok
            );
            wind_sim_bytes_free(bytes, len);
            assert_eq!(wind_sim_source_function_count(decoded), count);

            let (mut a, mut b) = ([0.0_f32; 3], [0.0_f32; 3]);
            for point in [(2.0, 2.5, 3.0), (6.5, 3.0, 2.0), (100.0, 0.0, 0.0)] {
                wind_sim_source_evaluate(
                    source, point.0, point.1, point.2, &mut a[0], &mut a[1], &mut a[2],
                );
                wind_sim_source_evaluate(
                    decoded, point.0, point.1, point.2, &mut b[0], &mut b[1], &mut b[2],
                );
                assert_eq!(a, b);
            }
            assert_eq!(a, [0.0; 3], "Outside the volume the source is calm");

            wind_sim_source_destroy(decoded);
            wind_sim_source_destroy(source);
            wind_sim_destroy(instance);
        }
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let garbage = [0xff_u8; 7];
        let mut source = ptr::null_mut();
        let code = unsafe { wind_sim_source_from_bytes(garbage.as_ptr(), garbage.len(), &mut source) };
        assert_eq!(code, WindSimErrorCode::Serialization);
        assert_eq!(wind_sim_get_last_error_code(), WindSimErrorCode::Serialization);
        assert!(source.is_null());
    }

    #[test]
    fn test_null_source_arguments() {
        let mut out = [0.0_f32; 3];
        unsafe {
            assert_eq!(
                wind_sim_source_evaluate(
                    ptr::null(),
                    0.0,
                    0.0,
                    0.0,
                    &mut out[0],
                    &mut out[1],
                    &mut out[2]
                ),
                WindSimErrorCode::NullPointer
            );
            assert_eq!(wind_sim_source_function_count(ptr::null()), 0);
            wind_sim_source_destroy(ptr::null_mut());
            wind_sim_bytes_free(ptr::null_mut(), 0);
        }
    }
}
