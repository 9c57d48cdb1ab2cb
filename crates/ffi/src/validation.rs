use tracing::debug;
use wind_sim_core::{BoxPlot, DeltaField};

use crate::error::{DefaultWindSimError, WindSimErrorCode};
use crate::helpers::{finish, ref_from_ptr, track_error};
use crate::instance::{with_sim_read, WindSimInstance};
use crate::source::WindSimSource;

/// Distribution of `|source − simulation|` over the free cells of the padded grid.
///
/// All fields are zero when every cell is solid (`count == 0`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindSimValidation {
    pub min: f32,
    pub lower_whisker: f32,
    pub q1: f32,
    pub median: f32,
    pub q3: f32,
    pub upper_whisker: f32,
    pub max: f32,
    pub outliers: usize,
    pub count: usize,
    /// Mean delta magnitude
    pub mean_error: f32,
    pub max_error: f32,
}

impl WindSimValidation {
    fn from_delta(delta: &DeltaField) -> Self {
        let Some(plot) = delta.box_plot() else {
            return Self::default();
        };
        let BoxPlot {
            min,
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            max,
            outliers,
            count,
        } = plot;

        Self {
            min,
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            max,
            outliers,
            count,
            mean_error: delta.error(),
            max_error: delta.max_error(),
        }
    }
}

/// Compare a baked source against the simulation's current velocity field.
///
/// # Safety
/// `instance` and `source` must be live; `out_validation` must be writable.
#[no_mangle]
pub unsafe extern "C" fn wind_sim_validate(
    instance: *const WindSimInstance,
    source: *const WindSimSource,
    out_validation: *mut WindSimValidation,
) -> WindSimErrorCode {
    if out_validation.is_null() {
        return track_error(&DefaultWindSimError::null_pointer("out_validation"));
    }
    let source = match unsafe { ref_from_ptr(source, "source") } {
        Ok(source) => source,
        Err(error) => return track_error(&error),
    };

    finish(unsafe {
        with_sim_read(instance, |sim| {
            let delta = DeltaField::build(sim, &source.source);
            let validation = WindSimValidation::from_delta(&delta);
            debug!(
                "Validated {} functions: mean error {:.4}, {} outliers",
                source.source.len(),
                validation.mean_error,
                validation.outliers
            );
            *out_validation = validation;
            Ok(())
        })
    })
}
