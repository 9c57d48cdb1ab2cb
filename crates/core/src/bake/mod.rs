//! Streamline baker and the serializable wind data it produces
//!
//! A stabilized [`crate::WindSimulation`] is reduced to a [`WindSource`]: a box
//! volume holding a list of [`BaseFn`]s that can be evaluated anywhere without
//! the dense grid. Sources and functions round-trip through bytes.

mod base_fn;
mod serialization;
mod spline;
mod streamline;
mod wind_source;

pub use base_fn::{BaseFn, ConstantFn};
pub use serialization::SerializationError;
pub use spline::SplineFn;
pub use streamline::{
    bake, bake_with_report, trace_streamline, BakeConfig, BakeReport, Streamline, TraceEnd,
};
pub use wind_source::{VolumeType, WindSource};
