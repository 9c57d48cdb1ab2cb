//! Accuracy checks for baked wind sources

mod delta_field;
pub mod statistics;

pub use delta_field::DeltaField;
pub use statistics::{quartiles, BoxPlot, Quartiles};
