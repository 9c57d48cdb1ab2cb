//! Grid field primitives

pub mod field;
pub mod obstruction_field;
pub mod vector_field;

// Re-export main types
pub use field::{Dim, Field};
pub use obstruction_field::ObstructionField;
pub use vector_field::{DensityField, VectorField};
