//! Analytic wind functions stored inside a baked [`super::WindSource`].

use super::serialization::{decode, encode, SerializationError};
use super::spline::SplineFn;
use crate::core_types::Vec3;
use serde::{Deserialize, Serialize};

/// Uniform wind: the same vector everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantFn {
    direction: Vec3,
    magnitude: f32,
}

impl ConstantFn {
    /// `direction` is normalized here; a zero direction yields no wind.
    #[must_use]
    pub fn new(direction: Vec3, magnitude: f32) -> Self {
        Self {
            direction: direction
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vec3::zeros),
            magnitude,
        }
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    #[must_use]
    pub fn evaluate(&self, _point: Vec3) -> Vec3 {
        self.direction * self.magnitude
    }
}

/// Basis function of a baked wind field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BaseFn {
    Constant(ConstantFn),
    Spline(SplineFn),
}

impl BaseFn {
    /// Wind vector at `point` (world meters)
    #[must_use]
    pub fn evaluate(&self, point: Vec3) -> Vec3 {
        match self {
            BaseFn::Constant(constant) => constant.evaluate(point),
            BaseFn::Spline(spline) => spline.evaluate(point),
        }
    }

    /// Encode as tagged bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Encode`] if bincode rejects the value.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        encode(self)
    }

    /// Decode bytes produced by [`BaseFn::to_bytes`].
    ///
    /// # Errors
    ///
    /// Fails on malformed input or when bytes remain after the value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        decode(bytes)
    }
}

impl From<ConstantFn> for BaseFn {
    fn from(constant: ConstantFn) -> Self {
        BaseFn::Constant(constant)
    }
}

impl From<SplineFn> for BaseFn {
    fn from(spline: SplineFn) -> Self {
        BaseFn::Spline(spline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_normalizes_direction() {
        let constant = ConstantFn::new(Vec3::new(3.0, 0.0, 4.0), 10.0);
        assert_relative_eq!(constant.direction().norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(
            constant.evaluate(Vec3::new(100.0, -5.0, 2.0)),
            Vec3::new(6.0, 0.0, 8.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_zero_direction_is_calm() {
        let constant = ConstantFn::new(Vec3::zeros(), 5.0);
        assert_eq!(constant.evaluate(Vec3::zeros()), Vec3::zeros());
    }

    #[test]
    fn test_variant_tag_survives_bytes() {
        let original = BaseFn::from(ConstantFn::new(Vec3::new(0.0, 1.0, 0.0), 2.0));
        let decoded = BaseFn::from_bytes(&original.to_bytes().unwrap()).unwrap();
        assert!(matches!(decoded, BaseFn::Constant(_)));

        let spline = SplineFn::new(
            vec![Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
            vec![1.0, 1.0, 1.0],
            3,
            8,
        );
        let decoded = BaseFn::from_bytes(&BaseFn::from(spline).to_bytes().unwrap()).unwrap();
        match decoded {
            BaseFn::Spline(s) => assert_eq!(s.degree(), 2),
            BaseFn::Constant(_) => panic!("Expected a spline"),
        }
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(BaseFn::from_bytes(&[7, 1, 2]).is_err());
    }
}
