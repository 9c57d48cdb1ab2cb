//! Baked wind volume: a placement box plus the functions evaluated inside it.

use super::base_fn::BaseFn;
use super::serialization::{decode, encode, SerializationError};
use crate::core_types::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// Shape of the volume a [`WindSource`] affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VolumeType {
    /// Axis-aligned box centred on `position` with full extent `scale`
    #[default]
    Box,
}

/// Self-contained, serializable approximation of a simulated wind field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindSource {
    pub volume_type: VolumeType,
    /// Centre of the volume in world meters
    pub position: Vec3,
    /// Full extent of the volume in meters
    pub scale: Vec3,
    pub functions: Vec<BaseFn>,
}

impl WindSource {
    #[must_use]
    pub fn new(volume_type: VolumeType, position: Vec3, scale: Vec3) -> Self {
        Self {
            volume_type,
            position,
            scale,
            functions: Vec::new(),
        }
    }

    /// Box volume covering `bounds`
    #[must_use]
    pub fn from_bounds(bounds: &Aabb) -> Self {
        Self::new(VolumeType::Box, bounds.center(), bounds.size())
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.scale)
    }

    pub fn push(&mut self, function: impl Into<BaseFn>) {
        self.functions.push(function.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Whether `point` lies inside the volume (faces included)
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        match self.volume_type {
            VolumeType::Box => self.bounds().contains(point),
        }
    }

    /// Sum of every function at `point`; zero outside the volume.
    #[must_use]
    pub fn evaluate(&self, point: Vec3) -> Vec3 {
        if !self.contains(point) {
            return Vec3::zeros();
        }
        self.functions
            .iter()
            .fold(Vec3::zeros(), |acc, f| acc + f.evaluate(point))
    }

    /// # Errors
    ///
    /// Returns [`SerializationError::Encode`] if bincode rejects the value.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        encode(self)
    }

    /// # Errors
    ///
    /// Fails on malformed input or when bytes remain after the source.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::ConstantFn;

    fn breeze() -> WindSource {
        let mut source = WindSource::from_bounds(&Aabb::new(
            Vec3::zeros(),
            Vec3::new(10.0, 4.0, 10.0),
        ));
        source.push(ConstantFn::new(Vec3::new(1.0, 0.0, 0.0), 2.0));
        source.push(ConstantFn::new(Vec3::new(0.0, 0.0, 1.0), 1.0));
        source
    }

    #[test]
    fn test_box_placement() {
        let source = breeze();
        assert_eq!(source.position, Vec3::new(5.0, 2.0, 5.0));
        assert_eq!(source.scale, Vec3::new(10.0, 4.0, 10.0));
        assert!(source.contains(Vec3::new(0.0, 0.0, 0.0)));
        assert!(!source.contains(Vec3::new(5.0, 4.5, 5.0)));
    }

    #[test]
    fn test_evaluate_sums_inside_and_zero_outside() {
        let source = breeze();
        assert_eq!(source.evaluate(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(source.evaluate(Vec3::new(-1.0, 1.0, 1.0)), Vec3::zeros());
    }

    #[test]
    fn test_empty_source_is_calm() {
        let source = WindSource::default();
        assert!(source.is_empty());
        assert_eq!(source.evaluate(Vec3::zeros()), Vec3::zeros());
    }
}
