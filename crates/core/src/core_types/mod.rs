//! Core types and utilities

pub mod aabb;
pub mod vec3;

pub use aabb::Aabb;
pub use vec3::Vec3;
