//! Scene queries the solver consumes without depending on a physics engine.
//!
//! The simulation only ever asks two questions of the world it lives in:
//!
//! - [`Occupancy`]: is this box solid? Asked once per cell when the obstruction
//!   grid is built.
//! - [`RayCast`]: where does this segment first hit something solid? Asked by
//!   the streamline tracer for every step it takes.
//!
//! Closures implement both traits, so a host can adapt whatever collision
//! backend it has. [`Unobstructed`] answers "empty" to everything and is the
//! accepted degraded mode when no scene is available.

use crate::core_types::{Aabb, Vec3};

/// Solid-region query used to build the obstruction grid
pub trait Occupancy {
    /// Returns `true` if any solid geometry overlaps `region` (world meters)
    fn is_solid(&self, region: &Aabb) -> bool;
}

/// First intersection of a ray with solid geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit position in world meters
    pub point: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
}

/// Ray query used by the streamline tracer
pub trait RayCast {
    /// Cast from `origin` along normalized `direction`, ignoring hits beyond `max_distance`
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

impl<F> Occupancy for F
where
    F: Fn(&Aabb) -> bool,
{
    fn is_solid(&self, region: &Aabb) -> bool {
        self(region)
    }
}

impl<F> RayCast for F
where
    F: Fn(Vec3, Vec3, f32) -> Option<RayHit>,
{
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self(origin, direction, max_distance)
    }
}

/// Empty scene: nothing is solid and no ray ever hits
#[derive(Debug, Clone, Copy, Default)]
pub struct Unobstructed;

impl Occupancy for Unobstructed {
    fn is_solid(&self, _region: &Aabb) -> bool {
        false
    }
}

impl RayCast for Unobstructed {
    fn cast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<RayHit> {
        None
    }
}

/// Scene made of solid axis-aligned boxes.
///
/// Good enough for blockout geometry, tests and the headless demo; real hosts
/// usually adapt their physics engine through the closure impls instead.
#[derive(Debug, Clone, Default)]
pub struct BoxObstacles {
    boxes: Vec<Aabb>,
}

impl BoxObstacles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    #[must_use]
    pub fn with_box(mut self, solid: Aabb) -> Self {
        self.boxes.push(solid);
        self
    }

    pub fn push(&mut self, solid: Aabb) {
        self.boxes.push(solid);
    }

    #[must_use]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }
}

impl Occupancy for BoxObstacles {
    fn is_solid(&self, region: &Aabb) -> bool {
        self.boxes.iter().any(|solid| solid.overlaps(region))
    }
}

impl RayCast for BoxObstacles {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.boxes
            .iter()
            .filter_map(|solid| solid.ray_entry(origin, direction, max_distance))
            .min_by(f32::total_cmp)
            .map(|distance| RayHit {
                point: origin + direction * distance,
                distance,
            })
    }
}
