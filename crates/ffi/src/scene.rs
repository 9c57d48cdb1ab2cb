//! C callbacks adapted to the core scene oracles.
//!
//! Hosts hand the solver two plain function pointers plus an opaque
//! `user_data` pointer. A null callback degrades to an empty scene.

use std::os::raw::c_void;
use wind_sim_core::{Aabb, Occupancy, RayCast, RayHit, Vec3};

/// Axis-aligned box in world meters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSimAabb {
    pub min_x: f32,
    pub min_y: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
}

impl From<&Aabb> for WindSimAabb {
    fn from(aabb: &Aabb) -> Self {
        Self {
            min_x: aabb.min.x,
            min_y: aabb.min.y,
            min_z: aabb.min.z,
            max_x: aabb.max.x,
            max_y: aabb.max.y,
            max_z: aabb.max.z,
        }
    }
}

/// First ray intersection written by a [`WindSimRayCastCallback`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindSimRayHit {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Distance from the ray origin to the hit
    pub distance: f32,
}

/// Returns `true` if any solid geometry overlaps `region`.
pub type WindSimOccupancyCallback =
    Option<unsafe extern "C" fn(user_data: *mut c_void, region: *const WindSimAabb) -> bool>;

/// Casts from `origin` along normalized `direction` up to `max_distance`.
/// Returns `true` and fills `out_hit` when something solid is hit.
pub type WindSimRayCastCallback = Option<
    unsafe extern "C" fn(
        user_data: *mut c_void,
        origin: *const f32,
        direction: *const f32,
        max_distance: f32,
        out_hit: *mut WindSimRayHit,
    ) -> bool,
>;

pub(crate) struct CallbackOccupancy {
    pub callback: WindSimOccupancyCallback,
    pub user_data: *mut c_void,
}

impl Occupancy for CallbackOccupancy {
    fn is_solid(&self, region: &Aabb) -> bool {
        let Some(callback) = self.callback else {
            return false;
        };
        let region = WindSimAabb::from(region);
        // SAFETY: the host promised the callback is valid for this call
        unsafe { callback(self.user_data, &region) }
    }
}

pub(crate) struct CallbackRayCast {
    pub callback: WindSimRayCastCallback,
    pub user_data: *mut c_void,
}

impl RayCast for CallbackRayCast {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let callback = self.callback?;
        let origin = [origin.x, origin.y, origin.z];
        let direction = [direction.x, direction.y, direction.z];
        let mut hit = WindSimRayHit::default();

        // SAFETY: the host promised the callback is valid for this call
        let did_hit = unsafe {
            callback(
                self.user_data,
                origin.as_ptr(),
                direction.as_ptr(),
                max_distance,
                &mut hit,
            )
        };

        did_hit.then(|| RayHit {
            point: Vec3::new(hit.x, hit.y, hit.z),
            distance: hit.distance,
        })
    }
}
