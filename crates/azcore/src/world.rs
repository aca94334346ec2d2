//! Listener pose used by the spatializer (spec.md §3 "World").

use crate::math::{Mat3, Vec3};

/// `(origin, orientation, speed_of_sound)`. A process-wide default exists
/// ([`World::default`]); any spatializer instance can override it with its
/// own pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    pub origin: Vec3,
    pub orientation: Mat3,
    pub speed_of_sound: f32,
}

impl World {
    pub fn new(origin: Vec3, orientation: Mat3) -> Self {
        Self { origin, orientation, speed_of_sound: 343.0 }
    }

    /// Transform a world-space position into head space:
    /// `orientation^T * (pos - origin)` (spec.md §4.13 step 1).
    pub fn to_head_space(&self, world_pos: Vec3) -> Vec3 {
        self.orientation.mul_transpose_vec3(world_pos.sub(self.origin))
    }
}

impl Default for World {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            orientation: Mat3::IDENTITY,
            speed_of_sound: 343.0,
        }
    }
}
