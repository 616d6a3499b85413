use glam::Vec3;
use parry3d::{bounding_volume::Aabb, math::Isometry};

/// Returns world-space corners of an oriented bounding box.
///
/// # Arguments
///
/// * `local_aabb` - object-space bounding box.
///
/// * `position` - object-to-world transformation.
pub fn obb_corners(local_aabb: &Aabb, position: &Isometry<f32>) -> [Vec3; 8] {
    local_aabb
        .vertices()
        .map(|vertex| Vec3::from(position * vertex))
}

/// Returns corners of an axis aligned bounding box.
pub fn aabb_corners(aabb: &Aabb) -> [Vec3; 8] {
    aabb.vertices().map(Vec3::from)
}
