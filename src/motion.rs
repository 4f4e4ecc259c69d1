//! Cosmetic, non-physical oscillations layered on top of the physics step.
//!
//! Everything here is a pure function of elapsed time and immutable base
//! data, so repeated evaluation at the same instant is drift-free.

use glam::{Mat3, Quat, Vec3};

use crate::mesh::Geometry;

/// Tail-flap angle in radians. One shared frequency and phase for every
/// fish; the synchrony is intentional.
pub fn tail_flap_angle(elapsed: f32) -> f32 {
    (elapsed * 8.0).sin() * 0.5
}

/// Sway a plant's vertices horizontally. Each vertex's offset depends on
/// its original height up the stalk, so blades bend more at the tip, and is
/// recomputed from `base_positions` every call.
pub fn sway_plant(geometry: &mut Geometry, plant_height: f32, elapsed: f32) {
    debug_assert_eq!(geometry.positions.len(), geometry.base_positions.len());
    for (pos, base) in geometry
        .positions
        .iter_mut()
        .zip(geometry.base_positions.iter())
    {
        let sway = (elapsed * 0.5 + base.y * 0.5).sin() * (base.y / (plant_height * 2.0)) * 0.3;
        pos.x = base.x + sway;
    }
}

/// Vertical bend wave across an image plane, approximating a swimming flex.
/// Amplitude grows from the tail edge (-x) to the nose edge (+x).
pub fn bend_image_plane(geometry: &mut Geometry, width: f32, elapsed: f32) {
    debug_assert_eq!(geometry.positions.len(), geometry.base_positions.len());
    for (pos, base) in geometry
        .positions
        .iter_mut()
        .zip(geometry.base_positions.iter())
    {
        let bend_factor = (base.x + width * 0.5) / width;
        pos.y = base.y + (base.x * 0.5 + elapsed * 10.0).sin() * 0.3 * bend_factor;
    }
}

/// Rotation that turns a +Z-facing plane toward the camera (billboard).
pub fn billboard_toward(position: Vec3, camera: Vec3) -> Quat {
    let forward = (camera - position).normalize_or_zero();
    if forward.length_squared() < 0.5 {
        return Quat::IDENTITY;
    }
    let right = Vec3::Y.cross(forward).normalize_or_zero();
    if right.length_squared() < 0.5 {
        // Camera directly above or below; any horizontal right axis works.
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

/// Target orientation for a 3D fish: nose (+Z) along the velocity.
pub fn facing_velocity(velocity: Vec3) -> Quat {
    match velocity.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(Vec3::Z, dir),
        None => Quat::IDENTITY,
    }
}
