//! View/projection math for the full-screen particle pass.

use glam::{Mat4, Vec3};

const FOV_Y_DEGREES: f32 = 30.0;
const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 100.0;
const ORBIT_DISTANCE: f32 = 10.0;

/// Perspective projection for the given aspect ratio.
pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
}

/// Look-at view from `eye` toward the origin.
pub fn view(eye: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
}

/// Combined model-view-projection (model is identity; particle positions
/// are already in world space).
pub fn view_projection(eye: Vec3, aspect: f32) -> Mat4 {
    projection(aspect) * view(eye)
}

/// Eye position along the animated orbit at time `t`. With `normalize`
/// the eye stays on a sphere of constant radius; otherwise the three
/// independent oscillators give a slow tumbling path.
pub fn orbit_eye(t: f32, normalize: bool) -> Vec3 {
    let mut eye = Vec3::new(
        (t * 0.35).sin(),
        (t * 0.25).cos(),
        (t * 0.2).sin(),
    );
    if normalize {
        eye = eye.normalize();
    }
    eye * ORBIT_DISTANCE
}
