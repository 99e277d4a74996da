//! Camera state consumed by binding and the outline pass.

use glam::{Mat4, Vec3};

/// Per-frame camera parameters. The host's camera system produces these;
/// the material core only reads them.
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    pub eye_position: Vec3,
    pub up: Vec3,
    pub view: Mat4,
    pub view_projection: Mat4,
    pub aspect: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            eye_position: Vec3::ZERO,
            up: Vec3::Y,
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            aspect: 1.0,
        }
    }
}

impl CameraState {
    /// Normalized direction from a surface point toward the eye.
    #[must_use]
    pub fn view_direction(&self, surface_point: Vec3) -> Vec3 {
        (self.eye_position - surface_point).normalize_or_zero()
    }
}
