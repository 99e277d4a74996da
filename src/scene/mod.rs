pub mod camera;
pub mod light;

pub use camera::CameraState;
pub use light::{Light, LightKind};

/// Mesh-side capabilities that feed flag resolution: which vertex streams
/// the geometry actually provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshCaps {
    pub has_normals: bool,
    pub has_tangents: bool,
    pub has_uv: bool,
    pub has_uv2: bool,
    pub has_skinning: bool,
    pub morph_target_count: u32,
}

impl MeshCaps {
    /// A static triangle mesh with normals and one UV set.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            has_normals: true,
            has_uv: true,
            ..Self::default()
        }
    }
}

/// Scene/runtime capabilities that feed flag resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCaps {
    pub textures_enabled: bool,
    pub lights_enabled: bool,
    /// Visible lights affecting the batch; resolution caps this at
    /// [`MAX_SIMULTANEOUS_LIGHTS`](crate::resources::MAX_SIMULTANEOUS_LIGHTS).
    pub light_count: u32,
    pub shadows_enabled: bool,
    /// Cascaded shadow maps are in use.
    pub cascaded_shadows: bool,
    pub fog_enabled: bool,
    /// Derivative intrinsics available (required for bump mapping).
    pub standard_derivatives: bool,
    /// Fragment depth writes available (required for logarithmic depth).
    pub fragment_depth_supported: bool,
    pub multiview: bool,
    /// A light was removed from the scene since the last resolve. Forces
    /// one extra synchronization pass when a compile was in flight.
    pub lights_disposed: bool,
}

impl Default for SceneCaps {
    fn default() -> Self {
        Self {
            textures_enabled: true,
            lights_enabled: true,
            light_count: 0,
            shadows_enabled: false,
            cascaded_shadows: false,
            fog_enabled: false,
            standard_derivatives: true,
            fragment_depth_supported: true,
            multiview: false,
            lights_disposed: false,
        }
    }
}
