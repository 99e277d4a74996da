//! Outline pass orchestration and offset math.
//!
//! The outline is a second draw of the same geometry with the cull mode
//! inverted relative to the fill pass, the vertices pushed outward along
//! their normals, and the color path replaced by the outline color. Both
//! passes share the variant machinery; the outline pass must be issued after
//! the fill pass.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::resources::material::{CullMode, OutlineWidthMode, SideOrientation, ToonMaterial};

/// Fixed scale applied to outline offsets in both width modes.
pub const OUTLINE_OFFSET_SCALE: f32 = 0.01;

/// Constant clip-space depth bias (as a fraction of `w`) preventing
/// z-fighting between the outline and the fill pass.
pub const OUTLINE_DEPTH_BIAS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Fill,
    Outline,
}

/// The fixed-function state one pass renders with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassState {
    pub kind: PassKind,
    pub cull_mode: CullMode,
    pub side_orientation: SideOrientation,
    /// Value of the `is_outline` frame uniform.
    pub is_outline: f32,
}

/// Issues the fill/outline pass pair for a material.
#[derive(Debug, Default)]
pub struct OutlinePassController;

impl OutlinePassController {
    /// Whether the material wants an outline pass at all.
    #[must_use]
    pub fn enabled(material: &ToonMaterial) -> bool {
        material.outline_width_mode() != OutlineWidthMode::None
    }

    /// Pass state for the fill (first) pass.
    #[must_use]
    pub fn fill_state(material: &ToonMaterial) -> PassState {
        PassState {
            kind: PassKind::Fill,
            cull_mode: material.cull_mode(),
            side_orientation: material.side_orientation(),
            is_outline: 0.0,
        }
    }

    /// Begins the outline (second) pass: swaps the material's cull mode for
    /// its outline cull mode (front-culling by default, the inverse of the
    /// fill pass) and returns the pass state. Returns `None` when outlines
    /// are disabled. Pair with [`end_outline`](Self::end_outline).
    #[must_use]
    pub fn begin_outline(material: &mut ToonMaterial) -> Option<PassState> {
        if !Self::enabled(material) {
            return None;
        }
        material.apply_outline_cull_mode();
        Some(PassState {
            kind: PassKind::Outline,
            cull_mode: material.cull_mode(),
            side_orientation: material.side_orientation(),
            is_outline: 1.0,
        })
    }

    /// Ends the outline pass, restoring the fill cull mode.
    pub fn end_outline(material: &mut ToonMaterial) {
        material.restore_outline_cull_mode();
    }
}

// ─── Vertex-stage offset math ────────────────────────────────────────────────
//
// These mirror the generated shader exactly; they exist host-side so the
// silhouette behavior is testable without a device.

/// World-space outline displacement for one vertex:
/// `normal_w × 0.01 × outline_width × width_sample`.
#[must_use]
pub fn world_outline_offset(world_normal: Vec3, outline_width: f32, width_sample: f32) -> Vec3 {
    world_normal.normalize_or_zero() * OUTLINE_OFFSET_SCALE * outline_width * width_sample
}

/// Screen-space outline displacement, applied to the projected position's
/// xy. The projected normal is scaled by `min(clip.w,
/// outline_scaled_max_distance)` so far-away silhouettes stop growing,
/// corrected for aspect on x, and attenuated to zero as the view-space
/// normal turns toward the camera (prevents popping at grazing angles).
#[must_use]
pub fn screen_outline_offset(
    clip_position: Vec4,
    view_projection_world: &Mat4,
    view_world: &Mat4,
    object_normal: Vec3,
    aspect: f32,
    outline_width: f32,
    width_sample: f32,
    outline_scaled_max_distance: f32,
) -> Vec2 {
    let mut projected_normal =
        (*view_projection_world * object_normal.extend(0.0)).normalize_or_zero();
    projected_normal *= clip_position.w.min(outline_scaled_max_distance);
    projected_normal.x *= aspect;

    let view_normal = (*view_world * object_normal.extend(0.0))
        .xyz()
        .normalize_or_zero();
    let facing = (1.0 - view_normal.z.abs()).clamp(0.0, 1.0);

    projected_normal.xy() * OUTLINE_OFFSET_SCALE * outline_width * width_sample * facing
}

/// Applies the constant anti-z-fighting depth bias to a clip-space position.
#[must_use]
pub fn apply_outline_depth_bias(mut clip_position: Vec4) -> Vec4 {
    clip_position.z += OUTLINE_DEPTH_BIAS * clip_position.w;
    clip_position
}
