//! Per-material runtime state: readiness, hot-swap, binding.
//!
//! This is the surface the renderer drives once per material per frame:
//!
//! 1. [`MaterialRuntime::is_ready`] — resolve flags for the dirty categories,
//!    look up / compile the variant, run the hot-swap protocol. `Ok(false)`
//!    means skip rendering this batch and retry next frame.
//! 2. [`MaterialRuntime::bind`] — push the current parameter values into a
//!    uniform block matching the active variant's layout, once per draw.
//!
//! All of this runs on the single frame-render thread; the only asynchronous
//! piece is program compilation, observed through polling. The previously
//! bound variant keeps rendering while a new one compiles, so no frame ever
//! blocks on compilation.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::errors::Result;
use crate::pipeline::flags::{FeatureFlags, FlagResolver, Resolution};
use crate::pipeline::uniform_layout::UniformBlock;
use crate::pipeline::variant::{ProgramBackend, Variant, VariantCache};
use crate::resources::material::{DirtyCategories, ToonMaterial};
use crate::scene::{CameraState, MeshCaps, SceneCaps};

/// Per-frame values the host supplies at bind time.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub time_seconds: f32,
    pub visibility: f32,
    /// Scene ambient; multiplied with the material's own ambient color.
    pub ambient_color: Vec3,
    pub mirrored_camera: bool,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            time_seconds: 0.0,
            visibility: 1.0,
            ambient_color: Vec3::ONE,
            mirrored_camera: false,
        }
    }
}

/// The frame-level uniform buffer contents (bind group 0 in the shader).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [f32; 16],
    pub view_projection: [f32; 16],
    pub eye_position: [f32; 4],
    pub eye_up: [f32; 4],
    pub ambient_color: [f32; 4],
    /// x: aspect, y: is_outline, z: time seconds, w: visibility.
    pub params: [f32; 4],
}

/// Result of a bind: the packed material block plus the frame uniforms.
#[derive(Debug, Clone)]
pub struct BoundUniforms {
    pub material: UniformBlock,
    pub frame: FrameUniforms,
}

/// Runtime state of one material instance.
#[derive(Default)]
pub struct MaterialRuntime {
    /// Flags of the variant currently bound for rendering.
    flags: Option<FeatureFlags>,
    current: Option<Arc<Variant>>,
    /// A newer variant still compiling; promoted once it polls ready.
    pending: Option<Arc<Variant>>,
}

impl MaterialRuntime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The variant rendering this material right now, if any.
    #[must_use]
    pub fn current_variant(&self) -> Option<&Arc<Variant>> {
        self.current.as_ref()
    }

    /// The flags of the currently bound variant.
    #[must_use]
    pub fn current_flags(&self) -> Option<&FeatureFlags> {
        self.flags.as_ref()
    }

    #[must_use]
    pub fn has_pending_compile(&self) -> bool {
        self.pending.is_some()
    }

    /// Drives resolution, compilation and hot-swap. Returns `Ok(true)` when
    /// the material can render this frame (possibly still with the previous
    /// variant while a newer one compiles), `Ok(false)` to skip the batch and
    /// retry next frame.
    ///
    /// Dirty categories are cleared only after a successful swap; a pending
    /// compile leaves them set so resolution re-runs until promotion.
    pub fn is_ready(
        &mut self,
        material: &mut ToonMaterial,
        mesh: &MeshCaps,
        scene: &SceneCaps,
        cache: &mut VariantCache,
        backend: &mut dyn ProgramBackend,
    ) -> Result<bool> {
        if material.dirty().is_empty() && self.flags.is_some() {
            return Ok(self.current.is_some());
        }

        let resolved = match FlagResolver::resolve(material, mesh, scene, self.flags.as_ref()) {
            Resolution::NotReady => return Ok(false),
            Resolution::Ready(flags) => flags,
        };

        if self.flags.as_ref() == Some(&resolved) {
            material.clear_dirty(DirtyCategories::all());
            return Ok(self.current.is_some());
        }

        let variant = cache.get_or_compile(backend, &resolved)?;
        if variant.is_ready(backend) {
            self.current = Some(variant);
            self.pending = None;
            self.flags = Some(resolved);
            material.clear_dirty(DirtyCategories::all());
            if scene.lights_disposed {
                // a light went away while this program built; force one more
                // synchronization pass now that it exists
                material.mark_dirty(DirtyCategories::LIGHTS);
            }
            return Ok(true);
        }

        self.pending = Some(variant);
        if scene.lights_disposed {
            material.mark_dirty(DirtyCategories::LIGHTS);
            return Ok(false);
        }
        // keep the previous variant bound until the new one reports ready
        Ok(self.current.is_some())
    }

    /// Packs the current parameter values for upload. Called once per draw,
    /// after a successful [`is_ready`](Self::is_ready).
    ///
    /// Returns `None` when no variant is bound yet.
    #[must_use]
    pub fn bind(
        &self,
        material: &ToonMaterial,
        camera: &CameraState,
        frame: &FrameContext,
        is_outline: bool,
    ) -> Option<BoundUniforms> {
        let variant = self.current.as_ref()?;
        let layout = variant.layout();
        let mut block = UniformBlock::new(layout);

        block.set_vec4(
            "diffuse_color",
            material.diffuse_color.extend(material.alpha()),
        );
        if layout.contains("diffuse_info") {
            let slot = material.diffuse_slot();
            block.set_vec2("diffuse_info", slot.info());
            block.set_mat4("diffuse_matrix", slot.transform.compute_matrix());
        }

        block.set_vec3("emissive_color", material.emissive_color);
        if layout.contains("emissive_info") {
            let slot = material.emissive_slot();
            block.set_vec2("emissive_info", slot.info());
            block.set_mat4("emissive_matrix", slot.transform.compute_matrix());
        }

        if layout.contains("bump_info") {
            let slot = material.bump_slot();
            block.set_vec3("bump_info", slot.bump_info(material.bump_scale()));
            block.set_mat4("bump_matrix", slot.transform.compute_matrix());
            // bump convention is inverted relative to the host default
            let sign = if frame.mirrored_camera { 1.0 } else { -1.0 };
            block.set_vec2("tangent_space_params", Vec2::splat(sign));
        }

        block.set_vec3("shade_color", material.shade_color);
        if layout.contains("shade_info") {
            let slot = material.shade_slot();
            block.set_vec2("shade_info", slot.info());
            block.set_mat4("shade_matrix", slot.transform.compute_matrix());
        }

        if layout.contains("receive_shadow_info") {
            let slot = material.receive_shadow_slot();
            block.set_vec2("receive_shadow_info", slot.info());
            block.set_mat4("receive_shadow_matrix", slot.transform.compute_matrix());
        }

        if layout.contains("shading_grade_info") {
            let slot = material.shading_grade_slot();
            block.set_vec2("shading_grade_info", slot.info());
            block.set_mat4("shading_grade_matrix", slot.transform.compute_matrix());
        }

        block.set_vec3("rim_color", material.rim_color);
        if layout.contains("rim_info") {
            let slot = material.rim_slot();
            block.set_vec2("rim_info", slot.info());
            block.set_mat4("rim_matrix", slot.transform.compute_matrix());
        }

        if layout.contains("matcap_info") {
            let slot = material.matcap_slot();
            block.set_vec2("matcap_info", slot.info());
            block.set_mat4("matcap_matrix", slot.transform.compute_matrix());
        }

        block.set_vec4("outline_color", material.outline_color);
        if layout.contains("outline_width_info") {
            let slot = material.outline_width_slot();
            block.set_vec2("outline_width_info", slot.info());
            block.set_mat4("outline_width_matrix", slot.transform.compute_matrix());
        }

        if layout.contains("uv_animation_mask_info") {
            let slot = material.uv_animation_mask_slot();
            block.set_vec2("uv_animation_mask_info", slot.info());
            block.set_mat4("uv_animation_mask_matrix", slot.transform.compute_matrix());
        }

        if layout.contains("point_size") {
            block.set_f32("point_size", material.point_size());
        }

        block.set_f32("shading_grade_rate", material.shading_grade_rate());
        block.set_f32("receive_shadow_rate", material.receive_shadow_rate());
        block.set_f32("shade_shift", material.shade_shift());
        block.set_f32("shade_toony", material.shade_toony());
        block.set_f32("light_color_attenuation", material.light_color_attenuation());
        block.set_f32(
            "indirect_light_intensity",
            material.indirect_light_intensity(),
        );
        block.set_f32("rim_lighting_mix", material.rim_lighting_mix());
        block.set_f32("rim_fresnel_power", material.rim_fresnel_power());
        block.set_f32("rim_lift", material.rim_lift());
        block.set_f32("outline_width", material.outline_width());
        block.set_f32(
            "outline_scaled_max_distance",
            material.outline_scaled_max_distance(),
        );
        block.set_f32("outline_lighting_mix", material.outline_lighting_mix());
        block.set_f32("uv_animation_scroll_x", material.uv_animation_scroll_x());
        block.set_f32("uv_animation_scroll_y", material.uv_animation_scroll_y());
        block.set_f32("uv_animation_rotation", material.uv_animation_rotation());

        if layout.contains("alpha_cutoff") {
            block.set_f32("alpha_cutoff", material.alpha_cutoff());
        }

        let ambient = frame.ambient_color * material.ambient_color;
        let frame_uniforms = FrameUniforms {
            view: camera.view.to_cols_array(),
            view_projection: camera.view_projection.to_cols_array(),
            eye_position: camera.eye_position.extend(1.0).to_array(),
            eye_up: camera.up.extend(0.0).to_array(),
            ambient_color: ambient.extend(1.0).to_array(),
            params: Vec4::new(
                camera.aspect,
                if is_outline { 1.0 } else { 0.0 },
                frame.time_seconds,
                frame.visibility,
            )
            .to_array(),
        };

        Some(BoundUniforms {
            material: block,
            frame: frame_uniforms,
        })
    }

    /// Drops this runtime's interest in its variants. Program handles are
    /// released by [`VariantCache::dispose`], exactly once.
    pub fn dispose(&mut self) {
        self.current = None;
        self.pending = None;
        self.flags = None;
    }
}
