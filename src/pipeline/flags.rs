//! Feature flag resolution.
//!
//! Maps the parameter store plus mesh/runtime capabilities to the canonical
//! [`FeatureFlags`] set that selects a shader variant. Resolution is a pure
//! function of its inputs and only recomputes the flag groups whose dirty
//! category is set; everything else is carried over from the previous flag
//! set, so a light-count change never storms the texture or attribute flags
//! into a recompile.

use crate::resources::material::{
    DebugMode, DirtyCategories, OutlineColorMode, OutlineWidthMode, ToonMaterial,
    MAX_SIMULTANEOUS_LIGHTS,
};
use crate::resources::shader_defines::ShaderDefines;
use crate::scene::{MeshCaps, SceneCaps};

/// The canonical feature flag set of a shader variant.
///
/// Flags are purely derived — nothing sets one independently of its deriving
/// inputs. Equality follows the canonical serialized string
/// ([`FeatureFlags::cache_key`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeatureFlags {
    defines: ShaderDefines,
}

impl FeatureFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(&mut self, key: &str) {
        self.defines.set_flag(key);
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        self.defines.set(key, value);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.defines.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.defines.contains(key)
    }

    #[must_use]
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.defines.get_u32(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// The variant cache key (sorted, stable serialized form).
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.defines.cache_key()
    }

    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }
}

/// Outcome of a resolution attempt. `NotReady` is not an error: a blocking
/// texture has no samples yet and the caller must retry next frame without
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ready(FeatureFlags),
    NotReady,
}

// Fixed key lists per dirty category; a group recompute first clears its own
// keys from the carried-over set.
const TEXTURE_GROUP: &[&str] = &[
    "DIFFUSE",
    "EMISSIVE",
    "SHADE",
    "RECEIVE_SHADOW",
    "SHADING_GRADE",
    "RIM",
    "MATCAP",
    "OUTLINE_WIDTH",
    "UV_ANIMATION_MASK",
    "BUMP",
    "TWOSIDEDLIGHTING",
    "ALPHA_FROM_DIFFUSE",
];

const LIGHT_GROUP: &[&str] = &["NUM_LIGHTS", "SHADOWS", "SHADOW_CSM"];

const ATTRIBUTE_GROUP: &[&str] = &["NORMAL", "TANGENT", "UV1", "UV2", "SKINNING", "MORPH_TARGETS"];

const MISC_GROUP: &[&str] = &[
    "DEBUG_NORMAL",
    "DEBUG_LITSHADERATE",
    "OUTLINE_WIDTH_WORLD",
    "OUTLINE_WIDTH_SCREEN",
    "OUTLINE_COLOR_FIXED",
    "OUTLINE_COLOR_MIXED",
    "ALPHATEST",
    "ALPHABLEND",
    "PREMULTIPLY_ALPHA",
    "FOG",
    "LOG_DEPTH",
    "POINT_SIZE",
    "MULTIVIEW",
];

/// Pure flag resolution.
pub struct FlagResolver;

impl FlagResolver {
    /// Resolves the flag set for the material's current state.
    ///
    /// With `previous` given, only the groups in `material.dirty()` are
    /// recomputed; without it every group is. The material itself is not
    /// mutated — clearing dirty categories is the runtime's job, after the
    /// recompile/re-bind cycle succeeds.
    #[must_use]
    pub fn resolve(
        material: &ToonMaterial,
        mesh: &MeshCaps,
        scene: &SceneCaps,
        previous: Option<&FeatureFlags>,
    ) -> Resolution {
        let dirty = if previous.is_some() {
            material.dirty()
        } else {
            DirtyCategories::all()
        };
        let mut flags = previous.cloned().unwrap_or_default();

        if dirty.contains(DirtyCategories::ATTRIBUTES) {
            clear_group(&mut flags, ATTRIBUTE_GROUP);
            Self::resolve_attributes(&mut flags, mesh);
        }

        if dirty.contains(DirtyCategories::TEXTURES) {
            clear_group(&mut flags, TEXTURE_GROUP);
            if !Self::resolve_textures(&mut flags, material, scene) {
                return Resolution::NotReady;
            }
        }

        if dirty.contains(DirtyCategories::LIGHTS) {
            clear_group(&mut flags, LIGHT_GROUP);
            Self::resolve_lights(&mut flags, material, scene);
        }

        if dirty.contains(DirtyCategories::MISC) {
            clear_group(&mut flags, MISC_GROUP);
            Self::resolve_misc(&mut flags, material, scene);
        }

        Resolution::Ready(flags)
    }

    fn resolve_attributes(flags: &mut FeatureFlags, mesh: &MeshCaps) {
        if mesh.has_normals {
            flags.set_flag("NORMAL");
        }
        if mesh.has_tangents {
            flags.set_flag("TANGENT");
        }
        if mesh.has_uv {
            flags.set_flag("UV1");
        }
        if mesh.has_uv2 {
            flags.set_flag("UV2");
        }
        if mesh.has_skinning {
            flags.set_flag("SKINNING");
        }
        if mesh.morph_target_count > 0 {
            flags.set_value("MORPH_TARGETS", &mesh.morph_target_count.to_string());
        }
    }

    /// Returns `false` when a blocking texture has no samples yet.
    fn resolve_textures(
        flags: &mut FeatureFlags,
        material: &ToonMaterial,
        scene: &SceneCaps,
    ) -> bool {
        if scene.textures_enabled {
            let slots = [
                (material.diffuse_slot(), "DIFFUSE"),
                (material.emissive_slot(), "EMISSIVE"),
                (material.shade_slot(), "SHADE"),
                (material.receive_shadow_slot(), "RECEIVE_SHADOW"),
                (material.shading_grade_slot(), "SHADING_GRADE"),
                (material.rim_slot(), "RIM"),
                (material.matcap_slot(), "MATCAP"),
                (material.outline_width_slot(), "OUTLINE_WIDTH"),
                (material.uv_animation_mask_slot(), "UV_ANIMATION_MASK"),
            ];
            for (slot, key) in slots {
                if let Some(texture) = slot.texture() {
                    if !texture.is_ready_or_not_blocking() {
                        return false;
                    }
                    flags.set_flag(key);
                }
            }

            // Bump cannot be non-blocking: a placeholder normal map would
            // shade visibly wrong, so resolution fails closed instead.
            if let Some(texture) = material.bump_slot().texture() {
                if scene.standard_derivatives {
                    if !texture.is_ready() {
                        return false;
                    }
                    flags.set_flag("BUMP");
                }
            }
        }

        if !material.disable_lighting()
            && !material.back_face_culling()
            && material.two_sided_lighting()
        {
            flags.set_flag("TWOSIDEDLIGHTING");
        }
        if material.should_use_alpha_from_diffuse() {
            flags.set_flag("ALPHA_FROM_DIFFUSE");
        }

        true
    }

    fn resolve_lights(flags: &mut FeatureFlags, material: &ToonMaterial, scene: &SceneCaps) {
        let count = if material.disable_lighting() || !scene.lights_enabled {
            0
        } else {
            scene.light_count.min(MAX_SIMULTANEOUS_LIGHTS as u32)
        };
        flags.set_value("NUM_LIGHTS", &count.to_string());

        if count > 0 && scene.shadows_enabled {
            flags.set_flag("SHADOWS");
            if scene.cascaded_shadows {
                flags.set_flag("SHADOW_CSM");
            }
        }
    }

    fn resolve_misc(flags: &mut FeatureFlags, material: &ToonMaterial, scene: &SceneCaps) {
        match material.debug_mode() {
            DebugMode::None => {}
            DebugMode::Normal => flags.set_flag("DEBUG_NORMAL"),
            DebugMode::LitShadeRate => flags.set_flag("DEBUG_LITSHADERATE"),
        }

        match material.outline_width_mode() {
            OutlineWidthMode::None => {}
            OutlineWidthMode::WorldCoordinates => flags.set_flag("OUTLINE_WIDTH_WORLD"),
            OutlineWidthMode::ScreenCoordinates => flags.set_flag("OUTLINE_WIDTH_SCREEN"),
        }

        match material.outline_color_mode() {
            OutlineColorMode::FixedColor => flags.set_flag("OUTLINE_COLOR_FIXED"),
            OutlineColorMode::MixedLighting => flags.set_flag("OUTLINE_COLOR_MIXED"),
        }

        if material.needs_alpha_testing() {
            flags.set_flag("ALPHATEST");
        }
        if material.transparency_mode().is_none() || material.needs_alpha_blending() {
            flags.set_flag("ALPHABLEND");
        }
        if material.premultiply_alpha() {
            flags.set_flag("PREMULTIPLY_ALPHA");
        }
        if scene.fog_enabled {
            flags.set_flag("FOG");
        }
        if material.use_logarithmic_depth() && scene.fragment_depth_supported {
            flags.set_flag("LOG_DEPTH");
        }
        if material.points_cloud() {
            flags.set_flag("POINT_SIZE");
        }
        if scene.multiview {
            flags.set_flag("MULTIVIEW");
        }
    }
}

fn clear_group(flags: &mut FeatureFlags, keys: &[&str]) {
    for key in keys {
        flags.remove(key);
    }
}
