//! Toon material parameter store.
//!
//! The material mixes a lit color and a shade color per light, with a toony
//! remap controlling how hard the lit/shade transition is, plus rim, matcap,
//! emission and a separately rendered outline silhouette.
//!
//! Two invariants govern this type:
//!
//! - Scalar knobs are **always stored clamped** to their documented domain.
//!   Out-of-range values are silently clamped, never rejected — including on
//!   deserialization.
//! - Every field belongs to exactly one dirty category; mutating it marks
//!   that category. Categories reset only after a successful
//!   recompile/re-bind cycle (driven by
//!   [`MaterialRuntime`](crate::pipeline::runtime::MaterialRuntime)).
//!
//! The serialized surface is the interchange contract: scalars, colors,
//! enums and booleans round-trip exactly. Texture slots are host references
//! and are not serialized here.

use bitflags::bitflags;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resources::texture::{TextureRef, TextureSlot};

/// Upper bound on simultaneously evaluated lights.
pub const MAX_SIMULTANEOUS_LIGHTS: usize = 16;

bitflags! {
    /// Dirty categories driving partial flag re-resolution.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyCategories: u32 {
        const TEXTURES   = 1 << 0;
        const LIGHTS     = 1 << 1;
        const ATTRIBUTES = 1 << 2;
        const MISC       = 1 << 3;
    }
}

/// Diagnostic rendering override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugMode {
    #[default]
    None,
    /// Output the encoded world normal.
    Normal,
    /// Output the grayscale lit/shade ratio.
    LitShadeRate,
}

/// How the outline silhouette is offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutlineWidthMode {
    #[default]
    None,
    WorldCoordinates,
    ScreenCoordinates,
}

/// How the outline is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutlineColorMode {
    FixedColor,
    #[default]
    MixedLighting,
}

/// Face culling for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// Draw both faces.
    Off,
    /// Cull front faces (draw only back faces).
    Front,
    /// Cull back faces (draw only front faces).
    #[default]
    Back,
}

/// Winding considered front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SideOrientation {
    #[default]
    ClockWise,
    CounterClockWise,
}

/// Alpha handling derived from the `alpha_test` / `alpha_blend` switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransparencyMode {
    Opaque,
    AlphaTest,
    AlphaBlend,
    AlphaTestAndBlend,
}

// Clamp-on-deserialize helpers; the setters below enforce the same domains,
// so the round-trip law holds even against hand-edited input.
mod domains {
    use serde::{Deserialize, Deserializer};

    pub fn unit<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
        f32::deserialize(d).map(|v| v.clamp(0.0, 1.0))
    }

    pub fn signed_unit<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
        f32::deserialize(d).map(|v| v.clamp(-1.0, 1.0))
    }

    pub fn fresnel_power<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
        f32::deserialize(d).map(|v| v.clamp(0.0, 100.0))
    }

    pub fn outline_width<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
        f32::deserialize(d).map(|v| v.clamp(0.01, 1.0))
    }

    pub fn outline_distance<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
        f32::deserialize(d).map(|v| v.clamp(1.0, 10.0))
    }
}

/// The toon material parameter store.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ToonMaterial {
    #[serde(skip, default = "Uuid::new_v4")]
    uuid: Uuid,
    pub name: Option<String>,

    // ---- Colors ----
    /// Multiplied with the diffuse texture; the lit albedo.
    pub diffuse_color: Vec3,
    /// Multiplied with the shade texture; the shaded albedo.
    pub shade_color: Vec3,
    /// Scene-independent ambient tint.
    pub ambient_color: Vec3,
    /// Purely additive emission color.
    pub emissive_color: Vec3,
    /// Rim highlight color.
    pub rim_color: Vec3,
    /// Outline color; `w` multiplies the outline pass alpha.
    pub outline_color: Vec4,

    // ---- Scalar knobs (stored clamped) ----
    #[serde(deserialize_with = "domains::unit")]
    alpha: f32,
    bump_scale: f32,
    #[serde(deserialize_with = "domains::unit")]
    receive_shadow_rate: f32,
    #[serde(deserialize_with = "domains::unit")]
    shading_grade_rate: f32,
    #[serde(deserialize_with = "domains::signed_unit")]
    shade_shift: f32,
    #[serde(deserialize_with = "domains::unit")]
    shade_toony: f32,
    #[serde(deserialize_with = "domains::unit")]
    light_color_attenuation: f32,
    #[serde(deserialize_with = "domains::unit")]
    indirect_light_intensity: f32,
    #[serde(deserialize_with = "domains::unit")]
    rim_lighting_mix: f32,
    #[serde(deserialize_with = "domains::fresnel_power")]
    rim_fresnel_power: f32,
    #[serde(deserialize_with = "domains::unit")]
    rim_lift: f32,
    #[serde(deserialize_with = "domains::outline_width")]
    outline_width: f32,
    #[serde(deserialize_with = "domains::outline_distance")]
    outline_scaled_max_distance: f32,
    #[serde(deserialize_with = "domains::unit")]
    outline_lighting_mix: f32,
    uv_animation_scroll_x: f32,
    uv_animation_scroll_y: f32,
    uv_animation_rotation: f32,
    #[serde(deserialize_with = "domains::unit")]
    alpha_cutoff: f32,
    point_size: f32,

    // ---- Modes ----
    debug_mode: DebugMode,
    outline_width_mode: OutlineWidthMode,
    outline_color_mode: OutlineColorMode,
    cull_mode: CullMode,
    outline_cull_mode: CullMode,
    #[serde(skip)]
    stored_cull_mode: Option<CullMode>,
    side_orientation: SideOrientation,
    transparency_mode: Option<TransparencyMode>,

    // ---- Switches ----
    back_face_culling: bool,
    two_sided_lighting: bool,
    disable_lighting: bool,
    use_alpha_from_diffuse_texture: bool,
    alpha_test: bool,
    alpha_blend: bool,
    premultiply_alpha: bool,
    use_logarithmic_depth: bool,
    points_cloud: bool,

    // ---- Texture slots (host references, not serialized) ----
    #[serde(skip)]
    diffuse_slot: TextureSlot,
    #[serde(skip)]
    emissive_slot: TextureSlot,
    #[serde(skip)]
    bump_slot: TextureSlot,
    #[serde(skip)]
    shade_slot: TextureSlot,
    #[serde(skip)]
    receive_shadow_slot: TextureSlot,
    #[serde(skip)]
    shading_grade_slot: TextureSlot,
    #[serde(skip)]
    rim_slot: TextureSlot,
    #[serde(skip)]
    matcap_slot: TextureSlot,
    #[serde(skip)]
    outline_width_slot: TextureSlot,
    #[serde(skip)]
    uv_animation_mask_slot: TextureSlot,

    #[serde(skip, default = "DirtyCategories::all")]
    dirty: DirtyCategories,
}

impl Default for ToonMaterial {
    fn default() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,

            diffuse_color: Vec3::ONE,
            shade_color: Vec3::new(0.97, 0.81, 0.86),
            ambient_color: Vec3::splat(0.1),
            emissive_color: Vec3::ZERO,
            rim_color: Vec3::ZERO,
            outline_color: Vec4::new(0.0, 0.0, 0.0, 1.0),

            alpha: 1.0,
            bump_scale: 1.0,
            receive_shadow_rate: 1.0,
            shading_grade_rate: 1.0,
            shade_shift: 0.0,
            shade_toony: 0.9,
            light_color_attenuation: 0.0,
            indirect_light_intensity: 0.1,
            rim_lighting_mix: 0.0,
            rim_fresnel_power: 1.0,
            rim_lift: 0.0,
            outline_width: 0.5,
            outline_scaled_max_distance: 1.0,
            outline_lighting_mix: 1.0,
            uv_animation_scroll_x: 0.0,
            uv_animation_scroll_y: 0.0,
            uv_animation_rotation: 0.0,
            alpha_cutoff: 0.5,
            point_size: 1.0,

            debug_mode: DebugMode::None,
            outline_width_mode: OutlineWidthMode::None,
            outline_color_mode: OutlineColorMode::MixedLighting,
            cull_mode: CullMode::Back,
            outline_cull_mode: CullMode::Front,
            stored_cull_mode: None,
            side_orientation: SideOrientation::ClockWise,
            transparency_mode: None,

            back_face_culling: true,
            two_sided_lighting: false,
            disable_lighting: false,
            use_alpha_from_diffuse_texture: true,
            alpha_test: false,
            alpha_blend: false,
            premultiply_alpha: false,
            use_logarithmic_depth: false,
            points_cloud: false,

            diffuse_slot: TextureSlot::default(),
            emissive_slot: TextureSlot::default(),
            bump_slot: TextureSlot::default(),
            shade_slot: TextureSlot::default(),
            receive_shadow_slot: TextureSlot::default(),
            shading_grade_slot: TextureSlot::default(),
            rim_slot: TextureSlot::default(),
            matcap_slot: TextureSlot::default(),
            outline_width_slot: TextureSlot::default(),
            uv_animation_mask_slot: TextureSlot::default(),

            dirty: DirtyCategories::all(),
        }
    }
}

// A clone is an independent material: fresh identity, everything dirty.
impl Clone for ToonMaterial {
    fn clone(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            stored_cull_mode: None,
            dirty: DirtyCategories::all(),
            name: self.name.clone(),
            diffuse_slot: self.diffuse_slot.clone(),
            emissive_slot: self.emissive_slot.clone(),
            bump_slot: self.bump_slot.clone(),
            shade_slot: self.shade_slot.clone(),
            receive_shadow_slot: self.receive_shadow_slot.clone(),
            shading_grade_slot: self.shading_grade_slot.clone(),
            rim_slot: self.rim_slot.clone(),
            matcap_slot: self.matcap_slot.clone(),
            outline_width_slot: self.outline_width_slot.clone(),
            uv_animation_mask_slot: self.uv_animation_mask_slot.clone(),

            diffuse_color: self.diffuse_color,
            shade_color: self.shade_color,
            ambient_color: self.ambient_color,
            emissive_color: self.emissive_color,
            rim_color: self.rim_color,
            outline_color: self.outline_color,
            alpha: self.alpha,
            bump_scale: self.bump_scale,
            receive_shadow_rate: self.receive_shadow_rate,
            shading_grade_rate: self.shading_grade_rate,
            shade_shift: self.shade_shift,
            shade_toony: self.shade_toony,
            light_color_attenuation: self.light_color_attenuation,
            indirect_light_intensity: self.indirect_light_intensity,
            rim_lighting_mix: self.rim_lighting_mix,
            rim_fresnel_power: self.rim_fresnel_power,
            rim_lift: self.rim_lift,
            outline_width: self.outline_width,
            outline_scaled_max_distance: self.outline_scaled_max_distance,
            outline_lighting_mix: self.outline_lighting_mix,
            uv_animation_scroll_x: self.uv_animation_scroll_x,
            uv_animation_scroll_y: self.uv_animation_scroll_y,
            uv_animation_rotation: self.uv_animation_rotation,
            alpha_cutoff: self.alpha_cutoff,
            point_size: self.point_size,
            debug_mode: self.debug_mode,
            outline_width_mode: self.outline_width_mode,
            outline_color_mode: self.outline_color_mode,
            cull_mode: self.cull_mode,
            outline_cull_mode: self.outline_cull_mode,
            side_orientation: self.side_orientation,
            transparency_mode: self.transparency_mode,
            back_face_culling: self.back_face_culling,
            two_sided_lighting: self.two_sided_lighting,
            disable_lighting: self.disable_lighting,
            use_alpha_from_diffuse_texture: self.use_alpha_from_diffuse_texture,
            alpha_test: self.alpha_test,
            alpha_blend: self.alpha_blend,
            premultiply_alpha: self.premultiply_alpha,
            use_logarithmic_depth: self.use_logarithmic_depth,
            points_cloud: self.points_cloud,
        }
    }
}

/// Generates getter + clamping setter pairs for scalar knobs.
macro_rules! clamped_scalars {
    ($( $(#[$doc:meta])* ($field:ident, $setter:ident, $lo:expr, $hi:expr, $dirty:expr) ),* $(,)?) => {
        impl ToonMaterial {
            $(
                $(#[$doc])*
                #[must_use]
                pub fn $field(&self) -> f32 {
                    self.$field
                }

                $(#[$doc])*
                pub fn $setter(&mut self, value: f32) {
                    self.$field = value.clamp($lo, $hi);
                    self.dirty.insert($dirty);
                }
            )*
        }
    };
}

/// Generates getter + setter pairs for unbounded scalars.
macro_rules! free_scalars {
    ($( $(#[$doc:meta])* ($field:ident, $setter:ident, $dirty:expr) ),* $(,)?) => {
        impl ToonMaterial {
            $(
                $(#[$doc])*
                #[must_use]
                pub fn $field(&self) -> f32 {
                    self.$field
                }

                $(#[$doc])*
                pub fn $setter(&mut self, value: f32) {
                    self.$field = value;
                    self.dirty.insert($dirty);
                }
            )*
        }
    };
}

/// Generates slot accessors and texture setters.
macro_rules! texture_slots {
    ($( ($slot:ident, $texture:ident, $setter:ident, $slot_mut:ident, $dirty:expr) ),* $(,)?) => {
        impl ToonMaterial {
            $(
                #[must_use]
                pub fn $texture(&self) -> Option<&TextureRef> {
                    self.$slot.texture()
                }

                pub fn $setter(&mut self, texture: Option<TextureRef>) {
                    self.$slot.set(texture);
                    self.dirty.insert($dirty);
                }

                #[must_use]
                pub fn $slot(&self) -> &TextureSlot {
                    &self.$slot
                }

                /// Mutable slot access (level, UV set, transform). Marks the
                /// owning category dirty.
                pub fn $slot_mut(&mut self) -> &mut TextureSlot {
                    self.dirty.insert($dirty);
                    &mut self.$slot
                }
            )*
        }
    };
}

clamped_scalars! {
    /// Overall opacity.
    (alpha, set_alpha, 0.0, 1.0, DirtyCategories::MISC),
    /// How much the receive-shadow texture darkens lighting.
    (receive_shadow_rate, set_receive_shadow_rate, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// How much the shading-grade texture darkens lighting.
    (shading_grade_rate, set_shading_grade_rate, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// Shifts the lit/shade boundary along the light intensity axis.
    (shade_shift, set_shade_shift, -1.0, 1.0, DirtyCategories::LIGHTS),
    /// 0 = soft gradient, 1 = hard toon step at `shade_shift`.
    (shade_toony, set_shade_toony, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// Desaturates colored lights toward their grayscale.
    (light_color_attenuation, set_light_color_attenuation, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// Blend factor of the indirect (ambient) term.
    (indirect_light_intensity, set_indirect_light_intensity, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// 0 = static unlit rim, 1 = rim fully modulated by lighting.
    (rim_lighting_mix, set_rim_lighting_mix, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// Fresnel exponent of the rim term.
    (rim_fresnel_power, set_rim_fresnel_power, 0.0, 100.0, DirtyCategories::LIGHTS),
    /// Additive lift inside the rim fresnel clamp.
    (rim_lift, set_rim_lift, 0.0, 1.0, DirtyCategories::LIGHTS),
    /// Outline thickness.
    (outline_width, set_outline_width, 0.01, 1.0, DirtyCategories::ATTRIBUTES),
    /// Screen-space outline distance clamp.
    (outline_scaled_max_distance, set_outline_scaled_max_distance, 1.0, 10.0, DirtyCategories::ATTRIBUTES),
    /// 0 = flat outline color, 1 = outline tinted by lighting.
    (outline_lighting_mix, set_outline_lighting_mix, 0.0, 1.0, DirtyCategories::ATTRIBUTES),
    /// Alpha test threshold.
    (alpha_cutoff, set_alpha_cutoff, 0.0, 1.0, DirtyCategories::LIGHTS),
}

free_scalars! {
    /// Normal map intensity.
    (bump_scale, set_bump_scale, DirtyCategories::TEXTURES),
    /// UV scroll speed along u.
    (uv_animation_scroll_x, set_uv_animation_scroll_x, DirtyCategories::MISC),
    /// UV scroll speed along v.
    (uv_animation_scroll_y, set_uv_animation_scroll_y, DirtyCategories::MISC),
    /// UV rotation speed, turns per second.
    (uv_animation_rotation, set_uv_animation_rotation, DirtyCategories::MISC),
    /// Point primitive size.
    (point_size, set_point_size, DirtyCategories::MISC),
}

texture_slots! {
    // The diffuse slot also drives alpha behavior, hence the extra misc bit.
    (diffuse_slot, diffuse_texture, set_diffuse_texture, diffuse_slot_mut,
        DirtyCategories::TEXTURES.union(DirtyCategories::MISC)),
    (emissive_slot, emissive_texture, set_emissive_texture, emissive_slot_mut, DirtyCategories::TEXTURES),
    (bump_slot, bump_texture, set_bump_texture, bump_slot_mut, DirtyCategories::TEXTURES),
    (shade_slot, shade_texture, set_shade_texture, shade_slot_mut, DirtyCategories::TEXTURES),
    (receive_shadow_slot, receive_shadow_texture, set_receive_shadow_texture, receive_shadow_slot_mut, DirtyCategories::TEXTURES),
    (shading_grade_slot, shading_grade_texture, set_shading_grade_texture, shading_grade_slot_mut, DirtyCategories::TEXTURES),
    (rim_slot, rim_texture, set_rim_texture, rim_slot_mut, DirtyCategories::TEXTURES),
    (matcap_slot, matcap_texture, set_matcap_texture, matcap_slot_mut, DirtyCategories::TEXTURES),
    (outline_width_slot, outline_width_texture, set_outline_width_texture, outline_width_slot_mut, DirtyCategories::TEXTURES),
    (uv_animation_mask_slot, uv_animation_mask_texture, set_uv_animation_mask_texture, uv_animation_mask_slot_mut, DirtyCategories::TEXTURES),
}

impl ToonMaterial {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    // ---- Dirty tracking ----

    #[inline]
    #[must_use]
    pub fn dirty(&self) -> DirtyCategories {
        self.dirty
    }

    pub fn mark_dirty(&mut self, categories: DirtyCategories) {
        self.dirty.insert(categories);
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyCategories::all();
    }

    /// Resets categories. Called by the runtime after a successful
    /// recompile/re-bind cycle, never from setters.
    pub fn clear_dirty(&mut self, categories: DirtyCategories) {
        self.dirty.remove(categories);
    }

    // ---- Modes ----

    #[must_use]
    pub fn debug_mode(&self) -> DebugMode {
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, mode: DebugMode) {
        self.debug_mode = mode;
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn outline_width_mode(&self) -> OutlineWidthMode {
        self.outline_width_mode
    }

    pub fn set_outline_width_mode(&mut self, mode: OutlineWidthMode) {
        self.outline_width_mode = mode;
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn outline_color_mode(&self) -> OutlineColorMode {
        self.outline_color_mode
    }

    pub fn set_outline_color_mode(&mut self, mode: OutlineColorMode) {
        self.outline_color_mode = mode;
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    /// Sets the fill-pass cull mode. Back-face culling, side orientation and
    /// two-sided lighting are derived from it:
    ///
    /// - `Off`: draw both faces, single-sided lighting
    /// - `Front`: draw back faces only, two-sided lighting
    /// - `Back`: draw front faces only, single-sided lighting
    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
        match mode {
            CullMode::Off => {
                self.back_face_culling = false;
                self.side_orientation = SideOrientation::ClockWise;
                self.two_sided_lighting = false;
            }
            CullMode::Front => {
                self.back_face_culling = true;
                self.side_orientation = SideOrientation::CounterClockWise;
                self.two_sided_lighting = true;
            }
            CullMode::Back => {
                self.back_face_culling = true;
                self.side_orientation = SideOrientation::ClockWise;
                self.two_sided_lighting = false;
            }
        }
        self.dirty
            .insert(DirtyCategories::MISC | DirtyCategories::TEXTURES);
    }

    #[must_use]
    pub fn outline_cull_mode(&self) -> CullMode {
        self.outline_cull_mode
    }

    pub fn set_outline_cull_mode(&mut self, mode: CullMode) {
        self.outline_cull_mode = mode;
        self.dirty.insert(DirtyCategories::MISC);
    }

    /// Swaps in the outline cull mode for the outline pass.
    pub fn apply_outline_cull_mode(&mut self) {
        self.stored_cull_mode = Some(self.cull_mode);
        self.set_cull_mode(self.outline_cull_mode);
    }

    /// Restores the fill-pass cull mode after the outline pass.
    pub fn restore_outline_cull_mode(&mut self) {
        if let Some(stored) = self.stored_cull_mode.take() {
            self.set_cull_mode(stored);
        }
    }

    #[must_use]
    pub fn side_orientation(&self) -> SideOrientation {
        self.side_orientation
    }

    #[must_use]
    pub fn transparency_mode(&self) -> Option<TransparencyMode> {
        self.transparency_mode
    }

    // ---- Switches ----

    #[must_use]
    pub fn back_face_culling(&self) -> bool {
        self.back_face_culling
    }

    #[must_use]
    pub fn two_sided_lighting(&self) -> bool {
        self.two_sided_lighting
    }

    pub fn set_two_sided_lighting(&mut self, value: bool) {
        self.two_sided_lighting = value;
        self.dirty.insert(DirtyCategories::TEXTURES);
    }

    #[must_use]
    pub fn disable_lighting(&self) -> bool {
        self.disable_lighting
    }

    pub fn set_disable_lighting(&mut self, value: bool) {
        self.disable_lighting = value;
        self.dirty.insert(DirtyCategories::LIGHTS);
    }

    #[must_use]
    pub fn use_alpha_from_diffuse_texture(&self) -> bool {
        self.use_alpha_from_diffuse_texture
    }

    pub fn set_use_alpha_from_diffuse_texture(&mut self, value: bool) {
        self.use_alpha_from_diffuse_texture = value;
        self.dirty
            .insert(DirtyCategories::TEXTURES | DirtyCategories::MISC);
    }

    #[must_use]
    pub fn alpha_test(&self) -> bool {
        self.alpha_test
    }

    pub fn set_alpha_test(&mut self, value: bool) {
        self.alpha_test = value;
        self.transparency_mode = Some(if value {
            if self.alpha_blend {
                TransparencyMode::AlphaTestAndBlend
            } else {
                TransparencyMode::AlphaTest
            }
        } else {
            TransparencyMode::Opaque
        });
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn alpha_blend(&self) -> bool {
        self.alpha_blend
    }

    pub fn set_alpha_blend(&mut self, value: bool) {
        self.alpha_blend = value;
        if value {
            self.back_face_culling = true;
            self.transparency_mode = Some(if self.alpha_test {
                TransparencyMode::AlphaTestAndBlend
            } else {
                TransparencyMode::AlphaBlend
            });
        } else {
            self.transparency_mode = Some(TransparencyMode::Opaque);
        }
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn premultiply_alpha(&self) -> bool {
        self.premultiply_alpha
    }

    pub fn set_premultiply_alpha(&mut self, value: bool) {
        self.premultiply_alpha = value;
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn use_logarithmic_depth(&self) -> bool {
        self.use_logarithmic_depth
    }

    /// Requests logarithmic depth; resolution additionally gates it on the
    /// runtime capability (`SceneCaps::fragment_depth_supported`).
    pub fn set_use_logarithmic_depth(&mut self, value: bool) {
        self.use_logarithmic_depth = value;
        self.dirty.insert(DirtyCategories::MISC);
    }

    #[must_use]
    pub fn points_cloud(&self) -> bool {
        self.points_cloud
    }

    pub fn set_points_cloud(&mut self, value: bool) {
        self.points_cloud = value;
        self.dirty.insert(DirtyCategories::MISC);
    }

    // ---- Derived alpha queries ----

    /// Whether the diffuse texture provides a usable alpha channel.
    #[must_use]
    pub fn has_alpha_channel(&self) -> bool {
        self.diffuse_slot
            .texture()
            .is_some_and(TextureRef::has_alpha)
    }

    /// Whether transparency comes from the diffuse texture alpha channel.
    #[must_use]
    pub fn should_use_alpha_from_diffuse(&self) -> bool {
        self.has_alpha_channel()
            && self.use_alpha_from_diffuse_texture
            && self.transparency_mode != Some(TransparencyMode::Opaque)
    }

    #[must_use]
    pub fn needs_alpha_blending(&self) -> bool {
        self.alpha_blend || self.alpha < 1.0 || self.should_use_alpha_from_diffuse()
    }

    #[must_use]
    pub fn needs_alpha_testing(&self) -> bool {
        self.alpha_test
            || (self.has_alpha_channel()
                && matches!(
                    self.transparency_mode,
                    None | Some(TransparencyMode::AlphaTest)
                ))
    }
}
