//! Uniform layout building.
//!
//! The layout is an append-only list of `(name, component-count)` slots built
//! once per variant. Its order must match the shader-side declaration order
//! byte for byte — host and device disagree catastrophically on a mismatch —
//! so slots are appended in one fixed canonical order regardless of which
//! flags are set. Conditionally-present slots are simply omitted, never
//! reordered.
//!
//! Layout violations (duplicate names, wrong component counts on write) are
//! programming errors, not runtime conditions: they panic and are caught by
//! tests.

use rustc_hash::FxHashMap;

use crate::pipeline::flags::FeatureFlags;
use crate::utils::interner::{self, Symbol};

/// Ordered sequence of named uniform slots with fixed component counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    slots: Vec<(Symbol, u32)>,
    component_count: u32,
}

impl UniformLayout {
    /// Builds the layout for a flag set, in canonical order.
    #[must_use]
    pub fn build(flags: &FeatureFlags) -> Self {
        let mut layout = Self::default();

        layout.push("diffuse_color", 4);
        if flags.contains("DIFFUSE") {
            layout.push("diffuse_info", 2);
            layout.push("diffuse_matrix", 16);
        }

        layout.push("emissive_color", 3);
        if flags.contains("EMISSIVE") {
            layout.push("emissive_info", 2);
            layout.push("emissive_matrix", 16);
        }

        if flags.contains("BUMP") {
            layout.push("bump_info", 3);
            layout.push("bump_matrix", 16);
            layout.push("tangent_space_params", 2);
        }

        layout.push("shade_color", 3);
        if flags.contains("SHADE") {
            layout.push("shade_info", 2);
            layout.push("shade_matrix", 16);
        }

        if flags.contains("RECEIVE_SHADOW") {
            layout.push("receive_shadow_info", 2);
            layout.push("receive_shadow_matrix", 16);
        }

        if flags.contains("SHADING_GRADE") {
            layout.push("shading_grade_info", 2);
            layout.push("shading_grade_matrix", 16);
        }

        layout.push("rim_color", 3);
        if flags.contains("RIM") {
            layout.push("rim_info", 2);
            layout.push("rim_matrix", 16);
        }

        if flags.contains("MATCAP") {
            layout.push("matcap_info", 2);
            layout.push("matcap_matrix", 16);
        }

        layout.push("outline_color", 4);
        if flags.contains("OUTLINE_WIDTH") {
            layout.push("outline_width_info", 2);
            layout.push("outline_width_matrix", 16);
        }

        if flags.contains("UV_ANIMATION_MASK") {
            layout.push("uv_animation_mask_info", 2);
            layout.push("uv_animation_mask_matrix", 16);
        }

        if flags.contains("POINT_SIZE") {
            layout.push("point_size", 1);
        }

        layout.push("shading_grade_rate", 1);
        layout.push("receive_shadow_rate", 1);
        layout.push("shade_shift", 1);
        layout.push("shade_toony", 1);
        layout.push("light_color_attenuation", 1);
        layout.push("indirect_light_intensity", 1);
        layout.push("rim_lighting_mix", 1);
        layout.push("rim_fresnel_power", 1);
        layout.push("rim_lift", 1);
        layout.push("outline_width", 1);
        layout.push("outline_scaled_max_distance", 1);
        layout.push("outline_lighting_mix", 1);
        layout.push("uv_animation_scroll_x", 1);
        layout.push("uv_animation_scroll_y", 1);
        layout.push("uv_animation_rotation", 1);

        if flags.contains("ALPHATEST") {
            layout.push("alpha_cutoff", 1);
        }

        layout
    }

    fn push(&mut self, name: &str, components: u32) {
        let sym = interner::intern(name);
        debug_assert!(
            !self.slots.iter().any(|&(s, _)| s == sym),
            "duplicate uniform slot name: {name}"
        );
        self.slots.push((sym, components));
        self.component_count += components;
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total f32 component count over all slots.
    #[inline]
    #[must_use]
    pub fn component_count(&self) -> u32 {
        self.component_count
    }

    /// Slot index of `name`, if present.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let sym = interner::get(name)?;
        self.slots.iter().position(|&(s, _)| s == sym)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Iterates `(name, component_count)` in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.slots
            .iter()
            .map(|&(sym, comps)| (interner::resolve(sym), comps))
    }

    /// Uniform slot names in declaration order (variant metadata).
    #[must_use]
    pub fn slot_names(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .map(|&(sym, _)| interner::resolve(sym))
            .collect()
    }
}

/// A materialized uniform buffer matching one [`UniformLayout`]: contiguous
/// f32 storage plus per-name offsets. Rebuilt contents every bind, reused
/// allocation.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    data: Vec<f32>,
    offsets: FxHashMap<Symbol, (u32, u32)>,
}

impl UniformBlock {
    #[must_use]
    pub fn new(layout: &UniformLayout) -> Self {
        let mut offsets = FxHashMap::default();
        let mut offset = 0u32;
        for &(sym, comps) in &layout.slots {
            offsets.insert(sym, (offset, comps));
            offset += comps;
        }
        Self {
            data: vec![0.0; offset as usize],
            offsets,
        }
    }

    /// Writes a slot value.
    ///
    /// # Panics
    ///
    /// Panics when the slot does not exist in the layout or the value's
    /// component count differs from the slot's declared size. Both are
    /// invariant violations, not recoverable runtime errors.
    pub fn set(&mut self, name: &str, values: &[f32]) {
        let sym = interner::intern(name);
        let Some(&(offset, comps)) = self.offsets.get(&sym) else {
            panic!("uniform slot not in layout: {name}");
        };
        assert!(
            values.len() == comps as usize,
            "uniform slot {name} expects {comps} components, got {}",
            values.len()
        );
        self.data[offset as usize..offset as usize + comps as usize].copy_from_slice(values);
    }

    pub fn set_f32(&mut self, name: &str, value: f32) {
        self.set(name, &[value]);
    }

    pub fn set_vec2(&mut self, name: &str, value: glam::Vec2) {
        self.set(name, &value.to_array());
    }

    pub fn set_vec3(&mut self, name: &str, value: glam::Vec3) {
        self.set(name, &value.to_array());
    }

    pub fn set_vec4(&mut self, name: &str, value: glam::Vec4) {
        self.set(name, &value.to_array());
    }

    pub fn set_mat4(&mut self, name: &str, value: glam::Mat4) {
        self.set(name, &value.to_cols_array());
    }

    /// Reads a slot value back (tests, debugging).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        let sym = interner::get(name)?;
        let &(offset, comps) = self.offsets.get(&sym)?;
        Some(&self.data[offset as usize..offset as usize + comps as usize])
    }

    /// The packed f32 contents in layout order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The packed contents as bytes, ready for upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
