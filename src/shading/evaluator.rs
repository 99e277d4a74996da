//! Toon lighting evaluation.
//!
//! The per-fragment algorithm, expressed on the CPU: the accumulation
//! protocol is a general algorithm independent of execution stage, and this
//! is the reference the generated WGSL mirrors. Texture sampling is an
//! external service; callers pass pre-sampled values in [`SurfaceSamples`]
//! (level scales already applied).
//!
//! Accumulation deliberately compresses: per-light colors are summed, their
//! mean is run through a hyperbolic-sine gain, and the final color is
//! floor-clamped to never exceed the lit albedo. These are tuned stylistic
//! choices, kept in their exact functional form rather than replaced with a
//! physically-derived alternative.

use glam::{Vec2, Vec3, Vec4};
use smallvec::SmallVec;

use crate::resources::material::{
    DebugMode, OutlineColorMode, ToonMaterial, MAX_SIMULTANEOUS_LIGHTS,
};
use crate::scene::light::Light;

const EPS_COL: f32 = 1e-5;

// ─── Pure building blocks ────────────────────────────────────────────────────

/// Max-component grayscale, floored away from zero.
#[must_use]
pub fn grayscale_max(color: Vec3) -> Vec3 {
    Vec3::splat(color.x.max(color.y).max(color.z).max(EPS_COL))
}

/// Blends a light color toward its own grayscale, desaturating it.
#[must_use]
pub fn attenuate_light_color(color: Vec3, attenuation: f32) -> Vec3 {
    color.lerp(grayscale_max(color), attenuation)
}

/// The toony remap: light intensity in [-1, 1] is linearly remapped from the
/// window `[lerp(-1, shade_shift, shade_toony), lerp(1, shade_shift,
/// shade_toony)]` to [0, 1] and clamped. At `shade_toony = 0` this is the
/// plain half-Lambert ramp; at `shade_toony = 1` the window collapses and
/// the result is a hard step at `intensity = shade_shift`.
#[must_use]
pub fn remap_toony(intensity: f32, shade_shift: f32, shade_toony: f32) -> f32 {
    let min_threshold = -1.0 + shade_toony * (shade_shift + 1.0);
    let max_threshold = 1.0 + shade_toony * (shade_shift - 1.0);
    ((intensity - min_threshold) / (max_threshold - min_threshold).max(EPS_COL)).clamp(0.0, 1.0)
}

/// The soft-compressive accumulation gain: `sinh(mean / 2)` per component.
/// With zero lights the gain is identity so the indirect terms stay defined.
#[must_use]
pub fn light_gain(total_lighting: Vec3, light_count: usize) -> Vec3 {
    if light_count == 0 {
        return Vec3::ONE;
    }
    let mean = total_lighting / light_count as f32 / 2.0;
    Vec3::new(mean.x.sinh(), mean.y.sinh(), mean.z.sinh())
}

/// Rim fresnel factor.
#[must_use]
pub fn rim_factor(normal: Vec3, view_dir: Vec3, rim_lift: f32, rim_fresnel_power: f32) -> f32 {
    (1.0 - normal.dot(view_dir) + rim_lift)
        .clamp(0.0, 1.0)
        .powf(rim_fresnel_power)
}

/// Matcap UV from the view-space basis projected onto the normal.
/// `v` is flipped for top-left-origin sampling.
#[must_use]
pub fn matcap_uv(view_dir: Vec3, eye_up: Vec3, normal: Vec3) -> Vec2 {
    let world_view_up = (eye_up - view_dir * view_dir.dot(eye_up)).normalize_or_zero();
    let world_view_right = view_dir.cross(world_view_up).normalize_or_zero();
    let uv = Vec2::new(world_view_right.dot(normal), world_view_up.dot(normal)) * 0.5 + 0.5;
    Vec2::new(uv.x, 1.0 - uv.y)
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// One visible light as the evaluator sees it.
#[derive(Debug, Clone, Copy)]
pub struct LightInput {
    /// Normalized direction from the surface toward the light.
    pub direction: Vec3,
    /// Light color premultiplied by intensity.
    pub color: Vec3,
    /// Shadow-map attenuation for this fragment, 1 = unshadowed.
    pub shadow_attenuation: f32,
}

impl LightInput {
    #[must_use]
    pub fn from_light(light: &Light, surface_point: Vec3, shadow_attenuation: f32) -> Self {
        Self {
            direction: light.shading_direction(surface_point),
            color: light.effective_color(),
            shadow_attenuation,
        }
    }
}

/// Pre-sampled texture values for one fragment. Defaults are the neutral
/// values used when the corresponding texture flag is off.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSamples {
    /// Diffuse sample, rgba.
    pub diffuse: Vec4,
    pub shade: Vec3,
    /// Receive-shadow sample (`.r`).
    pub receive_shadow: f32,
    /// Shading-grade sample (`.r`).
    pub shading_grade: f32,
    pub rim: Vec3,
    /// Matcap sample; zero when no matcap texture is bound.
    pub matcap: Vec3,
    pub emissive: Vec3,
}

impl Default for SurfaceSamples {
    fn default() -> Self {
        Self {
            diffuse: Vec4::ONE,
            shade: Vec3::ONE,
            receive_shadow: 1.0,
            shading_grade: 1.0,
            rim: Vec3::ONE,
            matcap: Vec3::ZERO,
            emissive: Vec3::ONE,
        }
    }
}

/// Per-fragment geometry and frame state.
#[derive(Debug, Clone, Copy)]
pub struct FragmentContext {
    pub world_position: Vec3,
    /// World normal, normalized.
    pub normal: Vec3,
    /// Normalized direction from the surface toward the eye.
    pub view_dir: Vec3,
    pub eye_up: Vec3,
    /// Scene ambient already multiplied with the material ambient color.
    pub ambient_color: Vec3,
    pub is_outline: bool,
    pub front_facing: bool,
}

impl Default for FragmentContext {
    fn default() -> Self {
        Self {
            world_position: Vec3::ZERO,
            normal: Vec3::Z,
            view_dir: Vec3::Z,
            eye_up: Vec3::Y,
            ambient_color: Vec3::ONE,
            is_outline: false,
            front_facing: true,
        }
    }
}

/// Evaluation result. `Discarded` models the alpha-test discard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FragmentOutput {
    Color(Vec4),
    Discarded,
}

impl FragmentOutput {
    #[must_use]
    pub fn color(&self) -> Option<Vec4> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Discarded => None,
        }
    }
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

/// The toon lighting evaluator. Holds only the transient per-fragment light
/// accumulator, reset at the start of every evaluation; nothing persists
/// across frames or fragments.
#[derive(Debug, Default)]
pub struct ToonShader {
    per_light: SmallVec<[Vec3; MAX_SIMULTANEOUS_LIGHTS]>,
}

impl ToonShader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates the final fragment color for the fill or outline pass.
    pub fn shade_fragment(
        &mut self,
        material: &ToonMaterial,
        ctx: &FragmentContext,
        lights: &[LightInput],
        samples: &SurfaceSamples,
    ) -> FragmentOutput {
        let lights = &lights[..lights.len().min(MAX_SIMULTANEOUS_LIGHTS)];

        let mut normal = ctx.normal.normalize_or_zero();
        if !ctx.front_facing
            && !material.back_face_culling()
            && material.two_sided_lighting()
            && !material.disable_lighting()
        {
            normal = -normal;
        }

        // Albedo inputs
        let shade_albedo = material.shade_color * samples.shade;
        let lit = material.diffuse_color.extend(material.alpha())
            * samples.diffuse;
        let lit_albedo = lit.truncate();

        // Light color pre-pass: attenuated, shadowed per-light colors feed
        // the compressive gain before any albedo mixing happens.
        self.per_light.clear();
        let mut total_lighting = Vec3::ZERO;
        for light in lights {
            let mut lighting = light.color * step(0.5, light.direction.length());
            lighting = attenuate_light_color(lighting, material.light_color_attenuation());
            lighting *= light.shadow_attenuation;
            self.per_light.push(lighting);
            total_lighting += lighting;
        }
        let gain = light_gain(total_lighting, lights.len());

        let receive_shadow = material.receive_shadow_rate() * samples.receive_shadow;
        let shading_grade =
            1.0 - material.shading_grade_rate() * (1.0 - samples.shading_grade);

        let mut col = Vec3::ZERO;
        let mut mean_intensity = 0.0;
        for (light, &lighting) in lights.iter().zip(&self.per_light) {
            let dot_nl = light.direction.dot(normal);
            let attenuation = light.shadow_attenuation
                * lerp(1.0, light.shadow_attenuation, receive_shadow);

            let mut intensity = dot_nl * 0.5 + 0.5;
            intensity *= attenuation;
            intensity *= shading_grade;
            intensity = intensity * 2.0 - 1.0;
            let remapped =
                remap_toony(intensity, material.shade_shift(), material.shade_toony());
            mean_intensity += remapped / lights.len() as f32;

            let albedo = shade_albedo.lerp(lit_albedo, remapped);
            col += albedo * lighting * gain;
        }

        // Indirect light, blended separately and added on top
        let ambient = ctx.ambient_color;
        let mut indirect = grayscale_max(ambient).lerp(ambient, material.indirect_light_intensity());
        indirect = attenuate_light_color(indirect, material.light_color_attenuation());
        if lights.is_empty() {
            // fully shaded: the ambient term lights the shade albedo
            col += indirect * shade_albedo;
        } else {
            col += indirect * lit_albedo * gain;
        }
        // floor-clamp to the lit albedo; drop for strict PBR-style results
        col = col.min(lit_albedo);

        // Parametric rim lighting, suppressed on the outline pass
        if !ctx.is_outline {
            let static_rim = Vec3::ONE;
            let mixed_rim = total_lighting * gain + indirect;
            let rim_lighting = static_rim.lerp(mixed_rim, material.rim_lighting_mix());
            let rim = rim_factor(
                normal,
                ctx.view_dir,
                material.rim_lift(),
                material.rim_fresnel_power(),
            ) * material.rim_color
                * samples.rim;
            col += rim * rim_lighting * gain;

            // Additive matcap
            col += samples.matcap * gain;

            // Emission, independent of lighting
            col += material.emissive_color * samples.emissive;
        }

        // Alpha
        let mut alpha = if material.should_use_alpha_from_diffuse() {
            lit.w
        } else {
            1.0
        };
        if ctx.is_outline {
            alpha *= material.outline_color.w;
        }

        // Outline color path
        if ctx.is_outline {
            col = match material.outline_color_mode() {
                OutlineColorMode::FixedColor => material.outline_color.truncate(),
                OutlineColorMode::MixedLighting => {
                    material.outline_color.truncate()
                        * Vec3::ONE.lerp(col, material.outline_lighting_mix())
                }
            };
        }

        // Debug overrides short-circuit the composited path entirely
        match material.debug_mode() {
            DebugMode::Normal => {
                return FragmentOutput::Color((normal * 0.5 + 0.5).extend(lit.w));
            }
            DebugMode::LitShadeRate => {
                return FragmentOutput::Color(Vec3::splat(mean_intensity).extend(lit.w));
            }
            DebugMode::None => {}
        }

        if material.needs_alpha_testing() {
            if alpha < material.alpha_cutoff() {
                return FragmentOutput::Discarded;
            }
            if !material.needs_alpha_blending() {
                alpha = 1.0;
            }
        }

        col = col.max(Vec3::ZERO);
        if material.premultiply_alpha() {
            col *= alpha;
        }
        FragmentOutput::Color(col.extend(alpha))
    }
}

#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
