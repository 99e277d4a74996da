//! Shader variant compilation and caching.
//!
//! A [`Variant`] is one compiled program for one canonical feature flag set,
//! together with the exact attribute / uniform / sampler name lists and the
//! matching uniform layout. Variants are immutable after creation and shared:
//! two materials whose stores resolve to the same flag set reuse the same
//! cached variant, so exactly one compilation occurs across both.
//!
//! Compilation goes through the host-provided [`ProgramBackend`]; on failure
//! the cache walks a fixed-priority fallback ladder, disabling one define at
//! a time until the backend accepts the source or the ladder is exhausted.

use std::sync::Arc;

use log::{debug, warn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{Result, SumiError};
use crate::pipeline::flags::FeatureFlags;
use crate::pipeline::shader_manager::ShaderGenerator;
use crate::pipeline::uniform_layout::UniformLayout;

/// Opaque handle to a backend-owned compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// A compile request rejected by the backend.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub message: String,
}

/// Everything the backend needs to build one program.
#[derive(Debug)]
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    /// Final generated WGSL source.
    pub source: &'a str,
    /// Canonical flag string of the variant being compiled.
    pub flag_key: &'a str,
    pub attributes: &'a [&'static str],
    pub uniform_names: &'a [&'static str],
    pub sampler_names: &'a [&'static str],
}

/// The external program compilation service.
///
/// Compilation is the only operation allowed to be asynchronous: `compile`
/// may return a handle whose program is still building, observed through
/// `poll_ready`. Completion is polled, never delivered via callbacks.
pub trait ProgramBackend {
    fn compile(
        &mut self,
        desc: &ProgramDescriptor<'_>,
    ) -> std::result::Result<ProgramHandle, CompileError>;

    /// Non-blocking readiness poll.
    fn poll_ready(&self, program: ProgramHandle) -> bool;

    /// Releases a program. Called exactly once per handle, on cache disposal.
    fn destroy(&mut self, program: ProgramHandle);
}

/// Defines disabled progressively when compilation fails, in priority order.
pub const FALLBACK_LADDER: &[&str] = &[
    "BUMP",
    "FOG",
    "POINT_SIZE",
    "LOG_DEPTH",
    "SHADOW_CSM",
    "SHADOWS",
    "MULTIVIEW",
];

/// One compiled shader variant. Never mutated after creation.
#[derive(Debug)]
pub struct Variant {
    flag_key: String,
    program: ProgramHandle,
    source_hash: u128,
    attributes: Vec<&'static str>,
    uniform_names: Vec<&'static str>,
    sampler_names: Vec<&'static str>,
    layout: UniformLayout,
    /// Defines the fallback ladder had to drop to get this variant compiled.
    dropped_defines: SmallVec<[&'static str; 4]>,
}

impl Variant {
    #[inline]
    #[must_use]
    pub fn flag_key(&self) -> &str {
        &self.flag_key
    }

    #[inline]
    #[must_use]
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    #[inline]
    #[must_use]
    pub fn source_hash(&self) -> u128 {
        self.source_hash
    }

    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[&'static str] {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn uniform_names(&self) -> &[&'static str] {
        &self.uniform_names
    }

    #[inline]
    #[must_use]
    pub fn sampler_names(&self) -> &[&'static str] {
        &self.sampler_names
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn dropped_defines(&self) -> &[&'static str] {
        &self.dropped_defines
    }

    /// Polls the backend for program readiness.
    #[inline]
    #[must_use]
    pub fn is_ready(&self, backend: &dyn ProgramBackend) -> bool {
        backend.poll_ready(self.program)
    }
}

/// Vertex attribute names for a flag set, in fixed buffer order.
fn attribute_list(flags: &FeatureFlags) -> Vec<&'static str> {
    let mut attributes = vec!["position"];
    if flags.contains("NORMAL") {
        attributes.push("normal");
    }
    if flags.contains("TANGENT") {
        attributes.push("tangent");
    }
    if flags.contains("UV1") {
        attributes.push("uv");
    }
    if flags.contains("UV2") {
        attributes.push("uv2");
    }
    if flags.contains("SKINNING") {
        attributes.push("joints");
        attributes.push("weights");
    }
    attributes
}

/// Sampler names for a flag set, in binding order.
fn sampler_list(flags: &FeatureFlags) -> Vec<&'static str> {
    let table: &[(&str, &str)] = &[
        ("DIFFUSE", "diffuse_texture"),
        ("EMISSIVE", "emissive_texture"),
        ("BUMP", "bump_texture"),
        ("SHADE", "shade_texture"),
        ("RECEIVE_SHADOW", "receive_shadow_texture"),
        ("SHADING_GRADE", "shading_grade_texture"),
        ("RIM", "rim_texture"),
        ("MATCAP", "matcap_texture"),
        ("OUTLINE_WIDTH", "outline_width_texture"),
        ("UV_ANIMATION_MASK", "uv_animation_mask_texture"),
    ];
    table
        .iter()
        .filter(|(flag, _)| flags.contains(flag))
        .map(|&(_, name)| name)
        .collect()
}

/// Maps a canonical flag string to its compiled [`Variant`].
#[derive(Default)]
pub struct VariantCache {
    variants: FxHashMap<String, Arc<Variant>>,
}

impl VariantCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached variants (equals the number of compilations issued).
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    #[must_use]
    pub fn get(&self, flag_key: &str) -> Option<Arc<Variant>> {
        self.variants.get(flag_key).cloned()
    }

    /// Looks up or compiles the variant for `flags`.
    ///
    /// On a miss the WGSL template is rendered and handed to the backend with
    /// the flag-derived attribute/uniform/sampler lists. Rejections walk the
    /// fallback ladder; exhaustion is fatal and the returned error names
    /// every flag set attempted.
    pub fn get_or_compile(
        &mut self,
        backend: &mut dyn ProgramBackend,
        flags: &FeatureFlags,
    ) -> Result<Arc<Variant>> {
        let flag_key = flags.cache_key();
        if let Some(variant) = self.variants.get(&flag_key) {
            return Ok(variant.clone());
        }

        let mut working = flags.clone();
        let mut dropped: SmallVec<[&'static str; 4]> = SmallVec::new();
        let mut attempted: Vec<String> = Vec::new();

        loop {
            let source = ShaderGenerator::generate("toon", &working)?;
            let source_hash = ShaderGenerator::source_hash(&source);
            let attributes = attribute_list(&working);
            let sampler_names = sampler_list(&working);
            let layout = UniformLayout::build(&working);
            let uniform_names = layout.slot_names();
            let working_key = working.cache_key();
            attempted.push(working_key.clone());

            let desc = ProgramDescriptor {
                label: "toon",
                source: &source,
                flag_key: &working_key,
                attributes: &attributes,
                uniform_names: &uniform_names,
                sampler_names: &sampler_names,
            };

            match backend.compile(&desc) {
                Ok(program) => {
                    debug!(
                        "compiled toon variant [{working_key}] ({} dropped defines)",
                        dropped.len()
                    );
                    let variant = Arc::new(Variant {
                        flag_key: flag_key.clone(),
                        program,
                        source_hash,
                        attributes,
                        uniform_names,
                        sampler_names,
                        layout,
                        dropped_defines: dropped,
                    });
                    self.variants.insert(flag_key, variant.clone());
                    return Ok(variant);
                }
                Err(err) => {
                    let next = FALLBACK_LADDER
                        .iter()
                        .copied()
                        .find(|define| working.contains(define));
                    match next {
                        Some(define) => {
                            warn!(
                                "toon variant [{working_key}] failed to compile ({}); retrying without {define}",
                                err.message
                            );
                            working.remove(define);
                            dropped.push(define);
                        }
                        None => {
                            return Err(SumiError::ShaderCompileExhausted { attempted });
                        }
                    }
                }
            }
        }
    }

    /// Releases every cached program handle exactly once and clears the
    /// cache. Call when the owning material set is disposed.
    pub fn dispose(&mut self, backend: &mut dyn ProgramBackend) {
        for variant in self.variants.values() {
            backend.destroy(variant.program);
        }
        self.variants.clear();
    }
}
