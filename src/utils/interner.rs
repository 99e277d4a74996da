//! Global string interner.
//!
//! Flag names and uniform slot names are interned once and afterwards
//! compared and hashed as plain integers. This keeps flag-set comparison on
//! the per-frame path cheap and guarantees that identical names always
//! resolve to the same [`Symbol`].

use std::sync::OnceLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: OnceLock<ThreadedRodeo> = OnceLock::new();

/// A compact integer identifier for an interned string.
pub type Symbol = Spur;

fn interner() -> &'static ThreadedRodeo {
    INTERNER.get_or_init(ThreadedRodeo::new)
}

/// Interns a string, returning its [`Symbol`].
///
/// Returns the existing symbol if the string was interned before.
#[inline]
pub fn intern(s: &str) -> Symbol {
    interner().get_or_intern(s)
}

/// Looks up the [`Symbol`] of an already-interned string without allocating.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Symbol> {
    interner().get(s)
}

/// Resolves a [`Symbol`] back to its string.
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> &'static str {
    interner().resolve(&sym)
}

/// Pre-interns the flag names produced by the resolver so the hot path never
/// pays the first-intern cost mid-frame. Called from shader environment
/// initialization; safe to call more than once.
pub fn preload_common_flags() {
    let common = [
        // Texture-derived flags
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
        // Light-derived flags
        "NUM_LIGHTS",
        "SHADOWS",
        "SHADOW_CSM",
        // Mesh attribute flags
        "NORMAL",
        "TANGENT",
        "UV1",
        "UV2",
        "SKINNING",
        "MORPH_TARGETS",
        // Misc flags
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
    for name in common {
        intern(name);
    }
}
