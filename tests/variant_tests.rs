//! Variant Cache Tests
//!
//! Tests for:
//! - variant sharing (one compilation per distinct flag set)
//! - the fallback ladder priority order and its diagnostics
//! - exhaustion as a fatal error naming every attempted flag set
//! - generated metadata (attributes, samplers, uniform names)
//! - disposal releasing each program handle exactly once

mod common;

use std::sync::Arc;

use common::MockBackend;
use sumi::{
    FeatureFlags, FlagResolver, MeshCaps, Resolution, SceneCaps, SumiError, TextureRef,
    ToonMaterial, VariantCache,
};

fn resolve(material: &ToonMaterial, scene: &SceneCaps) -> FeatureFlags {
    match FlagResolver::resolve(material, &MeshCaps::basic(), scene, None) {
        Resolution::Ready(flags) => flags,
        Resolution::NotReady => panic!("expected Ready"),
    }
}

#[test]
fn identical_flag_sets_share_one_variant() {
    let mut backend = MockBackend::new();
    let mut cache = VariantCache::new();
    let scene = SceneCaps {
        light_count: 2,
        ..SceneCaps::default()
    };

    // two materials with identical parameter stores
    let a = ToonMaterial::new("a");
    let b = ToonMaterial::new("b");

    let va = cache
        .get_or_compile(&mut backend, &resolve(&a, &scene))
        .unwrap();
    let vb = cache
        .get_or_compile(&mut backend, &resolve(&b, &scene))
        .unwrap();

    assert!(Arc::ptr_eq(&va, &vb));
    assert_eq!(backend.compile_count(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn distinct_flag_sets_compile_separately() {
    let mut backend = MockBackend::new();
    let mut cache = VariantCache::new();
    let scene = SceneCaps::default();

    let plain = ToonMaterial::new("plain");
    let mut textured = ToonMaterial::new("textured");
    textured.set_diffuse_texture(Some(TextureRef::ready("diffuse")));

    let va = cache
        .get_or_compile(&mut backend, &resolve(&plain, &scene))
        .unwrap();
    let vb = cache
        .get_or_compile(&mut backend, &resolve(&textured, &scene))
        .unwrap();

    assert!(!Arc::ptr_eq(&va, &vb));
    assert_eq!(backend.compile_count(), 2);
}

#[test]
fn fallback_ladder_disables_defines_in_priority_order() {
    let mut backend = MockBackend::failing(&["BUMP", "FOG"]);
    let mut cache = VariantCache::new();

    let mut material = ToonMaterial::new("bumpy");
    material.set_bump_texture(Some(TextureRef::ready("bump")));
    let scene = SceneCaps {
        fog_enabled: true,
        ..SceneCaps::default()
    };

    let variant = cache
        .get_or_compile(&mut backend, &resolve(&material, &scene))
        .unwrap();

    // full set, then without BUMP, then without FOG
    assert_eq!(backend.attempts.len(), 3);
    assert!(backend.attempts[0].contains("BUMP"));
    assert!(backend.attempts[0].contains("FOG"));
    assert!(!backend.attempts[1].contains("BUMP"));
    assert!(backend.attempts[1].contains("FOG"));
    assert!(!backend.attempts[2].contains("FOG"));

    assert_eq!(variant.dropped_defines(), &["BUMP", "FOG"]);

    // the variant is cached under the *requested* flag set, so the next
    // lookup does not re-run the ladder
    let again = cache
        .get_or_compile(&mut backend, &resolve(&material, &scene))
        .unwrap();
    assert!(Arc::ptr_eq(&variant, &again));
    assert_eq!(backend.attempts.len(), 3);
}

#[test]
fn ladder_exhaustion_is_fatal_and_names_attempts() {
    let mut backend = MockBackend::new();
    backend.fail_all = true;
    let mut cache = VariantCache::new();

    let mut material = ToonMaterial::new("doomed");
    material.set_bump_texture(Some(TextureRef::ready("bump")));
    let scene = SceneCaps {
        fog_enabled: true,
        ..SceneCaps::default()
    };
    let flags = resolve(&material, &scene);

    let err = cache.get_or_compile(&mut backend, &flags).unwrap_err();
    match err {
        SumiError::ShaderCompileExhausted { attempted } => {
            // full set + one retry per ladder define that was present
            assert_eq!(attempted.len(), 3);
            assert_eq!(attempted[0], flags.cache_key());
            assert!(attempted.last().unwrap() != &attempted[0]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cache.is_empty());
}

#[test]
fn variant_metadata_follows_the_flag_set() {
    let mut backend = MockBackend::new();
    let mut cache = VariantCache::new();

    let mut material = ToonMaterial::new("meta");
    material.set_diffuse_texture(Some(TextureRef::ready("diffuse")));
    material.set_shade_texture(Some(TextureRef::ready("shade")));
    let mesh = MeshCaps {
        has_normals: true,
        has_tangents: true,
        has_uv: true,
        ..MeshCaps::default()
    };
    let flags = match FlagResolver::resolve(&material, &mesh, &SceneCaps::default(), None) {
        Resolution::Ready(flags) => flags,
        Resolution::NotReady => panic!("expected Ready"),
    };

    let variant = cache.get_or_compile(&mut backend, &flags).unwrap();

    assert_eq!(
        variant.attributes(),
        &["position", "normal", "tangent", "uv"]
    );
    assert_eq!(
        variant.sampler_names(),
        &["diffuse_texture", "shade_texture"]
    );
    // uniform name list mirrors the layout, in declaration order
    assert_eq!(
        &variant.uniform_names()[0..3],
        &["diffuse_color", "diffuse_info", "diffuse_matrix"]
    );
    assert_eq!(
        variant.layout().len(),
        variant.uniform_names().len()
    );
}

#[test]
fn dispose_releases_each_program_exactly_once() {
    let mut backend = MockBackend::new();
    let mut cache = VariantCache::new();

    let plain = ToonMaterial::new("plain");
    let mut textured = ToonMaterial::new("textured");
    textured.set_diffuse_texture(Some(TextureRef::ready("diffuse")));
    let scene = SceneCaps::default();

    let va = cache
        .get_or_compile(&mut backend, &resolve(&plain, &scene))
        .unwrap();
    let _vb = cache
        .get_or_compile(&mut backend, &resolve(&textured, &scene))
        .unwrap();

    cache.dispose(&mut backend);
    assert_eq!(backend.destroyed.len(), 2);
    assert!(cache.is_empty());

    // handles held elsewhere stay valid Rust-side; the cache only releases
    // its own interest once
    drop(va);
    assert_eq!(backend.destroyed.len(), 2);
}
