//! Flag Resolver Tests
//!
//! Tests for:
//! - determinism (same inputs, same canonical flag string)
//! - dirty-category isolation and carry-over from previous flag sets
//! - texture readiness rules, blocking bump behavior
//! - mutually exclusive enum-derived flag groups
//! - two-sided lighting derivation and light count capping

use sumi::{
    CullMode, DebugMode, DirtyCategories, FlagResolver, MeshCaps, OutlineWidthMode, Resolution,
    SceneCaps, TextureRef, ToonMaterial,
};

fn resolve_ready(
    material: &ToonMaterial,
    mesh: &MeshCaps,
    scene: &SceneCaps,
    previous: Option<&sumi::FeatureFlags>,
) -> sumi::FeatureFlags {
    match FlagResolver::resolve(material, mesh, scene, previous) {
        Resolution::Ready(flags) => flags,
        Resolution::NotReady => panic!("expected Ready"),
    }
}

#[test]
fn resolving_twice_with_no_changes_is_identical() {
    let material = ToonMaterial::default();
    let mesh = MeshCaps::basic();
    let scene = SceneCaps {
        light_count: 3,
        ..SceneCaps::default()
    };

    let a = resolve_ready(&material, &mesh, &scene, None);
    let b = resolve_ready(&material, &mesh, &scene, None);
    assert_eq!(a.cache_key(), b.cache_key());
    assert_eq!(a, b);
}

#[test]
fn baseline_flags_cover_mesh_and_lights() {
    let material = ToonMaterial::default();
    let mesh = MeshCaps::basic();
    let scene = SceneCaps {
        light_count: 2,
        ..SceneCaps::default()
    };

    let flags = resolve_ready(&material, &mesh, &scene, None);
    assert!(flags.contains("NORMAL"));
    assert!(flags.contains("UV1"));
    assert!(!flags.contains("TANGENT"));
    assert_eq!(flags.get_u32("NUM_LIGHTS"), Some(2));
    assert!(flags.contains("OUTLINE_COLOR_MIXED"));
    assert!(!flags.contains("OUTLINE_WIDTH_WORLD"));
    assert!(!flags.contains("DIFFUSE"));
}

#[test]
fn lights_only_change_never_touches_other_categories() {
    let mut material = ToonMaterial::default();
    material.set_diffuse_texture(Some(TextureRef::ready("diffuse")));
    let mesh = MeshCaps::basic();
    let mut scene = SceneCaps {
        light_count: 1,
        ..SceneCaps::default()
    };

    let first = resolve_ready(&material, &mesh, &scene, None);
    assert!(first.contains("DIFFUSE"));
    material.clear_dirty(DirtyCategories::all());

    // a light joins the scene; only the lights category is dirty
    scene.light_count = 4;
    material.mark_dirty(DirtyCategories::LIGHTS);
    let second = resolve_ready(&material, &mesh, &scene, Some(&first));

    assert_eq!(second.get_u32("NUM_LIGHTS"), Some(4));
    assert!(second.contains("DIFFUSE"));
    assert!(second.contains("NORMAL"));
    assert!(second.contains("UV1"));
}

#[test]
fn clean_categories_are_carried_over_not_recomputed() {
    let material = ToonMaterial::default();
    let mesh = MeshCaps::basic();
    let mut scene = SceneCaps {
        light_count: 1,
        ..SceneCaps::default()
    };

    let first = resolve_ready(&material, &mesh, &scene, None);
    let mut clean = material.clone();
    clean.clear_dirty(DirtyCategories::all());

    // the scene changed but no category was marked: the stale flag set is
    // carried over verbatim
    scene.light_count = 9;
    let second = resolve_ready(&clean, &mesh, &scene, Some(&first));
    assert_eq!(second.get_u32("NUM_LIGHTS"), Some(1));
    assert_eq!(second.cache_key(), first.cache_key());

    // sanity: marking lights dirty picks the change up
    clean.mark_dirty(DirtyCategories::LIGHTS);
    let third = resolve_ready(&clean, &mesh, &scene, Some(&first));
    assert_eq!(third.get_u32("NUM_LIGHTS"), Some(9));
}

// ============================================================================
// Texture readiness
// ============================================================================

#[test]
fn ready_texture_enables_its_flag() {
    let mut material = ToonMaterial::default();
    material.set_shade_texture(Some(TextureRef::ready("shade")));
    let flags = resolve_ready(&material, &MeshCaps::basic(), &SceneCaps::default(), None);
    assert!(flags.contains("SHADE"));
}

#[test]
fn unready_blocking_texture_fails_closed() {
    let mut material = ToonMaterial::default();
    material.set_shade_texture(Some(TextureRef::loading("shade")));
    let result = FlagResolver::resolve(
        &material,
        &MeshCaps::basic(),
        &SceneCaps::default(),
        None,
    );
    assert_eq!(result, Resolution::NotReady);
}

#[test]
fn unready_non_blocking_texture_is_allowed() {
    let mut material = ToonMaterial::default();
    material.set_rim_texture(Some(TextureRef::loading("rim").non_blocking()));
    let flags = resolve_ready(&material, &MeshCaps::basic(), &SceneCaps::default(), None);
    assert!(flags.contains("RIM"));
}

#[test]
fn bump_is_always_blocking() {
    let mut material = ToonMaterial::default();
    // even a non-blocking bump texture holds resolution until ready
    material.set_bump_texture(Some(TextureRef::loading("bump").non_blocking()));
    let result = FlagResolver::resolve(
        &material,
        &MeshCaps::basic(),
        &SceneCaps::default(),
        None,
    );
    assert_eq!(result, Resolution::NotReady);

    let mut ready = ToonMaterial::default();
    ready.set_bump_texture(Some(TextureRef::ready("bump")));
    let flags = resolve_ready(&ready, &MeshCaps::basic(), &SceneCaps::default(), None);
    assert!(flags.contains("BUMP"));
}

#[test]
fn bump_requires_derivative_support() {
    let mut material = ToonMaterial::default();
    material.set_bump_texture(Some(TextureRef::ready("bump")));
    let scene = SceneCaps {
        standard_derivatives: false,
        ..SceneCaps::default()
    };
    let flags = resolve_ready(&material, &MeshCaps::basic(), &scene, None);
    assert!(!flags.contains("BUMP"));
}

#[test]
fn textures_disabled_turns_all_texture_flags_off() {
    let mut material = ToonMaterial::default();
    material.set_diffuse_texture(Some(TextureRef::ready("diffuse")));
    material.set_bump_texture(Some(TextureRef::loading("bump")));
    let scene = SceneCaps {
        textures_enabled: false,
        ..SceneCaps::default()
    };
    // even the unready blocking bump cannot block: textures are off
    let flags = resolve_ready(&material, &MeshCaps::basic(), &scene, None);
    assert!(!flags.contains("DIFFUSE"));
    assert!(!flags.contains("BUMP"));
}

// ============================================================================
// Enum-derived groups
// ============================================================================

#[test]
fn outline_width_flags_are_mutually_exclusive() {
    let mut material = ToonMaterial::default();
    let mesh = MeshCaps::basic();
    let scene = SceneCaps::default();

    for (mode, world, screen) in [
        (OutlineWidthMode::None, false, false),
        (OutlineWidthMode::WorldCoordinates, true, false),
        (OutlineWidthMode::ScreenCoordinates, false, true),
    ] {
        material.set_outline_width_mode(mode);
        let flags = resolve_ready(&material, &mesh, &scene, None);
        assert_eq!(flags.contains("OUTLINE_WIDTH_WORLD"), world);
        assert_eq!(flags.contains("OUTLINE_WIDTH_SCREEN"), screen);
    }
}

#[test]
fn debug_flags_are_mutually_exclusive() {
    let mut material = ToonMaterial::default();
    let mesh = MeshCaps::basic();
    let scene = SceneCaps::default();

    for (mode, normal, litshade) in [
        (DebugMode::None, false, false),
        (DebugMode::Normal, true, false),
        (DebugMode::LitShadeRate, false, true),
    ] {
        material.set_debug_mode(mode);
        let flags = resolve_ready(&material, &mesh, &scene, None);
        assert_eq!(flags.contains("DEBUG_NORMAL"), normal);
        assert_eq!(flags.contains("DEBUG_LITSHADERATE"), litshade);
    }
}

#[test]
fn mode_switch_carries_over_through_partial_resolve() {
    let mut material = ToonMaterial::default();
    let mesh = MeshCaps::basic();
    let scene = SceneCaps::default();

    material.set_debug_mode(DebugMode::Normal);
    let first = resolve_ready(&material, &mesh, &scene, None);
    material.clear_dirty(DirtyCategories::all());

    material.set_debug_mode(DebugMode::LitShadeRate);
    let second = resolve_ready(&material, &mesh, &scene, Some(&first));
    assert!(!second.contains("DEBUG_NORMAL"));
    assert!(second.contains("DEBUG_LITSHADERATE"));
}

// ============================================================================
// Lighting rules
// ============================================================================

#[test]
fn two_sided_lighting_needs_culling_off_and_lighting_on() {
    let mesh = MeshCaps::basic();
    let scene = SceneCaps::default();

    let mut material = ToonMaterial::default();
    material.set_cull_mode(CullMode::Off);
    material.set_two_sided_lighting(true);
    let flags = resolve_ready(&material, &mesh, &scene, None);
    assert!(flags.contains("TWOSIDEDLIGHTING"));

    material.set_disable_lighting(true);
    material.mark_dirty(DirtyCategories::TEXTURES);
    let flags = resolve_ready(&material, &mesh, &scene, None);
    assert!(!flags.contains("TWOSIDEDLIGHTING"));

    let mut culled = ToonMaterial::default();
    culled.set_two_sided_lighting(true); // back-face culling still on
    let flags = resolve_ready(&culled, &mesh, &scene, None);
    assert!(!flags.contains("TWOSIDEDLIGHTING"));
}

#[test]
fn light_count_caps_at_maximum() {
    let material = ToonMaterial::default();
    let scene = SceneCaps {
        light_count: 40,
        ..SceneCaps::default()
    };
    let flags = resolve_ready(&material, &MeshCaps::basic(), &scene, None);
    assert_eq!(flags.get_u32("NUM_LIGHTS"), Some(16));
}

#[test]
fn disable_lighting_zeroes_the_light_count() {
    let mut material = ToonMaterial::default();
    material.set_disable_lighting(true);
    let scene = SceneCaps {
        light_count: 5,
        shadows_enabled: true,
        ..SceneCaps::default()
    };
    let flags = resolve_ready(&material, &MeshCaps::basic(), &scene, None);
    assert_eq!(flags.get_u32("NUM_LIGHTS"), Some(0));
    assert!(!flags.contains("SHADOWS"));
}

#[test]
fn shadow_flags_follow_scene_caps() {
    let material = ToonMaterial::default();
    let scene = SceneCaps {
        light_count: 2,
        shadows_enabled: true,
        cascaded_shadows: true,
        ..SceneCaps::default()
    };
    let flags = resolve_ready(&material, &MeshCaps::basic(), &scene, None);
    assert!(flags.contains("SHADOWS"));
    assert!(flags.contains("SHADOW_CSM"));
}
