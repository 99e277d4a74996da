//! Uniform Layout Tests
//!
//! Tests for:
//! - deterministic, order-significant slot lists
//! - conditional slots omitted (never reordered) across flag subsets
//! - slot sizes and name uniqueness
//! - UniformBlock offsets and the layout-mismatch panics

use sumi::{FeatureFlags, UniformBlock, UniformLayout};

fn flags(keys: &[&str]) -> FeatureFlags {
    let mut flags = FeatureFlags::new();
    for key in keys {
        flags.set_flag(key);
    }
    flags
}

#[test]
fn build_is_deterministic() {
    let a = UniformLayout::build(&flags(&["DIFFUSE", "RIM", "ALPHATEST"]));
    let b = UniformLayout::build(&flags(&["ALPHATEST", "RIM", "DIFFUSE"]));
    assert_eq!(a, b);
    assert_eq!(
        a.slots().collect::<Vec<_>>(),
        b.slots().collect::<Vec<_>>()
    );
}

#[test]
fn always_present_slots_lead_their_sections() {
    let layout = UniformLayout::build(&FeatureFlags::new());
    let names = layout.slot_names();
    assert_eq!(names[0], "diffuse_color");
    assert!(layout.contains("shade_color"));
    assert!(layout.contains("rim_color"));
    assert!(layout.contains("outline_color"));
    assert!(layout.contains("shade_toony"));
    // no texture flags: no info/matrix slots
    assert!(!layout.contains("diffuse_info"));
    assert!(!layout.contains("rim_matrix"));
    assert!(!layout.contains("alpha_cutoff"));
}

#[test]
fn conditional_slots_are_omitted_never_reordered() {
    let small = UniformLayout::build(&flags(&["RIM"]));
    let large = UniformLayout::build(&flags(&["DIFFUSE", "SHADE", "RIM", "MATCAP"]));

    // every slot of the small layout appears in the large one, in the same
    // relative order
    let large_names = large.slot_names();
    let mut cursor = 0;
    for name in small.slot_names() {
        let pos = large_names[cursor..]
            .iter()
            .position(|&n| n == name)
            .unwrap_or_else(|| panic!("slot {name} missing or reordered"));
        cursor += pos + 1;
    }
}

#[test]
fn slot_sizes_match_their_declarations() {
    let layout = UniformLayout::build(&flags(&["DIFFUSE", "BUMP", "ALPHATEST"]));
    let sizes: Vec<(&str, u32)> = layout.slots().collect();

    let size_of = |name: &str| {
        sizes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, c)| c)
            .unwrap()
    };
    assert_eq!(size_of("diffuse_color"), 4);
    assert_eq!(size_of("diffuse_info"), 2);
    assert_eq!(size_of("diffuse_matrix"), 16);
    assert_eq!(size_of("bump_info"), 3);
    assert_eq!(size_of("tangent_space_params"), 2);
    assert_eq!(size_of("shade_toony"), 1);
    assert_eq!(size_of("alpha_cutoff"), 1);

    let total: u32 = sizes.iter().map(|&(_, c)| c).sum();
    assert_eq!(total, layout.component_count());
}

#[test]
fn no_two_slots_share_a_name() {
    let layout = UniformLayout::build(&flags(&[
        "DIFFUSE",
        "EMISSIVE",
        "BUMP",
        "SHADE",
        "RECEIVE_SHADOW",
        "SHADING_GRADE",
        "RIM",
        "MATCAP",
        "OUTLINE_WIDTH",
        "UV_ANIMATION_MASK",
        "POINT_SIZE",
        "ALPHATEST",
    ]));
    let mut names = layout.slot_names();
    let before = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn alpha_cutoff_appears_only_under_alphatest() {
    let without = UniformLayout::build(&FeatureFlags::new());
    let with = UniformLayout::build(&flags(&["ALPHATEST"]));
    assert!(!without.contains("alpha_cutoff"));
    assert_eq!(with.index_of("alpha_cutoff"), Some(with.len() - 1));
}

// ============================================================================
// UniformBlock
// ============================================================================

#[test]
fn block_packs_values_at_layout_offsets() {
    let layout = UniformLayout::build(&FeatureFlags::new());
    let mut block = UniformBlock::new(&layout);

    block.set("diffuse_color", &[1.0, 0.5, 0.25, 1.0]);
    block.set_f32("shade_toony", 0.9);

    assert_eq!(block.get("diffuse_color").unwrap(), &[1.0, 0.5, 0.25, 1.0]);
    assert_eq!(block.get("shade_toony").unwrap(), &[0.9]);
    // diffuse_color occupies the first four components
    assert_eq!(&block.as_slice()[0..4], &[1.0, 0.5, 0.25, 1.0]);
    assert_eq!(
        block.as_slice().len(),
        layout.component_count() as usize
    );
    assert_eq!(block.as_bytes().len(), block.as_slice().len() * 4);
}

#[test]
#[should_panic(expected = "expects 4 components")]
fn wrong_component_count_is_an_invariant_violation() {
    let layout = UniformLayout::build(&FeatureFlags::new());
    let mut block = UniformBlock::new(&layout);
    block.set("diffuse_color", &[1.0, 2.0]);
}

#[test]
#[should_panic(expected = "not in layout")]
fn unknown_slot_is_an_invariant_violation() {
    let layout = UniformLayout::build(&FeatureFlags::new());
    let mut block = UniformBlock::new(&layout);
    block.set("no_such_slot", &[0.0]);
}
