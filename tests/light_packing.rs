//! Light packing integration tests.
//!
//! Capacity limits, drop order and the per-object index map, observed both
//! on the packer and through a full pipeline frame.

mod common;

use approx::assert_relative_eq;
use glam::{Vec3, Vec4};
use rstest::rstest;

use custom_render_pipeline::command::properties;
use custom_render_pipeline::config::ShadowSettings;
use custom_render_pipeline::pipeline::lighting::{
    spot_angle_falloff, MAX_DIRECTIONAL_LIGHTS, MAX_OTHER_LIGHTS,
};
use custom_render_pipeline::pipeline::{LightingOutput, LightingPacker};
use custom_render_pipeline::scene::{Light, Renderable, Transform};
use custom_render_pipeline::shadows::NoShadows;
use custom_render_pipeline::visibility::{VisibilitySet, VisibleLight};
use custom_render_pipeline::{HeadlessContext, World};

fn directional(intensity: f32) -> VisibleLight {
    VisibleLight::from_light(
        &Light::directional(Vec3::ONE, intensity),
        &Transform::new().pointing(Vec3::new(0.0, -1.0, 1.0)),
    )
}

fn point(x: f32) -> VisibleLight {
    VisibleLight::from_light(
        &Light::point(Vec3::ONE, 1.0, 5.0),
        &Transform::from_position(Vec3::new(x, 0.0, 0.0)),
    )
}

fn pack(
    visibility: &mut VisibilitySet,
    use_lights_per_object: bool,
) -> (LightingPacker, HeadlessContext, LightingOutput) {
    let mut packer = LightingPacker::with_shadows(Box::new(NoShadows));
    let mut context = HeadlessContext::new();
    let output = packer.setup(
        &mut context,
        visibility,
        &ShadowSettings::default(),
        use_lights_per_object,
        u32::MAX,
    );
    (packer, context, output)
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn test_fifth_directional_light_is_dropped() {
    common::init_logging();
    let lights: Vec<VisibleLight> = (1..=5).map(|i| directional(i as f32)).collect();
    let mut visibility = VisibilitySet::new(Vec::new(), lights.clone());
    let (packer, context, output) = pack(&mut visibility, true);

    assert_eq!(output.directional_count, MAX_DIRECTIONAL_LIGHTS);
    let packed = packer.packed();
    for (slot, light) in lights.iter().take(4).enumerate() {
        assert_eq!(packed.directional_colors[slot], light.final_color);
    }
    assert_eq!(context.global_int(properties::DIR_LIGHT_COUNT), Some(4));
    assert_eq!(
        visibility.installed_light_index_map(),
        Some(&[-1, -1, -1, -1, -1][..])
    );
}

#[rstest]
#[case::under_capacity(10, 10)]
#[case::at_capacity(64, 64)]
#[case::over_capacity(70, 64)]
fn test_other_light_capacity(#[case] visible: usize, #[case] packed: usize) {
    common::init_logging();
    let lights: Vec<VisibleLight> = (0..visible).map(|i| point(i as f32)).collect();
    let mut visibility = VisibilitySet::new(Vec::new(), lights).with_index_map_len(visible + 3);
    let (packer, context, output) = pack(&mut visibility, true);

    assert_eq!(output.other_count, packed);
    assert_eq!(context.global_int(properties::OTHER_LIGHT_COUNT), Some(packed as i32));
    assert_eq!(
        context
            .global_vector_array(properties::OTHER_LIGHT_POSITIONS)
            .map(|positions| positions.len()),
        Some(MAX_OTHER_LIGHTS)
    );
    // Slots keep visibility order
    assert_eq!(packer.packed().other_positions[packed - 1].x, (packed - 1) as f32);

    let map = visibility.installed_light_index_map().unwrap();
    assert_eq!(map.len(), visible + 3);
    for (i, slot) in map.iter().enumerate() {
        let expected = if i < packed { i as i32 } else { -1 };
        assert_eq!(*slot, expected, "index map slot {i}");
    }
}

#[test]
fn test_counts_track_packed_slots_not_visible_lights() {
    let mut lights: Vec<VisibleLight> = (0..6).map(|i| directional(i as f32 + 1.0)).collect();
    lights.extend((0..66).map(|i| point(i as f32)));
    let mut visibility = VisibilitySet::new(Vec::new(), lights);
    let (_, context, output) = pack(&mut visibility, false);

    assert_eq!(output.directional_count, 4);
    assert_eq!(output.other_count, 64);
    assert_eq!(context.global_int(properties::DIR_LIGHT_COUNT), Some(4));
    assert_eq!(context.global_int(properties::OTHER_LIGHT_COUNT), Some(64));
    assert!(visibility.installed_light_index_map().is_none());
}

#[test]
fn test_zero_lights_still_reset_counts() {
    let mut visibility = VisibilitySet::new(Vec::new(), vec![point(0.0)]);
    let mut packer = LightingPacker::with_shadows(Box::new(NoShadows));
    let mut context = HeadlessContext::new();
    packer.setup(&mut context, &mut visibility, &ShadowSettings::default(), false, u32::MAX);
    assert_eq!(context.global_int(properties::OTHER_LIGHT_COUNT), Some(1));

    let mut empty = VisibilitySet::default();
    packer.setup(&mut context, &mut empty, &ShadowSettings::default(), false, u32::MAX);
    assert_eq!(context.global_int(properties::OTHER_LIGHT_COUNT), Some(0));
    // Arrays are left as they were; shaders gate on the count
    assert!(context
        .global_vector_array(properties::OTHER_LIGHT_COLORS)
        .is_some());
}

// ============================================================================
// Spot lights
// ============================================================================

#[test]
fn test_spot_light_falloff_20_30() {
    let light = VisibleLight::from_light(
        &Light::spot(Vec3::ONE, 1.0, 10.0, 20.0, 30.0),
        &Transform::new().pointing(Vec3::NEG_Y),
    );
    let mut visibility = VisibilitySet::new(Vec::new(), vec![light]);
    let (packer, _, output) = pack(&mut visibility, false);
    assert_eq!(output.other_count, 1);

    let inner = 10.0_f32.to_radians().cos();
    let outer = 15.0_f32.to_radians().cos();
    let angle_range_inv = 1.0 / (inner - outer).max(0.001);
    let packed = packer.packed().other_spot_angles[0];
    assert_relative_eq!(packed.x, angle_range_inv, max_relative = 1e-5);
    assert_relative_eq!(packed.y, -outer * angle_range_inv, max_relative = 1e-5);
    assert_eq!(packed, spot_angle_falloff(20.0, 30.0));

    let direction = packer.packed().other_directions_and_masks[0];
    assert_relative_eq!(direction.y, 1.0, epsilon = 1e-5);
}

// ============================================================================
// Through the pipeline
// ============================================================================

#[test]
fn test_world_lights_reach_shader_globals() {
    common::init_logging();
    let mut world = World::new();
    world.spawn((common::full_hd_camera(),));
    for i in 1..=5 {
        world.spawn((
            Transform::new().pointing(Vec3::NEG_Y),
            Light::directional(Vec3::ONE, i as f32),
        ));
    }
    world.spawn((
        Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
        Light::point(Vec3::new(1.0, 0.5, 0.25), 2.0, 8.0),
    ));
    world.spawn((Transform::new(), Renderable::opaque()));

    let mut pipeline = common::pipeline(common::config());
    let mut context = HeadlessContext::new();
    let outcomes = pipeline.render_world(&mut context, &mut world).unwrap();

    let lighting = outcomes[0].summary().unwrap().lighting;
    assert_eq!(lighting.directional_count, 4);
    assert_eq!(lighting.other_count, 1);
    assert!(context.keyword_enabled(properties::LIGHTS_PER_OBJECT_KEYWORD));

    let colors = context
        .global_vector_array(properties::DIR_LIGHT_COLORS)
        .unwrap();
    let expected = directional(1.0).final_color;
    for (slot, color) in colors.iter().take(4).enumerate() {
        assert_relative_eq!(color.x, expected.x * (slot + 1) as f32, max_relative = 1e-5);
    }
    let position = context
        .global_vector_array(properties::OTHER_LIGHT_POSITIONS)
        .unwrap()[0];
    assert_eq!(position, Vec4::new(0.0, 2.0, 0.0, 1.0 / 64.0));
    common::assert_balanced(&context);
}
