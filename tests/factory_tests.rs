use aquarium::descriptor::{BodyShape, ShapeSpec, TailShape};
use aquarium::factory::{
    build_ai_shaped, build_image_plane, build_procedural, hsl_to_rgb, DisposalStats, FishRig,
    IMAGE_FISH_HEIGHT,
};
use aquarium::loader::LoadedImage;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn shape(body: BodyShape, tail: TailShape, dorsal_fin: bool) -> ShapeSpec {
    ShapeSpec {
        body,
        body_size: Vec3::new(0.4, 0.3, 0.8),
        tail,
        tail_size: Vec2::new(0.15, 0.4),
        dorsal_fin,
    }
}

#[test]
fn test_procedural_rig_has_body_and_tail() {
    let mut rng = StdRng::seed_from_u64(1);
    let rig = build_procedural(&mut rng);
    let FishRig::Solid { body, tail, fin, material } = rig else {
        panic!("procedural fish should be a solid rig");
    };
    assert!(!body.positions.is_empty());
    let tail = tail.expect("procedural fish has a tail");
    assert!(!tail.geometry.positions.is_empty());
    assert!((tail.offset.z + 0.3).abs() < 1e-6, "tail sits behind the body");
    assert!(fin.is_none());
    for c in material.color {
        assert!((0.0..=1.0).contains(&c), "color channel out of range");
    }
}

#[test]
fn test_ai_shaped_tail_offset_clears_the_body() {
    let mut rng = StdRng::seed_from_u64(2);
    let spec = shape(BodyShape::Ellipsoid, TailShape::Cone, false);
    let rig = build_ai_shaped(&spec, &mut rng);
    let FishRig::Solid { tail, fin, .. } = rig else {
        panic!("expected solid rig");
    };
    let tail = tail.expect("shaped fish has a tail");
    // Half the combined body+tail depth: (0.8 + 0.4) / 2.
    assert!((tail.offset.z + 0.6).abs() < 1e-6);
    assert!(fin.is_none());
}

#[test]
fn test_dorsal_fin_is_optional() {
    let mut rng = StdRng::seed_from_u64(3);
    let with_fin = build_ai_shaped(&shape(BodyShape::Box, TailShape::Triangle, true), &mut rng);
    let FishRig::Solid { fin, .. } = with_fin else {
        panic!("expected solid rig");
    };
    let fin = fin.expect("dorsal fin requested");
    assert!(fin.offset.y > 0.0, "fin sits on top of the body");
}

#[test]
fn test_box_body_matches_spec_dimensions() {
    let mut rng = StdRng::seed_from_u64(4);
    let spec = shape(BodyShape::Box, TailShape::Cone, false);
    let rig = build_ai_shaped(&spec, &mut rng);
    let FishRig::Solid { body, .. } = rig else {
        panic!("expected solid rig");
    };
    let max = body
        .positions
        .iter()
        .fold(Vec3::ZERO, |acc, p| acc.max(p.abs()));
    assert!((max - spec.body_size * 0.5).length() < 1e-5);
}

#[test]
fn test_image_plane_preserves_aspect_ratio() {
    let rig = build_image_plane(LoadedImage {
        width: 300,
        height: 100,
        rgba: vec![0; 300 * 100 * 4],
    });
    let FishRig::ImagePlane { plane, width, .. } = rig else {
        panic!("expected image plane rig");
    };
    assert!((width - IMAGE_FISH_HEIGHT * 3.0).abs() < 1e-4);
    assert!(
        !plane.base_positions.is_empty(),
        "plane must retain base positions for the bend wave"
    );
    let max_x = plane.positions.iter().map(|p| p.x.abs()).fold(0.0, f32::max);
    assert!((max_x - width * 0.5).abs() < 1e-4);
}

#[test]
fn test_rig_disposal_counts_every_resource() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut stats = DisposalStats::default();

    let mut rig = build_ai_shaped(&shape(BodyShape::Ellipsoid, TailShape::Cone, true), &mut rng);
    rig.dispose(&mut stats);
    assert_eq!(stats.geometries, 3, "body + tail + fin");
    assert_eq!(stats.materials, 1);

    // Disposal is idempotent.
    rig.dispose(&mut stats);
    assert_eq!(stats.geometries, 3);
    assert_eq!(stats.materials, 1);

    let mut image_rig = build_image_plane(LoadedImage {
        width: 4,
        height: 4,
        rgba: vec![0; 64],
    });
    image_rig.dispose(&mut stats);
    assert_eq!(stats.geometries, 4);
    assert_eq!(stats.textures, 1);
}

#[test]
fn test_hsl_primaries() {
    let red = hsl_to_rgb(0.0, 1.0, 0.5);
    assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);
    let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
    assert!(green[1] > 0.99 && green[0] < 0.01 && green[2] < 0.01);
    let blue = hsl_to_rgb(2.0 / 3.0, 1.0, 0.5);
    assert!(blue[2] > 0.99 && blue[0] < 0.01 && blue[1] < 0.01);
}
