use aquarium::descriptor::{FishDescriptor, FishId, ImageSource, SwimPattern};
use aquarium::loader::LoadedImage;
use aquarium::physics::TankDimensions;
use aquarium::scene::{Aquarium, FishKind};
use glam::Vec3;

fn reference_tank() -> TankDimensions {
    TankDimensions {
        width: 20.0,
        height: 10.0,
        depth: 10.0,
    }
}

fn procedural_descriptors(ids: std::ops::Range<u32>) -> Vec<FishDescriptor> {
    ids.map(|id| {
        FishDescriptor::procedural(
            id,
            Vec3::new(id as f32 * 0.3 - 2.0, 0.0, 0.0),
            SwimPattern::Straight,
        )
    })
    .collect()
}

fn white_image(width: u32, height: u32) -> LoadedImage {
    LoadedImage {
        width,
        height,
        rgba: vec![255; (width * height * 4) as usize],
    }
}

#[test]
fn test_initial_population() {
    let mut tank = Aquarium::new(reference_tank(), Some(42));
    let descriptors = procedural_descriptors(0..15);
    let requests = tank.apply_descriptors(&descriptors);

    assert_eq!(tank.fish().len(), 15);
    assert!(requests.is_empty(), "no image loads for procedural fish");
    for fish in tank.fish() {
        let speed = fish.kin.velocity.length();
        assert!(
            (speed - 1.5).abs() < 1e-4,
            "initial speed should be 1.5, got {}",
            speed
        );
    }
}

#[test]
fn test_sliding_window_scenario() {
    // The canonical reconciliation scenario: 0..14 live, then 5..19 wanted.
    let mut tank = Aquarium::new(reference_tank(), Some(42));
    tank.apply_descriptors(&procedural_descriptors(0..15));

    let survivors: Vec<_> = (5..15)
        .map(|id| {
            let fish = tank.find(&FishId::Generated(id)).expect("fish missing");
            (fish.id.clone(), fish.kin)
        })
        .collect();

    tank.apply_descriptors(&procedural_descriptors(5..20));

    assert_eq!(tank.fish().len(), 15);
    for id in 0..5 {
        assert!(
            tank.find(&FishId::Generated(id)).is_none(),
            "fish {} should have been removed",
            id
        );
    }
    for (id, old_kin) in survivors {
        let fish = tank.find(&id).expect("survivor missing");
        assert_eq!(fish.kin.position, old_kin.position, "{} was repositioned", id);
        assert_eq!(fish.kin.velocity, old_kin.velocity, "{} velocity was reset", id);
        assert_eq!(fish.kin.bob_phase, old_kin.bob_phase, "{} phase was reset", id);
    }
    for id in 15..20 {
        let fish = tank
            .find(&FishId::Generated(id))
            .expect("new fish missing");
        assert!((fish.kin.velocity.length() - 1.5).abs() < 1e-4);
    }

    // Each removed procedural fish disposed a body, a tail, and a material.
    let stats = tank.disposal_stats();
    assert_eq!(stats.geometries, 10);
    assert_eq!(stats.materials, 5);
    assert_eq!(stats.textures, 0);
}

#[test]
fn test_reconciliation_is_idempotent() {
    let mut tank = Aquarium::new(reference_tank(), Some(7));
    let descriptors = procedural_descriptors(0..10);

    tank.apply_descriptors(&descriptors);
    let snapshot: Vec<_> = tank
        .fish()
        .iter()
        .map(|f| (f.id.clone(), f.kin))
        .collect();
    let stats_before = tank.disposal_stats();

    let requests = tank.apply_descriptors(&descriptors);

    assert!(requests.is_empty());
    assert_eq!(tank.disposal_stats(), stats_before, "no disposals on a no-op");
    assert_eq!(tank.fish().len(), snapshot.len());
    for (id, kin) in snapshot {
        let fish = tank.find(&id).expect("fish vanished on idempotent call");
        assert_eq!(fish.kin.position, kin.position);
        assert_eq!(fish.kin.velocity, kin.velocity);
        assert_eq!(fish.kin.bob_phase, kin.bob_phase);
    }
}

#[test]
fn test_duplicate_ids_collapse_to_one_fish() {
    let mut tank = Aquarium::new(reference_tank(), Some(3));
    let mut descriptors = procedural_descriptors(0..1);
    descriptors.push(descriptors[0].clone());
    tank.apply_descriptors(&descriptors);
    assert_eq!(tank.fish().len(), 1);
}

#[test]
fn test_malformed_descriptor_is_dropped_without_panic() {
    let mut tank = Aquarium::new(reference_tank(), Some(5));
    let mut descriptors = procedural_descriptors(0..3);
    descriptors.push(FishDescriptor::procedural(
        99,
        Vec3::new(f32::NAN, 0.0, 0.0),
        SwimPattern::Erratic,
    ));
    tank.apply_descriptors(&descriptors);
    assert_eq!(tank.fish().len(), 3, "the malformed descriptor must be skipped");
    assert!(tank.find(&FishId::Generated(99)).is_none());
}

#[test]
fn test_image_fish_inserted_only_after_load() {
    let mut tank = Aquarium::new(reference_tank(), Some(9));
    let descriptor = FishDescriptor::image(
        "goldfish.png",
        ImageSource::Bytes(vec![1, 2, 3]),
        Vec3::ZERO,
    );
    let requests = tank.apply_descriptors(std::slice::from_ref(&descriptor));

    assert_eq!(requests.len(), 1);
    assert_eq!(tank.fish().len(), 0, "plane must not appear before its texture");
    assert_eq!(tank.pending_loads(), 1);

    tank.complete_image_load(requests[0].id.clone(), Ok(white_image(64, 32)));
    assert_eq!(tank.fish().len(), 1);
    assert_eq!(tank.pending_loads(), 0);

    let fish = tank.find(&FishId::Image("goldfish.png".into())).expect("image fish");
    match fish.kind {
        FishKind::Image { aspect_ratio } => assert!((aspect_ratio - 2.0).abs() < 1e-6),
        _ => panic!("wrong kind for image fish"),
    }
    assert!((fish.kin.velocity.length() - 1.0).abs() < 1e-4);
}

#[test]
fn test_failed_image_load_does_not_grow_live_set() {
    let mut tank = Aquarium::new(reference_tank(), Some(9));
    let descriptor = FishDescriptor::image(
        "broken.png",
        ImageSource::Bytes(vec![0]),
        Vec3::ZERO,
    );
    let requests = tank.apply_descriptors(std::slice::from_ref(&descriptor));
    tank.complete_image_load(
        requests[0].id.clone(),
        Err(anyhow::anyhow!("decode failed")),
    );
    assert_eq!(tank.fish().len(), 0);
    assert_eq!(tank.pending_loads(), 0);
}

#[test]
fn test_stale_image_load_cannot_resurrect_removed_fish() {
    let mut tank = Aquarium::new(reference_tank(), Some(9));
    let descriptor = FishDescriptor::image(
        "late.png",
        ImageSource::Bytes(vec![1]),
        Vec3::ZERO,
    );
    let requests = tank.apply_descriptors(std::slice::from_ref(&descriptor));
    // Descriptor disappears while the decode is still in flight.
    tank.apply_descriptors(&[]);
    assert_eq!(tank.pending_loads(), 0, "cancelled load should be forgotten");

    tank.complete_image_load(requests[0].id.clone(), Ok(white_image(8, 8)));
    assert_eq!(tank.fish().len(), 0, "a late result must not resurrect the fish");
}

#[test]
fn test_unrequested_completion_is_ignored() {
    let mut tank = Aquarium::new(reference_tank(), Some(9));
    tank.complete_image_load(
        FishId::Image("never-asked.png".into()),
        Ok(white_image(4, 4)),
    );
    assert_eq!(tank.fish().len(), 0);
}

#[test]
fn test_no_duplicate_load_requests_while_pending() {
    let mut tank = Aquarium::new(reference_tank(), Some(9));
    let descriptor = FishDescriptor::image(
        "slow.png",
        ImageSource::Bytes(vec![1]),
        Vec3::ZERO,
    );
    let first = tank.apply_descriptors(std::slice::from_ref(&descriptor));
    let second = tank.apply_descriptors(std::slice::from_ref(&descriptor));
    assert_eq!(first.len(), 1);
    assert!(second.is_empty(), "a pending load must not be re-requested");
}

#[test]
fn test_teardown_disposes_everything_once() {
    let mut tank = Aquarium::new(reference_tank(), Some(21));
    tank.apply_descriptors(&procedural_descriptors(0..4));
    tank.teardown();

    let stats = tank.disposal_stats();
    // 4 fish x (body + tail) + 15 plants + ground.
    assert_eq!(stats.geometries, 4 * 2 + 15 + 1);
    assert_eq!(stats.materials, 4);
    assert_eq!(tank.fish().len(), 0);

    // Idempotent: a second teardown must not double-count.
    tank.teardown();
    assert_eq!(tank.disposal_stats(), stats);
}

#[test]
fn test_tick_after_teardown_is_a_no_op() {
    let mut tank = Aquarium::new(reference_tank(), Some(21));
    tank.apply_descriptors(&procedural_descriptors(0..2));
    tank.teardown();
    let elapsed = tank.elapsed();
    tank.tick(0.016, Vec3::new(0.0, 5.0, 15.0));
    assert_eq!(tank.elapsed(), elapsed, "a torn-down scene must not advance");
}
