use aquarium::descriptor::{FishDescriptor, ImageSource, SwimPattern};
use aquarium::loader::LoadedImage;
use aquarium::physics::TankDimensions;
use aquarium::scene::{Aquarium, MAX_DELTA};
use glam::Vec3;

fn reference_tank() -> TankDimensions {
    TankDimensions {
        width: 20.0,
        height: 10.0,
        depth: 10.0,
    }
}

fn camera_eye() -> Vec3 {
    Vec3::new(0.0, 5.0, 15.0)
}

fn procedural_descriptors(count: u32) -> Vec<FishDescriptor> {
    (0..count)
        .map(|id| {
            FishDescriptor::procedural(
                id,
                Vec3::new(id as f32 * 0.5 - 3.0, 0.0, 0.0),
                SwimPattern::LazyS,
            )
        })
        .collect()
}

#[test]
fn test_delta_time_is_clamped() {
    let mut tank = Aquarium::new(reference_tank(), Some(1));
    tank.tick(10.0, camera_eye());
    assert!(
        (tank.elapsed() - MAX_DELTA).abs() < 1e-6,
        "a 10s stall must advance the clock by at most {}",
        MAX_DELTA
    );
}

#[test]
fn test_stall_spikes_do_not_explode_the_simulation() {
    let mut tank = Aquarium::new(reference_tank(), Some(4));
    tank.apply_descriptors(&procedural_descriptors(12));
    let half = tank.bounds().half;

    // Simulated wall-clock of well over 1000 seconds, with regular stalls.
    for i in 0..25_000 {
        let dt = if i % 50 == 0 { 10.0 } else { 0.016 };
        tank.tick(dt, camera_eye());
    }

    for fish in tank.fish() {
        let p = fish.kin.position;
        assert!(p.is_finite(), "position diverged: {:?}", p);
        assert!(
            p.x.abs() <= half.x && p.y.abs() <= half.y && p.z.abs() <= half.z,
            "fish left the tank: {:?}",
            p
        );
        let speed = fish.kin.velocity.length();
        assert!(
            (1.0 - 1e-4..=2.0 + 1e-4).contains(&speed),
            "speed {} outside the clamp band",
            speed
        );
    }
}

#[test]
fn test_same_seed_replays_the_same_simulation() {
    let descriptors = procedural_descriptors(10);
    let mut first = Aquarium::new(reference_tank(), Some(42));
    let mut second = Aquarium::new(reference_tank(), Some(42));
    first.apply_descriptors(&descriptors);
    second.apply_descriptors(&descriptors);

    for _ in 0..200 {
        first.tick(0.016, camera_eye());
        second.tick(0.016, camera_eye());
    }

    for (a, b) in first.fish().iter().zip(second.fish().iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.kin.position, b.kin.position);
        assert_eq!(a.kin.velocity, b.kin.velocity);
        assert_eq!(a.orientation, b.orientation);
    }
}

#[test]
fn test_plants_survive_reconciliation() {
    let mut tank = Aquarium::new(reference_tank(), Some(6));
    assert_eq!(tank.plants().len(), 15);
    tank.apply_descriptors(&procedural_descriptors(8));
    tank.apply_descriptors(&[]);
    assert_eq!(
        tank.plants().len(),
        15,
        "plants are decoration, not reconciled entities"
    );
}

#[test]
fn test_plant_sway_only_moves_x() {
    let mut tank = Aquarium::new(reference_tank(), Some(6));
    for _ in 0..30 {
        tank.tick(0.016, camera_eye());
    }
    for plant in tank.plants() {
        for (pos, base) in plant
            .geometry
            .positions
            .iter()
            .zip(plant.geometry.base_positions.iter())
        {
            assert_eq!(pos.y, base.y, "sway must not change vertex height");
            assert_eq!(pos.z, base.z, "sway must not change vertex depth");
        }
    }
}

#[test]
fn test_image_fish_flip_follows_travel_direction() {
    let mut tank = Aquarium::new(reference_tank(), Some(8));
    let descriptor = FishDescriptor::image(
        "flip.png",
        ImageSource::Bytes(vec![1]),
        Vec3::ZERO,
    );
    let requests = tank.apply_descriptors(std::slice::from_ref(&descriptor));
    tank.complete_image_load(
        requests[0].id.clone(),
        Ok(LoadedImage {
            width: 16,
            height: 16,
            rgba: vec![255; 16 * 16 * 4],
        }),
    );

    for _ in 0..10 {
        tank.tick(0.016, camera_eye());
    }
    let fish = &tank.fish()[0];
    assert_eq!(
        fish.flip,
        fish.kin.velocity.x.signum(),
        "mirror sign should match the horizontal travel direction"
    );
}

#[test]
fn test_solid_vertices_are_finite_and_present() {
    let mut tank = Aquarium::new(reference_tank(), Some(2));
    tank.apply_descriptors(&procedural_descriptors(5));
    for _ in 0..5 {
        tank.tick(0.016, camera_eye());
    }
    let mut vertices = Vec::new();
    tank.emit_solid_vertices(&mut vertices);
    assert!(!vertices.is_empty(), "ground, plants, and fish should emit geometry");
    for v in &vertices {
        for c in v.position {
            assert!(c.is_finite(), "vertex data contains non-finite values");
        }
    }
}
