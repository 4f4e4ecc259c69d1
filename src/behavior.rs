//! Descriptor production: the contracts the scene consumes.
//!
//! The AI-backed generator and background remover live outside this crate;
//! only their interfaces are defined here. `LocalBehaviorGenerator` is the
//! in-process fallback that seeds the tank without any upstream service.

use anyhow::{ensure, Result};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::descriptor::{BodyShape, FishDescriptor, ShapeSpec, SwimPattern, TailShape};
use crate::physics::TankDimensions;

pub const MIN_FISH_COUNT: u32 = 1;
pub const MAX_FISH_COUNT: u32 = 50;

/// Produces one descriptor per fish, ids dense in `[0, fish_count)`, start
/// positions strictly inside the tank with at least a 10% margin.
///
/// Upstream implementations may fail (service error, schema mismatch); the
/// caller keeps the previous descriptor list when they do.
pub trait BehaviorGenerator {
    fn generate(&mut self, fish_count: u32, dims: TankDimensions) -> Result<Vec<FishDescriptor>>;
}

/// Turns a photographed fish into a transparent-background cutout.
/// Input and output are encoded PNG bytes. Implemented by an external
/// service; no in-crate implementation exists.
pub trait BackgroundRemover {
    fn process(&mut self, png: &[u8]) -> Result<Vec<u8>>;
}

/// Offline generator: uniform random placement and pattern tags, with a
/// shape specification for every third fish so the AI-shaped build path
/// stays exercised without an upstream service.
pub struct LocalBehaviorGenerator {
    rng: StdRng,
}

impl LocalBehaviorGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl BehaviorGenerator for LocalBehaviorGenerator {
    fn generate(&mut self, fish_count: u32, dims: TankDimensions) -> Result<Vec<FishDescriptor>> {
        ensure!(
            (MIN_FISH_COUNT..=MAX_FISH_COUNT).contains(&fish_count),
            "fish count {} outside [{}, {}]",
            fish_count,
            MIN_FISH_COUNT,
            MAX_FISH_COUNT
        );
        let mut descriptors = Vec::with_capacity(fish_count as usize);
        for id in 0..fish_count {
            let start_position = Vec3::new(
                (self.rng.gen::<f32>() - 0.5) * dims.width * 0.9,
                (self.rng.gen::<f32>() - 0.5) * dims.height * 0.9,
                (self.rng.gen::<f32>() - 0.5) * dims.depth * 0.9,
            );
            let pattern = random_pattern(&mut self.rng);
            let descriptor = if id % 3 == 2 {
                let shape = random_shape(&mut self.rng);
                FishDescriptor::ai_shaped(id, start_position, pattern, shape)
            } else {
                FishDescriptor::procedural(id, start_position, pattern)
            };
            descriptors.push(descriptor);
        }
        Ok(descriptors)
    }
}

fn random_pattern<R: Rng>(rng: &mut R) -> SwimPattern {
    match rng.gen_range(0..4) {
        0 => SwimPattern::Straight,
        1 => SwimPattern::LazyS,
        2 => SwimPattern::Circle,
        _ => SwimPattern::Erratic,
    }
}

fn random_shape<R: Rng>(rng: &mut R) -> ShapeSpec {
    ShapeSpec {
        body: if rng.gen::<bool>() {
            BodyShape::Ellipsoid
        } else {
            BodyShape::Box
        },
        body_size: Vec3::new(
            rng.gen_range(0.3..0.6),
            rng.gen_range(0.2..0.5),
            rng.gen_range(0.6..1.2),
        ),
        tail: if rng.gen::<bool>() {
            TailShape::Cone
        } else {
            TailShape::Triangle
        },
        tail_size: glam::Vec2::new(rng.gen_range(0.1..0.2), rng.gen_range(0.3..0.5)),
        dorsal_fin: rng.gen::<bool>(),
    }
}
