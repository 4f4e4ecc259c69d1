//! Per-entity kinematics: bounded random-walk movement inside the tank.
//!
//! `step` is a pure function of the current state, the elapsed clock, and an
//! injected RNG. Orientation is handled by the scene (it needs the camera
//! for billboarded fish); this module only moves, reflects, and clamps.

use glam::Vec3;
use rand::Rng;

/// Distance kept between a fish and the tank walls so bodies never clip
/// through the glass.
pub const WALL_MARGIN: f32 = 0.5;

/// Amplitude of the cosmetic vertical bob, in tank units.
pub const BOB_AMPLITUDE: f32 = 0.005;

/// Per-frame random velocity perturbation scale.
const PERTURBATION: f32 = 0.1;

/// Multiplicative damping applied to the off-plane velocity components of
/// image fish each frame.
const PLANAR_DAMPING: f32 = 0.98;

/// Speed band for fish that swim freely in 3D.
pub const SPEED_BAND_3D: (f32, f32) = (1.0, 2.0);

/// Narrower speed band for planar image fish.
pub const SPEED_BAND_PLANAR: (f32, f32) = (1.0, 1.5);

/// Externally configured tank size. Immutable for the life of a scene;
/// changing dimensions requires rebuilding the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl TankDimensions {
    pub fn bounds(&self) -> TankBounds {
        TankBounds {
            half: Vec3::new(self.width, self.height, self.depth) * 0.5,
        }
    }
}

impl Default for TankDimensions {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 10.0,
            depth: 10.0,
        }
    }
}

/// Half-extents of the tank interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankBounds {
    pub half: Vec3,
}

impl TankBounds {
    /// Half-extents reduced by the wall margin; reflection triggers here.
    pub fn swim_limits(&self) -> Vec3 {
        self.half - Vec3::splat(WALL_MARGIN)
    }
}

/// How an entity's velocity evolves each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionProfile {
    /// Free 3D swimming: perturbation on all axes, speed clamped to [1, 2].
    Swim3d,
    /// Image fish: vertical and depth velocity damped toward zero,
    /// perturbation on the horizontal axis only, speed clamped to [1, 1.5].
    Planar,
}

impl MotionProfile {
    pub fn speed_band(&self) -> (f32, f32) {
        match self {
            MotionProfile::Swim3d => SPEED_BAND_3D,
            MotionProfile::Planar => SPEED_BAND_PLANAR,
        }
    }
}

/// Mutable kinematic state of one fish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Random time offset desynchronizing the bob across fish.
    pub bob_phase: f32,
}

/// Advance one fish by `dt` seconds.
///
/// Order matters and matches the animation contract: integrate position,
/// apply the bob, reflect off every violated wall independently, then
/// perturb and clamp velocity.
pub fn step<R: Rng>(
    kin: &mut Kinematics,
    profile: MotionProfile,
    dt: f32,
    elapsed: f32,
    bounds: TankBounds,
    rng: &mut R,
) {
    kin.position += kin.velocity * dt;
    kin.position.y += (elapsed * 2.0 + kin.bob_phase).sin() * BOB_AMPLITUDE;

    let limits = bounds.swim_limits();
    if kin.position.x.abs() > limits.x {
        kin.velocity.x = -kin.velocity.x;
    }
    if kin.position.y.abs() > limits.y {
        kin.velocity.y = -kin.velocity.y;
    }
    if kin.position.z.abs() > limits.z {
        kin.velocity.z = -kin.velocity.z;
    }

    match profile {
        MotionProfile::Swim3d => {
            kin.velocity += random_offset(rng) * PERTURBATION;
        }
        MotionProfile::Planar => {
            kin.velocity.x += (rng.gen::<f32>() - 0.5) * PERTURBATION;
            kin.velocity.y *= PLANAR_DAMPING;
            kin.velocity.z *= PLANAR_DAMPING;
        }
    }
    let (min, max) = profile.speed_band();
    kin.velocity = kin.velocity.clamp_length(min, max);
}

/// Uniform random vector in [-0.5, 0.5]^3.
pub fn random_offset<R: Rng>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
    )
}

/// Random unit vector, used for initial swim directions.
///
/// Rejection-free: a degenerate near-zero draw falls back to +X so the
/// subsequent clamp never sees a zero-length velocity.
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec3 {
    let v = random_offset(rng);
    v.try_normalize().unwrap_or(Vec3::X)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_swim_limits_apply_margin() {
        let bounds = TankDimensions::default().bounds();
        assert_eq!(bounds.half, Vec3::new(10.0, 5.0, 5.0));
        assert_eq!(bounds.swim_limits(), Vec3::new(9.5, 4.5, 4.5));
    }

    #[test]
    fn test_corner_violation_reflects_all_axes() {
        let bounds = TankDimensions::default().bounds();
        let mut rng = StdRng::seed_from_u64(1);
        let mut kin = Kinematics {
            position: Vec3::new(9.6, 4.6, 4.6),
            velocity: Vec3::new(1.0, 1.0, 1.0),
            bob_phase: 0.0,
        };
        step(&mut kin, MotionProfile::Swim3d, 0.0, 0.0, bounds, &mut rng);
        assert!(kin.velocity.x < 0.0);
        assert!(kin.velocity.y < 0.0);
        assert!(kin.velocity.z < 0.0);
    }

    #[test]
    fn test_random_direction_is_unit_length() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let d = random_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }
}
