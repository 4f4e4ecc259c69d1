//! The aquarium scene: live fish, plants, and the reconciliation that keeps
//! the live set in sync with an externally supplied descriptor list.
//!
//! Ownership model: the `Aquarium` exclusively owns every rig and is the
//! only place rigs are created or disposed. The render loop reads; the
//! reconciler mutates. Both run on the one control thread.

use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

use crate::descriptor::{DescriptorKind, FishDescriptor, FishId, ShapeSpec};
use crate::factory::{self, DisposalStats, FishRig};
use crate::loader::{LoadRequest, LoadedImage};
use crate::mesh::{self, Geometry, SolidVertex};
use crate::motion;
use crate::physics::{self, Kinematics, MotionProfile, TankBounds, TankDimensions};

/// Delta-time ceiling: a stalled frame (tab in background, debugger pause)
/// must not catapult fish through the walls.
pub const MAX_DELTA: f32 = 0.05;

/// Per-frame slerp factor turning a fish toward its velocity.
const TURN_FACTOR: f32 = 0.1;

const PLANT_COUNT: usize = 15;
const INITIAL_SPEED_3D: f32 = 1.5;
const INITIAL_SPEED_IMAGE: f32 = 1.0;

const PLANT_COLOR: [f32; 3] = [0.565, 0.933, 0.565];
const GROUND_COLOR: [f32; 3] = [0.941, 0.973, 1.0];

/// Realized kind of a live fish, dispatched on by tick and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum FishKind {
    Procedural,
    AiShaped(ShapeSpec),
    Image { aspect_ratio: f32 },
}

/// A descriptor realized into scene objects.
#[derive(Debug)]
pub struct Fish {
    pub id: FishId,
    pub kind: FishKind,
    pub kin: Kinematics,
    pub orientation: Quat,
    /// Horizontal mirror sign for billboarded image fish.
    pub flip: f32,
    pub rig: FishRig,
}

impl Fish {
    pub fn profile(&self) -> MotionProfile {
        match self.kind {
            FishKind::Image { .. } => MotionProfile::Planar,
            _ => MotionProfile::Swim3d,
        }
    }

    /// World transform of the fish root.
    pub fn transform(&self) -> Mat4 {
        match self.kind {
            FishKind::Image { .. } => Mat4::from_scale_rotation_translation(
                Vec3::new(self.flip, 1.0, 1.0),
                self.orientation,
                self.kin.position,
            ),
            _ => Mat4::from_rotation_translation(self.orientation, self.kin.position),
        }
    }
}

/// Environmental decoration; fixed population, never reconciled.
#[derive(Debug)]
pub struct Plant {
    pub geometry: Geometry,
    pub height: f32,
    pub position: Vec3,
}

/// An image descriptor whose pixels are still being decoded.
/// Present in the map = Loading; removal while in flight = cancelled, and
/// the eventual completion is ignored.
#[derive(Debug, Clone, Copy)]
struct PendingImage {
    start_position: Vec3,
}

pub struct Aquarium {
    dims: TankDimensions,
    bounds: TankBounds,
    fish: Vec<Fish>,
    plants: Vec<Plant>,
    ground: Geometry,
    ground_transform: Mat4,
    pending: HashMap<FishId, PendingImage>,
    elapsed: f32,
    tail_flap: f32,
    rng: StdRng,
    stats: DisposalStats,
    torn_down: bool,
}

impl Aquarium {
    /// Build an empty tank: plants and ground only. Fish arrive through
    /// `apply_descriptors`. A fixed `seed` makes the whole simulation
    /// reproducible; `None` draws entropy.
    pub fn new(dims: TankDimensions, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let plants = Self::grow_plants(dims, &mut rng);
        let ground = mesh::plane(dims.width, dims.depth, 1);
        let ground_transform = Mat4::from_rotation_translation(
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, -dims.height * 0.5, 0.0),
        );
        Self {
            dims,
            bounds: dims.bounds(),
            fish: Vec::new(),
            plants,
            ground,
            ground_transform,
            pending: HashMap::new(),
            elapsed: 0.0,
            tail_flap: 0.0,
            rng,
            stats: DisposalStats::default(),
            torn_down: false,
        }
    }

    fn grow_plants(dims: TankDimensions, rng: &mut StdRng) -> Vec<Plant> {
        (0..PLANT_COUNT)
            .map(|_| {
                let height = rng.gen::<f32>() * 4.0 + 2.0;
                let geometry = mesh::tapered_cylinder(0.1, 0.2, height, 8, 20).retain_base();
                let position = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * (dims.width - 2.0),
                    -dims.height * 0.5 + height * 0.5,
                    (rng.gen::<f32>() - 0.5) * (dims.depth - 2.0),
                );
                Plant {
                    geometry,
                    height,
                    position,
                }
            })
            .collect()
    }

    /// Reconcile the live set against a new descriptor list.
    ///
    /// Removals run before additions so peak resource usage is bounded.
    /// Fish whose id appears on both sides are left completely untouched:
    /// same position, velocity, and phase, which is what keeps mid-flight
    /// count changes from visibly resetting survivors. Calling this twice
    /// with the same list is a no-op the second time.
    ///
    /// Image descriptors are not inserted synchronously; the returned
    /// requests must be handed to an `ImageLoader`, whose completions come
    /// back through [`Aquarium::complete_image_load`].
    pub fn apply_descriptors(&mut self, descriptors: &[FishDescriptor]) -> Vec<LoadRequest> {
        let wanted: HashSet<&FishId> = descriptors.iter().map(|d| &d.id).collect();

        // Phase 1: removals, disposing rigs before anything new is built.
        let before = self.fish.len();
        let mut kept = Vec::with_capacity(self.fish.len());
        for mut fish in self.fish.drain(..) {
            if wanted.contains(&fish.id) {
                kept.push(fish);
            } else {
                log::debug!("removing {}", fish.id);
                fish.rig.dispose(&mut self.stats);
            }
        }
        self.fish = kept;
        let removed = before - self.fish.len();

        // Cancel in-flight loads whose descriptor disappeared.
        self.pending.retain(|id, _| {
            let keep = wanted.contains(id);
            if !keep {
                log::debug!("cancelling pending load for {}", id);
            }
            keep
        });

        // Phase 2: additions. `live` also absorbs ids added this pass so a
        // duplicated id in one list cannot realize two fish.
        let mut live: HashSet<FishId> = self.fish.iter().map(|f| f.id.clone()).collect();
        let mut requests = Vec::new();
        let mut added = 0usize;
        for descriptor in descriptors {
            if live.contains(&descriptor.id) || self.pending.contains_key(&descriptor.id) {
                continue;
            }
            live.insert(descriptor.id.clone());
            if let Err(reason) = descriptor.validate() {
                log::warn!("dropping malformed descriptor: {}", reason);
                continue;
            }
            match &descriptor.kind {
                DescriptorKind::Procedural => {
                    let rig = factory::build_procedural(&mut self.rng);
                    self.insert_fish(
                        descriptor.id.clone(),
                        FishKind::Procedural,
                        descriptor.start_position,
                        INITIAL_SPEED_3D,
                        rig,
                    );
                    added += 1;
                }
                DescriptorKind::AiShaped(spec) => {
                    let rig = factory::build_ai_shaped(spec, &mut self.rng);
                    self.insert_fish(
                        descriptor.id.clone(),
                        FishKind::AiShaped(*spec),
                        descriptor.start_position,
                        INITIAL_SPEED_3D,
                        rig,
                    );
                    added += 1;
                }
                DescriptorKind::Image(source) => {
                    self.pending.insert(
                        descriptor.id.clone(),
                        PendingImage {
                            start_position: descriptor.start_position,
                        },
                    );
                    requests.push(LoadRequest {
                        id: descriptor.id.clone(),
                        source: source.clone(),
                    });
                }
            }
        }
        if removed > 0 || added > 0 || !requests.is_empty() {
            log::info!(
                "reconciled: {} removed, {} added, {} image loads requested, {} live",
                removed,
                added,
                requests.len(),
                self.fish.len()
            );
        }
        requests
    }

    fn insert_fish(&mut self, id: FishId, kind: FishKind, position: Vec3, speed: f32, rig: FishRig) {
        let velocity = physics::random_direction(&mut self.rng) * speed;
        let bob_phase = self.rng.gen::<f32>() * std::f32::consts::TAU;
        self.fish.push(Fish {
            id,
            kind,
            kin: Kinematics {
                position,
                velocity,
                bob_phase,
            },
            orientation: Quat::IDENTITY,
            flip: 1.0,
            rig,
        });
    }

    /// Apply a finished image decode.
    ///
    /// Stale completions (the descriptor was removed, or was never
    /// requested) are ignored; a late result can never resurrect a removed
    /// fish. Failures drop the entity silently apart from a diagnostic;
    /// the owning layer may resubmit the descriptor.
    pub fn complete_image_load(&mut self, id: FishId, result: anyhow::Result<LoadedImage>) {
        let Some(pending) = self.pending.remove(&id) else {
            log::debug!("ignoring stale image load for {}", id);
            return;
        };
        let image = match result {
            Ok(image) if image.width > 0 && image.height > 0 => image,
            Ok(_) => {
                log::warn!("discarding empty image for {}", id);
                return;
            }
            Err(error) => {
                log::warn!("image load failed for {}: {:#}", id, error);
                return;
            }
        };
        let aspect_ratio = image.width as f32 / image.height as f32;
        let rig = factory::build_image_plane(image);
        self.insert_fish(
            id,
            FishKind::Image { aspect_ratio },
            pending.start_position,
            INITIAL_SPEED_IMAGE,
            rig,
        );
    }

    /// Advance the whole scene by `dt` seconds. `camera_eye` orients the
    /// billboarded image fish.
    pub fn tick(&mut self, dt: f32, camera_eye: Vec3) {
        if self.torn_down {
            return;
        }
        let dt = dt.clamp(0.0, MAX_DELTA);
        self.elapsed += dt;
        self.tail_flap = motion::tail_flap_angle(self.elapsed);

        for plant in &mut self.plants {
            motion::sway_plant(&mut plant.geometry, plant.height, self.elapsed);
        }

        for fish in &mut self.fish {
            let profile = fish.profile();
            physics::step(
                &mut fish.kin,
                profile,
                dt,
                self.elapsed,
                self.bounds,
                &mut self.rng,
            );
            match &fish.kind {
                FishKind::Image { .. } => {
                    fish.orientation = motion::billboard_toward(fish.kin.position, camera_eye);
                    if fish.kin.velocity.x != 0.0 {
                        fish.flip = fish.kin.velocity.x.signum();
                    }
                    if let FishRig::ImagePlane { plane, width, .. } = &mut fish.rig {
                        motion::bend_image_plane(plane, *width, self.elapsed);
                    }
                }
                _ => {
                    let target = motion::facing_velocity(fish.kin.velocity);
                    fish.orientation = fish.orientation.slerp(target, TURN_FACTOR);
                }
            }
        }
    }

    /// Emit every solid (non-textured) mesh in world space: ground, plants,
    /// fish bodies, tails, fins. Called once per frame by the renderer.
    pub fn emit_solid_vertices(&self, out: &mut Vec<SolidVertex>) {
        self.ground
            .emit_solid(self.ground_transform, GROUND_COLOR, out);
        for plant in &self.plants {
            plant
                .geometry
                .emit_solid(Mat4::from_translation(plant.position), PLANT_COLOR, out);
        }
        for fish in &self.fish {
            let FishRig::Solid {
                body,
                tail,
                fin,
                material,
            } = &fish.rig
            else {
                continue;
            };
            let root = fish.transform();
            body.emit_solid(root, material.color, out);
            if let Some(tail) = tail {
                let wag = Quat::from_rotation_y(self.tail_flap) * tail.base_rotation;
                let local = Mat4::from_translation(tail.offset) * Mat4::from_quat(wag);
                tail.geometry.emit_solid(root * local, material.color, out);
            }
            if let Some(fin) = fin {
                let local = Mat4::from_translation(fin.offset) * Mat4::from_quat(fin.rotation);
                fin.geometry.emit_solid(root * local, material.color, out);
            }
        }
    }

    /// Iterate image fish for the textured pass.
    pub fn image_fish(&self) -> impl Iterator<Item = (&FishId, Mat4, &Geometry, &LoadedImage)> {
        self.fish.iter().filter_map(|fish| match &fish.rig {
            FishRig::ImagePlane { plane, pixels, .. } => {
                Some((&fish.id, fish.transform(), plane, pixels))
            }
            _ => None,
        })
    }

    /// Release every rig, plant, and decoration. Idempotent; also invoked
    /// by `Drop`. The render loop must not tick the scene afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        for mut fish in self.fish.drain(..) {
            fish.rig.dispose(&mut self.stats);
        }
        for plant in &mut self.plants {
            if plant.geometry.dispose() {
                self.stats.geometries += 1;
            }
        }
        if self.ground.dispose() {
            self.stats.geometries += 1;
        }
        self.pending.clear();
        self.torn_down = true;
        log::info!(
            "scene torn down: {} geometries, {} materials, {} textures released",
            self.stats.geometries,
            self.stats.materials,
            self.stats.textures
        );
    }

    pub fn fish(&self) -> &[Fish] {
        &self.fish
    }

    pub fn find(&self, id: &FishId) -> Option<&Fish> {
        self.fish.iter().find(|f| &f.id == id)
    }

    pub fn live_ids(&self) -> HashSet<FishId> {
        self.fish.iter().map(|f| f.id.clone()).collect()
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn dimensions(&self) -> TankDimensions {
        self.dims
    }

    pub fn bounds(&self) -> TankBounds {
        self.bounds
    }

    pub fn disposal_stats(&self) -> DisposalStats {
        self.stats
    }
}

impl Drop for Aquarium {
    fn drop(&mut self) {
        self.teardown();
    }
}
