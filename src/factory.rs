//! Builds the renderable rig for each descriptor kind.
//!
//! A rig owns its geometry and material exclusively; the scene is the only
//! place rigs are created and disposed. Disposal is counted so tests can
//! verify nothing leaks.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::descriptor::{BodyShape, ShapeSpec, TailShape};
use crate::loader::LoadedImage;
use crate::mesh::{self, Geometry};

/// Rendered height of every image fish; width follows the source aspect.
pub const IMAGE_FISH_HEIGHT: f32 = 1.5;

/// Plane subdivisions across the image width, for the bend wave.
const IMAGE_PLANE_SEGMENTS: u32 = 8;

const BODY_SEGMENTS: u32 = 16;
const BODY_RINGS: u32 = 8;
const TAIL_SEGMENTS: u32 = 8;

/// Running count of released resources, owned by the scene.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DisposalStats {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

/// Flat-color material shared by all parts of one solid fish.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    disposed: bool,
}

impl Material {
    pub fn new(color: [f32; 3]) -> Self {
        Self {
            color,
            disposed: false,
        }
    }

    pub fn dispose(&mut self) -> bool {
        let first = !self.disposed;
        self.disposed = true;
        first
    }
}

/// Tail sub-part: geometry plus its local placement behind the body.
#[derive(Debug, Clone, PartialEq)]
pub struct TailPart {
    pub geometry: Geometry,
    pub offset: Vec3,
    /// Orientation before the flap is applied (cones are authored apex-up
    /// and tilted to point along the swim axis).
    pub base_rotation: Quat,
}

/// Dorsal fin sub-part.
#[derive(Debug, Clone, PartialEq)]
pub struct FinPart {
    pub geometry: Geometry,
    pub offset: Vec3,
    pub rotation: Quat,
}

/// The renderable subgraph owned by one live fish.
#[derive(Debug, Clone, PartialEq)]
pub enum FishRig {
    Solid {
        body: Geometry,
        tail: Option<TailPart>,
        fin: Option<FinPart>,
        material: Material,
    },
    ImagePlane {
        plane: Geometry,
        width: f32,
        /// Decoded RGBA pixels; the renderer uploads these once per fish
        /// and destroys the GPU texture when the fish is pruned.
        pixels: LoadedImage,
    },
}

impl FishRig {
    /// Release every geometry, material, and texture exactly once.
    pub fn dispose(&mut self, stats: &mut DisposalStats) {
        match self {
            FishRig::Solid {
                body,
                tail,
                fin,
                material,
            } => {
                if body.dispose() {
                    stats.geometries += 1;
                }
                if let Some(tail) = tail {
                    if tail.geometry.dispose() {
                        stats.geometries += 1;
                    }
                }
                if let Some(fin) = fin {
                    if fin.geometry.dispose() {
                        stats.geometries += 1;
                    }
                }
                if material.dispose() {
                    stats.materials += 1;
                }
            }
            FishRig::ImagePlane { plane, pixels, .. } => {
                if plane.dispose() {
                    stats.geometries += 1;
                }
                if !pixels.rgba.is_empty() {
                    pixels.rgba = Vec::new();
                    stats.textures += 1;
                }
            }
        }
    }
}

/// Small ellipsoid body, cone tail, randomized hue.
pub fn build_procedural<R: Rng>(rng: &mut R) -> FishRig {
    let body = mesh::sphere(0.2, BODY_SEGMENTS, BODY_RINGS);
    let tail = TailPart {
        geometry: mesh::cone(0.15, 0.4, TAIL_SEGMENTS),
        offset: Vec3::new(0.0, 0.0, -0.3),
        base_rotation: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
    };
    FishRig::Solid {
        body,
        tail: Some(tail),
        fin: None,
        material: Material::new(random_fish_color(rng)),
    }
}

/// Body and tail primitives scaled to the generator's shape specification.
pub fn build_ai_shaped<R: Rng>(spec: &ShapeSpec, rng: &mut R) -> FishRig {
    let body = match spec.body {
        BodyShape::Ellipsoid => mesh::ellipsoid(spec.body_size * 0.5, BODY_SEGMENTS, BODY_RINGS),
        BodyShape::Box => mesh::cuboid(spec.body_size),
    };
    let tail_length = spec.tail_size.y;
    let (tail_geometry, base_rotation) = match spec.tail {
        TailShape::Cone => (
            mesh::cone(spec.tail_size.x, tail_length, TAIL_SEGMENTS),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        ),
        TailShape::Triangle => (
            mesh::triangle_fin(spec.tail_size.x, tail_length),
            Quat::IDENTITY,
        ),
    };
    let tail = TailPart {
        geometry: tail_geometry,
        offset: Vec3::new(0.0, 0.0, -(spec.body_size.z + tail_length) * 0.5),
        base_rotation,
    };
    let fin = spec.dorsal_fin.then(|| FinPart {
        geometry: mesh::triangle_fin(0.15, 0.3),
        offset: Vec3::new(0.0, spec.body_size.y * 0.5, 0.0),
        rotation: Quat::from_rotation_x(0.4),
    });
    FishRig::Solid {
        body,
        tail: Some(tail),
        fin,
        material: Material::new(random_fish_color(rng)),
    }
}

/// Double-sided textured plane sized to the source aspect ratio. The plane
/// keeps its base vertex positions so the bend wave can displace them.
pub fn build_image_plane(pixels: LoadedImage) -> FishRig {
    let aspect = pixels.width as f32 / pixels.height.max(1) as f32;
    let width = IMAGE_FISH_HEIGHT * aspect;
    let plane = mesh::plane(width, IMAGE_FISH_HEIGHT, IMAGE_PLANE_SEGMENTS).retain_base();
    FishRig::ImagePlane {
        plane,
        width,
        pixels,
    }
}

/// Random hue at fixed saturation/lightness, like the original palette.
pub fn random_fish_color<R: Rng>(rng: &mut R) -> [f32; 3] {
    hsl_to_rgb(rng.gen::<f32>(), 0.8, 0.6)
}

/// Standard HSL to RGB, h/s/l all in [0, 1].
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(1.0)) * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c * 0.5;
    [r + m, g + m, b + m]
}
