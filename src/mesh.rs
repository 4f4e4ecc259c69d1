//! CPU-side triangle geometry for fish, plants, and scene decoration.
//!
//! Geometry lives on the CPU and is re-emitted into the renderer's vertex
//! buffers every frame, so per-vertex animation (plant sway, image bend)
//! just rewrites `positions` from the retained `base_positions`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Vertex format for the solid (lit, vertex-colored) pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SolidVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Vertex format for the textured (image fish) pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh with optional retained base positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    /// Immutable snapshot of the original vertex positions, kept by
    /// geometry that animates per-vertex (plants, image planes). Sway and
    /// bend are recomputed from this every frame, never accumulated.
    pub base_positions: Vec<Vec3>,
    disposed: bool,
}

impl Geometry {
    fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, uvs: Vec<Vec2>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            uvs,
            indices,
            base_positions: Vec::new(),
            disposed: false,
        }
    }

    /// Snapshot the current positions for later per-vertex animation.
    pub fn retain_base(mut self) -> Self {
        self.base_positions = self.positions.clone();
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Release the backing buffers. Safe to call more than once; only the
    /// first call reports a disposal.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.positions = Vec::new();
        self.normals = Vec::new();
        self.uvs = Vec::new();
        self.indices = Vec::new();
        self.base_positions = Vec::new();
        self.disposed = true;
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Append this mesh, transformed into world space, onto a solid vertex
    /// list. `transform` must be rigid (rotation + translation), so normals
    /// transform with the same matrix.
    pub fn emit_solid(&self, transform: Mat4, color: [f32; 3], out: &mut Vec<SolidVertex>) {
        for &i in &self.indices {
            let p = transform.transform_point3(self.positions[i as usize]);
            let n = transform.transform_vector3(self.normals[i as usize]);
            out.push(SolidVertex {
                position: p.to_array(),
                normal: n.to_array(),
                color,
            });
        }
    }

    /// Append this mesh onto a textured vertex list. Non-uniform scale (the
    /// horizontal flip for image fish) is allowed here since the textured
    /// pipeline is unlit.
    pub fn emit_textured(&self, transform: Mat4, out: &mut Vec<TexturedVertex>) {
        for &i in &self.indices {
            let p = transform.transform_point3(self.positions[i as usize]);
            let uv = self.uvs[i as usize];
            out.push(TexturedVertex {
                position: p.to_array(),
                uv: uv.to_array(),
            });
        }
    }
}

/// UV sphere stretched to `radii` (half-extents per axis).
pub fn ellipsoid(radii: Vec3, segments: u32, rings: u32) -> Geometry {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        for seg in 0..=segments {
            let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
            let unit = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            positions.push(unit * radii);
            // Ellipsoid normal: gradient of the implicit surface.
            let n = Vec3::new(
                unit.x / radii.x,
                unit.y / radii.y,
                unit.z / radii.z,
            );
            normals.push(n.normalize_or_zero());
            uvs.push(Vec2::new(
                seg as f32 / segments as f32,
                ring as f32 / rings as f32,
            ));
        }
    }
    let mut indices = Vec::new();
    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    Geometry::new(positions, normals, uvs, indices)
}

/// Sphere of uniform radius.
pub fn sphere(radius: f32, segments: u32, rings: u32) -> Geometry {
    ellipsoid(Vec3::splat(radius), segments, rings)
}

/// Axis-aligned box with the given full dimensions, centered at the origin.
pub fn cuboid(size: Vec3) -> Geometry {
    let h = size * 0.5;
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X),
        (Vec3::Z, Vec3::Y, Vec3::NEG_X),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();
    for (normal, up, right) in faces {
        let origin = normal * h;
        let u = right * h;
        let v = up * h;
        let base = positions.len() as u32;
        positions.extend_from_slice(&[
            origin - u - v,
            origin + u - v,
            origin + u + v,
            origin - u + v,
        ]);
        normals.extend_from_slice(&[normal; 4]);
        uvs.extend_from_slice(&[
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Geometry::new(positions, normals, uvs, indices)
}

/// Cone with its apex at +Y and base at -Y, matching the tail primitive the
/// factory tilts behind fish bodies.
pub fn cone(radius: f32, height: f32, segments: u32) -> Geometry {
    let apex = Vec3::new(0.0, height * 0.5, 0.0);
    let base_y = -height * 0.5;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    let slope = radius / height;
    for seg in 0..segments {
        let t0 = std::f32::consts::TAU * seg as f32 / segments as f32;
        let t1 = std::f32::consts::TAU * (seg + 1) as f32 / segments as f32;
        let p0 = Vec3::new(t0.cos() * radius, base_y, t0.sin() * radius);
        let p1 = Vec3::new(t1.cos() * radius, base_y, t1.sin() * radius);
        let tm = (t0 + t1) * 0.5;
        let side_normal = Vec3::new(tm.cos(), slope, tm.sin()).normalize();
        let base = positions.len() as u32;
        positions.extend_from_slice(&[apex, p1, p0]);
        normals.extend_from_slice(&[side_normal; 3]);
        uvs.extend_from_slice(&[Vec2::ZERO; 3]);
        indices.extend_from_slice(&[base, base + 1, base + 2]);

        // Base cap.
        let cap = positions.len() as u32;
        positions.extend_from_slice(&[Vec3::new(0.0, base_y, 0.0), p0, p1]);
        normals.extend_from_slice(&[Vec3::NEG_Y; 3]);
        uvs.extend_from_slice(&[Vec2::ZERO; 3]);
        indices.extend_from_slice(&[cap, cap + 1, cap + 2]);
    }
    Geometry::new(positions, normals, uvs, indices)
}

/// Single flat triangle in the Y-Z plane: attachment point toward +Z,
/// widening toward -Z. Used for triangle tails and dorsal fins; rendered
/// double-sided.
pub fn triangle_fin(half_width: f32, length: f32) -> Geometry {
    let positions = vec![
        Vec3::new(0.0, 0.0, length * 0.5),
        Vec3::new(0.0, half_width, -length * 0.5),
        Vec3::new(0.0, -half_width, -length * 0.5),
    ];
    let normals = vec![Vec3::X; 3];
    let uvs = vec![Vec2::ZERO; 3];
    Geometry::new(positions, normals, uvs, vec![0, 1, 2])
}

/// Plane in the XY plane facing +Z, subdivided along X so the bend wave has
/// vertices to displace. UVs span the full image.
pub fn plane(width: f32, height: f32, x_segments: u32) -> Geometry {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();
    for col in 0..=x_segments {
        let fx = col as f32 / x_segments as f32;
        let x = (fx - 0.5) * width;
        for (fy, y) in [(0.0, -height * 0.5), (1.0, height * 0.5)] {
            positions.push(Vec3::new(x, y, 0.0));
            normals.push(Vec3::Z);
            uvs.push(Vec2::new(fx, 1.0 - fy));
        }
    }
    for col in 0..x_segments {
        let a = col * 2; // bottom
        let b = a + 1; // top
        let c = a + 2;
        let d = a + 3;
        indices.extend_from_slice(&[a, c, b, b, c, d]);
    }
    Geometry::new(positions, normals, uvs, indices)
}

/// Tapered cylinder standing along Y, base at -height/2. The plant stalk
/// primitive: 8 radial and 20 height segments give the sway something to
/// work with.
pub fn tapered_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
) -> Geometry {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let slope = (radius_bottom - radius_top) / height;
    for row in 0..=height_segments {
        let fy = row as f32 / height_segments as f32;
        let y = (fy - 0.5) * height;
        let radius = radius_bottom + (radius_top - radius_bottom) * fy;
        for seg in 0..=radial_segments {
            let theta = std::f32::consts::TAU * seg as f32 / radial_segments as f32;
            let dir = Vec3::new(theta.cos(), 0.0, theta.sin());
            positions.push(dir * radius + Vec3::new(0.0, y, 0.0));
            normals.push((dir + Vec3::new(0.0, slope, 0.0)).normalize_or_zero());
            uvs.push(Vec2::new(seg as f32 / radial_segments as f32, fy));
        }
    }
    let mut indices = Vec::new();
    let stride = radial_segments + 1;
    for row in 0..height_segments {
        for seg in 0..radial_segments {
            let a = row * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Geometry::new(positions, normals, uvs, indices)
}
