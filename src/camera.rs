//! Orbit camera circling the tank center.
//!
//! Spherical coordinates, mouse drag for rotation, scroll for zoom. The
//! polar angle is capped at the horizon so the view never dips below the
//! tank floor, and the radius is clamped to a comfortable viewing band.

use glam::{Mat4, Vec3};

const FOV_DEGREES: f32 = 75.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;
const UP_VECTOR: Vec3 = Vec3::Y;
const MIN_PHI: f32 = 0.1;
const MAX_PHI: f32 = std::f32::consts::FRAC_PI_2;
const MIN_RADIUS: f32 = 5.0;
const MAX_RADIUS: f32 = 50.0;

pub struct Camera {
    target: Vec3,
    radius: f32,
    theta: f32, // Horizontal angle
    phi: f32,   // Polar angle from +Y
    aspect_ratio: f32,
    view_projection_matrix: Mat4,
}

impl Camera {
    pub fn new(aspect_ratio: f32) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            radius: 16.0,
            theta: std::f32::consts::FRAC_PI_2, // Front of the tank
            phi: 1.25,                          // Slightly above the fish
            aspect_ratio,
            view_projection_matrix: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.theta += delta_x;
        self.phi = (self.phi + delta_y).clamp(MIN_PHI, MAX_PHI);
        self.update_matrices();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius - delta).clamp(MIN_RADIUS, MAX_RADIUS);
        self.update_matrices();
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.update_matrices();
    }

    pub fn view_projection_matrix_transposed(&self) -> [[f32; 4]; 4] {
        self.view_projection_matrix.to_cols_array_2d()
    }

    /// World-space eye position; billboarded fish face this point.
    pub fn eye_position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.target.x + self.radius * sin_phi * self.theta.cos(),
            self.target.y + self.radius * self.phi.cos(),
            self.target.z + self.radius * sin_phi * self.theta.sin(),
        )
    }

    fn update_matrices(&mut self) {
        let view = Mat4::look_at_rh(self.eye_position(), self.target, UP_VECTOR);
        let projection = Mat4::perspective_rh(
            FOV_DEGREES.to_radians(),
            self.aspect_ratio,
            NEAR_PLANE,
            FAR_PLANE,
        );
        self.view_projection_matrix = projection * view;
    }
}
