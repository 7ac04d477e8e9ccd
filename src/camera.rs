//! Pointer to world ray
//!
//! The engine consumes world-space rays; hosts usually have a camera and a
//! cursor position. [`Camera`] bridges the two, and [`OrbitController`] is
//! the camera rig the demo host suspends while a joint is grabbed.

use glam::{Mat4, Vec3, Vec4};

use crate::picking::Ray;

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// World-space ray through normalized device coordinates, starting on
    /// the near plane.
    pub fn screen_to_ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv_view_proj = self.view_projection().inverse();

        let near_point = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far_point = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near = near_point.truncate() / near_point.w;
        let far = far_point.truncate() / far_point.w;

        Ray::new(near, far - near)
    }

    /// Ray under a cursor given in pixels, origin at the top-left corner.
    pub fn pointer_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        let ndc_x = (2.0 * x / width.max(1.0)) - 1.0;
        let ndc_y = 1.0 - (2.0 * y / height.max(1.0));
        self.screen_to_ray(ndc_x, ndc_y)
    }
}

pub struct OrbitController {
    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_phi: f32,
    pub max_phi: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping: f32,
    velocity_theta: f32,
    velocity_phi: f32,
    velocity_radius: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 5.0,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_4,
            min_radius: 0.5,
            max_radius: 100.0,
            min_phi: 0.05,
            max_phi: std::f32::consts::PI - 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            damping: 0.85,
            velocity_theta: 0.0,
            velocity_phi: 0.0,
            velocity_radius: 0.0,
        }
    }
}

impl OrbitController {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            ..Default::default()
        }
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.velocity_theta -= delta_x * self.rotate_speed;
        self.velocity_phi -= delta_y * self.rotate_speed;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.velocity_radius -= delta * self.zoom_speed * self.radius;
    }

    /// Drops any remaining momentum, e.g. when a drag takes over the pointer.
    pub fn stop(&mut self) {
        self.velocity_theta = 0.0;
        self.velocity_phi = 0.0;
        self.velocity_radius = 0.0;
    }

    pub fn update(&mut self) {
        self.theta += self.velocity_theta;
        self.phi = (self.phi + self.velocity_phi).clamp(self.min_phi, self.max_phi);
        self.radius = (self.radius + self.velocity_radius).clamp(self.min_radius, self.max_radius);

        self.velocity_theta *= self.damping;
        self.velocity_phi *= self.damping;
        self.velocity_radius *= self.damping;

        if self.velocity_theta.abs() < 0.0001 {
            self.velocity_theta = 0.0;
        }
        if self.velocity_phi.abs() < 0.0001 {
            self.velocity_phi = 0.0;
        }
        if self.velocity_radius.abs() < 0.0001 {
            self.velocity_radius = 0.0;
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        let x = self.radius * self.phi.sin() * self.theta.cos();
        let y = self.radius * self.phi.cos();
        let z = self.radius * self.phi.sin() * self.theta.sin();
        self.center + Vec3::new(x, y, z)
    }

    pub fn update_camera(&self, camera: &mut Camera) {
        camera.position = self.camera_position();
        camera.target = self.center;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn centre_of_screen_looks_at_target() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            ..Camera::default()
        };
        let ray = camera.pointer_ray(400.0, 300.0, 800.0, 600.0);

        assert_abs_diff_eq!(ray.direction.z, -1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(ray.origin.z, 10.0 - camera.near, epsilon = 1e-3);
    }

    #[test]
    fn top_of_screen_points_up() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 10.0),
            ..Camera::default()
        };
        let ray = camera.pointer_ray(400.0, 0.0, 800.0, 600.0);
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn orbit_keeps_radius() {
        let mut orbit = OrbitController::new(Vec3::new(0.0, 1.0, 0.0), 4.0);
        orbit.rotate(30.0, -10.0);
        orbit.update();
        let mut camera = Camera::default();
        orbit.update_camera(&mut camera);

        assert_abs_diff_eq!((camera.position - orbit.center).length(), 4.0, epsilon = 1e-4);
        assert_eq!(camera.target, orbit.center);
    }
}
