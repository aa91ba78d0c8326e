//! Perspective camera.

use crate::config::CameraConfig;
use glam::{Mat4, Vec3};

/// Perspective camera looking at the origin from +Z.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            fov_deg: config.fov_deg,
            aspect,
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, config.distance),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Set the aspect ratio from surface dimensions.
    ///
    /// A zero height leaves the previous aspect in place.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            log::warn!("Ignoring zero-height viewport ({}x{})", width, height);
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.update_projection_matrix();
    }

    /// Recompute the cached projection after changing fov, aspect or planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_follows_viewport() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        camera.set_viewport(800, 600);
        assert_eq!(camera.aspect, 800.0 / 600.0);

        camera.set_viewport(300, 0);
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 16.0 / 9.0);
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!((clip.w - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_wider_aspect_shrinks_x() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let point = glam::Vec4::new(1.0, 0.0, 0.0, 1.0);
        let square = camera.view_projection() * point;
        camera.set_viewport(200, 100);
        let wide = camera.view_projection() * point;
        assert!((wide.x / wide.w) < (square.x / square.w));
    }
}
