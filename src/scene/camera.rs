use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Pinhole camera with a vertical field of view.
#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault, Serialize)]
#[serde(default)]
pub struct PerspectiveCamera {
    #[default([4.0, 3.0, 5.0])]
    pub position: [f32; 3],

    #[default([0.0; 3])]
    pub target: [f32; 3],

    #[default([0.0, 1.0, 0.0])]
    pub up_vector: [f32; 3],

    /// Vertical field of view in degrees.
    #[default(45.0)]
    pub field_of_view: f32,

    #[default(1.0)]
    pub aspect: f32,

    #[default(0.1)]
    pub near: f32,

    #[default(1000.0)]
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn look_at(&mut self, target: [f32; 3]) {
        self.target = target;
    }

    /// Matches the aspect ratio to a viewport of the given pixel size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at(
            Point3::from(self.position),
            Point3::from(self.target),
            Vector3::from(self.up_vector),
        )
    }

    /// Returns the projection matrix for the current aspect ratio.
    ///
    /// A collapsed viewport leaves the aspect ratio zero, infinite or NaN;
    /// the projection then falls back to a square aspect ratio.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };

        perspective(Deg(self.field_of_view), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Transform, Vector4};

    #[test]
    fn default_camera_frames_the_origin() {
        let camera = PerspectiveCamera::default();

        let origin = camera.view_matrix().transform_point(Point3::new(0.0, 0.0, 0.0));
        let distance = (4.0f32 * 4.0 + 3.0 * 3.0 + 5.0 * 5.0).sqrt();

        assert!(origin.x.abs() < 1e-5);
        assert!(origin.y.abs() < 1e-5);
        assert!((origin.z + distance).abs() < 1e-4);
    }

    #[test]
    fn viewport_sets_aspect_ratio() {
        let mut camera = PerspectiveCamera::default();
        camera.set_viewport(800, 600);

        assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn projection_follows_aspect_ratio() {
        let mut camera = PerspectiveCamera::default();

        camera.set_viewport(1000, 500);
        let wide = camera.projection_matrix();

        camera.set_viewport(500, 500);
        let square = camera.projection_matrix();

        assert!((square.x.x / wide.x.x - 2.0).abs() < 1e-5);
        assert_eq!(square.y.y, wide.y.y);
    }

    #[test]
    fn collapsed_viewport_still_projects() {
        let mut camera = PerspectiveCamera::default();
        let square = camera.projection_matrix();

        for &(width, height) in &[(0, 0), (0, 600), (300, 0)] {
            camera.set_viewport(width, height);

            assert_eq!(camera.projection_matrix(), square);
        }
    }

    #[test]
    fn near_plane_maps_to_minus_one() {
        let camera = PerspectiveCamera::default();

        let clip = camera.projection_matrix() * Vector4::new(0.0, 0.0, -0.1, 1.0);

        assert!((clip.z / clip.w + 1.0).abs() < 1e-4);
    }
}
