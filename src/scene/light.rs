use cgmath::prelude::*;
use cgmath::{ortho, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault, Serialize)]
#[serde(default)]
pub struct AmbientLight {
    #[default([1.0; 3])]
    pub color: [f32; 3],
    #[default(0.6)]
    pub intensity: f32,
}

/// Orthographic volume a directional light renders its shadow map from.
#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault, Serialize)]
#[serde(default)]
pub struct DirectionalShadow {
    /// Shadow map resolution in texels along each side.
    #[default(1024)]
    pub map_size: u32,
    #[default(5.0)]
    pub extent: f32,
    #[default(0.5)]
    pub near: f32,
    #[default(500.0)]
    pub far: f32,
    /// Depth offset subtracted before the shadow comparison.
    #[default(0.0)]
    pub bias: f32,
}

/// Light arriving from infinitely far away along `target - position`.
#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault, Serialize)]
#[serde(default)]
pub struct DirectionalLight {
    #[default([1.0; 3])]
    pub color: [f32; 3],
    #[default(1.0)]
    pub intensity: f32,
    #[default([0.0, 1.0, 0.0])]
    pub position: [f32; 3],
    #[default([0.0; 3])]
    pub target: [f32; 3],
    pub cast_shadow: bool,
    pub shadow: DirectionalShadow,
}

impl DirectionalLight {
    /// Unit vector pointing from the lit surface towards the light.
    pub fn direction(&self) -> Vector3<f32> {
        let towards = Vector3::from(self.position) - Vector3::from(self.target);

        if towards.magnitude2() > 0.0 {
            towards.normalize()
        } else {
            Vector3::unit_y()
        }
    }

    /// World-to-clip matrix of the shadow camera.
    pub fn shadow_matrix(&self) -> Matrix4<f32> {
        let extent = self.shadow.extent;

        let up = if self.direction().y.abs() > 0.999 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };

        let projection = ortho(
            -extent,
            extent,
            -extent,
            extent,
            self.shadow.near,
            self.shadow.far,
        );

        let view = Matrix4::look_at(
            Point3::from(self.position),
            Point3::from(self.target),
            up,
        );

        projection * view
    }
}

/// The fixed lighting rig: one ambient term, a shadow-casting key light and
/// an unshadowed fill light.
#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault, Serialize)]
#[serde(default)]
pub struct Lights {
    pub ambient: AmbientLight,

    #[default(DirectionalLight {
        intensity: 0.8,
        position: [5.0, 5.0, 5.0],
        cast_shadow: true,
        ..DirectionalLight::default()
    })]
    pub key: DirectionalLight,

    #[default(DirectionalLight {
        intensity: 0.3,
        position: [-3.0, 2.0, -3.0],
        ..DirectionalLight::default()
    })]
    pub fill: DirectionalLight,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn default_rig() {
        let lights = Lights::default();

        assert_eq!(lights.ambient.intensity, 0.6);
        assert_eq!(lights.key.intensity, 0.8);
        assert_eq!(lights.fill.intensity, 0.3);

        assert!(lights.key.cast_shadow);
        assert!(!lights.fill.cast_shadow);

        assert_eq!(lights.key.shadow.map_size, 1024);
    }

    #[test]
    fn direction_points_towards_light() {
        let light = Lights::default().key;
        let direction = light.direction();

        let expected = 1.0 / 3.0f32.sqrt();

        for &component in &[direction.x, direction.y, direction.z] {
            assert!((component - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_light_points_up() {
        let light = DirectionalLight {
            position: [0.0; 3],
            ..DirectionalLight::default()
        };

        assert_eq!(light.direction(), Vector3::unit_y());
    }

    #[test]
    fn shadow_camera_sees_target_at_center() {
        let light = Lights::default().key;

        let clip = light.shadow_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
        assert!(clip.z > -1.0 && clip.z < 1.0);
    }

    #[test]
    fn overhead_light_has_valid_shadow_camera() {
        let light = DirectionalLight::default();

        let clip = light.shadow_matrix() * Vector4::new(1.0, 0.0, 1.0, 1.0);

        assert!(clip.x.is_finite() && clip.y.is_finite());
    }
}
