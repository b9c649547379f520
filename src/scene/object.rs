use crate::{BufferGeometry, Dirty, Material};
use cgmath::{Matrix4, Rad, Vector3};
use serde::Serialize;
use smart_default::SmartDefault;

/// Position, XYZ Euler rotation (radians) and scale.
///
/// The rotation matrix is `Rx * Ry * Rz`, i.e. the Z rotation is applied
/// first to the object.
#[derive(Clone, Debug, PartialEq, Serialize, SmartDefault)]
pub struct Transform {
    #[default([0.0; 3])]
    pub position: [f32; 3],
    #[default([0.0; 3])]
    pub rotation: [f32; 3],
    #[default([1.0; 3])]
    pub scale: [f32; 3],
}

impl Transform {
    pub fn matrix(&self) -> Matrix4<f32> {
        let [x, y, z] = self.position;
        let [rx, ry, rz] = self.rotation;
        let [sx, sy, sz] = self.scale;

        Matrix4::from_translation(Vector3::new(x, y, z))
            * Matrix4::from_angle_x(Rad(rx))
            * Matrix4::from_angle_y(Rad(ry))
            * Matrix4::from_angle_z(Rad(rz))
            * Matrix4::from_nonuniform_scale(sx, sy, sz)
    }
}

/// One drawable unit of a composite object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mesh {
    pub name: String,
    pub geometry: BufferGeometry,
    /// Index into the owning object's material list.
    pub material: usize,
    /// Offset relative to the object origin.
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: BufferGeometry, material: usize) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::default(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// A rigid group of meshes sharing one transform and a list of materials.
///
/// Each part is tracked separately so that animating the transform every
/// frame does not cause geometry to be uploaded again.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Object {
    pub transform: Dirty<Transform>,
    pub meshes: Dirty<Vec<Mesh>>,
    pub materials: Dirty<Vec<Material>>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material and returns the index meshes should refer to it by.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add(&mut self, mesh: Mesh) {
        assert!(
            mesh.material < self.materials.len(),
            "mesh `{}' refers to a missing material",
            mesh.name
        );

        self.meshes.push(mesh);
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    /// Sets the shadow flags of every mesh in the group.
    pub fn set_shadows(&mut self, cast: bool, receive: bool) {
        for mesh in self.meshes.iter_mut() {
            mesh.cast_shadow = cast;
            mesh.receive_shadow = receive;
        }
    }

    /// Object-to-world matrix of one of this object's meshes.
    pub fn mesh_matrix(&self, mesh: &Mesh) -> Matrix4<f32> {
        self.transform.matrix() * mesh.transform.matrix()
    }

    pub fn material_of(&self, mesh: &Mesh) -> &Material {
        &self.materials[mesh.material]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_from_hex;
    use cgmath::{InnerSpace, Point3, SquareMatrix, Transform as _};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn close(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).magnitude() < EPSILON
    }

    fn sample_object() -> Object {
        let mut object = Object::new();

        let material = object.add_material(Material::Phong {
            color: color_from_hex(0xffffff),
            shininess: 10.0,
            flat_shading: true,
        });

        let geometry = BufferGeometry::cone(1.0, 1.0, 3, 1);

        object.add(Mesh::new("first", geometry.clone(), material));
        object.add(Mesh::new("second", geometry, material).with_transform(Transform {
            position: [0.0, 1.0, 0.0],
            ..Transform::default()
        }));

        object
    }

    #[test]
    fn default_transform_is_identity() {
        assert_eq!(Transform::default().matrix(), Matrix4::identity());
    }

    #[test]
    fn rotation_is_applied_before_translation() {
        let transform = Transform {
            position: [1.0, 0.0, 0.0],
            rotation: [0.0, FRAC_PI_2, 0.0],
            ..Transform::default()
        };

        let point = transform.matrix().transform_point(Point3::new(0.0, 0.0, 1.0));

        assert!(close(point, Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn quarter_turn_about_x_maps_up_to_forward() {
        let transform = Transform {
            rotation: [FRAC_PI_2, 0.0, 0.0],
            ..Transform::default()
        };

        let point = transform.matrix().transform_point(Point3::new(0.0, 1.0, 0.0));

        assert!(close(point, Point3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn mesh_matrix_composes_under_group() {
        let mut object = sample_object();
        object.transform.position = [0.0, 0.0, 5.0];

        let second = object.mesh("second").unwrap().clone();
        let origin = object
            .mesh_matrix(&second)
            .transform_point(Point3::new(0.0, 0.0, 0.0));

        assert!(close(origin, Point3::new(0.0, 1.0, 5.0)));
    }

    #[test]
    fn set_shadows_reaches_every_mesh() {
        let mut object = sample_object();
        object.set_shadows(true, true);

        assert!(object
            .meshes
            .iter()
            .all(|mesh| mesh.cast_shadow && mesh.receive_shadow));
    }

    #[test]
    fn meshes_share_one_material() {
        let object = sample_object();

        assert_eq!(object.materials.len(), 1);
        assert!(object.meshes.iter().all(|mesh| mesh.material == 0));
    }

    #[test]
    #[should_panic]
    fn adding_mesh_without_material_panics() {
        let mut object = Object::new();
        object.add(Mesh::new("orphan", BufferGeometry::cone(1.0, 1.0, 3, 1), 0));
    }
}
