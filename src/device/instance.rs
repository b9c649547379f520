use crate::Device;
use crate::{Material, Mesh, Transform};
use cgmath::prelude::*;
use cgmath::Matrix4;
use js_sys::Error;
use zerocopy::{AsBytes, FromBytes};

#[repr(align(16), C)]
#[derive(Debug, Default, AsBytes, FromBytes)]
pub struct InstanceData {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    flags: [f32; 4],
}

/// Inverse transpose of the model matrix, for transforming normals.
fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
    model.invert().map(|m| m.transpose()).unwrap_or(*model)
}

impl InstanceData {
    pub(crate) fn new(object: &Transform, mesh: &Mesh, material: &Material) -> Self {
        let model = object.matrix() * mesh.transform.matrix();
        let [r, g, b] = material.color();

        Self {
            model: model.into(),
            normal_matrix: normal_matrix(&model).into(),
            color: [r, g, b, material.shininess()],
            flags: [
                material.flat_shading() as u32 as f32,
                mesh.receive_shadow as u32 as f32,
                0.0,
                0.0,
            ],
        }
    }
}

impl Device {
    pub(crate) fn update_instances(
        &mut self,
        transform: &Transform,
        meshes: &[Mesh],
        materials: &[Material],
    ) -> Result<(), Error> {
        for (buffers, mesh) in self.meshes.iter_mut().zip(meshes) {
            let material = materials
                .get(mesh.material)
                .ok_or_else(|| Error::new("mesh refers to a missing material"))?;

            buffers.cast_shadow = mesh.cast_shadow;
            buffers
                .instance
                .write(&InstanceData::new(transform, mesh, material))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color_from_hex, BufferGeometry};
    use std::mem::size_of;

    fn material() -> Material {
        Material::Phong {
            color: color_from_hex(0xf5f5f5),
            shininess: 30.0,
            flat_shading: false,
        }
    }

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(size_of::<InstanceData>(), 160);
    }

    #[test]
    fn packs_material_and_shadow_flags() {
        let mut mesh = Mesh::new("tail", BufferGeometry::cone(0.15, 0.3, 3, 1), 0);
        mesh.receive_shadow = true;

        let data = InstanceData::new(&Transform::default(), &mesh, &material());

        assert_eq!(data.color[3], 30.0);
        assert_eq!(data.flags, [0.0, 1.0, 0.0, 0.0]);
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        assert_eq!(data.model, identity);
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let transform = Transform {
            scale: [2.0, 1.0, 1.0],
            ..Transform::default()
        };

        let mesh = Mesh::new("body", BufferGeometry::cone(0.15, 0.3, 3, 1), 0);
        let data = InstanceData::new(&transform, &mesh, &material());

        assert_eq!(data.model[0][0], 2.0);
        assert_eq!(data.normal_matrix[0][0], 0.5);
        assert_eq!(data.normal_matrix[1][1], 1.0);
    }
}
