use crate::Device;
use crate::{
    BufferGeometry, InstanceData, Mesh, UniformBuffer, VertexArray, VertexAttribute,
    VertexAttributeKind, VertexLayout,
};
use js_sys::Error;
use zerocopy::{AsBytes, FromBytes};

#[repr(C)]
#[derive(AsBytes, FromBytes, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl VertexLayout for Vertex {
    fn vertex_layout() -> Vec<VertexAttribute> {
        vec![
            VertexAttribute::new(0, 0, VertexAttributeKind::Float3),
            VertexAttribute::new(1, 12, VertexAttributeKind::Float3),
        ]
    }
}

/// Interleaves the positions and normals of a geometry.
pub(crate) fn interleave(geometry: &BufferGeometry) -> Vec<Vertex> {
    geometry
        .positions()
        .iter()
        .zip(geometry.normals())
        .map(|(&position, &normal)| Vertex { position, normal })
        .collect()
}

/// GPU-side resources of one mesh.
#[derive(Debug)]
pub struct MeshBuffers {
    pub(crate) vertices: VertexArray<Vertex>,
    pub(crate) instance: UniformBuffer<InstanceData>,
    pub(crate) cast_shadow: bool,
}

impl Device {
    pub(crate) fn update_geometry(&mut self, meshes: &[Mesh]) -> Result<(), Error> {
        self.meshes.clear();

        for mesh in meshes {
            let mut vertices = VertexArray::new(self.gl.clone());

            vertices.upload(&interleave(&mesh.geometry), mesh.geometry.indices());

            self.meshes.push(MeshBuffers {
                vertices,
                instance: UniformBuffer::new(self.gl.clone()),
                cast_shadow: mesh.cast_shadow,
            });
        }

        Ok(())
    }
}
