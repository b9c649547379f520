use cgmath::prelude::*;
use cgmath::Vector3;
use itertools::iproduct;
use serde::Serialize;
use thiserror::Error;

/// Reasons a vertex/index buffer pair cannot form a triangle mesh.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("vertex buffer length {0} is not a multiple of 3")]
    RaggedVertices(usize),
    #[error("index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
    #[error("too many vertices for 16-bit indices: {0}")]
    TooManyVertices(usize),
    #[error("{normals} normals supplied for {positions} positions")]
    NormalCountMismatch { normals: usize, positions: usize },
}

impl From<GeometryError> for js_sys::Error {
    fn from(error: GeometryError) -> Self {
        js_sys::Error::new(&error.to_string())
    }
}

/// Indexed triangle geometry with per-vertex normals.
///
/// Triangles are counter-clockwise when seen from their front side. The
/// position, normal and index buffers are guaranteed consistent: there are
/// as many normals as positions and every index names a valid vertex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BufferGeometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u16>,
}

impl BufferGeometry {
    /// Builds a geometry from a flat position buffer and an index buffer,
    /// deriving smooth vertex normals from the triangle winding.
    pub fn indexed(positions: &[f32], indices: &[u16]) -> Result<Self, GeometryError> {
        if positions.len() % 3 != 0 {
            return Err(GeometryError::RaggedVertices(positions.len()));
        }

        let positions: Vec<[f32; 3]> = positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();

        let mut geometry = Self::with_normals(positions.clone(), positions, indices.to_vec())?;
        geometry.compute_vertex_normals();

        Ok(geometry)
    }

    /// Builds a geometry whose normals are supplied by the caller.
    pub fn with_normals(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u16>,
    ) -> Result<Self, GeometryError> {
        if positions.len() > usize::from(u16::MAX) {
            return Err(GeometryError::TooManyVertices(positions.len()));
        }

        if indices.len() % 3 != 0 {
            return Err(GeometryError::RaggedIndices(indices.len()));
        }

        if let Some(&index) = indices
            .iter()
            .find(|&&index| usize::from(index) >= positions.len())
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        if normals.len() != positions.len() {
            return Err(GeometryError::NormalCountMismatch {
                normals: normals.len(),
                positions: positions.len(),
            });
        }

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates over the triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |t| {
            [
                self.positions[t[0] as usize].into(),
                self.positions[t[1] as usize].into(),
                self.positions[t[2] as usize].into(),
            ]
        })
    }

    /// Recomputes vertex normals as the normalized sum of the (area-weighted)
    /// normals of every face touching the vertex.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3::<f32>::new(0.0, 0.0, 0.0); self.positions.len()];

        for (triangle, [a, b, c]) in self.indices.chunks_exact(3).zip(self.triangles()) {
            let face_normal = (b - a).cross(c - a);

            for &index in triangle {
                normals[index as usize] += face_normal;
            }
        }

        self.normals = normals
            .into_iter()
            .map(|normal| -> [f32; 3] {
                if normal.magnitude2() > 0.0 {
                    normal.normalize().into()
                } else {
                    [0.0; 3]
                }
            })
            .collect();
    }

    /// A closed cone standing on the XZ plane and centered on the origin,
    /// apex at `+height / 2`.
    ///
    /// The side is made of `height_segments` rings of `radial_segments`
    /// quads (the seam vertex is duplicated) with analytic normals. The
    /// apex ring degenerates so only one triangle per quad is emitted
    /// there. The base is a separate fan with downward normals.
    pub fn cone(radius: f32, height: f32, radial_segments: u16, height_segments: u16) -> Self {
        assert!(radial_segments >= 3, "cone needs at least 3 radial segments");
        assert!(height_segments >= 1, "cone needs at least 1 height segment");

        let half_height = height / 2.0;
        let slope = radius / height;

        let mut positions: Vec<[f32; 3]> = vec![];
        let mut normals: Vec<[f32; 3]> = vec![];
        let mut indices: Vec<u16> = vec![];

        let ring = radial_segments + 1;

        for (y, x) in iproduct!(0..=height_segments, 0..=radial_segments) {
            let v = f32::from(y) / f32::from(height_segments);
            let theta = f32::from(x) / f32::from(radial_segments) * std::f32::consts::PI * 2.0;
            let (sin, cos) = theta.sin_cos();

            let ring_radius = v * radius;

            positions.push([ring_radius * sin, half_height - v * height, ring_radius * cos]);
            normals.push(Vector3::new(sin, slope, cos).normalize().into());
        }

        for (y, x) in iproduct!(0..height_segments, 0..radial_segments) {
            let a = y * ring + x;
            let b = (y + 1) * ring + x;
            let c = (y + 1) * ring + x + 1;
            let d = y * ring + x + 1;

            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }

            indices.extend_from_slice(&[b, c, d]);
        }

        let center_start = positions.len() as u16;

        for _ in 0..radial_segments {
            positions.push([0.0, -half_height, 0.0]);
            normals.push([0.0, -1.0, 0.0]);
        }

        let rim_start = positions.len() as u16;

        for x in 0..=radial_segments {
            let theta = f32::from(x) / f32::from(radial_segments) * std::f32::consts::PI * 2.0;
            let (sin, cos) = theta.sin_cos();

            positions.push([radius * sin, -half_height, radius * cos]);
            normals.push([0.0, -1.0, 0.0]);
        }

        for x in 0..radial_segments {
            let center = center_start + x;
            let rim = rim_start + x;

            indices.extend_from_slice(&[rim + 1, rim, center]);
        }

        Self {
            positions,
            normals,
            indices,
        }
    }
}

/// Triangle pattern shared by every thin prism: two triangular caps (bottom
/// then top) and three quad sides each split into two triangles.
pub const PRISM_INDICES: [u16; 24] = [
    0, 1, 2, //
    3, 5, 4, //
    0, 3, 4, 0, 4, 1, //
    2, 5, 3, 2, 3, 0, //
    1, 4, 5, 1, 5, 2, //
];

const fn indices_below(indices: &[u16], vertex_count: u16) -> bool {
    let mut i = 0;

    while i < indices.len() {
        if indices[i] >= vertex_count {
            return false;
        }

        i += 1;
    }

    true
}

const _: () = assert!(indices_below(&PRISM_INDICES, 6));
const _: () = assert!(PRISM_INDICES.len() % 3 == 0);

/// A thin triangular prism: vertices 0..3 form the bottom triangle and
/// vertices 3..6 the matching top triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prism {
    pub vertices: [[f32; 3]; 6],
}

impl Prism {
    pub const fn new(vertices: [[f32; 3]; 6]) -> Self {
        Self { vertices }
    }

    /// Mirrors the prism across the YZ plane.
    ///
    /// Reflection flips handedness, so the two bottom corners (1, 2) and the
    /// two top corners (4, 5) are swapped to keep the winding outward. The
    /// result is therefore not the vertex table negated in X: it holds the
    /// same six points in a different order, which is the only place the
    /// plane departs from its literal vertex tables.
    pub fn mirror_x(&self) -> Self {
        let mut vertices = self.vertices;

        for vertex in &mut vertices {
            vertex[0] = -vertex[0];
        }

        vertices.swap(1, 2);
        vertices.swap(4, 5);

        Self { vertices }
    }
}

impl From<Prism> for BufferGeometry {
    fn from(prism: Prism) -> Self {
        let positions = prism.vertices.to_vec();

        let mut geometry = Self {
            normals: positions.clone(),
            positions,
            indices: PRISM_INDICES.to_vec(),
        };

        geometry.compute_vertex_normals();
        geometry
    }
}
