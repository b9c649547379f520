//! The folded paper plane.

use crate::{color_from_hex, BufferGeometry, Material, Mesh, Object, Prism, Transform};
use std::f32::consts::FRAC_PI_2;

const BODY: Prism = Prism::new([
    [0.0, 0.0, 2.0],   // nose
    [-0.3, 0.0, -1.5], // rear left
    [0.3, 0.0, -1.5],  // rear right
    [0.0, 0.05, 2.0],
    [-0.3, 0.05, -1.5],
    [0.3, 0.05, -1.5],
]);

// folded slightly upwards towards the tip
const LEFT_WING: Prism = Prism::new([
    [-0.3, 0.0, 0.0],  // root
    [-2.0, 0.0, -0.5], // tip
    [-0.5, 0.0, -1.5], // trailing edge
    [-0.3, 0.02, 0.0],
    [-2.0, 0.15, -0.5],
    [-0.5, 0.02, -1.5],
]);

const TAIL_RADIUS: f32 = 0.15;
const TAIL_HEIGHT: f32 = 0.3;
const TAIL_SEGMENTS: u16 = 3;

/// Builds a new paper plane, nose towards +Z.
///
/// Every call returns a fresh object with its own geometry; all four parts
/// share a single glossy off-white material and both cast and receive
/// shadows.
pub fn create_paper_plane() -> Object {
    let mut plane = Object::new();

    let paper = plane.add_material(Material::Phong {
        color: color_from_hex(0xf5f5f5),
        shininess: 30.0,
        flat_shading: false,
    });

    plane.add(Mesh::new("body", BODY.into(), paper));
    plane.add(Mesh::new("left-wing", LEFT_WING.into(), paper));
    plane.add(Mesh::new("right-wing", LEFT_WING.mirror_x().into(), paper));

    let tail = BufferGeometry::cone(TAIL_RADIUS, TAIL_HEIGHT, TAIL_SEGMENTS, 1);

    plane.add(Mesh::new("tail", tail, paper).with_transform(Transform {
        position: [0.0, 0.1, -1.5],
        rotation: [FRAC_PI_2, 0.0, 0.0],
        ..Transform::default()
    }));

    plane.set_shadows(true, true);
    plane
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_four_parts() {
        let plane = create_paper_plane();

        let names: Vec<&str> = plane.meshes.iter().map(|m| m.name.as_str()).collect();

        assert_eq!(names, ["body", "left-wing", "right-wing", "tail"]);
    }

    #[test]
    fn planar_parts_are_six_vertex_prisms() {
        let plane = create_paper_plane();

        for name in &["body", "left-wing", "right-wing"] {
            let mesh = plane.mesh(name).unwrap();

            assert_eq!(mesh.geometry.vertex_count(), 6);
            assert_eq!(mesh.geometry.indices().len(), 24);
            assert!(mesh.geometry.indices().iter().all(|&i| i <= 5));
        }
    }

    #[test]
    fn body_and_left_wing_keep_authored_vertices() {
        let plane = create_paper_plane();

        assert_eq!(plane.mesh("body").unwrap().geometry.positions(), &BODY.vertices);
        assert_eq!(
            plane.mesh("left-wing").unwrap().geometry.positions(),
            &LEFT_WING.vertices
        );
    }

    #[test]
    fn wings_are_mirror_images() {
        let plane = create_paper_plane();

        let mut left: Vec<[f32; 3]> = plane.mesh("left-wing").unwrap().geometry.positions().to_vec();
        let mut right: Vec<[f32; 3]> = plane
            .mesh("right-wing")
            .unwrap()
            .geometry
            .positions()
            .iter()
            .map(|&[x, y, z]| [-x, y, z])
            .collect();

        let key = |p: &[f32; 3]| (p[0].to_bits(), p[1].to_bits(), p[2].to_bits());
        left.sort_by_key(key);
        right.sort_by_key(key);

        assert_eq!(left, right);
    }

    #[test]
    fn right_wing_reorders_only_the_mirrored_corners() {
        let plane = create_paper_plane();
        let right = plane.mesh("right-wing").unwrap().geometry.positions();

        let negated: Vec<[f32; 3]> = LEFT_WING
            .vertices
            .iter()
            .map(|&[x, y, z]| [-x, y, z])
            .collect();

        for &(slot, source) in &[(0, 0), (1, 2), (2, 1), (3, 3), (4, 5), (5, 4)] {
            assert_eq!(right[slot], negated[source]);
        }
    }

    #[test]
    fn body_bottom_faces_down() {
        let plane = create_paper_plane();
        let body = &plane.mesh("body").unwrap().geometry;

        // vertex 0 lies on the bottom cap and vertex 3 on the top cap
        assert!(body.normals()[0][1] < 0.0);
        assert!(body.normals()[3][1] > 0.0);
    }

    #[test]
    fn tail_is_a_triangular_cone_behind_the_body() {
        let plane = create_paper_plane();
        let tail = plane.mesh("tail").unwrap();

        assert_eq!(tail.transform.position, [0.0, 0.1, -1.5]);
        assert_eq!(tail.transform.rotation, [FRAC_PI_2, 0.0, 0.0]);
        assert_eq!(tail.geometry, BufferGeometry::cone(0.15, 0.3, 3, 1));
    }

    #[test]
    fn all_parts_share_the_paper_material() {
        let plane = create_paper_plane();

        assert_eq!(plane.materials.len(), 1);
        assert!(plane.meshes.iter().all(|mesh| mesh.material == 0));

        match &plane.materials[0] {
            Material::Phong {
                color,
                shininess,
                flat_shading,
            } => {
                assert_eq!(*color, color_from_hex(0xf5f5f5));
                assert_eq!(*shininess, 30.0);
                assert!(!flat_shading);
            }
        }
    }

    #[test]
    fn every_part_casts_and_receives_shadows() {
        let plane = create_paper_plane();

        assert!(plane
            .meshes
            .iter()
            .all(|mesh| mesh.cast_shadow && mesh.receive_shadow));
    }

    #[test]
    fn group_starts_unrotated() {
        let plane = create_paper_plane();

        assert_eq!(*plane.transform, Transform::default());
    }

    #[test]
    fn each_call_builds_an_equal_but_distinct_object() {
        let mut first = create_paper_plane();
        let second = create_paper_plane();

        assert_eq!(first, second);

        first.transform.rotation[1] = 1.0;

        assert_ne!(first, second);
        assert_eq!(*second.transform, Transform::default());
    }
}
