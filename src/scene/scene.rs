use crate::{Dirty, Lights, Object, PerspectiveCamera, Raster, Spin, SurfaceOptions};
use serde::Serialize;

/// # Dirty Flags
///
/// The scene keeps dirty flags relative to one device's internal state, so a
/// scene instance should only ever be drawn by a single device.
#[derive(Debug, Default, Serialize)]
pub struct Scene {
    pub camera: Dirty<PerspectiveCamera>,
    pub raster: Dirty<Raster>,
    pub lights: Dirty<Lights>,
    pub object: Object,
}

impl Scene {
    /// Creates the scene for a surface of the given pixel size.
    ///
    /// The camera sits at its default eye position looking at the origin,
    /// with its aspect ratio matched to the surface.
    pub fn new(width: u32, height: u32, options: &SurfaceOptions, object: Object) -> Self {
        let mut camera = PerspectiveCamera::default();
        camera.look_at([0.0; 3]);
        camera.set_viewport(width, height);

        Self {
            camera: Dirty::new(camera),
            raster: Dirty::new(Raster::new(width, height, options)),
            lights: Dirty::new(Lights::default()),
            object,
        }
    }

    /// Matches the camera and raster to a new surface size.
    ///
    /// Nothing is dirtied if the size did not actually change.
    pub fn resize(&mut self, width: u32, height: u32) {
        Dirty::modify(&mut self.raster, |raster| {
            raster.width = width;
            raster.height = height;
        });

        Dirty::modify(&mut self.camera, |camera| camera.set_viewport(width, height));
    }

    /// Runs one animation step at wall-clock time `now_ms`.
    pub fn advance(&mut self, spin: &Spin, now_ms: f64) {
        spin.apply(&mut self.object.transform, now_ms);
    }

    /// Marks the entire contents of this scene as dirty.
    ///
    /// This forces a complete device update and is only needed after the
    /// device lost its state.
    pub fn dirty_all_fields(&mut self) {
        Dirty::dirty(&mut self.camera);
        Dirty::dirty(&mut self.raster);
        Dirty::dirty(&mut self.lights);
        Dirty::dirty(&mut self.object.transform);
        Dirty::dirty(&mut self.object.meshes);
        Dirty::dirty(&mut self.object.materials);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::Error;

    fn clean<T>(value: &mut Dirty<T>) {
        Dirty::clean(value, |_| Ok::<(), Error>(())).unwrap();
    }

    fn scene(width: u32, height: u32) -> Scene {
        Scene::new(width, height, &SurfaceOptions::default(), Object::new())
    }

    #[test]
    fn aspect_matches_initial_size() {
        let scene = scene(800, 600);

        assert!((scene.camera.aspect - 1.333_333).abs() < 1e-5);
        assert_eq!((scene.raster.width, scene.raster.height), (800, 600));
    }

    #[test]
    fn camera_looks_at_origin() {
        let scene = scene(800, 600);

        assert_eq!(scene.camera.target, [0.0; 3]);
        assert_eq!(scene.camera.position, [4.0, 3.0, 5.0]);
        assert_eq!(scene.camera.field_of_view, 45.0);
        assert_eq!((scene.camera.near, scene.camera.far), (0.1, 1000.0));
    }

    #[test]
    fn resize_forgets_previous_size() {
        let mut a = scene(800, 600);
        let mut b = scene(10, 1000);

        a.resize(1024, 256);
        b.resize(1024, 256);

        assert_eq!(a.camera.aspect, 4.0);
        assert_eq!(a.camera.aspect, b.camera.aspect);
        assert_eq!(*a.raster, *b.raster);
    }

    #[test]
    fn resize_to_same_size_keeps_clean() {
        let mut scene = scene(800, 600);
        clean(&mut scene.camera);
        clean(&mut scene.raster);

        scene.resize(800, 600);

        assert!(!Dirty::is_dirty(&scene.camera));
        assert!(!Dirty::is_dirty(&scene.raster));

        scene.resize(801, 600);

        assert!(Dirty::is_dirty(&scene.camera));
        assert!(Dirty::is_dirty(&scene.raster));
    }

    #[test]
    fn advancing_touches_only_the_transform() {
        let mut scene = scene(800, 600);
        clean(&mut scene.object.meshes);
        clean(&mut scene.object.materials);
        clean(&mut scene.object.transform);

        scene.advance(&Spin::default(), 0.0);

        assert!(Dirty::is_dirty(&scene.object.transform));
        assert!(!Dirty::is_dirty(&scene.object.meshes));
        assert!(!Dirty::is_dirty(&scene.object.materials));
    }

    #[test]
    fn two_hundred_frames_turn_one_radian() {
        let mut scene = scene(800, 600);
        let spin = Spin::default();

        for frame in 0..200 {
            scene.advance(&spin, 1000.0 + f64::from(frame) * 16.7);
        }

        assert!((scene.object.transform.rotation[1] - 1.0).abs() < 1e-4);
    }
}
