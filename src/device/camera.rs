use crate::Device;
use crate::PerspectiveCamera;
use js_sys::Error;
use zerocopy::{AsBytes, FromBytes};

#[repr(align(16), C)]
#[derive(Debug, Default, AsBytes, FromBytes)]
pub struct CameraData {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraData {
    pub(crate) fn new(camera: &PerspectiveCamera) -> Self {
        let [x, y, z] = camera.position;

        Self {
            view: camera.view_matrix().into(),
            projection: camera.projection_matrix().into(),
            position: [x, y, z, 1.0],
        }
    }
}

impl Device {
    pub(crate) fn update_camera(&mut self, camera: &PerspectiveCamera) -> Result<(), Error> {
        self.camera_buffer.write(&CameraData::new(camera))
    }
}
