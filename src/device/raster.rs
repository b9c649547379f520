use crate::Device;
use crate::Raster;
use js_sys::Error;

impl Device {
    pub(crate) fn update_raster(&mut self, raster: &Raster) -> Result<(), Error> {
        self.state.viewport = (raster.width as i32, raster.height as i32);

        self.mesh_shader.set_define(
            "SHADOW_KERNEL_RADIUS",
            raster.shadow_filter.kernel_radius(),
        );

        Ok(())
    }
}
