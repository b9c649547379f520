use crate::Device;
use crate::{DirectionalLight, Lights, Raster};
use js_sys::Error;
use zerocopy::{AsBytes, FromBytes};

#[repr(align(16), C)]
#[derive(Debug, Default, AsBytes, FromBytes)]
pub struct LightingData {
    ambient: [f32; 4],
    key_direction: [f32; 4],
    key_color: [f32; 4],
    fill_direction: [f32; 4],
    fill_color: [f32; 4],
    shadow_matrix: [[f32; 4]; 4],
    shadow_params: [f32; 4],
}

fn radiance(color: [f32; 3], intensity: f32) -> [f32; 4] {
    [
        color[0] * intensity,
        color[1] * intensity,
        color[2] * intensity,
        1.0,
    ]
}

fn direction(light: &DirectionalLight) -> [f32; 4] {
    let direction = light.direction();

    [direction.x, direction.y, direction.z, light.cast_shadow as u32 as f32]
}

impl LightingData {
    pub(crate) fn new(lights: &Lights, shadows: bool) -> Self {
        let key = &lights.key;

        Self {
            ambient: radiance(lights.ambient.color, lights.ambient.intensity),
            key_direction: direction(key),
            key_color: radiance(key.color, key.intensity),
            fill_direction: direction(&lights.fill),
            fill_color: radiance(lights.fill.color, lights.fill.intensity),
            shadow_matrix: key.shadow_matrix().into(),
            shadow_params: [
                key.shadow.bias,
                1.0 / key.shadow.map_size.max(1) as f32,
                0.0,
                shadows as u32 as f32,
            ],
        }
    }
}

impl Device {
    pub(crate) fn update_lighting(&mut self, lights: &Lights, raster: &Raster) -> Result<(), Error> {
        let shadows = raster.shadows && lights.key.cast_shadow;

        // the shadow sampler must always be complete, even with shadows off
        let map_size = if shadows {
            lights.key.shadow.map_size.max(1) as usize
        } else {
            1
        };

        if self.shadow_map.is_invalid() || self.shadow_map.cols() != map_size {
            self.shadow_map.create(map_size, map_size);
            self.shadow_fbo.rebuild_depth_only(&self.shadow_map)?;
        }

        self.state.shadows = shadows;

        self.lighting_buffer.write(&LightingData::new(lights, shadows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(size_of::<LightingData>(), 160);
    }

    #[test]
    fn default_rig_packs_intensities() {
        let data = LightingData::new(&Lights::default(), true);

        assert_eq!(data.ambient, [0.6, 0.6, 0.6, 1.0]);
        assert_eq!(data.key_color, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(data.fill_color, [0.3, 0.3, 0.3, 1.0]);

        // only the key light casts shadows
        assert_eq!(data.key_direction[3], 1.0);
        assert_eq!(data.fill_direction[3], 0.0);

        assert_eq!(data.shadow_params[1], 1.0 / 1024.0);
        assert_eq!(data.shadow_params[3], 1.0);
    }

    #[test]
    fn directions_point_towards_the_lights() {
        let data = LightingData::new(&Lights::default(), false);

        let k = 1.0 / 3f32.sqrt();
        assert!((data.key_direction[0] - k).abs() < 1e-6);
        assert!((data.key_direction[1] - k).abs() < 1e-6);
        assert!((data.key_direction[2] - k).abs() < 1e-6);

        assert!(data.fill_direction[0] < 0.0);
        assert!(data.fill_direction[1] > 0.0);
        assert!(data.fill_direction[2] < 0.0);

        assert_eq!(data.shadow_params[3], 0.0);
    }
}
