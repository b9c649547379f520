#[allow(unused_imports)]
use log::{debug, info, warn};

use js_sys::Error;
use web_sys::WebGl2RenderingContext as Context;

use crate::shaders;
use crate::{
    CameraData, CullFace, Dirty, Framebuffer, LightingData, MeshBuffers, Scene, Shader, Texture,
    UniformBuffer, D24,
};

/// Render state derived from the scene during the last update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct RenderState {
    pub viewport: (i32, i32),
    pub shadows: bool,
}

#[derive(Debug)]
pub struct Device {
    pub(crate) gl: Context,

    pub(crate) mesh_shader: Shader,
    pub(crate) shadow_shader: Shader,

    pub(crate) camera_buffer: UniformBuffer<CameraData>,
    pub(crate) lighting_buffer: UniformBuffer<LightingData>,

    pub(crate) meshes: Vec<MeshBuffers>,

    pub(crate) shadow_map: Texture<D24>,
    pub(crate) shadow_fbo: Framebuffer,

    device_lost: bool,

    pub(crate) state: RenderState,
}

impl Device {
    /// Creates a new device using a WebGL2 context.
    pub fn new(gl: &Context) -> Result<Self, Error> {
        Ok(Self {
            gl: gl.clone(),
            mesh_shader: Shader::new(gl.clone(), &shaders::MESH_VERT, &shaders::MESH_FRAG),
            shadow_shader: Shader::new(gl.clone(), &shaders::SHADOW_VERT, &shaders::SHADOW_FRAG),
            camera_buffer: UniformBuffer::new(gl.clone()),
            lighting_buffer: UniformBuffer::new(gl.clone()),
            meshes: vec![],
            shadow_map: Texture::new(gl.clone()),
            shadow_fbo: Framebuffer::new(gl.clone()),
            device_lost: true,
            state: RenderState::default(),
        })
    }

    /// Signals the context was lost.
    pub fn context_lost(&mut self) {
        self.device_lost = true;
    }

    /// Updates this device to render a given scene or returns an error.
    ///
    /// Returns whether anything visible changed since the last update.
    pub fn update(&mut self, scene: &mut Scene) -> Result<bool, Error> {
        if self.device_lost && !self.try_restore(scene)? {
            return Ok(false); // context currently lost
        }

        let mut invalidated = false;

        invalidated |= Dirty::clean(&mut scene.camera, |camera| {
            self.update_camera(camera)?;

            Ok(())
        })?;

        let lights = &mut scene.lights;

        invalidated |= Dirty::clean(&mut scene.raster, |raster| {
            self.update_raster(raster)?;

            Dirty::dirty(lights);

            Ok(())
        })?;

        let raster = &scene.raster;

        invalidated |= Dirty::clean(&mut scene.lights, |lights| {
            self.update_lighting(lights, raster)?;

            Ok(())
        })?;

        let object = &mut scene.object;
        let transform = &mut object.transform;

        invalidated |= Dirty::clean(&mut object.meshes, |meshes| {
            self.update_geometry(meshes)?;

            Dirty::dirty(transform);

            Ok(())
        })?;

        invalidated |= Dirty::clean(&mut object.materials, |_| {
            Dirty::dirty(transform);

            Ok(())
        })?;

        let meshes = &object.meshes;
        let materials = &object.materials;

        invalidated |= Dirty::clean(&mut object.transform, |transform| {
            self.update_instances(transform, meshes, materials)?;

            Ok(())
        })?;

        self.mesh_shader.rebuild()?;
        self.shadow_shader.rebuild()?;

        Ok(invalidated)
    }

    /// Renders the scene into the context's canvas.
    pub fn render(&mut self) -> Result<(), Error> {
        if self.device_lost {
            return Ok(());
        }

        let (width, height) = self.state.viewport;

        if width == 0 || height == 0 {
            return Ok(()); // nothing visible
        }

        if self.state.shadows {
            self.render_shadow_map();
        }

        let command = self.mesh_shader.begin_draw();

        command.set_canvas_framebuffer();
        command.set_viewport(0, 0, width, height);
        command.enable_depth_test();
        command.set_cull_face(CullFace::Back);
        command.clear(0.0, 0.0, 0.0, 0.0);

        command.bind(&self.camera_buffer, "Camera");
        command.bind(&self.lighting_buffer, "Lighting");
        command.bind(&self.shadow_map, "shadow_map");

        for mesh in &self.meshes {
            command.bind(&mesh.instance, "Instance");
            command.draw_indexed(&mesh.vertices);
        }

        command.unset_vertex_array();

        Ok(())
    }

    fn render_shadow_map(&self) {
        self.shadow_fbo.clear_depth(1.0);

        let command = self.shadow_shader.begin_draw();

        command.set_framebuffer(&self.shadow_fbo);
        command.set_viewport(
            0,
            0,
            self.shadow_fbo.cols() as i32,
            self.shadow_fbo.rows() as i32,
        );
        command.enable_depth_test();
        command.set_cull_face(CullFace::Front);

        command.bind(&self.camera_buffer, "Camera");
        command.bind(&self.lighting_buffer, "Lighting");

        for mesh in self.meshes.iter().filter(|mesh| mesh.cast_shadow) {
            command.bind(&mesh.instance, "Instance");
            command.draw_indexed(&mesh.vertices);
        }

        command.unset_vertex_array();
    }

    fn try_restore(&mut self, scene: &mut Scene) -> Result<bool, Error> {
        if self.gl.is_context_lost() {
            return Ok(false);
        }

        self.mesh_shader.invalidate();
        self.shadow_shader.invalidate();
        self.camera_buffer.invalidate();
        self.lighting_buffer.invalidate();
        self.shadow_map.invalidate();
        self.shadow_fbo.invalidate();

        self.meshes.clear();

        scene.dirty_all_fields();
        self.device_lost = false;

        info!("graphics context acquired");

        Ok(true)
    }
}
