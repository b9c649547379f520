#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::{shaders::ShaderInfo, Framebuffer};
use js_sys::Error;
use regex::Regex;
use std::collections::HashMap;
use web_sys::{
    WebGl2RenderingContext as Context, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlVertexArrayObject,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingPoint {
    TextureUnit(u32),
    UniformBlock(u32),
}

#[derive(Debug)]
pub struct Shader {
    gl: Context,
    invalidated: bool,
    handle: Option<WebGlProgram>,
    vertex: &'static ShaderInfo,
    fragment: &'static ShaderInfo,

    binds: HashMap<&'static str, BindingPoint>,
    defines: HashMap<&'static str, String>,
}

fn merge_sort_dedup(lhs: &[&'static str], rhs: &[&'static str]) -> Vec<&'static str> {
    let mut vec = Vec::with_capacity(lhs.len() + rhs.len());

    vec.extend_from_slice(lhs);
    vec.extend_from_slice(rhs);
    vec.sort_unstable();
    vec.dedup();
    vec
}

/// Assigns binding points to every uniform block and sampler of a program.
fn assign_binding_points(
    vertex: &'static ShaderInfo,
    fragment: &'static ShaderInfo,
) -> HashMap<&'static str, BindingPoint> {
    let mut binds = HashMap::new();

    let uniform_blocks = merge_sort_dedup(vertex.uniform_blocks, fragment.uniform_blocks);
    let texture_units = merge_sort_dedup(vertex.texture_units, fragment.texture_units);

    for (index, &key) in uniform_blocks.iter().enumerate() {
        binds.insert(key, BindingPoint::UniformBlock(index as u32));
    }

    for (index, &key) in texture_units.iter().enumerate() {
        binds.insert(key, BindingPoint::TextureUnit(index as u32));
    }

    binds
}

impl Shader {
    pub fn new(gl: Context, vertex: &'static ShaderInfo, fragment: &'static ShaderInfo) -> Self {
        let mut defines = HashMap::new();

        for key in merge_sort_dedup(vertex.defines, fragment.defines) {
            defines.insert(key, String::from("0"));
        }

        Self {
            gl,
            handle: None,
            vertex,
            fragment,
            binds: assign_binding_points(vertex, fragment),
            defines,
            invalidated: true,
        }
    }

    pub fn set_define(&mut self, define: &'static str, value: impl ToString) {
        assert!(self.defines.contains_key(define));

        let value = value.to_string();

        if self.defines.get(define) != Some(&value) {
            self.defines.insert(define, value);
            self.invalidated = true;
        }
    }

    pub fn begin_draw(&self) -> DrawCommand {
        DrawCommand::new(self)
    }

    pub fn invalidate(&mut self) {
        self.invalidated = true;
        self.handle = None;
    }

    /// Rebuilds the shader with the current source.
    pub fn rebuild(&mut self) -> Result<(), Error> {
        if !self.invalidated {
            return Ok(());
        }

        if let Some(handle) = &self.handle {
            self.gl.delete_program(Some(handle));
        }

        self.invalidated = false;

        let vert = self.compile_shader(Context::VERTEX_SHADER, self.vertex)?;
        let frag = self.compile_shader(Context::FRAGMENT_SHADER, self.fragment)?;

        if let (Some(vert), Some(frag)) = (&vert, &frag) {
            self.handle = self.link_program(vert, frag)?;
            self.configure_binds();
        } else {
            self.handle = None;
        }

        Ok(())
    }

    fn configure_binds(&self) {
        if let Some(program) = &self.handle {
            self.gl.use_program(Some(program));

            for (&name, &binding_point) in &self.binds {
                match binding_point {
                    BindingPoint::TextureUnit(slot) => {
                        let location = self.gl.get_uniform_location(program, name);

                        if let Some(location) = location {
                            self.gl.uniform1i(Some(&location), slot as i32);
                        } else {
                            warn!("no such shader binding point: {}", name);
                        }
                    }
                    BindingPoint::UniformBlock(slot) => {
                        let index = self.gl.get_uniform_block_index(program, name);

                        if index != Context::INVALID_INDEX {
                            self.gl.uniform_block_binding(program, index, slot);
                        } else {
                            warn!("no such shader binding point: {}", name);
                        }
                    }
                }
            }
        }
    }

    fn compile_shader(
        &self,
        kind: u32,
        info: &'static ShaderInfo,
    ) -> Result<Option<WebGlShader>, Error> {
        let shader = self.gl.create_shader(kind);

        if let Some(shader) = &shader {
            let glsl_source = generate_source(info.code, &self.defines);

            self.gl.shader_source(shader, &glsl_source);
            self.gl.compile_shader(shader);

            if let Some(error) = self.get_shader_build_error(shader) {
                error!("{}: {}", info.name, annotate_errors(&glsl_source, &error));
                return Err(Error::new("failed to compile shader source"));
            }
        }

        Ok(shader)
    }

    fn link_program(
        &self,
        vert: &WebGlShader,
        frag: &WebGlShader,
    ) -> Result<Option<WebGlProgram>, Error> {
        let program = self.gl.create_program();

        if let Some(program) = &program {
            self.gl.attach_shader(program, vert);
            self.gl.attach_shader(program, frag);

            self.gl.link_program(program);

            self.gl.delete_shader(Some(vert));
            self.gl.delete_shader(Some(frag));

            if let Some(error) = self.get_program_link_error(program) {
                error!("{}", error);
                return Err(Error::new("failed to link shader program"));
            }
        }

        Ok(program)
    }

    fn get_shader_build_error(&self, shader: &WebGlShader) -> Option<String> {
        if self.gl.is_context_lost() {
            return None;
        }

        let status = self
            .gl
            .get_shader_parameter(shader, Context::COMPILE_STATUS);

        if status.as_bool().unwrap_or(false) {
            return None;
        }

        if let Some(error) = self.gl.get_shader_info_log(shader) {
            Some(error)
        } else {
            Some(String::from("unknown shader building error"))
        }
    }

    fn get_program_link_error(&self, program: &WebGlProgram) -> Option<String> {
        if self.gl.is_context_lost() {
            return None;
        }

        let status = self.gl.get_program_parameter(program, Context::LINK_STATUS);

        if status.as_bool().unwrap_or(false) {
            return None;
        }

        if let Some(error) = self.gl.get_program_info_log(program) {
            Some(error)
        } else {
            Some(String::from("unknown program linking error"))
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            self.gl.delete_program(Some(handle));
        }
    }
}

/// Prepends the version and precision prelude along with the defines.
fn generate_source(glsl_source: &str, defines: &HashMap<&'static str, String>) -> String {
    let mut source = String::from(
        "#version 300 es\nprecision highp float;\nprecision highp sampler2DShadow;\n",
    );
    source.reserve(glsl_source.len());

    let mut names: Vec<_> = defines.keys().collect();
    names.sort_unstable();

    for name in names {
        source += "#define ";
        source += name;
        source += " (";
        source += &defines[name];
        source += ")\n";
    }

    source += glsl_source;
    source
}

/// Rewrites `0:line:` references in a compiler log into `file:line:` form.
fn annotate_errors(source: &str, log: &str) -> String {
    let pattern = Regex::new(r#"0:([0-9]+):"#).unwrap();

    pattern
        .replace_all(log, |caps: &regex::Captures| {
            match caps[1].parse::<u32>() {
                Ok(line) => {
                    let (file, line) = determine_real_position(source, line);
                    format!("{}:{}:", file, line)
                }
                Err(_) => caps[0].to_owned(),
            }
        })
        .into_owned()
}

/// Finds the position of a GLSL source line through file/line markers.
fn determine_real_position(source: &str, line: u32) -> (String, u32) {
    let pattern = Regex::new(r#"^// __POS__ ([^:]+):([0-9]+)$"#).unwrap();

    let lines: Vec<&str> = source.lines().collect();
    let line = line.min(lines.len() as u32);

    for index in (0..line).rev() {
        if let Some(captures) = pattern.captures(lines[index as usize]) {
            if let Ok(start) = captures[2].parse::<u32>() {
                return (captures[1].to_owned(), start + line - index - 2);
            }
        }
    }

    (String::from("<unknown>"), 0)
}

#[derive(Debug)]
pub struct DrawCommand<'a> {
    shader: &'a Shader,
}

#[derive(Debug)]
pub enum BindTarget<'a> {
    UniformBuffer(Option<&'a WebGlBuffer>),
    Texture(Option<&'a WebGlTexture>),
}

pub trait AsBindTarget {
    fn bind_target(&self) -> BindTarget;
}

pub trait AsVertexArray {
    fn vertex_array(&self) -> Option<&WebGlVertexArrayObject>;
    fn index_count(&self) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullFace {
    Front,
    Back,
}

impl<'a> DrawCommand<'a> {
    fn new(shader: &'a Shader) -> Self {
        shader.gl.use_program(shader.handle.as_ref());

        shader.gl.disable(Context::BLEND);
        shader.gl.disable(Context::CULL_FACE);
        shader.gl.disable(Context::DEPTH_TEST);
        shader.gl.disable(Context::SCISSOR_TEST);
        shader.gl.disable(Context::STENCIL_TEST);
        shader.gl.viewport(0, 0, 0, 0);

        Self { shader }
    }

    pub fn bind(&self, target: &dyn AsBindTarget, slot: &str) {
        match target.bind_target() {
            BindTarget::UniformBuffer(handle) => self.bind_uniform_buffer(handle, slot),
            BindTarget::Texture(handle) => self.bind_texture(handle, slot),
        }
    }

    pub fn set_viewport(&self, x: i32, y: i32, w: i32, h: i32) {
        self.shader.gl.viewport(x, y, w, h);
    }

    pub fn enable_depth_test(&self) {
        self.shader.gl.enable(Context::DEPTH_TEST);
        self.shader.gl.depth_func(Context::LEQUAL);
        self.shader.gl.depth_mask(true);
    }

    pub fn set_cull_face(&self, face: CullFace) {
        self.shader.gl.enable(Context::CULL_FACE);
        self.shader.gl.front_face(Context::CCW);

        match face {
            CullFace::Front => self.shader.gl.cull_face(Context::FRONT),
            CullFace::Back => self.shader.gl.cull_face(Context::BACK),
        }
    }

    pub fn set_vertex_array(&self, target: &dyn AsVertexArray) {
        self.shader.gl.bind_vertex_array(target.vertex_array());
    }

    pub fn unset_vertex_array(&self) {
        self.shader.gl.bind_vertex_array(None);
    }

    pub fn set_framebuffer(&self, target: &Framebuffer) {
        self.shader
            .gl
            .bind_framebuffer(Context::DRAW_FRAMEBUFFER, target.handle());
    }

    pub fn set_canvas_framebuffer(&self) {
        self.shader
            .gl
            .bind_framebuffer(Context::DRAW_FRAMEBUFFER, None);
    }

    /// Clears the bound framebuffer to a color, resetting its depth.
    pub fn clear(&self, r: f32, g: f32, b: f32, a: f32) {
        self.shader.gl.clear_color(r, g, b, a);
        self.shader.gl.clear_depth(1.0);
        self.shader
            .gl
            .clear(Context::COLOR_BUFFER_BIT | Context::DEPTH_BUFFER_BIT);
    }

    pub fn draw_indexed(&self, target: &dyn AsVertexArray) {
        self.set_vertex_array(target);

        self.shader.gl.draw_elements_with_i32(
            Context::TRIANGLES,
            target.index_count() as i32,
            Context::UNSIGNED_SHORT,
            0,
        );
    }

    fn bind_uniform_buffer(&self, handle: Option<&WebGlBuffer>, slot: &str) {
        if let Some(&BindingPoint::UniformBlock(slot)) = self.shader.binds.get(slot) {
            self.shader
                .gl
                .bind_buffer_base(Context::UNIFORM_BUFFER, slot, handle);
        } else {
            panic!("slot '{}' does not map to a binding point", slot);
        }
    }

    fn bind_texture(&self, handle: Option<&WebGlTexture>, slot: &str) {
        if let Some(&BindingPoint::TextureUnit(slot)) = self.shader.binds.get(slot) {
            self.shader.gl.active_texture(Context::TEXTURE0 + slot);
            self.shader.gl.bind_texture(Context::TEXTURE_2D, handle);
        } else {
            panic!("slot '{}' does not map to a binding point", slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static VERT: ShaderInfo = ShaderInfo {
        name: "test.vert",
        code: "// __POS__ test.vert:1\nvoid main() {}\n",
        defines: &[],
        uniform_blocks: &["Camera", "Instance"],
        texture_units: &[],
    };

    static FRAG: ShaderInfo = ShaderInfo {
        name: "test.frag",
        code: "// __POS__ test.frag:1\nvoid main() {}\n",
        defines: &["KERNEL"],
        uniform_blocks: &["Instance", "Lighting"],
        texture_units: &["shadow_map"],
    };

    #[test]
    fn binding_points_are_shared_between_stages() {
        let binds = assign_binding_points(&VERT, &FRAG);

        assert_eq!(binds.len(), 4);
        assert_eq!(binds["Camera"], BindingPoint::UniformBlock(0));
        assert_eq!(binds["Instance"], BindingPoint::UniformBlock(1));
        assert_eq!(binds["Lighting"], BindingPoint::UniformBlock(2));
        assert_eq!(binds["shadow_map"], BindingPoint::TextureUnit(0));
    }

    #[test]
    fn source_starts_with_version_directive() {
        let mut defines = HashMap::new();
        defines.insert("KERNEL", String::from("2"));

        let source = generate_source(FRAG.code, &defines);

        assert!(source.starts_with("#version 300 es\n"));
        assert!(source.contains("#define KERNEL (2)\n"));
        assert!(source.ends_with("void main() {}\n"));
    }

    #[test]
    fn compiler_errors_map_back_to_files() {
        let source = "#version 300 es\n// __POS__ a.glsl:1\nfoo\n// __POS__ b.frag:4\nbar\nbaz\n";

        assert_eq!(determine_real_position(source, 3), ("a.glsl".to_owned(), 1));
        assert_eq!(determine_real_position(source, 6), ("b.frag".to_owned(), 5));
        assert_eq!(determine_real_position(source, 1), ("<unknown>".to_owned(), 0));

        let log = annotate_errors(source, "ERROR: 0:5: 'bar' : undeclared identifier");
        assert_eq!(log, "ERROR: b.frag:4: 'bar' : undeclared identifier");
    }
}
