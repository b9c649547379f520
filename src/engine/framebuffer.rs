#[allow(unused_imports)]
use log::{debug, info, warn};

use crate::{Depth, RenderTarget};
use js_sys::{Array, Error};
use web_sys::{WebGl2RenderingContext as Context, WebGlFramebuffer, WebGlTexture};

pub trait AsAttachment {
    type Target: RenderTarget;

    fn as_attachment(&self) -> Option<&WebGlTexture>;

    fn attachment_dimensions(&self) -> (usize, usize);
}

#[derive(Debug)]
pub struct Framebuffer {
    gl: Context,
    handle: Option<WebGlFramebuffer>,
    cols: usize,
    rows: usize,
}

impl Framebuffer {
    pub fn new(gl: Context) -> Self {
        Self {
            gl,
            handle: None,
            cols: 0,
            rows: 0,
        }
    }

    pub fn handle(&self) -> Option<&WebGlFramebuffer> {
        self.handle.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.handle = None;
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Rebuilds this framebuffer as a depth-only render target.
    pub fn rebuild_depth_only(
        &mut self,
        depth: &dyn AsAttachment<Target = Depth>,
    ) -> Result<(), Error> {
        let (cols, rows) = depth.attachment_dimensions();

        if let Some(framebuffer_handle) = &self.handle {
            self.gl.delete_framebuffer(Some(framebuffer_handle));
        }

        self.handle = self.gl.create_framebuffer();

        self.gl
            .bind_framebuffer(Context::DRAW_FRAMEBUFFER, self.handle.as_ref());

        self.gl.framebuffer_texture_2d(
            Context::DRAW_FRAMEBUFFER,
            Context::DEPTH_ATTACHMENT,
            Context::TEXTURE_2D,
            depth.as_attachment(),
            0,
        );

        let buffers = Array::new();
        buffers.push(&Context::NONE.into());
        self.gl.draw_buffers(&buffers);

        let status = self.gl.check_framebuffer_status(Context::DRAW_FRAMEBUFFER);

        self.gl.bind_framebuffer(Context::DRAW_FRAMEBUFFER, None);

        if status != Context::FRAMEBUFFER_COMPLETE && !self.gl.is_context_lost() {
            return Err(Error::new("depth framebuffer is incomplete"));
        }

        self.cols = cols;
        self.rows = rows;

        Ok(())
    }

    pub fn clear_depth(&self, depth: f32) {
        self.gl
            .bind_framebuffer(Context::DRAW_FRAMEBUFFER, self.handle.as_ref());

        self.gl
            .clear_bufferfv_with_f32_array(Context::DEPTH, 0, &[depth]);
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        if let Some(framebuffer_handle) = &self.handle {
            self.gl.delete_framebuffer(Some(framebuffer_handle));
        }
    }
}
