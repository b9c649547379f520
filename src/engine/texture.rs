#[allow(unused_imports)]
use log::{debug, info, warn};

use crate::{AsAttachment, AsBindTarget, BindTarget};
use std::marker::PhantomData;
use web_sys::{WebGl2RenderingContext as Context, WebGlTexture};

pub trait Boolean {
    const VALUE: bool;
}

pub struct True;

impl Boolean for True {
    const VALUE: bool = true;
}

pub trait RenderTarget {}

pub struct Depth;

impl RenderTarget for Depth {}

#[derive(Debug)]
pub struct Texture<T> {
    gl: Context,

    handle: Option<WebGlTexture>,
    layout: (usize, usize),
    format: PhantomData<T>,
}

impl<T> Texture<T> {
    pub fn new(gl: Context) -> Self {
        Self {
            gl,
            handle: None,
            layout: (0, 0),
            format: PhantomData,
        }
    }

    pub fn cols(&self) -> usize {
        self.layout.0
    }

    pub fn rows(&self) -> usize {
        self.layout.1
    }

    pub fn invalidate(&mut self) {
        self.layout = (0, 0);
        self.handle = None;
    }

    pub fn is_invalid(&self) -> bool {
        self.handle.is_none()
    }

    fn create_texture(&mut self, cols: usize, rows: usize) -> bool {
        assert!(cols > 0 && rows > 0, "invalid texture layout requested");

        if self.layout != (cols, rows) || self.handle.is_none() {
            if let Some(texture_handle) = &self.handle {
                self.gl.delete_texture(Some(texture_handle));
            }

            self.handle = self.gl.create_texture();
            self.layout = (cols, rows);

            false
        } else {
            true
        }
    }
}

impl<T: TextureFormat> Texture<T> {
    /// Allocates immutable storage, doing nothing if the layout is unchanged.
    pub fn create(&mut self, cols: usize, rows: usize) {
        if self.create_texture(cols, rows) {
            return; // texture already created
        }

        self.gl
            .bind_texture(Context::TEXTURE_2D, self.handle.as_ref());

        self.gl.tex_storage_2d(
            Context::TEXTURE_2D,
            1,
            T::GL_INTERNAL_FORMAT,
            cols as i32,
            rows as i32,
        );

        self.set_texture_parameters(Context::TEXTURE_2D);
    }

    fn set_texture_parameters(&mut self, target: u32) {
        self.gl.tex_parameteri(
            target,
            Context::TEXTURE_MAG_FILTER,
            Context::LINEAR as i32,
        );

        self.gl.tex_parameteri(
            target,
            Context::TEXTURE_MIN_FILTER,
            Context::LINEAR as i32,
        );

        self.gl.tex_parameteri(
            target,
            Context::TEXTURE_WRAP_S,
            Context::CLAMP_TO_EDGE as i32,
        );

        self.gl.tex_parameteri(
            target,
            Context::TEXTURE_WRAP_T,
            Context::CLAMP_TO_EDGE as i32,
        );

        if T::Comparable::VALUE {
            self.gl.tex_parameteri(
                target,
                Context::TEXTURE_COMPARE_MODE,
                Context::COMPARE_REF_TO_TEXTURE as i32,
            );

            self.gl
                .tex_parameteri(target, Context::TEXTURE_COMPARE_FUNC, Context::LEQUAL as i32);
        }
    }
}

impl<T: TextureFormat> AsAttachment for Texture<T> {
    type Target = T::Renderable;

    fn as_attachment(&self) -> Option<&WebGlTexture> {
        self.handle.as_ref()
    }

    fn attachment_dimensions(&self) -> (usize, usize) {
        (self.cols(), self.rows())
    }
}

impl<T: TextureFormat> AsBindTarget for Texture<T> {
    fn bind_target(&self) -> BindTarget {
        BindTarget::Texture(self.handle.as_ref())
    }
}

impl<T> Drop for Texture<T> {
    fn drop(&mut self) {
        if let Some(texture_handle) = &self.handle {
            self.gl.delete_texture(Some(texture_handle));
        }
    }
}

pub trait TextureFormat {
    type Comparable: Boolean;
    type Renderable: RenderTarget;

    const GL_INTERNAL_FORMAT: u32;
}

/// 24-bit depth sampled through hardware depth comparison.
#[derive(Debug)]
pub struct D24;

impl TextureFormat for D24 {
    type Comparable = True;
    type Renderable = Depth;

    const GL_INTERNAL_FORMAT: u32 = Context::DEPTH_COMPONENT24;
}
