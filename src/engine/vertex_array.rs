#[allow(unused_imports)]
use log::{debug, info, warn};

use crate::AsVertexArray;
use std::marker::PhantomData;
use web_sys::{WebGl2RenderingContext as Context, WebGlBuffer, WebGlVertexArrayObject};
use zerocopy::{AsBytes, FromBytes};

/// Indexed triangle list stored in a vertex array object.
#[derive(Debug)]
pub struct VertexArray<T> {
    gl: Context,
    handle: Option<WebGlBuffer>,
    index_handle: Option<WebGlBuffer>,
    vao_handle: Option<WebGlVertexArrayObject>,
    vertices: usize,
    indices: usize,
    phantom: PhantomData<T>,
}

impl<T> VertexArray<T> {
    pub fn new(gl: Context) -> Self {
        Self {
            gl,
            handle: None,
            index_handle: None,
            vao_handle: None,
            vertices: 0,
            indices: 0,
            phantom: PhantomData,
        }
    }

    pub fn invalidate(&mut self) {
        self.handle = None;
        self.index_handle = None;
        self.vao_handle = None;
        self.vertices = 0;
        self.indices = 0;
    }
}

impl<T: AsBytes + FromBytes + VertexLayout> VertexArray<T> {
    pub fn vertex_count(&self) -> usize {
        self.vertices
    }

    pub fn upload(&mut self, vertices: &[T], indices: &[u16]) {
        if vertices.len() != self.vertices
            || indices.len() != self.indices
            || !self.gl.is_buffer(self.handle.as_ref())
        {
            self.create_and_allocate(vertices.len(), indices.len());
        }

        // element buffer binds below must not touch any other VAO
        self.gl.bind_vertex_array(None);

        self.gl
            .bind_buffer(Context::ARRAY_BUFFER, self.handle.as_ref());

        self.gl
            .buffer_sub_data_with_i32_and_u8_array(Context::ARRAY_BUFFER, 0, vertices.as_bytes());

        self.gl
            .bind_buffer(Context::ELEMENT_ARRAY_BUFFER, self.index_handle.as_ref());

        self.gl.buffer_sub_data_with_i32_and_u8_array(
            Context::ELEMENT_ARRAY_BUFFER,
            0,
            indices.as_bytes(),
        );

        self.gl.bind_buffer(Context::ELEMENT_ARRAY_BUFFER, None);
    }

    fn create_and_allocate(&mut self, vertices: usize, indices: usize) {
        self.gl.delete_buffer(self.handle.as_ref());
        self.gl.delete_buffer(self.index_handle.as_ref());
        self.gl.delete_vertex_array(self.vao_handle.as_ref());

        self.handle = self.gl.create_buffer();
        self.index_handle = self.gl.create_buffer();
        self.vao_handle = self.gl.create_vertex_array();

        self.gl.bind_vertex_array(self.vao_handle.as_ref());

        let stride = std::mem::size_of::<T>() as i32;

        self.gl
            .bind_buffer(Context::ARRAY_BUFFER, self.handle.as_ref());
        self.gl.buffer_data_with_i32(
            Context::ARRAY_BUFFER,
            stride * vertices as i32,
            Context::STATIC_DRAW,
        );

        self.gl
            .bind_buffer(Context::ELEMENT_ARRAY_BUFFER, self.index_handle.as_ref());
        self.gl.buffer_data_with_i32(
            Context::ELEMENT_ARRAY_BUFFER,
            (indices * std::mem::size_of::<u16>()) as i32,
            Context::STATIC_DRAW,
        );

        for attribute in T::vertex_layout() {
            match attribute.kind {
                VertexAttributeKind::Float3 => {
                    self.gl.vertex_attrib_pointer_with_i32(
                        attribute.index as u32,
                        3,
                        Context::FLOAT,
                        false,
                        stride,
                        attribute.offset as i32,
                    );
                }
            }

            self.gl.enable_vertex_attrib_array(attribute.index as u32);
        }

        self.gl.bind_vertex_array(None);

        self.vertices = vertices;
        self.indices = indices;
    }
}

impl<T> AsVertexArray for VertexArray<T> {
    fn vertex_array(&self) -> Option<&WebGlVertexArrayObject> {
        self.vao_handle.as_ref()
    }

    fn index_count(&self) -> usize {
        self.indices
    }
}

impl<T> Drop for VertexArray<T> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.handle.as_ref());
        self.gl.delete_buffer(self.index_handle.as_ref());
        self.gl.delete_vertex_array(self.vao_handle.as_ref());
    }
}

pub trait VertexLayout {
    fn vertex_layout() -> Vec<VertexAttribute>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexAttributeKind {
    Float3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: VertexAttributeKind,
    pub index: usize,
    pub offset: usize,
}

impl VertexAttribute {
    pub fn new(index: usize, offset: usize, kind: VertexAttributeKind) -> Self {
        Self {
            kind,
            index,
            offset,
        }
    }
}
