//! Binds generated programs and buffered data to a rendering backend.
//!
//! The `Visitor` trait is the only place touching the driver. The
//! `RenderContext` owns one, together with the caches of compiled shaders and
//! linked programs, and turns pipelines and buffered data into draw calls.

pub mod context;
pub mod headless;

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

pub mod prelude {
    pub use super::context::{Layout, Pipeline, RenderContext, RenderParams};
    pub use super::headless::{Command, HeadlessVisitor, Recorder};
    pub use super::{BufferHandle, ProgramHandle, ShaderHandle, TextureHandle, Visitor};

    #[cfg(not(target_arch = "wasm32"))]
    pub use super::gl::GLVisitor;
}

use crate::buffer::PrimitiveKind;
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::shader::config::UniformVariable;
use crate::shader::Stage;

impl_handle!(TextureHandle);
impl_handle!(ShaderHandle);
impl_handle!(ProgramHandle);
impl_handle!(BufferHandle);

/// The low level operations a backend has to provide.
///
/// Uniforms are set on the most recently bound program, and attributes are
/// bound for the next draw call only.
pub trait Visitor {
    fn dimensions(&self) -> Vector2<u32>;

    unsafe fn set_dimensions(&mut self, dimensions: Vector2<u32>) -> Result<()>;

    unsafe fn compile_shader(&mut self, handle: ShaderHandle, stage: Stage, source: &str)
        -> Result<()>;

    unsafe fn link_program(
        &mut self,
        handle: ProgramHandle,
        vs: ShaderHandle,
        fs: ShaderHandle,
    ) -> Result<()>;

    unsafe fn bind_program(&mut self, handle: ProgramHandle) -> Result<()>;

    unsafe fn set_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()>;

    unsafe fn set_line_width(&mut self, width: f32) -> Result<()>;

    unsafe fn set_point_size(&mut self, size: f32) -> Result<()>;

    /// Allocates the buffer `handle` with `data`, replacing any previous
    /// content and size.
    unsafe fn create_buffer(&mut self, handle: BufferHandle, data: &[f32]) -> Result<()>;

    /// Overwrites the floats starting at `offset`.
    unsafe fn update_buffer(&mut self, handle: BufferHandle, offset: usize, data: &[f32])
        -> Result<()>;

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    unsafe fn bind_attribute(
        &mut self,
        buffer: BufferHandle,
        location: u32,
        components: u8,
    ) -> Result<()>;

    /// Draws `instances` times the first `vertices` points of the bound
    /// attributes.
    unsafe fn draw(&mut self, kind: PrimitiveKind, vertices: usize, instances: usize)
        -> Result<()>;
}
