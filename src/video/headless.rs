//! A backend without any driver, which validates and records every command.
//! Used for tests and for generating programs offline.

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffer::PrimitiveKind;
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::shader::config::UniformVariable;
use crate::shader::Stage;
use crate::utils::hash::{FastHashMap, FastHashSet};

use super::{BufferHandle, ProgramHandle, ShaderHandle, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetDimensions(Vector2<u32>),
    CompileShader {
        handle: ShaderHandle,
        stage: Stage,
        source: String,
    },
    LinkProgram {
        handle: ProgramHandle,
        vs: ShaderHandle,
        fs: ShaderHandle,
    },
    BindProgram(ProgramHandle),
    SetUniform {
        name: String,
        variable: UniformVariable,
    },
    SetLineWidth(f32),
    SetPointSize(f32),
    CreateBuffer {
        handle: BufferHandle,
        len: usize,
    },
    UpdateBuffer {
        handle: BufferHandle,
        offset: usize,
        len: usize,
    },
    DeleteBuffer(BufferHandle),
    BindAttribute {
        buffer: BufferHandle,
        location: u32,
        components: u8,
    },
    Draw {
        kind: PrimitiveKind,
        vertices: usize,
        instances: usize,
    },
}

/// A shared view of the commands issued to a `HeadlessVisitor`.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Command>>>);

impl Recorder {
    fn push(&self, command: Command) {
        self.0.borrow_mut().push(command);
    }

    /// Takes every command recorded so far.
    pub fn take(&self) -> Vec<Command> {
        ::std::mem::replace(&mut *self.0.borrow_mut(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

pub struct HeadlessVisitor {
    dimensions: Vector2<u32>,
    shaders: FastHashSet<ShaderHandle>,
    programs: FastHashSet<ProgramHandle>,
    buffers: FastHashMap<BufferHandle, usize>,
    binded_program: Option<ProgramHandle>,
    recorder: Recorder,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            dimensions: Vector2::new(0, 0),
            shaders: FastHashSet::default(),
            programs: FastHashSet::default(),
            buffers: FastHashMap::default(),
            binded_program: None,
            recorder: Recorder::default(),
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    fn buffer_len(&self, handle: BufferHandle) -> Result<usize> {
        self.buffers
            .get(&handle)
            .cloned()
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl Visitor for HeadlessVisitor {
    fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    unsafe fn set_dimensions(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        self.dimensions = dimensions;
        self.recorder.push(Command::SetDimensions(dimensions));
        Ok(())
    }

    unsafe fn compile_shader(
        &mut self,
        handle: ShaderHandle,
        stage: Stage,
        source: &str,
    ) -> Result<()> {
        self.shaders.insert(handle);
        self.recorder.push(Command::CompileShader {
            handle,
            stage,
            source: source.to_owned(),
        });

        Ok(())
    }

    unsafe fn link_program(
        &mut self,
        handle: ProgramHandle,
        vs: ShaderHandle,
        fs: ShaderHandle,
    ) -> Result<()> {
        for v in &[vs, fs] {
            if !self.shaders.contains(v) {
                return Err(Error::HandleInvalid(format!("{}", v)));
            }
        }

        self.programs.insert(handle);
        self.recorder.push(Command::LinkProgram { handle, vs, fs });
        Ok(())
    }

    unsafe fn bind_program(&mut self, handle: ProgramHandle) -> Result<()> {
        if !self.programs.contains(&handle) {
            return Err(Error::HandleInvalid(format!("{}", handle)));
        }

        self.binded_program = Some(handle);
        self.recorder.push(Command::BindProgram(handle));
        Ok(())
    }

    unsafe fn set_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()> {
        if self.binded_program.is_none() {
            return Err(Error::Backend(format!(
                "uniform `{}` set without any program bound",
                name
            )));
        }

        self.recorder.push(Command::SetUniform {
            name: name.to_owned(),
            variable,
        });

        Ok(())
    }

    unsafe fn set_line_width(&mut self, width: f32) -> Result<()> {
        self.recorder.push(Command::SetLineWidth(width));
        Ok(())
    }

    unsafe fn set_point_size(&mut self, size: f32) -> Result<()> {
        self.recorder.push(Command::SetPointSize(size));
        Ok(())
    }

    unsafe fn create_buffer(&mut self, handle: BufferHandle, data: &[f32]) -> Result<()> {
        self.buffers.insert(handle, data.len());
        self.recorder.push(Command::CreateBuffer {
            handle,
            len: data.len(),
        });

        Ok(())
    }

    unsafe fn update_buffer(
        &mut self,
        handle: BufferHandle,
        offset: usize,
        data: &[f32],
    ) -> Result<()> {
        let len = self.buffer_len(handle)?;
        if offset + data.len() > len {
            return Err(Error::OutOfBounds {
                index: offset + data.len(),
                len,
            });
        }

        self.recorder.push(Command::UpdateBuffer {
            handle,
            offset,
            len: data.len(),
        });

        Ok(())
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.buffer_len(handle)?;
        self.buffers.remove(&handle);
        self.recorder.push(Command::DeleteBuffer(handle));
        Ok(())
    }

    unsafe fn bind_attribute(
        &mut self,
        buffer: BufferHandle,
        location: u32,
        components: u8,
    ) -> Result<()> {
        self.buffer_len(buffer)?;
        self.recorder.push(Command::BindAttribute {
            buffer,
            location,
            components,
        });

        Ok(())
    }

    unsafe fn draw(&mut self, kind: PrimitiveKind, vertices: usize, instances: usize) -> Result<()> {
        if self.binded_program.is_none() {
            return Err(Error::Backend("draw without any program bound".to_owned()));
        }

        self.recorder.push(Command::Draw {
            kind,
            vertices,
            instances,
        });

        Ok(())
    }
}
