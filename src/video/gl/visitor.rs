use std::cell::RefCell;
use std::ffi::CString;

use gl::types::*;

use crate::buffer::PrimitiveKind;
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::shader::config::UniformVariable;
use crate::shader::Stage;
use crate::utils::data_vec::DataVec;
use crate::utils::hash::FastHashMap;
use crate::utils::hash_value::HashValue;

use super::super::{BufferHandle, ProgramHandle, ShaderHandle, TextureHandle, Visitor};
use super::capabilities::Version;

#[derive(Debug, Clone)]
struct GLProgramData {
    id: GLuint,
    uniforms: RefCell<FastHashMap<HashValue<str>, GLint>>,
}

impl GLProgramData {
    unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        let hash = HashValue::<str>::from(name);
        let mut uniforms = self.uniforms.borrow_mut();
        match uniforms.get(&hash).cloned() {
            Some(location) => Ok(location),
            None => {
                let c_name = CString::new(name.as_bytes())
                    .map_err(|_| Error::Backend(format!("[GL] `{}` is not a valid name.", name)))?;
                let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
                check()?;

                uniforms.insert(hash, location);
                Ok(location)
            }
        }
    }
}

struct GLMutableState {
    dimensions: Vector2<u32>,
    binded_program: Option<ProgramHandle>,
    binded_texture_index: usize,
}

/// The OpenGL 3.3 core backend.
///
/// The functions of `gl` must have been loaded for a context current on the
/// calling thread, e.g. with `gl::load_with`.
pub struct GLVisitor {
    version: Version,
    state: GLMutableState,
    vao: GLuint,
    shaders: DataVec<GLuint>,
    programs: DataVec<GLProgramData>,
    buffers: DataVec<GLuint>,
    textures: FastHashMap<TextureHandle, GLuint>,
}

impl GLVisitor {
    pub unsafe fn new() -> Result<Self> {
        let version = Version::current()?;
        info!("[GL] Setups visitor with {:?}.", version);

        if !version.is_supported() {
            return Err(Error::Backend(format!(
                "[GL] {:?} does not support vertex array objects and instanced draws.",
                version
            )));
        }

        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        gl::BindVertexArray(vao);
        check()?;

        Ok(GLVisitor {
            version,
            state: GLMutableState {
                dimensions: Vector2::new(0, 0),
                binded_program: None,
                binded_texture_index: 0,
            },
            vao,
            shaders: DataVec::new(),
            programs: DataVec::new(),
            buffers: DataVec::new(),
            textures: FastHashMap::default(),
        })
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Associates a texture created by the host with `handle`, so samplers
    /// referring to `handle` read from it.
    pub fn register_texture(&mut self, handle: TextureHandle, id: GLuint) {
        self.textures.insert(handle, id);
    }

    pub fn unregister_texture(&mut self, handle: TextureHandle) -> Option<GLuint> {
        self.textures.remove(&handle)
    }

    fn buffer(&self, handle: BufferHandle) -> Result<GLuint> {
        self.buffers
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))
    }
}

impl Drop for GLVisitor {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

impl Visitor for GLVisitor {
    fn dimensions(&self) -> Vector2<u32> {
        self.state.dimensions
    }

    unsafe fn set_dimensions(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        gl::Viewport(0, 0, dimensions.x as GLsizei, dimensions.y as GLsizei);
        self.state.dimensions = dimensions;
        check()
    }

    unsafe fn compile_shader(
        &mut self,
        handle: ShaderHandle,
        stage: Stage,
        source: &str,
    ) -> Result<()> {
        let id = Self::compile(stage.into(), source)?;
        self.shaders.create(handle, id);
        Ok(())
    }

    unsafe fn link_program(
        &mut self,
        handle: ProgramHandle,
        vs: ShaderHandle,
        fs: ShaderHandle,
    ) -> Result<()> {
        let vs = *self
            .shaders
            .get(vs)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", vs)))?;

        let fs = *self
            .shaders
            .get(fs)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", fs)))?;

        let id = Self::link(&[vs, fs])?;
        gl::DetachShader(id, vs);
        gl::DetachShader(id, fs);
        check()?;

        self.programs.create(
            handle,
            GLProgramData {
                id,
                uniforms: RefCell::new(FastHashMap::default()),
            },
        );

        Ok(())
    }

    unsafe fn bind_program(&mut self, handle: ProgramHandle) -> Result<()> {
        if self.state.binded_program == Some(handle) {
            return Ok(());
        }

        let program = self
            .programs
            .get(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        gl::UseProgram(program.id);
        check()?;

        self.state.binded_program = Some(handle);
        self.state.binded_texture_index = 0;
        Ok(())
    }

    unsafe fn set_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()> {
        let handle = self.state.binded_program.ok_or_else(|| {
            Error::Backend(format!("[GL] Uniform `{}` set without any program bound.", name))
        })?;

        let program = self
            .programs
            .get(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        let location = program.uniform_location(name)?;
        if location == -1 {
            // Unused uniforms are optimized out by the driver.
            return Ok(());
        }

        match variable {
            UniformVariable::Texture(texture) => {
                let id = *self
                    .textures
                    .get(&texture)
                    .ok_or_else(|| Error::HandleInvalid(format!("{}", texture)))?;

                let index = self.state.binded_texture_index;
                self.state.binded_texture_index += 1;

                gl::ActiveTexture(gl::TEXTURE0 + index as GLuint);
                gl::BindTexture(gl::TEXTURE_2D, id);
                gl::Uniform1i(location, index as GLint);
            }
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
            UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
            UniformVariable::Vector4f(v) => gl::Uniform4f(location, v[0], v[1], v[2], v[3]),
        }

        check()
    }

    unsafe fn set_line_width(&mut self, width: f32) -> Result<()> {
        gl::LineWidth(width);
        check()
    }

    unsafe fn set_point_size(&mut self, size: f32) -> Result<()> {
        gl::PointSize(size);
        check()
    }

    unsafe fn create_buffer(&mut self, handle: BufferHandle, data: &[f32]) -> Result<()> {
        let id = match self.buffers.get(handle).cloned() {
            Some(id) => id,
            None => {
                let mut id = 0;
                gl::GenBuffers(1, &mut id);
                if id == 0 {
                    return Err(Error::Backend("[GL] Failed to generate buffer.".to_owned()));
                }

                self.buffers.create(handle, id);
                id
            }
        };

        let value = if data.is_empty() {
            ::std::ptr::null()
        } else {
            data.as_ptr() as *const ::std::os::raw::c_void
        };

        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::BufferData(
            gl::ARRAY_BUFFER,
            (data.len() * ::std::mem::size_of::<f32>()) as isize,
            value,
            gl::DYNAMIC_DRAW,
        );

        check()
    }

    unsafe fn update_buffer(
        &mut self,
        handle: BufferHandle,
        offset: usize,
        data: &[f32],
    ) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let id = self.buffer(handle)?;
        let size = ::std::mem::size_of::<f32>();

        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::BufferSubData(
            gl::ARRAY_BUFFER,
            (offset * size) as isize,
            (data.len() * size) as isize,
            data.as_ptr() as *const ::std::os::raw::c_void,
        );

        check()
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let id = self
            .buffers
            .free(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        gl::DeleteBuffers(1, &id);
        check()
    }

    unsafe fn bind_attribute(
        &mut self,
        buffer: BufferHandle,
        location: u32,
        components: u8,
    ) -> Result<()> {
        let id = self.buffer(buffer)?;

        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::EnableVertexAttribArray(location);
        gl::VertexAttribPointer(
            location,
            GLint::from(components),
            gl::FLOAT,
            gl::FALSE,
            0,
            ::std::ptr::null(),
        );

        check()
    }

    unsafe fn draw(&mut self, kind: PrimitiveKind, vertices: usize, instances: usize) -> Result<()> {
        if self.state.binded_program.is_none() {
            return Err(Error::Backend("[GL] Draw without any program bound.".to_owned()));
        }

        gl::DrawArraysInstanced(
            kind.into(),
            0,
            vertices as GLsizei,
            instances as GLsizei,
        );

        self.state.binded_texture_index = 0;
        check()
    }
}

impl GLVisitor {
    unsafe fn compile(shader: GLenum, src: &str) -> Result<GLuint> {
        let c_str = CString::new(src.as_bytes())
            .map_err(|_| Error::ShaderCreationFailure("source contains a nul byte".to_owned()))?;

        let shader = gl::CreateShader(shader);
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ::std::ptr::null());
        gl::CompileShader(shader);

        // Get the compile status
        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        // Fail on error
        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let log = Self::read_log(len, |len, buf| {
                gl::GetShaderInfoLog(shader, len, ::std::ptr::null_mut(), buf)
            });

            gl::DeleteShader(shader);
            warn!("[GL] Failed to compile:\n{}", src);
            Err(Error::ShaderCreationFailure(log))
        } else {
            Ok(shader)
        }
    }

    unsafe fn link<'a, T>(shaders: T) -> Result<GLuint>
    where
        T: IntoIterator<Item = &'a GLuint>,
    {
        let program = gl::CreateProgram();
        for shader in shaders {
            gl::AttachShader(program, *shader)
        }

        gl::LinkProgram(program);
        // Get the link status
        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        // Fail on error
        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let log = Self::read_log(len, |len, buf| {
                gl::GetProgramInfoLog(program, len, ::std::ptr::null_mut(), buf)
            });

            gl::DeleteProgram(program);
            Err(Error::ShaderCreationFailure(log))
        } else {
            Ok(program)
        }
    }

    unsafe fn read_log<F>(len: GLint, func: F) -> String
    where
        F: FnOnce(GLsizei, *mut GLchar),
    {
        if len <= 1 {
            return String::new();
        }

        let mut buf = vec![0u8; len as usize];
        func(len, buf.as_mut_ptr() as *mut GLchar);
        // Skips the trailing null character.
        buf.truncate(len as usize - 1);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

unsafe fn check() -> Result<()> {
    let msg = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "[GL] An unacceptable value is specified for an enumerated argument.",
        gl::INVALID_VALUE => "[GL] A numeric argument is out of range.",
        gl::INVALID_OPERATION => {
            "[GL] The specified operation is not allowed in the current state."
        }
        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }
        gl::OUT_OF_MEMORY => "[GL] There is not enough memory left to execute the command.",
        _ => "[GL] Oops, Unknown OpenGL error.",
    };

    Err(Error::Backend(msg.to_owned()))
}
