//! The sink through which generated shaders configure a backend program.

use std::fmt;
use std::rc::Rc;

use crate::errors::*;
use crate::math::prelude::{Color, Vector2, Vector3, Vector4};
use crate::video::TextureHandle;

use super::object::ShaderType;

/// Uniform variable for program objects.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    Texture(TextureHandle),
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
}

impl UniformVariable {
    /// The GLSL type used to declare this variable.
    pub fn shader_type(&self) -> Option<ShaderType> {
        match *self {
            UniformVariable::Texture(_) => Some(ShaderType::Sampler2D),
            UniformVariable::I32(_) => None,
            UniformVariable::F32(_) => Some(ShaderType::Float),
            UniformVariable::Vector2f(_) => Some(ShaderType::Vec2),
            UniformVariable::Vector3f(_) => Some(ShaderType::Vec3),
            UniformVariable::Vector4f(_) => Some(ShaderType::Vec4),
        }
    }
}

impl From<TextureHandle> for UniformVariable {
    fn from(v: TextureHandle) -> Self {
        UniformVariable::Texture(v)
    }
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> Self {
        UniformVariable::I32(v)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> Self {
        UniformVariable::F32(v)
    }
}

impl From<[f32; 2]> for UniformVariable {
    fn from(v: [f32; 2]) -> Self {
        UniformVariable::Vector2f(v)
    }
}

impl From<[f32; 3]> for UniformVariable {
    fn from(v: [f32; 3]) -> Self {
        UniformVariable::Vector3f(v)
    }
}

impl From<[f32; 4]> for UniformVariable {
    fn from(v: [f32; 4]) -> Self {
        UniformVariable::Vector4f(v)
    }
}

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(v.into())
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> Self {
        UniformVariable::Vector3f(v.into())
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(v.into())
    }
}

impl From<Color> for UniformVariable {
    fn from(v: Color) -> Self {
        UniformVariable::Vector4f(v.rgba_array())
    }
}

/// A backend side receiver of the values and layouts a generated program needs.
pub trait ShaderConfiguration {
    /// The dimensions of the surface we are drawing into.
    fn dimensions(&self) -> Vector2<u32>;

    fn set_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()>;

    /// Registers a vertex attribute with `components` floats at `location`.
    fn add_layout(&mut self, location: u32, components: u8) -> Result<()>;

    fn set_line_width(&mut self, width: f32) -> Result<()>;

    fn set_point_size(&mut self, size: f32) -> Result<()>;

    #[inline]
    fn set_float(&mut self, name: &str, v: f32) -> Result<()> {
        self.set_uniform(name, UniformVariable::F32(v))
    }

    #[inline]
    fn set_vec2(&mut self, name: &str, x: f32, y: f32) -> Result<()> {
        self.set_uniform(name, UniformVariable::Vector2f([x, y]))
    }

    #[inline]
    fn set_vec3(&mut self, name: &str, x: f32, y: f32, z: f32) -> Result<()> {
        self.set_uniform(name, UniformVariable::Vector3f([x, y, z]))
    }

    #[inline]
    fn set_vec4(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.set_uniform(name, UniformVariable::Vector4f([x, y, z, w]))
    }

    #[inline]
    fn set_texture(&mut self, name: &str, texture: TextureHandle) -> Result<()> {
        self.set_uniform(name, UniformVariable::Texture(texture))
    }
}

/// A single side-effect against a `ShaderConfiguration`.
pub type Operation = Rc<dyn Fn(&mut dyn ShaderConfiguration) -> Result<()>>;

/// A composite of operations, executed in insertion order.
#[derive(Clone, Default)]
pub struct Action {
    operations: Vec<Operation>,
}

impl Action {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Runs every operation, stopping at the first failure.
    pub fn run(&self, cfg: &mut dyn ShaderConfiguration) -> Result<()> {
        for op in &self.operations {
            op(cfg)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Action({} operations)", self.operations.len())
    }
}
