use std::rc::Rc;

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::utils::hash::hash64;
use crate::video::TextureHandle;

use super::super::config::{Operation, ShaderConfiguration};
use super::super::object::{self, Origin, ShaderObject, ShaderType};
use super::uniform::RESERVED;
use super::{is_identifier, Dependencies, DependenceKey, ShaderDependence};

/// A `sampler2D` uniform bound to a backend texture, with its size exposed as
/// `uniform vec2 <name>_size;`.
#[derive(Debug)]
pub struct TextureDependence {
    name: String,
    texture: TextureHandle,
    dimensions: Vector2<u32>,
}

impl TextureDependence {
    pub fn new<T: Into<String>>(
        name: T,
        texture: TextureHandle,
        dimensions: Vector2<u32>,
    ) -> Result<Self> {
        let name = name.into();
        if !is_identifier(&name) || RESERVED.contains(&name.as_str()) {
            return Err(Error::InvalidExpression(format!(
                "`{}` can not be used as texture name",
                name
            )));
        }

        Ok(TextureDependence {
            name,
            texture,
            dimensions,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }
}

impl ShaderDependence for TextureDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("texture", self.name.clone())
    }

    fn fingerprint(&self) -> u64 {
        hash64(&(self.texture, self.dimensions.x, self.dimensions.y))
    }

    fn header(&self) -> Option<String> {
        Some(format!(
            "uniform sampler2D {};\nuniform vec2 {}_size;",
            self.name, self.name
        ))
    }

    fn operation(&self) -> Option<Operation> {
        let name = self.name.clone();
        let size = format!("{}_size", self.name);
        let texture = self.texture;
        let dimensions = self.dimensions;
        Some(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
            cfg.set_texture(&name, texture)?;
            cfg.set_vec2(&size, dimensions.x as f32, dimensions.y as f32)
        }))
    }
}

impl ShaderObject {
    /// A sampler bound to `texture`.
    pub fn texture(dep: TextureDependence) -> Self {
        let name = dep.name.clone();
        let dependencies = Dependencies::single(Rc::new(dep));
        ShaderObject::new(ShaderType::Sampler2D, name, Origin::Global, dependencies)
    }

    /// Samples this texture at `uv`.
    pub fn sample(&self, uv: &ShaderObject) -> Result<ShaderObject> {
        if self.kind() != ShaderType::Sampler2D || uv.kind() != ShaderType::Vec2 {
            return Err(Error::TypeMismatch {
                operation: "texture",
                lhs: self.kind(),
                rhs: uv.kind(),
            });
        }

        if !self.dependencies().contains_kind("texture") {
            return Err(Error::MissingDependence(format!(
                "texture of sampler `{}`",
                self.expression()
            )));
        }

        object::union(ShaderType::Vec4, "texture({0}, {1})", &[self, uv])
    }

    /// The size in pixels of this texture.
    pub fn texture_size(&self) -> Result<ShaderObject> {
        if self.kind() != ShaderType::Sampler2D {
            return Err(Error::TypeMismatch {
                operation: "texture_size",
                lhs: self.kind(),
                rhs: ShaderType::Sampler2D,
            });
        }

        if !self.dependencies().contains_kind("texture") {
            return Err(Error::MissingDependence(format!(
                "texture of sampler `{}`",
                self.expression()
            )));
        }

        object::transform(ShaderType::Vec2, "{0}_size", self)
    }
}
