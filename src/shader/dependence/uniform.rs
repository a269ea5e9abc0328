use std::cell::Cell;
use std::rc::Rc;

use crate::errors::*;
use crate::utils::hash::hash64;

use super::super::config::{Operation, ShaderConfiguration, UniformVariable};
use super::super::object::{Origin, ShaderObject, ShaderType};
use super::{is_identifier, Dependencies, DependenceKey, ShaderDependence};

/// Names declared by the generator itself.
pub const RESERVED: [&str; 5] = ["width", "height", "time", "outColor", "finalPosition"];

/// A shared, host side cell holding the current value of a uniform. Updates
/// are pushed to the program before every draw.
#[derive(Debug, Clone)]
pub struct UniformSlot(Rc<Cell<UniformVariable>>);

impl UniformSlot {
    pub fn new<T: Into<UniformVariable>>(value: T) -> Self {
        UniformSlot(Rc::new(Cell::new(value.into())))
    }

    #[inline]
    pub fn get(&self) -> UniformVariable {
        self.0.get()
    }

    /// Replaces the current value. The type of the variable can not change.
    pub fn set<T: Into<UniformVariable>>(&self, value: T) -> Result<()> {
        let value = value.into();
        let (current, next) = (self.0.get().shader_type(), value.shader_type());
        if current != next {
            return Err(Error::InvalidExpression(format!(
                "uniform of type {:?} can not hold {:?}",
                current, next
            )));
        }

        self.0.set(value);
        Ok(())
    }
}

#[derive(Debug)]
pub struct UniformDependence {
    name: String,
    kind: ShaderType,
    slot: UniformSlot,
}

impl UniformDependence {
    pub fn new<T: Into<String>>(name: T, slot: UniformSlot) -> Result<Self> {
        let name = name.into();
        if !is_identifier(&name) || RESERVED.contains(&name.as_str()) {
            return Err(Error::InvalidExpression(format!(
                "`{}` can not be used as uniform name",
                name
            )));
        }

        let kind = slot.get().shader_type().ok_or_else(|| {
            Error::InvalidExpression(format!("uniform `{}` has no shader type", name))
        })?;

        Ok(UniformDependence { name, kind, slot })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ShaderDependence for UniformDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("uniform", self.name.clone())
    }

    fn fingerprint(&self) -> u64 {
        hash64(&(self.kind, Rc::as_ptr(&self.slot.0) as usize))
    }

    fn header(&self) -> Option<String> {
        Some(format!("uniform {} {};", self.kind.glsl(), self.name))
    }

    fn operation(&self) -> Option<Operation> {
        let name = self.name.clone();
        let slot = self.slot.clone();
        Some(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
            cfg.set_uniform(&name, slot.get())
        }))
    }
}

impl ShaderObject {
    /// A uniform input whose value is read from `slot` before every draw.
    pub fn uniform<T: Into<String>>(name: T, slot: &UniformSlot) -> Result<Self> {
        let dep = UniformDependence::new(name, slot.clone())?;
        let (kind, name) = (dep.kind, dep.name.clone());
        let dependencies = Dependencies::single(Rc::new(dep));
        Ok(ShaderObject::new(kind, name, Origin::Global, dependencies))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slot() {
        let slot = UniformSlot::new(0.5f32);
        assert!(slot.set(1.0f32).is_ok());
        assert_eq!(slot.get(), UniformVariable::F32(1.0));
        assert!(slot.set([1.0f32, 2.0]).is_err());
    }

    #[test]
    fn declaration() {
        let slot = UniformSlot::new([0.0f32, 0.0, 0.0]);
        let tint = ShaderObject::uniform("tint", &slot).unwrap();
        assert_eq!(tint.kind(), ShaderType::Vec3);
        assert_eq!(tint.expression(), "tint");

        let dep = tint.dependencies().iter().next().unwrap();
        assert_eq!(dep.header().unwrap(), "uniform vec3 tint;");
        assert!(dep.operation().is_some());
    }

    #[test]
    fn reserved() {
        let slot = UniformSlot::new(1.0f32);
        assert!(ShaderObject::uniform("width", &slot).is_err());
        assert!(ShaderObject::uniform("1st", &slot).is_err());
        assert!(ShaderObject::uniform("count", &UniformSlot::new(1i32)).is_err());
    }
}
