use std::rc::Rc;

use crate::errors::*;
use crate::utils::hash::hash64;

use super::super::config::{Operation, ShaderConfiguration};
use super::super::object::{Origin, ShaderObject, ShaderType, Stage};
use super::{is_identifier, Dependencies, DependenceKey, ShaderDependence};

/// Attributes are emitted before any other dependency, in ascending location.
pub const ATTRIBUTE_ORDER: i32 = -(1 << 16);

/// The largest accepted location. Keeps every attribute order negative.
pub const MAX_LOCATION: u32 = (1 << 16) - 1;

/// The name of the primary position attribute, bound to location 0.
pub const POSITION: &str = "position";

/// A vertex attribute fed from a buffered data slot.
#[derive(Debug)]
pub struct AttributeDependence {
    name: String,
    location: u32,
    kind: ShaderType,
}

impl AttributeDependence {
    pub fn new<T: Into<String>>(name: T, location: u32, kind: ShaderType) -> Result<Self> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(Error::InvalidExpression(format!(
                "`{}` is not a valid attribute name",
                name
            )));
        }

        if location > MAX_LOCATION {
            return Err(Error::InvalidExpression(format!(
                "attribute `{}` has location {}, the maximum is {}",
                name, location, MAX_LOCATION
            )));
        }

        if !kind.is_numeric() {
            return Err(Error::InvalidExpression(format!(
                "attribute `{}` can not be of type {}",
                name, kind
            )));
        }

        Ok(AttributeDependence {
            name,
            location,
            kind,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> u32 {
        self.location
    }

    #[inline]
    pub fn kind(&self) -> ShaderType {
        self.kind
    }
}

impl ShaderDependence for AttributeDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("attribute", self.name.clone())
    }

    fn fingerprint(&self) -> u64 {
        hash64(&(self.location, self.kind))
    }

    fn order(&self) -> i32 {
        ATTRIBUTE_ORDER + self.location.min(MAX_LOCATION) as i32
    }

    fn stage_header(&self, stage: Stage) -> Option<String> {
        match stage {
            Stage::Vertex => Some(format!(
                "layout (location = {}) in {} {};",
                self.location,
                self.kind.glsl(),
                self.name
            )),
            Stage::Fragment => None,
        }
    }

    fn configuration(&self) -> Option<Operation> {
        let location = self.location;
        let components = self.kind.components() as u8;
        Some(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
            cfg.add_layout(location, components)
        }))
    }

    fn as_attribute(&self) -> Option<&AttributeDependence> {
        Some(self)
    }
}

impl ShaderObject {
    /// A per-vertex input of `kind` read from the buffer bound at `location`.
    pub fn attribute<T: Into<String>>(name: T, location: u32, kind: ShaderType) -> Result<Self> {
        let dep = AttributeDependence::new(name, location, kind)?;
        let name = dep.name.clone();
        let dependencies = Dependencies::single(Rc::new(dep));
        Ok(ShaderObject::new(kind, name, Origin::Vertex, dependencies))
    }

    /// The primary `vec3` position attribute at location 0.
    pub fn position() -> Self {
        let dep = AttributeDependence {
            name: POSITION.to_owned(),
            location: 0,
            kind: ShaderType::Vec3,
        };

        let dependencies = Dependencies::single(Rc::new(dep));
        ShaderObject::new(ShaderType::Vec3, POSITION, Origin::Vertex, dependencies)
    }

    /// An additional per-vertex float read from the buffer at `location`.
    pub fn float_attribute<T: Into<String>>(name: T, location: u32) -> Result<Self> {
        ShaderObject::attribute(name, location, ShaderType::Float)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn declaration() {
        let dep = AttributeDependence::new("weight", 2, ShaderType::Float).unwrap();
        assert_eq!(
            dep.stage_header(Stage::Vertex).unwrap(),
            "layout (location = 2) in float weight;"
        );
        assert!(dep.stage_header(Stage::Fragment).is_none());
        assert!(dep.order() < 0);
    }

    #[test]
    fn invalid() {
        assert!(AttributeDependence::new("gl_Vertex", 1, ShaderType::Float).is_err());
        assert!(AttributeDependence::new("flag", 1, ShaderType::Bool).is_err());
    }

    #[test]
    fn locations() {
        let last = AttributeDependence::new("last", MAX_LOCATION, ShaderType::Float).unwrap();
        assert_eq!(last.order(), -1);

        match ShaderObject::float_attribute("far", u32::max_value()) {
            Err(Error::InvalidExpression(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert!(AttributeDependence::new("far", MAX_LOCATION + 1, ShaderType::Float).is_err());
    }

    #[test]
    fn position() {
        let p = ShaderObject::position();
        assert_eq!(p.kind(), ShaderType::Vec3);
        assert_eq!(p.origin(), Origin::Vertex);
        assert!(p
            .dependencies()
            .contains(&DependenceKey::new("attribute", POSITION)));
    }
}
