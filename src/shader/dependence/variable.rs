use std::rc::Rc;

use crate::errors::*;
use crate::utils::hash::hash64;

use super::super::object::{ShaderObject, Stage};
use super::uniform::RESERVED;
use super::{is_identifier, DependenceKey, Requirements, ShaderDependence};

/// A user named local variable, `type name = expression;`, declared at the
/// top of `main` in every stage that uses it.
#[derive(Debug)]
pub struct VariableDependence {
    name: String,
    source: ShaderObject,
}

impl VariableDependence {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn source(&self) -> &ShaderObject {
        &self.source
    }
}

impl ShaderDependence for VariableDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("variable", self.name.clone())
    }

    fn fingerprint(&self) -> u64 {
        hash64(&(self.source.kind(), self.source.expression()))
    }

    fn code(&self, stage: Stage) -> Option<String> {
        if self.source.origin().is_available_in(stage) {
            Some(format!(
                "{} {} = {};",
                self.source.kind().glsl(),
                self.name,
                self.source.expression()
            ))
        } else {
            None
        }
    }

    fn requires(&self) -> Requirements {
        self.source.dependencies().iter().cloned().collect()
    }
}

impl ShaderObject {
    /// Binds this expression to a local variable called `name`, and returns
    /// an object referring to that variable.
    pub fn named<T: Into<String>>(&self, name: T) -> Result<ShaderObject> {
        let name = name.into();
        if !is_identifier(&name) || RESERVED.contains(&name.as_str()) {
            return Err(Error::InvalidExpression(format!(
                "`{}` can not be used as variable name",
                name
            )));
        }

        let dep = VariableDependence {
            name: name.clone(),
            source: self.clone(),
        };

        let mut dependencies = self.dependencies().clone();
        dependencies.insert(Rc::new(dep))?;
        Ok(ShaderObject::new(
            self.kind(),
            name,
            self.origin(),
            dependencies,
        ))
    }
}
