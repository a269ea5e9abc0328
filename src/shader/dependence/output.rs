use crate::errors::*;
use crate::utils::hash::hash64;

use super::super::object::{ShaderObject, ShaderType, Stage};
use super::{DependenceKey, ShaderDependence};

/// A compiler generated `out`/`in` variable pair, which threads a value
/// computed in the vertex stage into the fragment stage.
///
/// The variable name is derived from the source expression, so promoting the
/// same vertex expression twice yields the same variable. Booleans can not be
/// interpolated, they travel as a `flat int` instead.
#[derive(Debug)]
pub struct OutputDependence {
    name: String,
    source: ShaderObject,
}

impl OutputDependence {
    /// Fails with `StageMismatch` for samplers, which only exist as uniforms.
    pub fn new(source: ShaderObject) -> Result<Self> {
        if source.kind() == ShaderType::Sampler2D {
            return Err(Error::StageMismatch {
                stage: Stage::Fragment.name(),
                expression: source.expression().to_owned(),
            });
        }

        let hash = hash64(&(source.kind(), source.expression()));
        Ok(OutputDependence {
            name: format!("v_{:016x}", hash),
            source,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The vertex expression this output carries.
    #[inline]
    pub fn source(&self) -> &ShaderObject {
        &self.source
    }

    /// The fragment expression reading the interpolated value back.
    pub fn reference(&self) -> String {
        if self.source.kind() == ShaderType::Bool {
            format!("({} != 0)", self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn declaration(&self, stage: Stage) -> String {
        let qualifier = match stage {
            Stage::Vertex => "out",
            Stage::Fragment => "in",
        };

        match self.source.kind() {
            ShaderType::Bool => format!("flat {} int {};", qualifier, self.name),
            kind => format!("{} {} {};", qualifier, kind.glsl(), self.name),
        }
    }
}

impl ShaderDependence for OutputDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("output", self.name.clone())
    }

    fn fingerprint(&self) -> u64 {
        hash64(&(self.source.kind(), self.source.expression()))
    }

    fn stage_header(&self, stage: Stage) -> Option<String> {
        Some(self.declaration(stage))
    }

    fn code(&self, stage: Stage) -> Option<String> {
        match (stage, self.source.kind()) {
            (Stage::Vertex, ShaderType::Bool) => Some(format!(
                "{} = {} ? 1 : 0;",
                self.name,
                self.source.expression()
            )),
            (Stage::Vertex, _) => Some(format!("{} = {};", self.name, self.source.expression())),
            (Stage::Fragment, _) => None,
        }
    }

    fn as_output(&self) -> Option<&OutputDependence> {
        Some(self)
    }
}
