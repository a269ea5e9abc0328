use gl::types::*;

use crate::buffer::PrimitiveKind;
use crate::shader::Stage;

impl From<PrimitiveKind> for GLenum {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Points => gl::POINTS,
            PrimitiveKind::Lines => gl::LINES,
            PrimitiveKind::LineLoop => gl::LINE_LOOP,
            PrimitiveKind::Triangles => gl::TRIANGLES,
        }
    }
}

impl From<Stage> for GLenum {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Vertex => gl::VERTEX_SHADER,
            Stage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}
