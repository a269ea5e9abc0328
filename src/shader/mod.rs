//! An embedded expression language compiled into GLSL at runtime.
//!
//! Expressions are built out of `ShaderObject`s, which carry their GLSL text
//! together with the stage they have to run in and the external inputs they
//! need. The `GlslGenerator` turns a position and a color expression into a
//! matched vertex and fragment program.
//!
//! ```rust,ignore
//! use tincture::prelude::*;
//!
//! let position = ShaderObject::position();
//! let color = ShaderObject::literal(Color::RED)?;
//! let shaders = GlslGenerator::default().generate(&position, &color)?;
//! ```

pub mod config;
pub mod dependence;
pub mod glsl;
pub mod object;
pub mod ops;

pub use self::object::{merge_origin, transform, union, Literal, Origin, ShaderObject, ShaderType, Stage};

pub mod prelude {
    pub use super::config::{Action, Operation, ShaderConfiguration, UniformVariable};
    pub use super::dependence::prelude::*;
    pub use super::glsl::{GeneratedShaders, GeneratedStage, GeneratorOptions, GlslGenerator};
    pub use super::object::{Literal, Origin, ShaderObject, ShaderType, Stage};
}
