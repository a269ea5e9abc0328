//! # Tincture
//!
//! Tincture builds shaders out of typed expression objects at runtime. Every
//! `ShaderObject` carries the GLSL fragment that computes it, the stage it can
//! be evaluated in, and the declarations it depends on. The `GlslGenerator`
//! assembles a vertex and fragment program from a position and a color
//! expression, and the `RenderContext` draws buffered geometry with it.
//!
//! ```rust,ignore
//! use tincture::prelude::*;
//!
//! let mut ctx = RenderContext::headless(RenderParams::default())?;
//! let points = BufferData::from_values(3, &[0.0, 0.0, 0.0, 10.0, 10.0, 0.0])?.into_geometry();
//!
//! let position = ShaderObject::position();
//! let color = ShaderObject::literal(Color::rgb(1.0, 0.0, 0.0)?)?;
//!
//! let pipeline = ctx.create_pipeline(&position, &color)?;
//! ctx.draw(&pipeline, &points, DrawMode::Points)?;
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
extern crate cgmath;
extern crate serde_json;
extern crate smallvec;

#[cfg(not(target_arch = "wasm32"))]
extern crate gl;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;

pub mod buffer;
pub mod shader;
pub mod video;

pub mod prelude {
    pub use crate::buffer::prelude::*;
    pub use crate::errors::*;
    pub use crate::math::prelude::*;
    pub use crate::shader::prelude::*;
    pub use crate::utils::prelude::*;
    pub use crate::video::prelude::*;
}
