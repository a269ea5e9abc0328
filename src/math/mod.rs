//! This module contains the math utils, most of them come from `cgmath`.

pub mod color;

pub mod prelude {
    pub use super::color::Color;
    pub use cgmath::{Vector2, Vector3, Vector4};
}
