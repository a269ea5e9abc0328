//! The OpenGL backend, built on the function pointers of the `gl` crate.

pub mod capabilities;
pub mod types;
pub mod visitor;

pub use self::visitor::GLVisitor;
