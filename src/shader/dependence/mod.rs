//! Descriptors of the external inputs a shader expression relies on.
//!
//! Every descriptor knows how to declare itself in the generated sources
//! (headers, helper functions, body code) and how to drive the backend
//! (one-time configuration and per-draw operations). Descriptors are shared
//! between expressions with `Rc`, and collapse by `DependenceKey` when the
//! generator assembles a program.

pub mod attribute;
pub mod noise;
pub mod output;
pub mod screen;
pub mod texture;
pub mod uniform;
pub mod variable;

pub mod prelude {
    pub use super::attribute::AttributeDependence;
    pub use super::noise::{FbmFunction, NoiseFunction, RandFunction};
    pub use super::output::OutputDependence;
    pub use super::screen::{Clock, ScreenDependence, TimeDependence};
    pub use super::texture::TextureDependence;
    pub use super::uniform::{UniformDependence, UniformSlot};
    pub use super::variable::VariableDependence;
    pub use super::{Dependence, DependenceKey, Dependencies, Requirements, ShaderDependence};
}

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::errors::*;
use crate::utils::hash::hash64;

use super::config::Operation;
use super::object::Stage;

pub type Dependence = Rc<dyn ShaderDependence>;
pub type Requirements = SmallVec<[Dependence; 4]>;

/// The neutral ordering key, which keeps dependencies in discovery order.
pub const NEUTRAL_ORDER: i32 = 0;

/// Identity of the logical input a descriptor stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependenceKey {
    kind: &'static str,
    name: String,
}

impl DependenceKey {
    pub fn new<T: Into<String>>(kind: &'static str, name: T) -> Self {
        DependenceKey {
            kind,
            name: name.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DependenceKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// A single external input or contribution to the generated code. Every
/// contribution is optional.
pub trait ShaderDependence: fmt::Debug {
    fn key(&self) -> DependenceKey;

    /// Digest of what this descriptor reads from. Two descriptors sharing a
    /// key must share the fingerprint too, otherwise they are different
    /// inputs using the same name.
    fn fingerprint(&self) -> u64 {
        hash64(&self.key())
    }

    /// Stable sorting key of this dependency inside a stage.
    fn order(&self) -> i32 {
        NEUTRAL_ORDER
    }

    /// Header line emitted in every stage using this dependency.
    fn header(&self) -> Option<String> {
        None
    }

    fn stage_header(&self, _: Stage) -> Option<String> {
        None
    }

    /// Helper functions, emitted before `main`.
    fn functions(&self) -> Option<String> {
        None
    }

    fn code(&self, _: Stage) -> Option<String> {
        None
    }

    /// Code emitted right before the closing brace of `main`.
    fn final_code(&self, _: Stage) -> Option<String> {
        None
    }

    /// Executed once per program, before the first draw.
    fn configuration(&self) -> Option<Operation> {
        None
    }

    /// Executed before every draw.
    fn operation(&self) -> Option<Operation> {
        None
    }

    /// Further dependencies this one can not be emitted without.
    fn requires(&self) -> Requirements {
        Requirements::new()
    }

    fn as_output(&self) -> Option<&output::OutputDependence> {
        None
    }

    fn as_attribute(&self) -> Option<&attribute::AttributeDependence> {
        None
    }
}

/// An insertion-ordered set of dependencies, unique by `DependenceKey`.
#[derive(Debug, Clone, Default)]
pub struct Dependencies(Vec<Dependence>);

impl Dependencies {
    pub fn new() -> Self {
        Default::default()
    }

    /// A set holding `dep` only.
    pub fn single(dep: Dependence) -> Self {
        Dependencies(vec![dep])
    }

    /// Inserts `dep` unless an equal one is present already. Returns true if
    /// it has been inserted.
    ///
    /// Fails if a dependency with the same key but a different fingerprint
    /// is present.
    pub fn insert(&mut self, dep: Dependence) -> Result<bool> {
        let key = dep.key();
        match self.0.iter().find(|v| v.key() == key) {
            Some(v) => {
                ensure_same_input(&key, v.fingerprint(), dep.fingerprint())?;
                Ok(false)
            }
            None => {
                self.0.push(dep);
                Ok(true)
            }
        }
    }

    pub fn extend<'a, T>(&mut self, iter: T) -> Result<()>
    where
        T: IntoIterator<Item = &'a Dependence>,
    {
        for v in iter {
            self.insert(v.clone())?;
        }

        Ok(())
    }

    pub fn contains(&self, key: &DependenceKey) -> bool {
        self.0.iter().any(|v| v.key() == *key)
    }

    /// Returns true if any dependency is of `kind`, e.g. `"texture"`.
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.0.iter().any(|v| v.key().kind() == kind)
    }

    pub fn keys(&self) -> Vec<DependenceKey> {
        self.0.iter().map(|v| v.key()).collect()
    }

    #[inline]
    pub fn iter(&self) -> ::std::slice::Iter<Dependence> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Dependencies {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(&v.key()))
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependence;
    type IntoIter = ::std::slice::Iter<'a, Dependence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Fails unless two descriptors with `key` read from the same input.
pub(crate) fn ensure_same_input(key: &DependenceKey, lhs: u64, rhs: u64) -> Result<()> {
    if lhs == rhs {
        Ok(())
    } else {
        Err(Error::InvalidExpression(format!(
            "`{}` refers to two different inputs",
            key
        )))
    }
}

/// Returns true if `name` can be used as a GLSL identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    !name.starts_with("gl_") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod test {
    use super::prelude::*;
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("offset"));
        assert!(is_identifier("_tint2"));
        assert!(!is_identifier("2tint"));
        assert!(!is_identifier("gl_Position"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn dedup() {
        let mut deps = Dependencies::new();
        assert!(deps.insert(Rc::new(ScreenDependence::width())).unwrap());
        assert!(!deps.insert(Rc::new(ScreenDependence::width())).unwrap());
        assert!(deps.insert(Rc::new(ScreenDependence::height())).unwrap());
        assert_eq!(deps.len(), 2);
        assert!(deps.contains_kind("uniform"));
        assert!(!deps.contains_kind("texture"));
    }

    #[test]
    fn same_name_different_inputs() {
        let a = UniformSlot::new(1.0f32);
        let b = UniformSlot::new(1.0f32);

        let mut deps = Dependencies::new();
        deps.insert(Rc::new(UniformDependence::new("tint", a.clone()).unwrap()))
            .unwrap();
        assert!(!deps
            .insert(Rc::new(UniformDependence::new("tint", a).unwrap()))
            .unwrap());

        match deps.insert(Rc::new(UniformDependence::new("tint", b).unwrap())) {
            Err(Error::InvalidExpression(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(deps.len(), 1);
    }
}
