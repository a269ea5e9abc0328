//! Immutable, typed GLSL sub-expressions and the combinators building them.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::errors::*;
use crate::math::prelude::{Color, Vector2, Vector3, Vector4};

use super::dependence::output::OutputDependence;
use super::dependence::{Dependence, Dependencies};

/// The GLSL types a `ShaderObject` can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Bool,
    Sampler2D,
}

impl ShaderType {
    /// The number of components addressable with swizzles or indices.
    pub fn components(self) -> usize {
        match self {
            ShaderType::Float | ShaderType::Bool | ShaderType::Sampler2D => 1,
            ShaderType::Vec2 => 2,
            ShaderType::Vec3 => 3,
            ShaderType::Vec4 => 4,
        }
    }

    /// The float type with `components` components.
    pub fn numeric(components: usize) -> Option<ShaderType> {
        match components {
            1 => Some(ShaderType::Float),
            2 => Some(ShaderType::Vec2),
            3 => Some(ShaderType::Vec3),
            4 => Some(ShaderType::Vec4),
            _ => None,
        }
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        match self {
            ShaderType::Bool | ShaderType::Sampler2D => false,
            _ => true,
        }
    }

    #[inline]
    pub fn is_vector(self) -> bool {
        self.is_numeric() && self != ShaderType::Float
    }

    pub fn glsl(self) -> &'static str {
        match self {
            ShaderType::Float => "float",
            ShaderType::Vec2 => "vec2",
            ShaderType::Vec3 => "vec3",
            ShaderType::Vec4 => "vec4",
            ShaderType::Bool => "bool",
            ShaderType::Sampler2D => "sampler2D",
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.glsl())
    }
}

/// The program stages we generate code for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }
}

/// The stage an expression has to be evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Valid in any stage.
    Global,
    Vertex,
    Fragment,
}

impl Origin {
    /// Returns true if an expression with this origin can be evaluated in `stage`.
    pub fn is_available_in(self, stage: Stage) -> bool {
        match (self, stage) {
            (Origin::Global, _) => true,
            (Origin::Vertex, Stage::Vertex) => true,
            (Origin::Fragment, Stage::Fragment) => true,
            _ => false,
        }
    }
}

/// A typed GLSL sub-expression, the stage it belongs to and the external
/// inputs it needs.
#[derive(Debug, Clone)]
pub struct ShaderObject {
    kind: ShaderType,
    expression: Rc<str>,
    origin: Origin,
    dependencies: Dependencies,
}

impl ShaderObject {
    /// Creates an object from raw GLSL text. The caller is responsible for
    /// listing every dependency `expression` refers to.
    pub fn new<T: Into<String>>(
        kind: ShaderType,
        expression: T,
        origin: Origin,
        dependencies: Dependencies,
    ) -> Self {
        let expression: String = expression.into();
        ShaderObject {
            kind,
            expression: expression.into(),
            origin,
            dependencies,
        }
    }

    /// Wraps a literal value as a stage-agnostic object.
    pub fn literal<T: Literal>(value: T) -> Result<Self> {
        let (kind, expression) = value.glsl()?;
        Ok(ShaderObject::new(
            kind,
            expression,
            Origin::Global,
            Dependencies::new(),
        ))
    }

    /// Wraps a dynamically sized list of floats as a `float` or `vecN` literal.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let kind = ShaderType::numeric(values.len()).ok_or_else(|| {
            Error::InvalidExpression(format!(
                "{} components can not be represented by a shader type",
                values.len()
            ))
        })?;

        let expression = if kind == ShaderType::Float {
            format_float(values[0])?
        } else {
            format_vector(kind, values)?
        };

        Ok(ShaderObject::new(
            kind,
            expression,
            Origin::Global,
            Dependencies::new(),
        ))
    }

    #[inline]
    pub fn kind(&self) -> ShaderType {
        self.kind
    }

    #[inline]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    #[inline]
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Returns the same expression with `dep` attached.
    pub fn depend(mut self, dep: Dependence) -> Result<Self> {
        self.dependencies.insert(dep)?;
        Ok(self)
    }
}

impl fmt::Display for ShaderObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Builds a new object of `kind` from `operands`. `template` refers to the
/// operands positionally, e.g. `"({0} + {1})"`.
///
/// The result belongs to the fragment stage if any operand does, otherwise to
/// the vertex stage if any operand does. When vertex and fragment operands
/// are mixed, every vertex operand is replaced by a cross-stage output first,
/// so its value gets computed once per vertex and interpolated.
pub fn union(kind: ShaderType, template: &str, operands: &[&ShaderObject]) -> Result<ShaderObject> {
    let has_vertex = operands.iter().any(|v| v.origin == Origin::Vertex);
    let has_fragment = operands.iter().any(|v| v.origin == Origin::Fragment);

    let mut promoted: Vec<Cow<ShaderObject>> = Vec::with_capacity(operands.len());
    for &v in operands {
        if has_vertex && has_fragment && v.origin == Origin::Vertex {
            promoted.push(Cow::Owned(promote(v)?));
        } else {
            promoted.push(Cow::Borrowed(v));
        }
    }

    let operands = promoted;

    let origin = if has_fragment {
        Origin::Fragment
    } else if has_vertex {
        Origin::Vertex
    } else {
        Origin::Global
    };

    let mut dependencies = Dependencies::new();
    for v in &operands {
        dependencies.extend(&v.dependencies)?;
    }

    let args: Vec<&str> = operands.iter().map(|v| v.expression()).collect();
    let expression = render(template, &args)?;
    Ok(ShaderObject::new(kind, expression, origin, dependencies))
}

/// Builds a projection of `source`, like a swizzle or an index access. The
/// dependencies and the origin are kept unchanged.
pub fn transform(kind: ShaderType, template: &str, source: &ShaderObject) -> Result<ShaderObject> {
    let expression = render(template, &[source.expression()])?;
    Ok(ShaderObject {
        kind,
        expression: expression.into(),
        origin: source.origin,
        dependencies: source.dependencies.clone(),
    })
}

/// Makes `object` usable from a context of `origin`. Vertex objects used in
/// the fragment stage are passed through a cross-stage output.
pub fn merge_origin(object: &ShaderObject, origin: Origin) -> Result<ShaderObject> {
    if object.origin == Origin::Vertex && origin == Origin::Fragment {
        promote(object)
    } else {
        Ok(object.clone())
    }
}

fn promote(object: &ShaderObject) -> Result<ShaderObject> {
    let output = OutputDependence::new(object.clone())?;
    let expression = output.reference();
    let dependencies = Dependencies::single(Rc::new(output));
    Ok(ShaderObject::new(object.kind, expression, Origin::Fragment, dependencies))
}

/// Substitutes `{N}` placeholders with `args[N]`.
pub(crate) fn render(template: &str, args: &[&str]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + args.iter().map(|v| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(begin) = rest.find('{') {
        out.push_str(&rest[..begin]);
        let tail = &rest[begin + 1..];
        let end = tail.find('}').ok_or_else(|| {
            Error::InvalidExpression(format!("unclosed placeholder in `{}`", template))
        })?;

        let index: usize = tail[..end].parse().map_err(|_| {
            Error::InvalidExpression(format!("malformed placeholder in `{}`", template))
        })?;

        let arg = args.get(index).ok_or_else(|| {
            Error::InvalidExpression(format!(
                "placeholder {{{}}} in `{}` has no operand",
                index, template
            ))
        })?;

        out.push_str(arg);
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Formats `v` as a GLSL float literal. `Debug` formatting is locale
/// independent and always keeps a fractional part or an exponent.
pub(crate) fn format_float(v: f32) -> Result<String> {
    if !v.is_finite() {
        return Err(Error::InvalidExpression(format!(
            "{} is not a finite number",
            v
        )));
    }

    if v.is_sign_negative() {
        Ok(format!("({:?})", v))
    } else {
        Ok(format!("{:?}", v))
    }
}

fn format_vector(kind: ShaderType, values: &[f32]) -> Result<String> {
    let mut parts = Vec::with_capacity(values.len());
    for &v in values {
        parts.push(format_float(v)?);
    }

    Ok(format!("{}({})", kind.glsl(), parts.join(", ")))
}

/// Host values that can be turned into shader literals.
pub trait Literal {
    fn glsl(self) -> Result<(ShaderType, String)>;
}

impl Literal for f32 {
    fn glsl(self) -> Result<(ShaderType, String)> {
        Ok((ShaderType::Float, format_float(self)?))
    }
}

impl Literal for bool {
    fn glsl(self) -> Result<(ShaderType, String)> {
        Ok((ShaderType::Bool, if self { "true" } else { "false" }.to_owned()))
    }
}

impl Literal for [f32; 2] {
    fn glsl(self) -> Result<(ShaderType, String)> {
        Ok((ShaderType::Vec2, format_vector(ShaderType::Vec2, &self)?))
    }
}

impl Literal for [f32; 3] {
    fn glsl(self) -> Result<(ShaderType, String)> {
        Ok((ShaderType::Vec3, format_vector(ShaderType::Vec3, &self)?))
    }
}

impl Literal for [f32; 4] {
    fn glsl(self) -> Result<(ShaderType, String)> {
        Ok((ShaderType::Vec4, format_vector(ShaderType::Vec4, &self)?))
    }
}

impl Literal for (f32, f32) {
    fn glsl(self) -> Result<(ShaderType, String)> {
        [self.0, self.1].glsl()
    }
}

impl Literal for (f32, f32, f32) {
    fn glsl(self) -> Result<(ShaderType, String)> {
        [self.0, self.1, self.2].glsl()
    }
}

impl Literal for (f32, f32, f32, f32) {
    fn glsl(self) -> Result<(ShaderType, String)> {
        [self.0, self.1, self.2, self.3].glsl()
    }
}

impl Literal for Vector2<f32> {
    fn glsl(self) -> Result<(ShaderType, String)> {
        [self.x, self.y].glsl()
    }
}

impl Literal for Vector3<f32> {
    fn glsl(self) -> Result<(ShaderType, String)> {
        [self.x, self.y, self.z].glsl()
    }
}

impl Literal for Vector4<f32> {
    fn glsl(self) -> Result<(ShaderType, String)> {
        [self.x, self.y, self.z, self.w].glsl()
    }
}

impl Literal for Color {
    fn glsl(self) -> Result<(ShaderType, String)> {
        self.rgba_array().glsl()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literals() {
        let v = ShaderObject::literal(1.0f32).unwrap();
        assert_eq!(v.expression(), "1.0");
        assert_eq!(v.kind(), ShaderType::Float);
        assert_eq!(v.origin(), Origin::Global);
        assert!(v.dependencies().is_empty());

        let v = ShaderObject::literal((0.5f32, -2.0f32)).unwrap();
        assert_eq!(v.expression(), "vec2(0.5, (-2.0))");

        let v = ShaderObject::literal(Color::RED).unwrap();
        assert_eq!(v.expression(), "vec4(1.0, 0.0, 0.0, 1.0)");

        let v = ShaderObject::literal(true).unwrap();
        assert_eq!(v.kind(), ShaderType::Bool);
    }

    #[test]
    fn invalid_literals() {
        match ShaderObject::literal(::std::f32::NAN) {
            Err(Error::InvalidExpression(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        match ShaderObject::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]) {
            Err(Error::InvalidExpression(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert!(ShaderObject::from_slice(&[]).is_err());
        assert_eq!(
            ShaderObject::from_slice(&[0.25, 1.0, 0.0]).unwrap().kind(),
            ShaderType::Vec3
        );
    }

    #[test]
    fn templates() {
        assert_eq!(render("({0} + {1})", &["a", "b"]).unwrap(), "(a + b)");
        assert_eq!(render("{0}.x", &["v"]).unwrap(), "v.x");
        assert_eq!(render("{1}{0}{1}", &["a", "b"]).unwrap(), "bab");
        assert!(render("{2}", &["a"]).is_err());
        assert!(render("{x}", &["a"]).is_err());
        assert!(render("{0", &["a"]).is_err());
    }

    #[test]
    fn stages() {
        assert!(Origin::Global.is_available_in(Stage::Vertex));
        assert!(Origin::Global.is_available_in(Stage::Fragment));
        assert!(!Origin::Vertex.is_available_in(Stage::Fragment));
        assert!(!Origin::Fragment.is_available_in(Stage::Vertex));
    }
}
