//! Arithmetic, comparisons, projections and built-in functions over
//! `ShaderObject`s.
//!
//! Operators return `Result<ShaderObject>`, since the component counts of the
//! operands are only known at runtime.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::*;

use super::object::{self, Origin, ShaderObject, ShaderType};
use super::dependence::Dependencies;

/// The result type of a component-wise operation, allowing scalar broadcast.
fn componentwise(operation: &'static str, lhs: ShaderType, rhs: ShaderType) -> Result<ShaderType> {
    match (lhs, rhs) {
        (a, b) if a == b && a.is_numeric() => Ok(a),
        (ShaderType::Float, v) if v.is_vector() => Ok(v),
        (v, ShaderType::Float) if v.is_vector() => Ok(v),
        _ => Err(Error::TypeMismatch { operation, lhs, rhs }),
    }
}

fn same(operation: &'static str, lhs: ShaderType, rhs: ShaderType) -> Result<ShaderType> {
    if lhs == rhs && lhs.is_numeric() {
        Ok(lhs)
    } else {
        Err(Error::TypeMismatch { operation, lhs, rhs })
    }
}

fn numeric(operation: &'static str, v: &ShaderObject) -> Result<()> {
    if v.kind().is_numeric() {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            operation,
            lhs: v.kind(),
            rhs: ShaderType::Float,
        })
    }
}

fn binary(
    operation: &'static str,
    symbol: &str,
    lhs: &ShaderObject,
    rhs: &ShaderObject,
) -> Result<ShaderObject> {
    let kind = componentwise(operation, lhs.kind(), rhs.kind())?;
    object::union(kind, &format!("({{0}} {} {{1}})", symbol), &[lhs, rhs])
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $symbol:expr) => {
        impl<'a, 'b> $trait<&'b ShaderObject> for &'a ShaderObject {
            type Output = Result<ShaderObject>;

            fn $method(self, rhs: &'b ShaderObject) -> Self::Output {
                binary(stringify!($method), $symbol, self, rhs)
            }
        }

        impl $trait<ShaderObject> for ShaderObject {
            type Output = Result<ShaderObject>;

            fn $method(self, rhs: ShaderObject) -> Self::Output {
                binary(stringify!($method), $symbol, &self, &rhs)
            }
        }

        impl<'a> $trait<f32> for &'a ShaderObject {
            type Output = Result<ShaderObject>;

            fn $method(self, rhs: f32) -> Self::Output {
                let rhs = ShaderObject::literal(rhs)?;
                binary(stringify!($method), $symbol, self, &rhs)
            }
        }

        impl $trait<f32> for ShaderObject {
            type Output = Result<ShaderObject>;

            fn $method(self, rhs: f32) -> Self::Output {
                let rhs = ShaderObject::literal(rhs)?;
                binary(stringify!($method), $symbol, &self, &rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, "+");
impl_binary_operator!(Sub, sub, "-");
impl_binary_operator!(Mul, mul, "*");
impl_binary_operator!(Div, div, "/");

impl<'a> Neg for &'a ShaderObject {
    type Output = Result<ShaderObject>;

    fn neg(self) -> Self::Output {
        numeric("neg", self)?;
        object::transform(self.kind(), "(-{0})", self)
    }
}

impl Neg for ShaderObject {
    type Output = Result<ShaderObject>;

    fn neg(self) -> Self::Output {
        -&self
    }
}

const SWIZZLE_SETS: [&str; 2] = ["xyzw", "rgba"];

impl ShaderObject {
    pub fn x(&self) -> Result<ShaderObject> {
        self.swizzle("x")
    }

    pub fn y(&self) -> Result<ShaderObject> {
        self.swizzle("y")
    }

    pub fn z(&self) -> Result<ShaderObject> {
        self.swizzle("z")
    }

    pub fn w(&self) -> Result<ShaderObject> {
        self.swizzle("w")
    }

    /// Projects the components named in `pattern`, e.g. `"xy"` or `"bgr"`.
    pub fn swizzle(&self, pattern: &str) -> Result<ShaderObject> {
        if !self.kind().is_vector() {
            return Err(Error::InvalidExpression(format!(
                "{} can not be swizzled",
                self.kind()
            )));
        }

        let kind = ShaderType::numeric(pattern.len()).ok_or_else(|| {
            Error::InvalidExpression(format!("swizzle `{}` has an invalid length", pattern))
        })?;

        let set = SWIZZLE_SETS
            .iter()
            .find(|set| pattern.chars().all(|c| set.contains(c)))
            .ok_or_else(|| {
                Error::InvalidExpression(format!("`{}` is not a valid swizzle", pattern))
            })?;

        for c in pattern.chars() {
            let index = set.find(c).unwrap_or(0);
            if index >= self.kind().components() {
                return Err(Error::IndexOutOfBounds {
                    index,
                    kind: self.kind(),
                    components: self.kind().components(),
                });
            }
        }

        object::transform(kind, &format!("{{0}}.{}", pattern), self)
    }

    /// Reads the `index`-th component of a vector.
    pub fn index(&self, index: usize) -> Result<ShaderObject> {
        if !self.kind().is_vector() || index >= self.kind().components() {
            return Err(Error::IndexOutOfBounds {
                index,
                kind: self.kind(),
                components: self.kind().components(),
            });
        }

        object::transform(ShaderType::Float, &format!("{{0}}[{}]", index), self)
    }

    /// Builds a `vecN` out of scalars and vectors, whose components add up to N.
    pub fn construct(kind: ShaderType, parts: &[&ShaderObject]) -> Result<ShaderObject> {
        if !kind.is_vector() {
            return Err(Error::InvalidExpression(format!(
                "{} can not be constructed from parts",
                kind
            )));
        }

        let mut components = 0;
        for v in parts {
            numeric("construct", v)?;
            components += v.kind().components();
        }

        if components != kind.components() {
            return Err(Error::InvalidExpression(format!(
                "{} needs {} components but got {}",
                kind,
                kind.components(),
                components
            )));
        }

        let args: Vec<String> = (0..parts.len()).map(|i| format!("{{{}}}", i)).collect();
        let template = format!("{}({})", kind.glsl(), args.join(", "));
        object::union(kind, &template, parts)
    }

    pub fn vec2(x: &ShaderObject, y: &ShaderObject) -> Result<ShaderObject> {
        ShaderObject::construct(ShaderType::Vec2, &[x, y])
    }

    pub fn vec3(x: &ShaderObject, y: &ShaderObject, z: &ShaderObject) -> Result<ShaderObject> {
        ShaderObject::construct(ShaderType::Vec3, &[x, y, z])
    }

    pub fn vec4(
        x: &ShaderObject,
        y: &ShaderObject,
        z: &ShaderObject,
        w: &ShaderObject,
    ) -> Result<ShaderObject> {
        ShaderObject::construct(ShaderType::Vec4, &[x, y, z, w])
    }

    /// Appends a scalar component, e.g. turns a `vec3` color into a `vec4`.
    pub fn extend(&self, last: &ShaderObject) -> Result<ShaderObject> {
        let kind = ShaderType::numeric(self.kind().components() + 1)
            .filter(|_| self.kind().is_numeric() && last.kind() == ShaderType::Float)
            .ok_or_else(|| Error::TypeMismatch {
                operation: "extend",
                lhs: self.kind(),
                rhs: last.kind(),
            })?;

        ShaderObject::construct(kind, &[self, last])
    }

    /// `gl_VertexID` as a float.
    pub fn vertex_id() -> ShaderObject {
        ShaderObject::new(
            ShaderType::Float,
            "float(gl_VertexID)",
            Origin::Vertex,
            Dependencies::new(),
        )
    }

    /// `gl_InstanceID` as a float.
    pub fn instance_id() -> ShaderObject {
        ShaderObject::new(
            ShaderType::Float,
            "float(gl_InstanceID)",
            Origin::Vertex,
            Dependencies::new(),
        )
    }

    /// Window relative coordinates of the current fragment.
    pub fn frag_coord() -> ShaderObject {
        ShaderObject::new(
            ShaderType::Vec4,
            "gl_FragCoord",
            Origin::Fragment,
            Dependencies::new(),
        )
    }
}

macro_rules! impl_unary_function {
    ($($name:ident),*) => {
        impl ShaderObject {
            $(
                pub fn $name(&self) -> Result<ShaderObject> {
                    numeric(stringify!($name), self)?;
                    object::transform(self.kind(), concat!(stringify!($name), "({0})"), self)
                }
            )*
        }
    };
}

impl_unary_function!(sin, cos, abs, fract, sqrt, floor, normalize);

impl ShaderObject {
    pub fn length(&self) -> Result<ShaderObject> {
        numeric("length", self)?;
        object::transform(ShaderType::Float, "length({0})", self)
    }

    pub fn distance(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        same("distance", self.kind(), rhs.kind())?;
        object::union(ShaderType::Float, "distance({0}, {1})", &[self, rhs])
    }

    pub fn dot(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        same("dot", self.kind(), rhs.kind())?;
        object::union(ShaderType::Float, "dot({0}, {1})", &[self, rhs])
    }

    pub fn min(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        let kind = componentwise("min", self.kind(), rhs.kind())?;
        object::union(kind, "min({0}, {1})", &[self, rhs])
    }

    pub fn max(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        let kind = componentwise("max", self.kind(), rhs.kind())?;
        object::union(kind, "max({0}, {1})", &[self, rhs])
    }

    pub fn step(&self, edge: &ShaderObject) -> Result<ShaderObject> {
        let kind = componentwise("step", self.kind(), edge.kind())?;
        object::union(kind, "step({1}, {0})", &[self, edge])
    }

    /// Linear blend of `self` and `other` by `t`, a scalar or a vector of the same size.
    pub fn mix(&self, other: &ShaderObject, t: &ShaderObject) -> Result<ShaderObject> {
        let kind = same("mix", self.kind(), other.kind())?;
        if t.kind() != ShaderType::Float {
            same("mix", kind, t.kind())?;
        }

        object::union(kind, "mix({0}, {1}, {2})", &[self, other, t])
    }

    pub fn clamp(&self, lo: &ShaderObject, hi: &ShaderObject) -> Result<ShaderObject> {
        let kind = componentwise("clamp", self.kind(), lo.kind())?;
        componentwise("clamp", kind, hi.kind())?;
        object::union(kind, "clamp({0}, {1}, {2})", &[self, lo, hi])
    }

    pub fn smoothstep(&self, lo: &ShaderObject, hi: &ShaderObject) -> Result<ShaderObject> {
        let kind = componentwise("smoothstep", self.kind(), lo.kind())?;
        componentwise("smoothstep", kind, hi.kind())?;
        object::union(kind, "smoothstep({1}, {2}, {0})", &[self, lo, hi])
    }
}

fn comparison(
    operation: &'static str,
    symbol: &str,
    lhs: &ShaderObject,
    rhs: &ShaderObject,
) -> Result<ShaderObject> {
    if lhs.kind() != ShaderType::Float || rhs.kind() != ShaderType::Float {
        return Err(Error::TypeMismatch {
            operation,
            lhs: lhs.kind(),
            rhs: rhs.kind(),
        });
    }

    object::union(
        ShaderType::Bool,
        &format!("({{0}} {} {{1}})", symbol),
        &[lhs, rhs],
    )
}

fn logical(
    operation: &'static str,
    symbol: &str,
    lhs: &ShaderObject,
    rhs: &ShaderObject,
) -> Result<ShaderObject> {
    if lhs.kind() != ShaderType::Bool || rhs.kind() != ShaderType::Bool {
        return Err(Error::TypeMismatch {
            operation,
            lhs: lhs.kind(),
            rhs: rhs.kind(),
        });
    }

    object::union(
        ShaderType::Bool,
        &format!("({{0}} {} {{1}})", symbol),
        &[lhs, rhs],
    )
}

impl ShaderObject {
    pub fn lt(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        comparison("lt", "<", self, rhs)
    }

    pub fn le(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        comparison("le", "<=", self, rhs)
    }

    pub fn gt(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        comparison("gt", ">", self, rhs)
    }

    pub fn ge(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        comparison("ge", ">=", self, rhs)
    }

    pub fn equal(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        comparison("equal", "==", self, rhs)
    }

    pub fn not_equal(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        comparison("not_equal", "!=", self, rhs)
    }

    pub fn and(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        logical("and", "&&", self, rhs)
    }

    pub fn or(&self, rhs: &ShaderObject) -> Result<ShaderObject> {
        logical("or", "||", self, rhs)
    }

    pub fn not(&self) -> Result<ShaderObject> {
        if self.kind() != ShaderType::Bool {
            return Err(Error::TypeMismatch {
                operation: "not",
                lhs: self.kind(),
                rhs: ShaderType::Bool,
            });
        }

        object::transform(ShaderType::Bool, "(!{0})", self)
    }

    /// `self ? a : b`.
    pub fn select(&self, a: &ShaderObject, b: &ShaderObject) -> Result<ShaderObject> {
        if self.kind() != ShaderType::Bool {
            return Err(Error::TypeMismatch {
                operation: "select",
                lhs: self.kind(),
                rhs: ShaderType::Bool,
            });
        }

        if a.kind() != b.kind() {
            return Err(Error::TypeMismatch {
                operation: "select",
                lhs: a.kind(),
                rhs: b.kind(),
            });
        }

        object::union(a.kind(), "({0} ? {1} : {2})", &[self, a, b])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn float(v: f32) -> ShaderObject {
        ShaderObject::literal(v).unwrap()
    }

    #[test]
    fn arithmetic() {
        let a = ShaderObject::literal([1.0f32, 2.0]).unwrap();
        let b = float(0.5);

        let v = (&a * &b).unwrap();
        assert_eq!(v.kind(), ShaderType::Vec2);
        assert_eq!(v.expression(), "(vec2(1.0, 2.0) * 0.5)");

        let v = (&b - 1.0).unwrap();
        assert_eq!(v.expression(), "(0.5 - 1.0)");

        let v = (-&b).unwrap();
        assert_eq!(v.expression(), "(-0.5)");

        let c = ShaderObject::literal([1.0f32, 2.0, 3.0]).unwrap();
        match &a + &c {
            Err(Error::TypeMismatch { lhs, rhs, .. }) => {
                assert_eq!(lhs, ShaderType::Vec2);
                assert_eq!(rhs, ShaderType::Vec3);
            }
            other => panic!("unexpected {:?}", other),
        }

        let flag = ShaderObject::literal(true).unwrap();
        assert!((&flag + &b).is_err());
        assert!((-&flag).is_err());
    }

    #[test]
    fn projections() {
        let v = ShaderObject::literal([1.0f32, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(v.x().unwrap().kind(), ShaderType::Float);
        assert_eq!(v.swizzle("xy").unwrap().kind(), ShaderType::Vec2);
        assert_eq!(v.swizzle("bgr").unwrap().expression(), "vec4(1.0, 2.0, 3.0, 4.0).bgr");
        assert_eq!(v.index(3).unwrap().expression(), "vec4(1.0, 2.0, 3.0, 4.0)[3]");

        match v.index(4) {
            Err(Error::IndexOutOfBounds {
                index, components, ..
            }) => {
                assert_eq!(index, 4);
                assert_eq!(components, 4);
            }
            other => panic!("unexpected {:?}", other),
        }

        let v2 = ShaderObject::literal([1.0f32, 2.0]).unwrap();
        match v2.z() {
            Err(Error::IndexOutOfBounds { index, .. }) => assert_eq!(index, 2),
            other => panic!("unexpected {:?}", other),
        }

        assert!(v.swizzle("xg").is_err());
        assert!(v.swizzle("xyzwx").is_err());
        assert!(float(1.0).x().is_err());
    }

    #[test]
    fn projections_keep_origin() {
        let p = ShaderObject::position();
        let x = p.x().unwrap();
        assert_eq!(x.origin(), Origin::Vertex);
        assert_eq!(x.dependencies(), p.dependencies());
    }

    #[test]
    fn constructors() {
        let xy = ShaderObject::literal([1.0f32, 2.0]).unwrap();
        let v = ShaderObject::construct(ShaderType::Vec4, &[&xy, &float(0.0), &float(1.0)]).unwrap();
        assert_eq!(v.expression(), "vec4(vec2(1.0, 2.0), 0.0, 1.0)");

        assert!(ShaderObject::construct(ShaderType::Vec4, &[&xy, &float(0.0)]).is_err());
        assert_eq!(ShaderObject::position().extend(&float(1.0)).unwrap().kind(), ShaderType::Vec4);

        let rgba = ShaderObject::literal([0.0f32, 0.0, 0.0, 0.0]).unwrap();
        assert!(rgba.extend(&float(1.0)).is_err());
    }

    #[test]
    fn functions() {
        let v = ShaderObject::literal([3.0f32, 4.0]).unwrap();
        assert_eq!(v.length().unwrap().kind(), ShaderType::Float);
        assert_eq!(v.sin().unwrap().kind(), ShaderType::Vec2);
        assert_eq!(v.dot(&v).unwrap().kind(), ShaderType::Float);
        assert_eq!(
            v.mix(&v, &float(0.5)).unwrap().expression(),
            "mix(vec2(3.0, 4.0), vec2(3.0, 4.0), 0.5)"
        );
        assert_eq!(
            float(0.2).smoothstep(&float(0.0), &float(1.0)).unwrap().expression(),
            "smoothstep(0.0, 1.0, 0.2)"
        );
        assert!(v.distance(&float(1.0)).is_err());
    }

    #[test]
    fn logic() {
        let a = float(1.0);
        let b = float(2.0);
        let cond = a.lt(&b).unwrap();
        assert_eq!(cond.kind(), ShaderType::Bool);

        let both = cond.and(&b.ge(&a).unwrap()).unwrap();
        assert_eq!(both.expression(), "((1.0 < 2.0) && (2.0 >= 1.0))");

        let picked = both.not().unwrap().select(&a, &b).unwrap();
        assert_eq!(picked.kind(), ShaderType::Float);

        let v = ShaderObject::literal([1.0f32, 2.0]).unwrap();
        assert!(v.lt(&v).is_err());
        assert!(cond.select(&a, &v).is_err());
        assert!(a.not().is_err());
    }
}
