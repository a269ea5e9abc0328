use std::rc::Rc;

use crate::errors::*;

use super::super::object::{self, ShaderObject, ShaderType};
use super::{DependenceKey, Requirements, ShaderDependence};

const RAND: &str = "float rand(vec2 co) {
    return fract(sin(dot(co, vec2(12.9898, 78.233))) * 43758.5453);
}";

const NOISE: &str = "float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    vec2 u = f * f * (3.0 - 2.0 * f);
    float a = rand(i);
    float b = rand(i + vec2(1.0, 0.0));
    float c = rand(i + vec2(0.0, 1.0));
    float d = rand(i + vec2(1.0, 1.0));
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}";

const FBM: &str = "float fbm(vec2 p) {
    float value = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < 6; i++) {
        value += amplitude * noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}";

/// Pseudo random value in `[0, 1)` derived from a `vec2` seed.
#[derive(Debug, Default)]
pub struct RandFunction;

impl ShaderDependence for RandFunction {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("function", "rand")
    }

    fn functions(&self) -> Option<String> {
        Some(RAND.to_owned())
    }
}

/// Smooth value noise, built on top of `rand`.
#[derive(Debug, Default)]
pub struct NoiseFunction;

impl ShaderDependence for NoiseFunction {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("function", "noise")
    }

    fn functions(&self) -> Option<String> {
        Some(NOISE.to_owned())
    }

    fn requires(&self) -> Requirements {
        let mut v = Requirements::new();
        v.push(Rc::new(RandFunction));
        v
    }
}

/// Fractal brownian motion, six octaves of `noise`.
#[derive(Debug, Default)]
pub struct FbmFunction;

impl ShaderDependence for FbmFunction {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("function", "fbm")
    }

    fn functions(&self) -> Option<String> {
        Some(FBM.to_owned())
    }

    fn requires(&self) -> Requirements {
        let mut v = Requirements::new();
        v.push(Rc::new(NoiseFunction));
        v
    }
}

fn seeded(name: &'static str, seed: &ShaderObject) -> Result<ShaderObject> {
    if seed.kind() != ShaderType::Vec2 {
        return Err(Error::TypeMismatch {
            operation: name,
            lhs: seed.kind(),
            rhs: ShaderType::Vec2,
        });
    }

    object::transform(ShaderType::Float, &format!("{}({{0}})", name), seed)
}

impl ShaderObject {
    pub fn rand(&self) -> Result<ShaderObject> {
        seeded("rand", self)?.depend(Rc::new(RandFunction))
    }

    pub fn noise(&self) -> Result<ShaderObject> {
        seeded("noise", self)?.depend(Rc::new(NoiseFunction))
    }

    pub fn fbm(&self) -> Result<ShaderObject> {
        seeded("fbm", self)?.depend(Rc::new(FbmFunction))
    }
}
