use crate::shader::ShaderType;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(
        display = "Color channel {} must be within [0, 1], but got {}.",
        channel, value
    )]
    ColorOutOfRange { channel: &'static str, value: f32 },
    #[fail(display = "Invalid shader expression: {}.", _0)]
    InvalidExpression(String),
    #[fail(
        display = "Operation `{}` can not combine {:?} with {:?}.",
        operation, lhs, rhs
    )]
    TypeMismatch {
        operation: &'static str,
        lhs: ShaderType,
        rhs: ShaderType,
    },
    #[fail(
        display = "Index {} is out of bounds for {:?} with {} components.",
        index, kind, components
    )]
    IndexOutOfBounds {
        index: usize,
        kind: ShaderType,
        components: usize,
    },
    #[fail(display = "Dependence {} is required but missing.", _0)]
    MissingDependence(String),
    #[fail(display = "Dependence {} requires itself transitively.", _0)]
    DependenceCycle(String),
    #[fail(display = "Expression can not be evaluated in the {} stage: {}.", stage, expression)]
    StageMismatch {
        stage: &'static str,
        expression: String,
    },
    #[fail(display = "Trying to update immutable buffered data.")]
    Immutable,
    #[fail(display = "Buffered data is not a geometry, can not draw it as {}.", _0)]
    NotGeometry(&'static str),
    #[fail(display = "Invalid shape: {}.", _0)]
    InvalidShape(String),
    #[fail(display = "Change [{}, {}) must start before it ends.", start, end)]
    InvalidChange { start: usize, end: usize },
    #[fail(display = "Index {} is out of bounds for buffered data of length {}.", index, len)]
    OutOfBounds { index: usize, len: usize },
    #[fail(display = "{} is invalid.", _0)]
    HandleInvalid(String),
    #[fail(display = "Failed to create shader, errors: \n{}.", _0)]
    ShaderCreationFailure(String),
    #[fail(display = "Invalid options: {}.", _0)]
    InvalidOptions(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
