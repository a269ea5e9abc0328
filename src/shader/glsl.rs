//! Assembles complete GLSL programs out of a position and a color expression.
//!
//! The generator walks the dependency graphs of both expressions, closes them
//! under `ShaderDependence::requires`, collapses equal descriptors and emits
//! every stage in a fixed order:
//!
//! 1. `#version`;
//! 2. dependency headers, e.g. uniforms and attribute layouts;
//! 3. cross-stage `out`/`in` declarations;
//! 4. `out vec4 outColor;` in the fragment stage;
//! 5. helper functions;
//! 6. `void main()`, with the dependency body code, the cross-stage body code,
//!    the position or color assignment and the final code.
//!
//! Generation is a pure function of its inputs, so the same expressions always
//! produce the same sources and hashes.

use std::rc::Rc;

use crate::errors::*;
use crate::utils::hash::FastHashMap;
use crate::utils::hash_value::HashValue;

use super::config::{Action, ShaderConfiguration};
use super::dependence::output::OutputDependence;
use super::dependence::screen::ScreenDependence;
use super::dependence::{ensure_same_input, Dependence, DependenceKey, Dependencies, ShaderDependence};
use super::object::{self, Origin, ShaderObject, ShaderType, Stage};

/// Options controlling the generated code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Treats positions as pixels and remaps them into normalized device
    /// coordinates with the `width` and `height` uniforms.
    #[serde(rename = "PixelBased")]
    pub pixel_based: bool,
    /// Remaps z from `[0, 1000]` into a tiny depth range right in front of the
    /// far plane, so 2D layers can be ordered by z.
    #[serde(rename = "LargeZIndex")]
    pub large_z_index: bool,
    /// The `#version` pragma of both stages.
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "LineWidth")]
    pub line_width: Option<f32>,
    #[serde(rename = "PointSize")]
    pub point_size: Option<f32>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            pixel_based: true,
            large_z_index: false,
            version: "330 core".to_owned(),
            line_width: None,
            point_size: None,
        }
    }
}

impl GeneratorOptions {
    /// Parses options from JSON, e.g. `{ "PixelBased": false }`. Missing keys
    /// keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::InvalidOptions(format!("{}", err)))
    }
}

/// The source of a single stage.
#[derive(Debug, Clone)]
pub struct GeneratedStage {
    pub source: String,
    pub hash: HashValue<str>,
    /// Operations of the dependencies used in this stage, run before every draw.
    pub setup: Action,
}

#[derive(Debug, Clone)]
pub struct GeneratedShaders {
    pub vertex: GeneratedStage,
    pub fragment: GeneratedStage,
    /// Run once after the program has been linked.
    pub configuration: Action,
}

impl GeneratedShaders {
    /// Runs the per-draw operations of both stages.
    pub fn setup(&self, cfg: &mut dyn ShaderConfiguration) -> Result<()> {
        self.vertex.setup.run(cfg)?;
        self.fragment.setup.run(cfg)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlslGenerator {
    options: GeneratorOptions,
}

impl GlslGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        GlslGenerator { options }
    }

    #[inline]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn generate(&self, position: &ShaderObject, color: &ShaderObject) -> Result<GeneratedShaders> {
        if position.kind() != ShaderType::Vec3 {
            return Err(Error::TypeMismatch {
                operation: "position",
                lhs: position.kind(),
                rhs: ShaderType::Vec3,
            });
        }

        if color.kind() != ShaderType::Vec4 {
            return Err(Error::TypeMismatch {
                operation: "color",
                lhs: color.kind(),
                rhs: ShaderType::Vec4,
            });
        }

        if position.origin() == Origin::Fragment {
            return Err(Error::StageMismatch {
                stage: Stage::Vertex.name(),
                expression: position.expression().to_owned(),
            });
        }

        let color = object::merge_origin(color, Origin::Fragment)?;

        let fragment = expand(color.dependencies())?;
        let mut outputs = Vec::new();
        collect_outputs(&fragment, &mut outputs);

        let width: Dependence = Rc::new(ScreenDependence::width());
        let height: Dependence = Rc::new(ScreenDependence::height());

        let mut roots = Dependencies::new();
        roots.extend(position.dependencies())?;
        roots.insert(width)?;
        roots.insert(height)?;
        for v in &outputs {
            if let Some(output) = v.as_output() {
                roots.extend(output.source().dependencies())?;
            }
        }

        let vertex = expand(&roots)?;
        collect_outputs(&vertex, &mut outputs);

        let vertex = arrange(vertex);
        let fragment = arrange(fragment);
        validate_locations(&vertex)?;

        let mut configuration = Action::new();
        let mut all = Dependencies::new();
        all.extend(vertex.iter().chain(fragment.iter()).chain(outputs.iter()))?;
        for v in &all {
            if let Some(op) = v.configuration() {
                configuration.push(op);
            }
        }

        if let Some(width) = self.options.line_width {
            configuration.push(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
                cfg.set_line_width(width)
            }));
        }

        if let Some(size) = self.options.point_size {
            configuration.push(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
                cfg.set_point_size(size)
            }));
        }

        let outputs: Vec<&OutputDependence> = outputs.iter().filter_map(|v| v.as_output()).collect();

        let vs = self.emit(Stage::Vertex, &vertex, &outputs, &self.position_code(position));
        let fs = self.emit(
            Stage::Fragment,
            &fragment,
            &outputs,
            &format!("outColor = {};", color.expression()),
        );

        debug!(
            "[GLSL] Generated program with {} vertex and {} fragment dependencies, {} cross-stage outputs.",
            vertex.len(),
            fragment.len(),
            outputs.len()
        );

        Ok(GeneratedShaders {
            vertex: GeneratedStage {
                hash: HashValue::from(&vs),
                source: vs,
                setup: setup(&vertex),
            },
            fragment: GeneratedStage {
                hash: HashValue::from(&fs),
                source: fs,
                setup: setup(&fragment),
            },
            configuration,
        })
    }

    fn position_code(&self, position: &ShaderObject) -> String {
        let (x, y) = if self.options.pixel_based {
            (
                "2.0 * finalPosition.x / width - 1.0",
                "2.0 * finalPosition.y / height - 1.0",
            )
        } else {
            ("finalPosition.x", "finalPosition.y")
        };

        let z = if self.options.large_z_index {
            "0.99999 - 2.0 * finalPosition.z / 1001.0"
        } else {
            "finalPosition.z"
        };

        format!(
            "vec3 finalPosition = {};\n    gl_Position = vec4({}, {}, {}, 1.0);",
            position.expression(),
            x,
            y,
            z
        )
    }

    fn emit(
        &self,
        stage: Stage,
        deps: &[Dependence],
        outputs: &[&OutputDependence],
        assignment: &str,
    ) -> String {
        let mut lines = Vec::new();
        lines.push(format!("#version {}", self.options.version));

        for v in deps {
            if let Some(header) = v.header() {
                lines.push(header);
            }

            if let Some(header) = v.stage_header(stage) {
                lines.push(header);
            }
        }

        for v in outputs {
            lines.push(v.declaration(stage));
        }

        if stage == Stage::Fragment {
            lines.push("out vec4 outColor;".to_owned());
        }

        for v in deps {
            if let Some(functions) = v.functions() {
                lines.push(functions);
            }
        }

        lines.push("void main() {".to_owned());

        let mut body = Vec::new();
        for v in deps {
            if let Some(code) = v.code(stage) {
                body.push(code);
            }
        }

        for v in outputs {
            if let Some(code) = v.code(stage) {
                body.push(code);
            }
        }

        body.push(assignment.to_owned());

        for v in outputs {
            if let Some(code) = v.final_code(stage) {
                body.push(code);
            }
        }

        for v in deps {
            if let Some(code) = v.final_code(stage) {
                body.push(code);
            }
        }

        for v in body {
            lines.push(format!("    {}", v));
        }

        lines.push("}".to_owned());
        lines.push(String::new());
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Expanding,
    Done,
}

/// Closes `roots` under `requires`, placing every requirement ahead of its
/// dependents. Fails if a descriptor requires itself transitively, or if two
/// different inputs show up under the same key.
fn expand(roots: &Dependencies) -> Result<Vec<Dependence>> {
    let mut marks = FastHashMap::<DependenceKey, (Mark, u64)>::default();
    let mut expanded = Vec::new();
    let mut stack: Vec<(Dependence, bool)> = roots.iter().rev().map(|v| (v.clone(), false)).collect();

    while let Some((dep, ready)) = stack.pop() {
        let key = dep.key();

        let fingerprint = dep.fingerprint();

        if ready {
            marks.insert(key, (Mark::Done, fingerprint));
            expanded.push(dep);
            continue;
        }

        if let Some(&(mark, seen)) = marks.get(&key) {
            ensure_same_input(&key, seen, fingerprint)?;
            match mark {
                Mark::Done => continue,
                Mark::Expanding => return Err(Error::DependenceCycle(key.to_string())),
            }
        }

        marks.insert(key, (Mark::Expanding, fingerprint));
        let requires = dep.requires();
        stack.push((dep, true));
        for v in requires.iter().rev() {
            stack.push((v.clone(), false));
        }
    }

    Ok(expanded)
}

fn collect_outputs(deps: &[Dependence], outputs: &mut Vec<Dependence>) {
    for v in deps {
        if v.as_output().is_some() && !outputs.iter().any(|o| o.key() == v.key()) {
            outputs.push(v.clone());
        }
    }
}

/// Drops the cross-stage outputs, which are emitted separately, and sorts the
/// rest by order. The sort is stable, so equal orders keep discovery order.
fn arrange(deps: Vec<Dependence>) -> Vec<Dependence> {
    let mut deps: Vec<Dependence> = deps.into_iter().filter(|v| v.as_output().is_none()).collect();
    deps.sort_by_key(|v| v.order());
    deps
}

fn validate_locations(deps: &[Dependence]) -> Result<()> {
    let mut locations = FastHashMap::<u32, &str>::default();
    for v in deps {
        if let Some(attribute) = v.as_attribute() {
            if let Some(name) = locations.insert(attribute.location(), attribute.name()) {
                return Err(Error::InvalidExpression(format!(
                    "attributes `{}` and `{}` share location {}",
                    name,
                    attribute.name(),
                    attribute.location()
                )));
            }
        }
    }

    Ok(())
}

fn setup(deps: &[Dependence]) -> Action {
    let mut action = Action::new();
    for v in deps {
        if let Some(op) = v.operation() {
            action.push(op);
        }
    }

    action
}
