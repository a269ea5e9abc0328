use smallvec::SmallVec;

use crate::buffer::{BufferSlot, BufferedData, DrawMode, Primitive};
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::shader::config::{ShaderConfiguration, UniformVariable};
use crate::shader::glsl::{GeneratedShaders, GeneratedStage, GeneratorOptions, GlslGenerator};
use crate::shader::{ShaderObject, Stage};
use crate::utils::handle_pool::HandlePool;
use crate::utils::hash::FastHashMap;
use crate::utils::hash_value::HashValue;

use super::headless::HeadlessVisitor;
use super::{BufferHandle, ProgramHandle, ShaderHandle, Visitor};

/// The initial state of a `RenderContext`.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams {
    /// The size in pixels of the surface we are drawing into.
    pub dimensions: Vector2<u32>,
    pub line_width: f32,
    pub point_size: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            dimensions: Vector2::new(640, 320),
            line_width: 1.0,
            point_size: 1.0,
        }
    }
}

/// A vertex attribute declared by a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub location: u32,
    pub components: u8,
}

pub type Layouts = SmallVec<[Layout; 4]>;

/// A linked program, ready to draw with.
#[derive(Debug, Clone)]
pub struct Pipeline {
    program: ProgramHandle,
    layouts: Layouts,
    shaders: GeneratedShaders,
}

impl Pipeline {
    #[inline]
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// The attributes this pipeline reads, by ascending location.
    #[inline]
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    #[inline]
    pub fn shaders(&self) -> &GeneratedShaders {
        &self.shaders
    }
}

/// Forwards the configuration of generated programs to a visitor. Layouts
/// can only be declared while a program is being configured.
struct ProgramSink<'a> {
    visitor: &'a mut dyn Visitor,
    layouts: Option<&'a mut Layouts>,
}

impl<'a> ShaderConfiguration for ProgramSink<'a> {
    fn dimensions(&self) -> Vector2<u32> {
        self.visitor.dimensions()
    }

    fn set_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()> {
        unsafe { self.visitor.set_uniform(name, variable) }
    }

    fn add_layout(&mut self, location: u32, components: u8) -> Result<()> {
        let layouts = self.layouts.as_mut().ok_or_else(|| {
            Error::Backend(format!(
                "layout at location {} declared outside of program configuration",
                location
            ))
        })?;

        if layouts.iter().any(|v| v.location == location) {
            return Err(Error::Backend(format!(
                "location {} has been declared twice",
                location
            )));
        }

        layouts.push(Layout {
            location,
            components,
        });

        layouts.sort_by_key(|v| v.location);
        Ok(())
    }

    fn set_line_width(&mut self, width: f32) -> Result<()> {
        unsafe { self.visitor.set_line_width(width) }
    }

    fn set_point_size(&mut self, size: f32) -> Result<()> {
        unsafe { self.visitor.set_point_size(size) }
    }
}

/// Owns a backend together with the caches of everything created through it.
///
/// Identical sources are compiled once, and identical pairs of shaders are
/// linked once. Entries are never evicted, as the number of distinct
/// programs is bounded by the distinct drawing definitions of the host.
pub struct RenderContext {
    params: RenderParams,
    visitor: Box<dyn Visitor>,
    generator: GlslGenerator,
    shaders: FastHashMap<HashValue<str>, ShaderHandle>,
    programs: FastHashMap<(ShaderHandle, ShaderHandle), (ProgramHandle, Layouts)>,
    shader_handles: HandlePool,
    program_handles: HandlePool,
    buffer_handles: HandlePool,
}

impl RenderContext {
    pub fn new(params: RenderParams, mut visitor: Box<dyn Visitor>) -> Result<Self> {
        unsafe {
            visitor.set_dimensions(params.dimensions)?;
            visitor.set_line_width(params.line_width)?;
            visitor.set_point_size(params.point_size)?;
        }

        info!(
            "[RenderContext] Setups with dimensions {:?}.",
            params.dimensions
        );

        Ok(RenderContext {
            params,
            visitor,
            generator: GlslGenerator::default(),
            shaders: FastHashMap::default(),
            programs: FastHashMap::default(),
            shader_handles: HandlePool::new(),
            program_handles: HandlePool::new(),
            buffer_handles: HandlePool::new(),
        })
    }

    /// Creates a context on top of a `HeadlessVisitor`.
    pub fn headless(params: RenderParams) -> Result<Self> {
        RenderContext::new(params, Box::new(HeadlessVisitor::new()))
    }

    #[inline]
    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.params.dimensions
    }

    /// Resizes the surface, e.g. after the window has been resized.
    pub fn set_dimensions(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        self.params.dimensions = dimensions;
        unsafe { self.visitor.set_dimensions(dimensions) }
    }

    /// Options used by the following `create_pipeline` calls.
    pub fn set_options(&mut self, options: GeneratorOptions) {
        self.generator = GlslGenerator::new(options);
    }

    #[inline]
    pub fn options(&self) -> &GeneratorOptions {
        self.generator.options()
    }

    /// The number of distinct compiled shaders and linked programs.
    pub fn cached(&self) -> (usize, usize) {
        (self.shaders.len(), self.programs.len())
    }

    /// Generates, compiles and links the program drawing `color` at
    /// `position`. Programs already linked for the same sources are reused.
    pub fn create_pipeline(
        &mut self,
        position: &ShaderObject,
        color: &ShaderObject,
    ) -> Result<Pipeline> {
        let shaders = self.generator.generate(position, color)?;
        let vs = self.compile(Stage::Vertex, &shaders.vertex)?;
        let fs = self.compile(Stage::Fragment, &shaders.fragment)?;

        if let Some((program, layouts)) = self.programs.get(&(vs, fs)) {
            return Ok(Pipeline {
                program: *program,
                layouts: layouts.clone(),
                shaders,
            });
        }

        let program = self.program_handles.create::<ProgramHandle>();
        let mut layouts = Layouts::new();

        unsafe {
            self.visitor.link_program(program, vs, fs)?;
            self.visitor.bind_program(program)?;
        }

        {
            let mut sink = ProgramSink {
                visitor: &mut *self.visitor,
                layouts: Some(&mut layouts),
            };

            shaders.configuration.run(&mut sink)?;
        }

        info!(
            "[RenderContext] Links {} with {} attributes.",
            program,
            layouts.len()
        );

        self.programs.insert((vs, fs), (program, layouts.clone()));
        Ok(Pipeline {
            program,
            layouts,
            shaders,
        })
    }

    fn compile(&mut self, stage: Stage, generated: &GeneratedStage) -> Result<ShaderHandle> {
        if let Some(&handle) = self.shaders.get(&generated.hash) {
            return Ok(handle);
        }

        let handle = self.shader_handles.create::<ShaderHandle>();
        unsafe {
            self.visitor
                .compile_shader(handle, stage, &generated.source)?;
        }

        debug!("[RenderContext] Compiles {} {}.", stage.name(), handle);
        self.shaders.insert(generated.hash, handle);
        Ok(handle)
    }

    /// Draws `data` with `pipeline`, feeding it into the attribute at location 0.
    pub fn draw(&mut self, pipeline: &Pipeline, data: &dyn BufferedData, mode: DrawMode) -> Result<()> {
        self.draw_with(pipeline, data, &[], mode)
    }

    /// Draws `data` with `pipeline`. The attribute at location `n > 0` reads
    /// from `attributes[n - 1]`.
    pub fn draw_with(
        &mut self,
        pipeline: &Pipeline,
        data: &dyn BufferedData,
        attributes: &[&dyn BufferedData],
        mode: DrawMode,
    ) -> Result<()> {
        let primitive = Primitive::select(data, mode)?;

        unsafe {
            self.visitor.bind_program(pipeline.program)?;
        }

        {
            let mut sink = ProgramSink {
                visitor: &mut *self.visitor,
                layouts: None,
            };

            pipeline.shaders.setup(&mut sink)?;
        }

        for layout in &pipeline.layouts {
            let source = if layout.location == 0 {
                primitive.data
            } else {
                *attributes
                    .get(layout.location as usize - 1)
                    .ok_or_else(|| {
                        Error::MissingDependence(format!(
                            "buffered data of attribute location {}",
                            layout.location
                        ))
                    })?
            };

            if source.columns() != layout.components as usize {
                return Err(Error::InvalidShape(format!(
                    "attribute location {} reads {} components, but data has {} columns",
                    layout.location,
                    layout.components,
                    source.columns()
                )));
            }

            let buffer = self.upload(source)?;
            unsafe {
                self.visitor
                    .bind_attribute(buffer, layout.location, layout.components)?;
            }
        }

        let vertices = primitive.data.instance_length();
        let instances = primitive.data.instances();
        trace!(
            "[RenderContext] Draws {:?} with {} vertices and {} instances.",
            primitive.kind,
            vertices,
            instances
        );

        unsafe { self.visitor.draw(primitive.kind, vertices, instances) }
    }

    /// Makes sure the backend buffer of `data` holds its latest content. The
    /// first upload creates the buffer, later ones only send the changed
    /// ranges, unless the size of the data changed.
    pub fn upload(&mut self, data: &dyn BufferedData) -> Result<BufferHandle> {
        let values = data.data();
        let cell = data.buffer_cell();

        match cell.get() {
            Some(slot) if slot.len == values.len() => {
                if let Some(changes) = data.take_changes() {
                    for v in &changes {
                        let end = v.end().min(values.len());
                        if v.start() < end {
                            unsafe {
                                self.visitor
                                    .update_buffer(slot.handle, v.start(), &values[v.start()..end])?;
                            }
                        }
                    }
                }

                Ok(slot.handle)
            }
            slot => {
                let handle = match slot {
                    Some(slot) => slot.handle,
                    None => self.buffer_handles.create::<BufferHandle>(),
                };

                data.take_changes();
                unsafe {
                    self.visitor.create_buffer(handle, &values)?;
                }

                cell.set(BufferSlot {
                    handle,
                    len: values.len(),
                });

                Ok(handle)
            }
        }
    }

    /// Frees the backend buffer of `data`, if any.
    pub fn release(&mut self, data: &dyn BufferedData) -> Result<()> {
        if let Some(slot) = data.buffer_cell().reset() {
            self.buffer_handles.free(slot.handle);
            unsafe {
                self.visitor.delete_buffer(slot.handle)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::buffer::data::BufferData;

    #[test]
    fn layouts_outside_configuration() {
        let mut visitor = HeadlessVisitor::new();
        let mut sink = ProgramSink {
            visitor: &mut visitor,
            layouts: None,
        };

        assert!(sink.add_layout(0, 3).is_err());

        let mut layouts = Layouts::new();
        let mut sink = ProgramSink {
            visitor: &mut visitor,
            layouts: Some(&mut layouts),
        };

        sink.add_layout(1, 1).unwrap();
        sink.add_layout(0, 3).unwrap();
        assert!(sink.add_layout(0, 3).is_err());
        assert_eq!(layouts[0].location, 0);
    }

    #[test]
    fn partial_uploads() {
        let recorder;
        let mut ctx = {
            let visitor = HeadlessVisitor::new();
            recorder = visitor.recorder();
            RenderContext::new(RenderParams::default(), Box::new(visitor)).unwrap()
        };

        let mut data = BufferData::from_values(1, &[0.0; 256]).unwrap();
        let handle = ctx.upload(&data).unwrap();
        recorder.take();

        data.set(3, 1.0).unwrap();
        data.set(200, 1.0).unwrap();
        assert_eq!(ctx.upload(&data).unwrap(), handle);

        let commands = recorder.take();
        assert_eq!(commands.len(), 2);
        assert!(commands.contains(&super::super::headless::Command::UpdateBuffer {
            handle,
            offset: 200,
            len: 1,
        }));

        data.add(1.0);
        ctx.upload(&data).unwrap();
        assert_eq!(
            recorder.take(),
            vec![super::super::headless::Command::CreateBuffer { handle, len: 257 }]
        );

        ctx.release(&data).unwrap();
        assert!(data.buffer_cell().get().is_none());
    }
}
