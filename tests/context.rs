extern crate env_logger;
extern crate tincture;

use tincture::prelude::*;

fn headless() -> (RenderContext, Recorder) {
    let _ = env_logger::try_init();
    let visitor = HeadlessVisitor::new();
    let recorder = visitor.recorder();
    let ctx = RenderContext::new(RenderParams::default(), Box::new(visitor)).unwrap();
    recorder.take();
    (ctx, recorder)
}

fn triangle() -> BufferData {
    BufferData::from_values(3, &[0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 10.0, 0.0])
        .unwrap()
        .into_geometry()
}

#[test]
fn pipeline_caches() {
    let (mut ctx, recorder) = headless();
    let position = ShaderObject::position();
    let red = ShaderObject::literal(Color::rgb(1.0, 0.0, 0.0).unwrap()).unwrap();
    let blue = ShaderObject::literal(Color::rgb(0.0, 0.0, 1.0).unwrap()).unwrap();

    let a = ctx.create_pipeline(&position, &red).unwrap();
    assert_eq!(ctx.cached(), (2, 1));
    assert_eq!(a.layouts(), &[Layout { location: 0, components: 3 }][..]);

    let compiles = recorder
        .take()
        .into_iter()
        .filter(|v| match *v {
            Command::CompileShader { .. } => true,
            _ => false,
        })
        .count();
    assert_eq!(compiles, 2);

    let b = ctx.create_pipeline(&position, &red).unwrap();
    assert_eq!(a.program(), b.program());
    assert!(recorder.is_empty());

    // Only the fragment stage differs.
    let c = ctx.create_pipeline(&position, &blue).unwrap();
    assert_ne!(a.program(), c.program());
    assert_eq!(ctx.cached(), (3, 2));
}

#[test]
fn draws() {
    let (mut ctx, recorder) = headless();
    let slot = UniformSlot::new([1.0f32, 0.5, 0.0, 1.0]);
    let tint = ShaderObject::uniform("tint", &slot).unwrap();

    let pipeline = ctx.create_pipeline(&ShaderObject::position(), &tint).unwrap();
    let data = triangle();
    recorder.take();

    ctx.draw(&pipeline, &data, DrawMode::Fill).unwrap();
    let commands = recorder.take();

    assert_eq!(commands[0], Command::BindProgram(pipeline.program()));
    assert!(commands.contains(&Command::SetUniform {
        name: "width".to_owned(),
        variable: UniformVariable::F32(640.0),
    }));
    assert!(commands.contains(&Command::SetUniform {
        name: "height".to_owned(),
        variable: UniformVariable::F32(320.0),
    }));
    assert!(commands.contains(&Command::SetUniform {
        name: "tint".to_owned(),
        variable: UniformVariable::Vector4f([1.0, 0.5, 0.0, 1.0]),
    }));

    let handle = data.buffer_cell().get().unwrap().handle;
    assert!(commands.contains(&Command::CreateBuffer { handle, len: 9 }));
    assert!(commands.contains(&Command::BindAttribute {
        buffer: handle,
        location: 0,
        components: 3,
    }));
    assert_eq!(
        commands.last(),
        Some(&Command::Draw {
            kind: PrimitiveKind::Triangles,
            vertices: 3,
            instances: 1,
        })
    );

    // The next draw reads the new value, and reuses the buffer.
    slot.set([0.0f32, 0.0, 0.0, 1.0]).unwrap();
    ctx.draw(&pipeline, &data, DrawMode::Points).unwrap();
    let commands = recorder.take();
    assert!(commands.contains(&Command::SetUniform {
        name: "tint".to_owned(),
        variable: UniformVariable::Vector4f([0.0, 0.0, 0.0, 1.0]),
    }));
    assert!(!commands.iter().any(|v| match *v {
        Command::CreateBuffer { .. } => true,
        _ => false,
    }));
}

#[test]
fn virtual_draws() {
    let (mut ctx, recorder) = headless();
    let color = ShaderObject::literal([1.0f32, 1.0, 1.0, 1.0]).unwrap();
    let pipeline = ctx.create_pipeline(&ShaderObject::position(), &color).unwrap();

    let data = VirtualBufferData::new(triangle(), 4).unwrap();
    recorder.take();

    ctx.draw(&pipeline, &data, DrawMode::Points).unwrap();
    let commands = recorder.take();
    assert_eq!(
        commands.last(),
        Some(&Command::Draw {
            kind: PrimitiveKind::Points,
            vertices: 3,
            instances: 4,
        })
    );
}

#[test]
fn rejections() {
    let (mut ctx, _) = headless();
    let color = ShaderObject::literal([1.0f32, 1.0, 1.0, 1.0]).unwrap();
    let pipeline = ctx.create_pipeline(&ShaderObject::position(), &color).unwrap();

    let points = BufferData::from_values(3, &[0.0; 9]).unwrap();
    match ctx.draw(&pipeline, &points, DrawMode::Outline) {
        Err(Error::NotGeometry(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    let flat = BufferData::from_values(2, &[0.0; 6]).unwrap();
    assert!(ctx.draw(&pipeline, &flat, DrawMode::Points).is_err());

    // A second attribute requires a second buffer.
    let weight = ShaderObject::float_attribute("weight", 1).unwrap();
    let position = (&ShaderObject::position() * &weight).unwrap();
    let pipeline = ctx.create_pipeline(&position, &color).unwrap();
    assert_eq!(pipeline.layouts().len(), 2);

    match ctx.draw(&pipeline, &points, DrawMode::Points) {
        Err(Error::MissingDependence(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    let weights = BufferData::from_values(1, &[1.0, 2.0, 3.0]).unwrap();
    ctx.draw_with(&pipeline, &points, &[&weights], DrawMode::Points).unwrap();
}
