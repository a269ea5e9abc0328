extern crate rand;
extern crate tincture;

use rand::{thread_rng, Rng};
use tincture::prelude::*;
use tincture::shader::{merge_origin, union};

#[test]
fn color_range() {
    let mut rng = thread_rng();
    for _ in 0..100 {
        let (r, g, b, a) = (rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
        let color = Color::rgba(r, g, b, a).unwrap();
        assert_eq!(color.rgba_array(), [r, g, b, a]);
    }

    for _ in 0..100 {
        let v = 1.0 + rng.gen_range(0.001, 10.0);
        match Color::rgb(0.5, v, 0.5) {
            Err(Error::ColorOutOfRange { channel, .. }) => assert_eq!(channel, "g"),
            other => panic!("unexpected {:?}", other),
        }

        assert!(Color::rgba(-v, 0.0, 0.0, 1.0).is_err());
        assert!(Color::rgba(0.0, 0.0, 0.0, v).is_err());
    }

    assert!(Color::rgba(0.0, 0.0, 0.0, 1.0).is_ok());
}

#[test]
fn literals() {
    assert_eq!(ShaderObject::literal(1.0f32).unwrap().expression(), "1.0");
    assert_eq!(
        ShaderObject::literal(Color::rgb(1.0, 0.0, 0.0).unwrap())
            .unwrap()
            .expression(),
        "vec4(1.0, 0.0, 0.0, 1.0)"
    );

    assert!(ShaderObject::literal(::std::f32::NAN).is_err());
    assert!(ShaderObject::from_slice(&[]).is_err());
    assert!(ShaderObject::from_slice(&[0.0; 5]).is_err());
    assert_eq!(ShaderObject::from_slice(&[0.5, 2.0]).unwrap().kind(), ShaderType::Vec2);
}

#[test]
fn same_origin_union() {
    let a = ShaderObject::float_attribute("weight", 1).unwrap();
    let b = ShaderObject::position().x().unwrap();

    let v = union(ShaderType::Float, "({0} + {1})", &[&a, &b]).unwrap();
    assert_eq!(v.origin(), Origin::Vertex);
    assert_eq!(v.expression(), format!("({} + {})", a.expression(), b.expression()));
    assert_eq!(v.dependencies().len(), 2);

    let c = ShaderObject::literal(2.0f32).unwrap();
    let v = union(ShaderType::Float, "({0} * {1})", &[&c, &c]).unwrap();
    assert_eq!(v.origin(), Origin::Global);
    assert!(v.dependencies().is_empty());
}

#[test]
fn cross_origin_promotion() {
    let vertex = ShaderObject::float_attribute("weight", 1).unwrap();
    let fragment = ShaderObject::frag_coord().x().unwrap();

    let v = (&vertex + &fragment).unwrap();
    assert_eq!(v.origin(), Origin::Fragment);
    assert!(!v.expression().contains("weight"));
    assert!(v.dependencies().contains_kind("output"));
    assert!(!v.dependencies().contains_kind("attribute"));

    // Promoting the same expression twice refers to the same variable.
    let w = (&vertex * &fragment).unwrap();
    let lhs: Vec<_> = v.dependencies().keys();
    let rhs: Vec<_> = w.dependencies().keys();
    assert_eq!(lhs, rhs);

    let promoted = merge_origin(&vertex, Origin::Fragment).unwrap();
    assert_eq!(promoted.origin(), Origin::Fragment);
    assert_eq!(
        merge_origin(&fragment, Origin::Vertex).unwrap().expression(),
        fragment.expression()
    );
}

#[test]
fn arithmetics() {
    let p = ShaderObject::position();
    let v = (&p * 2.0).unwrap();
    assert_eq!(v.kind(), ShaderType::Vec3);

    let xy = p.swizzle("xy").unwrap();
    assert_eq!(xy.kind(), ShaderType::Vec2);
    assert!((&xy + &p).is_err());
    assert!(p.index(3).is_err());
    assert!(p.swizzle("xq").is_err());

    let d = xy.length().unwrap();
    assert_eq!(d.kind(), ShaderType::Float);
    assert_eq!(d.lt(&ShaderObject::literal(1.0f32).unwrap()).unwrap().kind(), ShaderType::Bool);
}

#[test]
fn one_name_one_input() {
    let a = ShaderObject::literal(2.0f32).unwrap().named("a").unwrap();
    let b = ShaderObject::literal(3.0f32).unwrap().named("a").unwrap();
    match union(ShaderType::Float, "({0} + {1})", &[&a, &b]) {
        Err(Error::InvalidExpression(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    let small = UniformSlot::new(1.0f32);
    let large = UniformSlot::new(1.0f32);
    let lhs = ShaderObject::uniform("scale", &small).unwrap();
    let rhs = ShaderObject::uniform("scale", &large).unwrap();
    assert!(union(ShaderType::Float, "({0} * {1})", &[&lhs, &rhs]).is_err());
    assert!(union(ShaderType::Float, "({0} * {1})", &[&lhs, &lhs]).is_ok());
}
