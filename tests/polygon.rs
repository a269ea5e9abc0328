extern crate tincture;

use tincture::math::prelude::Vector3;
use tincture::prelude::*;

fn area(values: &[f32]) -> f32 {
    values
        .chunks(9)
        .map(|v| ((v[3] - v[0]) * (v[7] - v[1]) - (v[6] - v[0]) * (v[4] - v[1])).abs() * 0.5)
        .sum()
}

#[test]
fn concave_quadrilateral() {
    // A dart, the last point is the reflex corner.
    let polygon = Polygon::from_points(&[
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(4.0, 0.0, 0.0),
        Vector3::new(2.0, 4.0, 0.0),
        Vector3::new(2.0, 1.0, 0.0),
    ])
    .unwrap();

    let triangules = polygon.triangules().unwrap();
    assert_eq!(triangules.rows(), 6);
    assert!(triangules.is_geometry());
    assert!((area(triangules.values()) - 5.0).abs() < 1e-4);

    // Memoized.
    let again = polygon.triangules().unwrap();
    assert_eq!(again as *const GeometryView, triangules as *const GeometryView);
}

#[test]
fn views() {
    let polygon = Polygon::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]).unwrap();
    assert_eq!(polygon.rows(), 3);
    assert_eq!(polygon.points().rows(), 3);
    assert_eq!(polygon.lines().rows(), 6);
    assert_eq!(polygon.point(2), Some(Vector3::new(1.0, 1.0, 0.0)));
    assert_eq!(polygon.point(3), None);

    let outline = Primitive::select(&polygon, DrawMode::Outline).unwrap();
    assert_eq!(outline.kind, PrimitiveKind::Lines);
    assert_eq!(outline.data.rows(), 6);

    let fill = Primitive::select(&polygon, DrawMode::Fill).unwrap();
    assert_eq!(fill.kind, PrimitiveKind::Triangles);
    assert_eq!(fill.data.rows(), 3);
}

#[test]
fn immutable() {
    let mut polygon = Polygon::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]).unwrap();
    match polygon.set(0, 1.0) {
        Err(Error::Immutable) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn invalid_shapes() {
    assert!(Polygon::new(vec![0.0; 6]).is_err());
    assert!(Polygon::new(vec![0.0; 10]).is_err());

    let collinear = Polygon::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0]).unwrap();
    match collinear.triangules() {
        Err(Error::InvalidShape(_)) => {}
        other => panic!("unexpected {:?}", other.map(|v| v.rows())),
    }
}
