//! Ear clipping triangulation of planar, simple polygons.
//!
//! The polygon is projected onto the coordinate plane which drops the
//! dominant axis of its normal, so any orientation in space works. Concave
//! outlines are supported, self intersecting ones are rejected.

use crate::errors::*;
use crate::math::prelude::{Vector2, Vector3};

use cgmath::InnerSpace;

const EPSILON: f32 = 1e-6;

/// Triangulates the outline `points`, returning the corner indices of every
/// triangle, three by three.
pub fn triangulate(points: &[Vector3<f32>]) -> Result<Vec<usize>> {
    if points.len() < 3 {
        return Err(Error::InvalidShape(format!(
            "a polygon needs at least 3 points, got {}",
            points.len()
        )));
    }

    let normal = newell(points);
    if normal.magnitude2() < EPSILON * EPSILON {
        return Err(Error::InvalidShape("polygon has no area".to_owned()));
    }

    let projected = project(points, normal);
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    if signed_area(&projected) < 0.0 {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity((points.len() - 2) * 3);
    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let (a, b, c) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
            is_ear(&projected, &remaining, a, b, c)
        });

        match ear {
            Some(i) => {
                triangles.push(remaining[(i + n - 1) % n]);
                triangles.push(remaining[i]);
                triangles.push(remaining[(i + 1) % n]);
                remaining.remove(i);
            }
            None => {
                // Collinear corners do not enclose anything, drop them.
                let flat = (0..n).find(|&i| {
                    let (a, b, c) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
                    cross(projected[a], projected[b], projected[c]).abs() <= EPSILON
                });

                match flat {
                    Some(i) => {
                        remaining.remove(i);
                    }
                    None => {
                        return Err(Error::InvalidShape(
                            "polygon intersects itself".to_owned(),
                        ))
                    }
                }
            }
        }
    }

    if cross(
        projected[remaining[0]],
        projected[remaining[1]],
        projected[remaining[2]],
    )
    .abs()
        > EPSILON
    {
        triangles.extend_from_slice(&remaining);
    }

    Ok(triangles)
}

/// The normal of the best fitting plane, scaled by twice the area.
fn newell(points: &[Vector3<f32>]) -> Vector3<f32> {
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for (i, v) in points.iter().enumerate() {
        let w = points[(i + 1) % points.len()];
        normal.x += (v.y - w.y) * (v.z + w.z);
        normal.y += (v.z - w.z) * (v.x + w.x);
        normal.z += (v.x - w.x) * (v.y + w.y);
    }

    normal
}

fn project(points: &[Vector3<f32>], normal: Vector3<f32>) -> Vec<Vector2<f32>> {
    let (x, y, z) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    points
        .iter()
        .map(|v| {
            if z >= x && z >= y {
                Vector2::new(v.x, v.y)
            } else if y >= x {
                Vector2::new(v.z, v.x)
            } else {
                Vector2::new(v.y, v.z)
            }
        })
        .collect()
}

fn signed_area(points: &[Vector2<f32>]) -> f32 {
    let mut area = 0.0;
    for (i, v) in points.iter().enumerate() {
        let w = points[(i + 1) % points.len()];
        area += v.x * w.y - w.x * v.y;
    }

    area * 0.5
}

#[inline]
fn cross(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> f32 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

fn is_ear(points: &[Vector2<f32>], remaining: &[usize], a: usize, b: usize, c: usize) -> bool {
    if cross(points[a], points[b], points[c]) <= EPSILON {
        return false;
    }

    remaining
        .iter()
        .filter(|&&v| v != a && v != b && v != c)
        .all(|&v| !contains(points[a], points[b], points[c], points[v]))
}

/// Returns true if `p` lies inside or on the border of the counter-clockwise
/// triangle `abc`.
fn contains(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>, p: Vector2<f32>) -> bool {
    cross(a, b, p) >= -EPSILON && cross(b, c, p) >= -EPSILON && cross(c, a, p) >= -EPSILON
}
