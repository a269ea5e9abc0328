use std::borrow::Cow;
use std::cell::OnceCell;

use crate::errors::*;
use crate::math::prelude::Vector3;

use super::triangulate::triangulate;
use super::{BufferCell, BufferedData};

/// Points per polygon vertex.
pub const COLUMNS: usize = 3;

/// An immutable list of points derived from a polygon.
#[derive(Debug, Clone)]
pub struct GeometryView {
    values: Vec<f32>,
    cell: BufferCell,
}

impl GeometryView {
    fn new(values: Vec<f32>) -> Self {
        GeometryView {
            values,
            cell: BufferCell::new(),
        }
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

impl BufferedData for GeometryView {
    #[inline]
    fn columns(&self) -> usize {
        COLUMNS
    }

    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> Result<f32> {
        self.values.get(index).cloned().ok_or(Error::OutOfBounds {
            index,
            len: self.values.len(),
        })
    }

    fn data(&self) -> Cow<[f32]> {
        Cow::Borrowed(&self.values)
    }

    #[inline]
    fn buffer_cell(&self) -> &BufferCell {
        &self.cell
    }

    #[inline]
    fn is_geometry(&self) -> bool {
        true
    }
}

/// A closed, planar outline of 3D points.
///
/// The points, the boundary edges and the triangulated interior are exposed
/// as separate views, computed on first access and kept afterwards.
#[derive(Debug, Clone)]
pub struct Polygon {
    values: Vec<f32>,
    cell: BufferCell,
    points: OnceCell<GeometryView>,
    lines: OnceCell<GeometryView>,
    triangules: OnceCell<GeometryView>,
}

impl Polygon {
    /// Creates a polygon out of `x, y, z` triples.
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.len() % COLUMNS != 0 {
            return Err(Error::InvalidShape(format!(
                "{} values do not form 3D points",
                values.len()
            )));
        }

        if values.len() < 3 * COLUMNS {
            return Err(Error::InvalidShape(format!(
                "a polygon needs at least 3 points, got {}",
                values.len() / COLUMNS
            )));
        }

        Ok(Polygon {
            values,
            cell: BufferCell::new(),
            points: OnceCell::new(),
            lines: OnceCell::new(),
            triangules: OnceCell::new(),
        })
    }

    pub fn from_points(points: &[Vector3<f32>]) -> Result<Self> {
        let mut values = Vec::with_capacity(points.len() * COLUMNS);
        for v in points {
            values.extend_from_slice(&[v.x, v.y, v.z]);
        }

        Polygon::new(values)
    }

    pub fn point(&self, index: usize) -> Option<Vector3<f32>> {
        let v = self.values.get(index * COLUMNS..(index + 1) * COLUMNS)?;
        Some(Vector3::new(v[0], v[1], v[2]))
    }

    fn vertices(&self) -> Vec<Vector3<f32>> {
        self.values
            .chunks(COLUMNS)
            .map(|v| Vector3::new(v[0], v[1], v[2]))
            .collect()
    }

    /// The outline points, unchanged.
    pub fn points(&self) -> &GeometryView {
        self.points
            .get_or_init(|| GeometryView::new(self.values.clone()))
    }

    /// The boundary as a list of edges, two points per edge, closing back to
    /// the first point.
    pub fn lines(&self) -> &GeometryView {
        self.lines.get_or_init(|| {
            let n = self.rows();
            let mut values = Vec::with_capacity(n * 2 * COLUMNS);
            for i in 0..n {
                let j = (i + 1) % n;
                values.extend_from_slice(&self.values[i * COLUMNS..(i + 1) * COLUMNS]);
                values.extend_from_slice(&self.values[j * COLUMNS..(j + 1) * COLUMNS]);
            }

            GeometryView::new(values)
        })
    }

    /// The interior as a list of triangles, three points per triangle.
    pub fn triangules(&self) -> Result<&GeometryView> {
        if let Some(v) = self.triangules.get() {
            return Ok(v);
        }

        let indices = triangulate(&self.vertices())?;
        let mut values = Vec::with_capacity(indices.len() * COLUMNS);
        for i in indices {
            values.extend_from_slice(&self.values[i * COLUMNS..(i + 1) * COLUMNS]);
        }

        debug!(
            "[Polygon] triangulated {} points into {} triangles.",
            self.rows(),
            values.len() / (3 * COLUMNS)
        );

        Ok(self.triangules.get_or_init(|| GeometryView::new(values)))
    }
}

impl BufferedData for Polygon {
    #[inline]
    fn columns(&self) -> usize {
        COLUMNS
    }

    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> Result<f32> {
        self.values.get(index).cloned().ok_or(Error::OutOfBounds {
            index,
            len: self.values.len(),
        })
    }

    fn data(&self) -> Cow<[f32]> {
        Cow::Borrowed(&self.values)
    }

    #[inline]
    fn buffer_cell(&self) -> &BufferCell {
        &self.cell
    }

    #[inline]
    fn is_geometry(&self) -> bool {
        true
    }

    fn outline(&self) -> Result<Option<&dyn BufferedData>> {
        Ok(Some(self.lines()))
    }

    fn fill(&self) -> Result<Option<&dyn BufferedData>> {
        Ok(Some(self.triangules()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn triangle() -> Polygon {
        Polygon::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap()
    }

    #[test]
    fn validation() {
        match Polygon::new(vec![0.0; 6]) {
            Err(Error::InvalidShape(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert!(Polygon::new(vec![0.0; 10]).is_err());
    }

    #[test]
    fn views() {
        let polygon = triangle();
        assert_eq!(polygon.points().values(), polygon.data().as_ref());
        assert_eq!(polygon.lines().rows(), 6);
        assert_eq!(&polygon.lines().values()[15..18], &[0.0, 0.0, 0.0]);
        assert_eq!(polygon.triangules().unwrap().rows(), 3);

        let first = polygon.lines() as *const GeometryView;
        assert_eq!(first, polygon.lines() as *const GeometryView);
    }

    #[test]
    fn immutable() {
        let mut polygon = triangle();
        match polygon.set(0, 1.0) {
            Err(Error::Immutable) => {}
            other => panic!("unexpected {:?}", other),
        }

        let mut lines = polygon.lines().clone();
        assert!(lines.set(0, 1.0).is_err());
        assert_eq!(polygon.point(1), Some(Vector3::new(1.0, 0.0, 0.0)));
        assert!(polygon.point(3).is_none());
    }
}
