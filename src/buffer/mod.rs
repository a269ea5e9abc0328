//! Flat, row-major float arrays feeding vertex attributes.
//!
//! Every `BufferedData` describes how a backend should interpret its floats:
//! `columns` components per point, `rows` points in total, grouped into
//! `instances` of `instance_length` points each. Only data flagged as
//! geometry can be drawn as outlines or filled triangles.

pub mod array;
pub mod changes;
pub mod data;
pub mod mutable;
pub mod polygon;
pub mod triangulate;
pub mod virtual_data;

pub mod prelude {
    pub use super::array::BufferedDataArray;
    pub use super::changes::{Change, Changes};
    pub use super::data::BufferData;
    pub use super::mutable::MutableBufferData;
    pub use super::polygon::{GeometryView, Polygon};
    pub use super::virtual_data::VirtualBufferData;
    pub use super::{BufferCell, BufferSlot, BufferedData, DrawMode, Primitive, PrimitiveKind};
}

use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;

use crate::errors::*;
use crate::video::BufferHandle;

use self::changes::Changes;

pub trait BufferedData: fmt::Debug {
    /// Components per point, typically 3.
    fn columns(&self) -> usize;

    /// The total number of floats.
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Result<f32>;

    /// The floats to upload into a backend buffer.
    fn data(&self) -> Cow<[f32]>;

    /// The backend buffer of this very instance, created on the first draw.
    fn buffer_cell(&self) -> &BufferCell;

    /// The number of points.
    fn rows(&self) -> usize {
        if self.columns() == 0 {
            0
        } else {
            self.len() / self.columns()
        }
    }

    /// The number of points drawn per instance.
    fn instance_length(&self) -> usize {
        self.rows()
    }

    fn instances(&self) -> usize {
        match self.instance_length() {
            0 => 0,
            n => self.rows() / n,
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the points describe a shape, which could be drawn as
    /// outline or filled.
    fn is_geometry(&self) -> bool {
        false
    }

    fn set(&mut self, _: usize, _: f32) -> Result<()> {
        Err(Error::Immutable)
    }

    /// Returns and clears the ranges written since the last call.
    fn take_changes(&self) -> Option<Changes> {
        None
    }

    /// The boundary edges of this geometry, as pairs of points.
    fn outline(&self) -> Result<Option<&dyn BufferedData>> {
        Ok(None)
    }

    /// The triangles filling this geometry.
    fn fill(&self) -> Result<Option<&dyn BufferedData>> {
        Ok(None)
    }
}

/// A backend buffer created for some buffered data, and the number of floats
/// it has been allocated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSlot {
    pub handle: BufferHandle,
    pub len: usize,
}

/// Lazily assigned backend buffer of a single buffered data instance.
#[derive(Debug, Default)]
pub struct BufferCell(Cell<Option<BufferSlot>>);

impl BufferCell {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn get(&self) -> Option<BufferSlot> {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, slot: BufferSlot) {
        self.0.set(Some(slot));
    }

    /// Forgets the backend buffer, e.g. after the data has been cleared.
    #[inline]
    pub fn reset(&self) -> Option<BufferSlot> {
        self.0.take()
    }
}

impl Clone for BufferCell {
    /// Cloned data gets a buffer of its own.
    fn clone(&self) -> Self {
        BufferCell::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    Points,
    Outline,
    Fill,
}

impl DrawMode {
    pub fn name(self) -> &'static str {
        match self {
            DrawMode::Points => "points",
            DrawMode::Outline => "outline",
            DrawMode::Fill => "fill",
        }
    }
}

/// How a backend assembles points into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineLoop,
    Triangles,
}

/// The data and primitive kind a draw call consumes.
#[derive(Debug, Clone, Copy)]
pub struct Primitive<'a> {
    pub kind: PrimitiveKind,
    pub data: &'a dyn BufferedData,
}

impl<'a> Primitive<'a> {
    /// Selects what to draw for `mode`. Outlines and fills require geometry;
    /// geometry without dedicated views is drawn as a line loop or as a
    /// triangle list.
    pub fn select(data: &'a dyn BufferedData, mode: DrawMode) -> Result<Self> {
        if mode != DrawMode::Points && !data.is_geometry() {
            return Err(Error::NotGeometry(mode.name()));
        }

        let primitive = match mode {
            DrawMode::Points => Primitive {
                kind: PrimitiveKind::Points,
                data,
            },
            DrawMode::Outline => match data.outline()? {
                Some(v) => Primitive {
                    kind: PrimitiveKind::Lines,
                    data: v,
                },
                None => Primitive {
                    kind: PrimitiveKind::LineLoop,
                    data,
                },
            },
            DrawMode::Fill => Primitive {
                kind: PrimitiveKind::Triangles,
                data: data.fill()?.unwrap_or(data),
            },
        };

        Ok(primitive)
    }
}

#[cfg(test)]
mod test {
    use super::prelude::*;
    use super::*;

    #[test]
    fn select() {
        let mut data = BufferData::new(3);
        data.add_range(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

        let points = Primitive::select(&data, DrawMode::Points).unwrap();
        assert_eq!(points.kind, PrimitiveKind::Points);

        match Primitive::select(&data, DrawMode::Fill) {
            Err(Error::NotGeometry(_)) => {}
            other => panic!("unexpected {:?}", other.map(|v| v.kind)),
        }

        let data = data.into_geometry();
        let fill = Primitive::select(&data, DrawMode::Fill).unwrap();
        assert_eq!(fill.kind, PrimitiveKind::Triangles);
        assert_eq!(fill.data.rows(), 3);

        let outline = Primitive::select(&data, DrawMode::Outline).unwrap();
        assert_eq!(outline.kind, PrimitiveKind::LineLoop);
    }

    #[test]
    fn cells() {
        let cell = BufferCell::new();
        assert!(cell.get().is_none());

        let slot = BufferSlot {
            handle: crate::utils::handle::Handle::new(1, 1).into(),
            len: 9,
        };

        cell.set(slot);
        assert_eq!(cell.get(), Some(slot));
        assert!(cell.clone().get().is_none());
        assert_eq!(cell.reset(), Some(slot));
        assert!(cell.get().is_none());
    }
}
