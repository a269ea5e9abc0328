use std::borrow::Cow;
use std::cell::RefCell;
use std::cmp;

use crate::errors::*;

use super::changes::{Change, Changes};
use super::{BufferCell, BufferedData};

/// Writes closer than this to the pending change extend it, instead of
/// starting a new one.
pub const WRITE_WINDOW: usize = 5;

#[derive(Debug, Clone, Default)]
struct Tracker {
    pending: Option<Change>,
    changes: Changes,
}

impl Tracker {
    fn write(&mut self, index: usize) {
        if let Some(ref mut v) = self.pending {
            if index + WRITE_WINDOW >= v.start && index < v.end + WRITE_WINDOW {
                v.start = cmp::min(v.start, index);
                v.end = cmp::max(v.end, index + 1);
                return;
            }
        }

        self.flush();
        self.pending = Some(Change::at(index));
    }

    fn flush(&mut self) {
        if let Some(v) = self.pending.take() {
            self.changes.add(v);
        }
    }
}

/// Fixed size buffered data supporting in place writes. Written ranges are
/// recorded, so only the dirty parts have to be uploaded again.
#[derive(Debug, Clone)]
pub struct MutableBufferData {
    values: Vec<f32>,
    columns: usize,
    instance_length: Option<usize>,
    geometry: bool,
    tracker: RefCell<Tracker>,
    cell: BufferCell,
}

impl MutableBufferData {
    pub fn new(columns: usize, values: Vec<f32>) -> Result<Self> {
        if columns == 0 || values.len() % columns != 0 {
            return Err(Error::InvalidShape(format!(
                "{} values can not be split into rows of {}",
                values.len(),
                columns
            )));
        }

        Ok(MutableBufferData {
            values,
            columns,
            instance_length: None,
            geometry: false,
            tracker: RefCell::new(Tracker::default()),
            cell: BufferCell::new(),
        })
    }

    pub fn with_instance_length(mut self, len: usize) -> Self {
        self.instance_length = Some(len);
        self
    }

    pub fn into_geometry(mut self) -> Self {
        self.geometry = true;
        self
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Writes a whole row of `columns` values.
    pub fn set_row(&mut self, row: usize, values: &[f32]) -> Result<()> {
        if values.len() != self.columns {
            return Err(Error::InvalidShape(format!(
                "a row has {} columns, got {} values",
                self.columns,
                values.len()
            )));
        }

        for (i, &v) in values.iter().enumerate() {
            self.set(row * self.columns + i, v)?;
        }

        Ok(())
    }

    /// Returns true if any write has not been taken yet.
    pub fn is_dirty(&self) -> bool {
        let tracker = self.tracker.borrow();
        tracker.pending.is_some() || !tracker.changes.is_empty()
    }
}

impl BufferedData for MutableBufferData {
    #[inline]
    fn columns(&self) -> usize {
        self.columns
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

    fn instance_length(&self) -> usize {
        self.instance_length.unwrap_or_else(|| self.rows())
    }

    #[inline]
    fn is_geometry(&self) -> bool {
        self.geometry
    }

    fn set(&mut self, index: usize, value: f32) -> Result<()> {
        let len = self.values.len();
        let v = self
            .values
            .get_mut(index)
            .ok_or(Error::OutOfBounds { index, len })?;

        *v = value;
        self.tracker.borrow_mut().write(index);
        Ok(())
    }

    fn take_changes(&self) -> Option<Changes> {
        let mut tracker = self.tracker.borrow_mut();
        tracker.flush();

        if tracker.changes.is_empty() {
            None
        } else {
            Some(::std::mem::replace(&mut tracker.changes, Changes::new()))
        }
    }
}
