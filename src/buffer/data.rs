use std::borrow::Cow;
use std::cell::RefCell;

use crate::errors::*;

use super::changes::{Change, Changes};
use super::{BufferCell, BufferedData};

/// The number of floats a fresh `BufferData` can hold before growing.
pub const INITIAL_CAPACITY: usize = 10;

/// Growth factor of the capacity on overflow.
pub const GROWTH: usize = 4;

/// Append-only buffered data, intended for incremental construction on the
/// host before the upload.
#[derive(Debug, Clone)]
pub struct BufferData {
    values: Vec<f32>,
    columns: usize,
    instance_length: Option<usize>,
    geometry: bool,
    changes: RefCell<Changes>,
    cell: BufferCell,
}

impl BufferData {
    pub fn new(columns: usize) -> Self {
        BufferData {
            values: Vec::with_capacity(INITIAL_CAPACITY),
            columns,
            instance_length: None,
            geometry: false,
            changes: RefCell::new(Changes::new()),
            cell: BufferCell::new(),
        }
    }

    /// Creates data out of `values`, which must hold whole rows.
    pub fn from_values(columns: usize, values: &[f32]) -> Result<Self> {
        if columns == 0 || values.len() % columns != 0 {
            return Err(Error::InvalidShape(format!(
                "{} values can not be split into rows of {}",
                values.len(),
                columns
            )));
        }

        let mut data = BufferData::new(columns);
        data.add_range(values);
        Ok(data)
    }

    /// Groups every `len` points into an instance.
    pub fn with_instance_length(mut self, len: usize) -> Self {
        self.instance_length = Some(len);
        self
    }

    /// Flags the points as a triangle list.
    pub fn into_geometry(mut self) -> Self {
        self.geometry = true;
        self
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn add(&mut self, value: f32) {
        self.reserve(1);
        self.values.push(value);
        self.changes.borrow_mut().add(Change::at(self.values.len() - 1));
    }

    pub fn add_range(&mut self, values: &[f32]) {
        if values.is_empty() {
            return;
        }

        let start = self.values.len();
        self.reserve(values.len());
        self.values.extend_from_slice(values);
        self.changes.borrow_mut().add(Change {
            start,
            end: self.values.len(),
        });
    }

    /// Drops every value, shrinks back to the initial capacity and discards
    /// the recorded changes.
    pub fn clear(&mut self) {
        self.values = Vec::with_capacity(INITIAL_CAPACITY);
        self.changes.borrow_mut().clear();
    }

    fn reserve(&mut self, additional: usize) {
        let required = self.values.len() + additional;
        let mut capacity = self.values.capacity().max(1);
        while capacity < required {
            capacity *= GROWTH;
        }

        if capacity > self.values.capacity() {
            trace!("[BufferData] grows from {} to {} floats.", self.values.capacity(), capacity);
            self.values.reserve_exact(capacity - self.values.len());
        }
    }
}

impl BufferedData for BufferData {
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
        self.changes.borrow_mut().add(Change::at(index));
        Ok(())
    }

    fn take_changes(&self) -> Option<Changes> {
        let mut changes = self.changes.borrow_mut();
        if changes.is_empty() {
            None
        } else {
            Some(::std::mem::replace(&mut *changes, Changes::new()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn growth() {
        let mut data = BufferData::new(1);
        assert_eq!(data.capacity(), INITIAL_CAPACITY);

        for i in 0..11 {
            data.add(i as f32);
        }

        assert_eq!(data.capacity(), INITIAL_CAPACITY * GROWTH);

        data.clear();
        assert_eq!(data.capacity(), INITIAL_CAPACITY);
        assert!(data.is_empty());
        assert!(data.take_changes().is_none());
    }

    #[test]
    fn instances() {
        let data = BufferData::from_values(3, &[0.0; 18]).unwrap();
        assert_eq!(data.rows(), 6);
        assert_eq!(data.instances(), 1);

        let data = data.with_instance_length(3);
        assert_eq!(data.instance_length(), 3);
        assert_eq!(data.instances(), 2);

        assert!(BufferData::from_values(3, &[0.0; 4]).is_err());
    }

    #[test]
    fn writes() {
        let mut data = BufferData::from_values(2, &[0.0; 4]).unwrap();
        data.take_changes();

        data.set(3, 1.0).unwrap();
        assert_eq!(data.get(3).unwrap(), 1.0);
        assert!(data.set(4, 1.0).is_err());

        let changes = data.take_changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert!(data.take_changes().is_none());
    }
}
