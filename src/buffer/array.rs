use std::borrow::Cow;

use crate::errors::*;

use super::changes::Changes;
use super::{BufferCell, BufferedData};

/// Concatenation of several buffered data sharing the same layout. The parts
/// are drawn as one buffer, with their instances added up.
#[derive(Debug)]
pub struct BufferedDataArray {
    parts: Vec<Box<dyn BufferedData>>,
    columns: usize,
    instance_length: usize,
    cell: BufferCell,
}

impl BufferedDataArray {
    pub fn new(parts: Vec<Box<dyn BufferedData>>) -> Result<Self> {
        let (columns, instance_length) = match parts.first() {
            Some(v) => (v.columns(), v.instance_length()),
            None => {
                return Err(Error::InvalidShape(
                    "an array needs at least one part".to_owned(),
                ))
            }
        };

        for v in &parts {
            if v.columns() != columns || v.instance_length() != instance_length {
                return Err(Error::InvalidShape(format!(
                    "parts of {}x{} and {}x{} points can not be concatenated",
                    instance_length,
                    columns,
                    v.instance_length(),
                    v.columns()
                )));
            }
        }

        Ok(BufferedDataArray {
            parts,
            columns,
            instance_length,
            cell: BufferCell::new(),
        })
    }

    #[inline]
    pub fn parts(&self) -> &[Box<dyn BufferedData>] {
        &self.parts
    }

    /// Finds the part owning `index`, and the index inside of it.
    fn locate(&self, mut index: usize) -> Result<(usize, usize)> {
        let len = self.len();
        for (i, v) in self.parts.iter().enumerate() {
            if index < v.len() {
                return Ok((i, index));
            }

            index -= v.len();
        }

        Err(Error::OutOfBounds {
            index: len + index,
            len,
        })
    }
}

impl BufferedData for BufferedDataArray {
    #[inline]
    fn columns(&self) -> usize {
        self.columns
    }

    fn len(&self) -> usize {
        self.parts.iter().map(|v| v.len()).sum()
    }

    fn get(&self, index: usize) -> Result<f32> {
        let (part, index) = self.locate(index)?;
        self.parts[part].get(index)
    }

    fn data(&self) -> Cow<[f32]> {
        let mut values = Vec::with_capacity(self.len());
        for v in &self.parts {
            values.extend_from_slice(&v.data());
        }

        Cow::Owned(values)
    }

    #[inline]
    fn buffer_cell(&self) -> &BufferCell {
        &self.cell
    }

    #[inline]
    fn instance_length(&self) -> usize {
        self.instance_length
    }

    fn instances(&self) -> usize {
        self.parts.iter().map(|v| v.instances()).sum()
    }

    fn is_geometry(&self) -> bool {
        self.parts.iter().all(|v| v.is_geometry())
    }

    fn set(&mut self, index: usize, value: f32) -> Result<()> {
        let (part, index) = self.locate(index)?;
        self.parts[part].set(index, value)
    }

    fn take_changes(&self) -> Option<Changes> {
        let mut changes = Changes::new();
        let mut offset = 0;
        for v in &self.parts {
            if let Some(part) = v.take_changes() {
                changes.merge(&part, offset);
            }

            offset += v.len();
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes)
        }
    }
}
