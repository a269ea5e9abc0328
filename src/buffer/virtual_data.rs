use std::borrow::Cow;
use std::ops::Mul;

use crate::errors::*;

use super::changes::Changes;
use super::{BufferCell, BufferedData};

/// Logical repetition of `base`, without copying it.
///
/// A virtual index `i` maps to `base[i / repeat]`, and the repetitions are
/// drawn as instances of the base buffer, which is uploaded once.
#[derive(Debug, Clone)]
pub struct VirtualBufferData<B: BufferedData> {
    base: B,
    repeat: usize,
}

impl<B: BufferedData> VirtualBufferData<B> {
    pub fn new(base: B, repeat: usize) -> Result<Self> {
        if repeat == 0 {
            return Err(Error::InvalidShape("repeat count must be positive".to_owned()));
        }

        if base.len().checked_mul(repeat).is_none() {
            return Err(Error::InvalidShape(format!(
                "{} values repeated {} times overflow",
                base.len(),
                repeat
            )));
        }

        Ok(VirtualBufferData { base, repeat })
    }

    #[inline]
    pub fn repeat(&self) -> usize {
        self.repeat
    }

    #[inline]
    pub fn base(&self) -> &B {
        &self.base
    }

    #[inline]
    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    pub fn into_inner(self) -> B {
        self.base
    }
}

/// Repeating a repetition multiplies the counts instead of nesting wrappers.
impl<B: BufferedData> Mul<usize> for VirtualBufferData<B> {
    type Output = Result<VirtualBufferData<B>>;

    fn mul(self, rhs: usize) -> Self::Output {
        let repeat = self.repeat.checked_mul(rhs).ok_or_else(|| {
            Error::InvalidShape(format!("repeating {} times by {} overflows", self.repeat, rhs))
        })?;

        VirtualBufferData::new(self.base, repeat)
    }
}

impl<B: BufferedData> BufferedData for VirtualBufferData<B> {
    #[inline]
    fn columns(&self) -> usize {
        self.base.columns()
    }

    #[inline]
    fn len(&self) -> usize {
        self.base.len().saturating_mul(self.repeat)
    }

    fn get(&self, index: usize) -> Result<f32> {
        if index >= self.len() {
            return Err(Error::OutOfBounds {
                index,
                len: self.len(),
            });
        }

        self.base.get(index / self.repeat)
    }

    fn data(&self) -> Cow<[f32]> {
        self.base.data()
    }

    #[inline]
    fn buffer_cell(&self) -> &BufferCell {
        self.base.buffer_cell()
    }

    fn instance_length(&self) -> usize {
        self.base.instance_length()
    }

    fn instances(&self) -> usize {
        self.base.instances().saturating_mul(self.repeat)
    }

    fn is_geometry(&self) -> bool {
        self.base.is_geometry()
    }

    fn set(&mut self, index: usize, value: f32) -> Result<()> {
        if index >= self.len() {
            return Err(Error::OutOfBounds {
                index,
                len: self.len(),
            });
        }

        self.base.set(index / self.repeat, value)
    }

    fn take_changes(&self) -> Option<Changes> {
        self.base.take_changes()
    }
}

#[cfg(test)]
mod test {
    use super::super::data::BufferData;
    use super::*;

    #[test]
    fn indexing() {
        let base = BufferData::from_values(3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let data = VirtualBufferData::new(base, 3).unwrap();

        assert_eq!(data.instances(), 3);
        assert_eq!(data.len(), 18);
        assert_eq!(data.get(0).unwrap(), 1.0);
        assert_eq!(data.get(2).unwrap(), 1.0);
        assert_eq!(data.get(3).unwrap(), 2.0);
        assert_eq!(data.get(17).unwrap(), 6.0);
        assert!(data.get(18).is_err());
        assert_eq!(data.data().len(), 6);
    }

    #[test]
    fn flatten() {
        let base = BufferData::from_values(1, &[1.0]).unwrap();
        let data = (VirtualBufferData::new(base, 2).unwrap() * 5).unwrap();
        assert_eq!(data.repeat(), 10);
        assert_eq!(data.instances(), 10);

        assert!(VirtualBufferData::new(data.into_inner(), 0).is_err());
    }

    #[test]
    fn huge_repeats() {
        let base = BufferData::from_values(1, &[1.0, 2.0]).unwrap();
        let data = VirtualBufferData::new(base, 2).unwrap();
        match data.clone() * usize::max_value() {
            Err(Error::InvalidShape(_)) => {}
            other => panic!("unexpected {:?}", other.map(|v| v.repeat())),
        }

        assert!(VirtualBufferData::new(data.into_inner(), usize::max_value()).is_err());
    }

    #[test]
    fn writes() {
        let base = BufferData::from_values(1, &[0.0, 0.0]).unwrap();
        let mut data = VirtualBufferData::new(base, 4).unwrap();
        data.take_changes();

        data.set(5, 2.0).unwrap();
        assert_eq!(data.base().get(1).unwrap(), 2.0);
        assert_eq!(data.get(7).unwrap(), 2.0);
        assert!(data.take_changes().is_some());
    }
}
