//! Dirty index ranges of mutable buffered data, used to re-upload only the
//! parts of a buffer that have been modified since the last flush.

use std::cmp;

use crate::errors::*;

/// Ranges closer than this are merged into one, trading a little over-upload
/// for fewer upload calls.
pub const MIN_DISTANCE: usize = 64;

/// A half-open range `[start, end)` of modified indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Change {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Change {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidChange { start, end });
        }

        Ok(Change { start, end })
    }

    /// The change of the single index `index`.
    #[inline]
    pub fn at(index: usize) -> Self {
        Change {
            start: index,
            end: index + 1,
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// The smallest change covering both `self` and `rhs`.
    pub fn cover(&self, rhs: &Change) -> Change {
        Change {
            start: cmp::min(self.start, rhs.start),
            end: cmp::max(self.end, rhs.end),
        }
    }

    /// Returns true if `rhs` overlaps `self`, or if the span covering both is
    /// shorter than `MIN_DISTANCE`.
    pub fn is_near(&self, rhs: &Change) -> bool {
        let overlaps = self.start < rhs.end && rhs.start < self.end;
        overlaps || self.cover(rhs).len() < MIN_DISTANCE
    }

    /// Shifts the range by `offset` indices.
    pub fn offset(&self, offset: usize) -> Change {
        Change {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A sorted list of disjoint changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes(Vec<Change>);

impl Changes {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records `change`, merging it with every range near it.
    pub fn add(&mut self, change: Change) {
        let mut merged = change;

        loop {
            let len = self.0.len();
            self.0.retain(|v| {
                if v.is_near(&merged) {
                    merged = merged.cover(v);
                    false
                } else {
                    true
                }
            });

            if self.0.len() == len {
                break;
            }
        }

        let position = self
            .0
            .iter()
            .position(|v| merged.end <= v.start)
            .unwrap_or_else(|| self.0.len());

        self.0.insert(position, merged);
    }

    /// Records `[start, end)`.
    pub fn add_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.add(Change::new(start, end)?);
        Ok(())
    }

    /// Merges every range of `rhs`, shifted by `offset`.
    pub fn merge(&mut self, rhs: &Changes, offset: usize) {
        for v in rhs.iter() {
            self.add(v.offset(offset));
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[inline]
    pub fn iter(&self) -> ::std::slice::Iter<Change> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of indices covered by all the changes.
    pub fn total(&self) -> usize {
        self.0.iter().map(|v| v.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Changes {
    type Item = &'a Change;
    type IntoIter = ::std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invalid() {
        match Change::new(4, 4) {
            Err(Error::InvalidChange { start, end }) => {
                assert_eq!(start, 4);
                assert_eq!(end, 4);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(Change::new(5, 1).is_err());
        assert_eq!(Change::new(1, 5).unwrap().len(), 4);
    }

    #[test]
    fn merge() {
        let mut changes = Changes::new();
        changes.add_range(0, 4).unwrap();
        changes.add_range(10, 12).unwrap();
        assert_eq!(changes.len(), 1);

        let v = changes.iter().next().unwrap();
        assert_eq!((v.start(), v.end()), (0, 12));
    }

    #[test]
    fn insert_sorted() {
        let mut changes = Changes::new();
        changes.add_range(1000, 1001).unwrap();
        changes.add_range(0, 1).unwrap();
        changes.add_range(500, 510).unwrap();

        let starts: Vec<_> = changes.iter().map(|v| v.start()).collect();
        assert_eq!(starts, vec![0, 500, 1000]);
    }

    #[test]
    fn bridge() {
        let mut changes = Changes::new();
        changes.add_range(0, 10).unwrap();
        changes.add_range(100, 110).unwrap();
        changes.add_range(50, 120).unwrap();

        let ranges: Vec<_> = changes.iter().map(|v| (v.start(), v.end())).collect();
        assert_eq!(ranges, vec![(0, 10), (50, 120)]);
        assert_eq!(changes.total(), 80);
    }

    #[test]
    fn offsets() {
        let mut a = Changes::new();
        a.add_range(0, 2).unwrap();

        let mut b = Changes::new();
        b.merge(&a, 200);
        assert_eq!(b.iter().next().unwrap(), &Change::new(200, 202).unwrap());

        b.clear();
        assert!(b.is_empty());
    }
}
