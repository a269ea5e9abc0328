use std::borrow::Borrow;

use super::handle::Handle;

/// Storage of backend objects addressed by `Handle`. A slot only answers to the
/// handle version it was created with.
#[derive(Debug)]
pub struct DataVec<T> {
    buf: Vec<Option<T>>,
    versions: Vec<u32>,
}

impl<T> Default for DataVec<T> {
    fn default() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }
}

impl<T> DataVec<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get<H: Borrow<Handle>>(&self, handle: H) -> Option<&T> {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].as_ref(),
            _ => None,
        }
    }

    pub fn get_mut<H: Borrow<Handle>>(&mut self, handle: H) -> Option<&mut T> {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].as_mut(),
            _ => None,
        }
    }

    pub fn create<H: Borrow<Handle>>(&mut self, handle: H, value: T) {
        let handle = handle.borrow();
        let index = handle.index() as usize;

        while self.buf.len() <= index {
            self.buf.push(None);
            self.versions.push(0);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H: Borrow<Handle>>(&mut self, handle: H) -> Option<T> {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].take(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn versions() {
        let mut v = DataVec::new();
        v.create(Handle::new(3, 1), "program");
        assert_eq!(v.get(Handle::new(3, 1)), Some(&"program"));
        assert_eq!(v.get(Handle::new(3, 3)), None);
        assert_eq!(v.get(Handle::new(0, 1)), None);
        assert_eq!(v.len(), 1);

        assert_eq!(v.free(Handle::new(3, 1)), Some("program"));
        assert!(v.is_empty());
    }
}
