use std::borrow::Borrow;

use super::handle::{Handle, HandleIndex};

/// `HandlePool` issues handles with recycled indices. Odd versions mark a slot
/// as alive, even versions as free.
#[derive(Debug, Default)]
pub struct HandlePool {
    versions: Vec<HandleIndex>,
    frees: Vec<HandleIndex>,
}

impl HandlePool {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn create<T: From<Handle>>(&mut self) -> T {
        let handle = match self.frees.pop() {
            Some(index) => {
                self.versions[index as usize] += 1;
                Handle::new(index, self.versions[index as usize])
            }
            None => {
                self.versions.push(1);
                Handle::new(self.versions.len() as HandleIndex - 1, 1)
            }
        };

        handle.into()
    }

    pub fn contains<T: Borrow<Handle>>(&self, handle: T) -> bool {
        let handle = handle.borrow();
        match self.versions.get(handle.index() as usize) {
            Some(&v) => v & 0x1 == 1 && v == handle.version(),
            None => false,
        }
    }

    pub fn free<T: Borrow<Handle>>(&mut self, handle: T) -> bool {
        let handle = *handle.borrow();
        if !self.contains(handle) {
            return false;
        }

        self.versions[handle.index() as usize] += 1;
        self.frees.push(handle.index());
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len() - self.frees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reuse() {
        let mut pool = HandlePool::new();
        let h1: Handle = pool.create();
        let h2: Handle = pool.create();
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(h1) && pool.contains(h2));

        assert!(pool.free(h1));
        assert!(!pool.free(h1));
        assert!(!pool.contains(h1));

        let h3: Handle = pool.create();
        assert_eq!(h3.index(), h1.index());
        assert!(h3.version() > h1.version());
        assert!(!pool.contains(h1));
        assert_eq!(pool.len(), 2);
    }
}
