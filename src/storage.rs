use std::cmp::min;

/// Slot arena with stable indices.
///
/// Freed slots are reused by later allocations; the index of a live value
/// never changes.
pub struct Storage<T> {
    data: Vec<Option<T>>,
    /// Index of the first *possibly* free (non-occupied) cell.
    min_free: usize,
    /// Number of occupied cells.
    real_size: usize,
}

impl<T> Storage<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            min_free: 0,
            real_size: 0,
        }
    }

    /// Number of cells ever allocated (occupied or not).
    pub fn size(&self) -> usize {
        self.data.len()
    }
    /// Number of occupied cells.
    pub fn real_size(&self) -> usize {
        self.real_size
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        matches!(self.data.get(index), Some(Some(_)))
    }

    pub fn get(&self, index: usize) -> &T {
        match self.data.get(index) {
            Some(Some(value)) => value,
            _ => panic!("Index {} is not occupied", index),
        }
    }

    pub fn get_mut(&mut self, index: usize) -> &mut T {
        match self.data.get_mut(index) {
            Some(Some(value)) => value,
            _ => panic!("Index {} is not occupied", index),
        }
    }

    /// Store `value` in the first free cell and return its index.
    pub fn alloc(&mut self, value: T) -> usize {
        let index = (self.min_free..self.data.len())
            .find(|&i| self.data[i].is_none())
            .unwrap_or(self.data.len());

        if index == self.data.len() {
            self.data.push(Some(value));
        } else {
            self.data[index] = Some(value);
        }

        self.min_free = index + 1;
        self.real_size += 1;

        index
    }

    /// Drop the value at the given index.
    pub fn drop(&mut self, index: usize) {
        assert!(self.is_occupied(index), "Index {} is not occupied", index);

        self.data[index] = None;
        self.min_free = min(self.min_free, index);
        self.real_size -= 1;
    }

    /// Indices of all occupied cells.
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc() {
        let mut storage = Storage::with_capacity(2);
        assert_eq!(storage.alloc(10), 0);
        assert_eq!(storage.alloc(20), 1);
        assert_eq!(storage.alloc(30), 2);
        assert_eq!(*storage.get(1), 20);
        assert_eq!(storage.real_size(), 3);
    }

    #[test]
    fn test_drop_and_reuse() {
        let mut storage = Storage::with_capacity(4);
        let a = storage.alloc(1);
        let b = storage.alloc(2);
        let c = storage.alloc(3);
        storage.drop(b);
        assert!(!storage.is_occupied(b));
        assert_eq!(storage.real_size(), 2);
        assert_eq!(storage.alloc(4), b);
        assert_eq!(storage.alloc(5), 3);
        assert_eq!(*storage.get(a), 1);
        assert_eq!(*storage.get(c), 3);
        assert_eq!(storage.occupied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_get_mut() {
        let mut storage = Storage::with_capacity(1);
        let i = storage.alloc(String::from("a"));
        storage.get_mut(i).push('b');
        assert_eq!(storage.get(i), "ab");
    }

    #[test]
    #[should_panic(expected = "is not occupied")]
    fn test_get_freed() {
        let mut storage = Storage::with_capacity(1);
        let i = storage.alloc(42);
        storage.drop(i);
        storage.get(i);
    }
}
