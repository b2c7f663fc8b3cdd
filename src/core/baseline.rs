use std::sync::{Mutex, MutexGuard, PoisonError};

/// A `Mutex<Vec<_>>` stack, used as the reference point in stress runs and
/// benchmarks.
#[derive(Debug, Default)]
pub struct MutexStack<V> {
    items: Mutex<Vec<V>>,
}

impl<V> MutexStack<V> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    // A panicking worker must not hide the elements from the final count.
    fn lock(&self) -> MutexGuard<'_, Vec<V>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, value: V) {
        self.lock().push(value);
    }

    pub fn pop(&self) -> Option<V> {
        self.lock().pop()
    }

    pub fn peek_cloned(&self) -> Option<V>
    where
        V: Clone,
    {
        self.lock().last().cloned()
    }

    pub fn extend_from(&self, items: Vec<V>) {
        self.lock().extend(items);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo() {
        let stack = MutexStack::new();
        stack.push(1);
        stack.extend_from(vec![2, 3]);

        assert_eq!(stack.peek_cloned(), Some(3));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.len(), 1);
        assert!(!stack.is_empty());
    }
}
