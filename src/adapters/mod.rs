// Adapters layer: binds the concrete stacks to the `ConcurrentStack` port.

use crate::core::baseline::MutexStack;
use crate::core::stack::Stack;
use crate::domain::ports::ConcurrentStack;

impl<V> ConcurrentStack<V> for Stack<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "lockfree"
    }

    fn push(&self, value: V) {
        Stack::push(self, value);
    }

    fn pop_value(&self) -> Option<V> {
        self.pop().map(|entry| (*entry).clone())
    }

    fn peek_value(&self) -> Option<V> {
        self.peek().map(|entry| (*entry).clone())
    }

    fn append_items(&self, items: Vec<V>) {
        self.append(items.into_iter().collect());
    }

    fn len(&self) -> usize {
        Stack::len(self)
    }
}

impl<V> ConcurrentStack<V> for MutexStack<V>
where
    V: Clone + Send,
{
    fn name(&self) -> &'static str {
        "mutex"
    }

    fn push(&self, value: V) {
        MutexStack::push(self, value);
    }

    fn pop_value(&self) -> Option<V> {
        self.pop()
    }

    fn peek_value(&self) -> Option<V> {
        self.peek_cloned()
    }

    fn append_items(&self, items: Vec<V>) {
        self.extend_from(items);
    }

    fn len(&self) -> usize {
        MutexStack::len(self)
    }
}
