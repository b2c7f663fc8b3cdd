use crate::domain::model::{Implementation, OperationMix};

/// The surface a workload needs from a stack. Values come back owned so the
/// lock free and lock based implementations can be driven by the same code.
pub trait ConcurrentStack<V>: Send + Sync {
    fn name(&self) -> &'static str;
    fn push(&self, value: V);
    fn pop_value(&self) -> Option<V>;
    fn peek_value(&self) -> Option<V>;
    /// Pushes `items` in order as a single step, so the last item ends on top.
    fn append_items(&self, items: Vec<V>);
    fn len(&self) -> usize;
}

pub trait WorkloadProvider {
    fn threads(&self) -> usize;
    fn operations_per_thread(&self) -> usize;
    fn seed(&self) -> u64;
    fn mix(&self) -> OperationMix;
    fn implementation(&self) -> Implementation;
}
