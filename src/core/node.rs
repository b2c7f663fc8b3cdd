use std::ptr::null_mut;
use std::sync::atomic::AtomicPtr;

/// A single heap cell of the stack. Nodes are only ever created through
/// [`Node::alloc`] and released through exactly one of [`Node::free`],
/// [`Node::into_value`] or retirement to the hazard pointer domain.
pub(crate) struct Node<V> {
    pub(crate) val: V,
    pub(crate) next: AtomicPtr<Node<V>>,
}

impl<V> Node<V> {
    pub(crate) fn alloc(val: V) -> *mut Self {
        Box::into_raw(Box::new(Node {
            val,
            next: AtomicPtr::new(null_mut()),
        }))
    }

    /// # Safety
    ///
    /// `raw` must come from [`Node::alloc`], must not be reachable by any
    /// other thread and must not be used afterwards.
    pub(crate) unsafe fn free(raw: *mut Self) {
        drop(Box::from_raw(raw));
    }

    /// # Safety
    ///
    /// Same contract as [`Node::free`].
    pub(crate) unsafe fn into_value(raw: *mut Self) -> V {
        let node = Box::from_raw(raw);
        node.val
    }
}
