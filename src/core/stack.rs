use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::{null_mut, NonNull};
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use haphazard::{Domain, HazardPointer, Singleton};

use super::node::Node;

/// Family tag for the hazard pointer domain that owns every retired stack node.
struct NodeFamily;

// There is exactly one `Domain<NodeFamily>`: `NODE_DOMAIN` below.
unsafe impl Singleton for NodeFamily {}

static NODE_DOMAIN: Domain<NodeFamily> = Domain::new(&NodeFamily);

/// Runs a reclamation pass over every retired node that is no longer protected
/// by an [`Entry`], returning how many were freed.
pub fn reclaim_retired() -> usize {
    let reclaimed = NODE_DOMAIN.eager_reclaim();
    if reclaimed > 0 {
        tracing::trace!(reclaimed, "reclaimed retired nodes");
    }
    reclaimed
}

/// A lock free LIFO stack.
///
/// `push`, `pop`, `peek` and `append` all take `&self` and may be called from
/// any number of threads at once. Popped values are not dropped immediately:
/// `pop` and `peek` hand out an [`Entry`] that keeps the value alive until the
/// entry is dropped and a later reclamation pass runs.
pub struct Stack<V> {
    head: AtomicPtr<Node<V>>,
    len: AtomicUsize,
    _marker: PhantomData<*const V>,
}

unsafe impl<V: Send> Send for Stack<V> {}
unsafe impl<V: Send + Sync> Sync for Stack<V> {}

impl<V> Stack<V> {
    pub fn new() -> Self {
        Stack {
            head: AtomicPtr::new(null_mut()),
            len: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Number of elements in the stack.
    ///
    /// Under contention this is an upper bound: a push is counted just before
    /// it is published and a pop is uncounted just after it unlinks.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire).is_null()
    }

    pub fn push(&self, val: V) {
        let node = Node::alloc(val);
        self.len.fetch_add(1, Ordering::Relaxed);

        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            // Not yet published, so nobody else can observe this store.
            unsafe { (*node).next.store(head, Ordering::Relaxed) };

            match self
                .head
                .compare_exchange_weak(head, node, Ordering::Release, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(now) => head = now,
            }
        }
    }

    /// Returns a protected view of the top element without removing it.
    pub fn peek(&self) -> Option<Entry<'_, V>> {
        let mut hazard = HazardPointer::new_in_domain(&NODE_DOMAIN);
        let node = hazard.protect_ptr(&self.head)?.0;

        Some(Entry {
            node,
            _hazard: hazard,
            _stack: PhantomData,
        })
    }

    /// Moves every element of `other` on top of this stack in a single step.
    ///
    /// The order of `other` is preserved, so its top becomes the new top.
    pub fn append(&self, mut other: Stack<V>) {
        let top = std::mem::replace(other.head.get_mut(), null_mut());
        *other.len.get_mut() = 0;

        if top.is_null() {
            return;
        }

        // `other` is owned, so its chain is private until the swap below.
        let mut tail = top;
        let mut count = 1;
        unsafe {
            loop {
                let next = (*tail).next.load(Ordering::Relaxed);
                if next.is_null() {
                    break;
                }
                tail = next;
                count += 1;
            }
        }

        self.len.fetch_add(count, Ordering::Relaxed);

        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            unsafe { (*tail).next.store(head, Ordering::Relaxed) };

            match self
                .head
                .compare_exchange_weak(head, top, Ordering::Release, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(now) => head = now,
            }
        }
    }
}

// Retired nodes outlive the stack in the shared domain, so their values must
// not borrow anything.
impl<V> Stack<V>
where
    V: Send + Sync + 'static,
{
    /// Unlinks the top element.
    ///
    /// The returned [`Entry`] keeps the value readable. Its node is retired and
    /// freed by the first reclamation pass after every entry protecting it has
    /// been dropped, which may run on another thread after this stack is gone.
    /// Values therefore cannot hold borrows:
    ///
    /// ```compile_fail
    /// use unlink::Stack;
    ///
    /// let alive = String::from("borrowed");
    /// let stack = Stack::new();
    /// stack.push(&alive);
    /// stack.pop();
    /// ```
    pub fn pop(&self) -> Option<Entry<'_, V>> {
        let mut hazard = HazardPointer::new_in_domain(&NODE_DOMAIN);

        loop {
            let node = hazard.protect_ptr(&self.head)?.0;

            // The hazard keeps `node` allocated even if another thread unlinks it.
            let next = unsafe { node.as_ref() }.next.load(Ordering::Acquire);

            if self
                .head
                .compare_exchange(node.as_ptr(), next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.len.fetch_sub(1, Ordering::Relaxed);

                // The node is unreachable from `head`; only hazards can still see it.
                unsafe {
                    NODE_DOMAIN.retire_ptr::<Node<V>, Box<Node<V>>>(node.as_ptr());
                }
                reclaim_retired();

                return Some(Entry {
                    node,
                    _hazard: hazard,
                    _stack: PhantomData,
                });
            }
        }
    }
}

impl<V> Default for Stack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Stack<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack").field("len", &self.len()).finish()
    }
}

impl<V> Drop for Stack<V> {
    fn drop(&mut self) {
        reclaim_retired();

        // Exclusive access: no entry can borrow a stack that is being dropped.
        let mut curr = *self.head.get_mut();
        while !curr.is_null() {
            unsafe {
                let next = (*curr).next.load(Ordering::Relaxed);
                Node::free(curr);
                curr = next;
            }
        }
    }
}

/// A hazard protected handle to a value in (or recently popped from) a
/// [`Stack`].
pub struct Entry<'a, V> {
    node: NonNull<Node<V>>,
    _hazard: HazardPointer<'static, NodeFamily>,
    _stack: PhantomData<&'a Stack<V>>,
}

impl<'a, V> Deref for Entry<'a, V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        unsafe { &self.node.as_ref().val }
    }
}

impl<'a, V: fmt::Debug> fmt::Debug for Entry<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&**self).finish()
    }
}

/// Owning iterator, top to bottom.
pub struct IntoIter<V> {
    stack: Stack<V>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.stack.head.get_mut();
        if head.is_null() {
            return None;
        }

        unsafe {
            let top = *head;
            *head = (*top).next.load(Ordering::Relaxed);

            let len = self.stack.len.get_mut();
            *len = len.saturating_sub(1);

            Some(Node::into_value(top))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.stack.len();
        (len, Some(len))
    }
}

impl<V> IntoIterator for Stack<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { stack: self }
    }
}

impl<V> FromIterator<V> for Stack<V> {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let stack = Stack::new();
        stack.extend_from(iter);
        stack
    }
}

impl<V> Extend<V> for Stack<V> {
    fn extend<T: IntoIterator<Item = V>>(&mut self, iter: T) {
        self.extend_from(iter);
    }
}

impl<V> Stack<V> {
    fn extend_from<T: IntoIterator<Item = V>>(&self, iter: T) {
        for val in iter {
            self.push(val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug)]
    struct CountOnDrop {
        val: i32,
        counter: Arc<AtomicUsize>,
    }

    impl Drop for CountOnDrop {
        fn drop(&mut self) {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counted(val: i32, counter: &Arc<AtomicUsize>) -> CountOnDrop {
        CountOnDrop {
            val,
            counter: counter.clone(),
        }
    }

    // Another test thread may be mid-pass over the shared domain, so give it a
    // few chances before asserting on what the pass freed.
    fn reclaim_until(counter: &AtomicUsize, expected: usize) {
        for _ in 0..1_000 {
            reclaim_retired();
            if counter.load(Ordering::SeqCst) >= expected {
                break;
            }
            thread::yield_now();
        }
        assert_eq!(counter.load(Ordering::SeqCst), expected);
    }

    #[test]
    fn test_push_front() {
        let stack = Stack::new();

        stack.push(1);

        assert_eq!(stack.len(), 1);
        assert!(!stack.is_empty());
        assert_eq!(*stack.peek().unwrap(), 1);
    }

    #[test]
    fn test_empty_stack() {
        let stack: Stack<u8> = Stack::default();

        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
        assert!(stack.peek().is_none());
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_lifo_order() {
        let stack = Stack::new();
        for i in 0..5 {
            stack.push(i);
        }

        let popped: Vec<i32> = std::iter::from_fn(|| stack.pop().map(|e| *e)).collect();

        assert_eq!(popped, vec![4, 3, 2, 1, 0]);
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_push_pop_sync() {
        let stack = Arc::new(Stack::new());

        let mut threads = vec![];

        for i in 0..10 {
            let stack = stack.clone();

            threads.push(thread::spawn(move || {
                let mut pushed = 0usize;
                let mut popped = 0usize;
                for _ in 0..100 {
                    if rand::random::<u8>() % 3 != 0 {
                        stack.push(i);
                        pushed += 1;
                    } else if stack.pop().is_some() {
                        popped += 1;
                    }
                }
                (pushed, popped)
            }))
        }

        let (pushed, popped) = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .fold((0, 0), |acc, (p, q)| (acc.0 + p, acc.1 + q));

        let stack = Arc::try_unwrap(stack).unwrap();
        assert_eq!(stack.len(), pushed - popped);
        assert_eq!(stack.into_iter().count(), pushed - popped);
    }

    #[test]
    fn test_append() {
        let expected = vec![2, 3, 7, 2, 0, 0, 3, 4, 2, 5];

        let stack = Stack::new();

        expected[expected.len() / 2..]
            .iter()
            .rev()
            .for_each(|&e| stack.push(e));

        let other = Stack::new();

        expected[..expected.len() / 2]
            .iter()
            .rev()
            .for_each(|&e| other.push(e));

        stack.append(other);

        assert_eq!(stack.len(), expected.len());

        let actual: Vec<i32> = stack.into_iter().collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_append_empty_is_noop() {
        let stack: Stack<i32> = [1, 2].into_iter().collect();

        stack.append(Stack::new());

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.into_iter().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_append_onto_empty() {
        let stack = Stack::new();

        stack.append([1, 2, 3].into_iter().collect());

        assert_eq!(stack.into_iter().collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_extend_pushes_in_order() {
        let mut stack = Stack::new();
        stack.push(0);

        stack.extend(1..=3);

        assert_eq!(stack.len(), 4);
        assert_eq!(stack.into_iter().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_hazard_keeps_popped_value_alive() {
        let stack = Stack::new();
        let counter = Arc::new(AtomicUsize::new(0));

        stack.append([0, 2, 3].into_iter().map(|v| counted(v, &counter)).collect());

        let top = stack.peek().unwrap();
        let owned = stack.pop().unwrap();

        assert_eq!(top.val, owned.val);
        assert_eq!(owned.val, 3);

        // Both entries protect the node, so no pass may free it.
        reclaim_retired();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        drop(owned);
        reclaim_retired();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(top.val, 3);

        drop(top);
        reclaim_until(&counter, 1);

        stack.pop();
        stack.pop();
        reclaim_until(&counter, 3);

        stack.push(counted(0, &counter));
        drop(stack);

        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_into_iter_drops_rest() {
        let counter = Arc::new(AtomicUsize::new(0));
        let stack: Stack<_> = (0..4).map(|v| counted(v, &counter)).collect();

        let mut iter = stack.into_iter();
        let first = iter.next().unwrap();
        assert_eq!(first.val, 3);
        assert_eq!(iter.size_hint(), (3, Some(3)));

        drop(iter);
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        drop(first);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_concurrent_append_keeps_batches_contiguous() {
        let stack = Stack::new();

        thread::scope(|s| {
            for batch in 0..8u32 {
                let stack = &stack;
                s.spawn(move || {
                    let other: Stack<u32> = (0..16).map(|i| batch * 100 + i).collect();
                    stack.append(other);
                });
            }
        });

        let values: Vec<u32> = stack.into_iter().collect();
        assert_eq!(values.len(), 8 * 16);

        for chunk in values.chunks(16) {
            let batch = chunk[0] / 100;
            let expected: Vec<u32> = (0..16).rev().map(|i| batch * 100 + i).collect();
            assert_eq!(chunk, expected.as_slice());
        }
    }

    #[test]
    fn test_debug_reports_len() {
        let stack: Stack<i32> = (0..3).collect();

        assert_eq!(format!("{:?}", stack), "Stack { len: 3 }");
        assert_eq!(format!("{:?}", stack.peek().unwrap()), "Entry(2)");
    }
}
