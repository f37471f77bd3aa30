use std::collections::VecDeque;

/// Fixed-capacity FIFO that evicts its oldest element when full.
#[derive(Clone, Debug)]
pub(crate) struct RingBuffer<T> {
    inner: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty [`RingBuffer`] holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self { inner: VecDeque::with_capacity(capacity), capacity }
    }

    /// Appends `item`, returning the element evicted to make room for it.
    ///
    /// With a capacity of `0` nothing is stored and `item` itself is returned.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.inner.len() == self.capacity { self.inner.pop_front() } else { None };
        self.inner.push_back(item);
        evicted
    }

    /// Removes and returns the oldest element.
    pub fn pop_front(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
