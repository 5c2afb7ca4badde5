//! Last-in-first-out container.

/// LIFO stack with O(1) push and pop at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes the most recently pushed item. Returns `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items from bottom to top.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> FromIterator<T> for Stack<T> {
    /// Pushes items in iteration order, so the last one ends up on top.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
