/// A counter for one ordered list or map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Index {
    value: usize,
}

impl Index {
    pub fn increment(&mut self) {
        self.value += 1;
    }

    pub fn value(&self) -> usize {
        self.value
    }
}

/// Counters of the currently active ordered constructs, innermost on top.
#[derive(Debug, Default)]
pub(crate) struct IndexStack {
    stack: Vec<Index>,
}

impl IndexStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a fresh index with value 0.
    pub fn push(&mut self) {
        self.stack.push(Index::default());
    }

    pub fn pop(&mut self) -> Option<Index> {
        self.stack.pop()
    }

    /// Increments the innermost index.
    pub fn increment(&mut self) {
        if let Some(index) = self.stack.last_mut() {
            index.increment();
        }
    }

    /// Returns the value of the `n`-th index counted from the top, 0 is the
    /// innermost.
    pub fn nth_from_top(&self, n: usize) -> Option<usize> {
        self.stack.iter().rev().nth(n).map(Index::value)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_stack() {
        let mut indexes = IndexStack::new();
        assert!(indexes.is_empty());
        indexes.push();
        indexes.increment();
        indexes.increment();
        indexes.push();
        indexes.increment();
        assert_eq!(indexes.nth_from_top(0), Some(1));
        assert_eq!(indexes.nth_from_top(1), Some(2));
        assert_eq!(indexes.nth_from_top(2), None);
        assert_eq!(indexes.pop().map(|i| i.value()), Some(1));
        assert_eq!(indexes.len(), 1);
    }
}
