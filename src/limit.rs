//! Caps the number of records passed downstream

/// Passes through the first `limit` items and then stops pulling from upstream
pub struct RecordLimiter<I> {
    upstream: I,
    remaining: usize,
}

impl<I: Iterator> RecordLimiter<I> {
    pub fn new(upstream: I, limit: usize) -> Self {
        Self {
            upstream,
            remaining: limit,
        }
    }
}

impl<I: Iterator> Iterator for RecordLimiter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.upstream.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.upstream.size_hint();
        let upper = upper.map_or(self.remaining, |upper| upper.min(self.remaining));
        (lower.min(self.remaining), Some(upper))
    }
}
