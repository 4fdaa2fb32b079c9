//! Indicator output anchored to an absolute bar index.

/// A compact run of indicator values whose first element belongs to bar
/// `start` of the source series.
///
/// Recurrences produce fewer values than there are bars; carrying the start
/// index alongside the values lets the engine place them without per-call
/// offset arithmetic. A non-empty run always ends on the last bar.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries<T> {
    start: usize,
    values: Vec<T>,
}

impl<T> AlignedSeries<T> {
    /// Anchor `values` so that `values[0]` belongs to bar `start`.
    pub fn new(start: usize, values: Vec<T>) -> Self {
        Self { start, values }
    }

    /// An indicator that never warmed up.
    pub fn empty(start: usize) -> Self {
        Self {
            start,
            values: Vec::new(),
        }
    }

    /// Absolute index of the first value.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One past the absolute index of the last value.
    pub fn end(&self) -> usize {
        self.start + self.values.len()
    }

    /// Value at absolute bar index, if defined there.
    pub fn get(&self, bar_index: usize) -> Option<&T> {
        bar_index
            .checked_sub(self.start)
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Consume into `(absolute index, value)` pairs.
    pub fn into_indexed(self) -> impl Iterator<Item = (usize, T)> {
        let start = self.start;
        self.values
            .into_iter()
            .enumerate()
            .map(move |(i, v)| (start + i, v))
    }
}
