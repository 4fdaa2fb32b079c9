//! Indicator trait definitions.

use crate::types::{AlignedSeries, BarSeries};

/// A recurrence over a single numeric column.
///
/// `calculate` returns the "valid" length `N - period + 1` output, with
/// element `0` belonging to input index `period - 1`. Too little input
/// yields an empty vector, never an error: absence means "not yet warm".
pub trait Recurrence: Send + Sync {
    /// The output type of the recurrence.
    type Output;

    /// Calculate values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Number of input values consumed before the first output.
    fn period(&self) -> usize;

    /// Get the name of the recurrence.
    fn name(&self) -> &str;

    /// Whether `data` is long enough to produce at least one value.
    fn is_warm(&self, data: &[f64]) -> bool {
        data.len() >= self.period()
    }

    /// Calculate and anchor the output to absolute input indices.
    fn calculate_aligned(&self, data: &[f64]) -> AlignedSeries<Self::Output> {
        let start = self.period().saturating_sub(1);
        if !self.is_warm(data) {
            return AlignedSeries::empty(start);
        }
        AlignedSeries::new(start, self.calculate(data))
    }
}

/// An indicator computed from a whole bar series.
///
/// Implementations return their values anchored at [`first_index`]; the
/// engine relies on that anchor instead of re-deriving offsets.
///
/// [`first_index`]: BarIndicator::first_index
pub trait BarIndicator: Send + Sync {
    /// The output type of the indicator (a struct for composite indicators).
    type Output;

    /// Compute the indicator over the series.
    fn compute(&self, series: &BarSeries) -> AlignedSeries<Self::Output>;

    /// First bar index at which the indicator is defined.
    fn first_index(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WindowSum {
        period: usize,
    }

    impl Recurrence for WindowSum {
        type Output = f64;

        fn calculate(&self, data: &[f64]) -> Vec<f64> {
            if data.len() < self.period {
                return vec![];
            }
            data.windows(self.period).map(|w| w.iter().sum()).collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "sum"
        }
    }

    #[test]
    fn test_is_warm() {
        let r = WindowSum { period: 5 };

        assert!(!r.is_warm(&[1.0, 2.0, 3.0]));
        assert!(r.is_warm(&[1.0, 2.0, 3.0, 4.0, 5.0]));
    }

    #[test]
    fn test_calculate_aligned() {
        let r = WindowSum { period: 3 };
        let out = r.calculate_aligned(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(out.start(), 2);
        assert_eq!(out.get(2), Some(&6.0)); // 1+2+3
        assert_eq!(out.get(4), Some(&12.0)); // 3+4+5
    }

    #[test]
    fn test_calculate_aligned_short_input() {
        let r = WindowSum { period: 3 };
        let out = r.calculate_aligned(&[1.0]);

        assert!(out.is_empty());
        assert_eq!(out.start(), 2);
    }
}
