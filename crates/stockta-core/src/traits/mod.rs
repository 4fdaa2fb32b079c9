//! Core traits.

mod indicator;
mod sink;

pub use indicator::{BarIndicator, Recurrence};
pub use sink::{check_lengths, RecordSink};
