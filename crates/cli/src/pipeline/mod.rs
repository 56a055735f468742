//! Event input and run statistics.

mod source;
mod stats;

pub use source::EventSource;
pub use stats::RunStats;
