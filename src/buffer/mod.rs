//! File path of the facility: bounded queue, buffer accumulator and flush
//! policy.

mod accumulator;
mod metrics;
mod queue;

pub use accumulator::Accumulator;
pub use metrics::{MetricsSnapshot, QueueMetrics};
pub use queue::LogQueue;

use thiserror::Error;

/// Average rendered line length assumed by the size trigger.
pub const AVERAGE_LINE_ESTIMATE: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Log queue is full")]
    Full,
    #[error("Log queue is closed")]
    Closed,
}
