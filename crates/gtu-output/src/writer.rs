//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DetectionRow, FailureRow, OutputResult, TrajectoryRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`](crate::SimOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of trajectory rows.
    fn write_trajectories(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()>;

    fn write_detection(&mut self, row: &DetectionRow) -> OutputResult<()>;

    fn write_failure(&mut self, row: &FailureRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
