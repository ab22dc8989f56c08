//! Worker event stream types and UI callback signatures.
//!
//! A single run emits zero or more `Progress` events followed by exactly
//! one terminal event (`Completed` or `Failed`). Events travel over an
//! `std::sync::mpsc` channel from the worker thread to the controller,
//! which forwards them to the registered callbacks in delivery order.

use crate::models::Task;

use super::errors::MergeError;

/// Event emitted by a synthesis worker.
#[derive(Debug)]
pub enum SynthesisEvent {
    /// Progress update; `percent` is monotonically non-decreasing within a
    /// run and never exceeds 100.
    Progress { percent: u32, message: String },
    /// The run finished; carries the task whose output is now rendered.
    Completed(Task),
    /// The run failed; nothing further is emitted for this run.
    Failed(MergeError),
}

impl SynthesisEvent {
    /// Whether this event ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

/// Callback for progress updates: `(percent, message)`.
pub type ProgressCallback = Box<dyn Fn(u32, &str) + Send + Sync>;

/// Callback invoked with the finished task on completion.
pub type CompletedCallback = Box<dyn Fn(&Task) + Send + Sync>;

/// Callback invoked with the failure on error.
pub type ErrorCallback = Box<dyn Fn(&MergeError) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        let progress = SynthesisEvent::Progress {
            percent: 10,
            message: "merging".to_string(),
        };
        assert!(!progress.is_terminal());
        assert!(SynthesisEvent::Failed(MergeError::Cancelled).is_terminal());
    }
}
