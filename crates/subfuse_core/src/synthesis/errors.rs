//! Error types for the synthesis pipeline.
//!
//! Errors carry context that chains through layers:
//! Controller → Worker → Tool invocation → Detail

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tasks::TaskError;

/// Failure during the background merge.
///
/// Delivered asynchronously through the worker's error event. A merge
/// failure never crashes the controller; it becomes ready for a new start.
#[derive(Error, Debug)]
pub enum MergeError {
    /// An external tool could not be started.
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// An external tool exited with a failure code.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Probing the source video failed.
    #[error("Failed to probe video: {0}")]
    Probe(String),

    /// The merge finished but the expected output file is missing.
    #[error("Output file not created: {path}")]
    OutputMissing { path: PathBuf },

    /// The run was cancelled through its cancel handle.
    #[error("Synthesis was cancelled")]
    Cancelled,

    /// Generic worker error with message.
    #[error("{0}")]
    Other(String),
}

impl MergeError {
    /// Create a spawn error.
    pub fn spawn(tool: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            tool: tool.into(),
            source,
        }
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a probe error.
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe(message.into())
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this failure came from cancellation rather than a defect.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for worker/engine operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Synchronous failure surfaced by the controller.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The request was invalid; no task was created, no worker started.
    #[error(transparent)]
    InvalidInput(#[from] TaskError),

    /// A run is already active. The new start is rejected; the active run
    /// is unaffected — no queueing, no abort.
    #[error("A synthesis run is already in progress")]
    AlreadyRunning,

    /// Run setup failed before the worker was spawned (e.g. log file).
    #[error("Failed to set up synthesis run: {message}")]
    Setup { message: String },
}

impl SynthesisError {
    /// Create a setup error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }
}

/// Result type for controller operations.
pub type SynthesisResult<T> = Result<T, SynthesisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_error_displays_context() {
        let err = MergeError::command_failed("ffmpeg", 1, "Invalid data found");
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Invalid data found"));
    }

    #[test]
    fn invalid_input_wraps_task_error() {
        let err: SynthesisError = TaskError::empty_path("subtitle").into();
        assert!(matches!(err, SynthesisError::InvalidInput(_)));
        assert!(err.to_string().contains("subtitle"));
    }

    #[test]
    fn cancelled_is_flagged() {
        assert!(MergeError::Cancelled.is_cancelled());
        assert!(!MergeError::other("boom").is_cancelled());
    }
}
