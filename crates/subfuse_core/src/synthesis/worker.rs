//! Background synthesis worker.
//!
//! `SynthesisWorker::spawn` runs a merge engine on a dedicated thread and
//! hands back a `WorkerHandle` whose channel delivers events in emission
//! order: zero or more progress updates, then exactly one terminal event.
//! The caller is never blocked; it drains the channel at its own pace.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::logging::TaskLogger;
use crate::models::Task;

use super::engine::{CancelHandle, MergeContext, MergeEngine};
use super::events::SynthesisEvent;

/// Handle to one running synthesis.
///
/// Dropping the handle detaches the run (it completes in the background
/// with nobody listening); `join` waits for the thread after the terminal
/// event has been observed.
pub struct WorkerHandle {
    events: Receiver<SynthesisEvent>,
    cancel: CancelHandle,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Non-blocking poll for the next event.
    pub fn try_recv(&self) -> Result<SynthesisEvent, TryRecvError> {
        self.events.try_recv()
    }

    /// Blocking poll with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SynthesisEvent, RecvTimeoutError> {
        self.events.recv_timeout(timeout)
    }

    /// Request cancellation of this run.
    ///
    /// Cooperative: the engine observes the flag at its next progress
    /// boundary and the run ends with a single cancelled-failure event.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Get a cancellation handle for this run.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the worker thread to finish.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawns merge runs onto background threads.
pub struct SynthesisWorker {
    engine: Arc<dyn MergeEngine>,
}

impl SynthesisWorker {
    /// Create a worker around the given engine.
    pub fn new(engine: Arc<dyn MergeEngine>) -> Self {
        Self { engine }
    }

    /// Start a run for `task` on a new thread.
    ///
    /// The task is taken by value; the worker never touches controller
    /// state. Whatever percent sequence the engine reports is clamped here
    /// into a non-decreasing 0–100 series, and the engine's single return
    /// becomes the run's single terminal event.
    pub fn spawn(&self, task: Task, logger: Arc<TaskLogger>) -> WorkerHandle {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelHandle::new();

        let engine = Arc::clone(&self.engine);
        let cancel_flag = cancel.clone();

        let thread = thread::spawn(move || {
            let last_percent = AtomicU32::new(0);
            let progress_tx = tx.clone();
            let progress_logger = Arc::clone(&logger);

            let progress = move |percent: u32, message: &str| {
                let capped = percent.min(100);
                let previous = last_percent.fetch_max(capped, Ordering::SeqCst);
                let percent = capped.max(previous);

                progress_logger.progress(percent);
                let _ = progress_tx.send(SynthesisEvent::Progress {
                    percent,
                    message: message.to_string(),
                });
            };

            logger.phase(&format!("Synthesis ({})", engine.name()));
            tracing::info!("Starting synthesis for task {}", task.id());

            let ctx = MergeContext::new(&logger, &cancel_flag, &progress);
            match engine.merge(&task, &ctx) {
                Ok(()) => {
                    logger.success(&format!(
                        "Rendered {}",
                        task.output_video_path().display()
                    ));
                    let _ = tx.send(SynthesisEvent::Completed(task));
                }
                Err(e) => {
                    logger.error(&e.to_string());
                    let _ = tx.send(SynthesisEvent::Failed(e));
                }
            }
        });

        WorkerHandle {
            events: rx,
            cancel,
            thread: Some(thread),
        }
    }
}
