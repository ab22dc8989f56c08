//! Synthesis controller: task ownership, dispatch, and event forwarding.
//!
//! The controller is the single owner of the current task and of the
//! at-most-one active worker. All of its state transitions happen on the
//! caller's thread, in response to discrete calls (`request_task`, `start`,
//! `poll_events`), never concurrently with each other. The external shell
//! drives `poll_events` on its own cadence (a UI tick, typically) and
//! receives progress/completion/error through registered callbacks.

use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::{LogConfig, TaskLogger};
use crate::models::Task;
use crate::tasks::TaskFactory;

use super::engine::{FfmpegEngine, MergeEngine};
use super::errors::{MergeError, SynthesisError, SynthesisResult};
use super::events::{CompletedCallback, ErrorCallback, ProgressCallback, SynthesisEvent};
use super::worker::{SynthesisWorker, WorkerHandle};

/// Controller lifecycle state.
///
/// `Completed` and `Failed` are per-attempt outcomes, not resting states:
/// the controller accepts a new start immediately after either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// No task built yet (or the last request was invalid).
    #[default]
    Idle,
    /// A task is built and ready to dispatch.
    TaskReady,
    /// A worker is active.
    Running,
    /// The last run completed successfully.
    Completed,
    /// The last run failed.
    Failed,
}

impl ControllerState {
    /// Get display string for UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::TaskReady => "Ready",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

/// Orchestrates task creation and background synthesis runs.
pub struct SynthesisController {
    /// Task factory rooted at the configured work folder.
    factory: TaskFactory,
    /// Worker wrapping the merge engine.
    worker: SynthesisWorker,
    /// Directory for per-task log files.
    logs_dir: PathBuf,
    /// Per-task logger configuration.
    log_config: LogConfig,
    /// The current task, exclusively owned here.
    current_task: Option<Task>,
    /// Lifecycle state.
    state: ControllerState,
    /// Handle to the active run, if any.
    active: Option<WorkerHandle>,
    /// Progress callback.
    on_progress: Option<ProgressCallback>,
    /// Completion callback.
    on_completed: Option<CompletedCallback>,
    /// Error callback.
    on_error: Option<ErrorCallback>,
}

impl SynthesisController {
    /// Create a controller with the production ffmpeg engine.
    pub fn new(settings: &Settings) -> Self {
        Self::with_engine(settings, Arc::new(FfmpegEngine::new(settings)))
    }

    /// Create a controller around a custom merge engine.
    pub fn with_engine(settings: &Settings, engine: Arc<dyn MergeEngine>) -> Self {
        Self {
            factory: TaskFactory::new(&settings.paths.work_root),
            worker: SynthesisWorker::new(engine),
            logs_dir: PathBuf::from(&settings.paths.logs_folder),
            log_config: settings.logging.to_log_config(),
            current_task: None,
            state: ControllerState::Idle,
            active: None,
            on_progress: None,
            on_completed: None,
            on_error: None,
        }
    }

    /// Register the progress callback.
    pub fn set_on_progress(&mut self, callback: ProgressCallback) {
        self.on_progress = Some(callback);
    }

    /// Register the completion callback.
    pub fn set_on_completed(&mut self, callback: CompletedCallback) {
        self.on_completed = Some(callback);
    }

    /// Register the error callback.
    pub fn set_on_error(&mut self, callback: ErrorCallback) {
        self.on_error = Some(callback);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The current task, if one is built.
    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Build (or rebuild) the current task from the given inputs.
    ///
    /// Fails back to `Idle` without a task on invalid input; rejected
    /// outright while a run is active.
    pub fn request_task(
        &mut self,
        subtitle_path: &str,
        video_path: &str,
    ) -> SynthesisResult<&Task> {
        if self.active.is_some() {
            return Err(SynthesisError::AlreadyRunning);
        }

        match self.factory.create_task(subtitle_path, video_path) {
            Ok(task) => {
                self.state = ControllerState::TaskReady;
                Ok(&*self.current_task.insert(task))
            }
            Err(e) => {
                self.current_task = None;
                self.state = ControllerState::Idle;
                Err(e.into())
            }
        }
    }

    /// Start a synthesis run for the given inputs.
    ///
    /// The inputs are re-checked against the current task on every start:
    /// a missing or stale task (either stored path differs from the values
    /// supplied now) is discarded and rebuilt before dispatch. A start
    /// while a run is active is rejected and leaves the active run
    /// untouched. Returns as soon as the worker is dispatched; results
    /// arrive through `poll_events`.
    pub fn start(&mut self, subtitle_path: &str, video_path: &str) -> SynthesisResult<()> {
        if self.active.is_some() {
            tracing::warn!("Rejecting start request: a synthesis run is already active");
            return Err(SynthesisError::AlreadyRunning);
        }

        let reuse = matches!(
            self.current_task.as_ref(),
            Some(task) if task.matches_inputs(subtitle_path, video_path)
        );

        if !reuse {
            self.current_task = None;
            let task = self
                .factory
                .create_task(subtitle_path, video_path)
                .map_err(|e| {
                    self.state = ControllerState::Idle;
                    e
                })?;
            tracing::info!("Built task {} for synthesis", task.id());
            self.current_task = Some(task);
            self.state = ControllerState::TaskReady;
        }

        let task = match self.current_task.clone() {
            Some(task) => task,
            None => return Err(SynthesisError::setup("no task available to dispatch")),
        };

        let logger = TaskLogger::new(task.id(), &self.logs_dir, self.log_config.clone(), None)
            .map_err(|e| SynthesisError::setup(format!("failed to create task log: {}", e)))?;

        self.active = Some(self.worker.spawn(task, Arc::new(logger)));
        self.state = ControllerState::Running;
        Ok(())
    }

    /// Request cancellation of the active run, if any.
    ///
    /// The run ends asynchronously with a cancelled-failure event.
    pub fn cancel(&self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
    }

    /// Drain pending worker events and forward them to the callbacks.
    ///
    /// Events are delivered in emission order. A terminal event moves the
    /// state to `Completed`/`Failed` and releases the run slot, making the
    /// controller immediately ready for the next start. Returns the number
    /// of events delivered.
    pub fn poll_events(&mut self) -> usize {
        let mut delivered = 0;

        loop {
            let polled = match self.active.as_ref() {
                Some(handle) => handle.try_recv(),
                None => break,
            };

            match polled {
                Ok(event) => {
                    delivered += 1;
                    self.dispatch(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("Synthesis worker disconnected without a terminal event");
                    self.finish_run(ControllerState::Failed);
                    let error = MergeError::other("synthesis worker terminated unexpectedly");
                    if let Some(cb) = &self.on_error {
                        cb(&error);
                    }
                    delivered += 1;
                }
            }
        }

        delivered
    }

    /// Forward one event and apply its state transition.
    fn dispatch(&mut self, event: SynthesisEvent) {
        match event {
            SynthesisEvent::Progress { percent, message } => {
                if let Some(cb) = &self.on_progress {
                    cb(percent, &message);
                }
            }
            SynthesisEvent::Completed(task) => {
                self.finish_run(ControllerState::Completed);
                if let Some(cb) = &self.on_completed {
                    cb(&task);
                }
                self.current_task = Some(task);
            }
            SynthesisEvent::Failed(error) => {
                self.finish_run(ControllerState::Failed);
                if let Some(cb) = &self.on_error {
                    cb(&error);
                }
            }
        }
    }

    /// Close out the active run. Joining is safe here: a terminal event
    /// was already observed, so the thread is exiting.
    fn finish_run(&mut self, state: ControllerState) {
        self.state = state;
        if let Some(handle) = self.active.take() {
            handle.join();
        }
    }
}
