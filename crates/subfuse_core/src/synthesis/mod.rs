//! Background synthesis pipeline.
//!
//! This module coordinates one synthesis run at a time: the controller
//! owns the current task, dispatches a worker onto a background thread,
//! and forwards the worker's event stream to the outer shell.
//!
//! # Architecture
//!
//! ```text
//! SynthesisController
//!     ├── TaskFactory          (builds/reuses the current Task)
//!     └── SynthesisWorker      (one background thread per run)
//!             └── MergeEngine  (FfmpegEngine in production)
//!                     │
//!                     ▼
//!             SynthesisEvent stream: Progress* then Completed | Failed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use subfuse_core::config::Settings;
//! use subfuse_core::synthesis::SynthesisController;
//!
//! let mut controller = SynthesisController::new(&settings);
//! controller.set_on_progress(Box::new(|percent, message| {
//!     println!("{percent}% {message}");
//! }));
//!
//! controller.start(&subtitle_path, &video_path)?;
//!
//! // From the shell's tick:
//! controller.poll_events();
//! ```

mod command;
mod controller;
mod engine;
mod errors;
mod events;
mod probe;
mod worker;

pub use command::FfmpegArgsBuilder;
pub use controller::{ControllerState, SynthesisController};
pub use engine::{CancelHandle, FfmpegEngine, MergeContext, MergeEngine};
pub use errors::{MergeError, MergeResult, SynthesisError, SynthesisResult};
pub use events::{CompletedCallback, ErrorCallback, ProgressCallback, SynthesisEvent};
pub use probe::probe_duration;
pub use worker::{SynthesisWorker, WorkerHandle};
