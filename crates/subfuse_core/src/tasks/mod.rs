//! Task construction.
//!
//! `TaskFactory` turns raw (subtitle path, video path) input into an
//! immutable `Task` with deterministically derived work directory and
//! output path. Equal inputs always derive equal tasks, which is what makes
//! repeated requests cache-equivalent.

mod factory;

pub use factory::{generate_task_id, TaskError, TaskFactory, TaskResult};
