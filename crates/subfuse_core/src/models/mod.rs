//! Shared data structures.

mod media;
mod task;

pub use media::{MediaKind, SUBTITLE_EXTENSIONS, VIDEO_EXTENSIONS};
pub use task::Task;
