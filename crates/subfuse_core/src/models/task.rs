//! The synthesis task entity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One synthesis job: merge a subtitle file into a video file.
///
/// A task is immutable once constructed. Its identity (`id`) and derived
/// paths (`work_dir`, `output_video_path`) are pure functions of the two
/// input paths, so building a task twice from the same inputs yields an
/// equivalent task. Changed inputs require a new task; the factory never
/// mutates an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Deterministic identifier derived from the input paths.
    id: String,
    /// Path to the subtitle source.
    subtitle_path: PathBuf,
    /// Path to the source video.
    video_path: PathBuf,
    /// Working directory for intermediate and output artifacts.
    work_dir: PathBuf,
    /// Path of the rendered video inside `work_dir`.
    output_video_path: PathBuf,
}

impl Task {
    /// Assemble a task from already-derived parts.
    ///
    /// Only the factory derives these; constructing a task directly with
    /// inconsistent parts breaks the caching contract.
    pub(crate) fn new(
        id: String,
        subtitle_path: PathBuf,
        video_path: PathBuf,
        work_dir: PathBuf,
        output_video_path: PathBuf,
    ) -> Self {
        Self {
            id,
            subtitle_path,
            video_path,
            work_dir,
            output_video_path,
        }
    }

    /// Deterministic task identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path to the subtitle source.
    pub fn subtitle_path(&self) -> &Path {
        &self.subtitle_path
    }

    /// Path to the source video.
    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// Working directory for this task's artifacts.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path the rendered video is written to.
    pub fn output_video_path(&self) -> &Path {
        &self.output_video_path
    }

    /// Check whether this task was built from exactly these inputs.
    ///
    /// Used by the controller to detect input drift before a start.
    pub fn matches_inputs(&self, subtitle_path: &str, video_path: &str) -> bool {
        self.subtitle_path == Path::new(subtitle_path) && self.video_path == Path::new(video_path)
    }
}
