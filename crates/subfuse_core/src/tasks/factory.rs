//! Task construction and path derivation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Task;

/// Errors raised while building a task from raw inputs.
///
/// All variants mean the request was invalid; no task is created and no
/// worker is ever started for it.
#[derive(Error, Debug)]
pub enum TaskError {
    /// An input path argument was empty.
    #[error("No {field} file selected")]
    EmptyPath { field: &'static str },

    /// An input path does not exist.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// An input path exists but is not a regular file.
    #[error("Not a file: {path}")]
    NotAFile { path: PathBuf },

    /// The work directory could not be created.
    #[error("Failed to create work directory {path}: {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TaskError {
    /// Create an empty-path error.
    pub fn empty_path(field: &'static str) -> Self {
        Self::EmptyPath { field }
    }

    /// Create a not-found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Result type for task construction.
pub type TaskResult<T> = Result<T, TaskError>;

/// Generate the deterministic task id for a pair of input paths.
///
/// The id is an MD5 digest over both path strings, so equal inputs always
/// map to the same id and therefore the same work directory. Note this keys
/// on the *paths*: a different file placed at the same two paths yields the
/// same id (see `TaskFactory`).
pub fn generate_task_id(subtitle_path: &str, video_path: &str) -> String {
    let digest = md5::compute(format!("{}\n{}", subtitle_path, video_path));
    format!("{:x}", digest)
}

/// Builds `Task`s from raw (subtitle path, video path) input.
///
/// Derivation is a pure function of the inputs: repeated calls with the same
/// pair produce equivalent tasks pointing at the same work directory, which
/// makes tasks cache-equivalent across repeated requests.
///
/// Known limitation: because the cache key is path-derived rather than
/// content-derived, replacing a file in place is invisible to the factory —
/// the new content reuses the old task's work directory.
#[derive(Debug, Clone)]
pub struct TaskFactory {
    /// Root folder under which per-task work directories are created.
    work_root: PathBuf,
}

impl TaskFactory {
    /// Create a factory rooted at the given work folder.
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
        }
    }

    /// Get the configured work root.
    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Build a task for the given inputs.
    ///
    /// Validates that both paths are non-empty and reference existing
    /// regular files, derives the work directory and output path, and
    /// scaffolds the work directory. Directory creation is idempotent; an
    /// already-existing work directory is not an error.
    pub fn create_task(&self, subtitle_path: &str, video_path: &str) -> TaskResult<Task> {
        if subtitle_path.is_empty() {
            return Err(TaskError::empty_path("subtitle"));
        }
        if video_path.is_empty() {
            return Err(TaskError::empty_path("video"));
        }

        validate_input_file(Path::new(subtitle_path))?;
        validate_input_file(Path::new(video_path))?;

        let id = generate_task_id(subtitle_path, video_path);
        let work_dir = self.work_root.join(&id);
        let output_video_path = work_dir.join(output_file_name(Path::new(video_path)));

        fs::create_dir_all(&work_dir).map_err(|e| TaskError::WorkDir {
            path: work_dir.clone(),
            source: e,
        })?;

        tracing::debug!(
            "Created task {} (work dir: {})",
            id,
            work_dir.display()
        );

        Ok(Task::new(
            id,
            PathBuf::from(subtitle_path),
            PathBuf::from(video_path),
            work_dir,
            output_video_path,
        ))
    }
}

/// Check that an input path points at an existing regular file.
fn validate_input_file(path: &Path) -> TaskResult<()> {
    let metadata = fs::metadata(path).map_err(|_| TaskError::not_found(path))?;
    if !metadata.is_file() {
        return Err(TaskError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Output filename for a source video: `<stem>_subtitled.<ext>`.
fn output_file_name(video_path: &Path) -> String {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let ext = video_path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string());
    format!("{}_subtitled.{}", stem, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_inputs(dir: &Path) -> (String, String) {
        let sub = dir.join("episode.srt");
        let video = dir.join("episode.mp4");
        fs::write(&sub, "1\n00:00:01,000 --> 00:00:02,000\nhello\n").unwrap();
        fs::write(&video, b"\x00\x00\x00\x18ftypmp42").unwrap();
        (
            sub.to_string_lossy().to_string(),
            video.to_string_lossy().to_string(),
        )
    }

    #[test]
    fn derivation_is_deterministic() {
        let dir = tempdir().unwrap();
        let (sub, video) = write_inputs(dir.path());
        let factory = TaskFactory::new(dir.path().join("tasks"));

        let first = factory.create_task(&sub, &video).unwrap();
        let second = factory.create_task(&sub, &video).unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(first.work_dir(), second.work_dir());
        assert_eq!(first.output_video_path(), second.output_video_path());
    }

    #[test]
    fn different_inputs_derive_different_dirs() {
        let dir = tempdir().unwrap();
        let (sub, video) = write_inputs(dir.path());
        let other_video = dir.path().join("other.mp4");
        fs::write(&other_video, b"x").unwrap();

        let factory = TaskFactory::new(dir.path().join("tasks"));
        let a = factory.create_task(&sub, &video).unwrap();
        let b = factory
            .create_task(&sub, &other_video.to_string_lossy())
            .unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.work_dir(), b.work_dir());
    }

    #[test]
    fn work_dir_creation_is_idempotent() {
        let dir = tempdir().unwrap();
        let (sub, video) = write_inputs(dir.path());
        let factory = TaskFactory::new(dir.path().join("tasks"));

        let task = factory.create_task(&sub, &video).unwrap();
        assert!(task.work_dir().is_dir());

        // Second call with the directory already present must not fail.
        factory.create_task(&sub, &video).unwrap();
    }

    #[test]
    fn empty_paths_are_rejected() {
        let dir = tempdir().unwrap();
        let (sub, video) = write_inputs(dir.path());
        let factory = TaskFactory::new(dir.path().join("tasks"));

        assert!(matches!(
            factory.create_task("", &video),
            Err(TaskError::EmptyPath { field: "subtitle" })
        ));
        assert!(matches!(
            factory.create_task(&sub, ""),
            Err(TaskError::EmptyPath { field: "video" })
        ));
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempdir().unwrap();
        let (_, video) = write_inputs(dir.path());
        let factory = TaskFactory::new(dir.path().join("tasks"));

        let missing = dir.path().join("missing.srt");
        let result = factory.create_task(&missing.to_string_lossy(), &video);
        assert!(matches!(result, Err(TaskError::NotFound { .. })));

        // No task, no work dir for the failed request.
        let id = generate_task_id(&missing.to_string_lossy(), &video);
        assert!(!dir.path().join("tasks").join(id).exists());
    }

    #[test]
    fn directory_input_is_rejected() {
        let dir = tempdir().unwrap();
        let (sub, _) = write_inputs(dir.path());
        let factory = TaskFactory::new(dir.path().join("tasks"));

        let result = factory.create_task(&sub, &dir.path().to_string_lossy());
        assert!(matches!(result, Err(TaskError::NotAFile { .. })));
    }

    #[test]
    fn output_name_follows_video() {
        assert_eq!(
            output_file_name(Path::new("/media/show.mkv")),
            "show_subtitled.mkv"
        );
        assert_eq!(output_file_name(Path::new("/media/clip")), "clip_subtitled.mp4");
    }
}
