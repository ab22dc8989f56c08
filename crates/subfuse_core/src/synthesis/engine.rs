//! Merge engine trait and the ffmpeg production engine.
//!
//! The worker runs a `MergeEngine` on its background thread. The engine
//! only sees an immutable `Task` and a `MergeContext`; everything it wants
//! the outside world to know travels through the context's progress
//! reporting, and cancellation comes back in through the context's flag.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Settings;
use crate::config::SynthesisSettings;
use crate::logging::TaskLogger;
use crate::models::Task;

use super::command::FfmpegArgsBuilder;
use super::errors::{MergeError, MergeResult};
use super::probe::probe_duration;

/// Handle for cancelling a running synthesis.
///
/// Cancellation is cooperative: engines check the flag at progress
/// boundaries, so a run stops at the next opportunity rather than
/// preemptively.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a new, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Read-only context handed to an engine for one run.
pub struct MergeContext<'a> {
    logger: &'a TaskLogger,
    cancel: &'a CancelHandle,
    progress: &'a dyn Fn(u32, &str),
}

impl<'a> MergeContext<'a> {
    /// Create a context for one run.
    pub fn new(
        logger: &'a TaskLogger,
        cancel: &'a CancelHandle,
        progress: &'a dyn Fn(u32, &str),
    ) -> Self {
        Self {
            logger,
            cancel,
            progress,
        }
    }

    /// Per-task logger.
    pub fn logger(&self) -> &TaskLogger {
        self.logger
    }

    /// Whether cancellation has been requested for this run.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Report progress for this run.
    ///
    /// The worker clamps whatever engines report into a monotonically
    /// non-decreasing 0–100 sequence, so engines may report raw estimates.
    pub fn report_progress(&self, percent: u32, message: &str) {
        (self.progress)(percent, message);
    }
}

/// A merge implementation runnable by the synthesis worker.
///
/// Engines treat the task as read-only and must return exactly once;
/// the worker derives the run's single terminal event from that return.
pub trait MergeEngine: Send + Sync {
    /// Engine name (for logging).
    fn name(&self) -> &str;

    /// Merge `task.subtitle_path()` into `task.video_path()`, producing
    /// `task.output_video_path()`. Blocks until done, failed, or cancelled.
    fn merge(&self, task: &Task, ctx: &MergeContext<'_>) -> MergeResult<()>;
}

/// One parsed line of ffmpeg `-progress` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgressUpdate {
    /// Elapsed output time in microseconds.
    OutTimeUs(u64),
    /// ffmpeg signalled the end of processing.
    End,
}

/// Parse one key=value line of ffmpeg `-progress pipe:1` output.
///
/// `out_time_ms` is microseconds despite its name (long-standing ffmpeg
/// quirk); `out_time_us` is emitted by newer builds. Unknown times are
/// reported as negative values and ignored.
fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => {
            let us: i64 = value.parse().ok()?;
            if us < 0 {
                None
            } else {
                Some(ProgressUpdate::OutTimeUs(us as u64))
            }
        }
        "progress" if value == "end" => Some(ProgressUpdate::End),
        _ => None,
    }
}

/// Production engine shelling out to ffmpeg.
///
/// Probes the video duration with ffprobe first, then streams ffmpeg's
/// progress output and converts elapsed time into percent.
pub struct FfmpegEngine {
    settings: SynthesisSettings,
    /// Fonts/style directory for burn mode (empty config = none).
    style_dir: Option<PathBuf>,
}

impl FfmpegEngine {
    /// Create an engine from application settings.
    pub fn new(settings: &Settings) -> Self {
        let style_dir = if settings.paths.subtitle_style_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&settings.paths.subtitle_style_dir))
        };

        Self {
            settings: settings.synthesis.clone(),
            style_dir,
        }
    }
}

impl MergeEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn merge(&self, task: &Task, ctx: &MergeContext<'_>) -> MergeResult<()> {
        ctx.report_progress(0, "Probing video duration");
        let duration = probe_duration(&self.settings.ffprobe_path, task.video_path())?;
        ctx.logger()
            .info(&format!("Video duration: {:.2}s", duration));

        if ctx.is_cancelled() {
            return Err(MergeError::Cancelled);
        }

        let tokens = FfmpegArgsBuilder::new(task, &self.settings)
            .with_style_dir(self.style_dir.as_deref())
            .build();

        let ffmpeg = &self.settings.ffmpeg_path;
        ctx.logger()
            .command(&format!("{} {}", ffmpeg, tokens.join(" ")));

        let mut child = Command::new(ffmpeg)
            .args(&tokens)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MergeError::spawn(ffmpeg, e))?;

        // Drain stderr on its own thread so the pipe cannot back up while
        // we block on progress lines.
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MergeError::other("failed to capture ffmpeg stderr"))?;
        let stderr_thread = thread::spawn(move || {
            BufReader::new(stderr)
                .lines()
                .map_while(Result::ok)
                .collect::<Vec<String>>()
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MergeError::other("failed to capture ffmpeg stdout"))?;

        ctx.report_progress(1, "Merging subtitles");

        for line in BufReader::new(stdout).lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(MergeError::io_error("reading ffmpeg progress", e));
                }
            };

            if ctx.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                ctx.logger().warn("Synthesis cancelled");
                return Err(MergeError::Cancelled);
            }

            if let Some(ProgressUpdate::OutTimeUs(us)) = parse_progress_line(&line) {
                let percent = ((us as f64 / (duration * 1_000_000.0)) * 100.0).min(99.0) as u32;
                ctx.report_progress(percent, "Merging subtitles");
            }
        }

        let stderr_lines = stderr_thread.join().unwrap_or_default();
        for l in &stderr_lines {
            ctx.logger().output_line(l, true);
        }

        let status = child
            .wait()
            .map_err(|e| MergeError::io_error("waiting for ffmpeg", e))?;

        if !status.success() {
            ctx.logger().show_tail("ffmpeg");
            let message = stderr_lines
                .last()
                .cloned()
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(MergeError::command_failed(
                "ffmpeg",
                status.code().unwrap_or(-1),
                message,
            ));
        }

        if !task.output_video_path().exists() {
            return Err(MergeError::OutputMissing {
                path: task.output_video_path().to_path_buf(),
            });
        }

        ctx.report_progress(100, "Finalizing");
        Ok(())
    }
}
