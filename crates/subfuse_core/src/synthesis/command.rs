//! ffmpeg command options builder.
//!
//! Builds command-line tokens for ffmpeg based on a task and the synthesis
//! settings. Two modes exist:
//!
//! - **Soft**: the subtitle file is muxed in as its own stream; audio and
//!   video are stream-copied. The subtitle codec follows the output
//!   container (`mov_text` for the mp4 family, `srt` otherwise).
//! - **Burn**: subtitles are rendered into the frames through the
//!   `subtitles` filter, which re-encodes the video stream; audio is
//!   stream-copied.

use std::path::Path;

use crate::config::{SubtitleMode, SynthesisSettings};
use crate::models::Task;

/// Containers that require the mp4-family text subtitle codec.
const MOV_TEXT_CONTAINERS: &[&str] = &["mp4", "m4v", "mov", "3gp"];

/// Builder for ffmpeg command-line options.
///
/// Generates a list of string tokens ready to pass to ffmpeg. The token
/// vector is a pure function of the task and settings, so the same task
/// always produces the same command.
pub struct FfmpegArgsBuilder<'a> {
    task: &'a Task,
    settings: &'a SynthesisSettings,
    /// Optional fonts/style directory for burn mode.
    style_dir: Option<&'a Path>,
}

impl<'a> FfmpegArgsBuilder<'a> {
    /// Create a new options builder.
    pub fn new(task: &'a Task, settings: &'a SynthesisSettings) -> Self {
        Self {
            task,
            settings,
            style_dir: None,
        }
    }

    /// Set the fonts/style directory used by the subtitles filter.
    pub fn with_style_dir(mut self, style_dir: Option<&'a Path>) -> Self {
        self.style_dir = style_dir;
        self
    }

    /// Build the complete ffmpeg command tokens.
    pub fn build(&self) -> Vec<String> {
        let mut tokens = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
        ];

        match self.settings.mode {
            SubtitleMode::Soft => self.add_soft_options(&mut tokens),
            SubtitleMode::Burn => self.add_burn_options(&mut tokens),
        }

        // Machine-readable progress on stdout
        tokens.push("-progress".to_string());
        tokens.push("pipe:1".to_string());

        tokens.push(self.task.output_video_path().to_string_lossy().to_string());

        tokens
    }

    /// Mux the subtitle file in as a separate stream.
    fn add_soft_options(&self, tokens: &mut Vec<String>) {
        tokens.push("-i".to_string());
        tokens.push(self.task.video_path().to_string_lossy().to_string());
        tokens.push("-i".to_string());
        tokens.push(self.task.subtitle_path().to_string_lossy().to_string());

        tokens.push("-map".to_string());
        tokens.push("0".to_string());
        tokens.push("-map".to_string());
        tokens.push("1:0".to_string());

        tokens.push("-c".to_string());
        tokens.push("copy".to_string());
        tokens.push("-c:s".to_string());
        tokens.push(self.subtitle_codec().to_string());
    }

    /// Render subtitles into the video frames.
    fn add_burn_options(&self, tokens: &mut Vec<String>) {
        tokens.push("-i".to_string());
        tokens.push(self.task.video_path().to_string_lossy().to_string());

        let mut filter = format!(
            "subtitles={}",
            escape_filter_path(&self.task.subtitle_path().to_string_lossy())
        );
        if let Some(style_dir) = self.style_dir {
            filter.push_str(&format!(
                ":fontsdir={}",
                escape_filter_path(&style_dir.to_string_lossy())
            ));
        }

        tokens.push("-vf".to_string());
        tokens.push(filter);

        tokens.push("-c:v".to_string());
        tokens.push("libx264".to_string());
        tokens.push("-crf".to_string());
        tokens.push(self.settings.crf.to_string());
        tokens.push("-c:a".to_string());
        tokens.push("copy".to_string());
    }

    /// Subtitle codec for the output container.
    fn subtitle_codec(&self) -> &'static str {
        let ext = self
            .task
            .output_video_path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if MOV_TEXT_CONTAINERS.contains(&ext.as_str()) {
            "mov_text"
        } else {
            "srt"
        }
    }
}

/// Escape a path for use inside an ffmpeg filter argument.
///
/// The filter grammar treats `\ : ' , ; [ ]` as metacharacters.
fn escape_filter_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '\\' | ':' | '\'' | ',' | ';' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_task(video: &str, output: &str) -> Task {
        Task::new(
            "ab12".to_string(),
            PathBuf::from("/media/show.srt"),
            PathBuf::from(video),
            PathBuf::from("/tasks/ab12"),
            PathBuf::from(output),
        )
    }

    #[test]
    fn soft_mode_stream_copies() {
        let task = make_task("/media/show.mp4", "/tasks/ab12/show_subtitled.mp4");
        let settings = SynthesisSettings::default();

        let tokens = FfmpegArgsBuilder::new(&task, &settings).build();

        assert!(tokens.contains(&"-c".to_string()));
        assert!(tokens.contains(&"copy".to_string()));
        assert!(tokens.contains(&"mov_text".to_string()));
        assert!(tokens.windows(2).any(|w| w[0] == "-progress" && w[1] == "pipe:1"));
        assert_eq!(tokens.last().unwrap(), "/tasks/ab12/show_subtitled.mp4");
    }

    #[test]
    fn soft_mode_uses_srt_for_mkv() {
        let task = make_task("/media/show.mkv", "/tasks/ab12/show_subtitled.mkv");
        let settings = SynthesisSettings::default();

        let tokens = FfmpegArgsBuilder::new(&task, &settings).build();

        assert!(tokens.contains(&"srt".to_string()));
        assert!(!tokens.contains(&"mov_text".to_string()));
    }

    #[test]
    fn burn_mode_builds_subtitles_filter() {
        let task = make_task("/media/show.mp4", "/tasks/ab12/show_subtitled.mp4");
        let settings = SynthesisSettings {
            mode: SubtitleMode::Burn,
            crf: 18,
            ..SynthesisSettings::default()
        };

        let tokens = FfmpegArgsBuilder::new(&task, &settings)
            .with_style_dir(Some(Path::new("/styles")))
            .build();

        let vf_pos = tokens.iter().position(|t| t == "-vf").unwrap();
        let filter = &tokens[vf_pos + 1];
        assert!(filter.starts_with("subtitles=/media/show.srt"));
        assert!(filter.contains(":fontsdir=/styles"));

        assert!(tokens.contains(&"libx264".to_string()));
        assert!(tokens.contains(&"18".to_string()));
    }

    #[test]
    fn filter_path_escaping() {
        assert_eq!(escape_filter_path("/plain/path.srt"), "/plain/path.srt");
        assert_eq!(escape_filter_path("C:\\subs\\a.srt"), "C\\:\\\\subs\\\\a.srt");
        assert_eq!(escape_filter_path("a'b,c.srt"), "a\\'b\\,c.srt");
    }

    #[test]
    fn same_task_builds_same_command() {
        let task = make_task("/media/show.mp4", "/tasks/ab12/show_subtitled.mp4");
        let settings = SynthesisSettings::default();

        let a = FfmpegArgsBuilder::new(&task, &settings).build();
        let b = FfmpegArgsBuilder::new(&task, &settings).build();
        assert_eq!(a, b);
    }
}
