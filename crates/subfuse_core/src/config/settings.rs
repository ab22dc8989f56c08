//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Synthesis (merge) settings.
    #[serde(default)]
    pub synthesis: SynthesisSettings,
}

/// Path configuration for task work directories and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder under which per-task work directories are derived.
    #[serde(default = "default_work_root")]
    pub work_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Directory holding subtitle style presets (opaque to the pipeline,
    /// passed to ffmpeg as a fonts/style lookup dir in burn mode).
    #[serde(default)]
    pub subtitle_style_dir: String,

    /// Last used subtitle file path.
    #[serde(default)]
    pub last_subtitle_path: String,

    /// Last used video file path.
    #[serde(default)]
    pub last_video_path: String,
}

fn default_work_root() -> String {
    ".tasks".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            work_root: default_work_root(),
            logs_folder: default_logs_folder(),
            subtitle_style_dir: String::new(),
            last_subtitle_path: String::new(),
            last_video_path: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (filter progress, show ffmpeg tail on error).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of ffmpeg output lines to keep for the error tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Prefix task log lines with timestamps.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Minimum level for task log files.
    #[serde(default)]
    pub level: LogLevel,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    30
}

fn default_progress_step() -> u32 {
    10
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
            level: LogLevel::Info,
        }
    }
}

impl LoggingSettings {
    /// Convert to the task-logger configuration.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            progress_step: self.progress_step,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// How subtitles are combined with the video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleMode {
    /// Mux the subtitle file in as a separate stream (no re-encode).
    #[default]
    Soft,
    /// Render subtitles into the video frames (re-encodes video).
    Burn,
}

impl SubtitleMode {
    /// Get display string for UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "Soft",
            Self::Burn => "Burn",
        }
    }
}

/// Synthesis (merge) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Subtitle handling mode.
    #[serde(default)]
    pub mode: SubtitleMode,

    /// Path to the ffmpeg executable (empty = find in PATH).
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    /// Path to the ffprobe executable (empty = find in PATH).
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    /// CRF quality factor used when burn mode re-encodes the video.
    #[serde(default = "default_crf")]
    pub crf: u32,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_crf() -> u32 {
    23
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            mode: SubtitleMode::default(),
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            crf: default_crf(),
        }
    }
}

/// Identifies a settings section for section-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Synthesis,
}

impl ConfigSection {
    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Paths => "paths",
            Self::Logging => "logging",
            Self::Synthesis => "synthesis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_on_empty_toml() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.paths.work_root, ".tasks");
        assert_eq!(settings.synthesis.ffmpeg_path, "ffmpeg");
        assert_eq!(settings.synthesis.mode, SubtitleMode::Soft);
        assert!(settings.logging.compact);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: Settings =
            toml::from_str("[synthesis]\nmode = \"burn\"\ncrf = 18\n").unwrap();
        assert_eq!(settings.synthesis.mode, SubtitleMode::Burn);
        assert_eq!(settings.synthesis.crf, 18);
        assert_eq!(settings.synthesis.ffprobe_path, "ffprobe");
        assert_eq!(settings.paths.logs_folder, ".logs");
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut settings = Settings::default();
        settings.paths.subtitle_style_dir = "styles".to_string();

        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.paths.subtitle_style_dir, "styles");
    }

    #[test]
    fn log_config_conversion() {
        let mut logging = LoggingSettings::default();
        logging.compact = false;
        logging.error_tail = 50;

        let config = logging.to_log_config();
        assert!(!config.compact);
        assert_eq!(config.error_tail, 50);
    }
}
