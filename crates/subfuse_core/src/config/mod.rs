//! Configuration management.
//!
//! Settings live in a TOML file split into `[paths]`, `[logging]` and
//! `[synthesis]` tables. `ConfigManager` handles loading with defaults,
//! atomic saves, and section-level updates that leave the rest of the file
//! untouched.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, Settings, SubtitleMode, SynthesisSettings,
};
