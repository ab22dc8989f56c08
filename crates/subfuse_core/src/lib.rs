//! SubFuse Core - subtitle/video synthesis backend
//!
//! This crate contains all business logic with zero UI dependencies:
//! task construction, the synthesis controller/worker pipeline, ffmpeg
//! integration, configuration, and logging. A GUI (or any other shell)
//! sits on top of it by supplying two file paths and a start trigger, and
//! by consuming progress, completion, and error callbacks.

pub mod config;
pub mod logging;
pub mod models;
pub mod synthesis;
pub mod tasks;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
