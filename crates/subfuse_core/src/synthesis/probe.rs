//! Video duration probing using ffprobe.
//!
//! The duration anchors the percent calculation while ffmpeg reports
//! elapsed output time during the merge.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use super::errors::{MergeError, MergeResult};

/// Probe the duration of a media file in seconds.
///
/// Runs `ffprobe` with JSON output and parses the container duration.
pub fn probe_duration(ffprobe: &str, path: &Path) -> MergeResult<f64> {
    tracing::debug!("Probing duration: {}", path.display());

    let output = Command::new(ffprobe)
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
        .arg(path)
        .output()
        .map_err(|e| MergeError::spawn(ffprobe, e))?;

    if !output.status.success() {
        return Err(MergeError::command_failed(
            "ffprobe",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let json: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| MergeError::probe(format!("invalid ffprobe output: {}", e)))?;

    parse_duration_json(&json)
}

/// Parse the duration out of ffprobe's `-show_entries format=duration` JSON.
fn parse_duration_json(json: &Value) -> MergeResult<f64> {
    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .ok_or_else(|| MergeError::probe("no duration in ffprobe output"))?;

    let seconds: f64 = duration
        .parse()
        .map_err(|_| MergeError::probe(format!("unparseable duration '{}'", duration)))?;

    if seconds <= 0.0 {
        return Err(MergeError::probe(format!(
            "non-positive duration {}",
            seconds
        )));
    }

    Ok(seconds)
}
