// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::error::ProbeError;

/// Size and playing time of an audio file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub size_bytes: u64,
    pub duration_seconds: f64,
}

/// Audio metadata extraction abstraction for testability
pub trait MediaProbe {
    /// Read size and duration of the file at `path`
    fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError>;
}

/// Default probe implementation reading MP3 frame headers
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp3Probe;

impl MediaProbe for Mp3Probe {
    fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| ProbeError::Inaccessible {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        let duration = mp3_duration::from_path(path).map_err(|e| ProbeError::Undecodable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(MediaInfo {
            size_bytes,
            duration_seconds: duration.as_secs_f64(),
        })
    }
}

/// Render a duration for `itunes:duration`
///
/// `H:MM:SS` from one hour upwards, `M:SS` below. Fractional seconds are
/// truncated; negative or non-finite input renders as `0:00`.
pub fn format_duration(duration_seconds: f64) -> String {
    let total = if duration_seconds.is_finite() && duration_seconds > 0.0 {
        duration_seconds as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn format_duration_under_a_minute() {
        assert_eq!(format_duration(7.0), "0:07");
    }

    #[test]
    fn format_duration_minutes_and_seconds() {
        assert_eq!(format_duration(65.0), "1:05");
        assert_eq!(format_duration(59.0 * 60.0 + 59.0), "59:59");
    }

    #[test]
    fn format_duration_switches_to_hours() {
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3725.0), "1:02:05");
        assert_eq!(format_duration(36000.0 + 61.0), "10:01:01");
    }

    #[test]
    fn format_duration_truncates_fractions() {
        assert_eq!(format_duration(65.999), "1:05");
    }

    #[test]
    fn format_duration_clamps_invalid_input() {
        assert_eq!(format_duration(-3.0), "0:00");
        assert_eq!(format_duration(f64::NAN), "0:00");
        assert_eq!(format_duration(f64::INFINITY), "0:00");
    }

    #[test]
    fn mp3_probe_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = Mp3Probe.probe(&dir.path().join("missing.mp3"));

        assert!(matches!(result, Err(ProbeError::Inaccessible { .. })));
    }
}
