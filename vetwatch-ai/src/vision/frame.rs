//! Video frame extraction
//!
//! Pulls one representative still out of a video so it can be analysed as an
//! image. The default implementation shells out to `ffprobe` for the duration
//! and `ffmpeg` for the frame.
//!
//! # Requirements
//! - `ffmpeg` and `ffprobe` on `PATH` (or configured explicitly)
//! - Temporary file system access (the video is written to a temp file)

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

use super::VisionError;

/// Seek target for the representative frame, in seconds
const PREFERRED_FRAME_SECONDS: f64 = 2.0;

/// Source of still frames from video bytes
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract one JPEG frame from `video`
    async fn extract_frame(&self, video: &[u8]) -> Result<Vec<u8>, VisionError>;
}

/// Position of the representative frame: 2s in, or half-way for shorter clips
pub fn frame_seek_seconds(duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => PREFERRED_FRAME_SECONDS.min(d / 2.0),
        _ => 0.0,
    }
}

/// `ffprobe`/`ffmpeg` subprocess extractor
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegFrameExtractor {
    pub fn new() -> Self {
        Self::with_commands("ffmpeg", "ffprobe")
    }

    pub fn with_commands(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Container duration in seconds; None if ffprobe can't tell
    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        String::from_utf8_lossy(&output.stdout).trim().parse::<f64>().ok()
    }

    async fn grab_frame(&self, path: &Path, seek: f64) -> Result<Vec<u8>, VisionError> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss", &format!("{:.3}", seek), "-i"])
            .arg(path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "mjpeg", "-q:v", "3", "-"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| VisionError::FrameExtraction(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VisionError::FrameExtraction(format!("ffmpeg failed: {}", stderr.trim())));
        }

        if output.stdout.is_empty() {
            return Err(VisionError::FrameExtraction("ffmpeg produced no frame".to_string()));
        }

        Ok(output.stdout)
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(&self, video: &[u8]) -> Result<Vec<u8>, VisionError> {
        let input_path = std::env::temp_dir().join(format!("vetwatch_{}.video", uuid::Uuid::new_v4()));

        fs::write(&input_path, video)
            .await
            .map_err(|e| VisionError::FrameExtraction(format!("Failed to stage video: {}", e)))?;

        let duration = self.probe_duration(&input_path).await;
        let seek = frame_seek_seconds(duration);

        debug!(duration = ?duration, seek_seconds = seek, "Extracting video frame");

        let result = self.grab_frame(&input_path, seek).await;

        let _ = fs::remove_file(&input_path).await;

        let frame = result?;
        debug!(frame_bytes = frame.len(), "Video frame extracted");
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_prefers_two_seconds() {
        assert_eq!(frame_seek_seconds(Some(30.0)), 2.0);
        assert_eq!(frame_seek_seconds(Some(4.0)), 2.0);
    }

    #[test]
    fn test_seek_halves_short_clips() {
        assert_eq!(frame_seek_seconds(Some(3.0)), 1.5);
        assert_eq!(frame_seek_seconds(Some(0.5)), 0.25);
    }

    #[test]
    fn test_seek_without_duration_starts_at_zero() {
        assert_eq!(frame_seek_seconds(None), 0.0);
        assert_eq!(frame_seek_seconds(Some(f64::NAN)), 0.0);
        assert_eq!(frame_seek_seconds(Some(0.0)), 0.0);
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_reports_extraction_error() {
        let extractor = FfmpegFrameExtractor::with_commands(
            "vetwatch-no-such-ffmpeg",
            "vetwatch-no-such-ffprobe",
        );
        let result = extractor.extract_frame(b"not a video").await;
        assert!(matches!(result, Err(VisionError::FrameExtraction(_))));
    }
}
