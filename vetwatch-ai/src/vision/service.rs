//! Analysis service
//!
//! Orchestrates one analysis: configuration check, media intake, frame
//! extraction for videos, the model call, and response parsing.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::client::VisionBackend;
use super::frame::FrameExtractor;
use super::media::{data_url, MediaFile};
use super::parser::{parse_response, ParseOutcome};
use super::types::{AnalysisResult, AnimalType, MediaKind};
use super::VisionError;

/// File name given to camera captures
pub const CAMERA_CAPTURE_NAME: &str = "Real-time analysis";

/// Vision analysis entry point
#[derive(Clone)]
pub struct AnalysisService {
    backend: Arc<dyn VisionBackend>,
    frames: Arc<dyn FrameExtractor>,
}

impl AnalysisService {
    pub fn new(backend: Arc<dyn VisionBackend>, frames: Arc<dyn FrameExtractor>) -> Self {
        Self { backend, frames }
    }

    /// Whether analysis requests can reach the backend at all
    pub fn is_configured(&self) -> bool {
        self.backend.ensure_configured().is_ok()
    }

    /// Analyse an uploaded image or video
    ///
    /// # Errors
    /// - `Config` when the backend has no API key (checked before any I/O)
    /// - `UnsupportedMediaType` for anything but images and videos
    /// - `FrameExtraction`, `Network`, `Api`, `InvalidResponse` from the pipeline
    ///
    /// An unreadable model response is not an error: it yields the empty
    /// fallback result with `parse_failure` set.
    pub async fn analyze(&self, file: &MediaFile) -> Result<AnalysisResult, VisionError> {
        self.backend.ensure_configured()?;

        let kind = file.kind()?;
        let image_url = match kind {
            MediaKind::Video => {
                let frame = self.frames.extract_frame(&file.bytes).await?;
                data_url("image/jpeg", &frame)
            }
            _ => {
                let mime = file.effective_mime().unwrap_or_else(|| "image/jpeg".to_string());
                data_url(&mime, &file.bytes)
            }
        };

        let response = self.backend.complete(kind, &image_url).await?;
        let result = build_result(&file.name, kind, parse_response(&response));

        info!(
            analysis_id = %result.id,
            file_name = %result.file_name,
            kind = %kind,
            symptoms = result.symptoms.len(),
            confidence = result.confidence,
            alert_generated = result.alert_generated,
            "Analysis complete"
        );

        Ok(result)
    }

    /// Analyse a still captured from a live camera
    ///
    /// The frame is analysed as an image and relabelled as a camera capture.
    pub async fn analyze_camera_capture(&self, frame: &MediaFile) -> Result<AnalysisResult, VisionError> {
        self.backend.ensure_configured()?;

        if frame.kind()? != MediaKind::Image {
            return Err(VisionError::Media("Camera capture must be a still image".to_string()));
        }

        let mut result = self.analyze(frame).await?;
        result.file_type = MediaKind::Camera;
        result.file_name = CAMERA_CAPTURE_NAME.to_string();
        Ok(result)
    }
}

/// Turn a parse outcome into a stored result
pub fn build_result(file_name: &str, kind: MediaKind, outcome: ParseOutcome) -> AnalysisResult {
    let id = Uuid::new_v4();
    let timestamp = Utc::now();

    match outcome {
        ParseOutcome::Parsed(parsed) => AnalysisResult {
            id,
            file_name: file_name.to_string(),
            file_type: kind,
            alert_generated: parsed.alert_generated(),
            symptoms: parsed.symptoms,
            confidence: parsed.confidence,
            timestamp,
            animal_type: parsed.animal_type,
            parse_failure: None,
        },
        ParseOutcome::Fallback(failure) => {
            warn!(file_name = %file_name, reason = %failure, "Unreadable model response, using empty result");
            AnalysisResult {
                id,
                file_name: file_name.to_string(),
                file_type: kind,
                symptoms: Vec::new(),
                confidence: 0.0,
                timestamp,
                animal_type: AnimalType::Desconocido,
                alert_generated: false,
                parse_failure: Some(failure),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::types::ParseFailure;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    struct ScriptedBackend {
        configured: bool,
        reply: String,
        calls: Mutex<Vec<(MediaKind, String)>>,
    }

    impl ScriptedBackend {
        fn new(reply: &str) -> Self {
            Self {
                configured: true,
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VisionBackend for ScriptedBackend {
        fn ensure_configured(&self) -> Result<(), VisionError> {
            if self.configured {
                Ok(())
            } else {
                Err(VisionError::Config("no key".into()))
            }
        }

        async fn complete(&self, kind: MediaKind, image_data_url: &str) -> Result<String, VisionError> {
            self.calls.lock().unwrap().push((kind, image_data_url.to_string()));
            Ok(self.reply.clone())
        }
    }

    struct FixedFrame {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl FrameExtractor for FixedFrame {
        async fn extract_frame(&self, _video: &[u8]) -> Result<Vec<u8>, VisionError> {
            *self.calls.lock().unwrap() += 1;
            Ok(b"jpeg".to_vec())
        }
    }

    fn service(backend: Arc<ScriptedBackend>, frames: Arc<FixedFrame>) -> AnalysisService {
        AnalysisService::new(backend, frames)
    }

    fn frames() -> Arc<FixedFrame> {
        Arc::new(FixedFrame { calls: Mutex::new(0) })
    }

    #[tokio::test]
    async fn test_image_analysis() {
        let backend = Arc::new(ScriptedBackend::new(
            r#"{"symptoms":[{"name":"Cojera","confidence":0.9,"severity":"high","associatedDiseases":["Laminitis"]}],"confidence":0.8,"animalType":"vaca"}"#,
        ));
        let svc = service(backend.clone(), frames());

        let file = MediaFile::new("vaca.png", Some("image/png".into()), PNG_HEADER.to_vec());
        let result = svc.analyze(&file).await.unwrap();

        assert_eq!(result.file_name, "vaca.png");
        assert_eq!(result.file_type, MediaKind::Image);
        assert_eq!(result.animal_type, AnimalType::Vaca);
        assert!(result.alert_generated);
        assert!(result.parse_failure.is_none());

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_video_goes_through_frame_extractor() {
        let backend = Arc::new(ScriptedBackend::new(r#"{"symptoms":[]}"#));
        let frames = frames();
        let svc = service(backend.clone(), frames.clone());

        let file = MediaFile::new("clip.mp4", Some("video/mp4".into()), vec![0; 16]);
        let result = svc.analyze(&file).await.unwrap();

        assert_eq!(result.file_type, MediaKind::Video);
        assert_eq!(*frames.calls.lock().unwrap(), 1);
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].0, MediaKind::Video);
        assert!(calls[0].1.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails_before_media_work() {
        let mut backend = ScriptedBackend::new("{}");
        backend.configured = false;
        let backend = Arc::new(backend);
        let frames = frames();
        let svc = service(backend.clone(), frames.clone());

        let file = MediaFile::new("clip.mp4", Some("video/mp4".into()), vec![0; 16]);
        let result = svc.analyze(&file).await;

        assert!(matches!(result, Err(VisionError::Config(_))));
        assert_eq!(*frames.calls.lock().unwrap(), 0);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_response_yields_flagged_fallback() {
        let backend = Arc::new(ScriptedBackend::new("Sorry, I cannot help with that."));
        let svc = service(backend, frames());

        let file = MediaFile::new("vaca.png", Some("image/png".into()), PNG_HEADER.to_vec());
        let result = svc.analyze(&file).await.unwrap();

        assert!(result.symptoms.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.animal_type, AnimalType::Desconocido);
        assert!(!result.alert_generated);
        assert_eq!(result.parse_failure, Some(ParseFailure::NoJsonObject));
    }

    #[tokio::test]
    async fn test_camera_capture_is_relabelled() {
        let backend = Arc::new(ScriptedBackend::new(r#"{"symptoms":[],"animalType":"caballo"}"#));
        let svc = service(backend, frames());

        let frame = MediaFile::new("camera-capture.jpg", Some("image/jpeg".into()), vec![0xFF, 0xD8, 0xFF]);
        let result = svc.analyze_camera_capture(&frame).await.unwrap();

        assert_eq!(result.file_type, MediaKind::Camera);
        assert_eq!(result.file_name, CAMERA_CAPTURE_NAME);
        assert_eq!(result.animal_type, AnimalType::Caballo);
    }

    #[tokio::test]
    async fn test_camera_capture_rejects_video() {
        let backend = Arc::new(ScriptedBackend::new("{}"));
        let svc = service(backend, frames());

        let frame = MediaFile::new("stream.mp4", Some("video/mp4".into()), vec![0; 4]);
        assert!(matches!(svc.analyze_camera_capture(&frame).await, Err(VisionError::Media(_))));
    }

    #[tokio::test]
    async fn test_unsupported_media() {
        let backend = Arc::new(ScriptedBackend::new("{}"));
        let svc = service(backend, frames());

        let file = MediaFile::new("notes.pdf", Some("application/pdf".into()), vec![0; 4]);
        assert!(matches!(svc.analyze(&file).await, Err(VisionError::UnsupportedMediaType(_))));
    }
}
