//! Media intake
//!
//! Decides whether an uploaded file is an image or a video and encodes image
//! bytes as a `data:` URL for the vision endpoint.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::types::MediaKind;
use super::VisionError;

/// An uploaded file held in memory
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    /// Declared MIME type; sniffed from the bytes when absent
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.filter(|m| !m.trim().is_empty()),
            bytes,
        }
    }

    /// Declared MIME type, or the one sniffed from the file header
    pub fn effective_mime(&self) -> Option<String> {
        self.mime_type
            .clone()
            .or_else(|| infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()))
    }

    /// Image or video; anything else is unsupported
    pub fn kind(&self) -> Result<MediaKind, VisionError> {
        let mime = self
            .effective_mime()
            .ok_or_else(|| VisionError::UnsupportedMediaType("unknown".to_string()))?;

        if mime.starts_with("image/") {
            Ok(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Ok(MediaKind::Video)
        } else {
            Err(VisionError::UnsupportedMediaType(mime))
        }
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_declared_mime_wins() {
        let file = MediaFile::new("clip.mp4", Some("video/mp4".into()), vec![1, 2, 3]);
        assert_eq!(file.kind().unwrap(), MediaKind::Video);

        let file = MediaFile::new("photo", Some("image/webp".into()), PNG_HEADER.to_vec());
        assert_eq!(file.kind().unwrap(), MediaKind::Image);
    }

    #[test]
    fn test_sniffed_when_undeclared() {
        let file = MediaFile::new("photo", None, PNG_HEADER.to_vec());
        assert_eq!(file.effective_mime().as_deref(), Some("image/png"));
        assert_eq!(file.kind().unwrap(), MediaKind::Image);

        let file = MediaFile::new("photo", Some("  ".into()), PNG_HEADER.to_vec());
        assert_eq!(file.kind().unwrap(), MediaKind::Image);
    }

    #[test]
    fn test_unsupported_types() {
        let file = MediaFile::new("report.pdf", Some("application/pdf".into()), Vec::new());
        assert!(matches!(file.kind(), Err(VisionError::UnsupportedMediaType(m)) if m == "application/pdf"));

        let file = MediaFile::new("blob", None, vec![0, 1, 2]);
        assert!(matches!(file.kind(), Err(VisionError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/jpeg", b"abc"), "data:image/jpeg;base64,YWJj");
    }
}
