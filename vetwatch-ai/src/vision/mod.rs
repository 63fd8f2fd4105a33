//! Vision analysis adapter
//!
//! Sends animal images (or a frame pulled from a video) to an external
//! chat-completion model and maps the free-text answer into typed symptoms.

pub mod client;
pub mod frame;
pub mod media;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod types;

pub use client::{ChatCompletionsClient, VisionBackend};
pub use frame::{FfmpegFrameExtractor, FrameExtractor};
pub use media::MediaFile;
pub use parser::{parse_response, ParseOutcome, ParsedAnalysis};
pub use service::AnalysisService;
pub use types::{AnalysisResult, AnimalType, DetectedSymptom, MediaKind, ParseFailure};

use thiserror::Error;

/// Vision adapter errors
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}
