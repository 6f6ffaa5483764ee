use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Failed to open document {}: {reason}", .path.display())]
    DocumentOpen { path: PathBuf, reason: String },

    #[error(
        "Invalid page range (total pages: {total_pages}): start_page={}, end_page={}",
        fmt_bound(.start),
        fmt_bound(.end)
    )]
    InvalidPageRange {
        total_pages: u32,
        start: Option<i64>,
        end: Option<i64>,
    },

    #[error("Failed to extract text from page {page}: {reason}")]
    PageExtraction { page: u32, reason: String },

    #[error("Text extraction did not complete: {0}")]
    ExtractionTask(String),

    #[error("No text could be extracted from the document (it may be an image-only PDF that needs OCR)")]
    EmptyText,

    #[error(
        "Extracted text exceeds the {limit} character limit of the speech engine ({actual} characters); narrow the page range or split the document"
    )]
    TextTooLarge { limit: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to write audio to {}: {reason}", .path.display())]
    AudioWrite { path: PathBuf, reason: String },

    #[error("Speech synthesis failed: {0}")]
    SynthesisEngine(String),

    #[error("Failed to read uploaded PDF: {0}")]
    UploadRead(String),

    #[error("Unsupported file type '{0}', please upload a PDF")]
    UnsupportedContentType(String),
}

fn fmt_bound(bound: &Option<i64>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_else(|| "-".to_string())
}

impl ConversionError {
    /// Whether the caller caused the failure (bad input rather than a broken dependency)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPageRange { .. }
                | Self::EmptyText
                | Self::TextTooLarge { .. }
                | Self::InvalidParameter(_)
                | Self::UploadRead(_)
                | Self::UnsupportedContentType(_)
        )
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::ExternalService(format!("Failed to generate audio. {}", err))
        }
    }
}
