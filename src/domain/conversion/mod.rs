pub mod error;
pub mod extractor;
pub mod job;
pub mod model;
pub mod service;

pub use error::ConversionError;
pub use extractor::TextExtractor;
pub use job::{ConversionJob, DeferredCleanup};
pub use model::{
    AudioFormat, ConversionOptions, ExtractedText, PageRange, SynthesisRequest, Voice,
    MAX_TEXT_CHARS,
};
pub use service::{ConversionReport, ConversionService, SynthesisService};
