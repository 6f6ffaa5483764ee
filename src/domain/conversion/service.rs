use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::ConversionError;
use super::extractor::TextExtractor;
use super::model::{
    AudioFormat, ConversionOptions, ExtractedText, SynthesisRequest, Voice, MAX_TEXT_CHARS,
};
use crate::infrastructure::repositories::SpeechEngine;

/// Validates extracted text and hands it to the speech engine
pub struct SynthesisService {
    engine: Arc<dyn SpeechEngine>,
    timeout: Duration,
}

impl SynthesisService {
    pub fn new(engine: Arc<dyn SpeechEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Synthesize `text` into a single MP3 track at `destination`.
    ///
    /// One engine attempt per call, bounded by the configured timeout.
    pub async fn synthesize(
        &self,
        text: ExtractedText,
        destination: &Path,
        voice: Voice,
        speed: f32,
        max_chunk_length: usize,
    ) -> Result<PathBuf, ConversionError> {
        if text.is_blank() {
            return Err(ConversionError::EmptyText);
        }

        let actual = text.char_count();
        if actual > MAX_TEXT_CHARS {
            return Err(ConversionError::TextTooLarge {
                limit: MAX_TEXT_CHARS,
                actual,
            });
        }

        let request = SynthesisRequest {
            text,
            voice,
            format: AudioFormat::Mp3,
            speed,
            max_chunk_length,
            preserve_words: true,
            auto_combine: true,
        };

        tracing::info!(
            voice = %voice,
            speed,
            max_chunk_length,
            text_length = actual,
            engine = self.engine.name(),
            "Requesting speech synthesis"
        );

        let response =
            match tokio::time::timeout(self.timeout, self.engine.generate_speech_long_text(request))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(ConversionError::SynthesisEngine(e.to_string())),
                Err(_) => {
                    tracing::error!(
                        timeout_ms = self.timeout.as_millis(),
                        "Speech synthesis timed out"
                    );
                    return Err(ConversionError::SynthesisEngine(format!(
                        "speech synthesis timed out after {:?}",
                        self.timeout
                    )));
                }
            };

        response
            .save_to_file(destination)
            .await
            .map_err(|e| ConversionError::AudioWrite {
                path: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            destination = %destination.display(),
            audio_size = response.total_bytes(),
            segments = response.segment_count(),
            format = response.format().extension(),
            "Audio written"
        );

        Ok(destination.to_path_buf())
    }
}

/// Outcome of one successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub characters: usize,
    pub extraction_elapsed: Duration,
    pub synthesis_elapsed: Duration,
}

impl ConversionReport {
    pub fn total_elapsed(&self) -> Duration {
        self.extraction_elapsed + self.synthesis_elapsed
    }
}

/// Extraction followed by synthesis for one document
pub struct ConversionService {
    extractor: TextExtractor,
    synthesis: SynthesisService,
}

impl ConversionService {
    pub fn new(extractor: TextExtractor, synthesis: SynthesisService) -> Self {
        Self {
            extractor,
            synthesis,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.synthesis.engine_name()
    }

    /// Extract text on the blocking pool, returning once the document is closed
    pub async fn extract(
        &self,
        input: &Path,
        options: &ConversionOptions,
    ) -> Result<ExtractedText, ConversionError> {
        let extractor = self.extractor.clone();
        let input = input.to_path_buf();
        let page_range = options.page_range;

        tokio::task::spawn_blocking(move || extractor.extract(&input, page_range))
            .await
            .map_err(|e| ConversionError::ExtractionTask(e.to_string()))?
    }

    pub async fn synthesize(
        &self,
        text: ExtractedText,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<PathBuf, ConversionError> {
        self.synthesis
            .synthesize(
                text,
                output,
                options.voice,
                options.speed,
                options.max_chunk_length,
            )
            .await
    }

    pub async fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<ConversionReport, ConversionError> {
        options.validate()?;

        let started = Instant::now();
        let text = self.extract(input, options).await?;
        let extraction_elapsed = started.elapsed();
        let characters = text.char_count();

        tracing::info!(
            input = %input.display(),
            characters,
            extraction_ms = extraction_elapsed.as_millis(),
            "Text extracted"
        );

        let synthesis_started = Instant::now();
        let output_path = self.synthesize(text, output, options).await?;
        let synthesis_elapsed = synthesis_started.elapsed();

        tracing::info!(
            output = %output_path.display(),
            synthesis_ms = synthesis_elapsed.as_millis(),
            "Conversion completed"
        );

        Ok(ConversionReport {
            output_path,
            characters,
            extraction_elapsed,
            synthesis_elapsed,
        })
    }
}
