use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::conversion::{AudioFormat, SynthesisRequest};

#[derive(Debug, thiserror::Error)]
pub enum SpeechEngineError {
    #[error("invalid synthesis request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Provider(String),
}

/// Long-text speech synthesis.
/// Abstracts the underlying provider (an OpenAI-compatible endpoint in
/// production, an in-memory double in tests).
///
/// Implementations are responsible for:
/// - Splitting the text into chunks of at most `max_chunk_length` characters,
///   on word boundaries when `preserve_words` is set
/// - Synthesizing every chunk, in order
/// - Concatenating the chunk audio when `auto_combine` is set
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Short provider name, reported by the readiness endpoint
    fn name(&self) -> &str;

    async fn generate_speech_long_text(
        &self,
        request: SynthesisRequest,
    ) -> Result<SpeechResponse, SpeechEngineError>;
}

/// Audio produced by one [`SpeechEngine`] call
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    segments: Vec<Vec<u8>>,
    format: AudioFormat,
    combined: bool,
}

impl SpeechResponse {
    /// A single continuous track
    pub fn combined(audio: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            segments: vec![audio],
            format,
            combined: true,
        }
    }

    /// One audio file per synthesized chunk
    pub fn segmented(segments: Vec<Vec<u8>>, format: AudioFormat) -> Self {
        Self {
            segments,
            format,
            combined: false,
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    /// Write the audio to `path`.
    ///
    /// A combined response becomes exactly `path`. A segmented one is written
    /// next to it as `<stem>_part<N>.<ext>`, N starting at 1.
    /// Returns every file written.
    pub async fn save_to_file(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        if self.combined {
            let audio = self.segments.concat();
            tokio::fs::write(path, &audio).await?;
            return Ok(vec![path.to_path_buf()]);
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let parent = path.parent().unwrap_or_else(|| Path::new(""));

        let mut written = Vec::with_capacity(self.segments.len());
        for (index, segment) in self.segments.iter().enumerate() {
            let part = parent.join(format!(
                "{}_part{}.{}",
                stem,
                index + 1,
                self.format.extension()
            ));
            tokio::fs::write(&part, segment).await?;
            written.push(part);
        }

        Ok(written)
    }
}
