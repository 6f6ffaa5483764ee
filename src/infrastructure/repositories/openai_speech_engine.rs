use super::speech_engine::{SpeechEngine, SpeechEngineError, SpeechResponse};
use crate::domain::conversion::{AudioFormat, SynthesisRequest, Voice};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice as OpenAiVoice},
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?。！？]+\s*").expect("valid sentence regex"))
}

/// Speech engine talking to an OpenAI-compatible `/audio/speech` endpoint
pub struct OpenAiSpeechEngine {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiSpeechEngine {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    /// Build a client for `api_base` (e.g. `https://ttsapi.site/v1`)
    pub fn from_endpoint(api_base: &str, api_key: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self::new(Arc::new(Client::with_config(config)), model)
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    /// Call the endpoint for a single chunk
    async fn call_openai(
        &self,
        text: &str,
        voice: Voice,
        format: AudioFormat,
        speed: f32,
    ) -> Result<Vec<u8>, SpeechEngineError> {
        tracing::debug!(
            model = %self.model,
            voice = %voice,
            text_length = text.len(),
            "Calling speech endpoint"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: openai_voice(voice),
            response_format: Some(openai_format(format)),
            speed: Some(speed),
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %voice,
                text_length = text.len(),
                "Speech endpoint call failed"
            );
            SpeechEngineError::Provider(format!("speech endpoint error: {}", e))
        })?;

        Ok(response.bytes.to_vec())
    }
}

fn openai_voice(voice: Voice) -> OpenAiVoice {
    match voice {
        Voice::Alloy => OpenAiVoice::Alloy,
        Voice::Echo => OpenAiVoice::Echo,
        Voice::Fable => OpenAiVoice::Fable,
        Voice::Onyx => OpenAiVoice::Onyx,
        Voice::Nova => OpenAiVoice::Nova,
        Voice::Shimmer => OpenAiVoice::Shimmer,
    }
}

fn openai_format(format: AudioFormat) -> SpeechResponseFormat {
    match format {
        AudioFormat::Mp3 => SpeechResponseFormat::Mp3,
        AudioFormat::Opus => SpeechResponseFormat::Opus,
        AudioFormat::Aac => SpeechResponseFormat::Aac,
        AudioFormat::Flac => SpeechResponseFormat::Flac,
        AudioFormat::Wav => SpeechResponseFormat::Wav,
        AudioFormat::Pcm => SpeechResponseFormat::Pcm,
    }
}

/// Split text into chunks of at most `max_length` characters.
///
/// Sentences are kept together when they fit. A sentence longer than the
/// limit is broken between words when `preserve_words` is set (a single word
/// longer than the limit is still cut), otherwise at exact character offsets.
pub fn split_into_chunks(text: &str, max_length: usize, preserve_words: bool) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_length == 0 {
        return Vec::new();
    }
    if text.chars().count() <= max_length {
        return vec![text.to_string()];
    }

    let mut chunker = Chunker::new(max_length);
    let mut last_end = 0;
    for mat in sentence_pattern().find_iter(text) {
        chunker.push_sentence(&text[last_end..mat.end()], preserve_words);
        last_end = mat.end();
    }
    if last_end < text.len() {
        chunker.push_sentence(&text[last_end..], preserve_words);
    }

    chunker.finish()
}

struct Chunker {
    max_length: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Chunker {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push_sentence(&mut self, sentence: &str, preserve_words: bool) {
        let len = sentence.chars().count();
        if len > self.max_length {
            self.flush();
            if preserve_words {
                self.push_words(sentence);
            } else {
                self.push_hard_split(sentence);
            }
            return;
        }

        if self.current_len + len > self.max_length {
            self.flush();
        }
        self.current.push_str(sentence);
        self.current_len += len;
    }

    fn push_words(&mut self, sentence: &str) {
        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > self.max_length {
                self.flush();
                self.push_hard_split(word);
                continue;
            }

            let needed = if self.current_len == 0 { word_len } else { word_len + 1 };
            if self.current_len + needed > self.max_length {
                self.flush();
            }
            if self.current_len > 0 {
                self.current.push(' ');
                self.current_len += 1;
            }
            self.current.push_str(word);
            self.current_len += word_len;
        }
        // Trailing separator so the next sentence does not fuse with this one
        if self.current_len > 0 && self.current_len < self.max_length {
            self.current.push(' ');
            self.current_len += 1;
        }
    }

    fn push_hard_split(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        for piece in chars.chunks(self.max_length) {
            let piece: String = piece.iter().collect();
            if !piece.trim().is_empty() {
                self.chunks.push(piece.trim().to_string());
            }
        }
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.current.clear();
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

#[async_trait]
impl SpeechEngine for OpenAiSpeechEngine {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn generate_speech_long_text(
        &self,
        request: SynthesisRequest,
    ) -> Result<SpeechResponse, SpeechEngineError> {
        let start_time = std::time::Instant::now();

        let chunks = split_into_chunks(
            request.text.as_str(),
            request.max_chunk_length,
            request.preserve_words,
        );
        if chunks.is_empty() {
            return Err(SpeechEngineError::InvalidRequest(
                "text is empty".to_string(),
            ));
        }

        tracing::info!(
            voice = %request.voice,
            model = %self.model,
            text_length = request.text.char_count(),
            chunk_count = chunks.len(),
            max_chunk_length = request.max_chunk_length,
            "Starting long-text synthesis"
        );

        let mut segments = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let audio = self
                .call_openai(chunk, request.voice, request.format, request.speed)
                .await?;

            tracing::debug!(
                chunk_index = index,
                chunk_length = chunk.len(),
                audio_size = audio.len(),
                "Chunk synthesized"
            );
            segments.push(audio);
        }

        let response = if request.auto_combine {
            SpeechResponse::combined(segments.concat(), request.format)
        } else {
            SpeechResponse::segmented(segments, request.format)
        };

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "openai-compatible",
            model = %self.model,
            latency_ms = duration.as_millis(),
            chunk_count = chunks.len(),
            audio_size_bytes = response.total_bytes(),
            "Long-text synthesis completed"
        );

        Ok(response)
    }
}
