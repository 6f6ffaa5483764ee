pub mod document_repository;
pub mod openai_speech_engine;
pub mod speech_engine;

pub use document_repository::{DocumentLoader, LopdfLoader, PageSource};
pub use openai_speech_engine::{split_into_chunks, OpenAiSpeechEngine};
pub use speech_engine::{SpeechEngine, SpeechEngineError, SpeechResponse};
