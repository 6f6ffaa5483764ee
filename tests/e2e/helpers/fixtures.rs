use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf2tts::domain::conversion::{AudioFormat, SynthesisRequest};
use pdf2tts::infrastructure::repositories::{
    split_into_chunks, SpeechEngine, SpeechEngineError, SpeechResponse,
};
use std::sync::Mutex;

/// Bytes returned for every synthesized chunk: an ID3 header followed by an MPEG frame sync
pub const MOCK_MP3_CHUNK: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00\xff\xfb\x90\x00mock-audio";

/// In-memory speech engine that records what it was asked to say
pub struct FakeSpeechEngine {
    requests: Mutex<Vec<SynthesisRequest>>,
    failure: Option<String>,
}

impl FakeSpeechEngine {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// An engine whose every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the most recent request
    pub fn last_text(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.text.as_str().to_string())
    }
}

#[async_trait]
impl SpeechEngine for FakeSpeechEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate_speech_long_text(
        &self,
        request: SynthesisRequest,
    ) -> Result<SpeechResponse, SpeechEngineError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(message) = &self.failure {
            return Err(SpeechEngineError::Provider(message.clone()));
        }

        let chunks = split_into_chunks(
            request.text.as_str(),
            request.max_chunk_length,
            request.preserve_words,
        );
        let audio = chunks
            .iter()
            .flat_map(|_| MOCK_MP3_CHUNK.iter().copied())
            .collect();

        Ok(SpeechResponse::combined(audio, AudioFormat::Mp3))
    }
}

/// Build an in-memory PDF with one page per entry; an empty entry yields a page without text
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            vec![]
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
