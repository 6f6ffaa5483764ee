use std::fmt;
use std::str::FromStr;

use super::error::ConversionError;

/// Upper bound on extracted text accepted by the speech engine
pub const MAX_TEXT_CHARS: usize = 50_000;

pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 1000;
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;

/// Separator placed between the text of consecutive pages
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Inclusive, 1-based page selection. `None` on either side means
/// "from the first page" / "to the last page".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl PageRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    pub fn full() -> Self {
        Self::default()
    }

    /// Resolve against a document with `total_pages` pages into zero-based,
    /// half-open bounds `[sp, ep)`.
    pub fn resolve(&self, total_pages: u32) -> Result<(u32, u32), ConversionError> {
        let total = i64::from(total_pages);
        let sp = self.start.map(|s| s.saturating_sub(1)).unwrap_or(0);
        let ep = self.end.unwrap_or(total);

        if sp < 0 || sp >= total || ep < 1 || ep > total || sp >= ep {
            return Err(ConversionError::InvalidPageRange {
                total_pages,
                start: self.start,
                end: self.end,
            });
        }

        // Both bounds are within 0..=total_pages at this point
        Ok((sp as u32, ep as u32))
    }
}

/// Text pulled out of a document, pages joined by a blank line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (index, page) in pages.into_iter().enumerate() {
            if index > 0 {
                text.push_str(PAGE_SEPARATOR);
            }
            text.push_str(page.as_ref());
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, which is what the engine limit is expressed in
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for ExtractedText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for ExtractedText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Voices offered by the speech engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Voice {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Voice::ALL
            .into_iter()
            .find(|voice| voice.as_str() == wanted)
            .ok_or_else(|| {
                ConversionError::InvalidParameter(format!(
                    "Unsupported voice '{}', expected one of: alloy, echo, fable, onyx, nova, shimmer",
                    s
                ))
            })
    }
}

/// Audio container requested from the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus => "opus",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Opus => "audio/opus",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Pcm => "audio/pcm",
        }
    }
}

/// One call's worth of input for the long-text speech engine
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: ExtractedText,
    pub voice: Voice,
    pub format: AudioFormat,
    pub speed: f32,
    pub max_chunk_length: usize,
    pub preserve_words: bool,
    pub auto_combine: bool,
}

/// Caller-tunable parameters of a conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub voice: Voice,
    pub speed: f32,
    pub max_chunk_length: usize,
    pub page_range: PageRange,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            voice: Voice::default(),
            speed: DEFAULT_SPEED,
            max_chunk_length: DEFAULT_MAX_CHUNK_LENGTH,
            page_range: PageRange::full(),
        }
    }
}

impl ConversionOptions {
    pub fn validate(&self) -> Result<(), ConversionError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(ConversionError::InvalidParameter(format!(
                "Speed must be between {} and {}, got {}",
                MIN_SPEED, MAX_SPEED, self.speed
            )));
        }

        if self.max_chunk_length == 0 {
            return Err(ConversionError::InvalidParameter(
                "max_length must be a positive integer".to_string(),
            ));
        }

        Ok(())
    }
}
