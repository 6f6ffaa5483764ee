use lopdf::Document;
use std::path::Path;

/// Opens paginated documents for text extraction.
///
/// Implementations hand back an owned [`PageSource`]; the underlying
/// document is released when that value is dropped.
pub trait DocumentLoader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, String>;
}

/// An open document
pub trait PageSource: Send {
    /// Total number of pages
    fn page_count(&self) -> u32;

    /// Plain text of the page at zero-based `index`
    fn page_text(&self, index: u32) -> Result<String, String>;
}

/// PDF loader backed by lopdf
#[derive(Debug, Default, Clone)]
pub struct LopdfLoader;

impl LopdfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for LopdfLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, String> {
        let document = Document::load(path).map_err(|e| e.to_string())?;
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

        tracing::debug!(
            path = %path.display(),
            page_count = page_numbers.len(),
            "PDF document loaded"
        );

        Ok(Box::new(LopdfPages {
            document,
            page_numbers,
        }))
    }
}

struct LopdfPages {
    document: Document,
    /// lopdf page numbers (1-based) in document order
    page_numbers: Vec<u32>,
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> u32 {
        self.page_numbers.len() as u32
    }

    fn page_text(&self, index: u32) -> Result<String, String> {
        let page_number = self
            .page_numbers
            .get(index as usize)
            .copied()
            .ok_or_else(|| format!("page index {} out of bounds", index))?;

        self.document
            .extract_text(&[page_number])
            .map_err(|e| e.to_string())
    }
}
