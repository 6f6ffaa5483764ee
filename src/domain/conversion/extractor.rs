use std::path::Path;
use std::sync::Arc;

use super::error::ConversionError;
use super::model::{ExtractedText, PageRange};
use crate::infrastructure::repositories::DocumentLoader;

/// Pulls the plain text of a page range out of a document
#[derive(Clone)]
pub struct TextExtractor {
    loader: Arc<dyn DocumentLoader>,
}

impl TextExtractor {
    pub fn new(loader: Arc<dyn DocumentLoader>) -> Self {
        Self { loader }
    }

    /// Extract pages `page_range` of the document at `path`.
    ///
    /// Blocking; the document handle is owned by this call and released on
    /// every return path.
    pub fn extract(
        &self,
        path: &Path,
        page_range: PageRange,
    ) -> Result<ExtractedText, ConversionError> {
        let document = self
            .loader
            .open(path)
            .map_err(|reason| ConversionError::DocumentOpen {
                path: path.to_path_buf(),
                reason,
            })?;

        let total_pages = document.page_count();
        let (sp, ep) = page_range.resolve(total_pages)?;

        tracing::debug!(
            path = %path.display(),
            total_pages,
            first_page = sp + 1,
            last_page = ep,
            "Extracting page range"
        );

        let pages = (sp..ep)
            .map(|index| {
                document
                    .page_text(index)
                    .map_err(|reason| ConversionError::PageExtraction {
                        page: index + 1,
                        reason,
                    })
            })
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ExtractedText::from_pages(pages))
    }
}
