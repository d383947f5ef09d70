//! Top-level PDF document type.

use marksheet_core::{Char, ExtractOptions, PdfError};
use marksheet_parse::{
    CharEvent, ContentHandler, LopdfBackend, LopdfDocument, PdfBackend, char_from_event,
};

use crate::page::{Page, PageSource};

/// Iterator over the pages of a [`Pdf`], loading each page on demand.
pub struct PagesIter<'a> {
    pdf: &'a Pdf,
    current: usize,
    count: usize,
}

impl Iterator for PagesIter<'_> {
    type Item = Result<Page, PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }
        let result = self.pdf.page(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

/// A PDF document opened for extraction.
///
/// ```ignore
/// let pdf = Pdf::open_file("results.pdf", None)?;
/// for page in pdf.pages_iter() {
///     let text = page?.segment(&SegmentOptions::default());
/// }
/// ```
pub struct Pdf {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("doc", &self.doc)
            .field("options", &self.options)
            .finish()
    }
}

/// Collects glyphs as positioned chars, plus interpreter warnings.
struct CollectingHandler {
    page_height: f64,
    chars: Vec<Char>,
    warnings: Vec<String>,
}

impl ContentHandler for CollectingHandler {
    fn on_char(&mut self, event: CharEvent) {
        self.chars.push(char_from_event(&event, self.page_height));
    }

    fn on_warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

impl Pdf {
    /// Read a file and open it with [`Pdf::open`].
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::IoError`] if the file cannot be read, otherwise as
    /// [`Pdf::open`].
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| PdfError::IoError(e.to_string()))?;
        Self::open(&bytes, options)
    }

    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::ResourceLimitExceeded`] when the input is larger
    /// than `max_input_bytes`, [`PdfError::PasswordRequired`] for encrypted
    /// documents, and [`PdfError::ParseError`] for unreadable bytes.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, PdfError> {
        let options = options.unwrap_or_default();
        if let Some(max_bytes) = options.max_input_bytes {
            if bytes.len() > max_bytes {
                return Err(PdfError::ResourceLimitExceeded {
                    limit_name: "max_input_bytes".to_string(),
                    limit_value: max_bytes,
                    actual_value: bytes.len(),
                });
            }
        }
        let doc = LopdfBackend::open(bytes).map_err(PdfError::from)?;
        Ok(Self { doc, options })
    }

    pub fn page_count(&self) -> usize {
        LopdfBackend::page_count(&self.doc)
    }

    /// Load one page (0-based).
    ///
    /// Content that the interpreter cannot walk does not fail the page: the
    /// page falls back to the backend's plain text, and to no text at all if
    /// that fails too.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] when the index is out of range or the page has
    /// no usable MediaBox.
    pub fn page(&self, index: usize) -> Result<Page, PdfError> {
        let lopdf_page = LopdfBackend::get_page(&self.doc, index).map_err(PdfError::from)?;
        let media_box =
            LopdfBackend::page_media_box(&self.doc, &lopdf_page).map_err(PdfError::from)?;

        let mut handler = CollectingHandler {
            page_height: media_box.bottom,
            chars: Vec::new(),
            warnings: Vec::new(),
        };
        let source =
            match LopdfBackend::interpret_page(&self.doc, &lopdf_page, &mut handler, &self.options)
            {
                Ok(()) => PageSource::Positioned(handler.chars),
                Err(err) => {
                    tracing::warn!(
                        page = index + 1,
                        error = %err,
                        "content stream interpretation failed; using plain text"
                    );
                    handler.warnings.push(err.to_string());
                    let text = LopdfBackend::extract_plain_text(&self.doc, &lopdf_page)
                        .unwrap_or_else(|err| {
                            tracing::warn!(page = index + 1, error = %err, "plain text extraction failed");
                            handler.warnings.push(err.to_string());
                            String::new()
                        });
                    PageSource::Plain(text)
                }
            };

        Ok(Page::new(
            index,
            media_box.width(),
            media_box.height(),
            source,
            handler.warnings,
        ))
    }

    /// Iterate over all pages in order.
    pub fn pages_iter(&self) -> PagesIter<'_> {
        PagesIter {
            pdf: self,
            current: 0,
            count: self.page_count(),
        }
    }
}
