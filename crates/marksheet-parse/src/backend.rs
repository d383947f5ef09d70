//! PDF parsing backend trait.
//!
//! Defines the [`PdfBackend`] trait that abstracts document access so the
//! facade does not depend on a particular PDF library.

use marksheet_core::{BBox, ExtractOptions, PdfError};

use crate::handler::ContentHandler;

/// Trait abstracting PDF parsing operations.
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(pdf_bytes)?;
/// let page = MyBackend::get_page(&doc, 0)?;
/// let media_box = MyBackend::page_media_box(&doc, &page)?;
/// MyBackend::interpret_page(&doc, &page, &mut handler, &options)?;
/// ```
pub trait PdfBackend {
    /// The parsed PDF document type.
    type Document;
    /// A reference to a single page within a document.
    type Page;
    /// Backend-specific error type, convertible to [`PdfError`].
    type Error: std::error::Error + Into<PdfError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable PDF, or the document
    /// is encrypted.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    fn page_count(doc: &Self::Document) -> usize;

    /// Access a page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error>;

    /// The page's MediaBox as `[x0, y0, x1, y1]` in PDF user space, stored
    /// in a [`BBox`] with `top = y0` and `bottom = y1`.
    ///
    /// # Errors
    ///
    /// Returns an error if no MediaBox is found on the page or its ancestors.
    fn page_media_box(doc: &Self::Document, page: &Self::Page) -> Result<BBox, Self::Error>;

    /// Interpret the page's content stream, reporting glyphs to `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content stream cannot be decoded or exceeds
    /// the limits in `options`.
    fn interpret_page(
        doc: &Self::Document,
        page: &Self::Page,
        handler: &mut dyn ContentHandler,
        options: &ExtractOptions,
    ) -> Result<(), Self::Error>;

    /// Plain reading-order text of the page, without positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot extract text from the page.
    fn extract_plain_text(doc: &Self::Document, page: &Self::Page) -> Result<String, Self::Error>;
}
