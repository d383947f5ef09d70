//! A single loaded page.

use marksheet_core::{Char, PageText, SegmentOptions};

/// Where a page's text came from.
#[derive(Debug, Clone)]
pub(crate) enum PageSource {
    /// Glyphs from the content stream interpreter.
    Positioned(Vec<Char>),
    /// Backend plain text, used when interpretation failed.
    Plain(String),
}

/// A page of a [`crate::Pdf`].
#[derive(Debug, Clone)]
pub struct Page {
    index: usize,
    width: f64,
    height: f64,
    source: PageSource,
    warnings: Vec<String>,
}

impl Page {
    pub(crate) fn new(
        index: usize,
        width: f64,
        height: f64,
        source: PageSource,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            index,
            width,
            height,
            source,
            warnings,
        }
    }

    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Positioned characters; empty for plain-text pages.
    pub fn chars(&self) -> &[Char] {
        match &self.source {
            PageSource::Positioned(chars) => chars,
            PageSource::Plain(_) => &[],
        }
    }

    /// Whether the page fell back to plain text without positions.
    pub fn is_plain_text(&self) -> bool {
        matches!(self.source, PageSource::Plain(_))
    }

    /// Non-fatal problems met while loading the page.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Segment the page into position-ordered lines, blocks and plain text.
    pub fn segment(&self, options: &SegmentOptions) -> PageText {
        match &self.source {
            PageSource::Positioned(chars) => PageText::from_chars(chars, options),
            PageSource::Plain(text) => PageText::from_plain_text(text),
        }
    }
}
