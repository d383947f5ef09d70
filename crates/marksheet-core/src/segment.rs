//! Page segmentation into position-ordered lines, blocks, and plain text.
//!
//! [`PageText`] is the single view of a page that every field rule reads:
//! label matching walks [`PageText::lines`], block matching walks
//! [`PageText::blocks`], and the raw-text scans use [`PageText::text`].

use crate::layout::{
    cluster_lines_into_blocks, cluster_words_into_lines, sort_blocks_reading_order,
    split_lines_at_columns,
};
use crate::text::Char;
use crate::words::{WordExtractor, WordOptions};

/// Tolerances used when grouping characters into words, lines, and blocks.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentOptions {
    /// Maximum horizontal gap between characters of one word (points).
    pub x_tolerance: f64,
    /// Maximum vertical drift within a word and within a line (points).
    pub y_tolerance: f64,
    /// Horizontal gap that splits a line into separate segments (points).
    pub x_density: f64,
    /// Maximum vertical gap between lines of one block (points).
    pub y_density: f64,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            x_density: 10.0,
            y_density: 10.0,
        }
    }
}

/// One visual line (or line segment) of a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageLine {
    /// Trimmed line text.
    pub text: String,
    /// Top edge of the line, `None` when the page came from plain text only.
    pub top: Option<f64>,
}

impl PageLine {
    /// Vertical sort key; unknown positions sort as zero.
    pub fn sort_key(&self) -> f64 {
        self.top.unwrap_or(0.0)
    }
}

/// Segmented text of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    /// Non-empty lines, sorted by ascending top (stable).
    pub lines: Vec<PageLine>,
    /// Block texts in reading order, lines separated by `'\n'`.
    pub blocks: Vec<String>,
    /// Plain reading-order text of the page.
    pub text: String,
}

impl PageText {
    /// Segment a page from its positioned characters.
    pub fn from_chars(chars: &[Char], options: &SegmentOptions) -> Self {
        let word_options = WordOptions {
            x_tolerance: options.x_tolerance,
            y_tolerance: options.y_tolerance,
            use_text_flow: false,
        };
        let words = WordExtractor::extract(chars, &word_options);
        let rows = cluster_words_into_lines(&words, options.y_tolerance);
        let text = rows
            .iter()
            .map(|row| row.text())
            .collect::<Vec<_>>()
            .join("\n");

        let segments = split_lines_at_columns(rows, options.x_density);
        let mut lines: Vec<PageLine> = segments
            .iter()
            .filter_map(|segment| {
                let text = segment.text().trim().to_string();
                (!text.is_empty()).then_some(PageLine {
                    text,
                    top: Some(segment.bbox.top),
                })
            })
            .collect();
        lines.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));

        let mut blocks = cluster_lines_into_blocks(segments, options.y_density);
        sort_blocks_reading_order(&mut blocks);
        let blocks = blocks
            .iter()
            .map(|block| block.text())
            .filter(|text| !text.trim().is_empty())
            .collect();

        Self {
            lines,
            blocks,
            text,
        }
    }

    /// Build the degraded rendering used when positioned extraction fails.
    ///
    /// Every non-empty line becomes both a [`PageLine`] without position and
    /// its own block.
    pub fn from_plain_text(text: &str) -> Self {
        let lines: Vec<PageLine> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| PageLine {
                text: line.to_string(),
                top: None,
            })
            .collect();
        let blocks = lines.iter().map(|line| line.text.clone()).collect();
        Self {
            lines,
            blocks,
            text: text.to_string(),
        }
    }

    /// Whether the page carried no text at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.text.trim().is_empty()
    }
}
