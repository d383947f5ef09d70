//! Label synonym matchers.
//!
//! A [`LabelPattern`] recognizes `label [:-]? value` structure, case
//! insensitively, with the label bound to word boundaries. Patterns are built
//! once per run and shared read-only across pages.

use regex::Regex;

/// Default student-name label synonyms, most specific first.
pub const DEFAULT_NAME_LABELS: &[&str] = &["Student Name", "Name of Student", "Name"];

/// A compiled label synonym.
#[derive(Debug, Clone)]
pub struct LabelPattern {
    label: String,
    presence: Regex,
    capture: Regex,
}

impl LabelPattern {
    /// Compile a single label synonym.
    pub fn new(label: &str) -> Result<Self, regex::Error> {
        let label = label.trim();
        let escaped = regex::escape(label);
        let head = if label.starts_with(is_word_char) { r"\b" } else { "" };
        let tail = if label.ends_with(is_word_char) { r"\b" } else { "" };
        let presence = Regex::new(&format!(r"(?i){head}{escaped}{tail}"))?;
        let capture = Regex::new(&format!(r"(?i){head}{escaped}{tail}\s*[:\-]?\s*(.+)"))?;
        Ok(Self {
            label: label.to_string(),
            presence,
            capture,
        })
    }

    /// The label text this pattern was built from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the label occurs as a whole-word token in `text`.
    pub fn is_present(&self, text: &str) -> bool {
        self.presence.is_match(text)
    }

    /// Value following the first occurrence of the label.
    ///
    /// Returns `None` when the label is absent or when nothing but
    /// separators follows it (a bare label such as `"Student Name:"`).
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let value = self.capture.captures(text)?.get(1)?.as_str();
        let value = value.trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace());
        let value = value.trim();
        (!value.is_empty()).then_some(value)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Compile a list of label synonyms into matchers, preserving order.
pub fn compile_labels<S: AsRef<str>>(labels: &[S]) -> Result<Vec<LabelPattern>, regex::Error> {
    labels
        .iter()
        .filter_map(|label| {
            let label: &str = label.as_ref();
            (!label.trim().is_empty()).then(|| LabelPattern::new(label))
        })
        .collect()
}
