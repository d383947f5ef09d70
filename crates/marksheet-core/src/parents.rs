//! Father/mother name extraction, used only to exclude confusable name candidates.

use std::sync::LazyLock;

use regex::Regex;

use crate::segment::PageText;

static FATHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Father\s*Name\s*[:\-]\s*(.+)").expect("father pattern is valid")
});
static MOTHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Mother\s*Name\s*[:\-]\s*(.+)").expect("mother pattern is valid")
});

/// Parent names found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentNames {
    pub father: Option<String>,
    pub mother: Option<String>,
}

impl ParentNames {
    /// Scan the page's lines for `Father Name: ...` / `Mother Name: ...`.
    ///
    /// Each name is taken from the first line that carries it; the scan stops
    /// as soon as both are known.
    pub fn extract(page: &PageText) -> Self {
        let mut names = ParentNames::default();
        for line in &page.lines {
            if names.father.is_none() {
                names.father = labelled_value(&FATHER, &line.text);
            }
            if names.mother.is_none() {
                names.mother = labelled_value(&MOTHER, &line.text);
            }
            if names.father.is_some() && names.mother.is_some() {
                break;
            }
        }
        names
    }

    /// Whether `candidate` equals either parent name, ignoring case.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_lowercase();
        [&self.father, &self.mother]
            .into_iter()
            .flatten()
            .any(|parent| parent.to_lowercase() == candidate)
    }
}

fn labelled_value(pattern: &Regex, text: &str) -> Option<String> {
    let value = pattern.captures(text)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
