//! Student-name resolution.
//!
//! Candidates come from three sources, tried in order: a label on a
//! position-ordered line, a label inside a text block, and finally the
//! oracle's proposal after sanitization. Parent names are never accepted.

use regex::Regex;

use crate::label::LabelPattern;
use crate::parents::ParentNames;
use crate::segment::PageText;

/// Labels whose adjacency to a proposed name marks it as a parent/guardian.
const GUARDIAN_LABELS: &[&str] = &["father name", "mother name", "parent", "guardian"];

/// Outcome of the line-based pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// A label was found and produced this candidate.
    Found(String),
    /// A label was found but its value is a parent name. Authoritative: no
    /// later pass may supply a name.
    Rejected,
    /// No label line produced a candidate.
    NotFound,
}

/// Line-based pass: the first line carrying a student-name label decides.
///
/// The value is the text after the label, or the next line's text when the
/// label stands alone.
pub fn name_from_lines(
    page: &PageText,
    patterns: &[LabelPattern],
    parents: &ParentNames,
) -> LineMatch {
    for (idx, line) in page.lines.iter().enumerate() {
        for pattern in patterns {
            if !pattern.is_present(&line.text) {
                continue;
            }
            let candidate = match pattern.capture(&line.text) {
                Some(value) => value,
                None => match page.lines.get(idx + 1).map(|next| next.text.trim()) {
                    Some(next) if !next.is_empty() => next,
                    _ => continue,
                },
            };
            if parents.matches(candidate) {
                return LineMatch::Rejected;
            }
            return LineMatch::Found(candidate.to_string());
        }
    }
    LineMatch::NotFound
}

/// Block-based pass: first label hit inside a block, first line of its value.
///
/// Parent-name candidates are skipped and the scan continues.
pub fn name_from_blocks(
    page: &PageText,
    patterns: &[LabelPattern],
    parents: &ParentNames,
) -> Option<String> {
    for block in &page.blocks {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        for pattern in patterns {
            let Some(value) = pattern.capture(block) else {
                continue;
            };
            let candidate = value.lines().next().unwrap_or_default().trim();
            if candidate.is_empty() || parents.matches(candidate) {
                continue;
            }
            return Some(candidate.to_string());
        }
    }
    None
}

/// Accept the oracle's name only if it plausibly names the student.
///
/// Rejects empty names, parent names, names printed next to a
/// parent/guardian label, single-token names, and names containing digits.
pub fn sanitize_oracle_name(
    proposed: &str,
    page_text: &str,
    parents: &ParentNames,
) -> Option<String> {
    let name = proposed.trim();
    if name.is_empty() || parents.matches(name) {
        return None;
    }
    if near_guardian_label(name, page_text) {
        return None;
    }
    if name.split_whitespace().count() < 2 {
        return None;
    }
    if name.chars().any(char::is_numeric) {
        return None;
    }
    Some(name.to_string())
}

fn near_guardian_label(name: &str, page_text: &str) -> bool {
    let haystack = page_text.to_lowercase();
    let escaped = regex::escape(&name.to_lowercase());
    GUARDIAN_LABELS.iter().any(|label| {
        let before = format!(r"{label}\s*[:\-]?\s*{escaped}");
        let after = format!(r"{escaped}\s*[:\-]?\s*{label}");
        [before, after]
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .any(|re| re.is_match(&haystack))
    })
}

/// Pick the final student name for a page.
///
/// Returns the empty string when no source yields an acceptable name.
pub fn resolve_name(
    page: &PageText,
    oracle_name: &str,
    patterns: &[LabelPattern],
    parents: &ParentNames,
) -> String {
    match name_from_lines(page, patterns, parents) {
        LineMatch::Found(name) => return name,
        LineMatch::Rejected => return String::new(),
        LineMatch::NotFound => {}
    }
    if let Some(name) = name_from_blocks(page, patterns, parents) {
        return name;
    }
    sanitize_oracle_name(oracle_name, &page.text, parents).unwrap_or_default()
}
