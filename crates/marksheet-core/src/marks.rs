//! Total-marks normalization and the page-text fallback resolver.

use std::sync::LazyLock;

use regex::Regex;

use crate::numwords::words_to_number;
use crate::segment::PageText;

/// A raw total-marks value as proposed by the oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum MarksValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for MarksValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarksValue::Integer(n) => write!(f, "{n}"),
            MarksValue::Float(x) => write!(f, "{x}"),
            MarksValue::Text(s) => f.write_str(s),
        }
    }
}

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));
static IN_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)in\s+words[^\w\-]*[:\-]?\s*([a-z\s\-]+)").expect("in-words pattern is valid")
});
static OBTAINED_IN_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Total\s+Marks\s+Obtained.*?in\s+words[^\w\-]*[:\-]?\s*([A-Za-z\s\-]+)")
        .expect("obtained-in-words pattern is valid")
});
static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,4}").expect("number pattern is valid"));

/// Normalize a raw total-marks value into an integer.
///
/// Numbers are truncated. Strings are trimmed, stripped of punctuation (so
/// `"1,234"` and `"85."` parse), and parsed as digits or else as a
/// spelled-out number. Anything unparsable is `None`; this never fails.
pub fn normalize_total_marks(value: Option<&MarksValue>) -> Option<i64> {
    match value? {
        MarksValue::Integer(n) => Some(*n),
        MarksValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        MarksValue::Float(_) => None,
        MarksValue::Text(s) => normalize_marks_text(s),
    }
}

fn normalize_marks_text(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits = PUNCTUATION.replace_all(trimmed, "");
    if let Ok(n) = digits.trim().parse::<i64>() {
        return Some(n);
    }
    // Punctuation separates words ("Eighty-Five", "Four Hundred, Fifteen").
    let words = PUNCTUATION.replace_all(trimmed, " ");
    words_to_number(&words.to_lowercase()).ok()
}

/// Recover a total from the page itself when the oracle's value is unusable.
///
/// Tried in order:
/// 1. each position-ordered line mentioning "total marks", in order, together
///    with the line after it: an "in words" value, else the last 1-4 digit
///    token of that context;
/// 2. "Total Marks Obtained ... in words ..." anywhere in the page text;
/// 3. bottom-up over raw text lines, the last 1-4 digit token of the first
///    line mentioning "total".
pub fn fallback_total_marks(page: &PageText) -> Option<i64> {
    for (idx, line) in page.lines.iter().enumerate() {
        if !line.text.to_lowercase().contains("total marks") {
            continue;
        }
        let mut context = line.text.clone();
        if let Some(next) = page.lines.get(idx + 1) {
            context.push(' ');
            context.push_str(&next.text);
        }

        if let Some(words) = IN_WORDS.captures(&context).and_then(|c| c.get(1)) {
            if let Ok(n) = words_to_number(&words.as_str().trim().to_lowercase()) {
                return Some(n);
            }
        }
        if let Some(n) = last_number_token(&context) {
            return Some(n);
        }
    }

    if let Some(words) = OBTAINED_IN_WORDS
        .captures(&page.text)
        .and_then(|c| c.get(1))
    {
        if let Ok(n) = words_to_number(&words.as_str().trim().to_lowercase()) {
            return Some(n);
        }
    }

    page.text
        .lines()
        .rev()
        .filter(|line| line.to_lowercase().contains("total"))
        .find_map(last_number_token)
}

/// Last 1-4 digit token of `text`. The obtained figure conventionally
/// follows the maximum on the same line.
fn last_number_token(text: &str) -> Option<i64> {
    NUMBER_TOKEN
        .find_iter(text)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> MarksValue {
        MarksValue::Text(s.to_string())
    }

    #[test]
    fn absent_and_empty_are_none() {
        assert_eq!(normalize_total_marks(None), None);
        assert_eq!(normalize_total_marks(Some(&text(""))), None);
        assert_eq!(normalize_total_marks(Some(&text("   "))), None);
    }

    #[test]
    fn numbers_are_truncated() {
        assert_eq!(normalize_total_marks(Some(&MarksValue::Integer(415))), Some(415));
        assert_eq!(normalize_total_marks(Some(&MarksValue::Float(415.9))), Some(415));
        assert_eq!(normalize_total_marks(Some(&MarksValue::Float(f64::NAN))), None);
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(normalize_total_marks(Some(&text("1,234"))), Some(1234));
        assert_eq!(normalize_total_marks(Some(&text(" 85. "))), Some(85));
        assert_eq!(normalize_total_marks(Some(&text("(415)"))), Some(415));
    }

    #[test]
    fn word_numbers_convert() {
        assert_eq!(
            normalize_total_marks(Some(&text("Four Hundred Fifteen"))),
            Some(415)
        );
        assert_eq!(normalize_total_marks(Some(&text("Eighty-Five"))), Some(85));
    }

    #[test]
    fn punctuation_separates_number_words() {
        assert_eq!(
            normalize_total_marks(Some(&text("Four Hundred, Fifteen"))),
            Some(415)
        );
        assert_eq!(normalize_total_marks(Some(&text("EightyFive"))), None);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(normalize_total_marks(Some(&text("N/A"))), None);
        assert_eq!(normalize_total_marks(Some(&text("85 / 100"))), None);
    }

    #[test]
    fn fallback_prefers_last_numeric_token_on_line() {
        let page = PageText::from_plain_text("Name: Asha Verma\nTotal Marks: 100 85\nGrade: A");
        assert_eq!(fallback_total_marks(&page), Some(85));
    }

    #[test]
    fn fallback_prefers_words_form() {
        let page = PageText::from_plain_text(
            "Total Marks Obtained (in words): Eighty Five\nSGPA: 8.5",
        );
        assert_eq!(fallback_total_marks(&page), Some(85));
    }

    #[test]
    fn fallback_uses_following_line_as_context() {
        let page = PageText::from_plain_text("Total Marks Obtained\n500 412\nSGPA 8.2");
        assert_eq!(fallback_total_marks(&page), Some(412));
    }

    #[test]
    fn fallback_skips_total_marks_header_without_value() {
        let page = PageText::from_plain_text(
            "Subject Total Marks\nMathematics Physics\nTotal Marks (in words): Four Hundred Twelve\nGrand Total 600",
        );
        assert_eq!(fallback_total_marks(&page), Some(412));
    }

    #[test]
    fn fallback_global_words_form_spans_lines() {
        let page = PageText {
            lines: Vec::new(),
            blocks: Vec::new(),
            text: "Total Marks Obtained\n(in words)\nFour Hundred Twelve".to_string(),
        };
        assert_eq!(fallback_total_marks(&page), Some(412));
    }

    #[test]
    fn fallback_bottom_up_total_line() {
        let page = PageText::from_plain_text("Subject total 40\nSemester Total: 600 455\nEnd");
        assert_eq!(fallback_total_marks(&page), Some(455));
    }

    #[test]
    fn fallback_none_without_totals() {
        let page = PageText::from_plain_text("Name: Asha Verma\nGrade: A");
        assert_eq!(fallback_total_marks(&page), None);
        assert_eq!(fallback_total_marks(&PageText::default()), None);
    }
}
