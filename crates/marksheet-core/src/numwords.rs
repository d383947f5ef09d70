//! Conversion of spelled-out cardinal numbers ("four hundred fifteen") to integers.
//!
//! Words that are not number words ("and", "only", "marks") are ignored, so a
//! phrase lifted from running text still converts. A fractional part
//! introduced by "point" is dropped.

use thiserror::Error;

/// Reasons a phrase is not a cardinal-number expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordsToNumberError {
    /// The phrase contains no number words at all.
    #[error("no number words found in {0:?}")]
    NoNumberWords(String),
    /// A scale word (or "point") occurs more than once.
    #[error("redundant number word {0:?}")]
    Redundant(&'static str),
    /// Scale words appear out of descending order ("thousand million").
    #[error("malformed number phrase {0:?}")]
    Malformed(String),
    /// The value does not fit in an `i64`.
    #[error("number phrase {0:?} overflows")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Unit(i64),
    Hundred,
    Scale(&'static str, i64),
    Point,
}

fn token(word: &str) -> Option<Token> {
    let unit = match word {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        "hundred" => return Some(Token::Hundred),
        "thousand" => return Some(Token::Scale("thousand", 1_000)),
        "million" => return Some(Token::Scale("million", 1_000_000)),
        "billion" => return Some(Token::Scale("billion", 1_000_000_000)),
        "point" => return Some(Token::Point),
        _ => return None,
    };
    Some(Token::Unit(unit))
}

/// Convert a spelled-out number phrase to an integer.
///
/// Hyphens are treated as spaces and case is ignored. A phrase made only of
/// ASCII digits is parsed directly.
pub fn words_to_number(phrase: &str) -> Result<i64, WordsToNumberError> {
    let normalized = phrase.replace('-', " ").to_lowercase();
    let trimmed = normalized.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed
            .parse()
            .map_err(|_| WordsToNumberError::Overflow(phrase.to_string()));
    }

    let tokens: Vec<Token> = trimmed.split_whitespace().filter_map(token).collect();
    if tokens.is_empty() {
        return Err(WordsToNumberError::NoNumberWords(phrase.to_string()));
    }

    for name in ["thousand", "million", "billion"] {
        let count = tokens
            .iter()
            .filter(|t| matches!(t, Token::Scale(n, _) if *n == name))
            .count();
        if count > 1 {
            return Err(WordsToNumberError::Redundant(name));
        }
    }
    if tokens.iter().filter(|t| **t == Token::Point).count() > 1 {
        return Err(WordsToNumberError::Redundant("point"));
    }

    let integer_part = match tokens.iter().position(|t| *t == Token::Point) {
        Some(idx) => &tokens[..idx],
        None => &tokens[..],
    };

    let mut last_scale = i64::MAX;
    for t in integer_part {
        if let Token::Scale(_, value) = t {
            if *value >= last_scale {
                return Err(WordsToNumberError::Malformed(phrase.to_string()));
            }
            last_scale = *value;
        }
    }

    accumulate(integer_part).ok_or_else(|| WordsToNumberError::Overflow(phrase.to_string()))
}

fn accumulate(tokens: &[Token]) -> Option<i64> {
    let mut total: i64 = 0;
    let mut current: i64 = 0;
    for t in tokens {
        match *t {
            Token::Unit(v) => current = current.checked_add(v)?,
            Token::Hundred => current = current.max(1).checked_mul(100)?,
            Token::Scale(_, scale) => {
                total = total.checked_add(current.max(1).checked_mul(scale)?)?;
                current = 0;
            }
            Token::Point => break,
        }
    }
    total.checked_add(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_units_and_tens() {
        assert_eq!(words_to_number("five"), Ok(5));
        assert_eq!(words_to_number("Eighty Five"), Ok(85));
        assert_eq!(words_to_number("eighty-five"), Ok(85));
        assert_eq!(words_to_number("zero"), Ok(0));
    }

    #[test]
    fn compound_phrases() {
        assert_eq!(words_to_number("Four Hundred Fifteen"), Ok(415));
        assert_eq!(words_to_number("one thousand two hundred thirty four"), Ok(1234));
        assert_eq!(words_to_number("two million three thousand"), Ok(2_003_000));
        assert_eq!(words_to_number("hundred"), Ok(100));
        assert_eq!(words_to_number("thousand"), Ok(1000));
    }

    #[test]
    fn filler_words_are_ignored() {
        assert_eq!(words_to_number("four hundred and fifteen only"), Ok(415));
        assert_eq!(words_to_number("Eighty Five SGPA"), Ok(85));
    }

    #[test]
    fn digit_strings_parse_directly() {
        assert_eq!(words_to_number("415"), Ok(415));
        assert_eq!(words_to_number(" 0085 "), Ok(85));
    }

    #[test]
    fn point_drops_fraction() {
        assert_eq!(words_to_number("eight point five"), Ok(8));
        assert_eq!(words_to_number("point five"), Ok(0));
    }

    #[test]
    fn no_number_words_is_error() {
        assert!(matches!(
            words_to_number("absent"),
            Err(WordsToNumberError::NoNumberWords(_))
        ));
        assert!(matches!(
            words_to_number(""),
            Err(WordsToNumberError::NoNumberWords(_))
        ));
    }

    #[test]
    fn redundant_scale_is_error() {
        assert_eq!(
            words_to_number("one thousand two thousand"),
            Err(WordsToNumberError::Redundant("thousand"))
        );
        assert_eq!(
            words_to_number("one point two point three"),
            Err(WordsToNumberError::Redundant("point"))
        );
    }

    #[test]
    fn scales_out_of_order_is_error() {
        assert!(matches!(
            words_to_number("five thousand two million"),
            Err(WordsToNumberError::Malformed(_))
        ));
    }
}
