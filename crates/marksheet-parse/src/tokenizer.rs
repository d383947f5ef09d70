//! Content stream tokenizer.
//!
//! Splits decoded content stream bytes into [`Operator`]s, each carrying the
//! operands that preceded it. Comments are dropped and inline images
//! (`BI ... ID ... EI`) are skipped, since only text operators matter here.

use crate::error::BackendError;

/// A content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`.
    Name(String),
    /// Literal `(...)` or hex `<...>` string, as raw bytes.
    String(Vec<u8>),
    Array(Vec<Operand>),
    Boolean(bool),
    Null,
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// An operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

/// Tokenize a content stream.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for unterminated strings, arrays or
/// dictionaries.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut ops = Vec::new();
    let mut stack: Vec<Operand> = Vec::new();

    loop {
        lexer.skip_blank();
        let Some(b) = lexer.peek() else {
            break;
        };
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                let keyword = lexer.keyword();
                match keyword.as_str() {
                    "true" => stack.push(Operand::Boolean(true)),
                    "false" => stack.push(Operand::Boolean(false)),
                    "null" => stack.push(Operand::Null),
                    "BI" => {
                        lexer.skip_inline_image()?;
                        stack.clear();
                    }
                    _ => ops.push(Operator {
                        name: keyword,
                        operands: std::mem::take(&mut stack),
                    }),
                }
            }
            b'(' | b'<' | b'[' | b'/' | b'0'..=b'9' | b'+' | b'-' | b'.' => {
                stack.push(lexer.operand()?);
            }
            // Stray delimiters and binary junk between operators.
            _ => lexer.pos += 1,
        }
    }

    Ok(ops)
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn unterminated(what: &str) -> BackendError {
    BackendError::Interpreter(format!("unterminated {what} in content stream"))
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_blank(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|c| c != b'\n' && c != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Parse one operand starting at the current byte.
    fn operand(&mut self) -> Result<Operand, BackendError> {
        let b = self.peek().ok_or_else(|| unterminated("operand"))?;
        match b {
            b'(' => Ok(Operand::String(self.literal_string()?)),
            b'<' if self.input.get(self.pos + 1) == Some(&b'<') => {
                Ok(Operand::Dictionary(self.dictionary()?))
            }
            b'<' => Ok(Operand::String(self.hex_string()?)),
            b'[' => Ok(Operand::Array(self.array()?)),
            b'/' => Ok(Operand::Name(self.name())),
            b'0'..=b'9' | b'+' | b'-' | b'.' => Ok(self.number()),
            b'a'..=b'z' | b'A'..=b'Z' => Ok(match self.keyword().as_str() {
                "true" => Operand::Boolean(true),
                "false" => Operand::Boolean(false),
                "null" => Operand::Null,
                other => Operand::Name(other.to_string()),
            }),
            other => {
                self.pos += 1;
                Err(BackendError::Interpreter(format!(
                    "unexpected byte 0x{other:02X} in content stream"
                )))
            }
        }
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => {
                    let escaped = self.peek().ok_or_else(|| unterminated("string escape"))?;
                    self.pos += 1;
                    match escaped {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = u32::from(escaped - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                _ => out.push(b),
            }
        }
        Err(unterminated("literal string"))
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut nibbles = Vec::new();
        loop {
            let b = self.peek().ok_or_else(|| unterminated("hex string"))?;
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if let Some(v) = hex_value(b) {
                nibbles.push(v);
            }
        }
        if nibbles.len() % 2 == 1 {
            nibbles.push(0);
        }
        Ok(nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                None => return Err(unterminated("array")),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => items.push(self.operand()?),
            }
        }
    }

    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                None => return Err(unterminated("dictionary")),
                Some(b'>') => {
                    self.pos += 2;
                    return Ok(entries);
                }
                Some(b'/') => {
                    let key = self.name();
                    self.skip_blank();
                    let value = self.operand()?;
                    entries.push((key, value));
                }
                Some(_) => {
                    self.operand()?;
                }
            }
        }
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !is_whitespace(b) && !is_delimiter(b))
        {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut bytes = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(hi), Some(lo)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    bytes.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            bytes.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn number(&mut self) -> Operand {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let token = String::from_utf8_lossy(&self.input[start..self.pos]);
        if !seen_dot {
            if let Ok(i) = token.parse::<i64>() {
                return Operand::Integer(i);
            }
        }
        // Malformed numbers ("-", "--5") read as zero.
        Operand::Real(token.parse::<f64>().unwrap_or(0.0))
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'*' || b == b'\'' || b == b'"')
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Skip an inline image body. The `BI` keyword is already consumed.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        while self.pos + 1 < self.input.len() {
            let at_id = &self.input[self.pos..self.pos + 2] == b"ID"
                && self.pos > 0
                && is_whitespace(self.input[self.pos - 1]);
            self.pos += 1;
            if at_id {
                self.pos += 1;
                break;
            }
        }
        while self.pos + 1 < self.input.len() {
            let at_ei = &self.input[self.pos..self.pos + 2] == b"EI"
                && is_whitespace(self.input[self.pos - 1])
                && self
                    .input
                    .get(self.pos + 2)
                    .is_none_or(|b| is_whitespace(*b));
            if at_ei {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(unterminated("inline image"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ops: &[Operator]) -> Vec<&str> {
        ops.iter().map(|op| op.name.as_str()).collect()
    }

    #[test]
    fn typical_text_object() {
        let ops = tokenize(b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET").unwrap();
        assert_eq!(names(&ops), vec!["BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(
            ops[1].operands,
            vec![Operand::Name("F1".into()), Operand::Integer(12)]
        );
        assert_eq!(ops[3].operands, vec![Operand::String(b"Hello".to_vec())]);
    }

    #[test]
    fn numbers() {
        let ops = tokenize(b"1 -2 3.5 .5 -.25 +7 cm").unwrap();
        let values: Vec<f64> = ops[0].operands.iter().filter_map(Operand::as_f64).collect();
        assert_eq!(values, vec![1.0, -2.0, 3.5, 0.5, -0.25, 7.0]);
    }

    #[test]
    fn literal_string_escapes() {
        let ops = tokenize(br"(a\(b\)c\n\101 (nested)) Tj").unwrap();
        assert_eq!(
            ops[0].operands[0],
            Operand::String(b"a(b)c\nA (nested)".to_vec())
        );
    }

    #[test]
    fn hex_string_with_odd_digits() {
        let ops = tokenize(b"<48 65 6C6C 6F7> Tj").unwrap();
        assert_eq!(ops[0].operands[0], Operand::String(b"Hello\x70".to_vec()));
    }

    #[test]
    fn tj_array_with_kerning() {
        let ops = tokenize(b"[(Wo) 120 (rld) -50.5] TJ").unwrap();
        assert_eq!(
            ops[0].operands[0],
            Operand::Array(vec![
                Operand::String(b"Wo".to_vec()),
                Operand::Integer(120),
                Operand::String(b"rld".to_vec()),
                Operand::Real(-50.5),
            ])
        );
    }

    #[test]
    fn quote_operators() {
        let ops = tokenize(b"(a) ' 1 2 (b) \"").unwrap();
        assert_eq!(names(&ops), vec!["'", "\""]);
        assert_eq!(ops[1].operands.len(), 3);
    }

    #[test]
    fn comments_and_marked_content() {
        let ops = tokenize(b"% header\n/P <</MCID 3>> BDC (x) Tj EMC").unwrap();
        assert_eq!(names(&ops), vec!["BDC", "Tj", "EMC"]);
        assert!(matches!(ops[0].operands[1], Operand::Dictionary(_)));
    }

    #[test]
    fn inline_image_is_skipped() {
        let ops = tokenize(b"q BI /W 2 /H 1 ID \x00\xFF EI Q (t) Tj").unwrap();
        assert_eq!(names(&ops), vec!["q", "Q", "Tj"]);
    }

    #[test]
    fn unterminated_string_is_error() {
        assert!(tokenize(b"(never closed Tj").is_err());
    }

    #[test]
    fn empty_stream() {
        assert!(tokenize(b"").unwrap().is_empty());
        assert!(tokenize(b"  \n\t ").unwrap().is_empty());
    }
}
