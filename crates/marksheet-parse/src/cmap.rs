//! ToUnicode CMap parser.
//!
//! Reads the `bfchar` and `bfrange` sections of a `/ToUnicode` stream into a
//! code → text table. Destination strings are UTF-16BE hex; multi-unit
//! destinations (ligatures, surrogate pairs) decode to multi-char text.

use std::collections::HashMap;

use crate::error::BackendError;

/// Widest code range a single `bfrange` or `/W` entry may cover. Two-byte
/// codes never need more.
pub(crate) const MAX_CODE_SPAN: u32 = 0xFFFF;

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct CMap {
    mappings: HashMap<u32, String>,
}

impl CMap {
    /// Parse a ToUnicode CMap from its decoded stream bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Font`] when a mapping line carries invalid hex.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            let tokens = hex_tokens(section);
            for pair in tokens.chunks_exact(2) {
                mappings.insert(parse_code(pair[0])?, decode_utf16be(pair[1])?);
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            parse_bfrange(section, &mut mappings)?;
        }

        Ok(Self { mappings })
    }

    /// Text mapped to `code`, if any.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Bodies of every `begin ... end` section, in order.
fn sections<'a>(text: &'a str, begin: &'a str, end: &'a str) -> impl Iterator<Item = &'a str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find(begin)? + begin.len();
        let len = rest[start..].find(end)?;
        let body = &rest[start..start + len];
        rest = &rest[start + len + end.len()..];
        Some(body)
    })
}

/// Hex tokens (`<...>` contents) of a section, in order.
fn hex_tokens(section: &str) -> Vec<&str> {
    section
        .split('<')
        .skip(1)
        .filter_map(|chunk| chunk.split_once('>').map(|(hex, _)| hex.trim()))
        .collect()
}

fn parse_code(hex: &str) -> Result<u32, BackendError> {
    let compact: String = hex.split_whitespace().collect();
    u32::from_str_radix(&compact, 16)
        .map_err(|_| BackendError::Font(format!("invalid CMap code <{hex}>")))
}

fn hex_bytes(hex: &str) -> Result<Vec<u8>, BackendError> {
    let compact: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    compact
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| BackendError::Font(format!("invalid CMap hex <{hex}>")))
        })
        .collect()
}

fn decode_utf16be(hex: &str) -> Result<String, BackendError> {
    let bytes = hex_bytes(hex)?;
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect();
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// `<lo> <hi> <dst>` increments the last UTF-16 unit of `dst` per code;
/// `<lo> <hi> [<d0> <d1> ...]` lists one destination per code.
fn parse_bfrange(section: &str, mappings: &mut HashMap<u32, String>) -> Result<(), BackendError> {
    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let tokens = hex_tokens(line);
        let [lo, hi, rest @ ..] = tokens.as_slice() else {
            continue;
        };
        let lo = parse_code(lo)?;
        let hi = parse_code(hi)?;
        if hi < lo {
            continue;
        }
        if hi - lo > MAX_CODE_SPAN {
            tracing::debug!(lo, hi, "ignoring oversized bfrange");
            continue;
        }
        if line.contains('[') {
            for (code, dst) in (lo..=hi).zip(rest.iter()) {
                mappings.insert(code, decode_utf16be(dst)?);
            }
        } else if let Some(dst) = rest.first() {
            let mut units = hex_bytes(dst)?;
            for code in lo..=hi {
                mappings.insert(code, decode_utf16be(&to_hex(&units))?);
                increment_last_unit(&mut units);
            }
        }
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

fn increment_last_unit(bytes: &mut [u8]) {
    for b in bytes.iter_mut().rev() {
        let (next, overflow) = b.overflowing_add(1);
        *b = next;
        if !overflow {
            break;
        }
    }
}
