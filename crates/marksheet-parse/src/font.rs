//! Font loading for text extraction.
//!
//! A [`FontInfo`] carries what the interpreter needs per font: how to split a
//! shown string into character codes, each code's advance width, the
//! vertical extent of glyphs, and how to turn a code into text.

use std::collections::HashMap;

use crate::cmap::{CMap, MAX_CODE_SPAN};
use crate::encoding::{BaseEncoding, SimpleEncoding};
use crate::lopdf_backend::{object_to_f64, resolve_ref};

/// Advance width (glyph space, 1/1000 em) for codes without a known width.
pub const DEFAULT_WIDTH: f64 = 500.0;

const DEFAULT_ASCENT: f64 = 750.0;
const DEFAULT_DESCENT: f64 = -250.0;

#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing: f64,
    },
    Composite {
        default: f64,
        widths: HashMap<u32, f64>,
    },
}

/// Everything the interpreter needs to know about one font resource.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// `/BaseFont` without a subset prefix, or the resource name.
    pub base_name: String,
    /// Glyph ascent in glyph space units.
    pub ascent: f64,
    /// Glyph descent in glyph space units (negative).
    pub descent: f64,
    widths: Widths,
    encoding: Option<SimpleEncoding>,
    to_unicode: Option<CMap>,
    two_byte: bool,
}

impl FontInfo {
    /// Font used when a `Tf` names a resource that does not exist.
    pub fn fallback(name: &str) -> Self {
        Self {
            base_name: name.to_string(),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
                missing: DEFAULT_WIDTH,
            },
            encoding: None,
            to_unicode: None,
            two_byte: false,
        }
    }

    /// Load a font dictionary. Missing or malformed entries fall back to
    /// defaults rather than failing.
    pub fn load(doc: &lopdf::Document, resource_name: &str, dict: &lopdf::Dictionary) -> Self {
        let base_name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
            .unwrap_or_else(|| resource_name.to_string());
        let to_unicode = load_to_unicode(doc, dict);

        let is_type0 = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        if is_type0 {
            let descendant = dict
                .get(b"DescendantFonts")
                .ok()
                .map(|o| resolve_ref(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| arr.first())
                .map(|o| resolve_ref(doc, o))
                .and_then(|o| o.as_dict().ok());
            let (ascent, descent) = descendant
                .map(|d| descriptor_extent(doc, d))
                .unwrap_or((DEFAULT_ASCENT, DEFAULT_DESCENT));
            let widths = descendant
                .map(|d| composite_widths(doc, d))
                .unwrap_or(Widths::Composite {
                    default: 1000.0,
                    widths: HashMap::new(),
                });
            return Self {
                base_name,
                ascent,
                descent,
                widths,
                encoding: None,
                to_unicode,
                two_byte: true,
            };
        }

        let (ascent, descent) = descriptor_extent(doc, dict);
        Self {
            base_name,
            ascent,
            descent,
            widths: simple_widths(doc, dict),
            encoding: load_encoding(doc, dict),
            to_unicode,
            two_byte: false,
        }
    }

    /// Split a shown string into character codes.
    pub fn char_codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Advance width of `code` in glyph space units.
    pub fn width(&self, code: u32) -> f64 {
        match &self.widths {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|idx| widths.get(idx as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Composite { default, widths } => {
                widths.get(&code).copied().unwrap_or(*default)
            }
        }
    }

    /// Text for `code`: ToUnicode first, then the simple encoding, then the
    /// code itself as a Unicode scalar.
    pub fn unicode(&self, code: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|c| c.lookup(code)) {
            return Some(text.to_string());
        }
        if let Some(enc) = &self.encoding {
            if let Some(ch) = u8::try_from(code).ok().and_then(|b| enc.decode(b)) {
                return Some(ch.to_string());
            }
        }
        char::from_u32(code)
            .filter(|c| !c.is_control() || c.is_whitespace())
            .map(|c| c.to_string())
    }

    /// Whether the font uses two-byte character codes.
    pub fn is_two_byte(&self) -> bool {
        self.two_byte
    }
}

/// `ABCDEF+Helvetica` → `Helvetica`.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

fn load_to_unicode(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<CMap> {
    let obj = resolve_ref(doc, dict.get(b"ToUnicode").ok()?);
    let stream = obj.as_stream().ok()?;
    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    match CMap::parse(&data) {
        Ok(cmap) => Some(cmap),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed ToUnicode CMap");
            None
        }
    }
}

fn load_encoding(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<SimpleEncoding> {
    let obj = resolve_ref(doc, dict.get(b"Encoding").ok()?);
    if let Ok(name) = obj.as_name() {
        return BaseEncoding::from_name(name).map(SimpleEncoding::new);
    }
    let enc_dict = obj.as_dict().ok()?;
    let base = enc_dict
        .get(b"BaseEncoding")
        .ok()
        .and_then(|o| o.as_name().ok())
        .and_then(BaseEncoding::from_name)
        .unwrap_or(BaseEncoding::Standard);
    let mut encoding = SimpleEncoding::new(base);
    if let Some(differences) = enc_dict
        .get(b"Differences")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_array().ok())
    {
        let pairs = parse_differences(differences);
        encoding.apply_differences(pairs.iter().map(|(code, name)| (*code, name.as_str())));
    }
    Some(encoding)
}

/// `[code /name /name ... code /name ...]` → `(code, name)` pairs.
fn parse_differences(array: &[lopdf::Object]) -> Vec<(u8, String)> {
    let mut pairs = Vec::new();
    let mut next: Option<u32> = None;
    for obj in array {
        match obj {
            lopdf::Object::Integer(code) => next = u32::try_from(*code).ok(),
            lopdf::Object::Name(name) => {
                if let Some(code) = next {
                    if let Ok(byte) = u8::try_from(code) {
                        pairs.push((byte, String::from_utf8_lossy(name).into_owned()));
                    }
                    next = Some(code + 1);
                }
            }
            _ => {}
        }
    }
    pairs
}

fn descriptor_extent(doc: &lopdf::Document, font: &lopdf::Dictionary) -> (f64, f64) {
    let Some(descriptor) = font
        .get(b"FontDescriptor")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_dict().ok())
    else {
        return (DEFAULT_ASCENT, DEFAULT_DESCENT);
    };
    let descent = descriptor
        .get(b"Descent")
        .ok()
        .and_then(|o| object_to_f64(o).ok())
        .unwrap_or(DEFAULT_DESCENT);
    let ascent = descriptor
        .get(b"Ascent")
        .ok()
        .and_then(|o| object_to_f64(o).ok())
        .unwrap_or(DEFAULT_ASCENT);
    if ascent == 0.0 && descent == 0.0 {
        (1000.0, 0.0)
    } else {
        (1000.0 + descent.min(0.0), descent.min(0.0))
    }
}

fn simple_widths(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Widths {
    let first_char = dict
        .get(b"FirstChar")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);
    let widths = dict
        .get(b"Widths")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|arr| {
            arr.iter()
                .map(|w| object_to_f64(resolve_ref(doc, w)).unwrap_or(DEFAULT_WIDTH))
                .collect()
        })
        .unwrap_or_default();
    let missing = dict
        .get(b"FontDescriptor")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_dict().ok())
        .and_then(|d| d.get(b"MissingWidth").ok())
        .and_then(|o| object_to_f64(o).ok())
        .filter(|w| *w > 0.0)
        .unwrap_or(DEFAULT_WIDTH);
    Widths::Simple {
        first_char,
        widths,
        missing,
    }
}

/// `/W` entries are either `c [w1 w2 ...]` or `c_first c_last w`.
fn composite_widths(doc: &lopdf::Document, descendant: &lopdf::Dictionary) -> Widths {
    let default = descendant
        .get(b"DW")
        .ok()
        .and_then(|o| object_to_f64(o).ok())
        .unwrap_or(1000.0);
    let mut widths = HashMap::new();
    let entries = descendant
        .get(b"W")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_array().ok());

    if let Some(entries) = entries {
        let mut i = 0;
        while i < entries.len() {
            let Some(first) = object_to_f64(&entries[i]).ok().map(|v| v as u32) else {
                i += 1;
                continue;
            };
            match entries.get(i + 1).map(|o| resolve_ref(doc, o)) {
                Some(lopdf::Object::Array(list)) => {
                    for (offset, w) in list.iter().enumerate() {
                        let Some(code) = u32::try_from(offset)
                            .ok()
                            .and_then(|offset| first.checked_add(offset))
                        else {
                            break;
                        };
                        if let Ok(w) = object_to_f64(w) {
                            widths.insert(code, w);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let last = object_to_f64(last).map(|v| v as u32).unwrap_or(first);
                    let w = entries
                        .get(i + 2)
                        .and_then(|o| object_to_f64(o).ok())
                        .unwrap_or(default);
                    if last.saturating_sub(first) <= MAX_CODE_SPAN {
                        for code in first..=last.max(first) {
                            widths.insert(code, w);
                        }
                    } else {
                        tracing::debug!(first, last, "ignoring oversized /W range");
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }
    Widths::Composite { default, widths }
}
