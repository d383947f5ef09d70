//! Simple-font encodings and glyph names.
//!
//! A [`SimpleEncoding`] maps single-byte codes to characters. It starts from
//! one of the predefined base encodings and is patched by the font's
//! `/Differences` array, whose glyph names resolve via [`glyph_name_to_char`].

/// Predefined base encodings for simple fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    /// Parse a PDF encoding name such as `WinAnsiEncoding`.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"StandardEncoding" => Some(BaseEncoding::Standard),
            b"WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            b"MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            _ => None,
        }
    }
}

/// A complete code → character table for a simple font.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleEncoding {
    table: [Option<char>; 256],
}

impl SimpleEncoding {
    pub fn new(base: BaseEncoding) -> Self {
        let mut table = [None; 256];
        for code in 0x20u8..0x7F {
            table[usize::from(code)] = Some(char::from(code));
        }
        match base {
            BaseEncoding::Standard => {
                table[0x27] = Some('\u{2019}');
                table[0x60] = Some('\u{2018}');
                for (code, ch) in STANDARD_HIGH {
                    table[usize::from(*code)] = Some(*ch);
                }
            }
            BaseEncoding::WinAnsi => {
                for (offset, ch) in WIN_ANSI_80_9F.chars().enumerate() {
                    if ch != '\0' {
                        table[0x80 + offset] = Some(ch);
                    }
                }
                for code in 0xA0u32..=0xFF {
                    table[code as usize] = char::from_u32(code);
                }
                table[0xAD] = Some('-');
            }
            BaseEncoding::MacRoman => {
                for (offset, ch) in MAC_ROMAN_HIGH.chars().enumerate() {
                    table[0x80 + offset] = Some(ch);
                }
            }
        }
        Self { table }
    }

    /// Override codes with `(code, glyph name)` pairs from `/Differences`.
    pub fn apply_differences<'a>(&mut self, differences: impl IntoIterator<Item = (u8, &'a str)>) {
        for (code, name) in differences {
            if let Some(ch) = glyph_name_to_char(name) {
                self.table[usize::from(code)] = Some(ch);
            }
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[usize::from(code)]
    }
}

/// WinAnsi 0x80..=0x9F; `\0` marks undefined codes.
const WIN_ANSI_80_9F: &str = "\u{20AC}\0\u{201A}\u{0192}\u{201E}\u{2026}\u{2020}\u{2021}\u{02C6}\u{2030}\u{0160}\u{2039}\u{0152}\0\u{017D}\0\0\u{2018}\u{2019}\u{201C}\u{201D}\u{2022}\u{2013}\u{2014}\u{02DC}\u{2122}\u{0161}\u{203A}\u{0153}\0\u{017E}\u{0178}";

/// MacRoman 0x80..=0xFF.
const MAC_ROMAN_HIGH: &str = concat!(
    "ÄÅÇÉÑÖÜáàâäãåçéè",
    "êëíìîïñóòôöõúùûü",
    "†°¢£§•¶ß®©™´¨≠ÆØ",
    "∞±≤≥¥µ∂∑∏π∫ªºΩæø",
    "¿¡¬√ƒ≈∆«»…\u{00A0}ÀÃÕŒœ",
    "–—“”‘’÷◊ÿŸ⁄€‹›ﬁﬂ",
    "‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ",
    "\u{F8FF}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ",
);

/// The upper half of StandardEncoding that appears in real documents.
const STANDARD_HIGH: &[(u8, char)] = &[
    (0xA1, '¡'),
    (0xA2, '¢'),
    (0xA3, '£'),
    (0xA5, '¥'),
    (0xA7, '§'),
    (0xAA, '“'),
    (0xAB, '«'),
    (0xAE, 'ﬁ'),
    (0xAF, 'ﬂ'),
    (0xB1, '–'),
    (0xB2, '†'),
    (0xB3, '‡'),
    (0xB7, '•'),
    (0xBA, '”'),
    (0xBB, '»'),
    (0xBC, '…'),
    (0xD0, '—'),
    (0xE1, 'Æ'),
    (0xE9, 'Ø'),
    (0xEA, 'Œ'),
    (0xF1, 'æ'),
    (0xF5, 'ı'),
    (0xF9, 'ø'),
    (0xFA, 'œ'),
    (0xFB, 'ß'),
];

/// Resolve an Adobe glyph name to a character.
///
/// Handles single-letter names, `uniXXXX` and `uXXXX[XX]` forms, digit names
/// and the punctuation and Latin-1 names common in Western fonts.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    // Variant suffixes: "a.sc", "one.oldstyle", "f_i" is handled below.
    let name = name.split('.').next().unwrap_or(name);
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    if let Some(hex) = name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    let ch = match name {
        "space" | "nbspace" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "minus" | "sfthyphen" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "quoteleft" => '‘',
        "quoteright" => '’',
        "quotedblleft" => '“',
        "quotedblright" => '”',
        "quotesinglbase" => '‚',
        "quotedblbase" => '„',
        "guillemotleft" => '«',
        "guillemotright" => '»',
        "bullet" => '•',
        "endash" => '–',
        "emdash" => '—',
        "ellipsis" => '…',
        "dagger" => '†',
        "daggerdbl" => '‡',
        "degree" => '°',
        "section" => '§',
        "paragraph" => '¶',
        "copyright" => '©',
        "registered" => '®',
        "trademark" => '™',
        "Euro" => '€',
        "sterling" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "plusminus" => '±',
        "multiply" => '×',
        "divide" => '÷',
        "fi" => 'ﬁ',
        "fl" => 'ﬂ',
        "germandbls" => 'ß',
        "dotlessi" => 'ı',
        "AE" => 'Æ',
        "ae" => 'æ',
        "OE" => 'Œ',
        "oe" => 'œ',
        "Oslash" => 'Ø',
        "oslash" => 'ø',
        _ => return accented_letter(name),
    };
    Some(ch)
}

/// `eacute`, `Udieresis` and friends.
fn accented_letter(name: &str) -> Option<char> {
    const ACCENTS: &[(&str, &str, &str)] = &[
        ("grave", "ÀÈÌÒÙ", "àèìòù"),
        ("acute", "ÁÉÍÓÚ", "áéíóú"),
        ("circumflex", "ÂÊÎÔÛ", "âêîôû"),
        ("dieresis", "ÄËÏÖÜ", "äëïöü"),
    ];
    const VOWELS: &str = "AEIOU";

    let mut chars = name.chars();
    let base = chars.next()?;
    let accent = chars.as_str();
    match (base, accent) {
        ('A', "tilde") => return Some('Ã'),
        ('a', "tilde") => return Some('ã'),
        ('O', "tilde") => return Some('Õ'),
        ('o', "tilde") => return Some('õ'),
        ('N', "tilde") => return Some('Ñ'),
        ('n', "tilde") => return Some('ñ'),
        ('A', "ring") => return Some('Å'),
        ('a', "ring") => return Some('å'),
        ('C', "cedilla") => return Some('Ç'),
        ('c', "cedilla") => return Some('ç'),
        ('y', "dieresis") => return Some('ÿ'),
        ('Y', "dieresis") => return Some('Ÿ'),
        _ => {}
    }
    let (_, upper, lower) = ACCENTS.iter().find(|(a, _, _)| *a == accent)?;
    let idx = VOWELS.find(base.to_ascii_uppercase())?;
    let table = if base.is_ascii_uppercase() { upper } else { lower };
    table.chars().nth(idx)
}
