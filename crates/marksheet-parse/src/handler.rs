//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter reports every shown glyph through [`ContentHandler`];
//! callers decide what to keep.

/// Information about a rendered character glyph.
///
/// Produced for each code shown by `Tj`, `TJ`, `'` and `"`. Carries the
/// positioning and font context needed to compute the glyph's box.
#[derive(Debug, Clone)]
pub struct CharEvent {
    /// The character code from the content stream.
    pub char_code: u32,
    /// Decoded text for the code, if the font could map it.
    pub unicode: Option<String>,
    /// Font name with any subset prefix removed.
    pub font_name: String,
    /// Font size in text space units.
    pub font_size: f64,
    /// Text matrix at the moment the glyph was shown.
    pub text_matrix: [f64; 6],
    /// Current transformation matrix at the moment the glyph was shown.
    pub ctm: [f64; 6],
    /// Advance width in glyph space units (1/1000 of text space).
    pub displacement: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// Horizontal scaling as a fraction (100% = 1.0).
    pub h_scaling: f64,
    pub rise: f64,
    /// Glyph ascent in glyph space units.
    pub ascent: f64,
    /// Glyph descent in glyph space units (negative).
    pub descent: f64,
}

/// Callback handler for content stream interpretation.
pub trait ContentHandler {
    /// Called when a character glyph is rendered.
    fn on_char(&mut self, _event: CharEvent) {}

    /// Called for recoverable problems (unknown fonts, bad XObjects).
    /// Interpretation continues with defaults.
    fn on_warning(&mut self, _message: String) {}
}
