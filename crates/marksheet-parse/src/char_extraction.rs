//! Character bounding boxes from interpreter events.
//!
//! Builds the text rendering matrix for each glyph and maps the glyph box to
//! top-left-origin page coordinates.

use marksheet_core::{BBox, Char, Ctm, Point};

use crate::handler::CharEvent;

/// Convert a [`CharEvent`] into a positioned [`Char`].
///
/// PDF space has a bottom-left origin; the result is flipped so that
/// `top = page_height - max_y`.
pub fn char_from_event(event: &CharEvent, page_height: f64) -> Char {
    // Trm = [Tfs*Th, 0, 0, Tfs, 0, Trise] x Tm x CTM
    let font_matrix = Ctm::new(
        event.font_size * event.h_scaling,
        0.0,
        0.0,
        event.font_size,
        0.0,
        event.rise,
    );
    let trm = font_matrix
        .concat(&Ctm::from_array(&event.text_matrix))
        .concat(&Ctm::from_array(&event.ctm));

    // Box covers the glyph advance only; Tc/Tw move the pen, not the glyph.
    let width = event.displacement / 1000.0;
    let ascent = event.ascent / 1000.0;
    let descent = event.descent / 1000.0;
    let corners = [
        trm.transform_point(Point::new(0.0, descent)),
        trm.transform_point(Point::new(width, descent)),
        trm.transform_point(Point::new(width, ascent)),
        trm.transform_point(Point::new(0.0, ascent)),
    ];

    let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let text = event.unicode.clone().unwrap_or_else(|| {
        char::from_u32(event.char_code)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string()
    });

    Char {
        text,
        bbox: BBox::new(min_x, page_height - max_y, max_x, page_height - min_y),
        fontname: event.font_name.clone(),
        size: event.font_size,
    }
}
