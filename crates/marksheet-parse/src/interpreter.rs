//! Content stream interpreter.
//!
//! Walks tokenized operators, keeping the CTM stack and text state, and
//! reports each shown character code to a [`ContentHandler`]. Form XObjects
//! are interpreted recursively through `Do`.

use std::collections::HashMap;

use marksheet_core::{Ctm, ExtractOptions};

use crate::error::BackendError;
use crate::font::FontInfo;
use crate::handler::{CharEvent, ContentHandler};
use crate::lopdf_backend::{object_to_f64, resolve_ref};
use crate::text_state::{TextState, TextStateSnapshot};
use crate::tokenizer::{Operand, tokenize};

/// Graphics state carried across a page and its Form XObjects.
#[derive(Debug, Clone, Default)]
pub(crate) struct GraphicsState {
    ctm: Ctm,
    stack: Vec<(Ctm, TextStateSnapshot)>,
}

impl GraphicsState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn save(&mut self, text: TextStateSnapshot) {
        self.stack.push((self.ctm, text));
    }

    /// Pops the saved state. An unbalanced `Q` leaves the state untouched.
    fn restore(&mut self) -> Option<TextStateSnapshot> {
        let (ctm, text) = self.stack.pop()?;
        self.ctm = ctm;
        Some(text)
    }

    /// `cm`: the new matrix applies before the current CTM.
    fn concat(&mut self, m: Ctm) {
        self.ctm = m.concat(&self.ctm);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn interpret_content_stream(
    doc: &lopdf::Document,
    stream_bytes: &[u8],
    resources: &lopdf::Dictionary,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    depth: usize,
    gstate: &mut GraphicsState,
    tstate: &mut TextState,
) -> Result<(), BackendError> {
    if depth > options.max_recursion_depth {
        return Err(BackendError::Interpreter(format!(
            "Form XObject recursion depth {} exceeds limit {}",
            depth, options.max_recursion_depth
        )));
    }

    let operators = tokenize(stream_bytes)?;
    let mut fonts: HashMap<String, FontInfo> = HashMap::new();

    for op in &operators {
        let args = &op.operands;
        match op.name.as_str() {
            "q" => gstate.save(tstate.save_snapshot()),
            "Q" => {
                if let Some(snapshot) = gstate.restore() {
                    tstate.restore_snapshot(snapshot);
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(args) {
                    gstate.concat(m);
                }
            }

            "BT" => tstate.begin_text(),
            "ET" => {}
            "Tf" => {
                if let (Some(Operand::Name(name)), Some(size)) = (args.first(), get_f64(args, 1)) {
                    if !fonts.contains_key(name) {
                        let info = load_font(doc, resources, name).unwrap_or_else(|| {
                            handler.on_warning(format!("font /{name} not found in resources"));
                            FontInfo::fallback(name)
                        });
                        fonts.insert(name.clone(), info);
                    }
                    tstate.font_name = name.clone();
                    tstate.font_size = size;
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(args) {
                    tstate.set_text_matrix(m);
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (get_f64(args, 0), get_f64(args, 1)) {
                    tstate.move_text_position(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (get_f64(args, 0), get_f64(args, 1)) {
                    tstate.move_text_position_and_set_leading(tx, ty);
                }
            }
            "T*" => tstate.move_to_next_line(),
            "Tc" => set_if_some(&mut tstate.char_spacing, get_f64(args, 0)),
            "Tw" => set_if_some(&mut tstate.word_spacing, get_f64(args, 0)),
            "Tz" => set_if_some(&mut tstate.h_scaling, get_f64(args, 0)),
            "TL" => set_if_some(&mut tstate.leading, get_f64(args, 0)),
            "Ts" => set_if_some(&mut tstate.rise, get_f64(args, 0)),

            "Tj" => {
                if let Some(Operand::String(bytes)) = args.first() {
                    let font = font_entry(&mut fonts, doc, resources, &tstate.font_name);
                    show_string(tstate, gstate, handler, font, bytes);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = args.first() {
                    let font = font_entry(&mut fonts, doc, resources, &tstate.font_name);
                    for item in items {
                        match item {
                            Operand::String(bytes) => {
                                show_string(tstate, gstate, handler, font, bytes);
                            }
                            other => {
                                if let Some(adj) = other.as_f64() {
                                    let tx = -(adj / 1000.0)
                                        * tstate.font_size
                                        * tstate.h_scaling_normalized();
                                    tstate.advance_text_position(tx);
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                tstate.move_to_next_line();
                if let Some(Operand::String(bytes)) = args.first() {
                    let font = font_entry(&mut fonts, doc, resources, &tstate.font_name);
                    show_string(tstate, gstate, handler, font, bytes);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac), Some(Operand::String(bytes))) =
                    (get_f64(args, 0), get_f64(args, 1), args.get(2))
                {
                    tstate.word_spacing = aw;
                    tstate.char_spacing = ac;
                    tstate.move_to_next_line();
                    let font = font_entry(&mut fonts, doc, resources, &tstate.font_name);
                    show_string(tstate, gstate, handler, font, bytes);
                }
            }

            "Do" => {
                if let Some(Operand::Name(name)) = args.first() {
                    handle_do(doc, resources, handler, options, depth, gstate, tstate, name)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Font for `name`, loading it on first use. Forms may show text with a
/// font selected by their parent, so lookups also go through here.
fn font_entry<'a>(
    fonts: &'a mut HashMap<String, FontInfo>,
    doc: &lopdf::Document,
    resources: &lopdf::Dictionary,
    name: &str,
) -> &'a FontInfo {
    fonts
        .entry(name.to_string())
        .or_insert_with(|| load_font(doc, resources, name).unwrap_or_else(|| FontInfo::fallback(name)))
}

/// Emit one event per character code, advancing the text matrix by
/// `((w0 / 1000) * Tfs + Tc + Tw) * Th` after each glyph.
fn show_string(
    tstate: &mut TextState,
    gstate: &GraphicsState,
    handler: &mut dyn ContentHandler,
    font: &FontInfo,
    bytes: &[u8],
) {
    let th = tstate.h_scaling_normalized();
    for code in font.char_codes(bytes) {
        let w0 = font.width(code);
        handler.on_char(CharEvent {
            char_code: code,
            unicode: font.unicode(code),
            font_name: font.base_name.clone(),
            font_size: tstate.font_size,
            text_matrix: tstate.text_matrix_array(),
            ctm: gstate.ctm.to_array(),
            displacement: w0,
            char_spacing: tstate.char_spacing,
            word_spacing: tstate.word_spacing,
            h_scaling: th,
            rise: tstate.rise,
            ascent: font.ascent,
            descent: font.descent,
        });
        // Word spacing applies to the single-byte code 32 only.
        let word_spacing = if code == 32 && !font.is_two_byte() {
            tstate.word_spacing
        } else {
            0.0
        };
        let tx = ((w0 / 1000.0) * tstate.font_size + tstate.char_spacing + word_spacing) * th;
        tstate.advance_text_position(tx);
    }
}

fn load_font(doc: &lopdf::Document, resources: &lopdf::Dictionary, name: &str) -> Option<FontInfo> {
    let fonts = resolve_ref(doc, resources.get(b"Font").ok()?).as_dict().ok()?;
    let dict = resolve_ref(doc, fonts.get(name.as_bytes()).ok()?).as_dict().ok()?;
    Some(FontInfo::load(doc, name, dict))
}

#[allow(clippy::too_many_arguments)]
fn handle_do(
    doc: &lopdf::Document,
    resources: &lopdf::Dictionary,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    depth: usize,
    gstate: &mut GraphicsState,
    tstate: &mut TextState,
    name: &str,
) -> Result<(), BackendError> {
    let stream = resources
        .get(b"XObject")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_dict().ok())
        .and_then(|xobjects| xobjects.get(name.as_bytes()).ok())
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_stream().ok());
    let Some(stream) = stream else {
        handler.on_warning(format!("XObject /{name} not found in resources"));
        return Ok(());
    };

    let is_form = stream
        .dict
        .get(b"Subtype")
        .ok()
        .and_then(|o| o.as_name().ok())
        .is_some_and(|n| n == b"Form");
    if !is_form {
        return Ok(());
    }

    let content = decode_stream(stream).map_err(|e| {
        BackendError::Interpreter(format!("failed to decode Form XObject /{name} stream: {e}"))
    })?;
    let form_resources = stream
        .dict
        .get(b"Resources")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_dict().ok())
        .unwrap_or(resources);

    gstate.save(tstate.save_snapshot());
    if let Some(m) = stream
        .dict
        .get(b"Matrix")
        .ok()
        .and_then(|o| o.as_array().ok())
        .and_then(|arr| array_to_matrix(arr))
    {
        gstate.concat(m);
    }

    let result = interpret_content_stream(
        doc,
        &content,
        form_resources,
        handler,
        options,
        depth + 1,
        gstate,
        tstate,
    );

    if let Some(snapshot) = gstate.restore() {
        tstate.restore_snapshot(snapshot);
    }
    result
}

pub(crate) fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, lopdf::Error> {
    if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content()
    } else {
        Ok(stream.content.clone())
    }
}

fn get_f64(operands: &[Operand], index: usize) -> Option<f64> {
    operands.get(index).and_then(Operand::as_f64)
}

fn set_if_some(target: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn matrix_operands(operands: &[Operand]) -> Option<Ctm> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, operand) in m.iter_mut().zip(&operands[operands.len() - 6..]) {
        *slot = operand.as_f64()?;
    }
    Some(Ctm::from_array(&m))
}

fn array_to_matrix(array: &[lopdf::Object]) -> Option<Ctm> {
    if array.len() != 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(array) {
        *slot = object_to_f64(obj).ok()?;
    }
    Some(Ctm::from_array(&m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Object, Stream, dictionary};

    #[derive(Default)]
    struct Collecting {
        chars: Vec<CharEvent>,
        warnings: Vec<String>,
    }

    impl ContentHandler for Collecting {
        fn on_char(&mut self, event: CharEvent) {
            self.chars.push(event);
        }

        fn on_warning(&mut self, message: String) {
            self.warnings.push(message);
        }
    }

    impl Collecting {
        fn text(&self) -> String {
            self.chars
                .iter()
                .filter_map(|c| c.unicode.clone())
                .collect()
        }
    }

    fn doc_with_font() -> (lopdf::Document, lopdf::Dictionary) {
        let mut doc = lopdf::Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(600), Object::Integer(700)],
        });
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        (doc, resources)
    }

    fn run(
        doc: &lopdf::Document,
        resources: &lopdf::Dictionary,
        content: &[u8],
        options: &ExtractOptions,
    ) -> (Collecting, Result<(), BackendError>) {
        let mut handler = Collecting::default();
        let result = interpret_content_stream(
            doc,
            content,
            resources,
            &mut handler,
            options,
            0,
            &mut GraphicsState::new(),
            &mut TextState::new(),
        );
        (handler, result)
    }

    #[test]
    fn tj_emits_chars_with_advancing_positions() {
        let (doc, resources) = doc_with_font();
        let (h, result) = run(
            &doc,
            &resources,
            b"BT /F1 10 Tf 72 700 Td (AB) Tj ET",
            &ExtractOptions::default(),
        );
        result.unwrap();
        assert_eq!(h.text(), "AB");
        assert_eq!(h.chars[0].font_name, "Helvetica");
        assert_eq!(h.chars[0].text_matrix[4], 72.0);
        // A is 600 units wide at 10pt
        assert!((h.chars[1].text_matrix[4] - 78.0).abs() < 1e-9);
        assert_eq!(h.chars[1].displacement, 700.0);
    }

    #[test]
    fn tj_array_adjustments_move_left_for_positive_numbers() {
        let (doc, resources) = doc_with_font();
        let (h, result) = run(
            &doc,
            &resources,
            b"BT /F1 10 Tf 0 0 Td [(A) -1000 (B)] TJ ET",
            &ExtractOptions::default(),
        );
        result.unwrap();
        // 6pt for A, then -(-1000/1000)*10 = +10pt
        assert!((h.chars[1].text_matrix[4] - 16.0).abs() < 1e-9);
    }

    #[test]
    fn quote_operators_move_to_next_line() {
        let (doc, resources) = doc_with_font();
        let (h, result) = run(
            &doc,
            &resources,
            b"BT /F1 10 Tf 14 TL 50 500 Td (A) Tj (B) ' 2 1 (A) \" ET",
            &ExtractOptions::default(),
        );
        result.unwrap();
        assert_eq!(h.chars.len(), 3);
        assert_eq!(h.chars[1].text_matrix[5], 486.0);
        assert_eq!(h.chars[2].text_matrix[5], 472.0);
        assert_eq!(h.chars[2].char_spacing, 1.0);
        assert_eq!(h.chars[2].word_spacing, 2.0);
    }

    #[test]
    fn q_restores_ctm_and_font() {
        let (doc, resources) = doc_with_font();
        let (h, result) = run(
            &doc,
            &resources,
            b"BT /F1 10 Tf ET q 2 0 0 2 0 0 cm BT /F1 20 Tf (A) Tj ET Q BT (B) Tj ET",
            &ExtractOptions::default(),
        );
        result.unwrap();
        assert_eq!(h.chars[0].ctm[0], 2.0);
        assert_eq!(h.chars[0].font_size, 20.0);
        assert_eq!(h.chars[1].ctm[0], 1.0);
        assert_eq!(h.chars[1].font_size, 10.0);
    }

    #[test]
    fn unknown_font_warns_and_still_emits() {
        let (doc, resources) = doc_with_font();
        let (h, result) = run(
            &doc,
            &resources,
            b"BT /F9 12 Tf (x) Tj ET",
            &ExtractOptions::default(),
        );
        result.unwrap();
        assert_eq!(h.text(), "x");
        assert_eq!(h.chars[0].displacement, crate::font::DEFAULT_WIDTH);
        assert_eq!(h.warnings.len(), 1);
    }

    fn doc_with_form(form_content: &[u8]) -> (lopdf::Document, lopdf::Dictionary) {
        let (mut doc, mut resources) = doc_with_font();
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 200.into()],
            },
            form_content.to_vec(),
        );
        let form_id = doc.add_object(form);
        resources.set("XObject", dictionary! { "Fm1" => form_id });
        (doc, resources)
    }

    #[test]
    fn form_xobject_text_uses_parent_resources_and_matrix() {
        let (doc, resources) = doc_with_form(b"BT /F1 10 Tf (A) Tj ET");
        let (h, result) = run(
            &doc,
            &resources,
            b"/Fm1 Do BT /F1 10 Tf (B) Tj ET",
            &ExtractOptions::default(),
        );
        result.unwrap();
        assert_eq!(h.text(), "AB");
        assert_eq!(h.chars[0].ctm[4], 100.0);
        assert_eq!(h.chars[0].ctm[5], 200.0);
        assert_eq!(h.chars[1].ctm[4], 0.0);
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let (doc, resources) = doc_with_form(b"BT /F1 10 Tf (A) Tj ET");
        let options = ExtractOptions {
            max_recursion_depth: 0,
            ..ExtractOptions::default()
        };
        let (_, result) = run(&doc, &resources, b"/Fm1 Do", &options);
        assert!(matches!(result, Err(BackendError::Interpreter(_))));
    }

    #[test]
    fn missing_xobject_is_a_warning() {
        let (doc, resources) = doc_with_font();
        let (h, result) = run(&doc, &resources, b"/Nope Do", &ExtractOptions::default());
        result.unwrap();
        assert_eq!(h.warnings.len(), 1);
    }
}
