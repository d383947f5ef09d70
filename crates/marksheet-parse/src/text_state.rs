//! Text state for the content stream interpreter.
//!
//! Tracks the spacing parameters set by `Tc Tw Tz TL Ts Tf` and the text and
//! line matrices moved by `BT Tm Td TD T*` and by shown glyphs.

use marksheet_core::Ctm;

/// Text parameters that belong to the graphics state and are saved by `q`.
///
/// The text and line matrices are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStateSnapshot {
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub h_scaling: f64,
    pub leading: f64,
    pub font_name: String,
    pub font_size: f64,
    pub rise: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Extra space after every glyph (`Tc`).
    pub char_spacing: f64,
    /// Extra space after single-byte code 32 (`Tw`).
    pub word_spacing: f64,
    /// Horizontal scaling in percent (`Tz`), 100 = normal.
    pub h_scaling: f64,
    /// Baseline distance used by `T*`, `'` and `"`.
    pub leading: f64,
    /// Font resource name selected by `Tf`.
    pub font_name: String,
    pub font_size: f64,
    /// Baseline shift (`Ts`).
    pub rise: f64,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            rise: 0.0,
            text_matrix: Ctm::identity(),
            line_matrix: Ctm::identity(),
        }
    }
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn text_matrix_array(&self) -> [f64; 6] {
        self.text_matrix.to_array()
    }

    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn h_scaling_normalized(&self) -> f64 {
        self.h_scaling / 100.0
    }

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
    }

    /// `Tm`: replace both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: translate the line matrix and start a new line there.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty);
        self.line_matrix = translation.concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: like `Td`, also setting leading to `-ty`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`
    pub fn move_to_next_line(&mut self) {
        let leading = self.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Move the text matrix right by `tx` text space units.
    pub fn advance_text_position(&mut self, tx: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0);
        self.text_matrix = translation.concat(&self.text_matrix);
    }

    pub fn save_snapshot(&self) -> TextStateSnapshot {
        TextStateSnapshot {
            char_spacing: self.char_spacing,
            word_spacing: self.word_spacing,
            h_scaling: self.h_scaling,
            leading: self.leading,
            font_name: self.font_name.clone(),
            font_size: self.font_size,
            rise: self.rise,
        }
    }

    pub fn restore_snapshot(&mut self, snapshot: TextStateSnapshot) {
        self.char_spacing = snapshot.char_spacing;
        self.word_spacing = snapshot.word_spacing;
        self.h_scaling = snapshot.h_scaling;
        self.leading = snapshot.leading;
        self.font_name = snapshot.font_name;
        self.font_size = snapshot.font_size;
        self.rise = snapshot.rise;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn td_accumulates_from_line_start() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(72.0, 720.0);
        ts.advance_text_position(30.0);
        ts.move_text_position(0.0, -14.0);
        let m = ts.text_matrix();
        assert_approx(m.e, 72.0);
        assert_approx(m.f, 706.0);
    }

    #[test]
    fn td_uppercase_sets_leading_for_t_star() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_text_matrix(Ctm::new(1.0, 0.0, 0.0, 1.0, 50.0, 500.0));
        ts.move_text_position_and_set_leading(0.0, -12.0);
        assert_approx(ts.leading, 12.0);
        ts.move_to_next_line();
        assert_approx(ts.text_matrix().f, 476.0);
        assert_approx(ts.text_matrix().e, 50.0);
    }

    #[test]
    fn advance_respects_scaled_matrix() {
        let mut ts = TextState::new();
        ts.set_text_matrix(Ctm::new(2.0, 0.0, 0.0, 2.0, 10.0, 10.0));
        ts.advance_text_position(5.0);
        assert_approx(ts.text_matrix().e, 20.0);
    }

    #[test]
    fn begin_text_resets_matrices() {
        let mut ts = TextState::new();
        ts.set_text_matrix(Ctm::new(1.0, 0.0, 0.0, 1.0, 99.0, 99.0));
        ts.begin_text();
        assert_eq!(*ts.text_matrix(), Ctm::identity());
    }

    #[test]
    fn snapshot_restores_parameters_but_not_matrix() {
        let mut ts = TextState::new();
        ts.font_name = "F1".to_string();
        ts.font_size = 12.0;
        ts.char_spacing = 1.0;
        let snap = ts.save_snapshot();

        ts.font_name = "F2".to_string();
        ts.font_size = 8.0;
        ts.char_spacing = 3.0;
        ts.set_text_matrix(Ctm::new(1.0, 0.0, 0.0, 1.0, 40.0, 40.0));
        ts.restore_snapshot(snap);

        assert_eq!(ts.font_name, "F1");
        assert_approx(ts.font_size, 12.0);
        assert_approx(ts.char_spacing, 1.0);
        assert_approx(ts.text_matrix().e, 40.0);
    }

    #[test]
    fn h_scaling_fraction() {
        let mut ts = TextState::new();
        assert_approx(ts.h_scaling_normalized(), 1.0);
        ts.h_scaling = 50.0;
        assert_approx(ts.h_scaling_normalized(), 0.5);
    }
}
