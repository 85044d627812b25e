//! Graphics and text state carried through a content stream.

use super::geometry::{MATRIX_IDENTITY, Matrix, Point, apply_matrix_pt, mult_matrix};
use crate::font::Font;
use smol_str::SmolStr;
use std::sync::Arc;

/// Text state parameters (PDF 1.7, section 9.3).
///
/// These survive `BT`/`ET` and are saved and restored by `q`/`Q` along
/// with the rest of the graphics state.
#[derive(Debug, Clone)]
pub struct TextState {
    /// `Tc`
    pub char_spacing: f64,
    /// `Tw`, applied to glyphs that decode to a single space
    pub word_spacing: f64,
    /// `Tz` as a fraction, so 100% is 1.0
    pub horizontal_scaling: f64,
    /// `TL`
    pub leading: f64,
    /// Resource name given to `Tf`
    pub font_name: Option<SmolStr>,
    /// Font resolved from `font_name`; `None` when the resource is missing
    pub font: Option<Arc<Font>>,
    /// Size operand of `Tf`, in unscaled text space units
    pub font_size: f64,
    /// `Tr`
    pub render_mode: i64,
    /// `Ts`
    pub rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            font_name: None,
            font: None,
            font_size: 0.0,
            render_mode: 0,
            rise: 0.0,
        }
    }
}

/// One entry of the `q`/`Q` stack.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub ctm: Matrix,
    pub text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: MATRIX_IDENTITY,
            text: TextState::default(),
        }
    }
}

/// Text and line matrices. Reset by every `BT`; not part of the saved state.
#[derive(Debug, Clone, Copy)]
pub struct TextObject {
    pub text_matrix: Matrix,
    pub line_matrix: Matrix,
}

impl Default for TextObject {
    fn default() -> Self {
        Self {
            text_matrix: MATRIX_IDENTITY,
            line_matrix: MATRIX_IDENTITY,
        }
    }
}

impl GraphicsState {
    /// Text rendering matrix: `[Tfs*Th 0 0 Tfs 0 Trise] x Tm x CTM`.
    pub fn text_rendering_matrix(&self, tm: Matrix) -> Matrix {
        let t = &self.text;
        let params = (
            t.font_size * t.horizontal_scaling,
            0.0,
            0.0,
            t.font_size,
            0.0,
            t.rise,
        );
        mult_matrix(mult_matrix(params, tm), self.ctm)
    }

    /// Maps a point in glyph space through the text rendering matrix.
    pub fn trm_transform(&self, tm: Matrix, p: Point) -> Point {
        apply_matrix_pt(self.text_rendering_matrix(tm), p)
    }

    /// Rendered font size: the vertical extent of a unit square after the
    /// text rendering matrix is applied.
    pub fn rendered_font_size(&self, tm: Matrix) -> f64 {
        let trm = self.text_rendering_matrix(tm);
        let (_, zero) = apply_matrix_pt(trm, (0.0, 0.0));
        let (_, one) = apply_matrix_pt(trm, (1.0, 1.0));
        (zero - one).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_matrix_combines_size_rise_and_ctm() {
        let mut gs = GraphicsState::default();
        gs.ctm = (2.0, 0.0, 0.0, 2.0, 10.0, 20.0);
        gs.text.font_size = 12.0;
        gs.text.rise = 3.0;
        let tm = (1.0, 0.0, 0.0, 1.0, 100.0, 200.0);
        assert_eq!(gs.trm_transform(tm, (0.0, 0.0)), (210.0, 426.0));
        assert_eq!(gs.rendered_font_size(tm), 24.0);
    }

    #[test]
    fn scaling_stretches_x_only() {
        let mut gs = GraphicsState::default();
        gs.text.font_size = 10.0;
        gs.text.horizontal_scaling = 0.5;
        assert_eq!(gs.trm_transform(MATRIX_IDENTITY, (1.0, 1.0)), (5.0, 10.0));
        assert_eq!(gs.rendered_font_size(MATRIX_IDENTITY), 10.0);
    }
}
