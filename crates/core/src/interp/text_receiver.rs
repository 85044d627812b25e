//! Text extraction receiver.
//!
//! Tracks the graphics and text state through a page and records a
//! [`TextRun`] for every glyph shown:
//!
//! - `q`/`Q`/`cm`: graphics state stack and CTM
//! - `BT`, `Td`, `TD`, `Tm`, `T*`: text and line matrices
//! - `Tc`, `Tw`, `Tz`, `TL`, `Tf`, `Tr`, `Ts`: text state
//! - `Tj`, `TJ`, `'`, `"`: glyph placement and advance

use super::operator::Operator;
use super::receiver::Receiver;
use super::walker::Scope;
use crate::error::{PdfError, Result};
use crate::font::Font;
use crate::layout::TextRun;
use crate::model::geometry::{
    MATRIX_IDENTITY, Matrix, matrix_from_object, mult_matrix, normalize_rotation, rotate_point,
    translate_matrix,
};
use crate::model::objects::PDFObject;
use crate::model::state::{GraphicsState, TextObject};
use std::sync::Arc;
use tracing::{debug, warn};

/// Collects positioned glyphs while a page is walked.
#[derive(Debug, Default)]
pub struct PageTextReceiver {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text: TextObject,
    rotation: i64,
    runs: Vec<TextRun>,
}

impl PageTextReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// One run per glyph, in drawing order, in rotated page space.
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<TextRun> {
        self.runs
    }

    /// Clockwise page rotation taken from `BeginPage`.
    pub const fn rotation(&self) -> i64 {
        self.rotation
    }
}

impl Receiver for PageTextReceiver {
    fn supports(&self, op: Operator) -> bool {
        use Operator::*;
        matches!(
            op,
            BeginPage
                | BeginFormXObject
                | EndFormXObject
                | SaveGraphicsState
                | RestoreGraphicsState
                | ConcatenateMatrix
                | BeginTextObject
                | SetCharacterSpacing
                | SetWordSpacing
                | SetHorizontalTextScaling
                | SetTextLeading
                | SetTextFontAndSize
                | SetTextRenderingMode
                | SetTextRise
                | MoveTextPosition
                | MoveTextPositionAndSetLeading
                | SetTextMatrixAndTextLineMatrix
                | MoveToStartOfNextLine
                | ShowText
                | ShowTextWithPositioning
                | MoveToNextLineAndShowText
                | SetSpacingNextLineShowText
        )
    }

    fn handle(&mut self, scope: &Scope<'_>, op: Operator, operands: &[PDFObject]) -> Result<()> {
        use Operator::*;
        let args = Args { op, operands };
        match op {
            BeginPage => self.begin_page(operands),
            BeginFormXObject => {
                let matrix = operands.get(1).and_then(matrix_from_object).unwrap_or(MATRIX_IDENTITY);
                self.do_q();
                self.do_cm(matrix);
            }
            EndFormXObject => self.do_Q(),
            SaveGraphicsState => self.do_q(),
            RestoreGraphicsState => self.do_Q(),
            ConcatenateMatrix => self.do_cm(args.matrix()?),
            BeginTextObject => self.do_BT(),
            SetCharacterSpacing => self.state.text.char_spacing = args.num(0)?,
            SetWordSpacing => self.state.text.word_spacing = args.num(0)?,
            SetHorizontalTextScaling => self.state.text.horizontal_scaling = args.num(0)? / 100.0,
            SetTextLeading => self.state.text.leading = args.num(0)?,
            SetTextFontAndSize => self.do_Tf(scope, args.name(0)?, args.num(1)?)?,
            SetTextRenderingMode => self.state.text.render_mode = args.int(0)?,
            SetTextRise => self.state.text.rise = args.num(0)?,
            MoveTextPosition => self.do_Td(args.num(0)?, args.num(1)?),
            MoveTextPositionAndSetLeading => self.do_TD(args.num(0)?, args.num(1)?),
            SetTextMatrixAndTextLineMatrix => self.do_Tm(args.matrix()?),
            MoveToStartOfNextLine => self.do_T_star(),
            ShowText => self.do_Tj(args.string(0)?)?,
            ShowTextWithPositioning => self.do_TJ(args.array(0)?)?,
            MoveToNextLineAndShowText => self.do_quote(args.string(0)?)?,
            SetSpacingNextLineShowText => {
                self.do_doublequote(args.num(0)?, args.num(1)?, args.string(2)?)?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[allow(non_snake_case)]
impl PageTextReceiver {
    /// Operands are `[page number, MediaBox, Rotate]`.
    fn begin_page(&mut self, operands: &[PDFObject]) {
        self.state = GraphicsState::default();
        self.stack.clear();
        self.text = TextObject::default();
        self.rotation = operands
            .get(2)
            .and_then(|r| r.as_int().ok())
            .map_or(0, normalize_rotation);
    }

    /// q - Push a copy of the graphics state.
    fn do_q(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Q - Pop the graphics state. An unbalanced Q keeps the current state.
    fn do_Q(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => debug!("Q with an empty graphics state stack"),
        }
    }

    /// cm - Prepend `m` to the CTM.
    fn do_cm(&mut self, m: Matrix) {
        self.state.ctm = mult_matrix(m, self.state.ctm);
    }

    /// BT - Reset the text and line matrices.
    fn do_BT(&mut self) {
        self.text = TextObject::default();
    }

    /// Tf - Select a font resource. A label missing from the resources
    /// leaves the state without a font and the text it shows is skipped.
    fn do_Tf(&mut self, scope: &Scope<'_>, label: &str, size: f64) -> Result<()> {
        let font = scope.font(label)?;
        if font.is_none() {
            warn!(label, "font is not in the page resources");
        }
        self.state.text.font_name = Some(label.into());
        self.state.text.font = font;
        self.state.text.font_size = size;
        Ok(())
    }

    /// Td - Start a new line offset from the current one.
    fn do_Td(&mut self, tx: f64, ty: f64) {
        let lm = translate_matrix(self.text.line_matrix, (tx, ty));
        self.text.line_matrix = lm;
        self.text.text_matrix = lm;
    }

    /// TD - Td that also sets the leading to `-ty`.
    fn do_TD(&mut self, tx: f64, ty: f64) {
        self.state.text.leading = -ty;
        self.do_Td(tx, ty);
    }

    /// Tm - Replace both text matrices.
    fn do_Tm(&mut self, m: Matrix) {
        self.text.text_matrix = m;
        self.text.line_matrix = m;
    }

    /// T* - Next line using the leading.
    fn do_T_star(&mut self) {
        let leading = self.state.text.leading;
        self.do_Td(0.0, -leading);
    }

    fn do_Tj(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(font) = self.current_font()? else {
            return Ok(());
        };
        for code in font.unpack(bytes) {
            let text = font.to_utf8(code)?;
            let w0 = font.glyph_width_in_text_space(code);
            self.place_glyph(&text, w0);
            self.advance(w0, 0.0, text == " ");
        }
        Ok(())
    }

    /// TJ - Strings are shown; numbers move the pen back by thousandths of
    /// a text space unit.
    fn do_TJ(&mut self, items: &[PDFObject]) -> Result<()> {
        for item in items {
            match item {
                PDFObject::String(bytes) => self.do_Tj(bytes)?,
                PDFObject::Int(_) | PDFObject::Real(_) => {
                    let adjust = item.as_num()?;
                    self.advance(0.0, adjust, false);
                }
                other => debug!(kind = other.type_name(), "ignoring TJ element"),
            }
        }
        Ok(())
    }

    /// ' - T* then Tj.
    fn do_quote(&mut self, bytes: &[u8]) -> Result<()> {
        self.do_T_star();
        self.do_Tj(bytes)
    }

    /// " - Set word and character spacing, then '.
    fn do_doublequote(&mut self, aw: f64, ac: f64, bytes: &[u8]) -> Result<()> {
        self.state.text.word_spacing = aw;
        self.state.text.char_spacing = ac;
        self.do_quote(bytes)
    }

    /// The font to show text with. Text shown before any `Tf` is an error;
    /// after a `Tf` naming a missing font it is silently dropped.
    fn current_font(&self) -> Result<Option<Arc<Font>>> {
        match (&self.state.text.font, &self.state.text.font_name) {
            (Some(font), _) => Ok(Some(Arc::clone(font))),
            (None, Some(_)) => Ok(None),
            (None, None) => Err(PdfError::malformed("text shown before a font was selected")),
        }
    }

    fn place_glyph(&mut self, text: &str, w0: f64) {
        if text == " " {
            return;
        }
        let tm = self.text.text_matrix;
        let origin = self.state.trm_transform(tm, (0.0, 0.0));
        let (x, y) = rotate_point(self.rotation, origin);
        let font_size = self.state.rendered_font_size(tm);
        self.runs.push(TextRun::new(x, y, w0 * font_size, font_size, text));
    }

    /// Moves the text matrix past a glyph of width `w0`, or by a TJ
    /// adjustment `tj` when that is non-zero.
    fn advance(&mut self, w0: f64, tj: f64, is_space: bool) {
        let t = &self.state.text;
        let tx = if tj != 0.0 {
            (w0 - tj / 1000.0) * t.font_size * t.horizontal_scaling
        } else {
            let tw = if is_space { t.word_spacing } else { 0.0 };
            (w0 * t.font_size + t.char_spacing + tw) * t.horizontal_scaling
        };
        self.text.text_matrix = translate_matrix(self.text.text_matrix, (tx, 0.0));
    }
}

/// Typed access to an operator's operands.
struct Args<'a> {
    op: Operator,
    operands: &'a [PDFObject],
}

impl<'a> Args<'a> {
    fn get(&self, i: usize) -> Result<&'a PDFObject> {
        self.operands.get(i).ok_or_else(|| {
            PdfError::malformed(format!("{} is missing operand {}", self.op, i + 1))
        })
    }

    fn wrong(&self, i: usize, err: PdfError) -> PdfError {
        PdfError::malformed(format!("{} operand {}: {err}", self.op, i + 1))
    }

    fn num(&self, i: usize) -> Result<f64> {
        self.get(i)?.as_num().map_err(|e| self.wrong(i, e))
    }

    fn int(&self, i: usize) -> Result<i64> {
        self.get(i)?.as_int().map_err(|e| self.wrong(i, e))
    }

    fn name(&self, i: usize) -> Result<&'a str> {
        self.get(i)?.as_name().map_err(|e| self.wrong(i, e))
    }

    fn string(&self, i: usize) -> Result<&'a [u8]> {
        self.get(i)?.as_string().map_err(|e| self.wrong(i, e))
    }

    fn array(&self, i: usize) -> Result<&'a [PDFObject]> {
        self.get(i)?.as_array().map(Vec::as_slice).map_err(|e| self.wrong(i, e))
    }

    fn matrix(&self) -> Result<Matrix> {
        let mut n = [0.0; 6];
        for (i, slot) in n.iter_mut().enumerate() {
            *slot = self.num(i)?;
        }
        Ok((n[0], n[1], n[2], n[3], n[4], n[5]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testutil::{stream, table};
    use crate::document::xref::ObjectTable;
    use crate::font::FontCache;
    use crate::interp::walker::{ContentCache, Walker};
    use crate::model::objects::PDFObjRef;

    const HELVETICA: &str = "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>";

    /// Catalog, Helvetica as 2 0 R, the page resources as 3 0 R and then
    /// `extra` from 4 0 R on.
    fn page_objects(resources: &str, extra: &[&str]) -> ObjectTable {
        let mut objects = vec!["<< /Type /Catalog >>", HELVETICA, resources];
        objects.extend_from_slice(extra);
        table(&objects)
    }

    fn extract_from(objects: &ObjectTable, content: &str, rotate: i64) -> Result<Vec<TextRun>> {
        let fonts = FontCache::default();
        let contents = ContentCache::default();
        let resources = objects.resolve_dict(&PDFObject::Ref(PDFObjRef::new(3, 0)))?;
        let info = [PDFObject::Int(1), PDFObject::Null, PDFObject::Int(rotate)];
        let mut receiver = PageTextReceiver::new();
        Walker::new(objects, &fonts, &contents).walk_page(content.as_bytes(), resources, &info, &mut [&mut receiver])?;
        assert_eq!(receiver.rotation(), normalize_rotation(rotate));
        Ok(receiver.into_runs())
    }

    fn extract(content: &str) -> Result<Vec<TextRun>> {
        extract_from(&page_objects("<< /Font << /F1 2 0 R >> >>", &[]), content, 0)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn glyphs_advance_by_their_width() {
        let runs = extract("BT /F1 12 Tf 72 700 Td (Hi) Tj ET").unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].x, runs[0].y), (72.0, 700.0));
        assert!(close(runs[0].width, 8.664));
        assert_eq!(runs[0].font_size, 12.0);
        assert!(close(runs[1].x, 72.0 + 8.664));
        assert_eq!(runs[1].text, "i");
    }

    #[test]
    fn spaces_move_the_pen_but_are_not_recorded() {
        let runs = extract("BT /F1 10 Tf 5 Tw (a b) Tj ET").unwrap();
        let text: Vec<_> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, ["a", "b"]);
        assert!(close(runs[1].x, 5.56 + 2.78 + 5.0));
    }

    #[test]
    fn tj_numbers_pull_glyphs_closer() {
        let runs = extract("BT /F1 10 Tf [(A) -1000 (B)] TJ ET").unwrap();
        assert!(close(runs[1].x, 6.67 + 10.0));
        let squeezed = extract("BT /F1 10 Tf 50 Tz [(A) (B)] TJ ET").unwrap();
        assert!(close(squeezed[1].x, 3.335));
    }

    #[test]
    fn leading_drives_next_line_operators() {
        let runs = extract("BT /F1 10 Tf 0 100 Td 14 TL (a) Tj T* (b) Tj 0 -20 TD (c) Tj (d) ' ET").unwrap();
        let ys: Vec<_> = runs.iter().map(|r| r.y).collect();
        assert_eq!(ys, [100.0, 86.0, 66.0, 46.0]);
    }

    #[test]
    fn graphics_state_is_scoped() {
        let runs = extract("q 2 0 0 2 50 50 cm BT /F1 10 Tf (a) Tj ET Q BT /F1 10 Tf (b) Tj ET Q").unwrap();
        assert_eq!((runs[0].x, runs[0].y, runs[0].font_size), (50.0, 50.0, 20.0));
        assert_eq!((runs[1].x, runs[1].y, runs[1].font_size), (0.0, 0.0, 10.0));
    }

    #[test]
    fn form_matrix_moves_its_text() {
        let form = stream("/Subtype /Form /Matrix [1 0 0 1 100 0]", "BT /F1 10 Tf (a) Tj ET");
        let objects = page_objects("<< /Font << /F1 2 0 R >> /XObject << /Fm1 4 0 R >> >>", &[&form]);
        let runs = extract_from(&objects, "/Fm1 Do BT /F1 10 Tf (b) Tj ET", 0).unwrap();
        assert_eq!((runs[0].text.as_str(), runs[0].x), ("a", 100.0));
        assert_eq!((runs[1].text.as_str(), runs[1].x), ("b", 0.0));
    }

    #[test]
    fn rotated_pages_turn_their_runs() {
        let objects = page_objects("<< /Font << /F1 2 0 R >> >>", &[]);
        let runs = extract_from(&objects, "BT /F1 12 Tf 72 700 Td (H) Tj ET", -270).unwrap();
        assert_eq!((runs[0].x, runs[0].y), (700.0, -72.0));
    }

    #[test]
    fn text_needs_a_font() {
        assert!(extract("BT (x) Tj ET").unwrap_err().is_malformed());
        assert!(extract("BT /F9 10 Tf (x) Tj ET").unwrap().is_empty());
        assert!(extract("BT /F1 Tf ET").unwrap_err().is_malformed());
    }
}
