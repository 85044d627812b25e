//! The operator table: every content-stream keyword and the callback name
//! receivers know it by.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

macro_rules! operators {
    ($( $(#[$doc:meta])* $variant:ident => [$($kw:literal),*], $name:literal; )*) => {
        /// A content-stream operator, or one of the page and form events
        /// the walker adds around them.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operator {
            $( $(#[$doc])* $variant, )*
        }

        impl Operator {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Every keyword that maps to this operator. Synthetic events
            /// have none.
            pub const fn keywords(self) -> &'static [&'static str] {
                match self {
                    $( Self::$variant => &[$($kw),*], )*
                }
            }

            /// Callback name, e.g. `show_text` for `Tj`.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }
        }
    };
}

operators! {
    CloseFillStroke => ["b"], "close_fill_stroke";
    FillStroke => ["B"], "fill_stroke";
    CloseFillStrokeWithEvenOdd => ["b*"], "close_fill_stroke_with_even_odd";
    FillStrokeWithEvenOdd => ["B*"], "fill_stroke_with_even_odd";
    BeginMarkedContentWithPl => ["BDC"], "begin_marked_content_with_pl";
    /// `BI`, with no operands
    BeginInlineImage => ["BI"], "begin_inline_image";
    BeginMarkedContent => ["BMC"], "begin_marked_content";
    BeginTextObject => ["BT"], "begin_text_object";
    BeginCompatibilitySection => ["BX"], "begin_compatibility_section";
    AppendCurvedSegment => ["c"], "append_curved_segment";
    ConcatenateMatrix => ["cm"], "concatenate_matrix";
    SetStrokeColorSpace => ["CS"], "set_stroke_color_space";
    SetNonstrokeColorSpace => ["cs"], "set_nonstroke_color_space";
    SetLineDash => ["d"], "set_line_dash";
    SetGlyphWidth => ["d0"], "set_glyph_width";
    SetGlyphWidthAndBoundingBox => ["d1"], "set_glyph_width_and_bounding_box";
    InvokeXObject => ["Do"], "invoke_xobject";
    DefineMarkedContentWithPl => ["DP"], "define_marked_content_with_pl";
    /// `EI`; the operand is the raw image data
    EndInlineImage => ["EI"], "end_inline_image";
    EndMarkedContent => ["EMC"], "end_marked_content";
    EndTextObject => ["ET"], "end_text_object";
    EndCompatibilitySection => ["EX"], "end_compatibility_section";
    FillPathWithNonzero => ["f", "F"], "fill_path_with_nonzero";
    FillPathWithEvenOdd => ["f*"], "fill_path_with_even_odd";
    SetGrayForStroking => ["G"], "set_gray_for_stroking";
    SetGrayForNonstroking => ["g"], "set_gray_for_nonstroking";
    SetGraphicsStateParameters => ["gs"], "set_graphics_state_parameters";
    CloseSubpath => ["h"], "close_subpath";
    SetFlatnessTolerance => ["i"], "set_flatness_tolerance";
    /// `ID`; the operand is the image dictionary with long key names
    BeginInlineImageData => ["ID"], "begin_inline_image_data";
    SetLineJoinStyle => ["j"], "set_line_join_style";
    SetLineCapStyle => ["J"], "set_line_cap_style";
    SetCmykColorForStroking => ["K"], "set_cmyk_color_for_stroking";
    SetCmykColorForNonstroking => ["k"], "set_cmyk_color_for_nonstroking";
    AppendLine => ["l"], "append_line";
    BeginNewSubpath => ["m"], "begin_new_subpath";
    SetMiterLimit => ["M"], "set_miter_limit";
    DefineMarkedContentPoint => ["MP"], "define_marked_content_point";
    EndPath => ["n"], "end_path";
    SaveGraphicsState => ["q"], "save_graphics_state";
    RestoreGraphicsState => ["Q"], "restore_graphics_state";
    AppendRectangle => ["re"], "append_rectangle";
    SetRgbColorForStroking => ["RG"], "set_rgb_color_for_stroking";
    SetRgbColorForNonstroking => ["rg"], "set_rgb_color_for_nonstroking";
    SetColorRenderingIntent => ["ri"], "set_color_rendering_intent";
    CloseAndStrokePath => ["s"], "close_and_stroke_path";
    StrokePath => ["S"], "stroke_path";
    SetColorForStroking => ["SC"], "set_color_for_stroking";
    SetColorForNonstroking => ["sc"], "set_color_for_nonstroking";
    SetColorForStrokingAndSpecial => ["SCN"], "set_color_for_stroking_and_special";
    SetColorForNonstrokingAndSpecial => ["scn"], "set_color_for_nonstroking_and_special";
    PaintAreaWithShadingPattern => ["sh"], "paint_area_with_shading_pattern";
    MoveToStartOfNextLine => ["T*"], "move_to_start_of_next_line";
    SetCharacterSpacing => ["Tc"], "set_character_spacing";
    MoveTextPosition => ["Td"], "move_text_position";
    MoveTextPositionAndSetLeading => ["TD"], "move_text_position_and_set_leading";
    SetTextFontAndSize => ["Tf"], "set_text_font_and_size";
    ShowText => ["Tj"], "show_text";
    ShowTextWithPositioning => ["TJ"], "show_text_with_positioning";
    SetTextLeading => ["TL"], "set_text_leading";
    SetTextMatrixAndTextLineMatrix => ["Tm"], "set_text_matrix_and_text_line_matrix";
    SetTextRenderingMode => ["Tr"], "set_text_rendering_mode";
    SetTextRise => ["Ts"], "set_text_rise";
    SetWordSpacing => ["Tw"], "set_word_spacing";
    SetHorizontalTextScaling => ["Tz"], "set_horizontal_text_scaling";
    AppendCurvedSegmentInitialPointReplicated => ["v"], "append_curved_segment_initial_point_replicated";
    SetLineWidth => ["w"], "set_line_width";
    SetClippingPathWithNonzero => ["W"], "set_clipping_path_with_nonzero";
    SetClippingPathWithEvenOdd => ["W*"], "set_clipping_path_with_even_odd";
    AppendCurvedSegmentFinalPointReplicated => ["y"], "append_curved_segment_final_point_replicated";
    MoveToNextLineAndShowText => ["'"], "move_to_next_line_and_show_text";
    SetSpacingNextLineShowText => ["\""], "set_spacing_next_line_show_text";
    /// Before a page's content: `[page number, MediaBox, Rotate]`
    BeginPage => [], "begin_page";
    EndPage => [], "end_page";
    /// Before a form's content: `[label, Matrix]`
    BeginFormXObject => [], "begin_form_xobject";
    EndFormXObject => [], "end_form_xobject";
}

lazy_static! {
    static ref BY_KEYWORD: FxHashMap<&'static str, Operator> = Operator::ALL
        .iter()
        .flat_map(|op| op.keywords().iter().map(move |kw| (*kw, *op)))
        .collect();
}

impl Operator {
    /// Operator for a content-stream keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        BY_KEYWORD.get(keyword).copied()
    }

    /// Keyword as written in a content stream.
    pub fn keyword(self) -> Option<&'static str> {
        self.keywords().first().copied()
    }

    /// True for the events the walker adds, which never appear in content.
    pub fn is_synthetic(self) -> bool {
        self.keyword().is_none()
    }

    /// Operator for a callback name such as `show_text`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_names_line_up() {
        assert_eq!(Operator::from_keyword("Tj"), Some(Operator::ShowText));
        assert_eq!(Operator::ShowText.name(), "show_text");
        assert_eq!(Operator::from_keyword("F"), Some(Operator::FillPathWithNonzero));
        assert_eq!(Operator::FillPathWithNonzero.keyword(), Some("f"));
        assert_eq!(Operator::from_keyword("\""), Some(Operator::SetSpacingNextLineShowText));
        assert_eq!(Operator::from_keyword("Tx"), None);
    }

    #[test]
    fn every_keyword_round_trips() {
        for op in Operator::ALL {
            if let Some(kw) = op.keyword() {
                assert_eq!(Operator::from_keyword(kw), Some(*op), "{kw}");
            }
            assert_eq!(Operator::from_name(op.name()), Some(*op));
        }
        assert!(Operator::BeginPage.is_synthetic());
        assert_eq!(Operator::ALL.iter().filter(|op| op.is_synthetic()).count(), 4);
    }
}
