use super::cmap::ToUnicodeCMap;
use super::descriptor::FontDescriptor;
use super::encoding::{Encoding, UNKNOWN_CHAR};
use super::metrics::builtin_metrics;
use super::width::{CidWidths, SimpleWidths, WidthCalculator};
use crate::document::xref::ObjectTable;
use crate::error::Result;
use crate::model::geometry::{Matrix, apply_matrix_pt, matrix_from_object};
use crate::model::objects::{PDFDict, PDFObject};
use smol_str::SmolStr;
use tracing::debug;

const TYPE3_FONT_MATRIX: Matrix = (0.001, 0.0, 0.0, 0.001, 0.0, 0.0);

/// A font resource, reduced to what text extraction needs: how to split
/// strings into codes, what each code says and how wide it is.
#[derive(Debug, Clone)]
pub struct Font {
    pub subtype: Option<SmolStr>,
    pub basefont: Option<SmolStr>,
    pub encoding: Encoding,
    pub tounicode: Option<ToUnicodeCMap>,
    pub descriptor: Option<FontDescriptor>,
    pub descendants: Vec<Font>,
    /// Type3 only
    pub font_matrix: Option<Matrix>,
    widths: WidthCalculator,
}

impl Font {
    /// Builds a font from its (direct) font dictionary.
    pub fn new(objects: &ObjectTable, dict: &PDFDict) -> Result<Self> {
        Self::build(objects, dict, 0)
    }

    fn build(objects: &ObjectTable, dict: &PDFDict, depth: usize) -> Result<Self> {
        let get = |key: &str| -> Result<Option<PDFObject>> {
            dict.get(key)
                .map(|v| objects.dereference_recursive(v))
                .transpose()
                .map(|v| v.filter(|v| !v.is_null()))
        };
        let name_of = |key: &str| -> Result<Option<SmolStr>> {
            Ok(get(key)?.and_then(|v| v.as_name().ok().map(SmolStr::from)))
        };

        let subtype = name_of("Subtype")?;
        let basefont = name_of("BaseFont")?;
        let encoding = Encoding::from_object(get("Encoding")?.as_ref(), basefont.as_deref())?;

        let tounicode = match get("ToUnicode")? {
            Some(PDFObject::Stream(stream)) => Some(ToUnicodeCMap::parse(stream.data()?)?),
            // `/ToUnicode /Identity-H` and similar names carry no mapping.
            _ => None,
        };

        let descriptor = match get("FontDescriptor")? {
            Some(PDFObject::Dict(fd)) => Some(FontDescriptor::new(objects, &fd)?),
            _ => None,
        };

        let descendants = match get("DescendantFonts")? {
            Some(PDFObject::Array(items)) if depth == 0 => items
                .iter()
                .filter_map(|item| item.as_dict().ok())
                .map(|d| Self::build(objects, d, depth + 1))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        let font_matrix = if subtype.as_deref() == Some("Type3") {
            Some(
                get("FontMatrix")?
                    .as_ref()
                    .and_then(matrix_from_object)
                    .unwrap_or(TYPE3_FONT_MATRIX),
            )
        } else {
            None
        };

        let simple_widths = || -> Result<SimpleWidths> {
            let widths = match get("Widths")? {
                Some(PDFObject::Array(items)) => {
                    items.iter().map(|w| w.as_num().unwrap_or(0.0)).collect()
                }
                _ => Vec::new(),
            };
            Ok(SimpleWidths {
                first_char: get("FirstChar")?.and_then(|v| v.as_int().ok()),
                widths,
                missing_width: descriptor.as_ref().map_or(0.0, |d| d.missing_width),
            })
        };

        let widths = match subtype.as_deref() {
            Some("Type0") => WidthCalculator::TypeZero,
            Some("Type1" | "MMType1") if descriptor.is_none() => {
                WidthCalculator::BuiltIn(builtin_metrics(basefont.as_deref()))
            }
            Some("TrueType") if descriptor.is_none() => {
                WidthCalculator::BuiltIn(builtin_metrics(basefont.as_deref()))
            }
            Some("TrueType") => WidthCalculator::TrueType(simple_widths()?),
            Some("CIDFontType0" | "CIDFontType2") => {
                let default = get("DW")?.and_then(|v| v.as_num().ok()).unwrap_or(1000.0);
                let w = match get("W")? {
                    Some(PDFObject::Array(items)) => items,
                    _ => Vec::new(),
                };
                WidthCalculator::Composite(CidWidths::new(default, &w))
            }
            _ => WidthCalculator::TypeOneOrThree(simple_widths()?),
        };

        debug!(?subtype, ?basefont, "loaded font");
        Ok(Self {
            subtype,
            basefont,
            encoding,
            tounicode,
            descriptor,
            descendants,
            font_matrix,
            widths,
        })
    }

    /// Splits a shown string into character codes.
    pub fn unpack(&self, bytes: &[u8]) -> Vec<u32> {
        if let Encoding::Predefined(_) = self.encoding {
            if let Some(codes) = self.tounicode.as_ref().and_then(|t| t.split_codes(bytes)) {
                return codes;
            }
        }
        self.encoding.unpack(bytes)
    }

    /// Text for one character code.
    ///
    /// `/ToUnicode` wins when present; codes it does not cover show as
    /// U+25AF. Without it the encoding decides.
    pub fn to_utf8(&self, code: u32) -> Result<String> {
        match &self.tounicode {
            Some(cmap) => Ok(cmap
                .lookup(code)
                .unwrap_or_else(|| UNKNOWN_CHAR.to_string())),
            None => self.encoding.to_unicode(code),
        }
    }

    /// Text for a whole shown string.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.unpack(bytes)
            .into_iter()
            .map(|code| self.to_utf8(code))
            .collect()
    }

    /// Width of a code in glyph space.
    pub fn glyph_width(&self, code: u32) -> f64 {
        self.widths.glyph_width(self, code)
    }

    /// Width of a code in unscaled text space (before font size).
    pub fn glyph_width_in_text_space(&self, code: u32) -> f64 {
        let w = self.glyph_width(code);
        match self.font_matrix {
            Some(m) => {
                let (x1, _) = apply_matrix_pt(m, (0.0, 0.0));
                let (x2, _) = apply_matrix_pt(m, (w, 0.0));
                ((x2 - x1).abs() * 100.0).round() / 100.0
            }
            None => w / 1000.0,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.encoding.is_vertical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testutil::{stream, table};
    use crate::font::FontCache;
    use crate::font::truetype::tests::tiny_font;
    use crate::model::objects::PDFObjRef;
    use std::sync::Arc;

    fn font_at(objects: &ObjectTable, id: u32) -> Font {
        let dict = objects
            .resolve_dict(&PDFObject::Ref(PDFObjRef::new(id, 0)))
            .unwrap();
        Font::new(objects, &dict).unwrap()
    }

    #[test]
    fn standard_font_without_widths_uses_builtin_metrics() {
        let objects = table(&[
            "<< /Type /Catalog >>",
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        ]);
        let font = font_at(&objects, 2);
        assert_eq!(font.glyph_width(u32::from(b'A')), 667.0);
        assert_eq!(font.glyph_width_in_text_space(u32::from(b' ')), 0.278);
        assert_eq!(font.decode(b"caf\xe9").unwrap(), "caf\u{e9}");
    }

    #[test]
    fn type3_widths_go_through_the_font_matrix() {
        let objects = table(&[
            "<< /Type /Catalog >>",
            "<< /Type /Font /Subtype /Type3 /FontMatrix [0.01 0 0 0.01 0 0] /FirstChar 65 /Widths [50] >>",
        ]);
        let font = font_at(&objects, 2);
        assert_eq!(font.glyph_width(65), 50.0);
        assert_eq!(font.glyph_width_in_text_space(65), 0.5);
        // no descriptor, so no /MissingWidth
        assert_eq!(font.glyph_width(66), 0.0);
    }

    #[test]
    fn truetype_falls_back_to_program_metrics() {
        let program = stream("/Filter /ASCIIHexDecode", &format!("{}>", hex::encode(tiny_font())));
        let objects = table(&[
            "<< /Type /Catalog >>",
            "<< /Type /Font /Subtype /TrueType /BaseFont /Tiny /FirstChar 70 /Widths [500] /FontDescriptor 3 0 R >>",
            "<< /Type /FontDescriptor /FontName /Tiny /Flags 32 /MissingWidth 250 /FontFile2 4 0 R >>",
            &program,
        ]);
        let font = font_at(&objects, 2);
        assert_eq!(font.glyph_width(70), 500.0);
        assert_eq!(font.glyph_width(65), 667.0);
        assert_eq!(font.glyph_width(67), 250.0);
        let descriptor = font.descriptor.as_ref().unwrap();
        assert_eq!(descriptor.font_name, "Tiny");
        assert_eq!(descriptor.font_weight, 400.0);
    }

    #[test]
    fn composite_font_reads_cids_and_tounicode() {
        let cmap = stream(
            "",
            "/CIDInit /ProcSet findresource begin 12 dict begin begincmap\n\
             1 begincodespacerange <0000> <FFFF> endcodespacerange\n\
             2 beginbfchar <0001> <0048> <0002> <0069> endbfchar\n\
             endcmap end end",
        );
        let objects = table(&[
            "<< /Type /Catalog >>",
            "<< /Type /Font /Subtype /Type0 /BaseFont /Comp /Encoding /Identity-H /DescendantFonts [3 0 R] /ToUnicode 4 0 R >>",
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /Comp /DW 500 /W [1 [600 700]] >>",
            &cmap,
        ]);
        let font = font_at(&objects, 2);
        assert_eq!(font.unpack(b"\x00\x01\x00\x02\x00\x03"), vec![1, 2, 3]);
        assert_eq!(font.decode(b"\x00\x01\x00\x02\x00\x03").unwrap(), "Hi\u{25af}");
        assert_eq!(font.glyph_width(1), 600.0);
        assert_eq!(font.glyph_width(2), 700.0);
        assert_eq!(font.glyph_width(3), 500.0);
        assert!(!font.is_vertical());
    }

    #[test]
    fn cache_builds_indirect_fonts_once() {
        let objects = table(&[
            "<< /Type /Catalog >>",
            "<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>",
        ]);
        let cache = FontCache::default();
        let entry = PDFObject::Ref(PDFObjRef::new(2, 0));
        let first = cache.load(&objects, &entry).unwrap();
        let second = cache.load(&objects, &entry).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.glyph_width(u32::from(b'i')), 600.0);
    }
}
