//! Font encodings: how string bytes split into character codes and what
//! text each code stands for when there is no `/ToUnicode` map.

use super::cmap::ToUnicodeCMap;
use super::glyphs::name_to_unicode;
use super::latin::{MAC_ROMAN, NameTable, STANDARD, WIN_ANSI};
use super::symbol::{symbol_to_unicode, zapf_dingbats_to_unicode};
use crate::document::text_string::PDF_DOC_ENCODING;
use crate::error::{PdfError, Result};
use crate::model::objects::PDFObject;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Placeholder for codes with no known text: a white vertical rectangle.
pub const UNKNOWN_CHAR: char = '\u{25AF}';

/// Single-byte base encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    MacRoman,
    WinAnsi,
    PdfDoc,
    Symbol,
    ZapfDingbats,
}

impl BaseEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "StandardEncoding" => Self::Standard,
            "MacRomanEncoding" => Self::MacRoman,
            "WinAnsiEncoding" => Self::WinAnsi,
            "PDFDocEncoding" => Self::PdfDoc,
            "SymbolEncoding" => Self::Symbol,
            "ZapfDingbatsEncoding" => Self::ZapfDingbats,
            // Expert sets cover small caps and old-style figures that the
            // standard table names the same way.
            "MacExpertEncoding" => Self::Standard,
            _ => return None,
        })
    }

    /// Built-in encoding of a font program, guessed from its `/BaseFont`.
    pub fn for_basefont(basefont: Option<&str>) -> Self {
        match basefont {
            Some("Symbol") => Self::Symbol,
            Some("ZapfDingbats") => Self::ZapfDingbats,
            _ => Self::Standard,
        }
    }

    fn names(self) -> Option<&'static NameTable> {
        match self {
            Self::Standard => Some(&STANDARD),
            Self::MacRoman => Some(&MAC_ROMAN),
            Self::WinAnsi => Some(&WIN_ANSI),
            Self::PdfDoc | Self::Symbol | Self::ZapfDingbats => None,
        }
    }

    fn to_unicode(self, code: u8) -> Option<char> {
        match self {
            Self::Symbol => symbol_to_unicode(code),
            Self::ZapfDingbats => Some(zapf_dingbats_to_unicode(code)),
            Self::PdfDoc => {
                let u = PDF_DOC_ENCODING[usize::from(code)];
                (u != 0).then(|| char::from_u32(u32::from(u))).flatten()
            }
            _ => self
                .names()
                .and_then(|names| names[usize::from(code)])
                .and_then(name_to_unicode)
                .and_then(|s| s.chars().next()),
        }
    }
}

/// The `/Encoding` of a font.
#[derive(Debug, Clone)]
pub enum Encoding {
    /// One byte per code, with optional `/Differences` overrides.
    Simple {
        base: BaseEncoding,
        differences: FxHashMap<u8, SmolStr>,
    },
    /// `Identity-H` / `Identity-V`: two bytes per code, code equals CID.
    Identity { vertical: bool },
    /// A predefined CMap named but not bundled. Text needs `/ToUnicode`.
    Predefined(SmolStr),
    /// An embedded CMap stream; only its code space ranges are used.
    Embedded(ToUnicodeCMap),
}

impl Encoding {
    pub fn simple(base: BaseEncoding) -> Self {
        Self::Simple {
            base,
            differences: FxHashMap::default(),
        }
    }

    /// Builds an encoding from a dereferenced `/Encoding` value.
    ///
    /// `None` means the font has no `/Encoding`; the built-in encoding of
    /// the base font applies.
    pub fn from_object(obj: Option<&PDFObject>, basefont: Option<&str>) -> Result<Self> {
        let default_base = BaseEncoding::for_basefont(basefont);
        match obj {
            None | Some(PDFObject::Null) => Ok(Self::simple(default_base)),
            Some(PDFObject::Name(name)) => Ok(Self::from_name(name, default_base)),
            Some(PDFObject::Dict(dict)) => {
                let base = dict
                    .get("BaseEncoding")
                    .and_then(|b| b.as_name().ok())
                    .and_then(BaseEncoding::from_name)
                    .unwrap_or(default_base);
                let differences = match dict.get("Differences") {
                    Some(diffs) => parse_differences(diffs.as_array()?),
                    None => FxHashMap::default(),
                };
                Ok(Self::Simple { base, differences })
            }
            Some(PDFObject::Stream(stream)) => {
                Ok(Self::Embedded(ToUnicodeCMap::parse(stream.data()?)?))
            }
            Some(other) => Err(PdfError::malformed(format!(
                "unexpected type for font /Encoding: {}",
                other.type_name()
            ))),
        }
    }

    fn from_name(name: &str, default_base: BaseEncoding) -> Self {
        match name {
            "Identity-H" => Self::Identity { vertical: false },
            "Identity-V" => Self::Identity { vertical: true },
            _ => match BaseEncoding::from_name(name) {
                Some(base) => Self::simple(base),
                None if name.ends_with("Encoding") => Self::simple(default_base),
                None => Self::Predefined(name.into()),
            },
        }
    }

    /// Splits a shown string into character codes.
    pub fn unpack(&self, bytes: &[u8]) -> Vec<u32> {
        match self {
            Self::Identity { .. } => bytes
                .chunks_exact(2)
                .map(|pair| u32::from(u16::from_be_bytes([pair[0], pair[1]])))
                .collect(),
            Self::Embedded(cmap) => cmap
                .split_codes(bytes)
                .unwrap_or_else(|| bytes.iter().map(|&b| u32::from(b)).collect()),
            Self::Simple { .. } | Self::Predefined(_) => {
                bytes.iter().map(|&b| u32::from(b)).collect()
            }
        }
    }

    /// Glyph name for a code of a simple font.
    pub fn glyph_name(&self, code: u32) -> Option<&str> {
        let Self::Simple { base, differences } = self else {
            return None;
        };
        let code = u8::try_from(code).ok()?;
        if let Some(name) = differences.get(&code) {
            return Some(name);
        }
        base.names().and_then(|names| names[usize::from(code)])
    }

    /// Text for a code, for fonts without a `/ToUnicode` map.
    pub fn to_unicode(&self, code: u32) -> Result<String> {
        match self {
            Self::Simple { base, differences } => {
                let Ok(byte) = u8::try_from(code) else {
                    return Ok(UNKNOWN_CHAR.to_string());
                };
                if let Some(text) = differences.get(&byte).and_then(|n| name_to_unicode(n)) {
                    return Ok(text);
                }
                let c = base
                    .to_unicode(byte)
                    .unwrap_or_else(|| char::from(byte));
                Ok(c.to_string())
            }
            Self::Identity { .. } | Self::Embedded(_) => Ok(UNKNOWN_CHAR.to_string()),
            Self::Predefined(name) => Err(PdfError::unsupported(format!(
                "font encoding '{name}' is not supported without /ToUnicode"
            ))),
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Self::Identity { vertical: true })
    }
}

/// `[code name name ... code name ...]`: each integer sets the next code,
/// each name takes the current code and advances it.
fn parse_differences(items: &[PDFObject]) -> FxHashMap<u8, SmolStr> {
    let mut out = FxHashMap::default();
    let mut code: Option<u32> = None;
    for item in items {
        match item {
            PDFObject::Int(n) => code = u32::try_from(*n).ok(),
            PDFObject::Name(name) => {
                if let Some(c) = code {
                    if let Ok(byte) = u8::try_from(c) {
                        out.insert(byte, name.clone());
                    }
                    code = Some(c + 1);
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::objects::PDFDict;

    fn text(enc: &Encoding, bytes: &[u8]) -> String {
        enc.unpack(bytes)
            .into_iter()
            .map(|c| enc.to_unicode(c).unwrap())
            .collect()
    }

    #[test]
    fn base_encodings_differ_in_the_high_half() {
        let win = Encoding::simple(BaseEncoding::WinAnsi);
        let mac = Encoding::simple(BaseEncoding::MacRoman);
        assert_eq!(text(&win, b"caf\xe9 \x93q\x94"), "caf\u{e9} \u{201c}q\u{201d}");
        assert_eq!(text(&mac, b"\x8e"), "\u{e9}");
        assert_eq!(text(&Encoding::simple(BaseEncoding::Standard), b"\xae"), "\u{fb01}");
    }

    #[test]
    fn differences_override_the_base() {
        let mut dict = PDFDict::new();
        dict.insert("BaseEncoding".into(), PDFObject::name("WinAnsiEncoding"));
        dict.insert(
            "Differences".into(),
            PDFObject::Array(vec![
                PDFObject::Int(65),
                PDFObject::name("B"),
                PDFObject::name("uni263A"),
                PDFObject::Int(200),
                PDFObject::name("f_i"),
            ]),
        );
        let enc = Encoding::from_object(Some(&PDFObject::Dict(dict)), None).unwrap();
        assert_eq!(text(&enc, b"ABCD\xc8"), "B\u{263a}CDfi");
        assert_eq!(enc.glyph_name(66), Some("uni263A"));
        assert_eq!(enc.glyph_name(67), Some("C"));
    }

    #[test]
    fn identity_unpacks_two_bytes_and_shows_boxes() {
        let enc = Encoding::from_object(Some(&PDFObject::name("Identity-H")), None).unwrap();
        assert_eq!(enc.unpack(b"\x00\x41\x01\x02\x03"), vec![0x41, 0x102]);
        assert_eq!(text(&enc, b"\x00\x41"), "\u{25af}");
    }

    #[test]
    fn predefined_cmap_without_tounicode_is_unsupported() {
        let enc = Encoding::from_object(Some(&PDFObject::name("UniJIS-UCS2-H")), None).unwrap();
        assert!(enc.to_unicode(0x41).unwrap_err().is_unsupported());
    }

    #[test]
    fn default_follows_the_base_font() {
        let enc = Encoding::from_object(None, Some("Symbol")).unwrap();
        assert_eq!(text(&enc, b"a"), "\u{3b1}");
        assert!(Encoding::from_object(Some(&PDFObject::Int(3)), None)
            .unwrap_err()
            .is_malformed());
    }
}
