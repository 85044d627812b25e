//! Glyph width calculators, one per font flavour.
//!
//! Widths are returned in glyph space: thousandths of a text space unit for
//! everything except Type3 fonts, whose units are set by `/FontMatrix`.

use super::Font;
use super::metrics::BuiltInMetrics;
use crate::model::objects::PDFObject;
use rustc_hash::FxHashMap;

/// `/W` and `/DW` of a CIDFont.
#[derive(Debug, Clone, Default)]
pub struct CidWidths {
    default: f64,
    singles: FxHashMap<u32, f64>,
    ranges: Vec<(u32, u32, f64)>,
}

impl CidWidths {
    /// Parses a dereferenced `/W` array. Entries take two shapes:
    /// `c [w1 w2 ...]` gives consecutive codes from `c`, and
    /// `first last w` gives every code in the range the same width.
    pub fn new(default: f64, w: &[PDFObject]) -> Self {
        let mut out = Self {
            default,
            ..Self::default()
        };
        let mut i = 0;
        let code = |obj: &PDFObject| obj.as_int().ok().and_then(|c| u32::try_from(c).ok());
        while i + 1 < w.len() {
            let Ok(start) = w[i].as_int() else {
                i += 1;
                continue;
            };
            // Entries whose codes fall outside the CID space are skipped whole.
            let first = u32::try_from(start).ok();
            match &w[i + 1] {
                PDFObject::Array(widths) => {
                    if let Some(first) = first {
                        for (offset, width) in widths.iter().enumerate() {
                            let cid = u32::try_from(offset).ok().and_then(|o| first.checked_add(o));
                            let Some(cid) = cid else {
                                break;
                            };
                            if let Ok(width) = width.as_num() {
                                out.singles.insert(cid, width);
                            }
                        }
                    }
                    i += 2;
                }
                last => {
                    if let (Some(first), Some(last), Some(Ok(width))) =
                        (first, code(last), w.get(i + 2).map(PDFObject::as_num))
                    {
                        if first <= last {
                            out.ranges.push((first, last, width));
                        }
                    }
                    i += 3;
                }
            }
        }
        out
    }

    pub fn get(&self, code: u32) -> f64 {
        if let Some(w) = self.singles.get(&code) {
            return *w;
        }
        self.ranges
            .iter()
            .find(|(first, last, _)| (*first..=*last).contains(&code))
            .map_or(self.default, |(_, _, w)| *w)
    }
}

/// `/FirstChar` plus `/Widths` of a simple font.
#[derive(Debug, Clone, Default)]
pub struct SimpleWidths {
    pub first_char: Option<i64>,
    pub widths: Vec<f64>,
    pub missing_width: f64,
}

impl SimpleWidths {
    fn lookup(&self, code: u32) -> Option<f64> {
        let first = self.first_char?;
        let index = i64::from(code) - first;
        usize::try_from(index).ok().and_then(|i| self.widths.get(i).copied())
    }
}

#[derive(Debug, Clone)]
pub enum WidthCalculator {
    /// Standard font without `/Widths`: look the glyph name up in AFM metrics.
    BuiltIn(&'static BuiltInMetrics),
    /// `/Widths` with `/MissingWidth` for anything outside it.
    TypeOneOrThree(SimpleWidths),
    /// `/Widths` first, then the embedded program's advances.
    TrueType(SimpleWidths),
    /// CIDFont `/W` with `/DW` as the default.
    Composite(CidWidths),
    /// Type0 font: delegate to the first descendant.
    TypeZero,
}

impl WidthCalculator {
    pub fn glyph_width(&self, font: &Font, code: u32) -> f64 {
        match self {
            Self::BuiltIn(metrics) => font
                .encoding
                .glyph_name(code)
                .map_or(0.0, |name| metrics.width_of(name)),
            Self::TypeOneOrThree(w) => {
                if w.widths.is_empty() {
                    return 0.0;
                }
                w.lookup(code).unwrap_or(w.missing_width)
            }
            Self::TrueType(w) => {
                if !w.widths.is_empty() && w.first_char.is_some_and(|f| f <= i64::from(code)) {
                    return match w.lookup(code) {
                        Some(width) if width != 0.0 => width,
                        _ => w.missing_width,
                    };
                }
                font.descriptor
                    .as_ref()
                    .and_then(|d| d.glyph_width(code))
                    .unwrap_or(w.missing_width)
            }
            Self::Composite(w) => w.get(code),
            Self::TypeZero => font
                .descendants
                .first()
                .map_or(0.0, |d| d.glyph_width(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cid_widths_both_forms() {
        let w = CidWidths::new(
            1000.0,
            &[
                PDFObject::Int(1),
                PDFObject::Array(vec![PDFObject::Int(500), PDFObject::Real(250.5)]),
                PDFObject::Int(10),
                PDFObject::Int(20),
                PDFObject::Int(300),
            ],
        );
        assert_eq!(w.get(1), 500.0);
        assert_eq!(w.get(2), 250.5);
        assert_eq!(w.get(15), 300.0);
        assert_eq!(w.get(21), 1000.0);
    }

    #[test]
    fn consecutive_widths_stop_at_the_last_cid() {
        let w = CidWidths::new(
            1000.0,
            &[
                PDFObject::Int(i64::from(u32::MAX)),
                PDFObject::Array(vec![PDFObject::Int(500), PDFObject::Int(600)]),
                PDFObject::Int(5),
                PDFObject::Array(vec![PDFObject::Int(700)]),
            ],
        );
        assert_eq!(w.get(u32::MAX), 500.0);
        assert_eq!(w.get(0), 1000.0);
        assert_eq!(w.get(5), 700.0);
    }

    #[test]
    fn out_of_range_codes_are_skipped() {
        let w = CidWidths::new(
            1000.0,
            &[
                PDFObject::Int(1 << 40),
                PDFObject::Array(vec![PDFObject::Int(500)]),
                PDFObject::Int(-1),
                PDFObject::Int(10),
                PDFObject::Int(400),
                PDFObject::Int(3),
                PDFObject::Int(1 << 33),
                PDFObject::Int(300),
                PDFObject::Int(7),
                PDFObject::Array(vec![PDFObject::Int(250)]),
            ],
        );
        assert_eq!(w.get(0), 1000.0);
        assert_eq!(w.get(5), 1000.0);
        assert_eq!(w.get(7), 250.0);
    }

    #[test]
    fn backwards_range_is_ignored() {
        let w = CidWidths::new(
            1000.0,
            &[
                PDFObject::Int(20),
                PDFObject::Int(10),
                PDFObject::Int(300),
                PDFObject::Int(30),
                PDFObject::Int(30),
                PDFObject::Int(450),
            ],
        );
        assert_eq!(w.get(15), 1000.0);
        assert_eq!(w.get(20), 1000.0);
        assert_eq!(w.get(30), 450.0);
        assert!(w.ranges.iter().all(|(first, last, _)| first <= last));
    }

    #[test]
    fn simple_widths_index_from_first_char() {
        let w = SimpleWidths {
            first_char: Some(32),
            widths: vec![250.0, 333.0],
            missing_width: 111.0,
        };
        assert_eq!(w.lookup(33), Some(333.0));
        assert_eq!(w.lookup(31), None);
        assert_eq!(w.lookup(34), None);
    }
}
