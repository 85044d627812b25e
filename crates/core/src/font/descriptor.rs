//! `/FontDescriptor` dictionaries.

use super::truetype::TrueTypeMetrics;
use crate::document::xref::ObjectTable;
use crate::error::Result;
use crate::model::geometry::{Rect, rect_from_object};
use crate::model::objects::{PDFDict, PDFObject};
use smol_str::SmolStr;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FontDescriptor {
    pub font_name: SmolStr,
    pub font_family: Option<String>,
    pub font_stretch: SmolStr,
    pub font_weight: f64,
    pub flags: i64,
    pub font_bbox: Rect,
    pub italic_angle: Option<f64>,
    pub ascent: f64,
    pub descent: f64,
    pub leading: f64,
    pub cap_height: f64,
    pub x_height: Option<f64>,
    pub stem_v: Option<f64>,
    pub avg_width: f64,
    pub max_width: f64,
    pub missing_width: f64,
    /// Metrics from an embedded `/FontFile2`, when it could be read
    pub truetype: Option<TrueTypeMetrics>,
}

impl FontDescriptor {
    pub fn new(objects: &ObjectTable, dict: &PDFDict) -> Result<Self> {
        let num = |key: &str| -> Result<Option<f64>> {
            match dict.get(key) {
                None => Ok(None),
                Some(v) => match objects.resolve(v)? {
                    PDFObject::Int(i) => Ok(Some(i as f64)),
                    PDFObject::Real(r) => Ok(Some(r)),
                    _ => Ok(None),
                },
            }
        };
        let name = |key: &str| -> Result<Option<SmolStr>> {
            match dict.get(key) {
                None => Ok(None),
                Some(v) => Ok(objects.resolve(v)?.as_name().ok().map(SmolStr::from)),
            }
        };

        let font_bbox = match dict.get("FontBBox") {
            Some(v) => rect_from_object(&objects.dereference_recursive(v)?),
            None => None,
        };
        let font_family = match dict.get("FontFamily") {
            Some(v) => objects
                .resolve(v)?
                .as_string()
                .ok()
                .map(crate::document::text_string::decode_text),
            None => None,
        };
        let truetype = match dict.get("FontFile2") {
            Some(v) => match objects.resolve(v)? {
                PDFObject::Stream(stream) => {
                    match stream.data().and_then(TrueTypeMetrics::parse) {
                        Ok(metrics) => Some(metrics),
                        Err(err) => {
                            debug!(%err, "ignoring unreadable /FontFile2");
                            None
                        }
                    }
                }
                _ => None,
            },
            None => None,
        };

        Ok(Self {
            font_name: name("FontName")?.unwrap_or_default(),
            font_family,
            font_stretch: name("FontStretch")?.unwrap_or_else(|| SmolStr::new_static("Normal")),
            font_weight: num("FontWeight")?.unwrap_or(400.0),
            flags: num("Flags")?.map_or(0, |f| f as i64),
            font_bbox: font_bbox.unwrap_or((0.0, 0.0, 0.0, 0.0)),
            italic_angle: num("ItalicAngle")?,
            ascent: num("Ascent")?.unwrap_or(0.0),
            descent: num("Descent")?.unwrap_or(0.0),
            leading: num("Leading")?.unwrap_or(0.0),
            cap_height: num("CapHeight")?.unwrap_or(0.0),
            x_height: num("XHeight")?,
            stem_v: num("StemV")?,
            avg_width: num("AvgWidth")?.unwrap_or(0.0),
            max_width: num("MaxWidth")?.unwrap_or(0.0),
            missing_width: num("MissingWidth")?.unwrap_or(0.0),
            truetype,
        })
    }

    /// Width from the embedded TrueType program, scaled to 1000 units per em.
    pub fn glyph_width(&self, code: u32) -> Option<f64> {
        self.truetype.as_ref()?.glyph_width(code)
    }
}
