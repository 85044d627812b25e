//! A single page: its boxes, resources, content and text.

use super::reader::Document;
use crate::error::{PdfError, Result};
use crate::font::Font;
use crate::interp::{PageTextReceiver, Receiver, Walker};
use crate::layout::{PageLayout, RunOptions, TextRun, filters};
use crate::model::geometry::{
    Point, Rect, normalize_rotation, rect_from_object, rect_height, rect_width, rotate_rect,
};
use crate::model::objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Keys a page takes from its ancestors in the page tree when it does not
/// define them itself.
const INHERITABLE: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

/// The page boundaries, exactly as the page (or its ancestors) gives them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangles {
    pub media: Rect,
    /// Defaults to the media box.
    pub crop: Rect,
    pub bleed: Option<Rect>,
    pub trim: Option<Rect>,
    pub art: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        })
    }
}

/// A page of a [`Document`].
///
/// Geometry that depends on `/Rotate` (`width`, `height`, `origin`, run
/// positions) is given in rotated space, so text always reads left to
/// right with `y` growing upwards.
pub struct Page<'a> {
    doc: &'a Document,
    number: usize,
    reference: PDFObjRef,
    attrs: PDFDict,
    rectangles: Rectangles,
    rotate: i64,
}

impl<'a> Page<'a> {
    pub(crate) fn new(doc: &'a Document, number: usize, reference: PDFObjRef) -> Result<Self> {
        let objects = doc.objects();
        let attrs = match objects.fetch(reference)? {
            PDFObject::Dict(dict) => dict,
            other => {
                return Err(PdfError::malformed(format!(
                    "page {number} ({reference}) is a {}, not a dictionary",
                    other.type_name()
                )));
            }
        };
        let attrs = inherit(doc, reference, attrs)?;

        let rect = |key: &str| -> Result<Option<Rect>> {
            match attrs.get(key) {
                Some(value) => Ok(rect_from_object(&objects.dereference_recursive(value)?)),
                None => Ok(None),
            }
        };
        let media = rect("MediaBox")?
            .ok_or_else(|| PdfError::malformed(format!("page {number} has no usable /MediaBox")))?;
        let rectangles = Rectangles {
            media,
            crop: rect("CropBox")?.unwrap_or(media),
            bleed: rect("BleedBox")?,
            trim: rect("TrimBox")?,
            art: rect("ArtBox")?,
        };
        let rotate = match attrs.get("Rotate") {
            Some(value) => objects.resolve(value)?.as_int().map_or(0, normalize_rotation),
            None => 0,
        };

        Ok(Self {
            doc,
            number,
            reference,
            attrs,
            rectangles,
            rotate,
        })
    }

    /// 1-based position in the document.
    pub const fn number(&self) -> usize {
        self.number
    }

    pub const fn reference(&self) -> PDFObjRef {
        self.reference
    }

    /// The page dictionary with inherited entries filled in.
    pub const fn attrs(&self) -> &PDFDict {
        &self.attrs
    }

    pub const fn rectangles(&self) -> Rectangles {
        self.rectangles
    }

    /// Clockwise display rotation: 0, 90, 180 or 270.
    pub const fn rotate(&self) -> i64 {
        self.rotate
    }

    fn rotated_media(&self) -> Rect {
        rotate_rect(self.rotate, self.rectangles.media)
    }

    pub fn width(&self) -> f64 {
        rect_width(self.rotated_media())
    }

    pub fn height(&self) -> f64 {
        rect_height(self.rotated_media())
    }

    /// Lower-left corner of the rotated media box.
    pub fn origin(&self) -> Point {
        let r = self.rotated_media();
        (r.0, r.1)
    }

    pub fn orientation(&self) -> Orientation {
        if self.width() > self.height() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn resources(&self) -> Result<PDFDict> {
        match self.attrs.get("Resources") {
            Some(value) => self.doc.objects().resolve_dict(value),
            None => Ok(PDFDict::new()),
        }
    }

    /// Decoded content, with the streams of a `/Contents` array joined by
    /// newlines.
    pub fn raw_content(&self) -> Result<Vec<u8>> {
        let objects = self.doc.objects();
        let Some(contents) = self.attrs.get("Contents") else {
            return Ok(Vec::new());
        };
        let streams = match objects.resolve(contents)? {
            PDFObject::Null => Vec::new(),
            PDFObject::Stream(stream) => vec![*stream],
            PDFObject::Array(items) => items
                .iter()
                .map(|item| match objects.resolve(item)? {
                    PDFObject::Stream(stream) => Ok(Some(*stream)),
                    PDFObject::Null => Ok(None),
                    other => Err(PdfError::malformed(format!(
                        "page {} /Contents holds a {}",
                        self.number,
                        other.type_name()
                    ))),
                })
                .filter_map(Result::transpose)
                .collect::<Result<_>>()?,
            other => {
                return Err(PdfError::malformed(format!(
                    "page {} /Contents is a {}",
                    self.number,
                    other.type_name()
                )));
            }
        };

        let mut out = Vec::new();
        for (i, stream) in streams.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(stream.data()?);
        }
        Ok(out)
    }

    /// Fonts named in the page resources, keyed by resource label.
    pub fn fonts(&self) -> Result<IndexMap<SmolStr, Arc<Font>>> {
        let objects = self.doc.objects();
        let category = self.category("Font")?;
        category
            .iter()
            .map(|(label, entry)| Ok((label.clone(), self.doc.fonts().load(objects, entry)?)))
            .collect()
    }

    /// XObjects named in the page resources, keyed by resource label.
    pub fn xobjects(&self) -> Result<IndexMap<SmolStr, PDFStream>> {
        let objects = self.doc.objects();
        let mut out = IndexMap::new();
        for (label, entry) in self.category("XObject")? {
            match objects.resolve(&entry)? {
                PDFObject::Stream(stream) => {
                    out.insert(label, *stream);
                }
                other => debug!(%label, kind = other.type_name(), "XObject entry is not a stream"),
            }
        }
        Ok(out)
    }

    fn category(&self, name: &str) -> Result<PDFDict> {
        match self.resources()?.get(name) {
            Some(value) => self.doc.objects().resolve_dict(value),
            None => Ok(PDFDict::new()),
        }
    }

    /// Replays the page content to `receivers`.
    ///
    /// `BeginPage` carries `[page number, MediaBox, Rotate]`.
    pub fn walk(&self, receivers: &mut [&mut dyn Receiver]) -> Result<()> {
        let (x0, y0, x1, y1) = self.rectangles.media;
        let info = [
            PDFObject::Int(self.number as i64),
            PDFObject::Array([x0, y0, x1, y1].into_iter().map(PDFObject::Real).collect()),
            PDFObject::Int(self.rotate),
        ];
        let content = self.raw_content()?;
        Walker::new(self.doc.objects(), self.doc.fonts(), self.doc.contents()).walk_page(
            &content,
            self.resources()?,
            &info,
            receivers,
        )
    }

    /// Positioned text on the page.
    ///
    /// Runs outside `options.rect` (the rotated crop box by default) are
    /// dropped, as are empty and zero-width runs and faux-bold double
    /// strikes. With `options.merge` set, neighbouring runs on a baseline
    /// are joined.
    pub fn runs(&self, options: RunOptions) -> Result<Vec<TextRun>> {
        let mut receiver = PageTextReceiver::new();
        self.walk(&mut [&mut receiver])?;

        let rect = options
            .rect
            .unwrap_or_else(|| rotate_rect(self.rotate, self.rectangles.crop));
        let runs = filters::within_rect(receiver.into_runs(), rect);
        let runs = filters::exclude_empty_strings(runs);
        let runs = filters::exclude_redundant_runs(runs);
        let runs = filters::exclude_zero_width_runs(runs);
        Ok(if options.merge {
            filters::merge_runs(runs)
        } else {
            runs
        })
    }

    /// The page as plain text, laid out on a character grid.
    pub fn text(&self, rect: Option<Rect>) -> Result<String> {
        let runs = self.runs(RunOptions {
            rect,
            ..RunOptions::default()
        })?;
        Ok(PageLayout::new(&runs, self.rotated_media()).to_string())
    }
}

impl fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("number", &self.number)
            .field("reference", &self.reference)
            .field("rectangles", &self.rectangles)
            .field("rotate", &self.rotate)
            .finish_non_exhaustive()
    }
}

/// Fills in inheritable keys from the `/Parent` chain. A parent chain that
/// loops is malformed.
fn inherit(doc: &Document, reference: PDFObjRef, mut attrs: PDFDict) -> Result<PDFDict> {
    let objects = doc.objects();
    let mut visited = FxHashSet::default();
    visited.insert(reference);
    let mut parent = attrs.get("Parent").cloned();
    while let Some(PDFObject::Ref(r)) = parent {
        if !visited.insert(r) {
            return Err(PdfError::malformed(format!("/Parent chain of {reference} loops at {r}")));
        }
        let node = objects.resolve_dict(&PDFObject::Ref(r))?;
        for key in INHERITABLE {
            if !attrs.contains_key(key) {
                if let Some(value) = node.get(key) {
                    attrs.insert(SmolStr::new_static(key), value.clone());
                }
            }
        }
        parent = node.get("Parent").cloned();
    }
    Ok(attrs)
}
