//! Fonts: encodings, ToUnicode maps, glyph names and width calculators.

pub mod cmap;
pub mod descriptor;
pub mod encoding;
#[allow(clippy::module_inception)]
pub mod font;
pub mod glyphs;
pub mod latin;
pub mod metrics;
pub mod symbol;
pub mod truetype;
pub mod width;

pub use cmap::ToUnicodeCMap;
pub use descriptor::FontDescriptor;
pub use encoding::{BaseEncoding, Encoding, UNKNOWN_CHAR};
pub use font::Font;
pub use width::WidthCalculator;

use crate::document::xref::ObjectTable;
use crate::error::Result;
use crate::model::objects::{PDFObjRef, PDFObject};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};

/// Fonts already built for a document, keyed by the reference of their
/// font dictionary.
///
/// Two threads may build the same font at once; the second result simply
/// replaces the first.
#[derive(Debug, Default)]
pub struct FontCache {
    fonts: Mutex<FxHashMap<PDFObjRef, Arc<Font>>>,
}

impl FontCache {
    /// The font for a `/Font` resource entry. Direct dictionaries are built
    /// every time; indirect ones once per document.
    pub fn load(&self, objects: &ObjectTable, entry: &PDFObject) -> Result<Arc<Font>> {
        let PDFObject::Ref(r) = entry else {
            let dict = objects.resolve_dict(entry)?;
            return Ok(Arc::new(Font::new(objects, &dict)?));
        };
        if let Some(font) = self.lock().get(r) {
            return Ok(Arc::clone(font));
        }
        let dict = objects.resolve_dict(entry)?;
        let font = Arc::new(Font::new(objects, &dict)?);
        self.lock().insert(*r, Arc::clone(&font));
        Ok(font)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<PDFObjRef, Arc<Font>>> {
        self.fonts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
